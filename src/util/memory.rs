// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Memory primitives: a cheaply-cloneable, range-sliceable byte buffer
//! (`ByteBufferPtr`), a growable scratch buffer (`ByteBuffer`), a
//! process-wide memory tracker, a bump-allocated arena scoped to one row
//! group, and a buffer pool shared across page writers.

use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An immutable, reference-counted, range-sliceable view over a byte buffer.
/// Cloning is O(1) (it clones the `Arc` and the two offsets); no bytes are
/// ever copied by `range`/`start_from`/`all`.
#[derive(Clone, Debug)]
pub struct ByteBufferPtr {
  data: Arc<Vec<u8>>,
  start: usize,
  len: usize
}

impl ByteBufferPtr {
  pub fn new(v: Vec<u8>) -> Self {
    let len = v.len();
    ByteBufferPtr { data: Arc::new(v), start: 0, len }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// A view over the full remaining range, same bytes as `as_ref()` but as
  /// an owned handle so it can be threaded independently.
  pub fn all(&self) -> ByteBufferPtr {
    self.range(0, self.len)
  }

  /// A view starting `start` bytes into this one, running to the end.
  pub fn start_from(&self, start: usize) -> ByteBufferPtr {
    assert!(start <= self.len);
    self.range(start, self.len - start)
  }

  /// A view of `len` bytes starting at `start` bytes into this one.
  pub fn range(&self, start: usize, len: usize) -> ByteBufferPtr {
    assert!(start + len <= self.len, "range [{}, {}) out of bounds (len {})", start, start + len, self.len);
    ByteBufferPtr { data: self.data.clone(), start: self.start + start, len }
  }
}

impl AsRef<[u8]> for ByteBufferPtr {
  fn as_ref(&self) -> &[u8] {
    &self.data[self.start..self.start + self.len]
  }
}

impl ByteBufferPtr {
  pub fn data(&self) -> &[u8] {
    self.as_ref()
  }
}

impl PartialEq for ByteBufferPtr {
  fn eq(&self, other: &ByteBufferPtr) -> bool {
    self.as_ref() == other.as_ref()
  }
}

/// A growable, reusable byte buffer, used for small scratch state (e.g. the
/// per-mini-block bit widths inside `DeltaBitPackDecoder`) that is cleared
/// and refilled many times rather than reallocated.
#[derive(Clone, Debug, Default)]
pub struct ByteBuffer {
  data: Vec<u8>
}

impl ByteBuffer {
  pub fn new() -> Self {
    ByteBuffer { data: Vec::new() }
  }

  pub fn set_data(&mut self, data: Vec<u8>) {
    self.data = data;
  }

  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn size(&self) -> usize {
    self.data.len()
  }

  pub fn clear(&mut self) {
    self.data.clear();
  }
}

/// Tracks bytes allocated by one writer/reader instance (row-group buffers,
/// dictionaries, page bodies). Purely advisory bookkeeping; it never denies
/// an allocation, it just lets callers observe memory pressure (e.g. to
/// decide when to fall back out of dictionary encoding).
#[derive(Debug, Default)]
pub struct MemTracker {
  current: AtomicI64,
  max: AtomicI64
}

pub type MemTrackerPtr = Arc<MemTracker>;

impl MemTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn new_ptr() -> MemTrackerPtr {
    Arc::new(Self::new())
  }

  pub fn alloc(&self, num_bytes: i64) -> i64 {
    let new_current = self.current.fetch_add(num_bytes, Ordering::SeqCst) + num_bytes;
    self.max.fetch_max(new_current, Ordering::SeqCst);
    new_current
  }

  pub fn memory_usage(&self) -> i64 {
    self.current.load(Ordering::SeqCst)
  }

  pub fn max_memory_usage(&self) -> i64 {
    self.max.load(Ordering::SeqCst)
  }
}

/// Bump allocator for short-lived byte runs produced while assembling one
/// row group (e.g. intermediate encode scratch space). Not shared across row
/// groups: the assembler owns one `Arena`, resetting it at each flush.
/// Slices handed out by `alloc` must not be retained past the next `reset`.
pub struct Arena {
  blocks: Vec<Vec<u8>>,
  block_size: usize,
  used_in_last: usize
}

impl Arena {
  pub fn new(block_size: usize) -> Self {
    Arena { blocks: vec![Vec::with_capacity(block_size)], block_size, used_in_last: 0 }
  }

  /// Copies `bytes` into arena-owned storage and returns a handle to it.
  /// The returned `ByteBufferPtr` is backed by the arena's own allocation,
  /// not by `bytes` -- it remains valid until the arena resets.
  pub fn alloc(&mut self, bytes: &[u8]) -> ByteBufferPtr {
    if bytes.len() > self.block_size {
      // Oversized allocation gets its own dedicated block.
      self.blocks.push(bytes.to_vec());
      return ByteBufferPtr::new(self.blocks.last().unwrap().clone());
    }

    let needs_new_block = {
      let last = self.blocks.last().unwrap();
      last.len() + bytes.len() > last.capacity()
    };
    if needs_new_block {
      self.blocks.push(Vec::with_capacity(self.block_size));
      self.used_in_last = 0;
    }

    let last = self.blocks.last_mut().unwrap();
    last.extend_from_slice(bytes);
    self.used_in_last += bytes.len();
    ByteBufferPtr::new(last.clone())
  }

  /// Releases every block and starts over. Called at row-group boundaries.
  pub fn reset(&mut self) {
    self.blocks.clear();
    self.blocks.push(Vec::with_capacity(self.block_size));
    self.used_in_last = 0;
  }

  pub fn num_blocks(&self) -> usize {
    self.blocks.len()
  }
}

impl fmt::Debug for Arena {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Arena").field("num_blocks", &self.blocks.len()).finish()
  }
}

/// A reusable byte buffer handed out by the buffer pool. Guaranteed empty
/// (but with its prior capacity retained) the moment `get_buffer` returns
/// it.
pub type PooledBuffer = Vec<u8>;

/// Pool of reusable byte buffers shared across page writers within a
/// process. `get_buffer`/`put_buffer` is the only protocol -- callers must
/// not retain a buffer across a `put_buffer` call, and must not assume two
/// concurrent `get_buffer` calls return the same instance.
#[derive(Default)]
pub struct BufferPool {
  free: Mutex<Vec<PooledBuffer>>,
  outstanding: AtomicUsize
}

impl BufferPool {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get_buffer(&self) -> PooledBuffer {
    self.outstanding.fetch_add(1, Ordering::SeqCst);
    self.free.lock().unwrap().pop().unwrap_or_default()
  }

  /// Returns `buf` to the pool after clearing it. The caller gives up
  /// ownership; the cleared buffer may be handed back out by a later
  /// `get_buffer` call.
  pub fn put_buffer(&self, mut buf: PooledBuffer) {
    buf.clear();
    self.outstanding.fetch_sub(1, Ordering::SeqCst);
    self.free.lock().unwrap().push(buf);
  }

  pub fn outstanding(&self) -> usize {
    self.outstanding.load(Ordering::SeqCst)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_byte_buffer_ptr_range() {
    let b = ByteBufferPtr::new(vec![1, 2, 3, 4, 5]);
    assert_eq!(b.as_ref(), &[1, 2, 3, 4, 5]);
    let r = b.range(1, 3);
    assert_eq!(r.as_ref(), &[2, 3, 4]);
    let r2 = r.start_from(1);
    assert_eq!(r2.as_ref(), &[3, 4]);
  }

  #[test]
  fn test_mem_tracker() {
    let t = MemTracker::new();
    t.alloc(100);
    t.alloc(50);
    assert_eq!(t.memory_usage(), 150);
    assert_eq!(t.max_memory_usage(), 150);
    t.alloc(-120);
    assert_eq!(t.memory_usage(), 30);
    assert_eq!(t.max_memory_usage(), 150);
  }

  #[test]
  fn test_arena_reset() {
    let mut arena = Arena::new(16);
    let a = arena.alloc(b"hello");
    assert_eq!(a.as_ref(), b"hello");
    arena.reset();
    assert_eq!(arena.num_blocks(), 1);
  }

  #[test]
  fn test_buffer_pool_round_trip() {
    let pool = BufferPool::new();
    let mut buf = pool.get_buffer();
    buf.extend_from_slice(b"scratch");
    pool.put_buffer(buf);
    assert_eq!(pool.outstanding(), 0);
    let buf2 = pool.get_buffer();
    assert!(buf2.is_empty());
  }
}
