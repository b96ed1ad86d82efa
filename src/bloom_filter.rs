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

//! Split-block bloom filter: a space-efficient
//! probabilistic membership test composed of independent 256-bit blocks,
//! each further split into 8 lanes of 32 bits. Hashing is xxHash-64.

use std::hash::Hasher;

use twox_hash::XxHash64;

use crate::data_type::AsBytes;

const BITS_SET_PER_BLOCK: usize = 8;
const BYTES_PER_BLOCK: usize = 32;

/// The eight odd 32-bit constants the reference implementation salts each
/// lane with, so that the 8 bits set in a block are spread across all 8
/// words rather than clustering in one.
const SALT: [u32; 8] = [
  0x47b6137b, 0x44974d91, 0x8824ad5b, 0xa2b7289d, 0x705495c7, 0x2df1424b, 0x9efc4947, 0x5c6bfb31
];

pub struct SplitBlockBloomFilter {
  blocks: Vec<[u32; 8]>
}

impl SplitBlockBloomFilter {
  /// `num_bytes` is rounded up to the nearest multiple of `BYTES_PER_BLOCK`.
  pub fn new(num_bytes: usize) -> Self {
    let num_blocks = std::cmp::max(1, (num_bytes + BYTES_PER_BLOCK - 1) / BYTES_PER_BLOCK);
    SplitBlockBloomFilter { blocks: vec![[0u32; 8]; num_blocks] }
  }

  fn hash(value: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(value);
    hasher.finish()
  }

  fn block_index(&self, hash: u64) -> usize {
    // Upper 32 bits of the hash scaled into `[0, num_blocks)`, matching the
    // reference implementation's `(hash >> 32) * num_blocks >> 32`.
    (((hash >> 32) * self.blocks.len() as u64) >> 32) as usize
  }

  fn mask(hash: u32) -> [u32; 8] {
    let mut word = [0u32; 8];
    for (i, slot) in word.iter_mut().enumerate() {
      let h = hash.wrapping_mul(SALT[i]);
      *slot = 1u32 << (h >> 27);
    }
    word
  }

  pub fn insert<T: AsBytes>(&mut self, value: &T) {
    self.insert_bytes(value.as_bytes());
  }

  pub fn insert_bytes(&mut self, bytes: &[u8]) {
    let hash = Self::hash(bytes);
    let idx = self.block_index(hash);
    let mask = Self::mask(hash as u32);
    for i in 0..BITS_SET_PER_BLOCK {
      self.blocks[idx][i] |= mask[i];
    }
  }

  pub fn check<T: AsBytes>(&self, value: &T) -> bool {
    self.check_bytes(value.as_bytes())
  }

  pub fn check_bytes(&self, bytes: &[u8]) -> bool {
    let hash = Self::hash(bytes);
    let idx = self.block_index(hash);
    let mask = Self::mask(hash as u32);
    let block = &self.blocks[idx];
    (0..BITS_SET_PER_BLOCK).all(|i| block[i] & mask[i] == mask[i])
  }

  pub fn num_bytes(&self) -> usize {
    self.blocks.len() * BYTES_PER_BLOCK
  }

  /// Serializes the filter body, one little-endian `u32` per lane, blocks
  /// in order -- the layout a conforming reader expects after the bloom
  /// filter header.
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.num_bytes());
    for block in &self.blocks {
      for word in block {
        out.extend_from_slice(&word.to_le_bytes());
      }
    }
    out
  }

  pub fn from_bytes(bytes: &[u8]) -> Self {
    let mut blocks = Vec::with_capacity(bytes.len() / BYTES_PER_BLOCK);
    for chunk in bytes.chunks(BYTES_PER_BLOCK) {
      let mut block = [0u32; 8];
      for (i, word_bytes) in chunk.chunks(4).enumerate() {
        block[i] = u32::from_le_bytes(word_bytes.try_into().unwrap());
      }
      blocks.push(block);
    }
    SplitBlockBloomFilter { blocks }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_insert_and_check() {
    let mut filter = SplitBlockBloomFilter::new(1024);
    let values: Vec<i64> = (0..1000).collect();
    for v in &values {
      filter.insert(v);
    }
    for v in &values {
      assert!(filter.check(v), "expected {} to be present", v);
    }
  }

  #[test]
  fn test_cross_column_agreement() {
    // Mirrors S6: filters built independently over the same logical values
    // must agree bit-for-bit since hashing/masking depends only on bytes.
    let mut fx = SplitBlockBloomFilter::new(80);
    let mut fy = SplitBlockBloomFilter::new(80);
    let values: Vec<f64> = vec![1.5, 2.25, -3.75, 42.0];
    for v in &values {
      fx.insert(v);
      fy.insert(v);
    }
    for v in &values {
      assert_eq!(fx.check(v), fy.check(v));
      assert!(fx.check(v));
    }
  }

  #[test]
  fn test_round_trip_bytes() {
    let mut filter = SplitBlockBloomFilter::new(64);
    filter.insert(&42i32);
    let bytes = filter.to_bytes();
    let restored = SplitBlockBloomFilter::from_bytes(&bytes);
    assert!(restored.check(&42i32));
  }
}
