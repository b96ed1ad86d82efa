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

//! RLE/bit-packed hybrid, the wire format backing repetition/definition
//! levels, dictionary indexes and (for data page v2 booleans) plain values.
//!
//! Each run starts with an unsigned varint header: the low bit selects RLE
//! (remaining bits are the run length, followed by one little-endian value
//! occupying `ceil(bit_width / 8)` bytes) or bit-packed (remaining bits are
//! the number of *groups of 8* values, followed by that many 8-value groups
//! packed at `bit_width` bits each, LSB first).

use crate::errors::Result;
use crate::util::bit_util::{BitReader, BitWriter};
use crate::util::memory::ByteBufferPtr;

/// Encodes a sequence of small non-negative integers (levels or dictionary
/// indices) using the RLE/bit-packed hybrid. Values are buffered in full and
/// the run structure is chosen on `consume()`, rather than streamed
/// incrementally -- simpler to get right, and every caller in this crate
/// already collects a full page's worth of levels/indices before encoding.
pub struct RleEncoder {
  bit_width: u8,
  values: Vec<u64>
}

impl RleEncoder {
  pub fn new(bit_width: u8) -> Self {
    RleEncoder { bit_width, values: Vec::new() }
  }

  pub fn put(&mut self, value: u64) {
    self.values.push(value);
  }

  pub fn put_batch(&mut self, values: &[u64]) {
    self.values.extend_from_slice(values);
  }

  /// Conservative upper bound on the encoded size of `num_values` values at
  /// `bit_width` bits, used to size the destination buffer up front.
  pub fn max_buffer_size(bit_width: u8, num_values: usize) -> usize {
    let width_bytes = ((bit_width as usize) + 7) / 8;
    // Worst case: every value its own RLE run of length 1 (header + value).
    num_values * (width_bytes + 5) + 16
  }

  /// Consumes the buffered values and returns the encoded byte run.
  pub fn consume(mut self) -> Vec<u8> {
    let mut writer = BitWriter::new(RleEncoder::max_buffer_size(self.bit_width, self.values.len()));
    let width_bytes = ((self.bit_width as usize) + 7) / 8;
    let values = std::mem::take(&mut self.values);
    let n = values.len();
    let mut i = 0;
    while i < n {
      let mut run_len = 1;
      while i + run_len < n && values[i + run_len] == values[i] {
        run_len += 1;
      }

      if run_len >= 8 {
        let header = (run_len as i64) << 1;
        writer.put_vlq_int(header);
        writer.put_aligned::<u64>(values[i], width_bytes);
        i += run_len;
      } else {
        // Greedily absorb values until the next run of >= 8 identical
        // values (or end of input), then bit-pack them in groups of 8,
        // zero-padding the final partial group.
        let start = i;
        let mut j = i;
        while j < n {
          let mut rl = 1;
          while j + rl < n && values[j + rl] == values[j] {
            rl += 1;
          }
          if rl >= 8 {
            break;
          }
          j += 1;
        }
        let count = j - start;
        let num_groups = (count + 7) / 8;
        let header = ((num_groups as i64) << 1) | 1;
        writer.put_vlq_int(header);
        let mut padded = Vec::with_capacity(num_groups * 8);
        padded.extend_from_slice(&values[start..start + count]);
        padded.resize(num_groups * 8, 0);
        writer.put_batch(&padded, self.bit_width as usize);
        i = start + count;
      }
    }

    writer.consume()
  }
}

/// Decodes a byte run produced by `RleEncoder`.
pub struct RleDecoder {
  bit_width: u8,
  bit_reader: Option<BitReader>,
  rle_left: usize,
  rle_value: u64,
  bit_packed_left: usize
}

impl RleDecoder {
  pub fn new(bit_width: u8) -> Self {
    RleDecoder { bit_width, bit_reader: None, rle_left: 0, rle_value: 0, bit_packed_left: 0 }
  }

  pub fn set_data(&mut self, data: ByteBufferPtr) {
    self.bit_reader = Some(BitReader::new(data));
    self.rle_left = 0;
    self.bit_packed_left = 0;
  }

  fn width_bytes(&self) -> usize {
    ((self.bit_width as usize) + 7) / 8
  }

  /// Fills `buffer` with as many decoded values as are available, returning
  /// the count actually written.
  pub fn get_batch<T: crate::util::bit_util::FromBits>(&mut self, buffer: &mut [T]) -> Result<usize> {
    let mut written = 0;
    while written < buffer.len() {
      if self.rle_left > 0 {
        let take = std::cmp::min(self.rle_left, buffer.len() - written);
        for k in 0..take {
          buffer[written + k] = T::from_u64(self.rle_value);
        }
        written += take;
        self.rle_left -= take;
        continue;
      }
      if self.bit_packed_left > 0 {
        let reader = self.bit_reader.as_mut().expect("set_data() not called");
        let take = std::cmp::min(self.bit_packed_left, buffer.len() - written);
        for k in 0..take {
          let v: u64 = reader.get_value(self.bit_width as usize)
            .ok_or(eof_err!("Not enough data to decode bit-packed run"))?;
          buffer[written + k] = T::from_u64(v);
        }
        written += take;
        self.bit_packed_left -= take;
        continue;
      }

      // Need a new run header.
      let reader = self.bit_reader.as_mut().expect("set_data() not called");
      match reader.get_vlq_int() {
        None => break,
        Some(header) => {
          if header & 1 == 0 {
            self.rle_left = (header >> 1) as usize;
            self.rle_value = reader.get_aligned::<u64>(self.width_bytes())
              .ok_or(eof_err!("Not enough data to decode RLE run value"))?;
          } else {
            let num_groups = (header >> 1) as usize;
            self.bit_packed_left = num_groups * 8;
          }
        }
      }
    }
    Ok(written)
  }

  /// Like `get_batch`, but resolves each decoded index through `dict` before
  /// writing it into `buffer`. Used by dictionary-encoded data pages.
  pub fn get_batch_with_dict<T: Clone>(&mut self, dict: &[T], buffer: &mut [T], max_values: usize) -> Result<usize> {
    let n = std::cmp::min(buffer.len(), max_values);
    let mut indices = vec![0u64; n];
    let decoded = self.get_batch(&mut indices)?;
    for i in 0..decoded {
      let idx = indices[i] as usize;
      if idx >= dict.len() {
        return Err(general_err!("Dictionary index {} out of bounds (dict size {})", idx, dict.len()));
      }
      buffer[i] = dict[idx].clone();
    }
    Ok(decoded)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn round_trip(bit_width: u8, values: &[u64]) {
    let mut encoder = RleEncoder::new(bit_width);
    encoder.put_batch(values);
    let bytes = encoder.consume();

    let mut decoder = RleDecoder::new(bit_width);
    decoder.set_data(ByteBufferPtr::new(bytes));
    let mut out = vec![0u64; values.len()];
    let n = decoder.get_batch(&mut out).unwrap();
    assert_eq!(n, values.len());
    assert_eq!(out, values);
  }

  #[test]
  fn test_rle_run() {
    round_trip(3, &[5; 20]);
  }

  #[test]
  fn test_bit_packed_run() {
    round_trip(3, &[0, 1, 2, 3, 4, 5, 6, 7, 6, 5, 4, 3]);
  }

  #[test]
  fn test_mixed_runs() {
    let mut values = vec![1u64; 10];
    values.extend_from_slice(&[0, 1, 0, 1, 0, 1, 0, 1, 0]);
    values.extend(std::iter::repeat(2u64).take(16));
    round_trip(2, &values);
  }

  #[test]
  fn test_empty() {
    round_trip(4, &[]);
  }

  #[test]
  fn test_single_value() {
    round_trip(1, &[1]);
  }
}
