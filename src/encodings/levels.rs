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

//! Repetition/definition level codec: a thin wrapper over the RLE/bit-packed
//! hybrid (`encodings::rle`) at the smallest bit width that fits
//! `max_level`, prefixed (for data page v1) with a 4-byte little-endian
//! length so the page writer can concatenate rep/def/value blocks without
//! knowing their internal structure.

use crate::basic::Encoding;
use crate::errors::Result;
use crate::util::bit_util::num_required_bits;
use crate::util::memory::ByteBufferPtr;

use super::rle::{RleDecoder, RleEncoder};

/// Encodes a run of repetition or definition levels.
pub struct LevelEncoder {
  encoding: Encoding,
  bit_width: u8,
  rle: Option<RleEncoder>,
  bit_packed: Vec<i16>
}

impl LevelEncoder {
  /// Upper bound on the encoded size (including the 4-byte length prefix
  /// used by data page v1) of `num_levels` values no greater than `max_level`.
  pub fn max_buffer_size(encoding: Encoding, max_level: i16, num_levels: usize) -> usize {
    let bit_width = num_required_bits(max_level as u64);
    match encoding {
      Encoding::RLE => RleEncoder::max_buffer_size(bit_width, num_levels) + 4,
      Encoding::BIT_PACKED => ((num_levels * bit_width as usize) + 7) / 8,
      _ => panic!("Unsupported level encoding: {}", encoding)
    }
  }

  pub fn new(encoding: Encoding, max_level: i16, _buffer: Vec<u8>) -> Self {
    let bit_width = num_required_bits(max_level as u64);
    match encoding {
      Encoding::RLE => LevelEncoder {
        encoding,
        bit_width,
        rle: Some(RleEncoder::new(bit_width)),
        bit_packed: Vec::new()
      },
      Encoding::BIT_PACKED => LevelEncoder { encoding, bit_width, rle: None, bit_packed: Vec::new() },
      _ => panic!("Unsupported level encoding: {}", encoding)
    }
  }

  pub fn put(&mut self, levels: &[i16]) -> Result<usize> {
    match self.encoding {
      Encoding::RLE => {
        let rle = self.rle.as_mut().expect("RLE encoder not initialized");
        for &l in levels {
          rle.put(l as u64);
        }
      },
      Encoding::BIT_PACKED => self.bit_packed.extend_from_slice(levels),
      _ => unreachable!()
    }
    Ok(levels.len())
  }

  /// Finalizes the block, returning the encoded bytes (length-prefixed for
  /// RLE, matching the data page v1 layout).
  pub fn consume(self) -> Result<ByteBufferPtr> {
    match self.encoding {
      Encoding::RLE => {
        let body = self.rle.expect("RLE encoder not initialized").consume();
        let mut out = Vec::with_capacity(body.len() + 4);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        Ok(ByteBufferPtr::new(out))
      },
      Encoding::BIT_PACKED => {
        let mut writer = crate::util::bit_util::BitWriter::new(
          ((self.bit_packed.len() * self.bit_width as usize) + 7) / 8);
        let values: Vec<u64> = self.bit_packed.iter().map(|&v| v as u64).collect();
        writer.put_batch(&values, self.bit_width as usize);
        Ok(ByteBufferPtr::new(writer.consume()))
      },
      _ => unreachable!()
    }
  }
}

/// Decodes a run of repetition or definition levels.
pub struct LevelDecoder {
  encoding: Encoding,
  bit_width: u8,
  max_level: i16,
  rle: Option<RleDecoder>,
  bit_reader: Option<crate::util::bit_util::BitReader>,
  bit_packed_left: usize
}

impl LevelDecoder {
  pub fn new(encoding: Encoding, max_level: i16) -> Self {
    let bit_width = num_required_bits(max_level as u64);
    LevelDecoder {
      encoding,
      bit_width,
      max_level,
      rle: Some(RleDecoder::new(bit_width)),
      bit_reader: None,
      bit_packed_left: 0
    }
  }

  /// Points the decoder at `data` (the whole remaining page body, levels
  /// first). Returns the number of bytes consumed by this level block (the
  /// 4-byte length prefix plus the RLE body, for RLE encoding), so the
  /// caller can advance past it to the next block.
  pub fn set_data(&mut self, data: ByteBufferPtr) -> usize {
    if self.max_level == 0 {
      return 0;
    }
    match self.encoding {
      Encoding::RLE => {
        let len = u32::from_le_bytes(data.as_ref()[0..4].try_into().unwrap()) as usize;
        let body = data.range(4, len);
        self.rle.as_mut().unwrap().set_data(body);
        4 + len
      },
      Encoding::BIT_PACKED => {
        self.bit_reader = Some(crate::util::bit_util::BitReader::new(data.all()));
        data.len()
      },
      _ => panic!("Unsupported level encoding: {}", self.encoding)
    }
  }

  pub fn get(&mut self, buffer: &mut [i16]) -> Result<usize> {
    if self.max_level == 0 {
      for slot in buffer.iter_mut() {
        *slot = 0;
      }
      return Ok(buffer.len());
    }
    match self.encoding {
      Encoding::RLE => self.rle.as_mut().unwrap().get_batch(buffer),
      Encoding::BIT_PACKED => {
        let reader = self.bit_reader.as_mut().expect("set_data() not called");
        Ok(reader.get_batch(buffer, self.bit_width as usize))
      },
      _ => unreachable!()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_level_round_trip_rle() {
    let levels: Vec<i16> = vec![0, 1, 2, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 2];
    let max_buf = LevelEncoder::max_buffer_size(Encoding::RLE, 2, levels.len());
    let mut encoder = LevelEncoder::new(Encoding::RLE, 2, vec![0; max_buf]);
    encoder.put(&levels).unwrap();
    let encoded = encoder.consume().unwrap();

    let mut decoder = LevelDecoder::new(Encoding::RLE, 2);
    decoder.set_data(encoded);
    let mut out = vec![0i16; levels.len()];
    let n = decoder.get(&mut out).unwrap();
    assert_eq!(n, levels.len());
    assert_eq!(out, levels);
  }

  #[test]
  fn test_level_zero_max_level() {
    let mut decoder = LevelDecoder::new(Encoding::RLE, 0);
    decoder.set_data(ByteBufferPtr::new(vec![]));
    let mut out = vec![9i16; 5];
    let n = decoder.get(&mut out).unwrap();
    assert_eq!(n, 5);
    assert_eq!(out, vec![0, 0, 0, 0, 0]);
  }
}
