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

//! Value decoders, the mirror image of `encoding`. As there, dictionary
//! decoding is owned by the column reader directly rather than reached
//! through `get_decoder`.

use std::convert::TryFrom;

use crate::basic::Encoding;
use crate::data_type::DataType;
use crate::errors::Result;
use crate::util::bit_util::{BitReader, FromBits};
use crate::util::memory::ByteBufferPtr;

use super::plain_codec::PlainCodec;
use super::rle::RleDecoder;

/// Consumes one page's encoded value bytes and yields decoded values.
pub trait Decoder<T: DataType> {
  /// Points the decoder at a fresh page body.
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()>;

  /// Decodes up to `buffer.len()` values, returning the count actually
  /// produced (fewer than requested only at end of page).
  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize>;

  /// Values not yet consumed by `get`.
  fn values_left(&self) -> usize;

  fn encoding(&self) -> Encoding;
}

/// Builds the decoder for a non-dictionary `Encoding`. `type_length` is only
/// meaningful for `FIXED_LEN_BYTE_ARRAY` columns.
pub fn get_decoder<T: DataType + PlainCodec>(encoding: Encoding, type_length: i32) -> Result<Box<dyn Decoder<T>>> {
  match encoding {
    Encoding::PLAIN => Ok(Box::new(PlainDecoder::<T>::new(type_length))),
    Encoding::RLE => Ok(Box::new(RleValueDecoder::<T>::new())),
    Encoding::DELTA_BINARY_PACKED => Ok(Box::new(DeltaBitPackDecoder::<T>::new())),
    Encoding::DELTA_LENGTH_BYTE_ARRAY => Ok(Box::new(DeltaLengthByteArrayDecoder::<T>::new())),
    Encoding::DELTA_BYTE_ARRAY => Ok(Box::new(DeltaByteArrayDecoder::<T>::new())),
    Encoding::PLAIN_DICTIONARY | Encoding::RLE_DICTIONARY => {
      Err(general_err!("Dictionary encoding must go through DictDecoder, not get_decoder"))
    },
    Encoding::BIT_PACKED => Err(nyi_err!("BIT_PACKED is only used for levels, not values"))
  }
}

pub struct PlainDecoder<T: DataType + PlainCodec> {
  reader: Option<BitReader>,
  type_length: i32,
  num_values: usize
}

impl<T: DataType + PlainCodec> PlainDecoder<T> {
  pub fn new(type_length: i32) -> Self {
    PlainDecoder { reader: None, type_length, num_values: 0 }
  }
}

impl<T: DataType + PlainCodec> Decoder<T> for PlainDecoder<T> {
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    self.reader = Some(BitReader::new(data));
    self.num_values = num_values;
    Ok(())
  }

  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    let reader = self.reader.as_mut().ok_or_else(|| general_err!("set_data() not called"))?;
    let to_read = std::cmp::min(buffer.len(), self.num_values);
    let n = T::decode_plain(reader, to_read, self.type_length, buffer)?;
    self.num_values -= n;
    Ok(n)
  }

  fn values_left(&self) -> usize {
    self.num_values
  }

  fn encoding(&self) -> Encoding {
    Encoding::PLAIN
  }
}

/// DATA_PAGE_V2 boolean values, the only value kind allowed to use the raw
/// level codec's RLE/bit-packed hybrid. Length-prefixed like `LevelDecoder`.
pub struct RleValueDecoder<T: DataType> {
  rle: RleDecoder,
  num_values: usize,
  _marker: std::marker::PhantomData<T>
}

impl<T: DataType> RleValueDecoder<T> {
  pub fn new() -> Self {
    RleValueDecoder { rle: RleDecoder::new(1), num_values: 0, _marker: std::marker::PhantomData }
  }
}

impl<T: DataType> Decoder<T> for RleValueDecoder<T>
where
  T::T: FromBits
{
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    if T::get_physical_type() != crate::basic::Type::BOOLEAN {
      return Err(general_err!("RLE value decoding is only supported for BOOLEAN"));
    }
    let len = u32::from_le_bytes(data.as_ref()[0..4].try_into().unwrap()) as usize;
    self.rle.set_data(data.range(4, len));
    self.num_values = num_values;
    Ok(())
  }

  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    let to_read = std::cmp::min(buffer.len(), self.num_values);
    let n = self.rle.get_batch(&mut buffer[..to_read])?;
    self.num_values -= n;
    Ok(n)
  }

  fn values_left(&self) -> usize {
    self.num_values
  }

  fn encoding(&self) -> Encoding {
    Encoding::RLE
  }
}

/// `RLE_DICTIONARY`/`PLAIN_DICTIONARY`: indices through the RLE/bit-packed
/// hybrid (one leading bit-width byte), resolved through a dictionary
/// supplied out of band by the column reader.
pub struct DictDecoder<T: DataType> {
  rle: RleDecoder,
  dict: Vec<T::T>,
  num_values: usize
}

impl<T: DataType> DictDecoder<T> {
  pub fn new() -> Self {
    DictDecoder { rle: RleDecoder::new(0), dict: Vec::new(), num_values: 0 }
  }

  pub fn set_dict(&mut self, dict: Vec<T::T>) {
    self.dict = dict;
  }
}

impl<T: DataType> Decoder<T> for DictDecoder<T>
where
  T::T: Clone
{
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    let bit_width = data.as_ref()[0];
    self.rle = RleDecoder::new(bit_width);
    self.rle.set_data(data.start_from(1));
    self.num_values = num_values;
    Ok(())
  }

  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    let to_read = std::cmp::min(buffer.len(), self.num_values);
    let n = self.rle.get_batch_with_dict(&self.dict, buffer, to_read)?;
    self.num_values -= n;
    Ok(n)
  }

  fn values_left(&self) -> usize {
    self.num_values
  }

  fn encoding(&self) -> Encoding {
    Encoding::RLE_DICTIONARY
  }
}

const BLOCK_SIZE: usize = 128;
const MINIBLOCKS_PER_BLOCK: usize = 4;
const VALUES_PER_MINIBLOCK: usize = BLOCK_SIZE / MINIBLOCKS_PER_BLOCK;

/// DELTA_BINARY_PACKED. Decodes into an internal `i64` staging buffer, then
/// narrows to `T::T` -- safe because this encoding is only ever used for
/// INT32/INT64.
pub struct DeltaBitPackDecoder<T: DataType> {
  reader: Option<BitReader>,
  total_values: usize,
  values_read: usize,
  staged: Vec<i64>,
  staged_pos: usize,
  _marker: std::marker::PhantomData<T>
}

impl<T: DataType> DeltaBitPackDecoder<T> {
  pub fn new() -> Self {
    DeltaBitPackDecoder {
      reader: None,
      total_values: 0,
      values_read: 0,
      staged: Vec::new(),
      staged_pos: 0,
      _marker: std::marker::PhantomData
    }
  }

  fn decode_next_block(&mut self) -> Result<()> {
    let reader = self.reader.as_mut().expect("set_data() not called");
    let min_delta = reader.get_zigzag_vlq_int().ok_or_else(|| eof_err!("Missing block min-delta"))?;

    let mut bit_widths = [0u8; MINIBLOCKS_PER_BLOCK];
    for w in bit_widths.iter_mut() {
      *w = reader.get_aligned::<u8>(1).ok_or_else(|| eof_err!("Missing miniblock bit width"))?;
    }

    let remaining = self.total_values - self.values_read - 1;
    let mut deltas = Vec::with_capacity(BLOCK_SIZE);
    for &width in bit_widths.iter() {
      let take = std::cmp::min(VALUES_PER_MINIBLOCK, remaining.saturating_sub(deltas.len()));
      let mut raw = vec![0u64; VALUES_PER_MINIBLOCK];
      if width > 0 {
        reader.get_batch(&mut raw, width as usize);
      }
      for &r in raw.iter().take(take) {
        deltas.push((r as i64).wrapping_add(min_delta));
      }
    }

    let prev = *self.staged.last().unwrap();
    let mut acc = prev;
    for d in deltas {
      acc = acc.wrapping_add(d);
      self.staged.push(acc);
    }
    Ok(())
  }
}

impl<T: DataType> Decoder<T> for DeltaBitPackDecoder<T>
where
  T::T: TryFrom<i64>
{
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    let mut reader = BitReader::new(data);
    let _block_size = reader.get_vlq_int().ok_or_else(|| eof_err!("Missing block size"))?;
    let _miniblocks = reader.get_vlq_int().ok_or_else(|| eof_err!("Missing miniblocks per block"))?;
    let total_values = reader.get_vlq_int().ok_or_else(|| eof_err!("Missing total value count"))? as usize;
    let first_value = reader.get_zigzag_vlq_int().ok_or_else(|| eof_err!("Missing first value"))?;

    self.reader = Some(reader);
    self.total_values = total_values;
    self.values_read = 0;
    self.staged = vec![first_value];
    self.staged_pos = 0;
    let _ = num_values;
    Ok(())
  }

  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    let mut n = 0;
    while n < buffer.len() && self.values_read < self.total_values {
      if self.staged_pos >= self.staged.len() {
        self.decode_next_block()?;
      }
      while self.staged_pos < self.staged.len() && n < buffer.len() {
        let v = self.staged[self.staged_pos];
        buffer[n] = T::T::try_from(v).map_err(|_| general_err!("DELTA_BINARY_PACKED value out of range"))?;
        self.staged_pos += 1;
        self.values_read += 1;
        n += 1;
      }
    }
    Ok(n)
  }

  fn values_left(&self) -> usize {
    self.total_values - self.values_read
  }

  fn encoding(&self) -> Encoding {
    Encoding::DELTA_BINARY_PACKED
  }
}

/// DELTA_LENGTH_BYTE_ARRAY: a leading DELTA_BINARY_PACKED length stream
/// (decoded up front against an `Int32Type` sub-decoder), then raw
/// concatenated value bytes sliced out by those lengths on demand.
pub struct DeltaLengthByteArrayDecoder<T: DataType> {
  lengths: Vec<i32>,
  pos: usize,
  data: Option<ByteBufferPtr>,
  byte_offset: usize,
  num_values: usize,
  _marker: std::marker::PhantomData<T>
}

use crate::data_type::Int32Type;

impl<T: DataType> DeltaLengthByteArrayDecoder<T> {
  pub fn new() -> Self {
    DeltaLengthByteArrayDecoder {
      lengths: Vec::new(),
      pos: 0,
      data: None,
      byte_offset: 0,
      num_values: 0,
      _marker: std::marker::PhantomData
    }
  }
}

impl<T: DataType> Decoder<T> for DeltaLengthByteArrayDecoder<T>
where
  T::T: AsBytesSettable
{
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    let mut len_decoder: DeltaBitPackDecoder<Int32Type> = DeltaBitPackDecoder::new();
    len_decoder.set_data(data.all(), num_values)?;
    let mut lengths = vec![0i32; num_values];
    let n = len_decoder.get(&mut lengths)?;
    lengths.truncate(n);

    // `DeltaBitPackDecoder` has no way to report how many bytes of `data` it
    // consumed (its `BitReader` is private to it), so we re-scan the header
    // here to find the start of the raw byte payload.
    let mut probe = BitReader::new(data.all());
    let _ = probe.get_vlq_int();
    let _ = probe.get_vlq_int();
    let _ = probe.get_vlq_int();
    let _ = probe.get_zigzag_vlq_int();
    let num_blocks = (n + BLOCK_SIZE - 1) / BLOCK_SIZE.max(1);
    for _ in 0..num_blocks {
      let _ = probe.get_zigzag_vlq_int();
      let mut widths = [0u8; MINIBLOCKS_PER_BLOCK];
      for w in widths.iter_mut() {
        *w = probe.get_aligned::<u8>(1).unwrap_or(0);
      }
      let mut dummy = vec![0u64; VALUES_PER_MINIBLOCK];
      for &w in widths.iter() {
        if w > 0 {
          probe.get_batch(&mut dummy, w as usize);
        }
      }
    }

    self.lengths = lengths;
    self.pos = 0;
    self.byte_offset = probe.get_byte_offset();
    self.data = Some(data);
    self.num_values = n;
    Ok(())
  }

  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    let data = self.data.as_ref().ok_or_else(|| general_err!("set_data() not called"))?;
    let mut n = 0;
    while n < buffer.len() && self.pos < self.lengths.len() {
      let len = self.lengths[self.pos] as usize;
      let view = data.range(self.byte_offset, len);
      buffer[n] = T::T::from_bytes(view);
      self.byte_offset += len;
      self.pos += 1;
      n += 1;
    }
    Ok(n)
  }

  fn values_left(&self) -> usize {
    self.num_values - self.pos
  }

  fn encoding(&self) -> Encoding {
    Encoding::DELTA_LENGTH_BYTE_ARRAY
  }
}

/// DELTA_BYTE_ARRAY: prefix-length and suffix-length streams (each
/// DELTA_BINARY_PACKED), then concatenated suffix bytes; each value is
/// `previous[..prefix_len] + suffix`.
pub struct DeltaByteArrayDecoder<T: DataType> {
  prefix_lengths: Vec<i32>,
  suffix_lengths: Vec<i32>,
  pos: usize,
  suffix_data: Option<ByteBufferPtr>,
  suffix_offset: usize,
  previous: Vec<u8>,
  num_values: usize,
  _marker: std::marker::PhantomData<T>
}

impl<T: DataType> DeltaByteArrayDecoder<T> {
  pub fn new() -> Self {
    DeltaByteArrayDecoder {
      prefix_lengths: Vec::new(),
      suffix_lengths: Vec::new(),
      pos: 0,
      suffix_data: None,
      suffix_offset: 0,
      previous: Vec::new(),
      num_values: 0,
      _marker: std::marker::PhantomData
    }
  }

  /// Decodes one `DELTA_BINARY_PACKED` length stream starting at `data`,
  /// returning the decoded lengths and the byte offset immediately past it.
  fn read_length_stream(data: ByteBufferPtr, num_values: usize) -> Result<(Vec<i32>, usize)> {
    let mut decoder: DeltaBitPackDecoder<Int32Type> = DeltaBitPackDecoder::new();
    decoder.set_data(data.all(), num_values)?;
    let mut lengths = vec![0i32; num_values];
    let n = decoder.get(&mut lengths)?;
    lengths.truncate(n);

    let mut probe = BitReader::new(data.all());
    let _ = probe.get_vlq_int();
    let _ = probe.get_vlq_int();
    let _ = probe.get_vlq_int();
    let _ = probe.get_zigzag_vlq_int();
    let num_blocks = (n + BLOCK_SIZE - 1) / BLOCK_SIZE.max(1);
    for _ in 0..num_blocks {
      let _ = probe.get_zigzag_vlq_int();
      let mut widths = [0u8; MINIBLOCKS_PER_BLOCK];
      for w in widths.iter_mut() {
        *w = probe.get_aligned::<u8>(1).unwrap_or(0);
      }
      let mut dummy = vec![0u64; VALUES_PER_MINIBLOCK];
      for &w in widths.iter() {
        if w > 0 {
          probe.get_batch(&mut dummy, w as usize);
        }
      }
    }
    Ok((lengths, probe.get_byte_offset()))
  }
}

impl<T: DataType> Decoder<T> for DeltaByteArrayDecoder<T>
where
  T::T: AsBytesSettable
{
  fn set_data(&mut self, data: ByteBufferPtr, num_values: usize) -> Result<()> {
    let (prefix_lengths, prefix_end) = Self::read_length_stream(data.clone(), num_values)?;
    let suffix_stream = data.start_from(prefix_end);
    let (suffix_lengths, suffix_end) = Self::read_length_stream(suffix_stream.clone(), prefix_lengths.len())?;

    self.prefix_lengths = prefix_lengths;
    self.suffix_lengths = suffix_lengths;
    self.pos = 0;
    self.suffix_data = Some(suffix_stream.start_from(suffix_end));
    self.suffix_offset = 0;
    self.previous.clear();
    self.num_values = self.prefix_lengths.len();
    Ok(())
  }

  fn get(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    let suffix_data = self.suffix_data.as_ref().ok_or_else(|| general_err!("set_data() not called"))?.clone();
    let mut n = 0;
    while n < buffer.len() && self.pos < self.num_values {
      let prefix_len = self.prefix_lengths[self.pos] as usize;
      let suffix_len = self.suffix_lengths[self.pos] as usize;
      let mut value = self.previous[..prefix_len].to_vec();
      value.extend_from_slice(suffix_data.range(self.suffix_offset, suffix_len).as_ref());
      self.suffix_offset += suffix_len;
      self.previous = value.clone();
      buffer[n] = T::T::from_bytes(ByteBufferPtr::new(value));
      self.pos += 1;
      n += 1;
    }
    Ok(n)
  }

  fn values_left(&self) -> usize {
    self.num_values - self.pos
  }

  fn encoding(&self) -> Encoding {
    Encoding::DELTA_BYTE_ARRAY
  }
}

/// Lets the two delta byte-array-family decoders build a `T::T` from a
/// decoded byte range without depending on `ByteArray` directly. Implemented
/// for `ByteArray` only -- the only physical type these encodings apply to.
pub trait AsBytesSettable {
  fn from_bytes(bytes: ByteBufferPtr) -> Self;
}

impl AsBytesSettable for crate::data_type::ByteArray {
  fn from_bytes(bytes: ByteBufferPtr) -> Self {
    let mut v = crate::data_type::ByteArray::new();
    v.set_data(bytes);
    v
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data_type::Int64Type;
  use crate::encodings::encoding::{DeltaBitPackEncoder, Encoder};

  #[test]
  fn test_plain_round_trip_int32() {
    let mut enc: crate::encodings::encoding::PlainEncoder<Int32Type> = crate::encodings::encoding::PlainEncoder::new();
    enc.put(&[1, -2, 3, 4]).unwrap();
    let bytes = enc.flush_buffer().unwrap();

    let mut dec: PlainDecoder<Int32Type> = PlainDecoder::new(0);
    dec.set_data(bytes, 4).unwrap();
    let mut out = [0i32; 4];
    let n = dec.get(&mut out).unwrap();
    assert_eq!(n, 4);
    assert_eq!(out, [1, -2, 3, 4]);
  }

  #[test]
  fn test_delta_bit_pack_round_trip() {
    let values: Vec<i64> = (0..300).map(|i| i * 3 - 17).collect();
    let mut enc: DeltaBitPackEncoder<Int64Type> = DeltaBitPackEncoder::new();
    enc.put(&values).unwrap();
    let bytes = enc.flush_buffer().unwrap();

    let mut dec: DeltaBitPackDecoder<Int64Type> = DeltaBitPackDecoder::new();
    dec.set_data(bytes, values.len()).unwrap();
    let mut out = vec![0i64; values.len()];
    let n = dec.get(&mut out).unwrap();
    assert_eq!(n, values.len());
    assert_eq!(out, values);
  }
}
