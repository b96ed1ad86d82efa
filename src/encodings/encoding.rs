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

//! Value encoders. One `Encoder<T>` per `Encoding` variant, each type
//! monomorphic over a single physical type via the marker types in
//! `data_type`. Dictionary encoding is handled separately by `DictEncoder`,
//! owned directly by the column writer rather than reached through
//! `get_encoder` -- a page either is or isn't dictionary-encoded for its
//! whole lifetime, decided before any encoder is constructed.

use std::collections::HashMap;

use crate::basic::Encoding;
use crate::data_type::{AsBytes, DataType};
use crate::errors::Result;
use crate::util::bit_util::{num_required_bits, BitWriter, FromBits};
use crate::util::memory::ByteBufferPtr;

use super::plain_codec::PlainCodec;
use super::rle::RleEncoder;

/// Appends values and, on `flush_buffer`, yields one page's worth of encoded
/// bytes. Implementations buffer everything put since the last flush -- no
/// encoder in this crate streams across page boundaries.
pub trait Encoder<T: DataType> {
  fn put(&mut self, values: &[T::T]) -> Result<()>;

  /// Finalizes the buffered values into one encoded block and resets for the
  /// next page.
  fn flush_buffer(&mut self) -> Result<ByteBufferPtr>;

  fn encoding(&self) -> Encoding;

  /// Rough byte count of what `flush_buffer` would currently produce, used
  /// by the column writer to decide when a page is full.
  fn estimated_data_encoded_size(&self) -> usize;
}

/// Builds the encoder for a non-dictionary `Encoding`.
pub fn get_encoder<T: DataType + PlainCodec>(encoding: Encoding) -> Result<Box<dyn Encoder<T>>> {
  match encoding {
    Encoding::PLAIN => Ok(Box::new(PlainEncoder::<T>::new())),
    Encoding::RLE => Ok(Box::new(RleValueEncoder::<T>::new())),
    Encoding::DELTA_BINARY_PACKED => Ok(Box::new(DeltaBitPackEncoder::<T>::new())),
    Encoding::DELTA_LENGTH_BYTE_ARRAY => Ok(Box::new(DeltaLengthByteArrayEncoder::<T>::new())),
    Encoding::DELTA_BYTE_ARRAY => Ok(Box::new(DeltaByteArrayEncoder::<T>::new())),
    Encoding::PLAIN_DICTIONARY | Encoding::RLE_DICTIONARY => {
      Err(general_err!("Dictionary encoding must go through DictEncoder, not get_encoder"))
    },
    Encoding::BIT_PACKED => Err(nyi_err!("BIT_PACKED is only used for levels, not values"))
  }
}

/// PLAIN: values back to back with no framing, per `PlainCodec`.
pub struct PlainEncoder<T: DataType + PlainCodec> {
  writer: BitWriter,
  num_values: usize,
  _marker: std::marker::PhantomData<T>
}

impl<T: DataType + PlainCodec> PlainEncoder<T> {
  pub fn new() -> Self {
    PlainEncoder { writer: BitWriter::new(1024), num_values: 0, _marker: std::marker::PhantomData }
  }
}

impl<T: DataType + PlainCodec> Encoder<T> for PlainEncoder<T> {
  fn put(&mut self, values: &[T::T]) -> Result<()> {
    T::encode_plain(values, &mut self.writer);
    self.num_values += values.len();
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<ByteBufferPtr> {
    let bytes = std::mem::replace(&mut self.writer, BitWriter::new(1024)).consume();
    self.num_values = 0;
    Ok(ByteBufferPtr::new(bytes))
  }

  fn encoding(&self) -> Encoding {
    Encoding::PLAIN
  }

  fn estimated_data_encoded_size(&self) -> usize {
    self.writer.bytes_written()
  }
}

/// RLE: used for DATA_PAGE_V2's boolean column values (the only value kind
/// the format allows to use the level codec's RLE/bit-packed hybrid
/// directly). 4-byte little-endian length prefix, same framing as
/// `LevelEncoder`.
pub struct RleValueEncoder<T: DataType> {
  buffered: Vec<u64>,
  _marker: std::marker::PhantomData<T>
}

impl<T: DataType> RleValueEncoder<T> {
  pub fn new() -> Self {
    RleValueEncoder { buffered: Vec::new(), _marker: std::marker::PhantomData }
  }
}

impl<T: DataType> Encoder<T> for RleValueEncoder<T>
where
  T::T: FromBits
{
  fn put(&mut self, values: &[T::T]) -> Result<()> {
    if T::get_physical_type() != crate::basic::Type::BOOLEAN {
      return Err(general_err!("RLE value encoding is only supported for BOOLEAN"));
    }
    self.buffered.extend(values.iter().map(|v| v.to_u64()));
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<ByteBufferPtr> {
    let mut rle = RleEncoder::new(1);
    rle.put_batch(&self.buffered);
    self.buffered.clear();
    let body = rle.consume();
    let mut out = Vec::with_capacity(body.len() + 4);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    Ok(ByteBufferPtr::new(out))
  }

  fn encoding(&self) -> Encoding {
    Encoding::RLE
  }

  fn estimated_data_encoded_size(&self) -> usize {
    (self.buffered.len() + 7) / 8
  }
}

/// RLE_DICTIONARY / PLAIN_DICTIONARY. Owned directly by the column writer,
/// which falls back to PLAIN (re-encoding everything buffered so far) once
/// `dict_encoded_size` crosses `WriterProperties::dictionary_page_size_limit`.
///
/// Entries are keyed by their PLAIN byte representation rather than by
/// `T::T: Hash + Eq` -- several physical types (`f32`, `f64`) don't implement
/// `Eq`, and keying on exact bytes matches the format's definition of
/// "distinct value" (bit-identical, not numerically-equal).
pub struct DictEncoder<T: DataType + PlainCodec> {
  uniques: Vec<T::T>,
  index: HashMap<Vec<u8>, i32>,
  indices: Vec<u64>,
  dict_encoded_size: usize
}

impl<T: DataType + PlainCodec> DictEncoder<T>
where
  T::T: AsBytes
{
  pub fn new() -> Self {
    DictEncoder { uniques: Vec::new(), index: HashMap::new(), indices: Vec::new(), dict_encoded_size: 0 }
  }

  /// Looks up (or inserts) each value's dictionary index and records it.
  pub fn put(&mut self, values: &[T::T]) -> Result<()> {
    for v in values {
      let key = v.as_bytes().to_vec();
      let idx = match self.index.get(&key) {
        Some(&idx) => idx,
        None => {
          let idx = self.uniques.len() as i32;
          self.dict_encoded_size += key.len();
          self.uniques.push(v.clone());
          self.index.insert(key, idx);
          idx
        }
      };
      self.indices.push(idx as u64);
    }
    Ok(())
  }

  pub fn num_entries(&self) -> usize {
    self.uniques.len()
  }

  /// Size in bytes the dictionary page would currently take, PLAIN-encoded.
  pub fn dict_encoded_size(&self) -> usize {
    self.dict_encoded_size
  }

  fn bit_width(&self) -> u8 {
    if self.uniques.is_empty() {
      0
    } else {
      num_required_bits((self.uniques.len() - 1) as u64)
    }
  }

  /// Writes the dictionary page body (PLAIN-encoded unique values, insertion
  /// order -- the order callers have already seen via `num_entries`/indices).
  pub fn write_dict(&self) -> Result<ByteBufferPtr> {
    let mut writer = BitWriter::new(1024);
    T::encode_plain(&self.uniques, &mut writer);
    Ok(ByteBufferPtr::new(writer.consume()))
  }

  /// Writes the data page body: one leading byte giving the bit width, then
  /// the RLE/bit-packed hybrid-encoded stream of indices (matching
  /// `RleDecoder::get_batch_with_dict`'s expectations).
  pub fn write_indices(&mut self) -> Result<ByteBufferPtr> {
    let bit_width = self.bit_width();
    let mut rle = RleEncoder::new(bit_width);
    rle.put_batch(&self.indices);
    self.indices.clear();
    let body = rle.consume();
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(bit_width);
    out.extend_from_slice(&body);
    Ok(ByteBufferPtr::new(out))
  }
}

/// DELTA_BINARY_PACKED, used for INT32/INT64. One block of `BLOCK_SIZE`
/// values at a time: a zigzag-varint minimum delta, then `MINIBLOCKS_PER_BLOCK`
/// miniblocks each bit-packed at their own (byte-stored) width, values stored
/// as `delta - min_delta` so every packed value is non-negative.
pub struct DeltaBitPackEncoder<T: DataType> {
  buffered: Vec<i64>,
  first_value: Option<i64>,
  total_values: usize,
  _marker: std::marker::PhantomData<T>
}

const BLOCK_SIZE: usize = 128;
const MINIBLOCKS_PER_BLOCK: usize = 4;
const VALUES_PER_MINIBLOCK: usize = BLOCK_SIZE / MINIBLOCKS_PER_BLOCK;

impl<T: DataType> DeltaBitPackEncoder<T> {
  pub fn new() -> Self {
    DeltaBitPackEncoder { buffered: Vec::new(), first_value: None, total_values: 0, _marker: std::marker::PhantomData }
  }

  fn put_i64(&mut self, values: &[i64]) {
    for &v in values {
      if self.first_value.is_none() {
        self.first_value = Some(v);
      }
      self.buffered.push(v);
    }
    self.total_values += values.len();
  }

  fn encode_block(writer: &mut BitWriter, block: &[i64]) {
    let mut deltas = Vec::with_capacity(block.len() - 1);
    for w in block.windows(2) {
      deltas.push(w[1].wrapping_sub(w[0]));
    }
    let min_delta = deltas.iter().copied().min().unwrap_or(0);
    writer.put_zigzag_vlq_int(min_delta);

    let mut bit_widths = [0u8; MINIBLOCKS_PER_BLOCK];
    for (mb, width_slot) in bit_widths.iter_mut().enumerate() {
      let start = mb * VALUES_PER_MINIBLOCK;
      if start >= deltas.len() {
        break;
      }
      let end = std::cmp::min(start + VALUES_PER_MINIBLOCK, deltas.len());
      let max = deltas[start..end].iter().map(|&d| (d - min_delta) as u64).max().unwrap_or(0);
      *width_slot = num_required_bits(max);
    }
    for &w in &bit_widths {
      writer.put_aligned::<u8>(w, 1);
    }

    for mb in 0..MINIBLOCKS_PER_BLOCK {
      let start = mb * VALUES_PER_MINIBLOCK;
      let width = bit_widths[mb] as usize;
      let mut padded = vec![0u64; VALUES_PER_MINIBLOCK];
      if start < deltas.len() {
        let end = std::cmp::min(start + VALUES_PER_MINIBLOCK, deltas.len());
        for (i, &d) in deltas[start..end].iter().enumerate() {
          padded[i] = (d - min_delta) as u64;
        }
      }
      if width > 0 {
        writer.put_batch(&padded, width);
      }
    }
  }
}

impl<T: DataType> Encoder<T> for DeltaBitPackEncoder<T>
where
  T::T: Into<i64> + Copy
{
  fn put(&mut self, values: &[T::T]) -> Result<()> {
    let as_i64: Vec<i64> = values.iter().map(|&v| v.into()).collect();
    self.put_i64(&as_i64);
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<ByteBufferPtr> {
    let mut writer = BitWriter::new(1024);
    writer.put_vlq_int(BLOCK_SIZE as i64);
    writer.put_vlq_int(MINIBLOCKS_PER_BLOCK as i64);
    writer.put_vlq_int(self.total_values as i64);
    writer.put_zigzag_vlq_int(self.first_value.unwrap_or(0));

    let values = std::mem::take(&mut self.buffered);
    let mut i = 0;
    while i + 1 < values.len() {
      let end = std::cmp::min(i + BLOCK_SIZE + 1, values.len());
      Self::encode_block(&mut writer, &values[i..end]);
      i = end - 1;
    }

    self.first_value = None;
    self.total_values = 0;
    Ok(ByteBufferPtr::new(writer.consume()))
  }

  fn encoding(&self) -> Encoding {
    Encoding::DELTA_BINARY_PACKED
  }

  fn estimated_data_encoded_size(&self) -> usize {
    self.buffered.len() * 9
  }
}

/// DELTA_LENGTH_BYTE_ARRAY: all lengths up front via `DeltaBitPackEncoder`,
/// then every value's raw bytes concatenated with no further framing.
pub struct DeltaLengthByteArrayEncoder<T: DataType> {
  lengths: DeltaBitPackEncoder<Int32Type>,
  data: Vec<u8>,
  _marker: std::marker::PhantomData<T>
}

use crate::data_type::Int32Type;

impl<T: DataType> DeltaLengthByteArrayEncoder<T> {
  pub fn new() -> Self {
    DeltaLengthByteArrayEncoder { lengths: DeltaBitPackEncoder::new(), data: Vec::new(), _marker: std::marker::PhantomData }
  }
}

impl<T: DataType> Encoder<T> for DeltaLengthByteArrayEncoder<T>
where
  T::T: AsBytes
{
  fn put(&mut self, values: &[T::T]) -> Result<()> {
    let lens: Vec<i32> = values.iter().map(|v| v.as_bytes().len() as i32).collect();
    self.lengths.put(&lens)?;
    for v in values {
      self.data.extend_from_slice(v.as_bytes());
    }
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<ByteBufferPtr> {
    let lengths = self.lengths.flush_buffer()?;
    let mut out = Vec::with_capacity(lengths.len() + self.data.len());
    out.extend_from_slice(lengths.as_ref());
    out.extend_from_slice(&self.data);
    self.data.clear();
    Ok(ByteBufferPtr::new(out))
  }

  fn encoding(&self) -> Encoding {
    Encoding::DELTA_LENGTH_BYTE_ARRAY
  }

  fn estimated_data_encoded_size(&self) -> usize {
    self.data.len()
  }
}

/// DELTA_BYTE_ARRAY: each value stored as (bytes shared with the previous
/// value's prefix, suffix bytes), both length-streams `DELTA_BINARY_PACKED`,
/// suffix bytes concatenated after. Effective for sorted/dictionary-like
/// string columns with a lot of shared prefix.
pub struct DeltaByteArrayEncoder<T: DataType> {
  prefix_lengths: DeltaBitPackEncoder<Int32Type>,
  suffix_lengths: DeltaBitPackEncoder<Int32Type>,
  suffixes: Vec<u8>,
  previous: Vec<u8>,
  _marker: std::marker::PhantomData<T>
}

impl<T: DataType> DeltaByteArrayEncoder<T> {
  pub fn new() -> Self {
    DeltaByteArrayEncoder {
      prefix_lengths: DeltaBitPackEncoder::new(),
      suffix_lengths: DeltaBitPackEncoder::new(),
      suffixes: Vec::new(),
      previous: Vec::new(),
      _marker: std::marker::PhantomData
    }
  }
}

impl<T: DataType> Encoder<T> for DeltaByteArrayEncoder<T>
where
  T::T: AsBytes
{
  fn put(&mut self, values: &[T::T]) -> Result<()> {
    for v in values {
      let bytes = v.as_bytes();
      let shared = bytes.iter().zip(self.previous.iter()).take_while(|(a, b)| a == b).count();
      self.prefix_lengths.put(&[shared as i32])?;
      self.suffix_lengths.put(&[(bytes.len() - shared) as i32])?;
      self.suffixes.extend_from_slice(&bytes[shared..]);
      self.previous = bytes.to_vec();
    }
    Ok(())
  }

  fn flush_buffer(&mut self) -> Result<ByteBufferPtr> {
    let prefixes = self.prefix_lengths.flush_buffer()?;
    let suffixes_len = self.suffix_lengths.flush_buffer()?;
    let mut out = Vec::with_capacity(prefixes.len() + suffixes_len.len() + self.suffixes.len());
    out.extend_from_slice(prefixes.as_ref());
    out.extend_from_slice(suffixes_len.as_ref());
    out.extend_from_slice(&self.suffixes);
    self.suffixes.clear();
    self.previous.clear();
    Ok(ByteBufferPtr::new(out))
  }

  fn encoding(&self) -> Encoding {
    Encoding::DELTA_BYTE_ARRAY
  }

  fn estimated_data_encoded_size(&self) -> usize {
    self.suffixes.len() + self.previous.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data_type::{BoolType, ByteArray, ByteArrayType, Int32Type as I32, Int64Type};

  #[test]
  fn test_plain_encoder_int32() {
    let mut enc: PlainEncoder<I32> = PlainEncoder::new();
    enc.put(&[1, 2, 3, -4]).unwrap();
    let bytes = enc.flush_buffer().unwrap();
    assert_eq!(bytes.len(), 16);
  }

  #[test]
  fn test_rle_value_encoder_bool() {
    let mut enc: RleValueEncoder<BoolType> = RleValueEncoder::new();
    enc.put(&[true, true, false, true]).unwrap();
    let bytes = enc.flush_buffer().unwrap();
    assert!(bytes.len() >= 4);
  }

  #[test]
  fn test_dict_encoder_reuses_indices() {
    let mut enc: DictEncoder<ByteArrayType> = DictEncoder::new();
    enc.put(&[ByteArray::from("a"), ByteArray::from("b"), ByteArray::from("a")]).unwrap();
    assert_eq!(enc.num_entries(), 2);
  }

  #[test]
  fn test_delta_bit_pack_encoder_runs() {
    let mut enc: DeltaBitPackEncoder<Int64Type> = DeltaBitPackEncoder::new();
    enc.put(&[1i64, 2, 3, 4, 5, 100, 1]).unwrap();
    let bytes = enc.flush_buffer().unwrap();
    assert!(!bytes.is_empty());
  }
}
