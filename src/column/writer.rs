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

//! The per-leaf column buffer: accepts shredded `(value, rep, def)`
//! triples, tracks statistics, supports lockstep sorting across a row
//! group's columns, and emits pages bounded by a configured byte budget.

use log::debug;

use crate::basic::{Encoding, Type as PhysicalType};
use crate::bloom_filter::SplitBlockBloomFilter;
use crate::data_type::{AsBytes, DataType};
use crate::encodings::encoding::{get_encoder, DictEncoder, Encoder};
use crate::encodings::levels::LevelEncoder;
use crate::encodings::plain_codec::PlainCodec;
use crate::errors::Result;
use crate::file::statistics::{ColumnStatsValue, Statistics};
use crate::schema::types::ColumnDescPtr;
use crate::util::memory::ByteBufferPtr;

/// One buffered, not-yet-flushed data page: levels plus values, already
/// counted against the page's byte budget.
struct PageBuffer<T: DataType> {
  values: Vec<T::T>,
  def_levels: Vec<i16>,
  rep_levels: Vec<i16>,
  num_nulls: u64
}

impl<T: DataType> PageBuffer<T> {
  fn new() -> Self {
    PageBuffer { values: Vec::new(), def_levels: Vec::new(), rep_levels: Vec::new(), num_nulls: 0 }
  }

  fn is_empty(&self) -> bool {
    self.def_levels.is_empty() && self.values.is_empty()
  }
}

/// Generic, type-monomorphic column writer. Dispatch across the eight
/// physical types happens once, at construction (via the `ColumnWriter`
/// enum below): dispatch once per page, not per value.
pub struct ColumnWriterImpl<T: DataType + PlainCodec + ColumnStatsValue> {
  descr: ColumnDescPtr,
  page_buffer_size: usize,
  dictionary_page_size_limit: usize,

  page: PageBuffer<T>,
  encoder: Option<Box<dyn Encoder<T>>>,
  dict_encoder: Option<DictEncoder<T>>,
  fallback_encoding: Encoding,

  rows_written: u64,
  rows_in_page: u64,
  total_bytes_written: u64,
  num_buffered_values: u64,

  min: Option<T::T>,
  max: Option<T::T>,
  null_count: u64,

  bloom_filter: Option<SplitBlockBloomFilter>,

  /// Only meaningful for `ColumnWriterImpl<Int96Type>`; gates whether
  /// `ColumnWriter::write_triple` accepts a `RowField::Int96` for this
  /// column. Mirrors `WriterProperties::enable_int96_writes`.
  enable_int96_writes: bool,

  finished_pages: Vec<FinishedPage>
}

/// A page's already-encoded bytes plus the header fields the page writer and
/// offset index need, independent of physical type.
pub struct FinishedPage {
  pub encoding: Encoding,
  pub def_levels: Option<ByteBufferPtr>,
  pub rep_levels: Option<ByteBufferPtr>,
  pub values: ByteBufferPtr,
  pub num_values: u32,
  pub statistics: Option<Statistics>
}

impl<T: DataType + PlainCodec + ColumnStatsValue> ColumnWriterImpl<T>
where
  T::T: AsBytes
{
  pub fn new(
    descr: ColumnDescPtr,
    page_buffer_size: usize,
    dictionary_page_size_limit: usize,
    use_dictionary: bool,
    bloom_filter_bits: Option<usize>,
    enable_int96_writes: bool
  ) -> Self {
    let (encoder, dict_encoder) = if use_dictionary {
      (None, Some(DictEncoder::<T>::new()))
    } else {
      (Some(get_encoder::<T>(Encoding::PLAIN).expect("PLAIN encoder is always available")), None)
    };
    ColumnWriterImpl {
      descr,
      page_buffer_size,
      dictionary_page_size_limit,
      page: PageBuffer::new(),
      encoder,
      dict_encoder,
      fallback_encoding: Encoding::PLAIN,
      rows_written: 0,
      rows_in_page: 0,
      total_bytes_written: 0,
      num_buffered_values: 0,
      min: None,
      max: None,
      null_count: 0,
      bloom_filter: bloom_filter_bits.map(|bits| SplitBlockBloomFilter::new(bits / 8)),
      enable_int96_writes,
      finished_pages: Vec::new()
    }
  }

  pub fn num_rows(&self) -> u64 {
    self.rows_written
  }

  pub fn size_bytes(&self) -> u64 {
    self.total_bytes_written + self.estimated_buffered_size()
  }

  pub fn take_bloom_filter(&mut self) -> Option<SplitBlockBloomFilter> {
    self.bloom_filter.take()
  }

  fn estimated_buffered_size(&self) -> u64 {
    let value_bytes = match &self.encoder {
      Some(e) => e.estimated_data_encoded_size(),
      None => self.page.values.len() * T::get_type_size().max(1)
    };
    (value_bytes + self.page.def_levels.len() * 2 + self.page.rep_levels.len() * 2) as u64
  }

  /// Appends one column's worth of values for a single logical row: `rep`/
  /// `def` are the already-computed Dremel levels (empty when
  /// `max_repetition_level`/`max_definition_level` are both zero), and
  /// `value` is `None` exactly when `def < max_definition_level`.
  pub fn write_row(&mut self, value: Option<T::T>, rep_level: i16, def_level: i16) -> Result<()> {
    if self.page_is_full() {
      return Err(general_err!("BufferFull: page_buffer_size exceeded, flush and retry"));
    }

    if rep_level == 0 {
      self.rows_in_page += 1;
    }
    if self.descr.max_rep_level() > 0 {
      self.page.rep_levels.push(rep_level);
    }
    if self.descr.max_def_level() > 0 {
      self.page.def_levels.push(def_level);
    }

    match value {
      Some(v) => {
        self.update_stats(&v);
        if let Some(bf) = self.bloom_filter.as_mut() {
          bf.insert(&v);
        }
        if let Some(dict) = self.dict_encoder.as_mut() {
          dict.put(std::slice::from_ref(&v))?;
          if dict.dict_encoded_size() > self.dictionary_page_size_limit {
            self.fall_back_to_plain()?;
          }
        } else if let Some(enc) = self.encoder.as_mut() {
          enc.put(std::slice::from_ref(&v))?;
        }
        self.page.values.push(v);
      },
      None => {
        self.null_count += 1;
      }
    }
    self.num_buffered_values += 1;
    Ok(())
  }

  fn update_stats(&mut self, v: &T::T) {
    T::update_min_max(v, &mut self.min, &mut self.max);
  }

  fn page_is_full(&self) -> bool {
    self.estimated_buffered_size() as usize >= self.page_buffer_size
  }

  /// Re-encodes everything buffered so far through PLAIN and drops the
  /// dictionary -- subsequent pages in this row group stay on PLAIN too.
  /// Already-written pages keep whatever encoding they were written with.
  fn fall_back_to_plain(&mut self) -> Result<()> {
    debug!("dictionary page size limit exceeded for column {:?}, falling back to PLAIN", self.descr.path());
    let mut plain = get_encoder::<T>(Encoding::PLAIN)?;
    plain.put(&self.page.values)?;
    self.encoder = Some(plain);
    self.dict_encoder = None;
    self.fallback_encoding = Encoding::PLAIN;
    Ok(())
  }

  /// Finalizes the current page (if non-empty) into `finished_pages` and
  /// resets buffered state. Called by the row group assembler on
  /// `BufferFull` and at row-group flush.
  pub fn flush_page(&mut self) -> Result<()> {
    if self.page.is_empty() {
      return Ok(());
    }

    let def_levels = if self.descr.max_def_level() > 0 {
      let mut enc = LevelEncoder::new(Encoding::RLE, self.descr.max_def_level(), Vec::new());
      enc.put(&self.page.def_levels)?;
      Some(enc.consume()?)
    } else {
      None
    };
    let rep_levels = if self.descr.max_rep_level() > 0 {
      let mut enc = LevelEncoder::new(Encoding::RLE, self.descr.max_rep_level(), Vec::new());
      enc.put(&self.page.rep_levels)?;
      Some(enc.consume()?)
    } else {
      None
    };

    let (values, encoding) = if let Some(dict) = self.dict_encoder.as_mut() {
      (dict.write_indices()?, Encoding::RLE_DICTIONARY)
    } else if let Some(enc) = self.encoder.as_mut() {
      let bytes = enc.flush_buffer()?;
      (bytes, enc.encoding())
    } else {
      return Err(general_err!("Column writer has neither a value encoder nor a dictionary encoder"));
    };

    let num_values = self.page.values.len() as u32 + self.page.def_levels.iter().filter(|&&d| d < self.descr.max_def_level()).count() as u32;
    let statistics = Some(T::make_statistics(self.min.take(), self.max.take(), self.null_count));

    self.total_bytes_written += values.len() as u64 + def_levels.as_ref().map_or(0, |b| b.len() as u64) + rep_levels.as_ref().map_or(0, |b| b.len() as u64);

    self.finished_pages.push(FinishedPage { encoding, def_levels, rep_levels, values, num_values, statistics });
    self.rows_written += self.rows_in_page;
    self.rows_in_page = 0;
    self.null_count = 0;
    self.page = PageBuffer::new();
    Ok(())
  }

  /// Drains the pages finished since the last call (the dictionary page, if
  /// any, is yielded separately by the caller via `write_dictionary_page`
  /// before the first data page of a row group).
  pub fn drain_pages(&mut self) -> Vec<FinishedPage> {
    std::mem::take(&mut self.finished_pages)
  }

  pub fn write_dictionary_page(&self) -> Result<Option<ByteBufferPtr>> {
    match &self.dict_encoder {
      Some(dict) => Ok(Some(dict.write_dict()?)),
      None => Ok(None)
    }
  }

  pub fn has_dictionary(&self) -> bool {
    self.dict_encoder.is_some()
  }

  pub fn dictionary_num_entries(&self) -> usize {
    self.dict_encoder.as_ref().map_or(0, |d| d.num_entries())
  }

  /// Resets all per-row-group state (called by the assembler after a flush
  /// completes and the row group's pages have been written out).
  pub fn reset(&mut self) {
    self.page = PageBuffer::new();
    self.finished_pages.clear();
    self.rows_written = 0;
    self.rows_in_page = 0;
    self.total_bytes_written = 0;
    self.num_buffered_values = 0;
    self.min = None;
    self.max = None;
    self.null_count = 0;
  }
}

/// Builds the column writer matching `descr`'s physical type. Mirrors
/// `column::reader::get_column_reader`.
pub fn get_column_writer(
  descr: ColumnDescPtr,
  page_buffer_size: usize,
  dictionary_page_size_limit: usize,
  use_dictionary: bool,
  bloom_filter_bits: Option<usize>,
  enable_int96_writes: bool
) -> ColumnWriter {
  macro_rules! build {
    ($variant:ident) => {
      ColumnWriter::$variant(ColumnWriterImpl::new(descr, page_buffer_size, dictionary_page_size_limit, use_dictionary, bloom_filter_bits, enable_int96_writes))
    };
  }
  match descr.physical_type() {
    PhysicalType::BOOLEAN => build!(BoolColumnWriter),
    PhysicalType::INT32 => build!(Int32ColumnWriter),
    PhysicalType::INT64 => build!(Int64ColumnWriter),
    PhysicalType::INT96 => build!(Int96ColumnWriter),
    PhysicalType::FLOAT => build!(FloatColumnWriter),
    PhysicalType::DOUBLE => build!(DoubleColumnWriter),
    PhysicalType::BYTE_ARRAY => build!(ByteArrayColumnWriter),
    PhysicalType::FIXED_LEN_BYTE_ARRAY => build!(FixedLenByteArrayColumnWriter)
  }
}

/// Tagged union over the eight physical types, the boundary at which the
/// row group assembler stops being generic.
pub enum ColumnWriter {
  BoolColumnWriter(ColumnWriterImpl<crate::data_type::BoolType>),
  Int32ColumnWriter(ColumnWriterImpl<crate::data_type::Int32Type>),
  Int64ColumnWriter(ColumnWriterImpl<crate::data_type::Int64Type>),
  Int96ColumnWriter(ColumnWriterImpl<crate::data_type::Int96Type>),
  FloatColumnWriter(ColumnWriterImpl<crate::data_type::FloatType>),
  DoubleColumnWriter(ColumnWriterImpl<crate::data_type::DoubleType>),
  ByteArrayColumnWriter(ColumnWriterImpl<crate::data_type::ByteArrayType>),
  FixedLenByteArrayColumnWriter(ColumnWriterImpl<crate::data_type::FixedLenByteArrayType>)
}

impl ColumnWriter {
  pub fn num_rows(&self) -> u64 {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.num_rows(),
      ColumnWriter::Int32ColumnWriter(w) => w.num_rows(),
      ColumnWriter::Int64ColumnWriter(w) => w.num_rows(),
      ColumnWriter::Int96ColumnWriter(w) => w.num_rows(),
      ColumnWriter::FloatColumnWriter(w) => w.num_rows(),
      ColumnWriter::DoubleColumnWriter(w) => w.num_rows(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.num_rows(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.num_rows()
    }
  }

  pub fn take_bloom_filter(&mut self) -> Option<SplitBlockBloomFilter> {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.take_bloom_filter(),
      ColumnWriter::Int32ColumnWriter(w) => w.take_bloom_filter(),
      ColumnWriter::Int64ColumnWriter(w) => w.take_bloom_filter(),
      ColumnWriter::Int96ColumnWriter(w) => w.take_bloom_filter(),
      ColumnWriter::FloatColumnWriter(w) => w.take_bloom_filter(),
      ColumnWriter::DoubleColumnWriter(w) => w.take_bloom_filter(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.take_bloom_filter(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.take_bloom_filter()
    }
  }

  pub fn size_bytes(&self) -> u64 {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.size_bytes(),
      ColumnWriter::Int32ColumnWriter(w) => w.size_bytes(),
      ColumnWriter::Int64ColumnWriter(w) => w.size_bytes(),
      ColumnWriter::Int96ColumnWriter(w) => w.size_bytes(),
      ColumnWriter::FloatColumnWriter(w) => w.size_bytes(),
      ColumnWriter::DoubleColumnWriter(w) => w.size_bytes(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.size_bytes(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.size_bytes()
    }
  }

  pub fn flush_page(&mut self) -> Result<()> {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.flush_page(),
      ColumnWriter::Int32ColumnWriter(w) => w.flush_page(),
      ColumnWriter::Int64ColumnWriter(w) => w.flush_page(),
      ColumnWriter::Int96ColumnWriter(w) => w.flush_page(),
      ColumnWriter::FloatColumnWriter(w) => w.flush_page(),
      ColumnWriter::DoubleColumnWriter(w) => w.flush_page(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.flush_page(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.flush_page()
    }
  }

  pub fn drain_pages(&mut self) -> Vec<FinishedPage> {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.drain_pages(),
      ColumnWriter::Int32ColumnWriter(w) => w.drain_pages(),
      ColumnWriter::Int64ColumnWriter(w) => w.drain_pages(),
      ColumnWriter::Int96ColumnWriter(w) => w.drain_pages(),
      ColumnWriter::FloatColumnWriter(w) => w.drain_pages(),
      ColumnWriter::DoubleColumnWriter(w) => w.drain_pages(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.drain_pages(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.drain_pages()
    }
  }

  pub fn write_dictionary_page(&self) -> Result<Option<ByteBufferPtr>> {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.write_dictionary_page(),
      ColumnWriter::Int32ColumnWriter(w) => w.write_dictionary_page(),
      ColumnWriter::Int64ColumnWriter(w) => w.write_dictionary_page(),
      ColumnWriter::Int96ColumnWriter(w) => w.write_dictionary_page(),
      ColumnWriter::FloatColumnWriter(w) => w.write_dictionary_page(),
      ColumnWriter::DoubleColumnWriter(w) => w.write_dictionary_page(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.write_dictionary_page(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.write_dictionary_page()
    }
  }

  pub fn has_dictionary(&self) -> bool {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.has_dictionary(),
      ColumnWriter::Int32ColumnWriter(w) => w.has_dictionary(),
      ColumnWriter::Int64ColumnWriter(w) => w.has_dictionary(),
      ColumnWriter::Int96ColumnWriter(w) => w.has_dictionary(),
      ColumnWriter::FloatColumnWriter(w) => w.has_dictionary(),
      ColumnWriter::DoubleColumnWriter(w) => w.has_dictionary(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.has_dictionary(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.has_dictionary()
    }
  }

  pub fn dictionary_num_entries(&self) -> usize {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.dictionary_num_entries(),
      ColumnWriter::Int32ColumnWriter(w) => w.dictionary_num_entries(),
      ColumnWriter::Int64ColumnWriter(w) => w.dictionary_num_entries(),
      ColumnWriter::Int96ColumnWriter(w) => w.dictionary_num_entries(),
      ColumnWriter::FloatColumnWriter(w) => w.dictionary_num_entries(),
      ColumnWriter::DoubleColumnWriter(w) => w.dictionary_num_entries(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.dictionary_num_entries(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.dictionary_num_entries()
    }
  }

  pub fn reset(&mut self) {
    match self {
      ColumnWriter::BoolColumnWriter(w) => w.reset(),
      ColumnWriter::Int32ColumnWriter(w) => w.reset(),
      ColumnWriter::Int64ColumnWriter(w) => w.reset(),
      ColumnWriter::Int96ColumnWriter(w) => w.reset(),
      ColumnWriter::FloatColumnWriter(w) => w.reset(),
      ColumnWriter::DoubleColumnWriter(w) => w.reset(),
      ColumnWriter::ByteArrayColumnWriter(w) => w.reset(),
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => w.reset()
    }
  }

  pub fn descr(&self) -> &ColumnDescPtr {
    match self {
      ColumnWriter::BoolColumnWriter(w) => &w.descr,
      ColumnWriter::Int32ColumnWriter(w) => &w.descr,
      ColumnWriter::Int64ColumnWriter(w) => &w.descr,
      ColumnWriter::Int96ColumnWriter(w) => &w.descr,
      ColumnWriter::FloatColumnWriter(w) => &w.descr,
      ColumnWriter::DoubleColumnWriter(w) => &w.descr,
      ColumnWriter::ByteArrayColumnWriter(w) => &w.descr,
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => &w.descr
    }
  }

  /// Appends one shredded value for this column, converting from the
  /// logical `RowField` the record layer produces to this column's
  /// physical `DataType::T`. `value` is `None` exactly when `def_level <
  /// descr().max_def_level()`.
  pub fn write_triple(&mut self, value: Option<&crate::record::RowField>, rep_level: i16, def_level: i16) -> Result<()> {
    use crate::record::RowField;
    macro_rules! write_typed {
      ($writer:expr, $pat:pat => $extract:expr) => {{
        let v = match value {
          None => None,
          Some($pat) => Some($extract),
          Some(other) => return Err(general_err!("value {:?} does not match this column's physical type", other))
        };
        $writer.write_row(v, rep_level, def_level)
      }};
    }
    match self {
      ColumnWriter::BoolColumnWriter(w) => write_typed!(w, RowField::Bool(b) => *b),
      ColumnWriter::Int32ColumnWriter(w) => match value {
        None => w.write_row(None, rep_level, def_level),
        Some(RowField::Int(v)) => w.write_row(Some(*v), rep_level, def_level),
        Some(RowField::Byte(v)) => w.write_row(Some(*v as i32), rep_level, def_level),
        Some(RowField::Short(v)) => w.write_row(Some(*v as i32), rep_level, def_level),
        Some(RowField::UByte(v)) => w.write_row(Some(*v as i32), rep_level, def_level),
        Some(RowField::UShort(v)) => w.write_row(Some(*v as i32), rep_level, def_level),
        Some(RowField::UInt(v)) => w.write_row(Some(*v as i32), rep_level, def_level),
        Some(RowField::Date(v)) => w.write_row(Some(*v), rep_level, def_level),
        Some(RowField::TimeMillis(v)) => w.write_row(Some(*v), rep_level, def_level),
        Some(RowField::Decimal(d)) => w.write_row(Some(d.unscaled as i32), rep_level, def_level),
        Some(other) => Err(general_err!("value {:?} does not match INT32 column", other))
      },
      ColumnWriter::Int64ColumnWriter(w) => match value {
        None => w.write_row(None, rep_level, def_level),
        Some(RowField::Long(v)) => w.write_row(Some(*v), rep_level, def_level),
        Some(RowField::ULong(v)) => w.write_row(Some(*v as i64), rep_level, def_level),
        Some(RowField::TimeMicros(v)) => w.write_row(Some(*v), rep_level, def_level),
        Some(RowField::TimestampMillis(v)) => w.write_row(Some(*v), rep_level, def_level),
        Some(RowField::TimestampMicros(v)) => w.write_row(Some(*v), rep_level, def_level),
        Some(RowField::TimestampNanos(v)) => w.write_row(Some(*v), rep_level, def_level),
        Some(RowField::Decimal(d)) => w.write_row(Some(d.unscaled as i64), rep_level, def_level),
        Some(other) => Err(general_err!("value {:?} does not match INT64 column", other))
      },
      ColumnWriter::Int96ColumnWriter(w) => match value {
        _ if !w.enable_int96_writes => Err(general_err!(
          "INT96 writes are disabled; call WriterProperties::builder().set_enable_int96_writes(true)"
        )),
        None => w.write_row(None, rep_level, def_level),
        Some(RowField::Int96(v)) => w.write_row(Some(v.clone()), rep_level, def_level),
        Some(other) => Err(general_err!("value {:?} does not match this column's physical type; write INT96 via RowField::Int96", other))
      },
      ColumnWriter::FloatColumnWriter(w) => write_typed!(w, RowField::Float(v) => *v),
      ColumnWriter::DoubleColumnWriter(w) => write_typed!(w, RowField::Double(v) => *v),
      ColumnWriter::ByteArrayColumnWriter(w) => match value {
        None => w.write_row(None, rep_level, def_level),
        Some(RowField::Str(s)) => w.write_row(Some(crate::data_type::ByteArray::from(s.as_bytes().to_vec())), rep_level, def_level),
        Some(RowField::Bytes(b)) => w.write_row(Some(b.clone()), rep_level, def_level),
        Some(RowField::Decimal(d)) => w.write_row(Some(crate::data_type::ByteArray::from(d.unscaled.to_be_bytes().to_vec())), rep_level, def_level),
        Some(other) => Err(general_err!("value {:?} does not match BYTE_ARRAY column", other))
      },
      ColumnWriter::FixedLenByteArrayColumnWriter(w) => match value {
        None => w.write_row(None, rep_level, def_level),
        Some(RowField::Bytes(b)) => w.write_row(Some(crate::data_type::ByteArray::from(b.data().to_vec())), rep_level, def_level),
        Some(RowField::Decimal(d)) => w.write_row(Some(crate::data_type::ByteArray::from(d.unscaled.to_be_bytes().to_vec())), rep_level, def_level),
        Some(other) => Err(general_err!("value {:?} does not match FIXED_LEN_BYTE_ARRAY column", other))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::types::Type as SchemaType;
  use crate::basic::{Repetition, Type as PhysicalType};
  use std::sync::Arc;

  fn leaf_descr(max_def: i16, max_rep: i16) -> ColumnDescPtr {
    let ty = SchemaType::primitive_type_builder("x", PhysicalType::INT32)
      .with_repetition(Repetition::OPTIONAL)
      .build()
      .unwrap();
    Arc::new(crate::schema::types::ColumnDescriptor::new(ty, max_def, max_rep, crate::schema::types::ColumnPath::from(vec!["x".to_string()])))
  }

  #[test]
  fn test_write_row_and_flush_page() {
    let descr = leaf_descr(1, 0);
    let mut w: ColumnWriterImpl<crate::data_type::Int32Type> = ColumnWriterImpl::new(descr, 1 << 20, 1 << 20, false, None, false);
    w.write_row(Some(1), 0, 1).unwrap();
    w.write_row(None, 0, 0).unwrap();
    w.write_row(Some(3), 0, 1).unwrap();
    w.flush_page().unwrap();
    let pages = w.drain_pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].num_values, 3);
  }

  #[test]
  fn test_dictionary_fallback_on_size_limit() {
    let descr = leaf_descr(0, 0);
    let mut w: ColumnWriterImpl<crate::data_type::Int32Type> = ColumnWriterImpl::new(descr, 1 << 20, 4, true, None, false);
    for v in 0..10 {
      w.write_row(Some(v), 0, 0).unwrap();
    }
    assert!(!w.has_dictionary());
  }
}
