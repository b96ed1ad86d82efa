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

//! The file reader: opens a byte source through `footer::read_footer`, and
//! hands out one page reader per column chunk. The whole file is buffered
//! into memory once at open time so every column chunk can be read
//! independently without juggling cloned file handles -- acceptable for the
//! row-group sizes this crate targets, and the same tradeoff the writer
//! makes by buffering a row group's pages before flushing.

use std::io::{Read, Seek};
use std::sync::Arc;

use log::debug;
use thrift::protocol::TCompactInputProtocol;

use crate::basic::{Compression, Type as PhysicalType};
use crate::column::page::{Page, PageReader};
use crate::column::reader::{get_column_reader, ColumnReader};
use crate::compression::{create_codec, Codec};
use crate::errors::{ParquetError, Result};
use crate::file::footer::read_footer;
use crate::file::metadata::{encoding_from_thrift, page_type_from_thrift, ColumnChunkMetaData, ColumnIndex, FileMetaData, OffsetIndex, RowGroupMetaData};
use crate::file::properties::ReaderProperties;
use crate::file::statistics::Statistics;
use crate::record::{reconstruct, ColumnTriples, Row, RowField};
use crate::schema::types::SchemaDescriptor;

/// Opens a `FileMetaData`-described layout and serves row groups/column
/// chunks out of it. `R` only needs to be `Read + Seek` at open time; the
/// file's bytes are copied into an `Arc<Vec<u8>>` so row groups can be read
/// independently (and out of order) afterwards.
pub struct SerializedFileReader {
  data: Arc<Vec<u8>>,
  metadata: FileMetaData,
  properties: ReaderProperties
}

impl SerializedFileReader {
  pub fn new<R: Read + Seek>(reader: R) -> Result<Self> {
    Self::new_with_properties(reader, ReaderProperties::default())
  }

  pub fn new_with_properties<R: Read + Seek>(mut reader: R, properties: ReaderProperties) -> Result<Self> {
    let (metadata, _footer_start) = read_footer(&mut reader)?;
    reader.seek(std::io::SeekFrom::Start(0))?;
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    debug!("opened file with {} row groups, {} bytes", metadata.num_row_groups(), data.len());
    Ok(SerializedFileReader { data: Arc::new(data), metadata, properties })
  }
}

/// Top-level read access to a file's footer and row groups.
pub trait FileReader {
  fn metadata(&self) -> &FileMetaData;

  fn num_row_groups(&self) -> usize;

  fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>>;

  /// Reads every row group and reconstructs the full set of records. For
  /// large files prefer `get_row_group`/`get_column_reader` and consume
  /// pages incrementally instead.
  fn get_rows(&self) -> Result<Vec<Row>>;

  /// Locates the row group covering absolute row `row` by walking
  /// cumulative per-row-group counts, returning it alongside the row's
  /// position within that row group. Touches no page.
  fn seek_to_row(&self, row: i64) -> Result<(Box<dyn RowGroupReader + '_>, i64)>;
}

impl FileReader for SerializedFileReader {
  fn metadata(&self) -> &FileMetaData {
    &self.metadata
  }

  fn num_row_groups(&self) -> usize {
    self.metadata.num_row_groups()
  }

  fn get_row_group(&self, i: usize) -> Result<Box<dyn RowGroupReader + '_>> {
    let rg_meta = self.metadata.row_group(i).clone();
    Ok(Box::new(SerializedRowGroupReader { data: self.data.clone(), metadata: rg_meta, properties: self.properties.clone() }))
  }

  fn get_rows(&self) -> Result<Vec<Row>> {
    let schema = self.metadata.schema_descr();
    let mut rows = Vec::new();
    for i in 0..self.num_row_groups() {
      let rg = self.get_row_group(i)?;
      rows.extend(rg.read_rows(schema)?);
    }
    Ok(rows)
  }

  fn seek_to_row(&self, row: i64) -> Result<(Box<dyn RowGroupReader + '_>, i64)> {
    if row < 0 {
      return Err(general_err!("row {} is negative", row));
    }
    let mut cum = 0i64;
    for i in 0..self.num_row_groups() {
      let rg_rows = self.metadata.row_group(i).num_rows();
      if row < cum + rg_rows {
        return Ok((self.get_row_group(i)?, row - cum));
      }
      cum += rg_rows;
    }
    Err(general_err!("row {} is out of range ({} total rows)", row, cum))
  }
}

/// Read access to one row group's column chunks.
pub trait RowGroupReader {
  fn metadata(&self) -> &RowGroupMetaData;

  fn num_rows(&self) -> i64;

  fn num_columns(&self) -> usize;

  fn get_column_reader(&self, i: usize) -> Result<ColumnReader>;

  fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader>>;

  /// The column's parsed `OffsetIndex`, if the writer persisted one.
  fn get_offset_index(&self, i: usize) -> Result<Option<OffsetIndex>>;

  /// The column's parsed `ColumnIndex`, if the writer persisted one.
  fn get_column_index(&self, i: usize) -> Result<Option<ColumnIndex>>;

  /// A page reader over column `i` that starts at the first page covering
  /// `row_in_group`, per the column's `OffsetIndex`, without decoding any
  /// data page strictly before it. A dictionary page, if the column has
  /// one, is always surfaced first since dictionary-encoded data pages
  /// cannot be decoded without it. Falls back to the first page if the
  /// column has no offset index.
  fn get_column_page_reader_at_row(&self, i: usize, row_in_group: i64) -> Result<Box<dyn PageReader>>;

  /// A page reader over column `i` that skips every data page whose
  /// `ColumnIndex` entry fails `keep(min, max, is_null_page)`, without
  /// decoding it. Pages with no column index coverage are always kept, as
  /// are null pages (there is no min/max to evaluate the predicate
  /// against). The dictionary page, if any, is always surfaced first.
  fn get_column_page_reader_filtered(&self, i: usize, keep: &dyn Fn(&[u8], &[u8]) -> bool) -> Result<Box<dyn PageReader>>;

  /// Reads every column chunk in this row group and reconstructs it into
  /// full records via the shredding engine's `reconstruct`.
  fn read_rows(&self, schema: &SchemaDescriptor) -> Result<Vec<Row>>;
}

struct SerializedRowGroupReader {
  data: Arc<Vec<u8>>,
  metadata: RowGroupMetaData,
  properties: ReaderProperties
}

impl SerializedRowGroupReader {
  fn chunk_byte_range(chunk: &ColumnChunkMetaData) -> (usize, usize) {
    let start = chunk.dictionary_page_offset().unwrap_or_else(|| chunk.data_page_offset()) as usize;
    (start, start + chunk.total_compressed_size() as usize)
  }
}

impl RowGroupReader for SerializedRowGroupReader {
  fn metadata(&self) -> &RowGroupMetaData {
    &self.metadata
  }

  fn num_rows(&self) -> i64 {
    self.metadata.num_rows()
  }

  fn num_columns(&self) -> usize {
    self.metadata.num_columns()
  }

  fn get_column_reader(&self, i: usize) -> Result<ColumnReader> {
    let page_reader = self.get_column_page_reader(i)?;
    Ok(get_column_reader(self.metadata.column(i).column_descr().clone(), page_reader))
  }

  fn get_column_page_reader(&self, i: usize) -> Result<Box<dyn PageReader>> {
    let chunk = self.metadata.column(i);
    let (start, end) = Self::chunk_byte_range(chunk);
    let reader = SerializedPageReader::new(self.data.clone(), start, end, chunk.compression(), chunk.column_descr().physical_type())?;
    Ok(Box::new(reader))
  }

  fn get_offset_index(&self, i: usize) -> Result<Option<OffsetIndex>> {
    let chunk = self.metadata.column(i);
    match (chunk.offset_index_offset(), chunk.offset_index_length()) {
      (Some(offset), Some(length)) => Ok(Some(parse_offset_index(&self.data, offset, length)?)),
      _ => Ok(None)
    }
  }

  fn get_column_index(&self, i: usize) -> Result<Option<ColumnIndex>> {
    let chunk = self.metadata.column(i);
    match (chunk.column_index_offset(), chunk.column_index_length()) {
      (Some(offset), Some(length)) => Ok(Some(parse_column_index(&self.data, offset, length)?)),
      _ => Ok(None)
    }
  }

  fn get_column_page_reader_at_row(&self, i: usize, row_in_group: i64) -> Result<Box<dyn PageReader>> {
    let chunk = self.metadata.column(i);
    let offset_index = self.get_offset_index(i)?;
    let target_page = match &offset_index {
      Some(oi) => oi.page_locations.iter().rposition(|p| p.first_row_index <= row_in_group).unwrap_or(0),
      None => 0
    };

    let (start, end) = Self::chunk_byte_range(chunk);
    let mut inner = SerializedPageReader::new(self.data.clone(), start, end, chunk.compression(), chunk.column_descr().physical_type())?;
    let pending_dictionary = take_dictionary_page(chunk, &mut inner)?;

    for _ in 0..target_page {
      inner.skip_next_page()?;
    }

    Ok(Box::new(SeekedPageReader { inner, pending_dictionary }))
  }

  fn get_column_page_reader_filtered(&self, i: usize, keep: &dyn Fn(&[u8], &[u8]) -> bool) -> Result<Box<dyn PageReader>> {
    let chunk = self.metadata.column(i);
    let (start, end) = Self::chunk_byte_range(chunk);
    let mut inner = SerializedPageReader::new(self.data.clone(), start, end, chunk.compression(), chunk.column_descr().physical_type())?;
    let pending_dictionary = take_dictionary_page(chunk, &mut inner)?;

    let keep_flags = match self.get_column_index(i)? {
      Some(ci) => (0..ci.null_pages.len()).map(|p| ci.null_pages[p] || keep(&ci.min_values[p], &ci.max_values[p])).collect(),
      None => Vec::new()
    };

    Ok(Box::new(FilteredPageReader { inner, pending_dictionary, keep: keep_flags, next_data_page: 0 }))
  }

  fn read_rows(&self, schema: &SchemaDescriptor) -> Result<Vec<Row>> {
    let num_rows = self.num_rows();
    let mut columns = Vec::with_capacity(self.num_columns());
    for i in 0..self.num_columns() {
      let chunk = self.metadata.column(i);
      let mut column_reader = self.get_column_reader(i)?;
      columns.push(read_column_triples(&mut column_reader, i, chunk.num_values() as usize)?);
    }
    debug!("reconstructed row group of {} rows from {} columns", num_rows, columns.len());
    Ok(reconstruct(schema, &columns))
  }
}

/// Pulls `(value, rep_level, def_level)` triples out of one column's worth
/// of decoded pages, converting decoded primitives into `RowField`s via the
/// same logical-type-aware conversions the record API exposes on the write
/// side in reverse (`RowField::convert_*`).
fn read_column_triples(column_reader: &mut ColumnReader, column_index: usize, num_values: usize) -> Result<ColumnTriples> {
  macro_rules! read_variant {
    ($reader:expr, $default:expr, $convert:expr) => {{
      let descr = $reader.descr().clone();
      let max_def = descr.max_def_level();
      let max_rep = descr.max_rep_level();
      let mut def_levels = vec![0i16; num_values];
      let mut rep_levels = vec![0i16; num_values];
      let mut values = vec![$default; num_values];
      let (values_read, levels_read) = $reader.read_batch(
        num_values,
        if max_def > 0 { Some(&mut def_levels[..]) } else { None },
        if max_rep > 0 { Some(&mut rep_levels[..]) } else { None },
        &mut values
      )?;
      let total = if max_def > 0 { levels_read } else { values_read };
      let mut entries = Vec::with_capacity(total);
      let mut vi = 0usize;
      for i in 0..total {
        let d = if max_def > 0 { def_levels[i] } else { max_def };
        let r = if max_rep > 0 { rep_levels[i] } else { 0 };
        if d == max_def {
          entries.push((Some($convert(values[vi].clone())), r, d));
          vi += 1;
        } else {
          entries.push((None, r, d));
        }
      }
      entries
    }};
  }

  let entries = match column_reader {
    ColumnReader::BoolColumnReader(r) => {
      let physical_type = r.descr().physical_type();
      let logical_type = r.descr().primitive_type().logical_type();
      read_variant!(r, false, |v| RowField::convert_bool(physical_type, logical_type, v))
    },
    ColumnReader::Int32ColumnReader(r) => {
      let physical_type = r.descr().physical_type();
      let logical_type = r.descr().primitive_type().logical_type();
      let scale = r.descr().primitive_type().get_scale();
      let precision = r.descr().primitive_type().get_precision();
      read_variant!(r, 0i32, |v| if logical_type == crate::basic::LogicalType::DECIMAL {
        RowField::convert_int32_decimal(v, scale, precision)
      } else {
        RowField::convert_int32(physical_type, logical_type, v)
      })
    },
    ColumnReader::Int64ColumnReader(r) => {
      let physical_type = r.descr().physical_type();
      let logical_type = r.descr().primitive_type().logical_type();
      let scale = r.descr().primitive_type().get_scale();
      let precision = r.descr().primitive_type().get_precision();
      read_variant!(r, 0i64, |v| if logical_type == crate::basic::LogicalType::DECIMAL {
        RowField::convert_int64_decimal(v, scale, precision)
      } else {
        RowField::convert_int64(physical_type, logical_type, v)
      })
    },
    ColumnReader::Int96ColumnReader(r) => {
      let physical_type = r.descr().physical_type();
      let logical_type = r.descr().primitive_type().logical_type();
      read_variant!(r, crate::data_type::Int96::new(), |v| RowField::convert_int96(physical_type, logical_type, v))
    },
    ColumnReader::FloatColumnReader(r) => {
      let physical_type = r.descr().physical_type();
      let logical_type = r.descr().primitive_type().logical_type();
      read_variant!(r, 0f32, |v| RowField::convert_float(physical_type, logical_type, v))
    },
    ColumnReader::DoubleColumnReader(r) => {
      let physical_type = r.descr().physical_type();
      let logical_type = r.descr().primitive_type().logical_type();
      read_variant!(r, 0f64, |v| RowField::convert_double(physical_type, logical_type, v))
    },
    ColumnReader::ByteArrayColumnReader(r) => {
      let physical_type = r.descr().physical_type();
      let logical_type = r.descr().primitive_type().logical_type();
      let scale = r.descr().primitive_type().get_scale();
      let precision = r.descr().primitive_type().get_precision();
      read_variant!(r, crate::data_type::ByteArray::new(), |v: crate::data_type::ByteArray| if logical_type
        == crate::basic::LogicalType::DECIMAL
      {
        RowField::convert_byte_array_decimal(v, scale, precision)
      } else {
        RowField::convert_byte_array(physical_type, logical_type, v)
      })
    },
    ColumnReader::FixedLenByteArrayColumnReader(r) => {
      let physical_type = r.descr().physical_type();
      let logical_type = r.descr().primitive_type().logical_type();
      let scale = r.descr().primitive_type().get_scale();
      let precision = r.descr().primitive_type().get_precision();
      read_variant!(r, crate::data_type::ByteArray::new(), |v: crate::data_type::ByteArray| if logical_type
        == crate::basic::LogicalType::DECIMAL
      {
        RowField::convert_byte_array_decimal(v, scale, precision)
      } else {
        RowField::convert_byte_array(physical_type, logical_type, v)
      })
    }
  };

  Ok(ColumnTriples { column_index, entries })
}

fn parse_offset_index(data: &[u8], offset: i64, length: i32) -> Result<OffsetIndex> {
  let mut slice: &[u8] = &data[offset as usize..(offset as usize + length as usize)];
  let mut iprot = TCompactInputProtocol::new(&mut slice);
  let thrift_oi = crate::parquet_thrift::OffsetIndex::read_from_in_protocol(&mut iprot)?;
  Ok(OffsetIndex::from_thrift(thrift_oi))
}

fn parse_column_index(data: &[u8], offset: i64, length: i32) -> Result<ColumnIndex> {
  let mut slice: &[u8] = &data[offset as usize..(offset as usize + length as usize)];
  let mut iprot = TCompactInputProtocol::new(&mut slice);
  let thrift_ci = crate::parquet_thrift::ColumnIndex::read_from_in_protocol(&mut iprot)?;
  Ok(ColumnIndex::from_thrift(thrift_ci))
}

/// If `chunk` has a dictionary page, reads it off `inner` (it always comes
/// first in the byte layout) so it can be replayed ahead of a seek target;
/// callers that don't seek never need this.
fn take_dictionary_page(chunk: &ColumnChunkMetaData, inner: &mut SerializedPageReader) -> Result<Option<Page>> {
  if chunk.dictionary_page_offset().is_none() {
    return Ok(None);
  }
  match inner.next() {
    Some(Ok(page)) => Ok(Some(page)),
    Some(Err(e)) => Err(e),
    None => Ok(None)
  }
}

/// Wraps a page reader so a buffered dictionary page is served first,
/// ahead of whatever page `inner`'s cursor has already been skipped to.
struct SeekedPageReader {
  inner: SerializedPageReader,
  pending_dictionary: Option<Page>
}

impl Iterator for SeekedPageReader {
  type Item = Result<Page>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(page) = self.pending_dictionary.take() {
      return Some(Ok(page));
    }
    self.inner.next()
  }
}

impl PageReader for SeekedPageReader {
  fn skip_next_page(&mut self) -> Result<bool> {
    if self.pending_dictionary.take().is_some() {
      return Ok(true);
    }
    self.inner.skip_next_page()
  }
}

/// Wraps a page reader so data pages the `ColumnIndex` rules out of a
/// predicate are skipped rather than decoded, while a buffered dictionary
/// page (if any) is still served first.
struct FilteredPageReader {
  inner: SerializedPageReader,
  pending_dictionary: Option<Page>,
  keep: Vec<bool>,
  next_data_page: usize
}

impl FilteredPageReader {
  fn advance_past_skipped(&mut self) -> Result<()> {
    while self.next_data_page < self.keep.len() && !self.keep[self.next_data_page] {
      self.inner.skip_next_page()?;
      self.next_data_page += 1;
    }
    Ok(())
  }
}

impl Iterator for FilteredPageReader {
  type Item = Result<Page>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(page) = self.pending_dictionary.take() {
      return Some(Ok(page));
    }
    if let Err(e) = self.advance_past_skipped() {
      return Some(Err(e));
    }
    if self.next_data_page < self.keep.len() {
      self.next_data_page += 1;
    }
    self.inner.next()
  }
}

impl PageReader for FilteredPageReader {
  fn skip_next_page(&mut self) -> Result<bool> {
    if self.pending_dictionary.take().is_some() {
      return Ok(true);
    }
    if let Err(e) = self.advance_past_skipped() {
      return Err(e);
    }
    if self.next_data_page < self.keep.len() {
      self.next_data_page += 1;
    }
    self.inner.skip_next_page()
  }
}

/// Pulls pages out of one column chunk's byte range: parses each
/// thrift-compact page header, decompresses the body, and validates the
/// CRC when the header carries one.
struct SerializedPageReader {
  data: Arc<Vec<u8>>,
  cursor: usize,
  end: usize,
  codec: Option<Box<dyn Codec>>,
  physical_type: PhysicalType
}

impl SerializedPageReader {
  fn new(data: Arc<Vec<u8>>, start: usize, end: usize, compression: Compression, physical_type: PhysicalType) -> Result<Self> {
    Ok(SerializedPageReader { data, cursor: start, end, codec: create_codec(compression)?, physical_type })
  }

  /// Parses the next page header in place, advancing `self.cursor` by
  /// exactly the bytes the thrift decoder consumed (measured by how much
  /// the borrowed slice shrank, rather than a separate byte counter).
  fn read_header(&mut self) -> Result<Option<crate::parquet_thrift::PageHeader>> {
    if self.cursor >= self.end {
      return Ok(None);
    }
    let mut slice: &[u8] = &self.data[self.cursor..self.end];
    let before = slice.len();
    let header = {
      let mut iprot = TCompactInputProtocol::new(&mut slice);
      crate::parquet_thrift::PageHeader::read_from_in_protocol(&mut iprot)?
    };
    self.cursor += before - slice.len();
    Ok(Some(header))
  }

  fn read_page_body(&mut self, header: &crate::parquet_thrift::PageHeader) -> Result<crate::util::memory::ByteBufferPtr> {
    let compressed_size = header.compressed_page_size as usize;
    if self.cursor + compressed_size > self.end {
      return Err(eof_err!("column chunk ended in the middle of a page body"));
    }
    let compressed = &self.data[self.cursor..self.cursor + compressed_size];
    if let Some(expected) = header.crc {
      let actual = crc32c::crc32c(compressed) as i32;
      if actual != expected {
        return Err(ParquetError::ChecksumMismatch(format!("page CRC mismatch: header says {}, computed {}", expected, actual)));
      }
    }
    let mut uncompressed = Vec::with_capacity(header.uncompressed_page_size as usize);
    match &mut self.codec {
      Some(codec) => codec.decompress(compressed, &mut uncompressed)?,
      None => uncompressed.extend_from_slice(compressed)
    }
    self.cursor += compressed_size;
    Ok(crate::util::memory::ByteBufferPtr::new(uncompressed))
  }

  fn build_page(&self, header: crate::parquet_thrift::PageHeader, buf: crate::util::memory::ByteBufferPtr) -> Result<Page> {
    match page_type_from_thrift(header.type_) {
      crate::basic::PageType::DATA_PAGE_V1 => {
        let dph = header.data_page_header.ok_or_else(|| general_err!("DATA_PAGE header is missing its DataPageHeader"))?;
        let statistics = dph.statistics.as_ref().map(|s| Statistics::from_thrift(self.physical_type, s)).transpose()?;
        Ok(Page::DataPage {
          buf,
          num_values: dph.num_values as u32,
          encoding: encoding_from_thrift(dph.encoding),
          def_level_encoding: encoding_from_thrift(dph.definition_level_encoding),
          rep_level_encoding: encoding_from_thrift(dph.repetition_level_encoding),
          statistics
        })
      },
      crate::basic::PageType::DICTIONARY_PAGE => {
        let dph = header.dictionary_page_header.ok_or_else(|| general_err!("DICTIONARY_PAGE header is missing its DictionaryPageHeader"))?;
        Ok(Page::DictionaryPage { buf, num_values: dph.num_values as u32, encoding: encoding_from_thrift(dph.encoding), is_sorted: dph.is_sorted.unwrap_or(false) })
      },
      crate::basic::PageType::DATA_PAGE_V2 => {
        let dph = header.data_page_header_v2.ok_or_else(|| general_err!("DATA_PAGE_V2 header is missing its DataPageHeaderV2"))?;
        let statistics = dph.statistics.as_ref().map(|s| Statistics::from_thrift(self.physical_type, s)).transpose()?;
        Ok(Page::DataPageV2 {
          buf,
          num_values: dph.num_values as u32,
          num_nulls: dph.num_nulls as u32,
          num_rows: dph.num_rows as u32,
          encoding: encoding_from_thrift(dph.encoding),
          def_levels_byte_len: dph.definition_levels_byte_length as u32,
          rep_levels_byte_len: dph.repetition_levels_byte_length as u32,
          is_compressed: dph.is_compressed.unwrap_or(true),
          statistics
        })
      },
      crate::basic::PageType::INDEX_PAGE => Err(nyi_err!("index pages are not exposed through PageReader")),
    }
  }
}

impl Iterator for SerializedPageReader {
  type Item = Result<Page>;

  fn next(&mut self) -> Option<Self::Item> {
    let header = match self.read_header() {
      Ok(Some(h)) => h,
      Ok(None) => return None,
      Err(e) => return Some(Err(e))
    };
    let buf = match self.read_page_body(&header) {
      Ok(b) => b,
      Err(e) => return Some(Err(e))
    };
    Some(self.build_page(header, buf))
  }
}

impl PageReader for SerializedPageReader {
  fn skip_next_page(&mut self) -> Result<bool> {
    let header = match self.read_header()? {
      Some(h) => h,
      None => return Ok(false)
    };
    let compressed_size = header.compressed_page_size as usize;
    if self.cursor + compressed_size > self.end {
      return Err(eof_err!("column chunk ended in the middle of a page body"));
    }
    self.cursor += compressed_size;
    Ok(true)
  }
}
