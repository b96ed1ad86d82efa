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

//! The row group assembler: buffers shredded triples into per-column
//! writers, and on flush emits dictionary/data pages, builds the column and
//! offset indexes, and appends the footer.

use std::io::Write;

use log::debug;

use crate::basic::PageType;
use crate::column::page::{CompressedPage, PageWriteSpec, PageWriter};
use crate::column::writer::{get_column_writer, ColumnWriter, FinishedPage};
use crate::compression::create_codec;
use crate::errors::{is_buffer_full, is_row_group_full, Result};
use crate::file::metadata::{ColumnChunkMetaData, ColumnIndex, FileMetaData, KeyValue, OffsetIndex, PageLocation, RowGroupMetaData};
use crate::file::properties::{SortingColumn, WriterProperties};
use crate::file::statistics::Statistics;
use crate::record::{deconstruct, Row, RowField};
use crate::schema::types::SchemaDescPtr;
use crate::util::memory::ByteBufferPtr;

/// Wraps a `Write` sink, tracking the absolute byte offset written so far --
/// page/row-group offsets in the footer are relative to the start of the file.
struct TrackedWrite<W: Write> {
  inner: W,
  pos: u64
}

impl<W: Write> TrackedWrite<W> {
  fn new(inner: W) -> Self {
    TrackedWrite { inner, pos: 0 }
  }
}

impl<W: Write> Write for TrackedWrite<W> {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    let n = self.inner.write(buf)?;
    self.pos += n as u64;
    Ok(n)
  }

  fn flush(&mut self) -> std::io::Result<()> {
    self.inner.flush()
  }
}

/// Writes thrift-compact page headers and compressed page bodies to a
/// column chunk's byte range, tracking per-page offset index entries.
struct SerializedPageWriter<'a, W: Write> {
  sink: &'a mut TrackedWrite<W>,
  codec: Option<Box<dyn crate::compression::Codec>>,
  write_checksums: bool,
  total_bytes_written: u64,
  page_locations: Vec<PageLocation>,
  rows_emitted: i64
}

impl<'a, W: Write> SerializedPageWriter<'a, W> {
  fn new(sink: &'a mut TrackedWrite<W>, compression: crate::basic::Compression, write_checksums: bool) -> Result<Self> {
    Ok(SerializedPageWriter {
      sink,
      codec: create_codec(compression)?,
      write_checksums,
      total_bytes_written: 0,
      page_locations: Vec::new(),
      rows_emitted: 0
    })
  }
}

impl<'a, W: Write> PageWriter for SerializedPageWriter<'a, W> {
  fn write_page(&mut self, page: CompressedPage) -> Result<PageWriteSpec> {
    let offset = self.sink.pos;

    let mut compressed = Vec::with_capacity(page.uncompressed_size);
    match &mut self.codec {
      Some(codec) => codec.compress(page.buf.as_ref(), &mut compressed)?,
      None => compressed.extend_from_slice(page.buf.as_ref())
    }

    let crc = if self.write_checksums { Some(crc32c::crc32c(&compressed)) } else { None };
    let header = build_page_header(&page, page.uncompressed_size as i32, compressed.len() as i32, crc);

    let mut header_bytes = Vec::new();
    {
      let mut oprot = thrift::protocol::TCompactOutputProtocol::new(&mut header_bytes);
      header.write_to_out_protocol(&mut oprot)?;
    }

    self.sink.write_all(&header_bytes)?;
    self.sink.write_all(&compressed)?;
    let bytes_written = (header_bytes.len() + compressed.len()) as u64;
    self.total_bytes_written += bytes_written;

    if page.page_type == PageType::DATA_PAGE_V1 || page.page_type == PageType::DATA_PAGE_V2 {
      self.page_locations.push(PageLocation { offset: offset as i64, compressed_page_size: bytes_written as i32, first_row_index: self.rows_emitted });
      self.rows_emitted += page.num_values as i64;
    }

    Ok(PageWriteSpec { offset, bytes_written, num_values: page.num_values })
  }

  fn close(&mut self) -> Result<()> {
    self.sink.flush()?;
    Ok(())
  }
}

fn build_page_header(page: &CompressedPage, uncompressed_size: i32, compressed_size: i32, crc: Option<u32>) -> crate::parquet_thrift::PageHeader {
  use crate::file::metadata::{encoding_to_thrift, page_type_to_thrift};
  let (data_page_header, dictionary_page_header) = match page.page_type {
    PageType::DATA_PAGE_V1 => (
      Some(crate::parquet_thrift::DataPageHeader {
        num_values: page.num_values as i32,
        encoding: encoding_to_thrift(page.encoding),
        definition_level_encoding: encoding_to_thrift(page.def_level_encoding),
        repetition_level_encoding: encoding_to_thrift(page.rep_level_encoding),
        statistics: page.statistics.as_ref().map(|s| s.to_thrift())
      }),
      None
    ),
    PageType::DICTIONARY_PAGE => (
      None,
      Some(crate::parquet_thrift::DictionaryPageHeader {
        num_values: page.num_values as i32,
        encoding: encoding_to_thrift(page.encoding),
        is_sorted: Some(page.is_sorted)
      })
    ),
    _ => (None, None)
  };
  crate::parquet_thrift::PageHeader {
    type_: page_type_to_thrift(page.page_type),
    uncompressed_page_size: uncompressed_size,
    compressed_page_size: compressed_size,
    crc: crc.map(|c| c as i32),
    data_page_header,
    index_page_header: None,
    dictionary_page_header,
    data_page_header_v2: None
  }
}

/// Concatenates one finished page's level blocks ahead of its value block,
/// matching the on-disk DataPage V1 layout (repetition levels, then
/// definition levels, then encoded values -- each level block is already
/// self-delimited by a 4-byte length prefix, see `LevelEncoder::consume`).
fn page_body(page: &FinishedPage) -> ByteBufferPtr {
  let mut buf = Vec::with_capacity(page.values.len() + page.def_levels.as_ref().map_or(0, |b| b.len()) + page.rep_levels.as_ref().map_or(0, |b| b.len()));
  if let Some(rl) = &page.rep_levels {
    buf.extend_from_slice(rl.as_ref());
  }
  if let Some(dl) = &page.def_levels {
    buf.extend_from_slice(dl.as_ref());
  }
  buf.extend_from_slice(page.values.as_ref());
  ByteBufferPtr::new(buf)
}

fn min_max_bytes(stats: &Statistics) -> (Vec<u8>, Vec<u8>) {
  let t = stats.to_thrift();
  (t.min_value.or(t.min).unwrap_or_default(), t.max_value.or(t.max).unwrap_or_default())
}

/// Per-row-group column buffers and the page writer each one flushes
/// through. Consumers push records with `write_row`; `close` flushes every
/// column and returns its metadata plus the column/offset index for each.
pub struct RowGroupWriter<'a, W: Write> {
  sink: &'a mut TrackedWrite<W>,
  schema_descr: SchemaDescPtr,
  properties: WriterProperties,
  column_writers: Vec<ColumnWriter>,
  num_rows: i64,
  /// Rows held back for lockstep sorting at `close`, populated only when
  /// `properties.sorting_columns()` is non-empty -- otherwise rows are
  /// shredded straight into the column writers as they arrive.
  buffered_rows: Vec<Row>
}

impl<'a, W: Write> RowGroupWriter<'a, W> {
  fn new(sink: &'a mut TrackedWrite<W>, schema_descr: SchemaDescPtr, properties: WriterProperties) -> Self {
    let column_writers = schema_descr
      .columns()
      .iter()
      .map(|descr| {
        let path = descr.path().clone();
        let bloom_bits = properties.bloom_filter_config(&path).map(|c| c.bit_count);
        get_column_writer(
          descr.clone(),
          properties.page_buffer_size(),
          properties.dictionary_page_size_limit(),
          properties.dictionary_enabled(&path),
          bloom_bits,
          properties.enable_int96_writes()
        )
      })
      .collect();
    RowGroupWriter { sink, schema_descr, properties, column_writers, num_rows: 0, buffered_rows: Vec::new() }
  }

  /// Whether this row group has hit its configured `max_rows_per_row_group`
  /// or `byte_size_threshold` and should be closed instead of accepting more
  /// rows. Buffered-but-not-yet-shredded rows (pending a sorting-columns
  /// flush) only count against the row limit, since they haven't added to
  /// any column writer's `size_bytes()` yet.
  pub fn is_full(&self) -> bool {
    self.num_rows >= self.properties.max_rows_per_row_group() as i64 || self.total_byte_size() >= self.properties.byte_size_threshold() as u64
  }

  /// Shreds `row` against the row group's schema and appends the resulting
  /// triples to each column writer, flushing and retrying a column's page on
  /// `BufferFull` by flushing the open page in place and retrying. When
  /// `sorting_columns` is configured the row is held back instead, and fed
  /// through this same path in sorted order at `close`. Once `is_full` would
  /// return true, refuses further rows with `RowGroupFull` -- the caller
  /// closes this row group and opens a new one.
  pub fn write_row(&mut self, row: &Row) -> Result<()> {
    if self.is_full() {
      return Err(row_group_full_err!(
        "row group already has {} rows / {} bytes, limit is {} rows / {} bytes",
        self.num_rows,
        self.total_byte_size(),
        self.properties.max_rows_per_row_group(),
        self.properties.byte_size_threshold()
      ));
    }
    if self.properties.sorting_columns().is_empty() {
      self.shred_into_columns(row)?;
    } else {
      self.buffered_rows.push(row.clone());
    }
    self.num_rows += 1;
    Ok(())
  }

  fn shred_into_columns(&mut self, row: &Row) -> Result<()> {
    let columns = deconstruct(&self.schema_descr, row)?;
    for triples in &columns {
      let writer = &mut self.column_writers[triples.column_index];
      for (value, rep_level, def_level) in &triples.entries {
        loop {
          match writer.write_triple(value.as_ref(), *rep_level, *def_level) {
            Ok(()) => break,
            Err(e) if is_buffer_full(&e) => {
              debug!("page buffer full for column {}, flushing", triples.column_index);
              writer.flush_page()?;
            },
            Err(e) => return Err(e)
          }
        }
      }
    }
    Ok(())
  }

  pub fn num_rows(&self) -> i64 {
    self.num_rows
  }

  pub fn total_byte_size(&self) -> u64 {
    self.column_writers.iter().map(|w| w.size_bytes()).sum()
  }

  /// Flushes every column's buffered page, writes the dictionary page (if
  /// any) then its data pages, builds the column/offset indexes, and
  /// returns this row group's metadata alongside them.
  pub fn close(mut self) -> Result<(RowGroupMetaData, Vec<(usize, ColumnIndex, OffsetIndex)>)> {
    if !self.properties.sorting_columns().is_empty() {
      let sorting_columns = self.properties.sorting_columns().to_vec();
      self.buffered_rows.sort_by(|a, b| compare_rows(a, b, &sorting_columns));
      for row in std::mem::take(&mut self.buffered_rows) {
        self.shred_into_columns(&row)?;
      }
    }

    let mut chunk_metas = Vec::with_capacity(self.column_writers.len());
    let mut indexes = Vec::with_capacity(self.column_writers.len());

    for (i, writer) in self.column_writers.iter_mut().enumerate() {
      writer.flush_page()?;
      let descr = writer.descr().clone();
      let compression = self.properties.compression(descr.path());
      let mut page_writer = SerializedPageWriter::new(&mut *self.sink, compression, self.properties.write_page_checksums())?;

      let mut total_uncompressed_size = 0i64;
      let dictionary_page_offset = match writer.write_dictionary_page()? {
        Some(dict_bytes) => {
          let uncompressed_size = dict_bytes.len();
          total_uncompressed_size += uncompressed_size as i64;
          let spec = page_writer.write_page(CompressedPage::dictionary_page(dict_bytes, writer.dictionary_num_entries() as u32, uncompressed_size, compression))?;
          Some(spec.offset as i64)
        },
        None => None
      };

      let mut null_pages = Vec::new();
      let mut min_values = Vec::new();
      let mut max_values = Vec::new();
      let mut null_counts = Vec::new();
      let mut data_page_offset = None;
      let mut num_values = 0i64;
      let mut overall_stats: Option<Statistics> = None;
      let mut encodings = vec![crate::basic::Encoding::RLE];
      if writer.has_dictionary() {
        encodings.push(crate::basic::Encoding::PLAIN_DICTIONARY);
        encodings.push(crate::basic::Encoding::RLE_DICTIONARY);
      } else {
        encodings.push(crate::basic::Encoding::PLAIN);
      }

      for page in writer.drain_pages() {
        num_values += page.num_values as i64;
        let page_null_count = page.statistics.as_ref().map_or(0, |s| s.null_count());

        let (is_null_page, min_bytes, max_bytes) = match &page.statistics {
          Some(stats) if stats.has_min_max_set() => {
            let (min, max) = min_max_bytes(stats);
            (false, min, max)
          },
          _ => (true, Vec::new(), Vec::new())
        };
        null_pages.push(is_null_page);
        min_values.push(min_bytes);
        max_values.push(max_bytes);
        null_counts.push(page_null_count as i64);
        overall_stats = merge_statistics(overall_stats, page.statistics.clone());

        let uncompressed_size = page.values.len() + page.def_levels.as_ref().map_or(0, |b| b.len()) + page.rep_levels.as_ref().map_or(0, |b| b.len());
        total_uncompressed_size += uncompressed_size as i64;
        let compressed_page = CompressedPage::data_page(page_body(&page), page.num_values, page.encoding, uncompressed_size, compression, page.statistics.clone());
        let spec = page_writer.write_page(compressed_page)?;
        if data_page_offset.is_none() {
          data_page_offset = Some(spec.offset as i64);
        }
      }

      page_writer.close()?;

      let total_compressed_size = page_writer.total_bytes_written as i64;
      let page_locations = page_writer.page_locations.clone();

      // page_writer's borrow of self.sink ends here; safe to write the
      // bloom filter's bytes straight after the column's pages.
      let bloom_filter_offset = match writer.take_bloom_filter() {
        Some(bf) => {
          let offset = self.sink.pos as i64;
          self.sink.write_all(&bf.to_bytes())?;
          Some(offset)
        },
        None => None
      };

      let chunk = ColumnChunkMetaData::new(
        descr.clone(),
        encodings,
        compression,
        num_values,
        total_compressed_size,
        total_uncompressed_size,
        data_page_offset.unwrap_or_else(|| dictionary_page_offset.unwrap_or(0)),
        dictionary_page_offset,
        overall_stats,
        bloom_filter_offset
      );
      chunk_metas.push(chunk);
      indexes.push((i, ColumnIndex { null_pages, min_values, max_values, null_counts: Some(null_counts) }, OffsetIndex { page_locations }));
    }

    let total_byte_size = chunk_metas.iter().map(|c| c.total_compressed_size()).sum();
    let rg_meta = RowGroupMetaData::new(chunk_metas, self.num_rows, total_byte_size, self.schema_descr.clone());
    Ok((rg_meta, indexes))
  }
}

/// Folds one more page's statistics into the row group's running column
/// statistics. Works directly against the wire-shaped `Statistics` enum
/// rather than comparing encoded bytes, which would not respect each
/// physical type's ordering (two's-complement vs. IEEE-754 vs. byte-lexical).
fn merge_statistics(acc: Option<Statistics>, next: Option<Statistics>) -> Option<Statistics> {
  match (acc, next) {
    (None, b) => b,
    (a, None) => a,
    (Some(a), Some(b)) => Some(match (a, b) {
      (Statistics::Boolean { min: amin, max: amax, null_count: an, distinct_count: ad }, Statistics::Boolean { min: bmin, max: bmax, null_count: bn, .. }) => {
        Statistics::Boolean { min: min_opt(amin, bmin, |x, y| x < y), max: max_opt(amax, bmax, |x, y| x > y), null_count: an + bn, distinct_count: ad }
      },
      (Statistics::Int32 { min: amin, max: amax, null_count: an, distinct_count: ad }, Statistics::Int32 { min: bmin, max: bmax, null_count: bn, .. }) => {
        Statistics::Int32 { min: min_opt(amin, bmin, |x, y| x < y), max: max_opt(amax, bmax, |x, y| x > y), null_count: an + bn, distinct_count: ad }
      },
      (Statistics::Int64 { min: amin, max: amax, null_count: an, distinct_count: ad }, Statistics::Int64 { min: bmin, max: bmax, null_count: bn, .. }) => {
        Statistics::Int64 { min: min_opt(amin, bmin, |x, y| x < y), max: max_opt(amax, bmax, |x, y| x > y), null_count: an + bn, distinct_count: ad }
      },
      (Statistics::Float { min: amin, max: amax, null_count: an, distinct_count: ad }, Statistics::Float { min: bmin, max: bmax, null_count: bn, .. }) => {
        Statistics::Float { min: min_opt(amin, bmin, |x, y| x < y), max: max_opt(amax, bmax, |x, y| x > y), null_count: an + bn, distinct_count: ad }
      },
      (Statistics::Double { min: amin, max: amax, null_count: an, distinct_count: ad }, Statistics::Double { min: bmin, max: bmax, null_count: bn, .. }) => {
        Statistics::Double { min: min_opt(amin, bmin, |x, y| x < y), max: max_opt(amax, bmax, |x, y| x > y), null_count: an + bn, distinct_count: ad }
      },
      (Statistics::ByteArray { min: amin, max: amax, null_count: an, distinct_count: ad }, Statistics::ByteArray { min: bmin, max: bmax, null_count: bn, .. }) => {
        Statistics::ByteArray { min: min_opt(amin, bmin, |x, y| x < y), max: max_opt(amax, bmax, |x, y| x > y), null_count: an + bn, distinct_count: ad }
      },
      (
        Statistics::FixedLenByteArray { min: amin, max: amax, null_count: an, distinct_count: ad },
        Statistics::FixedLenByteArray { min: bmin, max: bmax, null_count: bn, .. }
      ) => Statistics::FixedLenByteArray { min: min_opt(amin, bmin, |x, y| x < y), max: max_opt(amax, bmax, |x, y| x > y), null_count: an + bn, distinct_count: ad },
      (Statistics::Int96 { null_count: an, .. }, Statistics::Int96 { null_count: bn, .. }) => {
        Statistics::Int96 { min: None, max: None, null_count: an + bn, distinct_count: None }
      },
      // Mismatched variants cannot occur: every page of one column chunk
      // shares the column's physical type.
      (a, _) => a
    })
  }
}

/// Orders two rows by `sorting_columns`, first column first, breaking ties
/// with the next.
fn compare_rows(a: &Row, b: &Row, sorting_columns: &[SortingColumn]) -> std::cmp::Ordering {
  use std::cmp::Ordering;
  for col in sorting_columns {
    let parts = col.path.parts();
    if parts.is_empty() {
      continue;
    }
    let ord = compare_row_field(resolve_path(a, parts), resolve_path(b, parts), col.nulls_first);
    let ord = if col.descending { ord.reverse() } else { ord };
    if ord != Ordering::Equal {
      return ord;
    }
  }
  Ordering::Equal
}

/// Walks `parts` through nested `Group` fields to the leaf named by a
/// `SortingColumn`'s full dotted path. A path that runs into a `List`/`Map`
/// before reaching its last segment has no single value to compare (the
/// column is repeated within this row), so it resolves to `None` and that
/// sort key contributes no ordering for this row pair.
fn resolve_path<'a>(row: &'a Row, parts: &[String]) -> Option<&'a RowField> {
  let (head, rest) = parts.split_first()?;
  let field = row.get(head)?;
  if rest.is_empty() {
    Some(field)
  } else if let RowField::Group(inner) = field {
    resolve_path(inner, rest)
  } else {
    None
  }
}

fn compare_row_field(a: Option<&RowField>, b: Option<&RowField>, nulls_first: bool) -> std::cmp::Ordering {
  use std::cmp::Ordering;
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => if nulls_first { Ordering::Less } else { Ordering::Greater },
    (Some(_), None) => if nulls_first { Ordering::Greater } else { Ordering::Less },
    (Some(RowField::Null), Some(RowField::Null)) => Ordering::Equal,
    (Some(RowField::Null), Some(_)) => if nulls_first { Ordering::Less } else { Ordering::Greater },
    (Some(_), Some(RowField::Null)) => if nulls_first { Ordering::Greater } else { Ordering::Less },
    (Some(RowField::Bool(x)), Some(RowField::Bool(y))) => x.cmp(y),
    (Some(RowField::Byte(x)), Some(RowField::Byte(y))) => x.cmp(y),
    (Some(RowField::Short(x)), Some(RowField::Short(y))) => x.cmp(y),
    (Some(RowField::Int(x)), Some(RowField::Int(y))) => x.cmp(y),
    (Some(RowField::Long(x)), Some(RowField::Long(y))) => x.cmp(y),
    (Some(RowField::UByte(x)), Some(RowField::UByte(y))) => x.cmp(y),
    (Some(RowField::UShort(x)), Some(RowField::UShort(y))) => x.cmp(y),
    (Some(RowField::UInt(x)), Some(RowField::UInt(y))) => x.cmp(y),
    (Some(RowField::ULong(x)), Some(RowField::ULong(y))) => x.cmp(y),
    (Some(RowField::Float(x)), Some(RowField::Float(y))) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
    (Some(RowField::Double(x)), Some(RowField::Double(y))) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
    (Some(RowField::Str(x)), Some(RowField::Str(y))) => x.cmp(y),
    (Some(RowField::Bytes(x)), Some(RowField::Bytes(y))) => x.data().cmp(y.data()),
    (Some(RowField::Date(x)), Some(RowField::Date(y))) => x.cmp(y),
    (Some(RowField::TimeMillis(x)), Some(RowField::TimeMillis(y))) => x.cmp(y),
    (Some(RowField::TimeMicros(x)), Some(RowField::TimeMicros(y))) => x.cmp(y),
    (Some(RowField::TimestampMillis(x)), Some(RowField::TimestampMillis(y))) => x.cmp(y),
    (Some(RowField::TimestampMicros(x)), Some(RowField::TimestampMicros(y))) => x.cmp(y),
    (Some(RowField::TimestampNanos(x)), Some(RowField::TimestampNanos(y))) => x.cmp(y),
    (Some(RowField::Decimal(x)), Some(RowField::Decimal(y))) => x.unscaled.cmp(&y.unscaled),
    // Group/List/Map have no total order; treat as equal so later sort
    // columns (or input order, since the sort is stable) decide.
    _ => Ordering::Equal
  }
}

fn min_opt<T, F: Fn(&T, &T) -> bool>(a: Option<T>, b: Option<T>, lt: F) -> Option<T> {
  match (a, b) {
    (Some(a), Some(b)) => Some(if lt(&a, &b) { a } else { b }),
    (Some(a), None) => Some(a),
    (None, b) => b
  }
}

fn max_opt<T, F: Fn(&T, &T) -> bool>(a: Option<T>, b: Option<T>, gt: F) -> Option<T> {
  match (a, b) {
    (Some(a), Some(b)) => Some(if gt(&a, &b) { a } else { b }),
    (Some(a), None) => Some(a),
    (None, b) => b
  }
}

/// Writes a complete file to `W`: magic, each row group's pages, that row
/// group's column/offset index sections, and -- once every row group is
/// closed -- the footer.
pub struct SerializedFileWriter<W: Write> {
  sink: TrackedWrite<W>,
  schema_descr: SchemaDescPtr,
  properties: WriterProperties,
  row_groups: Vec<RowGroupMetaData>,
  key_value_metadata: Option<Vec<KeyValue>>
}

impl<W: Write> SerializedFileWriter<W> {
  pub fn new(sink: W, schema_descr: SchemaDescPtr, properties: WriterProperties) -> Result<Self> {
    let mut sink = TrackedWrite::new(sink);
    crate::file::footer::write_magic(&mut sink)?;
    Ok(SerializedFileWriter { sink, schema_descr, properties, row_groups: Vec::new(), key_value_metadata: None })
  }

  pub fn set_key_value_metadata(&mut self, metadata: Vec<KeyValue>) {
    self.key_value_metadata = Some(metadata);
  }

  pub fn next_row_group(&mut self) -> RowGroupWriter<'_, W> {
    RowGroupWriter::new(&mut self.sink, self.schema_descr.clone(), self.properties.clone())
  }

  /// Finalizes a row group opened with `next_row_group`: writes each
  /// column's `ColumnIndex`/`OffsetIndex` into the file right after that
  /// column's pages, patches the resulting offsets/lengths into the row
  /// group's `ColumnChunkMetaData`, and records it for the footer. Returns
  /// the same index structures for inspection, though by the time this
  /// returns they are already on disk.
  pub fn close_row_group(&mut self, row_group: RowGroupWriter<'_, W>) -> Result<Vec<(usize, ColumnIndex, OffsetIndex)>> {
    let (mut meta, indexes) = row_group.close()?;

    for (i, column_index, offset_index) in &indexes {
      let column_index_offset = self.sink.pos as i64;
      let mut ci_bytes = Vec::new();
      {
        let mut oprot = thrift::protocol::TCompactOutputProtocol::new(&mut ci_bytes);
        column_index.to_thrift().write_to_out_protocol(&mut oprot)?;
      }
      self.sink.write_all(&ci_bytes)?;
      let column_index_length = ci_bytes.len() as i32;

      let offset_index_offset = self.sink.pos as i64;
      let mut oi_bytes = Vec::new();
      {
        let mut oprot = thrift::protocol::TCompactOutputProtocol::new(&mut oi_bytes);
        offset_index.to_thrift().write_to_out_protocol(&mut oprot)?;
      }
      self.sink.write_all(&oi_bytes)?;
      let offset_index_length = oi_bytes.len() as i32;

      meta.column_mut(*i).set_index_locations(column_index_offset, column_index_length, offset_index_offset, offset_index_length);
    }

    self.row_groups.push(meta);
    Ok(indexes)
  }

  /// Writes `rows` across as many row groups as `max_rows_per_row_group`/
  /// `byte_size_threshold` require, opening and closing each one as it
  /// fills. Convenience wrapper over `next_row_group`/`write_row`/
  /// `close_row_group` for callers who don't need to control row group
  /// boundaries themselves.
  pub fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
    let mut rg = self.next_row_group();
    for row in rows {
      match rg.write_row(row) {
        Ok(()) => {},
        Err(e) if is_row_group_full(&e) => {
          self.close_row_group(rg)?;
          rg = self.next_row_group();
          rg.write_row(row)?;
        },
        Err(e) => return Err(e)
      }
    }
    self.close_row_group(rg)?;
    Ok(())
  }

  /// Writes the footer, returning the assembled `FileMetaData`.
  pub fn close(mut self) -> Result<FileMetaData> {
    debug!("closing file writer with {} row groups", self.row_groups.len());
    let num_rows = self.row_groups.iter().map(|rg| rg.num_rows()).sum();
    let metadata = FileMetaData::new(1, num_rows, Some(self.properties.created_by().to_string()), self.key_value_metadata.take(), self.schema_descr.clone(), self.row_groups);
    crate::file::footer::write_footer(&mut self.sink, &metadata)?;
    Ok(metadata)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::basic::{Repetition, Type as PhysicalType};
  use crate::record::RowField;
  use crate::schema::types::{SchemaDescriptor, Type as SchemaType};
  use std::sync::Arc;

  fn int_schema() -> SchemaDescPtr {
    let leaf = SchemaType::primitive_type_builder("x", PhysicalType::INT32).with_repetition(Repetition::REQUIRED).build().unwrap();
    let root = SchemaType::group_type_builder("schema").as_root().with_fields(vec![leaf]).build().unwrap();
    Arc::new(SchemaDescriptor::new(root))
  }

  #[test]
  fn test_write_single_row_group() {
    let schema = int_schema();
    let mut sink = Vec::new();
    let mut writer = SerializedFileWriter::new(&mut sink, schema.clone(), WriterProperties::default()).unwrap();

    let mut rg = writer.next_row_group();
    for v in 0..5 {
      rg.write_row(&Row::new(vec![("x".to_string(), RowField::Int(v))])).unwrap();
    }
    writer.close_row_group(rg).unwrap();
    let metadata = writer.close().unwrap();

    assert_eq!(metadata.num_rows(), 5);
    assert_eq!(metadata.num_row_groups(), 1);
    assert_eq!(metadata.row_group(0).num_columns(), 1);
    assert_eq!(metadata.row_group(0).column(0).num_values(), 5);

    assert_eq!(&sink[0..4], &crate::file::footer::MAGIC);
    assert_eq!(&sink[sink.len() - 4..], &crate::file::footer::MAGIC);
  }

  #[test]
  fn test_sorting_columns_reorders_buffered_rows() {
    let schema = int_schema();
    let mut sink = Vec::new();
    let properties = WriterProperties::builder()
      .set_sorting_columns(vec![crate::file::properties::SortingColumn { path: crate::schema::types::ColumnPath::new(vec!["x".to_string()]), descending: true, nulls_first: false }])
      .build();
    let mut writer = SerializedFileWriter::new(&mut sink, schema.clone(), properties).unwrap();

    let mut rg = writer.next_row_group();
    for v in [3, 1, 4, 1, 5] {
      rg.write_row(&Row::new(vec![("x".to_string(), RowField::Int(v))])).unwrap();
    }
    // Rows are held back, not yet shredded into any column writer.
    assert_eq!(rg.buffered_rows.len(), 5);
    writer.close_row_group(rg).unwrap();
    let metadata = writer.close().unwrap();

    assert_eq!(metadata.num_rows(), 5);

    use crate::file::reader::FileReader as _;
    let reader = crate::file::reader::SerializedFileReader::new(std::io::Cursor::new(sink)).unwrap();
    let rows = reader.get_rows().unwrap();
    let values: Vec<i32> = rows.iter().map(|r| match r.get("x").unwrap() { RowField::Int(v) => *v, _ => panic!("expected int") }).collect();
    assert_eq!(values, vec![5, 4, 3, 1, 1]);
  }

  #[test]
  fn test_bloom_filter_offset_is_recorded() {
    let schema = int_schema();
    let mut sink = Vec::new();
    let properties = WriterProperties::builder().add_bloom_filter(crate::file::properties::BloomFilterConfig { path: crate::schema::types::ColumnPath::new(vec!["x".to_string()]), bit_count: 1024 }).build();
    let mut writer = SerializedFileWriter::new(&mut sink, schema.clone(), properties).unwrap();

    let mut rg = writer.next_row_group();
    for v in 0..10 {
      rg.write_row(&Row::new(vec![("x".to_string(), RowField::Int(v))])).unwrap();
    }
    writer.close_row_group(rg).unwrap();
    let metadata = writer.close().unwrap();

    let offset = metadata.row_group(0).column(0).bloom_filter_offset();
    assert!(offset.is_some());
    assert!(offset.unwrap() > 0);
  }
}
