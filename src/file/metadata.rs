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

//! The footer: `FileMetaData`, `RowGroupMetaData`, `ColumnChunkMetaData`,
//! wrapping the plain structs generated from `columnar_format.thrift` into
//! types keyed on `schema::types::SchemaDescriptor`/`ColumnDescriptor`
//! rather than a flat, order-dependent field list.

use std::sync::Arc;

use crate::basic::{Compression, Encoding, LogicalType, Repetition, Type as PhysicalType};
use crate::errors::Result;
use crate::file::statistics::Statistics;
use crate::parquet_thrift as tfmt;
use crate::schema::types::{BasicTypeInfo, ColumnDescPtr, ColumnPath, SchemaDescPtr, SchemaDescriptor, Type as SchemaType, TypePtr};

pub use tfmt::KeyValue;

fn physical_type_to_thrift(t: PhysicalType) -> tfmt::Type {
  match t {
    PhysicalType::BOOLEAN => tfmt::Type::BOOLEAN,
    PhysicalType::INT32 => tfmt::Type::INT32,
    PhysicalType::INT64 => tfmt::Type::INT64,
    PhysicalType::INT96 => tfmt::Type::INT96,
    PhysicalType::FLOAT => tfmt::Type::FLOAT,
    PhysicalType::DOUBLE => tfmt::Type::DOUBLE,
    PhysicalType::BYTE_ARRAY => tfmt::Type::BYTE_ARRAY,
    PhysicalType::FIXED_LEN_BYTE_ARRAY => tfmt::Type::FIXED_LEN_BYTE_ARRAY
  }
}

fn physical_type_from_thrift(t: tfmt::Type) -> PhysicalType {
  match t {
    tfmt::Type::BOOLEAN => PhysicalType::BOOLEAN,
    tfmt::Type::INT32 => PhysicalType::INT32,
    tfmt::Type::INT64 => PhysicalType::INT64,
    tfmt::Type::INT96 => PhysicalType::INT96,
    tfmt::Type::FLOAT => PhysicalType::FLOAT,
    tfmt::Type::DOUBLE => PhysicalType::DOUBLE,
    tfmt::Type::BYTE_ARRAY => PhysicalType::BYTE_ARRAY,
    tfmt::Type::FIXED_LEN_BYTE_ARRAY => PhysicalType::FIXED_LEN_BYTE_ARRAY
  }
}

fn repetition_to_thrift(r: Option<Repetition>) -> Option<tfmt::FieldRepetitionType> {
  r.map(|r| match r {
    Repetition::REQUIRED => tfmt::FieldRepetitionType::REQUIRED,
    Repetition::OPTIONAL => tfmt::FieldRepetitionType::OPTIONAL,
    Repetition::REPEATED => tfmt::FieldRepetitionType::REPEATED
  })
}

fn repetition_from_thrift(r: Option<tfmt::FieldRepetitionType>) -> Option<Repetition> {
  r.map(|r| match r {
    tfmt::FieldRepetitionType::REQUIRED => Repetition::REQUIRED,
    tfmt::FieldRepetitionType::OPTIONAL => Repetition::OPTIONAL,
    tfmt::FieldRepetitionType::REPEATED => Repetition::REPEATED
  })
}

fn logical_type_to_thrift(t: LogicalType) -> Option<tfmt::LogicalType> {
  let mapped = match t {
    LogicalType::NONE => return None,
    LogicalType::UTF8 => tfmt::LogicalType::UTF8,
    LogicalType::MAP => tfmt::LogicalType::MAP,
    LogicalType::MAP_KEY_VALUE => tfmt::LogicalType::MAP_KEY_VALUE,
    LogicalType::LIST => tfmt::LogicalType::LIST,
    LogicalType::ENUM => tfmt::LogicalType::ENUM,
    LogicalType::DECIMAL => tfmt::LogicalType::DECIMAL,
    LogicalType::DATE => tfmt::LogicalType::DATE,
    LogicalType::TIME_MILLIS => tfmt::LogicalType::TIME_MILLIS,
    LogicalType::TIME_MICROS => tfmt::LogicalType::TIME_MICROS,
    // The wire enum has no TIME_NANOS id; round-trips as a plain INT64 leaf.
    LogicalType::TIME_NANOS => return None,
    LogicalType::TIMESTAMP_MILLIS => tfmt::LogicalType::TIMESTAMP_MILLIS,
    LogicalType::TIMESTAMP_MICROS => tfmt::LogicalType::TIMESTAMP_MICROS,
    LogicalType::TIMESTAMP_NANOS => tfmt::LogicalType::TIMESTAMP_NANOS,
    LogicalType::UINT_8 => tfmt::LogicalType::UINT_8,
    LogicalType::UINT_16 => tfmt::LogicalType::UINT_16,
    LogicalType::UINT_32 => tfmt::LogicalType::UINT_32,
    LogicalType::UINT_64 => tfmt::LogicalType::UINT_64,
    LogicalType::INT_8 => tfmt::LogicalType::INT_8,
    LogicalType::INT_16 => tfmt::LogicalType::INT_16,
    LogicalType::INT_32 => tfmt::LogicalType::INT_32,
    LogicalType::INT_64 => tfmt::LogicalType::INT_64,
    LogicalType::JSON => tfmt::LogicalType::JSON,
    LogicalType::BSON => tfmt::LogicalType::BSON,
    LogicalType::INTERVAL => tfmt::LogicalType::INTERVAL,
    LogicalType::UUID => tfmt::LogicalType::UUID
  };
  Some(mapped)
}

fn logical_type_from_thrift(t: Option<tfmt::LogicalType>) -> LogicalType {
  match t {
    None => LogicalType::NONE,
    Some(tfmt::LogicalType::NONE) => LogicalType::NONE,
    Some(tfmt::LogicalType::UTF8) => LogicalType::UTF8,
    Some(tfmt::LogicalType::MAP) => LogicalType::MAP,
    Some(tfmt::LogicalType::MAP_KEY_VALUE) => LogicalType::MAP_KEY_VALUE,
    Some(tfmt::LogicalType::LIST) => LogicalType::LIST,
    Some(tfmt::LogicalType::ENUM) => LogicalType::ENUM,
    Some(tfmt::LogicalType::DECIMAL) => LogicalType::DECIMAL,
    Some(tfmt::LogicalType::DATE) => LogicalType::DATE,
    Some(tfmt::LogicalType::TIME_MILLIS) => LogicalType::TIME_MILLIS,
    Some(tfmt::LogicalType::TIME_MICROS) => LogicalType::TIME_MICROS,
    Some(tfmt::LogicalType::TIMESTAMP_MILLIS) => LogicalType::TIMESTAMP_MILLIS,
    Some(tfmt::LogicalType::TIMESTAMP_MICROS) => LogicalType::TIMESTAMP_MICROS,
    Some(tfmt::LogicalType::TIMESTAMP_NANOS) => LogicalType::TIMESTAMP_NANOS,
    Some(tfmt::LogicalType::UINT_8) => LogicalType::UINT_8,
    Some(tfmt::LogicalType::UINT_16) => LogicalType::UINT_16,
    Some(tfmt::LogicalType::UINT_32) => LogicalType::UINT_32,
    Some(tfmt::LogicalType::UINT_64) => LogicalType::UINT_64,
    Some(tfmt::LogicalType::INT_8) => LogicalType::INT_8,
    Some(tfmt::LogicalType::INT_16) => LogicalType::INT_16,
    Some(tfmt::LogicalType::INT_32) => LogicalType::INT_32,
    Some(tfmt::LogicalType::INT_64) => LogicalType::INT_64,
    Some(tfmt::LogicalType::JSON) => LogicalType::JSON,
    Some(tfmt::LogicalType::BSON) => LogicalType::BSON,
    Some(tfmt::LogicalType::INTERVAL) => LogicalType::INTERVAL,
    Some(tfmt::LogicalType::UUID) => LogicalType::UUID
  }
}

pub(crate) fn encoding_to_thrift(e: Encoding) -> tfmt::Encoding {
  match e {
    Encoding::PLAIN => tfmt::Encoding::PLAIN,
    Encoding::PLAIN_DICTIONARY => tfmt::Encoding::PLAIN_DICTIONARY,
    Encoding::RLE => tfmt::Encoding::RLE,
    // BIT_PACKED has no standalone wire id of its own in this format revision;
    // it only ever appears embedded in the RLE/bit-packed hybrid.
    Encoding::BIT_PACKED => tfmt::Encoding::RLE,
    Encoding::DELTA_BINARY_PACKED => tfmt::Encoding::DELTA_BINARY_PACKED,
    Encoding::DELTA_LENGTH_BYTE_ARRAY => tfmt::Encoding::DELTA_LENGTH_BYTE_ARRAY,
    Encoding::DELTA_BYTE_ARRAY => tfmt::Encoding::DELTA_BYTE_ARRAY,
    Encoding::RLE_DICTIONARY => tfmt::Encoding::RLE_DICTIONARY
  }
}

pub(crate) fn encoding_from_thrift(e: tfmt::Encoding) -> Encoding {
  match e {
    tfmt::Encoding::PLAIN => Encoding::PLAIN,
    tfmt::Encoding::PLAIN_DICTIONARY => Encoding::PLAIN_DICTIONARY,
    tfmt::Encoding::RLE => Encoding::RLE,
    tfmt::Encoding::DELTA_BINARY_PACKED => Encoding::DELTA_BINARY_PACKED,
    tfmt::Encoding::DELTA_LENGTH_BYTE_ARRAY => Encoding::DELTA_LENGTH_BYTE_ARRAY,
    tfmt::Encoding::DELTA_BYTE_ARRAY => Encoding::DELTA_BYTE_ARRAY,
    tfmt::Encoding::RLE_DICTIONARY => Encoding::RLE_DICTIONARY
  }
}

fn compression_to_thrift(c: Compression) -> tfmt::CompressionCodec {
  match c {
    Compression::UNCOMPRESSED => tfmt::CompressionCodec::UNCOMPRESSED,
    Compression::SNAPPY => tfmt::CompressionCodec::SNAPPY,
    Compression::GZIP => tfmt::CompressionCodec::GZIP,
    Compression::LZO => tfmt::CompressionCodec::LZO,
    Compression::BROTLI => tfmt::CompressionCodec::BROTLI,
    Compression::LZ4 => tfmt::CompressionCodec::LZ4,
    Compression::ZSTD => tfmt::CompressionCodec::ZSTD,
    Compression::LZ4_RAW => tfmt::CompressionCodec::LZ4_RAW
  }
}

fn compression_from_thrift(c: tfmt::CompressionCodec) -> Compression {
  match c {
    tfmt::CompressionCodec::UNCOMPRESSED => Compression::UNCOMPRESSED,
    tfmt::CompressionCodec::SNAPPY => Compression::SNAPPY,
    tfmt::CompressionCodec::GZIP => Compression::GZIP,
    tfmt::CompressionCodec::LZO => Compression::LZO,
    tfmt::CompressionCodec::BROTLI => Compression::BROTLI,
    tfmt::CompressionCodec::LZ4 => Compression::LZ4,
    tfmt::CompressionCodec::ZSTD => Compression::ZSTD,
    tfmt::CompressionCodec::LZ4_RAW => Compression::LZ4_RAW
  }
}

pub(crate) fn page_type_to_thrift(t: crate::basic::PageType) -> tfmt::PageType {
  match t {
    crate::basic::PageType::DATA_PAGE_V1 => tfmt::PageType::DATA_PAGE,
    crate::basic::PageType::DATA_PAGE_V2 => tfmt::PageType::DATA_PAGE_V2,
    crate::basic::PageType::DICTIONARY_PAGE => tfmt::PageType::DICTIONARY_PAGE,
    crate::basic::PageType::INDEX_PAGE => tfmt::PageType::INDEX_PAGE
  }
}

pub(crate) fn page_type_from_thrift(t: tfmt::PageType) -> crate::basic::PageType {
  match t {
    tfmt::PageType::DATA_PAGE => crate::basic::PageType::DATA_PAGE_V1,
    tfmt::PageType::DATA_PAGE_V2 => crate::basic::PageType::DATA_PAGE_V2,
    tfmt::PageType::DICTIONARY_PAGE => crate::basic::PageType::DICTIONARY_PAGE,
    tfmt::PageType::INDEX_PAGE => crate::basic::PageType::INDEX_PAGE
  }
}

/// Flattens the schema tree into the pre-order list the wire format uses:
/// every node (including the implicit root) as one `SchemaElement`, groups
/// carrying their child count instead of nesting.
pub fn schema_to_thrift(schema: &SchemaDescriptor) -> Vec<tfmt::SchemaElement> {
  let mut out = Vec::new();
  flatten_node(schema.root_schema(), &mut out);
  out
}

fn flatten_node(node: &TypePtr, out: &mut Vec<tfmt::SchemaElement>) {
  match &**node {
    SchemaType::PrimitiveType { basic_info, physical_type, type_length, scale, precision, is_adjusted_to_utc: _ } => {
      out.push(tfmt::SchemaElement {
        type_: Some(physical_type_to_thrift(*physical_type)),
        type_length: if *type_length >= 0 { Some(*type_length) } else { None },
        repetition_type: repetition_to_thrift(basic_info.repetition()),
        name: basic_info.name().to_string(),
        num_children: None,
        logical_type: logical_type_to_thrift(basic_info.logical_type()),
        scale: if *scale >= 0 { Some(*scale) } else { None },
        precision: if *precision >= 0 { Some(*precision) } else { None },
        field_id: basic_info.id()
      });
    },
    SchemaType::GroupType { basic_info, fields } => {
      out.push(tfmt::SchemaElement {
        type_: None,
        type_length: None,
        repetition_type: repetition_to_thrift(basic_info.repetition()),
        name: basic_info.name().to_string(),
        num_children: Some(fields.len() as i32),
        logical_type: logical_type_to_thrift(basic_info.logical_type()),
        scale: None,
        precision: None,
        field_id: basic_info.id()
      });
      for field in fields {
        flatten_node(field, out);
      }
    }
  }
}

/// Inverse of `schema_to_thrift`: consumes the flat pre-order list, using
/// each group's recorded child count to know where its subtree ends.
pub fn schema_from_thrift(elements: &[tfmt::SchemaElement]) -> Result<SchemaDescriptor> {
  if elements.is_empty() {
    return Err(general_err!("schema has no elements"));
  }
  let mut pos = 0usize;
  let root = build_node(elements, &mut pos, true)?;
  if pos != elements.len() {
    return Err(general_err!("schema has {} trailing elements after parsing the root", elements.len() - pos));
  }
  Ok(SchemaDescriptor::new(root))
}

fn build_node(elements: &[tfmt::SchemaElement], pos: &mut usize, is_root: bool) -> Result<TypePtr> {
  let element = elements.get(*pos).ok_or_else(|| general_err!("unexpected end of schema element list"))?;
  *pos += 1;

  let repetition = if is_root { None } else { repetition_from_thrift(element.repetition_type) };
  let logical_type = logical_type_from_thrift(element.logical_type);

  match element.num_children {
    Some(n) => {
      let mut fields = Vec::with_capacity(n as usize);
      for _ in 0..n {
        fields.push(build_node(elements, pos, false)?);
      }
      Ok(Arc::new(SchemaType::GroupType {
        basic_info: BasicTypeInfo::new(element.name.clone(), repetition, logical_type, element.field_id),
        fields
      }))
    },
    None => {
      let physical_type = element.type_.ok_or_else(|| general_err!("leaf schema element `{}` has no physical type", element.name))?;
      Ok(Arc::new(SchemaType::PrimitiveType {
        basic_info: BasicTypeInfo::new(element.name.clone(), repetition, logical_type, element.field_id),
        physical_type: physical_type_from_thrift(physical_type),
        type_length: element.type_length.unwrap_or(-1),
        scale: element.scale.unwrap_or(-1),
        precision: element.precision.unwrap_or(-1),
        is_adjusted_to_utc: false
      }))
    }
  }
}

/// One column chunk's worth of footer metadata, keyed on its `ColumnDescriptor`
/// rather than a bare dotted path.
#[derive(Clone, Debug)]
pub struct ColumnChunkMetaData {
  column_descr: ColumnDescPtr,
  encodings: Vec<Encoding>,
  file_path: Option<String>,
  file_offset: i64,
  num_values: i64,
  compression: Compression,
  total_compressed_size: i64,
  total_uncompressed_size: i64,
  data_page_offset: i64,
  index_page_offset: Option<i64>,
  dictionary_page_offset: Option<i64>,
  statistics: Option<Statistics>,
  bloom_filter_offset: Option<i64>,
  column_index_offset: Option<i64>,
  column_index_length: Option<i32>,
  offset_index_offset: Option<i64>,
  offset_index_length: Option<i32>
}

impl ColumnChunkMetaData {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    column_descr: ColumnDescPtr,
    encodings: Vec<Encoding>,
    compression: Compression,
    num_values: i64,
    total_compressed_size: i64,
    total_uncompressed_size: i64,
    data_page_offset: i64,
    dictionary_page_offset: Option<i64>,
    statistics: Option<Statistics>,
    bloom_filter_offset: Option<i64>
  ) -> Self {
    ColumnChunkMetaData {
      column_descr,
      encodings,
      file_path: None,
      file_offset: data_page_offset,
      num_values,
      compression,
      total_compressed_size,
      total_uncompressed_size,
      data_page_offset,
      index_page_offset: None,
      dictionary_page_offset,
      statistics,
      bloom_filter_offset,
      column_index_offset: None,
      column_index_length: None,
      offset_index_offset: None,
      offset_index_length: None
    }
  }

  /// Records where the column's `ColumnIndex`/`OffsetIndex` sections landed once
  /// they've been written out, so `to_thrift` can point the `ColumnChunk` at them.
  pub fn set_index_locations(&mut self, column_index_offset: i64, column_index_length: i32, offset_index_offset: i64, offset_index_length: i32) {
    self.column_index_offset = Some(column_index_offset);
    self.column_index_length = Some(column_index_length);
    self.offset_index_offset = Some(offset_index_offset);
    self.offset_index_length = Some(offset_index_length);
  }

  pub fn column_index_offset(&self) -> Option<i64> {
    self.column_index_offset
  }

  pub fn column_index_length(&self) -> Option<i32> {
    self.column_index_length
  }

  pub fn offset_index_offset(&self) -> Option<i64> {
    self.offset_index_offset
  }

  pub fn offset_index_length(&self) -> Option<i32> {
    self.offset_index_length
  }

  pub fn column_descr(&self) -> &ColumnDescPtr {
    &self.column_descr
  }

  pub fn column_path(&self) -> &ColumnPath {
    self.column_descr.path()
  }

  pub fn compression(&self) -> Compression {
    self.compression
  }

  pub fn num_values(&self) -> i64 {
    self.num_values
  }

  pub fn total_compressed_size(&self) -> i64 {
    self.total_compressed_size
  }

  pub fn total_uncompressed_size(&self) -> i64 {
    self.total_uncompressed_size
  }

  pub fn data_page_offset(&self) -> i64 {
    self.data_page_offset
  }

  pub fn dictionary_page_offset(&self) -> Option<i64> {
    self.dictionary_page_offset
  }

  pub fn bloom_filter_offset(&self) -> Option<i64> {
    self.bloom_filter_offset
  }

  pub fn statistics(&self) -> Option<&Statistics> {
    self.statistics.as_ref()
  }

  pub fn encodings(&self) -> &[Encoding] {
    &self.encodings
  }

  pub fn to_thrift(&self) -> tfmt::ColumnChunk {
    let meta = tfmt::ColumnMetaData {
      type_: physical_type_to_thrift(self.column_descr.physical_type()),
      encodings: self.encodings.iter().map(|e| encoding_to_thrift(*e)).collect(),
      path_in_schema: self.column_descr.path().parts().to_vec(),
      codec: compression_to_thrift(self.compression),
      num_values: self.num_values,
      total_uncompressed_size: self.total_uncompressed_size,
      total_compressed_size: self.total_compressed_size,
      key_value_metadata: None,
      data_page_offset: self.data_page_offset,
      index_page_offset: self.index_page_offset,
      dictionary_page_offset: self.dictionary_page_offset,
      statistics: self.statistics.as_ref().map(|s| s.to_thrift()),
      encoding_stats: None,
      bloom_filter_offset: self.bloom_filter_offset
    };
    tfmt::ColumnChunk {
      file_path: self.file_path.clone(),
      file_offset: self.file_offset,
      meta_data: Some(meta),
      offset_index_offset: self.offset_index_offset,
      offset_index_length: self.offset_index_length,
      column_index_offset: self.column_index_offset,
      column_index_length: self.column_index_length
    }
  }

  pub fn from_thrift(column_descr: ColumnDescPtr, cc: tfmt::ColumnChunk) -> Result<Self> {
    let meta = cc.meta_data.ok_or_else(|| general_err!("column chunk is missing required ColumnMetaData"))?;
    let statistics = match &meta.statistics {
      Some(s) => Some(Statistics::from_thrift(physical_type_from_thrift(meta.type_), s)?),
      None => None
    };
    Ok(ColumnChunkMetaData {
      column_descr,
      encodings: meta.encodings.into_iter().map(encoding_from_thrift).collect(),
      file_path: cc.file_path,
      file_offset: cc.file_offset,
      num_values: meta.num_values,
      compression: compression_from_thrift(meta.codec),
      total_compressed_size: meta.total_compressed_size,
      total_uncompressed_size: meta.total_uncompressed_size,
      data_page_offset: meta.data_page_offset,
      index_page_offset: meta.index_page_offset,
      dictionary_page_offset: meta.dictionary_page_offset,
      statistics,
      bloom_filter_offset: meta.bloom_filter_offset,
      column_index_offset: cc.column_index_offset,
      column_index_length: cc.column_index_length,
      offset_index_offset: cc.offset_index_offset,
      offset_index_length: cc.offset_index_length
    })
  }
}

/// One row group's worth of footer metadata: its column chunks plus the
/// shared byte/row counts the row group flush trigger is measured against.
#[derive(Clone, Debug)]
pub struct RowGroupMetaData {
  columns: Vec<ColumnChunkMetaData>,
  num_rows: i64,
  total_byte_size: i64,
  schema_descr: SchemaDescPtr
}

impl RowGroupMetaData {
  pub fn new(columns: Vec<ColumnChunkMetaData>, num_rows: i64, total_byte_size: i64, schema_descr: SchemaDescPtr) -> Self {
    RowGroupMetaData { columns, num_rows, total_byte_size, schema_descr }
  }

  pub fn num_rows(&self) -> i64 {
    self.num_rows
  }

  pub fn total_byte_size(&self) -> i64 {
    self.total_byte_size
  }

  pub fn num_columns(&self) -> usize {
    self.columns.len()
  }

  pub fn column(&self, i: usize) -> &ColumnChunkMetaData {
    &self.columns[i]
  }

  pub fn column_mut(&mut self, i: usize) -> &mut ColumnChunkMetaData {
    &mut self.columns[i]
  }

  pub fn columns(&self) -> &[ColumnChunkMetaData] {
    &self.columns
  }

  pub fn schema_descr(&self) -> &SchemaDescPtr {
    &self.schema_descr
  }

  pub fn to_thrift(&self) -> tfmt::RowGroup {
    tfmt::RowGroup {
      columns: self.columns.iter().map(|c| c.to_thrift()).collect(),
      total_byte_size: self.total_byte_size,
      num_rows: self.num_rows,
      file_offset: None,
      total_compressed_size: Some(self.columns.iter().map(|c| c.total_compressed_size()).sum()),
      ordinal: None
    }
  }

  pub fn from_thrift(schema_descr: SchemaDescPtr, rg: tfmt::RowGroup) -> Result<Self> {
    if rg.columns.len() != schema_descr.num_columns() {
      return Err(general_err!(
        "row group has {} column chunks but schema declares {} leaf columns",
        rg.columns.len(),
        schema_descr.num_columns()
      ));
    }
    let columns = rg
      .columns
      .into_iter()
      .enumerate()
      .map(|(i, cc)| ColumnChunkMetaData::from_thrift(schema_descr.column(i), cc))
      .collect::<Result<Vec<_>>>()?;
    Ok(RowGroupMetaData { columns, num_rows: rg.num_rows, total_byte_size: rg.total_byte_size, schema_descr })
  }
}

/// The file footer: schema, row count, writer identity, and every row
/// group's metadata, in the order they were written.
#[derive(Clone, Debug)]
pub struct FileMetaData {
  version: i32,
  num_rows: i64,
  created_by: Option<String>,
  key_value_metadata: Option<Vec<KeyValue>>,
  schema_descr: SchemaDescPtr,
  row_groups: Vec<RowGroupMetaData>
}

impl FileMetaData {
  pub fn new(
    version: i32,
    num_rows: i64,
    created_by: Option<String>,
    key_value_metadata: Option<Vec<KeyValue>>,
    schema_descr: SchemaDescPtr,
    row_groups: Vec<RowGroupMetaData>
  ) -> Self {
    FileMetaData { version, num_rows, created_by, key_value_metadata, schema_descr, row_groups }
  }

  pub fn version(&self) -> i32 {
    self.version
  }

  pub fn num_rows(&self) -> i64 {
    self.num_rows
  }

  pub fn created_by(&self) -> Option<&str> {
    self.created_by.as_deref()
  }

  pub fn key_value_metadata(&self) -> Option<&[KeyValue]> {
    self.key_value_metadata.as_deref()
  }

  pub fn schema_descr(&self) -> &SchemaDescPtr {
    &self.schema_descr
  }

  pub fn num_row_groups(&self) -> usize {
    self.row_groups.len()
  }

  pub fn row_group(&self, i: usize) -> &RowGroupMetaData {
    &self.row_groups[i]
  }

  pub fn row_groups(&self) -> &[RowGroupMetaData] {
    &self.row_groups
  }

  pub fn to_thrift(&self) -> tfmt::FileMetaData {
    tfmt::FileMetaData {
      version: self.version,
      schema: schema_to_thrift(&self.schema_descr),
      num_rows: self.num_rows,
      row_groups: self.row_groups.iter().map(|rg| rg.to_thrift()).collect(),
      key_value_metadata: self.key_value_metadata.clone(),
      created_by: self.created_by.clone(),
      footer_signing_key_metadata: None
    }
  }

  pub fn from_thrift(t: tfmt::FileMetaData) -> Result<Self> {
    let schema_descr = Arc::new(schema_from_thrift(&t.schema)?);
    let row_groups = t
      .row_groups
      .into_iter()
      .map(|rg| RowGroupMetaData::from_thrift(schema_descr.clone(), rg))
      .collect::<Result<Vec<_>>>()?;
    Ok(FileMetaData {
      version: t.version,
      num_rows: t.num_rows,
      created_by: t.created_by,
      key_value_metadata: t.key_value_metadata,
      schema_descr,
      row_groups
    })
  }
}

/// One page's location within a column chunk (an offset index entry).
#[derive(Clone, Copy, Debug)]
pub struct PageLocation {
  pub offset: i64,
  pub compressed_page_size: i32,
  pub first_row_index: i64
}

/// Per-page byte locations for one column chunk, in page order -- lets
/// `seek_to_row` find the first page covering a row without decoding
/// anything before it.
#[derive(Clone, Debug)]
pub struct OffsetIndex {
  pub page_locations: Vec<PageLocation>
}

impl OffsetIndex {
  pub fn to_thrift(&self) -> tfmt::OffsetIndex {
    tfmt::OffsetIndex {
      page_locations: self
        .page_locations
        .iter()
        .map(|p| tfmt::PageLocation { offset: p.offset, compressed_page_size: p.compressed_page_size, first_row_index: p.first_row_index })
        .collect()
    }
  }

  pub fn from_thrift(t: tfmt::OffsetIndex) -> Self {
    OffsetIndex {
      page_locations: t
        .page_locations
        .into_iter()
        .map(|p| PageLocation { offset: p.offset, compressed_page_size: p.compressed_page_size, first_row_index: p.first_row_index })
        .collect()
    }
  }
}

/// Per-page `{min, max, null_count}` for one column chunk, used by
/// the file reader to drop pages whose range cannot satisfy a predicate
/// without ever decoding them.
#[derive(Clone, Debug)]
pub struct ColumnIndex {
  pub null_pages: Vec<bool>,
  pub min_values: Vec<Vec<u8>>,
  pub max_values: Vec<Vec<u8>>,
  pub null_counts: Option<Vec<i64>>
}

impl ColumnIndex {
  pub fn to_thrift(&self) -> tfmt::ColumnIndex {
    tfmt::ColumnIndex {
      null_pages: self.null_pages.clone(),
      min_values: self.min_values.clone(),
      max_values: self.max_values.clone(),
      boundary_order: tfmt::BoundaryOrder::UNORDERED,
      null_counts: self.null_counts.clone()
    }
  }

  pub fn from_thrift(t: tfmt::ColumnIndex) -> Self {
    ColumnIndex { null_pages: t.null_pages, min_values: t.min_values, max_values: t.max_values, null_counts: t.null_counts }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::basic::Type as PhysicalType;

  fn addressbook_schema() -> SchemaDescriptor {
    let owner = SchemaType::primitive_type_builder("owner", PhysicalType::BYTE_ARRAY)
      .with_repetition(Repetition::REQUIRED)
      .with_logical_type(LogicalType::UTF8)
      .build()
      .unwrap();
    let root = SchemaType::group_type_builder("schema").as_root().with_fields(vec![owner]).build().unwrap();
    SchemaDescriptor::new(root)
  }

  #[test]
  fn test_schema_round_trip_through_thrift() {
    let schema = addressbook_schema();
    let elements = schema_to_thrift(&schema);
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].num_children, Some(1));
    assert_eq!(elements[1].name, "owner");

    let rebuilt = schema_from_thrift(&elements).unwrap();
    assert_eq!(rebuilt.num_columns(), 1);
    assert_eq!(rebuilt.column(0).path().to_string(), "owner");
    assert_eq!(rebuilt.column(0).physical_type(), PhysicalType::BYTE_ARRAY);
  }

  #[test]
  fn test_column_chunk_metadata_round_trip() {
    let schema = addressbook_schema();
    let descr = schema.column(0);
    let stats = Statistics::ByteArray {
      min: Some(crate::data_type::ByteArray::from(b"a".to_vec())),
      max: Some(crate::data_type::ByteArray::from(b"z".to_vec())),
      null_count: 1,
      distinct_count: None
    };
    let cc = ColumnChunkMetaData::new(descr, vec![Encoding::PLAIN], Compression::SNAPPY, 10, 100, 150, 4, None, Some(stats), None);
    let thrift = cc.to_thrift();
    let rebuilt = ColumnChunkMetaData::from_thrift(schema.column(0), thrift).unwrap();
    assert_eq!(rebuilt.num_values(), 10);
    assert_eq!(rebuilt.compression(), Compression::SNAPPY);
    assert!(rebuilt.statistics().unwrap().has_min_max_set());
  }
}
