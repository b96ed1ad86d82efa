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

//! Writer/reader configuration, builder-style: a `WriterProperties`/
//! `ReaderProperties` pair plus their builders, covering page sizing, row
//! group flush triggers, per-column compression/dictionary/encoding
//! overrides, sorting columns, and bloom filter configuration.

use std::collections::HashMap;

use crate::basic::Compression;
use crate::schema::types::ColumnPath;

pub const DEFAULT_PAGE_SIZE: usize = 1024 * 1024;
pub const DEFAULT_MAX_ROW_GROUP_SIZE: usize = 128 * 1024 * 1024;
pub const DEFAULT_BYTE_SIZE_THRESHOLD: usize = 64 * 1024 * 1024;
pub const DEFAULT_COLUMN_BUFFER_CAPACITY: usize = 1024;
pub const DEFAULT_DICTIONARY_PAGE_SIZE_LIMIT: usize = DEFAULT_PAGE_SIZE;
pub const DEFAULT_COMPRESSION: Compression = Compression::UNCOMPRESSED;

/// One entry of `sorting_columns`: the assembler stable-sorts every
/// column buffer in lockstep by these, leftmost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortingColumn {
  pub path: ColumnPath,
  pub descending: bool,
  pub nulls_first: bool
}

/// One entry of `bloom_filters`: a designated column gets a split-block
/// filter of this many bits, emitted alongside the row group's indexes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilterConfig {
  pub path: ColumnPath,
  pub bit_count: usize
}

/// Every per-column override `WriterProperties` allows: a column not present
/// here inherits the file-level defaults.
#[derive(Clone, Debug, Default)]
struct ColumnProperties {
  encoding: Option<crate::basic::Encoding>,
  compression: Option<Compression>,
  dictionary_enabled: Option<bool>
}

#[derive(Clone, Debug)]
pub struct WriterProperties {
  page_buffer_size: usize,
  max_rows_per_row_group: usize,
  byte_size_threshold: usize,
  column_buffer_capacity: usize,
  dictionary_page_size_limit: usize,
  compression: Compression,
  sorting_columns: Vec<SortingColumn>,
  bloom_filters: Vec<BloomFilterConfig>,
  enable_int96_writes: bool,
  write_page_checksums: bool,
  created_by: String,
  column_properties: HashMap<String, ColumnProperties>
}

impl Default for WriterProperties {
  fn default() -> Self {
    WriterPropertiesBuilder::new().build()
  }
}

impl WriterProperties {
  pub fn builder() -> WriterPropertiesBuilder {
    WriterPropertiesBuilder::new()
  }

  pub fn page_buffer_size(&self) -> usize {
    self.page_buffer_size
  }

  pub fn max_rows_per_row_group(&self) -> usize {
    self.max_rows_per_row_group
  }

  /// Accumulated uncompressed byte count that also forces a row group flush,
  /// independent of `max_rows_per_row_group`: whichever trigger fires first wins.
  pub fn byte_size_threshold(&self) -> usize {
    self.byte_size_threshold
  }

  pub fn column_buffer_capacity(&self) -> usize {
    self.column_buffer_capacity
  }

  pub fn dictionary_page_size_limit(&self) -> usize {
    self.dictionary_page_size_limit
  }

  pub fn compression(&self, path: &ColumnPath) -> Compression {
    self
      .column_properties
      .get(&path.to_string())
      .and_then(|p| p.compression)
      .unwrap_or(self.compression)
  }

  pub fn dictionary_enabled(&self, path: &ColumnPath) -> bool {
    self.column_properties.get(&path.to_string()).and_then(|p| p.dictionary_enabled).unwrap_or(true)
  }

  pub fn sorting_columns(&self) -> &[SortingColumn] {
    &self.sorting_columns
  }

  pub fn bloom_filter_config(&self, path: &ColumnPath) -> Option<&BloomFilterConfig> {
    self.bloom_filters.iter().find(|b| &b.path == path)
  }

  pub fn enable_int96_writes(&self) -> bool {
    self.enable_int96_writes
  }

  /// CRC is computed over the compressed body only when requested.
  pub fn write_page_checksums(&self) -> bool {
    self.write_page_checksums
  }

  pub fn created_by(&self) -> &str {
    &self.created_by
  }
}

pub struct WriterPropertiesBuilder {
  props: WriterProperties
}

impl WriterPropertiesBuilder {
  pub fn new() -> Self {
    WriterPropertiesBuilder {
      props: WriterProperties {
        page_buffer_size: DEFAULT_PAGE_SIZE,
        max_rows_per_row_group: DEFAULT_MAX_ROW_GROUP_SIZE,
        byte_size_threshold: DEFAULT_BYTE_SIZE_THRESHOLD,
        column_buffer_capacity: DEFAULT_COLUMN_BUFFER_CAPACITY,
        dictionary_page_size_limit: DEFAULT_DICTIONARY_PAGE_SIZE_LIMIT,
        compression: DEFAULT_COMPRESSION,
        sorting_columns: Vec::new(),
        bloom_filters: Vec::new(),
        // Defaults false: INT96 has no RowField representation (see
        // ColumnWriter::write_triple), so enabling it requires the caller to
        // write that column through the typed ColumnWriterImpl<Int96Type> API.
        enable_int96_writes: false,
        write_page_checksums: false,
        created_by: concat!("columnar version ", env!("CARGO_PKG_VERSION")).to_string(),
        column_properties: HashMap::new()
      }
    }
  }

  pub fn set_page_buffer_size(mut self, value: usize) -> Self {
    self.props.page_buffer_size = value;
    self
  }

  pub fn set_max_rows_per_row_group(mut self, value: usize) -> Self {
    self.props.max_rows_per_row_group = value;
    self
  }

  pub fn set_byte_size_threshold(mut self, value: usize) -> Self {
    self.props.byte_size_threshold = value;
    self
  }

  pub fn set_column_buffer_capacity(mut self, value: usize) -> Self {
    self.props.column_buffer_capacity = value;
    self
  }

  pub fn set_dictionary_page_size_limit(mut self, value: usize) -> Self {
    self.props.dictionary_page_size_limit = value;
    self
  }

  pub fn set_compression(mut self, value: Compression) -> Self {
    self.props.compression = value;
    self
  }

  pub fn set_column_compression(mut self, path: ColumnPath, value: Compression) -> Self {
    self.props.column_properties.entry(path.to_string()).or_default().compression = Some(value);
    self
  }

  pub fn set_column_dictionary_enabled(mut self, path: ColumnPath, value: bool) -> Self {
    self.props.column_properties.entry(path.to_string()).or_default().dictionary_enabled = Some(value);
    self
  }

  pub fn set_sorting_columns(mut self, value: Vec<SortingColumn>) -> Self {
    self.props.sorting_columns = value;
    self
  }

  pub fn add_bloom_filter(mut self, config: BloomFilterConfig) -> Self {
    self.props.bloom_filters.push(config);
    self
  }

  pub fn set_enable_int96_writes(mut self, value: bool) -> Self {
    self.props.enable_int96_writes = value;
    self
  }

  pub fn set_write_page_checksums(mut self, value: bool) -> Self {
    self.props.write_page_checksums = value;
    self
  }

  pub fn set_created_by(mut self, value: String) -> Self {
    self.props.created_by = value;
    self
  }

  pub fn build(self) -> WriterProperties {
    self.props
  }
}

impl Default for WriterPropertiesBuilder {
  fn default() -> Self {
    Self::new()
  }
}

/// Reader-side tuning: much smaller than the writer's, since a reader has no
/// encoding/compression/layout decisions left to make.
#[derive(Clone, Debug)]
pub struct ReaderProperties {
  read_buffer_size: usize
}

impl Default for ReaderProperties {
  fn default() -> Self {
    ReaderPropertiesBuilder::new().build()
  }
}

impl ReaderProperties {
  pub fn builder() -> ReaderPropertiesBuilder {
    ReaderPropertiesBuilder::new()
  }

  pub fn read_buffer_size(&self) -> usize {
    self.read_buffer_size
  }
}

pub struct ReaderPropertiesBuilder {
  props: ReaderProperties
}

impl ReaderPropertiesBuilder {
  pub fn new() -> Self {
    ReaderPropertiesBuilder { props: ReaderProperties { read_buffer_size: DEFAULT_PAGE_SIZE } }
  }

  pub fn set_read_buffer_size(mut self, value: usize) -> Self {
    self.props.read_buffer_size = value;
    self
  }

  pub fn build(self) -> ReaderProperties {
    self.props
  }
}

impl Default for ReaderPropertiesBuilder {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_writer_properties_defaults() {
    let props = WriterProperties::builder().build();
    assert_eq!(props.page_buffer_size(), DEFAULT_PAGE_SIZE);
    assert!(!props.enable_int96_writes());
    assert!(props.dictionary_enabled(&ColumnPath::from(vec!["a".to_string()])));
  }

  #[test]
  fn test_per_column_override() {
    let path = ColumnPath::from(vec!["a".to_string(), "b".to_string()]);
    let props = WriterProperties::builder()
      .set_compression(Compression::UNCOMPRESSED)
      .set_column_compression(path.clone(), Compression::SNAPPY)
      .set_column_dictionary_enabled(path.clone(), false)
      .build();
    assert_eq!(props.compression(&path), Compression::SNAPPY);
    assert!(!props.dictionary_enabled(&path));
    let other = ColumnPath::from(vec!["c".to_string()]);
    assert_eq!(props.compression(&other), Compression::UNCOMPRESSED);
  }
}
