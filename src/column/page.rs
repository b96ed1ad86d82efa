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

//! The page: the smallest unit of encoded bytes in a column chunk, and the
//! reader/writer seams a column chunk's page stream is built and consumed
//! through.

use crate::basic::{Compression, Encoding, PageType};
use crate::errors::Result;
use crate::util::memory::ByteBufferPtr;

/// One page's decompressed body plus the header fields callers need without
/// re-parsing it. Only `DataPage` (v1) is ever produced by the writer in
/// this crate; `DataPageV2` and `IndexPage` are modeled so a reader built
/// against this type can open files written by other conforming writers.
#[derive(Clone, Debug)]
pub enum Page {
  DataPage {
    buf: ByteBufferPtr,
    num_values: u32,
    encoding: Encoding,
    def_level_encoding: Encoding,
    rep_level_encoding: Encoding,
    statistics: Option<crate::file::statistics::Statistics>
  },
  DataPageV2 {
    buf: ByteBufferPtr,
    num_values: u32,
    num_nulls: u32,
    num_rows: u32,
    encoding: Encoding,
    def_levels_byte_len: u32,
    rep_levels_byte_len: u32,
    is_compressed: bool,
    statistics: Option<crate::file::statistics::Statistics>
  },
  DictionaryPage {
    buf: ByteBufferPtr,
    num_values: u32,
    encoding: Encoding,
    is_sorted: bool
  }
}

impl Page {
  pub fn page_type(&self) -> PageType {
    match self {
      Page::DataPage { .. } => PageType::DATA_PAGE_V1,
      Page::DataPageV2 { .. } => PageType::DATA_PAGE_V2,
      Page::DictionaryPage { .. } => PageType::DICTIONARY_PAGE
    }
  }

  pub fn buffer(&self) -> &ByteBufferPtr {
    match self {
      Page::DataPage { buf, .. } | Page::DataPageV2 { buf, .. } | Page::DictionaryPage { buf, .. } => buf
    }
  }

  pub fn num_values(&self) -> u32 {
    match self {
      Page::DataPage { num_values, .. } => *num_values,
      Page::DataPageV2 { num_values, .. } => *num_values,
      Page::DictionaryPage { num_values, .. } => *num_values
    }
  }
}

/// A page's header fields as recorded in the file, independent of its body
/// (used while assembling the offset index, before the body is written).
#[derive(Clone, Debug)]
pub struct PageHeader {
  pub page_type: PageType,
  pub uncompressed_size: i32,
  pub compressed_size: i32,
  pub crc: Option<u32>
}

/// Pulls pages from a column chunk in order. Implementations must not buffer
/// an entire page's body longer than one `get_next_page` call's decode
/// cycle: callers are expected to fully consume a page's values
/// before asking for the next.
pub trait PageReader: Iterator<Item = Result<Page>> {
  /// Skips the next page without decompressing or decoding its body,
  /// returning whether one was actually available to skip.
  fn skip_next_page(&mut self) -> Result<bool>;
}

/// Accepts encoded page bodies and handles compression, CRC, and framing.
/// One `PageWriter` per column chunk; `close` finalizes the chunk and
/// returns the total compressed bytes written (used by the offset index).
pub trait PageWriter {
  fn write_page(&mut self, page: CompressedPage) -> Result<PageWriteSpec>;

  fn close(&mut self) -> Result<()>;
}

/// A page body and level blocks ready to be compressed and framed by a
/// `PageWriter` -- the boundary between the column writer (which only knows
/// values) and the page writer (which only knows bytes). `buf` already has
/// the level blocks concatenated ahead of the value block for `DataPage`
/// (matching the on-disk layout); `rep_level_encoding`/`def_level_encoding`
/// and `statistics` are only meaningful for that variant.
pub struct CompressedPage {
  pub page_type: PageType,
  pub buf: ByteBufferPtr,
  pub num_values: u32,
  pub encoding: Encoding,
  pub def_level_encoding: Encoding,
  pub rep_level_encoding: Encoding,
  pub uncompressed_size: usize,
  pub compression: Compression,
  pub statistics: Option<crate::file::statistics::Statistics>,
  pub is_sorted: bool
}

impl CompressedPage {
  #[allow(clippy::too_many_arguments)]
  pub fn data_page(
    buf: ByteBufferPtr,
    num_values: u32,
    encoding: Encoding,
    uncompressed_size: usize,
    compression: Compression,
    statistics: Option<crate::file::statistics::Statistics>
  ) -> Self {
    CompressedPage {
      page_type: PageType::DATA_PAGE_V1,
      buf,
      num_values,
      encoding,
      def_level_encoding: Encoding::RLE,
      rep_level_encoding: Encoding::RLE,
      uncompressed_size,
      compression,
      statistics,
      is_sorted: false
    }
  }

  pub fn dictionary_page(buf: ByteBufferPtr, num_values: u32, uncompressed_size: usize, compression: Compression) -> Self {
    CompressedPage {
      page_type: PageType::DICTIONARY_PAGE,
      buf,
      num_values,
      encoding: Encoding::PLAIN,
      def_level_encoding: Encoding::RLE,
      rep_level_encoding: Encoding::RLE,
      uncompressed_size,
      compression,
      statistics: None,
      is_sorted: false
    }
  }
}

/// What a `PageWriter::write_page` call reports back, feeding directly into
/// the offset index (`{offset, compressed_size, first_row_index}`).
#[derive(Clone, Debug)]
pub struct PageWriteSpec {
  pub offset: u64,
  pub bytes_written: u64,
  pub num_values: u32
}
