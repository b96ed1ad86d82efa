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

//! The column reader: pulls pages from a `PageReader`, decodes rep/def
//! levels and values, and hands batches back to the shredding engine. Page
//! decoding dispatches over the stable-Rust `Decoder<T>` machinery in
//! `encodings::decoding` rather than specializing per physical type.

use std::collections::HashMap;

use crate::basic::{Encoding, Type as PhysicalType};
use crate::data_type::{
  BoolType, ByteArrayType, DataType, DoubleType, FixedLenByteArrayType, FloatType, Int32Type, Int64Type, Int96Type
};
use crate::encodings::decoding::{get_decoder, Decoder, DictDecoder, PlainDecoder};
use crate::encodings::levels::LevelDecoder;
use crate::encodings::plain_codec::PlainCodec;
use crate::errors::Result;
use crate::schema::types::ColumnDescPtr;

use super::page::{Page, PageReader};

pub enum ColumnReader {
  BoolColumnReader(ColumnReaderImpl<BoolType>),
  Int32ColumnReader(ColumnReaderImpl<Int32Type>),
  Int64ColumnReader(ColumnReaderImpl<Int64Type>),
  Int96ColumnReader(ColumnReaderImpl<Int96Type>),
  FloatColumnReader(ColumnReaderImpl<FloatType>),
  DoubleColumnReader(ColumnReaderImpl<DoubleType>),
  ByteArrayColumnReader(ColumnReaderImpl<ByteArrayType>),
  FixedLenByteArrayColumnReader(ColumnReaderImpl<FixedLenByteArrayType>)
}

/// Builds the column reader matching `col_descr`'s physical type.
pub fn get_column_reader(col_descr: ColumnDescPtr, col_page_reader: Box<dyn PageReader>) -> ColumnReader {
  match col_descr.physical_type() {
    PhysicalType::BOOLEAN => ColumnReader::BoolColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader)),
    PhysicalType::INT32 => ColumnReader::Int32ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader)),
    PhysicalType::INT64 => ColumnReader::Int64ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader)),
    PhysicalType::INT96 => ColumnReader::Int96ColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader)),
    PhysicalType::FLOAT => ColumnReader::FloatColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader)),
    PhysicalType::DOUBLE => ColumnReader::DoubleColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader)),
    PhysicalType::BYTE_ARRAY => ColumnReader::ByteArrayColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader)),
    PhysicalType::FIXED_LEN_BYTE_ARRAY => {
      ColumnReader::FixedLenByteArrayColumnReader(ColumnReaderImpl::new(col_descr, col_page_reader))
    }
  }
}

/// Per-physical-type value reader. Generic over one marker type; the
/// `ColumnReader` enum above is the dispatch boundary callers actually hold.
pub struct ColumnReaderImpl<T: DataType + PlainCodec> {
  descr: ColumnDescPtr,
  def_level_decoder: Option<LevelDecoder>,
  rep_level_decoder: Option<LevelDecoder>,
  page_reader: Box<dyn PageReader>,
  current_encoding: Option<Encoding>,

  num_buffered_values: u32,
  num_decoded_values: u32,

  decoders: HashMap<Encoding, Box<dyn Decoder<T>>>
}

impl<T: DataType + PlainCodec> ColumnReaderImpl<T> {
  pub fn new(descr: ColumnDescPtr, page_reader: Box<dyn PageReader>) -> Self {
    ColumnReaderImpl {
      descr,
      def_level_decoder: None,
      rep_level_decoder: None,
      page_reader,
      current_encoding: None,
      num_buffered_values: 0,
      num_decoded_values: 0,
      decoders: HashMap::new()
    }
  }

  pub fn descr(&self) -> &ColumnDescPtr {
    &self.descr
  }

  /// Reads up to `batch_size` values into `values`, and up to as many
  /// rep/def levels as the page has buffered, stopping early at end of
  /// column. Returns `(values_read, levels_read)`.
  pub fn read_batch(
    &mut self,
    batch_size: usize,
    mut def_levels: Option<&mut [i16]>,
    mut rep_levels: Option<&mut [i16]>,
    values: &mut [T::T]
  ) -> Result<(usize, usize)> {
    let mut values_read = 0;
    let mut levels_read = 0;

    while values_read < batch_size {
      if !self.has_next()? {
        break;
      }

      let mut values_to_read = 0;
      let mut num_def_levels = 0;

      let next_levels_read = levels_read + std::cmp::min(batch_size, (self.num_buffered_values - self.num_decoded_values) as usize);

      if self.descr.max_def_level() > 0 && def_levels.is_some() {
        if let Some(ref mut levels) = def_levels {
          num_def_levels = self.read_def_levels(&mut levels[levels_read..next_levels_read])?;
          for i in levels_read..levels_read + num_def_levels {
            if levels[i] == self.descr.max_def_level() {
              values_to_read += 1;
            }
          }
        }
      } else {
        values_to_read = std::cmp::min(batch_size - values_read, (self.num_buffered_values - self.num_decoded_values) as usize);
      }

      if self.descr.max_rep_level() > 0 && rep_levels.is_some() {
        if let Some(ref mut levels) = rep_levels {
          let num_rep_levels = self.read_rep_levels(&mut levels[levels_read..next_levels_read])?;
          assert_eq!(num_def_levels, num_rep_levels, "rep/def level counts diverged");
          levels_read += num_rep_levels;
        }
      } else if def_levels.is_some() {
        levels_read += num_def_levels;
      } else {
        levels_read = next_levels_read;
      }

      let curr_values_read = self.read_values(&mut values[values_read..values_read + values_to_read])?;
      self.num_decoded_values += std::cmp::max(num_def_levels, curr_values_read) as u32;
      values_read += curr_values_read;
    }

    Ok((values_read, levels_read))
  }

  fn read_new_page(&mut self) -> Result<bool> {
    loop {
      match self.page_reader.next() {
        None => return Ok(false),
        Some(Err(e)) => return Err(e),
        Some(Ok(page @ Page::DictionaryPage { .. })) => {
          self.configure_dictionary(page)?;
          continue;
        },
        Some(Ok(Page::DataPage { buf, num_values, mut encoding, def_level_encoding, rep_level_encoding, .. })) => {
          self.num_buffered_values = num_values;
          self.num_decoded_values = 0;

          let mut buffer_ptr = buf;

          if self.descr.max_rep_level() > 0 {
            let mut rep_decoder = LevelDecoder::new(rep_level_encoding, self.descr.max_rep_level());
            let total_bytes = rep_decoder.set_data(buffer_ptr.all());
            buffer_ptr = buffer_ptr.start_from(total_bytes);
            self.rep_level_decoder = Some(rep_decoder);
          }
          if self.descr.max_def_level() > 0 {
            let mut def_decoder = LevelDecoder::new(def_level_encoding, self.descr.max_def_level());
            let total_bytes = def_decoder.set_data(buffer_ptr.all());
            buffer_ptr = buffer_ptr.start_from(total_bytes);
            self.def_level_decoder = Some(def_decoder);
          }

          if encoding == Encoding::PLAIN_DICTIONARY {
            encoding = Encoding::RLE_DICTIONARY;
          }

          if !self.decoders.contains_key(&encoding) && encoding != Encoding::RLE_DICTIONARY {
            let data_decoder = get_decoder::<T>(encoding, self.descr.type_length())?;
            self.decoders.insert(encoding, data_decoder);
          }
          let decoder = self.decoders.get_mut(&encoding).ok_or_else(|| general_err!("Decoder for dictionary-encoded page was not configured"))?;
          decoder.set_data(buffer_ptr, num_values as usize)?;
          self.current_encoding = Some(encoding);
          return Ok(true);
        },
        Some(Ok(Page::DataPageV2 {
          buf,
          num_values,
          encoding,
          def_levels_byte_len,
          rep_levels_byte_len,
          ..
        })) => {
          // DATA_PAGE_V2: levels stored uncompressed and unframed (no length
          // prefix -- their byte length is already in the header), followed
          // by the (possibly separately compressed) value block.
          self.num_buffered_values = num_values;
          self.num_decoded_values = 0;

          let mut offset = 0usize;
          if self.descr.max_rep_level() > 0 {
            let mut rep_decoder = LevelDecoder::new(Encoding::RLE, self.descr.max_rep_level());
            rep_decoder.set_data(buf.range(offset, rep_levels_byte_len as usize));
            offset += rep_levels_byte_len as usize;
            self.rep_level_decoder = Some(rep_decoder);
          }
          if self.descr.max_def_level() > 0 {
            let mut def_decoder = LevelDecoder::new(Encoding::RLE, self.descr.max_def_level());
            def_decoder.set_data(buf.range(offset, def_levels_byte_len as usize));
            offset += def_levels_byte_len as usize;
            self.def_level_decoder = Some(def_decoder);
          }

          let value_encoding = if encoding == Encoding::PLAIN_DICTIONARY { Encoding::RLE_DICTIONARY } else { encoding };
          if !self.decoders.contains_key(&value_encoding) && value_encoding != Encoding::RLE_DICTIONARY {
            let data_decoder = get_decoder::<T>(value_encoding, self.descr.type_length())?;
            self.decoders.insert(value_encoding, data_decoder);
          }
          let decoder = self.decoders.get_mut(&value_encoding).ok_or_else(|| general_err!("Decoder for dictionary-encoded v2 page was not configured"))?;
          decoder.set_data(buf.start_from(offset), num_values as usize)?;
          self.current_encoding = Some(value_encoding);
          return Ok(true);
        }
      }
    }
  }

  fn has_next(&mut self) -> Result<bool> {
    if self.num_buffered_values == 0 || self.num_buffered_values == self.num_decoded_values {
      if !self.read_new_page()? {
        Ok(false)
      } else {
        Ok(self.num_buffered_values != 0)
      }
    } else {
      Ok(true)
    }
  }

  fn read_rep_levels(&mut self, buffer: &mut [i16]) -> Result<usize> {
    self.rep_level_decoder.as_mut().expect("rep_level_decoder should be set").get(buffer)
  }

  fn read_def_levels(&mut self, buffer: &mut [i16]) -> Result<usize> {
    self.def_level_decoder.as_mut().expect("def_level_decoder should be set").get(buffer)
  }

  fn read_values(&mut self, buffer: &mut [T::T]) -> Result<usize> {
    let encoding = self.current_encoding.expect("current_encoding should be set");
    self.decoders.get_mut(&encoding).expect("decoder for current encoding should be set").get(buffer)
  }

  fn configure_dictionary(&mut self, page: Page) -> Result<()> {
    if self.decoders.contains_key(&Encoding::RLE_DICTIONARY) {
      return Err(general_err!("Column cannot have more than one dictionary"));
    }
    if let Page::DictionaryPage { buf, num_values, .. } = page {
      let mut plain: PlainDecoder<T> = PlainDecoder::new(self.descr.type_length());
      plain.set_data(buf, num_values as usize)?;
      let mut dict_values = vec![T::T::default(); num_values as usize];
      let n = plain.get(&mut dict_values)?;
      dict_values.truncate(n);

      let mut decoder: DictDecoder<T> = DictDecoder::new();
      decoder.set_dict(dict_values);
      self.decoders.insert(Encoding::RLE_DICTIONARY, Box::new(decoder));
      Ok(())
    } else {
      Err(general_err!("configure_dictionary called with a non-dictionary page"))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::basic::{LogicalType, Repetition};
  use crate::column::page::{Page, PageReader};
  use crate::data_type::{ByteArray, Int32Type as I32};
  use crate::encodings::encoding::{get_encoder, DictEncoder, Encoder};
  use crate::encodings::levels::LevelEncoder;
  use crate::schema::types::{ColumnDescriptor, ColumnPath, Type as SchemaType};
  use crate::util::memory::ByteBufferPtr;
  use std::collections::VecDeque;
  use std::sync::Arc;

  struct VecPageReader {
    pages: VecDeque<Page>
  }

  impl Iterator for VecPageReader {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
      self.pages.pop_front().map(Ok)
    }
  }

  impl PageReader for VecPageReader {
    fn skip_next_page(&mut self) -> Result<bool> {
      Ok(self.pages.pop_front().is_some())
    }
  }

  fn int32_descr(max_def: i16, max_rep: i16) -> ColumnDescPtr {
    let ty = SchemaType::primitive_type_builder("a", crate::basic::Type::INT32)
      .with_repetition(Repetition::REQUIRED)
      .with_logical_type(LogicalType::INT_32)
      .build()
      .unwrap();
    Arc::new(ColumnDescriptor::new(ty, max_def, max_rep, ColumnPath::from(vec!["a".to_string()])))
  }

  #[test]
  fn test_read_plain_int32_required() {
    let descr = int32_descr(0, 0);
    let mut enc: crate::encodings::encoding::PlainEncoder<I32> = crate::encodings::encoding::PlainEncoder::new();
    let data: Vec<i32> = (0..20).collect();
    enc.put(&data).unwrap();
    let bytes = enc.flush_buffer().unwrap();

    let page = Page::DataPage {
      buf: bytes,
      num_values: data.len() as u32,
      encoding: Encoding::PLAIN,
      def_level_encoding: Encoding::RLE,
      rep_level_encoding: Encoding::RLE,
      statistics: None
    };
    let reader = VecPageReader { pages: VecDeque::from(vec![page]) };
    let mut col_reader: ColumnReaderImpl<I32> = ColumnReaderImpl::new(descr, Box::new(reader));

    let mut out = vec![0i32; 20];
    let (values_read, _) = col_reader.read_batch(20, None, None, &mut out).unwrap();
    assert_eq!(values_read, 20);
    assert_eq!(out, data);
  }

  #[test]
  fn test_read_dictionary_encoded() {
    let descr = int32_descr(0, 0);
    let mut dict: DictEncoder<I32> = DictEncoder::new();
    let data = vec![1, 2, 1, 3, 2, 1];
    dict.put(&data).unwrap();
    let dict_bytes = dict.write_dict().unwrap();
    let indices_bytes = dict.write_indices().unwrap();

    let dict_page = Page::DictionaryPage { buf: dict_bytes, num_values: 3, encoding: Encoding::PLAIN, is_sorted: false };
    let data_page = Page::DataPage {
      buf: indices_bytes,
      num_values: data.len() as u32,
      encoding: Encoding::RLE_DICTIONARY,
      def_level_encoding: Encoding::RLE,
      rep_level_encoding: Encoding::RLE,
      statistics: None
    };
    let reader = VecPageReader { pages: VecDeque::from(vec![dict_page, data_page]) };
    let mut col_reader: ColumnReaderImpl<I32> = ColumnReaderImpl::new(descr, Box::new(reader));

    let mut out = vec![0i32; data.len()];
    let (values_read, _) = col_reader.read_batch(data.len(), None, None, &mut out).unwrap();
    assert_eq!(values_read, data.len());
    assert_eq!(out, data);
  }
}
