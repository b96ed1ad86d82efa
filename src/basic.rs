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

//! Basic enum types shared across the crate: physical types, logical type
//! annotations, repetition classes, encodings and compression codec ids.

use std::fmt;
use std::str::FromStr;

use crate::errors::ParquetError;

/// Physical (on-disk) leaf value kind. Every leaf schema node carries exactly
/// one of these; logical types annotate a physical type, they never replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
  BOOLEAN,
  INT32,
  INT64,
  /// 12-byte fixed, legacy nanosecond timestamp representation.
  INT96,
  FLOAT,
  DOUBLE,
  BYTE_ARRAY,
  FIXED_LEN_BYTE_ARRAY
}

/// Logical type annotation. Flat "converted type" shape, matching the
/// original Parquet thrift `ConvertedType` enum; scale/precision/type-length
/// and the UTC-adjustment flag live on the owning schema node rather than in
/// the enum payload (see `schema::types::Type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum LogicalType {
  NONE,
  UTF8,
  MAP,
  MAP_KEY_VALUE,
  LIST,
  ENUM,
  DECIMAL,
  DATE,
  TIME_MILLIS,
  TIME_MICROS,
  TIME_NANOS,
  TIMESTAMP_MILLIS,
  TIMESTAMP_MICROS,
  TIMESTAMP_NANOS,
  UINT_8,
  UINT_16,
  UINT_32,
  UINT_64,
  INT_8,
  INT_16,
  INT_32,
  INT_64,
  JSON,
  BSON,
  INTERVAL,
  UUID
}

/// Repetition class of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
  REQUIRED,
  OPTIONAL,
  REPEATED
}

/// Value/level/index encoding identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum Encoding {
  PLAIN,
  /// Deprecated alias of RLE_DICTIONARY used in dictionary/data page v1 headers.
  PLAIN_DICTIONARY,
  RLE,
  BIT_PACKED,
  DELTA_BINARY_PACKED,
  DELTA_LENGTH_BYTE_ARRAY,
  DELTA_BYTE_ARRAY,
  RLE_DICTIONARY
}

/// Page compression codec identifier, bit-exact with the format's enum ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
  UNCOMPRESSED,
  SNAPPY,
  GZIP,
  LZO,
  BROTLI,
  LZ4,
  ZSTD,
  LZ4_RAW
}

impl Compression {
  pub fn codec_id(self) -> u8 {
    match self {
      Compression::UNCOMPRESSED => 0,
      Compression::SNAPPY => 1,
      Compression::GZIP => 2,
      Compression::LZO => 3,
      Compression::BROTLI => 4,
      Compression::LZ4 => 5,
      Compression::ZSTD => 6,
      Compression::LZ4_RAW => 7
    }
  }

  pub fn from_codec_id(id: u8) -> crate::errors::Result<Self> {
    Ok(match id {
      0 => Compression::UNCOMPRESSED,
      1 => Compression::SNAPPY,
      2 => Compression::GZIP,
      3 => Compression::LZO,
      4 => Compression::BROTLI,
      5 => Compression::LZ4,
      6 => Compression::ZSTD,
      7 => Compression::LZ4_RAW,
      other => return Err(general_err!("Unknown compression codec id {}", other))
    })
  }
}

/// Page type, as recorded in a page header's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
  DATA_PAGE_V1,
  DATA_PAGE_V2,
  DICTIONARY_PAGE,
  INDEX_PAGE
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl fmt::Display for LogicalType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl fmt::Display for Repetition {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl fmt::Display for Encoding {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl fmt::Display for Compression {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl fmt::Display for PageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self)
  }
}

impl FromStr for Compression {
  type Err = ParquetError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "UNCOMPRESSED" => Ok(Compression::UNCOMPRESSED),
      "SNAPPY" => Ok(Compression::SNAPPY),
      "GZIP" => Ok(Compression::GZIP),
      "LZO" => Ok(Compression::LZO),
      "BROTLI" => Ok(Compression::BROTLI),
      "LZ4" => Ok(Compression::LZ4),
      "ZSTD" => Ok(Compression::ZSTD),
      "LZ4_RAW" => Ok(Compression::LZ4_RAW),
      other => Err(general_err!("Unknown compression codec name {}", other))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_compression_codec_id_roundtrip() {
    for c in &[
      Compression::UNCOMPRESSED, Compression::SNAPPY, Compression::GZIP,
      Compression::LZO, Compression::BROTLI, Compression::LZ4,
      Compression::ZSTD, Compression::LZ4_RAW
    ] {
      let id = c.codec_id();
      assert_eq!(Compression::from_codec_id(id).unwrap(), *c);
    }
  }

  #[test]
  fn test_compression_from_str() {
    assert_eq!("zstd".parse::<Compression>().unwrap(), Compression::ZSTD);
    assert!("nonsense".parse::<Compression>().is_err());
  }

  #[test]
  fn test_display() {
    assert_eq!(format!("{}", Type::INT32), "INT32");
    assert_eq!(format!("{}", Encoding::RLE_DICTIONARY), "RLE_DICTIONARY");
  }
}
