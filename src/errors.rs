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

//! Common error handling. All public entry points return `Result<T>`, a
//! shorthand for `std::result::Result<T, ParquetError>`.

use std::io;

use quick_error::quick_error;
use thrift::Error as ThriftError;

quick_error! {
  /// Set of errors reported by this crate.
  #[derive(Debug, Clone, PartialEq)]
  pub enum ParquetError {
    /// Generic error, with a descriptive message.
    General(message: String) {
      display("Parquet error: {}", message)
    }
    /// "Not yet implemented" error, for encodings/features not supported yet.
    NYI(message: String) {
      display("NYI: {}", message)
    }
    /// Unexpected end of stream while decoding.
    EOF(message: String) {
      display("EOF: {}", message)
    }
    /// A record's shape disagreed with its schema, e.g. wrong physical type,
    /// an unannotated nested list, or a value count mismatch for a repeated field.
    Schema(message: String) {
      display("Schema error: {}", message)
    }
    /// CRC32C on a page body disagreed with the value recorded in its header.
    ChecksumMismatch(message: String) {
      display("Checksum mismatch: {}", message)
    }
    /// Head/tail magic bytes did not match, or the footer could not be located.
    FooterError(message: String) {
      display("Footer error: {}", message)
    }
    /// Propagated I/O failure from the underlying byte source.
    Io(message: String) {
      display("IO error: {}", message)
    }
  }
}

impl From<io::Error> for ParquetError {
  fn from(e: io::Error) -> ParquetError {
    ParquetError::Io(format!("{}", e))
  }
}

impl From<ThriftError> for ParquetError {
  fn from(e: ThriftError) -> ParquetError {
    ParquetError::General(format!("Thrift error: {}", e))
  }
}

impl From<::std::string::FromUtf8Error> for ParquetError {
  fn from(e: ::std::string::FromUtf8Error) -> ParquetError {
    ParquetError::General(format!("{}", e))
  }
}

/// Returns whether `err` is the `BufferFull` condition (spec'd as a recoverable,
/// locally-handled error: the row group assembler flushes the open page and
/// retries the batch that triggered it). There is no dedicated enum variant
/// because the only legal response to it is "flush and retry right here" --
/// promoting it to a distinct error kind would let it leak past that one call
/// site by accident.
pub fn is_buffer_full(err: &ParquetError) -> bool {
  match *err {
    ParquetError::General(ref message) => message.starts_with("BufferFull"),
    _ => false
  }
}

/// Convenience to build the `BufferFull` condition.
macro_rules! buffer_full_err {
  () => ({
    $crate::errors::ParquetError::General(format!("BufferFull"))
  });
  ($fmt:expr, $($args:tt)*) => ({
    $crate::errors::ParquetError::General(format!(concat!("BufferFull: ", $fmt), $($args)*))
  });
}

/// Returns whether `err` is the `RowGroupFull` condition: the row group has hit
/// its configured `max_row_group_size`/`byte_size_threshold` and the caller
/// should close it and start a new one rather than writing more rows into it.
pub fn is_row_group_full(err: &ParquetError) -> bool {
  match *err {
    ParquetError::General(ref message) => message.starts_with("RowGroupFull"),
    _ => false
  }
}

/// Convenience to build the `RowGroupFull` condition.
macro_rules! row_group_full_err {
  () => ({
    $crate::errors::ParquetError::General(format!("RowGroupFull"))
  });
  ($fmt:expr, $($args:tt)*) => ({
    $crate::errors::ParquetError::General(format!(concat!("RowGroupFull: ", $fmt), $($args)*))
  });
}

macro_rules! general_err {
  ($fmt:expr) => ($crate::errors::ParquetError::General($fmt.to_string()));
  ($fmt:expr, $($args:tt)*) => ($crate::errors::ParquetError::General(format!($fmt, $($args)*)));
}

macro_rules! nyi_err {
  ($fmt:expr) => ($crate::errors::ParquetError::NYI($fmt.to_string()));
  ($fmt:expr, $($args:tt)*) => ($crate::errors::ParquetError::NYI(format!($fmt, $($args)*)));
}

macro_rules! eof_err {
  ($fmt:expr) => ($crate::errors::ParquetError::EOF($fmt.to_string()));
  ($fmt:expr, $($args:tt)*) => ($crate::errors::ParquetError::EOF(format!($fmt, $($args)*)));
}

macro_rules! schema_err {
  ($fmt:expr) => ($crate::errors::ParquetError::Schema($fmt.to_string()));
  ($fmt:expr, $($args:tt)*) => ($crate::errors::ParquetError::Schema(format!($fmt, $($args)*)));
}

/// A specialized `Result` for this crate's fallible operations.
pub type Result<T> = ::std::result::Result<T, ParquetError>;
