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

//! The `Row` API: a nested, logical-type-aware view of one record,
//! produced by `shredding::reconstruct` and consumed by `deconstruct`.

use std::fmt;

use crate::basic::{LogicalType, Type as PhysicalType};
use crate::data_type::{ByteArray, Int96};

macro_rules! nyi {
  ($physical_type:expr, $logical_type:expr, $value:expr) => {{
    unimplemented!("Conversion for physical type {}, logical type {}, value {:?}", $physical_type, $logical_type, $value);
  }};
}

/// A nested Parquet record: an ordered list of named fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
  fields: Vec<(String, RowField)>
}

impl Row {
  pub fn new(fields: Vec<(String, RowField)>) -> Self {
    Row { fields }
  }

  pub fn fields(&self) -> &[(String, RowField)] {
    &self.fields
  }

  pub fn get(&self, name: &str) -> Option<&RowField> {
    self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
  }
}

impl fmt::Display for Row {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in self.fields.iter().enumerate() {
      key.fmt(f)?;
      write!(f, ": ")?;
      value.fmt(f)?;
      if i < self.fields.len() - 1 {
        write!(f, ", ")?;
      }
    }
    write!(f, "}}")
  }
}

/// One field's decoded value, logical-type-aware (a BYTE_ARRAY with UTF8
/// annotation decodes to `Str`, not `Bytes`; an INT32 with DATE to `Date`).
#[derive(Clone, Debug, PartialEq)]
pub enum RowField {
  Null,
  Bool(bool),
  Byte(i8),
  Short(i16),
  Int(i32),
  Long(i64),
  UByte(u8),
  UShort(u16),
  UInt(u32),
  ULong(u64),
  Float(f32),
  Double(f64),
  Decimal(Decimal),
  Str(String),
  Bytes(ByteArray),
  Date(i32),
  /// Time of day; unit implied by which `convert_*` produced it.
  TimeMillis(i32),
  TimeMicros(i64),
  /// Milliseconds/microseconds/nanoseconds since the Unix epoch.
  TimestampMillis(i64),
  TimestampMicros(i64),
  TimestampNanos(i64),
  /// Raw INT96 words for the write path. Read-side INT96 values always
  /// decode to `TimestampMillis` via `convert_int96`; this variant exists so
  /// a caller can write an INT96 column (gated on
  /// `WriterProperties::enable_int96_writes`) without going through
  /// `ColumnWriterImpl<Int96Type>` directly.
  Int96(Int96),
  Group(Row),
  List(Vec<RowField>),
  Map(Vec<(RowField, RowField)>)
}

/// An unscaled integer plus the scale/precision it was decoded with --
/// callers divide by `10^scale` themselves rather than this crate picking a
/// floating-point or bignum representation for them.
#[derive(Clone, Debug, PartialEq)]
pub struct Decimal {
  pub unscaled: i128,
  pub scale: i32,
  pub precision: i32
}

impl RowField {
  pub fn convert_bool(_physical_type: PhysicalType, _logical_type: LogicalType, value: bool) -> Self {
    RowField::Bool(value)
  }

  pub fn convert_int32(physical_type: PhysicalType, logical_type: LogicalType, value: i32) -> Self {
    match logical_type {
      LogicalType::INT_8 => RowField::Byte(value as i8),
      LogicalType::INT_16 => RowField::Short(value as i16),
      LogicalType::INT_32 | LogicalType::NONE => RowField::Int(value),
      LogicalType::UINT_8 => RowField::UByte(value as u8),
      LogicalType::UINT_16 => RowField::UShort(value as u16),
      LogicalType::UINT_32 => RowField::UInt(value as u32),
      LogicalType::DATE => RowField::Date(value),
      LogicalType::TIME_MILLIS => RowField::TimeMillis(value),
      LogicalType::DECIMAL => RowField::Decimal(Decimal { unscaled: value as i128, scale: 0, precision: 0 }),
      _ => nyi!(physical_type, logical_type, value)
    }
  }

  /// Like `convert_int32`, but for a DECIMAL annotation whose scale/precision
  /// the caller has in hand from the schema node (the flat `LogicalType`
  /// enum carries no payload, see `basic::LogicalType`).
  pub fn convert_int32_decimal(value: i32, scale: i32, precision: i32) -> Self {
    RowField::Decimal(Decimal { unscaled: value as i128, scale, precision })
  }

  pub fn convert_int64(physical_type: PhysicalType, logical_type: LogicalType, value: i64) -> Self {
    match logical_type {
      LogicalType::INT_64 | LogicalType::NONE => RowField::Long(value),
      LogicalType::UINT_64 => RowField::ULong(value as u64),
      LogicalType::TIME_MICROS => RowField::TimeMicros(value),
      LogicalType::TIMESTAMP_MILLIS => RowField::TimestampMillis(value),
      LogicalType::TIMESTAMP_MICROS => RowField::TimestampMicros(value),
      LogicalType::TIMESTAMP_NANOS => RowField::TimestampNanos(value),
      LogicalType::DECIMAL => RowField::Decimal(Decimal { unscaled: value as i128, scale: 0, precision: 0 }),
      _ => nyi!(physical_type, logical_type, value)
    }
  }

  pub fn convert_int64_decimal(value: i64, scale: i32, precision: i32) -> Self {
    RowField::Decimal(Decimal { unscaled: value as i128, scale, precision })
  }

  /// INT96 nanosecond-precision timestamp, Julian-day + nanoseconds-of-day
  /// encoded, converted to milliseconds since the Unix epoch.
  pub fn convert_int96(_physical_type: PhysicalType, _logical_type: LogicalType, value: Int96) -> Self {
    let julian_to_unix_epoch_days: u64 = 2_440_588;
    let milli_seconds_in_a_day: u64 = 86_400_000;
    let nano_seconds_in_a_day: u64 = milli_seconds_in_a_day * 1_000_000;

    let days_since_epoch = value.data()[2] as u64 - julian_to_unix_epoch_days;
    let nanoseconds: u64 = ((value.data()[1] as u64) << 32) + value.data()[0] as u64;
    let nanos = days_since_epoch * nano_seconds_in_a_day + nanoseconds;
    let millis = nanos / 1_000_000;

    RowField::TimestampMillis(millis as i64)
  }

  pub fn convert_float(_physical_type: PhysicalType, _logical_type: LogicalType, value: f32) -> Self {
    RowField::Float(value)
  }

  pub fn convert_double(_physical_type: PhysicalType, _logical_type: LogicalType, value: f64) -> Self {
    RowField::Double(value)
  }

  pub fn convert_byte_array(physical_type: PhysicalType, logical_type: LogicalType, value: ByteArray) -> Self {
    match physical_type {
      PhysicalType::BYTE_ARRAY | PhysicalType::FIXED_LEN_BYTE_ARRAY => match logical_type {
        LogicalType::UTF8 | LogicalType::ENUM | LogicalType::JSON => {
          let s = String::from_utf8(value.data().to_vec()).unwrap_or_else(|e| {
            String::from_utf8_lossy(e.as_bytes()).into_owned()
          });
          RowField::Str(s)
        },
        LogicalType::UUID | LogicalType::BSON | LogicalType::NONE => RowField::Bytes(value),
        LogicalType::DECIMAL => {
          let unscaled = be_bytes_to_i128(value.data());
          RowField::Decimal(Decimal { unscaled, scale: 0, precision: 0 })
        },
        _ => nyi!(physical_type, logical_type, value)
      },
      _ => nyi!(physical_type, logical_type, value)
    }
  }

  pub fn convert_byte_array_decimal(value: ByteArray, scale: i32, precision: i32) -> Self {
    RowField::Decimal(Decimal { unscaled: be_bytes_to_i128(value.data()), scale, precision })
  }
}

/// Big-endian two's-complement bytes (the `FIXED_LEN_BYTE_ARRAY`/`BYTE_ARRAY`
/// DECIMAL representation) to `i128`, sign-extending from the narrower width.
fn be_bytes_to_i128(bytes: &[u8]) -> i128 {
  if bytes.is_empty() {
    return 0;
  }
  let negative = bytes[0] & 0x80 != 0;
  let mut buf = if negative { [0xffu8; 16] } else { [0u8; 16] };
  let start = 16 - bytes.len().min(16);
  buf[start..].copy_from_slice(&bytes[bytes.len().saturating_sub(16)..]);
  i128::from_be_bytes(buf)
}

impl fmt::Display for RowField {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      RowField::Null => write!(f, "null"),
      RowField::Bool(value) => write!(f, "{}", value),
      RowField::Byte(value) => write!(f, "{}", value),
      RowField::Short(value) => write!(f, "{}", value),
      RowField::Int(value) => write!(f, "{}", value),
      RowField::Long(value) => write!(f, "{}", value),
      RowField::UByte(value) => write!(f, "{}", value),
      RowField::UShort(value) => write!(f, "{}", value),
      RowField::UInt(value) => write!(f, "{}", value),
      RowField::ULong(value) => write!(f, "{}", value),
      RowField::Float(value) => write!(f, "{:?}", value),
      RowField::Double(value) => write!(f, "{:?}", value),
      RowField::Decimal(d) => write!(f, "{}e-{}", d.unscaled, d.scale),
      RowField::Str(value) => write!(f, "\"{}\"", value),
      RowField::Bytes(value) => write!(f, "{:?}", value.data()),
      RowField::Date(value) => write!(f, "{}", value),
      RowField::TimeMillis(value) => write!(f, "{}", value),
      RowField::TimeMicros(value) => write!(f, "{}", value),
      RowField::TimestampMillis(value) => write!(f, "{}", value),
      RowField::TimestampMicros(value) => write!(f, "{}", value),
      RowField::TimestampNanos(value) => write!(f, "{}", value),
      RowField::Int96(value) => write!(f, "{:?}", value.data()),
      RowField::Group(fields) => write!(f, "{}", fields),
      RowField::List(fields) => {
        write!(f, "[")?;
        for (i, field) in fields.iter().enumerate() {
          field.fmt(f)?;
          if i < fields.len() - 1 {
            write!(f, ", ")?;
          }
        }
        write!(f, "]")
      },
      RowField::Map(pairs) => {
        write!(f, "{{")?;
        for (i, (key, value)) in pairs.iter().enumerate() {
          key.fmt(f)?;
          write!(f, " -> ")?;
          value.fmt(f)?;
          if i < pairs.len() - 1 {
            write!(f, ", ")?;
          }
        }
        write!(f, "}}")
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_row_convert_bool() {
    assert_eq!(RowField::convert_bool(PhysicalType::BOOLEAN, LogicalType::NONE, true), RowField::Bool(true));
  }

  #[test]
  fn test_row_convert_int32() {
    assert_eq!(RowField::convert_int32(PhysicalType::INT32, LogicalType::INT_8, 111), RowField::Byte(111));
    assert_eq!(RowField::convert_int32(PhysicalType::INT32, LogicalType::INT_16, 222), RowField::Short(222));
    assert_eq!(RowField::convert_int32(PhysicalType::INT32, LogicalType::INT_32, 333), RowField::Int(333));
    assert_eq!(RowField::convert_int32(PhysicalType::INT32, LogicalType::DATE, 19000), RowField::Date(19000));
  }

  #[test]
  fn test_row_convert_int64() {
    assert_eq!(RowField::convert_int64(PhysicalType::INT64, LogicalType::INT_64, 1111), RowField::Long(1111));
    assert_eq!(
      RowField::convert_int64(PhysicalType::INT64, LogicalType::TIMESTAMP_MICROS, 2222),
      RowField::TimestampMicros(2222)
    );
  }

  #[test]
  fn test_row_convert_int96() {
    let value = Int96::from(vec![0, 0, 2454923]);
    let row = RowField::convert_int96(PhysicalType::INT96, LogicalType::NONE, value);
    assert_eq!(row, RowField::TimestampMillis(1238544000000));
  }

  #[test]
  fn test_row_convert_byte_array() {
    let value = ByteArray::from(vec![b'A', b'B', b'C', b'D']);
    assert_eq!(
      RowField::convert_byte_array(PhysicalType::BYTE_ARRAY, LogicalType::UTF8, value),
      RowField::Str("ABCD".to_string())
    );

    let value = ByteArray::from(vec![1, 2, 3, 4, 5]);
    assert_eq!(
      RowField::convert_byte_array(PhysicalType::BYTE_ARRAY, LogicalType::NONE, value.clone()),
      RowField::Bytes(value)
    );
  }

  #[test]
  fn test_decimal_from_bytes_negative() {
    // -1 as a two's-complement byte.
    let value = ByteArray::from(vec![0xff]);
    let row = RowField::convert_byte_array_decimal(value, 2, 5);
    assert_eq!(row, RowField::Decimal(Decimal { unscaled: -1, scale: 2, precision: 5 }));
  }

  #[test]
  fn test_row_display() {
    let fields = vec![
      ("x".to_string(), RowField::Null),
      ("y".to_string(), RowField::Int(2)),
      ("z".to_string(), RowField::Str("abc".to_string()))
    ];
    let row = RowField::Group(Row::new(fields));
    assert_eq!(format!("{}", row), "{x: null, y: 2, z: \"abc\"}");

    let row = RowField::List(vec![RowField::Int(2), RowField::Null, RowField::Int(12)]);
    assert_eq!(format!("{}", row), "[2, null, 12]");
  }
}
