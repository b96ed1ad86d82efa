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

//! Per-page/per-column-chunk statistics: min/max under the physical type's
//! natural ordering, plus null and (when cheap) distinct counts.
//!
//! BOOLEAN carries `min`/`max` like every other type (an open question this
//! implementation resolves in favor of consistency -- see DESIGN.md)
//! rather than being statistics-exempt.

use ordered_float::OrderedFloat;

use crate::data_type::{ByteArray, Int96};

macro_rules! statistics_enum {
  ($($variant:ident($ty:ty)),+ $(,)?) => {
    /// Min/max/null-count bundle for one page or one column chunk (chunk
    /// statistics are the union of its pages', min-of-mins/max-of-maxes).
    #[derive(Clone, Debug, PartialEq)]
    pub enum Statistics {
      $($variant { min: Option<$ty>, max: Option<$ty>, null_count: u64, distinct_count: Option<u64> }),+
    }

    impl Statistics {
      pub fn null_count(&self) -> u64 {
        match self {
          $(Statistics::$variant { null_count, .. } => *null_count),+
        }
      }

      pub fn distinct_count(&self) -> Option<u64> {
        match self {
          $(Statistics::$variant { distinct_count, .. } => *distinct_count),+
        }
      }

      pub fn has_min_max_set(&self) -> bool {
        match self {
          $(Statistics::$variant { min, max, .. } => min.is_some() && max.is_some()),+
        }
      }
    }
  };
}

/// Plain-encodes one value to the bytes the wire `Statistics.min`/`.max`
/// fields carry -- the same byte shape `PlainCodec::encode_plain` produces
/// for a single-element buffer, duplicated here rather than shared so this
/// module stays independent of the encodings module's buffer-oriented API.
fn plain_bytes_bool(v: bool) -> Vec<u8> {
  vec![v as u8]
}

fn plain_bytes_i32(v: i32) -> Vec<u8> {
  v.to_le_bytes().to_vec()
}

fn plain_bytes_i64(v: i64) -> Vec<u8> {
  v.to_le_bytes().to_vec()
}

fn plain_bytes_f32(v: f32) -> Vec<u8> {
  v.to_le_bytes().to_vec()
}

fn plain_bytes_f64(v: f64) -> Vec<u8> {
  v.to_le_bytes().to_vec()
}

impl Statistics {
  /// Converts to the wire representation. `Int96` statistics are never
  /// populated (see `ColumnStatsValue for Int96Type`), so both fields come
  /// back `None`.
  pub fn to_thrift(&self) -> crate::parquet_thrift::Statistics {
    let (min, max): (Option<Vec<u8>>, Option<Vec<u8>>) = match self {
      Statistics::Boolean { min, max, .. } => (min.map(plain_bytes_bool), max.map(plain_bytes_bool)),
      Statistics::Int32 { min, max, .. } => (min.map(plain_bytes_i32), max.map(plain_bytes_i32)),
      Statistics::Int64 { min, max, .. } => (min.map(plain_bytes_i64), max.map(plain_bytes_i64)),
      Statistics::Int96 { .. } => (None, None),
      Statistics::Float { min, max, .. } => (min.map(|v| plain_bytes_f32(v.0)), max.map(|v| plain_bytes_f32(v.0))),
      Statistics::Double { min, max, .. } => (min.map(|v| plain_bytes_f64(v.0)), max.map(|v| plain_bytes_f64(v.0))),
      Statistics::ByteArray { min, max, .. } => (min.as_ref().map(|v| v.data().to_vec()), max.as_ref().map(|v| v.data().to_vec())),
      Statistics::FixedLenByteArray { min, max, .. } => (min.as_ref().map(|v| v.data().to_vec()), max.as_ref().map(|v| v.data().to_vec()))
    };
    crate::parquet_thrift::Statistics {
      max: max.clone(),
      min: min.clone(),
      null_count: Some(self.null_count() as i64),
      distinct_count: self.distinct_count().map(|c| c as i64),
      max_value: max,
      min_value: min
    }
  }

  /// Rebuilds from the wire representation for a known physical type.
  /// Prefers the newer `min_value`/`max_value` fields, falling back to the
  /// deprecated `min`/`max` ones when a writer only populated those.
  pub fn from_thrift(physical_type: crate::basic::Type, t: &crate::parquet_thrift::Statistics) -> crate::errors::Result<Statistics> {
    use crate::basic::Type as PhysicalType;
    let null_count = t.null_count.unwrap_or(0).max(0) as u64;
    let distinct_count = t.distinct_count.map(|c| c.max(0) as u64);
    let min_bytes = t.min_value.as_ref().or(t.min.as_ref());
    let max_bytes = t.max_value.as_ref().or(t.max.as_ref());

    macro_rules! bound {
      ($bytes:expr, $f:expr) => {
        $bytes.map(|b| $f(b))
      };
    }

    Ok(match physical_type {
      PhysicalType::BOOLEAN => Statistics::Boolean {
        min: bound!(min_bytes, |b: &Vec<u8>| b[0] != 0),
        max: bound!(max_bytes, |b: &Vec<u8>| b[0] != 0),
        null_count,
        distinct_count
      },
      PhysicalType::INT32 => Statistics::Int32 {
        min: bound!(min_bytes, |b: &Vec<u8>| i32::from_le_bytes(b[..4].try_into().unwrap())),
        max: bound!(max_bytes, |b: &Vec<u8>| i32::from_le_bytes(b[..4].try_into().unwrap())),
        null_count,
        distinct_count
      },
      PhysicalType::INT64 => Statistics::Int64 {
        min: bound!(min_bytes, |b: &Vec<u8>| i64::from_le_bytes(b[..8].try_into().unwrap())),
        max: bound!(max_bytes, |b: &Vec<u8>| i64::from_le_bytes(b[..8].try_into().unwrap())),
        null_count,
        distinct_count
      },
      PhysicalType::INT96 => Statistics::Int96 { min: None, max: None, null_count, distinct_count },
      PhysicalType::FLOAT => Statistics::Float {
        min: bound!(min_bytes, |b: &Vec<u8>| OrderedFloat(f32::from_le_bytes(b[..4].try_into().unwrap()))),
        max: bound!(max_bytes, |b: &Vec<u8>| OrderedFloat(f32::from_le_bytes(b[..4].try_into().unwrap()))),
        null_count,
        distinct_count
      },
      PhysicalType::DOUBLE => Statistics::Double {
        min: bound!(min_bytes, |b: &Vec<u8>| OrderedFloat(f64::from_le_bytes(b[..8].try_into().unwrap()))),
        max: bound!(max_bytes, |b: &Vec<u8>| OrderedFloat(f64::from_le_bytes(b[..8].try_into().unwrap()))),
        null_count,
        distinct_count
      },
      PhysicalType::BYTE_ARRAY => Statistics::ByteArray {
        min: bound!(min_bytes, |b: &Vec<u8>| ByteArray::from(b.clone())),
        max: bound!(max_bytes, |b: &Vec<u8>| ByteArray::from(b.clone())),
        null_count,
        distinct_count
      },
      PhysicalType::FIXED_LEN_BYTE_ARRAY => Statistics::FixedLenByteArray {
        min: bound!(min_bytes, |b: &Vec<u8>| ByteArray::from(b.clone())),
        max: bound!(max_bytes, |b: &Vec<u8>| ByteArray::from(b.clone())),
        null_count,
        distinct_count
      }
    })
  }
}

statistics_enum!(
  Boolean(bool),
  Int32(i32),
  Int64(i64),
  Int96(Int96),
  Float(OrderedFloat<f32>),
  Double(OrderedFloat<f64>),
  ByteArray(ByteArray),
  FixedLenByteArray(ByteArray)
);

/// Accumulates statistics over the values `write_row` appends to one column
/// buffer, reset alongside it at row-group flush.
pub trait StatisticsBuilder<T> {
  fn update(&mut self, value: Option<&T>);

  fn build(&self) -> Statistics;
}

pub struct BoundedStatsBuilder<T: Clone + PartialOrd> {
  min: Option<T>,
  max: Option<T>,
  null_count: u64
}

impl<T: Clone + PartialOrd> BoundedStatsBuilder<T> {
  pub fn new() -> Self {
    BoundedStatsBuilder { min: None, max: None, null_count: 0 }
  }

  pub fn update(&mut self, value: Option<&T>) {
    match value {
      None => self.null_count += 1,
      Some(v) => {
        if self.min.as_ref().map_or(true, |m| v < m) {
          self.min = Some(v.clone());
        }
        if self.max.as_ref().map_or(true, |m| v > m) {
          self.max = Some(v.clone());
        }
      }
    }
  }

  pub fn min(&self) -> Option<&T> {
    self.min.as_ref()
  }

  pub fn max(&self) -> Option<&T> {
    self.max.as_ref()
  }

  pub fn null_count(&self) -> u64 {
    self.null_count
  }
}

impl<T: Clone + PartialOrd> Default for BoundedStatsBuilder<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// Builds a page/chunk `Statistics` value from accumulated min/max/null-count,
/// one impl per physical type (the same non-overlapping-impl pattern as
/// `PlainCodec`, since `Int96` has no natural ordering and can't share a
/// blanket `T::T: PartialOrd` impl with the rest).
pub trait ColumnStatsValue: crate::data_type::DataType {
  /// Folds one value into the running min/max, in place. A no-op for
  /// `Int96Type`, which has no natural total order.
  fn update_min_max(value: &Self::T, min: &mut Option<Self::T>, max: &mut Option<Self::T>);

  fn make_statistics(min: Option<Self::T>, max: Option<Self::T>, null_count: u64) -> Statistics;
}

macro_rules! ordered_stats_impl {
  ($marker:ty, $variant:ident) => {
    impl ColumnStatsValue for $marker {
      fn update_min_max(value: &Self::T, min: &mut Option<Self::T>, max: &mut Option<Self::T>) {
        if min.as_ref().map_or(true, |m| value < m) {
          *min = Some(value.clone());
        }
        if max.as_ref().map_or(true, |m| value > m) {
          *max = Some(value.clone());
        }
      }

      fn make_statistics(min: Option<Self::T>, max: Option<Self::T>, null_count: u64) -> Statistics {
        Statistics::$variant { min, max, null_count, distinct_count: None }
      }
    }
  };
}

use crate::data_type::{BoolType, ByteArrayType, DoubleType, FixedLenByteArrayType, FloatType, Int32Type, Int64Type, Int96Type};

ordered_stats_impl!(BoolType, Boolean);
ordered_stats_impl!(Int32Type, Int32);
ordered_stats_impl!(Int64Type, Int64);
ordered_stats_impl!(ByteArrayType, ByteArray);
ordered_stats_impl!(FixedLenByteArrayType, FixedLenByteArray);

impl ColumnStatsValue for FloatType {
  fn update_min_max(value: &f32, min: &mut Option<f32>, max: &mut Option<f32>) {
    if min.map_or(true, |m| *value < m) {
      *min = Some(*value);
    }
    if max.map_or(true, |m| *value > m) {
      *max = Some(*value);
    }
  }

  fn make_statistics(min: Option<f32>, max: Option<f32>, null_count: u64) -> Statistics {
    Statistics::Float { min: min.map(OrderedFloat), max: max.map(OrderedFloat), null_count, distinct_count: None }
  }
}

impl ColumnStatsValue for DoubleType {
  fn update_min_max(value: &f64, min: &mut Option<f64>, max: &mut Option<f64>) {
    if min.map_or(true, |m| *value < m) {
      *min = Some(*value);
    }
    if max.map_or(true, |m| *value > m) {
      *max = Some(*value);
    }
  }

  fn make_statistics(min: Option<f64>, max: Option<f64>, null_count: u64) -> Statistics {
    Statistics::Double { min: min.map(OrderedFloat), max: max.map(OrderedFloat), null_count, distinct_count: None }
  }
}

/// INT96 is deprecated by the format and has no natural total order; this
/// crate never populates its min/max (an open question resolved the other
/// way for BOOLEAN, but INT96 genuinely lacks a comparator).
impl ColumnStatsValue for Int96Type {
  fn update_min_max(_value: &crate::data_type::Int96, _min: &mut Option<crate::data_type::Int96>, _max: &mut Option<crate::data_type::Int96>) {}

  fn make_statistics(_min: Option<crate::data_type::Int96>, _max: Option<crate::data_type::Int96>, null_count: u64) -> Statistics {
    Statistics::Int96 { min: None, max: None, null_count, distinct_count: None }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bounded_stats_builder() {
    let mut b: BoundedStatsBuilder<i32> = BoundedStatsBuilder::new();
    b.update(Some(&5));
    b.update(None);
    b.update(Some(&1));
    b.update(Some(&9));
    assert_eq!(b.min(), Some(&1));
    assert_eq!(b.max(), Some(&9));
    assert_eq!(b.null_count(), 1);
  }

  #[test]
  fn test_boolean_statistics_has_min_max() {
    let stats = Statistics::Boolean { min: Some(false), max: Some(true), null_count: 0, distinct_count: None };
    assert!(stats.has_min_max_set());
  }
}
