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

//! Value-level types backing the eight physical leaf kinds, and the marker
//! structs (`Int32Type`, `ByteArrayType`, ...) used to monomorphize codecs,
//! column buffers and readers/writers over them.

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use crate::basic::Type as PhysicalType;
use crate::util::memory::ByteBufferPtr;

/// A 12-byte fixed width value, used for the deprecated INT96 timestamp
/// representation. Stored as three little-endian `u32` words to match the
/// on-disk layout exactly.
#[derive(Clone, Debug, Default)]
pub struct Int96 {
  value: Option<Vec<u32>>
}

impl Int96 {
  pub fn new() -> Self {
    Int96 { value: None }
  }

  /// Returns the underlying little-endian `u32` words.
  pub fn data(&self) -> &[u32] {
    self.value.as_ref().expect("set_data() should have been called")
  }

  pub fn set_data(&mut self, data: Vec<u32>) {
    assert_eq!(data.len(), 3, "Int96 must be initialized with 3 u32 words");
    self.value = Some(data);
  }
}

impl From<Vec<u32>> for Int96 {
  fn from(data: Vec<u32>) -> Self {
    let mut v = Self::new();
    v.set_data(data);
    v
  }
}

impl PartialEq for Int96 {
  fn eq(&self, other: &Int96) -> bool {
    self.data() == other.data()
  }
}

/// A variable length byte sequence, shared (never copied) via `ByteBufferPtr`.
#[derive(Clone, Debug, Default)]
pub struct ByteArray {
  data: Option<ByteBufferPtr>
}

impl ByteArray {
  pub fn new() -> Self {
    ByteArray { data: None }
  }

  pub fn data(&self) -> &[u8] {
    self.data.as_ref().map(|b| b.data()).unwrap_or(&[])
  }

  pub fn set_data(&mut self, data: ByteBufferPtr) {
    self.data = Some(data);
  }

  pub fn len(&self) -> usize {
    self.data().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl From<Vec<u8>> for ByteArray {
  fn from(buf: Vec<u8>) -> Self {
    let mut v = Self::new();
    v.set_data(ByteBufferPtr::new(buf));
    v
  }
}

impl From<&str> for ByteArray {
  fn from(s: &str) -> Self {
    ByteArray::from(s.as_bytes().to_vec())
  }
}

impl PartialEq for ByteArray {
  fn eq(&self, other: &ByteArray) -> bool {
    self.data() == other.data()
  }
}

impl PartialOrd for ByteArray {
  fn partial_cmp(&self, other: &ByteArray) -> Option<Ordering> {
    self.data().partial_cmp(other.data())
  }
}

impl fmt::Display for ByteArray {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:?}", self.data())
  }
}

/// Marker trait implemented by the Rust value representation of every
/// physical type (`bool`, `i32`, `i64`, `Int96`, `f32`, `f64`, `ByteArray`).
/// Kept separate from `DataType` so that generic code can bound on "is a
/// legal column value" without dragging in the whole codec-dispatch surface.
pub trait ParquetValue: 'static + Clone + PartialEq + fmt::Debug + Default + Send {}

impl ParquetValue for bool {}
impl ParquetValue for i32 {}
impl ParquetValue for i64 {}
impl ParquetValue for Int96 {}
impl ParquetValue for f32 {}
impl ParquetValue for f64 {}
impl ParquetValue for ByteArray {}

/// Maps a marker type (`Int32Type`, ...) to its physical kind and Rust value
/// representation. One impl per physical type; per-value code dispatches on
/// `T::get_physical_type()` but is otherwise monomorphic in `T`, matching the
/// "dispatch once per page, not per value" guidance for the eight physical
/// kinds.
pub trait DataType: 'static + Send {
  type T: ParquetValue;

  fn get_physical_type() -> PhysicalType;

  /// Size in bytes of one value of `T`, for physical types where that is a
  /// fixed constant (`0` for variable-length `BYTE_ARRAY`).
  fn get_type_size() -> usize;
}

macro_rules! make_type {
  ($name:ident, $physical_ty:expr, $value_ty:ty, $size:expr) => {
    /// Marker type used to parametrize codecs, buffers and readers/writers.
    pub struct $name {}

    impl DataType for $name {
      type T = $value_ty;

      fn get_physical_type() -> PhysicalType {
        $physical_ty
      }

      fn get_type_size() -> usize {
        $size
      }
    }
  };
}

make_type!(BoolType, PhysicalType::BOOLEAN, bool, 1);
make_type!(Int32Type, PhysicalType::INT32, i32, 4);
make_type!(Int64Type, PhysicalType::INT64, i64, 8);
make_type!(Int96Type, PhysicalType::INT96, Int96, 12);
make_type!(FloatType, PhysicalType::FLOAT, f32, 4);
make_type!(DoubleType, PhysicalType::DOUBLE, f64, 8);
make_type!(ByteArrayType, PhysicalType::BYTE_ARRAY, ByteArray, 0);
make_type!(FixedLenByteArrayType, PhysicalType::FIXED_LEN_BYTE_ARRAY, ByteArray, 0);

/// Returns the little-endian byte representation of a fixed-width value.
/// Implemented per concrete Rust value type rather than generically, so the
/// unsafe transmute stays confined to types actually known to be POD.
pub trait AsBytes {
  fn as_bytes(&self) -> &[u8];
}

impl AsBytes for bool {
  fn as_bytes(&self) -> &[u8] {
    unsafe { ::std::slice::from_raw_parts(self as *const bool as *const u8, 1) }
  }
}

macro_rules! as_bytes_impl {
  ($ty:ty) => {
    impl AsBytes for $ty {
      fn as_bytes(&self) -> &[u8] {
        unsafe {
          ::std::slice::from_raw_parts(self as *const $ty as *const u8, mem::size_of::<$ty>())
        }
      }
    }
  };
}

as_bytes_impl!(i32);
as_bytes_impl!(i64);
as_bytes_impl!(u32);
as_bytes_impl!(u64);
as_bytes_impl!(f32);
as_bytes_impl!(f64);

impl AsBytes for Int96 {
  fn as_bytes(&self) -> &[u8] {
    unsafe { ::std::slice::from_raw_parts(self.data().as_ptr() as *const u8, 12) }
  }
}

impl AsBytes for ByteArray {
  fn as_bytes(&self) -> &[u8] {
    self.data()
  }
}

impl AsBytes for [u8] {
  fn as_bytes(&self) -> &[u8] {
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_byte_array_from_str() {
    let ba = ByteArray::from("hello");
    assert_eq!(ba.data(), b"hello");
  }

  #[test]
  fn test_int96_eq() {
    let a = Int96::from(vec![1, 2, 3]);
    let b = Int96::from(vec![1, 2, 3]);
    let c = Int96::from(vec![1, 2, 4]);
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn test_physical_type_mapping() {
    assert_eq!(Int32Type::get_physical_type(), PhysicalType::INT32);
    assert_eq!(Int32Type::get_type_size(), 4);
    assert_eq!(ByteArrayType::get_type_size(), 0);
  }
}
