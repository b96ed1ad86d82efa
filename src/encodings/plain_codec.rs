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

//! Per-physical-type PLAIN wire format, factored out of `Encoder`/`Decoder`
//! so the generic `PlainEncoder<T>`/`PlainDecoder<T>` need only one impl
//! block each. Rust has no stable specialization, so the old approach of a
//! single blanket `impl<T> Decoder<T> for PlainDecoder<T>` with per-type
//! overrides isn't available; instead each physical type supplies its own
//! (non-overlapping, non-generic) `PlainCodec` impl, and the generic wrapper
//! just calls through `T::encode_plain`/`T::decode_plain`.

use crate::data_type::{
  BoolType, ByteArray, ByteArrayType, DataType, DoubleType, FixedLenByteArrayType, FloatType, Int32Type, Int64Type,
  Int96, Int96Type
};
use crate::errors::Result;
use crate::util::bit_util::{BitReader, BitWriter};

pub trait PlainCodec: DataType {
  /// Appends `values` to `writer` in PLAIN encoding.
  fn encode_plain(values: &[Self::T], writer: &mut BitWriter);

  /// Decodes up to `num_values` values from `reader` into `out[..num_values]`,
  /// returning the number actually decoded (fewer than requested at EOF).
  /// `type_length` is only meaningful for FIXED_LEN_BYTE_ARRAY.
  fn decode_plain(reader: &mut BitReader, num_values: usize, type_length: i32, out: &mut [Self::T]) -> Result<usize>;
}

impl PlainCodec for BoolType {
  fn encode_plain(values: &[bool], writer: &mut BitWriter) {
    for &v in values {
      writer.put_value(v, 1);
    }
  }

  fn decode_plain(reader: &mut BitReader, num_values: usize, _type_length: i32, out: &mut [bool]) -> Result<usize> {
    let mut n = 0;
    for slot in out.iter_mut().take(num_values) {
      match reader.get_value::<bool>(1) {
        Some(v) => {
          *slot = v;
          n += 1;
        },
        None => break
      }
    }
    Ok(n)
  }
}

macro_rules! fixed_width_codec {
  ($marker:ty, $value_ty:ty, $size:expr) => {
    impl PlainCodec for $marker {
      fn encode_plain(values: &[$value_ty], writer: &mut BitWriter) {
        for &v in values {
          writer.put_aligned::<$value_ty>(v, $size);
        }
      }

      fn decode_plain(reader: &mut BitReader, num_values: usize, _type_length: i32, out: &mut [$value_ty]) -> Result<usize> {
        let mut n = 0;
        for slot in out.iter_mut().take(num_values) {
          match reader.get_aligned::<$value_ty>($size) {
            Some(v) => {
              *slot = v;
              n += 1;
            },
            None => break
          }
        }
        Ok(n)
      }
    }
  };
}

fixed_width_codec!(Int32Type, i32, 4);
fixed_width_codec!(Int64Type, i64, 8);
fixed_width_codec!(FloatType, f32, 4);
fixed_width_codec!(DoubleType, f64, 8);

impl PlainCodec for Int96Type {
  fn encode_plain(values: &[Int96], writer: &mut BitWriter) {
    for v in values {
      for &word in v.data() {
        writer.put_aligned::<u32>(word, 4);
      }
    }
  }

  fn decode_plain(reader: &mut BitReader, num_values: usize, _type_length: i32, out: &mut [Int96]) -> Result<usize> {
    let mut n = 0;
    for slot in out.iter_mut().take(num_values) {
      let mut words = Vec::with_capacity(3);
      let mut ok = true;
      for _ in 0..3 {
        match reader.get_aligned::<u32>(4) {
          Some(w) => words.push(w),
          None => {
            ok = false;
            break;
          }
        }
      }
      if !ok {
        break;
      }
      slot.set_data(words);
      n += 1;
    }
    Ok(n)
  }
}

impl PlainCodec for ByteArrayType {
  fn encode_plain(values: &[ByteArray], writer: &mut BitWriter) {
    for v in values {
      writer.put_aligned::<i32>(v.len() as i32, 4);
      writer.put_aligned_bytes(v.data());
    }
  }

  fn decode_plain(reader: &mut BitReader, num_values: usize, _type_length: i32, out: &mut [ByteArray]) -> Result<usize> {
    let mut n = 0;
    for slot in out.iter_mut().take(num_values) {
      let len = match reader.get_aligned::<i32>(4) {
        Some(l) if l >= 0 => l as usize,
        Some(_) => return Err(general_err!("Negative BYTE_ARRAY length in PLAIN data")),
        None => break
      };
      match reader.get_aligned_bytes(len) {
        Some(bytes) => {
          slot.set_data(bytes);
          n += 1;
        },
        None => break
      }
    }
    Ok(n)
  }
}

impl PlainCodec for FixedLenByteArrayType {
  fn encode_plain(values: &[ByteArray], writer: &mut BitWriter) {
    for v in values {
      writer.put_aligned_bytes(v.data());
    }
  }

  fn decode_plain(reader: &mut BitReader, num_values: usize, type_length: i32, out: &mut [ByteArray]) -> Result<usize> {
    let len = type_length as usize;
    let mut n = 0;
    for slot in out.iter_mut().take(num_values) {
      match reader.get_aligned_bytes(len) {
        Some(bytes) => {
          slot.set_data(bytes);
          n += 1;
        },
        None => break
      }
    }
    Ok(n)
  }
}
