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

//! Small randomized-input helpers shared by the codec/column/shredding test
//! modules. Deliberately hand-rolled rather than pulled from a fuzz-testing
//! crate, matching how the rest of this codebase tests itself.

use rand::distributions::uniform::SampleUniform;
use rand::distributions::Standard;
use rand::prelude::*;

use crate::data_type::{
  BoolType, ByteArray, ByteArrayType, DataType, DoubleType, FixedLenByteArrayType,
  FloatType, Int32Type, Int64Type, Int96, Int96Type
};

/// Appends `n` pseudo-random values in `[min, max)` to `out`.
pub fn random_numbers_range<T>(n: usize, min: T, max: T, out: &mut Vec<T>)
where
  T: SampleUniform + PartialOrd + Copy
{
  let mut rng = rand::thread_rng();
  for _ in 0..n {
    out.push(rng.gen_range(min..max));
  }
}

/// Generates a vector of `n` pseudo-random values of `T::T`. `_seed` is
/// accepted for call-site symmetry with the historical API but unused --
/// `thread_rng` is reseeded on every process anyway.
pub trait RandGen<T: DataType> {
  fn gen(_seed: i32) -> T::T;

  fn gen_vec(seed: i32, n: usize) -> Vec<T::T> {
    (0..n).map(|_| Self::gen(seed)).collect()
  }
}

impl RandGen<BoolType> for BoolType {
  fn gen(_seed: i32) -> bool {
    rand::thread_rng().gen()
  }
}

impl RandGen<Int32Type> for Int32Type {
  fn gen(_seed: i32) -> i32 {
    rand::thread_rng().gen()
  }
}

impl RandGen<Int64Type> for Int64Type {
  fn gen(_seed: i32) -> i64 {
    rand::thread_rng().gen()
  }
}

impl RandGen<Int96Type> for Int96Type {
  fn gen(_seed: i32) -> Int96 {
    let mut rng = rand::thread_rng();
    Int96::from(vec![rng.gen(), rng.gen(), rng.gen::<u32>() % 1_000_000 + 2_440_000])
  }
}

impl RandGen<FloatType> for FloatType {
  fn gen(_seed: i32) -> f32 {
    rand::thread_rng().sample(Standard)
  }
}

impl RandGen<DoubleType> for DoubleType {
  fn gen(_seed: i32) -> f64 {
    rand::thread_rng().sample(Standard)
  }
}

impl RandGen<ByteArrayType> for ByteArrayType {
  fn gen(_seed: i32) -> ByteArray {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(1..10);
    let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    ByteArray::from(bytes)
  }
}

impl RandGen<FixedLenByteArrayType> for FixedLenByteArrayType {
  fn gen(_seed: i32) -> ByteArray {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..8).map(|_| rng.gen()).collect();
    ByteArray::from(bytes)
  }
}
