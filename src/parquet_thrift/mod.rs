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

//! Plain generated bindings for `columnar_format.thrift`, produced by
//! `build.rs` (either by invoking the system `thrift` compiler, or, with the
//! `download-thrift-gen` feature, by fetching a pre-generated file). Nothing
//! outside this module and `file::metadata` should name these types
//! directly; everything else works against `schema::types::Type` and
//! `file::metadata::FileMetaData`.

#[cfg(not(feature = "download-thrift-gen"))]
mod columnar_format {
  include!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/parquet_thrift/gen-rs/columnar_format.rs"));
}

#[cfg(feature = "download-thrift-gen")]
mod columnar_format {
  include!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/parquet_thrift/columnar_format.rs"));
}

pub use columnar_format::*;
