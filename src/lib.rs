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

//! A columnar file format core: schema definition and Dremel-style
//! shredding (`schema`, `record`), column-level encode/decode
//! (`column`, `encodings`), page compression (`compression`) and
//! probabilistic membership filters (`bloom_filter`), and the file-level
//! reader/writer that ties it all to a byte source (`file`).
//!
//! Wire structures are thrift-compact encoded; `parquet_thrift` holds the
//! generated bindings, and `file::metadata` is the only place that bridges
//! them to this crate's own enums and structs.

#[macro_use]
mod errors;

pub mod basic;
pub mod bloom_filter;
pub mod column;
pub mod compression;
pub mod data_type;
pub mod encodings;
pub mod file;
pub mod parquet_thrift;
pub mod record;
pub mod schema;
pub mod util;

pub use errors::{ParquetError, Result};
