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

//! The record-level view of a file: the nested `Row`/`RowField` API and the
//! Dremel shredding engine (`deconstruct`/`reconstruct`) that translates
//! between it and per-column repetition/definition-level streams.

pub mod api;
pub mod shredding;

pub use api::{Decimal, Row, RowField};
pub use shredding::{deconstruct, deconstruct_batch, reconstruct, ColumnTriples};
