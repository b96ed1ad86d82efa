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

//! The file level: magic bytes and footer (`footer`), statistics
//! (`statistics`), footer structures (`metadata`), writer/reader
//! configuration (`properties`), and the `SerializedFileReader`/
//! `SerializedFileWriter` that tie the column layer to an actual byte source.

pub mod footer;
pub mod metadata;
pub mod properties;
pub mod reader;
pub mod statistics;
pub mod writer;

pub use metadata::{ColumnChunkMetaData, ColumnIndex, FileMetaData, OffsetIndex, RowGroupMetaData};
pub use properties::{BloomFilterConfig, ReaderProperties, SortingColumn, WriterProperties};
pub use reader::{FileReader, RowGroupReader, SerializedFileReader};
pub use statistics::Statistics;
pub use writer::{RowGroupWriter, SerializedFileWriter};
