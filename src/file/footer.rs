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

//! Head/tail magic bytes and footer (de)serialization. Metadata structures
//! are thrift-compact encoded, and must round-trip bit-exact.

use std::io::{Read, Seek, SeekFrom, Write};

use thrift::protocol::{TCompactInputProtocol, TCompactOutputProtocol};

use crate::errors::Result;
use crate::file::metadata::FileMetaData;

/// `PAR1`, at both the start and end of every file.
pub const MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];
const FOOTER_LENGTH_SIZE: u64 = 4;
const TAIL_SIZE: u64 = FOOTER_LENGTH_SIZE + MAGIC.len() as u64;

pub fn write_magic<W: Write>(writer: &mut W) -> Result<()> {
  writer.write_all(&MAGIC)?;
  Ok(())
}

/// Thrift-compact-encodes `metadata` and appends the 4-byte little-endian
/// footer length and tail magic after it.
/// Returns the number of bytes written (footer body + length + tail magic).
pub fn write_footer<W: Write>(writer: &mut W, metadata: &FileMetaData) -> Result<u64> {
  let thrift_meta = metadata.to_thrift();
  let mut body = Vec::new();
  {
    let mut oprot = TCompactOutputProtocol::new(&mut body);
    thrift_meta.write_to_out_protocol(&mut oprot)?;
  }
  writer.write_all(&body)?;
  writer.write_all(&(body.len() as u32).to_le_bytes())?;
  writer.write_all(&MAGIC)?;
  Ok(body.len() as u64 + FOOTER_LENGTH_SIZE + MAGIC.len() as u64)
}

/// Opens a file-shaped byte source: validates head/tail magic, reads the
/// footer length from the last 8 bytes, and parses the footer. Returns the
/// metadata plus the byte offset the footer starts at (the first row
/// group's end, and the start of whatever indexes/bloom filters precede it).
pub fn read_footer<R: Read + Seek>(reader: &mut R) -> Result<(FileMetaData, u64)> {
  let file_len = reader.seek(SeekFrom::End(0))?;
  if file_len < TAIL_SIZE + MAGIC.len() as u64 {
    return Err(general_err!("file is too short to contain a valid footer ({} bytes)", file_len));
  }

  reader.seek(SeekFrom::Start(0))?;
  let mut head = [0u8; 4];
  reader.read_exact(&mut head)?;
  if head != MAGIC {
    return Err(general_err!("invalid head magic: {:?}", head));
  }

  reader.seek(SeekFrom::End(-(TAIL_SIZE as i64)))?;
  let mut tail = [0u8; TAIL_SIZE as usize];
  reader.read_exact(&mut tail)?;
  let footer_len = u32::from_le_bytes(tail[0..4].try_into().unwrap()) as u64;
  let tail_magic = &tail[4..8];
  if tail_magic != MAGIC {
    return Err(general_err!("invalid tail magic: {:?}", tail_magic));
  }

  let footer_start = file_len - TAIL_SIZE - footer_len;
  if footer_start < MAGIC.len() as u64 {
    return Err(general_err!("footer length {} overruns the start of the file", footer_len));
  }
  reader.seek(SeekFrom::Start(footer_start))?;
  let mut body = vec![0u8; footer_len as usize];
  reader.read_exact(&mut body)?;

  let mut iprot = TCompactInputProtocol::new(body.as_slice());
  let thrift_meta = crate::parquet_thrift::FileMetaData::read_from_in_protocol(&mut iprot)?;
  let metadata = FileMetaData::from_thrift(thrift_meta)?;
  Ok((metadata, footer_start))
}
