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

//! Page compression. Codecs are pure functions over byte slices; none
//! of them retain a reference past `compress`/`decompress` returning.

use std::io::{Read, Write};

use crate::basic::Compression;
use crate::errors::Result;

pub trait Codec {
  fn compress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()>;

  fn decompress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()>;
}

pub fn create_codec(codec: Compression) -> Result<Option<Box<dyn Codec>>> {
  match codec {
    Compression::UNCOMPRESSED => Ok(None),
    Compression::SNAPPY => Ok(Some(Box::new(SnappyCodec))),
    Compression::GZIP => Ok(Some(Box::new(GzipCodec))),
    Compression::BROTLI => Ok(Some(Box::new(BrotliCodec))),
    Compression::LZ4 | Compression::LZ4_RAW => Ok(Some(Box::new(Lz4Codec))),
    Compression::ZSTD => Ok(Some(Box::new(ZstdCodec))),
    Compression::LZO => Err(nyi_err!("LZO is not implemented"))
  }
}

struct SnappyCodec;

impl Codec for SnappyCodec {
  fn compress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let mut encoder = snap::write::FrameEncoder::new(dst);
    encoder.write_all(src)?;
    encoder.flush()?;
    Ok(())
  }

  fn decompress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let mut decoder = snap::read::FrameDecoder::new(src);
    decoder.read_to_end(dst)?;
    Ok(())
  }
}

struct GzipCodec;

impl Codec for GzipCodec {
  fn compress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let mut encoder = flate2::write::GzEncoder::new(dst, flate2::Compression::default());
    encoder.write_all(src)?;
    encoder.finish()?;
    Ok(())
  }

  fn decompress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let mut decoder = flate2::read::GzDecoder::new(src);
    decoder.read_to_end(dst)?;
    Ok(())
  }
}

struct BrotliCodec;

impl Codec for BrotliCodec {
  fn compress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let params = brotli::enc::BrotliEncoderParams::default();
    brotli::BrotliCompress(&mut &src[..], dst, &params)
      .map_err(|e| general_err!("Brotli compression failed: {}", e))?;
    Ok(())
  }

  fn decompress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    brotli::BrotliDecompress(&mut &src[..], dst).map_err(|e| general_err!("Brotli decompression failed: {}", e))?;
    Ok(())
  }
}

struct Lz4Codec;

impl Codec for Lz4Codec {
  fn compress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let mut encoder = lz4::EncoderBuilder::new().build(dst)?;
    encoder.write_all(src)?;
    let (_, result) = encoder.finish();
    result?;
    Ok(())
  }

  fn decompress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let mut decoder = lz4::Decoder::new(src)?;
    decoder.read_to_end(dst)?;
    Ok(())
  }
}

struct ZstdCodec;

impl Codec for ZstdCodec {
  fn compress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let compressed = zstd::stream::encode_all(src, 0).map_err(|e| general_err!("Zstd compression failed: {}", e))?;
    dst.extend_from_slice(&compressed);
    Ok(())
  }

  fn decompress(&mut self, src: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let decompressed = zstd::stream::decode_all(src).map_err(|e| general_err!("Zstd decompression failed: {}", e))?;
    dst.extend_from_slice(&decompressed);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn round_trip(codec: Compression) {
    let data = b"the quick brown fox jumps over the lazy dog, repeated, repeated, repeated".to_vec();
    let mut c = create_codec(codec).unwrap().unwrap();
    let mut compressed = Vec::new();
    c.compress(&data, &mut compressed).unwrap();
    let mut decompressed = Vec::new();
    c.decompress(&compressed, &mut decompressed).unwrap();
    assert_eq!(decompressed, data);
  }

  #[test]
  fn test_snappy_round_trip() {
    round_trip(Compression::SNAPPY);
  }

  #[test]
  fn test_gzip_round_trip() {
    round_trip(Compression::GZIP);
  }

  #[test]
  fn test_zstd_round_trip() {
    round_trip(Compression::ZSTD);
  }

  #[test]
  fn test_lz4_round_trip() {
    round_trip(Compression::LZ4);
  }

  #[test]
  fn test_brotli_round_trip() {
    round_trip(Compression::BROTLI);
  }

  #[test]
  fn test_uncompressed_has_no_codec() {
    assert!(create_codec(Compression::UNCOMPRESSED).unwrap().is_none());
  }
}
