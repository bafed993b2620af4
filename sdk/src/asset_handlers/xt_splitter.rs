// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Splits a JUMBF stream across APP11 segments using the JPEG XT box
//! continuation scheme.
//!
//! Every chunk carries `CI + En (4) | Z (4) | LBox + TBox (8)` followed by a
//! slice of the box payload. `Z` is the packet sequence number, starting at 1.

use byteorder::{BigEndian, ByteOrder};
use log::debug;

use crate::error::{Error, Result};

/// Largest APPn segment, length field included.
pub const MAX_APPN_SIZE: usize = u16::MAX as usize;

/// APP11 overhead per chunk: segment length (2), `CI + En` (4), `Z` (4),
/// `LBox + TBox` (8) and two bytes of slack.
pub const XT_HEADER_LEN: usize = 20;

/// Largest payload slice per chunk.
pub const MAX_XT_CHUNK_SIZE: usize = MAX_APPN_SIZE - XT_HEADER_LEN;

/// Bytes copied from the front of the stream into every chunk.
pub const XT_SHARED_HEADER_LEN: usize = 16;

/// Split `buf` into chunks carrying at most `chunk_size` payload bytes each.
///
/// `chunk_size` is clamped to [`MAX_XT_CHUNK_SIZE`]. A stream that already
/// fits is returned unchanged as a single chunk.
pub fn split(buf: &[u8], chunk_size: usize) -> Result<Vec<Vec<u8>>> {
    let chunk_size = chunk_size.min(MAX_XT_CHUNK_SIZE);
    if chunk_size == 0 {
        return Err(Error::BadParam("XT chunk size must not be zero".to_string()));
    }

    if buf.len() <= chunk_size {
        return Ok(vec![buf.to_vec()]);
    }
    if buf.len() < XT_SHARED_HEADER_LEN {
        return Err(Error::BadParam(format!(
            "JUMBF stream of {} bytes is too short for an XT header",
            buf.len()
        )));
    }

    let common_id_and_instance = &buf[0..4];
    let lbox_tbox = &buf[8..XT_SHARED_HEADER_LEN];
    let payload = &buf[XT_SHARED_HEADER_LEN..];

    let mut chunks = Vec::with_capacity(payload.len().div_ceil(chunk_size));
    for (i, piece) in payload.chunks(chunk_size).enumerate() {
        let mut sequence = [0u8; 4];
        BigEndian::write_u32(&mut sequence, u32::try_from(i + 1)?);

        let mut chunk = Vec::with_capacity(XT_SHARED_HEADER_LEN + piece.len());
        chunk.extend_from_slice(common_id_and_instance);
        chunk.extend_from_slice(&sequence);
        chunk.extend_from_slice(lbox_tbox);
        chunk.extend_from_slice(piece);
        chunks.push(chunk);
    }

    debug!(
        "split {} byte JUMBF stream into {} chunks",
        buf.len(),
        chunks.len()
    );
    Ok(chunks)
}

/// Total bytes the chunks occupy once written as APPn segments.
pub fn embedded_len(chunks: &[Vec<u8>]) -> usize {
    chunks
        .iter()
        .map(|c| crate::asset_handlers::jpeg_io::APPN_HEADER_LEN + c.len())
        .sum()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const FAKE_HEADER: &str = "4A500001000000010000010e6a756d62";

    fn stream(payload: &[u8]) -> Vec<u8> {
        let mut buf = hex::decode(FAKE_HEADER).unwrap();
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn small_stream_is_untouched() {
        let buf = stream(b"Hello, world");
        let chunks = split(&buf, MAX_XT_CHUNK_SIZE).unwrap();
        assert_eq!(chunks, vec![buf.clone()]);

        // exactly at the limit
        let chunks = split(&buf, buf.len()).unwrap();
        assert_eq!(chunks, vec![buf]);
    }

    #[test]
    fn splits_with_sequence_numbers() {
        let payload = b"Hello, world".repeat(16);
        let buf = stream(&payload);
        let chunks = split(&buf, 32).unwrap();

        assert_eq!(chunks.len(), payload.len().div_ceil(32));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(&chunk[0..4], &buf[0..4]);
            assert_eq!(BigEndian::read_u32(&chunk[4..8]) as usize, i + 1);
            assert_eq!(&chunk[8..16], &buf[8..16]);
        }
        assert_eq!(
            hex::encode(&chunks[1][..16]),
            "4a500001000000020000010e6a756d62"
        );

        let reassembled: Vec<u8> = chunks.iter().flat_map(|c| c[16..].to_vec()).collect();
        assert_eq!(reassembled, payload);
    }

    #[test]
    fn last_chunk_is_short() {
        let buf = stream(&[0xab; 70]);
        let chunks = split(&buf, 32).unwrap();
        let lens: Vec<usize> = chunks.iter().map(|c| c.len() - 16).collect();
        assert_eq!(lens, vec![32, 32, 6]);
    }

    #[test]
    fn chunk_size_is_clamped() {
        let buf = stream(&vec![7u8; MAX_XT_CHUNK_SIZE + 100]);
        let chunks = split(&buf, usize::MAX).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 16 + MAX_XT_CHUNK_SIZE);
        assert_eq!(chunks[1].len(), 16 + 100);
        assert!(chunks.iter().all(|c| c.len() + 2 <= MAX_APPN_SIZE));
    }

    #[test]
    fn rejects_unusable_input() {
        assert!(matches!(split(b"abc", 0), Err(Error::BadParam(_))));
        assert!(matches!(split(&[0u8; 10], 4), Err(Error::BadParam(_))));
    }

    #[test]
    fn embedded_length_counts_segment_headers() {
        let chunks = vec![vec![0u8; 10], vec![0u8; 3]];
        assert_eq!(embedded_len(&chunks), 4 + 10 + 4 + 3);
    }
}
