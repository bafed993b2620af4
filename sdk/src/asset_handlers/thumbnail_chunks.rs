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

//! Removes a thumbnail placeholder from split JUMBF chunks and records where
//! the real thumbnail bytes have to be written back.

use serde::{Deserialize, Serialize};

use crate::{
    asset_handlers::xt_splitter::XT_SHARED_HEADER_LEN,
    error::{Error, Result},
};

/// Bytes of one chunk a caller must fill with thumbnail data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailSegment {
    /// Index of the chunk.
    pub index: usize,
    /// Offset inside the chunk, header bytes included.
    pub start: usize,
    pub length: usize,
}

/// Chunks with the placeholder removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrippedChunks {
    pub chunks: Vec<Vec<u8>>,
    pub thumbnail_segments: Vec<ThumbnailSegment>,
}

// Where a chunk payload [lo, hi) sits relative to the placeholder [ts, te).
#[derive(Debug, PartialEq, Eq)]
enum Overlap {
    Before,
    After,
    Inside,
    ContainsWhole,
    ContainsStart,
    ContainsEnd,
}

fn classify(lo: usize, hi: usize, ts: usize, te: usize) -> Overlap {
    if hi <= ts {
        Overlap::Before
    } else if te <= lo {
        Overlap::After
    } else if ts <= lo && hi <= te {
        Overlap::Inside
    } else if lo <= ts && te <= hi {
        Overlap::ContainsWhole
    } else if lo <= ts {
        Overlap::ContainsStart
    } else {
        Overlap::ContainsEnd
    }
}

/// Remove `placeholder_len` bytes starting at `placeholder_start` from the
/// chunks.
///
/// `placeholder_start` is an offset into the stream before it was split,
/// shared header included. Chunks shrink by the bytes removed; the returned
/// descriptors say where those bytes were, one per affected chunk.
pub fn strip_placeholder(
    chunks: Vec<Vec<u8>>,
    placeholder_start: usize,
    placeholder_len: usize,
) -> Result<StrippedChunks> {
    if placeholder_len == 0 {
        return Ok(StrippedChunks {
            chunks,
            thumbnail_segments: Vec::new(),
        });
    }
    if placeholder_start < XT_SHARED_HEADER_LEN {
        return Err(Error::BadParam(
            "thumbnail placeholder overlaps the chunk header".to_string(),
        ));
    }

    let ts = placeholder_start;
    let te = placeholder_start + placeholder_len;

    let mut stripped = Vec::with_capacity(chunks.len());
    let mut thumbnail_segments = Vec::new();
    let mut cursor = XT_SHARED_HEADER_LEN;

    for (index, chunk) in chunks.into_iter().enumerate() {
        if chunk.len() < XT_SHARED_HEADER_LEN {
            return Err(Error::BadParam(format!(
                "chunk {index} is shorter than its header"
            )));
        }
        let payload_len = chunk.len() - XT_SHARED_HEADER_LEN;
        let lo = cursor;
        let hi = cursor + payload_len;
        cursor = hi;

        if payload_len == 0 {
            stripped.push(chunk);
            continue;
        }

        let (start, length) = match classify(lo, hi, ts, te) {
            Overlap::Before | Overlap::After => {
                stripped.push(chunk);
                continue;
            }
            Overlap::Inside => (XT_SHARED_HEADER_LEN, payload_len),
            Overlap::ContainsWhole => (XT_SHARED_HEADER_LEN + ts - lo, placeholder_len),
            Overlap::ContainsStart => {
                let start = XT_SHARED_HEADER_LEN + ts - lo;
                (start, chunk.len() - start)
            }
            Overlap::ContainsEnd => (XT_SHARED_HEADER_LEN, te - lo),
        };

        let mut kept = Vec::with_capacity(chunk.len() - length);
        kept.extend_from_slice(&chunk[..start]);
        kept.extend_from_slice(&chunk[start + length..]);
        stripped.push(kept);
        thumbnail_segments.push(ThumbnailSegment {
            index,
            start,
            length,
        });
    }

    let removed: usize = thumbnail_segments.iter().map(|s| s.length).sum();
    if removed != placeholder_len {
        return Err(Error::BadParam(format!(
            "thumbnail placeholder [{ts}, {te}) runs past the end of the stream"
        )));
    }

    Ok(StrippedChunks {
        chunks: stripped,
        thumbnail_segments,
    })
}

/// Write thumbnail bytes back into stripped chunks.
///
/// `thumbnail` must be exactly as long as the descriptors together.
pub fn patch_thumbnail(
    chunks: &[Vec<u8>],
    segments: &[ThumbnailSegment],
    thumbnail: &[u8],
) -> Result<Vec<Vec<u8>>> {
    let total: usize = segments.iter().map(|s| s.length).sum();
    if total != thumbnail.len() {
        return Err(Error::BadParam(format!(
            "thumbnail is {} bytes but {total} bytes were reserved",
            thumbnail.len()
        )));
    }

    let mut patched = chunks.to_vec();
    let mut offset = 0;
    for segment in segments {
        let chunk = patched.get_mut(segment.index).ok_or_else(|| {
            Error::BadParam(format!("no chunk with index {}", segment.index))
        })?;
        if segment.start > chunk.len() {
            return Err(Error::BadParam(format!(
                "thumbnail offset {} is outside chunk {}",
                segment.start, segment.index
            )));
        }
        let tail = chunk.split_off(segment.start);
        chunk.extend_from_slice(&thumbnail[offset..offset + segment.length]);
        chunk.extend_from_slice(&tail);
        offset += segment.length;
    }
    Ok(patched)
}
