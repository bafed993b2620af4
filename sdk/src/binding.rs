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
//! Hard binding strategies for the two-pass manifest builder.
//!
//! A manifest's `c2pa.hash.data` assertion excludes the bytes the manifest
//! itself occupies in the image, so its contents depend on the encoded size
//! of the manifest. A [`BindingStrategy`] supplies those exclusions, either
//! from lengths the caller already knows ([`PrecomputedBinding`]) or by
//! embedding the manifest and measuring the result ([`EmbeddedBinding`]).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    assertions::{ClaimThumbnail, DataHash, Exclusion, ThumbnailSource},
    asset_handlers::{
        jpeg_io::{
            insert_segments, insertion_point,
            markers::{APP1, APP11},
            AppSegment, JpegSegmentTable, APPN_HEADER_LEN,
        },
        xt_splitter::embedded_len,
    },
    builder::ManifestIdentity,
    settings::Settings,
    utils::{
        hash_utils::hash_sha256_base64,
        thumbnail::{ImageThumbnailer, ThumbnailGenerator},
    },
    Error, Result,
};

/// Values shared by every pass of one build.
#[derive(Clone, Copy, Debug)]
pub struct PassContext<'a> {
    pub identity: &'a ManifestIdentity,
    /// XMP packet written to APP1, namespace signature included.
    pub xmp: &'a [u8],
    pub settings: &'a Settings,
}

/// Output of one pass: the encoded manifest store and its APP11 chunks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedManifest {
    jumbf: Vec<u8>,
    chunks: Vec<Vec<u8>>,
}

impl EncodedManifest {
    pub fn new(jumbf: Vec<u8>, chunks: Vec<Vec<u8>>) -> Self {
        EncodedManifest { jumbf, chunks }
    }

    /// The unsplit stream, XT header included.
    pub fn jumbf(&self) -> &[u8] {
        &self.jumbf
    }

    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    /// Bytes the chunks occupy once written as APP11 segments.
    pub fn embedded_len(&self) -> usize {
        embedded_len(&self.chunks)
    }

    pub(crate) fn into_chunks(self) -> Vec<Vec<u8>> {
        self.chunks
    }
}

/// Supplies the hard binding and thumbnail for each pass.
pub trait BindingStrategy: Send + Sync {
    /// Thumbnail assertion payload. Called once per build.
    fn thumbnail(&self, ctx: &PassContext) -> Result<ClaimThumbnail>;

    /// Binding for the first pass, before the manifest size is known.
    fn initial_binding(&self, ctx: &PassContext) -> Result<DataHash>;

    /// Binding whose exclusions cover `previous` as it would be embedded.
    fn measured_binding(&self, ctx: &PassContext, previous: &EncodedManifest) -> Result<DataHash>;
}

/// Image facts computed by a client that keeps the image to itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    /// Bytes reserved for the thumbnail the client writes later.
    pub thumbnail_assertion_length: usize,
    /// Base64 SHA-256 of that thumbnail.
    pub thumbnail_hash: String,
    /// Offset where the APP11 manifest segments will be written.
    pub jumbf_insertion_point: usize,
    /// Offset where the APP1 XMP segment will be written.
    pub xmp_insertion_point: usize,
}

/// Binding for the on-device flow.
///
/// The client hashes its own image and reports where it will insert the
/// provenance segments. The thumbnail assertion holds a placeholder that the
/// client overwrites with the real thumbnail.
#[derive(Clone, Debug)]
pub struct PrecomputedBinding {
    content_hash: String,
    meta: ImageMeta,
}

impl PrecomputedBinding {
    /// `content_hash` is the base64 SHA-256 of the image from SOS to EOF.
    pub fn new(content_hash: &str, meta: ImageMeta) -> Self {
        PrecomputedBinding {
            content_hash: content_hash.to_owned(),
            meta,
        }
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn meta(&self) -> &ImageMeta {
        &self.meta
    }
}

impl BindingStrategy for PrecomputedBinding {
    fn thumbnail(&self, _ctx: &PassContext) -> Result<ClaimThumbnail> {
        Ok(ClaimThumbnail(ThumbnailSource::placeholder(
            &self.content_hash,
            &self.meta.thumbnail_hash,
            self.meta.thumbnail_assertion_length,
        )?))
    }

    fn initial_binding(&self, ctx: &PassContext) -> Result<DataHash> {
        Ok(DataHash::jpeg_content(
            &self.content_hash,
            vec![
                Exclusion::new(self.meta.xmp_insertion_point, ctx.xmp.len()),
                Exclusion::new(self.meta.jumbf_insertion_point, 0),
            ],
        ))
    }

    fn measured_binding(&self, ctx: &PassContext, previous: &EncodedManifest) -> Result<DataHash> {
        Ok(DataHash::jpeg_content(
            &self.content_hash,
            vec![
                Exclusion::new(self.meta.xmp_insertion_point, ctx.xmp.len() + APPN_HEADER_LEN),
                Exclusion::new(self.meta.jumbf_insertion_point, previous.embedded_len()),
            ],
        ))
    }
}

/// Binding for the server flow, where the image itself is supplied.
///
/// Each measured pass embeds the previous manifest into a copy of the image,
/// re-parses it and excludes the exact segment ranges it finds.
pub struct EmbeddedBinding {
    image: Vec<u8>,
    content_hash: String,
    thumbnailer: Box<dyn ThumbnailGenerator>,
}

impl EmbeddedBinding {
    /// Fails if `image` is not a JPEG with a start of scan segment.
    pub fn new(image: Vec<u8>) -> Result<Self> {
        let content_hash = content_hash(&image)?;
        Ok(EmbeddedBinding {
            image,
            content_hash,
            thumbnailer: Box::new(ImageThumbnailer),
        })
    }

    /// Replace the default `image` crate thumbnailer.
    pub fn with_thumbnailer(mut self, thumbnailer: Box<dyn ThumbnailGenerator>) -> Self {
        self.thumbnailer = thumbnailer;
        self
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Base64 SHA-256 of the image from SOS to EOF.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    // Embed the segments and locate them again in the result.
    fn measure(&self, xmp: &[u8], chunks: &[Vec<u8>]) -> Result<Measured> {
        let mut segments = Vec::with_capacity(chunks.len() + 1);
        segments.push(AppSegment::new(APP1, xmp.to_vec()));
        segments.extend(chunks.iter().map(|c| AppSegment::new(APP11, c.clone())));
        let embedded = insert_segments(&self.image, &segments)?;

        let table = JpegSegmentTable::parse(&embedded)?;
        let content_hash = hash_sha256_base64(table.sos_to_end_of_file()?.content);

        let xmp_segment = table
            .segments()
            .iter()
            .find(|s| s.marker == APP1 && table.segment_payload(s) == xmp)
            .ok_or_else(|| Error::JpegParsing("inserted XMP segment not found".to_string()))?;

        let jumbf = match chunks.first() {
            None => Exclusion::new(insertion_point(&embedded, APP11)?, 0),
            Some(first) => {
                let found = table.segments();
                let index = found
                    .iter()
                    .position(|s| s.marker == APP11 && table.segment_payload(s) == first.as_slice())
                    .ok_or_else(|| {
                        Error::JpegParsing("inserted manifest segments not found".to_string())
                    })?;
                let run = found.get(index..index + chunks.len()).ok_or_else(|| {
                    Error::JpegParsing("inserted manifest segments are truncated".to_string())
                })?;

                let contiguous = run.iter().zip(chunks).all(|(s, c)| {
                    s.marker == APP11 && table.segment_payload(s) == c.as_slice()
                }) && run.windows(2).all(|w| w[0].end + 1 == w[1].start);
                if !contiguous {
                    return Err(Error::JpegParsing(
                        "inserted manifest segments are not contiguous".to_string(),
                    ));
                }

                Exclusion::new(run[0].start, run.iter().map(|s| s.length()).sum())
            }
        };

        debug!(
            "measured XMP at {} ({} bytes), manifest at {} ({} bytes)",
            xmp_segment.start,
            xmp_segment.length(),
            jumbf.start,
            jumbf.length
        );

        Ok(Measured {
            content_hash,
            xmp: Exclusion::new(xmp_segment.start, xmp_segment.length()),
            jumbf,
        })
    }
}

struct Measured {
    content_hash: String,
    xmp: Exclusion,
    jumbf: Exclusion,
}

impl BindingStrategy for EmbeddedBinding {
    fn thumbnail(&self, ctx: &PassContext) -> Result<ClaimThumbnail> {
        let thumbnail = self
            .thumbnailer
            .generate(&self.image, &ctx.settings.thumbnail)?;
        Ok(ClaimThumbnail(ThumbnailSource::Embedded(thumbnail)))
    }

    fn initial_binding(&self, ctx: &PassContext) -> Result<DataHash> {
        let measured = self.measure(ctx.xmp, &[])?;
        // same shape as the precomputed flow: unframed XMP, empty manifest
        Ok(DataHash::jpeg_content(
            &measured.content_hash,
            vec![
                Exclusion::new(measured.xmp.start, ctx.xmp.len()),
                measured.jumbf,
            ],
        ))
    }

    fn measured_binding(&self, ctx: &PassContext, previous: &EncodedManifest) -> Result<DataHash> {
        let measured = self.measure(ctx.xmp, previous.chunks())?;
        Ok(DataHash::jpeg_content(
            &measured.content_hash,
            vec![measured.xmp, measured.jumbf],
        ))
    }
}

/// Base64 SHA-256 of the bytes from SOS to EOF.
pub fn content_hash(image: &[u8]) -> Result<String> {
    let table = JpegSegmentTable::parse(image)?;
    Ok(hash_sha256_base64(table.sos_to_end_of_file()?.content))
}
