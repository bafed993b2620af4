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

use crate::{
    assertion::{Assertion, AssertionBase, AssertionData},
    assertions::labels,
    error::{Error, Result},
};

const PLACEHOLDER_TAG: &str = "PLACEHOLDER";

/// Marker reserving room for a thumbnail the caller fills in later.
///
/// `PLACEHOLDER{content_hash}PLACEHOLDER`, zero padded to `reserved_len`.
pub fn placeholder(content_hash: &str, reserved_len: usize) -> Result<Vec<u8>> {
    let marker = format!("{PLACEHOLDER_TAG}{content_hash}{PLACEHOLDER_TAG}");
    if marker.len() > reserved_len {
        return Err(Error::BadParam(format!(
            "thumbnail length {reserved_len} is shorter than its {} byte placeholder",
            marker.len()
        )));
    }

    let mut bytes = marker.into_bytes();
    bytes.resize(reserved_len, 0);
    Ok(bytes)
}

/// Where the thumbnail assertion payload comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThumbnailSource {
    /// Real JPEG bytes, hashed as stored.
    Embedded(Vec<u8>),
    /// Placeholder bytes standing in for a thumbnail with a known hash.
    Placeholder { bytes: Vec<u8>, hash: String },
}

impl ThumbnailSource {
    pub fn placeholder(content_hash: &str, thumbnail_hash: &str, reserved_len: usize) -> Result<Self> {
        Ok(ThumbnailSource::Placeholder {
            bytes: placeholder(content_hash, reserved_len)?,
            hash: thumbnail_hash.to_owned(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            ThumbnailSource::Embedded(bytes) | ThumbnailSource::Placeholder { bytes, .. } => bytes,
        }
    }
}

/// `c2pa.thumbnail.claim.jpeg`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimThumbnail(pub ThumbnailSource);

impl AssertionBase for ClaimThumbnail {
    const LABEL: &'static str = labels::JPEG_CLAIM_THUMBNAIL;

    fn to_assertion(&self) -> Result<Assertion> {
        let data = AssertionData::EmbeddedFile(self.0.bytes().to_vec());
        let assertion = Assertion::new(self.label(), data);
        Ok(match &self.0 {
            ThumbnailSource::Embedded(_) => assertion,
            ThumbnailSource::Placeholder { hash, .. } => assertion.with_hash(hash.as_str()),
        })
    }
}
