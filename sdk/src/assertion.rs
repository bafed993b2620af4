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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    hashed_uri::HashedUri,
    jumbf::{
        boxes::{self, BoxType},
        labels::to_assertion_uri,
    },
    utils::hash_utils::{hash_sha256_base64, SHA256_ALG},
};

/// Trait implemented by every assertion the builder knows how to write.
pub trait AssertionBase
where
    Self: Sized,
{
    const LABEL: &'static str = "unknown";

    /// Returns a label for this assertion.
    fn label(&self) -> &str {
        Self::LABEL
    }

    /// Returns an Assertion upon success or Error otherwise.
    fn to_assertion(&self) -> Result<Assertion>;
}

/// Trait to handle default Cbor encoding of Assertions
pub trait AssertionCbor: Serialize + AssertionBase {
    fn to_cbor_assertion(&self) -> Result<Assertion> {
        let data = AssertionData::Cbor(serde_cbor::to_vec(self)?);
        Ok(Assertion::new(self.label(), data))
    }
}

/// Assertion payload, tagged with how it is stored in the assertion store.
#[derive(Deserialize, Serialize, PartialEq, Eq, Clone)]
pub enum AssertionData {
    Json(String),          // json encoded data
    Cbor(Vec<u8>),         // binary cbor encoded data
    EmbeddedFile(Vec<u8>), // raw file bytes
}

impl AssertionData {
    /// Bytes written to the content box.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Json(s) => s.as_bytes(),
            Self::Cbor(b) | Self::EmbeddedFile(b) => b,
        }
    }

    pub(crate) fn box_type(&self) -> BoxType {
        match self {
            Self::Json(_) => boxes::JSON,
            Self::Cbor(_) => boxes::CBOR,
            Self::EmbeddedFile(_) => boxes::BFDB,
        }
    }

    /// JUMBF content type UUID of the assertion's superbox.
    pub(crate) fn content_uuid(&self) -> &'static str {
        match self {
            Self::Json(_) => boxes::JUMBF_JSON_UUID,
            Self::Cbor(_) => boxes::JUMBF_CBOR_UUID,
            Self::EmbeddedFile(_) => boxes::JUMBF_EMBEDDED_FILE_UUID,
        }
    }
}

impl fmt::Debug for AssertionData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Json(s) => write!(f, "{s:?}"),
            Self::Cbor(b) => write!(f, "<cbor, {} bytes>", b.len()),
            Self::EmbeddedFile(b) => write!(f, "<embedded file, {} bytes>", b.len()),
        }
    }
}

/// A labelled assertion ready to be placed in the assertion store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion {
    label: String,
    data: AssertionData,
    hash: Option<String>,
}

impl Assertion {
    pub fn new(label: &str, data: AssertionData) -> Self {
        Self {
            label: label.to_owned(),
            data,
            hash: None,
        }
    }

    /// Use a hash computed elsewhere instead of hashing the payload.
    ///
    /// The on-device flow signs over the real thumbnail while the store only
    /// holds a placeholder of the same length.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &AssertionData {
        &self.data
    }

    /// Base64 SHA-256 of the payload, or the hash supplied by `with_hash`.
    pub fn hash(&self) -> String {
        self.hash
            .clone()
            .unwrap_or_else(|| hash_sha256_base64(self.data.bytes()))
    }

    /// Claim reference to this assertion inside manifest `manifest_id`.
    pub fn hashed_uri(&self, manifest_id: &str) -> HashedUri {
        HashedUri::new(
            self.hash(),
            to_assertion_uri(manifest_id, &self.label),
            SHA256_ALG,
        )
    }
}
