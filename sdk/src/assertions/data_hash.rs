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

use serde::{Deserialize, Serialize};

use crate::{
    assertion::{Assertion, AssertionBase, AssertionCbor},
    assertions::labels,
    error::Result,
    utils::hash_utils::SHA256_ALG,
};

/// Name written for the JPEG hard binding.
pub const JPEG_CONTENT: &str = "JPEG Content";

/// Byte range left out of the content hash.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exclusion {
    pub start: usize,
    pub length: usize,
}

impl Exclusion {
    pub fn new(start: usize, length: usize) -> Self {
        Exclusion { start, length }
    }
}

/// One hard binding entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DataHash {
    pub name: String,
    /// Base64 SHA-256 of the bound bytes.
    pub hash: String,
    pub alg: String,
    pub pad: String,
    pub exclusions: Vec<Exclusion>,
}

impl DataHash {
    /// Label prefix for a data hash assertion.
    pub const LABEL: &'static str = labels::DATA_HASH;

    pub fn new(name: &str, hash: &str) -> Self {
        DataHash {
            name: name.to_owned(),
            hash: hash.to_owned(),
            alg: SHA256_ALG.to_owned(),
            pad: String::new(),
            exclusions: Vec::new(),
        }
    }

    /// Binding for the JPEG content hash with the given exclusions.
    pub fn jpeg_content(hash: &str, exclusions: Vec<Exclusion>) -> Self {
        let mut dh = Self::new(JPEG_CONTENT, hash);
        dh.exclusions = exclusions;
        dh
    }

    pub fn add_exclusion(&mut self, exclusion: Exclusion) {
        self.exclusions.push(exclusion);
    }
}

/// `c2pa.hash.data`, stored as a list of bindings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct DataHashes(pub Vec<DataHash>);

impl AssertionCbor for DataHashes {}

impl AssertionBase for DataHashes {
    const LABEL: &'static str = labels::DATA_HASH;

    fn to_assertion(&self) -> Result<Assertion> {
        self.to_cbor_assertion()
    }
}
