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

/// Claim entry pointing at an assertion.
///
/// Field order is the CBOR map order: `hash`, `url`, `alg`. The hash is the
/// base64 text of the digest, not a byte string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashedUri {
    hash: String,
    url: String,
    alg: String,
}

impl HashedUri {
    pub fn new(hash: String, url: String, alg: &str) -> Self {
        Self {
            hash,
            url,
            alg: alg.to_owned(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn alg(&self) -> &str {
        &self.alg
    }

    pub fn hash(&self) -> String {
        self.hash.clone()
    }
}

impl fmt::Display for HashedUri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "url: {}, alg: {}, hash: {}", self.url, self.alg, self.hash)
    }
}
