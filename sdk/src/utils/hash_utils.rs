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

use c2pa_jpeg_crypto::hash::sha256_multihash;
use log::warn;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::utils::base64;

/// Name of the only hash algorithm written into manifests.
pub const SHA256_ALG: &str = "sha256";

#[derive(Clone)]
enum Hasher {
    SHA256(Sha256),
    SHA384(Sha384),
    SHA512(Sha512),
}

impl Hasher {
    fn new(alg: &str) -> Self {
        match alg {
            "sha256" => Hasher::SHA256(Sha256::new()),
            "sha384" => Hasher::SHA384(Sha384::new()),
            "sha512" => Hasher::SHA512(Sha512::new()),
            _ => {
                warn!("Unsupported hashing algorithm: {alg}, substituting sha256");
                Hasher::SHA256(Sha256::new())
            }
        }
    }

    fn update(&mut self, data: &[u8]) {
        use Hasher::*;
        match self {
            SHA256(ref mut d) => d.update(data),
            SHA384(ref mut d) => d.update(data),
            SHA512(ref mut d) => d.update(data),
        }
    }

    // consume hasher and return the final digest
    fn finalize(self) -> Vec<u8> {
        use Hasher::*;
        match self {
            SHA256(d) => d.finalize().to_vec(),
            SHA384(d) => d.finalize().to_vec(),
            SHA512(d) => d.finalize().to_vec(),
        }
    }
}

/// Return hash bytes for the desired hashing algorithm.
pub fn hash_by_alg(alg: &str, data: &[u8]) -> Vec<u8> {
    let mut hasher = Hasher::new(alg);
    hasher.update(data);
    hasher.finalize()
}

/// SHA-256 of `data`, base64 encoded. This is the form assertion and content
/// hashes take inside a manifest.
pub fn hash_sha256_base64(data: &[u8]) -> String {
    base64::encode(&hash_by_alg(SHA256_ALG, data))
}

/// SHA-256 of `data`, lower case hex.
pub fn hash_sha256_hex(data: &[u8]) -> String {
    hex::encode(hash_by_alg(SHA256_ALG, data))
}

/// Text encoding for a multihash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultihashEncoding {
    Hex,
    Base64,
}

/// SHA-256 multihash (`1220` followed by the digest) of `data`.
///
/// With `with_multibase` the result carries the multibase prefix: `f` for
/// hex, `M` for base64.
pub fn sha256_multihash_string(
    data: &[u8],
    encoding: MultihashEncoding,
    with_multibase: bool,
) -> String {
    let multihash = sha256_multihash(data);
    match (encoding, with_multibase) {
        (MultihashEncoding::Hex, false) => hex::encode(multihash),
        (MultihashEncoding::Hex, true) => format!("f{}", hex::encode(multihash)),
        (MultihashEncoding::Base64, false) => base64::encode(&multihash),
        (MultihashEncoding::Base64, true) => format!("M{}", base64::encode(&multihash)),
    }
}
