// Copyright 2024 Adobe. All rights reserved.
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

//! Hash convenience functions.

use sha2::{Digest, Sha256};

/// Given a byte slice, return the SHA-256 hash of that content.
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::default();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Multihash code and digest length prefix for SHA2-256.
pub const SHA256_MULTIHASH_PREFIX: [u8; 2] = [0x12, 0x20];

/// Given a byte slice, return its SHA-256 hash wrapped as a multihash
/// (`0x12 0x20` followed by the 32 digest bytes).
pub fn sha256_multihash(data: &[u8]) -> Vec<u8> {
    let mut out = SHA256_MULTIHASH_PREFIX.to_vec();
    out.extend_from_slice(&sha256(data));
    out
}
