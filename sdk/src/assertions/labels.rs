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

//! Labels of the assertions every provenance manifest carries.
//!
//! Callers may add assertions of their own but not under these labels.

/// Label for the claim date assertion.
pub const CLAIM_DATE: &str = "c2pa.claim.date";

/// Label for the precise capture location assertion.
pub const LOCATION_PRECISE: &str = "c2pa.location.precise";

/// Label for the capture time assertion.
pub const TIME: &str = "c2pa.time";

/// Label for a data hash assertion.
///
/// See <https://c2pa.org/specifications/specifications/1.0/specs/C2PA_Specification.html#_data_hash>.
pub const DATA_HASH: &str = "c2pa.hash.data";

/// Label for a JPEG claim thumbnail assertion.
///
/// See <https://c2pa.org/specifications/specifications/1.0/specs/C2PA_Specification.html#_thumbnail>.
pub const JPEG_CLAIM_THUMBNAIL: &str = "c2pa.thumbnail.claim.jpeg";

/// Built-in labels in the order they are written.
pub const BUILT_IN: [&str; 5] = [CLAIM_DATE, LOCATION_PRECISE, TIME, DATA_HASH, JPEG_CLAIM_THUMBNAIL];

/// Returns true if `label` names a built-in assertion.
pub fn is_built_in(label: &str) -> bool {
    BUILT_IN.contains(&label)
}
