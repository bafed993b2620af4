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

//! Labels for the JUMBF boxes of a C2PA manifest and helpers for the
//! `self#jumbf=` URIs that point into them.

/// Label for the C2PA manifest store.
pub const MANIFEST_STORE: &str = "c2pa";

/// Label for the C2PA assertion store box.
pub const ASSERTIONS: &str = "c2pa.assertions";

/// Label for the C2PA claim box.
pub const CLAIM: &str = "c2pa.claim";

/// Label for the C2PA claim signature box.
pub const SIGNATURE: &str = "c2pa.signature";

/// Prefix of a URI that refers to a box inside the same asset.
pub const JUMBF_PREFIX: &str = "self#jumbf";

/// Return the URI of a manifest, as written into the XMP
/// `dcterms:provenance` property.
pub fn to_manifest_uri(manifest_id: &str) -> String {
    format!("{JUMBF_PREFIX}={MANIFEST_STORE}/{manifest_id}")
}

/// Return the URI of an assertion inside a manifest's assertion store.
pub fn to_assertion_uri(manifest_id: &str, assertion_label: &str) -> String {
    format!(
        "{}/{ASSERTIONS}/{assertion_label}",
        to_manifest_uri(manifest_id)
    )
}

/// Return the URI of a manifest's signature box.
pub fn to_signature_uri(manifest_id: &str) -> String {
    format!("{}/{SIGNATURE}", to_manifest_uri(manifest_id))
}

/// Return the last path segment of a `self#jumbf=` URI.
pub fn box_name_from_uri(uri: &str) -> Option<&str> {
    let path = uri.strip_prefix(JUMBF_PREFIX)?.strip_prefix('=')?;
    path.rsplit('/').next().filter(|name| !name.is_empty())
}
