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
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

//! This library builds C2PA provenance manifests for JPEG images and lays
//! them out as APP11 segments ready to be embedded.
//!
//! A manifest is built in two passes, because its hard binding excludes the
//! bytes the manifest itself occupies. Two flows are supported:
//!
//! * On-device, where the client keeps the image and supplies its content
//!   hash, insertion points and thumbnail hash ([`PrecomputedBinding`]).
//! * Server side, where the image is supplied and the manifest is embedded
//!   and measured ([`EmbeddedBinding`]).
//!
//! # Example: Building a manifest for an image
//!
//! ```ignore
//! use c2pa_jpeg::{create_signer, ClaimDetails, EmbeddedBinding, ManifestBuilder, SigningAlg};
//!
//! let signer = create_signer::from_keys(&certs, &private_key, SigningAlg::Ps256)?;
//! let builder = ManifestBuilder::new("acme", ClaimDetails::new("2021-05-04T10:00:00Z"));
//! let result = builder.build(&EmbeddedBinding::new(image.clone())?, signer.as_ref())?;
//! let signed = result.embed_into(&image)?;
//! ```

/// The internal name of this library.
pub const NAME: &str = "c2pa-jpeg";

/// The version of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public modules
pub mod assertions;
pub mod asset_handlers;
pub mod create_signer;
pub mod jumbf;
pub mod settings;
pub mod utils;

// Public exports
pub use assertion::{Assertion, AssertionBase, AssertionCbor, AssertionData};
pub use binding::{
    content_hash, BindingStrategy, EmbeddedBinding, EncodedManifest, ImageMeta, PassContext,
    PrecomputedBinding,
};
pub use builder::{ManifestBuilder, ManifestIdentity, ProvenanceResult, MAX_SIZING_PASSES};
pub use c2pa_jpeg_crypto::raw_signature::SigningAlg;
pub use callback_signer::{CallbackFunc, CallbackSigner};
pub use assertions::{ClaimDetails, GpsLocation};
pub use asset_handlers::thumbnail_chunks::ThumbnailSegment;
pub use claim::Claim;
pub use error::{Error, Result};
pub use hashed_uri::HashedUri;
pub use manifest::Manifest;
pub use settings::Settings;
pub use signer::{AsyncSigner, Signer};
pub use utils::thumbnail::{ImageThumbnailer, ThumbnailGenerator};

// Internal modules
pub(crate) mod assertion;
pub(crate) mod binding;
pub(crate) mod builder;
pub(crate) mod callback_signer;
pub(crate) mod claim;
pub(crate) mod cose_sign;
pub(crate) mod error;
pub(crate) mod hashed_uri;
pub(crate) mod manifest;
pub(crate) mod signer;
