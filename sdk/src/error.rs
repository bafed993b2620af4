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

use thiserror::Error;

/// `Error` enumerates errors returned by manifest construction and the
/// JPEG/JUMBF helpers it is built from.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // --- provenance errors ---
    /// The JPEG byte stream could not be walked as a sequence of marker
    /// segments.
    #[error("JPEG parsing error: {0}")]
    JpegParsing(String),

    #[error("bad parameter: {0}")]
    BadParam(String),

    /// The signing adapter failed. The underlying cause is kept as the error
    /// source.
    #[error("{message}")]
    Signing {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The manifest did not reach a stable encoded size within the allowed
    /// number of sizing passes.
    #[error("manifest size did not converge after {passes} passes")]
    ManifestSizeDrift { passes: usize },

    #[error("XMP write error")]
    XmpWriteError(String),

    #[error("thumbnail could not be generated: {0}")]
    ThumbnailError(String),

    #[error(transparent)]
    JumbfParseError(#[from] crate::jumbf::boxes::JumbfParseError),

    #[error("configuration error: {0}")]
    ConfigError(String),

    // --- third-party errors ---
    #[error(transparent)]
    Utf8Error(#[from] std::str::Utf8Error),

    #[error(transparent)]
    TryFromIntError(#[from] std::num::TryFromIntError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    ImageError(#[from] image::ImageError),

    #[error(transparent)]
    CborError(#[from] serde_cbor::Error),
}

impl Error {
    /// Wrap a signing-layer failure, keeping the original error as the source.
    pub(crate) fn signing<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Signing {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// A specialized `Result` type for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;
