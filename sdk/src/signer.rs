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

use async_trait::async_trait;
use c2pa_jpeg_crypto::raw_signature::{AsyncRawSigner, RawSigner, SigningAlg};

use crate::{Error, Result};

/// The `Signer` trait generates a cryptographic signature over a byte array.
///
/// This trait exists to allow the signature mechanism to be extended.
pub trait Signer {
    /// Returns a new byte array which is a signature over the original.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Returns the algorithm of the Signer.
    fn alg(&self) -> SigningAlg;

    /// Returns the certificates as a Vec containing a Vec of DER bytes for each certificate.
    fn certs(&self) -> Result<Vec<Vec<u8>>>;

    /// Returns the size in bytes of the largest possible expected signature.
    /// Signing will fail if the result of the `sign` function is larger
    /// than this value.
    fn reserve_size(&self) -> usize;
}

/// The `AsyncSigner` trait generates a cryptographic signature over a byte array.
///
/// Use this when the implementation is asynchronous.
#[async_trait]
pub trait AsyncSigner: Sync {
    /// Returns a new byte array which is a signature over the original.
    async fn sign(&self, data: Vec<u8>) -> Result<Vec<u8>>;

    /// Returns the algorithm of the Signer.
    fn alg(&self) -> SigningAlg;

    /// Returns the certificates as a Vec containing a Vec of DER bytes for each certificate.
    fn certs(&self) -> Result<Vec<Vec<u8>>>;

    /// Returns the size in bytes of the largest possible expected signature.
    fn reserve_size(&self) -> usize;
}

fn raw_err(err: c2pa_jpeg_crypto::raw_signature::RawSignerError) -> Error {
    Error::signing("signer failed", err)
}

impl Signer for Box<dyn RawSigner + Send + Sync> {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(data).map_err(raw_err)
    }

    fn alg(&self) -> SigningAlg {
        (**self).alg()
    }

    fn certs(&self) -> Result<Vec<Vec<u8>>> {
        (**self).cert_chain().map_err(raw_err)
    }

    fn reserve_size(&self) -> usize {
        (**self).reserve_size()
    }
}

#[async_trait]
impl AsyncSigner for Box<dyn AsyncRawSigner + Send + Sync> {
    async fn sign(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        (**self).sign(data).await.map_err(raw_err)
    }

    fn alg(&self) -> SigningAlg {
        (**self).alg()
    }

    fn certs(&self) -> Result<Vec<Vec<u8>>> {
        (**self).cert_chain().map_err(raw_err)
    }

    fn reserve_size(&self) -> usize {
        (**self).reserve_size()
    }
}
