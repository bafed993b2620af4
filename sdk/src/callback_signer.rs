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

//! The `callback_signer` module provides a way to obtain a [`Signer`] or [`AsyncSigner`]
//! using a callback and public signing certificates.

use async_trait::async_trait;
use c2pa_jpeg_crypto::raw_signature::SigningAlg;

use crate::{AsyncSigner, Error, Result, Signer};

/// Defines a callback function interface for a [`CallbackSigner`].
///
/// The callback should return a signature for the given data.
/// The callback should return an error if the data cannot be signed.
pub type CallbackFunc = dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync;

/// Defines a signer that uses a callback to sign data.
///
/// The private key should only be known by the callback, for example a
/// hardware key store or a remote signing service.
pub struct CallbackSigner {
    /// The callback to use to sign data.
    pub callback: Box<CallbackFunc>,

    /// The signing algorithm to use.
    pub alg: SigningAlg,

    /// The public certificates, DER encoded, end-entity first.
    pub certs: Vec<Vec<u8>>,

    /// A max size to reserve for the signature.
    pub reserve_size: usize,
}

impl CallbackSigner {
    /// Create a new callback signer.
    pub fn new<F>(callback: F, alg: SigningAlg, certs: Vec<Vec<u8>>) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        let reserve_size = 10000 + certs.iter().map(Vec::len).sum::<usize>();

        Self {
            callback: Box::new(callback),
            alg,
            certs,
            reserve_size,
        }
    }

    fn certs_or_err(&self) -> Result<Vec<Vec<u8>>> {
        if self.certs.is_empty() {
            return Err(Error::BadParam("callback signer has no certificates".into()));
        }
        Ok(self.certs.clone())
    }
}

impl Signer for CallbackSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        (self.callback)(data)
    }

    fn alg(&self) -> SigningAlg {
        self.alg
    }

    fn certs(&self) -> Result<Vec<Vec<u8>>> {
        self.certs_or_err()
    }

    fn reserve_size(&self) -> usize {
        self.reserve_size
    }
}

#[async_trait]
impl AsyncSigner for CallbackSigner {
    async fn sign(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        (self.callback)(&data)
    }

    fn alg(&self) -> SigningAlg {
        self.alg
    }

    fn certs(&self) -> Result<Vec<Vec<u8>>> {
        self.certs_or_err()
    }

    fn reserve_size(&self) -> usize {
        self.reserve_size
    }
}
