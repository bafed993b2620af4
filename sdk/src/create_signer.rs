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

//! The `create_signer` module provides a way to obtain a [`Signer`]
//! instance from PEM encoded signing credentials.

use c2pa_jpeg_crypto::raw_signature::{
    async_signer_from_cert_chain_and_private_key, signer_from_cert_chain_and_private_key,
    SigningAlg,
};

use crate::{error::Result, AsyncSigner, Error, Signer};

/// Creates a [`Signer`] instance using signing certificate and private key
/// as byte slices.
///
/// # Arguments
///
/// * `signcert` - Signing certificate chain, PEM, end-entity first
/// * `pkey` - RSA private key, PKCS#8 or PKCS#1 PEM
/// * `alg` - Format for signing
pub fn from_keys(signcert: &[u8], pkey: &[u8], alg: SigningAlg) -> Result<Box<dyn Signer + Send + Sync>> {
    let signer = signer_from_cert_chain_and_private_key(signcert, pkey, alg)
        .map_err(|e| Error::signing("invalid signing credentials", e))?;
    Ok(Box::new(signer))
}

/// Creates an [`AsyncSigner`] instance using signing certificate and
/// private key as byte slices.
pub fn async_from_keys(
    signcert: &[u8],
    pkey: &[u8],
    alg: SigningAlg,
) -> Result<Box<dyn AsyncSigner + Send + Sync>> {
    let signer = async_signer_from_cert_chain_and_private_key(signcert, pkey, alg)
        .map_err(|e| Error::signing("invalid signing credentials", e))?;
    Ok(Box::new(signer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_credentials() {
        let result = from_keys(b"not a cert", b"not a key", SigningAlg::Ps256);
        assert!(matches!(result, Err(Error::Signing { .. })));

        let result = async_from_keys(b"", b"", SigningAlg::Rs256);
        assert!(matches!(result, Err(Error::Signing { .. })));
    }
}
