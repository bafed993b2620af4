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

use rsa::{
    pkcs1::DecodeRsaPrivateKey,
    pkcs1v15, pss,
    pkcs8::DecodePrivateKey,
    sha2::Sha256,
    signature::{RandomizedSigner, SignatureEncoding, Signer},
    traits::PublicKeyParts,
    RsaPrivateKey,
};
use x509_parser::{error::PEMError, pem::Pem};

use crate::raw_signature::{RawSigner, RawSignerError, SigningAlg};

// Room for the COSE envelope around the raw signature and certificates.
const COSE_OVERHEAD: usize = 1024;

/// Implements [`RawSigner`] trait using `rsa` crate's implementation of
/// SHA-256 + RSA.
///
/// [`SigningAlg::Rs256`] signatures are deterministic: the same key and data
/// always produce the same bytes.
pub struct RsaSigner {
    alg: SigningAlg,

    cert_chain: Vec<Vec<u8>>,
    cert_chain_len: usize,

    private_key: RsaPrivateKey,
}

impl RsaSigner {
    /// Create a signer from an already decoded private key and a DER
    /// certificate chain.
    pub fn new(private_key: RsaPrivateKey, cert_chain: Vec<Vec<u8>>, alg: SigningAlg) -> Self {
        let cert_chain_len = cert_chain.iter().fold(0usize, |sum, c| sum + c.len());

        RsaSigner {
            alg,
            cert_chain,
            cert_chain_len,
            private_key,
        }
    }

    /// Create a signer from a PEM certificate chain and a PEM private key.
    ///
    /// The private key may be either PKCS #8 (`BEGIN PRIVATE KEY`) or
    /// PKCS #1 (`BEGIN RSA PRIVATE KEY`).
    pub fn from_cert_chain_and_private_key(
        cert_chain: &[u8],
        private_key: &[u8],
        alg: SigningAlg,
    ) -> Result<Self, RawSignerError> {
        let cert_chain = Pem::iter_from_buffer(cert_chain)
            .map(|r| match r {
                Ok(pem) => Ok(pem.contents),
                Err(e) => Err(e),
            })
            .collect::<Result<Vec<Vec<u8>>, PEMError>>()
            .map_err(|e| RawSignerError::InvalidSigningCredentials(e.to_string()))?;

        let pem_str = std::str::from_utf8(private_key)
            .map_err(|e| RawSignerError::InvalidSigningCredentials(e.to_string()))?;

        let private_key = match RsaPrivateKey::from_pkcs8_pem(pem_str) {
            Ok(key) => key,
            Err(_) => RsaPrivateKey::from_pkcs1_pem(pem_str)
                .map_err(|e| RawSignerError::InvalidSigningCredentials(e.to_string()))?,
        };

        Ok(Self::new(private_key, cert_chain, alg))
    }
}

impl RawSigner for RsaSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, RawSignerError> {
        match self.alg {
            SigningAlg::Rs256 => {
                let s = pkcs1v15::SigningKey::<Sha256>::new(self.private_key.clone());
                let sig = s
                    .try_sign(data)
                    .map_err(|e| RawSignerError::InternalError(e.to_string()))?;
                Ok(sig.to_bytes().to_vec())
            }

            SigningAlg::Ps256 => {
                let mut rng = rand::thread_rng();
                let s = pss::SigningKey::<Sha256>::new(self.private_key.clone());
                let sig = s
                    .try_sign_with_rng(&mut rng, data)
                    .map_err(|e| RawSignerError::InternalError(e.to_string()))?;
                Ok(sig.to_bytes().to_vec())
            }
        }
    }

    fn reserve_size(&self) -> usize {
        self.private_key.size() + self.cert_chain_len + COSE_OVERHEAD
    }

    fn cert_chain(&self) -> Result<Vec<Vec<u8>>, RawSignerError> {
        Ok(self.cert_chain.clone())
    }

    fn alg(&self) -> SigningAlg {
        self.alg
    }
}
