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

//! Provides access to COSE signature generation.

use std::sync::Mutex;

use async_generic::async_generic;
use async_trait::async_trait;
use c2pa_jpeg_crypto::{
    cose::{sign_claim, sign_claim_async, CoseError},
    raw_signature::{AsyncRawSigner, RawSigner, RawSignerError, SigningAlg},
};

use crate::{AsyncSigner, Error, Result, Signer};

const SIGNING_FAILED: &str = "could not create signature";

// Keeps the first error a signer returned so it can be reported as the
// cause instead of its flattened `RawSignerError` form.
#[derive(Default)]
struct SignerFailure(Mutex<Option<Error>>);

impl SignerFailure {
    fn record(&self, err: Error) -> RawSignerError {
        let message = err.to_string();
        if let Ok(mut slot) = self.0.lock() {
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        RawSignerError::InternalError(message)
    }

    fn finish(self, result: std::result::Result<Vec<u8>, CoseError>) -> Result<Vec<u8>> {
        result.map_err(|cose_err| match self.0.into_inner().ok().flatten() {
            Some(err) => Error::signing(SIGNING_FAILED, err),
            None => Error::signing(SIGNING_FAILED, cose_err),
        })
    }
}

struct RawSignerAdapter<'a> {
    signer: &'a dyn Signer,
    failure: SignerFailure,
}

impl RawSigner for RawSignerAdapter<'_> {
    fn sign(&self, data: &[u8]) -> std::result::Result<Vec<u8>, RawSignerError> {
        self.signer.sign(data).map_err(|e| self.failure.record(e))
    }

    fn alg(&self) -> SigningAlg {
        self.signer.alg()
    }

    fn cert_chain(&self) -> std::result::Result<Vec<Vec<u8>>, RawSignerError> {
        self.signer.certs().map_err(|e| self.failure.record(e))
    }

    fn reserve_size(&self) -> usize {
        self.signer.reserve_size()
    }
}

struct AsyncRawSignerAdapter<'a> {
    signer: &'a dyn AsyncSigner,
    failure: SignerFailure,
}

#[async_trait]
impl AsyncRawSigner for AsyncRawSignerAdapter<'_> {
    async fn sign(&self, data: Vec<u8>) -> std::result::Result<Vec<u8>, RawSignerError> {
        self.signer
            .sign(data)
            .await
            .map_err(|e| self.failure.record(e))
    }

    fn alg(&self) -> SigningAlg {
        self.signer.alg()
    }

    fn cert_chain(&self) -> std::result::Result<Vec<Vec<u8>>, RawSignerError> {
        self.signer.certs().map_err(|e| self.failure.record(e))
    }

    fn reserve_size(&self) -> usize {
        self.signer.reserve_size()
    }
}

/// Returns tagged `COSE_Sign1` bytes signing `claim_bytes` with a detached
/// payload.
///
/// Any failure, in the signer or while building the COSE structure, is
/// returned as [`Error::Signing`] with the original error as its source.
#[async_generic(async_signature(signer: &dyn AsyncSigner, claim_bytes: &[u8]))]
pub fn cose_sign(signer: &dyn Signer, claim_bytes: &[u8]) -> Result<Vec<u8>> {
    if _sync {
        let adapter = RawSignerAdapter {
            signer,
            failure: SignerFailure::default(),
        };
        let result = sign_claim(&adapter, claim_bytes);
        adapter.failure.finish(result)
    } else {
        let adapter = AsyncRawSignerAdapter {
            signer,
            failure: SignerFailure::default(),
        };
        let result = sign_claim_async(&adapter, claim_bytes).await;
        adapter.failure.finish(result)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]
    #![allow(clippy::unwrap_used)]

    use std::error::Error as _;

    use super::*;
    use crate::CallbackSigner;

    fn failing_signer() -> CallbackSigner {
        CallbackSigner::new(
            |_: &[u8]| Err(Error::BadParam("token expired".into())),
            SigningAlg::Rs256,
            vec![vec![0x30, 0x00]],
        )
    }

    #[test]
    fn signer_error_is_the_source() {
        let err = cose_sign(&failing_signer(), b"claim").unwrap_err();
        match &err {
            Error::Signing { message, .. } => assert_eq!(message, SIGNING_FAILED),
            _ => panic!("unexpected error {err:?}"),
        }
        assert_eq!(
            err.source().unwrap().to_string(),
            "bad parameter: token expired"
        );
    }

    #[test]
    fn missing_certificates() {
        let signer = CallbackSigner::new(|_: &[u8]| Ok(vec![1]), SigningAlg::Rs256, Vec::new());
        let err = cose_sign(&signer, b"claim").unwrap_err();
        assert!(matches!(err, Error::Signing { .. }));
    }

    #[test]
    fn callback_output_is_the_signature() {
        let signer = CallbackSigner::new(
            |_: &[u8]| Ok(vec![0xaa; 4]),
            SigningAlg::Rs256,
            vec![vec![0x30, 0x00]],
        );
        let cose = cose_sign(&signer, b"claim").unwrap();
        // tag 18
        assert_eq!(cose[0], 0xd2);
        assert!(cose.ends_with(&[0x44, 0xaa, 0xaa, 0xaa, 0xaa]));
    }

    #[actix::test]
    async fn async_signer_error_is_the_source() {
        let err = cose_sign_async(&failing_signer(), b"claim").await.unwrap_err();
        assert_eq!(
            err.source().unwrap().to_string(),
            "bad parameter: token expired"
        );
    }
}
