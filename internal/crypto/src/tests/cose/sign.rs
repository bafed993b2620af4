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

use ciborium::value::Value;
use coset::{iana, CoseSign1, Label, RegisteredLabelWithPrivate, TaggedCborSerializable};
use rsa::{pkcs1v15, sha2::Sha256, signature::Verifier};

use crate::{
    cose::{sign_claim, sign_claim_async, CoseError, X5CHAIN},
    raw_signature::{AsyncRawSigner, RawSigner, RawSignerError, RsaSigner, SigningAlg},
    tests::test_private_key,
};

const CLAIM: &[u8] = b"\xa1\x68recorder\x6fRecorderAppName";

#[test]
fn claim_signature_layout() {
    let key = test_private_key();
    let signer = RsaSigner::new(key.clone(), vec![vec![1, 2, 3, 4]], SigningAlg::Rs256);

    let cose = sign_claim(&signer, CLAIM).unwrap();

    // COSE_Sign1 tag
    assert_eq!(cose[0], 0xd2);

    let sign1 = CoseSign1::from_tagged_slice(&cose).unwrap();
    assert_eq!(
        sign1.protected.header.alg,
        Some(RegisteredLabelWithPrivate::Assigned(iana::Algorithm::RS256))
    );
    assert!(sign1.payload.is_none());

    let x5chain = sign1
        .unprotected
        .rest
        .iter()
        .find(|(label, _)| label == &Label::Text(X5CHAIN.to_string()))
        .map(|(_, v)| v.clone())
        .unwrap();
    assert_eq!(x5chain, Value::Array(vec![Value::Bytes(vec![1, 2, 3, 4])]));

    let verifier = pkcs1v15::VerifyingKey::<Sha256>::new(key.to_public_key());
    sign1
        .verify_detached_signature(CLAIM, b"", |sig, data| {
            let sig = pkcs1v15::Signature::try_from(sig)?;
            verifier.verify(data, &sig)
        })
        .unwrap();
}

#[test]
fn claim_signature_is_deterministic() {
    let signer = RsaSigner::new(test_private_key(), vec![vec![9]], SigningAlg::Rs256);

    assert_eq!(
        sign_claim(&signer, CLAIM).unwrap(),
        sign_claim(&signer, CLAIM).unwrap()
    );
}

#[test]
fn empty_chain_is_rejected() {
    let signer = RsaSigner::new(test_private_key(), vec![], SigningAlg::Rs256);

    assert!(matches!(
        sign_claim(&signer, CLAIM),
        Err(CoseError::MissingSigningCertificateChain)
    ));
}

struct FailingSigner;

impl RawSigner for FailingSigner {
    fn sign(&self, _data: &[u8]) -> Result<Vec<u8>, RawSignerError> {
        Err(RawSignerError::InternalError("hsm offline".to_string()))
    }

    fn alg(&self) -> SigningAlg {
        SigningAlg::Rs256
    }

    fn cert_chain(&self) -> Result<Vec<Vec<u8>>, RawSignerError> {
        Ok(vec![vec![1]])
    }

    fn reserve_size(&self) -> usize {
        1024
    }
}

#[async_trait::async_trait]
impl AsyncRawSigner for FailingSigner {
    async fn sign(&self, _data: Vec<u8>) -> Result<Vec<u8>, RawSignerError> {
        Err(RawSignerError::InternalError("hsm offline".to_string()))
    }

    fn alg(&self) -> SigningAlg {
        SigningAlg::Rs256
    }

    fn cert_chain(&self) -> Result<Vec<Vec<u8>>, RawSignerError> {
        Ok(vec![vec![1]])
    }

    fn reserve_size(&self) -> usize {
        1024
    }
}

#[test]
fn signer_failure_is_propagated() {
    let err = sign_claim(&FailingSigner, CLAIM).err().unwrap();
    assert!(matches!(
        err,
        CoseError::RawSignerError(RawSignerError::InternalError(_))
    ));
}

#[cfg_attr(not(target_arch = "wasm32"), actix::test)]
async fn async_signer_failure_is_propagated() {
    let err = sign_claim_async(&FailingSigner, CLAIM).await.err().unwrap();
    assert!(matches!(err, CoseError::RawSignerError(_)));
}
