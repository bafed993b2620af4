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
    pkcs1v15,
    pkcs8::{EncodePrivateKey, LineEnding},
    sha2::Sha256,
    signature::Verifier,
    traits::PublicKeyParts,
};

use crate::{
    raw_signature::{
        async_signer_from_cert_chain_and_private_key, signer_from_cert_chain_and_private_key,
        RawSigner, RawSignerError, RsaSigner, SigningAlg,
    },
    tests::{test_private_key, TEST_CERT_PEM},
};

#[test]
fn rs256_signature_verifies() {
    let key = test_private_key();
    let signer = RsaSigner::new(key.clone(), vec![vec![1, 2, 3, 4]], SigningAlg::Rs256);

    let data = b"some sample content to sign";
    let signature = signer.sign(data).unwrap();
    assert_eq!(signature.len(), key.size());

    let verifier = pkcs1v15::VerifyingKey::<Sha256>::new(key.to_public_key());
    let sig = pkcs1v15::Signature::try_from(signature.as_slice()).unwrap();
    verifier.verify(data, &sig).unwrap();
}

#[test]
fn rs256_is_deterministic() {
    let key = test_private_key();
    let signer = RsaSigner::new(key, vec![vec![1]], SigningAlg::Rs256);

    assert_eq!(signer.sign(b"abc").unwrap(), signer.sign(b"abc").unwrap());
}

#[test]
fn ps256_signature_has_key_size() {
    let key = test_private_key();
    let signer = RsaSigner::new(key.clone(), vec![vec![1]], SigningAlg::Ps256);

    let signature = signer.sign(b"abc").unwrap();
    assert_eq!(signature.len(), key.size());
    assert_eq!(signer.alg(), SigningAlg::Ps256);
}

#[test]
fn from_pem_credentials() {
    let key = test_private_key();
    let key_pem = key.to_pkcs8_pem(LineEnding::LF).unwrap();

    let signer = signer_from_cert_chain_and_private_key(
        TEST_CERT_PEM.as_bytes(),
        key_pem.as_bytes(),
        SigningAlg::Rs256,
    )
    .unwrap();

    assert_eq!(signer.cert_chain().unwrap(), vec![vec![1, 2, 3, 4]]);
    assert!(signer.reserve_size() > key.size());
}

#[test]
fn bad_private_key() {
    let err = RsaSigner::from_cert_chain_and_private_key(
        TEST_CERT_PEM.as_bytes(),
        b"not a key",
        SigningAlg::Rs256,
    )
    .err()
    .unwrap();

    assert!(matches!(err, RawSignerError::InvalidSigningCredentials(_)));
}

#[cfg_attr(not(target_arch = "wasm32"), actix::test)]
async fn async_wrapper_signs() {
    let key = test_private_key();
    let key_pem = key.to_pkcs8_pem(LineEnding::LF).unwrap();

    let signer = async_signer_from_cert_chain_and_private_key(
        TEST_CERT_PEM.as_bytes(),
        key_pem.as_bytes(),
        SigningAlg::Rs256,
    )
    .unwrap();

    let signature = signer.sign(b"abc".to_vec()).await.unwrap();
    assert_eq!(signature.len(), key.size());
    assert_eq!(signer.alg(), SigningAlg::Rs256);
}
