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

use async_generic::async_generic;
use ciborium::value::Value;
use coset::{iana, CoseSign1, CoseSign1Builder, HeaderBuilder, TaggedCborSerializable};

use crate::{
    cose::CoseError,
    raw_signature::{AsyncRawSigner, RawSigner, SigningAlg},
};

/// Unprotected header label carrying the signing certificate chain.
pub const X5CHAIN: &str = "x5chain";

/// Given the canonical bytes of a claim and a [`RawSigner`] or
/// [`AsyncRawSigner`] instance, generate the COSE signature for that claim.
///
/// Returns a byte vector that is a tagged (18) `COSE_Sign1` structure:
///
/// * protected header: `{1: alg}` (`-257` for RS256)
/// * unprotected header: `{"x5chain": [cert, ...]}`
/// * payload: detached (`nil`); the claim lives in its own box
/// * signature: computed over the `Sig_structure` of the claim
#[async_generic(async_signature(signer: &dyn AsyncRawSigner, claim: &[u8]))]
pub fn sign_claim(signer: &dyn RawSigner, claim: &[u8]) -> Result<Vec<u8>, CoseError> {
    let alg = signer.alg();
    let certs = signer.cert_chain()?;

    let mut sign1 = build_sign1(alg, certs)?;

    // We don't use the additional data header.
    let aad: &[u8; 0] = b"";
    let tbs = sign1.tbs_detached_data(claim, aad);

    sign1.signature = if _sync {
        signer.sign(&tbs)?
    } else {
        signer.sign(tbs).await?
    };

    sign1
        .to_tagged_vec()
        .map_err(|e| CoseError::CborGenerationError(e.to_string()))
}

fn build_sign1(alg: SigningAlg, certs: Vec<Vec<u8>>) -> Result<CoseSign1, CoseError> {
    if certs.is_empty() {
        return Err(CoseError::MissingSigningCertificateChain);
    }

    let protected = match alg {
        SigningAlg::Rs256 => HeaderBuilder::new().algorithm(iana::Algorithm::RS256),
        SigningAlg::Ps256 => HeaderBuilder::new().algorithm(iana::Algorithm::PS256),
    }
    .build();

    let x5chain = Value::Array(certs.into_iter().map(Value::Bytes).collect());
    let unprotected = HeaderBuilder::new()
        .text_value(X5CHAIN.to_string(), x5chain)
        .build();

    Ok(CoseSign1Builder::new()
        .protected(protected)
        .unprotected(unprotected)
        .build())
}
