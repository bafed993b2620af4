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

//! Lays a signed claim and its assertions out as a C2PA manifest store.

use crate::{
    claim::Claim,
    error::Result,
    jumbf::{
        boxes::{
            create_by_template, uuid_bytes, TemplateNode, CAI_ASSERTION_STORE_UUID,
            CAI_BLOCK_UUID, CAI_CLAIM_UUID, CAI_SIGNATURE_HEADER_UUID, CAI_SIGNATURE_UUID,
            CAI_STORE_UUID, CBOR, UUID,
        },
        labels::{ASSERTIONS, CLAIM, MANIFEST_STORE, SIGNATURE},
    },
};

/// A claim together with its signature.
#[derive(Clone, Debug)]
pub struct Manifest {
    claim: Claim,
    signature: Vec<u8>,
}

impl Manifest {
    pub fn new(claim: Claim, signature: Vec<u8>) -> Self {
        Manifest { claim, signature }
    }

    pub fn claim(&self) -> &Claim {
        &self.claim
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    fn template(&self, signature_uuid_header: bool) -> Result<TemplateNode> {
        let assertions = self
            .claim
            .assertion_store()
            .iter()
            .map(|a| {
                Ok(TemplateNode::leaf(
                    uuid_bytes(a.data().content_uuid())?,
                    a.label(),
                    a.data().box_type(),
                    a.data().bytes().to_vec(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut signature = Vec::with_capacity(16 + self.signature.len());
        if signature_uuid_header {
            signature.extend_from_slice(&uuid_bytes(CAI_SIGNATURE_HEADER_UUID)?);
        }
        signature.extend_from_slice(&self.signature);

        let manifest = TemplateNode::branch(
            uuid_bytes(CAI_STORE_UUID)?,
            self.claim.label(),
            vec![
                TemplateNode::branch(uuid_bytes(CAI_ASSERTION_STORE_UUID)?, ASSERTIONS, assertions),
                TemplateNode::leaf(uuid_bytes(CAI_CLAIM_UUID)?, CLAIM, CBOR, self.claim.data()?),
                TemplateNode::leaf(uuid_bytes(CAI_SIGNATURE_UUID)?, SIGNATURE, UUID, signature),
            ],
        );

        Ok(TemplateNode::branch(
            uuid_bytes(CAI_BLOCK_UUID)?,
            MANIFEST_STORE,
            vec![manifest],
        ))
    }

    /// Encode the manifest store, XT header first.
    pub fn to_jumbf(&self, signature_uuid_header: bool) -> Result<Vec<u8>> {
        create_by_template(&[self.template(signature_uuid_header)?], true)
    }
}

/// Offset of the first occurrence of `needle` in `haystack`.
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
