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

use serde::Serialize;

use crate::{
    assertion::{Assertion, AssertionBase},
    error::{Error, Result},
    hashed_uri::HashedUri,
    jumbf::labels::{to_manifest_uri, to_signature_uri},
};

/// A Claim gathers references to the assertions of one manifest and names
/// the box holding its signature.
///
/// The CBOR form is `{recorder, signature, assertions}` in that order.
#[derive(Clone, Debug, Serialize)]
pub struct Claim {
    recorder: String,

    signature: String,

    assertions: Vec<HashedUri>,

    #[serde(skip)]
    label: String,

    // assertions in store order
    #[serde(skip)]
    assertion_store: Vec<Assertion>,
}

impl Claim {
    /// `label` is the manifest id.
    pub fn new(recorder: &str, label: &str) -> Self {
        Claim {
            recorder: recorder.to_owned(),
            signature: to_signature_uri(label),
            assertions: Vec::new(),
            label: label.to_owned(),
            assertion_store: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn recorder(&self) -> &str {
        &self.recorder
    }

    pub fn uri(&self) -> String {
        to_manifest_uri(&self.label)
    }

    pub fn signature_uri(&self) -> &str {
        &self.signature
    }

    /// Add an assertion to the store and reference it from the claim.
    pub fn add_assertion<A: AssertionBase>(&mut self, assertion: &A) -> Result<HashedUri> {
        self.add_assertion_data(assertion.to_assertion()?)
    }

    /// Add an already encoded assertion.
    pub fn add_assertion_data(&mut self, assertion: Assertion) -> Result<HashedUri> {
        if assertion.label().is_empty() {
            return Err(Error::BadParam("assertion label must not be empty".into()));
        }
        if self
            .assertion_store
            .iter()
            .any(|a| a.label() == assertion.label())
        {
            return Err(Error::BadParam(format!(
                "duplicate assertion label: {}",
                assertion.label()
            )));
        }

        let hashed_uri = assertion.hashed_uri(&self.label);
        self.assertions.push(hashed_uri.clone());
        self.assertion_store.push(assertion);
        Ok(hashed_uri)
    }

    pub fn assertions(&self) -> &[HashedUri] {
        &self.assertions
    }

    pub fn assertion_store(&self) -> &[Assertion] {
        &self.assertion_store
    }

    /// CBOR bytes that get signed and written to the claim box.
    pub fn data(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }
}
