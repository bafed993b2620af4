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
//! Two-pass construction of a signed manifest for a JPEG image.

use async_generic::async_generic;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    assertion::{Assertion, AssertionBase},
    assertions::{
        labels, CaptureTime, ClaimDate, ClaimDetails, ClaimThumbnail, DataHash, DataHashes,
        LocationPrecise, ThumbnailSource,
    },
    asset_handlers::{
        jpeg_io::{
            insert_segments,
            markers::{APP1, APP11},
            AppSegment,
        },
        thumbnail_chunks::{patch_thumbnail, strip_placeholder, ThumbnailSegment},
        xt_splitter::split,
    },
    binding::{BindingStrategy, EncodedManifest, PassContext},
    claim::Claim,
    cose_sign::{cose_sign, cose_sign_async},
    jumbf::labels::to_manifest_uri,
    manifest::{find_bytes, Manifest},
    settings::Settings,
    utils::{
        base64,
        xmp_inmemory_utils::{
            build_xmp, standard_namespaces, CREATE_DATE_KEY, DOCUMENT_ID_KEY, INSTANCE_ID_KEY,
            PROVENANCE_KEY,
        },
    },
    AsyncSigner, Error, Result, Signer,
};

/// Upper bound on encode passes before giving up with
/// [`Error::ManifestSizeDrift`].
///
/// Two passes normally suffice. A third is needed when the measured lengths
/// push a CBOR integer into a wider encoding.
pub const MAX_SIZING_PASSES: usize = 4;

/// The values that make a manifest unique.
///
/// They are fixed for the whole build so every pass references the same
/// manifest. Inject one with [`ManifestBuilder::with_identity`] for
/// reproducible output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestIdentity {
    /// `{namespace}:urn:uuid:{uuid}`
    pub manifest_id: String,
    pub xmp_document_id: String,
    pub created_at: DateTime<Utc>,
}

impl ManifestIdentity {
    pub fn new(
        manifest_id: impl Into<String>,
        xmp_document_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        ManifestIdentity {
            manifest_id: manifest_id.into(),
            xmp_document_id: xmp_document_id.into(),
            created_at,
        }
    }

    /// Random identifiers under `namespace`, timestamped now.
    pub fn generate(namespace: &str) -> Self {
        ManifestIdentity {
            manifest_id: format!("{namespace}:urn:uuid:{}", Uuid::new_v4()),
            xmp_document_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }

    /// `self#jumbf=c2pa/{manifest_id}`
    pub fn uri(&self) -> String {
        to_manifest_uri(&self.manifest_id)
    }
}

/// Everything a client needs to embed provenance in its image.
///
/// Serializes as `{xmp, jumbfs, thumbnailSegments}` with base64 strings.
/// `thumbnailSegments` is only present for the on-device flow; those chunks
/// must be patched with [`ProvenanceResult::patch_thumbnail`] before they are
/// written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceResult {
    #[serde(with = "crate::utils::base64::serde_base64")]
    xmp: Vec<u8>,

    #[serde(with = "crate::utils::base64::serde_base64_list")]
    jumbfs: Vec<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    thumbnail_segments: Vec<ThumbnailSegment>,
}

impl ProvenanceResult {
    /// APP1 payload: the XMP packet.
    pub fn xmp(&self) -> &[u8] {
        &self.xmp
    }

    /// APP11 payloads, in order.
    pub fn jumbfs(&self) -> &[Vec<u8>] {
        &self.jumbfs
    }

    pub fn thumbnail_segments(&self) -> &[ThumbnailSegment] {
        &self.thumbnail_segments
    }

    pub fn xmp_base64(&self) -> String {
        base64::encode(&self.xmp)
    }

    pub fn jumbfs_base64(&self) -> Vec<String> {
        base64::encode_all(&self.jumbfs)
    }

    /// Fill the reserved thumbnail bytes.
    ///
    /// `thumbnail` must be exactly as long as the reserved thumbnail length.
    pub fn patch_thumbnail(&self, thumbnail: &[u8]) -> Result<ProvenanceResult> {
        Ok(ProvenanceResult {
            xmp: self.xmp.clone(),
            jumbfs: patch_thumbnail(&self.jumbfs, &self.thumbnail_segments, thumbnail)?,
            thumbnail_segments: Vec::new(),
        })
    }

    /// Insert the XMP and manifest segments into `jpeg`.
    pub fn embed_into(&self, jpeg: &[u8]) -> Result<Vec<u8>> {
        if !self.thumbnail_segments.is_empty() {
            return Err(Error::BadParam(
                "thumbnail must be patched before the manifest is embedded".to_string(),
            ));
        }

        let mut segments = Vec::with_capacity(self.jumbfs.len() + 1);
        segments.push(AppSegment::new(APP1, self.xmp.clone()));
        segments.extend(
            self.jumbfs
                .iter()
                .map(|chunk| AppSegment::new(APP11, chunk.clone())),
        );
        insert_segments(jpeg, &segments)
    }
}

/// Builds the provenance XMP and signed manifest for one capture.
///
/// The hard binding excludes the bytes the manifest occupies once embedded,
/// which are only known after encoding it. The builder encodes once with a
/// provisional binding, then again with exclusions measured from that
/// result, repeating until the measured binding matches the one signed.
///
/// ```ignore
/// let builder = ManifestBuilder::new("acme", ClaimDetails::new("2021-05-04T10:00:00Z"));
/// let binding = EmbeddedBinding::new(image.clone())?;
/// let result = builder.build(&binding, &signer)?;
/// let signed_image = result.embed_into(&image)?;
/// ```
#[derive(Clone, Debug)]
pub struct ManifestBuilder {
    namespace: String,
    details: ClaimDetails,
    settings: Settings,
    identity: Option<ManifestIdentity>,
    assertions: Vec<Assertion>,
}

impl ManifestBuilder {
    /// `namespace` prefixes the manifest id, usually the company name.
    pub fn new(namespace: &str, details: ClaimDetails) -> Self {
        ManifestBuilder {
            namespace: namespace.to_owned(),
            details,
            settings: Settings::default(),
            identity: None,
            assertions: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Use fixed identifiers instead of generating them per build.
    pub fn with_identity(mut self, identity: ManifestIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn details(&self) -> &ClaimDetails {
        &self.details
    }

    /// Add a caller assertion, written after the built-in ones.
    ///
    /// Labels must be unique and must not name a built-in assertion.
    pub fn add_assertion(&mut self, assertion: Assertion) -> Result<&mut Self> {
        let label = assertion.label();
        if label.is_empty() {
            return Err(Error::BadParam("assertion label must not be empty".into()));
        }
        if labels::is_built_in(label) {
            return Err(Error::BadParam(format!(
                "{label} is written by the builder and cannot be supplied"
            )));
        }
        if self.assertions.iter().any(|a| a.label() == label) {
            return Err(Error::BadParam(format!("duplicate assertion label: {label}")));
        }

        self.assertions.push(assertion);
        Ok(self)
    }

    pub fn add_labeled_assertion<A: AssertionBase>(&mut self, assertion: &A) -> Result<&mut Self> {
        self.add_assertion(assertion.to_assertion()?)
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    fn identity(&self) -> ManifestIdentity {
        self.identity
            .clone()
            .unwrap_or_else(|| ManifestIdentity::generate(&self.namespace))
    }

    fn xmp(&self, identity: &ManifestIdentity) -> Result<Vec<u8>> {
        let provenance = identity.uri();
        let created = identity
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let xmp = build_xmp(
            &standard_namespaces(),
            &[
                (DOCUMENT_ID_KEY, identity.xmp_document_id.as_str()),
                (INSTANCE_ID_KEY, identity.xmp_document_id.as_str()),
                (PROVENANCE_KEY, provenance.as_str()),
                (CREATE_DATE_KEY, created.as_str()),
            ],
        )?;
        Ok(xmp.into_bytes())
    }

    fn claim(
        &self,
        identity: &ManifestIdentity,
        binding: DataHash,
        thumbnail: &Assertion,
    ) -> Result<Claim> {
        let recorder = self
            .details
            .recorder
            .as_deref()
            .unwrap_or(&self.settings.manifest.recorder);

        let mut claim = Claim::new(recorder, &identity.manifest_id);
        claim.add_assertion(&ClaimDate::new(&identity.created_at))?;
        claim.add_assertion(&LocationPrecise::new(self.details.location.as_ref()))?;
        claim.add_assertion(&CaptureTime::new(&self.details.time))?;
        claim.add_assertion(&DataHashes(vec![binding]))?;
        claim.add_assertion_data(thumbnail.clone())?;

        for assertion in &self.assertions {
            claim.add_assertion_data(assertion.clone())?;
        }
        Ok(claim)
    }

    #[async_generic(async_signature(&self, claim: Claim, signer: &dyn AsyncSigner))]
    fn encode_pass(&self, claim: Claim, signer: &dyn Signer) -> Result<EncodedManifest> {
        let claim_bytes = claim.data()?;
        let signature = if _sync {
            cose_sign(signer, &claim_bytes)?
        } else {
            cose_sign_async(signer, &claim_bytes).await?
        };

        let jumbf = Manifest::new(claim, signature)
            .to_jumbf(self.settings.manifest.signature_uuid_header)?;
        let chunks = split(&jumbf, self.settings.xt.chunk_size())?;
        Ok(EncodedManifest::new(jumbf, chunks))
    }

    /// Build and sign the manifest.
    ///
    /// A signing failure in any pass aborts the build.
    #[async_generic(async_signature(
        &self,
        strategy: &dyn BindingStrategy,
        signer: &dyn AsyncSigner,
    ))]
    pub fn build(
        &self,
        strategy: &dyn BindingStrategy,
        signer: &dyn Signer,
    ) -> Result<ProvenanceResult> {
        let identity = self.identity();
        let xmp = self.xmp(&identity)?;
        let ctx = PassContext {
            identity: &identity,
            xmp: &xmp,
            settings: &self.settings,
        };

        let thumbnail = strategy.thumbnail(&ctx)?;
        let thumbnail_assertion = thumbnail.to_assertion()?;

        debug!("manifest {}: pass 1", identity.manifest_id);
        let mut binding = strategy.initial_binding(&ctx)?;
        let claim = self.claim(&identity, binding.clone(), &thumbnail_assertion)?;
        let mut encoded = if _sync {
            self.encode_pass(claim, signer)?
        } else {
            self.encode_pass_async(claim, signer).await?
        };

        let mut passes = 1;
        loop {
            let measured = strategy.measured_binding(&ctx, &encoded)?;
            if passes > 1 && measured == binding {
                break;
            }
            if passes == MAX_SIZING_PASSES {
                return Err(Error::ManifestSizeDrift { passes });
            }

            passes += 1;
            if passes > 2 {
                warn!(
                    "manifest {}: exclusions moved after pass {}, running pass {passes}",
                    identity.manifest_id,
                    passes - 1
                );
            } else {
                debug!("manifest {}: pass {passes}", identity.manifest_id);
            }

            binding = measured;
            let claim = self.claim(&identity, binding.clone(), &thumbnail_assertion)?;
            encoded = if _sync {
                self.encode_pass(claim, signer)?
            } else {
                self.encode_pass_async(claim, signer).await?
            };
        }

        debug!(
            "manifest {}: {} bytes in {} chunk(s) after {passes} passes",
            identity.manifest_id,
            encoded.jumbf().len(),
            encoded.chunks().len()
        );

        finish(xmp, encoded, &thumbnail)
    }
}

// Strip a thumbnail placeholder from the final chunks.
fn finish(
    xmp: Vec<u8>,
    encoded: EncodedManifest,
    thumbnail: &ClaimThumbnail,
) -> Result<ProvenanceResult> {
    let (jumbfs, thumbnail_segments) = match &thumbnail.0 {
        ThumbnailSource::Embedded(_) => (encoded.into_chunks(), Vec::new()),
        ThumbnailSource::Placeholder { bytes, .. } => {
            let start = find_bytes(encoded.jumbf(), bytes).ok_or_else(|| {
                Error::BadParam("thumbnail placeholder not found in manifest".to_string())
            })?;
            let stripped = strip_placeholder(encoded.into_chunks(), start, bytes.len())?;
            (stripped.chunks, stripped.thumbnail_segments)
        }
    };

    Ok(ProvenanceResult {
        xmp,
        jumbfs,
        thumbnail_segments,
    })
}
