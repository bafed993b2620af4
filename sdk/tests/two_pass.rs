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

//! Server flow: the image is supplied, embedded and measured.

use c2pa_jpeg::{
    assertions::{DataHash, DataHashes, Exclusion},
    asset_handlers::jpeg_io::{markers, JpegSegmentTable},
    content_hash,
    settings::ThumbnailSettings,
    BindingStrategy, ClaimDetails, EmbeddedBinding, EncodedManifest, Error, ManifestBuilder,
    PassContext, Result, Settings, ThumbnailGenerator,
};

mod common;
use common::{
    assertion_data, fixed_identity, init_logging, reassemble, test_jpeg, test_signer,
    without_exclusions, MANIFEST_ID,
};

fn builder() -> ManifestBuilder {
    ManifestBuilder::new("acme", ClaimDetails::new("2021-05-04T09:59:58Z"))
        .with_identity(fixed_identity())
}

fn data_hash(chunks: &[Vec<u8>]) -> DataHash {
    let data = assertion_data(chunks, "c2pa.hash.data");
    let mut hashes: DataHashes = serde_cbor::from_slice(&data).unwrap();
    assert_eq!(hashes.0.len(), 1);
    hashes.0.remove(0)
}

#[test]
fn test_exclusions_cover_inserted_segments() -> Result<()> {
    init_logging();
    let image = test_jpeg(640, 480);
    let binding = EmbeddedBinding::new(image.clone())?;

    let result = builder().build(&binding, test_signer().as_ref())?;
    assert!(result.thumbnail_segments().is_empty());

    let signed = result.embed_into(&image)?;
    let table = JpegSegmentTable::parse(&signed)?;

    let xmp = table.segment(markers::APP1, 0).unwrap();
    let first = table.segment(markers::APP11, 0).unwrap();
    let last = table
        .segment(markers::APP11, result.jumbfs().len() - 1)
        .unwrap();

    let dh = data_hash(result.jumbfs());
    assert_eq!(
        dh.exclusions,
        vec![
            Exclusion::new(xmp.start, xmp.length()),
            Exclusion::new(first.start, last.end + 1 - first.start),
        ]
    );

    // removing the excluded ranges restores the original image
    assert_eq!(without_exclusions(&signed, &dh.exclusions), image);

    // the content hash survives embedding
    assert_eq!(dh.hash, content_hash(&signed)?);
    assert_eq!(dh.hash, binding.content_hash());
    Ok(())
}

#[test]
fn test_measured_output_is_a_fixed_point() -> Result<()> {
    let image = test_jpeg(320, 240);
    let binding = EmbeddedBinding::new(image)?;
    let result = builder().build(&binding, test_signer().as_ref())?;

    // measuring the returned manifest again gives the binding it was signed with
    let identity = fixed_identity();
    let settings = Settings::default();
    let ctx = PassContext {
        identity: &identity,
        xmp: result.xmp(),
        settings: &settings,
    };
    let encoded = EncodedManifest::new(reassemble(result.jumbfs()), result.jumbfs().to_vec());
    assert_eq!(
        binding.measured_binding(&ctx, &encoded)?,
        data_hash(result.jumbfs())
    );
    Ok(())
}

#[test]
fn test_injected_identity_is_deterministic() -> Result<()> {
    let image = test_jpeg(320, 240);

    let first = builder().build(&EmbeddedBinding::new(image.clone())?, test_signer().as_ref())?;
    let second = builder().build(&EmbeddedBinding::new(image)?, test_signer().as_ref())?;

    assert_eq!(first.xmp(), second.xmp());
    assert_eq!(first.jumbfs(), second.jumbfs());
    assert_eq!(first.jumbfs_base64(), second.jumbfs_base64());
    Ok(())
}

#[test]
fn test_small_chunks() -> Result<()> {
    init_logging();
    let image = test_jpeg(640, 480);
    let mut settings = Settings::default();
    settings.xt.max_chunk_size = 1024;

    let result = builder()
        .with_settings(settings)
        .build(&EmbeddedBinding::new(image.clone())?, test_signer().as_ref())?;
    let chunks = result.jumbfs();
    assert!(chunks.len() > 1);

    for (i, chunk) in chunks.iter().enumerate() {
        assert!(chunk.len() <= 1024 + 16);
        assert_eq!(&chunk[0..4], &chunks[0][0..4]);
        assert_eq!(u32::from_be_bytes(chunk[4..8].try_into().unwrap()) as usize, i + 1);
        assert_eq!(&chunk[8..16], &chunks[0][8..16]);
    }

    let signed = result.embed_into(&image)?;
    let dh = data_hash(chunks);
    assert_eq!(without_exclusions(&signed, &dh.exclusions), image);
    Ok(())
}

#[test]
fn test_thumbnail_is_generated() -> Result<()> {
    let image = test_jpeg(2000, 1000);
    let result = builder().build(&EmbeddedBinding::new(image)?, test_signer().as_ref())?;

    let thumbnail = assertion_data(result.jumbfs(), "c2pa.thumbnail.claim.jpeg");
    let decoded = image::load_from_memory(&thumbnail).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1024, 512));
    Ok(())
}

struct FixedThumbnail;

impl ThumbnailGenerator for FixedThumbnail {
    fn generate(&self, _image: &[u8], settings: &ThumbnailSettings) -> Result<Vec<u8>> {
        Ok(format!("{}x{}", settings.max_width, settings.max_height).into_bytes())
    }
}

#[test]
fn test_custom_thumbnailer_and_settings() -> Result<()> {
    let settings = Settings::from_string(
        r#"{"thumbnail": {"max_width": 64, "max_height": 48}, "manifest": {"recorder": "Acme Server"}}"#,
        "json",
    )?;
    let binding = EmbeddedBinding::new(test_jpeg(320, 240))?.with_thumbnailer(Box::new(FixedThumbnail));
    let result = builder().with_settings(settings).build(&binding, test_signer().as_ref())?;

    assert_eq!(
        assertion_data(result.jumbfs(), "c2pa.thumbnail.claim.jpeg"),
        b"64x48"
    );

    let manifest = common::manifest_box(result.jumbfs());
    assert_eq!(manifest.label(), Some(MANIFEST_ID));
    let (_, claim) = manifest.find(&["c2pa.claim"]).unwrap().data().unwrap();
    let claim: serde_cbor::Value = serde_cbor::from_slice(claim).unwrap();
    let claim = serde_json::to_value(claim).unwrap();
    assert_eq!(claim["recorder"], "Acme Server");
    Ok(())
}

#[test]
fn test_not_a_jpeg() {
    assert!(matches!(
        EmbeddedBinding::new(b"GIF89a".to_vec()),
        Err(Error::JpegParsing(_))
    ));
}
