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

use std::sync::OnceLock;

use c2pa_jpeg::{
    create_signer,
    jumbf::boxes::{JumbfBox, XT_HEADER},
    AsyncSigner, ManifestIdentity, Signer, SigningAlg,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{TimeZone, Utc};
use image::{codecs::jpeg::JpegEncoder, ImageBuffer, Rgb, RgbImage};
use rsa::{pkcs8::EncodePrivateKey, pkcs8::LineEnding, RsaPrivateKey};

#[allow(unused)]
pub const MANIFEST_ID: &str = "acme:urn:uuid:2f6c1a9e-4b7d-4e1f-a3c5-9d8e7f6a5b4c";

#[allow(unused_macros)]
macro_rules! assert_err {
    ($expression:expr, $($pattern:tt)+) => {
        match $expression {
            $($pattern)+ => (),
            ref e => panic!("expected `{}` but got `{:?}`", stringify!($($pattern)+), e),
        }
    }
}
#[allow(unused_imports)]
pub(super) use assert_err;

/// Route `log` output through the test harness.
#[allow(unused)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Keys are slow to generate, share one per test binary.
fn credentials() -> &'static (Vec<u8>, Vec<u8>) {
    static CREDENTIALS: OnceLock<(Vec<u8>, Vec<u8>)> = OnceLock::new();
    CREDENTIALS.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let key_pem = key.to_pkcs8_pem(LineEnding::LF).unwrap();

        // only carried in x5chain, never parsed
        let cert = general_purpose::STANDARD.encode(b"test signing certificate");
        let cert_pem = format!("-----BEGIN CERTIFICATE-----\n{cert}\n-----END CERTIFICATE-----\n");

        (cert_pem.into_bytes(), key_pem.as_bytes().to_vec())
    })
}

#[allow(unused)]
pub fn test_signer() -> Box<dyn Signer + Send + Sync> {
    let (certs, key) = credentials();
    create_signer::from_keys(certs, key, SigningAlg::Rs256).unwrap()
}

#[allow(unused)]
pub fn async_test_signer() -> Box<dyn AsyncSigner + Send + Sync> {
    let (certs, key) = credentials();
    create_signer::async_from_keys(certs, key, SigningAlg::Rs256).unwrap()
}

#[allow(unused)]
pub fn fixed_identity() -> ManifestIdentity {
    ManifestIdentity::new(
        MANIFEST_ID,
        "9a3e5c71-0d2b-4f8a-b6e4-1c7d9f2a8b35",
        Utc.with_ymd_and_hms(2021, 5, 4, 10, 0, 0).unwrap(),
    )
}

/// A `width` x `height` JPEG with a diagonal gradient.
#[allow(unused)]
pub fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 90)
        .encode_image(&img)
        .unwrap();
    jpeg
}

/// Undo the XT split: the first chunk carries the original header and
/// sequence number 1, later chunks add their payload.
#[allow(unused)]
pub fn reassemble(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = chunks[0].clone();
    for chunk in &chunks[1..] {
        stream.extend_from_slice(&chunk[16..]);
    }
    assert_eq!(&stream[..8], &XT_HEADER[..]);
    stream
}

/// The manifest superbox of a chunked manifest store.
#[allow(unused)]
pub fn manifest_box(chunks: &[Vec<u8>]) -> JumbfBox {
    let store = JumbfBox::from_bytes(&reassemble(chunks)).unwrap().remove(0);
    assert_eq!(store.label(), Some("c2pa"));
    store.children()[0].clone()
}

/// Payload of the assertion `label`.
#[allow(unused)]
pub fn assertion_data(chunks: &[Vec<u8>], label: &str) -> Vec<u8> {
    let manifest = manifest_box(chunks);
    let (_, data) = manifest
        .find(&["c2pa.assertions", label])
        .unwrap()
        .data()
        .unwrap();
    data.to_vec()
}

/// `image` with the byte ranges of `exclusions` removed.
#[allow(unused)]
pub fn without_exclusions(image: &[u8], exclusions: &[c2pa_jpeg::assertions::Exclusion]) -> Vec<u8> {
    let mut sorted = exclusions.to_vec();
    sorted.sort_by_key(|e| e.start);

    let mut out = Vec::with_capacity(image.len());
    let mut pos = 0;
    for e in sorted {
        out.extend_from_slice(&image[pos..e.start]);
        pos = e.start + e.length;
    }
    out.extend_from_slice(&image[pos..]);
    out
}
