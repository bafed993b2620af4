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

//! Encoder and decoder for JUMBF box trees.
//!
//! Every size field is computed bottom up from already encoded children, so
//! nothing is estimated or patched after the fact.
//
//!  # References
//!
//!  - [ISO BMFF Byte Stream Format](https://w3c.github.io/media-source/isobmff-byte-stream-format.html)
//!  - [JPEG universal metadata box format](https://www.iso.org/standard/73604.html)

use std::io::{Cursor, Read, Result as IoResult, Write};

use byteorder::{BigEndian, ReadBytesExt};
use hex::FromHex;
use log::debug;
use thiserror::Error;

use crate::{Error, Result};

/// `JumbfParseError` enumerates errors detected while parsing JUMBF data structures.
#[derive(Debug, Error)]
pub enum JumbfParseError {
    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("invalid box header")]
    InvalidBoxHeader,

    #[error("invalid box range")]
    InvalidBoxRange,

    #[error("invalid JUMB box")]
    InvalidJumbBox,

    #[error("invalid UUID label")]
    InvalidUuidValue,

    #[error("expected JUMD")]
    ExpectedJumdError,

    #[error("invalid JUMD box")]
    InvalidDescriptionBox,

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// A specialized `JumbfParseResult` type for JUMBF parsing operations.
pub type JumbfParseResult<T> = std::result::Result<T, JumbfParseError>;

//-----------------
// ANCHOR ISO BMFF
//-----------------
macro_rules! write_u8 {
    ($w:expr, $n:expr) => {{
        use byteorder::WriteBytesExt;
        $w.write_u8($n)?
    }};
}
macro_rules! write_u32 {
    ($w:expr, $n:expr) => {{
        use byteorder::{BigEndian, WriteBytesExt};
        $w.write_u32::<BigEndian>($n)?;
    }};
}
macro_rules! write_u64 {
    ($w:expr, $n:expr) => {{
        use byteorder::{BigEndian, WriteBytesExt};
        $w.write_u64::<BigEndian>($n)?;
    }};
}
macro_rules! write_all {
    ($w:expr, $n:expr) => {{
        $w.write_all($n)?;
    }};
}

/// Four character box type.
pub type BoxType = [u8; 4];

pub const JUMB: BoxType = *b"jumb";
pub const JUMD: BoxType = *b"jumd";
pub const JSON: BoxType = *b"json";
pub const CBOR: BoxType = *b"cbor";
pub const UUID: BoxType = *b"uuid";
pub const XML: BoxType = *b"xml ";
pub const JP2C: BoxType = *b"jp2c";
pub const BFDB: BoxType = *b"bfdb";

/// Largest size that fits the 4-byte size field. Anything bigger switches to
/// the extended form.
pub const MAX_SMALL_BOX_SIZE: u64 = u32::MAX as u64;

const XL_BOX_SIZE_LEN: u64 = 8;

/// Fixed continuation header written ahead of the outermost box of an APP11
/// stream: common identifier `JP`, box instance number 1 and sequence
/// number 1.
pub const XT_HEADER: [u8; 8] = [0x4A, 0x50, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01];

fn write_box_header<W: Write + ?Sized>(
    writer: &mut W,
    size: u64,
    box_type: &BoxType,
) -> IoResult<()> {
    if size <= MAX_SMALL_BOX_SIZE {
        write_u32!(writer, size as u32);
        write_all!(writer, box_type);
    } else {
        write_u32!(writer, 1);
        write_all!(writer, box_type);
        write_u64!(writer, size + XL_BOX_SIZE_LEN);
    }
    Ok(())
}

/// Encode the size and type header of a box.
///
/// `size` counts the whole box including an 8 byte basic header. Sizes above
/// `u32::MAX` use the extended form `00000001 | type | size + 8`.
pub fn compute_box_size(size: u64, box_type: &BoxType) -> Result<Vec<u8>> {
    let mut header = Vec::with_capacity(16);
    write_box_header(&mut header, size, box_type)?;
    Ok(header)
}

/// A decoded box header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxHeader {
    /// The size as passed to [`compute_box_size`].
    pub size: u64,
    pub box_type: BoxType,
    /// Number of header bytes: 8, or 16 for the extended form.
    pub header_len: usize,
}

impl BoxHeader {
    /// Number of bytes the box occupies on the wire.
    pub fn box_len(&self) -> u64 {
        if self.header_len == 16 {
            self.size + XL_BOX_SIZE_LEN
        } else {
            self.size
        }
    }

    /// Number of payload bytes following the header.
    pub fn payload_len(&self) -> u64 {
        self.box_len() - self.header_len as u64
    }
}

/// Read back a header produced by [`compute_box_size`].
pub fn read_box_header(data: &[u8]) -> JumbfParseResult<BoxHeader> {
    let mut reader = Cursor::new(data);
    let lbox = reader
        .read_u32::<BigEndian>()
        .map_err(|_| JumbfParseError::UnexpectedEof)?;
    let mut box_type = [0u8; 4];
    reader
        .read_exact(&mut box_type)
        .map_err(|_| JumbfParseError::UnexpectedEof)?;

    match lbox {
        1 => {
            let xl_box = reader
                .read_u64::<BigEndian>()
                .map_err(|_| JumbfParseError::UnexpectedEof)?;
            let size = xl_box
                .checked_sub(XL_BOX_SIZE_LEN)
                .filter(|size| *size >= 8)
                .ok_or(JumbfParseError::InvalidBoxHeader)?;
            Ok(BoxHeader {
                size,
                box_type,
                header_len: 16,
            })
        }
        lbox if lbox >= 8 => Ok(BoxHeader {
            size: lbox as u64,
            box_type,
            header_len: 8,
        }),
        _ => Err(JumbfParseError::InvalidBoxHeader),
    }
}

//-----------------------------
// ANCHOR JUMBF Description box
//-----------------------------
const TOGGLE_REQUESTABLE: u8 = 0x01;
const TOGGLE_LABEL: u8 = 0x02;
const TOGGLE_ID: u8 = 0x04;
const TOGGLE_SIGNATURE: u8 = 0x08;

/// Metadata carried by the `jumd` box at the front of every superbox.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoxDescription {
    pub uuid: [u8; 16],
    pub label: Option<String>,
    pub id: Option<String>,
    pub signature: Option<String>,
    pub requestable: bool,
}

impl BoxDescription {
    pub fn new(uuid: [u8; 16]) -> Self {
        BoxDescription {
            uuid,
            ..Default::default()
        }
    }

    /// A description that can be addressed by its label.
    pub fn requestable(uuid: [u8; 16], label: &str) -> Self {
        BoxDescription {
            uuid,
            label: Some(label.to_owned()),
            requestable: true,
            ..Default::default()
        }
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.is_empty())
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|l| !l.is_empty())
    }

    fn signature(&self) -> Option<&str> {
        self.signature.as_deref().filter(|l| !l.is_empty())
    }

    /// The toggle byte: `reserved(4) | signature | id | label | requestable`.
    pub fn toggles(&self) -> Result<u8> {
        if self.requestable && self.label().is_none() {
            return Err(Error::BadParam(
                "a requestable JUMBF box must have a label".to_string(),
            ));
        }

        let mut toggles = 0u8;
        if self.signature().is_some() {
            toggles |= TOGGLE_SIGNATURE;
        }
        if self.id().is_some() {
            toggles |= TOGGLE_ID;
        }
        if self.label().is_some() {
            toggles |= TOGGLE_LABEL;
        }
        if self.requestable {
            toggles |= TOGGLE_REQUESTABLE;
        }
        Ok(toggles)
    }

    fn write_box<W: Write + ?Sized>(&self, writer: &mut W, toggles: u8) -> IoResult<()> {
        let fields = [self.label(), self.id(), self.signature()];
        let text_len: usize = fields.iter().flatten().map(|f| f.len() + 1).sum();
        let size = 8 + self.uuid.len() + 1 + text_len;

        write_box_header(writer, size as u64, &JUMD)?;
        write_all!(writer, &self.uuid);
        write_u8!(writer, toggles);
        for field in fields.iter().flatten() {
            write_all!(writer, field.as_bytes());
            write_u8!(writer, 0);
        }
        Ok(())
    }

    fn from_payload(payload: &[u8]) -> JumbfParseResult<Self> {
        if payload.len() < 17 {
            return Err(JumbfParseError::InvalidDescriptionBox);
        }
        let mut uuid = [0u8; 16];
        uuid.copy_from_slice(&payload[..16]);
        let toggles = payload[16];

        let mut rest = &payload[17..];
        let mut next_text = |present: bool| -> JumbfParseResult<Option<String>> {
            if !present {
                return Ok(None);
            }
            let end = rest
                .iter()
                .position(|b| *b == 0)
                .ok_or(JumbfParseError::InvalidDescriptionBox)?;
            let text = std::str::from_utf8(&rest[..end])
                .map_err(|_| JumbfParseError::InvalidDescriptionBox)?
                .to_owned();
            rest = &rest[end + 1..];
            Ok(Some(text))
        };

        let label = next_text(toggles & TOGGLE_LABEL != 0)?;
        let id = next_text(toggles & TOGGLE_ID != 0)?;
        let signature = next_text(toggles & TOGGLE_SIGNATURE != 0)?;

        Ok(BoxDescription {
            uuid,
            label,
            id,
            signature,
            requestable: toggles & TOGGLE_REQUESTABLE != 0,
        })
    }
}

/// Encode a `jumd` description box.
///
/// Fails with [`Error::BadParam`] when the description is requestable but has
/// no label.
pub fn description_box(desc: &BoxDescription) -> Result<Vec<u8>> {
    let toggles = desc.toggles()?;
    let mut out = Vec::new();
    desc.write_box(&mut out, toggles)?;
    Ok(out)
}

//-------------------------
// ANCHOR JUMBF Content box
//-------------------------

/// Wrap `content` in a content box of type `box_type`.
///
/// Without a box type the content is returned unchanged, which is how
/// nested superboxes are carried.
pub fn content_box(box_type: Option<&BoxType>, content: &[u8]) -> Result<Vec<u8>> {
    match box_type {
        Some(box_type) => {
            let mut out = Vec::with_capacity(content.len() + 16);
            write_box_header(&mut out, 8 + content.len() as u64, box_type)?;
            out.extend_from_slice(content);
            Ok(out)
        }
        None => Ok(content.to_vec()),
    }
}

//----------------------
// ANCHOR JUMBF superbox
//----------------------

/// Encode a complete `jumb` superbox: description box followed by the
/// content box.
pub fn create_box(
    desc: &BoxDescription,
    content_box_type: Option<&BoxType>,
    content: &[u8],
) -> Result<Vec<u8>> {
    let desc_box = description_box(desc)?;
    let content_box = content_box(content_box_type, content)?;
    let size = 8 + desc_box.len() as u64 + content_box.len() as u64;

    let mut out = compute_box_size(size, &JUMB)?;
    out.reserve(desc_box.len() + content_box.len());
    out.extend_from_slice(&desc_box);
    out.extend_from_slice(&content_box);
    Ok(out)
}

/// What a box holds: raw content or child superboxes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoxContent<B> {
    /// Raw bytes, wrapped in a content box when `box_type` is set.
    Content {
        box_type: Option<BoxType>,
        data: Vec<u8>,
    },
    /// Child superboxes, in order.
    Boxes(Vec<B>),
}

/// A node of a manifest template. Every node is encoded as a requestable,
/// labelled superbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateNode {
    pub uuid: [u8; 16],
    pub label: String,
    pub content: BoxContent<TemplateNode>,
}

impl TemplateNode {
    /// A leaf node holding `data` in a content box of type `box_type`.
    pub fn leaf(uuid: [u8; 16], label: impl Into<String>, box_type: BoxType, data: Vec<u8>) -> Self {
        TemplateNode {
            uuid,
            label: label.into(),
            content: BoxContent::Content {
                box_type: Some(box_type),
                data,
            },
        }
    }

    /// A branch node wrapping child nodes.
    pub fn branch(uuid: [u8; 16], label: impl Into<String>, boxes: Vec<TemplateNode>) -> Self {
        TemplateNode {
            uuid,
            label: label.into(),
            content: BoxContent::Boxes(boxes),
        }
    }
}

/// Encode a template tree.
///
/// When `include_xt_header` is set the 8-byte [`XT_HEADER`] is written once
/// ahead of the outermost boxes. Nested levels never carry it.
pub fn create_by_template(nodes: &[TemplateNode], include_xt_header: bool) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if include_xt_header {
        out.extend_from_slice(&XT_HEADER);
    }

    for node in nodes {
        let desc = BoxDescription::requestable(node.uuid, &node.label);
        let encoded = match &node.content {
            BoxContent::Content { box_type, data } => create_box(&desc, box_type.as_ref(), data)?,
            BoxContent::Boxes(children) => {
                let inner = create_by_template(children, false)?;
                create_box(&desc, None, &inner)?
            }
        };
        out.extend_from_slice(&encoded);
    }
    Ok(out)
}

//-------------------
// ANCHOR JUMBF UUIDs
//-------------------
pub const JUMBF_CODESTREAM_UUID: &str = "6579D6FBDBA2446BB2AC1B82FEEB89D1";
pub const JUMBF_JSON_UUID: &str = "6A736F6E00110010800000AA00389B71";
pub const JUMBF_CBOR_UUID: &str = "63626F7200110010800000AA00389B71";
pub const JUMBF_XML_UUID: &str = "786D6C2000110010800000AA00389B71";
pub const JUMBF_UUID_UUID: &str = "7575696400110010800000AA00389B71";
pub const JUMBF_EMBEDDED_FILE_UUID: &str = "40CB0C32BB8A489DA70B2AD6F47F4369";

pub const CAI_BLOCK_UUID: &str = "6332706100110010800000AA00389B71"; // c2pa
pub const CAI_STORE_UUID: &str = "63326D6100110010800000AA00389B71"; // c2ma
pub const CAI_ASSERTION_STORE_UUID: &str = "6332617300110010800000AA00389B71"; // c2as
pub const CAI_CLAIM_UUID: &str = "6332636C00110010800000AA00389B71"; // c2cl
pub const CAI_SIGNATURE_UUID: &str = "6332637300110010800000AA00389B71"; // c2cs

/// Optional prefix for the signature box content (casg).
pub const CAI_SIGNATURE_HEADER_UUID: &str = "6361736700110010800000AA00389B71";

/// Convert one of the hex UUID constants to its 16 bytes.
pub fn uuid_bytes(uuid: &str) -> JumbfParseResult<[u8; 16]> {
    <[u8; 16]>::from_hex(uuid).map_err(|_| JumbfParseError::InvalidUuidValue)
}

//-------------------
// ANCHOR BoxReader
//-------------------

/// A decoded superbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JumbfBox {
    pub description: BoxDescription,
    pub content: BoxContent<JumbfBox>,
}

impl JumbfBox {
    /// Decode the superboxes of a JUMBF stream. A leading [`XT_HEADER`] is
    /// skipped.
    pub fn from_bytes(data: &[u8]) -> JumbfParseResult<Vec<JumbfBox>> {
        let data = data.strip_prefix(&XT_HEADER[..]).unwrap_or(data);

        let mut boxes = Vec::new();
        for (header, payload) in BoxIter::new(data).collect::<JumbfParseResult<Vec<_>>>()? {
            if header.box_type != JUMB {
                debug!("unexpected top level box {:?}", header.box_type);
                return Err(JumbfParseError::InvalidJumbBox);
            }
            boxes.push(JumbfBox::from_payload(payload)?);
        }
        Ok(boxes)
    }

    fn from_payload(payload: &[u8]) -> JumbfParseResult<JumbfBox> {
        let mut children = BoxIter::new(payload);

        let (desc_header, desc_payload) = children
            .next()
            .ok_or(JumbfParseError::ExpectedJumdError)??;
        if desc_header.box_type != JUMD {
            return Err(JumbfParseError::ExpectedJumdError);
        }
        let description = BoxDescription::from_payload(desc_payload)?;

        let rest = children.collect::<JumbfParseResult<Vec<_>>>()?;
        let content = match rest.as_slice() {
            [(header, data)] if header.box_type != JUMB => BoxContent::Content {
                box_type: Some(header.box_type),
                data: data.to_vec(),
            },
            _ => {
                let mut boxes = Vec::with_capacity(rest.len());
                for (header, data) in rest.iter() {
                    if header.box_type != JUMB {
                        return Err(JumbfParseError::InvalidJumbBox);
                    }
                    boxes.push(JumbfBox::from_payload(data)?);
                }
                BoxContent::Boxes(boxes)
            }
        };

        Ok(JumbfBox {
            description,
            content,
        })
    }

    pub fn label(&self) -> Option<&str> {
        self.description.label.as_deref()
    }

    /// Child superboxes, empty for a content box.
    pub fn children(&self) -> &[JumbfBox] {
        match &self.content {
            BoxContent::Boxes(boxes) => boxes,
            BoxContent::Content { .. } => &[],
        }
    }

    /// Raw content and its box type, if this is a content box.
    pub fn data(&self) -> Option<(&BoxType, &[u8])> {
        match &self.content {
            BoxContent::Content {
                box_type: Some(box_type),
                data,
            } => Some((box_type, data)),
            _ => None,
        }
    }

    /// Find a direct child by label.
    pub fn child(&self, label: &str) -> Option<&JumbfBox> {
        self.children().iter().find(|b| b.label() == Some(label))
    }

    /// Follow a path of labels from this box.
    pub fn find(&self, path: &[&str]) -> Option<&JumbfBox> {
        path.iter().try_fold(self, |current, label| current.child(label))
    }
}

/// Iterates over consecutive boxes of a byte slice.
struct BoxIter<'a> {
    data: &'a [u8],
    failed: bool,
}

impl<'a> BoxIter<'a> {
    fn new(data: &'a [u8]) -> Self {
        BoxIter {
            data,
            failed: false,
        }
    }
}

impl<'a> Iterator for BoxIter<'a> {
    type Item = JumbfParseResult<(BoxHeader, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() || self.failed {
            return None;
        }

        let next = read_box_header(self.data).and_then(|header| {
            let box_len = usize::try_from(header.box_len())
                .map_err(|_| JumbfParseError::InvalidBoxRange)?;
            if box_len > self.data.len() || box_len < header.header_len {
                return Err(JumbfParseError::InvalidBoxRange);
            }
            let payload = &self.data[header.header_len..box_len];
            self.data = &self.data[box_len..];
            Ok((header, payload))
        });

        if next.is_err() {
            self.failed = true;
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn small_box_header() {
        let header = compute_box_size(65535, b"test").unwrap();
        assert_eq!(hex::encode(&header), "0000ffff74657374");

        let parsed = read_box_header(&header).unwrap();
        assert_eq!(parsed.size, 65535);
        assert_eq!(parsed.box_type, *b"test");
        assert_eq!(parsed.header_len, 8);
    }

    #[test]
    fn extended_box_header() {
        let size = 1u64 << 32;
        let header = compute_box_size(size, b"test").unwrap();
        assert_eq!(hex::encode(&header), "00000001746573740000000100000008");

        let parsed = read_box_header(&header).unwrap();
        assert_eq!(parsed.size, size);
        assert_eq!(parsed.header_len, 16);
        assert_eq!(parsed.box_len(), size + 8);
        assert_eq!(parsed.payload_len(), size - 8);
    }

    #[test]
    fn header_size_round_trips_across_the_boundary() {
        for size in [8u64, 255, MAX_SMALL_BOX_SIZE - 1, MAX_SMALL_BOX_SIZE, MAX_SMALL_BOX_SIZE + 1] {
            let header = compute_box_size(size, &JSON).unwrap();
            let parsed = read_box_header(&header).unwrap();
            assert_eq!(parsed.size, size);
            assert_eq!(parsed.header_len, if size <= MAX_SMALL_BOX_SIZE { 8 } else { 16 });
        }
    }

    #[test]
    fn bad_headers() {
        assert!(matches!(
            read_box_header(&[0, 0, 0]),
            Err(JumbfParseError::UnexpectedEof)
        ));
        assert!(matches!(
            read_box_header(&hex::decode("0000000474657374").unwrap()),
            Err(JumbfParseError::InvalidBoxHeader)
        ));
        assert!(matches!(
            read_box_header(&hex::decode("0000000174657374").unwrap()),
            Err(JumbfParseError::UnexpectedEof)
        ));
    }

    #[test]
    fn toggle_table() {
        let uuid = [0u8; 16];
        let cases = [
            (BoxDescription::requestable(uuid, "label"), 0x03),
            (BoxDescription::new(uuid), 0x00),
            (
                BoxDescription {
                    label: Some("label".into()),
                    ..BoxDescription::new(uuid)
                },
                0x02,
            ),
            (
                BoxDescription {
                    id: Some("id".into()),
                    ..BoxDescription::new(uuid)
                },
                0x04,
            ),
            (
                BoxDescription {
                    signature: Some("sig".into()),
                    ..BoxDescription::requestable(uuid, "label")
                },
                0x0b,
            ),
        ];

        for (desc, expected) in cases {
            assert_eq!(desc.toggles().unwrap(), expected, "{desc:?}");
        }
    }

    #[test]
    fn requestable_box_needs_label() {
        let mut desc = BoxDescription::new([0u8; 16]);
        desc.requestable = true;
        assert!(matches!(description_box(&desc), Err(Error::BadParam(_))));

        desc.label = Some(String::new());
        assert!(matches!(description_box(&desc), Err(Error::BadParam(_))));
    }

    #[test]
    fn description_field_order() {
        let desc = BoxDescription {
            uuid: uuid_bytes(JUMBF_JSON_UUID).unwrap(),
            label: Some("l".into()),
            id: Some("i".into()),
            signature: Some("s".into()),
            requestable: true,
        };
        let encoded = description_box(&desc).unwrap();
        assert_eq!(encoded.len(), 8 + 16 + 1 + 6);
        assert_eq!(&encoded[4..8], b"jumd");
        assert_eq!(encoded[24], 0x0f);
        assert_eq!(&encoded[25..], b"l\0i\0s\0");
    }

    #[test]
    fn content_box_sizes() {
        let boxed = content_box(Some(&JSON), b"123").unwrap();
        assert_eq!(boxed.len(), 11);
        assert_eq!(hex::encode(&boxed), "0000000b6a736f6e313233");

        assert_eq!(content_box(None, b"123").unwrap(), b"123");
    }

    #[test]
    fn json_superbox_matches_reference_bytes() {
        let desc = BoxDescription::requestable(
            uuid_bytes(JUMBF_JSON_UUID).unwrap(),
            "cai.location.broad",
        );
        let encoded = create_box(
            &desc,
            Some(&JSON),
            br#"{ "location": "Margate City, NJ"}"#,
        )
        .unwrap();

        assert_eq!(
            hex::encode_upper(&encoded),
            "0000005D6A756D620000002C6A756D646A736F6E00110010800000AA00389B71036361692E6C6F636174696F6E2E62726F616400000000296A736F6E7B20226C6F636174696F6E223A20224D61726761746520436974792C204E4A227D"
        );
    }

    fn sample_template() -> Vec<TemplateNode> {
        let cbor = uuid_bytes(JUMBF_CBOR_UUID).unwrap();
        vec![TemplateNode::branch(
            uuid_bytes(CAI_BLOCK_UUID).unwrap(),
            "c2pa",
            vec![
                TemplateNode::leaf(cbor, "first", CBOR, vec![0xa0]),
                TemplateNode::branch(
                    uuid_bytes(CAI_ASSERTION_STORE_UUID).unwrap(),
                    "store",
                    vec![TemplateNode::leaf(cbor, "second", CBOR, vec![0x01, 0x02])],
                ),
            ],
        )]
    }

    #[test]
    fn template_gets_one_xt_header() {
        let template = sample_template();
        let with_header = create_by_template(&template, true).unwrap();
        let without_header = create_by_template(&template, false).unwrap();

        assert_eq!(&with_header[..8], &XT_HEADER);
        assert_eq!(&with_header[8..], without_header.as_slice());

        // only one occurrence: nested levels are encoded without it
        let count = with_header
            .windows(XT_HEADER.len())
            .filter(|w| *w == XT_HEADER)
            .count();
        assert_eq!(count, 1);

        // outer size covers the whole stream
        let header = read_box_header(&without_header).unwrap();
        assert_eq!(header.box_len(), without_header.len() as u64);
    }

    #[test]
    fn template_decodes_back() {
        let template = sample_template();
        let encoded = create_by_template(&template, true).unwrap();
        let decoded = JumbfBox::from_bytes(&encoded).unwrap();

        assert_eq!(decoded.len(), 1);
        let root = &decoded[0];
        assert_eq!(root.label(), Some("c2pa"));
        assert!(root.description.requestable);
        assert_eq!(root.children().len(), 2);

        let first = root.child("first").unwrap();
        assert_eq!(first.data(), Some((&CBOR, &[0xa0u8][..])));

        let second = root.find(&["store", "second"]).unwrap();
        assert_eq!(second.data().unwrap().1, &[0x01, 0x02]);
        assert_eq!(
            second.description.uuid,
            uuid_bytes(JUMBF_CBOR_UUID).unwrap()
        );
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let encoded = create_by_template(&sample_template(), false).unwrap();
        let truncated = &encoded[..encoded.len() - 1];
        assert!(matches!(
            JumbfBox::from_bytes(truncated),
            Err(JumbfParseError::InvalidBoxRange)
        ));
    }

    #[test]
    fn bad_uuid_constant() {
        assert!(matches!(
            uuid_bytes("not hex"),
            Err(JumbfParseError::InvalidUuidValue)
        ));
    }
}
