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

//! Marker segment parsing and APPn segment insertion for JPEG streams.
//!
//! Only segment boundaries are examined. Entropy coded data following the
//! start of scan marker is treated as one opaque region.

use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};

use crate::error::{Error, Result};

/// JPEG marker values.
pub mod markers {
    pub const SOF0: u16 = 0xffc0;
    pub const SOF1: u16 = 0xffc1;
    pub const SOF2: u16 = 0xffc2;
    pub const SOF3: u16 = 0xffc3;
    pub const DHT: u16 = 0xffc4;
    pub const SOF5: u16 = 0xffc5;
    pub const SOF6: u16 = 0xffc6;
    pub const SOF7: u16 = 0xffc7;
    pub const JPG: u16 = 0xffc8;
    pub const SOF9: u16 = 0xffc9;
    pub const SOF10: u16 = 0xffca;
    pub const SOF11: u16 = 0xffcb;
    pub const DAC: u16 = 0xffcc;
    pub const SOF13: u16 = 0xffcd;
    pub const SOF14: u16 = 0xffce;
    pub const SOF15: u16 = 0xffcf;
    pub const RST0: u16 = 0xffd0;
    pub const RST7: u16 = 0xffd7;
    pub const SOI: u16 = 0xffd8;
    pub const EOI: u16 = 0xffd9;
    pub const SOS: u16 = 0xffda;
    pub const DQT: u16 = 0xffdb;
    pub const DNL: u16 = 0xffdc;
    pub const DRI: u16 = 0xffdd;
    pub const DHP: u16 = 0xffde;
    pub const EXP: u16 = 0xffdf;
    pub const APP0: u16 = 0xffe0;
    pub const APP1: u16 = 0xffe1;
    pub const APP11: u16 = 0xffeb;
    pub const APP15: u16 = 0xffef;
    pub const JPG0: u16 = 0xfff0;
    pub const JPG13: u16 = 0xfffd;
    pub const COM: u16 = 0xfffe;

    /// Return the APPn marker for `n` in `0..=15`.
    pub const fn app(n: u8) -> u16 {
        APP0 + (n as u16 & 0x0f)
    }

    pub fn is_app(marker: u16) -> bool {
        (APP0..=APP15).contains(&marker)
    }
}

use markers::*;

/// How a marker is framed in the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerClass {
    /// A bare 2-byte marker.
    Simple,
    /// A marker followed by a 2-byte big-endian length that counts itself.
    VariableLength,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerInfo {
    pub marker: u16,
    pub name: &'static str,
    pub class: MarkerClass,
}

const fn simple(marker: u16, name: &'static str) -> MarkerInfo {
    MarkerInfo {
        marker,
        name,
        class: MarkerClass::Simple,
    }
}

const fn variable(marker: u16, name: &'static str) -> MarkerInfo {
    MarkerInfo {
        marker,
        name,
        class: MarkerClass::VariableLength,
    }
}

static MARKER_TABLE: &[MarkerInfo] = &[
    variable(0xffe0, "APP0"),
    variable(0xffe1, "APP1"),
    variable(0xffe2, "APP2"),
    variable(0xffe3, "APP3"),
    variable(0xffe4, "APP4"),
    variable(0xffe5, "APP5"),
    variable(0xffe6, "APP6"),
    variable(0xffe7, "APP7"),
    variable(0xffe8, "APP8"),
    variable(0xffe9, "APP9"),
    variable(0xffea, "APP10"),
    variable(0xffeb, "APP11"),
    variable(0xffec, "APP12"),
    variable(0xffed, "APP13"),
    variable(0xffee, "APP14"),
    variable(0xffef, "APP15"),
    variable(COM, "COM"),
    variable(DAC, "DAC"),
    variable(DHT, "DHT"),
    variable(DHP, "DHP"),
    variable(DNL, "DNL"),
    variable(DQT, "DQT"),
    variable(DRI, "DRI"),
    variable(EXP, "EXP"),
    variable(JPG, "JPG"),
    variable(JPG0, "JPG0"),
    variable(0xfff1, "JPG1"),
    variable(0xfff2, "JPG2"),
    variable(0xfff3, "JPG3"),
    variable(0xfff4, "JPG4"),
    variable(0xfff5, "JPG5"),
    variable(0xfff6, "JPG6"),
    variable(0xfff7, "JPG7"),
    variable(0xfff8, "JPG8"),
    variable(0xfff9, "JPG9"),
    variable(0xfffa, "JPG10"),
    variable(0xfffb, "JPG11"),
    variable(0xfffc, "JPG12"),
    variable(JPG13, "JPG13"),
    variable(SOF0, "SOF0"),
    variable(SOF1, "SOF1"),
    variable(SOF2, "SOF2"),
    variable(SOF3, "SOF3"),
    variable(SOF5, "SOF5"),
    variable(SOF6, "SOF6"),
    variable(SOF7, "SOF7"),
    variable(SOF9, "SOF9"),
    variable(SOF10, "SOF10"),
    variable(SOF11, "SOF11"),
    variable(SOF13, "SOF13"),
    variable(SOF14, "SOF14"),
    variable(SOF15, "SOF15"),
    variable(SOS, "SOS"),
    simple(SOI, "SOI"),
    simple(EOI, "EOI"),
    simple(RST0, "RST0"),
    simple(0xffd1, "RST1"),
    simple(0xffd2, "RST2"),
    simple(0xffd3, "RST3"),
    simple(0xffd4, "RST4"),
    simple(0xffd5, "RST5"),
    simple(0xffd6, "RST6"),
    simple(RST7, "RST7"),
];

/// Look up a marker in the marker table. The first exact match wins.
pub fn marker_info(marker: u16) -> Option<&'static MarkerInfo> {
    MARKER_TABLE.iter().find(|info| info.marker == marker)
}

const MARKER_LEN: usize = 2;
const SEGMENT_HEADER_LEN: usize = 4;

/// Byte overhead of an APPn segment around its payload: marker and length.
pub const APPN_HEADER_LEN: usize = SEGMENT_HEADER_LEN;

/// Largest payload an APPn segment can carry.
pub const MAX_APPN_PAYLOAD: usize = u16::MAX as usize - 2;

const EXIF_SIGNATURE: &[u8] = b"Exif";

/// A marker segment and the inclusive byte range it occupies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentLocation {
    pub marker: u16,
    pub start: usize,
    /// Inclusive end offset.
    pub end: usize,
}

impl SegmentLocation {
    /// Number of bytes covered, marker included.
    pub fn length(&self) -> usize {
        self.end - self.start + 1
    }
}

/// A contiguous region of the parsed stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteRange<'a> {
    pub content: &'a [u8],
    pub start: usize,
    pub length: usize,
}

/// Index of every marker segment of a JPEG stream.
///
/// The first location is always SOI and the last always EOI.
#[derive(Debug)]
pub struct JpegSegmentTable<'a> {
    data: &'a [u8],
    segments: Vec<SegmentLocation>,
}

impl<'a> JpegSegmentTable<'a> {
    /// Walk `data` marker by marker.
    ///
    /// Parsing stops at EOI. The start of scan segment runs to the final two
    /// bytes of the stream, which are recorded as EOI.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < MARKER_LEN || BigEndian::read_u16(data) != SOI {
            return Err(Error::JpegParsing("file does not start with SOI".to_string()));
        }

        let mut segments = Vec::new();
        let mut pos = 0usize;

        loop {
            if pos + MARKER_LEN > data.len() {
                return Err(Error::JpegParsing(
                    "stream ended without an end of image marker".to_string(),
                ));
            }
            let marker = BigEndian::read_u16(&data[pos..]);
            let info = marker_info(marker).ok_or_else(|| {
                Error::JpegParsing(format!("unknown segment: 0x{marker:04x} at {pos}"))
            })?;

            match info.class {
                MarkerClass::Simple => {
                    segments.push(SegmentLocation {
                        marker,
                        start: pos,
                        end: pos + 1,
                    });
                    pos += MARKER_LEN;
                    if marker == EOI {
                        break;
                    }
                }
                MarkerClass::VariableLength if marker == SOS => {
                    // scan header plus room for the closing EOI
                    if data.len() < pos + SEGMENT_HEADER_LEN + MARKER_LEN {
                        return Err(Error::JpegParsing("truncated start of scan".to_string()));
                    }
                    let eoi_start = data.len() - MARKER_LEN;
                    if BigEndian::read_u16(&data[eoi_start..]) != EOI {
                        warn!("JPEG scan data is not terminated by EOI");
                    }
                    segments.push(SegmentLocation {
                        marker,
                        start: pos,
                        end: eoi_start - 1,
                    });
                    segments.push(SegmentLocation {
                        marker: EOI,
                        start: eoi_start,
                        end: data.len() - 1,
                    });
                    break;
                }
                MarkerClass::VariableLength => {
                    if pos + SEGMENT_HEADER_LEN > data.len() {
                        return Err(Error::JpegParsing(format!(
                            "truncated {} segment length at {pos}",
                            info.name
                        )));
                    }
                    let len = BigEndian::read_u16(&data[pos + MARKER_LEN..]) as usize;
                    let next = pos + MARKER_LEN + len;
                    if len < 2 || next > data.len() {
                        return Err(Error::JpegParsing(format!(
                            "invalid {} segment length {len} at {pos}",
                            info.name
                        )));
                    }
                    segments.push(SegmentLocation {
                        marker,
                        start: pos,
                        end: next - 1,
                    });
                    pos = next;
                }
            }
        }

        debug!("parsed {} JPEG segments", segments.len());
        Ok(JpegSegmentTable { data, segments })
    }

    pub fn segments(&self) -> &[SegmentLocation] {
        &self.segments
    }

    /// Markers in stream order.
    pub fn markers(&self) -> Vec<u16> {
        self.segments.iter().map(|s| s.marker).collect()
    }

    /// Location of the `occurrence`-th (zero based) segment with `marker`.
    pub fn segment(&self, marker: u16, occurrence: usize) -> Option<&SegmentLocation> {
        self.segments
            .iter()
            .filter(|s| s.marker == marker)
            .nth(occurrence)
    }

    /// Bytes of a segment, marker and length included.
    pub fn segment_bytes(&self, segment: &SegmentLocation) -> &'a [u8] {
        &self.data[segment.start..=segment.end]
    }

    pub(crate) fn segment_payload(&self, segment: &SegmentLocation) -> &'a [u8] {
        let bytes = self.segment_bytes(segment);
        bytes.get(SEGMENT_HEADER_LEN..).unwrap_or_default()
    }

    fn sos(&self) -> Result<&SegmentLocation> {
        self.segment(SOS, 0)
            .ok_or_else(|| Error::JpegParsing("JPEG does not contain an SOS segment".to_string()))
    }

    /// Everything from the start of scan marker to the end of the stream.
    /// This is the region covered by the content hash.
    pub fn sos_to_end_of_file(&self) -> Result<ByteRange<'a>> {
        let sos = self.sos()?;
        let content = &self.data[sos.start..];
        Ok(ByteRange {
            content,
            start: sos.start,
            length: content.len(),
        })
    }

    /// The first APP1 segment whose payload starts with `Exif`.
    pub fn exif_segment(&self) -> Option<ByteRange<'a>> {
        self.segments
            .iter()
            .filter(|s| s.marker == APP1)
            .find(|s| self.segment_payload(s).starts_with(EXIF_SIGNATURE))
            .map(|s| ByteRange {
                content: self.segment_bytes(s),
                start: s.start,
                length: s.length(),
            })
    }

    /// Bytes from SOI up to and including the SOS marker.
    pub fn header_data(&self) -> Result<&'a [u8]> {
        let sos = self.sos()?;
        Ok(&self.data[..sos.start + MARKER_LEN])
    }

    /// Payloads of the DQT segments.
    pub fn quantization_tables(&self) -> Vec<&'a [u8]> {
        self.segments
            .iter()
            .filter(|s| s.marker == DQT)
            .map(|s| self.segment_payload(s))
            .collect()
    }
}

/// A new APPn segment to insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppSegment {
    pub marker: u16,
    pub payload: Vec<u8>,
}

impl AppSegment {
    pub fn new(marker: u16, payload: Vec<u8>) -> Self {
        AppSegment { marker, payload }
    }

    /// Bytes this segment occupies once written.
    pub fn encoded_len(&self) -> usize {
        APPN_HEADER_LEN + self.payload.len()
    }

    fn check(&self) -> Result<()> {
        if !is_app(self.marker) {
            return Err(Error::BadParam(format!(
                "0x{:04x} is not an APPn marker",
                self.marker
            )));
        }
        if self.payload.len() > MAX_APPN_PAYLOAD {
            return Err(Error::BadParam(format!(
                "APPn payload of {} bytes does not fit in one segment",
                self.payload.len()
            )));
        }
        Ok(())
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        let mut header = [0u8; SEGMENT_HEADER_LEN];
        BigEndian::write_u16(&mut header, self.marker);
        // fits: checked against MAX_APPN_PAYLOAD
        BigEndian::write_u16(&mut header[MARKER_LEN..], (self.payload.len() + 2) as u16);
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.payload);
    }
}

// Advance past APPn segments ordered before `marker`.
fn skip_lower_app_segments(image: &[u8], mut pos: usize, marker: u16) -> Result<usize> {
    while pos + SEGMENT_HEADER_LEN <= image.len() {
        let current = BigEndian::read_u16(&image[pos..]);
        if !(is_app(current) && current < marker) {
            break;
        }
        let len = BigEndian::read_u16(&image[pos + MARKER_LEN..]) as usize;
        let next = pos + MARKER_LEN + len;
        if len < 2 || next > image.len() {
            return Err(Error::JpegParsing(format!(
                "invalid APPn segment length {len} at {pos}"
            )));
        }
        pos = next;
    }
    Ok(pos)
}

fn check_soi(image: &[u8]) -> Result<()> {
    if image.len() < MARKER_LEN || BigEndian::read_u16(image) != SOI {
        return Err(Error::JpegParsing("file does not start with SOI".to_string()));
    }
    Ok(())
}

/// Offset at which a new segment with `marker` would be written: after SOI
/// and after every leading APPn segment with a lower marker value.
pub fn insertion_point(image: &[u8], marker: u16) -> Result<usize> {
    check_soi(image)?;
    skip_lower_app_segments(image, MARKER_LEN, marker)
}

/// Insert APPn segments into a JPEG stream.
///
/// Segments are written in ascending marker order. Each lands in front of
/// the first existing segment whose marker is equal or greater, so XMP in
/// APP1 goes ahead of an existing Exif APP1 segment. Segments sharing a
/// marker keep their relative order.
pub fn insert_segments(image: &[u8], segments: &[AppSegment]) -> Result<Vec<u8>> {
    check_soi(image)?;
    if segments.is_empty() {
        return Ok(image.to_vec());
    }
    for segment in segments {
        segment.check()?;
    }

    let mut sorted: Vec<&AppSegment> = segments.iter().collect();
    sorted.sort_by_key(|s| s.marker);

    let added: usize = sorted.iter().map(|s| s.encoded_len()).sum();
    let mut out = Vec::with_capacity(image.len() + added);
    out.extend_from_slice(&image[..MARKER_LEN]);

    let mut pos = MARKER_LEN;
    for segment in sorted {
        let next = skip_lower_app_segments(image, pos, segment.marker)?;
        out.extend_from_slice(&image[pos..next]);
        pos = next;
        segment.write_to(&mut out);
    }
    out.extend_from_slice(&image[pos..]);

    Ok(out)
}
