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

use fast_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Reader, Writer,
};
use log::error;

use crate::{Error, Result};

const RDF_DESCRIPTION: &[u8] = b"rdf:Description";

/// Written ahead of the packet. This is also the APP1 namespace signature.
pub const XMP_PACKET_START: &str =
    "http://ns.adobe.com/xap/1.0/ <?xpacket begin='' id='W5M0MpCehiHzreSzNTczkc9d'?>";
pub const XMP_PACKET_END: &str = "<?xpacket end='r'?>";

const XMP_TOOLKIT: &str = "Adobe XMP Core 5.1.0-jc003";

pub const PROVENANCE_KEY: &str = "dcterms:provenance";
pub const DOCUMENT_ID_KEY: &str = "xmpMM:DocumentId";
pub const INSTANCE_ID_KEY: &str = "xmpMM:InstanceId";
pub const CREATE_DATE_KEY: &str = "xmp:CreateDate";

/// An XML namespace declared on `rdf:Description`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmpNamespace {
    pub prefix: String,
    pub url: String,
}

impl XmpNamespace {
    pub fn new(prefix: &str, url: &str) -> Self {
        XmpNamespace {
            prefix: prefix.to_owned(),
            url: url.to_owned(),
        }
    }
}

/// Namespaces used by the provenance XMP packet.
pub fn standard_namespaces() -> Vec<XmpNamespace> {
    vec![
        XmpNamespace::new("dcterms", "http://purl.org/dc/terms/"),
        XmpNamespace::new("xmp", "http://ns.adobe.com/xap/1.0"),
        XmpNamespace::new("xmpmm", "http://ns.adobe.com/xap/1.0/mm/"),
    ]
}

fn write_err<E: std::fmt::Display>(err: E) -> Error {
    error!("could not write XMP: {err}");
    Error::XmpWriteError(err.to_string())
}

/// Build an XMP packet holding `values` as attributes of a single
/// `rdf:Description`.
pub fn build_xmp(namespaces: &[XmpNamespace], values: &[(&str, &str)]) -> Result<String> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new(b"1.0", None, None)))
        .map_err(write_err)?;

    let mut xmpmeta = BytesStart::borrowed_name(b"x:xmpmeta");
    xmpmeta.push_attribute(("xmlns:x", "adobe:ns:meta/"));
    xmpmeta.push_attribute(("x:xmptk", XMP_TOOLKIT));
    writer
        .write_event(Event::Start(xmpmeta))
        .map_err(write_err)?;

    let mut rdf = BytesStart::borrowed_name(b"rdf:RDF");
    rdf.push_attribute(("xmlns:rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"));
    writer.write_event(Event::Start(rdf)).map_err(write_err)?;

    let mut desc = BytesStart::owned(RDF_DESCRIPTION.to_vec(), RDF_DESCRIPTION.len());
    desc.push_attribute(("rdf:about", ""));
    for ns in namespaces {
        let key = format!("xmlns:{}", ns.prefix);
        desc.push_attribute((key.as_str(), ns.url.as_str()));
    }
    for (key, value) in values {
        desc.push_attribute((*key, *value));
    }
    writer.write_event(Event::Empty(desc)).map_err(write_err)?;

    writer
        .write_event(Event::End(BytesEnd::borrowed(b"rdf:RDF")))
        .map_err(write_err)?;
    writer
        .write_event(Event::End(BytesEnd::borrowed(b"x:xmpmeta")))
        .map_err(write_err)?;

    let body = String::from_utf8(writer.into_inner()).map_err(write_err)?;
    Ok(format!("{XMP_PACKET_START}{body}{XMP_PACKET_END}"))
}

/// Extract a value from XMP using a key
fn extract_xmp_key(xmp: &str, key: &str) -> Option<String> {
    let body = xmp.find('<').map_or(xmp, |start| &xmp[start..]);
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if e.name() == RDF_DESCRIPTION {
                    // attribute case
                    let value = e
                        .attributes()
                        .flatten()
                        .find(|attribute| attribute.key == key.as_bytes());
                    if let Some(attribute) = value {
                        if let Ok(s) = String::from_utf8(attribute.value.to_vec()) {
                            return Some(s);
                        }
                    }
                } else if e.name() == key.as_bytes() {
                    // tag case
                    let mut buf: Vec<u8> = Vec::new();
                    if let Ok(s) = reader.read_text(e.name(), &mut buf) {
                        return Some(s);
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    None
}

/// The `dcterms:provenance` URI of an XMP packet.
pub fn extract_provenance(xmp: &str) -> Option<String> {
    extract_xmp_key(xmp, PROVENANCE_KEY)
}

pub fn extract_document_id(xmp: &str) -> Option<String> {
    extract_xmp_key(xmp, DOCUMENT_ID_KEY)
}

pub fn extract_create_date(xmp: &str) -> Option<String> {
    extract_xmp_key(xmp, CREATE_DATE_KEY)
}
