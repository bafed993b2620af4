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

//! Standard (padded) base64, the encoding used for every string the
//! builder returns.

use base64::{engine::general_purpose, Engine as _};

pub fn encode(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

pub fn decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(data)
}

/// Encode each buffer separately, keeping their order.
pub fn encode_all<T: AsRef<[u8]>>(buffers: &[T]) -> Vec<String> {
    buffers.iter().map(|b| encode(b.as_ref())).collect()
}

/// `#[serde(with = ...)]` helpers writing byte buffers as base64 strings.
pub(crate) mod serde_base64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::encode(bytes))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        super::decode(&text).map_err(de::Error::custom)
    }
}

pub(crate) mod serde_base64_list {
    use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(buffers: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(buffers.len()))?;
        for buffer in buffers {
            seq.serialize_element(&super::encode(buffer))?;
        }
        seq.end()
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<u8>>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|text| super::decode(text).map_err(de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn encodes_each_buffer() {
        let encoded = encode_all(&[b"ab".to_vec(), Vec::new(), b"abc".to_vec()]);
        assert_eq!(encoded, vec!["YWI=", "", "YWJj"]);
        assert_eq!(decode(&encoded[2]).unwrap(), b"abc");
        assert!(decode("not base64!").is_err());
    }
}
