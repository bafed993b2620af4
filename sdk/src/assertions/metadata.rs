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

//! Capture metadata assertions and the caller details they are built from.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    assertion::{Assertion, AssertionBase, AssertionCbor},
    assertions::labels,
    error::Result,
};

/// Written when the capture has no location.
pub const MISSING: &str = "missing";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsLocation {
    pub gps_latitude: String,
    pub gps_longitude: String,
}

/// What the caller knows about the capture.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GpsLocation>,
    /// Capture time, written verbatim to `c2pa.time` and `xmp:CreateDate`.
    pub time: String,
    /// Overrides the recorder from the settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorder: Option<String>,
}

impl ClaimDetails {
    pub fn new(time: impl Into<String>) -> Self {
        ClaimDetails {
            time: time.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, latitude: &str, longitude: &str) -> Self {
        self.location = Some(GpsLocation {
            gps_latitude: latitude.to_owned(),
            gps_longitude: longitude.to_owned(),
        });
        self
    }

    pub fn with_recorder(mut self, recorder: &str) -> Self {
        self.recorder = Some(recorder.to_owned());
        self
    }
}

/// `c2pa.claim.date`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClaimDate {
    pub date: String,
}

impl ClaimDate {
    pub fn new(created_at: &DateTime<Utc>) -> Self {
        ClaimDate {
            date: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl AssertionCbor for ClaimDate {}

impl AssertionBase for ClaimDate {
    const LABEL: &'static str = labels::CLAIM_DATE;

    fn to_assertion(&self) -> Result<Assertion> {
        self.to_cbor_assertion()
    }
}

/// `c2pa.location.precise`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LocationPrecise {
    #[serde(rename = "exif:GPSLatitude")]
    pub latitude: String,
    #[serde(rename = "exif:GPSLongitude")]
    pub longitude: String,
}

impl LocationPrecise {
    pub fn new(location: Option<&GpsLocation>) -> Self {
        match location {
            Some(l) => LocationPrecise {
                latitude: l.gps_latitude.clone(),
                longitude: l.gps_longitude.clone(),
            },
            None => LocationPrecise {
                latitude: MISSING.to_owned(),
                longitude: MISSING.to_owned(),
            },
        }
    }
}

impl AssertionCbor for LocationPrecise {}

impl AssertionBase for LocationPrecise {
    const LABEL: &'static str = labels::LOCATION_PRECISE;

    fn to_assertion(&self) -> Result<Assertion> {
        self.to_cbor_assertion()
    }
}

/// `c2pa.time`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CaptureTime {
    #[serde(rename = "xmp:CreateDate")]
    pub create_date: String,
}

impl CaptureTime {
    pub fn new(time: &str) -> Self {
        CaptureTime {
            create_date: time.to_owned(),
        }
    }
}

impl AssertionCbor for CaptureTime {}

impl AssertionBase for CaptureTime {
    const LABEL: &'static str = labels::TIME;

    fn to_assertion(&self) -> Result<Assertion> {
        self.to_cbor_assertion()
    }
}
