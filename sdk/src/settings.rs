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

use config::{Config, FileFormat};
use serde_derive::{Deserialize, Serialize};

use crate::{asset_handlers::xt_splitter::MAX_XT_CHUNK_SIZE, Error, Result};

pub const THUMBNAIL_MAX_WIDTH_ENV: &str = "THUMBNAIL_MAX_WIDTH";
pub const THUMBNAIL_MAX_HEIGHT_ENV: &str = "THUMBNAIL_MAX_HEIGHT";

// trait used to validate user input to make sure user supplied configurations are valid
pub(crate) trait SettingsValidate {
    // returns error if settings are invalid
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Settings for the thumbnail generated when the image is available.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub max_width: u32,
    pub max_height: u32,
    /// Fit inside the bounding box instead of stretching to it.
    pub preserve_aspect_ratio: bool,
    /// Never scale an image up.
    pub without_enlargement: bool,
    /// JPEG quality, 1 to 100.
    pub quality: u8,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        ThumbnailSettings {
            max_width: 1024,
            max_height: 768,
            preserve_aspect_ratio: true,
            without_enlargement: true,
            quality: 80,
        }
    }
}

impl SettingsValidate for ThumbnailSettings {
    fn validate(&self) -> Result<()> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(Error::ConfigError(
                "thumbnail dimensions must be greater than zero".into(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(Error::ConfigError(format!(
                "thumbnail quality {} is outside 1..=100",
                self.quality
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ManifestSettings {
    /// Written to the claim when the caller does not name a recorder.
    pub recorder: String,
    /// Prefix the signature box content with the `casg` UUID.
    pub signature_uuid_header: bool,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        ManifestSettings {
            recorder: "RecorderAppName".to_string(),
            signature_uuid_header: false,
        }
    }
}

impl SettingsValidate for ManifestSettings {
    fn validate(&self) -> Result<()> {
        if self.recorder.is_empty() {
            return Err(Error::ConfigError("recorder must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct XtSettings {
    pub max_chunk_size: usize,
}

impl XtSettings {
    /// Chunk size actually used by the splitter.
    pub fn chunk_size(&self) -> usize {
        self.max_chunk_size.min(MAX_XT_CHUNK_SIZE)
    }
}

impl Default for XtSettings {
    fn default() -> Self {
        XtSettings {
            max_chunk_size: MAX_XT_CHUNK_SIZE,
        }
    }
}

impl SettingsValidate for XtSettings {
    fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::ConfigError("xt.max_chunk_size must not be zero".into()));
        }
        Ok(())
    }
}

/// Settings for manifest construction.
///
/// Settings are a plain value handed to the builder. Partial documents are
/// merged over the defaults, so a file only needs the values it changes.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub thumbnail: ThumbnailSettings,
    pub manifest: ManifestSettings,
    pub xt: XtSettings,
}

impl Settings {
    /// Load settings from a `json` or `toml` document.
    pub fn from_string(settings_str: &str, format: &str) -> Result<Self> {
        let f = match format.to_lowercase().as_str() {
            "json" => FileFormat::Json,
            "toml" => FileFormat::Toml,
            _ => {
                return Err(Error::ConfigError(format!(
                    "unsupported settings format: {format}"
                )))
            }
        };

        let defaults = Config::try_from(&Settings::default())
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(config::File::from_str(settings_str, f))
            .build() // merge overrides, allows for partial changes
            .map_err(|_e| Error::ConfigError("could not parse configuration".into()))?
            .try_deserialize::<Settings>()
            .map_err(|e| Error::ConfigError(format!("unrecognized setting: {e}")))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Apply `THUMBNAIL_MAX_WIDTH` and `THUMBNAIL_MAX_HEIGHT` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str, value: String| {
            value.trim().parse::<u32>().map_err(|_e| {
                Error::ConfigError(format!("{key} must be a positive integer, got {value:?}"))
            })
        };

        if let Some(value) = lookup(THUMBNAIL_MAX_WIDTH_ENV) {
            self.thumbnail.max_width = parse(THUMBNAIL_MAX_WIDTH_ENV, value)?;
        }
        if let Some(value) = lookup(THUMBNAIL_MAX_HEIGHT_ENV) {
            self.thumbnail.max_height = parse(THUMBNAIL_MAX_HEIGHT_ENV, value)?;
        }

        self.validate()?;
        Ok(self)
    }
}

impl SettingsValidate for Settings {
    fn validate(&self) -> Result<()> {
        self.thumbnail.validate()?;
        self.manifest.validate()?;
        self.xt.validate()
    }
}
