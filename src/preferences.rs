//! Device-local preferences
//!
//! Values that are not part of the session and survive logout: the
//! colour theme, the patient's profile picture, and the doctor the patient
//! picked before booking.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DermascanError, Result};
use crate::storage::{get_json, keys, set_json, KeyValueStore};

/// Colour theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = DermascanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(DermascanError::Validation(format!(
                "Unknown theme: {} (expected light or dark)",
                other
            ))),
        }
    }
}

/// Doctor picked by the patient, required before booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedDoctor {
    #[serde(alias = "id")]
    pub doctor_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    pub selected_at: DateTime<Utc>,
    /// Diagnosis shared with the doctor on selection
    #[serde(default)]
    pub diagnosis_id: Option<String>,
    #[serde(default)]
    pub image_uri: Option<String>,
}

/// Reads and writes preferences
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored theme. Missing or unknown values read as [`Theme::Light`].
    pub async fn theme(&self) -> Result<Theme> {
        Ok(self
            .store
            .get(keys::THEME_PREFERENCE)
            .await?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default())
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(keys::THEME_PREFERENCE, theme.as_str()).await
    }

    pub async fn profile_image(&self) -> Result<Option<String>> {
        self.store.get(keys::PROFILE_IMAGE).await
    }

    pub async fn set_profile_image(&self, uri: &str) -> Result<()> {
        self.store.set(keys::PROFILE_IMAGE, uri).await
    }

    /// The doctor last selected by the patient, if any.
    pub async fn selected_doctor(&self) -> Result<Option<SelectedDoctor>> {
        get_json(self.store.as_ref(), keys::SELECTED_DOCTOR).await
    }

    pub async fn set_selected_doctor(&self, doctor: &SelectedDoctor) -> Result<()> {
        set_json(self.store.as_ref(), keys::SELECTED_DOCTOR, doctor).await
    }
}
