//! Creator settings: capacity, daily digest and voice profile.
//!
//! All validation runs synchronously before anything is written.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryKind;
use crate::clock::ClockRef;
use crate::error::{ParleyError, Result};
use crate::store::{get_typed, paths, set_typed};
use crate::traits::DocumentStoreRef;

pub const MIN_DAILY_LIMIT: u32 = 1;
pub const MAX_DAILY_LIMIT: u32 = 100;

/// Parse a 24h `HH:MM` time such as `"09:30"`.
pub fn parse_schedule_time(value: &str) -> Result<NaiveTime> {
    let invalid = || ParleyError::validation(format!("invalid schedule time '{}', expected HH:MM", value));
    let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }
    let h: u32 = hours.parse().map_err(|_| invalid())?;
    let m: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(h, m, 0).ok_or_else(invalid)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacitySettings {
    /// Personal replies per day before the boundary message kicks in
    pub daily_limit: u32,
    pub boundary_template: BoundaryKind,
}

impl Default for CapacitySettings {
    fn default() -> Self {
        Self {
            daily_limit: 50,
            boundary_template: BoundaryKind::CapacityReached,
        }
    }
}

impl CapacitySettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DAILY_LIMIT..=MAX_DAILY_LIMIT).contains(&self.daily_limit) {
            return Err(ParleyError::validation(format!(
                "daily limit must be between {} and {}, got {}",
                MIN_DAILY_LIMIT, MAX_DAILY_LIMIT, self.daily_limit
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestSettings {
    pub enabled: bool,
    /// `HH:MM`
    pub send_at: String,
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            send_at: "09:00".to_string(),
        }
    }
}

impl DigestSettings {
    pub fn validate(&self) -> Result<()> {
        parse_schedule_time(&self.send_at).map(|_| ())
    }

    pub fn send_time(&self) -> Result<NaiveTime> {
        parse_schedule_time(&self.send_at)
    }
}

/// Learned writing style, used by voice matching and smart replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    pub user_id: String,
    #[serde(default)]
    pub tone: Option<String>,
    /// 0 = casual, 1 = formal
    pub formality: f64,
    #[serde(default)]
    pub common_phrases: Vec<String>,
    pub sample_count: i64,
    pub updated_at: DateTime<Utc>,
}

impl VoiceProfile {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(ParleyError::validation("voice profile needs a user id"));
        }
        if self.sample_count < 0 {
            return Err(ParleyError::validation(format!(
                "sample count must not be negative, got {}",
                self.sample_count
            )));
        }
        if !(0.0..=1.0).contains(&self.formality) {
            return Err(ParleyError::validation(format!(
                "formality must be within [0, 1], got {}",
                self.formality
            )));
        }
        Ok(())
    }
}

/// `voice_profiles/{uid}`
pub struct VoiceProfileStore {
    store: DocumentStoreRef,
    clock: ClockRef,
}

impl VoiceProfileStore {
    pub fn new(store: DocumentStoreRef, clock: ClockRef) -> Self {
        Self { store, clock }
    }

    /// Validate, stamp `updatedAt` and replace the stored profile.
    pub async fn save(&self, mut profile: VoiceProfile) -> Result<VoiceProfile> {
        profile.validate()?;
        profile.updated_at = self.clock.now();
        set_typed(self.store.as_ref(), &paths::voice_profile(&profile.user_id), &profile).await?;
        Ok(profile)
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<VoiceProfile>> {
        get_typed(self.store.as_ref(), &paths::voice_profile(user_id)).await
    }
}
