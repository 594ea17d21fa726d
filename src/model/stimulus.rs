//! Stimulus device models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lowest intensity accepted by the device
pub const MIN_STIMULUS_VALUE: u8 = 1;
/// Highest intensity accepted by the device
pub const MAX_STIMULUS_VALUE: u8 = 100;

/// Stimulus delivered by the device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusKind {
    #[default]
    Beep,
    Vibe,
    Zap,
}

/// Stimulus payload sent on every delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusSettings {
    pub kind: StimulusKind,
    pub value: u8,
}

impl StimulusSettings {
    /// Build settings, clamping the intensity into the device range
    pub fn new(kind: StimulusKind, value: u32) -> Self {
        let clamped = value.clamp(MIN_STIMULUS_VALUE as u32, MAX_STIMULUS_VALUE as u32);
        if clamped != value {
            tracing::warn!(
                requested = value,
                clamped = clamped,
                "Stimulus intensity out of range, clamping"
            );
        }
        Self {
            kind,
            value: clamped as u8,
        }
    }
}

impl Default for StimulusSettings {
    fn default() -> Self {
        Self {
            kind: StimulusKind::Beep,
            value: MAX_STIMULUS_VALUE,
        }
    }
}

/// Outcome reported to the caller after a delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StimulusReceipt {
    pub success: bool,
    pub message: String,
}
