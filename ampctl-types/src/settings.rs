//! The amp settings store.
//!
//! A single `AmpSettings` value is owned by the front end and passed
//! explicitly to the codec and sync session. It is replaced wholesale by
//! every successful sync; the device is the only source of truth between
//! sessions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FootswitchMask, KnobTarget};

/// Tremolo block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tremolo {
    pub rate_cps: f64,
    pub depth_pct: f64,
}

/// Distortion block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distortion {
    pub gain_pct: f64,
    pub mix_pct: f64,
}

/// Flanger block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flanger {
    pub speed_cps: f64,
    pub range_pct: f64,
    pub color_pct: f64,
    pub filter_mode: bool,
}

/// Echo block. Delay has a hard 1 ms floor; the device cannot represent 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub delay_ms: f64,
    pub feedback_pct: f64,
}

/// Reverb block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reverb {
    pub shimmer_hz: f64,
    pub depth_pct: f64,
}

/// Every amp setting, footswitch assignment, and knob assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmpSettings {
    pub tremolo: Tremolo,
    pub distortion: Distortion,
    pub flanger: Flanger,
    pub echo: Echo,
    pub reverb: Reverb,
    /// Left, middle, right footswitch.
    pub footswitches: [FootswitchMask; 3],
    /// Rate knob, depth knob.
    pub knobs: [KnobTarget; 2],
}

impl Default for AmpSettings {
    fn default() -> AmpSettings {
        AmpSettings {
            tremolo: Tremolo { rate_cps: 5.0, depth_pct: 50.0 },
            distortion: Distortion { gain_pct: 50.0, mix_pct: 50.0 },
            flanger: Flanger {
                speed_cps: 0.2,
                range_pct: 75.0,
                color_pct: 50.0,
                filter_mode: false,
            },
            echo: Echo { delay_ms: 500.0, feedback_pct: 50.0 },
            reverb: Reverb { shimmer_hz: 9000.0, depth_pct: 50.0 },
            footswitches: [FootswitchMask::empty(); 3],
            knobs: [KnobTarget::TremoloRate, KnobTarget::TremoloDepth],
        }
    }
}

/// Identifier for every scalar control on the panel.
///
/// Edits address settings through these rather than through widget
/// identity, so the front end and the store agree on one name per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingId {
    TremoloRate,
    TremoloDepth,
    DistortionGain,
    DistortionMix,
    FlangerSpeed,
    FlangerRange,
    FlangerColor,
    FlangerFilterMode,
    EchoDelay,
    EchoFeedback,
    ReverbShimmer,
    ReverbDepth,
}

impl SettingId {
    pub const ALL: [SettingId; 12] = [
        SettingId::TremoloRate,
        SettingId::TremoloDepth,
        SettingId::DistortionGain,
        SettingId::DistortionMix,
        SettingId::FlangerSpeed,
        SettingId::FlangerRange,
        SettingId::FlangerColor,
        SettingId::FlangerFilterMode,
        SettingId::EchoDelay,
        SettingId::EchoFeedback,
        SettingId::ReverbShimmer,
        SettingId::ReverbDepth,
    ];

    /// Dotted key used in command input ("tremolo.rate").
    pub fn key(self) -> &'static str {
        match self {
            SettingId::TremoloRate => "tremolo.rate",
            SettingId::TremoloDepth => "tremolo.depth",
            SettingId::DistortionGain => "distortion.gain",
            SettingId::DistortionMix => "distortion.mix",
            SettingId::FlangerSpeed => "flanger.speed",
            SettingId::FlangerRange => "flanger.range",
            SettingId::FlangerColor => "flanger.color",
            SettingId::FlangerFilterMode => "flanger.filter",
            SettingId::EchoDelay => "echo.delay",
            SettingId::EchoFeedback => "echo.feedback",
            SettingId::ReverbShimmer => "reverb.shimmer",
            SettingId::ReverbDepth => "reverb.depth",
        }
    }

    pub fn from_key(key: &str) -> Option<SettingId> {
        SettingId::ALL.into_iter().find(|id| id.key() == key)
    }

    /// Panel label ("Drive", "Shimmer", …).
    pub fn label(self) -> &'static str {
        match self {
            SettingId::TremoloRate | SettingId::FlangerSpeed => "Rate",
            SettingId::TremoloDepth | SettingId::ReverbDepth => "Depth",
            SettingId::DistortionGain => "Drive",
            SettingId::DistortionMix => "Mix",
            SettingId::FlangerRange => "Range",
            SettingId::FlangerColor => "Color",
            SettingId::FlangerFilterMode => "Filter Mode",
            SettingId::EchoDelay => "Delay",
            SettingId::EchoFeedback => "Feedback",
            SettingId::ReverbShimmer => "Shimmer",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SettingId::TremoloRate | SettingId::FlangerSpeed => "cps",
            SettingId::EchoDelay => "ms",
            SettingId::ReverbShimmer => "Hz",
            SettingId::FlangerFilterMode => "",
            _ => "%",
        }
    }

    /// Inclusive bounds of the setting's value.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            SettingId::TremoloRate => (0.0, 10.0),
            SettingId::FlangerSpeed => (0.0, 2.0),
            SettingId::FlangerFilterMode => (0.0, 1.0),
            SettingId::EchoDelay => (1.0, 1000.0),
            SettingId::EchoFeedback => (0.0, 95.0),
            SettingId::ReverbShimmer => (0.0, 20000.0),
            _ => (0.0, 100.0),
        }
    }
}

/// A locally edited value fell outside its declared bound.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    OutOfRange { id: SettingId, value: f64, min: f64, max: f64 },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::OutOfRange { id, value, min, max } => write!(
                f,
                "{} = {} is outside {}..={}",
                id.key(),
                value,
                min,
                max
            ),
        }
    }
}

impl std::error::Error for SettingsError {}

impl AmpSettings {
    /// Current value of a setting; the filter-mode flag reads as 0 or 1.
    pub fn value(&self, id: SettingId) -> f64 {
        match id {
            SettingId::TremoloRate => self.tremolo.rate_cps,
            SettingId::TremoloDepth => self.tremolo.depth_pct,
            SettingId::DistortionGain => self.distortion.gain_pct,
            SettingId::DistortionMix => self.distortion.mix_pct,
            SettingId::FlangerSpeed => self.flanger.speed_cps,
            SettingId::FlangerRange => self.flanger.range_pct,
            SettingId::FlangerColor => self.flanger.color_pct,
            SettingId::FlangerFilterMode => {
                if self.flanger.filter_mode {
                    1.0
                } else {
                    0.0
                }
            }
            SettingId::EchoDelay => self.echo.delay_ms,
            SettingId::EchoFeedback => self.echo.feedback_pct,
            SettingId::ReverbShimmer => self.reverb.shimmer_hz,
            SettingId::ReverbDepth => self.reverb.depth_pct,
        }
    }

    /// Set a single setting with range validation.
    ///
    /// Echo delay below 1 ms clamps up to the floor instead of erroring;
    /// the filter-mode flag accepts exactly 0 or 1.
    pub fn set(&mut self, id: SettingId, value: f64) -> Result<(), SettingsError> {
        let (min, max) = id.bounds();
        let err = || SettingsError::OutOfRange { id, value, min, max };

        if !value.is_finite() {
            return Err(err());
        }

        let value = match id {
            SettingId::EchoDelay if value < min => min,
            SettingId::FlangerFilterMode if value != 0.0 && value != 1.0 => {
                return Err(err());
            }
            _ if value < min || value > max => return Err(err()),
            _ => value,
        };

        match id {
            SettingId::TremoloRate => self.tremolo.rate_cps = value,
            SettingId::TremoloDepth => self.tremolo.depth_pct = value,
            SettingId::DistortionGain => self.distortion.gain_pct = value,
            SettingId::DistortionMix => self.distortion.mix_pct = value,
            SettingId::FlangerSpeed => self.flanger.speed_cps = value,
            SettingId::FlangerRange => self.flanger.range_pct = value,
            SettingId::FlangerColor => self.flanger.color_pct = value,
            SettingId::FlangerFilterMode => self.flanger.filter_mode = value == 1.0,
            SettingId::EchoDelay => self.echo.delay_ms = value,
            SettingId::EchoFeedback => self.echo.feedback_pct = value,
            SettingId::ReverbShimmer => self.reverb.shimmer_hz = value,
            SettingId::ReverbDepth => self.reverb.depth_pct = value,
        }
        Ok(())
    }

    /// Human-readable line for one setting ("Delay: 500 ms").
    pub fn display(&self, id: SettingId) -> String {
        match id {
            SettingId::FlangerFilterMode => format!(
                "{}: {}",
                id.label(),
                if self.flanger.filter_mode { "on" } else { "off" }
            ),
            _ => format!("{}: {} {}", id.label(), self.value(id), id.unit()),
        }
    }
}
