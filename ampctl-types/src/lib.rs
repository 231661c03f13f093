//! # ampctl-types
//!
//! Shared data model for the ampctl remote control: the amp settings
//! store, footswitch and knob assignments, and the base-10 rounding
//! helpers the wire codec depends on.

pub mod decimal;
mod footswitch;
mod knob;
mod settings;

pub use footswitch::{EffectKind, FootswitchMask};
pub use knob::KnobTarget;
pub use settings::{
    AmpSettings, Distortion, Echo, Flanger, Reverb, SettingId, SettingsError, Tremolo,
};
