//! Fixed-position text codec for the amp's settings protocol.
//!
//! Requests are a single HTTP-lookalike line; the reply is one record of
//! exactly [`RESPONSE_TOKENS`] whitespace-separated tokens. Field order
//! and scale factors are the wire contract (the device tolerates no
//! reordered or missing fields), so both directions read from the same
//! field table and the two orders cannot drift apart.

use std::fmt;

use ampctl_types::{decimal, AmpSettings, FootswitchMask, KnobTarget, SettingId};

/// Request the device dump its current settings. Sent once, on the first
/// successful connection after startup.
pub const FETCH_REQUEST: &str = "GET /putsets HTTP/1.1\r\n";

const UPDATE_PREFIX: &str = "GET /getsets/";
const REQUEST_TRAILER: &str = "HTTP/1.1\r\n";

/// Exact token count of a well-formed reply.
pub const RESPONSE_TOKENS: usize = 21;

/// Reply tokens before this offset are framing and carry no settings.
const SETTINGS_OFFSET: usize = 4;

/// Echo delay is stored on the device in 1/48 ms ticks.
pub const TICKS_PER_MS: f64 = 48.0;

/// One settings-bearing token on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireField {
    Footswitch(usize),
    Setting(SettingId),
    Knob(usize),
}

/// Token order of the push-update request line.
const REQUEST_FIELDS: [WireField; 17] = [
    WireField::Footswitch(0),
    WireField::Footswitch(1),
    WireField::Footswitch(2),
    WireField::Setting(SettingId::TremoloRate),
    WireField::Setting(SettingId::TremoloDepth),
    WireField::Setting(SettingId::EchoDelay),
    WireField::Setting(SettingId::EchoFeedback),
    WireField::Setting(SettingId::DistortionGain),
    WireField::Setting(SettingId::DistortionMix),
    WireField::Setting(SettingId::ReverbShimmer),
    WireField::Setting(SettingId::ReverbDepth),
    WireField::Setting(SettingId::FlangerSpeed),
    WireField::Setting(SettingId::FlangerRange),
    WireField::Setting(SettingId::FlangerColor),
    WireField::Setting(SettingId::FlangerFilterMode),
    WireField::Knob(0),
    WireField::Knob(1),
];

/// Token order of the reply, starting at [`SETTINGS_OFFSET`]. Not the
/// request order: the device interleaves the effect blocks differently
/// on the way back.
const RESPONSE_FIELDS: [WireField; 17] = [
    WireField::Footswitch(0),
    WireField::Footswitch(1),
    WireField::Footswitch(2),
    WireField::Setting(SettingId::EchoDelay),
    WireField::Setting(SettingId::TremoloRate),
    WireField::Setting(SettingId::DistortionGain),
    WireField::Setting(SettingId::EchoFeedback),
    WireField::Setting(SettingId::TremoloDepth),
    WireField::Setting(SettingId::DistortionMix),
    WireField::Setting(SettingId::ReverbShimmer),
    WireField::Setting(SettingId::ReverbDepth),
    WireField::Setting(SettingId::FlangerSpeed),
    WireField::Setting(SettingId::FlangerRange),
    WireField::Setting(SettingId::FlangerColor),
    WireField::Setting(SettingId::FlangerFilterMode),
    WireField::Knob(0),
    WireField::Knob(1),
];

/// How a setting's stored value maps to its wire token.
enum Scale {
    /// 0–100 % stored, 0.0–1.0 fraction on the wire.
    Fraction,
    /// Milliseconds stored, integer 1/48 ms ticks on the wire.
    Ticks,
    /// Sent as-is; `precision` applies when decoding.
    Direct { precision: i32 },
    /// Boolean as a literal 0/1 token.
    Flag,
}

fn scale(id: SettingId) -> Scale {
    match id {
        SettingId::TremoloDepth
        | SettingId::DistortionGain
        | SettingId::DistortionMix
        | SettingId::EchoFeedback
        | SettingId::ReverbDepth
        | SettingId::FlangerRange
        | SettingId::FlangerColor => Scale::Fraction,
        SettingId::EchoDelay => Scale::Ticks,
        SettingId::ReverbShimmer => Scale::Direct { precision: 0 },
        SettingId::TremoloRate | SettingId::FlangerSpeed => Scale::Direct { precision: -2 },
        SettingId::FlangerFilterMode => Scale::Flag,
    }
}

/// A reply could not be decoded. The settings store is never touched when
/// any variant of this is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Token count differed from [`RESPONSE_TOKENS`].
    TokenCount { found: usize },
    /// A settings token failed to parse as a number.
    Malformed { offset: usize, token: String },
    /// A decoded field fell outside its valid range.
    OutOfRange { offset: usize, field: &'static str, value: f64 },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::TokenCount { found } => {
                write!(f, "expected {} reply tokens, got {}", RESPONSE_TOKENS, found)
            }
            ProtocolError::Malformed { offset, token } => {
                write!(f, "reply token {} is not a number: {:?}", offset, token)
            }
            ProtocolError::OutOfRange { offset, field, value } => {
                write!(f, "{} out of range in reply token {}: {}", field, offset, value)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Build the push-update request line for the current settings.
pub fn update_request(settings: &AmpSettings) -> String {
    let mut line = String::from(UPDATE_PREFIX);
    for field in REQUEST_FIELDS {
        line.push(' ');
        line.push_str(&encode(field, settings));
    }
    line.push(' ');
    line.push_str(REQUEST_TRAILER);
    line
}

fn encode(field: WireField, settings: &AmpSettings) -> String {
    match field {
        WireField::Footswitch(slot) => settings.footswitches[slot].bits().to_string(),
        WireField::Knob(slot) => settings.knobs[slot].index().to_string(),
        WireField::Setting(id) => {
            let value = settings.value(id);
            match scale(id) {
                Scale::Fraction => format!("{}", value / 100.0),
                Scale::Ticks => format!("{}", (value * TICKS_PER_MS).round() as i64),
                Scale::Direct { .. } => format!("{}", value),
                Scale::Flag => format!("{}", value as u8),
            }
        }
    }
}

/// Decode a full reply into a fresh settings value.
///
/// All-or-nothing: the caller's store is only replaced after every token
/// has decoded and passed its range check.
pub fn parse_response(text: &str) -> Result<AmpSettings, ProtocolError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != RESPONSE_TOKENS {
        return Err(ProtocolError::TokenCount { found: tokens.len() });
    }

    let mut settings = AmpSettings::default();
    for (i, field) in RESPONSE_FIELDS.into_iter().enumerate() {
        let offset = SETTINGS_OFFSET + i;
        decode(field, tokens[offset], offset, &mut settings)?;
    }
    Ok(settings)
}

fn decode(
    field: WireField,
    token: &str,
    offset: usize,
    out: &mut AmpSettings,
) -> Result<(), ProtocolError> {
    match field {
        WireField::Footswitch(slot) => {
            let bits: i64 = parse_int(token, offset)?;
            let mask = u8::try_from(bits).ok().and_then(FootswitchMask::from_bits);
            out.footswitches[slot] = mask.ok_or(ProtocolError::OutOfRange {
                offset,
                field: "footswitch bitmask",
                value: bits as f64,
            })?;
        }
        WireField::Knob(slot) => {
            let index: i64 = parse_int(token, offset)?;
            let target = u8::try_from(index).ok().and_then(KnobTarget::from_index);
            out.knobs[slot] = target.ok_or(ProtocolError::OutOfRange {
                offset,
                field: "knob assignment",
                value: index as f64,
            })?;
        }
        WireField::Setting(id) => {
            let raw = parse_num(token, offset)?;
            let value = match scale(id) {
                Scale::Fraction => decimal::round(raw * 100.0, -2),
                Scale::Ticks => decimal::round(raw / TICKS_PER_MS, -2),
                Scale::Direct { precision } => decimal::round(raw, precision),
                Scale::Flag if raw == 0.0 || raw == 1.0 => raw,
                Scale::Flag => {
                    return Err(ProtocolError::OutOfRange {
                        offset,
                        field: id.key(),
                        value: raw,
                    });
                }
            };
            // The store's own edit validation doubles as the reply range
            // check; echo delay keeps its clamp-to-floor behavior.
            out.set(id, value).map_err(|_| ProtocolError::OutOfRange {
                offset,
                field: id.key(),
                value,
            })?;
        }
    }
    Ok(())
}

fn parse_int(token: &str, offset: usize) -> Result<i64, ProtocolError> {
    token.parse().map_err(|_| ProtocolError::Malformed {
        offset,
        token: token.to_string(),
    })
}

fn parse_num(token: &str, offset: usize) -> Result<f64, ProtocolError> {
    let value: f64 = token.parse().map_err(|_| ProtocolError::Malformed {
        offset,
        token: token.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ProtocolError::Malformed {
            offset,
            token: token.to_string(),
        });
    }
    Ok(value)
}
