use serde::{Deserialize, Serialize};

/// Assignment target for one of the amp's two front-panel knobs.
///
/// The wire index (0..=11) is part of the device contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnobTarget {
    #[default]
    NotAssigned,
    TremoloRate,
    TremoloDepth,
    DistortionGain,
    DistortionMix,
    FlangerRate,
    FlangerRange,
    FlangerColor,
    EchoDelay,
    EchoFeedback,
    ReverbShimmer,
    ReverbDepth,
}

impl KnobTarget {
    pub const ALL: [KnobTarget; 12] = [
        KnobTarget::NotAssigned,
        KnobTarget::TremoloRate,
        KnobTarget::TremoloDepth,
        KnobTarget::DistortionGain,
        KnobTarget::DistortionMix,
        KnobTarget::FlangerRate,
        KnobTarget::FlangerRange,
        KnobTarget::FlangerColor,
        KnobTarget::EchoDelay,
        KnobTarget::EchoFeedback,
        KnobTarget::ReverbShimmer,
        KnobTarget::ReverbDepth,
    ];

    /// Build from a wire index. `None` outside 0..=11.
    pub fn from_index(index: u8) -> Option<KnobTarget> {
        KnobTarget::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        match self {
            KnobTarget::NotAssigned => 0,
            KnobTarget::TremoloRate => 1,
            KnobTarget::TremoloDepth => 2,
            KnobTarget::DistortionGain => 3,
            KnobTarget::DistortionMix => 4,
            KnobTarget::FlangerRate => 5,
            KnobTarget::FlangerRange => 6,
            KnobTarget::FlangerColor => 7,
            KnobTarget::EchoDelay => 8,
            KnobTarget::EchoFeedback => 9,
            KnobTarget::ReverbShimmer => 10,
            KnobTarget::ReverbDepth => 11,
        }
    }

    /// Selector label as the amp's panel shows it.
    pub fn label(self) -> &'static str {
        match self {
            KnobTarget::NotAssigned => "NA: (Not Assigned)",
            KnobTarget::TremoloRate => "Tremolo: Rate",
            KnobTarget::TremoloDepth => "Tremolo: Depth",
            KnobTarget::DistortionGain => "Distortion: Gain",
            KnobTarget::DistortionMix => "Distortion: Mix",
            KnobTarget::FlangerRate => "Flanger: Rate",
            KnobTarget::FlangerRange => "Flanger: Range",
            KnobTarget::FlangerColor => "Flanger: Color",
            KnobTarget::EchoDelay => "Echo: Delay",
            KnobTarget::EchoFeedback => "Echo: Feedback",
            KnobTarget::ReverbShimmer => "Reverb: Shimmer",
            KnobTarget::ReverbDepth => "Reverb: Depth",
        }
    }
}
