//! Channel resolution and unit normalisation.
//!
//! Maps the four logical roles (C3, C4, EOG-left, EOG-right) onto physical
//! EDF signals by case-insensitive label match, and derives the multiplier
//! that brings each channel's physical unit to microvolts.
use std::fmt;

use crate::edf::SignalMeta;
use crate::error::ConvertError;

/// The four logical channel roles a conversion needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    C3,
    C4,
    /// Left electrooculogram.
    El,
    /// Right electrooculogram.
    Er,
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::C3 => "C3",
            Self::C4 => "C4",
            Self::El => "EOG-l",
            Self::Er => "EOG-r",
        };
        f.write_str(s)
    }
}

/// User-supplied label for each role.
#[derive(Debug, Clone)]
pub struct ChannelSelection {
    pub c3: String,
    pub c4: String,
    pub el: String,
    pub er: String,
}

impl ChannelSelection {
    pub fn new(
        c3: impl Into<String>,
        c4: impl Into<String>,
        el: impl Into<String>,
        er: impl Into<String>,
    ) -> Self {
        Self {
            c3: c3.into(),
            c4: c4.into(),
            el: el.into(),
            er: er.into(),
        }
    }
}

/// Physical unit of an EDF signal, restricted to the voltages CFS accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalUnit {
    Nanovolt,
    Microvolt,
    Millivolt,
    Volt,
}

impl PhysicalUnit {
    /// Parse a physical-dimension string by prefix: `nV`, `uV`, `mV`, or the
    /// bare `V` fallback. Anything else is unsupported.
    pub fn parse(unit: &str) -> Option<Self> {
        if unit.starts_with("nV") {
            Some(Self::Nanovolt)
        } else if unit.starts_with("uV") {
            Some(Self::Microvolt)
        } else if unit.starts_with("mV") {
            Some(Self::Millivolt)
        } else if unit.starts_with('V') {
            Some(Self::Volt)
        } else {
            None
        }
    }

    /// Multiplier taking this unit to microvolts.
    pub fn to_microvolts(self) -> f64 {
        match self {
            Self::Nanovolt => 0.001,
            Self::Microvolt => 1.0,
            Self::Millivolt => 1000.0,
            Self::Volt => 1_000_000.0,
        }
    }
}

/// One resolved role: which signal it is and how to scale it to µV.
#[derive(Debug, Clone)]
pub struct ResolvedChannel {
    pub role: ChannelRole,
    /// Index into the EDF signal list.
    pub signal: usize,
    /// Nominal sampling rate in Hz.
    pub sample_rate: f64,
    /// Multiplier to microvolts.
    pub scale: f64,
}

/// All four roles resolved against one EDF.
#[derive(Debug, Clone)]
pub struct ResolvedChannels {
    pub c3: ResolvedChannel,
    pub c4: ResolvedChannel,
    pub el: ResolvedChannel,
    pub er: ResolvedChannel,
}

/// Resolve the four requested labels against `signals`.
///
/// Matching is an exact, case-insensitive comparison of the trimmed labels;
/// the first match in signal-index order wins. Fails with `LabelNotFound`
/// for an absent label, `UnsupportedUnit` for a unit outside
/// {nV, uV, mV, V}, and `ChannelRateMismatch` when C3 and C4 disagree on
/// their integer nominal rate.
pub fn resolve_channels(
    selection: &ChannelSelection,
    signals: &[SignalMeta],
) -> Result<ResolvedChannels, ConvertError> {
    let c3 = resolve_one(ChannelRole::C3, &selection.c3, signals)?;
    let c4 = resolve_one(ChannelRole::C4, &selection.c4, signals)?;
    let el = resolve_one(ChannelRole::El, &selection.el, signals)?;
    let er = resolve_one(ChannelRole::Er, &selection.er, signals)?;

    if c3.sample_rate as i64 != c4.sample_rate as i64 {
        return Err(ConvertError::ChannelRateMismatch {
            c3: c3.sample_rate as i64,
            c4: c4.sample_rate as i64,
        });
    }

    Ok(ResolvedChannels { c3, c4, el, er })
}

fn resolve_one(
    role: ChannelRole,
    label: &str,
    signals: &[SignalMeta],
) -> Result<ResolvedChannel, ConvertError> {
    let wanted = label.to_lowercase();
    let sig = signals
        .iter()
        .find(|s| s.label.to_lowercase() == wanted)
        .ok_or(ConvertError::LabelNotFound(role))?;

    let unit =
        PhysicalUnit::parse(&sig.physical_dimension).ok_or_else(|| ConvertError::UnsupportedUnit {
            role,
            unit: sig.physical_dimension.clone(),
        })?;

    Ok(ResolvedChannel {
        role,
        signal: sig.index,
        sample_rate: sig.sample_rate(),
        scale: unit.to_microvolts(),
    })
}
