//! State enums for the control core.
//!
//! Leaf enums use `#[repr(u8)]` for compact layout and stable wire
//! representation. `SystemMode` is the top-level discriminated state:
//! exactly one value holds at any tick, so mutually exclusive modes
//! cannot be represented simultaneously by construction.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

// ─── Operating Mode ─────────────────────────────────────────────────

/// Which process variable the operator's setpoint currently targets.
///
/// Selectable only while `SystemMode` is `Normal`; remembered across
/// Recovery/Preheat/ESD episodes and restored on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperatingMode {
    /// Rotary adjusts the pressure setpoint.
    Pressure = 0,
    /// Rotary adjusts the temperature setpoint.
    Temperature = 1,
}

impl OperatingMode {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Pressure),
            1 => Some(Self::Temperature),
            _ => None,
        }
    }

    /// The other mode — one toggle edge flips between the two.
    #[inline]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Pressure => Self::Temperature,
            Self::Temperature => Self::Pressure,
        }
    }

    /// Serial-record label (`M` field vocabulary).
    #[inline]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pressure => "PRESION",
            Self::Temperature => "TEMPERATURA",
        }
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::Pressure
    }
}

// ─── ESD Phase ──────────────────────────────────────────────────────

/// Emergency Shutdown phase.
///
/// Advances only on explicit events: manual trigger edge, automatic
/// Emergency detection, reaching the safe target band, explicit reset
/// edge. `ReadyForReset` regresses to `Inactive` only on a reset edge,
/// never automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EsdPhase {
    /// ESD not engaged.
    Inactive = 0,
    /// Shutdown just triggered; recovery directive starts this tick.
    Active = 1,
    /// Relief/purge driving both variables toward the safe targets.
    Recovering = 2,
    /// Both variables inside the safe band; waiting for operator reset.
    ReadyForReset = 3,
}

impl EsdPhase {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Inactive),
            1 => Some(Self::Active),
            2 => Some(Self::Recovering),
            3 => Some(Self::ReadyForReset),
            _ => None,
        }
    }

    /// Returns true while the shutdown supersedes operator control.
    #[inline]
    pub const fn is_engaged(&self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

impl Default for EsdPhase {
    fn default() -> Self {
        Self::Inactive
    }
}

// ─── Safety Level ───────────────────────────────────────────────────

/// Per-variable safety classification, declared in ascending severity.
///
/// Derived purely from the current value against fixed thresholds —
/// no hidden memory. An unavailable reading classifies as `Emergency`
/// (fail closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SafetyLevel {
    /// Value inside the normal operating envelope.
    Normal = 0,
    /// Value at or below the low-warning threshold.
    WarningLow = 1,
    /// Value at or above the high-warning threshold.
    WarningHigh = 2,
    /// Value at or above the emergency threshold — automatic ESD trigger.
    Emergency = 3,
}

impl SafetyLevel {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Normal),
            1 => Some(Self::WarningLow),
            2 => Some(Self::WarningHigh),
            3 => Some(Self::Emergency),
            _ => None,
        }
    }

    /// Returns true for either warning level.
    #[inline]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::WarningLow | Self::WarningHigh)
    }

    /// Returns true at the emergency level.
    #[inline]
    pub const fn is_emergency(&self) -> bool {
        matches!(self, Self::Emergency)
    }

    /// The more severe of two levels (declaration order is severity order).
    #[inline]
    pub const fn worst(self, other: Self) -> Self {
        if self as u8 >= other as u8 { self } else { other }
    }
}

impl Default for SafetyLevel {
    fn default() -> Self {
        Self::Normal
    }
}

// ─── Flow Band ──────────────────────────────────────────────────────

/// Steam distribution flow band.
///
/// Derived each tick from process values; forced to `None` in every
/// system mode except `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FlowState {
    /// Conditions unsuitable for distribution.
    None = 0,
    /// High-volume constant-pressure band (indicator blinks).
    A = 1,
    /// Dry-steam regulated-temperature band (indicator solid).
    B = 2,
}

impl FlowState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::A),
            2 => Some(Self::B),
            _ => None,
        }
    }

    /// Returns true when a distribution band is active.
    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Serial-record label (`F` field vocabulary).
    #[inline]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::None
    }
}

// ─── System Mode ────────────────────────────────────────────────────

/// Top-level system mode — a true discriminated state.
///
/// Recovery forces the valve closed; Preheat forces the heater to
/// maximum; ESD supersedes everything and forbids flow classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemMode {
    /// Operator control active for the contained mode's setpoint.
    Normal(OperatingMode),
    /// Low-pressure recovery: valve forced to 0 %.
    Recovery,
    /// Low-temperature preheat: heater forced to 100 %.
    Preheat,
    /// Emergency shutdown with its current phase.
    Esd(EsdPhase),
}

impl SystemMode {
    /// Returns true in `Normal(_)`.
    #[inline]
    pub const fn is_normal(&self) -> bool {
        matches!(self, Self::Normal(_))
    }

    /// Returns true in any ESD phase.
    #[inline]
    pub const fn is_esd(&self) -> bool {
        matches!(self, Self::Esd(_))
    }

    /// Flow bands may only be reported in `Normal(_)`.
    #[inline]
    pub const fn allows_flow(&self) -> bool {
        self.is_normal()
    }

    /// Operator setpoint adjustment is honored only in `Normal(_)`.
    #[inline]
    pub const fn allows_setpoint_adjust(&self) -> bool {
        self.is_normal()
    }

    /// The contained operating mode, if in `Normal(_)`.
    #[inline]
    pub const fn operating_mode(&self) -> Option<OperatingMode> {
        match self {
            Self::Normal(mode) => Some(*mode),
            _ => None,
        }
    }

    /// The contained ESD phase, if in `Esd(_)`.
    #[inline]
    pub const fn esd_phase(&self) -> Option<EsdPhase> {
        match self {
            Self::Esd(phase) => Some(*phase),
            _ => None,
        }
    }
}

impl Default for SystemMode {
    fn default() -> Self {
        Self::Normal(OperatingMode::Pressure)
    }
}

// Leaf enums must stay single-byte for the wire representation.
const_assert_eq!(core::mem::size_of::<OperatingMode>(), 1);
const_assert_eq!(core::mem::size_of::<EsdPhase>(), 1);
const_assert_eq!(core::mem::size_of::<SafetyLevel>(), 1);
const_assert_eq!(core::mem::size_of::<FlowState>(), 1);
const_assert_eq!(core::mem::size_of::<SystemMode>(), 2);
