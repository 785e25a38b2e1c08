//! Per-variable safety classification.
//!
//! Each process variable classifies independently against fixed
//! thresholds, every tick, from the current value alone. An unavailable
//! or non-finite reading classifies as `Emergency` (fail closed).
//!
//! | Variable          | Emergency | WarningHigh | WarningLow |
//! |-------------------|-----------|-------------|------------|
//! | Pressure [kPa]    | >= 460    | >= 380      | <= 250     |
//! | Temperature [°C]  | >= 190    | >= 170      | <= 120     |

use vapor_common::consts::{
    PRESSURE_EMERGENCY_KPA, PRESSURE_WARN_HIGH_KPA, PRESSURE_WARN_LOW_KPA,
    TEMPERATURE_EMERGENCY_C, TEMPERATURE_WARN_HIGH_C, TEMPERATURE_WARN_LOW_C,
};
use vapor_common::prelude::*;

/// Classify a pressure reading [kPa].
pub fn classify_pressure(reading: Option<f64>) -> SafetyLevel {
    let Some(value) = reading else {
        return SafetyLevel::Emergency;
    };
    if !value.is_finite() || value >= PRESSURE_EMERGENCY_KPA {
        SafetyLevel::Emergency
    } else if value >= PRESSURE_WARN_HIGH_KPA {
        SafetyLevel::WarningHigh
    } else if value <= PRESSURE_WARN_LOW_KPA {
        SafetyLevel::WarningLow
    } else {
        SafetyLevel::Normal
    }
}

/// Classify a temperature reading [°C].
pub fn classify_temperature(reading: Option<f64>) -> SafetyLevel {
    let Some(value) = reading else {
        return SafetyLevel::Emergency;
    };
    if !value.is_finite() || value >= TEMPERATURE_EMERGENCY_C {
        SafetyLevel::Emergency
    } else if value >= TEMPERATURE_WARN_HIGH_C {
        SafetyLevel::WarningHigh
    } else if value <= TEMPERATURE_WARN_LOW_C {
        SafetyLevel::WarningLow
    } else {
        SafetyLevel::Normal
    }
}

/// Both variables' levels for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyAssessment {
    pub pressure: SafetyLevel,
    pub temperature: SafetyLevel,
}

impl SafetyAssessment {
    /// Classify one tick's sampled measurements.
    pub fn assess(measurements: &Measurements) -> Self {
        Self {
            pressure: classify_pressure(measurements.pressure_kpa),
            temperature: classify_temperature(measurements.temperature_c),
        }
    }

    /// The more severe of the two levels.
    pub const fn worst(&self) -> SafetyLevel {
        self.pressure.worst(self.temperature)
    }

    pub const fn any_emergency(&self) -> bool {
        self.pressure.is_emergency() || self.temperature.is_emergency()
    }

    pub const fn any_warning(&self) -> bool {
        self.pressure.is_warning() || self.temperature.is_warning()
    }
}

impl Default for SafetyAssessment {
    fn default() -> Self {
        Self {
            pressure: SafetyLevel::Normal,
            temperature: SafetyLevel::Normal,
        }
    }
}
