//! Continuously adjustable light attributes.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::status::Light;

/// One of the two adjustable attributes of a light.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ControlField {
    Brightness,
    Temperature,
}

impl ControlField {
    /// Lower bound applied after a relative adjustment.
    pub const MIN: i32 = 0;
    /// Upper bound applied after a relative adjustment.
    pub const MAX: i32 = 100;
    /// Increment used by step-up / step-down.
    pub const STEP: i32 = 10;

    pub fn read(self, light: &Light) -> i32 {
        match self {
            ControlField::Brightness => light.brightness,
            ControlField::Temperature => light.temperature,
        }
    }

    /// Write `value` as is. Absolute values are never clamped.
    pub fn write(self, light: &mut Light, value: i32) {
        match self {
            ControlField::Brightness => light.brightness = value,
            ControlField::Temperature => light.temperature = value,
        }
    }

    /// Add `delta` to `current` and clamp into `MIN..=MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use keylight_rs::ControlField;
    ///
    /// assert_eq!(ControlField::adjusted(95, ControlField::STEP), 100);
    /// assert_eq!(ControlField::adjusted(5, -ControlField::STEP), 0);
    /// assert_eq!(ControlField::adjusted(40, ControlField::STEP), 50);
    /// ```
    pub fn adjusted(current: i32, delta: i32) -> i32 {
        current.saturating_add(delta).clamp(Self::MIN, Self::MAX)
    }
}
