//! Power state and power transitions for light control.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// On-state of a single light.
///
/// Key Lights report this as an integer; `0` is off and any other value is
/// read as on. It is always written back as `0` or `1`.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(from = "u8", into = "u8")]
#[strum(serialize_all = "lowercase")]
pub enum Power {
    #[default]
    Off,
    On,
}

impl Power {
    pub fn is_on(self) -> bool {
        matches!(self, Power::On)
    }

    /// # Examples
    ///
    /// ```
    /// use keylight_rs::Power;
    ///
    /// assert_eq!(Power::On.toggled(), Power::Off);
    /// assert_eq!(Power::Off.toggled(), Power::On);
    /// ```
    pub fn toggled(self) -> Self {
        match self {
            Power::Off => Power::On,
            Power::On => Power::Off,
        }
    }
}

impl From<u8> for Power {
    fn from(value: u8) -> Self {
        if value == 0 { Power::Off } else { Power::On }
    }
}

impl From<Power> for u8 {
    fn from(power: Power) -> Self {
        match power {
            Power::Off => 0,
            Power::On => 1,
        }
    }
}

/// Power transition requested for every light.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PowerMode {
    /// Turn the light on
    On,
    /// Turn the light off
    Off,
    /// Flip the current state
    Toggle,
}

impl PowerMode {
    /// State a light ends up in when this transition is applied to `current`.
    pub fn apply(self, current: Power) -> Power {
        match self {
            PowerMode::On => Power::On,
            PowerMode::Off => Power::Off,
            PowerMode::Toggle => current.toggled(),
        }
    }
}
