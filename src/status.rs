//! Light state, accessory information and the textual status dump.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::DeviceAddress;
use crate::types::Power;

/// State of one individually addressable light.
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Light {
    #[serde(rename = "on")]
    pub power: Power,
    /// Brightness percentage, nominally 0-100.
    pub brightness: i32,
    /// Colour temperature in the device's own unit.
    pub temperature: i32,
}

impl Light {
    pub fn new(power: Power, brightness: i32, temperature: i32) -> Self {
        Light {
            power,
            brightness,
            temperature,
        }
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "on={} brightness={} temperature={}",
            self.power, self.brightness, self.temperature
        )
    }
}

/// The ordered set of lights behind one device.
///
/// Mirrors the `/elgato/lights` document:
///
/// ```
/// use keylight_rs::{LightGroup, Power};
///
/// let group: LightGroup = serde_json::from_str(
///     r#"{"numberOfLights":1,"lights":[{"on":1,"brightness":20,"temperature":213}]}"#,
/// ).unwrap();
/// assert_eq!(group.lights[0].power, Power::On);
/// assert_eq!(group.lights[0].temperature, 213);
/// ```
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LightGroup {
    #[serde(default)]
    pub number_of_lights: usize,
    #[serde(default)]
    pub lights: Vec<Light>,
}

impl LightGroup {
    pub fn new(lights: Vec<Light>) -> Self {
        LightGroup {
            number_of_lights: lights.len(),
            lights,
        }
    }
}

/// Static accessory information (`/elgato/accessory-info`).
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub hardware_board_type: Option<u32>,
    #[serde(default)]
    pub firmware_build_number: Option<u32>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Power-on and transition settings (`/elgato/lights/settings`).
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSettings {
    #[serde(default)]
    pub power_on_behavior: Option<i32>,
    #[serde(default)]
    pub power_on_brightness: Option<i32>,
    #[serde(default)]
    pub power_on_temperature: Option<i32>,
    #[serde(default)]
    pub switch_on_duration_ms: Option<i32>,
    #[serde(default)]
    pub switch_off_duration_ms: Option<i32>,
    #[serde(default)]
    pub color_change_duration_ms: Option<i32>,
}

/// Everything `status` reports for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    pub address: DeviceAddress,
    pub name: Option<String>,
    pub info: DeviceInfo,
    pub settings: DeviceSettings,
    pub light_group: LightGroup,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device: {}", self.address)?;
        if let Some(name) = &self.name {
            writeln!(f, "Name: {}", name)?;
        }
        writeln!(f, "DeviceInfo: {:?}", self.info)?;
        writeln!(f, "DeviceSettings: {:?}", self.settings)?;
        write!(f, "LightGroup:")?;
        for (index, light) in self.light_group.lights.iter().enumerate() {
            write!(f, "\n  Light {}: {}", index, light)?;
        }
        Ok(())
    }
}

/// Render a status dump, one block per device separated by a blank line.
pub fn render_status(statuses: &[DeviceStatus]) -> String {
    statuses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
