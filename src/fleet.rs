//! Batch operations across every resolved light.

use log::debug;

use crate::context::Context;
use crate::device::Device;
use crate::errors::Error;
use crate::status::{DeviceStatus, LightGroup};
use crate::types::{ControlField, PowerMode};

type Result<T> = std::result::Result<T, Error>;

/// The set of devices one command operates on.
///
/// Every operation fetches fresh state from each device, mutates it in
/// memory and writes it back, one device at a time in list order. There is
/// no retry and no rollback: the first failing call ends the operation, and
/// devices already updated before that point keep their new state.
///
/// # Example
///
/// ```
/// use keylight_rs::{Context, DeviceAddress, Fleet, Light, LightGroup, Power, PowerMode};
/// use keylight_rs::memory::MemoryDevice;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), keylight_rs::Error> {
/// let device = MemoryDevice::new(DeviceAddress::new("10.0.0.2", 9123))
///     .with_light_group(LightGroup::new(vec![Light::new(Power::Off, 40, 200)]));
/// let fleet = Fleet::new(vec![device.clone()]);
///
/// fleet.set_power(&Context::new(), PowerMode::Toggle).await?;
/// assert!(device.light_group().lights[0].power.is_on());
/// assert_eq!(fleet.devices().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fleet<D> {
    devices: Vec<D>,
}

impl<D: Device> Fleet<D> {
    pub fn new(devices: Vec<D>) -> Self {
        Fleet { devices }
    }

    pub fn devices(&self) -> &[D] {
        &self.devices
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Fetch the light group of every device, in device order.
    ///
    /// The returned groups are index-aligned with [`devices`](Self::devices).
    /// The first failure aborts the batch; later devices are not contacted.
    pub async fn fetch_light_groups(&self, ctx: &Context) -> Result<Vec<LightGroup>> {
        let mut groups = Vec::with_capacity(self.devices.len());
        for device in &self.devices {
            debug!("Fetching light group for {}", device.address());
            groups.push(device.fetch_light_group(ctx).await?);
        }
        Ok(groups)
    }

    /// Turn every light on, off, or flip it.
    pub async fn set_power(&self, ctx: &Context, mode: PowerMode) -> Result<()> {
        self.update_all(ctx, |device, group| {
            for light in &mut group.lights {
                light.power = mode.apply(light.power);
                debug!(
                    "Updating light at {}: {} -> {}",
                    device.address(),
                    mode,
                    light.power
                );
            }
        })
        .await
    }

    /// Write `value` to `field` on every light, without clamping.
    pub async fn set_field(&self, ctx: &Context, field: ControlField, value: i32) -> Result<()> {
        self.update_all(ctx, |device, group| {
            debug!("Setting {} to {} on {}", field, value, device.address());
            for light in &mut group.lights {
                field.write(light, value);
            }
        })
        .await
    }

    /// Read `field` from the first light found.
    ///
    /// Returns `0` when there are no devices or none of them has a light.
    pub async fn get_field(&self, ctx: &Context, field: ControlField) -> Result<i32> {
        let groups = self.fetch_light_groups(ctx).await?;
        Ok(groups
            .iter()
            .flat_map(|group| group.lights.first())
            .next()
            .map_or(0, |light| field.read(light)))
    }

    /// Step `field` by `delta` relative to the first light found, then apply
    /// the clamped result to every light on every device.
    ///
    /// Returns the value that was written.
    pub async fn adjust_field(&self, ctx: &Context, field: ControlField, delta: i32) -> Result<i32> {
        let current = self.get_field(ctx, field).await?;
        let value = ControlField::adjusted(current, delta);
        debug!("Adjusting {} from {} to {}", field, current, value);
        self.set_field(ctx, field, value).await?;
        Ok(value)
    }

    /// Fetch info, settings and light state for every device.
    ///
    /// Either every device reports or the whole call fails; nothing partial
    /// is returned.
    pub async fn status(&self, ctx: &Context) -> Result<Vec<DeviceStatus>> {
        let mut statuses = Vec::with_capacity(self.devices.len());
        for device in &self.devices {
            let address = device.address();
            debug!("Fetching device info for {}", address);
            let info = device.fetch_device_info(ctx).await?;
            debug!("Fetching device settings for {}", address);
            let settings = device.fetch_settings(ctx).await?;
            debug!("Fetching light group for {}", address);
            let light_group = device.fetch_light_group(ctx).await?;

            statuses.push(DeviceStatus {
                address: address.clone(),
                name: device.name().map(String::from),
                info,
                settings,
                light_group,
            });
        }
        Ok(statuses)
    }

    /// Fetch every group, then mutate and write back device by device.
    async fn update_all<F>(&self, ctx: &Context, mut mutate: F) -> Result<()>
    where
        F: FnMut(&D, &mut LightGroup),
    {
        let groups = self.fetch_light_groups(ctx).await?;
        for (device, mut group) in self.devices.iter().zip(groups) {
            mutate(device, &mut group);
            debug!("Updating light group for {}", device.address());
            device.update_light_group(ctx, &group).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceAddress;
    use crate::memory::{MemoryDevice, Operation};
    use crate::status::{DeviceInfo, DeviceSettings, Light};
    use crate::types::Power;
    use strum::IntoEnumIterator;

    fn device(host: &str, lights: Vec<Light>) -> MemoryDevice {
        MemoryDevice::new(DeviceAddress::new(host, 9123)).with_light_group(LightGroup::new(lights))
    }

    fn single(host: &str, power: Power, brightness: i32, temperature: i32) -> MemoryDevice {
        device(host, vec![Light::new(power, brightness, temperature)])
    }

    #[tokio::test]
    async fn test_fetch_light_groups() {
        let a = single("192.168.1.1", Power::On, 50, 3000);
        let b = device("192.168.1.2", vec![]);
        let fleet = Fleet::new(vec![a, b]);
        assert!(!fleet.is_empty());

        let groups = fleet.fetch_light_groups(&Context::new()).await.unwrap();
        assert_eq!(groups.len(), fleet.devices().len());
        assert_eq!(fleet.devices()[1].address().host(), "192.168.1.2");
        assert_eq!(groups[0].lights, [Light::new(Power::On, 50, 3000)]);
        assert!(groups[1].lights.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_at_failing_device() {
        let a = single("10.0.0.1", Power::On, 50, 100);
        let b = single("10.0.0.2", Power::On, 50, 100).fail_on(Operation::FetchLightGroup);
        let c = single("10.0.0.3", Power::On, 50, 100);
        let fleet = Fleet::new(vec![a.clone(), b.clone(), c.clone()]);

        let err = fleet.fetch_light_groups(&Context::new()).await.unwrap_err();
        assert!(matches!(err, Error::Device(_)));
        assert_eq!(a.calls(), [Operation::FetchLightGroup]);
        assert_eq!(b.calls(), [Operation::FetchLightGroup]);
        assert!(c.calls().is_empty());
    }

    #[tokio::test]
    async fn test_toggle() {
        let on = single("10.0.0.1", Power::On, 50, 100);
        let off = single("10.0.0.2", Power::Off, 50, 100);
        let fleet = Fleet::new(vec![on.clone(), off.clone()]);

        fleet.set_power(&Context::new(), PowerMode::Toggle).await.unwrap();
        assert_eq!(on.light_group().lights[0].power, Power::Off);
        assert_eq!(off.light_group().lights[0].power, Power::On);
    }

    #[tokio::test]
    async fn test_on_and_off_are_absolute() {
        for mode in [PowerMode::On, PowerMode::Off] {
            let on = single("10.0.0.1", Power::On, 50, 100);
            let off = single("10.0.0.2", Power::Off, 50, 100);
            let fleet = Fleet::new(vec![on.clone(), off.clone()]);

            fleet.set_power(&Context::new(), mode).await.unwrap();
            let expected = mode.apply(Power::Off);
            assert_eq!(on.light_group().lights[0].power, expected);
            assert_eq!(off.light_group().lights[0].power, expected);
        }
    }

    #[tokio::test]
    async fn test_power_applies_to_every_light_in_group() {
        let dev = device(
            "10.0.0.1",
            vec![Light::new(Power::On, 1, 2), Light::new(Power::Off, 3, 4)],
        );
        Fleet::new(vec![dev.clone()])
            .set_power(&Context::new(), PowerMode::Toggle)
            .await
            .unwrap();
        let lights = dev.light_group().lights;
        assert_eq!(lights[0], Light::new(Power::Off, 1, 2));
        assert_eq!(lights[1], Light::new(Power::On, 3, 4));
    }

    #[tokio::test]
    async fn test_set_is_not_clamped() {
        for field in ControlField::iter() {
            let dev = single("10.0.0.1", Power::On, 50, 50);
            let fleet = Fleet::new(vec![dev.clone()]);
            let ctx = Context::new();

            fleet.set_field(&ctx, field, 250).await.unwrap();
            assert_eq!(field.read(&dev.light_group().lights[0]), 250);

            fleet.set_field(&ctx, field, -7).await.unwrap();
            assert_eq!(field.read(&dev.light_group().lights[0]), -7);
        }
    }

    #[tokio::test]
    async fn test_step_clamps() {
        let ctx = Context::new();

        let dev = single("10.0.0.1", Power::On, 95, 5);
        let fleet = Fleet::new(vec![dev.clone()]);
        let up = fleet
            .adjust_field(&ctx, ControlField::Brightness, ControlField::STEP)
            .await
            .unwrap();
        assert_eq!(up, 100);
        let down = fleet
            .adjust_field(&ctx, ControlField::Temperature, -ControlField::STEP)
            .await
            .unwrap();
        assert_eq!(down, 0);
        assert_eq!(dev.light_group().lights[0], Light::new(Power::On, 100, 0));

        // once clamped, stepping further changes nothing
        fleet
            .adjust_field(&ctx, ControlField::Brightness, ControlField::STEP)
            .await
            .unwrap();
        fleet
            .adjust_field(&ctx, ControlField::Temperature, -ControlField::STEP)
            .await
            .unwrap();
        assert_eq!(dev.light_group().lights[0], Light::new(Power::On, 100, 0));
    }

    #[tokio::test]
    async fn test_adjust_uses_first_light_as_reference() {
        let a = single("10.0.0.1", Power::On, 30, 100);
        let b = single("10.0.0.2", Power::On, 80, 100);
        let fleet = Fleet::new(vec![a.clone(), b.clone()]);

        let value = fleet
            .adjust_field(&Context::new(), ControlField::Brightness, ControlField::STEP)
            .await
            .unwrap();
        assert_eq!(value, 40);
        assert_eq!(a.light_group().lights[0].brightness, 40);
        assert_eq!(b.light_group().lights[0].brightness, 40);
    }

    #[tokio::test]
    async fn test_get_field() {
        let empty = device("10.0.0.1", vec![]);
        let lit = single("10.0.0.2", Power::On, 42, 213);
        let fleet = Fleet::new(vec![empty, lit]);
        let ctx = Context::new();

        assert_eq!(fleet.get_field(&ctx, ControlField::Brightness).await.unwrap(), 42);
        assert_eq!(fleet.get_field(&ctx, ControlField::Temperature).await.unwrap(), 213);
    }

    #[tokio::test]
    async fn test_get_field_without_lights_is_zero() {
        let ctx = Context::new();
        let fleet: Fleet<MemoryDevice> = Fleet::new(vec![]);
        assert_eq!(fleet.get_field(&ctx, ControlField::Brightness).await.unwrap(), 0);

        let fleet = Fleet::new(vec![device("10.0.0.1", vec![])]);
        assert_eq!(fleet.get_field(&ctx, ControlField::Temperature).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_every_device_untouched() {
        let a = single("10.0.0.1", Power::On, 50, 100);
        let b = single("10.0.0.2", Power::On, 50, 100).fail_on(Operation::FetchLightGroup);
        let c = single("10.0.0.3", Power::On, 50, 100);
        let fleet = Fleet::new(vec![a.clone(), b.clone(), c.clone()]);

        assert!(fleet.set_power(&Context::new(), PowerMode::Off).await.is_err());
        for dev in [&a, &b, &c] {
            assert_eq!(dev.count(Operation::UpdateLightGroup), 0);
            assert_eq!(dev.light_group().lights[0].power, Power::On);
        }
    }

    #[tokio::test]
    async fn test_update_failure_keeps_earlier_updates() {
        let a = single("10.0.0.1", Power::On, 50, 100);
        let b = single("10.0.0.2", Power::On, 50, 100).fail_on(Operation::UpdateLightGroup);
        let c = single("10.0.0.3", Power::On, 50, 100);
        let fleet = Fleet::new(vec![a.clone(), b.clone(), c.clone()]);

        let err = fleet
            .set_field(&Context::new(), ControlField::Brightness, 10)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::Device("update-light-group failed for 10.0.0.2:9123".to_string())
        );

        // no rollback for devices already written
        assert_eq!(a.light_group().lights[0].brightness, 10);
        assert_eq!(b.light_group().lights[0].brightness, 50);
        assert_eq!(c.light_group().lights[0].brightness, 50);
        assert_eq!(c.count(Operation::UpdateLightGroup), 0);
    }

    #[tokio::test]
    async fn test_status() {
        let dev = single("192.168.1.2", Power::On, 20, 213)
            .with_name("Elgato Key Light 1A2B")
            .with_info(DeviceInfo {
                product_name: Some("Key Light".to_string()),
                ..Default::default()
            })
            .with_settings(DeviceSettings {
                power_on_brightness: Some(100),
                ..Default::default()
            });
        let fleet = Fleet::new(vec![dev.clone()]);

        let statuses = fleet.status(&Context::new()).await.unwrap();
        assert_eq!(statuses.len(), 1);
        let status = &statuses[0];
        assert_eq!(status.address, DeviceAddress::new("192.168.1.2", 9123));
        assert_eq!(status.name.as_deref(), Some("Elgato Key Light 1A2B"));
        assert_eq!(status.info.product_name.as_deref(), Some("Key Light"));
        assert_eq!(status.settings.power_on_brightness, Some(100));
        assert_eq!(status.light_group.lights[0].power, Power::On);
        assert_eq!(
            dev.calls(),
            [
                Operation::FetchDeviceInfo,
                Operation::FetchSettings,
                Operation::FetchLightGroup
            ]
        );
    }

    #[tokio::test]
    async fn test_status_failures() {
        for failing in [
            Operation::FetchDeviceInfo,
            Operation::FetchSettings,
            Operation::FetchLightGroup,
        ] {
            let good = single("192.168.1.1", Power::On, 20, 213);
            let bad = single("192.168.1.2", Power::On, 20, 213).fail_on(failing);
            let fleet = Fleet::new(vec![good, bad]);

            let err = fleet.status(&Context::new()).await.unwrap_err();
            assert!(err.to_string().contains(&failing.to_string()), "{err}");
        }
    }
}
