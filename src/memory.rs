//! In-memory lights and discovery.
//!
//! [`MemoryDevice`] and [`MemoryDiscovery`] implement the same traits as the
//! network backends but keep all state in process. They are deterministic,
//! which makes them suitable for tests and dry runs: every remote call is
//! recorded and any operation can be scripted to fail.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use strum_macros::Display;
use tokio::sync::mpsc;

use crate::context::Context;
use crate::device::{Device, DeviceAddress};
use crate::discovery::DiscoveryTransport;
use crate::errors::Error;
use crate::status::{DeviceInfo, DeviceSettings, LightGroup};

type Result<T> = std::result::Result<T, Error>;

/// A remote operation of a [`Device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Operation {
    FetchDeviceInfo,
    FetchSettings,
    FetchLightGroup,
    UpdateLightGroup,
}

#[derive(Debug, Default)]
struct MemoryState {
    info: DeviceInfo,
    settings: DeviceSettings,
    light_group: LightGroup,
    failing: Vec<Operation>,
    calls: Vec<Operation>,
}

/// A light whose state lives in memory.
///
/// Clones share state, so a test can keep one handle and inspect what the
/// code under test did through another.
///
/// # Example
///
/// ```
/// use keylight_rs::{DeviceAddress, Light, LightGroup, Power};
/// use keylight_rs::memory::{MemoryDevice, Operation};
///
/// let device = MemoryDevice::new(DeviceAddress::new("10.0.0.2", 9123))
///     .with_light_group(LightGroup::new(vec![Light::new(Power::On, 50, 200)]))
///     .fail_on(Operation::UpdateLightGroup);
/// assert_eq!(device.light_group().lights.len(), 1);
/// assert!(device.calls().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDevice {
    address: DeviceAddress,
    name: Option<String>,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDevice {
    pub fn new(address: DeviceAddress) -> Self {
        MemoryDevice {
            address,
            name: None,
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(String::from(name));
        self
    }

    pub fn with_info(self, info: DeviceInfo) -> Self {
        self.state().info = info;
        self
    }

    pub fn with_settings(self, settings: DeviceSettings) -> Self {
        self.state().settings = settings;
        self
    }

    pub fn with_light_group(self, group: LightGroup) -> Self {
        self.state().light_group = group;
        self
    }

    /// Make every call of `operation` fail with [`Error::Device`].
    pub fn fail_on(self, operation: Operation) -> Self {
        self.state().failing.push(operation);
        self
    }

    /// Current light group as last written.
    pub fn light_group(&self) -> LightGroup {
        self.state().light_group.clone()
    }

    /// Every remote operation invoked so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.state().calls.clone()
    }

    /// Number of successful and failed calls of `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        self.state().calls.iter().filter(|op| **op == operation).count()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn call<T>(
        &self,
        ctx: &Context,
        operation: Operation,
        f: impl FnOnce(&mut MemoryState) -> T,
    ) -> Result<T> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        let mut state = self.state();
        state.calls.push(operation);
        if state.failing.contains(&operation) {
            return Err(Error::Device(format!("{} failed for {}", operation, self.address)));
        }
        Ok(f(&mut state))
    }
}

impl From<DeviceAddress> for MemoryDevice {
    fn from(address: DeviceAddress) -> Self {
        MemoryDevice::new(address)
    }
}

impl Device for MemoryDevice {
    fn address(&self) -> &DeviceAddress {
        &self.address
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn fetch_device_info(&self, ctx: &Context) -> Result<DeviceInfo> {
        self.call(ctx, Operation::FetchDeviceInfo, |s| s.info.clone())
    }

    async fn fetch_settings(&self, ctx: &Context) -> Result<DeviceSettings> {
        self.call(ctx, Operation::FetchSettings, |s| s.settings.clone())
    }

    async fn fetch_light_group(&self, ctx: &Context) -> Result<LightGroup> {
        self.call(ctx, Operation::FetchLightGroup, |s| s.light_group.clone())
    }

    async fn update_light_group(&self, ctx: &Context, group: &LightGroup) -> Result<LightGroup> {
        self.call(ctx, Operation::UpdateLightGroup, |s| {
            s.light_group = group.clone();
            s.light_group.clone()
        })
    }
}

/// A discovery transport that advertises a fixed list of devices.
///
/// Devices are sent in order, optionally spaced by an interval, after which
/// the transport idles until its context is cancelled. Clones share the
/// run counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryDiscovery {
    devices: Vec<MemoryDevice>,
    interval: Duration,
    failure: Option<String>,
    runs: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl MemoryDiscovery {
    pub fn new(devices: Vec<MemoryDevice>) -> Self {
        MemoryDiscovery {
            devices,
            ..Self::default()
        }
    }

    /// A transport whose run fails immediately with [`Error::Discovery`].
    pub fn failing(reason: &str) -> Self {
        MemoryDiscovery {
            failure: Some(String::from(reason)),
            ..Self::default()
        }
    }

    /// Wait `interval` before each advertisement.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// How many discovery sessions have been started.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// How many discovery sessions observed their cancellation and exited.
    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl DiscoveryTransport for MemoryDiscovery {
    type Device = MemoryDevice;

    fn run(
        self,
        ctx: Context,
        results: mpsc::Sender<MemoryDevice>,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        let MemoryDiscovery {
            devices,
            interval,
            failure,
            runs,
            stopped,
        } = self;

        async move {
            runs.fetch_add(1, Ordering::SeqCst);
            if let Some(reason) = failure {
                return Err(Error::Discovery(reason));
            }

            for device in devices {
                if !interval.is_zero() && ctx.run(tokio::time::sleep(interval)).await.is_err() {
                    break;
                }
                match ctx.run(results.send(device)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) | Err(_) => break,
                }
            }

            ctx.done().await;
            stopped.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Light;
    use crate::types::Power;

    fn device() -> MemoryDevice {
        MemoryDevice::new(DeviceAddress::new("10.0.0.9", 9123))
            .with_light_group(LightGroup::new(vec![Light::new(Power::Off, 10, 20)]))
    }

    #[tokio::test]
    async fn test_update_is_visible_through_clones() {
        let device = device();
        let probe = device.clone();
        let ctx = Context::new();

        let mut group = device.fetch_light_group(&ctx).await.unwrap();
        group.lights[0].power = Power::On;
        device.update_light_group(&ctx, &group).await.unwrap();

        assert_eq!(probe.light_group().lights[0].power, Power::On);
        assert_eq!(
            probe.calls(),
            [Operation::FetchLightGroup, Operation::UpdateLightGroup]
        );
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let device = device().fail_on(Operation::FetchSettings);
        let ctx = Context::new();

        assert!(device.fetch_device_info(&ctx).await.is_ok());
        let err = device.fetch_settings(&ctx).await.unwrap_err();
        assert_eq!(
            err,
            Error::Device("fetch-settings failed for 10.0.0.9:9123".to_string())
        );
        assert_eq!(device.count(Operation::FetchSettings), 1);
    }

    #[tokio::test]
    async fn test_ended_context_is_reported() {
        let device = device();
        let ctx = Context::new();
        ctx.cancel();
        assert_eq!(
            device.fetch_light_group(&ctx).await.unwrap_err(),
            Error::Cancelled
        );
        assert!(device.calls().is_empty());
    }
}
