//! Turning the user's light list into devices.

use log::debug;

use crate::context::Context;
use crate::device::DeviceAddress;
use crate::discovery::{DiscoveryTransport, discover};
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Build the device list for one invocation.
///
/// Explicit addresses are parsed up front and the first invalid entry fails
/// the whole call before anything touches the network. When the list is
/// empty the lights are found with [`discover`] on `transport` instead, and
/// its outcome (including [`Error::DiscoveryTimeout`]) is returned as is.
///
/// # Examples
///
/// ```
/// use keylight_rs::{Context, Device, resolve_devices};
/// use keylight_rs::memory::MemoryDiscovery;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), keylight_rs::Error> {
/// let transport = MemoryDiscovery::default();
/// let devices = resolve_devices(&Context::new(), &["192.168.1.1", "[fe80::1]:8080"], transport).await?;
/// assert_eq!(devices[0].address().port(), 9123);
/// assert_eq!(devices[1].address().host(), "fe80::1");
/// # Ok(())
/// # }
/// ```
pub async fn resolve_devices<T, S>(ctx: &Context, lights: &[S], transport: T) -> Result<Vec<T::Device>>
where
    T: DiscoveryTransport,
    T::Device: From<DeviceAddress>,
    S: AsRef<str>,
{
    if lights.is_empty() {
        debug!("No lights provided, running discovery");
        return discover(ctx, transport).await;
    }

    lights
        .iter()
        .map(|light| {
            let address = light.as_ref().parse::<DeviceAddress>()?;
            debug!("Using light at {}", address);
            Ok(T::Device::from(address))
        })
        .collect()
}
