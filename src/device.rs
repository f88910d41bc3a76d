//! Device identity and the remote operations every light backend provides.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::errors::Error;
use crate::status::{DeviceInfo, DeviceSettings, LightGroup};

type Result<T> = std::result::Result<T, Error>;

/// Network address of a light: a host name or IP plus a TCP port.
///
/// Parsing accepts `host`, `host:port`, `[v6]` and `[v6]:port`. When the port is
/// missing the Key Light default [`DeviceAddress::DEFAULT_PORT`] is used.
///
/// # Examples
///
/// ```
/// use keylight_rs::DeviceAddress;
///
/// let addr: DeviceAddress = "192.168.1.1:9123".parse().unwrap();
/// assert_eq!(addr.host(), "192.168.1.1");
/// assert_eq!(addr.port(), 9123);
///
/// let addr: DeviceAddress = "keylight.local".parse().unwrap();
/// assert_eq!(addr.port(), DeviceAddress::DEFAULT_PORT);
///
/// assert!("192.168.1.1:70000".parse::<DeviceAddress>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceAddress {
    host: String,
    port: u16,
}

impl DeviceAddress {
    pub const DEFAULT_PORT: u16 = 9123;

    pub fn new(host: &str, port: u16) -> Self {
        DeviceAddress {
            host: String::from(host),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for DeviceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = split_host_port(s).unwrap_or((s, None));
        if host.is_empty() {
            return Err(Error::InvalidAddress(s.to_string()));
        }

        let port = match port {
            Some(port) => parse_port(port)?,
            None => Self::DEFAULT_PORT,
        };

        Ok(DeviceAddress::new(host, port))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Split `host:port` / `[host]:port`. A bracketed host without a port
/// comes back unbracketed with no port.
///
/// Returns `None` when the input is not in that shape (no port, or a bare
/// IPv6 literal); the caller then treats the whole input as the host.
fn split_host_port(s: &str) -> Option<(&str, Option<&str>)> {
    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        if tail.is_empty() {
            return Some((host, None));
        }
        let port = tail.strip_prefix(':')?;
        return Some((host, Some(port)));
    }

    let (host, port) = s.rsplit_once(':')?;
    if host.contains(':') {
        return None;
    }
    Some((host, Some(port)))
}

fn parse_port(port: &str) -> Result<u16> {
    port.parse::<i64>()
        .ok()
        .filter(|p| (1..=i64::from(u16::MAX)).contains(p))
        .and_then(|p| u16::try_from(p).ok())
        .ok_or_else(|| Error::invalid_port(port))
}

/// A controllable light endpoint.
///
/// Implemented by [`crate::KeyLight`] for real hardware over HTTP and by
/// [`crate::memory::MemoryDevice`] for an in-memory double. Every remote
/// operation is a single round-trip bounded by `ctx`.
pub trait Device: Send + Sync {
    /// The address this device was resolved or discovered at.
    fn address(&self) -> &DeviceAddress;

    /// The advertised instance name, when the device came from discovery.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Fetch static accessory information.
    fn fetch_device_info(&self, ctx: &Context) -> impl Future<Output = Result<DeviceInfo>> + Send;

    /// Fetch power-on and transition settings.
    fn fetch_settings(&self, ctx: &Context)
    -> impl Future<Output = Result<DeviceSettings>> + Send;

    /// Fetch the current state of every light behind this device.
    fn fetch_light_group(&self, ctx: &Context) -> impl Future<Output = Result<LightGroup>> + Send;

    /// Replace the state of every light behind this device.
    ///
    /// Returns the state the device reports after the update.
    fn update_light_group(
        &self,
        ctx: &Context,
        group: &LightGroup,
    ) -> impl Future<Output = Result<LightGroup>> + Send;
}
