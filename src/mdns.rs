//! Multicast DNS advertisement listener for Key Lights.

use std::future::Future;
use std::net::IpAddr;

use log::{debug, warn};
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use reqwest::Client;
use tokio::sync::mpsc;

use crate::context::Context;
use crate::device::DeviceAddress;
use crate::discovery::DiscoveryTransport;
use crate::errors::Error;
use crate::light::KeyLight;

type Result<T> = std::result::Result<T, Error>;

/// Browses the local network for `_elg._tcp` services.
///
/// Every resolved service becomes a [`KeyLight`] sharing one HTTP client.
/// The mDNS daemon is started inside [`run`](DiscoveryTransport::run), so a
/// socket that cannot be bound is reported as a transport failure rather
/// than at construction time.
#[derive(Debug, Clone)]
pub struct MdnsDiscovery {
    service_type: String,
    client: Client,
}

impl MdnsDiscovery {
    pub const SERVICE_TYPE: &'static str = "_elg._tcp.local.";

    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Lights found by this transport will share `client`.
    pub fn with_client(client: Client) -> Self {
        MdnsDiscovery {
            service_type: String::from(Self::SERVICE_TYPE),
            client,
        }
    }
}

impl Default for MdnsDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryTransport for MdnsDiscovery {
    type Device = KeyLight;

    fn run(
        self,
        ctx: Context,
        results: mpsc::Sender<KeyLight>,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        async move {
            let daemon = ServiceDaemon::new().map_err(Error::discovery)?;
            let outcome = browse(&daemon, &self, &ctx, &results).await;

            if let Err(e) = daemon.stop_browse(&self.service_type) {
                debug!("Failed to stop browsing {}: {}", self.service_type, e);
            }
            if let Err(e) = daemon.shutdown() {
                debug!("Failed to shut down mDNS daemon: {}", e);
            }
            outcome
        }
    }
}

async fn browse(
    daemon: &ServiceDaemon,
    transport: &MdnsDiscovery,
    ctx: &Context,
    results: &mpsc::Sender<KeyLight>,
) -> Result<()> {
    let receiver = daemon
        .browse(&transport.service_type)
        .map_err(Error::discovery)?;
    debug!("Browsing for {}", transport.service_type);

    loop {
        let event = tokio::select! {
            biased;
            _ = ctx.done() => return Ok(()),
            event = receiver.recv_async() => event.map_err(Error::discovery)?,
        };

        match event {
            ServiceEvent::ServiceResolved(info) => {
                let Some(address) = service_address(&info) else {
                    warn!("Ignoring {} with no usable address", info.get_fullname());
                    continue;
                };
                let name = instance_name(info.get_fullname(), &transport.service_type);
                debug!("Resolved {} at {}", name, address);

                let light = KeyLight::with_client(address, Some(name), transport.client.clone());
                if results.send(light).await.is_err() {
                    return Ok(());
                }
            }
            other => debug!("Ignoring mDNS event {:?}", other),
        }
    }
}

/// Pick the address to reach a resolved service at.
///
/// IPv4 is preferred over IPv6, lowest first; without any address the
/// advertised host name is used instead.
fn service_address(info: &ServiceInfo) -> Option<DeviceAddress> {
    pick_address(
        info.get_addresses().iter().copied(),
        info.get_hostname(),
        info.get_port(),
    )
}

fn pick_address(
    addresses: impl IntoIterator<Item = IpAddr>,
    hostname: &str,
    port: u16,
) -> Option<DeviceAddress> {
    if port == 0 {
        return None;
    }

    let mut addresses: Vec<IpAddr> = addresses.into_iter().collect();
    addresses.sort_by_key(|ip| (ip.is_ipv6(), *ip));
    if let Some(ip) = addresses.first() {
        return Some(DeviceAddress::new(&ip.to_string(), port));
    }

    let hostname = hostname.trim_end_matches('.');
    if hostname.is_empty() {
        return None;
    }
    Some(DeviceAddress::new(hostname, port))
}

/// `Elgato Key Light 1A2B._elg._tcp.local.` -> `Elgato Key Light 1A2B`
fn instance_name<'a>(fullname: &'a str, service_type: &str) -> &'a str {
    fullname
        .strip_suffix(service_type)
        .and_then(|name| name.strip_suffix('.'))
        .unwrap_or(fullname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_prefers_lowest_ipv4() {
        let addresses = [
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5)),
        ];
        let address = pick_address(addresses, "keylight.local.", 9123).unwrap();
        assert_eq!(address, DeviceAddress::new("192.168.1.5", 9123));
    }

    #[test]
    fn test_ipv6_only() {
        let address = pick_address([IpAddr::V6(Ipv6Addr::LOCALHOST)], "", 9123).unwrap();
        assert_eq!(address.to_string(), "[::1]:9123");
    }

    #[test]
    fn test_falls_back_to_hostname() {
        let address = pick_address(Vec::new(), "elgato-key-light.local.", 9123).unwrap();
        assert_eq!(address, DeviceAddress::new("elgato-key-light.local", 9123));
    }

    #[test]
    fn test_unusable_service() {
        assert!(pick_address(Vec::new(), "", 9123).is_none());
        assert!(pick_address([IpAddr::V4(Ipv4Addr::LOCALHOST)], "host.", 0).is_none());
    }

    #[test]
    fn test_instance_name() {
        assert_eq!(
            instance_name(
                "Elgato Key Light 1A2B._elg._tcp.local.",
                MdnsDiscovery::SERVICE_TYPE
            ),
            "Elgato Key Light 1A2B"
        );
        assert_eq!(
            instance_name("odd.name", MdnsDiscovery::SERVICE_TYPE),
            "odd.name"
        );
    }
}
