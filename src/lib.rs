//! # keylight_rs
//!
//! An async Rust library and command line tool for finding and controlling
//! Elgato Key Lights on the local network.
//!
//! Lights are either addressed explicitly (`host` or `host:port`, port 9123
//! by default) or found through multicast DNS. Every operation runs under a
//! [`Context`] that carries the invocation deadline and cancellation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use keylight_rs::{Context, ControlField, Fleet, MdnsDiscovery, PowerMode, resolve_devices};
//!
//! # async fn control() -> Result<(), keylight_rs::Error> {
//! let ctx = Context::new().with_timeout(Duration::from_secs(10));
//!
//! // No explicit addresses: discover lights via mDNS
//! let devices = resolve_devices::<_, &str>(&ctx, &[], MdnsDiscovery::new()).await?;
//! let fleet = Fleet::new(devices);
//!
//! fleet.set_power(&ctx, PowerMode::On).await?;
//! fleet.adjust_field(&ctx, ControlField::Brightness, ControlField::STEP).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Discovery**: Collect advertised lights with [`discover`], which stops
//!   after one [`IDLE_WINDOW`] of silence or when the deadline passes
//! - **Power**: Turn lights on, off or flip them with [`PowerMode`]
//! - **Brightness and Temperature**: Step, read or set either [`ControlField`]
//! - **Status**: Dump accessory info, settings and light state with
//!   [`Fleet::status`] and [`render_status`]
//! - **Testing**: Deterministic in-memory lights and discovery in [`memory`]
//!
//! ## Communication
//!
//! Lights expose a small JSON API over HTTP under `/elgato/`. Discovery
//! listens for `_elg._tcp` mDNS advertisements. Nothing is retried: every
//! failure surfaces as an [`Error`] and ends the current operation.

mod config;
mod context;
mod device;
mod discovery;
mod errors;
mod fleet;
mod light;
mod mdns;
pub mod memory;
mod resolver;
mod status;
mod types;

// Re-export public API
pub use config::Config;
pub use context::{Cancellation, Context};
pub use device::{Device, DeviceAddress};
pub use discovery::{DiscoveryTransport, IDLE_WINDOW, discover};
pub use errors::Error;
pub use fleet::Fleet;
pub use light::KeyLight;
pub use mdns::MdnsDiscovery;
pub use resolver::resolve_devices;
pub use status::{DeviceInfo, DeviceSettings, DeviceStatus, Light, LightGroup, render_status};
pub use types::{ControlField, Power, PowerMode};
