//! Bounded device discovery on top of a push-based advertisement transport.

use std::future::Future;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

use crate::context::{Cancellation, Context};
use crate::device::Device;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Silence after the last advertisement that concludes discovery.
pub const IDLE_WINDOW: Duration = Duration::from_secs(1);

const CHANNEL_CAPACITY: usize = 16;

/// A source of device advertisements.
///
/// [`run`](Self::run) is spawned as its own task. It sends every device it
/// sees on `results`, keeps going until `ctx` is cancelled, and returns an
/// error only when the transport itself fails (for example when its
/// listener cannot bind). Returning `Ok(())` early is allowed; the
/// coordinator then waits out the idle window as usual.
pub trait DiscoveryTransport: Send + 'static {
    type Device: Device + 'static;

    fn run(
        self,
        ctx: Context,
        results: mpsc::Sender<Self::Device>,
    ) -> impl Future<Output = Result<()>> + Send + 'static;
}

/// Collect the devices a transport advertises.
///
/// Devices are returned in arrival order, duplicates included. Discovery
/// finishes once [`IDLE_WINDOW`] passes without a new advertisement, so a
/// network with no devices yields an empty list after one window.
///
/// The outer context always wins over the idle timer: when its deadline
/// passes the result is [`Error::DiscoveryTimeout`], and any other
/// cancellation is returned as [`Error::Cancelled`]. A transport failure is
/// returned unchanged and discards whatever was collected. The transport is
/// cancelled before this function returns, whatever the outcome.
///
/// # Examples
///
/// ```
/// use keylight_rs::{Context, DeviceAddress, discover};
/// use keylight_rs::memory::{MemoryDevice, MemoryDiscovery};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), keylight_rs::Error> {
/// let transport = MemoryDiscovery::new(vec![MemoryDevice::new(DeviceAddress::new("1.2.3.4", 9123))]);
/// let devices = discover(&Context::new(), transport).await?;
/// assert_eq!(devices.len(), 1);
/// # Ok(())
/// # }
/// ```
pub async fn discover<T: DiscoveryTransport>(ctx: &Context, transport: T) -> Result<Vec<T::Device>> {
    let session = ctx.child();
    let _stop_transport = session.drop_guard();

    let (sender, mut receiver) = mpsc::channel(CHANNEL_CAPACITY);
    let mut transport_task = tokio::spawn(transport.run(session, sender));
    let mut transport_finished = false;
    let mut channel_closed = false;

    let idle = sleep(IDLE_WINDOW);
    tokio::pin!(idle);

    let mut devices = Vec::new();
    loop {
        tokio::select! {
            biased;

            reason = ctx.done() => {
                debug!("Discovery interrupted after {} device(s): {:?}", devices.len(), reason);
                return Err(match reason {
                    Cancellation::DeadlineExceeded => Error::DiscoveryTimeout,
                    Cancellation::Cancelled => Error::Cancelled,
                });
            }

            outcome = &mut transport_task, if !transport_finished => {
                transport_finished = true;
                match outcome {
                    Ok(Ok(())) => debug!("Discovery transport finished"),
                    Ok(Err(e)) => return Err(e),
                    Err(e) => return Err(Error::discovery(e)),
                }
            }

            device = receiver.recv(), if !channel_closed => match device {
                Some(device) => {
                    debug!("Discovered device at {}", device.address());
                    devices.push(device);
                    idle.as_mut().reset(Instant::now() + IDLE_WINDOW);
                }
                None => channel_closed = true,
            },

            () = &mut idle => {
                info!("Discovery complete, found {} device(s)", devices.len());
                return Ok(devices);
            }
        }
    }
}
