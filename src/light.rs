//! Key Light control over the device's HTTP API.

use log::debug;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::device::{Device, DeviceAddress};
use crate::errors::Error;
use crate::status::{DeviceInfo, DeviceSettings, LightGroup};

type Result<T> = std::result::Result<T, Error>;

/// A single Key Light reachable over HTTP.
///
/// Lights are addressed by host and port; the device exposes its state as
/// JSON documents under `/elgato/`. Every request is bounded by the
/// [`Context`] passed in and is never retried.
///
/// # Example
///
/// ```
/// use keylight_rs::{Device, DeviceAddress, KeyLight};
///
/// let light = KeyLight::new(DeviceAddress::new("192.168.1.100", 9123));
/// assert_eq!(light.address().to_string(), "192.168.1.100:9123");
/// assert!(light.name().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct KeyLight {
    address: DeviceAddress,
    name: Option<String>,
    client: Client,
}

impl KeyLight {
    const ACCESSORY_INFO: &'static str = "accessory-info";
    const SETTINGS: &'static str = "lights/settings";
    const LIGHTS: &'static str = "lights";

    pub fn new(address: DeviceAddress) -> Self {
        Self::with_client(address, None, Client::new())
    }

    /// Build a light sharing an existing HTTP client.
    pub fn with_client(address: DeviceAddress, name: Option<&str>, client: Client) -> Self {
        KeyLight {
            address,
            name: name.map(String::from),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}/elgato/{}", self.address, path)
    }

    async fn get<T: DeserializeOwned>(&self, ctx: &Context, path: &str) -> Result<T> {
        self.send_request(ctx, Method::GET, path, None).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_vec(body).map_err(Error::JsonDump)?;
        self.send_request(ctx, Method::PUT, path, Some(body)).await
    }

    async fn send_request<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = ctx
            .run(request.send())
            .await?
            .map_err(|e| Error::http("send", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(path, status.as_u16()));
        }

        let bytes = ctx
            .run(response.bytes())
            .await?
            .map_err(|e| Error::http("receive", e))?;

        debug!("HTTP response from {}: {} bytes", url, bytes.len());
        serde_json::from_slice(&bytes).map_err(Error::JsonLoad)
    }
}

impl From<DeviceAddress> for KeyLight {
    fn from(address: DeviceAddress) -> Self {
        KeyLight::new(address)
    }
}

impl Device for KeyLight {
    fn address(&self) -> &DeviceAddress {
        &self.address
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn fetch_device_info(&self, ctx: &Context) -> Result<DeviceInfo> {
        self.get(ctx, Self::ACCESSORY_INFO).await
    }

    async fn fetch_settings(&self, ctx: &Context) -> Result<DeviceSettings> {
        self.get(ctx, Self::SETTINGS).await
    }

    async fn fetch_light_group(&self, ctx: &Context) -> Result<LightGroup> {
        self.get(ctx, Self::LIGHTS).await
    }

    async fn update_light_group(&self, ctx: &Context, group: &LightGroup) -> Result<LightGroup> {
        self.put(ctx, Self::LIGHTS, group).await
    }
}
