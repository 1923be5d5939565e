// keep in sync with core/urls.py of the backend
use anyhow::Result;
use common::{
    form::NewDevice,
    req::{ControlAction, Device, DeviceId, Endpoint, NewTelemetry, TelemetrySample},
};
use reqwest::{
    header::ACCEPT,
    multipart::{Form, Part},
    StatusCode,
};
use serde::de::DeserializeOwned;

use crate::config;

fn api_url(endpoint: Endpoint) -> String {
    format!("{}/{}", config::backend_url(), endpoint.path())
}

async fn get<T: DeserializeOwned>(endpoint: Endpoint) -> Result<T> {
    let client = reqwest::Client::new();

    Ok(client
        .get(api_url(endpoint))
        .header(ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json::<T>()
        .await?)
}

pub async fn streetgard_list() -> Result<Vec<Device>> {
    get(Endpoint::Devices).await
}

pub async fn streetgard_create(device: NewDevice) -> Result<Device> {
    let client = reqwest::Client::new();

    let mut form = Form::new().text("name", device.name);
    if let Some(img) = device.img {
        let part = Part::bytes(img.bytes)
            .file_name(img.file_name)
            .mime_str(&img.mime)?;
        form = form.part("img", part);
    }

    Ok(client
        .post(api_url(Endpoint::Devices))
        .header(ACCEPT, "application/json")
        .multipart(form)
        .send()
        .await?
        .error_for_status()?
        .json::<Device>()
        .await?)
}

pub async fn streetgard_data_list() -> Result<Vec<TelemetrySample>> {
    get(Endpoint::Telemetry).await
}

pub async fn streetgard_data_create(data: &NewTelemetry) -> Result<TelemetrySample> {
    let client = reqwest::Client::new();

    Ok(client
        .post(api_url(Endpoint::Telemetry))
        .header(ACCEPT, "application/json")
        .json(data)
        .send()
        .await?
        .error_for_status()?
        .json::<TelemetrySample>()
        .await?)
}

/// Newest sample of a device; a list holding at most one element.
pub async fn streetgard_data_latest(id: DeviceId) -> Result<Vec<TelemetrySample>> {
    get(Endpoint::LatestTelemetry(id)).await
}

pub async fn streetgard_data_for_device(id: DeviceId) -> Result<Vec<TelemetrySample>> {
    get(Endpoint::DeviceTelemetry(id)).await
}

/// Sends a manual command to the device.
///
/// Any HTTP reply is returned with its status; only transport failures are
/// errors. The reply body is plain text.
pub async fn device_control(api_url: &str, action: ControlAction) -> Result<(StatusCode, String)> {
    let client = reqwest::Client::new();

    let resp = client.get(action.url(api_url)).send().await?;
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Ok((status, body))
}
