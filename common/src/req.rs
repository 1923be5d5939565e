// keep in sync with core/serializers.py of the backend
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type DeviceId = i64;

/// A street guard unit as listed by `/core/streetgard/`.
///
/// The `latest_*` fields are derived server-side from the newest telemetry
/// sample and are `None` for a device that never reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub latest_bulb_status: Option<bool>,
    #[serde(default)]
    pub latest_latitude: Option<f64>,
    #[serde(default)]
    pub latest_longitude: Option<f64>,
    #[serde(default)]
    pub latest_updated_time: Option<DateTime<Utc>>,
}

impl Device {
    pub fn is_active(&self) -> bool {
        self.latest_bulb_status.unwrap_or(false)
    }
}

/// One reading set reported by a device (`/core/streetgard-data/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub id: i64,
    pub streetgard: DeviceId,
    pub created_time: DateTime<Utc>,
    pub temp_dht: f64,         // °C
    pub humidity_dht: f64,     // percent
    pub temp_bmp: f64,         // °C
    pub pressure_bmp: f64,     // hPa
    pub altitude_bmp: f64,     // m
    pub relativeheight_bmp: f64, // m
    pub latitude_gsm: f64,
    pub longitude_gsm: f64,
    pub rainsensor: f64, // raw adc, 0..4095
    pub servo_state: bool,
    pub pir_state: bool,
    pub relay_state: bool,
    pub ldr_state: bool,
    pub bulb_state: bool,
    #[serde(default)]
    pub servo_position: Option<f64>, // degrees
    #[serde(default)]
    pub automated_mode: Option<bool>,
}

/// Body of `POST /core/streetgard-data/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTelemetry {
    pub streetgard: DeviceId,
    pub temp_dht: f64,
    pub humidity_dht: f64,
    pub temp_bmp: f64,
    pub pressure_bmp: f64,
    pub altitude_bmp: f64,
    pub relativeheight_bmp: f64,
    pub latitude_gsm: f64,
    pub longitude_gsm: f64,
    pub rainsensor: f64,
    pub servo_state: bool,
    pub pir_state: bool,
    pub relay_state: bool,
    pub ldr_state: bool,
    pub bulb_state: bool,
}

impl From<&TelemetrySample> for NewTelemetry {
    fn from(s: &TelemetrySample) -> Self {
        Self {
            streetgard: s.streetgard,
            temp_dht: s.temp_dht,
            humidity_dht: s.humidity_dht,
            temp_bmp: s.temp_bmp,
            pressure_bmp: s.pressure_bmp,
            altitude_bmp: s.altitude_bmp,
            relativeheight_bmp: s.relativeheight_bmp,
            latitude_gsm: s.latitude_gsm,
            longitude_gsm: s.longitude_gsm,
            rainsensor: s.rainsensor,
            servo_state: s.servo_state,
            pir_state: s.pir_state,
            relay_state: s.relay_state,
            ldr_state: s.ldr_state,
            bulb_state: s.bulb_state,
        }
    }
}

/// Backend endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Devices,
    Telemetry,
    LatestTelemetry(DeviceId),
    DeviceTelemetry(DeviceId),
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Devices => "core/streetgard/".to_owned(),
            Endpoint::Telemetry => "core/streetgard-data/".to_owned(),
            Endpoint::LatestTelemetry(id) => format!("core/streetgard-data/{id}/species-latest/"),
            Endpoint::DeviceTelemetry(id) => format!("core/streetgard-data/{id}/"),
        }
    }
}

/// Manual commands served by the device itself under its `api_url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ToggleAutomated,
    ToggleLight,
    ToggleDimmer,
}

impl ControlAction {
    pub fn command(&self) -> &'static str {
        match self {
            ControlAction::ToggleAutomated => "toggle_automated",
            ControlAction::ToggleLight => "toggle_light",
            ControlAction::ToggleDimmer => "toggle_dim",
        }
    }

    pub fn url(&self, api_url: &str) -> String {
        format!("{}/{}", api_url.trim_end_matches('/'), self.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_JSON: &str = r#"{
        "id": 7,
        "name": "Gate 7",
        "uuid": "0b9c6a8e-2f3e-4a51-9a8c-1f0d2b3c4d5e",
        "img": null,
        "created_time": "2025-03-01T10:15:00.123456Z",
        "updated_time": "2025-03-02T08:00:00Z",
        "latest_bulb_status": true,
        "latest_latitude": 12.97,
        "latest_longitude": 77.59,
        "latest_updated_time": "2025-03-02T08:00:00+05:30"
    }"#;

    #[test]
    fn parses_device_listing() {
        let dev: Device = serde_json::from_str(DEVICE_JSON).unwrap();
        assert_eq!(dev.id, 7);
        assert!(dev.is_active());
        assert_eq!(dev.api_url, None);
        assert_eq!(
            dev.latest_updated_time.unwrap().to_rfc3339(),
            "2025-03-02T02:30:00+00:00"
        );
    }

    #[test]
    fn device_without_reports_has_no_latest_fields() {
        let dev: Device = serde_json::from_str(
            r#"{"id": 3, "name": "Fresh", "latest_bulb_status": null,
                "latest_latitude": null, "latest_longitude": null,
                "latest_updated_time": null}"#,
        )
        .unwrap();
        assert!(!dev.is_active());
        assert_eq!(dev.latest_latitude, None);
    }

    #[test]
    fn parses_sample_without_firmware_extensions() {
        let sample: TelemetrySample = serde_json::from_str(
            r#"{"id": 1, "streetgard": 7, "created_time": "2025-03-02T08:00:00Z",
                "temp_dht": 27.5, "humidity_dht": 61.0, "temp_bmp": 27.1,
                "pressure_bmp": 1008.2, "altitude_bmp": 920.0, "relativeheight_bmp": 1.5,
                "latitude_gsm": 0.0, "longitude_gsm": 0.0, "rainsensor": 4095,
                "servo_state": false, "pir_state": true, "relay_state": false,
                "ldr_state": true, "bulb_state": false}"#,
        )
        .unwrap();
        assert_eq!(sample.servo_position, None);
        assert_eq!(sample.automated_mode, None);
        assert_eq!(sample.rainsensor, 4095.0);
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Devices.path(), "core/streetgard/");
        assert_eq!(
            Endpoint::LatestTelemetry(4).path(),
            "core/streetgard-data/4/species-latest/"
        );
        assert_eq!(Endpoint::DeviceTelemetry(4).path(), "core/streetgard-data/4/");
    }

    #[test]
    fn control_urls_tolerate_trailing_slash() {
        assert_eq!(
            ControlAction::ToggleDimmer.url("http://10.0.0.5/"),
            "http://10.0.0.5/toggle_dim"
        );
        assert_eq!(
            ControlAction::ToggleAutomated.url("http://10.0.0.5"),
            "http://10.0.0.5/toggle_automated"
        );
    }

    #[test]
    fn new_telemetry_body_has_no_server_fields() {
        let sample: TelemetrySample = serde_json::from_str(
            r#"{"id": 12, "streetgard": 7, "created_time": "2025-03-02T08:00:00Z",
                "temp_dht": 27.5, "humidity_dht": 61.0, "temp_bmp": 27.1,
                "pressure_bmp": 1008.2, "altitude_bmp": 920.0, "relativeheight_bmp": 1.5,
                "latitude_gsm": 12.97, "longitude_gsm": 77.59, "rainsensor": 1800,
                "servo_state": false, "pir_state": true, "relay_state": false,
                "ldr_state": true, "bulb_state": true, "automated_mode": true}"#,
        )
        .unwrap();

        let body = serde_json::to_value(NewTelemetry::from(&sample)).unwrap();
        let obj = body.as_object().unwrap();
        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("created_time"));
        assert!(!obj.contains_key("automated_mode"));
        assert_eq!(obj["streetgard"], 7);
        assert_eq!(obj["rainsensor"], 1800.0);
        assert_eq!(obj["bulb_state"], true);
        assert_eq!(Endpoint::Telemetry.path(), "core/streetgard-data/");
    }
}
