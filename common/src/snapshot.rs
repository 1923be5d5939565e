//! Presentation of a device's latest telemetry sample.

use chrono::{DateTime, TimeZone, Utc};

use crate::req::{Device, TelemetrySample};

pub const DATE_FORMAT: &str = "%b %-d, %Y, %I:%M %p";
pub const NOT_AVAILABLE: &str = "N/A";

pub fn format_date<Tz>(ts: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    ts.map_or(NOT_AVAILABLE.to_owned(), |ts| {
        ts.with_timezone(tz).format(DATE_FORMAT).to_string()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulbStatus {
    Active,
    Inactive,
}

impl BulbStatus {
    pub fn of_device(device: &Device) -> Self {
        Self::from(device.is_active())
    }

    pub fn label(&self) -> &'static str {
        match self {
            BulbStatus::Active => "Active",
            BulbStatus::Inactive => "Inactive",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BulbStatus::Active => "#22c55e",
            BulbStatus::Inactive => "#ef4444",
        }
    }
}

impl From<bool> for BulbStatus {
    fn from(on: bool) -> Self {
        if on {
            BulbStatus::Active
        } else {
            BulbStatus::Inactive
        }
    }
}

/// Header badge of the detail modal.
pub fn connection_label(latest: Option<&TelemetrySample>) -> &'static str {
    if latest.map_or(false, |s| s.bulb_state) {
        "ONLINE"
    } else {
        "OFFLINE"
    }
}

pub fn on_off(state: bool) -> &'static str {
    if state {
        "ON"
    } else {
        "OFF"
    }
}

/// Percentage of `max`, clamped to 0..=100 for progress bars.
pub fn gauge(value: f64, max: f64) -> f64 {
    if !value.is_finite() || max <= 0.0 {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeGroup {
    pub title: &'static str,
    pub gauges: Vec<Gauge>,
}

pub fn gauge_groups(s: &TelemetrySample) -> [GaugeGroup; 2] {
    let g = |label, value, unit, max| Gauge {
        label,
        value,
        unit,
        percent: gauge(value, max),
    };
    [
        GaugeGroup {
            title: "Temperature & Humidity",
            gauges: vec![
                g("Temperature (DHT)", s.temp_dht, "°C", 50.0),
                g("Temperature (BMP)", s.temp_bmp, "°C", 50.0),
                g("Humidity", s.humidity_dht, "%", 100.0),
            ],
        },
        GaugeGroup {
            title: "Pressure & Altitude",
            gauges: vec![
                g("Pressure", s.pressure_bmp, " hPa", 1100.0),
                g("Altitude", s.altitude_bmp, " m", 1000.0),
                g("Relative Height", s.relativeheight_bmp, " m", 100.0),
            ],
        },
    ]
}

pub const RAIN_THRESHOLD: f64 = 2000.0;
pub const RAIN_ADC_MAX: f64 = 4095.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rain {
    pub detected: bool,
    pub wetness: u8, // percent
}

impl Rain {
    /// The sensor pulls its reading down as it gets wet.
    pub fn from_raw(raw: f64) -> Self {
        let wetness = ((RAIN_ADC_MAX - raw) / RAIN_ADC_MAX * 100.0)
            .round()
            .clamp(0.0, 100.0);
        Self {
            detected: raw < RAIN_THRESHOLD,
            wetness: wetness as u8,
        }
    }

    pub fn label(&self) -> String {
        let state = if self.detected {
            "Rain Detected"
        } else {
            "No Rain"
        };
        format!("{state} ({}%)", self.wetness)
    }
}

/// GPS fix of the sample, if the modem reported one.
pub fn location(s: &TelemetrySample) -> Option<(f64, f64)> {
    (s.latitude_gsm != 0.0 && s.longitude_gsm != 0.0).then_some((s.latitude_gsm, s.longitude_gsm))
}

pub fn maps_link(lat: f64, lng: f64) -> String {
    format!("https://google.com/maps?q={lat},{lng}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTile {
    pub label: &'static str,
    pub on: bool,
}

pub fn state_tiles(s: &TelemetrySample) -> [StateTile; 5] {
    [
        StateTile {
            label: "Bulb",
            on: s.bulb_state,
        },
        StateTile {
            label: "Servo",
            on: s.servo_state,
        },
        StateTile {
            label: "PIR",
            on: s.pir_state,
        },
        StateTile {
            label: "Relay",
            on: s.relay_state,
        },
        StateTile {
            label: "LDR",
            on: s.ldr_state,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    Automated,
    Manual,
}

impl OperationMode {
    /// Devices that do not report the flag are treated as manually operated.
    pub fn of(latest: Option<&TelemetrySample>) -> Self {
        match latest.and_then(|s| s.automated_mode) {
            Some(true) => OperationMode::Automated,
            _ => OperationMode::Manual,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationMode::Automated => "Automated Mode Active",
            OperationMode::Manual => "Manual Mode Active",
        }
    }

    pub fn controller(&self) -> &'static str {
        match self {
            OperationMode::Automated => "AI-Controlled",
            OperationMode::Manual => "User-Controlled",
        }
    }

    pub fn manual_controls_enabled(&self) -> bool {
        *self == OperationMode::Manual
    }
}

pub const BRIGHT_SERVO_POSITION: f64 = 90.0;

pub fn is_bright(latest: Option<&TelemetrySample>) -> bool {
    latest
        .and_then(|s| s.servo_position)
        .map_or(false, |p| p > BRIGHT_SERVO_POSITION)
}

pub fn light_button_label(latest: Option<&TelemetrySample>) -> &'static str {
    if latest.map_or(false, |s| s.bulb_state) {
        "Turn Off Light"
    } else {
        "Turn On Light"
    }
}

pub fn dimmer_button_label(latest: Option<&TelemetrySample>) -> &'static str {
    if is_bright(latest) {
        "Dim Light"
    } else {
        "Brighten Light"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            id: 9,
            streetgard: 1,
            created_time: Utc.with_ymd_and_hms(2025, 3, 2, 20, 5, 0).unwrap(),
            temp_dht: 30.0,
            humidity_dht: 64.0,
            temp_bmp: 75.0,
            pressure_bmp: 1012.0,
            altitude_bmp: 920.0,
            relativeheight_bmp: -3.0,
            latitude_gsm: 12.971599,
            longitude_gsm: 77.594566,
            rainsensor: 1500.0,
            servo_state: true,
            pir_state: false,
            relay_state: true,
            ldr_state: false,
            bulb_state: true,
            servo_position: Some(120.0),
            automated_mode: Some(false),
        }
    }

    #[test]
    fn formats_dates_or_placeholder() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 2, 20, 5, 0).unwrap();
        assert_eq!(format_date(Some(ts), &Utc), "Mar 2, 2025, 08:05 PM");
        assert_eq!(format_date(None, &Utc), NOT_AVAILABLE);
    }

    #[test]
    fn gauges_are_clamped() {
        let [temps, pressure] = gauge_groups(&sample());
        assert_eq!(temps.gauges[0].percent, 60.0);
        assert_eq!(temps.gauges[1].percent, 100.0);
        assert_eq!(pressure.gauges[2].percent, 0.0);
        assert_eq!(gauge(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn rain_reading() {
        let wet = Rain::from_raw(1500.0);
        assert!(wet.detected);
        assert_eq!(wet.wetness, 63);
        assert_eq!(wet.label(), "Rain Detected (63%)");

        let dry = Rain::from_raw(4095.0);
        assert!(!dry.detected);
        assert_eq!(dry.label(), "No Rain (0%)");
    }

    #[test]
    fn location_needs_both_coordinates() {
        let mut s = sample();
        assert_eq!(location(&s), Some((12.971599, 77.594566)));
        s.longitude_gsm = 0.0;
        assert_eq!(location(&s), None);
        assert_eq!(maps_link(1.5, 2.25), "https://google.com/maps?q=1.5,2.25");
    }

    #[test]
    fn operation_mode_follows_automated_flag() {
        let mut s = sample();
        assert_eq!(OperationMode::of(Some(&s)), OperationMode::Manual);
        assert!(OperationMode::of(Some(&s)).manual_controls_enabled());

        s.automated_mode = Some(true);
        let mode = OperationMode::of(Some(&s));
        assert_eq!(mode, OperationMode::Automated);
        assert!(!mode.manual_controls_enabled());
        assert_eq!(mode.controller(), "AI-Controlled");

        assert_eq!(OperationMode::of(None), OperationMode::Manual);
    }

    #[test]
    fn control_labels() {
        let mut s = sample();
        assert_eq!(light_button_label(Some(&s)), "Turn Off Light");
        assert_eq!(dimmer_button_label(Some(&s)), "Dim Light");
        s.bulb_state = false;
        s.servo_position = Some(90.0);
        assert_eq!(light_button_label(Some(&s)), "Turn On Light");
        assert_eq!(dimmer_button_label(Some(&s)), "Brighten Light");
        assert_eq!(connection_label(Some(&s)), "OFFLINE");
        assert_eq!(connection_label(None), "OFFLINE");
    }

    #[test]
    fn state_tiles_cover_all_actuators() {
        let tiles = state_tiles(&sample());
        let on: Vec<_> = tiles.iter().filter(|t| t.on).map(|t| t.label).collect();
        assert_eq!(on, vec!["Bulb", "Servo", "Relay"]);
        assert_eq!(on_off(tiles[2].on), "OFF");
    }
}
