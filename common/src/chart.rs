use chrono::{DateTime, TimeZone, Utc};

use crate::req::TelemetrySample;

pub const LABEL_FORMAT: &str = "%m/%d %H:%M";

/// A telemetry sample flattened for plotting. Binary states are 0/1.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub temp_dht: f64,
    pub humidity_dht: f64,
    pub temp_bmp: f64,
    pub pressure_bmp: f64,
    pub altitude_bmp: f64,
    pub rainsensor: f64,
    pub pir: f64,
    pub relay: f64,
    pub ldr: f64,
    pub bulb: f64,
}

fn flag(state: bool) -> f64 {
    if state {
        1.0
    } else {
        0.0
    }
}

impl ChartRow {
    pub fn from_sample<Tz>(sample: &TelemetrySample, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            timestamp: sample.created_time,
            label: sample
                .created_time
                .with_timezone(tz)
                .format(LABEL_FORMAT)
                .to_string(),
            temp_dht: sample.temp_dht,
            humidity_dht: sample.humidity_dht,
            temp_bmp: sample.temp_bmp,
            pressure_bmp: sample.pressure_bmp,
            altitude_bmp: sample.altitude_bmp,
            rainsensor: sample.rainsensor,
            pir: flag(sample.pir_state),
            relay: flag(sample.relay_state),
            ldr: flag(sample.ldr_state),
            bulb: flag(sample.bulb_state),
        }
    }

    pub fn value(&self, field: Field) -> f64 {
        match field {
            Field::TempDht => self.temp_dht,
            Field::TempBmp => self.temp_bmp,
            Field::HumidityDht => self.humidity_dht,
            Field::PressureBmp => self.pressure_bmp,
            Field::AltitudeBmp => self.altitude_bmp,
            Field::RainSensor => self.rainsensor,
            Field::Pir => self.pir,
            Field::Relay => self.relay,
            Field::Ldr => self.ldr,
            Field::Bulb => self.bulb,
        }
    }
}

/// Reshapes a history response into rows, oldest first.
///
/// The backend lists newest first; the sort is stable so samples sharing a
/// timestamp keep their relative order.
pub fn chart_rows<Tz>(samples: &[TelemetrySample], tz: &Tz) -> Vec<ChartRow>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut rows: Vec<_> = samples.iter().map(|s| ChartRow::from_sample(s, tz)).collect();
    rows.sort_by_key(|r| r.timestamp);
    rows
}

pub fn labels(rows: &[ChartRow]) -> Vec<String> {
    rows.iter().map(|r| r.label.clone()).collect()
}

pub fn column(rows: &[ChartRow], field: Field) -> Vec<f64> {
    rows.iter().map(|r| r.value(field)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TempDht,
    TempBmp,
    HumidityDht,
    PressureBmp,
    AltitudeBmp,
    RainSensor,
    Pir,
    Relay,
    Ldr,
    Bulb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Area,
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub field: Field,
    pub name: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub kind: ChartKind,
    pub series: &'static [SeriesSpec],
}

const PURPLE: &str = "#8884d8";
const GREEN: &str = "#82ca9d";
const YELLOW: &str = "#ffc658";
const ORANGE: &str = "#ff8042";

const TEMPERATURE: &[PanelSpec] = &[PanelSpec {
    id: "chart-temperature",
    title: "Temperature Readings",
    description: "Comparison between DHT and BMP temperature sensors over time",
    kind: ChartKind::Line,
    series: &[
        SeriesSpec {
            field: Field::TempDht,
            name: "DHT Temperature (°C)",
            color: PURPLE,
        },
        SeriesSpec {
            field: Field::TempBmp,
            name: "BMP Temperature (°C)",
            color: GREEN,
        },
    ],
}];

const HUMIDITY_PRESSURE: &[PanelSpec] = &[
    PanelSpec {
        id: "chart-humidity",
        title: "Humidity Readings",
        description: "DHT humidity sensor readings over time",
        kind: ChartKind::Area,
        series: &[SeriesSpec {
            field: Field::HumidityDht,
            name: "Humidity (%)",
            color: PURPLE,
        }],
    },
    PanelSpec {
        id: "chart-pressure",
        title: "Pressure Readings",
        description: "BMP pressure sensor readings over time",
        kind: ChartKind::Area,
        series: &[SeriesSpec {
            field: Field::PressureBmp,
            name: "Pressure (hPa)",
            color: GREEN,
        }],
    },
];

const ALTITUDE_RAIN: &[PanelSpec] = &[
    PanelSpec {
        id: "chart-altitude",
        title: "Altitude Readings",
        description: "BMP altitude sensor readings over time",
        kind: ChartKind::Line,
        series: &[SeriesSpec {
            field: Field::AltitudeBmp,
            name: "Altitude (m)",
            color: PURPLE,
        }],
    },
    PanelSpec {
        id: "chart-rain",
        title: "Rain Sensor Readings",
        description: "Rain sensor readings over time",
        kind: ChartKind::Area,
        series: &[SeriesSpec {
            field: Field::RainSensor,
            name: "Rain Sensor",
            color: GREEN,
        }],
    },
];

const SENSOR_STATES: &[PanelSpec] = &[PanelSpec {
    id: "chart-states",
    title: "Sensor States",
    description: "Binary sensor states over time",
    kind: ChartKind::Bar,
    series: &[
        SeriesSpec {
            field: Field::Pir,
            name: "PIR Sensor",
            color: PURPLE,
        },
        SeriesSpec {
            field: Field::Relay,
            name: "Relay State",
            color: GREEN,
        },
        SeriesSpec {
            field: Field::Ldr,
            name: "LDR Sensor",
            color: YELLOW,
        },
        SeriesSpec {
            field: Field::Bulb,
            name: "Bulb State",
            color: ORANGE,
        },
    ],
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    Temperature,
    HumidityPressure,
    AltitudeRain,
    SensorStates,
}

impl ChartTab {
    pub const ALL: [ChartTab; 4] = [
        ChartTab::Temperature,
        ChartTab::HumidityPressure,
        ChartTab::AltitudeRain,
        ChartTab::SensorStates,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartTab::Temperature => "Temperature",
            ChartTab::HumidityPressure => "Humidity & Pressure",
            ChartTab::AltitudeRain => "Altitude & Rain",
            ChartTab::SensorStates => "Sensor States",
        }
    }

    pub fn panels(&self) -> &'static [PanelSpec] {
        match self {
            ChartTab::Temperature => TEMPERATURE,
            ChartTab::HumidityPressure => HUMIDITY_PRESSURE,
            ChartTab::AltitudeRain => ALTITUDE_RAIN,
            ChartTab::SensorStates => SENSOR_STATES,
        }
    }
}

/// What the analysis view shows instead of (or as) its charts.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartStatus<'a> {
    NoDevice,
    Loading,
    Failed(&'a str),
    Empty,
    Ready(&'a [ChartRow]),
}

impl ChartStatus<'_> {
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            ChartStatus::NoDevice => Some("No device selected"),
            ChartStatus::Loading => Some("Loading data..."),
            ChartStatus::Failed(msg) => Some(*msg),
            ChartStatus::Empty => Some("No data available"),
            ChartStatus::Ready(_) => None,
        }
    }
}

pub fn chart_status<'a>(
    device_id: Option<i64>,
    loading: bool,
    error: Option<&'a str>,
    rows: &'a [ChartRow],
) -> ChartStatus<'a> {
    if device_id.is_none() {
        return ChartStatus::NoDevice;
    }
    if loading {
        return ChartStatus::Loading;
    }
    if let Some(msg) = error {
        return ChartStatus::Failed(msg);
    }
    if rows.is_empty() {
        ChartStatus::Empty
    } else {
        ChartStatus::Ready(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use proptest::prelude::*;

    fn sample(id: i64, minutes: i64, bulb: bool) -> TelemetrySample {
        TelemetrySample {
            id,
            streetgard: 1,
            created_time: Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap()
                + Duration::minutes(minutes),
            temp_dht: 20.0 + id as f64,
            humidity_dht: 55.0,
            temp_bmp: 21.0,
            pressure_bmp: 1010.0,
            altitude_bmp: 900.0,
            relativeheight_bmp: 0.0,
            latitude_gsm: 0.0,
            longitude_gsm: 0.0,
            rainsensor: 3000.0,
            servo_state: false,
            pir_state: true,
            relay_state: false,
            ldr_state: bulb,
            bulb_state: bulb,
            servo_position: None,
            automated_mode: None,
        }
    }

    #[test]
    fn flattens_states_to_numbers() {
        let row = ChartRow::from_sample(&sample(1, 0, true), &Utc);
        assert_eq!(row.pir, 1.0);
        assert_eq!(row.relay, 0.0);
        assert_eq!(row.bulb, 1.0);
        assert_eq!(row.label, "03/02 08:00");
    }

    #[test]
    fn labels_follow_the_display_zone() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let row = ChartRow::from_sample(&sample(1, 0, false), &ist);
        assert_eq!(row.label, "03/02 13:30");
    }

    #[test]
    fn rows_are_oldest_first() {
        let newest_first = vec![sample(3, 20, true), sample(2, 10, false), sample(1, 0, true)];
        let rows = chart_rows(&newest_first, &Utc);
        assert_eq!(labels(&rows), vec!["03/02 08:00", "03/02 08:10", "03/02 08:20"]);
        assert_eq!(column(&rows, Field::TempDht), vec![21.0, 22.0, 23.0]);
        assert_eq!(column(&rows, Field::Bulb), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn every_tab_has_panels_with_series() {
        for tab in ChartTab::ALL {
            assert!(!tab.panels().is_empty(), "{}", tab.label());
            for panel in tab.panels() {
                assert!(!panel.series.is_empty(), "{}", panel.title);
            }
        }
        assert_eq!(ChartTab::SensorStates.panels()[0].kind, ChartKind::Bar);
        assert_eq!(ChartTab::SensorStates.panels()[0].series.len(), 4);
    }

    #[test]
    fn status_placeholders_are_distinct() {
        let rows = chart_rows(&[sample(1, 0, true)], &Utc);
        assert_eq!(chart_status(None, true, None, &[]), ChartStatus::NoDevice);
        assert_eq!(chart_status(Some(1), true, None, &[]), ChartStatus::Loading);
        assert_eq!(
            chart_status(Some(1), false, Some("Failed to fetch data"), &[]).placeholder(),
            Some("Failed to fetch data")
        );
        assert_eq!(chart_status(Some(1), false, None, &[]), ChartStatus::Empty);
        assert!(chart_status(Some(1), false, None, &rows).placeholder().is_none());

        assert_ne!(ChartStatus::NoDevice.placeholder(), ChartStatus::Loading.placeholder());
        assert_ne!(ChartStatus::Loading.placeholder(), ChartStatus::Empty.placeholder());
        assert_ne!(ChartStatus::NoDevice.placeholder(), ChartStatus::Empty.placeholder());
    }

    proptest! {
        #[test]
        fn reshaping_is_idempotent(
            offsets in proptest::collection::vec((0i64..100_000, any::<bool>(), -40.0f64..60.0), 0..40)
        ) {
            let samples: Vec<_> = offsets
                .iter()
                .enumerate()
                .map(|(i, (minutes, bulb, temp))| {
                    let mut s = sample(i as i64, *minutes, *bulb);
                    s.temp_dht = *temp;
                    s
                })
                .collect();

            let first = chart_rows(&samples, &Utc);
            let second = chart_rows(&samples, &Utc);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), samples.len());
        }
    }
}
