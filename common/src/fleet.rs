//! State of the device fleet view and its detail modal.

use chrono::{DateTime, Utc};

use crate::req::{Device, DeviceId, TelemetrySample};
use crate::snapshot::BulbStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Sensors,
    Control,
    Info,
    Camera,
    Analysis,
}

impl DetailTab {
    pub const ALL: [DetailTab; 5] = [
        DetailTab::Sensors,
        DetailTab::Control,
        DetailTab::Info,
        DetailTab::Camera,
        DetailTab::Analysis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DetailTab::Sensors => "Sensors",
            DetailTab::Control => "Control",
            DetailTab::Info => "Info",
            DetailTab::Camera => "Camera",
            DetailTab::Analysis => "Analysis",
        }
    }
}

/// Latest-telemetry request issued by a selection.
///
/// `seq` grows with every selection, so two requests for the same device
/// are still distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestRequest {
    pub device_id: DeviceId,
    pub seq: u64,
}

/// How a manual control command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The device answered, whatever the status.
    Replied(u16),
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FleetAction {
    Loaded(Vec<Device>),
    LoadFailed,
    Select(Device),
    /// Re-selects the open device.
    Refresh,
    ControlDone {
        device: Device,
        outcome: ControlOutcome,
    },
    LatestLoaded {
        device_id: DeviceId,
        samples: Vec<TelemetrySample>,
        at: DateTime<Utc>,
    },
    LatestFailed {
        device_id: DeviceId,
    },
    DeviceCreated(Device),
    SetTab(DetailTab),
    ToggleAddForm,
    Close,
}

/// Body of the sensors tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailBody<'a> {
    Loading,
    Snapshot(&'a TelemetrySample),
    NoData,
}

impl<'a> DetailBody<'a> {
    pub fn of(fetching: bool, latest: Option<&'a TelemetrySample>) -> Self {
        match (fetching, latest) {
            (true, _) => DetailBody::Loading,
            (false, Some(sample)) => DetailBody::Snapshot(sample),
            (false, None) => DetailBody::NoData,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FleetState {
    pub devices: Vec<Device>,
    pub loading: bool,
    pub selected: Option<Device>,
    pub modal_open: bool,
    pub latest: Option<TelemetrySample>,
    pub fetching_latest: bool,
    pub active_tab: DetailTab,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub show_add_form: bool,
    /// Newest request; the view issues each one exactly once.
    pub latest_request: Option<LatestRequest>,
    pub requests_issued: u64,
}

impl Default for FleetState {
    fn default() -> Self {
        Self {
            devices: vec![],
            loading: true,
            selected: None,
            modal_open: false,
            latest: None,
            fetching_latest: false,
            active_tab: DetailTab::default(),
            last_refreshed: None,
            show_add_form: false,
            latest_request: None,
            requests_issued: 0,
        }
    }
}

impl FleetState {
    pub fn apply(&mut self, action: FleetAction) {
        match action {
            FleetAction::Loaded(devices) => {
                self.devices = devices;
                self.loading = false;
            }
            FleetAction::LoadFailed => {
                self.loading = false;
            }
            FleetAction::Select(device) => {
                self.select(device);
            }
            FleetAction::Refresh => {
                if let Some(device) = self.selected.clone() {
                    self.select(device);
                }
            }
            FleetAction::ControlDone { device, outcome } => match outcome {
                ControlOutcome::Replied(_) => {
                    self.select(device);
                }
                ControlOutcome::Unreachable => {}
            },
            FleetAction::LatestLoaded {
                device_id,
                samples,
                at,
            } => {
                if self.is_selected(device_id) {
                    self.latest = samples.into_iter().next();
                    self.fetching_latest = false;
                    self.last_refreshed = Some(at);
                }
            }
            FleetAction::LatestFailed { device_id } => {
                if self.is_selected(device_id) {
                    self.fetching_latest = false;
                }
            }
            FleetAction::DeviceCreated(device) => {
                self.devices.insert(0, device);
                self.show_add_form = false;
            }
            FleetAction::SetTab(tab) => {
                self.active_tab = tab;
            }
            FleetAction::ToggleAddForm => {
                self.show_add_form = !self.show_add_form;
            }
            FleetAction::Close => {
                self.modal_open = false;
            }
        }
    }

    /// Opens the detail modal for `device` and queues one latest request.
    ///
    /// Re-selecting the open device is a refresh: the shown snapshot stays
    /// until the new one arrives.
    fn select(&mut self, device: Device) {
        let device_id = device.id;
        if !self.is_selected(device_id) {
            self.latest = None;
            self.active_tab = DetailTab::default();
        }
        self.selected = Some(device);
        self.modal_open = true;
        self.fetching_latest = true;
        self.requests_issued += 1;
        self.latest_request = Some(LatestRequest {
            device_id,
            seq: self.requests_issued,
        });
    }

    pub fn is_selected(&self, id: DeviceId) -> bool {
        self.selected.as_ref().map_or(false, |d| d.id == id)
    }

    pub fn find(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Device a `?id=` deep link refers to, once the fleet is loaded.
    pub fn deep_link_target(&self, id: Option<DeviceId>) -> Option<&Device> {
        if self.loading {
            return None;
        }
        id.and_then(|id| self.find(id))
    }

    pub fn detail_body(&self) -> DetailBody<'_> {
        DetailBody::of(self.fetching_latest, self.latest.as_ref())
    }
}

/// Summary of one card in the device grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCard<'a> {
    pub device: &'a Device,
    pub id_badge: String,
    pub status: BulbStatus,
}

pub fn cards(devices: &[Device]) -> Vec<DeviceCard<'_>> {
    devices
        .iter()
        .map(|device| DeviceCard {
            device,
            id_badge: format!("ID: {}", device.id),
            status: BulbStatus::of_device(device),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn device(id: DeviceId, bulb: Option<bool>) -> Device {
        Device {
            id,
            name: format!("SG-{id}"),
            uuid: None,
            img: None,
            created_time: None,
            updated_time: None,
            api_url: Some(format!("http://10.0.0.{id}")),
            latest_bulb_status: bulb,
            latest_latitude: None,
            latest_longitude: None,
            latest_updated_time: None,
        }
    }

    fn sample(id: i64, device_id: DeviceId) -> TelemetrySample {
        TelemetrySample {
            id,
            streetgard: device_id,
            created_time: Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap(),
            temp_dht: 25.0,
            humidity_dht: 50.0,
            temp_bmp: 25.0,
            pressure_bmp: 1000.0,
            altitude_bmp: 900.0,
            relativeheight_bmp: 0.0,
            latitude_gsm: 0.0,
            longitude_gsm: 0.0,
            rainsensor: 4095.0,
            servo_state: false,
            pir_state: false,
            relay_state: false,
            ldr_state: false,
            bulb_state: true,
            servo_position: None,
            automated_mode: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap()
    }

    fn loaded(devices: Vec<Device>) -> FleetState {
        let mut state = FleetState::default();
        state.apply(FleetAction::Loaded(devices));
        state
    }

    /// Requests a single action asks the view to send.
    fn issued(state: &mut FleetState, action: FleetAction) -> Vec<LatestRequest> {
        let before = state.latest_request;
        state.apply(action);
        state
            .latest_request
            .filter(|req| Some(*req) != before)
            .into_iter()
            .collect()
    }

    #[test]
    fn loading_until_fleet_arrives() {
        let mut state = FleetState::default();
        assert!(state.loading);
        state.apply(FleetAction::LoadFailed);
        assert!(!state.loading);
        assert!(state.devices.is_empty());
    }

    #[test]
    fn select_asks_for_exactly_one_snapshot() {
        let mut state = loaded(vec![device(1, Some(true))]);
        let reqs = issued(&mut state, FleetAction::Select(device(1, Some(true))));
        assert_eq!(
            reqs,
            vec![LatestRequest {
                device_id: 1,
                seq: 1
            }]
        );
        assert!(state.modal_open);
        assert_eq!(state.detail_body(), DetailBody::Loading);

        let latest = sample(10, 1);
        state.apply(FleetAction::LatestLoaded {
            device_id: 1,
            samples: vec![latest.clone(), sample(9, 1)],
            at: now(),
        });
        assert_eq!(state.detail_body(), DetailBody::Snapshot(&latest));
        assert_eq!(state.last_refreshed, Some(now()));
    }

    #[test]
    fn empty_snapshot_shows_no_data() {
        let mut state = loaded(vec![device(1, None)]);
        state.apply(FleetAction::Select(device(1, None)));
        state.apply(FleetAction::LatestLoaded {
            device_id: 1,
            samples: vec![],
            at: now(),
        });
        assert_eq!(state.detail_body(), DetailBody::NoData);
    }

    #[test]
    fn failed_snapshot_keeps_the_stale_one() {
        let mut state = loaded(vec![device(1, None)]);
        state.apply(FleetAction::Select(device(1, None)));
        state.apply(FleetAction::LatestLoaded {
            device_id: 1,
            samples: vec![sample(1, 1)],
            at: now(),
        });
        state.apply(FleetAction::Select(device(1, None)));
        assert_eq!(state.detail_body(), DetailBody::Loading);
        state.apply(FleetAction::LatestFailed { device_id: 1 });
        assert_eq!(state.detail_body(), DetailBody::Snapshot(&sample(1, 1)));
    }

    #[test]
    fn late_response_for_another_device_is_ignored() {
        let mut state = loaded(vec![device(1, None), device(2, None)]);
        state.apply(FleetAction::Select(device(1, None)));
        state.apply(FleetAction::Select(device(2, None)));
        state.apply(FleetAction::LatestLoaded {
            device_id: 1,
            samples: vec![sample(1, 1)],
            at: now(),
        });
        assert_eq!(state.detail_body(), DetailBody::Loading);
        assert!(state.latest.is_none());
    }

    #[test]
    fn switching_device_resets_tab_and_snapshot() {
        let mut state = loaded(vec![device(1, None), device(2, None)]);
        state.apply(FleetAction::Select(device(1, None)));
        state.apply(FleetAction::SetTab(DetailTab::Control));
        state.apply(FleetAction::LatestLoaded {
            device_id: 1,
            samples: vec![sample(1, 1)],
            at: now(),
        });
        state.apply(FleetAction::Select(device(1, None)));
        assert_eq!(state.active_tab, DetailTab::Control);
        state.apply(FleetAction::Select(device(2, None)));
        assert_eq!(state.active_tab, DetailTab::Sensors);
        assert!(state.latest.is_none());
    }

    #[test]
    fn created_device_is_prepended_once() {
        let mut state = loaded(vec![device(1, None), device(2, None)]);
        state.apply(FleetAction::ToggleAddForm);
        state.apply(FleetAction::DeviceCreated(device(3, None)));
        let ids: Vec<_> = state.devices.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(!state.show_add_form);
        assert!(!state.loading);
    }

    #[test]
    fn deep_link_waits_for_the_fleet() {
        let state = FleetState::default();
        assert_eq!(state.deep_link_target(Some(2)), None);

        let state = loaded(vec![device(1, None), device(2, None)]);
        assert_eq!(state.deep_link_target(Some(2)).map(|d| d.id), Some(2));
        assert_eq!(state.deep_link_target(Some(5)), None);
        assert_eq!(state.deep_link_target(None), None);
    }

    #[test]
    fn close_keeps_selection() {
        let mut state = loaded(vec![device(1, None)]);
        state.apply(FleetAction::Select(device(1, None)));
        state.apply(FleetAction::Close);
        assert!(!state.modal_open);
        assert!(state.is_selected(1));
    }

    #[test]
    fn every_selection_path_issues_one_request() {
        let mut state = loaded(vec![device(1, None), device(2, None)]);
        assert!(issued(&mut state, FleetAction::Refresh).is_empty());

        assert_eq!(issued(&mut state, FleetAction::Select(device(1, None))).len(), 1);
        assert!(issued(
            &mut state,
            FleetAction::LatestLoaded {
                device_id: 1,
                samples: vec![sample(1, 1)],
                at: now(),
            }
        )
        .is_empty());
        assert!(issued(&mut state, FleetAction::SetTab(DetailTab::Control)).is_empty());

        let refresh = issued(&mut state, FleetAction::Refresh);
        assert_eq!(refresh.len(), 1);
        assert_eq!(refresh[0].device_id, 1);

        let control = issued(
            &mut state,
            FleetAction::ControlDone {
                device: device(1, None),
                outcome: ControlOutcome::Replied(200),
            },
        );
        assert_eq!(control.len(), 1);
        assert_ne!(control[0], refresh[0]);

        let target = state.deep_link_target(Some(2)).cloned().unwrap();
        let linked = issued(&mut state, FleetAction::Select(target));
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].device_id, 2);
        assert_eq!(state.requests_issued, 4);
    }

    #[test]
    fn control_refreshes_after_any_reply() {
        let mut state = loaded(vec![device(1, None)]);
        state.apply(FleetAction::Select(device(1, None)));
        state.apply(FleetAction::LatestFailed { device_id: 1 });

        let reqs = issued(
            &mut state,
            FleetAction::ControlDone {
                device: device(1, None),
                outcome: ControlOutcome::Replied(500),
            },
        );
        assert_eq!(reqs.len(), 1);
        assert!(state.fetching_latest);

        state.apply(FleetAction::LatestFailed { device_id: 1 });
        let reqs = issued(
            &mut state,
            FleetAction::ControlDone {
                device: device(1, None),
                outcome: ControlOutcome::Unreachable,
            },
        );
        assert!(reqs.is_empty());
        assert!(!state.fetching_latest);
    }
}
