use common::{
    fleet::{cards, FleetAction, FleetState},
    geo::{plan_map, MarkerIcon, FALLBACK_POSITION},
    req::Device,
};

const FLEET: &str = r#"[
    {"id": 1, "name": "A", "latest_bulb_status": true},
    {"id": 2, "name": "B", "latest_bulb_status": false}
]"#;

#[test]
fn fleet_renders_cards_and_markers() {
    let devices: Vec<Device> = serde_json::from_str(FLEET).unwrap();

    let mut state = FleetState::default();
    state.apply(FleetAction::Loaded(devices));

    let cards = cards(&state.devices);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].device.name, "A");
    assert_eq!(cards[0].status.label(), "Active");
    assert_eq!(cards[0].id_badge, "ID: 1");
    assert_eq!(cards[1].status.label(), "Inactive");

    let plan = plan_map(&state.devices);
    assert_eq!(plan.markers.len(), 2);
    assert_eq!(plan.markers[0].icon, MarkerIcon::Active);
    assert_eq!(plan.markers[1].icon, MarkerIcon::Inactive);
    assert_ne!(plan.markers[0].icon.url(), plan.markers[1].icon.url());
    for marker in &plan.markers {
        assert_eq!(marker.position, FALLBACK_POSITION);
    }
}

#[test]
fn created_device_shows_up_first_on_both_views() {
    let devices: Vec<Device> = serde_json::from_str(FLEET).unwrap();
    let created: Device =
        serde_json::from_str(r#"{"id": 3, "name": "New", "img": "http://cdn/sg/3.jpg"}"#).unwrap();

    let mut state = FleetState::default();
    state.apply(FleetAction::Loaded(devices));
    state.apply(FleetAction::DeviceCreated(created));

    let names: Vec<_> = cards(&state.devices)
        .iter()
        .map(|c| c.device.name.clone())
        .collect();
    assert_eq!(names, vec!["New", "A", "B"]);
    assert_eq!(plan_map(&state.devices).markers[0].icon, MarkerIcon::Inactive);
}
