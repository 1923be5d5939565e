use chrono::{DateTime, Utc};
use common::{
    fleet::{DetailBody, DetailTab},
    req::{ControlAction, Device, TelemetrySample},
    snapshot::{self, GaugeGroup, OperationMode, Rain},
};
use yew::prelude::*;

use super::analysis::Analysis;
use crate::{config, utils};

#[derive(Properties, PartialEq)]
pub struct Props {
    pub device: Device,
    pub latest: Option<TelemetrySample>,
    pub fetching: bool,
    pub tab: DetailTab,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub on_tab: Callback<DetailTab>,
    pub on_close: Callback<()>,
    pub on_refresh: Callback<()>,
    pub on_control: Callback<ControlAction>,
}

fn gauge_group(group: &GaugeGroup) -> Html {
    html! {
        <div class="sensor-card">
            <h4>{group.title}</h4>
            { for group.gauges.iter().map(|g| html! {
                <div class="gauge">
                    <div class="gauge-label">
                        <span>{g.label}</span>
                        <span>{format!("{:.1}{}", g.value, g.unit)}</span>
                    </div>
                    <div class="progress">
                        <div class="progress-bar" style={format!("width: {:.0}%", g.percent)}></div>
                    </div>
                </div>
            }) }
        </div>
    }
}

fn sensors(s: &TelemetrySample) -> Html {
    let rain = Rain::from_raw(s.rainsensor);
    let location = match snapshot::location(s) {
        Some((lat, lng)) => html! {
            <>
                <p>{format!("{lat:.6}, {lng:.6}")}</p>
                <a href={snapshot::maps_link(lat, lng)} target="_blank" rel="noopener noreferrer">
                    {"Open in Google Maps"}
                </a>
            </>
        },
        None => html! { <p class="text-muted">{"Location unavailable"}</p> },
    };

    html! {
        <div class="sensor-grid">
            { for snapshot::gauge_groups(s).iter().map(gauge_group) }
            <div class="sensor-card">
                <h4>{"Rain Sensor"}</h4>
                <span class={classes!("badge", rain.detected.then_some("badge-warning"))}>
                    {rain.label()}
                </span>
            </div>
            <div class="sensor-card">
                <h4>{"Location"}</h4>
                {location}
            </div>
            <div class="sensor-card">
                <h4>{"Device States"}</h4>
                <div class="state-tiles">
                    { for snapshot::state_tiles(s).iter().map(|t| html! {
                        <div class={classes!("state-tile", t.on.then_some("on"))}>
                            <span>{t.label}</span>
                            <strong>{snapshot::on_off(t.on)}</strong>
                        </div>
                    }) }
                </div>
            </div>
            <p class="text-muted">{format!("Reading from {}", utils::local_date(Some(s.created_time)))}</p>
        </div>
    }
}

fn control(latest: Option<&TelemetrySample>, on_control: &Callback<ControlAction>) -> Html {
    let send = |action: ControlAction| on_control.reform(move |_: MouseEvent| action);
    let mode = OperationMode::of(latest);
    let toggle_label = match mode {
        OperationMode::Automated => "Switch to Manual Mode",
        OperationMode::Manual => "Switch to Automated Mode",
    };

    html! {
        <div class="control">
            <div class="sensor-card">
                <h4>{"Operation Mode"}</h4>
                <p><strong>{mode.label()}</strong>{format!(" ({})", mode.controller())}</p>
                <button type="button" class="btn btn-default" onclick={send(ControlAction::ToggleAutomated)}>
                    {toggle_label}
                </button>
            </div>
            if mode.manual_controls_enabled() {
                <div class="sensor-card">
                    <h4>{"Manual Controls"}</h4>
                    <button type="button" class="btn btn-primary" onclick={send(ControlAction::ToggleLight)}>
                        {snapshot::light_button_label(latest)}
                    </button>
                    <button type="button" class="btn btn-default" onclick={send(ControlAction::ToggleDimmer)}>
                        {snapshot::dimmer_button_label(latest)}
                    </button>
                    <p class="text-muted">
                        {format!("Brightness: {}", if snapshot::is_bright(latest) { "High" } else { "Low" })}
                    </p>
                </div>
            } else {
                <div class="sensor-card">
                    <h4>{OperationMode::Automated.label()}</h4>
                    <p>
                        {"The street guard switches and dims its light from its own sensors. \
                          Switch to manual mode to control it from here."}
                    </p>
                </div>
            }
        </div>
    }
}

fn info(device: &Device) -> Html {
    let updated = match utils::ago(device.latest_updated_time) {
        Some(ago) => format!("{} ({ago})", utils::local_date(device.latest_updated_time)),
        None => utils::local_date(device.latest_updated_time),
    };
    html! {
        <div class="info">
            <dl>
                <dt>{"Name"}</dt><dd>{device.name.clone()}</dd>
                <dt>{"ID"}</dt><dd>{device.id.to_string()}</dd>
                <dt>{"Created"}</dt><dd>{utils::local_date(device.created_time)}</dd>
                <dt>{"Last Updated"}</dt><dd>{updated}</dd>
                <dt>{"UUID"}</dt>
                <dd>{device.uuid.clone().unwrap_or_else(|| snapshot::NOT_AVAILABLE.to_owned())}</dd>
            </dl>
            if let Some(src) = device.img.clone() {
                <img class="device-image" {src} alt={device.name.clone()} />
            }
        </div>
    }
}

fn camera_feed(device: &Device) -> Html {
    match config::camera_feed_url() {
        Some(src) => html! {
            <img class="camera-feed" {src} alt={format!("Live feed of {}", device.name)} />
        },
        None => html! {
            <div class="chart-placeholder">{"Camera feed unavailable"}</div>
        },
    }
}

/// Modal with the latest snapshot and the controls of one device.
#[function_component(DeviceDetail)]
pub fn device_detail(props: &Props) -> Html {
    let latest = props.latest.as_ref();

    let tabs = DetailTab::ALL.iter().map(|&tab| {
        let onclick = props.on_tab.reform(move |_: MouseEvent| tab);
        html! {
            <button type="button" class={classes!("tab", (props.tab == tab).then_some("active"))} {onclick}>
                {tab.label()}
            </button>
        }
    });

    let body = match props.tab {
        DetailTab::Sensors => match DetailBody::of(props.fetching, latest) {
            DetailBody::Loading => html! { <div class="chart-placeholder">{"Loading sensor data..."}</div> },
            DetailBody::NoData => html! { <div class="chart-placeholder">{"No sensor data available"}</div> },
            DetailBody::Snapshot(s) => sensors(s),
        },
        DetailTab::Control => control(latest, &props.on_control),
        DetailTab::Info => info(&props.device),
        DetailTab::Camera => camera_feed(&props.device),
        DetailTab::Analysis => html! { <Analysis device_id={Some(props.device.id)} /> },
    };

    let online = snapshot::connection_label(latest);
    let on_close = props.on_close.reform(|_: MouseEvent| ());
    let on_refresh = props.on_refresh.reform(|_: MouseEvent| ());

    html! {
        <div class="modal-backdrop">
            <div class="modal-dialog">
                <div class="modal-header">
                    <h2>{props.device.name.clone()}</h2>
                    <span class={classes!("badge", if latest.map_or(false, |s| s.bulb_state) { "badge-online" } else { "badge-offline" })}>
                        {online}
                    </span>
                </div>
                <div class="tabs">{ for tabs }</div>
                <div class="modal-body">{body}</div>
                <div class="modal-footer">
                    <button type="button" class="btn btn-default" onclick={on_close}>{"Close"}</button>
                    if let Some(ts) = props.last_refreshed {
                        <span class="text-muted">{format!("Last refreshed: {}", utils::local_time(ts))}</span>
                    }
                    <button type="button" class="btn btn-primary" disabled={props.fetching} onclick={on_refresh}>
                        { if props.fetching { "Refreshing..." } else { "Refresh Data" } }
                    </button>
                </div>
            </div>
        </div>
    }
}
