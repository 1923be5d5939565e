use std::rc::Rc;

use chrono::Utc;
use common::{
    fleet::{cards, ControlOutcome, DetailTab, FleetAction, FleetState, LatestRequest},
    req::{ControlAction, Device, DeviceId},
};
use serde::{Deserialize, Serialize};
use yew::prelude::*;
use yew_router::prelude::*;

use super::{create_device::CreateDevice, detail::DeviceDetail};
use crate::{request, utils, Route};

/// `?id=N` query of the controller page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeepLink {
    pub id: DeviceId,
}

#[derive(Default, PartialEq)]
struct FleetStore(FleetState);

impl Reducible for FleetStore {
    type Action = FleetAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = self.0.clone();
        next.apply(action);
        Rc::new(FleetStore(next))
    }
}

fn fetch_latest(fleet: UseReducerDispatcher<FleetStore>, req: LatestRequest) {
    let device_id = req.device_id;
    wasm_bindgen_futures::spawn_local(async move {
        let action = match request::streetgard_data_latest(device_id).await {
            Ok(samples) => {
                log::debug!("latest of street guard {device_id}: {} sample(s)", samples.len());
                FleetAction::LatestLoaded {
                    device_id,
                    samples,
                    at: Utc::now(),
                }
            }
            Err(err) => {
                log::error!("Error fetching latest data of {device_id}: {err:#}");
                FleetAction::LatestFailed { device_id }
            }
        };
        fleet.dispatch(action);
    });
}

#[function_component(StreetGardList)]
pub fn street_gard_list() -> Html {
    let fleet = use_reducer(FleetStore::default);
    let navigator = use_navigator();
    let deep_link = use_location()
        .and_then(|l| l.query::<DeepLink>().ok())
        .map(|q| q.id);

    // requests
    {
        let fleet = fleet.dispatcher();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match request::streetgard_list().await {
                    Ok(devices) => {
                        log::debug!("{} street guards", devices.len());
                        fleet.dispatch(FleetAction::Loaded(devices));
                    }
                    Err(err) => {
                        log::error!("Error fetching street guards: {err:#}");
                        fleet.dispatch(FleetAction::LoadFailed);
                    }
                }
            });
            || ()
        });
    }

    // one fetch per request the state machine queues
    {
        let dispatcher = fleet.dispatcher();
        use_effect_with(fleet.0.latest_request, move |req| {
            if let Some(req) = *req {
                fetch_latest(dispatcher, req);
            }
            || ()
        });
    }

    let on_select = {
        let fleet = fleet.dispatcher();
        Callback::from(move |device: Device| fleet.dispatch(FleetAction::Select(device)))
    };

    // open the linked device once the fleet is there, then drop the query
    {
        let target = fleet.0.deep_link_target(deep_link).cloned();
        let on_select = on_select.clone();
        use_effect_with(target, move |target| {
            if let Some(device) = target.clone() {
                on_select.emit(device);
                if let Some(navigator) = navigator {
                    navigator.replace(&Route::Controller);
                }
            }
            || ()
        });
    }

    let on_control = {
        let selected = fleet.0.selected.clone();
        let fleet = fleet.dispatcher();
        Callback::from(move |action: ControlAction| {
            let Some(device) = selected.clone() else {
                return;
            };
            let Some(api_url) = device.api_url.clone() else {
                log::error!("street guard {} has no api url", device.id);
                return;
            };
            let fleet = fleet.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = match request::device_control(&api_url, action).await {
                    Ok((status, reply)) => {
                        if status.is_success() {
                            log::debug!("{} on {}: {reply}", action.command(), device.id);
                        } else {
                            log::warn!("{} on {} answered {status}: {reply}", action.command(), device.id);
                        }
                        ControlOutcome::Replied(status.as_u16())
                    }
                    Err(err) => {
                        log::error!("Error sending {}: {err:#}", action.command());
                        ControlOutcome::Unreachable
                    }
                };
                fleet.dispatch(FleetAction::ControlDone { device, outcome });
            });
        })
    };

    let on_refresh = {
        let fleet = fleet.dispatcher();
        Callback::from(move |_: ()| fleet.dispatch(FleetAction::Refresh))
    };

    let on_tab = {
        let fleet = fleet.dispatcher();
        Callback::from(move |tab: DetailTab| fleet.dispatch(FleetAction::SetTab(tab)))
    };
    let on_close = {
        let fleet = fleet.dispatcher();
        Callback::from(move |_: ()| fleet.dispatch(FleetAction::Close))
    };
    let on_toggle_add = {
        let fleet = fleet.dispatcher();
        Callback::from(move |_: MouseEvent| fleet.dispatch(FleetAction::ToggleAddForm))
    };
    let on_created = {
        let fleet = fleet.dispatcher();
        Callback::from(move |device: Device| fleet.dispatch(FleetAction::DeviceCreated(device)))
    };

    let state = &fleet.0;
    if state.loading {
        return html! {
            <div class="loading">
                <div class="spinner"></div>
                <p>{"Loading street guard data..."}</p>
            </div>
        };
    }

    let grid = cards(&state.devices).into_iter().map(|card| {
        let device = card.device;
        let onclick = {
            let on_select = on_select.clone();
            let device = device.clone();
            Callback::from(move |_: MouseEvent| on_select.emit(device.clone()))
        };
        html! {
            <div key={device.id} class="device-card" {onclick}>
                <div class="device-card-image">
                    if let Some(src) = device.img.clone() {
                        <img {src} alt={device.name.clone()} />
                    } else {
                        <span class="bulb-glyph">{"💡"}</span>
                    }
                    <span class="badge badge-id">{card.id_badge}</span>
                </div>
                <h3>{device.name.clone()}</h3>
                <p class="text-muted">{format!("Created: {}", utils::local_date(device.created_time))}</p>
                <div class="badges">
                    <span class="badge" style={format!("background-color: {}", card.status.color())}>
                        {card.status.label()}
                    </span>
                    <span class="badge">
                        {format!("Updated: {}", utils::local_date(device.latest_updated_time))}
                    </span>
                </div>
            </div>
        }
    });

    html! {
        <div class="fleet">
            <div class="fleet-toolbar">
                <button type="button" class="btn btn-default" onclick={on_toggle_add}>
                    { if state.show_add_form { "Cancel" } else { "Quick Add" } }
                </button>
            </div>
            if state.show_add_form {
                <div class="panel">
                    <CreateDevice on_success={on_created} />
                </div>
            }

            if state.devices.is_empty() {
                <p class="text-muted">{"No street guards found."}</p>
            } else {
                <div class="device-grid">{ for grid }</div>
            }

            if let (true, Some(device)) = (state.modal_open, state.selected.clone()) {
                <DeviceDetail
                    {device}
                    latest={state.latest.clone()}
                    fetching={state.fetching_latest}
                    tab={state.active_tab}
                    last_refreshed={state.last_refreshed}
                    {on_tab}
                    {on_close}
                    {on_refresh}
                    {on_control}
                />
            }
        </div>
    }
}
