use std::rc::Rc;

use chrono::Local;
use common::{
    chart::{self, ChartRow, ChartStatus, ChartTab},
    req::DeviceId,
};
use yew::prelude::*;

use super::chart_plotly::ChartPlotly;
use crate::request;

const FETCH_FAILED: &str = "Failed to fetch data";

#[derive(Properties, PartialEq)]
pub struct Props {
    pub device_id: Option<DeviceId>,
}

/// Telemetry history of one device, one tab per sensor group.
#[function_component(Analysis)]
pub fn analysis(props: &Props) -> Html {
    let rows = use_state(|| Rc::new(Vec::<ChartRow>::new()));
    let loading = use_state(|| props.device_id.is_some());
    let error = use_state(|| None::<&'static str>);
    let tab = use_state(ChartTab::default);

    // requests
    {
        let rows = rows.clone();
        let loading = loading.clone();
        let error = error.clone();
        use_effect_with(props.device_id, move |device_id| {
            if let Some(id) = *device_id {
                loading.set(true);
                error.set(None);
                wasm_bindgen_futures::spawn_local(async move {
                    match request::streetgard_data_for_device(id).await {
                        Ok(samples) => {
                            log::debug!("{} samples for street guard {id}", samples.len());
                            rows.set(Rc::new(chart::chart_rows(&samples, &Local)));
                        }
                        Err(err) => {
                            log::error!("Error fetching telemetry of {id}: {err:#}");
                            error.set(Some(FETCH_FAILED));
                        }
                    }
                    loading.set(false);
                });
            }
            || ()
        });
    }

    let status = chart::chart_status(props.device_id, *loading, *error, &rows);
    if let Some(placeholder) = status.placeholder() {
        let class = match status {
            ChartStatus::Failed(_) => "chart-placeholder chart-error",
            _ => "chart-placeholder",
        };
        return html! { <div {class}>{placeholder.to_owned()}</div> };
    }

    let tabs = ChartTab::ALL.iter().map(|&t| {
        let onclick = {
            let tab = tab.clone();
            Callback::from(move |_: MouseEvent| tab.set(t))
        };
        html! {
            <button type="button" class={classes!("tab", (*tab == t).then_some("active"))} {onclick}>
                {t.label()}
            </button>
        }
    });

    html! {
        <div class="analysis">
            <div class="tabs">{ for tabs }</div>
            <div class="chart-grid">
                { for tab.panels().iter().map(|panel| html! {
                    <ChartPlotly key={panel.id} {panel} rows={(*rows).clone()} />
                }) }
            </div>
        </div>
    }
}
