use anyhow::{anyhow, Result};
use common::{
    geo::{plan_map, LatLng, MapPlan, MarkerIcon, MarkerPlan, Viewport},
    req::{Device, DeviceId},
};
use serde::Serialize;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};
use yew::prelude::*;
use yew_router::prelude::*;

use super::{fleet::DeepLink, leaflet};
use crate::{config, request, utils, Route};

const BLINKING_STYLE_ID: &str = "blinking-style";
const BLINKING_STYLE: &str = r#"
@keyframes blink {
  0% { opacity: 1; }
  50% { opacity: 0.3; }
  100% { opacity: 1; }
}
.blinking-circle {
  animation: blink 1.5s infinite;
  border-radius: 50%;
  background-color: #ef4444;
  border: 2px solid white;
  box-shadow: 0 0 8px rgba(0, 0, 0, 0.5);
}
"#;
const ALERT_HTML: &str =
    r#"<div class="blinking-circle" style="width: 16px; height: 16px;"></div>"#;

/// Registers the blinking marker animation once per document.
fn ensure_blinking_style(document: &Document) -> Result<()> {
    if document.get_element_by_id(BLINKING_STYLE_ID).is_some() {
        return Ok(());
    }
    let style = document.create_element("style").map_err(utils::js_err)?;
    style.set_id(BLINKING_STYLE_ID);
    style.set_text_content(Some(BLINKING_STYLE));
    document
        .head()
        .ok_or_else(|| anyhow!("document has no head"))?
        .append_child(&style)
        .map_err(utils::js_err)?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IconOptions {
    icon_url: &'static str,
    icon_size: [u32; 2],
    icon_anchor: [i32; 2],
    popup_anchor: [i32; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DivIconOptions {
    html: &'static str,
    class_name: &'static str,
    icon_size: [u32; 2],
    icon_anchor: [u32; 2],
}

#[derive(Serialize)]
struct TileOptions {
    attribution: &'static str,
}

#[derive(Serialize)]
struct FitOptions {
    padding: [u32; 2],
}

fn lat_lng(p: LatLng) -> Result<JsValue> {
    utils::to_js(&p.to_array())
}

fn marker_icon(icon: MarkerIcon) -> Result<leaflet::Icon> {
    Ok(leaflet::icon(&utils::to_js(&IconOptions {
        icon_url: icon.url(),
        icon_size: MarkerIcon::SIZE,
        icon_anchor: MarkerIcon::ANCHOR,
        popup_anchor: MarkerIcon::POPUP_ANCHOR,
    })?))
}

fn marker_options(icon: &leaflet::Icon, interactive: bool) -> Result<JsValue> {
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"icon".into(), icon.as_ref()).map_err(utils::js_err)?;
    js_sys::Reflect::set(&options, &"interactive".into(), &interactive.into())
        .map_err(utils::js_err)?;
    Ok(options.into())
}

fn text_element(document: &Document, tag: &str, class: &str, text: &str) -> Result<Element> {
    let el = document.create_element(tag).map_err(utils::js_err)?;
    el.set_class_name(class);
    el.set_text_content(Some(text));
    Ok(el)
}

type ClickHandler = Closure<dyn FnMut(web_sys::Event)>;

/// Popup body; the link is routed in-app instead of reloading the page.
fn popup_content(
    document: &Document,
    marker: &MarkerPlan,
    on_details: &Callback<DeviceId>,
) -> Result<(HtmlElement, ClickHandler)> {
    let popup = &marker.popup;
    let root = document.create_element("div").map_err(utils::js_err)?;
    root.set_class_name("map-popup");

    root.append_child(&text_element(document, "h3", "", &popup.title)?.into())
        .map_err(utils::js_err)?;

    let status = text_element(document, "p", "", "")?;
    status
        .append_child(&text_element(document, "strong", "", "Status: ")?.into())
        .map_err(utils::js_err)?;
    let status_value = text_element(document, "span", "", popup.status.label())?;
    status_value
        .set_attribute("style", &format!("color: {}", popup.status.color()))
        .map_err(utils::js_err)?;
    status.append_child(&status_value).map_err(utils::js_err)?;
    root.append_child(&status).map_err(utils::js_err)?;

    let updated = text_element(document, "p", "", "")?;
    updated
        .append_child(&text_element(document, "strong", "", "Last Updated: ")?.into())
        .map_err(utils::js_err)?;
    updated
        .append_child(&document.create_text_node(&utils::local_date(popup.last_updated)))
        .map_err(utils::js_err)?;
    root.append_child(&updated).map_err(utils::js_err)?;

    let link = text_element(document, "a", "popup-button", "View Details")?;
    link.set_attribute("href", &popup.details_link)
        .map_err(utils::js_err)?;
    let handler = {
        let on_details = on_details.clone();
        let device_id = marker.device_id;
        Closure::<dyn FnMut(web_sys::Event)>::new(move |e: web_sys::Event| {
            e.prevent_default();
            on_details.emit(device_id);
        })
    };
    link.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
        .map_err(utils::js_err)?;
    root.append_child(&link).map_err(utils::js_err)?;

    let root = root
        .dyn_into::<HtmlElement>()
        .map_err(|_| anyhow!("popup root is not an html element"))?;
    Ok((root, handler))
}

/// A drawn map; dropping it releases the popup handlers.
struct DrawnMap {
    map: leaflet::Map,
    _handlers: Vec<ClickHandler>,
}

impl Drop for DrawnMap {
    fn drop(&mut self) {
        self.map.remove();
    }
}

fn draw(container: &HtmlElement, plan: &MapPlan, on_details: &Callback<DeviceId>) -> Result<DrawnMap> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow!("no document"))?;
    ensure_blinking_style(&document)?;

    let map = leaflet::map(container, &js_sys::Object::new().into()).map_err(utils::js_err)?;
    let (tiles, attribution) = config::map_tiles();
    leaflet::tile_layer(tiles, &utils::to_js(&TileOptions { attribution })?).add_to(&map);

    let active_icon = marker_icon(MarkerIcon::Active)?;
    let inactive_icon = marker_icon(MarkerIcon::Inactive)?;
    let alert_icon = leaflet::div_icon(&utils::to_js(&DivIconOptions {
        html: ALERT_HTML,
        class_name: "",
        icon_size: [16, 16],
        icon_anchor: [8, 8],
    })?);

    let mut handlers = Vec::with_capacity(plan.markers.len());
    for m in &plan.markers {
        let icon = match m.icon {
            MarkerIcon::Active => &active_icon,
            MarkerIcon::Inactive => &inactive_icon,
        };
        let marker = leaflet::marker(&lat_lng(m.position)?, &marker_options(icon, true)?).add_to(&map);

        if let Some(alert) = m.alert {
            leaflet::marker(&lat_lng(alert)?, &marker_options(&alert_icon, false)?).add_to(&map);
        }

        let (content, handler) = popup_content(&document, m, on_details)?;
        marker.bind_popup(&content);
        handlers.push(handler);
    }

    match plan.viewport {
        Viewport::Fit { bounds, padding } => {
            let corners = [bounds.south_west.to_array(), bounds.north_east.to_array()];
            map.fit_bounds(&utils::to_js(&corners)?, &utils::to_js(&FitOptions { padding })?);
        }
        Viewport::Center { center, zoom } => {
            map.set_view(&lat_lng(center)?, zoom as f64);
        }
    }

    Ok(DrawnMap {
        map,
        _handlers: handlers,
    })
}

#[function_component(MapDisplay)]
pub fn map_display() -> Html {
    let devices = use_state(|| None::<Vec<Device>>);
    let container = use_node_ref();
    let navigator = use_navigator();

    // requests
    {
        let devices = devices.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match request::streetgard_list().await {
                    Ok(list) => {
                        log::debug!("street guards on map: {}", list.len());
                        devices.set(Some(list));
                    }
                    Err(err) => {
                        log::error!("Error fetching street guards: {err:#}");
                        devices.set(Some(vec![]));
                    }
                }
            });
            || ()
        });
    }

    let on_details = Callback::from(move |id: DeviceId| {
        if let Some(navigator) = &navigator {
            if let Err(err) = navigator.push_with_query(&Route::Controller, &DeepLink { id }) {
                log::error!("cannot open device {id}: {err}");
            }
        }
    });

    {
        let container = container.clone();
        use_effect_with((*devices).clone(), move |devices| {
            let drawn = devices.as_deref().and_then(|devices| {
                let el = container.cast::<HtmlElement>()?;
                draw(&el, &plan_map(devices), &on_details)
                    .map_err(|err| log::error!("cannot draw map: {err:#}"))
                    .ok()
            });
            move || drop(drawn)
        });
    }

    if devices.is_none() {
        return html! {
            <div class="map-loading">
                <div class="spinner"></div>
                <p>{"Loading map data..."}</p>
            </div>
        };
    }

    html! {
        <div class="map-frame">
            <div class="map" ref={container}></div>
        </div>
    }
}
