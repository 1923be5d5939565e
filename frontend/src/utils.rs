use chrono::{DateTime, Local, Utc};
use std::time::Duration;

pub fn local_date(ts: Option<DateTime<Utc>>) -> String {
    common::snapshot::format_date(ts, &Local)
}

pub fn local_time(ts: DateTime<Utc>) -> String {
    DateTime::<Local>::from(ts).format("%H:%M:%S").to_string()
}

/// "3h 12m ago", minute resolution.
pub fn ago(ts: Option<DateTime<Utc>>) -> Option<String> {
    let elapsed = (Utc::now() - ts?).num_minutes().max(0) as u64;
    if elapsed == 0 {
        return Some("just now".to_owned());
    }
    let elapsed = humantime::format_duration(Duration::from_secs(elapsed * 60));
    Some(format!("{elapsed} ago"))
}

/// Errors thrown by browser APIs carry no Rust type; keep their text.
pub fn js_err(err: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow::anyhow!(err
        .as_string()
        .or_else(|| js_sys::JSON::stringify(&err).ok().and_then(|s| s.as_string()))
        .unwrap_or_else(|| "unknown javascript error".to_owned()))
}

/// Plain JS object for option bags handed to JS libraries.
pub fn to_js<T: serde::Serialize>(value: &T) -> anyhow::Result<wasm_bindgen::JsValue> {
    js_sys::JSON::parse(&serde_json::to_string(value)?).map_err(js_err)
}
