//! Build-time configuration, taken from the environment `trunk` runs in.

use log::Level;

pub const SITE_NAME: &str = "Street Guard";

const DEFAULT_BACKEND_PORT: u16 = 8000;
const DEFAULT_TILES: &str = "https://mt1.google.com/vt/lyrs=m&x={x}&y={y}&z={z}";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.google.com/maps\">Google Maps</a> contributors";

/// API base URL without trailing slash.
///
/// Falls back to the host serving the page when `STREETGARD_BACKEND_URL` is unset.
pub fn backend_url() -> String {
    match option_env!("STREETGARD_BACKEND_URL") {
        Some(url) if !url.is_empty() => url.trim_end_matches('/').to_owned(),
        _ => page_host_url(),
    }
}

fn page_host_url() -> String {
    let location = web_sys::window().map(|w| w.location());
    let protocol = location
        .as_ref()
        .and_then(|l| l.protocol().ok())
        .unwrap_or_else(|| "http:".to_owned());
    let hostname = location
        .as_ref()
        .and_then(|l| l.hostname().ok())
        .unwrap_or_else(|| "127.0.0.1".to_owned());
    format!("{protocol}//{hostname}:{DEFAULT_BACKEND_PORT}")
}

pub fn camera_feed_url() -> Option<&'static str> {
    option_env!("STREETGARD_CAMERA_FEED_URL").filter(|url| !url.is_empty())
}

pub fn map_tiles() -> (&'static str, &'static str) {
    match option_env!("STREETGARD_MAP_TILES") {
        Some(url) if !url.is_empty() => (url, ""),
        _ => (DEFAULT_TILES, TILE_ATTRIBUTION),
    }
}

pub fn log_level() -> Level {
    option_env!("STREETGARD_LOG_LEVEL")
        .and_then(|l| l.parse().ok())
        .unwrap_or(Level::Info)
}
