pub mod analysis;
pub mod camera;
pub mod chart_plotly;
pub mod create_device;
pub mod detail;
pub mod fleet;
pub mod leaflet;
pub mod map;
pub mod toast;
