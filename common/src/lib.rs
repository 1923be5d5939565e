//! Data model and view logic shared by the street guard dashboard.

pub mod chart;
pub mod fleet;
pub mod form;
pub mod geo;
pub mod req;
pub mod snapshot;
