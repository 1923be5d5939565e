//! Marker and viewport planning for the fleet map.
//!
//! Everything here is independent of the map library: the frontend turns a
//! [`MapPlan`] into Leaflet calls.

use chrono::{DateTime, Utc};

use crate::req::{Device, DeviceId};
use crate::snapshot::BulbStatus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

/// Plotted for devices that never reported a usable GPS fix.
pub const FALLBACK_POSITION: LatLng = LatLng::new(13.073697, 77.499855);
pub const FALLBACK_ZOOM: u8 = 5;
pub const FIT_PADDING: [u32; 2] = [50, 50];

/// Blinking alert overlay sits just beside the marker it belongs to.
pub const ALERT_OFFSET: LatLng = LatLng::new(0.000001, -0.00001);

fn usable(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite() && *v != 0.0)
}

/// Last known position, or [`FALLBACK_POSITION`] when either coordinate is
/// missing, zero or not finite.
pub fn display_position(device: &Device) -> LatLng {
    match (usable(device.latest_latitude), usable(device.latest_longitude)) {
        (Some(lat), Some(lng)) => LatLng::new(lat, lng),
        _ => FALLBACK_POSITION,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn contains(&self, p: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }
}

/// Bounding box of all points; `None` for an empty set.
pub fn bounds_of(points: impl IntoIterator<Item = LatLng>) -> Option<Bounds> {
    points.into_iter().fold(None, |acc, p| match acc {
        None => Some(Bounds::from_point(p)),
        Some(mut b) => {
            b.extend(p);
            Some(b)
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    Fit { bounds: Bounds, padding: [u32; 2] },
    Center { center: LatLng, zoom: u8 },
}

pub fn viewport_for(points: impl IntoIterator<Item = LatLng>) -> Viewport {
    match bounds_of(points) {
        Some(bounds) => Viewport::Fit {
            bounds,
            padding: FIT_PADDING,
        },
        None => Viewport::Center {
            center: FALLBACK_POSITION,
            zoom: FALLBACK_ZOOM,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerIcon {
    Active,
    Inactive,
}

impl MarkerIcon {
    pub const SIZE: [u32; 2] = [46, 46];
    pub const ANCHOR: [i32; 2] = [16, 32];
    pub const POPUP_ANCHOR: [i32; 2] = [0, -32];

    pub fn for_status(status: BulbStatus) -> Self {
        match status {
            BulbStatus::Active => MarkerIcon::Active,
            BulbStatus::Inactive => MarkerIcon::Inactive,
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            MarkerIcon::Active => "https://cdn-icons-png.flaticon.com/512/9830/9830827.png",
            MarkerIcon::Inactive => "https://cdn-icons-png.freepik.com/512/2967/2967033.png",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub status: BulbStatus,
    pub last_updated: Option<DateTime<Utc>>,
    pub details_link: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPlan {
    pub device_id: DeviceId,
    pub position: LatLng,
    pub icon: MarkerIcon,
    /// Position of the non-interactive blinking overlay, inactive devices only.
    pub alert: Option<LatLng>,
    pub popup: Popup,
}

impl MarkerPlan {
    pub fn for_device(device: &Device) -> Self {
        let position = display_position(device);
        let status = BulbStatus::of_device(device);
        let alert = (status == BulbStatus::Inactive).then(|| {
            LatLng::new(position.lat + ALERT_OFFSET.lat, position.lng + ALERT_OFFSET.lng)
        });

        Self {
            device_id: device.id,
            position,
            icon: MarkerIcon::for_status(status),
            alert,
            popup: Popup {
                title: device.name.clone(),
                status,
                last_updated: device.latest_updated_time,
                details_link: details_link(device.id),
            },
        }
    }
}

/// Fleet view location that opens the device's detail modal.
pub fn details_link(id: DeviceId) -> String {
    format!("/controller?id={id}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPlan {
    pub markers: Vec<MarkerPlan>,
    pub viewport: Viewport,
}

pub fn plan_map(devices: &[Device]) -> MapPlan {
    let markers: Vec<_> = devices.iter().map(MarkerPlan::for_device).collect();
    let viewport = viewport_for(markers.iter().map(|m| m.position));
    MapPlan { markers, viewport }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: DeviceId, lat: Option<f64>, lng: Option<f64>, bulb: Option<bool>) -> Device {
        Device {
            id,
            name: format!("SG-{id}"),
            uuid: None,
            img: None,
            created_time: None,
            updated_time: None,
            api_url: None,
            latest_bulb_status: bulb,
            latest_latitude: lat,
            latest_longitude: lng,
            latest_updated_time: None,
        }
    }

    #[test]
    fn devices_without_coordinates_use_fallback() {
        for dev in [
            device(1, None, None, None),
            device(2, Some(0.0), Some(0.0), Some(true)),
            device(3, Some(12.9), None, Some(false)),
            device(4, Some(f64::NAN), Some(77.0), None),
            device(5, Some(0.0), Some(77.0), None),
        ] {
            assert_eq!(display_position(&dev), FALLBACK_POSITION, "device {}", dev.id);
        }
    }

    #[test]
    fn reported_coordinates_are_used() {
        let dev = device(1, Some(12.97), Some(77.59), Some(true));
        assert_eq!(display_position(&dev), LatLng::new(12.97, 77.59));
    }

    #[test]
    fn empty_fleet_centers_on_fallback() {
        let plan = plan_map(&[]);
        assert!(plan.markers.is_empty());
        assert_eq!(
            plan.viewport,
            Viewport::Center {
                center: FALLBACK_POSITION,
                zoom: FALLBACK_ZOOM
            }
        );
    }

    #[test]
    fn viewport_fits_all_markers() {
        let plan = plan_map(&[
            device(1, Some(12.0), Some(77.0), Some(true)),
            device(2, Some(14.5), Some(76.0), Some(true)),
            device(3, None, None, Some(true)),
        ]);
        let Viewport::Fit { bounds, padding } = plan.viewport else {
            panic!("expected a fitted viewport");
        };
        assert_eq!(padding, FIT_PADDING);
        assert_eq!(bounds.south_west, LatLng::new(12.0, 76.0));
        assert_eq!(bounds.north_east, LatLng::new(14.5, 77.499855));
        for m in &plan.markers {
            assert!(bounds.contains(m.position));
        }
    }

    #[test]
    fn inactive_devices_get_a_blinking_overlay() {
        let plan = plan_map(&[
            device(1, Some(12.0), Some(77.0), Some(true)),
            device(2, Some(12.0), Some(77.0), Some(false)),
            device(3, Some(12.0), Some(77.0), None),
        ]);
        assert_eq!(plan.markers[0].alert, None);
        let alert = plan.markers[1].alert.unwrap();
        assert!((alert.lat - 12.000001).abs() < 1e-12);
        assert!((alert.lng - 76.99999).abs() < 1e-12);
        assert_eq!(plan.markers[2].icon, MarkerIcon::Inactive);
        assert!(plan.markers[2].alert.is_some());
    }

    #[test]
    fn popup_links_into_fleet_view() {
        let plan = plan_map(&[device(42, None, None, Some(true))]);
        assert_eq!(plan.markers[0].popup.details_link, "/controller?id=42");
        assert_eq!(plan.markers[0].popup.title, "SG-42");
        assert_eq!(plan.markers[0].popup.status.label(), "Active");
    }
}
