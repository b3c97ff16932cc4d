//! The map widget boundary: markers with icons and info popups.
//!
//! `MapWidget` is the surface the binder drives. `InMemoryMapWidget` keeps the
//! marker layer in process so it can be served to whatever client draws the map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerIcon {
    pub shape: String,
    pub scale: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_weight: f64,
}

impl MarkerIcon {
    pub fn circle(fill_color: &str) -> Self {
        Self {
            shape: "circle".to_string(),
            scale: 10.0,
            fill_color: fill_color.to_string(),
            fill_opacity: 0.7,
            stroke_color: "white".to_string(),
            stroke_weight: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusBadge {
    pub label: String,
    pub background: String,
    pub foreground: String,
}

/// Content of the popup attached to a marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfoPopup {
    pub title: String,
    pub category: String,
    pub address: String,
    pub status: StatusBadge,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub title: String,
    pub icon: MarkerIcon,
    pub popup: InfoPopup,
}

pub trait MapWidget: Send {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerId;
    /// Detaches the marker. Unknown ids are ignored.
    fn remove_marker(&mut self, id: MarkerId);
    /// Opens the marker's popup, closing any other. Returns false for unknown ids.
    fn open_popup(&mut self, id: MarkerId) -> bool;
    fn marker(&self, id: MarkerId) -> Option<&MarkerSpec>;
    fn marker_count(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemoryMapWidget {
    next_id: u64,
    markers: BTreeMap<MarkerId, MarkerSpec>,
    open_popup: Option<MarkerId>,
}

impl InMemoryMapWidget {
    #[cfg(test)]
    pub fn open_popup_id(&self) -> Option<MarkerId> {
        self.open_popup
    }
}

impl MapWidget for InMemoryMapWidget {
    fn add_marker(&mut self, spec: MarkerSpec) -> MarkerId {
        self.next_id += 1;
        let id = MarkerId(self.next_id);
        self.markers.insert(id, spec);
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
        if self.open_popup == Some(id) {
            self.open_popup = None;
        }
    }

    fn open_popup(&mut self, id: MarkerId) -> bool {
        if !self.markers.contains_key(&id) {
            return false;
        }
        self.open_popup = Some(id);
        true
    }

    fn marker(&self, id: MarkerId) -> Option<&MarkerSpec> {
        self.markers.get(&id)
    }

    fn marker_count(&self) -> usize {
        self.markers.len()
    }
}
