//! Map View Binder: keeps one marker per located problem on the map widget.
//!
//! Every change to the problem collection tears down all markers and rebuilds
//! them. At demo scale that is the simplest correct policy; a large collection
//! would want incremental updates keyed by problem id instead.

pub mod geocode;
pub mod handlers;
pub mod widget;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::problem::{Problem, ProblemStatus};
use crate::problems::ProblemStore;
use widget::{InfoPopup, LatLng, MapWidget, MarkerIcon, MarkerId, MarkerSpec, StatusBadge};

/// Initial viewport: centred on India.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 20.5937,
    lng: 78.9629,
};
pub const DEFAULT_ZOOM: u8 = 5;

pub fn marker_color(status: ProblemStatus) -> &'static str {
    match status {
        ProblemStatus::Open => "#6b3fd6",
        ProblemStatus::InProgress => "#3b82f6",
        ProblemStatus::Resolved => "#6b7280",
    }
}

pub fn status_badge(status: ProblemStatus) -> StatusBadge {
    let (background, foreground) = match status {
        ProblemStatus::Open => ("#dcfce7", "#166534"),
        ProblemStatus::InProgress => ("#dbeafe", "#1e40af"),
        ProblemStatus::Resolved => ("#f3f4f6", "#4b5563"),
    };
    StatusBadge {
        label: status.as_str().to_string(),
        background: background.to_string(),
        foreground: foreground.to_string(),
    }
}

/// Marker for a problem, or `None` when it has no location.
pub fn marker_for(problem: &Problem) -> Option<MarkerSpec> {
    let location = problem.location.as_ref()?;
    Some(MarkerSpec {
        position: LatLng {
            lat: location.lat,
            lng: location.lng,
        },
        title: problem.title.clone(),
        icon: MarkerIcon::circle(marker_color(problem.status)),
        popup: InfoPopup {
            title: problem.title.clone(),
            category: problem.category.clone(),
            address: location.address.clone().unwrap_or_default(),
            status: status_badge(problem.status),
        },
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedMarker {
    pub marker_id: MarkerId,
    pub problem_id: String,
    #[serde(flatten)]
    pub spec: MarkerSpec,
}

/// Result of clicking a marker: its popup is open and the client should move
/// to `navigate_to` once `navigate_after_ms` has elapsed.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerClick {
    pub marker_id: MarkerId,
    pub problem_id: String,
    pub popup: InfoPopup,
    pub navigate_to: String,
    pub navigate_after_ms: u64,
}

struct Binding {
    widget: Box<dyn MapWidget>,
    /// Markers currently on the widget, in problem order.
    placed: Vec<(MarkerId, String)>,
    /// Store revision the markers were last rebuilt from.
    synced_revision: Option<u64>,
}

impl Binding {
    fn rebuild(&mut self, problems: &[Problem]) -> usize {
        let stale = std::mem::take(&mut self.placed);
        for (marker_id, _) in &stale {
            self.widget.remove_marker(*marker_id);
        }

        for problem in problems {
            if let Some(spec) = marker_for(problem) {
                let marker_id = self.widget.add_marker(spec);
                self.placed.push((marker_id, problem.id.clone()));
            }
        }

        debug!("Map resynced: {} removed, {} placed", stale.len(), self.placed.len());
        self.placed.len()
    }
}

#[derive(Clone)]
pub struct MapBinder {
    binding: Arc<Mutex<Binding>>,
    navigate_delay: Duration,
}

impl MapBinder {
    pub fn new(widget: Box<dyn MapWidget>, navigate_delay: Duration) -> Self {
        Self {
            binding: Arc::new(Mutex::new(Binding {
                widget,
                placed: Vec::new(),
                synced_revision: None,
            })),
            navigate_delay,
        }
    }

    /// Removes every marker, then places one per located problem.
    /// Returns the number of markers now on the map.
    pub async fn sync(&self, problems: &[Problem]) -> usize {
        let mut binding = self.binding.lock().await;
        binding.synced_revision = None;
        binding.rebuild(problems)
    }

    /// Rebuilds from the store unless the markers already reflect its current
    /// revision. Readers call this first so they never see a lagging layer.
    pub async fn catch_up(&self, store: &ProblemStore) -> usize {
        let mut binding = self.binding.lock().await;
        // Read the revision before the snapshot: the snapshot is at least that new.
        let revision = store.revision();
        if binding.synced_revision == Some(revision) {
            return binding.placed.len();
        }
        let placed = binding.rebuild(&store.all().await);
        binding.synced_revision = Some(revision);
        placed
    }

    /// Resyncs on every store revision. Meant to be spawned for the life of the process.
    pub async fn run(self, store: ProblemStore) {
        let mut revisions = store.subscribe();
        let placed = self.catch_up(&store).await;
        info!("Map binder started with {placed} markers");

        while revisions.changed().await.is_ok() {
            self.catch_up(&store).await;
        }
        debug!("Problem store closed; map binder stopping");
    }

    pub async fn markers(&self) -> Vec<PlacedMarker> {
        let binding = self.binding.lock().await;
        binding
            .placed
            .iter()
            .filter_map(|(marker_id, problem_id)| {
                binding.widget.marker(*marker_id).map(|spec| PlacedMarker {
                    marker_id: *marker_id,
                    problem_id: problem_id.clone(),
                    spec: spec.clone(),
                })
            })
            .collect()
    }

    pub async fn marker_count(&self) -> usize {
        self.binding.lock().await.widget.marker_count()
    }

    /// Opens the marker's popup and returns where to navigate. `None` for unknown markers.
    pub async fn click(&self, marker_id: MarkerId) -> Option<MarkerClick> {
        let mut binding = self.binding.lock().await;
        let problem_id = binding
            .placed
            .iter()
            .find(|(id, _)| *id == marker_id)
            .map(|(_, problem_id)| problem_id.clone())?;

        if !binding.widget.open_popup(marker_id) {
            return None;
        }
        let popup = binding.widget.marker(marker_id)?.popup.clone();

        Some(MarkerClick {
            marker_id,
            navigate_to: format!("/problems/{problem_id}"),
            problem_id,
            popup,
            navigate_after_ms: u64::try_from(self.navigate_delay.as_millis()).unwrap_or(u64::MAX),
        })
    }
}
