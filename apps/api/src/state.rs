use std::sync::Arc;

use crate::assistant::replies::{KeywordReplyEngine, ReplyEngine};
use crate::assistant::AssistantStore;
use crate::config::Config;
use crate::identity::storage::SessionStorage;
use crate::identity::IdentityStore;
use crate::map::geocode::{GazetteerGeocoder, Geocoder};
use crate::map::widget::InMemoryMapWidget;
use crate::map::MapBinder;
use crate::problems::seed::sample_problems;
use crate::problems::votes::VoteLedger;
use crate::problems::ProblemStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Each store is an independent container; handlers only see them through here.
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityStore,
    pub problems: ProblemStore,
    pub assistant: AssistantStore,
    pub map: MapBinder,
    /// Pluggable reverse geocoder. Default: offline gazetteer.
    pub geocoder: Arc<dyn Geocoder>,
    /// Per-user upvote memory used by the upvote handler.
    pub votes: VoteLedger,
    pub config: Config,
}

impl AppState {
    /// Wires the default stores: seeded problems, keyword assistant, in-memory map.
    /// The map binder is not started; spawn `state.map.clone().run(..)` for live resync.
    pub fn build(config: Config, storage: Arc<dyn SessionStorage>) -> Self {
        let engine: Arc<dyn ReplyEngine> = Arc::new(KeywordReplyEngine);
        Self::with_engine(config, storage, engine)
    }

    pub fn with_engine(
        config: Config,
        storage: Arc<dyn SessionStorage>,
        engine: Arc<dyn ReplyEngine>,
    ) -> Self {
        let identity = IdentityStore::restore(storage, config.auth_delay);
        let problems = ProblemStore::new(identity.clone(), sample_problems());
        let assistant = AssistantStore::new(engine, config.assistant_delay);
        let map = MapBinder::new(
            Box::new(InMemoryMapWidget::default()),
            config.marker_navigate_delay,
        );

        Self {
            identity,
            problems,
            assistant,
            map,
            geocoder: Arc::new(GazetteerGeocoder::default()),
            votes: VoteLedger::default(),
            config,
        }
    }
}
