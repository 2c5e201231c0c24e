pub mod api;
pub mod catalog;
pub mod engine;
pub mod gate;
pub mod model;
pub mod query;
pub mod roster;
pub mod store;

use std::sync::Arc;

use axum::Router;
use prizedesk_core::{Module, ServiceError};
use prizedesk_sql::SQLStore;

pub use catalog::{Catalog, CatalogError, PrizeTier};
pub use engine::AllocationEngine;
pub use gate::{EventGate, EventWindow};
pub use model::AllocationResult;
pub use query::AwardQuery;
pub use roster::{RosterLookup, RosterStore};
pub use store::AwardStore;

use api::AwardState;

/// The Award module: prize allocation, winner queries and the employee roster.
///
/// All components share one SQL store. The module owns the schema and
/// initialises it on construction.
pub struct AwardModule {
    state: AwardState,
}

impl AwardModule {
    pub fn new(
        db: Arc<dyn SQLStore>,
        catalog: Catalog,
        gate: Arc<dyn EventGate>,
    ) -> Result<Self, ServiceError> {
        let store = Arc::new(AwardStore::new(Arc::clone(&db))?);
        let roster = Arc::new(RosterStore::new(db));
        let catalog = Arc::new(catalog);

        let engine = Arc::new(AllocationEngine::new(
            Arc::clone(&store),
            Arc::clone(&roster) as Arc<dyn RosterLookup>,
            Arc::clone(&catalog),
        ));
        let query = Arc::new(AwardQuery::new(store, Arc::clone(&roster), catalog));

        Ok(Self {
            state: AwardState {
                engine,
                query,
                roster,
                gate,
            },
        })
    }

    pub fn engine(&self) -> &Arc<AllocationEngine> {
        &self.state.engine
    }

    pub fn query(&self) -> &Arc<AwardQuery> {
        &self.state.query
    }

    pub fn roster(&self) -> &Arc<RosterStore> {
        &self.state.roster
    }
}

impl Module for AwardModule {
    fn name(&self) -> &str {
        "award"
    }

    fn routes(&self) -> Router {
        api::router(self.state.clone())
    }
}
