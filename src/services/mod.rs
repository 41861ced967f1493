pub mod providers;
pub mod recommendations;

pub use providers::{DataSources, EventCatalog, PgStore, SnapshotStore, UserDirectory};
pub use recommendations::RecommendationService;
