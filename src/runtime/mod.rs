//! Runtime adapters and read-model API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{list_queues, snapshot_queues, QueueSnapshot};
pub use tokio_spawner::TokioSpawner;
