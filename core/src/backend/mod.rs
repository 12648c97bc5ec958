//! Data source collaborator
//!
//! The engine only sees the [`Backend`] trait: full-dataset pulls, per-entity
//! detail fetches, pause control and reset. [`HttpBackend`] talks to the
//! collector's REST API; tests substitute an in-memory implementation.

mod error;
mod http;
mod poller;

pub use error::BackendError;
pub use http::{HttpBackend, normalize_base_url};
pub use poller::spawn_poller;

use std::future::Future;

use crate::dataset::{Dataset, DetailBlock, EntityId};

pub trait Backend: Clone + Send + Sync + 'static {
    /// Current full dataset.
    fn pull(&self) -> impl Future<Output = Result<Dataset, BackendError>> + Send;

    /// Skill breakdown for one entity. A block without skills means the
    /// backend has nothing for it yet.
    fn fetch_detail(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<DetailBlock, BackendError>> + Send;

    fn set_paused(&self, paused: bool) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn is_paused(&self) -> impl Future<Output = Result<bool, BackendError>> + Send;

    /// Clear backend-side accumulation.
    fn reset(&self) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}
