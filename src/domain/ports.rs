use crate::domain::model::{HistoryEntry, InvokerRequest};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Outbound call to the vision-capable language model. One network call per
/// invocation; retry policy belongs to the orchestrator, not here.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Returns the model's raw textual response.
    async fn invoke(&self, request: &InvokerRequest) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn api_key(&self) -> &str;
    fn model_id(&self) -> &str;
    fn max_images(&self) -> usize;
    fn request_timeout(&self) -> Duration;
}

/// Persisted-state interface for the history collaborator. The pipeline has
/// no dependency on this succeeding; a failed write never affects the
/// returned bundle.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn record(&self, entry: &HistoryEntry) -> Result<()>;
}
