use anyhow::Result;
use async_trait::async_trait;

use crate::intake::IntakeRecord;

/// Durable storage for the in-progress intake form.
///
/// The wizard persists after every mutation and awaits the write before
/// signalling success, so an implementation must not buffer writes past
/// the returned future.
#[async_trait]
pub trait DraftStorePort: Send + Sync {
    /// Load the persisted draft, or `None` if none was saved yet.
    async fn load(&self) -> Result<Option<IntakeRecord>>;

    /// Durably persist the whole draft.
    async fn save(&self, draft: &IntakeRecord) -> Result<()>;

    /// Remove the persisted draft. Clearing a missing draft is a no-op.
    async fn clear(&self) -> Result<()>;
}
