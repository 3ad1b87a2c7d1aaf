use async_trait::async_trait;

/// Hook invoked after a successful write so cached output for `path` can be
/// recomputed on next access.
///
/// Fire-and-forget: implementations swallow their own failures.
#[async_trait]
pub trait PathRevalidator: Send + Sync {
    async fn revalidate_path(&self, path: &str);
}

/// Revalidator for deployments without a render cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRevalidator;

#[async_trait]
impl PathRevalidator for NoopRevalidator {
    async fn revalidate_path(&self, path: &str) {
        tracing::trace!(path = %path, "No render cache configured, skipping revalidation");
    }
}
