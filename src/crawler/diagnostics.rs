use crate::FetchError;

/// Receives per-article fetch failures
///
/// Reporting is fire-and-forget: implementations must not block and the
/// pipeline carries on whatever they do.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, project: &str, article: &str, error: &FetchError);
}

/// Writes failures to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, project: &str, article: &str, error: &FetchError) {
        tracing::warn!("failed to retrieve {}:{:?}: {}", project, article, error);
    }
}
