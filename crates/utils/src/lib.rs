pub mod config;
pub mod limiter;
pub mod logging;
pub mod tracing;

// ERROR REPORT
// ================================================================================================

/// Renders an error together with its full chain of sources.
///
/// `thiserror` variants typically only describe their own layer and delegate the details to a
/// `#[source]`. The default `Display` output therefore loses most of the context once the error is
/// logged or attached to a span.
pub trait ErrorReport: std::error::Error {
    /// Returns a string containing the error and all of its sources, separated by `: `.
    fn as_report(&self) -> String {
        use std::fmt::Write;

        let mut report = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            let _ = write!(report, ": {err}");
            source = err.source();
        }
        report
    }

    /// Same as [`ErrorReport::as_report`] but prefixed with the given context.
    fn as_report_context(&self, context: &'static str) -> String {
        format!("{context}: {}", self.as_report())
    }
}

impl<T: std::error::Error + ?Sized> ErrorReport for T {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::ErrorReport;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn report_walks_the_source_chain() {
        let err = Outer(Inner);
        assert_eq!(err.as_report(), "outer: inner");
        assert_eq!(err.as_report_context("lookup failed"), "lookup failed: outer: inner");
    }
}
