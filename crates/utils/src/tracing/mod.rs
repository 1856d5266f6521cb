mod span_ext;

pub use span_ext::{OpenTelemetrySpanExt, ToValue};
