use miden_objects::{Felt, Word};
use opentelemetry::trace::Status;
use opentelemetry::{Key, Value};

use crate::ErrorReport;

/// Utility functions for converting types into [`opentelemetry::Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Word {
    fn to_value(&self) -> Value {
        self.to_hex().into()
    }
}

// Field elements can exceed `i64::MAX`, so they are recorded as their decimal string.
impl ToValue for Felt {
    fn to_value(&self) -> Value {
        self.as_int().to_string().into()
    }
}

/// Generates `impl ToValue` blocks for unsigned integers, saturating at `i64::MAX`.
macro_rules! impl_unsigned_to_value {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    i64::try_from(*self).unwrap_or(i64::MAX).into()
                }
            }
        )*
    };
}
impl_unsigned_to_value!(usize, u64);

impl ToValue for bool {
    fn to_value(&self) -> Value {
        (*self).into()
    }
}

/// Utility functions based on [`tracing_opentelemetry::OpenTelemetrySpanExt`].
///
/// This is a sealed trait and cannot be implemented outside of this module.
pub trait OpenTelemetrySpanExt: private::Sealed {
    fn set_attribute(&self, key: impl Into<Key>, value: impl ToValue);
    fn set_error(&self, err: &dyn std::error::Error);
}

impl<S> OpenTelemetrySpanExt for S
where
    S: tracing_opentelemetry::OpenTelemetrySpanExt,
{
    /// Sets an attribute on `Span`.
    ///
    /// Implementations for `ToValue` should be added to this crate (shroud-utils).
    fn set_attribute(&self, key: impl Into<Key>, value: impl ToValue) {
        tracing_opentelemetry::OpenTelemetrySpanExt::set_attribute(self, key, value.to_value());
    }

    /// Sets a status on `Span` based on an error.
    fn set_error(&self, err: &dyn std::error::Error) {
        tracing_opentelemetry::OpenTelemetrySpanExt::set_status(
            self,
            Status::Error { description: err.as_report().into() },
        );
    }
}

mod private {
    pub trait Sealed {}
    impl<S> Sealed for S where S: tracing_opentelemetry::OpenTelemetrySpanExt {}
}
