//! Limits for oracle query parameters.
//!
//! # Rationale
//! - Note queries arrive from circuits with fixed-size select and sort arrays. The active part of
//!   those arrays is bounded by the circuit layout, so anything larger is a malformed request.
//! - `storage_read` issues one remote lookup per slot, strictly in sequence. Bounding the slot
//!   count bounds the number of round trips a single oracle call can cause.
//!
//! Add new limits here so callers share the same values and rationale.

/// Maximum number of select predicates or sort keys a note query may carry.
pub const MAX_NOTE_QUERY_KEYS: usize = 10;

/// Maximum number of consecutive public storage slots a single read may request.
pub const MAX_STORAGE_READ_SLOTS: usize = 4096;

#[allow(missing_docs)]
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("parameter {which} exceeded limit {limit}: {size}")]
pub struct QueryLimitError {
    which: &'static str,
    size: usize,
    limit: usize,
}

/// Checks limits against the desired query parameters, per query parameter and
/// bails if they exceed a defined value.
pub trait QueryParamLimiter {
    /// Name of the parameter to mention in the error.
    const PARAM_NAME: &'static str;
    /// Limit that causes a bail if exceeded.
    const LIMIT: usize;
    /// Do the actual check.
    fn check(size: usize) -> Result<(), QueryLimitError> {
        if size > Self::LIMIT {
            Err(QueryLimitError {
                which: Self::PARAM_NAME,
                size,
                limit: Self::LIMIT,
            })?;
        }
        Ok(())
    }
}

/// Used for the `num_selects` argument of note queries.
pub struct QueryParamNoteSelectLimit;
impl QueryParamLimiter for QueryParamNoteSelectLimit {
    const PARAM_NAME: &str = "num_selects";
    const LIMIT: usize = MAX_NOTE_QUERY_KEYS;
}

/// Used for the sort keys of note queries.
pub struct QueryParamNoteSortLimit;
impl QueryParamLimiter for QueryParamNoteSortLimit {
    const PARAM_NAME: &str = "sort_by";
    const LIMIT: usize = MAX_NOTE_QUERY_KEYS;
}

/// Used for the slot count of public storage reads.
pub struct QueryParamStorageSlotLimit;
impl QueryParamLimiter for QueryParamStorageSlotLimit {
    const PARAM_NAME: &str = "storage_slots";
    const LIMIT: usize = MAX_STORAGE_READ_SLOTS;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_inclusive() {
        assert!(QueryParamStorageSlotLimit::check(MAX_STORAGE_READ_SLOTS).is_ok());

        let err = QueryParamStorageSlotLimit::check(MAX_STORAGE_READ_SLOTS + 1).unwrap_err();
        assert_eq!(err.to_string(), "parameter storage_slots exceeded limit 4096: 4097");
    }
}
