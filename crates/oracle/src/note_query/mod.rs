//! Selection, ordering and pagination of decrypted notes.
//!
//! The engine is a pure function of its inputs. Given the same candidate sequence (in the same
//! order) and the same query it always produces the same output, which is what allows a circuit
//! to be re-executed by the prover with identical results.

use std::cmp::Ordering;

use itertools::Itertools;
use miden_objects::Felt;
use shroud_utils::limiter::{QueryParamLimiter, QueryParamNoteSelectLimit, QueryParamNoteSortLimit};

use crate::domain::field::cmp_felts;
use crate::domain::note::NoteRecord;
use crate::errors::OracleError;


// QUERY
// ================================================================================================

/// Direction of a single sort key.
///
/// The discriminants are the codes circuits use to encode the direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum SortOrder {
    /// The key contributes no ordering; ties are broken by the next key.
    #[default]
    None = 0,
    Desc = 1,
    Asc = 2,
}

impl TryFrom<u32> for SortOrder {
    type Error = OracleError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Desc),
            2 => Ok(Self::Asc),
            other => Err(OracleError::invalid_argument(format!("unknown sort order {other}"))),
        }
    }
}

/// Keeps notes whose preimage field at `index` equals `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Select {
    pub index: usize,
    pub value: Felt,
}

/// Orders notes by their preimage field at `index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sort {
    pub index: usize,
    pub order: SortOrder,
}

/// A decoded note query.
///
/// Sort keys are applied in priority order, the first key being the most significant one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteQuery {
    pub selects: Vec<Select>,
    pub sorts: Vec<Sort>,
    pub limit: usize,
    pub offset: usize,
}

impl NoteQuery {
    /// A query which returns up to `limit` notes in fetch order.
    pub fn new(limit: usize) -> Self {
        Self {
            selects: Vec::new(),
            sorts: Vec::new(),
            limit,
            offset: 0,
        }
    }

    #[must_use]
    pub fn select(mut self, index: usize, value: Felt) -> Self {
        self.selects.push(Select { index, value });
        self
    }

    #[must_use]
    pub fn sort(mut self, index: usize, order: SortOrder) -> Self {
        self.sorts.push(Sort { index, order });
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

// ENCODED REQUEST
// ================================================================================================

/// A note query as encoded by a circuit.
///
/// Circuits pass fixed-size arrays, of which only the first `num_selects` select entries are
/// active. Sort entries with order code `0` are inactive as well.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GetNotesRequest {
    pub num_selects: usize,
    pub select_by: Vec<u32>,
    pub select_values: Vec<Felt>,
    pub sort_by: Vec<u32>,
    pub sort_order: Vec<u32>,
    pub limit: u32,
    pub offset: u32,
}

impl GetNotesRequest {
    /// Validates the encoded arrays and decodes them into a [`NoteQuery`].
    pub fn into_query(self) -> Result<NoteQuery, OracleError> {
        let GetNotesRequest {
            num_selects,
            select_by,
            select_values,
            sort_by,
            sort_order,
            limit,
            offset,
        } = self;

        if select_by.len() != select_values.len() {
            return Err(OracleError::invalid_argument(format!(
                "select_by has {} entries but select_values has {}",
                select_by.len(),
                select_values.len()
            )));
        }
        if num_selects > select_by.len() {
            return Err(OracleError::invalid_argument(format!(
                "num_selects is {num_selects} but only {} select entries were provided",
                select_by.len()
            )));
        }
        QueryParamNoteSelectLimit::check(num_selects)?;

        if sort_by.len() != sort_order.len() {
            return Err(OracleError::invalid_argument(format!(
                "sort_by has {} entries but sort_order has {}",
                sort_by.len(),
                sort_order.len()
            )));
        }

        let selects = select_by
            .into_iter()
            .zip_eq(select_values)
            .take(num_selects)
            .map(|(index, value)| Select { index: index as usize, value })
            .collect();

        let sorts = sort_by
            .into_iter()
            .zip_eq(sort_order)
            .map(|(index, code)| {
                SortOrder::try_from(code).map(|order| Sort { index: index as usize, order })
            })
            .collect::<Result<Vec<_>, _>>()?;
        QueryParamNoteSortLimit::check(
            sorts.iter().filter(|sort| sort.order != SortOrder::None).count(),
        )?;

        Ok(NoteQuery {
            selects,
            sorts,
            limit: limit as usize,
            offset: offset as usize,
        })
    }
}

// ENGINE
// ================================================================================================

/// Filters, orders and paginates `notes` according to `query`.
///
/// - A note is kept iff every select matches exactly. A select on a field the note does not have
///   never matches.
/// - Sorting is stable: notes that compare equal on every key keep their relative input order.
///   Fields compare by their canonical integer value and a missing field orders first.
/// - The first `offset` notes of the ordered sequence are skipped, then at most `limit` are
///   returned.
pub fn pick_notes(notes: Vec<NoteRecord>, query: &NoteQuery) -> Vec<NoteRecord> {
    let mut selected =
        notes.into_iter().filter(|note| matches_selects(note, &query.selects)).collect::<Vec<_>>();

    if query.sorts.iter().any(|sort| sort.order != SortOrder::None) {
        selected.sort_by(|a, b| compare_notes(a, b, &query.sorts));
    }

    selected.into_iter().skip(query.offset).take(query.limit).collect()
}

fn matches_selects(note: &NoteRecord, selects: &[Select]) -> bool {
    selects
        .iter()
        .all(|select| note.preimage().get(select.index).is_some_and(|field| field == select.value))
}

fn compare_notes(a: &NoteRecord, b: &NoteRecord, sorts: &[Sort]) -> Ordering {
    sorts.iter().fold(Ordering::Equal, |ordering, sort| {
        ordering.then_with(|| {
            let by_field =
                compare_fields(a.preimage().get(sort.index), b.preimage().get(sort.index));
            match sort.order {
                SortOrder::None => Ordering::Equal,
                SortOrder::Asc => by_field,
                SortOrder::Desc => by_field.reverse(),
            }
        })
    })
}

fn compare_fields(a: Option<Felt>, b: Option<Felt>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp_felts(&a, &b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}
