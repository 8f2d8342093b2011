//! Core runtime for scadb: rows and values, the SCA query layer, the
//! per-endpoint store boundary, the check-enrichment executors, and
//! observability.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod obs;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Default page size applied when a caller does not supply a limit.
pub const DEFAULT_LIMIT: u32 = 500;

/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100_000;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            identity::{CheckId, EndpointId, PolicyId},
            query::{FilterValue, QuerySpec, SearchSpec, SortOrder, SortSpec},
            response::ResultEnvelope,
            row::{EnrichedCheck, RelationRecord, Row},
        },
        value::Value,
    };
}
