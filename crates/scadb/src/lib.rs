//! scadb: security configuration assessment results, per endpoint.
//!
//! This is the public crate. Downstream users depend on **scadb** only.
//!
//! ## Crate layout
//! - `core`: values and rows, the query layer, the partition store boundary,
//!   the executors, configuration, and observability.
//! - `error`: the stable public error taxonomy.
//! - `service`: authorization and endpoint lookup in front of the executors.
//!
//! The `prelude` module carries the types most callers need.

pub use scadb_core as core;

pub mod error;
pub mod service;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, ErrorKind, ErrorOrigin};
pub use service::{AllowAll, Authorizer, Sca};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Error, ErrorKind,
        service::{AllowAll, Authorizer, Sca},
    };
    pub use scadb_core::{
        config::ScaConfig,
        db::{
            identity::KnownEndpoints,
            response::FailedItem,
            store::{MemoryPartition, MemoryStore, PartitionStore},
        },
        prelude::*,
    };
}
