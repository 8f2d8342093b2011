//! Module: db::response
//! Responsibility: the per-operation result accumulator: records produced,
//! endpoints that failed locally, and the operation's total count.
//! Does not own: deciding which failures are local; executors do that.


use crate::db::identity::EndpointId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error code reported for endpoints absent from the known set.
pub const RESOURCE_NOT_FOUND_CODE: u32 = 1701;

///
/// EnvelopeMessages
///
/// Summary lines chosen by `ResultEnvelope::message`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EnvelopeMessages {
    pub all: &'static str,
    pub some: &'static str,
    pub none: &'static str,
}

pub const POLICY_MESSAGES: EnvelopeMessages = EnvelopeMessages {
    all: "All selected sca information was returned",
    some: "Some sca information was not returned",
    none: "No sca information was returned",
};

pub const CHECK_MESSAGES: EnvelopeMessages = EnvelopeMessages {
    all: "All selected sca/policy information was returned",
    some: "Some sca/policy information was not returned",
    none: "No sca/policy information was returned",
};

///
/// FailedItem
///
/// A locally recoverable per-endpoint failure.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FailedItem {
    pub code: u32,
    pub message: String,
}

impl FailedItem {
    #[must_use]
    pub fn resource_not_found(endpoint: &EndpointId) -> Self {
        Self {
            code: RESOURCE_NOT_FOUND_CODE,
            message: format!("Agent does not exist: {endpoint}"),
        }
    }

    #[must_use]
    pub const fn is_resource_not_found(&self) -> bool {
        self.code == RESOURCE_NOT_FOUND_CODE
    }
}

///
/// ResultEnvelope
///
/// Created empty at operation start, filled by the executor, then handed
/// back read-only. Serialize-only: the message set is not part of the
/// wire shape and cannot be recovered from it.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResultEnvelope<T> {
    affected_items: Vec<T>,
    failed_items: BTreeMap<EndpointId, FailedItem>,
    total_affected_items: u64,
    #[serde(skip)]
    messages: EnvelopeMessages,
}

impl<T> ResultEnvelope<T> {
    #[must_use]
    pub const fn empty(messages: EnvelopeMessages) -> Self {
        Self {
            affected_items: Vec::new(),
            failed_items: BTreeMap::new(),
            total_affected_items: 0,
            messages,
        }
    }

    #[must_use]
    pub fn affected_items(&self) -> &[T] {
        &self.affected_items
    }

    #[must_use]
    pub const fn failed_items(&self) -> &BTreeMap<EndpointId, FailedItem> {
        &self.failed_items
    }

    #[must_use]
    pub const fn total_affected_items(&self) -> u64 {
        self.total_affected_items
    }

    #[must_use]
    pub fn total_failed_items(&self) -> usize {
        self.failed_items.len()
    }

    #[must_use]
    pub const fn messages(&self) -> EnvelopeMessages {
        self.messages
    }

    #[must_use]
    pub fn into_affected_items(self) -> Vec<T> {
        self.affected_items
    }

    /// Summary line for the envelope's outcome.
    #[must_use]
    pub fn message(&self) -> &'static str {
        if self.failed_items.is_empty() {
            self.messages.all
        } else if self.affected_items.is_empty() {
            self.messages.none
        } else {
            self.messages.some
        }
    }

    /// Record a failure for `endpoint`, replacing any earlier one.
    pub fn add_failed_item(&mut self, endpoint: EndpointId, item: FailedItem) {
        self.failed_items.insert(endpoint, item);
    }

    pub(crate) fn extend_affected(&mut self, items: impl IntoIterator<Item = T>) {
        self.affected_items.extend(items);
    }

    pub(crate) const fn set_total(&mut self, total: u64) {
        self.total_affected_items = total;
    }

    /// Fold `other` into `self`: items appended in order, failures unioned,
    /// totals summed.
    pub fn merge(&mut self, other: Self) {
        self.affected_items.extend(other.affected_items);
        self.failed_items.extend(other.failed_items);
        self.total_affected_items = self
            .total_affected_items
            .saturating_add(other.total_affected_items);
    }
}
