// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Synchronization of cached address books with the server.
//!
//! [`AccountReconciler`] drives every address book of an account through
//! [`CollectionSync`], which picks [`IncrementalSync`] or [`BasicSync`] per
//! collection. Strategies never catch errors; the reconciler is the only
//! place where a failing collection is contained.

mod account;
mod basic;
mod coordinator;
mod incremental;

pub use account::{AccountReconciler, AccountSyncReport, Eviction};
pub use basic::BasicSync;
pub use coordinator::CollectionSync;
pub use incremental::IncrementalSync;

/// Strategy that refreshed an address book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Ctag comparison and full listing.
    Basic,
    /// Sync token based delta listing.
    Incremental,
}

/// What a single address book sync changed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Strategy that ran.
    pub strategy: Strategy,
    /// Cards added to the cache.
    pub created: usize,
    /// Cards whose etag and body were replaced.
    pub updated: usize,
    /// Cards removed from the cache.
    pub deleted: usize,
    /// Multiget requests issued, zero or one.
    pub fetches: usize,
}

impl SyncReport {
    pub(crate) const fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            created: 0,
            updated: 0,
            deleted: 0,
            fetches: 0,
        }
    }

    /// Whether the sync left the cached cards untouched.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0
    }
}
