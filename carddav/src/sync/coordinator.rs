// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use reqwest::Url;

use crate::config::{SyncMethod, SyncOptions};
use crate::discovery::fetch_ctag;
use crate::error::CardDavError;
use crate::sync::{BasicSync, IncrementalSync, SyncReport};
use crate::transport::Transport;
use crate::types::AddressBook;

/// Per address book entry point choosing between incremental and basic sync.
pub struct CollectionSync<'a> {
    transport: &'a dyn Transport,
    root: &'a Url,
    options: SyncOptions,
}

impl fmt::Debug for CollectionSync<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionSync")
            .field("root", &self.root.as_str())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> CollectionSync<'a> {
    /// Creates the coordinator; hrefs resolve against `root`.
    #[must_use]
    pub const fn new(transport: &'a dyn Transport, root: &'a Url, options: SyncOptions) -> Self {
        Self {
            transport,
            root,
            options,
        }
    }

    /// Syncs one address book.
    ///
    /// Incremental sync runs when the collection advertises `sync-collection`
    /// and basic sync was not requested; otherwise the ctag is probed and
    /// basic sync decides whether to refetch.
    ///
    /// # Errors
    ///
    /// Returns any error of the chosen strategy or of the ctag probe.
    pub async fn sync(&self, book: &mut AddressBook) -> Result<SyncReport, CardDavError> {
        if self.options.method == SyncMethod::Webdav && book.supports_sync_collection() {
            return IncrementalSync::new(self.transport, self.root, self.options.delta)
                .run(book)
                .await;
        }

        if self.options.method == SyncMethod::Webdav {
            tracing::debug!(url = %book.url, "sync-collection not supported, using basic sync");
        }
        let remote_ctag = fetch_ctag(self.transport, book).await?;
        BasicSync::new(self.transport, self.root)
            .run(book, remote_ctag)
            .await
    }
}
