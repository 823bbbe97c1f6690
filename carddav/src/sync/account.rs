// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::fmt;

use futures::future::join_all;
use reqwest::Url;

use crate::config::SyncOptions;
use crate::discovery::list_address_books;
use crate::error::CardDavError;
use crate::sync::{CollectionSync, SyncReport};
use crate::transport::Transport;
use crate::types::Account;
use crate::urls::fuzzy_url_equals;

/// An address book dropped from the account because its sync failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    /// URL of the address book.
    pub url: Url,
    /// Display name, if the server reported one.
    pub display_name: Option<String>,
    /// The error that caused the eviction.
    pub error: String,
}

/// Outcome of an account sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSyncReport {
    /// Address books seen for the first time.
    pub discovered: usize,
    /// Address books that synced, with what changed.
    pub synced: Vec<(Url, SyncReport)>,
    /// Address books removed from the account.
    pub evictions: Vec<Eviction>,
}

/// Keeps every address book of an account in sync.
pub struct AccountReconciler<'a> {
    transport: &'a dyn Transport,
    options: SyncOptions,
}

impl fmt::Debug for AccountReconciler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountReconciler")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> AccountReconciler<'a> {
    /// Creates the reconciler.
    #[must_use]
    pub const fn new(transport: &'a dyn Transport, options: SyncOptions) -> Self {
        Self { transport, options }
    }

    /// Discovers new address books, then syncs all of them concurrently.
    ///
    /// An address book whose sync fails is removed from the account and
    /// reported in [`AccountSyncReport::evictions`]; the others are unaffected.
    ///
    /// # Errors
    ///
    /// Returns an error only if listing the address books fails.
    #[tracing::instrument(skip_all, fields(home = %account.home_url))]
    pub async fn sync(&self, account: &mut Account) -> Result<AccountSyncReport, CardDavError> {
        let mut report = AccountSyncReport::default();

        let found = list_address_books(self.transport, &account.root_url, &account.home_url).await?;
        for mut book in found {
            let known = account
                .address_books
                .iter()
                .any(|prev| fuzzy_url_equals(&prev.url, &book.url));
            if !known {
                tracing::info!(url = %book.url, "new address book");
                // Nothing is cached yet, so the first pass must load every card.
                book.ctag = None;
                book.sync_token = None;
                account.address_books.push(book);
                report.discovered += 1;
            }
        }

        let coordinator = CollectionSync::new(self.transport, &account.root_url, self.options);
        let outcomes = join_all(account.address_books.iter_mut().map(|book| {
            let coordinator = &coordinator;
            async move {
                let url = book.url.clone();
                let display_name = book.display_name.clone();
                (url, display_name, coordinator.sync(book).await)
            }
        }))
        .await;

        let mut failed = HashSet::new();
        for (url, display_name, outcome) in outcomes {
            match outcome {
                Ok(sync) => report.synced.push((url, sync)),
                Err(err) => {
                    tracing::warn!(%url, name = ?display_name, %err, "sync failed, dropping address book");
                    failed.insert(url.clone());
                    report.evictions.push(Eviction {
                        url,
                        display_name,
                        error: err.to_string(),
                    });
                }
            }
        }
        account
            .address_books
            .retain(|book| !failed.contains(&book.url));

        Ok(report)
    }
}
