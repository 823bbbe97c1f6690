// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fmt;

use reqwest::Url;

use crate::discovery::list_vcards;
use crate::error::CardDavError;
use crate::sync::{Strategy, SyncReport};
use crate::transport::Transport;
use crate::types::{AddressBook, CTag, ETag, VCard};

/// Ctag based refresh: nothing when the ctag is unchanged, a full refetch otherwise.
pub struct BasicSync<'a> {
    transport: &'a dyn Transport,
    root: &'a Url,
}

impl fmt::Debug for BasicSync<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicSync")
            .field("root", &self.root.as_str())
            .finish_non_exhaustive()
    }
}

impl<'a> BasicSync<'a> {
    /// Creates the strategy; hrefs resolve against `root`.
    #[must_use]
    pub const fn new(transport: &'a dyn Transport, root: &'a Url) -> Self {
        Self { transport, root }
    }

    /// Refreshes `book` given the ctag the server reported.
    ///
    /// The caller probes the ctag, so an unchanged collection costs no
    /// request here. A missing ctag on either side counts as a change.
    ///
    /// # Errors
    ///
    /// Returns an error if the full listing fails; `book` is left untouched then.
    pub async fn run(
        &self,
        book: &mut AddressBook,
        remote_ctag: Option<CTag>,
    ) -> Result<SyncReport, CardDavError> {
        let mut report = SyncReport::new(Strategy::Basic);
        if remote_ctag.is_some() && remote_ctag == book.ctag {
            tracing::debug!(url = %book.url, "local ctag matches remote, nothing to sync");
            return Ok(report);
        }

        tracing::debug!(url = %book.url, "ctag changed, fetching all cards");
        let fetched = list_vcards(self.transport, self.root, book).await?;
        diff_into(&mut report, &book.vcards, &fetched);

        book.vcards = fetched;
        book.ctag = remote_ctag;
        Ok(report)
    }
}

/// Counts what replacing `old` with `new` changes.
fn diff_into(report: &mut SyncReport, old: &[VCard], new: &[VCard]) {
    let old: HashMap<&Url, &ETag> = old.iter().map(|v| (&v.url, &v.etag)).collect();
    let mut kept = 0;
    for vcard in new {
        match old.get(&vcard.url) {
            None => report.created += 1,
            Some(etag) => {
                kept += 1;
                if **etag != vcard.etag {
                    report.updated += 1;
                }
            }
        }
    }
    report.deleted = old.len().saturating_sub(kept);
}
