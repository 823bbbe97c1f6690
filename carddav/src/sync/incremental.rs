// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::fmt;

use reqwest::Url;

use crate::config::DeltaMode;
use crate::error::CardDavError;
use crate::index::ResourceIndex;
use crate::request::{AddressBookMultiGetRequest, Prop, SyncCollectionRequest};
use crate::response::{MultiStatusResponse, ResponseItem};
use crate::sync::{Strategy, SyncReport};
use crate::transport::Transport;
use crate::types::{AddressBook, ETag, VCard};
use crate::urls::resolve;

/// Sync token based refresh (RFC 6578).
///
/// One cycle is a delta listing of hrefs and etags, then at most one
/// `addressbook-multiget` for every card that is new or has a different
/// etag. Cards missing from the listing are dropped. The new sync token is
/// only adopted once the fetched cards are applied.
pub struct IncrementalSync<'a> {
    transport: &'a dyn Transport,
    root: &'a Url,
    mode: DeltaMode,
}

impl fmt::Debug for IncrementalSync<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalSync")
            .field("root", &self.root.as_str())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Working state of one cycle, dropped when the cycle ends.
#[derive(Debug)]
struct SyncDescriptor {
    index: ResourceIndex,
    /// Every live card URL the listing reported, changed or not.
    remote: HashSet<Url>,
    /// Listing entries whose card must be (re)loaded.
    pending: Vec<ResponseItem>,
}

impl SyncDescriptor {
    fn new(index: ResourceIndex) -> Self {
        Self {
            index,
            remote: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Marks `item` present and queues it when it is new or its etag moved.
    fn classify(&mut self, url: Url, item: ResponseItem) {
        let changed = self
            .index
            .lookup(&url)
            .is_none_or(|local| item.props.etag.as_ref() != Some(&local.etag));

        self.remote.insert(url);
        if changed {
            self.pending.push(item);
        }
    }
}

/// Drops listing entries that do not stand for a live card.
///
/// Members deleted on the server are reported without an etag (or, when the
/// listing carries bodies, without address data). They must neither be
/// fetched nor counted as present.
fn live_entries(
    entries: Vec<ResponseItem>,
    mode: DeltaMode,
) -> impl Iterator<Item = ResponseItem> {
    entries.into_iter().filter(move |item| match mode {
        DeltaMode::Multiget => item.props.etag.is_some(),
        DeltaMode::Inline => item.props.address_data.is_some(),
    })
}

impl<'a> IncrementalSync<'a> {
    /// Creates the strategy; hrefs resolve against `root`.
    #[must_use]
    pub const fn new(transport: &'a dyn Transport, root: &'a Url, mode: DeltaMode) -> Self {
        Self {
            transport,
            root,
            mode,
        }
    }

    /// Brings the cards of `book` up to date with the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing or the multiget fails, or the server
    /// returns an href that cannot be resolved. `book` is left untouched then.
    #[tracing::instrument(skip_all, fields(url = %book.url))]
    pub async fn run(&self, book: &mut AddressBook) -> Result<SyncReport, CardDavError> {
        let mut report = SyncReport::new(Strategy::Incremental);
        let mut descriptor = SyncDescriptor::new(ResourceIndex::build(&book.vcards));

        let MultiStatusResponse {
            responses,
            sync_token,
        } = self.list_changes(book).await?;

        for item in live_entries(responses, self.mode) {
            let url = resolve(self.root, &item.href)?;
            descriptor.classify(url, item);
        }
        tracing::debug!(
            present = descriptor.remote.len(),
            pending = descriptor.pending.len(),
            "classified remote cards"
        );

        let fetched = match self.mode {
            DeltaMode::Inline => std::mem::take(&mut descriptor.pending),
            DeltaMode::Multiget if descriptor.pending.is_empty() => Vec::new(),
            DeltaMode::Multiget => {
                report.fetches = 1;
                self.fetch(book, &descriptor.pending).await?
            }
        };

        let loaded = self.load_cards(fetched)?;
        apply(book, &mut descriptor.index, loaded, &mut report);

        let before = book.vcards.len();
        book.vcards.retain(|vcard| descriptor.remote.contains(&vcard.url));
        report.deleted = before - book.vcards.len();

        if let Some(token) = sync_token {
            book.sync_token = Some(token);
        }

        tracing::debug!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            "incremental sync finished"
        );
        Ok(report)
    }

    async fn list_changes(&self, book: &AddressBook) -> Result<MultiStatusResponse, CardDavError> {
        let mut request = SyncCollectionRequest::new(book.sync_token.clone());
        request.add_property(Prop::GetETag);
        if self.mode == DeltaMode::Inline {
            request.add_property(Prop::AddressData);
        }
        self.transport
            .send(&request.to_request()?, &book.url)
            .await
    }

    /// Loads every pending card with a single multiget.
    async fn fetch(
        &self,
        book: &AddressBook,
        pending: &[ResponseItem],
    ) -> Result<Vec<ResponseItem>, CardDavError> {
        let mut multiget = AddressBookMultiGetRequest::new();
        for item in pending {
            multiget.add_href(item.href.clone());
        }
        tracing::debug!(count = multiget.len(), "fetching changed cards");

        let multistatus = self.transport.send(&multiget.to_request()?, &book.url).await?;
        Ok(multistatus.responses)
    }

    /// Resolves fetched entries that carry a card; entries without address data are skipped.
    fn load_cards(
        &self,
        fetched: Vec<ResponseItem>,
    ) -> Result<Vec<(Url, ETag, String)>, CardDavError> {
        fetched
            .into_iter()
            .filter_map(|item| {
                let address_data = item.props.address_data?;
                let etag = item.props.etag.unwrap_or_else(|| ETag::new(String::new()));
                Some(resolve(self.root, &item.href).map(|url| (url, etag, address_data)))
            })
            .collect()
    }
}

/// Writes loaded cards into `book`; the server copy always wins.
fn apply(
    book: &mut AddressBook,
    index: &mut ResourceIndex,
    loaded: Vec<(Url, ETag, String)>,
    report: &mut SyncReport,
) {
    for (url, etag, address_data) in loaded {
        let ordinal = index.lookup(&url).map(|entry| entry.ordinal);
        let existing =
            ordinal.and_then(|ordinal| book.vcards.get_mut(ordinal).map(|vcard| (ordinal, vcard)));

        match existing {
            Some((ordinal, vcard)) => {
                vcard.etag = etag.clone();
                vcard.address_data = address_data;
                index.insert(url, ordinal, etag);
                report.updated += 1;
            }
            None => {
                index.insert(url.clone(), book.vcards.len(), etag.clone());
                book.vcards.push(VCard {
                    url,
                    etag,
                    address_data,
                    address_book: book.url.clone(),
                });
                report.created += 1;
            }
        }
    }
}
