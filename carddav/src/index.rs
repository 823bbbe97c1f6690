// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use reqwest::Url;

use crate::types::{ETag, VCard};

/// Position and version of a cached card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Position of the card in the address book's card list.
    pub ordinal: usize,
    /// `ETag` of the card when it was indexed.
    pub etag: ETag,
}

/// Lookup from card URL to its cached position and `ETag`.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    entries: HashMap<Url, IndexEntry>,
}

impl ResourceIndex {
    /// Indexes `vcards` by URL.
    #[must_use]
    pub fn build(vcards: &[VCard]) -> Self {
        let entries = vcards
            .iter()
            .enumerate()
            .map(|(ordinal, vcard)| {
                let entry = IndexEntry {
                    ordinal,
                    etag: vcard.etag.clone(),
                };
                (vcard.url.clone(), entry)
            })
            .collect();
        Self { entries }
    }

    /// Looks up the card at `url`.
    #[must_use]
    pub fn lookup(&self, url: &Url) -> Option<&IndexEntry> {
        self.entries.get(url)
    }

    /// Records a card at `url`, replacing any previous entry.
    pub fn insert(&mut self, url: Url, ordinal: usize, etag: ETag) {
        self.entries.insert(url, IndexEntry { ordinal, etag });
    }

    /// Forgets the card at `url`.
    pub fn remove(&mut self, url: &Url) -> Option<IndexEntry> {
        self.entries.remove(url)
    }

    /// Number of indexed cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
