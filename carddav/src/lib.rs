// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `CardDAV` client that keeps a local copy of remote address books in sync (RFC 6352, RFC 6578).

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod client;
mod config;
mod discovery;
mod error;
mod http;
mod index;
mod request;
mod response;
mod sync;
mod transport;
mod types;
mod urls;
mod xml;

pub use crate::client::{CardDavClient, DiscoverResult};
pub use crate::config::{AuthMethod, CardDavConfig, DeltaMode, SyncMethod, SyncOptions};
pub use crate::discovery::{fetch_ctag, list_address_books, list_vcards, supported_reports};
pub use crate::error::CardDavError;
pub use crate::index::{IndexEntry, ResourceIndex};
pub use crate::request::{
    AddressBookMultiGetRequest, AddressBookQueryRequest, Prop, PropFindRequest,
    SyncCollectionRequest,
};
pub use crate::response::{MultiStatusResponse, Properties, ResponseItem};
pub use crate::sync::{
    AccountReconciler, AccountSyncReport, BasicSync, CollectionSync, Eviction, IncrementalSync,
    Strategy, SyncReport,
};
pub use crate::transport::{DavMethod, DavRequest, Depth, HttpTransport, SenderFactory, Transport};
pub use crate::types::{Account, AddressBook, CTag, ETag, Href, Report, SyncToken, VCard};
pub use crate::urls::{fuzzy_url_equals, resolve};

/// Re-exported so callers can build account and address book URLs without a direct `url` dependency.
pub use reqwest::Url;
