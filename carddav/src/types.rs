// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;

use reqwest::Url;

use crate::config::AuthMethod;

/// Declares an opaque string value handed out by the server.
macro_rules! opaque_string {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "` from a string.")]
            #[must_use]
            pub const fn new(value: String) -> Self {
                Self(value)
            }

            /// Returns the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

opaque_string!(
    /// Resource href (path) as returned by the server.
    ///
    /// An `Href` is usually relative, such as `/addressbooks/user/default/a.vcf`,
    /// and only becomes an identity once resolved against the account root URL.
    Href
);

opaque_string!(
    /// Entity tag of a single card; inequality means the body changed.
    ETag
);

opaque_string!(
    /// Collection tag (`getctag`); equality means nothing in the collection changed.
    CTag
);

opaque_string!(
    /// Opaque cursor re-issued by the server for the next `sync-collection` report.
    SyncToken
);

/// REPORT types a collection may advertise in `supported-report-set`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Report {
    /// RFC 6578 `sync-collection`.
    SyncCollection,
    /// RFC 6352 `addressbook-multiget`.
    AddressBookMultiGet,
    /// RFC 6352 `addressbook-query`.
    AddressBookQuery,
    /// Any other report, by local element name.
    Other(String),
}

impl Report {
    /// Maps the local name of a report element.
    #[must_use]
    pub fn from_local_name(name: &str) -> Self {
        match name {
            "sync-collection" => Self::SyncCollection,
            "addressbook-multiget" => Self::AddressBookMultiGet,
            "addressbook-query" => Self::AddressBookQuery,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A contact card stored in an address book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCard {
    /// Absolute URL of the card, its identity.
    pub url: Url,
    /// The entity tag of the card.
    pub etag: ETag,
    /// Raw vCard data.
    pub address_data: String,
    /// URL of the owning address book.
    pub address_book: Url,
}

/// An address book collection and its locally cached cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBook {
    /// Canonical URL of the collection.
    pub url: Url,
    /// The display name of the address book.
    pub display_name: Option<String>,
    /// Collection tag seen at the last successful sync.
    pub ctag: Option<CTag>,
    /// Sync token to hand back on the next incremental sync.
    pub sync_token: Option<SyncToken>,
    /// Reports the server supports on this collection.
    pub reports: HashSet<Report>,
    /// Cached cards, in no particular order.
    pub vcards: Vec<VCard>,
}

impl AddressBook {
    /// Creates an empty, never synced address book.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            display_name: None,
            ctag: None,
            sync_token: None,
            reports: HashSet::new(),
            vcards: Vec::new(),
        }
    }

    /// Whether the collection advertises RFC 6578 `sync-collection`.
    #[must_use]
    pub fn supports_sync_collection(&self) -> bool {
        self.reports.contains(&Report::SyncCollection)
    }

    /// A label for logs: the display name, or the URL.
    #[must_use]
    pub fn label(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.url.to_string())
    }
}

/// A `CardDAV` account and the address books it owns.
#[derive(Debug, Clone)]
pub struct Account {
    /// Server root; every href resolves against it.
    pub root_url: Url,
    /// Address book home set.
    pub home_url: Url,
    /// Credentials used for the account.
    pub credentials: AuthMethod,
    /// Known address books.
    pub address_books: Vec<AddressBook>,
}

impl Account {
    /// Creates an account with no known address books.
    #[must_use]
    pub const fn new(root_url: Url, home_url: Url, credentials: AuthMethod) -> Self {
        Self {
            root_url,
            home_url,
            credentials,
            address_books: Vec::new(),
        }
    }
}
