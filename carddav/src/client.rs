// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `CardDAV` client for address book operations.

use std::sync::Arc;

use reqwest::Url;

use crate::config::{CardDavConfig, SyncOptions};
use crate::discovery;
use crate::error::CardDavError;
use crate::http::{HttpClient, Precondition};
use crate::request::{Prop, PropFindRequest};
use crate::sync::{AccountReconciler, AccountSyncReport, CollectionSync, SyncReport};
use crate::transport::{Depth, HttpTransport, Transport};
use crate::types::{Account, AddressBook, ETag, Href, VCard};
use crate::urls::resolve;

/// `CardDAV` client keeping local copies of address books in sync.
///
/// # Example
///
/// ```ignore
/// use davsync_carddav::{AuthMethod, CardDavClient, CardDavConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CardDavConfig {
///     base_url: "https://carddav.example.com".to_string(),
///     home_path: "/dav/addressbooks/user/".to_string(),
///     auth: AuthMethod::Basic {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     },
///     ..Default::default()
/// };
///
/// let client = CardDavClient::new(config)?;
/// let mut account = client.account()?;
/// let report = client.sync_account(&mut account).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardDavClient {
    http: Arc<HttpClient>,
    transport: Arc<dyn Transport>,
    config: CardDavConfig,
    root_url: Url,
}

impl CardDavClient {
    /// Creates a new `CardDAV` client sending requests over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or HTTP client initialization fails.
    pub fn new(config: CardDavConfig) -> Result<Self, CardDavError> {
        let http = Arc::new(HttpClient::new(&config)?);
        let transport = Arc::new(HttpTransport::new(Arc::clone(&http)));
        Self::build(config, http, transport)
    }

    /// Creates a client whose multistatus requests go through `transport`.
    ///
    /// Card writes and discovery still use the HTTP client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or HTTP client initialization fails.
    pub fn with_transport(
        config: CardDavConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CardDavError> {
        let http = Arc::new(HttpClient::new(&config)?);
        Self::build(config, http, transport)
    }

    fn build(
        config: CardDavConfig,
        http: Arc<HttpClient>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CardDavError> {
        let root_url = Url::parse(&config.base_url)
            .map_err(|e| CardDavError::Config(format!("invalid base_url {}: {e}", config.base_url)))?;
        Ok(Self {
            http,
            transport,
            config,
            root_url,
        })
    }

    /// Replaces the synchronization options of the configuration.
    #[must_use]
    pub fn with_sync_options(mut self, options: SyncOptions) -> Self {
        self.config.sync = options;
        self
    }

    /// Root URL every href resolves against.
    #[must_use]
    pub const fn root_url(&self) -> &Url {
        &self.root_url
    }

    /// Creates an account for the configured server, with no address books yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the home path cannot be resolved.
    pub fn account(&self) -> Result<Account, CardDavError> {
        let home_url = resolve(&self.root_url, &self.config.home_path)?;
        Ok(Account::new(
            self.root_url.clone(),
            home_url,
            self.config.auth.clone(),
        ))
    }

    /// Discovers `CardDAV` support and the address book home set.
    ///
    /// Falls back to the configured home path when the server advertises
    /// `addressbook` but reports no home set.
    ///
    /// # Errors
    ///
    /// Returns [`CardDavError::NotACardDavServer`] if the server neither
    /// advertises `CardDAV` nor reports a home set, or an error if a request fails.
    pub async fn discover(&self) -> Result<DiscoverResult, CardDavError> {
        let url = resolve(&self.root_url, &self.config.home_path)?;
        let supports_address_books = self.http.supports_address_books(&url).await?;

        let mut propfind = PropFindRequest::new(Depth::Zero);
        propfind.add_property(Prop::AddressBookHomeSet);

        let multistatus = self.transport.send(&propfind.to_request()?, &url).await?;
        let home_set = multistatus
            .responses
            .into_iter()
            .find_map(|r| r.props.address_book_home_set);
        let address_book_home = match home_set {
            Some(home) => home,
            None if supports_address_books => Href::new(self.config.home_path.clone()),
            None => return Err(CardDavError::NotACardDavServer),
        };

        Ok(DiscoverResult {
            supports_address_books,
            address_book_home,
        })
    }

    /// Lists the address books of `account`, without touching the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the PROPFIND fails.
    pub async fn list_address_books(
        &self,
        account: &Account,
    ) -> Result<Vec<AddressBook>, CardDavError> {
        discovery::list_address_books(&*self.transport, &account.root_url, &account.home_url)
            .await
    }

    /// Fetches every card of an address book.
    ///
    /// # Errors
    ///
    /// Returns an error if the REPORT fails.
    pub async fn list_vcards(&self, book: &AddressBook) -> Result<Vec<VCard>, CardDavError> {
        discovery::list_vcards(&*self.transport, &self.root_url, book).await
    }

    /// Creates a new card in `book`.
    ///
    /// The card is stored as `filename`, or as a random `<uuid>.vcf`. It is
    /// not added to the local cache; the next sync picks it up.
    ///
    /// # Errors
    ///
    /// Returns an error if a card already exists at that URL or the PUT fails.
    pub async fn create_card(
        &self,
        book: &AddressBook,
        filename: Option<&str>,
        address_data: &str,
    ) -> Result<(Url, Option<ETag>), CardDavError> {
        let filename = filename.map_or_else(
            || format!("{}.vcf", uuid::Uuid::new_v4()),
            ToString::to_string,
        );
        let url = resolve(&book.url, &filename)?;

        let etag = self
            .http
            .put_vcard(&url, address_data.to_string(), Precondition::Absent)
            .await?;
        Ok((url, etag))
    }

    /// Uploads the local content of `card`, conditional on its etag.
    ///
    /// # Errors
    ///
    /// Returns [`CardDavError::PreconditionFailed`] if the card changed on the server.
    pub async fn update_card(&self, card: &VCard) -> Result<Option<ETag>, CardDavError> {
        self.http
            .put_vcard(
                &card.url,
                card.address_data.clone(),
                Precondition::Matches(&card.etag),
            )
            .await
    }

    /// Deletes `card`, conditional on its etag.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete_card(&self, card: &VCard) -> Result<(), CardDavError> {
        self.http.delete(&card.url, &card.etag).await
    }

    /// Brings the cached cards of one address book up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails; nothing contains it at this level.
    pub async fn sync_address_book(
        &self,
        book: &mut AddressBook,
    ) -> Result<SyncReport, CardDavError> {
        CollectionSync::new(&*self.transport, &self.root_url, self.config.sync)
            .sync(book)
            .await
    }

    /// Discovers and syncs every address book of `account`.
    ///
    /// # Errors
    ///
    /// Returns an error only if listing the address books fails; failing
    /// address books are evicted and reported instead.
    pub async fn sync_account(
        &self,
        account: &mut Account,
    ) -> Result<AccountSyncReport, CardDavError> {
        AccountReconciler::new(&*self.transport, self.config.sync)
            .sync(account)
            .await
    }
}

/// Result of `CardDAV` server discovery.
#[derive(Debug, Clone)]
pub struct DiscoverResult {
    /// Whether the server advertises `CardDAV` support.
    pub supports_address_books: bool,
    /// The address book home set href.
    pub address_book_home: Href,
}
