// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Collection level queries: listing address books, their capabilities and contents.

use futures::future::try_join_all;
use reqwest::Url;

use crate::error::CardDavError;
use crate::request::{AddressBookQueryRequest, Prop, PropFindRequest};
use crate::transport::{Depth, Transport};
use crate::types::{AddressBook, CTag, Report, VCard};

/// Lists the address books under `home` and loads their supported reports.
///
/// # Errors
///
/// Returns an error if the listing or any report set query fails.
#[tracing::instrument(skip_all, fields(home = %home))]
pub async fn list_address_books(
    transport: &dyn Transport,
    root: &Url,
    home: &Url,
) -> Result<Vec<AddressBook>, CardDavError> {
    let mut propfind = PropFindRequest::new(Depth::One);
    propfind
        .add_property(Prop::DisplayName)
        .add_property(Prop::GetCTag)
        .add_property(Prop::ResourceType)
        .add_property(Prop::SyncToken);

    let multistatus = transport.send(&propfind.to_request()?, home).await?;
    let mut books = multistatus.into_address_books(root)?;
    for book in &books {
        tracing::debug!(url = %book.url, name = ?book.display_name, "found address book");
    }

    let reports = try_join_all(books.iter().map(|book| supported_reports(transport, book))).await?;
    for (book, reports) in books.iter_mut().zip(reports) {
        book.reports = reports.into_iter().collect();
    }

    Ok(books)
}

/// Queries the `supported-report-set` of an address book.
///
/// # Errors
///
/// Returns an error if the PROPFIND fails.
pub async fn supported_reports(
    transport: &dyn Transport,
    book: &AddressBook,
) -> Result<Vec<Report>, CardDavError> {
    let mut propfind = PropFindRequest::new(Depth::Zero);
    propfind.add_property(Prop::SupportedReportSet);

    let multistatus = transport.send(&propfind.to_request()?, &book.url).await?;
    Ok(multistatus
        .responses
        .into_iter()
        .find_map(|item| item.props.supported_reports)
        .unwrap_or_default())
}

/// Reads the current ctag of an address book.
///
/// # Errors
///
/// Returns an error if the PROPFIND fails.
pub async fn fetch_ctag(
    transport: &dyn Transport,
    book: &AddressBook,
) -> Result<Option<CTag>, CardDavError> {
    let mut propfind = PropFindRequest::new(Depth::Zero);
    propfind.add_property(Prop::GetCTag);

    let multistatus = transport.send(&propfind.to_request()?, &book.url).await?;
    Ok(multistatus
        .responses
        .into_iter()
        .find_map(|item| item.props.ctag))
}

/// Fetches every card of an address book with an `addressbook-query` REPORT.
///
/// # Errors
///
/// Returns an error if the REPORT fails or an href cannot be resolved.
pub async fn list_vcards(
    transport: &dyn Transport,
    root: &Url,
    book: &AddressBook,
) -> Result<Vec<VCard>, CardDavError> {
    tracing::debug!(url = %book.url, "listing all cards");
    let request = AddressBookQueryRequest::new().to_request()?;
    let multistatus = transport.send(&request, &book.url).await?;
    multistatus.into_vcards(root, &book.url)
}
