// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsers for WebDAV/CardDAV operations.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Url;

use crate::error::CardDavError;
use crate::types::{AddressBook, CTag, ETag, Href, Report, SyncToken, VCard};
use crate::urls::resolve;
use crate::xml::read_element_text;

/// `WebDAV` multistatus response.
#[derive(Debug, Clone, Default)]
pub struct MultiStatusResponse {
    /// The response items, in server order.
    pub responses: Vec<ResponseItem>,
    /// New sync token of a `sync-collection` report.
    pub sync_token: Option<SyncToken>,
}

/// Individual response in multistatus.
///
/// Only properties reported under a successful (2xx) propstat are kept, so a
/// property the server answered with 404 reads as absent.
#[derive(Debug, Clone, Default)]
pub struct ResponseItem {
    /// The href of the resource.
    pub href: Href,
    /// Properties found for the resource.
    pub props: Properties,
    /// Response-level status, set for members reported without properties.
    pub status: Option<String>,
}

impl ResponseItem {
    /// Creates an item with the given href and no properties.
    #[must_use]
    pub fn new(href: impl Into<Href>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }
}

/// WebDAV/CardDAV properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    /// `displayname`.
    pub display_name: Option<String>,
    /// `resourcetype` contains `collection`.
    pub is_collection: bool,
    /// `resourcetype` contains `addressbook`.
    pub is_address_book: bool,
    /// `getetag`.
    pub etag: Option<ETag>,
    /// `getctag`.
    pub ctag: Option<CTag>,
    /// `sync-token` property of a collection.
    pub sync_token: Option<SyncToken>,
    /// `address-data`.
    pub address_data: Option<String>,
    /// `addressbook-home-set`.
    pub address_book_home_set: Option<Href>,
    /// `supported-report-set`.
    pub supported_reports: Option<Vec<Report>>,
}

impl Properties {
    /// Takes every property set in `other`.
    fn merge(&mut self, other: Self) {
        self.display_name = other.display_name.or(self.display_name.take());
        self.is_collection |= other.is_collection;
        self.is_address_book |= other.is_address_book;
        self.etag = other.etag.or(self.etag.take());
        self.ctag = other.ctag.or(self.ctag.take());
        self.sync_token = other.sync_token.or(self.sync_token.take());
        self.address_data = other.address_data.or(self.address_data.take());
        self.address_book_home_set = other
            .address_book_home_set
            .or(self.address_book_home_set.take());
        self.supported_reports = other.supported_reports.or(self.supported_reports.take());
    }
}

/// Whether a status line such as `HTTP/1.1 200 OK` reports success.
fn is_success(status: &str) -> bool {
    status
        .split_whitespace()
        .nth(1)
        .is_some_and(|code| code.starts_with('2'))
}

fn local_name(name: quick_xml::name::QName<'_>) -> Vec<u8> {
    name.local_name().into_inner().to_vec()
}

/// Reads `resourcetype` children, returning `(is_collection, is_address_book)`.
fn read_resource_type<R: BufRead>(reader: &mut Reader<R>) -> Result<(bool, bool), CardDavError> {
    let mut is_collection = false;
    let mut is_address_book = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::End(ref e) if e.name().local_name().into_inner() == b"resourcetype" => break,
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().local_name().into_inner() {
                b"collection" => is_collection = true,
                b"addressbook" => is_address_book = true,
                _ => {}
            },
            Event::Eof => return Err(CardDavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok((is_collection, is_address_book))
}

/// Reads `supported-report-set`, collecting the element named inside each `report`.
fn read_report_set<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<Report>, CardDavError> {
    let mut reports = Vec::new();
    let mut in_report = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::End(ref e) => match e.name().local_name().into_inner() {
                b"supported-report-set" => break,
                b"report" => in_report = false,
                _ => {}
            },
            Event::Start(ref e) if e.name().local_name().into_inner() == b"report" => {
                in_report = true;
            }
            Event::Start(ref e) | Event::Empty(ref e) if in_report => {
                let name = String::from_utf8_lossy(e.name().local_name().into_inner());
                reports.push(Report::from_local_name(&name));
            }
            Event::Eof => return Err(CardDavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(reports)
}

/// Reads the first `href` of a property such as `addressbook-home-set`.
fn read_href_property<R: BufRead>(
    reader: &mut Reader<R>,
    property: &[u8],
) -> Result<Option<Href>, CardDavError> {
    let mut href = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::End(ref e) if e.name().local_name().into_inner() == property => break,
            Event::Start(ref e) if e.name().local_name().into_inner() == b"href" => {
                let text = read_element_text(reader)?;
                href.get_or_insert(Href::new(text));
            }
            Event::Eof => return Err(CardDavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(href)
}

impl MultiStatusResponse {
    /// Parses multistatus response from XML.
    ///
    /// # Errors
    ///
    /// Returns an error if XML parsing fails or the document is not a multistatus.
    pub fn from_xml(xml: &str) -> Result<Self, CardDavError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().check_end_names = true;

        let mut multistatus = Self::default();
        let mut current: Option<ResponseItem> = None;
        let mut props = Properties::default();
        let mut propstat_status: Option<String> = None;
        let mut in_propstat = false;
        let mut in_prop = false;
        let mut seen_root = false;

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Eof => break,

                Event::Start(e) => match local_name(e.name()).as_slice() {
                    b"multistatus" => seen_root = true,
                    b"response" => current = Some(ResponseItem::default()),
                    b"href" if current.is_some() && !in_propstat => {
                        let href = read_element_text(&mut reader)?;
                        if let Some(item) = current.as_mut() {
                            item.href = Href::new(href);
                        }
                    }
                    b"propstat" if current.is_some() => {
                        in_propstat = true;
                        props = Properties::default();
                        propstat_status = None;
                    }
                    b"prop" if in_propstat => in_prop = true,
                    b"status" if in_propstat => {
                        propstat_status = Some(read_element_text(&mut reader)?);
                    }
                    b"status" => {
                        let status = read_element_text(&mut reader)?;
                        if let Some(item) = current.as_mut() {
                            item.status = Some(status);
                        }
                    }
                    b"sync-token" if current.is_none() => {
                        let token = read_element_text(&mut reader)?;
                        multistatus.sync_token = Some(SyncToken::new(token));
                    }

                    b"displayname" if in_prop => {
                        props.display_name = Some(read_element_text(&mut reader)?);
                    }
                    b"resourcetype" if in_prop => {
                        (props.is_collection, props.is_address_book) =
                            read_resource_type(&mut reader)?;
                    }
                    b"getetag" if in_prop => {
                        props.etag = Some(ETag::new(read_element_text(&mut reader)?));
                    }
                    b"getctag" if in_prop => {
                        props.ctag = Some(CTag::new(read_element_text(&mut reader)?));
                    }
                    b"sync-token" if in_prop => {
                        props.sync_token = Some(SyncToken::new(read_element_text(&mut reader)?));
                    }
                    b"address-data" if in_prop => {
                        props.address_data = Some(read_element_text(&mut reader)?);
                    }
                    b"addressbook-home-set" if in_prop => {
                        props.address_book_home_set =
                            read_href_property(&mut reader, b"addressbook-home-set")?;
                    }
                    b"supported-report-set" if in_prop => {
                        props.supported_reports = Some(read_report_set(&mut reader)?);
                    }
                    _ => {}
                },

                Event::End(e) => match local_name(e.name()).as_slice() {
                    b"response" => {
                        if let Some(item) = current.take() {
                            multistatus.responses.push(item);
                        }
                    }
                    b"propstat" if in_propstat => {
                        in_propstat = false;
                        let found = propstat_status.take().is_some_and(|s| is_success(&s));
                        if let (true, Some(item)) = (found, current.as_mut()) {
                            item.props.merge(std::mem::take(&mut props));
                        }
                    }
                    b"prop" => in_prop = false,
                    _ => {}
                },

                Event::Empty(e) if local_name(e.name()).as_slice() == b"multistatus" => {
                    seen_root = true;
                }
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(CardDavError::InvalidResponse(
                "missing multistatus element".to_string(),
            ));
        }
        Ok(multistatus)
    }

    /// Converts the response of a home set listing into address books.
    ///
    /// Members whose resource type is not an address book are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an href cannot be resolved against `root`.
    pub fn into_address_books(self, root: &Url) -> Result<Vec<AddressBook>, CardDavError> {
        let mut books = Vec::new();
        for item in self.responses {
            if !item.props.is_address_book {
                continue;
            }

            let mut book = AddressBook::new(resolve(root, &item.href)?);
            book.display_name = item.props.display_name;
            book.ctag = item.props.ctag;
            book.sync_token = item.props.sync_token;
            books.push(book);
        }
        Ok(books)
    }

    /// Converts a card listing into cards owned by `address_book`.
    ///
    /// Members without address data are not cards and are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an href cannot be resolved against `root`.
    pub fn into_vcards(self, root: &Url, address_book: &Url) -> Result<Vec<VCard>, CardDavError> {
        let mut vcards = Vec::new();
        for item in self.responses {
            let Some(address_data) = item.props.address_data else {
                continue;
            };

            vcards.push(VCard {
                url: resolve(root, &item.href)?,
                etag: item.props.etag.unwrap_or_else(|| ETag::new(String::new())),
                address_data,
                address_book: address_book.clone(),
            });
        }
        Ok(vcards)
    }
}
