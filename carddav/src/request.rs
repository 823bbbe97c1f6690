// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request builders for `CardDAV` operations.

use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::CardDavError;
use crate::transport::{DavMethod, DavRequest, Depth};
use crate::types::{Href, SyncToken};
use crate::xml::{BodyWriter, body_writer, finish, ns, write_text_element};

/// Properties to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prop {
    /// Display name.
    DisplayName,
    /// Resource type.
    ResourceType,
    /// `ETag`.
    GetETag,
    /// Collection tag.
    GetCTag,
    /// Sync token of a collection.
    SyncToken,
    /// Address (vCard) data.
    AddressData,
    /// Address book home set.
    AddressBookHomeSet,
    /// Supported report set.
    SupportedReportSet,
}

impl Prop {
    const fn name(self) -> &'static str {
        match self {
            Self::DisplayName => "displayname",
            Self::ResourceType => "resourcetype",
            Self::GetETag => "getetag",
            Self::GetCTag => "getctag",
            Self::SyncToken => "sync-token",
            Self::AddressData => "address-data",
            Self::AddressBookHomeSet => "addressbook-home-set",
            Self::SupportedReportSet => "supported-report-set",
        }
    }

    const fn prefix(self) -> &'static str {
        match self {
            Self::DisplayName
            | Self::ResourceType
            | Self::GetETag
            | Self::SyncToken
            | Self::SupportedReportSet => "D",
            Self::AddressData | Self::AddressBookHomeSet => "C",
            Self::GetCTag => "CS",
        }
    }
}

/// Opens a root element declaring every namespace the body may use.
fn write_root(writer: &mut BodyWriter, name: &str) -> Result<(), CardDavError> {
    let mut root = BytesStart::new(name);
    root.push_attribute(("xmlns:D", ns::DAV));
    root.push_attribute(("xmlns:C", ns::CARDDAV));
    root.push_attribute(("xmlns:CS", ns::CALENDAR_SERVER));
    writer.write_event(Event::Start(root))?;
    Ok(())
}

/// Writes `<D:prop>` with one empty element per property.
fn write_props(writer: &mut BodyWriter, props: &[Prop]) -> Result<(), CardDavError> {
    writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
    for prop in props {
        let name = format!("{}:{}", prop.prefix(), prop.name());
        writer.write_event(Event::Start(BytesStart::new(name.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    }
    writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
    Ok(())
}

/// PROPFIND request builder.
#[derive(Debug)]
pub struct PropFindRequest {
    props: Vec<Prop>,
    depth: Depth,
}

impl PropFindRequest {
    /// Creates a new PROPFIND request with the given depth.
    #[must_use]
    pub const fn new(depth: Depth) -> Self {
        Self {
            props: Vec::new(),
            depth,
        }
    }

    /// Adds a property to the request.
    pub fn add_property(&mut self, prop: Prop) -> &mut Self {
        self.props.push(prop);
        self
    }

    /// Builds the XML body for the PROPFIND request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CardDavError> {
        let mut writer = body_writer();
        write_root(&mut writer, "D:propfind")?;
        write_props(&mut writer, &self.props)?;
        writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;
        finish(writer)
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn to_request(&self) -> Result<DavRequest, CardDavError> {
        Ok(DavRequest {
            method: DavMethod::PropFind,
            depth: Some(self.depth),
            body: self.build()?,
        })
    }
}

/// `sync-collection` REPORT builder (RFC 6578).
#[derive(Debug)]
pub struct SyncCollectionRequest {
    sync_token: Option<SyncToken>,
    props: Vec<Prop>,
}

impl SyncCollectionRequest {
    /// Creates a listing starting from `sync_token`; `None` asks for the initial state.
    #[must_use]
    pub const fn new(sync_token: Option<SyncToken>) -> Self {
        Self {
            sync_token,
            props: Vec::new(),
        }
    }

    /// Adds a property to report for every member.
    pub fn add_property(&mut self, prop: Prop) -> &mut Self {
        self.props.push(prop);
        self
    }

    /// Builds the XML body.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CardDavError> {
        let mut writer = body_writer();
        write_root(&mut writer, "D:sync-collection")?;

        match &self.sync_token {
            Some(token) => write_text_element(&mut writer, "D:sync-token", token.as_str())?,
            None => writer.write_event(Event::Empty(BytesStart::new("D:sync-token")))?,
        }
        write_text_element(&mut writer, "D:sync-level", "1")?;
        write_props(&mut writer, &self.props)?;

        writer.write_event(Event::End(BytesEnd::new("D:sync-collection")))?;
        finish(writer)
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn to_request(&self) -> Result<DavRequest, CardDavError> {
        Ok(DavRequest {
            method: DavMethod::Report,
            depth: None,
            body: self.build()?,
        })
    }
}

/// `addressbook-multiget` REPORT builder.
#[derive(Debug)]
pub struct AddressBookMultiGetRequest {
    props: Vec<Prop>,
    hrefs: Vec<Href>,
}

impl AddressBookMultiGetRequest {
    /// Creates a multiget asking for `getetag` and `address-data`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            props: vec![Prop::GetETag, Prop::AddressData],
            hrefs: Vec::new(),
        }
    }

    /// Adds an href to the request.
    pub fn add_href(&mut self, href: Href) -> &mut Self {
        self.hrefs.push(href);
        self
    }

    /// Number of hrefs named so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hrefs.len()
    }

    /// Whether no href has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hrefs.is_empty()
    }

    /// Builds the XML body for the multiget request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CardDavError> {
        let mut writer = body_writer();
        write_root(&mut writer, "C:addressbook-multiget")?;
        write_props(&mut writer, &self.props)?;
        for href in &self.hrefs {
            write_text_element(&mut writer, "D:href", href.as_str())?;
        }
        writer.write_event(Event::End(BytesEnd::new("C:addressbook-multiget")))?;
        finish(writer)
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn to_request(&self) -> Result<DavRequest, CardDavError> {
        Ok(DavRequest {
            method: DavMethod::Report,
            depth: Some(Depth::One),
            body: self.build()?,
        })
    }
}

impl Default for AddressBookMultiGetRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// `addressbook-query` REPORT builder listing every card of a collection.
#[derive(Debug)]
pub struct AddressBookQueryRequest {
    props: Vec<Prop>,
}

impl AddressBookQueryRequest {
    /// Creates a query asking for `getetag` and `address-data`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            props: vec![Prop::GetETag, Prop::AddressData],
        }
    }

    /// Builds the XML body for the query.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn build(&self) -> Result<String, CardDavError> {
        let mut writer = body_writer();
        write_root(&mut writer, "C:addressbook-query")?;
        write_props(&mut writer, &self.props)?;
        writer.write_event(Event::End(BytesEnd::new("C:addressbook-query")))?;
        finish(writer)
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns an error if XML building fails.
    pub fn to_request(&self) -> Result<DavRequest, CardDavError> {
        Ok(DavRequest {
            method: DavMethod::Report,
            depth: Some(Depth::One),
            body: self.build()?,
        })
    }
}

impl Default for AddressBookQueryRequest {
    fn default() -> Self {
        Self::new()
    }
}
