// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request/response plumbing shared by every sync strategy.
//!
//! A [`Transport`] sends one WebDAV request and hands back the parsed
//! multistatus body, in server order. The sync engine only ever talks to this
//! trait, so tests and alternative HTTP stacks can stand in for [`HttpTransport`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};

use crate::error::CardDavError;
use crate::http::HttpClient;
use crate::response::MultiStatusResponse;

/// WebDAV methods that answer with a multistatus body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DavMethod {
    /// `PROPFIND`.
    PropFind,
    /// `REPORT`.
    Report,
}

impl DavMethod {
    /// The method name on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PropFind => "PROPFIND",
            Self::Report => "REPORT",
        }
    }
}

/// Value of the `Depth` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// The target only.
    Zero,
    /// The target and its direct members.
    One,
}

impl Depth {
    /// Header value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
        }
    }
}

/// A fully built multistatus request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavRequest {
    /// Request method.
    pub method: DavMethod,
    /// `Depth` header, if any.
    pub depth: Option<Depth>,
    /// XML body.
    pub body: String,
}

/// Sends WebDAV requests and parses their multistatus responses.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request` to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, an error status, or an unparsable body.
    async fn send(
        &self,
        request: &DavRequest,
        url: &Url,
    ) -> Result<MultiStatusResponse, CardDavError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        request: &DavRequest,
        url: &Url,
    ) -> Result<MultiStatusResponse, CardDavError> {
        (**self).send(request, url).await
    }
}

/// [`Transport`] over the authenticated reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Arc<HttpClient>,
}

impl HttpTransport {
    pub(crate) const fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &DavRequest,
        url: &Url,
    ) -> Result<MultiStatusResponse, CardDavError> {
        let method = Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| CardDavError::Http(format!("Invalid method: {e}")))?;

        let mut req = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(request.body.clone());
        if let Some(depth) = request.depth {
            req = req.header("Depth", depth.as_str());
        }

        tracing::trace!(method = request.method.as_str(), %url, "sending request");
        let resp = self.http.execute(req).await?;
        let xml = resp.text().await?;
        MultiStatusResponse::from_xml(&xml)
    }
}

/// Adapts a factory that hands out a fresh sender for every request.
///
/// Some embedders keep per-request state in their sender (a sandbox, a
/// request log); wrapping the factory lets the sync engine treat it like any
/// other [`Transport`].
pub struct SenderFactory<F> {
    factory: F,
}

impl<F> SenderFactory<F> {
    /// Wraps `factory`.
    pub const fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F> fmt::Debug for SenderFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderFactory").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, T> Transport for SenderFactory<F>
where
    F: Fn() -> T + Send + Sync,
    T: Transport,
{
    async fn send(
        &self,
        request: &DavRequest,
        url: &Url,
    ) -> Result<MultiStatusResponse, CardDavError> {
        let sender = (self.factory)();
        sender.send(request, url).await
    }
}
