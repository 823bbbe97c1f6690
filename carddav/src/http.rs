// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Authenticated HTTP access for card writes and capability checks.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, ETAG, IF_MATCH, IF_NONE_MATCH};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};

use crate::config::{AuthMethod, CardDavConfig};
use crate::error::CardDavError;
use crate::types::{ETag, Href};

const VCARD_CONTENT_TYPE: &str = "text/vcard; charset=utf-8";

/// Condition a card write is guarded by.
#[derive(Debug, Clone, Copy)]
pub enum Precondition<'a> {
    /// Nothing may exist at the URL yet (`If-None-Match: *`).
    Absent,
    /// The card must still carry this etag (`If-Match`).
    Matches(&'a ETag),
}

impl Precondition<'_> {
    fn apply(self, req: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Absent => req.header(IF_NONE_MATCH, "*"),
            Self::Matches(etag) => req.header(IF_MATCH, etag.as_str()),
        }
    }
}

/// HTTP client for `CardDAV` operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    auth: AuthMethod,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: &CardDavConfig) -> Result<Self, CardDavError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            auth: config.auth.clone(),
        })
    }

    /// Starts a request to `url` carrying the configured credentials.
    pub fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let req = self.client.request(method, url.clone());
        match &self.auth {
            AuthMethod::Basic { username, password } => req.basic_auth(username, Some(password)),
            AuthMethod::Bearer { token } => req.bearer_auth(token),
            AuthMethod::None => req,
        }
    }

    /// Sends `req` and maps non-2xx statuses to errors.
    ///
    /// # Errors
    ///
    /// Returns [`CardDavError::NotFound`] on 404,
    /// [`CardDavError::PreconditionFailed`] on 412, and
    /// [`CardDavError::Http`] for any other failure.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, CardDavError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let url = resp.url().clone();
        match status {
            StatusCode::NOT_FOUND => Err(CardDavError::NotFound(Href::new(url.path().to_string()))),
            StatusCode::PRECONDITION_FAILED => {
                Err(CardDavError::PreconditionFailed(url.to_string()))
            }
            _ => {
                let text = resp.text().await.unwrap_or_default();
                Err(CardDavError::Http(format!("{status}: {text}")))
            }
        }
    }

    /// Whether the `DAV` header of an `OPTIONS` response lists `addressbook`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn supports_address_books(&self, url: &Url) -> Result<bool, CardDavError> {
        let resp = self.execute(self.request(Method::OPTIONS, url)).await?;
        Ok(resp
            .headers()
            .get_all("DAV")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|class| class.trim() == "addressbook"))
    }

    /// Uploads a vCard body to `url`.
    ///
    /// Returns the new etag, which servers may omit; the next sync picks the
    /// value up then.
    ///
    /// # Errors
    ///
    /// Returns an error if the PUT fails or `precondition` does not hold.
    pub async fn put_vcard(
        &self,
        url: &Url,
        body: String,
        precondition: Precondition<'_>,
    ) -> Result<Option<ETag>, CardDavError> {
        let req = self
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, VCARD_CONTENT_TYPE)
            .body(body);
        let resp = self.execute(precondition.apply(req)).await?;
        Ok(resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| ETag::new(s.to_string())))
    }

    /// Deletes the resource at `url` if it still carries `etag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the DELETE fails or the etag moved.
    pub async fn delete(&self, url: &Url, etag: &ETag) -> Result<(), CardDavError> {
        let req = Precondition::Matches(etag).apply(self.request(Method::DELETE, url));
        self.execute(req).await?;
        Ok(())
    }
}
