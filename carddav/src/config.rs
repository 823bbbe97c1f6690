// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// `CardDAV` authentication method.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Basic authentication (username/password).
    #[serde(rename = "basic")]
    Basic {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Bearer token authentication (OAuth).
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// How an address book is refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMethod {
    /// Token based sync (RFC 6578) when the collection supports it, basic sync otherwise.
    #[default]
    Webdav,
    /// Always compare the ctag and refetch the whole collection on change.
    Basic,
}

/// How the incremental strategy obtains card bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaMode {
    /// List hrefs and etags only, then fetch changed cards in one `addressbook-multiget`.
    #[default]
    Multiget,
    /// Request `address-data` in the listing itself; never issues a multiget.
    Inline,
}

/// Synchronization options.
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct SyncOptions {
    /// Strategy selection.
    #[serde(default)]
    pub method: SyncMethod,
    /// Body retrieval for incremental sync.
    #[serde(default)]
    pub delta: DeltaMode,
}

/// `CardDAV` server configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CardDavConfig {
    /// Base URL of the `CardDAV` server; hrefs returned by the server resolve against it.
    pub base_url: String,
    /// Address book home path (e.g., /dav/addressbooks/user/).
    pub home_path: String,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Synchronization options.
    #[serde(default)]
    pub sync: SyncOptions,
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("davsync-carddav/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for CardDavConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            home_path: String::new(),
            auth: AuthMethod::default(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            sync: SyncOptions::default(),
        }
    }
}
