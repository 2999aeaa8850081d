// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Abstractions over the HTTP transport.
//!
//! The library never talks to the network directly. Every component that
//! needs to send a request is generic over [`HttpGetClient`] or
//! [`HttpPostClient`], so that the application can plug in a client with
//! its own policies (e.g. host allow-listing, proxies, certificate pinning).
//! [`ReqwestClient`] is the default implementation.

use std::future::Future;

use reqwest::{header, Client, ClientBuilder};

/// Content type of URL-encoded form bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Interface providing functionality of sending HTTP GET request.
pub trait HttpGetClient: Sync {
    /// Error type used by this trait.
    type Err: std::error::Error + Send + Sync + 'static;

    /// Performs a HTTP GET request with provided `url`.
    fn get(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<reqwest::Response, Self::Err>> + Send;
}

/// A HTTP POST request to be sent by a [`HttpPostClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    /// Target URL.
    pub url: String,
    /// Value of the `Content-Type` header.
    pub content_type: String,
    /// Value of the `Authorization` header, if any.
    pub authorization: Option<String>,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl PostRequest {
    /// Creates a `application/x-www-form-urlencoded` request from ordered
    /// form fields.
    pub fn form<K: AsRef<str>, V: AsRef<str>>(url: impl Into<String>, fields: &[(K, V)]) -> Self {
        Self {
            url: url.into(),
            content_type: FORM_URLENCODED.to_owned(),
            authorization: None,
            body: form_urlencode(fields).into_bytes(),
        }
    }

    /// Sets the `Authorization` header.
    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }
}

/// Interface providing functionality of sending HTTP POST request.
pub trait HttpPostClient: Sync {
    /// Error type used by this trait.
    type Err: std::error::Error + Send + Sync + 'static;

    /// Sends the given POST `request`.
    fn post(
        &self,
        request: PostRequest,
    ) -> impl Future<Output = std::result::Result<reqwest::Response, Self::Err>> + Send;
}

/// [`HttpGetClient`] and [`HttpPostClient`] implementation using the
/// [`reqwest`] crate.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient(Client);

impl ReqwestClient {
    /// Construct [`ReqwestClient`] from [`Client`].
    pub fn new(client: Client) -> Self {
        Self(client)
    }

    /// Construct [`ReqwestClient`] from [`ClientBuilder`].
    pub fn from_builder(builder: ClientBuilder) -> reqwest::Result<Self> {
        Ok(ReqwestClient(builder.build()?))
    }
}

impl HttpGetClient for ReqwestClient {
    type Err = reqwest::Error;

    fn get(&self, url: &str) -> impl Future<Output = reqwest::Result<reqwest::Response>> + Send {
        self.0.get(url).send()
    }
}

impl HttpPostClient for ReqwestClient {
    type Err = reqwest::Error;

    fn post(
        &self,
        request: PostRequest,
    ) -> impl Future<Output = reqwest::Result<reqwest::Response>> + Send {
        let mut builder = self
            .0
            .post(request.url)
            .header(header::CONTENT_TYPE, request.content_type)
            .body(request.body);

        if let Some(authorization) = request.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        builder.send()
    }
}

/// Encodes `fields` as an `application/x-www-form-urlencoded` body.
///
/// ASCII alphanumerics and `-._~` are kept as is, a space becomes `+` and
/// every other byte is percent-encoded. Field order is preserved.
pub fn form_urlencode<K: AsRef<str>, V: AsRef<str>>(fields: &[(K, V)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", escape(key.as_ref()), escape(value.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}

fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                escaped.push(byte as char)
            }
            b' ' => escaped.push('+'),
            _ => escaped.push_str(&format!("%{byte:02X}")),
        }
    }

    escaped
}
