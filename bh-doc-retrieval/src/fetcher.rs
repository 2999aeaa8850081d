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

use bh_csc::HttpGetClient;
use bherror::traits::ForeignError as _;
use serde_json::Value;

use crate::{
    error::ValidationError,
    jwt::looks_like_jwt,
    request::{FetchedRequest, RequestUriMethod, UnvalidatedRequest},
    Result,
};

/// Materializes the request object of an [`UnvalidatedRequest`].
#[derive(Debug)]
pub struct RequestFetcher<'c, C> {
    http_client: &'c C,
}

impl<'c, C: HttpGetClient> RequestFetcher<'c, C> {
    /// Creates a new fetcher using `http_client` for by-reference requests.
    pub fn new(http_client: &'c C) -> Self {
        Self { http_client }
    }

    /// Fetches the request object of `request`.
    ///
    /// Only by-reference requests touch the network. The referenced
    /// resource may either be a compact JWT, or a JSON object holding it in
    /// the `jwt` field.
    pub async fn fetch(&self, request: UnvalidatedRequest) -> Result<FetchedRequest> {
        match request {
            UnvalidatedRequest::Plain(object) => Ok(FetchedRequest::Plain(object)),
            UnvalidatedRequest::JwtByValue { client_id, jwt } => {
                Ok(FetchedRequest::JwtSecured { client_id, jwt })
            }
            UnvalidatedRequest::JwtByReference {
                client_id,
                uri,
                method,
            } => {
                let method = method.unwrap_or(RequestUriMethod::Get);
                if method != RequestUriMethod::Get {
                    return Err(bherror::Error::root(
                        ValidationError::InvalidRequestUriMethod(method.to_string()),
                    ));
                }

                let response = self
                    .http_client
                    .get(uri.as_str())
                    .await
                    .foreign_err(|| ValidationError::Fetch(uri.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(bherror::Error::root(ValidationError::Fetch(uri.to_string()))
                        .ctx(format!("HTTP {}", status.as_u16())));
                }

                let body = response
                    .text()
                    .await
                    .foreign_err(|| ValidationError::Fetch(uri.to_string()))?;

                Ok(FetchedRequest::JwtSecured {
                    client_id,
                    jwt: extract_jwt(&body)?,
                })
            }
        }
    }
}

fn extract_jwt(body: &str) -> Result<String> {
    let body = body.trim();

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        return json
            .get("jwt")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| bherror::Error::root(ValidationError::InvalidJwtPayload));
    }

    if looks_like_jwt(body) {
        Ok(body.to_owned())
    } else {
        Err(bherror::Error::root(ValidationError::InvalidJwtPayload))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use reqwest::Url;
    use serde_json::json;

    use super::*;
    use crate::{
        request::RequestObject,
        test_utils::{response, StubGetClient},
    };

    const REQUEST_URI: &str = "https://verifier.example.com/request/1";
    const JWT: &str = "eyJhbGciOiJFUzI1NiJ9.eyJub25jZSI6Im4ifQ.c2ln";

    fn by_reference(method: Option<RequestUriMethod>) -> UnvalidatedRequest {
        UnvalidatedRequest::JwtByReference {
            client_id: "verifier".to_owned(),
            uri: Url::parse(REQUEST_URI).unwrap(),
            method,
        }
    }

    fn secured(jwt: &str) -> FetchedRequest {
        FetchedRequest::JwtSecured {
            client_id: "verifier".to_owned(),
            jwt: jwt.to_owned(),
        }
    }

    #[tokio::test]
    async fn inline_requests_are_passed_through() {
        let http_client = StubGetClient::default();
        let fetcher = RequestFetcher::new(&http_client);

        let plain = fetcher
            .fetch(UnvalidatedRequest::Plain(RequestObject::default()))
            .await
            .unwrap();
        assert_eq!(plain, FetchedRequest::Plain(RequestObject::default()));

        let by_value = fetcher
            .fetch(UnvalidatedRequest::JwtByValue {
                client_id: "verifier".to_owned(),
                jwt: JWT.to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(by_value, secured(JWT));
        assert!(http_client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn raw_jwt_body_is_fetched() {
        let http_client =
            StubGetClient::default().with(REQUEST_URI, response(200, format!("{JWT}\n")));

        let fetched = RequestFetcher::new(&http_client)
            .fetch(by_reference(None))
            .await
            .unwrap();

        assert_eq!(fetched, secured(JWT));
    }

    #[tokio::test]
    async fn json_envelope_is_unwrapped() {
        let http_client = StubGetClient::default()
            .with(REQUEST_URI, response(200, json!({ "jwt": JWT }).to_string()));

        let fetched = RequestFetcher::new(&http_client)
            .fetch(by_reference(Some(RequestUriMethod::Get)))
            .await
            .unwrap();

        assert_eq!(fetched, secured(JWT));
    }

    #[tokio::test]
    async fn unrecognized_body_is_rejected() {
        for body in [json!({ "token": JWT }).to_string(), "hello".to_owned()] {
            let http_client = StubGetClient::default().with(REQUEST_URI, response(200, body));

            let result = RequestFetcher::new(&http_client)
                .fetch(by_reference(None))
                .await;

            assert_matches!(result, Err(e) if e.error == ValidationError::InvalidJwtPayload);
        }
    }

    #[tokio::test]
    async fn post_method_is_rejected_before_fetching() {
        let http_client = StubGetClient::default();

        let result = RequestFetcher::new(&http_client)
            .fetch(by_reference(Some(RequestUriMethod::Post)))
            .await;

        assert_matches!(
            result,
            Err(e) if e.error == ValidationError::InvalidRequestUriMethod("POST".to_owned())
        );
        assert!(http_client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_failures_are_reported() {
        let unreachable = StubGetClient::default();
        let result = RequestFetcher::new(&unreachable)
            .fetch(by_reference(None))
            .await;
        assert_matches!(result, Err(e) if e.error == ValidationError::Fetch(REQUEST_URI.to_owned()));

        let not_found = StubGetClient::default().with(REQUEST_URI, response(404, "missing"));
        let result = RequestFetcher::new(&not_found)
            .fetch(by_reference(None))
            .await;
        assert_matches!(result, Err(e) if e.error == ValidationError::Fetch(REQUEST_URI.to_owned()));
    }
}
