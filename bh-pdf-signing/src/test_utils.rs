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

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use bh_csc::{HttpGetClient, HttpPostClient, PostRequest};

use crate::{
    engine::{BoxError, SessionParameters, SigningEngine, SigningSession},
    error::TimestampError,
    revocation::RevocationService,
    timestamp::{TimestampKind, TimestampRequest, TimestampResponse, TimestampService},
};

/// Network failure raised by the stub clients.
#[derive(Debug)]
pub(crate) struct StubNetworkError;

impl std::fmt::Display for StubNetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection refused")
    }
}

impl std::error::Error for StubNetworkError {}

pub(crate) fn response(status: u16, body: Vec<u8>) -> http::Response<Vec<u8>> {
    http::Response::builder().status(status).body(body).unwrap()
}

/// GET client answering from a fixed URL to response map.
#[derive(Default)]
pub(crate) struct StubGetClient {
    responses: HashMap<String, http::Response<Vec<u8>>>,
    pub(crate) requests: Mutex<Vec<String>>,
}

impl StubGetClient {
    pub(crate) fn with(mut self, url: &str, response: http::Response<Vec<u8>>) -> Self {
        self.responses.insert(url.to_owned(), response);
        self
    }
}

impl HttpGetClient for StubGetClient {
    type Err = StubNetworkError;

    async fn get(&self, url: &str) -> std::result::Result<reqwest::Response, StubNetworkError> {
        self.requests.lock().unwrap().push(url.to_owned());

        self.responses
            .get(url)
            .map(|response| reqwest::Response::from(response.clone()))
            .ok_or(StubNetworkError)
    }
}

/// POST client which records requests and answers with a fixed response.
pub(crate) struct StubPostClient {
    response: Option<http::Response<Vec<u8>>>,
    pub(crate) requests: Mutex<Vec<PostRequest>>,
}

impl StubPostClient {
    pub(crate) fn answering(response: http::Response<Vec<u8>>) -> Self {
        Self {
            response: Some(response),
            requests: Mutex::new(vec![]),
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            response: None,
            requests: Mutex::new(vec![]),
        }
    }
}

impl HttpPostClient for StubPostClient {
    type Err = StubNetworkError;

    async fn post(
        &self,
        request: PostRequest,
    ) -> std::result::Result<reqwest::Response, StubNetworkError> {
        self.requests.lock().unwrap().push(request);

        self.response
            .clone()
            .map(reqwest::Response::from)
            .ok_or(StubNetworkError)
    }
}

#[derive(Debug)]
pub(crate) struct EngineFailure(pub(crate) &'static str);

impl std::fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for EngineFailure {}

/// Log of the engine calls, shared by all sessions of a [`FakeEngine`].
pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

/// Engine whose sessions hash to `hash-<input path>`.
///
/// Documents can be made to fail at opening, hashing or finalization.
#[derive(Default)]
pub(crate) struct FakeEngine {
    pub(crate) unopenable: HashSet<String>,
    pub(crate) unhashable: HashSet<String>,
    pub(crate) unfinalizable: HashSet<String>,
    pub(crate) crl_urls: Vec<String>,
    pub(crate) calls: CallLog,
}

impl FakeEngine {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub(crate) struct FakeSession {
    pub(crate) parameters: SessionParameters,
    hashable: bool,
    finalizable: bool,
    crl_urls: Vec<String>,
    calls: CallLog,
}

impl FakeSession {
    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SigningSession for FakeSession {
    fn calculate_hash(&mut self) -> Option<String> {
        self.log(format!("hash {}", self.parameters.input_path));
        self.hashable
            .then(|| format!("hash-{}", self.parameters.input_path))
    }

    fn finalize_signing(&mut self, signed_hash: &str, tsr_base64: &str) -> Result<(), BoxError> {
        self.log(format!(
            "finalize {} {signed_hash} [{tsr_base64}]",
            self.parameters.output_path
        ));
        if self.finalizable {
            Ok(())
        } else {
            Err(Box::new(EngineFailure("corrupted document")))
        }
    }

    fn crl_urls(&self) -> Vec<String> {
        self.crl_urls.clone()
    }

    fn add_validation_data(&mut self, crls_base64: &[String]) -> Result<(), BoxError> {
        self.log(format!(
            "validation {} {}",
            self.parameters.output_path,
            crls_base64.join(",")
        ));
        Ok(())
    }

    fn begin_document_timestamp(&mut self) -> Option<String> {
        self.log(format!("begin-doc-ts {}", self.parameters.output_path));
        Some("ZG9jdW1lbnQ=".to_owned())
    }

    fn finish_document_timestamp(&mut self, tsr_base64: &str) -> Result<(), BoxError> {
        self.log(format!(
            "finish-doc-ts {} [{tsr_base64}]",
            self.parameters.output_path
        ));
        Ok(())
    }
}

impl SigningEngine for FakeEngine {
    type Session = FakeSession;

    fn open_session(&self, parameters: SessionParameters) -> Result<FakeSession, BoxError> {
        if self.unopenable.contains(&parameters.input_path) {
            return Err(Box::new(EngineFailure("unreadable document")));
        }

        Ok(FakeSession {
            hashable: !self.unhashable.contains(&parameters.input_path),
            finalizable: !self.unfinalizable.contains(&parameters.input_path),
            crl_urls: self.crl_urls.clone(),
            calls: self.calls.clone(),
            parameters,
        })
    }
}

/// Timestamp authority answering `tsr-<n>` to the n-th request.
#[derive(Default)]
pub(crate) struct FakeTimestampService {
    pub(crate) failing: bool,
    pub(crate) requests: Mutex<Vec<TimestampRequest>>,
}

impl FakeTimestampService {
    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub(crate) fn kinds(&self) -> Vec<TimestampKind> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.kind)
            .collect()
    }
}

impl TimestampService for FakeTimestampService {
    async fn request_timestamp(
        &self,
        request: TimestampRequest,
    ) -> bherror::Result<TimestampResponse, TimestampError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request);

        if self.failing {
            return Err(bherror::Error::root(TimestampError::Network));
        }

        Ok(TimestampResponse {
            base64_tsr: format!("tsr-{}", requests.len()),
        })
    }
}

/// Revocation source answering with fixed CRLs and recording the URLs.
#[derive(Default)]
pub(crate) struct FakeRevocationService {
    pub(crate) crls: Vec<String>,
    pub(crate) requested: Mutex<Vec<Vec<String>>>,
}

impl RevocationService for FakeRevocationService {
    async fn fetch_crl_data_from_urls(&self, urls: &[String]) -> Vec<String> {
        self.requested.lock().unwrap().push(urls.to_vec());
        self.crls.clone()
    }
}
