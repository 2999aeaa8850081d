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

use bh_csc::{HttpGetClient, HttpPostClient};

use crate::{
    access::AccessValidating,
    config::DocumentRetrievalConfiguration,
    dispatcher::{Consent, DispatchOutcome, Dispatcher},
    error::DispatchError,
    request::UnvalidatedRequest,
    resolver::{AuthorizationRequest, AuthorizationRequestResolver},
    validated::ResolvedRequestData,
    Result,
};

/// Entry point of the library, covering the whole life of a request: parsing
/// the request URL, resolving it and answering it.
pub struct DocumentRetrieval<C, V> {
    resolver: AuthorizationRequestResolver<C, V>,
}

impl<C: HttpGetClient, V: AccessValidating> DocumentRetrieval<C, V> {
    /// Creates a new instance.
    ///
    /// See [`AuthorizationRequestResolver::new`] for the meaning of the
    /// arguments.
    pub fn new(config: DocumentRetrievalConfiguration, http_client: C, validator: V) -> Self {
        Self {
            resolver: AuthorizationRequestResolver::new(config, http_client, validator),
        }
    }

    /// Parses an authorization request URL.
    pub fn parse(&self, url: &str) -> Result<UnvalidatedRequest> {
        UnvalidatedRequest::parse(url)
    }

    /// Resolves a parsed request.
    pub async fn resolve(&self, request: UnvalidatedRequest) -> AuthorizationRequest {
        self.resolver.resolve(request).await
    }

    /// Parses and resolves an authorization request URL.
    pub async fn resolve_url(&self, url: &str) -> AuthorizationRequest {
        match self.parse(url) {
            Ok(request) => self.resolve(request).await,
            Err(error) => AuthorizationRequest::InvalidResolution(error),
        }
    }

    /// Answers a resolved request with the user's `consent`.
    pub async fn dispatch<P: HttpPostClient>(
        &self,
        poster: &P,
        resolved: &ResolvedRequestData,
        consent: Consent,
    ) -> bherror::Result<DispatchOutcome, DispatchError> {
        Dispatcher::dispatch(poster, resolved, consent).await
    }

    /// The configuration in use.
    pub fn config(&self) -> &DocumentRetrievalConfiguration {
        self.resolver.config()
    }
}
