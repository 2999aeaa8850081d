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

use crate::{
    access::AccessValidating,
    authenticator::RequestAuthenticator,
    client::ClientAuthenticator,
    config::DocumentRetrievalConfiguration,
    error::ValidationError,
    fetcher::RequestFetcher,
    request::{FetchedRequest, UnvalidatedRequest},
    validated::ResolvedRequestData,
    Result,
};

/// Outcome of resolving an authorization request.
#[derive(Debug)]
pub enum AuthorizationRequest {
    /// The request was passed in plain URL parameters.
    NotSecured(ResolvedRequestData),
    /// The request object was a signed JWT.
    Jwt(ResolvedRequestData),
    /// Resolution failed.
    InvalidResolution(bherror::Error<ValidationError>),
}

impl AuthorizationRequest {
    /// The resolved data, unless resolution failed.
    pub fn resolved(&self) -> Option<&ResolvedRequestData> {
        match self {
            Self::NotSecured(data) | Self::Jwt(data) => Some(data),
            Self::InvalidResolution(_) => None,
        }
    }

    /// The resolution error, if resolution failed.
    pub fn error(&self) -> Option<&bherror::Error<ValidationError>> {
        match self {
            Self::InvalidResolution(error) => Some(error),
            Self::NotSecured(_) | Self::Jwt(_) => None,
        }
    }
}

/// Resolves [`UnvalidatedRequest`]s into [`AuthorizationRequest`]s.
///
/// The resolver holds no mutable state, so a single instance can serve
/// concurrent callers.
pub struct AuthorizationRequestResolver<C, V> {
    config: DocumentRetrievalConfiguration,
    http_client: C,
    validator: V,
}

impl<C: HttpGetClient, V: AccessValidating> AuthorizationRequestResolver<C, V> {
    /// Creates a new resolver.
    ///
    /// The `http_client` is used for fetching request objects by reference,
    /// and `validator` for checking the JWT-secured ones.
    pub fn new(config: DocumentRetrievalConfiguration, http_client: C, validator: V) -> Self {
        Self {
            config,
            http_client,
            validator,
        }
    }

    /// The configuration of the resolver.
    pub fn config(&self) -> &DocumentRetrievalConfiguration {
        &self.config
    }

    /// Resolves `request`.
    ///
    /// Any failure ends the resolution in
    /// [`AuthorizationRequest::InvalidResolution`], carrying the error of the
    /// failing stage.
    pub async fn resolve(&self, request: UnvalidatedRequest) -> AuthorizationRequest {
        match self.try_resolve(request).await {
            Ok(resolved) => resolved,
            Err(error) => {
                tracing::debug!(%error, "authorization request resolution failed");
                AuthorizationRequest::InvalidResolution(error)
            }
        }
    }

    async fn try_resolve(&self, request: UnvalidatedRequest) -> Result<AuthorizationRequest> {
        tracing::debug!("fetching authorization request");
        let fetched = RequestFetcher::new(&self.http_client).fetch(request).await?;

        tracing::debug!(secured = fetched.is_secured(), "authenticating client");
        let authenticator =
            RequestAuthenticator::new(ClientAuthenticator::new(&self.config), &self.validator);
        let authenticated = authenticator.authenticate(&fetched).await?;

        tracing::debug!(client_id = authenticated.client.id(), "validating request");
        let validated = authenticator.create_validated_data(authenticated)?;
        let resolved = ResolvedRequestData::resolve(validated)?;

        Ok(match fetched {
            FetchedRequest::Plain(_) => AuthorizationRequest::NotSecured(resolved),
            FetchedRequest::JwtSecured { .. } => AuthorizationRequest::Jwt(resolved),
        })
    }
}
