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

//! Request data after validation and resolution.

use bh_csc::DocumentDigest;
use bherror::traits::ForeignError as _;
use reqwest::Url;

use crate::{
    client::Client,
    error::ValidationError,
    request::{DocumentLocation, ResponseMode},
    Result,
};

/// An authorization request that passed validation.
///
/// The response type is always `vp_token`, the nonce is always present and
/// the client is authenticated.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    /// Identifier of the authenticated client.
    pub client_id: String,
    /// The authenticated client.
    pub client: Client,
    /// Nonce of the request.
    pub nonce: String,
    /// How the response is to be delivered.
    pub response_mode: Option<ResponseMode>,
    /// Where the response is to be delivered, unparsed.
    pub response_uri: Option<String>,
    /// Opaque verifier state, echoed in the response.
    pub state: Option<String>,
    /// Requested signature qualifier, e.g. `eu_eidas_qes`.
    pub signature_qualifier: Option<String>,
    /// Digests of the documents to sign.
    pub document_digests: Option<Vec<DocumentDigest>>,
    /// Where the documents to sign can be downloaded from.
    pub document_locations: Option<Vec<DocumentLocation>>,
    /// OID of the hash algorithm used for the digests.
    pub hash_algorithm_oid: Option<String>,
    /// Arbitrary verifier data.
    pub client_data: Option<String>,
}

/// Wrapper of a [`ValidatedRequest`].
#[derive(Debug, Clone)]
pub struct ValidatedRequestData {
    /// The validated request.
    pub request: ValidatedRequest,
}

impl ValidatedRequestData {
    /// The authenticated client.
    pub fn client(&self) -> &Client {
        &self.request.client
    }

    /// Nonce of the request.
    pub fn nonce(&self) -> &str {
        &self.request.nonce
    }

    /// Opaque verifier state.
    pub fn state(&self) -> Option<&str> {
        self.request.state.as_deref()
    }
}

/// Fully resolved authorization request, ready to be presented to the user
/// and answered through the [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone)]
pub struct ResolvedRequestData {
    /// The authenticated client.
    pub client: Client,
    /// Nonce of the request.
    pub nonce: String,
    /// How the response is to be delivered.
    pub response_mode: Option<ResponseMode>,
    /// Opaque verifier state, echoed in the response.
    pub state: Option<String>,
    /// Requested signature qualifier.
    pub signature_qualifier: Option<String>,
    /// Digests of the documents to sign.
    pub document_digests: Option<Vec<DocumentDigest>>,
    /// Where the documents to sign can be downloaded from.
    pub document_locations: Option<Vec<DocumentLocation>>,
    /// OID of the hash algorithm used for the digests.
    pub hash_algorithm_oid: Option<String>,
    /// Arbitrary verifier data.
    pub client_data: Option<String>,
    /// Where the response is to be posted.
    pub response_uri: Option<Url>,
}

impl ResolvedRequestData {
    /// Resolves `validated` data, parsing its response URI.
    pub fn resolve(validated: ValidatedRequestData) -> Result<Self> {
        let request = validated.request;

        let response_uri = request
            .response_uri
            .as_deref()
            .map(|uri| {
                Url::parse(uri).foreign_err(|| ValidationError::InvalidRequestUrl(uri.to_owned()))
            })
            .transpose()?;

        Ok(Self {
            client: request.client,
            nonce: request.nonce,
            response_mode: request.response_mode,
            state: request.state,
            signature_qualifier: request.signature_qualifier,
            document_digests: request.document_digests,
            document_locations: request.document_locations,
            hash_algorithm_oid: request.hash_algorithm_oid,
            client_data: request.client_data,
            response_uri,
        })
    }
}
