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

use crate::{
    access::AccessValidating,
    client::{Client, ClientAuthenticator},
    error::ValidationError,
    jwt::decode_request_object,
    request::{FetchedRequest, RequestObject, ResponseMode, ResponseType},
    validated::{ValidatedRequest, ValidatedRequestData},
    Result,
};

/// A fetched request whose client has been authenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    /// The authenticated client.
    pub client: Client,
    /// The request object, not validated yet.
    pub request_object: RequestObject,
}

/// Authenticates fetched requests, and validates their contents.
#[derive(Debug)]
pub struct RequestAuthenticator<'a, V> {
    client_authenticator: ClientAuthenticator<'a>,
    validator: &'a V,
}

impl<'a, V: AccessValidating> RequestAuthenticator<'a, V> {
    /// Creates a new request authenticator.
    pub fn new(client_authenticator: ClientAuthenticator<'a>, validator: &'a V) -> Self {
        Self {
            client_authenticator,
            validator,
        }
    }

    /// Authenticates the client of `request`.
    ///
    /// For JWT-secured requests, the request object is additionally checked
    /// by the [`AccessValidating`] capability.
    pub async fn authenticate(&self, request: &FetchedRequest) -> Result<AuthenticatedRequest> {
        match request {
            FetchedRequest::Plain(object) => {
                let client = self.client_authenticator.authenticate(request)?;

                Ok(AuthenticatedRequest {
                    client,
                    request_object: object.clone(),
                })
            }
            FetchedRequest::JwtSecured { jwt, .. } => {
                let request_object = decode_request_object(jwt)
                    .ok_or_else(|| bherror::Error::root(ValidationError::InvalidRequest))?;

                let client = self.client_authenticator.authenticate(request)?;
                self.validator.validate(&client, jwt).await?;

                Ok(AuthenticatedRequest {
                    client,
                    request_object,
                })
            }
        }
    }

    /// Validates the contents of an authenticated request.
    ///
    /// The response type must be `vp_token` and the nonce must be present.
    pub fn create_validated_data(
        &self,
        authenticated: AuthenticatedRequest,
    ) -> Result<ValidatedRequestData> {
        let AuthenticatedRequest {
            client,
            request_object: object,
        } = authenticated;

        let response_type_name = object
            .response_type
            .as_deref()
            .ok_or_else(|| bherror::Error::root(ValidationError::MissingResponseType))?;
        let response_type = ResponseType::from_name(response_type_name).ok_or_else(|| {
            bherror::Error::root(ValidationError::UnsupportedResponseType(
                response_type_name.to_owned(),
            ))
        })?;

        if response_type != ResponseType::VpToken {
            return Err(bherror::Error::root(
                ValidationError::UnsupportedResponseType(response_type.to_string()),
            ));
        }

        let nonce = object
            .nonce
            .ok_or_else(|| bherror::Error::root(ValidationError::MissingNonce))?;

        let response_mode = object
            .response_mode
            .as_deref()
            .map(|name| {
                ResponseMode::from_name(name).ok_or_else(|| {
                    bherror::Error::root(ValidationError::UnsupportedResponseMode(name.to_owned()))
                })
            })
            .transpose()?;

        Ok(ValidatedRequestData {
            request: ValidatedRequest {
                client_id: client.id().to_owned(),
                client,
                nonce,
                response_mode,
                response_uri: object.response_uri,
                state: object.state,
                signature_qualifier: object.signature_qualifier,
                document_digests: object.document_digests,
                document_locations: object.document_locations,
                hash_algorithm_oid: object.hash_algorithm_oid,
                client_data: object.client_data,
            },
        })
    }
}
