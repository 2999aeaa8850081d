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

//! Verification of request object signatures.

use std::future::Future;

use bh_csc::HttpGetClient;
use bh_jws_utils::{
    jwt, public_jwk_from_x5chain_leaf, JwkPublic, JwkSet, JwtVerifier as _, SignatureVerifier,
    SigningAlgorithm,
};
use bherror::traits::{ForeignBoxed as _, ForeignError as _, PropagateError as _};
use bhx5chain::X5Chain;
use reqwest::Url;
use serde_json::Value;

use crate::{client::Client, error::ValidationError, jwt::RequestJwtHeader, Result};

type UnverifiedRequestJwt<'a> = jwt::Token<RequestJwtHeader, Value, jwt::Unverified<'a>>;
type VerifiedRequestJwt = jwt::Token<RequestJwtHeader, Value, jwt::token::Verified>;

/// Capability verifying that a JWT-secured request really comes from the
/// authenticated [`Client`].
pub trait AccessValidating: Sync {
    /// Validates the signed request object `jwt` of `client`.
    fn validate(&self, client: &Client, jwt: &str) -> impl Future<Output = Result<()>> + Send;
}

fn access_error(reason: impl Into<String>) -> ValidationError {
    ValidationError::AccessValidation(reason.into())
}

/// [`AccessValidating`] implementation checking the JWS signature of the
/// request object.
///
/// Certificate based clients are verified with the leaf key of the `x5c`
/// header. Pre-registered clients are verified with a key from the JWK Set
/// published at their `jwks_uri`, which is fetched on every call.
pub struct JwsAccessValidator<C, F> {
    http_client: C,
    get_signature_verifier: F,
}

impl<'a, C, F> JwsAccessValidator<C, F>
where
    C: HttpGetClient,
    F: Fn(SigningAlgorithm) -> Option<&'a dyn SignatureVerifier> + Sync,
{
    /// Creates a new validator.
    ///
    /// The `get_signature_verifier` closure picks the verifier for the `alg`
    /// of the request object header; algorithms it returns `None` for are
    /// rejected.
    pub fn new(http_client: C, get_signature_verifier: F) -> Self {
        Self {
            http_client,
            get_signature_verifier,
        }
    }

    async fn jwks_key(&self, jwks_uri: Option<&Url>, kid: Option<&str>) -> Result<JwkPublic> {
        let jwks_uri = jwks_uri
            .ok_or_else(|| bherror::Error::root(access_error("client has no jwks_uri")))?;

        let response = self
            .http_client
            .get(jwks_uri.as_str())
            .await
            .foreign_err(|| access_error(format!("unable to fetch {jwks_uri}")))?;

        if !response.status().is_success() {
            return Err(bherror::Error::root(access_error(format!(
                "unable to fetch {jwks_uri}: HTTP {}",
                response.status().as_u16()
            ))));
        }

        let jwk_set: JwkSet = response
            .json()
            .await
            .foreign_err(|| access_error("invalid JWK Set"))?;

        select_key(jwk_set, kid)
    }
}

fn select_key(jwk_set: JwkSet, kid: Option<&str>) -> Result<JwkPublic> {
    let mut keys = jwk_set.keys;

    match kid {
        Some(kid) => keys
            .into_iter()
            .find(|key| key.get("kid").and_then(Value::as_str) == Some(kid))
            .ok_or_else(|| bherror::Error::root(access_error(format!("no key with kid {kid}")))),
        None if keys.len() == 1 => Ok(keys.remove(0)),
        None => Err(bherror::Error::root(access_error(
            "kid is required to select a key",
        ))),
    }
}

fn x5c_key(header: &RequestJwtHeader) -> Result<JwkPublic> {
    let jwt_x5chain = header
        .x5c
        .clone()
        .ok_or_else(|| bherror::Error::root(ValidationError::MissingCertificateChain))?;

    let x5chain: X5Chain = jwt_x5chain
        .try_into()
        .with_err(|| ValidationError::InvalidCertificateChain)?;

    public_jwk_from_x5chain_leaf(&x5chain, &header.alg, header.kid.as_deref())
        .with_err(|| access_error("unusable certificate key"))
}

impl<'a, C, F> AccessValidating for JwsAccessValidator<C, F>
where
    C: HttpGetClient,
    F: Fn(SigningAlgorithm) -> Option<&'a dyn SignatureVerifier> + Sync,
{
    async fn validate(&self, client: &Client, jwt: &str) -> Result<()> {
        let unverified: UnverifiedRequestJwt = jwt::Token::parse_unverified(jwt)
            .foreign_err(|| access_error("malformed request object"))?;

        let alg = unverified.header().alg;
        let verifier = (self.get_signature_verifier)(alg)
            .ok_or_else(|| bherror::Error::root(access_error(format!("unsupported alg {alg}"))))?;

        let public_key = match client {
            Client::X509Hash { .. } | Client::X509SanDns { .. } => x5c_key(unverified.header())?,
            Client::PreRegistered { jwks_uri, .. } => {
                self.jwks_key(jwks_uri.as_ref(), unverified.header().kid.as_deref())
                    .await?
            }
        };

        let _verified: VerifiedRequestJwt = verifier
            .verify_jwt_signature(unverified, &public_key)
            .foreign_boxed_err(|| access_error("invalid request object signature"))?;

        tracing::debug!(client_id = client.id(), "request object signature verified");

        Ok(())
    }
}
