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

//! OAuth2 authorization code flow against the remote signing service.
//!
//! The flow has two legs. The wallet first opens the URL produced by
//! [`prepare_service_authorization`] or [`prepare_credential_authorization`]
//! in a browser, and the user authenticates with the signing service. The
//! service then redirects back with an authorization code, which is exchanged
//! for an access token with [`OAuth2TokenClient::request_token`]. The
//! [`Pkce`] returned by the first leg must be kept until the second one.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bh_uri_utils::UriPathExtensions as _;
use bherror::traits::{ForeignError as _, PropagateError as _};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ClientError, ClientResult},
    pkce::{Pkce, CODE_CHALLENGE_METHOD},
    transport::{HttpPostClient, PostRequest},
};

/// Path of the authorization endpoint, relative to the issuer.
pub const AUTHORIZE_PATH: &str = "/oauth2/authorize";

/// Path of the token endpoint, relative to the issuer.
pub const TOKEN_PATH: &str = "/oauth2/token";

/// OAuth2 client registration at the signing service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2Client {
    /// The registered client identifier.
    pub client_id: String,
    /// The client secret, used for HTTP Basic authentication.
    pub client_secret: String,
}

/// Configuration of the wallet as a client of the signing service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CscClientConfig {
    /// OAuth2 client registration.
    #[serde(rename = "OAuth2Client")]
    pub oauth2_client: OAuth2Client,
    /// Redirect URI registered for the authorization code flow.
    #[serde(rename = "authFlowRedirectionURI")]
    pub auth_flow_redirection_uri: String,
    /// Identifier of the remote signing service provider.
    #[serde(default)]
    pub rssp_id: Option<String>,
    /// Timestamp authority used for conformance levels above B-B.
    #[serde(default)]
    pub tsa_url: Option<String>,
    /// Whether revocation data is embedded into long-term signatures.
    #[serde(default)]
    pub include_revocation_info: bool,
}

/// The scope requested at the authorization endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Scope {
    /// Access to the service, e.g. for listing credentials.
    #[strum(to_string = "service")]
    Service,
    /// Authorization to sign with a specific credential.
    #[strum(to_string = "credential")]
    Credential,
}

/// Result of preparing an authorization request.
#[derive(Debug, Clone)]
pub struct AuthorizationPrepareResponse {
    /// The URL to open in the user agent.
    pub authorization_code_url: String,
    /// PKCE state to be used when redeeming the code.
    pub pkce: Pkce,
}

/// Prepares an authorization request for the `service` scope.
pub fn prepare_service_authorization(
    wallet_state: &str,
    config: &CscClientConfig,
    issuer: &Url,
) -> ClientResult<AuthorizationPrepareResponse> {
    prepare_authorization(wallet_state, config, issuer, Scope::Service, None)
}

/// Prepares an authorization request for the `credential` scope, carrying the
/// serialized `authorization_details`.
pub fn prepare_credential_authorization(
    wallet_state: &str,
    config: &CscClientConfig,
    authorization_details: &str,
    issuer: &Url,
) -> ClientResult<AuthorizationPrepareResponse> {
    prepare_authorization(
        wallet_state,
        config,
        issuer,
        Scope::Credential,
        Some(authorization_details),
    )
}

fn prepare_authorization(
    wallet_state: &str,
    config: &CscClientConfig,
    issuer: &Url,
    scope: Scope,
    authorization_details: Option<&str>,
) -> ClientResult<AuthorizationPrepareResponse> {
    let pkce = Pkce::generate();

    let mut url = issuer
        .clone()
        .add_path_suffix(AUTHORIZE_PATH)
        .with_err(|| ClientError::InvalidRequestUrl)?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.oauth2_client.client_id)
            .append_pair("redirect_uri", &config.auth_flow_redirection_uri)
            .append_pair("scope", &scope.to_string())
            .append_pair("code_challenge", pkce.code_challenge())
            .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD)
            .append_pair("state", wallet_state);

        if let Some(authorization_details) = authorization_details {
            query.append_pair("authorization_details", authorization_details);
        }
    }

    Ok(AuthorizationPrepareResponse {
        authorization_code_url: url.into(),
        pkce,
    })
}

/// Credentials for HTTP Basic authentication at the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    /// User name, usually the client identifier.
    pub username: String,
    /// Password, usually the client secret.
    pub password: String,
}

impl BasicAuth {
    fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

/// Authorization code redemption request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2TokenRequest {
    /// The authorization code received on the redirect URI.
    pub code: String,
    /// The client identifier.
    pub client_id: String,
    /// The redirect URI used in the authorization request.
    pub redirect_uri: String,
    /// The PKCE code verifier.
    pub code_verifier: String,
    /// Optional client secret sent in the form body.
    pub client_secret: Option<String>,
    /// Serialized authorization details of a credential-scoped request.
    pub authorization_details: Option<String>,
    /// Optional HTTP Basic credentials.
    pub auth: Option<BasicAuth>,
}

impl OAuth2TokenRequest {
    fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("grant_type", "authorization_code"),
            ("code", self.code.as_str()),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code_verifier", self.code_verifier.as_str()),
        ];

        if let Some(client_secret) = &self.client_secret {
            fields.push(("client_secret", client_secret.as_str()));
        }

        fields
    }
}

/// Successful response of the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessTokenResponse {
    /// The issued access token.
    pub access_token: String,
    /// Token type, usually `Bearer`.
    pub token_type: String,
    /// Lifetime of the token in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Refresh token, if issued.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Credential the token is bound to, for credential-scoped tokens.
    #[serde(default)]
    pub credential_id: Option<String>,
}

/// Client of the OAuth2 token endpoint.
pub struct OAuth2TokenClient<C: HttpPostClient> {
    client: C,
}

impl<C: HttpPostClient> OAuth2TokenClient<C> {
    /// Construct [`OAuth2TokenClient`] from a [`HttpPostClient`].
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Redeems an authorization code at `issuer`'s token endpoint.
    pub async fn request_token(
        &self,
        request: &OAuth2TokenRequest,
        issuer: &Url,
    ) -> ClientResult<AccessTokenResponse> {
        let mut url = issuer
            .clone()
            .add_path_suffix(TOKEN_PATH)
            .with_err(|| ClientError::InvalidRequestUrl)?;

        if let Some(authorization_details) = request
            .authorization_details
            .as_deref()
            .filter(|details| !details.is_empty())
        {
            url.query_pairs_mut()
                .append_pair("authorization_details", authorization_details);
        }

        let mut post = PostRequest::form(url.as_str(), &request.form_fields());
        if let Some(auth) = &request.auth {
            post = post.with_authorization(auth.header_value());
        }

        let response = self
            .client
            .post(post)
            .await
            .foreign_err(|| ClientError::Network)?;

        let status = response.status();
        let body = response.text().await.foreign_err(|| ClientError::Network)?;

        if !status.is_success() {
            return Err(bherror::Error::root(ClientError::UnacceptableStatus(
                status.as_u16(),
                body,
            )));
        }

        serde_json::from_str(&body).foreign_err(|| ClientError::InvalidResponse)
    }
}
