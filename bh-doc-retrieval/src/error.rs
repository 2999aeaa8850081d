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

//! Error types used throughout the crate.

/// Errors raised while resolving an authorization request.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum ValidationError {
    /// The request could not be decoded.
    #[strum(to_string = "Invalid request")]
    InvalidRequest,
    /// The fetched request object is neither a JWT nor a `{"jwt": ...}` envelope.
    #[strum(to_string = "Invalid JWT payload")]
    InvalidJwtPayload,
    /// The request carries no `client_id`, or an empty one.
    #[strum(to_string = "clientId is missing")]
    MissingClientId,
    /// No client identifier scheme is configured.
    #[strum(to_string = "No supported client Id scheme")]
    NoSupportedClientIdScheme,
    /// The selected scheme cannot authenticate this kind of request.
    #[strum(to_string = "Scheme {0} not supported")]
    UnsupportedClientIdScheme(String),
    /// The client is not in the pre-registered client list.
    #[strum(to_string = "Preregistered client not found: {0}")]
    PreregisteredClientNotFound(String),
    /// The JWT header has no `x5c` certificate chain.
    #[strum(to_string = "No certificate in header")]
    MissingCertificateChain,
    /// The `x5c` certificate chain could not be parsed.
    #[strum(to_string = "No valid certificate in chain")]
    InvalidCertificateChain,
    /// The certificate chain does not verify against the configured trust.
    #[strum(to_string = "Certificate chain is not trusted")]
    UntrustedCertificateChain,
    /// The `client_id` differs from the leaf certificate hash.
    #[strum(to_string = "ClientId does not match leaf certificate's SHA-256 hash")]
    ClientIdHashMismatch,
    /// The `client_id` is not a DNS name of the leaf certificate.
    #[strum(to_string = "ClientId does not match any DNS name of the leaf certificate")]
    ClientIdDnsMismatch,
    /// The `request_uri_method` is not supported.
    #[strum(to_string = "Invalid request uri method: {0}")]
    InvalidRequestUriMethod(String),
    /// The request has no `response_type`.
    #[strum(to_string = "Missing response type")]
    MissingResponseType,
    /// The `response_type` is unknown or not `vp_token`.
    #[strum(to_string = "Unsupported response type: {0}")]
    UnsupportedResponseType(String),
    /// The request has no `nonce`.
    #[strum(to_string = "Missing nonce")]
    MissingNonce,
    /// The `response_mode` is unknown.
    #[strum(to_string = "Unsupported response mode: {0}")]
    UnsupportedResponseMode(String),
    /// The request object signature could not be verified.
    #[strum(to_string = "Access validation failed: {0}")]
    AccessValidation(String),
    /// A URL of the request is malformed.
    #[strum(to_string = "Invalid request URL: {0}")]
    InvalidRequestUrl(String),
    /// The request object could not be fetched.
    #[strum(to_string = "Unable to fetch the request object from {0}")]
    Fetch(String),
}

impl bherror::BhError for ValidationError {}

/// Errors raised before a response is sent to the verifier.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum DispatchError {
    /// The resolved request carries no usable `response_uri`.
    #[strum(to_string = "Invalid response URL")]
    InvalidUrl,
}

impl bherror::BhError for DispatchError {}

/// Result type used by the resolution pipeline.
pub type Result<T> = bherror::Result<T, ValidationError>;
