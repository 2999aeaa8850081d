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

use std::collections::HashMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bherror::traits::{ErrorContext as _, ForeignError as _, PropagateError as _};
use bhx5chain::{X509Trust, X5Chain};
use openssl::x509::X509;
use reqwest::Url;

use crate::{
    config::DocumentRetrievalConfiguration,
    error::ValidationError,
    jwt::{decode_request_object, header_x5c},
    request::FetchedRequest,
    Result,
};

/// Client identifier schemes defined by OpenID4VP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ClientIdScheme {
    /// `pre-registered`
    #[strum(to_string = "pre-registered")]
    PreRegistered,
    /// `redirect_uri`
    #[strum(to_string = "redirect_uri")]
    RedirectUri,
    /// `https`
    #[strum(to_string = "https")]
    Https,
    /// `x509_san_dns`
    #[strum(to_string = "x509_san_dns")]
    X509SanDns,
    /// `x509_hash`
    #[strum(to_string = "x509_hash")]
    X509Hash,
}

impl ClientIdScheme {
    /// Parses the wire name of a scheme.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pre-registered" => Some(Self::PreRegistered),
            "redirect_uri" => Some(Self::RedirectUri),
            "https" => Some(Self::Https),
            "x509_san_dns" => Some(Self::X509SanDns),
            "x509_hash" => Some(Self::X509Hash),
            _ => None,
        }
    }
}

/// A verifier known to the wallet in advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreregisteredClient {
    /// Human readable name of the verifier.
    pub legal_name: String,
    /// Where the verifier publishes its request signing keys.
    pub jwks_uri: Option<Url>,
}

impl PreregisteredClient {
    /// Creates a pre-registered client with no published keys.
    pub fn new(legal_name: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            jwks_uri: None,
        }
    }

    /// Sets the JWK Set location of the client.
    pub fn with_jwks_uri(mut self, jwks_uri: Url) -> Self {
        self.jwks_uri = Some(jwks_uri);
        self
    }
}

/// A client identifier scheme accepted by the wallet.
///
/// The x509 based schemes optionally carry the trusted roots the request
/// signing certificate chain must verify against.
#[derive(Debug, Clone)]
pub enum SupportedClientIdScheme {
    /// Clients known in advance, keyed by their identifier.
    Preregistered(HashMap<String, PreregisteredClient>),
    /// The client identifier is the hash of the signing certificate.
    X509Hash {
        /// Trusted roots, if the chain has to be verified.
        trust: Option<X509Trust>,
    },
    /// The client identifier is a DNS name of the signing certificate.
    X509SanDns {
        /// Trusted roots, if the chain has to be verified.
        trust: Option<X509Trust>,
        /// Whether the client identifier must equal a SAN DNS name of the
        /// leaf certificate.
        require_san_match: bool,
    },
}

impl SupportedClientIdScheme {
    /// The scheme this configuration entry implements.
    pub fn scheme(&self) -> ClientIdScheme {
        match self {
            Self::Preregistered(_) => ClientIdScheme::PreRegistered,
            Self::X509Hash { .. } => ClientIdScheme::X509Hash,
            Self::X509SanDns { .. } => ClientIdScheme::X509SanDns,
        }
    }
}

/// An authenticated verifier.
#[derive(Debug, Clone)]
pub enum Client {
    /// Verifier from the pre-registered list.
    PreRegistered {
        /// Client identifier.
        id: String,
        /// Human readable name of the verifier.
        legal_name: String,
        /// Where the verifier publishes its request signing keys.
        jwks_uri: Option<Url>,
    },
    /// Verifier identified by its certificate hash.
    X509Hash {
        /// Client identifier.
        id: String,
        /// Leaf certificate of the request signature.
        certificate: X509,
    },
    /// Verifier identified by a certificate DNS name.
    X509SanDns {
        /// Client identifier.
        id: String,
        /// Leaf certificate of the request signature.
        certificate: X509,
    },
}

impl Client {
    /// The client identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::PreRegistered { id, .. }
            | Self::X509Hash { id, .. }
            | Self::X509SanDns { id, .. } => id,
        }
    }

    /// The scheme the client was authenticated with.
    pub fn scheme(&self) -> ClientIdScheme {
        match self {
            Self::PreRegistered { .. } => ClientIdScheme::PreRegistered,
            Self::X509Hash { .. } => ClientIdScheme::X509Hash,
            Self::X509SanDns { .. } => ClientIdScheme::X509SanDns,
        }
    }
}

/// Resolves the [`Client`] of a request against the configured schemes.
#[derive(Debug, Clone, Copy)]
pub struct ClientAuthenticator<'a> {
    config: &'a DocumentRetrievalConfiguration,
}

impl<'a> ClientAuthenticator<'a> {
    /// Creates a new authenticator over `config`.
    pub fn new(config: &'a DocumentRetrievalConfiguration) -> Self {
        Self { config }
    }

    /// Authenticates the client of `request`.
    ///
    /// Plain requests can only come from pre-registered clients, as there is
    /// no signature to bind the client to.
    pub fn authenticate(&self, request: &FetchedRequest) -> Result<Client> {
        match request {
            FetchedRequest::Plain(object) => {
                let client_id = non_empty(object.client_id.as_deref())?;

                match self.select_scheme(object.client_id_scheme.as_deref())? {
                    SupportedClientIdScheme::Preregistered(clients) => {
                        preregistered(clients, client_id)
                    }
                    other => Err(bherror::Error::root(
                        ValidationError::UnsupportedClientIdScheme(other.scheme().to_string()),
                    )
                    .ctx("unsigned requests require a pre-registered client")),
                }
            }
            FetchedRequest::JwtSecured { client_id, jwt } => {
                let client_id = non_empty(Some(client_id))?;

                let object = decode_request_object(jwt)
                    .ok_or_else(|| bherror::Error::root(ValidationError::InvalidRequest))
                    .ctx(|| "undecodable request object")?;

                if object
                    .client_id
                    .as_deref()
                    .is_some_and(|inner| inner != client_id)
                {
                    return Err(bherror::Error::root(ValidationError::InvalidRequest)
                        .ctx("client_id differs from the request object client_id"));
                }

                match self.select_scheme(object.client_id_scheme.as_deref())? {
                    SupportedClientIdScheme::Preregistered(clients) => {
                        preregistered(clients, client_id)
                    }
                    SupportedClientIdScheme::X509Hash { trust } => {
                        let chain = certificate_chain(jwt, trust.as_ref())?;
                        let certificate = chain.leaf_certificate();

                        let der = certificate
                            .to_der()
                            .foreign_err(|| ValidationError::InvalidCertificateChain)?;
                        let hash = URL_SAFE_NO_PAD.encode(openssl::sha::sha256(&der));

                        if hash != client_id {
                            return Err(bherror::Error::root(ValidationError::ClientIdHashMismatch));
                        }

                        Ok(Client::X509Hash {
                            id: client_id.to_owned(),
                            certificate: certificate.clone(),
                        })
                    }
                    SupportedClientIdScheme::X509SanDns {
                        trust,
                        require_san_match,
                    } => {
                        let chain = certificate_chain(jwt, trust.as_ref())?;
                        let certificate = chain.leaf_certificate();

                        if *require_san_match && !has_dns_name(certificate, client_id) {
                            return Err(bherror::Error::root(ValidationError::ClientIdDnsMismatch));
                        }

                        Ok(Client::X509SanDns {
                            id: client_id.to_owned(),
                            certificate: certificate.clone(),
                        })
                    }
                }
            }
        }
    }

    fn select_scheme(&self, declared: Option<&str>) -> Result<&'a SupportedClientIdScheme> {
        let config = self.config;
        let schemes = &config.supported_client_id_schemes;

        let Some(default) = schemes.first() else {
            return Err(bherror::Error::root(
                ValidationError::NoSupportedClientIdScheme,
            ));
        };

        let declared_scheme = declared.and_then(ClientIdScheme::from_name);
        if let Some(scheme) = declared_scheme
            .and_then(|declared| schemes.iter().find(|scheme| scheme.scheme() == declared))
        {
            return Ok(scheme);
        }

        tracing::warn!(
            declared = declared.unwrap_or_default(),
            fallback = %default.scheme(),
            "client_id_scheme is not configured, falling back to the first configured scheme"
        );

        Ok(default)
    }
}

fn has_dns_name(certificate: &X509, dns_name: &str) -> bool {
    certificate.subject_alt_names().is_some_and(|names| {
        names
            .iter()
            .filter_map(|name| name.dnsname())
            .any(|dns| dns == dns_name)
    })
}

fn non_empty(client_id: Option<&str>) -> Result<&str> {
    client_id
        .filter(|client_id| !client_id.is_empty())
        .ok_or_else(|| bherror::Error::root(ValidationError::MissingClientId))
}

fn preregistered(clients: &HashMap<String, PreregisteredClient>, client_id: &str) -> Result<Client> {
    let client = clients.get(client_id).ok_or_else(|| {
        bherror::Error::root(ValidationError::PreregisteredClientNotFound(
            client_id.to_owned(),
        ))
    })?;

    Ok(Client::PreRegistered {
        id: client_id.to_owned(),
        legal_name: client.legal_name.clone(),
        jwks_uri: client.jwks_uri.clone(),
    })
}

fn certificate_chain(jwt: &str, trust: Option<&X509Trust>) -> Result<X5Chain> {
    let jwt_x5chain = header_x5c(jwt)
        .ok_or_else(|| bherror::Error::root(ValidationError::MissingCertificateChain))?;

    let x5chain: X5Chain = jwt_x5chain
        .try_into()
        .with_err(|| ValidationError::InvalidCertificateChain)?;

    if let Some(trust) = trust {
        x5chain
            .verify_against_trusted_roots(trust)
            .with_err(|| ValidationError::UntrustedCertificateChain)?;
    }

    Ok(x5chain)
}
