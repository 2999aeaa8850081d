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

use std::{collections::HashMap, sync::Mutex};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bh_csc::{HttpGetClient, HttpPostClient, PostRequest};
use bh_jws_utils::{jwt, Es256Signer, JwtSigner as _, SigningAlgorithm};
use bhx5chain::{JwtX5Chain, X5Chain};
use openssl::{
    asn1::Asn1Time,
    bn::{BigNum, MsbOption},
    ec::{EcGroup, EcKey},
    hash::MessageDigest,
    nid::Nid,
    pkey::PKey,
    x509::{extension::SubjectAlternativeName, X509Builder, X509NameBuilder, X509},
};
use reqwest::Url;
use serde_json::{json, Value};

use crate::{
    access::AccessValidating,
    client::{Client, PreregisteredClient, SupportedClientIdScheme},
    config::DocumentRetrievalConfiguration,
    error::ValidationError,
    jwt::RequestJwtHeader,
    Result,
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

pub(crate) fn response(status: u16, body: impl Into<String>) -> http::Response<String> {
    http::Response::builder()
        .status(status)
        .body(body.into())
        .unwrap()
}

/// GET client answering from a fixed URL to response map.
///
/// Unknown URLs fail like an unreachable host.
#[derive(Default)]
pub(crate) struct StubGetClient {
    responses: HashMap<String, http::Response<String>>,
    pub(crate) requests: Mutex<Vec<String>>,
}

impl StubGetClient {
    pub(crate) fn with(mut self, url: &str, response: http::Response<String>) -> Self {
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
    response: Option<http::Response<String>>,
    pub(crate) requests: Mutex<Vec<PostRequest>>,
}

impl StubPostClient {
    pub(crate) fn answering(response: http::Response<String>) -> Self {
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

/// Validator accepting or rejecting every request object.
pub(crate) struct FixedValidator(pub(crate) bool);

impl AccessValidating for FixedValidator {
    async fn validate(&self, _client: &Client, _jwt: &str) -> Result<()> {
        if self.0 {
            Ok(())
        } else {
            Err(bherror::Error::root(ValidationError::AccessValidation(
                "signature rejected".to_owned(),
            )))
        }
    }
}

/// A self-signed P-256 certificate with a single DNS subjectAltName, and
/// a signer for its key.
pub(crate) struct TestCertificate {
    pub(crate) certificate: X509,
    pub(crate) signer: Es256Signer,
}

impl TestCertificate {
    pub(crate) fn new(dns_name: &str) -> Self {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        let ec_key = EcKey::generate(&group).unwrap();
        let signer = Es256Signer::from_private_key_pem(
            "test-kid".to_owned(),
            &ec_key.private_key_to_pem().unwrap(),
        )
        .unwrap();
        let pkey = PKey::from_ec_key(ec_key).unwrap();

        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, dns_name).unwrap();
        let name = name.build();

        let mut serial = BigNum::new().unwrap();
        serial.rand(128, MsbOption::MAYBE_ZERO, false).unwrap();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        builder
            .set_serial_number(&serial.to_asn1_integer().unwrap())
            .unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&pkey).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(365).unwrap())
            .unwrap();
        let san = SubjectAlternativeName::new()
            .dns(dns_name)
            .build(&builder.x509v3_context(None, None))
            .unwrap();
        builder.append_extension(san).unwrap();
        builder.sign(&pkey, MessageDigest::sha256()).unwrap();

        Self {
            certificate: builder.build(),
            signer,
        }
    }

    /// Base64url SHA-256 of the DER certificate, as used by `x509_hash`.
    pub(crate) fn hash(&self) -> String {
        URL_SAFE_NO_PAD.encode(openssl::sha::sha256(&self.certificate.to_der().unwrap()))
    }

    pub(crate) fn x5c(&self) -> JwtX5Chain {
        X5Chain::new(vec![self.certificate.clone()]).unwrap().try_into().unwrap()
    }
}

fn sign(signer: &Es256Signer, header: RequestJwtHeader, claims: Value) -> String {
    let token: jwt::Token<RequestJwtHeader, Value, jwt::token::Signed> =
        signer.sign_jwt(jwt::Token::new(header, claims)).unwrap();
    token.as_str().to_owned()
}

/// Request object signed with the certificate key, carrying the chain in
/// `x5c`.
pub(crate) fn signed_jwt(certificate: &TestCertificate, claims: Value) -> String {
    let header = RequestJwtHeader {
        alg: SigningAlgorithm::Es256,
        kid: None,
        typ: Some("oauth-authz-req+jwt".to_owned()),
        x5c: Some(certificate.x5c()),
    };

    sign(&certificate.signer, header, claims)
}

/// Request object signed with `signer`, identified by `kid`.
pub(crate) fn signed_jwt_with_kid(signer: &Es256Signer, kid: &str, claims: Value) -> String {
    let header = RequestJwtHeader {
        alg: SigningAlgorithm::Es256,
        kid: Some(kid.to_owned()),
        typ: Some("oauth-authz-req+jwt".to_owned()),
        x5c: None,
    };

    sign(signer, header, claims)
}

/// Compact JWT with a garbage signature.
pub(crate) fn unsigned_jwt(claims: Value) -> String {
    format!(
        "{}.{}.c2ln",
        URL_SAFE_NO_PAD.encode(json!({ "alg": "ES256" }).to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

pub(crate) fn preregistered_config(
    client_id: &str,
    jwks_uri: Option<Url>,
) -> DocumentRetrievalConfiguration {
    let mut client = PreregisteredClient::new("Verifier Ltd");
    client.jwks_uri = jwks_uri;

    DocumentRetrievalConfiguration::new(vec![SupportedClientIdScheme::Preregistered(
        HashMap::from([(client_id.to_owned(), client)]),
    )])
}

pub(crate) fn es256_verifier(
    alg: SigningAlgorithm,
) -> Option<&'static dyn bh_jws_utils::SignatureVerifier> {
    (alg == SigningAlgorithm::Es256).then_some(&bh_jws_utils::Es256Verifier)
}
