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

//! Authorization request models, and the parsing of incoming request URLs.

use std::collections::HashMap;

use bh_csc::DocumentDigest;
use bherror::traits::ForeignError as _;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::ValidationError, Result};

const CLIENT_ID: &str = "client_id";
const CLIENT_ID_SCHEME: &str = "client_id_scheme";
const CLIENT_DATA: &str = "clientData";
const DOCUMENT_DIGESTS: &str = "documentDigests";
const DOCUMENT_LOCATIONS: &str = "documentLocations";
const HASH_ALGORITHM_OID: &str = "hashAlgorithmOID";
const NONCE: &str = "nonce";
const REQUEST: &str = "request";
const REQUEST_URI: &str = "request_uri";
const REQUEST_URI_METHOD: &str = "request_uri_method";
const RESPONSE_MODE: &str = "response_mode";
const RESPONSE_TYPE: &str = "response_type";
const RESPONSE_URI: &str = "response_uri";
const SIGNATURE_QUALIFIER: &str = "signatureQualifier";
const STATE: &str = "state";

/// The method used to retrieve a request object by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RequestUriMethod {
    /// `GET`
    #[strum(to_string = "GET")]
    Get,
    /// `POST`
    #[strum(to_string = "POST")]
    Post,
}

impl RequestUriMethod {
    /// Parses a method name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("get") {
            Some(Self::Get)
        } else if name.eq_ignore_ascii_case("post") {
            Some(Self::Post)
        } else {
            None
        }
    }
}

/// The `response_type` of an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ResponseType {
    /// `vp_token`
    #[strum(to_string = "vp_token")]
    VpToken,
    /// `id_token`
    #[strum(to_string = "id_token")]
    IdToken,
    /// `vp_token id_token`
    #[strum(to_string = "vp_token id_token")]
    VpAndIdToken,
    /// `code`
    #[strum(to_string = "code")]
    Code,
}

impl ResponseType {
    /// Parses the wire value of a response type.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vp_token" => Some(Self::VpToken),
            "id_token" => Some(Self::IdToken),
            "vp_token id_token" | "id_token vp_token" => Some(Self::VpAndIdToken),
            "code" => Some(Self::Code),
            _ => None,
        }
    }
}

/// The `response_mode` of an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ResponseMode {
    /// `direct_post`
    #[strum(to_string = "direct_post")]
    DirectPost,
    /// `direct_post.jwt`
    #[strum(to_string = "direct_post.jwt")]
    DirectPostJwt,
    /// `query`
    #[strum(to_string = "query")]
    Query,
    /// `fragment`
    #[strum(to_string = "fragment")]
    Fragment,
}

impl ResponseMode {
    /// Parses the wire value of a response mode.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "direct_post" => Some(Self::DirectPost),
            "direct_post.jwt" => Some(Self::DirectPostJwt),
            "query" => Some(Self::Query),
            "fragment" => Some(Self::Fragment),
            _ => None,
        }
    }
}

/// Method used to access a document location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessMethod {
    /// Access method type, e.g. `public` or `OTP`.
    #[serde(rename = "type")]
    pub type_: String,
}

/// Where a document to be signed can be downloaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLocation {
    /// Location of the document.
    pub uri: String,
    /// How to access the location.
    pub method: AccessMethod,
}

/// The parameters of an authorization request, as sent by the verifier.
///
/// Every field is optional, the mandatory ones are checked during
/// resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestObject {
    /// `response_type`
    #[serde(rename = "response_type", skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    /// `client_id`
    #[serde(rename = "client_id", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// `client_id_scheme`
    #[serde(rename = "client_id_scheme", skip_serializing_if = "Option::is_none")]
    pub client_id_scheme: Option<String>,
    /// `response_mode`
    #[serde(rename = "response_mode", skip_serializing_if = "Option::is_none")]
    pub response_mode: Option<String>,
    /// `response_uri`
    #[serde(rename = "response_uri", skip_serializing_if = "Option::is_none")]
    pub response_uri: Option<String>,
    /// `request_uri`
    #[serde(rename = "request_uri", skip_serializing_if = "Option::is_none")]
    pub request_uri: Option<String>,
    /// `nonce`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// `state`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// `signatureQualifier`
    #[serde(rename = "signatureQualifier", skip_serializing_if = "Option::is_none")]
    pub signature_qualifier: Option<String>,
    /// `documentDigests`
    #[serde(rename = "documentDigests", skip_serializing_if = "Option::is_none")]
    pub document_digests: Option<Vec<DocumentDigest>>,
    /// `documentLocations`
    #[serde(rename = "documentLocations", skip_serializing_if = "Option::is_none")]
    pub document_locations: Option<Vec<DocumentLocation>>,
    /// `hashAlgorithmOID`
    #[serde(rename = "hashAlgorithmOID", skip_serializing_if = "Option::is_none")]
    pub hash_algorithm_oid: Option<String>,
    /// `clientData`
    #[serde(rename = "clientData", skip_serializing_if = "Option::is_none")]
    pub client_data: Option<String>,
}

/// A request object which has not been authenticated yet.
pub type UnvalidatedRequestObject = RequestObject;

impl RequestObject {
    /// Maps a JSON object onto a [`RequestObject`].
    ///
    /// Unlike deserialization, this never fails: fields of an unexpected
    /// type are treated as absent, and malformed array entries are dropped.
    pub fn from_json(json: &Value) -> Self {
        let string = |name: &str| json.get(name).and_then(Value::as_str).map(str::to_owned);

        Self {
            response_type: string(RESPONSE_TYPE),
            client_id: string(CLIENT_ID),
            client_id_scheme: string(CLIENT_ID_SCHEME),
            response_mode: string(RESPONSE_MODE),
            response_uri: string(RESPONSE_URI),
            request_uri: string(REQUEST_URI),
            nonce: string(NONCE),
            state: string(STATE),
            signature_qualifier: string(SIGNATURE_QUALIFIER),
            document_digests: json.get(DOCUMENT_DIGESTS).and_then(document_digests),
            document_locations: json.get(DOCUMENT_LOCATIONS).and_then(document_locations),
            hash_algorithm_oid: string(HASH_ALGORITHM_OID),
            client_data: string(CLIENT_DATA),
        }
    }

    /// Builds a [`RequestObject`] from decoded URL query parameters.
    ///
    /// `documentDigests` and `documentLocations` are expected to be JSON
    /// arrays.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let string = |name: &str| params.get(name).cloned();
        let json_array = |name: &str| {
            params
                .get(name)
                .and_then(|value| serde_json::from_str::<Value>(value).ok())
        };

        Self {
            response_type: string(RESPONSE_TYPE),
            client_id: string(CLIENT_ID),
            client_id_scheme: string(CLIENT_ID_SCHEME),
            response_mode: string(RESPONSE_MODE),
            response_uri: string(RESPONSE_URI),
            request_uri: string(REQUEST_URI),
            nonce: string(NONCE),
            state: string(STATE),
            signature_qualifier: string(SIGNATURE_QUALIFIER),
            document_digests: json_array(DOCUMENT_DIGESTS)
                .as_ref()
                .and_then(document_digests),
            document_locations: json_array(DOCUMENT_LOCATIONS)
                .as_ref()
                .and_then(document_locations),
            hash_algorithm_oid: string(HASH_ALGORITHM_OID),
            client_data: string(CLIENT_DATA),
        }
    }
}

fn string_or_empty(json: &Value, name: &str) -> String {
    json.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn document_digests(json: &Value) -> Option<Vec<DocumentDigest>> {
    let digests = json
        .as_array()?
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| DocumentDigest {
            label: string_or_empty(entry, "label"),
            hash: string_or_empty(entry, "hash"),
        })
        .collect();

    Some(digests)
}

fn document_locations(json: &Value) -> Option<Vec<DocumentLocation>> {
    let locations = json
        .as_array()?
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| DocumentLocation {
            uri: string_or_empty(entry, "uri"),
            method: AccessMethod {
                type_: entry
                    .get("method")
                    .map(|method| string_or_empty(method, "type"))
                    .unwrap_or_default(),
            },
        })
        .collect();

    Some(locations)
}

/// An authorization request as received by the wallet, before the request
/// object is retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnvalidatedRequest {
    /// All parameters are passed in the URL.
    Plain(RequestObject),
    /// The request object is passed in the URL as a JWT.
    JwtByValue {
        /// The `client_id` URL parameter.
        client_id: String,
        /// The compact JWT.
        jwt: String,
    },
    /// The request object is to be fetched from `uri`.
    JwtByReference {
        /// The `client_id` URL parameter.
        client_id: String,
        /// Where to fetch the request object from.
        uri: Url,
        /// How to fetch the request object; `GET` when absent.
        method: Option<RequestUriMethod>,
    },
}

impl UnvalidatedRequest {
    /// Parses an authorization request URL.
    ///
    /// A `request_uri` parameter takes precedence over `request`, which in
    /// turn takes precedence over inline parameters.
    pub fn parse(url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).foreign_err(|| ValidationError::InvalidRequestUrl(url.to_owned()))?;

        let mut params = HashMap::new();
        for (name, value) in parsed.query_pairs() {
            params.entry(name.into_owned()).or_insert(value.into_owned());
        }

        let client_id = || {
            params
                .get(CLIENT_ID)
                .filter(|client_id| !client_id.is_empty())
                .cloned()
                .ok_or_else(|| bherror::Error::root(ValidationError::MissingClientId))
        };

        if let Some(request_uri) = params.get(REQUEST_URI) {
            let uri = Url::parse(request_uri)
                .foreign_err(|| ValidationError::InvalidRequestUrl(request_uri.clone()))?;

            let method = match params.get(REQUEST_URI_METHOD) {
                Some(name) => Some(RequestUriMethod::from_name(name).ok_or_else(|| {
                    bherror::Error::root(ValidationError::InvalidRequestUriMethod(name.clone()))
                })?),
                None => None,
            };

            return Ok(Self::JwtByReference {
                client_id: client_id()?,
                uri,
                method,
            });
        }

        if let Some(jwt) = params.get(REQUEST) {
            return Ok(Self::JwtByValue {
                client_id: client_id()?,
                jwt: jwt.clone(),
            });
        }

        Ok(Self::Plain(RequestObject::from_query(&params)))
    }
}

/// A request whose request object has been materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedRequest {
    /// Unsigned request object.
    Plain(RequestObject),
    /// Signed request object.
    JwtSecured {
        /// The `client_id` URL parameter.
        client_id: String,
        /// The compact JWT.
        jwt: String,
    },
}

impl FetchedRequest {
    /// Returns `true` for JWT-secured requests.
    pub fn is_secured(&self) -> bool {
        matches!(self, Self::JwtSecured { .. })
    }
}
