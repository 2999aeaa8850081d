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

//! Lightweight helpers for inspecting compact JWTs before their signature is
//! verified.

use bh_csc::decode_base64_any;
use bh_jws_utils::{jwt, SigningAlgorithm};
use bhx5chain::JwtX5Chain;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::RequestObject;

/// Header of a signed request object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestJwtHeader {
    /// Algorithm used to sign the request object.
    pub alg: SigningAlgorithm,

    /// Optional identifier of the signing key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Optional type of the JWT, usually `oauth-authz-req+jwt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Optional certificate chain of the signing key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x5c: Option<JwtX5Chain>,
}

impl jwt::JoseHeader for RequestJwtHeader {
    fn algorithm_type(&self) -> jwt::AlgorithmType {
        self.alg.into()
    }
}

fn segments(jwt: &str) -> Option<(&str, &str)> {
    let mut parts = jwt.trim().split('.');
    let header = parts.next()?;
    let payload = parts.next()?;
    Some((header, payload))
}

fn decode_segment(segment: &str) -> Option<Value> {
    let bytes = decode_base64_any(segment.trim())?;
    serde_json::from_slice(&bytes).ok()
}

/// Returns `true` if `input` has the shape of a compact JWS.
pub(crate) fn looks_like_jwt(input: &str) -> bool {
    let parts: Vec<_> = input.trim().split('.').collect();

    parts.len() == 3
        && !parts[0].is_empty()
        && !parts[1].is_empty()
        && parts.iter().all(|part| {
            part.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '=')
        })
}

/// Decodes the payload of `jwt` into a [`RequestObject`] without verifying
/// its signature.
pub fn decode_request_object(jwt: &str) -> Option<RequestObject> {
    let (_, payload) = segments(jwt)?;
    let payload = decode_segment(payload)?;

    payload
        .is_object()
        .then(|| RequestObject::from_json(&payload))
}

/// Decodes the header of `jwt` without verifying its signature.
pub fn decode_header(jwt: &str) -> Option<RequestJwtHeader> {
    let (header, _) = segments(jwt)?;
    serde_json::from_value(decode_segment(header)?).ok()
}

/// Returns the `x5c` certificate chain of the `jwt` header, if any.
pub fn header_x5c(jwt: &str) -> Option<JwtX5Chain> {
    let (header, _) = segments(jwt)?;
    let header = decode_segment(header)?;
    serde_json::from_value(header.get("x5c")?.clone()).ok()
}
