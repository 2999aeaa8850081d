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

//! Delivery of the authorization response to the verifier.

use bh_csc::{HttpPostClient, PostRequest};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::{error::DispatchError, validated::ResolvedRequestData};

/// Error code sent when the user declines the request.
pub const USER_CANCELLED: &str = "user_cancelled";

/// The decision of the user on a resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consent {
    /// The user signed the documents.
    Positive {
        /// Signed documents, base64 encoded.
        document_with_signature: Option<Vec<String>>,
        /// Detached signatures, base64 encoded.
        signature_object: Option<Vec<String>>,
    },
    /// The user declined.
    Negative,
}

/// The response posted to the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResponsePayload {
    /// Signing succeeded.
    Success {
        /// Signed documents, base64 encoded.
        document_with_signature: Option<Vec<String>>,
        /// Detached signatures, base64 encoded.
        signature_object: Option<Vec<String>>,
        /// State of the request.
        state: Option<String>,
    },
    /// The request could not be processed.
    InvalidRequest {
        /// Error description.
        error: String,
        /// State of the request.
        state: Option<String>,
    },
    /// The user declined the request.
    NoConsensusResponseData {
        /// State of the request.
        state: Option<String>,
    },
}

impl AuthorizationResponsePayload {
    /// Builds the payload answering a request with the given `state`.
    pub fn from_consent(consent: Consent, state: Option<String>) -> Self {
        match consent {
            Consent::Positive {
                document_with_signature,
                signature_object,
            } => Self::Success {
                document_with_signature,
                signature_object,
                state,
            },
            Consent::Negative => Self::NoConsensusResponseData { state },
        }
    }

    /// The form fields of the payload, in wire order.
    ///
    /// Arrays are encoded as JSON strings, and absent values are left out.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();

        let state = match self {
            Self::Success {
                document_with_signature,
                signature_object,
                state,
            } => {
                if let Some(documents) = document_with_signature {
                    fields.push(("documentWithSignature", json_array(documents)));
                }
                if let Some(signatures) = signature_object {
                    fields.push(("signatureObject", json_array(signatures)));
                }
                state
            }
            Self::InvalidRequest { error, state } => {
                fields.push(("error", error.clone()));
                state
            }
            Self::NoConsensusResponseData { state } => {
                fields.push(("error", USER_CANCELLED.to_owned()));
                state
            }
        };

        if let Some(state) = state {
            fields.push(("state", state.clone()));
        }

        fields
    }
}

fn json_array(values: &[String]) -> String {
    Value::from(values.to_vec()).to_string()
}

/// How the verifier answered the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The verifier accepted the response.
    Accepted {
        /// Where the verifier wants the user to be taken next.
        redirect_uri: Option<Url>,
    },
    /// The response could not be delivered, or the verifier refused it.
    Rejected {
        /// Diagnostic description of the failure.
        reason: String,
    },
}

/// Posts authorization responses to verifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher;

impl Dispatcher {
    /// Answers the `resolved` request according to the user's `consent`.
    ///
    /// Fails only if the request has no response URI; delivery failures are
    /// reported as [`DispatchOutcome::Rejected`].
    pub async fn dispatch<P: HttpPostClient>(
        poster: &P,
        resolved: &ResolvedRequestData,
        consent: Consent,
    ) -> bherror::Result<DispatchOutcome, DispatchError> {
        let response_uri = resolved
            .response_uri
            .as_ref()
            .ok_or_else(|| bherror::Error::root(DispatchError::InvalidUrl))?;

        let payload = AuthorizationResponsePayload::from_consent(consent, resolved.state.clone());

        Ok(Self::post(poster, response_uri, &payload).await)
    }

    /// Posts `payload` to `url` as a form.
    pub async fn post<P: HttpPostClient>(
        poster: &P,
        url: &Url,
        payload: &AuthorizationResponsePayload,
    ) -> DispatchOutcome {
        let request = PostRequest::form(url.as_str(), &payload.form_fields());

        let response = match poster.post(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%url, %error, "authorization response not delivered");
                return DispatchOutcome::Rejected {
                    reason: format!("Network error: {error}"),
                };
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            tracing::debug!(%url, status = status.as_u16(), "authorization response rejected");
            return DispatchOutcome::Rejected {
                reason: format!("HTTP {}. {}", status.as_u16(), body),
            };
        }

        let redirect_uri = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| json.get("redirect_uri")?.as_str().map(str::to_owned))
            .and_then(|uri| match Url::parse(&uri) {
                Ok(uri) => Some(uri),
                Err(error) => {
                    tracing::warn!(%uri, %error, "ignoring malformed redirect_uri");
                    None
                }
            });

        tracing::debug!(%url, "authorization response accepted");

        DispatchOutcome::Accepted { redirect_uri }
    }
}
