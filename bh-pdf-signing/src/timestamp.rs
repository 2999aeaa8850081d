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

//! RFC 3161 timestamp client.

use std::future::Future;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bh_csc::{normalize, DigestFormat, HttpPostClient, PostRequest};
use bherror::traits::{ForeignError as _, PropagateError as _};

use crate::{
    der::{
        build_algorithm_identifier, build_boolean, build_integer, build_octet_string,
        build_sequence, expect_tlv, TAG_INTEGER, TAG_SEQUENCE,
    },
    error::TimestampError,
};

/// Content type of an RFC 3161 `TimeStampReq`.
pub const TIMESTAMP_QUERY: &str = "application/timestamp-query";

/// DER encoded object identifier of SHA-256, `2.16.840.1.101.3.4.2.1`.
const SHA256_OID: [u8; 9] = [0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01];

const NONCE_LEN: usize = 8;

/// What the timestamped data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    /// A signature value; its SHA-256 becomes the message imprint.
    Signature,
    /// A SHA-256 document digest used as the message imprint as is.
    DocumentDigest,
}

/// Request for a timestamp token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRequest {
    /// `base64` or `base64url` data to be timestamped.
    pub data: String,
    /// URL of the timestamp authority.
    pub tsa_url: String,
    /// Interpretation of `data`.
    pub kind: TimestampKind,
}

impl TimestampRequest {
    /// Requests a signature timestamp over `signed_hash`.
    pub fn for_signature(signed_hash: impl Into<String>, tsa_url: impl Into<String>) -> Self {
        Self {
            data: signed_hash.into(),
            tsa_url: tsa_url.into(),
            kind: TimestampKind::Signature,
        }
    }

    /// Requests a document timestamp over a SHA-256 `digest`.
    pub fn for_document(digest: impl Into<String>, tsa_url: impl Into<String>) -> Self {
        Self {
            data: digest.into(),
            tsa_url: tsa_url.into(),
            kind: TimestampKind::DocumentDigest,
        }
    }
}

/// Timestamp authority answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampResponse {
    /// `base64` DER of the whole `TimeStampResp`.
    pub base64_tsr: String,
}

/// Interface of a timestamp authority client.
pub trait TimestampService: Sync {
    /// Obtains a timestamp token for the given `request`.
    fn request_timestamp(
        &self,
        request: TimestampRequest,
    ) -> impl Future<Output = bherror::Result<TimestampResponse, TimestampError>> + Send;
}

/// [`TimestampService`] speaking RFC 3161 over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTimestampService<C> {
    http_client: C,
}

impl<C: HttpPostClient> HttpTimestampService<C> {
    /// Creates a new [`HttpTimestampService`].
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }
}

impl<C: HttpPostClient> TimestampService for HttpTimestampService<C> {
    async fn request_timestamp(
        &self,
        request: TimestampRequest,
    ) -> bherror::Result<TimestampResponse, TimestampError> {
        let imprint = message_imprint(&request.data, request.kind)?;
        let nonce: [u8; NONCE_LEN] = rand::random();

        let post = PostRequest {
            url: request.tsa_url.clone(),
            content_type: TIMESTAMP_QUERY.to_owned(),
            authorization: None,
            body: time_stamp_req(&imprint, &nonce),
        };

        let response = self
            .http_client
            .post(post)
            .await
            .foreign_err(|| TimestampError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(bherror::Error::root(TimestampError::UnacceptableStatus(
                status.as_u16(),
            )));
        }

        let body = response
            .bytes()
            .await
            .foreign_err(|| TimestampError::Network)?;

        check_status(&body)?;

        tracing::debug!(tsa_url = %request.tsa_url, "timestamp token obtained");

        Ok(TimestampResponse {
            base64_tsr: STANDARD.encode(&body),
        })
    }
}

fn message_imprint(
    data: &str,
    kind: TimestampKind,
) -> bherror::Result<[u8; 32], TimestampError> {
    let normalized =
        normalize(data, DigestFormat::Base64).with_err(|| TimestampError::InvalidHash)?;
    let decoded = STANDARD
        .decode(normalized)
        .foreign_err(|| TimestampError::InvalidHash)?;

    match kind {
        TimestampKind::Signature => Ok(openssl::sha::sha256(&decoded)),
        TimestampKind::DocumentDigest => decoded.try_into().map_err(|_| {
            bherror::Error::root(TimestampError::InvalidHash).ctx("expected a SHA-256 digest")
        }),
    }
}

/// DER encoded `TimeStampReq` with version 1, a SHA-256 message imprint,
/// the given nonce and `certReq` set.
fn time_stamp_req(imprint: &[u8; 32], nonce: &[u8]) -> Vec<u8> {
    let version = build_integer(&[1]);
    let algorithm = build_algorithm_identifier(&SHA256_OID);
    let hashed_message = build_octet_string(imprint);
    let message_imprint = build_sequence(&[&algorithm, &hashed_message]);
    let nonce = build_integer(nonce);
    let cert_req = build_boolean(true);

    build_sequence(&[&version, &message_imprint, &nonce, &cert_req])
}

/// Checks the `PKIStatusInfo` of a `TimeStampResp`.
fn check_status(response: &[u8]) -> bherror::Result<(), TimestampError> {
    let status = expect_tlv(response, TAG_SEQUENCE)
        .and_then(|(resp, _)| expect_tlv(resp, TAG_SEQUENCE))
        .and_then(|(status_info, _)| expect_tlv(status_info, TAG_INTEGER))
        .and_then(|(status, _)| match status {
            [value] => Some(*value),
            _ => None,
        })
        .ok_or_else(|| bherror::Error::root(TimestampError::InvalidResponse))?;

    // granted (0) or grantedWithMods (1)
    if status > 1 {
        return Err(bherror::Error::root(TimestampError::Rejected(status)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::test_utils::{response, StubPostClient};

    const GRANTED: [u8; 7] = [0x30, 0x05, 0x30, 0x03, 0x02, 0x01, 0x00];
    const REJECTED: [u8; 7] = [0x30, 0x05, 0x30, 0x03, 0x02, 0x01, 0x02];

    #[test]
    fn time_stamp_req_structure() {
        let imprint = [0x11; 32];
        let nonce = [1, 2, 3, 4, 5, 6, 7, 8];

        let encoded = time_stamp_req(&imprint, &nonce);

        assert_eq!(encoded.len(), 69);
        assert_eq!(
            &encoded[..19],
            &[
                0x30, 0x43, // TimeStampReq
                0x02, 0x01, 0x01, // version
                0x30, 0x31, // MessageImprint
                0x30, 0x0D, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            ]
        );
        assert_eq!(&encoded[19..24], &[0x01, 0x05, 0x00, 0x04, 0x20]);
        assert_eq!(&encoded[24..56], &imprint);
        assert_eq!(
            &encoded[56..],
            &[0x02, 0x08, 1, 2, 3, 4, 5, 6, 7, 8, 0x01, 0x01, 0xFF]
        );
    }

    #[test]
    fn signature_imprint_is_sha256_of_the_value() {
        let imprint = message_imprint("c2lnbmF0dXJl", TimestampKind::Signature).unwrap();

        assert_eq!(imprint, openssl::sha::sha256(b"signature"));
    }

    #[test]
    fn document_imprint_must_be_a_sha256_digest() {
        let digest = openssl::sha::sha256(b"document");
        let encoded = STANDARD.encode(digest);

        let imprint = message_imprint(&encoded, TimestampKind::DocumentDigest).unwrap();
        assert_eq!(imprint, digest);

        let error = message_imprint("c2lnbmF0dXJl", TimestampKind::DocumentDigest).unwrap_err();
        assert_eq!(error.error, TimestampError::InvalidHash);
    }

    #[tokio::test]
    async fn timestamp_granted() {
        let client = StubPostClient::answering(response(200, GRANTED.to_vec()));
        let service = HttpTimestampService::new(client);

        let timestamp = service
            .request_timestamp(TimestampRequest::for_signature(
                "c2lnbmF0dXJl",
                "https://tsa.example.com",
            ))
            .await
            .unwrap();

        assert_eq!(timestamp.base64_tsr, STANDARD.encode(GRANTED));

        let requests = service.http_client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://tsa.example.com");
        assert_eq!(requests[0].content_type, TIMESTAMP_QUERY);
        assert_eq!(requests[0].body.len(), 69);
        assert_eq!(
            &requests[0].body[24..56],
            &openssl::sha::sha256(b"signature")
        );
    }

    #[tokio::test]
    async fn timestamp_rejected() {
        let client = StubPostClient::answering(response(200, REJECTED.to_vec()));
        let service = HttpTimestampService::new(client);

        let error = service
            .request_timestamp(TimestampRequest::for_signature("c2ln", "https://tsa"))
            .await
            .unwrap_err();

        assert_eq!(error.error, TimestampError::Rejected(2));
    }

    #[tokio::test]
    async fn timestamp_garbage_response() {
        let client = StubPostClient::answering(response(200, b"<html/>".to_vec()));
        let service = HttpTimestampService::new(client);

        let error = service
            .request_timestamp(TimestampRequest::for_signature("c2ln", "https://tsa"))
            .await
            .unwrap_err();

        assert_eq!(error.error, TimestampError::InvalidResponse);
    }

    #[tokio::test]
    async fn timestamp_http_failures() {
        let service = HttpTimestampService::new(StubPostClient::answering(response(
            503,
            b"busy".to_vec(),
        )));
        let error = service
            .request_timestamp(TimestampRequest::for_signature("c2ln", "https://tsa"))
            .await
            .unwrap_err();
        assert_eq!(error.error, TimestampError::UnacceptableStatus(503));

        let service = HttpTimestampService::new(StubPostClient::unreachable());
        let error = service
            .request_timestamp(TimestampRequest::for_signature("c2ln", "https://tsa"))
            .await
            .unwrap_err();
        assert_eq!(error.error, TimestampError::Network);
    }

    #[tokio::test]
    async fn timestamp_invalid_input_is_not_sent() {
        let service = HttpTimestampService::new(StubPostClient::unreachable());

        let error = service
            .request_timestamp(TimestampRequest::for_signature("   ", "https://tsa"))
            .await
            .unwrap_err();

        assert_matches!(error.error, TimestampError::InvalidHash);
        assert!(service.http_client.requests.lock().unwrap().is_empty());
    }
}
