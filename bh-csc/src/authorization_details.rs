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

//! Authorization details sent to the remote signing service when requesting
//! a credential-scoped access token.

use bherror::traits::{ErrorContext as _, PropagateError as _};
use serde::{Deserialize, Serialize};

use crate::{
    digest::{DigestFormat, DocumentDigest},
    error::AuthorizationDetailsError,
};

/// Object identifier of a hash algorithm, e.g. `2.16.840.1.101.3.4.2.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashAlgorithmOid(pub String);

impl HashAlgorithmOid {
    /// SHA-256.
    pub const SHA256: &'static str = "2.16.840.1.101.3.4.2.1";
    /// SHA-384.
    pub const SHA384: &'static str = "2.16.840.1.101.3.4.2.2";
    /// SHA-512.
    pub const SHA512: &'static str = "2.16.840.1.101.3.4.2.3";

    /// Creates a new [`HashAlgorithmOid`].
    pub fn new(oid: impl Into<String>) -> Self {
        Self(oid.into())
    }

    /// The SHA-256 algorithm identifier.
    pub fn sha256() -> Self {
        Self::new(Self::SHA256)
    }

    /// Returns the dotted OID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HashAlgorithmOid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single entry of the `authorization_details` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationDetailsItem {
    /// Digests of the documents to be signed.
    pub document_digests: Vec<DocumentDigest>,
    /// Identifier of the signing credential.
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    /// Hash algorithm used to compute the digests.
    #[serde(rename = "hashAlgorithmOID")]
    pub hash_algorithm_oid: HashAlgorithmOid,
    /// Locations of the signing service.
    pub locations: Vec<String>,
    /// Authorization details type, usually `credential`.
    #[serde(rename = "type")]
    pub type_: String,
}

/// The full `authorization_details` parameter.
pub type AuthorizationDetails = Vec<AuthorizationDetailsItem>;

impl AuthorizationDetailsItem {
    /// Returns a copy with every digest re-encoded into `format`.
    pub fn copy_with_format(
        &self,
        format: DigestFormat,
    ) -> bherror::Result<Self, AuthorizationDetailsError> {
        self.copy_with_digests(&self.document_digests, format)
    }

    /// Returns a copy whose digests keep their labels but take their hashes
    /// from `hashes`, position by position.
    pub fn copy_with_hashes<S: AsRef<str>>(
        &self,
        hashes: &[S],
        format: DigestFormat,
    ) -> bherror::Result<Self, AuthorizationDetailsError> {
        if hashes.len() != self.document_digests.len() {
            return Err(bherror::Error::root(
                AuthorizationDetailsError::HashCountMismatch(
                    self.document_digests.len(),
                    hashes.len(),
                ),
            ));
        }

        let document_digests = self
            .document_digests
            .iter()
            .zip(hashes)
            .map(|(existing, hash)| {
                DocumentDigest::new(existing.label.clone(), hash.as_ref(), format)
                    .with_err(|| AuthorizationDetailsError::InvalidDigest)
                    .ctx(|| existing.label.clone())
            })
            .collect::<bherror::Result<_, _>>()?;

        Ok(self.with_document_digests(document_digests))
    }

    /// Returns a copy whose digests are replaced by `digests`, re-encoded into
    /// `format`.
    pub fn copy_with_digests(
        &self,
        digests: &[DocumentDigest],
        format: DigestFormat,
    ) -> bherror::Result<Self, AuthorizationDetailsError> {
        let document_digests = digests
            .iter()
            .map(|digest| {
                digest
                    .convert(format)
                    .with_err(|| AuthorizationDetailsError::InvalidDigest)
                    .ctx(|| digest.label.clone())
            })
            .collect::<bherror::Result<_, _>>()?;

        Ok(self.with_document_digests(document_digests))
    }

    fn with_document_digests(&self, document_digests: Vec<DocumentDigest>) -> Self {
        Self {
            document_digests,
            credential_id: self.credential_id.clone(),
            hash_algorithm_oid: self.hash_algorithm_oid.clone(),
            locations: self.locations.clone(),
            type_: self.type_.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn item() -> AuthorizationDetailsItem {
        AuthorizationDetailsItem {
            document_digests: vec![
                DocumentDigest {
                    label: "contract.pdf".to_owned(),
                    hash: "aGVsbG8=".to_owned(),
                },
                DocumentDigest {
                    label: "annex.pdf".to_owned(),
                    hash: "++//".to_owned(),
                },
            ],
            credential_id: "cred-1".to_owned(),
            hash_algorithm_oid: HashAlgorithmOid::sha256(),
            locations: vec![],
            type_: "credential".to_owned(),
        }
    }

    #[test]
    fn copy_with_format_converts_all_digests() {
        let auth = item()
            .copy_with_format(DigestFormat::Base64UrlNoPadding)
            .unwrap();

        assert_eq!(auth.document_digests[0].hash, "aGVsbG8");
        assert_eq!(auth.document_digests[1].hash, "--__");
        assert_eq!(auth.document_digests[0].label, "contract.pdf");
        assert_eq!(auth.credential_id, "cred-1");
        assert_eq!(auth.hash_algorithm_oid, item().hash_algorithm_oid);
    }

    #[test]
    fn copy_with_hashes_replaces_hashes_and_keeps_labels() {
        let updated = item()
            .copy_with_hashes(&["--__", "aGVsbG8"], DigestFormat::Base64)
            .unwrap();

        assert_eq!(updated.document_digests[0].label, "contract.pdf");
        assert_eq!(updated.document_digests[0].hash, "++//");
        assert_eq!(updated.document_digests[1].label, "annex.pdf");
        assert_eq!(updated.document_digests[1].hash, "aGVsbG8=");
    }

    #[test]
    fn copy_with_hashes_requires_matching_count() {
        let result = item().copy_with_hashes(&["aGVsbG8="], DigestFormat::Base64);
        assert_matches!(
            result,
            Err(e) if e.error == AuthorizationDetailsError::HashCountMismatch(2, 1)
        );
    }

    #[test]
    fn copy_with_digests_rejects_invalid_hash() {
        let digests = vec![DocumentDigest {
            label: "bad.pdf".to_owned(),
            hash: "###".to_owned(),
        }];
        let result = item().copy_with_digests(&digests, DigestFormat::Base64);
        assert_matches!(
            result,
            Err(e) if e.error == AuthorizationDetailsError::InvalidDigest
        );
    }

    #[test]
    fn serializes_with_csc_field_names() {
        let json = serde_json::to_value(item()).unwrap();
        assert_eq!(
            json,
            json!({
                "documentDigests": [
                    { "label": "contract.pdf", "hash": "aGVsbG8=" },
                    { "label": "annex.pdf", "hash": "++//" }
                ],
                "credentialID": "cred-1",
                "hashAlgorithmOID": "2.16.840.1.101.3.4.2.1",
                "locations": [],
                "type": "credential"
            })
        );
    }
}
