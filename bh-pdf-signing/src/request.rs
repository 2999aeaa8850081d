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

use bh_csc::HashAlgorithmOid;
use serde::{Deserialize, Serialize};

/// AdES conformance level of a produced signature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum ConformanceLevel {
    /// Basic signature.
    #[serde(rename = "ADES_B_B", alias = "ADES_B")]
    #[strum(to_string = "ADES_B_B")]
    AdesBB,
    /// Basic signature with a signature timestamp.
    #[serde(rename = "ADES_B_T")]
    #[strum(to_string = "ADES_B_T")]
    AdesBT,
    /// Long-term signature carrying validation data.
    #[serde(rename = "ADES_B_LT")]
    #[strum(to_string = "ADES_B_LT")]
    AdesBLt,
    /// Long-term signature with an archival document timestamp.
    #[serde(rename = "ADES_B_LTA")]
    #[strum(to_string = "ADES_B_LTA")]
    AdesBLta,
}

impl ConformanceLevel {
    /// Whether signing at this level requires a timestamp authority.
    pub fn requires_timestamp(&self) -> bool {
        !matches!(self, ConformanceLevel::AdesBB)
    }

    /// Whether this level embeds revocation data into the document.
    pub fn embeds_validation_data(&self) -> bool {
        matches!(self, ConformanceLevel::AdesBLt | ConformanceLevel::AdesBLta)
    }
}

/// Signature format of a produced signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum SignatureFormat {
    /// CAdES.
    C,
    /// XAdES.
    X,
    /// JAdES.
    J,
    /// PAdES.
    P,
}

/// Placement of a signature relative to the signed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignedEnvelopeProperty {
    /// Signature embedded in the signed document.
    Enveloped,
    /// Signed content embedded in the signature.
    Enveloping,
    /// Signature kept separately from the content.
    Detached,
    /// Signature attached to the content.
    Attached,
    /// Parallel signature next to existing ones.
    Parallel,
    /// Certification signature.
    Certification,
    /// Incremental revision signature.
    Revision,
}

/// Associated Signature Container used for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Container {
    /// No container.
    No,
    /// ASiC simple container.
    #[serde(rename = "ASiC-S")]
    AsicS,
    /// ASiC extended container.
    #[serde(rename = "ASiC-E")]
    AsicE,
}

/// A single document to be signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path of the unsigned input document.
    #[serde(rename = "documentInputPath")]
    pub input_path: String,
    /// Path where the signed document is written.
    #[serde(rename = "documentOutputPath")]
    pub output_path: String,
    /// Signature format.
    pub signature_format: SignatureFormat,
    /// Conformance level of the signature.
    pub conformance_level: ConformanceLevel,
    /// Placement of the signature.
    pub signed_envelope_property: SignedEnvelopeProperty,
    /// Output container.
    pub container: Container,
}

/// Input of [`PodofoManager::calculate_document_hashes`][crate::PodofoManager::calculate_document_hashes].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateHashRequest {
    /// Documents to be signed, in order.
    pub documents: Vec<Document>,
    /// `base64` DER of the signing certificate.
    pub end_entity_certificate: String,
    /// `base64` DER of the issuing certificates.
    pub certificate_chain: Vec<String>,
    /// OID of the hash algorithm.
    #[serde(rename = "hashAlgorithmOID")]
    pub hash_algorithm_oid: HashAlgorithmOid,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_calculate_hash_request() {
        let request: CalculateHashRequest = serde_json::from_value(json!({
            "documents": [
                {
                    "documentInputPath": "doc1.pdf",
                    "documentOutputPath": "doc1-signed.pdf",
                    "signature_format": "P",
                    "container": "No",
                    "signed_envelope_property": "ENVELOPED",
                    "conformance_level": "ADES_B"
                },
                {
                    "documentInputPath": "doc2.pdf",
                    "documentOutputPath": "doc2-signed.pdf",
                    "signature_format": "C",
                    "container": "ASiC-S",
                    "signed_envelope_property": "ENVELOPING",
                    "conformance_level": "ADES_B_LT"
                }
            ],
            "endEntityCertificate": "MIIB",
            "certificateChain": ["MIIC"],
            "hashAlgorithmOID": "2.16.840.1.101.3.4.2.1"
        }))
        .unwrap();

        assert_eq!(request.documents.len(), 2);
        assert_eq!(request.documents[0].conformance_level, ConformanceLevel::AdesBB);
        assert_eq!(request.documents[1].conformance_level, ConformanceLevel::AdesBLt);
        assert_eq!(request.documents[1].container, Container::AsicS);
        assert_eq!(
            request.documents[1].signed_envelope_property,
            SignedEnvelopeProperty::Enveloping
        );
        assert_eq!(request.end_entity_certificate, "MIIB");
        assert_eq!(request.certificate_chain, vec!["MIIC"]);
    }

    #[test]
    fn conformance_level_names() {
        assert_eq!(ConformanceLevel::AdesBLta.to_string(), "ADES_B_LTA");
        assert_eq!(
            serde_json::to_value(ConformanceLevel::AdesBB).unwrap(),
            json!("ADES_B_B")
        );
        assert!(!ConformanceLevel::AdesBB.requires_timestamp());
        assert!(ConformanceLevel::AdesBT.requires_timestamp());
        assert!(!ConformanceLevel::AdesBT.embeds_validation_data());
        assert!(ConformanceLevel::AdesBLta.embeds_validation_data());
    }
}
