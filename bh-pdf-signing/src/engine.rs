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

//! Capability interface of the native PDF signing engine.
//!
//! The engine owns every PDF-structural and cryptographic step. The
//! [`PodofoManager`][crate::PodofoManager] only drives the session lifecycle.

use crate::ConformanceLevel;

/// Boxed error reported by a [`SigningEngine`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Parameters of a single document signing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParameters {
    /// Conformance level of the produced signature.
    pub conformance_level: ConformanceLevel,
    /// Dotted OID of the hash algorithm.
    pub hash_algorithm: String,
    /// Path of the unsigned document.
    pub input_path: String,
    /// Path of the signed document.
    pub output_path: String,
    /// `base64` DER of the signing certificate.
    pub certificate: String,
    /// `base64` DER of the issuing certificates.
    pub certificate_chain: Vec<String>,
}

/// An open signing session over a single document.
pub trait SigningSession: Send {
    /// Prepares the signature placeholder and returns the `base64` hash to be
    /// signed, or `None` if the document cannot be processed.
    fn calculate_hash(&mut self) -> Option<String>;

    /// Embeds the `signed_hash` and the optional `base64` timestamp token
    /// (empty when absent) and writes the output document.
    fn finalize_signing(&mut self, signed_hash: &str, tsr_base64: &str) -> Result<(), BoxError>;

    /// CRL distribution points of the certificates used in this session.
    fn crl_urls(&self) -> Vec<String>;

    /// Embeds `base64` DER CRLs into the signed document.
    fn add_validation_data(&mut self, crls_base64: &[String]) -> Result<(), BoxError>;

    /// Prepares an archival document timestamp and returns the `base64`
    /// digest to be timestamped.
    fn begin_document_timestamp(&mut self) -> Option<String>;

    /// Embeds the archival timestamp token into the signed document.
    fn finish_document_timestamp(&mut self, tsr_base64: &str) -> Result<(), BoxError>;
}

/// Factory of [`SigningSession`]s.
pub trait SigningEngine: Sync {
    /// Session type produced by this engine.
    type Session: SigningSession;

    /// Opens a signing session over the document described by `parameters`.
    fn open_session(&self, parameters: SessionParameters) -> Result<Self::Session, BoxError>;
}
