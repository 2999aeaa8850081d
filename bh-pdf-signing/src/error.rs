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

use crate::ConformanceLevel;

/// Errors raised while preparing the document hashes to be signed.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum CalculateHashError {
    /// A document requires a timestamp but no timestamp authority URL is
    /// configured.
    #[strum(to_string = "Missing TSR_URL for conformance level {0}")]
    MissingTsaUrl(ConformanceLevel),
    /// No document hash could be produced.
    #[strum(to_string = "Hash calculation failed: {0}")]
    HashCalculation(String),
}

impl bherror::BhError for CalculateHashError {}

/// Errors raised while finalizing the signed documents.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum SigningError {
    /// The number of signatures differs from the number of open sessions.
    #[strum(to_string = "Got {1} signatures for {0} signing sessions")]
    Mismatch(usize, usize),
    /// The timestamp authority did not provide a usable token.
    #[strum(to_string = "Timestamp request failed")]
    Timestamp,
    /// The signing session of the given document could not be finalized.
    #[strum(to_string = "Finalizing document {0} failed")]
    Finalization(String),
    /// Validation data could not be embedded in the given document.
    #[strum(to_string = "Embedding validation data into document {0} failed")]
    Revocation(String),
}

impl bherror::BhError for SigningError {}

/// Errors of the RFC 3161 timestamp exchange.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum TimestampError {
    /// The data to be timestamped is not valid `base64`.
    #[strum(to_string = "Invalid data to timestamp")]
    InvalidHash,
    /// The timestamp authority could not be reached.
    #[strum(to_string = "Network error")]
    Network,
    /// The timestamp authority answered with an unexpected HTTP status.
    #[strum(to_string = "Unacceptable HTTP status {0}")]
    UnacceptableStatus(u16),
    /// The timestamp authority answer is not a `TimeStampResp`.
    #[strum(to_string = "Invalid timestamp response")]
    InvalidResponse,
    /// The timestamp authority refused to issue a token.
    #[strum(to_string = "Timestamp request rejected with status {0}")]
    Rejected(u8),
}

impl bherror::BhError for TimestampError {}

/// Errors of fetching certificate revocation lists.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum RevocationError {
    /// The CRL distribution point could not be reached.
    #[strum(to_string = "Network error")]
    Network,
    /// The CRL distribution point answered with an unexpected HTTP status.
    #[strum(to_string = "Unacceptable HTTP status {0}")]
    UnacceptableStatus(u16),
    /// The CRL distribution point answered with an empty body.
    #[strum(to_string = "Empty CRL")]
    Empty,
}

impl bherror::BhError for RevocationError {}
