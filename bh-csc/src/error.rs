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

//! Error types used throughout the crate.

/// Errors raised while normalizing a document digest.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum DigestError {
    /// The digest is empty or contains only whitespace.
    #[strum(to_string = "Digest must not be blank")]
    Blank,
    /// The digest is neither valid Base64 nor valid Base64URL.
    #[strum(to_string = "Digest must be a valid Base64 or Base64URL encoded string")]
    Invalid,
}

impl bherror::BhError for DigestError {}

/// Errors raised while deriving new authorization details.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum AuthorizationDetailsError {
    /// The number of replacement hashes differs from the number of digests.
    #[strum(to_string = "Expected {0} hashes, received {1}")]
    HashCountMismatch(usize, usize),
    /// One of the digests failed normalization.
    #[strum(to_string = "Invalid document digest")]
    InvalidDigest,
}

impl bherror::BhError for AuthorizationDetailsError {}

/// Errors raised by the HTTP clients of the remote signing service.
#[derive(strum_macros::Display, Debug, PartialEq, Clone)]
pub enum ClientError {
    /// The request URL could not be constructed.
    #[strum(to_string = "Invalid request URL")]
    InvalidRequestUrl,
    /// The request could not be sent or the response body could not be read.
    #[strum(to_string = "Network error")]
    Network,
    /// The server answered with a status outside of the accepted range.
    #[strum(to_string = "Unacceptable status {0}: {1}")]
    UnacceptableStatus(u16, String),
    /// The response body could not be decoded.
    #[strum(to_string = "Invalid response")]
    InvalidResponse,
}

impl bherror::BhError for ClientError {}

/// Result type used for digest normalization.
pub type DigestResult<T> = bherror::Result<T, DigestError>;

/// Result type used by the HTTP clients.
pub type ClientResult<T> = bherror::Result<T, ClientError>;
