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

//! Document digests and the conversions between their wire formats.
//!
//! The remote signing service and the verifier do not agree on a single
//! encoding for document hashes: authorization requests carry them as
//! `base64url` without padding, while the token and signing endpoints expect
//! standard padded `base64`. Every constructor in this module normalizes the
//! incoming hash, so a [`DocumentDigest`] always holds a valid encoding of the
//! requested [`DigestFormat`].

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD, URL_SAFE_NO_PAD},
        DecodePaddingMode,
    },
    Engine as _,
};
use bherror::traits::{ErrorContext as _, ForeignError as _};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::{DigestError, DigestResult};

/// Output encoding of a normalized digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestFormat {
    /// Standard `base64` alphabet, padded.
    Base64,
    /// URL-safe `base64url` alphabet, without padding.
    Base64UrlNoPadding,
}

/// A labelled hash of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDigest {
    /// Human readable label of the document.
    pub label: String,
    /// Encoded hash of the document.
    pub hash: String,
}

impl DocumentDigest {
    /// Creates a [`DocumentDigest`] whose `hash` is normalized into `format`.
    ///
    /// The input hash may be surrounded by whitespace, percent-encoded, and
    /// use either the standard or the URL-safe alphabet.
    pub fn new(label: impl Into<String>, hash: &str, format: DigestFormat) -> DigestResult<Self> {
        Ok(Self {
            label: label.into(),
            hash: normalize(hash, format)?,
        })
    }

    /// Creates a digest suitable for an authorization request.
    pub fn for_authorization(label: impl Into<String>, hash: &str) -> DigestResult<Self> {
        Self::new(label, hash, DigestFormat::Base64UrlNoPadding)
    }

    /// Creates a digest suitable for the token endpoint.
    pub fn for_token(label: impl Into<String>, hash: &str) -> DigestResult<Self> {
        Self::new(label, hash, DigestFormat::Base64)
    }

    /// Creates a digest suitable for the signing endpoint.
    pub fn for_signing(label: impl Into<String>, hash: &str) -> DigestResult<Self> {
        Self::new(label, hash, DigestFormat::Base64)
    }

    /// Returns a copy of this digest re-encoded into `format`.
    pub fn convert(&self, format: DigestFormat) -> DigestResult<Self> {
        Self::new(self.label.clone(), &self.hash, format)
    }
}

/// An ordered list of document hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDigests {
    /// The encoded hashes, in document order.
    pub hashes: Vec<String>,
}

impl DocumentDigests {
    /// Wraps already encoded hashes without normalizing them.
    pub fn new(hashes: Vec<String>) -> Self {
        Self { hashes }
    }

    /// Normalizes every digest into `format`.
    ///
    /// Fails on the first digest which cannot be normalized.
    pub fn from_digests<S: AsRef<str>>(digests: &[S], format: DigestFormat) -> DigestResult<Self> {
        let hashes = digests
            .iter()
            .enumerate()
            .map(|(i, digest)| {
                normalize(digest.as_ref(), format).ctx(|| format!("digest at index {i}"))
            })
            .collect::<DigestResult<_>>()?;

        Ok(Self { hashes })
    }

    /// Normalizes the digests for an authorization request.
    pub fn for_authorization<S: AsRef<str>>(digests: &[S]) -> DigestResult<Self> {
        Self::from_digests(digests, DigestFormat::Base64UrlNoPadding)
    }

    /// Normalizes the digests for the token endpoint.
    pub fn for_token<S: AsRef<str>>(digests: &[S]) -> DigestResult<Self> {
        Self::from_digests(digests, DigestFormat::Base64)
    }

    /// Number of hashes held.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Returns `true` if no hashes are held.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Decodes `input` as either `base64` or `base64url` and re-encodes it into
/// `format`.
pub fn normalize(input: &str, format: DigestFormat) -> DigestResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(bherror::Error::root(DigestError::Blank));
    }

    let decoded = percent_decode_str(trimmed)
        .decode_utf8()
        .foreign_err(|| DigestError::Invalid)?;

    let Some(bytes) = decode_base64_any(&decoded) else {
        return Err(bherror::Error::root(DigestError::Invalid).ctx(decoded.into_owned()));
    };

    Ok(encode(&bytes, format))
}

fn encode(bytes: &[u8], format: DigestFormat) -> String {
    match format {
        DigestFormat::Base64 => STANDARD.encode(bytes),
        DigestFormat::Base64UrlNoPadding => URL_SAFE_NO_PAD.encode(bytes),
    }
}

const PADDING_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_ANY_PAD: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PADDING_INDIFFERENT);

const URL_SAFE_ANY_PAD: GeneralPurpose =
    GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_INDIFFERENT);

/// Decodes `input` in either the `base64` or the `base64url` alphabet, with or
/// without padding.
pub fn decode_base64_any(input: &str) -> Option<Vec<u8>> {
    STANDARD_ANY_PAD
        .decode(input)
        .or_else(|_| URL_SAFE_ANY_PAD.decode(input))
        .ok()
}
