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

//! Proof Key for Code Exchange ([RFC 7636]).
//!
//! [RFC 7636]: https://datatracker.ietf.org/doc/html/rfc7636

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore as _;

/// The only supported code challenge method.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

const VERIFIER_ENTROPY_BYTES: usize = 32;

/// A PKCE code verifier together with its `S256` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkce {
    code_verifier: String,
    code_challenge: String,
}

impl Pkce {
    /// Generates a fresh random code verifier.
    pub fn generate() -> Self {
        let mut entropy = [0u8; VERIFIER_ENTROPY_BYTES];
        rand::thread_rng().fill_bytes(&mut entropy);

        Self::from_verifier(URL_SAFE_NO_PAD.encode(entropy))
    }

    /// Derives the challenge for an existing `code_verifier`.
    pub fn from_verifier(code_verifier: impl Into<String>) -> Self {
        let code_verifier = code_verifier.into();
        let code_challenge = URL_SAFE_NO_PAD.encode(openssl::sha::sha256(code_verifier.as_bytes()));

        Self {
            code_verifier,
            code_challenge,
        }
    }

    /// The secret sent to the token endpoint.
    pub fn code_verifier(&self) -> &str {
        &self.code_verifier
    }

    /// The challenge sent to the authorization endpoint.
    pub fn code_challenge(&self) -> &str {
        &self.code_challenge
    }
}
