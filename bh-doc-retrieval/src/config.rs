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

use reqwest::Url;

use crate::client::SupportedClientIdScheme;

/// Wallet-side configuration of the request resolution pipeline.
///
/// The configuration is built once and only read during resolution.
#[derive(Debug, Clone, Default)]
pub struct DocumentRetrievalConfiguration {
    /// Identifier of the wallet, if any.
    pub issuer: Option<Url>,

    /// The client identifier schemes accepted by the wallet.
    ///
    /// The first entry is used whenever a request does not declare a
    /// configured scheme.
    pub supported_client_id_schemes: Vec<SupportedClientIdScheme>,
}

impl DocumentRetrievalConfiguration {
    /// Creates a new configuration accepting the given schemes.
    pub fn new(supported_client_id_schemes: Vec<SupportedClientIdScheme>) -> Self {
        Self {
            issuer: None,
            supported_client_id_schemes,
        }
    }

    /// Sets the wallet issuer.
    pub fn with_issuer(mut self, issuer: Url) -> Self {
        self.issuer = Some(issuer);
        self
    }
}
