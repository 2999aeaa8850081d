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

use std::future::Future;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bh_csc::HttpGetClient;
use bherror::traits::ForeignError as _;

use crate::error::RevocationError;

/// Interface of a certificate revocation list source.
pub trait RevocationService: Sync {
    /// Fetches the CRLs published at `urls` and returns them as `base64` DER.
    ///
    /// Unavailable CRLs are skipped.
    fn fetch_crl_data_from_urls(&self, urls: &[String]) -> impl Future<Output = Vec<String>> + Send;
}

/// [`RevocationService`] downloading CRLs over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRevocationService<C> {
    http_client: C,
}

impl<C: HttpGetClient> HttpRevocationService<C> {
    /// Creates a new [`HttpRevocationService`].
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    async fn fetch_crl(&self, url: &str) -> bherror::Result<Vec<u8>, RevocationError> {
        let response = self
            .http_client
            .get(url)
            .await
            .foreign_err(|| RevocationError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(bherror::Error::root(RevocationError::UnacceptableStatus(
                status.as_u16(),
            )));
        }

        let body = response
            .bytes()
            .await
            .foreign_err(|| RevocationError::Network)?;

        if body.is_empty() {
            return Err(bherror::Error::root(RevocationError::Empty));
        }

        Ok(body.to_vec())
    }
}

impl<C: HttpGetClient> RevocationService for HttpRevocationService<C> {
    async fn fetch_crl_data_from_urls(&self, urls: &[String]) -> Vec<String> {
        let mut crls = Vec::with_capacity(urls.len());

        for url in urls {
            match self.fetch_crl(url).await {
                Ok(crl) => crls.push(STANDARD.encode(crl)),
                Err(error) => tracing::warn!(%url, %error, "skipping unavailable CRL"),
            }
        }

        crls
    }
}
