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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! This crate provides the models and clients shared by the Cloud Signature
//! Consortium (CSC) remote signing flow.
//!
//! # Details
//!
//! - [`DocumentDigest`] and [`DocumentDigests`] hold document hashes and
//!   convert them between the `base64` encoding used by the signing endpoints
//!   and the `base64url` encoding used in authorization requests.
//! - [`AuthorizationDetailsItem`] models the `authorization_details` parameter
//!   of credential-scoped authorization requests.
//! - [`prepare_service_authorization`], [`prepare_credential_authorization`]
//!   and [`OAuth2TokenClient`] drive the OAuth2 authorization code flow with
//!   [`Pkce`].
//! - [`HttpGetClient`] and [`HttpPostClient`] abstract the HTTP transport,
//!   with [`ReqwestClient`] as the default implementation.
//!
//! # Example
//!
//! ```
//! use bh_csc::{DocumentDigest, DocumentDigests};
//!
//! let digest = DocumentDigest::for_authorization("contract.pdf", "aGVsbG8=").unwrap();
//! assert_eq!(digest.hash, "aGVsbG8");
//!
//! let digests = DocumentDigests::for_token(&[digest.hash]).unwrap();
//! assert_eq!(digests.hashes, vec!["aGVsbG8="]);
//! ```

mod authorization_details;
mod digest;
mod error;
mod oauth2;
mod pkce;
pub mod transport;

pub use authorization_details::*;
pub use digest::*;
pub use error::*;
pub use oauth2::*;
pub use pkce::*;
pub use transport::{
    form_urlencode, HttpGetClient, HttpPostClient, PostRequest, ReqwestClient, FORM_URLENCODED,
};
