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

//! This crate resolves remote document signing requests sent to a wallet
//! following the [OpenID4VP][1] request retrieval flow, extended with the
//! Cloud Signature Consortium (CSC) document parameters.
//!
//! [1]: https://openid.net/specs/openid-4-verifiable-presentations-1_0.html
//!
//! # Details
//!
//! A request goes through the following stages:
//!
//! 1. [`UnvalidatedRequest::parse`] reads the request URL. The request object
//!    is passed inline, as a JWT, or as a reference to a JWT.
//! 2. [`RequestFetcher`] retrieves referenced request objects.
//! 3. [`RequestAuthenticator`] authenticates the client through the
//!    [`ClientAuthenticator`], and verifies signed request objects with an
//!    [`AccessValidating`] implementation such as [`JwsAccessValidator`].
//! 4. The mandatory parameters are validated, producing
//!    [`ValidatedRequestData`], which is then turned into
//!    [`ResolvedRequestData`].
//!
//! [`AuthorizationRequestResolver`] drives these stages and always ends in
//! one of the [`AuthorizationRequest`] variants. Once the user has decided,
//! the [`Dispatcher`] posts the answer to the verifier.
//!
//! [`DocumentRetrieval`] bundles all of the above.
//!
//! # Example
//!
//! ```
//! use bh_doc_retrieval::UnvalidatedRequest;
//!
//! let request = UnvalidatedRequest::parse(
//!     "eudi-openid4vp://?client_id=verifier&request_uri=https%3A%2F%2Fverifier.example.com%2Fr%2F1",
//! )
//! .unwrap();
//!
//! assert!(matches!(request, UnvalidatedRequest::JwtByReference { .. }));
//! ```

mod access;
mod authenticator;
mod client;
mod config;
mod dispatcher;
mod error;
mod fetcher;
mod jwt;
mod request;
mod resolver;
mod retrieval;
mod validated;

#[cfg(test)]
pub(crate) mod test_utils;

pub use access::*;
pub use authenticator::*;
pub use client::*;
pub use config::*;
pub use dispatcher::*;
pub use error::*;
pub use fetcher::*;
pub use jwt::{decode_header, decode_request_object, header_x5c, RequestJwtHeader};
pub use request::*;
pub use resolver::*;
pub use retrieval::*;
pub use validated::*;
