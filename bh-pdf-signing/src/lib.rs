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

//! This crate orchestrates the signing sessions of remotely signed PDF
//! documents.
//!
//! # Details
//!
//! Signing a batch of documents is a two step round trip:
//!
//! 1. [`PodofoManager::calculate_document_hashes`] opens a
//!    [`SigningSession`] per document through the injected
//!    [`SigningEngine`] and returns the [`DocumentDigests`] to be signed by the
//!    remote signing service.
//! 2. [`PodofoManager::create_signed_documents`] finalizes every session with
//!    the returned signatures, in the same order.
//!
//! Signatures above [`ConformanceLevel::AdesBB`] are timestamped by a
//! [`TimestampService`], [`HttpTimestampService`] being the RFC 3161
//! implementation. When enabled, long-term levels also embed CRLs obtained
//! from a [`RevocationService`].
//!
//! [`DocumentDigests`]: bh_csc::DocumentDigests

mod der;
mod engine;
mod error;
mod manager;
mod request;
mod revocation;
mod timestamp;

#[cfg(test)]
pub(crate) mod test_utils;

pub use engine::*;
pub use error::*;
pub use manager::*;
pub use request::*;
pub use revocation::*;
pub use timestamp::*;
