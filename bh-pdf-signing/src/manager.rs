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

use bh_csc::{DocumentDigests, ReqwestClient};
use bherror::traits::{ErrorContext as _, ForeignBoxed as _, PropagateError as _};
use tokio::sync::Mutex;

use crate::{
    engine::{SessionParameters, SigningEngine, SigningSession},
    error::{CalculateHashError, SigningError},
    request::{CalculateHashRequest, ConformanceLevel, Document},
    revocation::{HttpRevocationService, RevocationService},
    timestamp::{HttpTimestampService, TimestampRequest, TimestampService},
};

/// A signing session bound to one document of a hash calculation round.
#[derive(Debug)]
pub struct PodofoSession<S> {
    /// Sequential identifier, starting from `"1"`.
    pub id: String,
    /// Conformance level of the document.
    pub conformance_level: ConformanceLevel,
    /// The engine session.
    pub session: S,
}

/// Orchestrator of the signing sessions of a hash → signature round trip.
///
/// [`calculate_document_hashes`](Self::calculate_document_hashes) opens one
/// session per document and
/// [`create_signed_documents`](Self::create_signed_documents) consumes all
/// of them. Both hold the session lock for their whole duration, so
/// concurrent callers are served one at a time.
pub struct PodofoManager<E: SigningEngine, T, R> {
    engine: E,
    timestamp: T,
    revocation: R,
    include_revocation_info: bool,
    sessions: Mutex<Vec<PodofoSession<E::Session>>>,
}

impl<E: SigningEngine>
    PodofoManager<E, HttpTimestampService<ReqwestClient>, HttpRevocationService<ReqwestClient>>
{
    /// Creates a [`PodofoManager`] reaching the timestamp authority and the
    /// CRL distribution points through `http_client`.
    pub fn with_http_client(
        engine: E,
        http_client: ReqwestClient,
        include_revocation_info: bool,
    ) -> Self {
        Self::new(
            engine,
            HttpTimestampService::new(http_client.clone()),
            HttpRevocationService::new(http_client),
            include_revocation_info,
        )
    }
}

impl<E, T, R> PodofoManager<E, T, R>
where
    E: SigningEngine,
    T: TimestampService,
    R: RevocationService,
{
    /// Creates a new [`PodofoManager`] without any open session.
    pub fn new(engine: E, timestamp: T, revocation: R, include_revocation_info: bool) -> Self {
        Self {
            engine,
            timestamp,
            revocation,
            include_revocation_info,
            sessions: Mutex::new(vec![]),
        }
    }

    /// Number of sessions awaiting their signature.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Opens a signing session per document of `request` and returns the
    /// hashes to be signed, in document order.
    ///
    /// Previously open sessions are discarded. Every document above
    /// `ADES_B_B` requires a non-empty `tsa_url`. A document the engine
    /// cannot process is logged and left out of the result. Session ids are
    /// taken by every opened session, including one whose hash fails.
    pub async fn calculate_document_hashes(
        &self,
        request: &CalculateHashRequest,
        tsa_url: &str,
    ) -> bherror::Result<DocumentDigests, CalculateHashError> {
        let mut sessions = self.sessions.lock().await;
        sessions.clear();

        if tsa_url.is_empty() {
            if let Some(document) = request
                .documents
                .iter()
                .find(|document| document.conformance_level.requires_timestamp())
            {
                return Err(bherror::Error::root(CalculateHashError::MissingTsaUrl(
                    document.conformance_level,
                )));
            }
        }

        let mut hashes = Vec::with_capacity(request.documents.len());
        let mut opened = 0usize;

        for document in &request.documents {
            let mut session = match self.open_session(request, document) {
                Ok(session) => session,
                Err(error) => {
                    tracing::warn!(%error, "skipping document");
                    continue;
                }
            };

            opened += 1;
            let id = opened.to_string();

            let Some(hash) = session.calculate_hash() else {
                let error = CalculateHashError::HashCalculation(document.input_path.clone());
                tracing::warn!(%id, %error, "skipping document");
                continue;
            };

            hashes.push(hash);
            sessions.push(PodofoSession {
                id,
                conformance_level: document.conformance_level,
                session,
            });
        }

        tracing::debug!(sessions = sessions.len(), "document hashes calculated");

        Ok(DocumentDigests::new(hashes))
    }

    fn open_session(
        &self,
        request: &CalculateHashRequest,
        document: &Document,
    ) -> bherror::Result<E::Session, CalculateHashError> {
        let parameters = SessionParameters {
            conformance_level: document.conformance_level,
            hash_algorithm: request.hash_algorithm_oid.to_string(),
            input_path: document.input_path.clone(),
            output_path: document.output_path.clone(),
            certificate: request.end_entity_certificate.clone(),
            certificate_chain: request.certificate_chain.clone(),
        };

        self.engine.open_session(parameters).foreign_boxed_err(|| {
            CalculateHashError::HashCalculation(document.input_path.clone())
        })
    }

    /// Finalizes every open session with the signature at the same position
    /// of `signatures`.
    ///
    /// A non-empty `tsa_url` adds a signature timestamp to each document.
    /// The sessions are consumed whatever the outcome.
    pub async fn create_signed_documents(
        &self,
        signatures: &[String],
        tsa_url: &str,
    ) -> bherror::Result<(), SigningError> {
        let mut guard = self.sessions.lock().await;
        let sessions = std::mem::take(&mut *guard);

        if signatures.len() != sessions.len() {
            return Err(bherror::Error::root(SigningError::Mismatch(
                sessions.len(),
                signatures.len(),
            )));
        }

        for (mut podofo, signed_hash) in sessions.into_iter().zip(signatures) {
            let tsr = if tsa_url.is_empty() {
                String::new()
            } else {
                self.timestamp
                    .request_timestamp(TimestampRequest::for_signature(signed_hash, tsa_url))
                    .await
                    .with_err(|| SigningError::Timestamp)
                    .ctx(|| format!("document {}", podofo.id))?
                    .base64_tsr
            };

            podofo
                .session
                .finalize_signing(signed_hash, &tsr)
                .foreign_boxed_err(|| SigningError::Finalization(podofo.id.clone()))?;

            tracing::debug!(id = %podofo.id, "document signed");

            if self.include_revocation_info {
                self.add_long_term_data(&mut podofo, tsa_url).await?;
            }
        }

        Ok(())
    }

    async fn add_long_term_data(
        &self,
        podofo: &mut PodofoSession<E::Session>,
        tsa_url: &str,
    ) -> bherror::Result<(), SigningError> {
        if !podofo.conformance_level.embeds_validation_data() {
            return Ok(());
        }

        let crl_urls = podofo.session.crl_urls();
        let crls = self.revocation.fetch_crl_data_from_urls(&crl_urls).await;

        podofo
            .session
            .add_validation_data(&crls)
            .foreign_boxed_err(|| SigningError::Revocation(podofo.id.clone()))?;

        if podofo.conformance_level != ConformanceLevel::AdesBLta || tsa_url.is_empty() {
            return Ok(());
        }

        let Some(digest) = podofo.session.begin_document_timestamp() else {
            return Err(bherror::Error::root(SigningError::Finalization(
                podofo.id.clone(),
            ))
            .ctx("document timestamp digest unavailable"));
        };

        let tsr = self
            .timestamp
            .request_timestamp(TimestampRequest::for_document(digest, tsa_url))
            .await
            .with_err(|| SigningError::Timestamp)?
            .base64_tsr;

        podofo
            .session
            .finish_document_timestamp(&tsr)
            .foreign_boxed_err(|| SigningError::Finalization(podofo.id.clone()))?;

        tracing::debug!(id = %podofo.id, "document timestamp added");

        Ok(())
    }
}
