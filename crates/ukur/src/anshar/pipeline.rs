// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-kind processing pipeline: archive, filter by operator, enqueue.
//!
//! Both ingestion modes feed the same pipeline, so downstream behavior does
//! not depend on how a document arrived.

use std::sync::Arc;

use siri::FeedKind;

use crate::error::ErrorKind;
use crate::state::UkurState;

/// Select the configured operator's elements from a delivery document and
/// hand each to the kind's queue.
pub async fn process_document(
    state: &Arc<UkurState>,
    kind: FeedKind,
    body: &str,
) -> anyhow::Result<()> {
    if let Some(archive) = &state.archive {
        archive.store(kind, body).await;
    }

    let (element, ref_child) = match kind {
        FeedKind::Et => ("EstimatedVehicleJourney", "OperatorRef"),
        FeedKind::Sx => ("PtSituationElement", "ParticipantRef"),
    };
    let fragments =
        siri::fragment::extract_matching(body, element, ref_child, &state.config.operator)
            .map_err(|e| {
                state.metrics.record_error(ErrorKind::MalformedPayload);
                tracing::warn!(kind = %kind, bytes = body.len(), err = %e, "dropping malformed document");
                e
            })?;
    if fragments.is_empty() {
        return Ok(());
    }

    tracing::debug!(kind = %kind, count = fragments.len(), "enqueueing elements");
    for fragment in fragments {
        state.enqueue(kind, fragment).await;
    }
    Ok(())
}
