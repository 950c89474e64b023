// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling-mode ingestion: fetch pages and follow the `MoreData` chain.

use std::sync::Arc;

use siri::FeedKind;

use crate::anshar::{client_id, pipeline, CLIENT_NAME};
use crate::error::ErrorKind;
use crate::state::UkurState;

/// One scheduled invocation: drain the upstream until it reports no more
/// pages. A failed page abandons the chain; the next tick starts over.
pub async fn run_poll_chain(state: Arc<UkurState>, kind: FeedKind) {
    let mut pages = 0u32;
    loop {
        match poll_page(&state, kind).await {
            Ok(more) => {
                pages += 1;
                if !more {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(kind = %kind, pages, err = %e, "poll chain aborted");
                break;
            }
        }
    }
    tracing::debug!(kind = %kind, pages, "poll chain finished");
}

/// Fetch and process one page. Returns the upstream's `MoreData` flag.
async fn poll_page(state: &Arc<UkurState>, kind: FeedKind) -> anyhow::Result<bool> {
    let url = state.config.polling_url(kind, &state.requestor_id);
    let resp = state
        .http
        .get(&url)
        .header("ET-Client-Name", CLIENT_NAME)
        .header("ET-Client-ID", client_id())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            state.metrics.record_error(ErrorKind::UpstreamUnavailable);
            anyhow::Error::from(e)
        })?;
    let body = resp.text().await.map_err(|e| {
        state.metrics.record_error(ErrorKind::UpstreamUnavailable);
        anyhow::Error::from(e)
    })?;
    state.metrics.polls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

    let more = siri::parse::more_data(&body).map_err(|e| {
        state.metrics.record_error(ErrorKind::MalformedPayload);
        tracing::warn!(kind = %kind, bytes = body.len(), "dropping malformed poll body");
        e
    })?;
    pipeline::process_document(state, kind, &body).await?;
    Ok(more)
}
