// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quay to stop-place mapping, refreshed from Tiamat.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::ErrorKind;
use crate::state::UkurState;

/// Process-wide quay → parent stop place map.
///
/// Readers see a consistent snapshot; the refresh workflow replaces the
/// contents wholesale.
#[derive(Default)]
pub struct QuayRegistry {
    map: RwLock<HashMap<String, String>>,
}

impl QuayRegistry {
    pub fn stop_place_for(&self, quay: &str) -> Option<String> {
        match self.map.read() {
            Ok(map) => map.get(quay).cloned(),
            Err(_) => None,
        }
    }

    pub fn replace(&self, mapping: HashMap<String, String>) {
        if let Ok(mut map) = self.map.write() {
            *map = mapping;
        }
    }

    pub fn len(&self) -> usize {
        self.map.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The `TiamatRefresh` workflow: fetch the mapping document and swap it in.
///
/// The document is a JSON object of `quayRef: stopPlaceRef` pairs. Failures
/// leave the previous mapping in place; the next tick retries.
pub async fn refresh(state: &Arc<UkurState>) {
    match fetch_mapping(state).await {
        Ok(mapping) => {
            let entries = mapping.len();
            state.quays.replace(mapping);
            tracing::info!(entries, "quay mapping refreshed");
        }
        Err(e) => {
            tracing::warn!(err = %e, "quay mapping refresh failed");
            state.metrics.record_error(ErrorKind::UpstreamUnavailable);
        }
    }
}

async fn fetch_mapping(state: &Arc<UkurState>) -> anyhow::Result<HashMap<String, String>> {
    let resp = state
        .http
        .get(&state.config.tiamat_url)
        .send()
        .await?
        .error_for_status()?;
    let body = resp.text().await?;
    let mapping = serde_json::from_str(&body)?;
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_after_replace() {
        let registry = QuayRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.stop_place_for("NSR:Quay:9"), None);

        registry.replace(HashMap::from([(
            "NSR:Quay:9".to_owned(),
            "NSR:StopPlace:1".to_owned(),
        )]));
        assert_eq!(registry.stop_place_for("NSR:Quay:9").as_deref(), Some("NSR:StopPlace:1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn replace_is_wholesale() {
        let registry = QuayRegistry::default();
        registry.replace(HashMap::from([("NSR:Quay:1".to_owned(), "NSR:StopPlace:1".to_owned())]));
        registry.replace(HashMap::from([("NSR:Quay:2".to_owned(), "NSR:StopPlace:2".to_owned())]));
        assert_eq!(registry.stop_place_for("NSR:Quay:1"), None);
        assert_eq!(registry.stop_place_for("NSR:Quay:2").as_deref(), Some("NSR:StopPlace:2"));
    }
}
