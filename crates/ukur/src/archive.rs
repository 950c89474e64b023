// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File archive for inbound SIRI documents.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use siri::FeedKind;

use crate::state::epoch_ms;

/// Writes every inbound document to `dir` for later inspection.
///
/// Archive failures are logged and swallowed; the archive must never stall
/// or fail ingestion.
pub struct MessageArchive {
    dir: PathBuf,
    seq: AtomicU64,
}

impl MessageArchive {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, seq: AtomicU64::new(0) }
    }

    pub async fn store(&self, kind: FeedKind, body: &str) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(format!("{}-{}-{}.xml", kind, epoch_ms(), seq));
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), err = %e, "archive dir unavailable");
            return;
        }
        if let Err(e) = tokio::fs::write(&path, body).await {
            tracing::warn!(path = %path.display(), err = %e, "archive write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_documents_per_kind() {
        let dir = tempfile::tempdir().unwrap();
        let archive = MessageArchive::new(dir.path().to_path_buf());

        archive.store(FeedKind::Et, "<Siri/>").await;
        archive.store(FeedKind::Sx, "<Siri/>").await;

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|n| n.starts_with("et-")));
        assert!(names.iter().any(|n| n.starts_with("sx-")));
    }
}
