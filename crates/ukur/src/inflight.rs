// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-process workflow invocation counts.
//!
//! Advisory only: the scheduler uses it to keep one replica from piling up
//! invocations of the same workflow. Cluster-wide de-duplication is the
//! coordinator's job.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct InflightRegistry {
    counts: Mutex<HashMap<String, usize>>,
}

impl InflightRegistry {
    /// True when zero invocations of `workflow` are running in this process.
    pub fn is_idle(&self, workflow: &str) -> bool {
        match self.counts.lock() {
            Ok(counts) => counts.get(workflow).copied().unwrap_or(0) == 0,
            Err(_) => false,
        }
    }

    /// Mark one invocation started. The guard marks it finished on drop,
    /// so a panicking workflow still frees its slot.
    pub fn begin(self: &Arc<Self>, workflow: &str) -> InflightGuard {
        if let Ok(mut counts) = self.counts.lock() {
            *counts.entry(workflow.to_owned()).or_insert(0) += 1;
        }
        InflightGuard { registry: Arc::clone(self), workflow: workflow.to_owned() }
    }

    fn finish(&self, workflow: &str) {
        if let Ok(mut counts) = self.counts.lock() {
            if let Some(count) = counts.get_mut(workflow) {
                *count = count.saturating_sub(1);
            }
        }
    }
}

pub struct InflightGuard {
    registry: Arc<InflightRegistry>,
    workflow: String,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.registry.finish(&self.workflow);
    }
}
