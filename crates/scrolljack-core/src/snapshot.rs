#![forbid(unsafe_code)]

//! Serializable controller state and JSONL traces.
//!
//! Snapshots are what a host logs when it wants to replay or diff controller
//! behavior: one JSON object per line, labelled by the step that produced it.

use serde::Serialize;

use crate::controller::Release;

/// Point-in-time view of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollJackSnapshot {
    pub progress: f64,
    pub active: bool,
    pub locked: bool,
    pub enabled: bool,
    pub destroyed: bool,
    pub release: Option<Release>,
    pub touching: bool,
    /// Global listeners currently held.
    pub listeners: usize,
    pub progress_frame_pending: bool,
    pub activation_loop_armed: bool,
}

impl ScrollJackSnapshot {
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Serialize)]
struct JsonlTraceLine<'a> {
    run_id: &'a str,
    step: usize,
    label: &'a str,
    #[serde(flatten)]
    snapshot: &'a ScrollJackSnapshot,
}

/// Accumulates labelled snapshots for one run.
#[derive(Debug, Clone)]
pub struct SnapshotTrace {
    run_id: String,
    entries: Vec<(String, ScrollJackSnapshot)>,
}

impl SnapshotTrace {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, label: impl Into<String>, snapshot: ScrollJackSnapshot) {
        self.entries.push((label.into(), snapshot));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshots in recording order.
    pub fn snapshots(&self) -> impl Iterator<Item = &ScrollJackSnapshot> {
        self.entries.iter().map(|(_, s)| s)
    }

    /// One JSON object per line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for (step, (label, snapshot)) in self.entries.iter().enumerate() {
            let line = JsonlTraceLine {
                run_id: &self.run_id,
                step,
                label,
                snapshot,
            };
            if let Ok(json) = serde_json::to_string(&line) {
                out.push_str(&json);
                out.push('\n');
            }
        }
        out
    }
}
