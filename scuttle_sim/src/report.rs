//! Fixture statistics, rendered as `report.md`.

use scuttle_core::{Content, ContentKind, SocialState};
use scuttle_env::{FeedId, Record};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

/// Counts describing a finished fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// The primary participant (hop 0)
    pub main_feed: FeedId,

    pub total: usize,

    pub authors: usize,

    pub per_type: BTreeMap<ContentKind, usize>,

    /// Messages from hop 0, 1, 2 and 3+
    pub per_hop: [usize; 4],
}

impl Report {
    /// Builds the report from the log and the final social state.
    ///
    /// Hop 1 is whoever the primary follows, hop 2 whoever a hop-1
    /// participant follows, everyone else is 3+.
    pub fn build(log: &[Record<Content>], participants: &[FeedId], state: &SocialState) -> Self {
        let hops = hop_distances(participants, state);
        let mut per_hop = [0usize; 4];
        for record in log {
            if let Some(hop) = hops.get(record.author()) {
                per_hop[*hop] += 1;
            }
        }

        Self {
            main_feed: participants.first().cloned().unwrap_or_else(|| FeedId::new("")),
            total: log.len(),
            authors: participants.len(),
            per_type: state.counts(),
            per_hop,
        }
    }

    /// Markdown body of `report.md`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Stats for this fixture");
        let _ = writeln!(out);
        let _ = writeln!(out, "The main feed is {} (hop 0).", self.main_feed);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "There are {} msgs in total, from {} possible authors.",
            self.total, self.authors
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "## Messages per type");
        let _ = writeln!(out);
        for (kind, count) in &self.per_type {
            let _ = writeln!(out, "- There are {} msgs of type \"{}\"", count, kind);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "## Messages per hop distance");
        let _ = writeln!(out);
        for (hop, count) in self.per_hop.iter().enumerate() {
            let label = if hop == 3 { "3+".to_string() } else { hop.to_string() };
            let _ = writeln!(out, "- There are {} msgs from hop {}", count, label);
        }
        out
    }
}

fn hop_distances(participants: &[FeedId], state: &SocialState) -> BTreeMap<FeedId, usize> {
    let mut hops = BTreeMap::new();
    let Some(primary) = participants.first() else {
        return hops;
    };

    let hop1: HashSet<&FeedId> = state
        .follows(primary)
        .iter()
        .filter(|id| *id != primary)
        .collect();

    for id in participants {
        let hop = if id == primary {
            0
        } else if hop1.contains(id) {
            1
        } else if hop1.iter().any(|h| state.follows(h).contains(id)) {
            2
        } else {
            3
        };
        hops.insert(id.clone(), hop);
    }
    hops
}
