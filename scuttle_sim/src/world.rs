//! FixtureWorld - the generation harness container.

use crate::context::VirtualClock;
use crate::keys::{DeterministicKeyProvider, Identity};
use crate::store::MemoryFeedStore;

use rand::distributions::Alphanumeric;
use rand::Rng;
use scuttle_core::{Content, Frequencies};
use scuttle_env::{FeedId, LogClock, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Default number of messages per run.
pub const DEFAULT_MESSAGES: usize = 10_000;

/// Default number of participants per run.
pub const DEFAULT_AUTHORS: usize = 150;

/// Random 24-character alphanumeric seed.
pub fn random_seed() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

/// Configuration for a fixture run.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    /// Seed string for determinism
    pub seed: String,

    /// Number of messages to generate
    pub messages: usize,

    /// Number of participants
    pub authors: usize,

    /// 1-based position of the forced-last post (defaults to `messages`)
    pub latest_msg: Option<usize>,

    /// Write `report.md`
    pub report: bool,

    /// Write `follow-graph.json`
    pub follow_graph: bool,

    /// Write a secret file for every participant, not just the primary
    pub all_keys: bool,

    /// Print every appended record
    pub verbose: bool,

    /// Log progress while generating
    pub progress: bool,

    /// Timestamp records with the wall clock instead of the virtual clock
    pub realtime: bool,

    /// Where output files go
    pub output_dir: PathBuf,

    /// Tuned constants of the engine
    pub frequencies: Frequencies,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            seed: random_seed(),
            messages: DEFAULT_MESSAGES,
            authors: DEFAULT_AUTHORS,
            latest_msg: None,
            report: true,
            follow_graph: false,
            all_keys: false,
            verbose: false,
            progress: false,
            realtime: false,
            output_dir: PathBuf::from("data"),
            frequencies: Frequencies::default(),
        }
    }
}

impl FixtureConfig {
    /// Clamps degenerate sizes to the minimum of 1 and a `latest_msg`
    /// outside `1..=messages` to `messages`.
    pub fn normalized(mut self) -> Self {
        if self.messages < 1 {
            warn!("messages = {} clamped to 1", self.messages);
            self.messages = 1;
        }
        if self.authors < 1 {
            warn!("authors = {} clamped to 1", self.authors);
            self.authors = 1;
        }
        if let Some(latest) = self.latest_msg {
            if latest < 1 || latest > self.messages {
                warn!(
                    "latestmsg = {} outside 1..={}, using {}",
                    latest, self.messages, self.messages
                );
                self.latest_msg = None;
            }
        }
        self
    }

    /// 0-based index of the forced-last post.
    pub fn last_index(&self) -> usize {
        self.latest_msg
            .unwrap_or(self.messages)
            .saturating_sub(1)
    }
}

/// The FixtureWorld - participants, clock and store of one run.
pub struct FixtureWorld {
    /// Configuration (normalized)
    pub config: FixtureConfig,

    /// Participant identities, index 0 is the primary
    pub identities: Vec<Identity>,

    /// Participant ids, same order as `identities`
    pub participants: Vec<FeedId>,

    /// Timestamp source shared with the store
    pub clock: Arc<dyn LogClock>,

    /// Where records go
    pub store: Arc<MemoryFeedStore<Content>>,
}

impl FixtureWorld {
    /// Creates a new FixtureWorld with the given configuration.
    pub fn new(config: FixtureConfig) -> Self {
        let config = config.normalized();

        let mut keys = DeterministicKeyProvider::new(config.seed.clone());
        let identities = keys.generate(config.authors);
        let participants = identities.iter().map(|i| i.id.clone()).collect();

        let clock: Arc<dyn LogClock> = if config.realtime {
            SystemClock::shared()
        } else {
            VirtualClock::shared()
        };
        let store = Arc::new(MemoryFeedStore::new(&identities, clock.clone()));

        Self {
            config,
            identities,
            participants,
            clock,
            store,
        }
    }

    /// The primary participant (owner of the database instance).
    pub fn primary(&self) -> &Identity {
        &self.identities[0]
    }

    /// Returns the number of participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: &str, messages: usize, authors: usize) -> FixtureConfig {
        FixtureConfig {
            seed: seed.to_string(),
            messages,
            authors,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = FixtureConfig::default();
        assert_eq!(config.messages, 10_000);
        assert_eq!(config.authors, 150);
        assert_eq!(config.seed.len(), 24);
        assert!(config.seed.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(config.report);
        assert!(!config.follow_graph);
        assert_eq!(config.last_index(), 9_999);
    }

    #[test]
    fn test_degenerate_sizes_clamped() {
        let config = config("clamp", 0, 0).normalized();
        assert_eq!(config.messages, 1);
        assert_eq!(config.authors, 1);
        assert_eq!(config.last_index(), 0);
    }

    #[test]
    fn test_latest_msg() {
        let mut c = config("latest", 5, 2);
        c.latest_msg = Some(3);
        assert_eq!(c.clone().normalized().last_index(), 2);

        c.latest_msg = Some(9);
        let c = c.normalized();
        assert_eq!(c.latest_msg, None);
        assert_eq!(c.last_index(), 4);
    }

    #[test]
    fn test_world_creation() {
        let world = FixtureWorld::new(config("world", 10, 3));

        assert_eq!(world.participant_count(), 3);
        assert_eq!(world.primary().id, world.participants[0]);
        assert!(world.clock.is_deterministic());
    }

    #[test]
    fn test_world_determinism() {
        let world1 = FixtureWorld::new(config("same", 10, 4));
        let world2 = FixtureWorld::new(config("same", 10, 4));

        // Same seed = same identities
        assert_eq!(world1.participants, world2.participants);
    }

    #[test]
    fn test_realtime_clock() {
        let mut c = config("wall", 10, 1);
        c.realtime = true;
        let world = FixtureWorld::new(c);
        assert!(!world.clock.is_deterministic());
    }
}
