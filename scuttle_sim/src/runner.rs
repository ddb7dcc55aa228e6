//! Generation runner - drives the engine over every message position.

use crate::error::RunError;
use crate::oracle::{LogOracle, Verdict};
use crate::report::Report;
use crate::world::FixtureWorld;

use scuttle_core::{Content, ContentKind, Draft, Generator, Position, SocialState};
use scuttle_env::{FeedStore, Record};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Progress is logged every this many messages.
pub const PROGRESS_EVERY: usize = 1_000;

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Seed used
    pub seed: String,

    /// Messages generated
    pub messages: usize,

    /// Participants
    pub authors: usize,

    /// 0-based forced-last index
    pub last_index: usize,

    /// Messages per content kind
    pub per_type: BTreeMap<ContentKind, usize>,

    /// Sampler draws consumed
    pub sampler_calls: u64,

    /// Oracle result over the log
    pub verdict: Verdict,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Records in generation order
    pub records: Vec<Record<Content>>,

    /// Social state after the last fold
    pub state: SocialState,

    pub summary: RunSummary,
}

impl RunOutput {
    /// Fixture statistics for `report.md`.
    pub fn report(&self, world: &FixtureWorld) -> Report {
        Report::build(&self.records, &world.participants, &self.state)
    }
}

/// Runs one fixture generation against a world.
pub struct GenerationRunner<'w> {
    world: &'w FixtureWorld,
}

impl<'w> GenerationRunner<'w> {
    pub fn new(world: &'w FixtureWorld) -> Self {
        Self { world }
    }

    /// Generates positions `0..messages` in order.
    ///
    /// Each step picks an author, synthesizes content, appends it unless the
    /// store already did, and folds the record before the next step. Any
    /// error aborts the whole run.
    pub async fn run(&self) -> Result<RunOutput, RunError> {
        let config = &self.world.config;
        let participants = &self.world.participants;
        let store = self.world.store.as_ref();
        let last = config.last_index();

        let mut gen = Generator::new(config.seed.clone(), config.frequencies.clone());
        let mut state = SocialState::new(participants);
        let mut records = Vec::with_capacity(config.messages);

        info!(
            "Generating {} messages from {} authors (seed={}, last={})",
            config.messages,
            participants.len(),
            config.seed,
            last
        );

        for index in 0..config.messages {
            let pos = Position::new(index, last);
            let author = gen
                .pick_author(pos, participants)
                .map_err(|e| RunError::at(index, e))?
                .clone();
            let draft = gen
                .next_content(pos, &author, participants, &state, store)
                .await
                .map_err(|e| RunError::at(index, e))?;

            let record = match draft {
                Draft::Content(content) => store.append(&author, content).await?,
                Draft::Appended(record) => record,
            };
            state.fold(&record);

            if config.verbose {
                println!("{}\n", serde_json::to_string_pretty(&record)?);
            }
            if config.progress && (index + 1) % PROGRESS_EVERY == 0 {
                info!("Generating msg {} / {}", index + 1, config.messages);
            }
            debug!("#{} {} by {}", index, record.content().kind(), author);

            records.push(record);
        }

        let verdict = LogOracle::new(participants[0].clone(), last).check(&records);
        for violation in &verdict.violations {
            warn!(
                "Oracle: #{} {:?}: {}",
                violation.index, violation.property, violation.detail
            );
        }
        info!(
            "Generated {} messages ({} sampler draws)",
            records.len(),
            gen.sampler().calls()
        );

        let summary = RunSummary {
            seed: config.seed.clone(),
            messages: records.len(),
            authors: participants.len(),
            last_index: last,
            per_type: state.counts(),
            sampler_calls: gen.sampler().calls(),
            verdict,
        };

        Ok(RunOutput {
            records,
            state,
            summary,
        })
    }
}
