//! Scuttle fixture driver
//!
//! Runs the deterministic content engine end to end: deterministic
//! identities, a virtual clock, an in-memory signed feed store, the
//! generation loop, an oracle over the finished log and the output writers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      FixtureWorld                        │
//! │  DeterministicKeyProvider ──► identities (participants)  │
//! │  VirtualClock ──────────────► MemoryFeedStore            │
//! └──────────────────────────────────────────────────────────┘
//!        │                                ▲
//!        ▼                                │ append / replicate / groups
//! ┌──────────────────┐   Draft    ┌───────┴──────────┐
//! │ GenerationRunner │◄──────────►│ scuttle_core     │
//! │  (loop 0..N)     │  fold      │ Generator, State │
//! └──────────────────┘            └──────────────────┘
//!        │
//!        ▼
//!   LogOracle ─► Report ─► exporter (log.ndjson, report.md, ...)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use scuttle_sim::{FixtureConfig, FixtureWorld, GenerationRunner};
//!
//! let config = FixtureConfig {
//!     seed: "deterministic".into(),
//!     messages: 100,
//!     authors: 10,
//!     ..Default::default()
//! };
//!
//! let world = FixtureWorld::new(config);
//! let output = GenerationRunner::new(&world).run().await?;
//! assert!(output.summary.passed());
//! ```

mod context;
mod error;
mod keys;
mod store;

pub mod exporter;
pub mod oracle;
pub mod report;
pub mod runner;
pub mod world;

pub use context::VirtualClock;
pub use error::RunError;
pub use keys::{DeterministicKeyProvider, Identity, Secret};
pub use oracle::{LogOracle, Property, Verdict, Violation};
pub use report::Report;
pub use runner::{GenerationRunner, RunOutput, RunSummary};
pub use store::MemoryFeedStore;
pub use world::{random_seed, FixtureConfig, FixtureWorld};
