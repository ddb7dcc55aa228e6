//! Scuttle Core - Deterministic Social-Network Fixture Engine
//!
//! Synthesizes a reproducible stream of social activity records:
//! 1. **Seeded sampling**: every draw is a pure function of `(seed, call index)`
//! 2. **Social state**: follow, block and group membership folded record by record
//! 3. **Synthesis**: posts, votes, contacts, profile updates, private messages
//!    and group operations that only reference what already exists
//!
//! The driver owns the loop; the engine decides *who* writes *what* at each
//! position:
//!
//! ```text
//! for i in 0..N
//!   author  = generator.pick_author(pos, participants)
//!   draft   = generator.next_content(pos, author, participants, state, store)
//!   record  = store.append(author, draft)      (unless already appended)
//!   state.fold(record)
//! ```

pub mod content;
pub mod error;
pub mod frequencies;
pub mod lorem;
pub mod private;
pub mod sample;
pub mod select;
pub mod state;
pub mod synth;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types for convenience
pub use content::{Content, ContentKind, PostContent, Recipient, Relation, LATEST_MARKER, OLDEST_MARKER};
pub use error::GenError;
pub use frequencies::Frequencies;
pub use sample::Sampler;
pub use select::Draft;
pub use state::SocialState;
pub use synth::{Generator, Position, Visibility};
