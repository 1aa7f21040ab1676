//! Bracket business logic: sizing, seeding, generation, advancement, guard, bye sweep.

mod advance;
mod bracket;
mod generator;
mod guard;
mod import;
mod layout;
mod seeding;
mod sweep;

pub use bracket::Bracket;
pub use generator::generate_matches;
pub use import::{read_participants_csv, ImportedParticipant};
pub use layout::{BracketLayout, SlotSource};
pub use seeding::{dedupe_participants, order_participants, SeedingPolicy};
