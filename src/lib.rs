//! Arcade bracket engine: library with models, bracket logic, storage and the service API.

pub mod config;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::Config;
pub use logic::{
    dedupe_participants, generate_matches, order_participants, read_participants_csv, Bracket,
    BracketLayout, ImportedParticipant, SeedingPolicy, SlotSource,
};
pub use models::{
    BracketType, GameMatch, MatchId, Participant, ParticipantId, Slot, Tournament, TournamentError,
    TournamentId, TournamentStatus, Zone, BRACKET_RESET_ROUND, GRAND_FINAL_ROUND, LOSERS_ROUND_BASE,
};
pub use service::{BracketService, TournamentData};
pub use store::{MemoryStore, Store};
