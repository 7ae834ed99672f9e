//! # Cairn
//!
//! Procedural dungeon floors and deterministic, turn-based party combat.
//!
//! ## Architecture Overview
//!
//! Cairn is split into a handful of small systems that all share one explicit
//! random source and one entity arena:
//!
//! - **Generation**: room-and-corridor floor layouts, enemy rosters and loot
//! - **World**: the tile grid, fog of war and tile interactions
//! - **Entities**: ability scores, derived stats, equipment, skills and levels
//! - **Combat**: initiative, the turn state machine and attack/skill resolution
//! - **AI**: decision policies for hostile enemies and friendly companions
//! - **Session**: the [`GameState`] that owns everything for a single run
//!
//! Every system takes a [`GameRng`] by reference instead of touching global
//! randomness, so a whole run can be replayed from its seed.

pub mod game;
pub mod generation;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use utils::*;

// Explicit re-exports for commonly used types
pub use game::{
    // From autopilot
    Autopilot,
    RunSummary,
    // From combat
    AttackResult,
    AttackRoll,
    CombatEvent,
    CombatRewards,
    CombatState,
    IllegalAction,
    Phase,
    PlayerAction,
    // From entities
    ClassKind,
    EnemyKind,
    Entity,
    EntityArena,
    EntityId,
    Role,
    // From stats
    Ability,
    AbilityScores,
    InsufficientResource,
    StatBlock,
    // From state
    GameEvent,
    GameState,
    GameStatistics,
    Mode,
    // From world
    Direction,
    Dungeon,
    Position,
    Tile,
};

pub use generation::{
    DungeonGenerator, GenerationConfig, GenerationDegraded, ItemKind, Loot, Room,
};

pub use utils::{DiceExpr, DiceParseError, GameRng};

/// Core error type for the Cairn engine.
#[derive(thiserror::Error, Debug)]
pub enum CairnError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid for the requested operation
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action was rejected without changing any state
    #[error("Illegal action: {0}")]
    InvalidAction(#[from] IllegalAction),

    /// A dice formula could not be parsed
    #[error("Dice error: {0}")]
    Dice(#[from] DiceParseError),
}

/// Result type used throughout the Cairn codebase.
pub type CairnResult<T> = Result<T, CairnError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_DUNGEON_WIDTH: u32 = 40;

    /// Default dungeon height in tiles
    pub const DEFAULT_DUNGEON_HEIGHT: u32 = 30;

    /// Radius (Euclidean) revealed around the hero after every step
    pub const SIGHT_RADIUS: u32 = 4;

    /// Maximum messages kept in the session log
    pub const MAX_MESSAGES: usize = 100;

    /// Gold the party starts a run with
    pub const STARTING_GOLD: u32 = 50;

    /// Number of AI companions recruited at the start of a run
    pub const COMPANION_COUNT: usize = 2;
}
