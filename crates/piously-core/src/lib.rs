//! Piously - a two-faction hex board game engine
//!
//! This crate provides the full rules engine for Piously, including:
//! - Cube coordinate system for the hex map
//! - Board representation with movable rooms, auras, relics, and players
//! - The fourteen spells and their all-or-nothing cast engine
//! - Turn state machine with full rule enforcement
//!
//! # Architecture
//!
//! The engine is platform-agnostic and free of any rendering or I/O
//! concerns. Interactive decisions are pulled through an [`InputProvider`],
//! so the same engine drives a UI, a bot, or a scripted test.
//!
//! # Modules
//!
//! - [`hex`]: Cube coordinates, directions, rotation, leap geometry
//! - [`board`]: Rooms, cells, relics, players, and graph queries
//! - [`input`]: Decision providers for multi-step actions
//! - [`spell`]: The fourteen spells and the cast engine
//! - [`actions`]: Typed player intents and emitted events
//! - [`game`]: Phases, action economy, claiming, and the win check

pub mod actions;
pub mod board;
pub mod game;
pub mod hex;
pub mod input;
pub mod spell;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{
    Board, BoardSnapshot, Cell, Faction, Occupant, Op, PlayerPiece, Relic, RelicId, Room, RoomId,
    ACTIONS_PER_TURN, STANDARD_LAYOUT,
};
pub use game::{winner, GameError, GamePhase, GameResult, GameState};
pub use hex::{Direction, HexCoord};
pub use input::{Answer, AutoInput, Directive, InputProvider, ScriptedInput};
pub use spell::{cast, Spell, SpellKind};
