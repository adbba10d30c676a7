// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Mayhem: a deterministic multi-agent snake arena.
//!
//! Six greedy agents compete on a 50x50 board for food and power-ups while
//! obstacles come and go. Everything is driven by a seeded RNG, so a seed
//! and a config fully determine a run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI (run / watch / batch)         │
//! ├─────────────────────────────────────┤
//! │   Simulation host, batch runner     │
//! ├─────────────────────────────────────┤
//! │   Game core (world, heuristic,      │
//! │   tick resolver, entity upkeep)     │
//! └─────────────────────────────────────┘
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod game;
pub mod render;
pub mod sim;

pub use batch::{BatchStats, RunSummary, run_batch};
pub use config::{SimConfig, Speed};
pub use error::{ConfigError, ConfigResult};
pub use render::render_ascii;
pub use sim::{Scoreboard, Simulation};

// Re-export key game types at crate root for convenience
pub use game::{Agent, AgentId, Coord, Direction, EventKind, Grid, TickEvent, World};
