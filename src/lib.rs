//! Moderation bot for Discord guilds.
//!
//! The crate is split the following way:
//! - `bot` - connection lifecycle, gateway handlers and the platform boundary
//! - `command` - command framework: parsing, guards, cooldowns and dispatch
//! - `module` - the loadable command modules and event listeners
//! - `data` - repositories over the `entity` tables
//! - `config` - validated runtime settings
//! - `model`, `error`, `util` - shared types and helpers

pub mod bot;
pub mod command;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod module;
pub mod startup;
pub mod util;
