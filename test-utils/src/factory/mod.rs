//! Factory methods for creating test data.
//!
//! This module provides factory methods for creating test entities with sensible defaults,
//! reducing boilerplate in tests. Factories that insert rows referencing a guild expect the
//! guild configuration row to exist already; `helpers` offers shorthands creating both.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), sea_orm::DbErr> {
//!     let db = /* ... */;
//!
//!     let guild = factory::create_guild_config(&db).await?;
//!     let record = factory::user_data::UserDataFactory::new(&db, guild.guild_id)
//!         .current_warns(2)
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Available Factories
//!
//! - `guild_config` - Create guild configuration rows
//! - `user_data` - Create per-user moderation counter rows
//! - `custom_command` - Create custom command rows
//! - `helpers` - ID generation and creation with dependencies

pub mod custom_command;
pub mod guild_config;
pub mod helpers;
pub mod user_data;

pub use custom_command::create_custom_command;
pub use guild_config::create_guild_config;
pub use user_data::create_user_data;
