//! Modbot Test Utils
//!
//! Provides shared testing utilities for building integration and unit tests for the moderation
//! bot. This crate offers a builder pattern for creating test contexts with in-memory SQLite
//! databases, factories for the persisted records, and a process-wide lock for tests that
//! construct process-singleton objects.
//!
//! # Overview
//!
//! The test utilities consist of the following components:
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment containing the database connection
//! - **TestError**: Error types that can occur during test setup
//! - **factory**: Builders inserting guild configs, moderation records and custom commands
//! - **lock**: Serialises tests that must not run concurrently
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn test_guild_config() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_moderation_tables()
//!         .build()
//!         .await?;
//!
//!     let db = test.db.unwrap();
//!     // Perform database operations...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod lock;
