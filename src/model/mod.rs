//! Domain models shared between the persistence layer, the platform boundary and the
//! command modules. Identifiers are `u64` snowflakes; conversion from the `i64` database
//! columns happens at the repository boundary.

pub mod custom_command;
pub mod event;
pub mod guild;
pub mod moderation;
pub mod platform;
pub mod reply;
