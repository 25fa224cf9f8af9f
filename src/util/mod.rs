pub mod embed;
pub mod format;
pub mod prefix;
