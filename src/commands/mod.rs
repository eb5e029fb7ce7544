//! CLI commands

pub mod add;
pub mod build;
pub mod chat;
pub mod delete;
pub mod init;
pub mod list;
pub mod normalize;
pub mod reorder;
pub mod resume;
