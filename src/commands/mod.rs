// src/commands/mod.rs
//! Command handlers for the timewalk CLI

mod walk;

pub use walk::cmd_walk;
