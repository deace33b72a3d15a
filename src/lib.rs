#![doc = include_str!("RUSTDOC.md")]

pub mod amp;
pub mod analytics;
pub mod performance;
pub mod platform;
pub mod targets;
pub mod track;
