//! Data types shared by every stage.

pub mod candidate;
pub mod config;
pub mod record;
pub mod taxonomy;
