//! Porcelain commands
//!
//! ## Commands
//!
//! - `compare`: similarity of the first tree against every other one

pub mod compare;
