//! `tc-cli`: the `tripchat` terminal front end.

pub mod cli;
pub mod terminal;
