pub mod cache;
pub mod cli;
pub mod common;
