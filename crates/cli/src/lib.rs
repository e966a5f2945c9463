//! Plumbing shared by the Vigil command-line programs.

pub mod config;
