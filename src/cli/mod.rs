//! CLI infrastructure for the pursuit toolkit
//!
//! This module provides the command-line interface for training and
//! evaluating behavior-learning agents in the reference arena.

pub mod commands;
pub mod output;
