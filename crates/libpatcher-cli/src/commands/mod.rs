//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod arch;
pub mod check;
pub mod hex_utils;
pub mod hexdump;
pub mod patch;
pub mod table;
