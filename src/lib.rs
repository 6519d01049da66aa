//! Zonegen
//!
//! Generates authoritative DNS zone files, forward and reverse, from a
//! declarative host and network inventory, plus the nameserver
//! configuration fragment registering them.

pub mod config;
pub mod error;
pub mod operation;
pub mod process;
pub mod zones;
