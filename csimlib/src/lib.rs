//! # CsimLib
//!
//! CsimLib is a library for single-level cache simulation
//!
//! It replays a trace of loads and stores against a direct mapped, set associative or fully
//! associative cache, and counts hits, misses and the cycles a simple memory model would spend.
//! Write-allocate and write policies, and LRU or FIFO eviction, are configurable
//!
//! Simulation is deterministic: the same configuration and trace always give the same statistics

/// Splits addresses into tags and set indices
pub mod address;

/// Contains the cache state and its shape-specific lookup and install, and a utility enum over
/// the provided replacement policies
pub mod cache;

/// Contains cache configuration, in both the JSON input format and its validated form
pub mod config;

/// Trace file readers
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom ones
pub mod replacement_policies;

/// Contains the simulator used to replay a trace with a given cache configuration
pub mod simulator;

/// The counters produced by a simulation
pub mod stats;

/// Parsing of the trace format
pub mod trace;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
