//! Interface definitions for the destination index.
//!
//! This module defines the abstract `DestinationIndex` trait that allows
//! for dependency injection and swappable index implementations.

mod destination_index;

pub use destination_index::DestinationIndex;
