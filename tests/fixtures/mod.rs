//! Test fixtures for batch-planner.
//!
//! Provides Klang Valley locations around the HQ depot and an order builder.

#![allow(dead_code)]

pub mod klang_valley_locations;

pub use klang_valley_locations::*;
