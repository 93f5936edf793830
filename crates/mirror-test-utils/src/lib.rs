//! Shared test utilities for the mirror workspace.
//!
//! This crate provides standardised source/replica fixtures so that every
//! crate's test suite builds trees and checks convergence the same way. It
//! is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TreeFixture`] with a source and a replica directory
//! - [`inventory`]: snapshots of a tree's files and directories

pub mod inventory;
pub mod tree;

pub use inventory::{dir_inventory, file_inventory};
pub use tree::TreeFixture;
