//! Intermediate representation of the generated build graph.
//!
//! The graph holds the fixed rule templates and one edge per production step,
//! independent of the textual Ninja syntax rendered by
//! [`crate::ninja_gen`]. It is constructed fully in memory and validated
//! (dependency resolvability, acyclicity, non-empty source sets) before
//! anything is written, so a failing run never leaves partial output.

mod cycle;
mod from_project;
mod graph;

pub use from_project::SRCROOT_PLACEHOLDER;
pub use graph::{BuildEdge, BuildGraph, BuildRule, GraphError, RuleKind};
