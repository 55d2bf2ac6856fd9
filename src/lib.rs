//! ninjagen core library.
//!
//! Compiles a declarative project descriptor (targets, sources, layered
//! settings, inter-target dependencies) into a Ninja build file. The pipeline
//! is a sequence of pure, staged transformations: descriptor files →
//! [`registry::TargetRegistry`] → [`ir::BuildGraph`] → rendered Ninja text.

pub mod ast;
pub mod cli;
pub mod descriptor;
pub mod ir;
pub mod ninja_gen;
pub mod registry;
pub mod runner;
pub mod settings;
pub mod sources;
