//! hwforge core library.
//!
//! Hardware generator flows are described as graphs of immutable
//! [`Target`](target::Target)s. Plans and composers build those graphs
//! without running anything; a [`Resolver`](resolve::Resolver) then executes
//! each distinct target once, producers before consumers.

pub mod attributes;
pub mod blueprint;
pub mod builtins;
pub mod cli;
pub mod dot;
pub mod field;
pub mod graph;
pub mod hasher;
pub mod pipeline;
pub mod plan;
pub mod resolve;
pub mod runner;
pub mod target;
pub mod tools;
pub mod value;
