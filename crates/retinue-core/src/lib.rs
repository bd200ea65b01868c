//! Configuration loading and the yearly chronicle runner for the Retinue
//! engine.
//!
//! This crate wires the agent logic to the outside: it loads tunables from
//! YAML, owns the roster together with a seeded RNG and the in-game year,
//! and forwards lifecycle notifications to an observer.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from YAML into strongly-typed
//!   structs ([`SimulationConfig`]).
//! - [`runner`] -- The [`Chronicle`] year runner and the
//!   [`LifecycleObserver`] callback interface.
//!
//! [`SimulationConfig`]: config::SimulationConfig
//! [`Chronicle`]: runner::Chronicle
//! [`LifecycleObserver`]: runner::LifecycleObserver

pub mod config;
pub mod runner;
