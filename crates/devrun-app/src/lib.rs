//! # devrun-app - Config Gates and Orchestration
//!
//! ## Public API
//!
//! - [`Orchestrator`] - Runs gates, packager and platform runners; returns a typed outcome
//! - [`RunSuccess`], [`RunFailure`], [`FailureKind`] - Outcome of a run
//! - [`ConfigGate`], [`RunnerFactory`] - Seams the orchestrator is generic over
//! - [`config`] - Settings, app.json validation and generated config
//! - [`signals`] - SIGINT / SIGTERM handling

pub mod config;
pub mod orchestrator;
pub mod signals;

pub use config::{load_settings, Settings};
pub use orchestrator::{
    ConfigGate, FailureKind, NativeOrchestrator, NativeRunnerFactory, Orchestrator, ProjectGate,
    RunFailure, RunSuccess, RunnerFactory,
};
pub use signals::wait_for_signal;
