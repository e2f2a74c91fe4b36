//! Nano-SAV D-D screening model.
//!
//! Topological boost, barrier elimination, driven resonance, the detuning
//! sweep and the scenario driver that chains them.

pub mod barrier;
pub mod render;
pub mod resonance;
pub mod scenario;
pub mod sweep;
pub mod topology;
