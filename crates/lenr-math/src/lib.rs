//! Mathematical primitives for the nano-SAV screening model.

pub mod linalg;
pub mod ode;
pub mod roots;
