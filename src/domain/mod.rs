// Domain layer: variants, invocations and the engine/executor ports.

pub mod model;
pub mod ports;
