// Domain layer: core models and ports (interfaces). No framework types here beyond serde.

pub mod model;
pub mod ports;
