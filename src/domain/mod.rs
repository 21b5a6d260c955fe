// Domain layer: models, wire payload and ports. No HTTP here.

pub mod model;
pub mod payload;
pub mod ports;
