// Domain layer: lookup records, deadline and the provider port.

pub mod model;
pub mod ports;
