// Domain layer: course records and the ports the widget controller depends on.

pub mod model;
pub mod ports;
