// Domain layer: notification/transfer models and the ports the dispatcher drives.

pub mod model;
pub mod ports;
