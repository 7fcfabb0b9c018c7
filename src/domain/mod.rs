// Domain layer: import models and ports (collaborator interfaces).

pub mod model;
pub mod ports;
