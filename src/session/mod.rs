mod fleet;
mod vehicle_session;

pub use fleet::Fleet;
pub use vehicle_session::{SessionError, VehicleLink, VehicleSession};
