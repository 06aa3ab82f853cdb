use super::{common::Vec2D, flight_phase::FlightPhase, vehicle_state::VehicleState};
use std::fmt::Display;

/// Immutable copy of the vehicle state and phase, returned by every
/// controller call and handed to the transport layer for serialization.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub position: Vec2D<f64>,
    pub altitude: f64,
    pub speed: f64,
    pub battery_pct: f64,
    pub phase: FlightPhase,
}

impl Snapshot {
    pub fn new(state: &VehicleState, phase: FlightPhase) -> Self {
        Self {
            position: state.position(),
            altitude: state.altitude(),
            speed: state.speed(),
            battery_pct: state.battery_pct(),
            phase,
        }
    }
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Phase: {}, Altitude: {:.1} m, Speed: {:.1} m/s, Position: {}, Battery: {:.1}%",
            self.phase, self.altitude, self.speed, self.position, self.battery_pct
        )
    }
}
