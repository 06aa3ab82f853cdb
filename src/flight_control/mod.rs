pub mod common;
mod control_error;
mod controller;
mod event;
mod flight_phase;
mod flight_state_machine;
mod safety_policy;
mod snapshot;
mod vehicle_state;
#[cfg(test)]
mod tests;

pub use control_error::{ControlError, InvariantViolation};
pub use controller::Controller;
pub use event::{Command, SensorEvent};
pub use flight_phase::{FlightPhase, TRANSITION_LOOKUP, Trigger};
pub use flight_state_machine::FlightStateMachine;
pub use safety_policy::{SafetyDecision, SafetyPolicy};
pub use snapshot::Snapshot;
pub use vehicle_state::VehicleState;
