use super::flight_phase::{FlightPhase, Trigger};
use strum_macros::Display;

/// Every user-facing failure of the control core. These are always returned,
/// a rejected call never changes the vehicle.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum ControlError {
    /// Out-of-domain numeric input (negative altitude or speed, `NaN`, ...).
    #[strum(to_string = "invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: f64 },
    /// The trigger has no edge leaving the current phase.
    #[strum(to_string = "no transition from {phase} on {trigger}")]
    InvalidTransition { phase: FlightPhase, trigger: Trigger },
    /// The command is blocked while the current phase is active.
    #[strum(to_string = "{command} is blocked during {phase}")]
    PhaseViolation { phase: FlightPhase, command: &'static str },
    /// An internal invariant broke earlier, the controller refuses any further change.
    #[strum(to_string = "controller halted after an internal invariant violation")]
    Halted,
}

impl std::error::Error for ControlError {}

/// Programming-error class: a committed state that should be impossible.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum InvariantViolation {
    #[strum(to_string = "{field} left its domain with {value}")]
    FieldOutOfDomain { field: &'static str, value: f64 },
}

impl std::error::Error for InvariantViolation {}
