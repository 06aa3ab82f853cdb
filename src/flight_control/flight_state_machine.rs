use super::{
    common::Vec2D,
    control_error::ControlError,
    event::Command,
    flight_phase::{FlightPhase, TRANSITION_LOOKUP, Trigger},
    vehicle_state::VehicleState,
};
use crate::config::ControlConfig;

/// Owns the active flight phase and walks the transition table.
///
/// Per-phase behaviour (which commands a phase admits, which automatic
/// transition it watches for) is a `match` over the closed [`FlightPhase`] set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightStateMachine {
    phase: FlightPhase,
    cruise_altitude: f64,
    home_radius: f64,
}

impl FlightStateMachine {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            phase: FlightPhase::Idle,
            cruise_altitude: config.cruise_altitude,
            home_radius: config.home_radius,
        }
    }

    pub fn phase(&self) -> FlightPhase { self.phase }

    /// Pure table lookup, `None` if the trigger has no edge out of `phase`.
    pub fn next_phase(phase: FlightPhase, trigger: Trigger) -> Option<FlightPhase> {
        TRANSITION_LOOKUP.get(&(phase, trigger)).copied()
    }

    /// Takes the edge for `trigger` or fails without touching the phase.
    pub fn fire(&mut self, trigger: Trigger) -> Result<FlightPhase, ControlError> {
        let Some(next) = Self::next_phase(self.phase, trigger) else {
            return Err(ControlError::InvalidTransition { phase: self.phase, trigger });
        };
        self.phase = next;
        Ok(next)
    }

    /// Checks the active phase's exit condition against a committed-to-be state
    /// and takes the edge if it holds. Returns the new phase if one was entered.
    pub fn advance(&mut self, state: &VehicleState) -> Option<FlightPhase> {
        let trigger = self.automatic_trigger(state)?;
        self.fire(trigger).ok()
    }

    /// Decides whether the active phase lets `command` through.
    ///
    /// Phase commands map to their trigger, admitted movement commands map to
    /// `None`. Blocked movement commands fail with `PhaseViolation`.
    pub fn admit(&self, command: &Command) -> Result<Option<Trigger>, ControlError> {
        let trigger = match command {
            Command::Takeoff => Some(Trigger::Takeoff),
            Command::Land => Some(Trigger::Land),
            Command::ReturnToBase => Some(Trigger::ReturnRequested),
            Command::SetPosition(_) | Command::SetAltitude(_) | Command::SetSpeed(_) => None,
        };
        if trigger.is_some() || self.admits_movement(command) {
            Ok(trigger)
        } else {
            Err(ControlError::PhaseViolation { phase: self.phase, command: command.into() })
        }
    }

    fn admits_movement(&self, command: &Command) -> bool {
        match self.phase {
            FlightPhase::Idle | FlightPhase::Returning => false,
            FlightPhase::Takeoff | FlightPhase::Cruise => true,
            FlightPhase::Landing => {
                matches!(command, Command::SetAltitude(_) | Command::SetSpeed(_))
            }
        }
    }

    fn automatic_trigger(&self, state: &VehicleState) -> Option<Trigger> {
        match self.phase {
            FlightPhase::Idle | FlightPhase::Cruise => None,
            FlightPhase::Takeoff => (state.altitude() >= self.cruise_altitude)
                .then_some(Trigger::CruiseAltitudeReached),
            FlightPhase::Returning => {
                let home = state.position().in_radius_of(&Vec2D::zero(), self.home_radius);
                (home && state.altitude() <= 0.0).then_some(Trigger::ReachedHome)
            }
            FlightPhase::Landing => (state.altitude() <= 0.0 && state.speed() <= 0.0)
                .then_some(Trigger::Touchdown),
        }
    }

    #[cfg(test)]
    pub(crate) fn force_phase(&mut self, phase: FlightPhase) { self.phase = phase; }
}
