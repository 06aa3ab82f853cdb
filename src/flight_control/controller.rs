use super::{
    common::Vec2D,
    control_error::ControlError,
    event::{Command, SensorEvent},
    flight_phase::{FlightPhase, Trigger},
    flight_state_machine::FlightStateMachine,
    safety_policy::{SafetyDecision, SafetyPolicy},
    snapshot::Snapshot,
    vehicle_state::VehicleState,
};
use crate::config::ControlConfig;
use crate::{error, event, safety, warn};
use strum::IntoEnumIterator;

/// The single mutation gateway for one vehicle session.
///
/// Every call works on a copy of the vehicle state and the state machine and
/// only commits both once all mutations, transitions and invariant checks
/// went through, so a failed call is never partially visible.
#[derive(Debug)]
pub struct Controller {
    state: VehicleState,
    fsm: FlightStateMachine,
    policy: SafetyPolicy,
    halted: bool,
}

impl Controller {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            state: VehicleState::new(),
            fsm: FlightStateMachine::new(config),
            policy: SafetyPolicy::new(config),
            halted: false,
        }
    }

    pub fn snapshot(&self) -> Snapshot { Snapshot::new(&self.state, self.fsm.phase()) }

    pub fn phase(&self) -> FlightPhase { self.fsm.phase() }

    pub fn is_halted(&self) -> bool { self.halted }

    /// Validates `command` against the active phase, applies it and lets the
    /// state machine take any automatic transition the new state satisfies.
    pub fn apply_command(&mut self, command: Command) -> Result<Snapshot, ControlError> {
        self.ensure_running()?;
        let mut state = self.state;
        let mut fsm = self.fsm;

        match fsm.admit(&command)? {
            Some(trigger) => {
                let next = fsm.fire(trigger)?;
                Self::enter(next, &mut state)?;
            }
            None => match command {
                Command::SetPosition(position) => state.set_position(position)?,
                Command::SetAltitude(altitude) => state.set_altitude(altitude)?,
                Command::SetSpeed(speed) => state.set_speed(speed)?,
                Command::ReturnToBase | Command::Takeoff | Command::Land => {}
            },
        }

        Self::settle(&mut state, &mut fsm)?;
        self.commit(state, fsm)
    }

    /// Runs the safety policy on a single reading and applies its verdict.
    pub fn apply_sensor_event(&mut self, event: SensorEvent) -> Result<Snapshot, ControlError> {
        self.apply_sensor_frame(&[event])
    }

    /// Applies all readings of one evaluation cycle.
    ///
    /// The policy sees the state from before the cycle for every reading and
    /// the highest-priority verdict wins, so a close obstacle always beats a
    /// battery-driven return arriving alongside it.
    pub fn apply_sensor_frame(&mut self, events: &[SensorEvent]) -> Result<Snapshot, ControlError> {
        self.ensure_running()?;
        for reading in events {
            Self::validate_reading(reading)?;
        }
        let decision = self.policy.evaluate_cycle(&self.state, self.fsm.phase(), events);
        let mut state = self.state;
        let mut fsm = self.fsm;

        for reading in events {
            match *reading {
                SensorEvent::ObstacleReading { .. } => {}
                SensorEvent::BatteryReading { pct } => {
                    state.drain_battery(state.battery_pct() - pct);
                }
                SensorEvent::NavigationFix { x, y, altitude } => {
                    state.set_position(Vec2D::new(x, y))?;
                    state.set_altitude(altitude)?;
                }
            }
        }

        if decision.is_override() {
            safety!("{decision} in {} ({} readings)", fsm.phase(), events.len());
        }
        match decision {
            SafetyDecision::None => {}
            SafetyDecision::EmergencyStop => state.set_speed(0.0)?,
            // The sidestep is relative, a fix in the same frame moves its origin.
            SafetyDecision::Evade { new_position } => {
                let sidestep = new_position - self.state.position();
                state.set_position(state.position() + sidestep)?;
            }
            SafetyDecision::ForceReturn => match fsm.fire(Trigger::ReturnRequested) {
                Ok(next) => Self::enter(next, &mut state)?,
                Err(e) => warn!("Forced return not applicable: {e}"),
            },
        }

        Self::settle(&mut state, &mut fsm)?;
        self.commit(state, fsm)
    }

    fn validate_reading(reading: &SensorEvent) -> Result<(), ControlError> {
        let (field, value) = match *reading {
            SensorEvent::ObstacleReading { distance } => ("distance", distance),
            SensorEvent::BatteryReading { pct } => ("battery_pct", pct),
            SensorEvent::NavigationFix { .. } => return Ok(()),
        };
        if value.is_nan() || value < 0.0 {
            return Err(ControlError::InvalidValue { field, value });
        }
        Ok(())
    }

    /// Follows automatic transitions until the phase is stable.
    fn settle(state: &mut VehicleState, fsm: &mut FlightStateMachine) -> Result<(), ControlError> {
        for _ in FlightPhase::iter() {
            match fsm.advance(state) {
                Some(next) => Self::enter(next, state)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Entry actions of a freshly entered phase.
    fn enter(phase: FlightPhase, state: &mut VehicleState) -> Result<(), ControlError> {
        if phase == FlightPhase::Idle {
            state.set_speed(0.0)?;
        }
        Ok(())
    }

    fn commit(
        &mut self,
        state: VehicleState,
        fsm: FlightStateMachine,
    ) -> Result<Snapshot, ControlError> {
        if let Err(violation) = state.check_invariants() {
            error!("Invariant violation in {}: {violation}. Halting controller!", fsm.phase());
            self.halted = true;
            return Err(ControlError::Halted);
        }
        if fsm.phase() != self.fsm.phase() {
            event!("Committed phase {} -> {}", self.fsm.phase(), fsm.phase());
        }
        self.state = state;
        self.fsm = fsm;
        Ok(self.snapshot())
    }

    fn ensure_running(&self) -> Result<(), ControlError> {
        if self.halted { Err(ControlError::Halted) } else { Ok(()) }
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut VehicleState { &mut self.state }

    #[cfg(test)]
    pub(crate) fn fsm_mut(&mut self) -> &mut FlightStateMachine { &mut self.fsm }
}

impl Default for Controller {
    fn default() -> Self { Self::new(&ControlConfig::default()) }
}
