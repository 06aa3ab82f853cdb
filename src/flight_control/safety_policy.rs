use super::{
    common::Vec2D, event::SensorEvent, flight_phase::FlightPhase, vehicle_state::VehicleState,
};
use crate::config::ControlConfig;
use strum_macros::Display;

/// The policy's verdict on a sensor or battery reading.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum SafetyDecision {
    None,
    #[strum(to_string = "Evade to {new_position}")]
    Evade { new_position: Vec2D<f64> },
    EmergencyStop,
    ForceReturn,
}

impl SafetyDecision {
    /// Higher wins when several readings land in the same cycle.
    pub fn priority(&self) -> u8 {
        match self {
            SafetyDecision::None => 0,
            SafetyDecision::ForceReturn => 1,
            SafetyDecision::Evade { .. } => 2,
            SafetyDecision::EmergencyStop => 3,
        }
    }

    pub fn is_override(&self) -> bool { !matches!(self, SafetyDecision::None) }
}

/// Pure decision logic. Holds only thresholds, never vehicle data.
#[derive(Debug, Clone, Copy)]
pub struct SafetyPolicy {
    stop_distance: f64,
    evade_distance: f64,
    evade_offset: f64,
    low_battery_pct: f64,
}

impl SafetyPolicy {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            stop_distance: config.stop_distance,
            evade_distance: config.evade_distance,
            evade_offset: config.evade_offset,
            low_battery_pct: config.low_battery_pct,
        }
    }

    /// Rules in priority order, first match wins:
    /// 1. obstacle closer than the stop distance: `EmergencyStop`
    /// 2. obstacle closer than the evade distance: `Evade` along +x
    /// 3. battery below the threshold outside `Idle`/`Returning`: `ForceReturn`
    /// 4. anything else: `None`
    pub fn evaluate(
        &self,
        state: &VehicleState,
        phase: FlightPhase,
        event: &SensorEvent,
    ) -> SafetyDecision {
        match *event {
            SensorEvent::ObstacleReading { distance } if distance < self.stop_distance => {
                SafetyDecision::EmergencyStop
            }
            SensorEvent::ObstacleReading { distance } if distance < self.evade_distance => {
                SafetyDecision::Evade {
                    new_position: state.position().shifted_x(self.evade_offset),
                }
            }
            SensorEvent::BatteryReading { pct }
                if pct < self.low_battery_pct
                    && !matches!(phase, FlightPhase::Returning | FlightPhase::Idle) =>
            {
                SafetyDecision::ForceReturn
            }
            _ => SafetyDecision::None,
        }
    }

    /// Evaluates every reading of one cycle against the same prior state and
    /// keeps the highest-priority verdict. Ties keep the earlier reading.
    pub fn evaluate_cycle(
        &self,
        state: &VehicleState,
        phase: FlightPhase,
        events: &[SensorEvent],
    ) -> SafetyDecision {
        events
            .iter()
            .map(|event| self.evaluate(state, phase, event))
            .fold(SafetyDecision::None, |best, next| {
                if next.priority() > best.priority() { next } else { best }
            })
    }
}

impl Default for SafetyPolicy {
    fn default() -> Self { Self::new(&ControlConfig::default()) }
}
