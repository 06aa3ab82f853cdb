use std::collections::HashMap;
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter};

#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FlightPhase {
    Idle,
    Takeoff,
    Cruise,
    Landing,
    Returning,
}

/// Everything that can move the vehicle between phases.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter)]
pub enum Trigger {
    /// Operator takeoff command.
    Takeoff,
    /// Committed altitude is at or above the cruise threshold.
    CruiseAltitudeReached,
    /// Operator return command or a forced return from the safety policy.
    ReturnRequested,
    /// Operator land command.
    Land,
    /// Vehicle is at the origin on the ground.
    ReachedHome,
    /// Altitude and speed are both zero.
    Touchdown,
}

pub static TRANSITION_LOOKUP: LazyLock<HashMap<(FlightPhase, Trigger), FlightPhase>> =
    LazyLock::new(|| {
        let mut lookup = HashMap::new();
        let transitions = vec![
            // Idle transitions
            (FlightPhase::Idle, Trigger::Takeoff, FlightPhase::Takeoff),
            // Takeoff transitions
            (FlightPhase::Takeoff, Trigger::CruiseAltitudeReached, FlightPhase::Cruise),
            (FlightPhase::Takeoff, Trigger::ReturnRequested, FlightPhase::Returning),
            // Cruise transitions
            (FlightPhase::Cruise, Trigger::ReturnRequested, FlightPhase::Returning),
            (FlightPhase::Cruise, Trigger::Land, FlightPhase::Landing),
            // Returning transitions
            (FlightPhase::Returning, Trigger::ReachedHome, FlightPhase::Idle),
            // Landing transitions
            (FlightPhase::Landing, Trigger::Touchdown, FlightPhase::Idle),
        ];

        for (from, trigger, to) in transitions {
            lookup.insert((from, trigger), to);
        }
        lookup
    });
