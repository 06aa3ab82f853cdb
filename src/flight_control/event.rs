use super::common::Vec2D;
use strum_macros::{Display, IntoStaticStr};

/// Operator or supervisor request. Values are validated by the controller
/// before they reach the vehicle state.
#[derive(Debug, Clone, Copy, PartialEq, Display, IntoStaticStr, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Command {
    SetPosition(Vec2D<f64>),
    SetAltitude(f64),
    SetSpeed(f64),
    ReturnToBase,
    Takeoff,
    Land,
}

/// An already validated scalar reading from the surrounding sensor adapters.
#[derive(Debug, Clone, Copy, PartialEq, Display, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    ObstacleReading { distance: f64 },
    BatteryReading { pct: f64 },
    /// Actual position reported by the autopilot's navigation.
    NavigationFix { x: f64, y: f64, altitude: f64 },
}
