use super::{
    common::Vec2D,
    control_error::{ControlError, InvariantViolation},
};

/// Ground-truth numeric state of the vehicle.
///
/// Mutators each touch exactly one field and never look at the flight phase.
/// The fields are private so the domain rules below cannot be bypassed.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VehicleState {
    position: Vec2D<f64>,
    altitude: f64,
    speed: f64,
    battery_pct: f64,
}

impl VehicleState {
    pub const BATTERY_FULL: f64 = 100.0;
    pub const BATTERY_EMPTY: f64 = 0.0;

    /// A parked, fully charged vehicle at the origin.
    pub fn new() -> Self {
        Self {
            position: Vec2D::zero(),
            altitude: 0.0,
            speed: 0.0,
            battery_pct: Self::BATTERY_FULL,
        }
    }

    pub fn position(&self) -> Vec2D<f64> { self.position }
    pub fn altitude(&self) -> f64 { self.altitude }
    pub fn speed(&self) -> f64 { self.speed }
    pub fn battery_pct(&self) -> f64 { self.battery_pct }

    /// Positions are unbounded but have to be finite.
    pub fn set_position(&mut self, position: Vec2D<f64>) -> Result<(), ControlError> {
        if !position.is_finite() {
            let value = if position.x().is_finite() { position.y() } else { position.x() };
            return Err(ControlError::InvalidValue { field: "position", value });
        }
        self.position = position;
        Ok(())
    }

    pub fn set_altitude(&mut self, altitude: f64) -> Result<(), ControlError> {
        self.altitude = Self::non_negative("altitude", altitude)?;
        Ok(())
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), ControlError> {
        self.speed = Self::non_negative("speed", speed)?;
        Ok(())
    }

    /// Lowers the charge by `amount`, clamped to `[0, 100]`.
    /// Negative or `NaN` amounts drain nothing, the battery never recharges here.
    pub fn drain_battery(&mut self, amount: f64) {
        let drained = if amount.is_nan() { 0.0 } else { amount.max(0.0) };
        self.battery_pct =
            (self.battery_pct - drained).clamp(Self::BATTERY_EMPTY, Self::BATTERY_FULL);
    }

    /// Checks every field against its domain. A failure here is a bug in the
    /// core, not a bad input.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let checks = [
            ("position.x", self.position.x(), self.position.x().is_finite()),
            ("position.y", self.position.y(), self.position.y().is_finite()),
            ("altitude", self.altitude, self.altitude.is_finite() && self.altitude >= 0.0),
            ("speed", self.speed, self.speed.is_finite() && self.speed >= 0.0),
            (
                "battery_pct",
                self.battery_pct,
                (Self::BATTERY_EMPTY..=Self::BATTERY_FULL).contains(&self.battery_pct),
            ),
        ];
        match checks.into_iter().find(|(_, _, ok)| !ok) {
            Some((field, value, _)) => Err(InvariantViolation::FieldOutOfDomain { field, value }),
            None => Ok(()),
        }
    }

    fn non_negative(field: &'static str, value: f64) -> Result<f64, ControlError> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ControlError::InvalidValue { field, value })
        }
    }

    #[cfg(test)]
    pub(crate) fn corrupt_altitude(&mut self, altitude: f64) { self.altitude = altitude; }
}

impl Default for VehicleState {
    fn default() -> Self { Self::new() }
}
