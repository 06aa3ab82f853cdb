use std::env;
use strum_macros::Display;

/// Thresholds shared by the safety policy and the flight state machine.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ControlConfig {
    /// Altitude in meters at which `Takeoff` becomes `Cruise`.
    pub cruise_altitude: f64,
    /// Obstacles closer than this force an emergency stop.
    pub stop_distance: f64,
    /// Obstacles closer than this (and not closer than `stop_distance`) trigger an evasion.
    pub evade_distance: f64,
    /// Shift along the primary axis for an evasion.
    pub evade_offset: f64,
    /// Battery percentage below which the vehicle is sent home.
    pub low_battery_pct: f64,
    /// Distance to the origin that still counts as home. Zero means exact.
    pub home_radius: f64,
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum ConfigError {
    #[strum(to_string = "{key} has unparsable value {value}")]
    Unparsable { key: &'static str, value: String },
    #[strum(to_string = "{key} is out of range")]
    OutOfRange { key: &'static str },
    #[strum(to_string = "stop distance exceeds evade distance")]
    Inconsistent,
}

impl std::error::Error for ConfigError {}

impl ControlConfig {
    const CRUISE_ALT_VAR: &'static str = "KESTREL_CRUISE_ALT";
    const STOP_DIST_VAR: &'static str = "KESTREL_STOP_DIST";
    const EVADE_DIST_VAR: &'static str = "KESTREL_EVADE_DIST";
    const EVADE_OFFSET_VAR: &'static str = "KESTREL_EVADE_OFFSET";
    const LOW_BATTERY_VAR: &'static str = "KESTREL_LOW_BATTERY";
    const HOME_RADIUS_VAR: &'static str = "KESTREL_HOME_RADIUS";

    /// Defaults overridden by any `KESTREL_*` variable present in the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ControlConfig::from_env`] but with an arbitrary key source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&'static str) -> Option<String> {
        let read = |key: &'static str, default: f64| -> Result<f64, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::Unparsable { key, value: raw.clone() }),
            }
        };
        let def = Self::default();
        let config = Self {
            cruise_altitude: read(Self::CRUISE_ALT_VAR, def.cruise_altitude)?,
            stop_distance: read(Self::STOP_DIST_VAR, def.stop_distance)?,
            evade_distance: read(Self::EVADE_DIST_VAR, def.evade_distance)?,
            evade_offset: read(Self::EVADE_OFFSET_VAR, def.evade_offset)?,
            low_battery_pct: read(Self::LOW_BATTERY_VAR, def.low_battery_pct)?,
            home_radius: read(Self::HOME_RADIUS_VAR, def.home_radius)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            (Self::CRUISE_ALT_VAR, self.cruise_altitude),
            (Self::STOP_DIST_VAR, self.stop_distance),
            (Self::EVADE_DIST_VAR, self.evade_distance),
            (Self::EVADE_OFFSET_VAR, self.evade_offset),
            (Self::LOW_BATTERY_VAR, self.low_battery_pct),
            (Self::HOME_RADIUS_VAR, self.home_radius),
        ];
        if let Some((key, _)) = fields.into_iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::OutOfRange { key });
        }
        if self.low_battery_pct > 100.0 {
            return Err(ConfigError::OutOfRange { key: Self::LOW_BATTERY_VAR });
        }
        if self.stop_distance > self.evade_distance {
            return Err(ConfigError::Inconsistent);
        }
        Ok(())
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cruise_altitude: 10.0,
            stop_distance: 3.0,
            evade_distance: 7.0,
            evade_offset: 7.0,
            low_battery_pct: 20.0,
            home_radius: 0.0,
        }
    }
}
