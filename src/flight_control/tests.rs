use super::{
    Command, ControlError, Controller, FlightPhase, FlightStateMachine, SafetyDecision,
    SafetyPolicy, SensorEvent, TRANSITION_LOOKUP, Trigger, VehicleState, common::Vec2D,
};
use crate::config::ControlConfig;
use rand::{Rng, rng};
use strum::IntoEnumIterator;

fn cruising() -> Controller {
    let mut controller = Controller::default();
    controller.apply_command(Command::Takeoff).unwrap();
    controller.apply_command(Command::SetAltitude(12.0)).unwrap();
    controller.apply_command(Command::SetSpeed(4.0)).unwrap();
    assert_eq!(controller.phase(), FlightPhase::Cruise);
    controller
}

fn returning() -> Controller {
    let mut controller = cruising();
    controller.apply_sensor_event(SensorEvent::BatteryReading { pct: 15.0 }).unwrap();
    assert_eq!(controller.phase(), FlightPhase::Returning);
    controller
}

#[test]
fn test_altitude_and_speed_round_trip() {
    let mut state = VehicleState::new();
    for _ in 0..200 {
        let altitude = rng().random_range(0.0..10_000.0);
        let speed = rng().random_range(0.0..500.0);
        state.set_altitude(altitude).unwrap();
        state.set_speed(speed).unwrap();
        assert!((state.altitude() - altitude).abs() < f64::EPSILON);
        assert!((state.speed() - speed).abs() < f64::EPSILON);
    }
    state.set_altitude(0.0).unwrap();
    assert!(state.altitude().abs() < f64::EPSILON);
}

#[test]
fn test_negative_values_are_rejected() {
    let mut state = VehicleState::new();
    state.set_altitude(3.0).unwrap();
    assert_eq!(
        state.set_altitude(-0.5),
        Err(ControlError::InvalidValue { field: "altitude", value: -0.5 })
    );
    assert!(matches!(
        state.set_speed(-2.0),
        Err(ControlError::InvalidValue { field: "speed", .. })
    ));
    assert!(state.set_speed(f64::NAN).is_err());
    assert!(state.set_position(Vec2D::new(f64::INFINITY, 0.0)).is_err());
    assert!((state.altitude() - 3.0).abs() < f64::EPSILON);
    assert!(state.check_invariants().is_ok());
}

#[test]
fn test_drain_battery_floors_at_zero() {
    let mut state = VehicleState::new();
    state.drain_battery(30.0);
    assert!((state.battery_pct() - 70.0).abs() < f64::EPSILON);
    state.drain_battery(-15.0);
    assert!((state.battery_pct() - 70.0).abs() < f64::EPSILON);
    for _ in 0..20 {
        state.drain_battery(rng().random_range(50.0..500.0));
        assert!(state.battery_pct().abs() < f64::EPSILON);
        assert!(state.battery_pct() >= 0.0);
    }
}

#[test]
fn test_policy_thresholds() {
    let policy = SafetyPolicy::default();
    let state = VehicleState::new();
    let decide =
        |distance| policy.evaluate(&state, FlightPhase::Cruise, &SensorEvent::ObstacleReading { distance });
    assert_eq!(decide(0.0), SafetyDecision::EmergencyStop);
    assert_eq!(decide(2.999), SafetyDecision::EmergencyStop);
    assert_eq!(decide(3.0), SafetyDecision::Evade { new_position: Vec2D::new(7.0, 0.0) });
    assert_eq!(decide(6.9), SafetyDecision::Evade { new_position: Vec2D::new(7.0, 0.0) });
    assert_eq!(decide(7.0), SafetyDecision::None);
    assert_eq!(decide(1e9), SafetyDecision::None);
}

#[test]
fn test_force_return_only_when_airborne_and_not_returning() {
    let policy = SafetyPolicy::default();
    let state = VehicleState::new();
    let low = SensorEvent::BatteryReading { pct: 5.0 };
    for phase in FlightPhase::iter() {
        let expected = match phase {
            FlightPhase::Idle | FlightPhase::Returning => SafetyDecision::None,
            _ => SafetyDecision::ForceReturn,
        };
        assert_eq!(policy.evaluate(&state, phase, &low), expected, "phase {phase}");
    }
    let fine = SensorEvent::BatteryReading { pct: 20.0 };
    assert_eq!(policy.evaluate(&state, FlightPhase::Cruise, &fine), SafetyDecision::None);
}

#[test]
fn test_collision_beats_battery_in_same_cycle() {
    let policy = SafetyPolicy::default();
    let state = VehicleState::new();
    let frame = [
        SensorEvent::BatteryReading { pct: 10.0 },
        SensorEvent::ObstacleReading { distance: 2.0 },
    ];
    assert_eq!(
        policy.evaluate_cycle(&state, FlightPhase::Cruise, &frame),
        SafetyDecision::EmergencyStop
    );

    let mut controller = cruising();
    let snap = controller.apply_sensor_frame(&frame).unwrap();
    assert_eq!(snap.phase, FlightPhase::Cruise);
    assert!(snap.speed.abs() < f64::EPSILON);
    assert!((snap.battery_pct - 10.0).abs() < f64::EPSILON);
}

#[test]
fn test_evasion_law() {
    let mut controller = cruising();
    let before = controller.snapshot();
    assert_eq!(before.position, Vec2D::zero());
    let snap = controller.apply_sensor_event(SensorEvent::ObstacleReading { distance: 5.0 }).unwrap();
    assert_eq!(snap.position, Vec2D::new(7.0, 0.0));
    assert!((snap.altitude - before.altitude).abs() < f64::EPSILON);
    assert!((snap.speed - before.speed).abs() < f64::EPSILON);
    assert_eq!(snap.phase, FlightPhase::Cruise);
}

#[test]
fn test_evade_shifts_from_fix_in_same_frame() {
    let mut controller = cruising();
    let snap = controller
        .apply_sensor_frame(&[
            SensorEvent::NavigationFix { x: 50.0, y: 0.0, altitude: 12.0 },
            SensorEvent::ObstacleReading { distance: 5.0 },
        ])
        .unwrap();
    assert_eq!(snap.position, Vec2D::new(57.0, 0.0));
    assert!((snap.altitude - 12.0).abs() < f64::EPSILON);
    assert_eq!(snap.phase, FlightPhase::Cruise);

    // Reading order inside the frame does not matter
    let snap = controller
        .apply_sensor_frame(&[
            SensorEvent::ObstacleReading { distance: 5.0 },
            SensorEvent::NavigationFix { x: -10.0, y: 3.0, altitude: 12.0 },
        ])
        .unwrap();
    assert_eq!(snap.position, Vec2D::new(-3.0, 3.0));
}

#[test]
fn test_fix_home_with_obstacle_keeps_fix_while_returning() {
    let mut controller = returning();
    controller
        .apply_sensor_event(SensorEvent::NavigationFix { x: -7.0, y: 3.0, altitude: 4.0 })
        .unwrap();
    let snap = controller
        .apply_sensor_frame(&[
            SensorEvent::NavigationFix { x: 0.0, y: 0.0, altitude: 0.0 },
            SensorEvent::ObstacleReading { distance: 5.0 },
        ])
        .unwrap();
    assert_eq!(snap.position, Vec2D::new(7.0, 0.0));
    assert!(snap.altitude.abs() < f64::EPSILON);
    assert_eq!(snap.phase, FlightPhase::Returning);

    let snap = controller
        .apply_sensor_event(SensorEvent::NavigationFix { x: 0.0, y: 0.0, altitude: 0.0 })
        .unwrap();
    assert_eq!(snap.phase, FlightPhase::Idle);
}

#[test]
fn test_emergency_stop_keeps_phase() {
    let mut controller = cruising();
    let snap = controller.apply_sensor_event(SensorEvent::ObstacleReading { distance: 1.0 }).unwrap();
    assert!(snap.speed.abs() < f64::EPSILON);
    assert_eq!(snap.phase, FlightPhase::Cruise);
    assert_eq!(snap.position, Vec2D::zero());
}

#[test]
fn test_cruise_is_entered_once() {
    let mut controller = Controller::default();
    let snap = controller.apply_command(Command::Takeoff).unwrap();
    assert_eq!(snap.phase, FlightPhase::Takeoff);
    let snap = controller.apply_command(Command::SetAltitude(5.0)).unwrap();
    assert_eq!(snap.phase, FlightPhase::Takeoff);
    let snap = controller.apply_command(Command::SetAltitude(10.0)).unwrap();
    assert_eq!(snap.phase, FlightPhase::Cruise);
    let snap = controller.apply_command(Command::SetAltitude(10.0)).unwrap();
    assert_eq!(snap.phase, FlightPhase::Cruise);
    assert!((snap.altitude - 10.0).abs() < f64::EPSILON);
}

#[test]
fn test_forced_return_closure() {
    let mut controller = returning();
    let snap = controller
        .apply_sensor_event(SensorEvent::NavigationFix { x: 3.0, y: 4.0, altitude: 2.0 })
        .unwrap();
    assert_eq!(snap.phase, FlightPhase::Returning);
    let snap = controller
        .apply_sensor_event(SensorEvent::NavigationFix { x: 0.0, y: 0.0, altitude: 0.0 })
        .unwrap();
    assert_eq!(snap.phase, FlightPhase::Idle);
    assert!(snap.speed.abs() < f64::EPSILON);

    // Idle is re-enterable
    let snap = controller.apply_command(Command::Takeoff).unwrap();
    assert_eq!(snap.phase, FlightPhase::Takeoff);
}

#[test]
fn test_low_battery_while_returning_does_not_retrigger() {
    let mut controller = returning();
    let snap = controller.apply_sensor_event(SensorEvent::BatteryReading { pct: 5.0 }).unwrap();
    assert_eq!(snap.phase, FlightPhase::Returning);
    assert!((snap.battery_pct - 5.0).abs() < f64::EPSILON);
    let snap = controller.apply_sensor_event(SensorEvent::BatteryReading { pct: 50.0 }).unwrap();
    assert!((snap.battery_pct - 5.0).abs() < f64::EPSILON);
}

#[test]
fn test_set_speed_rejected_while_returning() {
    let mut controller = returning();
    let before = controller.snapshot();
    let result = controller.apply_command(Command::SetSpeed(5.0));
    assert_eq!(
        result,
        Err(ControlError::PhaseViolation { phase: FlightPhase::Returning, command: "SetSpeed" })
    );
    assert_eq!(controller.snapshot(), before);
    assert!(controller.apply_command(Command::SetPosition(Vec2D::new(1.0, 1.0))).is_err());
    assert!(controller.apply_command(Command::SetAltitude(0.0)).is_err());
    assert_eq!(controller.snapshot(), before);
}

#[test]
fn test_operator_return_to_base() {
    let mut controller = cruising();
    let snap = controller.apply_command(Command::ReturnToBase).unwrap();
    assert_eq!(snap.phase, FlightPhase::Returning);
    assert_eq!(
        controller.apply_command(Command::ReturnToBase),
        Err(ControlError::InvalidTransition {
            phase: FlightPhase::Returning,
            trigger: Trigger::ReturnRequested
        })
    );
}

#[test]
fn test_invalid_transitions_leave_state_unchanged() {
    let mut controller = Controller::default();
    let before = controller.snapshot();
    assert_eq!(
        controller.apply_command(Command::Land),
        Err(ControlError::InvalidTransition { phase: FlightPhase::Idle, trigger: Trigger::Land })
    );
    assert!(matches!(
        controller.apply_command(Command::SetAltitude(4.0)),
        Err(ControlError::PhaseViolation { phase: FlightPhase::Idle, .. })
    ));
    assert_eq!(controller.snapshot(), before);

    let mut controller = cruising();
    let before = controller.snapshot();
    assert!(matches!(
        controller.apply_command(Command::Takeoff),
        Err(ControlError::InvalidTransition { .. })
    ));
    assert!(matches!(
        controller.apply_command(Command::SetAltitude(-1.0)),
        Err(ControlError::InvalidValue { .. })
    ));
    assert_eq!(controller.snapshot(), before);
}

#[test]
fn test_landing_sequence() {
    let mut controller = cruising();
    let snap = controller.apply_command(Command::Land).unwrap();
    assert_eq!(snap.phase, FlightPhase::Landing);
    assert!(matches!(
        controller.apply_command(Command::SetPosition(Vec2D::new(2.0, 2.0))),
        Err(ControlError::PhaseViolation { phase: FlightPhase::Landing, .. })
    ));
    let snap = controller.apply_command(Command::SetAltitude(0.0)).unwrap();
    assert_eq!(snap.phase, FlightPhase::Landing);
    let snap = controller.apply_command(Command::SetSpeed(0.0)).unwrap();
    assert_eq!(snap.phase, FlightPhase::Idle);
}

#[test]
fn test_forced_return_ignored_while_landing() {
    let mut controller = cruising();
    controller.apply_command(Command::Land).unwrap();
    let snap = controller.apply_sensor_event(SensorEvent::BatteryReading { pct: 8.0 }).unwrap();
    assert_eq!(snap.phase, FlightPhase::Landing);
    assert!((snap.battery_pct - 8.0).abs() < f64::EPSILON);
}

#[test]
fn test_malformed_readings_are_reported() {
    let mut controller = cruising();
    let before = controller.snapshot();
    assert_eq!(
        controller.apply_sensor_event(SensorEvent::ObstacleReading { distance: -1.0 }),
        Err(ControlError::InvalidValue { field: "distance", value: -1.0 })
    );
    assert!(controller.apply_sensor_event(SensorEvent::BatteryReading { pct: f64::NAN }).is_err());
    assert!(
        controller
            .apply_sensor_event(SensorEvent::NavigationFix { x: 1.0, y: 1.0, altitude: -3.0 })
            .is_err()
    );
    assert_eq!(controller.snapshot(), before);
}

#[test]
fn test_invariant_violation_halts_controller() {
    let mut controller = cruising();
    controller.state_mut().corrupt_altitude(-1.0);
    assert_eq!(controller.apply_command(Command::SetSpeed(2.0)), Err(ControlError::Halted));
    assert!(controller.is_halted());
    assert_eq!(
        controller.apply_sensor_event(SensorEvent::ObstacleReading { distance: 50.0 }),
        Err(ControlError::Halted)
    );
    assert_eq!(controller.apply_command(Command::Land), Err(ControlError::Halted));
    assert_eq!(controller.snapshot().phase, FlightPhase::Cruise);
}

#[test]
fn test_transition_table_is_closed() {
    let config = ControlConfig::default();
    for phase in FlightPhase::iter() {
        for trigger in Trigger::iter() {
            let mut fsm = FlightStateMachine::new(&config);
            fsm.force_phase(phase);
            match TRANSITION_LOOKUP.get(&(phase, trigger)) {
                Some(next) => assert_eq!(fsm.fire(trigger), Ok(*next)),
                None => {
                    assert_eq!(
                        fsm.fire(trigger),
                        Err(ControlError::InvalidTransition { phase, trigger })
                    );
                    assert_eq!(fsm.phase(), phase);
                }
            }
        }
    }
    assert_eq!(TRANSITION_LOOKUP.len(), 7);
}

#[test]
fn test_configured_thresholds() {
    let config = ControlConfig { cruise_altitude: 20.0, evade_offset: 2.5, ..ControlConfig::default() };
    let mut controller = Controller::new(&config);
    controller.apply_command(Command::Takeoff).unwrap();
    assert_eq!(controller.apply_command(Command::SetAltitude(10.0)).unwrap().phase, FlightPhase::Takeoff);
    assert_eq!(controller.apply_command(Command::SetAltitude(20.0)).unwrap().phase, FlightPhase::Cruise);
    let snap = controller.apply_sensor_event(SensorEvent::ObstacleReading { distance: 4.0 }).unwrap();
    assert_eq!(snap.position, Vec2D::new(2.5, 0.0));
}

#[test]
fn test_fsm_phase_can_be_forced_for_returning_arrival() {
    let mut controller = Controller::default();
    controller.fsm_mut().force_phase(FlightPhase::Returning);
    let snap = controller.apply_sensor_frame(&[]).unwrap();
    assert_eq!(snap.phase, FlightPhase::Idle);
}
