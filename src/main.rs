use kestrel_fc::{
    config::ControlConfig,
    fatal,
    flight_control::{Command, FlightPhase, SensorEvent, Snapshot, common::Vec2D},
    info, log,
    session::{Fleet, SessionError, VehicleLink},
    warn,
};
use rand::{Rng, rng};
use std::{env, time::Duration};

const DEFAULT_FLEET_SIZE: usize = 2;
const TICK: Duration = Duration::from_millis(50);
const MAX_TICKS: usize = 400;
const DRAIN_PER_TICK: (f64, f64) = (0.2, 1.2);

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let config = ControlConfig::from_env().unwrap_or_else(|e| fatal!("Unusable configuration: {e}"));
    let fleet_size = env::var("KESTREL_VEHICLES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_FLEET_SIZE);
    info!("Starting with {config:?}");

    let fleet = Fleet::launch(fleet_size, &config);
    let sorties = fleet.links().iter().cloned().map(move |link| {
        tokio::spawn(async move {
            let id = link.id();
            if let Err(e) = fly_sortie(&link, &config).await {
                warn!("Vehicle {id} aborted its sortie: {e}");
            }
        })
    });
    futures::future::join_all(sorties).await;

    for (id, snapshot) in fleet.shutdown().await {
        info!("Vehicle {id} final state: {snapshot}");
    }
}

/// Takes off, cruises outbound with a simulated obstacle and battery feed until
/// the safety layer sends the vehicle home, then flies it back and lands it.
async fn fly_sortie(link: &VehicleLink, config: &ControlConfig) -> Result<Snapshot, SessionError> {
    let id = link.id();
    link.command(Command::Takeoff).await?;
    link.command(Command::SetSpeed(5.0)).await?;
    let mut snap = link.command(Command::SetAltitude(config.cruise_altitude + 5.0)).await?;
    log!("Vehicle {id}: {snap}");

    let mut battery = snap.battery_pct;
    for tick in 0..MAX_TICKS {
        let mut frame = vec![SensorEvent::BatteryReading { pct: battery }];
        if let Some(distance) = obstacle_reading() {
            frame.push(SensorEvent::ObstacleReading { distance });
        }
        snap = link.sensor_frame(frame).await?;
        if snap.phase != FlightPhase::Cruise {
            break;
        }
        if snap.speed <= 0.0 {
            snap = link.command(Command::SetSpeed(5.0)).await?;
        }
        let next = snap.position + Vec2D::new(0.0, snap.speed * TICK.as_secs_f64());
        snap = link.command(Command::SetPosition(next)).await?;
        if tick % 20 == 0 {
            log!("Vehicle {id}: {snap}");
        }
        battery = (battery - rng().random_range(DRAIN_PER_TICK.0..DRAIN_PER_TICK.1)).max(0.0);
        tokio::time::sleep(TICK).await;
    }

    if snap.phase == FlightPhase::Cruise {
        info!("Vehicle {id} out of ticks, returning on operator command");
        link.command(Command::ReturnToBase).await?;
    }
    // The autopilot flies home on its own, the core only sees the fixes.
    let start = link.snapshot();
    for step in (0..=4u32).rev() {
        let share = f64::from(step) / 4.0;
        let fix = start.position * share;
        snap = link
            .sensor(SensorEvent::NavigationFix { x: fix.x(), y: fix.y(), altitude: start.altitude * share })
            .await?;
        tokio::time::sleep(TICK).await;
    }
    info!("Vehicle {id} back at base: {snap}");
    Ok(snap)
}

fn obstacle_reading() -> Option<f64> {
    let mut rand = rng();
    rand.random_bool(0.15).then(|| rand.random_range(0.5..12.0))
}
