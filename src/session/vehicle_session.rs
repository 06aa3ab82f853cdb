use crate::flight_control::{Command, ControlError, Controller, SensorEvent, Snapshot};
use crate::{info, warn};
use std::fmt::Display;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

type Reply = oneshot::Sender<Result<Snapshot, ControlError>>;

enum VehicleRequest {
    Command(Command, Reply),
    Sensor(Vec<SensorEvent>, Reply),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionError {
    /// The session task is gone, the request was not processed.
    Closed,
    Control(ControlError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Closed => write!(f, "vehicle session closed"),
            SessionError::Control(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ControlError> for SessionError {
    fn from(value: ControlError) -> Self { SessionError::Control(value) }
}

/// Cloneable handle to a running [`VehicleSession`]. Requests from all clones
/// are queued and processed one at a time.
#[derive(Clone)]
pub struct VehicleLink {
    id: usize,
    requests: mpsc::Sender<VehicleRequest>,
    snapshots: watch::Receiver<Snapshot>,
}

impl VehicleLink {
    pub fn id(&self) -> usize { self.id }

    pub async fn command(&self, command: Command) -> Result<Snapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(VehicleRequest::Command(command, tx), rx).await
    }

    pub async fn sensor(&self, event: SensorEvent) -> Result<Snapshot, SessionError> {
        self.sensor_frame(vec![event]).await
    }

    pub async fn sensor_frame(&self, events: Vec<SensorEvent>) -> Result<Snapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(VehicleRequest::Sensor(events, tx), rx).await
    }

    /// Last committed snapshot, without queueing behind pending requests.
    pub fn snapshot(&self) -> Snapshot { *self.snapshots.borrow() }

    /// Receiver notified on every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> { self.snapshots.clone() }

    async fn send(
        &self,
        request: VehicleRequest,
        reply: oneshot::Receiver<Result<Snapshot, ControlError>>,
    ) -> Result<Snapshot, SessionError> {
        self.requests.send(request).await.map_err(|_| SessionError::Closed)?;
        Ok(reply.await.map_err(|_| SessionError::Closed)??)
    }
}

/// Single consumer owning one [`Controller`] for the lifetime of a vehicle session.
pub struct VehicleSession {
    id: usize,
    controller: Controller,
    requests: mpsc::Receiver<VehicleRequest>,
    snapshots: watch::Sender<Snapshot>,
}

impl VehicleSession {
    const QUEUE_SIZE: usize = 32;

    /// Moves `controller` into its own task. The task ends when `cancel` fires
    /// or every [`VehicleLink`] is dropped, and hands the controller back.
    pub fn spawn(
        id: usize,
        controller: Controller,
        cancel: CancellationToken,
    ) -> (VehicleLink, JoinHandle<Controller>) {
        let (req_tx, req_rx) = mpsc::channel(Self::QUEUE_SIZE);
        let (snap_tx, snap_rx) = watch::channel(controller.snapshot());
        let session = Self { id, controller, requests: req_rx, snapshots: snap_tx };
        let handle = tokio::spawn(session.run(cancel));
        (VehicleLink { id, requests: req_tx, snapshots: snap_rx }, handle)
    }

    async fn run(mut self, cancel: CancellationToken) -> Controller {
        info!("Vehicle {} session started in {}", self.id, self.controller.phase());
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                request = self.requests.recv() => match request {
                    Some(req) => self.handle(req),
                    None => break,
                },
            }
        }
        info!("Vehicle {} session closed: {}", self.id, self.controller.snapshot());
        self.controller
    }

    fn handle(&mut self, request: VehicleRequest) {
        let (result, reply) = match request {
            VehicleRequest::Command(command, reply) => {
                (self.controller.apply_command(command), reply)
            }
            VehicleRequest::Sensor(events, reply) => {
                (self.controller.apply_sensor_frame(&events), reply)
            }
        };
        match &result {
            Ok(snapshot) => {
                self.snapshots.send_if_modified(|current| {
                    let changed = *current != *snapshot;
                    *current = *snapshot;
                    changed
                });
            }
            Err(e) => warn!("Vehicle {}: {e}", self.id),
        }
        // Caller may have given up waiting, the result is committed regardless.
        let _ = reply.send(result);
    }
}
