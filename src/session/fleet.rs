use super::vehicle_session::{VehicleLink, VehicleSession};
use crate::config::ControlConfig;
use crate::flight_control::{Controller, Snapshot};
use crate::{error, info};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Independent vehicle sessions processed in parallel. Nothing is shared
/// between them except the shutdown token.
pub struct Fleet {
    links: Vec<VehicleLink>,
    handles: Vec<JoinHandle<Controller>>,
    cancel: CancellationToken,
}

impl Fleet {
    pub fn launch(size: usize, config: &ControlConfig) -> Self {
        let cancel = CancellationToken::new();
        let (links, handles) = (0..size)
            .map(|id| VehicleSession::spawn(id, Controller::new(config), cancel.child_token()))
            .unzip();
        info!("Fleet of {size} vehicles launched");
        Self { links, handles, cancel }
    }

    pub fn links(&self) -> &[VehicleLink] { &self.links }

    pub fn link(&self, id: usize) -> Option<&VehicleLink> { self.links.get(id) }

    /// Stops every session and returns `(vehicle id, final snapshot)` for each
    /// vehicle whose task ended cleanly.
    pub async fn shutdown(self) -> Vec<(usize, Snapshot)> {
        self.cancel.cancel();
        let ids: Vec<usize> = self.links.iter().map(VehicleLink::id).collect();
        ids.into_iter()
            .zip(join_all(self.handles).await)
            .filter_map(|(id, res)| match res {
                Ok(controller) => Some((id, controller.snapshot())),
                Err(e) => {
                    error!("Vehicle {id} session did not finish: {e}");
                    None
                }
            })
            .collect()
    }
}
