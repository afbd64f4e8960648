use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Client;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::debug;

use super::{event::TrackingEvent, TrackerError};

pub trait Transport: Send + Sync {
    fn send(&self, endpoint: &str, event: &TrackingEvent);

    /// Best-effort delivery that should survive the page being torn down.
    /// Returns `false` if the event could not even be queued.
    fn send_beacon(&self, endpoint: &str, event: &TrackingEvent) -> bool;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, endpoint: &str, event: &TrackingEvent) {
        (**self).send(endpoint, event);
    }

    fn send_beacon(&self, endpoint: &str, event: &TrackingEvent) -> bool {
        (**self).send_beacon(endpoint, event)
    }
}

pub struct HttpTransport {
    client: Client,
    runtime: Handle,
    beacons: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TrackerError> {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Result<Self, TrackerError> {
        Ok(Self {
            client,
            runtime: Handle::try_current()?,
            beacons: Mutex::new(Vec::new()),
        })
    }

    /// Waits for queued beacons. Hosts call this while shutting down.
    pub async fn flush(&self) {
        let pending = std::mem::take(
            &mut *self.beacons.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for handle in pending {
            let _ = handle.await;
        }
    }

    fn spawn_post(&self, endpoint: &str, event: &TrackingEvent) -> JoinHandle<()> {
        let request = self.client.post(endpoint).json(event);
        let event_type = event.event_type.as_str().to_string();
        self.runtime.spawn(async move {
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    debug!(%event_type, status = %response.status(), "collector rejected tracking event");
                }
                Ok(_) => {}
                Err(err) => debug!(%event_type, "failed to send tracking event: {err}"),
            }
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, endpoint: &str, event: &TrackingEvent) {
        drop(self.spawn_post(endpoint, event));
    }

    fn send_beacon(&self, endpoint: &str, event: &TrackingEvent) -> bool {
        let handle = self.spawn_post(endpoint, event);
        let mut beacons = self.beacons.lock().unwrap_or_else(PoisonError::into_inner);
        beacons.retain(|pending| !pending.is_finished());
        beacons.push(handle);
        true
    }
}
