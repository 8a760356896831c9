//! Best-effort view/usage reporting. Calls run on spawned tasks so a slow or
//! failing endpoint never blocks or fails a transition.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::AlgorithmId;
use crate::source::AlgorithmSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TelemetryEvent {
    View,
    Usage,
}

impl TelemetryEvent {
    fn as_str(self) -> &'static str {
        match self {
            TelemetryEvent::View => "view",
            TelemetryEvent::Usage => "usage",
        }
    }
}

pub(crate) struct Telemetry {
    source: Arc<dyn AlgorithmSource>,
    enabled: bool,
    pending: Vec<JoinHandle<()>>,
}

impl Telemetry {
    pub(crate) fn new(source: Arc<dyn AlgorithmSource>, enabled: bool) -> Self {
        Self {
            source,
            enabled,
            pending: Vec::new(),
        }
    }

    /// Fire and forget. Outside a tokio runtime the event is dropped with a warning.
    pub(crate) fn dispatch(&mut self, event: TelemetryEvent, algorithm_id: AlgorithmId) {
        if !self.enabled {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            warn!(%algorithm_id, event = event.as_str(), "no async runtime; telemetry dropped");
            return;
        };
        self.pending.retain(|h| !h.is_finished());
        let source = Arc::clone(&self.source);
        self.pending.push(handle.spawn(async move {
            let result = match event {
                TelemetryEvent::View => source.record_view(algorithm_id).await,
                TelemetryEvent::Usage => source.record_usage(algorithm_id).await,
            };
            match result {
                Ok(()) => debug!(%algorithm_id, event = event.as_str(), "telemetry recorded"),
                Err(err) => warn!(
                    %algorithm_id,
                    event = event.as_str(),
                    error = %err,
                    "telemetry failed"
                ),
            }
        }));
    }

    /// Wait for every dispatched call to finish.
    pub(crate) async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(err) = handle.await {
                warn!(error = %err, "telemetry task aborted");
            }
        }
    }
}
