use std::collections::HashMap;
use std::sync::Arc;

use costmap_shared::FeatureId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::controller::{Effect, HostCommand, HostEvent, MapController, MapEvent};
use crate::feature_state::RenderCommand;
use crate::fetch::{CostFetchOutcome, CostSource, FetchError};
use crate::zoom::ZoomSwitch;

/// Anything that can drive a session: renderer events carry an `event` tag,
/// host commands a `command` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionInput {
    Map(MapEvent),
    Host(HostCommand),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionOutput {
    Render(RenderCommand),
    Host(HostEvent),
}

/// Owns a [`MapController`] and runs its cost fetches on the tokio runtime.
pub struct MapSession<S> {
    controller: MapController,
    source: Arc<S>,
    fetches: JoinSet<CostFetchOutcome>,
    fetching: HashMap<task::Id, FeatureId>,
}

impl<S: CostSource> MapSession<S> {
    pub fn new(switch: ZoomSwitch, source: Arc<S>) -> Self {
        Self {
            controller: MapController::new(switch),
            source,
            fetches: JoinSet::new(),
            fetching: HashMap::new(),
        }
    }

    /// Processes inputs until `inputs` closes and every started fetch has
    /// landed, or until `outputs` is dropped.
    pub async fn run(
        mut self,
        mut inputs: mpsc::Receiver<SessionInput>,
        outputs: mpsc::Sender<SessionOutput>,
    ) -> MapController {
        let mut inputs_open = true;
        loop {
            if !inputs_open && self.fetches.is_empty() {
                break;
            }
            tokio::select! {
                input = inputs.recv(), if inputs_open => match input {
                    Some(SessionInput::Map(event)) => self.controller.handle(event),
                    Some(SessionInput::Host(command)) => self.controller.handle_host(command),
                    None => {
                        debug!(pending = self.fetches.len(), "session input closed");
                        inputs_open = false;
                    }
                },
                Some(joined) = self.fetches.join_next_with_id(), if !self.fetches.is_empty() => {
                    if let Some(outcome) = self.landed(joined) {
                        self.controller.on_costs_fetched(outcome);
                    }
                }
                else => break,
            }
            if !self.flush(&outputs).await {
                info!("session output closed, stopping");
                self.fetches.abort_all();
                self.fetching.clear();
                break;
            }
        }
        self.controller
    }

    async fn flush(&mut self, outputs: &mpsc::Sender<SessionOutput>) -> bool {
        for effect in self.controller.take_effects() {
            let output = match effect {
                Effect::Render(command) => SessionOutput::Render(command),
                Effect::Host(event) => SessionOutput::Host(event),
                Effect::FetchCosts(district_id) => {
                    self.spawn_fetch(district_id);
                    continue;
                }
            };
            if outputs.send(output).await.is_err() {
                return false;
            }
        }
        true
    }

    fn spawn_fetch(&mut self, district_id: FeatureId) {
        debug!(district_id, "fetching district costs");
        let source = Arc::clone(&self.source);
        let handle = self.fetches.spawn(async move {
            let result = source.fetch_costs(district_id).await;
            CostFetchOutcome {
                district_id,
                result,
            }
        });
        self.fetching.insert(handle.id(), district_id);
    }

    /// Maps a finished fetch task back to its district. A task that panicked
    /// or was cancelled still counts as a failed fetch so the district can be
    /// fetched again later.
    fn landed(
        &mut self,
        joined: Result<(task::Id, CostFetchOutcome), JoinError>,
    ) -> Option<CostFetchOutcome> {
        match joined {
            Ok((id, outcome)) => {
                self.fetching.remove(&id);
                Some(outcome)
            }
            Err(e) => {
                let Some(district_id) = self.fetching.remove(&e.id()) else {
                    error!(error = %e, "unknown cost fetch task failed");
                    return None;
                };
                error!(district_id, error = %e, "cost fetch task failed");
                Some(CostFetchOutcome {
                    district_id,
                    result: Err(FetchError::Transport(e.to_string())),
                })
            }
        }
    }
}
