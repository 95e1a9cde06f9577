use crate::wire::{
    decode_records, InitRequest, InitResponse, PositionsResponse, UpdateResponse,
};
use cityview_common::{EntityKind, GridExtent};
use cityview_scene::SnapshotRecord;
use std::time::Duration;

/// Errors from talking to the simulation server.
///
/// All of these are treated as "no change this cycle" by callers; none of
/// them may crash the render loop.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] Box<ureq::Error>),
    #[error("failed to decode response body: {0}")]
    Decode(#[from] std::io::Error),
}

/// Entities moved by an update cycle, when the server returns them inline.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayload {
    pub vehicles: Option<Vec<SnapshotRecord>>,
    pub signals: Option<Vec<SnapshotRecord>>,
}

/// Blocking HTTP client for the simulation server.
///
/// Lives on the poller thread; nothing here touches render state.
pub struct SimulationClient {
    base: String,
    agent: ureq::Agent,
}

impl SimulationClient {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(5))
            .build();
        Self {
            base: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base)
    }

    /// Initialize the server-side model and learn the actual grid size.
    pub fn init(&self, agents: u32, requested: GridExtent) -> Result<GridExtent, ClientError> {
        let body = InitRequest {
            n_agents: agents,
            width: requested.width,
            height: requested.height,
        };
        let response: InitResponse = self
            .agent
            .post(&self.url("init"))
            .send_json(&body)
            .map_err(Box::new)?
            .into_json()?;
        tracing::info!(
            width = response.width,
            height = response.height,
            "simulation model initialized"
        );
        Ok(GridExtent {
            width: response.width,
            height: response.height,
        })
    }

    /// Fetch the current records for one entity kind.
    pub fn get_entities(&self, kind: EntityKind) -> Result<Vec<SnapshotRecord>, ClientError> {
        let endpoint = match kind {
            EntityKind::Vehicle => "getCars",
            EntityKind::Building => "getBuildings",
            EntityKind::Signal => "getTrafficLights",
            EntityKind::RoadSegment => "getRoads",
        };
        let response: PositionsResponse = self
            .agent
            .get(&self.url(endpoint))
            .call()
            .map_err(Box::new)?
            .into_json()?;
        Ok(decode_records(&response.positions))
    }

    /// Step the server model once. Some server variants return the moved
    /// entities inline; those are decoded and handed back when present.
    pub fn update(&self) -> Result<UpdatePayload, ClientError> {
        let response: UpdateResponse = self
            .agent
            .get(&self.url("update"))
            .call()
            .map_err(Box::new)?
            .into_json()?;
        if let Some(step) = response.current_step {
            tracing::debug!(step, "server model stepped");
        }
        Ok(UpdatePayload {
            vehicles: response.cars.as_deref().map(decode_records),
            signals: response.traffic_lights.as_deref().map(decode_records),
        })
    }
}
