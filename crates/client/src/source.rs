use crate::http::{ClientError, SimulationClient};
use cityview_common::EntityKind;
use cityview_scene::KindSnapshot;

/// Abstraction over the simulation client: one call, one batch of freshly
/// stamped snapshots. Lets the scene layer and tests run without a server.
pub trait SnapshotSource {
    /// Run one poll cycle and return the resulting snapshots.
    fn poll(&mut self) -> Result<Vec<KindSnapshot>, ClientError>;
}

/// Live source backed by the HTTP client.
///
/// Stamps every snapshot with a sequence number that increases once per
/// cycle, so the scene can discard anything that arrives out of order.
/// Static kinds (buildings, roads) are fetched until they have been seen
/// once; after that a cycle only carries the mobile kinds.
pub struct LiveSource {
    client: SimulationClient,
    seq: u64,
    statics_loaded: bool,
}

impl LiveSource {
    pub fn new(client: SimulationClient) -> Self {
        Self {
            client,
            seq: 0,
            statics_loaded: false,
        }
    }

    /// Fetch every kind once without stepping the model. Used at session
    /// start so the static scenery is present before the first update.
    pub fn bootstrap(&mut self) -> Result<Vec<KindSnapshot>, ClientError> {
        self.seq += 1;
        let mut snapshots = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let records = self.client.get_entities(kind)?;
            snapshots.push(KindSnapshot::new(kind, self.seq, records));
        }
        self.statics_loaded = true;
        Ok(snapshots)
    }
}

impl SnapshotSource for LiveSource {
    fn poll(&mut self) -> Result<Vec<KindSnapshot>, ClientError> {
        let payload = self.client.update()?;
        self.seq += 1;

        let vehicles = match payload.vehicles {
            Some(records) => records,
            None => self.client.get_entities(EntityKind::Vehicle)?,
        };
        let signals = match payload.signals {
            Some(records) => records,
            None => self.client.get_entities(EntityKind::Signal)?,
        };

        let mut snapshots = vec![
            KindSnapshot::new(EntityKind::Vehicle, self.seq, vehicles),
            KindSnapshot::new(EntityKind::Signal, self.seq, signals),
        ];

        // A failed bootstrap leaves the scenery missing; keep trying on the
        // regular cadence until it has loaded once.
        if !self.statics_loaded {
            let buildings = self.client.get_entities(EntityKind::Building)?;
            let roads = self.client.get_entities(EntityKind::RoadSegment)?;
            snapshots.push(KindSnapshot::new(EntityKind::Building, self.seq, buildings));
            snapshots.push(KindSnapshot::new(EntityKind::RoadSegment, self.seq, roads));
            self.statics_loaded = true;
        }

        Ok(snapshots)
    }
}
