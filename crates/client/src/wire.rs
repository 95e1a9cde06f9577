use cityview_common::{EntityId, Heading};
use cityview_scene::SnapshotRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the init POST. Field names follow the server's JSON contract.
#[derive(Debug, Clone, Serialize)]
pub struct InitRequest {
    #[serde(rename = "NAgents")]
    pub n_agents: u32,
    pub width: u32,
    pub height: u32,
}

/// Init response; the server answers with the grid it actually built.
#[derive(Debug, Clone, Deserialize)]
pub struct InitResponse {
    pub width: u32,
    pub height: u32,
}

/// Positions response shared by all getEntities endpoints.
///
/// Records are kept as raw JSON values so one malformed record can be
/// skipped without discarding the rest of the snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionsResponse {
    #[serde(default)]
    pub positions: Vec<Value>,
}

/// Update response. One server variant steps the model and returns only a
/// message; another returns the moved entities inline.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub cars: Option<Vec<Value>>,
    #[serde(default, rename = "trafficLights")]
    pub traffic_lights: Option<Vec<Value>>,
    #[serde(default, rename = "currentStep")]
    pub current_step: Option<u64>,
}

/// One entity record as the server sends it. Ids arrive as JSON numbers or
/// numeric strings depending on the server variant.
#[derive(Debug, Clone, Deserialize)]
struct WireRecord {
    id: WireId,
    x: f32,
    y: f32,
    z: f32,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    go: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    fn to_u64(&self) -> Option<u64> {
        match self {
            WireId::Number(n) => Some(*n),
            WireId::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Decode a list of raw records, skipping malformed ones.
///
/// A record missing its id or position is dropped with a warning and the
/// rest of the snapshot still applies (partial-snapshot tolerance).
pub fn decode_records(values: &[Value]) -> Vec<SnapshotRecord> {
    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<WireRecord>(value.clone()) {
            Ok(wire) => match wire.id.to_u64() {
                Some(id) => records.push(SnapshotRecord {
                    id: EntityId(id),
                    x: wire.x,
                    y: wire.y,
                    z: wire.z,
                    heading: wire.direction.as_deref().and_then(Heading::from_wire),
                    go: wire.go,
                }),
                None => {
                    tracing::warn!(record = %value, "skipping record with unparseable id");
                }
            },
            Err(e) => {
                tracing::warn!(record = %value, error = %e, "skipping malformed record");
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_numeric_and_string_ids() {
        let values = vec![
            json!({"id": 7, "x": 1.0, "y": 1.0, "z": 2.0}),
            json!({"id": "12", "x": 3.0, "y": 1.0, "z": 4.0}),
        ];
        let records = decode_records(&values);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, EntityId(7));
        assert_eq!(records[1].id, EntityId(12));
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let values = vec![
            json!({"id": 1, "x": 1.0, "y": 1.0, "z": 1.0}),
            json!({"x": 2.0, "y": 1.0, "z": 2.0}),           // missing id
            json!({"id": 3, "y": 1.0, "z": 3.0}),            // missing x
            json!({"id": "not-a-number", "x": 0, "y": 0, "z": 0}),
            json!({"id": 4, "x": 4.0, "y": 1.0, "z": 4.0}),
        ];
        let records = decode_records(&values);
        let ids: Vec<u64> = records.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn optional_fields_decode() {
        let values = vec![json!({
            "id": 5, "x": 1.0, "y": 1.0, "z": 1.0,
            "direction": "Left", "go": true
        })];
        let records = decode_records(&values);
        assert_eq!(records[0].heading, Some(Heading::West));
        assert_eq!(records[0].go, Some(true));
    }

    #[test]
    fn unknown_direction_decodes_as_none() {
        let values = vec![json!({
            "id": 5, "x": 1.0, "y": 1.0, "z": 1.0, "direction": "sideways"
        })];
        let records = decode_records(&values);
        assert_eq!(records[0].heading, None);
    }

    #[test]
    fn update_response_both_variants() {
        let inline: UpdateResponse = serde_json::from_value(json!({
            "cars": [{"id": 1, "x": 0, "y": 1, "z": 0}],
            "trafficLights": [],
            "currentStep": 4
        }))
        .unwrap();
        assert!(inline.cars.is_some());

        let bare: UpdateResponse = serde_json::from_value(json!({
            "message": "Model updated to step 4.",
            "currentStep": 4
        }))
        .unwrap();
        assert!(bare.cars.is_none());
        assert_eq!(bare.current_step, Some(4));
    }
}
