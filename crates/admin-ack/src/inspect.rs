//! Read-only view of admin gates
//!
//! Reports each gate's release, whether it applies to the running version,
//! and whether it is currently acknowledged. Nothing is written.

use serde::Serialize;

use admin_ack_common::{Error, Result, ACK_VALUE};

use crate::client::AdminAckClient;
use crate::gate::parse_gates;
use crate::upgradeable::describe_upgradeable;
use crate::version::{current_version, gate_applicable};

/// State of one gate as seen by `inspect`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStatus {
    /// Gate key
    pub key: String,
    /// Release the gate targets
    pub version: String,
    /// Gate description
    pub description: String,
    /// Whether the gate applies to the current cluster version
    pub applicable: bool,
    /// Whether the gate is acknowledged
    pub acknowledged: bool,
}

/// Snapshot of the admin ack state of a cluster
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    /// Version gates are matched against
    pub current_version: String,
    /// One-line Upgradeable summary
    pub upgradeable: String,
    /// Gates in key order; empty if the release has no admin gates
    pub gates: Vec<GateStatus>,
}

impl Inspection {
    /// Render the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::retrieval("inspection report", e.to_string()))
    }
}

/// Collect the admin ack state without modifying anything
///
/// Fails on malformed gates, like the walker does.
pub async fn inspect(client: &dyn AdminAckClient) -> Result<Inspection> {
    let status = client.cluster_version_status().await?;
    let mut inspection = Inspection {
        current_version: current_version(&status.history).to_string(),
        upgradeable: describe_upgradeable(&status),
        gates: Vec::new(),
    };

    let gates = match client.admin_gates().await? {
        Some(gates) if !gates.is_empty() => gates,
        _ => return Ok(inspection),
    };
    let acks = client.admin_acks().await?;

    inspection.gates = parse_gates(&gates)?
        .into_iter()
        .map(|gate| GateStatus {
            applicable: gate_applicable(&gate.version, &inspection.current_version),
            acknowledged: acks.get(&gate.key).map(String::as_str) == Some(ACK_VALUE),
            key: gate.key,
            version: gate.version,
            description: gate.description,
        })
        .collect();

    Ok(inspection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockAdminAckClient;
    use admin_ack_common::crd::{ClusterVersionStatus, UpdateHistory, UpdateState};
    use std::collections::BTreeMap;

    fn status(version: &str) -> ClusterVersionStatus {
        ClusterVersionStatus {
            history: vec![UpdateHistory::new(version, UpdateState::Completed)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn reports_applicability_and_ack_state() {
        let mut mock = MockAdminAckClient::new();
        mock.expect_cluster_version_status()
            .returning(|| Ok(status("4.16.3")));
        mock.expect_admin_gates().returning(|| {
            Ok(Some(BTreeMap::from([
                ("ack-4.15-old".to_string(), "old".to_string()),
                ("ack-4.16-new".to_string(), "new".to_string()),
            ])))
        });
        mock.expect_admin_acks().returning(|| {
            Ok(BTreeMap::from([(
                "ack-4.16-new".to_string(),
                "true".to_string(),
            )]))
        });
        mock.expect_set_admin_ack().never();

        let inspection = inspect(&mock).await.unwrap();

        assert_eq!(inspection.current_version, "4.16.3");
        assert_eq!(inspection.upgradeable, "Upgradeable nil");
        assert_eq!(inspection.gates.len(), 2);
        assert!(!inspection.gates[0].applicable);
        assert!(!inspection.gates[0].acknowledged);
        assert!(inspection.gates[1].applicable);
        assert!(inspection.gates[1].acknowledged);
    }

    #[tokio::test]
    async fn absent_gates_yield_empty_list() {
        let mut mock = MockAdminAckClient::new();
        mock.expect_cluster_version_status()
            .returning(|| Ok(status("4.16.3")));
        mock.expect_admin_gates().returning(|| Ok(None));
        mock.expect_admin_acks().never();

        let inspection = inspect(&mock).await.unwrap();
        assert!(inspection.gates.is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let inspection = Inspection {
            current_version: "4.16.3".to_string(),
            upgradeable: "Upgradeable nil".to_string(),
            gates: vec![],
        };
        let json = serde_json::to_value(&inspection).unwrap();
        assert_eq!(json["currentVersion"], "4.16.3");
    }

    #[test]
    fn to_json_renders_gates() {
        let inspection = Inspection {
            current_version: "4.16.3".to_string(),
            upgradeable: "Upgradeable nil".to_string(),
            gates: vec![GateStatus {
                key: "ack-4.16-new".to_string(),
                version: "4.16".to_string(),
                description: "new".to_string(),
                applicable: true,
                acknowledged: false,
            }],
        };
        let rendered = inspection.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["gates"][0]["key"], "ack-4.16-new");
        assert_eq!(parsed["gates"][0]["applicable"], true);
    }
}
