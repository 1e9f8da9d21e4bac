//! Admin gate definitions
//!
//! Gates are published in the `admin-gates` ConfigMap as
//! `ack-<major>.<minor>-<suffix>` keys mapped to a human-readable description
//! of what the administrator is agreeing to.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use admin_ack_common::{Error, Result, ADMIN_GATES_CONFIGMAP, ADMIN_GATES_NAMESPACE};

/// Required format of a gate key
pub const ADMIN_ACK_GATE_FORMAT: &str = "^ack-[4-5][.]([0-9]{1,})-[^-]";

static ADMIN_ACK_GATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ADMIN_ACK_GATE_FORMAT).expect("gate format regex is valid"));

/// A validated gate from the `admin-gates` ConfigMap
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateDefinition {
    /// Full gate key, e.g. `ack-4.16-kube-1.29-api-removals-in-4.17`
    pub key: String,
    /// Description the operator echoes in the Upgradeable message
    pub description: String,
    /// Release the gate applies to, e.g. `4.16`
    pub version: String,
}

impl GateDefinition {
    /// Validate a gate entry
    ///
    /// Fails if the key does not match [`ADMIN_ACK_GATE_FORMAT`] or the
    /// description is empty.
    pub fn parse(key: &str, description: &str) -> Result<Self> {
        let version = gate_version(key).ok_or_else(|| {
            Error::validation_for(
                key,
                format!(
                    "configmap {}/{} gate {} has invalid format; must comply with {:?}",
                    ADMIN_GATES_NAMESPACE, ADMIN_GATES_CONFIGMAP, key, ADMIN_ACK_GATE_FORMAT
                ),
            )
        })?;

        if description.is_empty() {
            return Err(Error::validation_for(
                key,
                format!(
                    "configmap {}/{} gate {} does not contain description",
                    ADMIN_GATES_NAMESPACE, ADMIN_GATES_CONFIGMAP, key
                ),
            ));
        }

        Ok(Self {
            key: key.to_string(),
            description: description.to_string(),
            version: version.to_string(),
        })
    }
}

/// Extract the release version embedded in a gate key
///
/// Returns the second `-`-delimited segment of the matched prefix, or `None`
/// if the key does not match the gate format.
pub fn gate_version(key: &str) -> Option<&str> {
    let matched = ADMIN_ACK_GATE_REGEX.find(key)?;
    matched.as_str().split('-').nth(1)
}

/// Validate every gate in the ConfigMap data
///
/// Gates are returned in key order. The first invalid gate fails the whole
/// set, before any gate is acted on.
pub fn parse_gates(data: &BTreeMap<String, String>) -> Result<Vec<GateDefinition>> {
    data.iter()
        .map(|(key, description)| GateDefinition::parse(key, description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_ack_common::FailureKind;

    #[test]
    fn parses_well_formed_gate() {
        let gate = GateDefinition::parse("ack-4.99-test", "desc").unwrap();
        assert_eq!(gate.key, "ack-4.99-test");
        assert_eq!(gate.description, "desc");
        assert_eq!(gate.version, "4.99");
    }

    #[test]
    fn accepts_major_five_and_multi_part_suffix() {
        let gate = GateDefinition::parse("ack-5.0-kube-1.33-api-removals", "d").unwrap();
        assert_eq!(gate.version, "5.0");
    }

    #[test]
    fn rejects_malformed_keys() {
        for key in [
            "ack-6.1-x",
            "ack-4-x",
            "badkey",
            "ack-4.12--leading-dash",
            "ack-4.x-foo",
            "ack-4.12-",
            "prefix-ack-4.12-foo",
        ] {
            let err = GateDefinition::parse(key, "desc").unwrap_err();
            assert_eq!(err.kind(), FailureKind::Validation, "key {}", key);
            assert_eq!(err.gate(), Some(key));
            assert!(err.to_string().contains("invalid format"));
            assert!(err.to_string().contains(ADMIN_ACK_GATE_FORMAT));
        }
    }

    #[test]
    fn rejects_empty_description() {
        let err = GateDefinition::parse("ack-4.12-foo", "").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert!(err.to_string().contains("does not contain description"));
    }

    #[test]
    fn gate_version_extracts_release() {
        assert_eq!(gate_version("ack-4.12-foo"), Some("4.12"));
        assert_eq!(gate_version("ack-4.123-f-o-o"), Some("4.123"));
        assert_eq!(gate_version("ack-4-x"), None);
    }

    /// Story: a malformed gate anywhere in the map fails the whole set
    #[test]
    fn story_one_bad_gate_fails_all() {
        let mut data = BTreeMap::new();
        data.insert("ack-4.12-a".to_string(), "first".to_string());
        data.insert("badkey".to_string(), "second".to_string());
        data.insert("ack-4.13-c".to_string(), "third".to_string());

        let err = parse_gates(&data).unwrap_err();
        assert_eq!(err.gate(), Some("badkey"));
    }

    #[test]
    fn parse_gates_preserves_key_order() {
        let mut data = BTreeMap::new();
        data.insert("ack-4.13-b".to_string(), "second".to_string());
        data.insert("ack-4.12-a".to_string(), "first".to_string());

        let gates = parse_gates(&data).unwrap();
        let keys: Vec<_> = gates.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["ack-4.12-a", "ack-4.13-b"]);
    }
}
