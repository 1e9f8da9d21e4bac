//! Inspection of the ClusterVersion Upgradeable condition

use admin_ack_common::crd::{
    ClusterOperatorStatusCondition, ClusterVersionStatus, ConditionStatus, CONDITION_UPGRADEABLE,
};
use admin_ack_common::kube_utils::find_condition;
use admin_ack_common::ADMIN_ACK_REQUIRED_REASON;

/// The Upgradeable condition, if the operator has published one
pub fn upgradeable_condition(
    status: &ClusterVersionStatus,
) -> Option<&ClusterOperatorStatusCondition> {
    find_condition(&status.conditions, CONDITION_UPGRADEABLE)
}

/// Whether Upgradeable is present and set to False
///
/// An absent condition or an Unknown status does not block upgrades.
pub fn is_explicitly_false(status: &ClusterVersionStatus) -> bool {
    upgradeable_condition(status).is_some_and(|c| c.status == ConditionStatus::False)
}

/// Whether Upgradeable reports `AdminAckRequired` with a message containing `message`
pub fn admin_ack_required_with_message(status: &ClusterVersionStatus, message: &str) -> bool {
    upgradeable_condition(status).is_some_and(|c| {
        c.reason.contains(ADMIN_ACK_REQUIRED_REASON) && c.message.contains(message)
    })
}

/// One-line snapshot of the Upgradeable condition for diagnostics
pub fn describe_upgradeable(status: &ClusterVersionStatus) -> String {
    match upgradeable_condition(status) {
        Some(c) => format!(
            "Upgradeable: Status={}, Reason={}, Message={:?}.",
            c.status, c.reason, c.message
        ),
        None => "Upgradeable nil".to_string(),
    }
}
