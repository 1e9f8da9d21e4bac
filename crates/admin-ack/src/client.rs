//! Cluster access for admin ack verification
//!
//! [`AdminAckClient`] abstracts the handful of API calls the walker makes so
//! the protocol can be exercised against a mock in tests and against the real
//! API server through [`KubeAdminAckClient`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, PostParams};
use kube::Client;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use admin_ack_common::crd::{ClusterVersion, ClusterVersionStatus, CLUSTER_VERSION_NAME};
use admin_ack_common::{
    Error, Result, ADMIN_ACKS_CONFIGMAP, ADMIN_GATES_CONFIGMAP, ADMIN_GATES_NAMESPACE,
};

/// Trait abstracting the Kubernetes operations used by the walker
///
/// This trait allows mocking the Kubernetes client in tests while using
/// the real client in production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AdminAckClient: Send + Sync {
    /// Read the gate definitions
    ///
    /// Returns `None` when the gate ConfigMap does not exist, meaning the
    /// release under test has no admin ack support.
    async fn admin_gates(&self) -> Result<Option<BTreeMap<String, String>>>;

    /// Read the current acknowledgments
    async fn admin_acks(&self) -> Result<BTreeMap<String, String>>;

    /// Set a single acknowledgment key
    ///
    /// Fetches the latest acknowledgment ConfigMap, sets `gate` to `value`
    /// and replaces the object. Other keys are left untouched.
    async fn set_admin_ack(&self, gate: &str, value: &str) -> Result<()>;

    /// Read the status of the ClusterVersion singleton
    async fn cluster_version_status(&self) -> Result<ClusterVersionStatus>;
}

/// Real implementation of [`AdminAckClient`] backed by a kube client
pub struct KubeAdminAckClient {
    client: Client,
    acks_namespace: String,
}

impl KubeAdminAckClient {
    /// Create a client that reads acknowledgments from `acks_namespace`
    pub fn with_acks_namespace(client: Client, acks_namespace: impl Into<String>) -> Self {
        Self {
            client,
            acks_namespace: acks_namespace.into(),
        }
    }

    fn acks_resource(&self) -> String {
        format!("configmap {}/{}", self.acks_namespace, ADMIN_ACKS_CONFIGMAP)
    }

    async fn get_acks_configmap(&self) -> Result<ConfigMap> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.acks_namespace);
        api.get(ADMIN_ACKS_CONFIGMAP)
            .await
            .map_err(|e| Error::retrieval(self.acks_resource(), e.to_string()))
    }
}

#[async_trait]
impl AdminAckClient for KubeAdminAckClient {
    async fn admin_gates(&self) -> Result<Option<BTreeMap<String, String>>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), ADMIN_GATES_NAMESPACE);
        gates_from_lookup(api.get(ADMIN_GATES_CONFIGMAP).await)
    }

    async fn admin_acks(&self) -> Result<BTreeMap<String, String>> {
        let cm = self.get_acks_configmap().await?;
        Ok(cm.data.unwrap_or_default())
    }

    async fn set_admin_ack(&self, gate: &str, value: &str) -> Result<()> {
        let mut cm = self.get_acks_configmap().await?;
        cm.data
            .get_or_insert_with(BTreeMap::new)
            .insert(gate.to_string(), value.to_string());

        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &self.acks_namespace);
        api.replace(ADMIN_ACKS_CONFIGMAP, &PostParams::default(), &cm)
            .await
            .map_err(|e| Error::update(self.acks_resource(), e.to_string()))?;

        debug!(gate = %gate, value = %value, "Updated admin ack");
        Ok(())
    }

    async fn cluster_version_status(&self) -> Result<ClusterVersionStatus> {
        let api: Api<ClusterVersion> = Api::all(self.client.clone());
        let cv = api.get(CLUSTER_VERSION_NAME).await.map_err(|e| {
            Error::retrieval(format!("clusterversion {}", CLUSTER_VERSION_NAME), e.to_string())
        })?;
        Ok(cv.status.unwrap_or_default())
    }
}

/// Interpret the gate ConfigMap lookup
///
/// Not found means the release has no admin ack support; any other API error
/// is a retrieval failure.
fn gates_from_lookup(
    lookup: kube::Result<ConfigMap>,
) -> Result<Option<BTreeMap<String, String>>> {
    match lookup {
        Ok(cm) => Ok(Some(cm.data.unwrap_or_default())),
        Err(kube::Error::Api(e)) if e.code == 404 => {
            debug!(
                namespace = ADMIN_GATES_NAMESPACE,
                name = ADMIN_GATES_CONFIGMAP,
                "Gate ConfigMap not found"
            );
            Ok(None)
        }
        Err(e) => Err(Error::retrieval(
            format!("configmap {}/{}", ADMIN_GATES_NAMESPACE, ADMIN_GATES_CONFIGMAP),
            e.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_ack_common::FailureKind;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: format!("configmaps \"{}\" {}", ADMIN_GATES_CONFIGMAP, reason),
            reason: reason.to_string(),
            code,
        })
    }

    /// Story: a release without admin ack support has no gate ConfigMap
    #[test]
    fn story_missing_gate_configmap_means_feature_absent() {
        let gates = gates_from_lookup(Err(api_error(404, "NotFound"))).unwrap();
        assert_eq!(gates, None);
    }

    #[test]
    fn other_api_errors_are_retrieval_failures() {
        let err = gates_from_lookup(Err(api_error(403, "Forbidden"))).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Retrieval);
        assert_eq!(
            err.resource(),
            Some("configmap openshift-config-managed/admin-gates")
        );
        assert!(err.to_string().contains("Forbidden"));
    }

    #[test]
    fn configmap_without_data_yields_empty_gates() {
        let gates = gates_from_lookup(Ok(ConfigMap::default())).unwrap();
        assert_eq!(gates, Some(BTreeMap::new()));
    }

    #[test]
    fn present_gates_are_returned() {
        let cm = ConfigMap {
            data: Some(BTreeMap::from([(
                "ack-4.16-kube-1.29-api-removals".to_string(),
                "Kubernetes 1.29 removes several APIs".to_string(),
            )])),
            ..Default::default()
        };
        let gates = gates_from_lookup(Ok(cm)).unwrap().unwrap();
        assert_eq!(gates.len(), 1);
    }
}
