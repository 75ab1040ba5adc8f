//! Bundle files: every resource to deploy, in one toml document.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::KubeNamespace;
use crate::deployer::Deployer;
use crate::resources::{
    ClusterRoleBindingDef, ClusterRoleDef, ConfigMapDef, CrdDef, DeploymentDef, Namespaced,
    NamespaceDef, PodDef, ReplicationControllerDef, SecretDef, ServiceAccountDef, ServiceDef,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceBundle {
    #[serde(default)]
    pub namespace: Vec<NamespaceDef>,
    #[serde(default)]
    pub crd: Vec<CrdDef>,
    #[serde(default)]
    pub service_account: Vec<ServiceAccountDef>,
    #[serde(default)]
    pub cluster_role: Vec<ClusterRoleDef>,
    #[serde(default)]
    pub cluster_role_binding: Vec<ClusterRoleBindingDef>,
    #[serde(default)]
    pub config_map: Vec<ConfigMapDef>,
    #[serde(default)]
    pub secret: Vec<SecretDef>,
    #[serde(default)]
    pub replication_controller: Vec<ReplicationControllerDef>,
    #[serde(default)]
    pub pod: Vec<PodDef>,
    #[serde(default)]
    pub deployment: Vec<DeploymentDef>,
    #[serde(default)]
    pub service: Vec<ServiceDef>,
}

impl ResourceBundle {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read bundle at {}", path.to_string_lossy()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse bundle at {}", path.to_string_lossy()))
    }

    pub fn from_toml(toml: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(toml)?)
    }

    /// Number of definitions in the bundle, duplicates included.
    pub fn len(&self) -> usize {
        self.namespace.len()
            + self.crd.len()
            + self.service_account.len()
            + self.cluster_role.len()
            + self.cluster_role_binding.len()
            + self.config_map.len()
            + self.secret.len()
            + self.replication_controller.len()
            + self.pod.len()
            + self.deployment.len()
            + self.service.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add every definition to `deployer`, in file order, so a later entry
    /// replaces an earlier one with the same name. Namespaced definitions
    /// without a namespace get `default_namespace`.
    pub fn load_into(self, deployer: &mut Deployer, default_namespace: &KubeNamespace) {
        fn defaulted<D: Namespaced>(mut def: D, namespace: &KubeNamespace) -> D {
            if def.namespace().is_none() {
                def.set_namespace(namespace.as_str().to_string());
            }
            def
        }

        let ns = default_namespace;
        self.namespace
            .into_iter()
            .for_each(|d| deployer.add_namespace(d));
        self.crd
            .into_iter()
            .for_each(|d| deployer.add_custom_resource_definition(d));
        self.service_account
            .into_iter()
            .for_each(|d| deployer.add_service_account(defaulted(d, ns)));
        self.cluster_role
            .into_iter()
            .for_each(|d| deployer.add_cluster_role(d));
        self.cluster_role_binding
            .into_iter()
            .for_each(|d| deployer.add_cluster_role_binding(d));
        self.config_map
            .into_iter()
            .for_each(|d| deployer.add_config_map(defaulted(d, ns)));
        self.secret
            .into_iter()
            .for_each(|d| deployer.add_secret(defaulted(d, ns)));
        self.replication_controller
            .into_iter()
            .for_each(|d| deployer.add_replication_controller(defaulted(d, ns)));
        self.pod
            .into_iter()
            .for_each(|d| deployer.add_pod(defaulted(d, ns)));
        self.deployment
            .into_iter()
            .for_each(|d| deployer.add_deployment(defaulted(d, ns)));
        self.service
            .into_iter()
            .for_each(|d| deployer.add_service(defaulted(d, ns)));
    }
}
