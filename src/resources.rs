//! Simplified resource definitions, the shape users write in a bundle.
//!
//! These are deliberately smaller than the Kubernetes schema. The `convert`
//! module expands them into full `k8s-openapi` objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

type Labels = BTreeMap<String, String>;

/// Anything stored under its own name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Definitions of namespaced kinds may omit their namespace and pick up a default.
pub trait Namespaced {
    fn namespace(&self) -> Option<&str>;
    fn set_namespace(&mut self, namespace: String);
}

impl Named for NamespaceDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for CrdDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ServiceAccountDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ClusterRoleDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ClusterRoleBindingDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ConfigMapDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for SecretDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ReplicationControllerDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for PodDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for DeploymentDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ServiceDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Namespaced for ServiceAccountDef {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.namespace = Some(namespace);
    }
}

impl Namespaced for ConfigMapDef {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.namespace = Some(namespace);
    }
}

impl Namespaced for SecretDef {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.namespace = Some(namespace);
    }
}

impl Namespaced for ReplicationControllerDef {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.namespace = Some(namespace);
    }
}

impl Namespaced for PodDef {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.namespace = Some(namespace);
    }
}

impl Namespaced for DeploymentDef {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.namespace = Some(namespace);
    }
}

impl Namespaced for ServiceDef {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.namespace = Some(namespace);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDef {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrdScope {
    #[default]
    Namespaced,
    Cluster,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrdNames {
    pub plural: String,
    #[serde(default)]
    pub singular: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub short_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrdVersion {
    pub name: String,
    #[serde(default = "yes")]
    pub served: bool,
    #[serde(default)]
    pub storage: bool,
    /// OpenAPI v3 schema for the version. Objects with arbitrary fields are
    /// accepted when this is left out.
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
}

fn yes() -> bool {
    true
}

/// A custom resource definition. `name` must be `<plural>.<group>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrdDef {
    pub name: String,
    pub group: String,
    pub names: CrdNames,
    #[serde(default)]
    pub scope: CrdScope,
    #[serde(default)]
    pub versions: Vec<CrdVersion>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountDef {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    #[serde(default)]
    pub image_pull_secrets: Vec<String>,
    #[serde(default)]
    pub automount_token: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRuleDef {
    #[serde(default)]
    pub api_groups: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub resource_names: Vec<String>,
    pub verbs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRoleDef {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    #[serde(default)]
    pub rules: Vec<PolicyRuleDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectDef {
    /// One of `User`, `Group` or `ServiceAccount`.
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterRoleBindingDef {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    /// Name of the bound cluster role.
    pub role: String,
    #[serde(default)]
    pub subjects: Vec<SubjectDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigMapDef {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    /// Base64 encoded values.
    #[serde(default)]
    pub binary_data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretDef {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    #[serde(default, rename = "type")]
    pub type_: Option<String>,
    /// Base64 encoded values.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub string_data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerPortDef {
    #[serde(default)]
    pub name: Option<String>,
    pub container_port: i32,
    #[serde(default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerDef {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub ports: Vec<ContainerPortDef>,
    #[serde(default)]
    pub image_pull_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodDef {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    pub containers: Vec<ContainerDef>,
    #[serde(default)]
    pub service_account: Option<String>,
    #[serde(default)]
    pub restart_policy: Option<String>,
}

/// Pod template shared by replication controllers and deployments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodTemplateDef {
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    pub containers: Vec<ContainerDef>,
    #[serde(default)]
    pub service_account: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationControllerDef {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    #[serde(default)]
    pub replicas: Option<i32>,
    /// Defaults to the template labels.
    #[serde(default)]
    pub selector: Labels,
    pub template: PodTemplateDef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentDef {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    #[serde(default)]
    pub replicas: Option<i32>,
    /// Defaults to the template labels.
    #[serde(default)]
    pub selector: Labels,
    pub template: PodTemplateDef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePortDef {
    #[serde(default)]
    pub name: Option<String>,
    pub port: i32,
    #[serde(default)]
    pub target_port: Option<i32>,
    #[serde(default)]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDef {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Labels,
    #[serde(default, rename = "type")]
    pub type_: Option<String>,
    #[serde(default)]
    pub selector: Labels,
    #[serde(default)]
    pub ports: Vec<ServicePortDef>,
}
