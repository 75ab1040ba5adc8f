use std::collections::BTreeMap;

use crate::client::ClusterObject;
use crate::convert::Convert;
use crate::error::ConversionError;
use crate::kind::ResourceKind;
use crate::resources::{
    ClusterRoleBindingDef, ClusterRoleDef, ConfigMapDef, CrdDef, DeploymentDef, Named,
    NamespaceDef, PodDef, ReplicationControllerDef, SecretDef, ServiceAccountDef, ServiceDef,
};

/// Result of converting one stored definition.
pub type Converted = (String, Result<ClusterObject, ConversionError>);

/// Definitions waiting to be deployed, one map per kind, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceStore {
    namespaces: BTreeMap<String, NamespaceDef>,
    crds: BTreeMap<String, CrdDef>,
    service_accounts: BTreeMap<String, ServiceAccountDef>,
    cluster_roles: BTreeMap<String, ClusterRoleDef>,
    cluster_role_bindings: BTreeMap<String, ClusterRoleBindingDef>,
    config_maps: BTreeMap<String, ConfigMapDef>,
    secrets: BTreeMap<String, SecretDef>,
    replication_controllers: BTreeMap<String, ReplicationControllerDef>,
    pods: BTreeMap<String, PodDef>,
    deployments: BTreeMap<String, DeploymentDef>,
    services: BTreeMap<String, ServiceDef>,
}

/// A definition type with a home in the store.
pub trait Stored: Convert + Named + Sized {
    const KIND: ResourceKind;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self>;

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self>;

    fn wrap(object: Self::Output) -> ClusterObject;
}

impl Stored for NamespaceDef {
    const KIND: ResourceKind = ResourceKind::Namespace;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.namespaces
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.namespaces
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::Namespace(object)
    }
}

impl Stored for CrdDef {
    const KIND: ResourceKind = ResourceKind::CustomResourceDefinition;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.crds
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.crds
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::CustomResourceDefinition(object)
    }
}

impl Stored for ServiceAccountDef {
    const KIND: ResourceKind = ResourceKind::ServiceAccount;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.service_accounts
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.service_accounts
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::ServiceAccount(object)
    }
}

impl Stored for ClusterRoleDef {
    const KIND: ResourceKind = ResourceKind::ClusterRole;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.cluster_roles
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.cluster_roles
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::ClusterRole(object)
    }
}

impl Stored for ClusterRoleBindingDef {
    const KIND: ResourceKind = ResourceKind::ClusterRoleBinding;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.cluster_role_bindings
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.cluster_role_bindings
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::ClusterRoleBinding(object)
    }
}

impl Stored for ConfigMapDef {
    const KIND: ResourceKind = ResourceKind::ConfigMap;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.config_maps
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.config_maps
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::ConfigMap(object)
    }
}

impl Stored for SecretDef {
    const KIND: ResourceKind = ResourceKind::Secret;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.secrets
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.secrets
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::Secret(object)
    }
}

impl Stored for ReplicationControllerDef {
    const KIND: ResourceKind = ResourceKind::ReplicationController;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.replication_controllers
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.replication_controllers
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::ReplicationController(object)
    }
}

impl Stored for PodDef {
    const KIND: ResourceKind = ResourceKind::Pod;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.pods
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.pods
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::Pod(object)
    }
}

impl Stored for DeploymentDef {
    const KIND: ResourceKind = ResourceKind::Deployment;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.deployments
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.deployments
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::Deployment(object)
    }
}

impl Stored for ServiceDef {
    const KIND: ResourceKind = ResourceKind::Service;

    fn entries(store: &ResourceStore) -> &BTreeMap<String, Self> {
        &store.services
    }

    fn entries_mut(store: &mut ResourceStore) -> &mut BTreeMap<String, Self> {
        &mut store.services
    }

    fn wrap(object: Self::Output) -> ClusterObject {
        ClusterObject::Service(object)
    }
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `def` under its own name, replacing any earlier definition of that name.
    pub fn add<D: Stored>(&mut self, def: D) {
        D::entries_mut(self).insert(def.name().to_string(), def);
    }

    pub fn get<D: Stored>(&self, name: &str) -> Option<&D> {
        D::entries(self).get(name)
    }

    /// Number of definitions stored for `kind`.
    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Namespace => self.namespaces.len(),
            ResourceKind::CustomResourceDefinition => self.crds.len(),
            ResourceKind::ServiceAccount => self.service_accounts.len(),
            ResourceKind::ClusterRole => self.cluster_roles.len(),
            ResourceKind::ClusterRoleBinding => self.cluster_role_bindings.len(),
            ResourceKind::ConfigMap => self.config_maps.len(),
            ResourceKind::Secret => self.secrets.len(),
            ResourceKind::ReplicationController => self.replication_controllers.len(),
            ResourceKind::Pod => self.pods.len(),
            ResourceKind::Deployment => self.deployments.len(),
            ResourceKind::Service => self.services.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        ResourceKind::ALL.iter().all(|kind| self.count(*kind) == 0)
    }
}

/// Convert every stored definition of type `D`.
pub fn convert_all<D: Stored>(store: &ResourceStore) -> Vec<Converted> {
    D::entries(store)
        .iter()
        .map(|(name, def)| (name.clone(), def.convert().map(D::wrap)))
        .collect()
}
