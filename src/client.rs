use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::{
    api::{
        apps::v1::Deployment,
        core::v1::{
            ConfigMap, Namespace, Pod, ReplicationController, Secret, Service, ServiceAccount,
        },
        rbac::v1::{ClusterRole, ClusterRoleBinding},
    },
    apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition,
    NamespaceResourceScope,
};
use kube::{api::PostParams, core::ObjectMeta, Api, Client, Resource};
#[cfg(test)]
use mockall::automock;
use serde::{de::DeserializeOwned, Serialize};

use crate::kind::ResourceKind;

/// A converted object, ready to be submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterObject {
    Namespace(Namespace),
    CustomResourceDefinition(CustomResourceDefinition),
    ServiceAccount(ServiceAccount),
    ClusterRole(ClusterRole),
    ClusterRoleBinding(ClusterRoleBinding),
    ConfigMap(ConfigMap),
    Secret(Secret),
    ReplicationController(ReplicationController),
    Pod(Pod),
    Deployment(Deployment),
    Service(Service),
}

impl ClusterObject {
    /// The zero value of `kind`: an object with every field unset.
    pub fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Namespace => ClusterObject::Namespace(Default::default()),
            ResourceKind::CustomResourceDefinition => {
                ClusterObject::CustomResourceDefinition(Default::default())
            }
            ResourceKind::ServiceAccount => ClusterObject::ServiceAccount(Default::default()),
            ResourceKind::ClusterRole => ClusterObject::ClusterRole(Default::default()),
            ResourceKind::ClusterRoleBinding => {
                ClusterObject::ClusterRoleBinding(Default::default())
            }
            ResourceKind::ConfigMap => ClusterObject::ConfigMap(Default::default()),
            ResourceKind::Secret => ClusterObject::Secret(Default::default()),
            ResourceKind::ReplicationController => {
                ClusterObject::ReplicationController(Default::default())
            }
            ResourceKind::Pod => ClusterObject::Pod(Default::default()),
            ResourceKind::Deployment => ClusterObject::Deployment(Default::default()),
            ResourceKind::Service => ClusterObject::Service(Default::default()),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ClusterObject::Namespace(_) => ResourceKind::Namespace,
            ClusterObject::CustomResourceDefinition(_) => ResourceKind::CustomResourceDefinition,
            ClusterObject::ServiceAccount(_) => ResourceKind::ServiceAccount,
            ClusterObject::ClusterRole(_) => ResourceKind::ClusterRole,
            ClusterObject::ClusterRoleBinding(_) => ResourceKind::ClusterRoleBinding,
            ClusterObject::ConfigMap(_) => ResourceKind::ConfigMap,
            ClusterObject::Secret(_) => ResourceKind::Secret,
            ClusterObject::ReplicationController(_) => ResourceKind::ReplicationController,
            ClusterObject::Pod(_) => ResourceKind::Pod,
            ClusterObject::Deployment(_) => ResourceKind::Deployment,
            ClusterObject::Service(_) => ResourceKind::Service,
        }
    }

    pub fn meta(&self) -> &ObjectMeta {
        match self {
            ClusterObject::Namespace(o) => o.meta(),
            ClusterObject::CustomResourceDefinition(o) => o.meta(),
            ClusterObject::ServiceAccount(o) => o.meta(),
            ClusterObject::ClusterRole(o) => o.meta(),
            ClusterObject::ClusterRoleBinding(o) => o.meta(),
            ClusterObject::ConfigMap(o) => o.meta(),
            ClusterObject::Secret(o) => o.meta(),
            ClusterObject::ReplicationController(o) => o.meta(),
            ClusterObject::Pod(o) => o.meta(),
            ClusterObject::Deployment(o) => o.meta(),
            ClusterObject::Service(o) => o.meta(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.meta().name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.meta().namespace.as_deref()
    }
}

/// Trait abstracting the create calls made against the cluster
///
/// Only creation is needed: objects are never read back, updated or deleted.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Submit `object` to the apiserver.
    ///
    /// Namespaced objects go to the namespace in their metadata.
    async fn create(&self, object: &ClusterObject) -> Result<(), kube::Error>;
}

/// Settings applied to every create request.
#[derive(Debug, Clone)]
pub struct CreateSettings {
    pub dry_run: bool,
    pub field_manager: String,
}

impl Default for CreateSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            field_manager: "deployer".to_string(),
        }
    }
}

/// [`ClusterClient`] backed by a real `kube::Client`.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
    settings: CreateSettings,
}

impl KubeClusterClient {
    pub fn new(client: Client, settings: CreateSettings) -> Self {
        Self { client, settings }
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            dry_run: self.settings.dry_run,
            field_manager: Some(self.settings.field_manager.clone()),
        }
    }

    async fn create_cluster_scoped<K>(&self, object: &K) -> Result<(), kube::Error>
    where
        K: Clone + DeserializeOwned + Serialize + Debug + Resource,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::all(self.client.clone());
        api.create(&self.post_params(), object).await?;
        Ok(())
    }

    /// Objects without a namespace land in the client's default namespace.
    async fn create_namespaced<K>(&self, object: &K) -> Result<(), kube::Error>
    where
        K: Clone + DeserializeOwned + Serialize + Debug + Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = match object.meta().namespace.as_deref() {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::default_namespaced(self.client.clone()),
        };
        api.create(&self.post_params(), object).await?;
        Ok(())
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn create(&self, object: &ClusterObject) -> Result<(), kube::Error> {
        match object {
            ClusterObject::Namespace(o) => self.create_cluster_scoped(o).await,
            ClusterObject::CustomResourceDefinition(o) => self.create_cluster_scoped(o).await,
            ClusterObject::ClusterRole(o) => self.create_cluster_scoped(o).await,
            ClusterObject::ClusterRoleBinding(o) => self.create_cluster_scoped(o).await,
            ClusterObject::ServiceAccount(o) => self.create_namespaced(o).await,
            ClusterObject::ConfigMap(o) => self.create_namespaced(o).await,
            ClusterObject::Secret(o) => self.create_namespaced(o).await,
            ClusterObject::ReplicationController(o) => self.create_namespaced(o).await,
            ClusterObject::Pod(o) => self.create_namespaced(o).await,
            ClusterObject::Deployment(o) => self.create_namespaced(o).await,
            ClusterObject::Service(o) => self.create_namespaced(o).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_objects_match_their_kind() {
        for kind in ResourceKind::ALL {
            let object = ClusterObject::empty(kind);
            assert_eq!(object.kind(), kind);
            assert_eq!(object.name(), None);
            assert_eq!(object.namespace(), None);
        }
    }

    #[test]
    fn metadata_is_read_through() {
        let object = ClusterObject::Service(Service {
            metadata: ObjectMeta {
                name: Some("web".to_string()),
                namespace: Some("apps".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(object.name(), Some("web"));
        assert_eq!(object.namespace(), Some("apps"));
    }

    #[test]
    fn default_create_settings() {
        let settings = CreateSettings::default();
        assert!(!settings.dry_run);
        assert_eq!(settings.field_manager, "deployer");
    }
}
