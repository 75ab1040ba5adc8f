use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The kinds of cluster object the deployer knows how to create.
///
/// Variant order matches the order in which kinds are deployed, so sorting
/// a report by kind lists failures in deploy order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Namespace,
    CustomResourceDefinition,
    ServiceAccount,
    ClusterRole,
    ClusterRoleBinding,
    ConfigMap,
    Secret,
    ReplicationController,
    Pod,
    Deployment,
    Service,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Namespace,
        ResourceKind::CustomResourceDefinition,
        ResourceKind::ServiceAccount,
        ResourceKind::ClusterRole,
        ResourceKind::ClusterRoleBinding,
        ResourceKind::ConfigMap,
        ResourceKind::Secret,
        ResourceKind::ReplicationController,
        ResourceKind::Pod,
        ResourceKind::Deployment,
        ResourceKind::Service,
    ];

    /// Human readable name, used in log lines and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespace",
            ResourceKind::CustomResourceDefinition => "custom resource definition",
            ResourceKind::ServiceAccount => "service account",
            ResourceKind::ClusterRole => "cluster role",
            ResourceKind::ClusterRoleBinding => "cluster role binding",
            ResourceKind::ConfigMap => "config map",
            ResourceKind::Secret => "secret",
            ResourceKind::ReplicationController => "replication controller",
            ResourceKind::Pod => "pod",
            ResourceKind::Deployment => "deployment",
            ResourceKind::Service => "service",
        }
    }

    /// Whether objects of this kind live inside a namespace.
    pub fn is_namespaced(&self) -> bool {
        !matches!(
            self,
            ResourceKind::Namespace
                | ResourceKind::CustomResourceDefinition
                | ResourceKind::ClusterRole
                | ResourceKind::ClusterRoleBinding
        )
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_sorted_and_complete() {
        let mut sorted = ResourceKind::ALL;
        sorted.sort();
        assert_eq!(sorted, ResourceKind::ALL);

        let unique: std::collections::BTreeSet<_> = ResourceKind::ALL.into_iter().collect();
        assert_eq!(unique.len(), 11);
    }

    #[test]
    fn cluster_scoped_kinds() {
        let cluster_scoped: Vec<_> = ResourceKind::ALL
            .into_iter()
            .filter(|k| !k.is_namespaced())
            .collect();
        assert_eq!(
            cluster_scoped,
            [
                ResourceKind::Namespace,
                ResourceKind::CustomResourceDefinition,
                ResourceKind::ClusterRole,
                ResourceKind::ClusterRoleBinding,
            ]
        );
    }
}
