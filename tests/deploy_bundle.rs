use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deployer::{
    bundle::ResourceBundle, ClusterClient, ClusterObject, ConversionFailurePolicy, Deployer,
    Error, ResourceKind,
};

const BUNDLE: &str = r#"
[[service]]
name = "web"
selector.app = "web"
ports = [{ port = 80, target_port = 8080 }]

[[deployment]]
name = "web"
template.labels.app = "web"
template.service_account = "web"
template.containers = [{ name = "web", image = "ghcr.io/example/web:1.0", ports = [{ container_port = 8080 }] }]

[[secret]]
name = "web-token"
data.token = "c2VjcmV0"

[[config_map]]
name = "web-settings"
data.listen = ":8080"

[[cluster_role_binding]]
name = "web-read"
role = "web-read"
subjects = [{ kind = "ServiceAccount", name = "web", namespace = "shop" }]

[[cluster_role]]
name = "web-read"
rules = [{ api_groups = [""], resources = ["configmaps"], verbs = ["get", "list"] }]

[[service_account]]
name = "web"

[[crd]]
name = "carts.shop.example.com"
group = "shop.example.com"
names = { plural = "carts", kind = "Cart" }
versions = [{ name = "v1", storage = true }]

[[namespace]]
name = "shop"
"#;

/// Records every create and fails the ones whose kind is in `reject`.
#[derive(Default)]
struct RecordingClient {
    created: Mutex<Vec<(ResourceKind, Option<String>, Option<String>)>>,
    reject: Vec<ResourceKind>,
}

#[async_trait]
impl ClusterClient for RecordingClient {
    async fn create(&self, object: &ClusterObject) -> Result<(), kube::Error> {
        self.created.lock().unwrap().push((
            object.kind(),
            object.name().map(str::to_string),
            object.namespace().map(str::to_string),
        ));
        if self.reject.contains(&object.kind()) {
            return Err(kube::Error::Api(kube::error::ErrorResponse {
                status: "Failure".to_string(),
                message: "forbidden".to_string(),
                reason: "Forbidden".to_string(),
                code: 403,
            }));
        }
        Ok(())
    }
}

fn deployer_for(client: Arc<RecordingClient>, policy: ConversionFailurePolicy) -> Deployer {
    let mut deployer = Deployer::new(client).with_policy(policy);
    ResourceBundle::from_toml(BUNDLE)
        .unwrap()
        .load_into(&mut deployer, &"shop".parse().unwrap());
    deployer
}

#[tokio::test]
async fn bundle_is_created_in_dependency_order() {
    let client = Arc::new(RecordingClient::default());
    let deployer = deployer_for(client.clone(), ConversionFailurePolicy::Submit);

    deployer.run().await.unwrap();

    let created = client.created.lock().unwrap();
    let kinds: Vec<ResourceKind> = created.iter().map(|(kind, _, _)| *kind).collect();
    assert_eq!(
        kinds,
        [
            ResourceKind::Namespace,
            ResourceKind::CustomResourceDefinition,
            ResourceKind::ServiceAccount,
            ResourceKind::ClusterRole,
            ResourceKind::ClusterRoleBinding,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::Deployment,
            ResourceKind::Service,
        ]
    );
    for (kind, name, namespace) in created.iter() {
        assert!(name.is_some(), "{kind} was submitted without a name");
        if kind.is_namespaced() {
            assert_eq!(namespace.as_deref(), Some("shop"));
        } else {
            assert_eq!(namespace.as_deref(), None);
        }
    }
}

#[tokio::test]
async fn rbac_failures_do_not_stop_later_kinds() {
    let client = Arc::new(RecordingClient {
        reject: vec![ResourceKind::ClusterRole, ResourceKind::ClusterRoleBinding],
        ..Default::default()
    });
    let deployer = deployer_for(client.clone(), ConversionFailurePolicy::Submit);

    let report = deployer.run().await.unwrap_err();
    assert_eq!(
        report.kinds().collect::<Vec<_>>(),
        [ResourceKind::ClusterRole, ResourceKind::ClusterRoleBinding]
    );
    assert_eq!(report.get(ResourceKind::ClusterRoleBinding).len(), 1);
    assert_eq!(report.get(ResourceKind::ClusterRole)[0].name(), "web-read");
    assert!(report.to_string().contains("failed to create cluster role web-read"));

    // services are the last pass
    let created = client.created.lock().unwrap();
    assert_eq!(created.last().unwrap().0, ResourceKind::Service);
}

#[tokio::test]
async fn broken_definition_with_skip_policy() {
    let client = Arc::new(RecordingClient::default());
    let mut deployer = deployer_for(client.clone(), ConversionFailurePolicy::Skip);
    deployer.add_secret(deployer::resources::SecretDef {
        name: "bad".to_string(),
        namespace: Some("shop".to_string()),
        data: [("key".to_string(), "%%%".to_string())].into(),
        ..Default::default()
    });

    let report = deployer.run().await.unwrap_err();
    assert_eq!(report.len(), 1);
    assert!(matches!(
        &report.get(ResourceKind::Secret)[0],
        Error::Conversion { name, .. } if name == "bad"
    ));

    let created = client.created.lock().unwrap();
    assert!(created
        .iter()
        .all(|(_, name, _)| name.as_deref() != Some("bad")));
    assert_eq!(created.len(), 9);
}
