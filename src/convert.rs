//! Expands the simplified definitions from [`crate::resources`] into
//! `k8s-openapi` objects. Conversion is pure: no cluster access, no defaults
//! pulled from the environment.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{
            ConfigMap, Container, ContainerPort, EnvVar, LocalObjectReference, Namespace, Pod,
            PodSpec, PodTemplateSpec, ReplicationController, ReplicationControllerSpec, Secret,
            Service, ServiceAccount, ServicePort, ServiceSpec,
        },
        rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject},
    },
    apiextensions_apiserver::pkg::apis::apiextensions::v1::{
        CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
        CustomResourceDefinitionVersion, CustomResourceValidation, JSONSchemaProps,
    },
    apimachinery::pkg::{apis::meta::v1::LabelSelector, util::intstr::IntOrString},
    ByteString,
};
use kube::core::ObjectMeta;

use crate::error::ConversionError;
use crate::resources::{
    ClusterRoleBindingDef, ClusterRoleDef, ConfigMapDef, ContainerDef, CrdDef, CrdScope,
    DeploymentDef, NamespaceDef, PodDef, PodTemplateDef, ReplicationControllerDef,
    SecretDef, ServiceAccountDef, ServiceDef,
};

/// Conversion of a definition into its cluster schema counterpart.
///
/// `Output::default()` is the zero value submitted in place of an object
/// whose conversion failed.
pub trait Convert {
    type Output: Default;

    fn convert(&self) -> Result<Self::Output, ConversionError>;
}

/// RFC 1123 label: namespaces, container names.
pub fn check_dns_label(s: &str) -> Result<(), &'static str> {
    if s.len() > 63 {
        return Err("must be <= 63 characters");
    }
    check_dns_chars(s, false)
}

/// RFC 1035 label: service names. Same as an RFC 1123 label, but the first
/// character has to be a letter.
pub fn check_dns_1035_label(s: &str) -> Result<(), &'static str> {
    check_dns_label(s)?;
    if !s.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err("must start with a lowercase letter");
    }
    Ok(())
}

/// RFC 1123 subdomain: most other object names.
pub fn check_dns_subdomain(s: &str) -> Result<(), &'static str> {
    if s.len() > 253 {
        return Err("must be <= 253 characters");
    }
    check_dns_chars(s, true)
}

fn check_dns_chars(s: &str, allow_dots: bool) -> Result<(), &'static str> {
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let (Some(first), Some(last)) = (s.chars().next(), s.chars().last()) else {
        return Err("cannot be an empty string");
    };
    if !s
        .chars()
        .all(|c| alnum(c) || c == '-' || (allow_dots && c == '.'))
    {
        return Err("must contain only lowercase alphanumeric characters, '-' or '.'");
    }
    if !alnum(first) {
        return Err("must start with an alphanumeric character");
    }
    if !alnum(last) {
        return Err("must end with an alphanumeric character");
    }
    Ok(())
}

fn label_name(name: &str) -> Result<(), ConversionError> {
    check_dns_label(name).map_err(|reason| ConversionError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn service_name(name: &str) -> Result<(), ConversionError> {
    check_dns_1035_label(name).map_err(|reason| ConversionError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn subdomain_name(name: &str) -> Result<(), ConversionError> {
    check_dns_subdomain(name).map_err(|reason| ConversionError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    (!items.is_empty()).then(|| items.to_vec())
}

fn non_empty_map<V: Clone>(map: &BTreeMap<String, V>) -> Option<BTreeMap<String, V>> {
    (!map.is_empty()).then(|| map.clone())
}

fn metadata(
    name: &str,
    namespace: Option<&str>,
    labels: &BTreeMap<String, String>,
    annotations: &BTreeMap<String, String>,
) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        labels: non_empty_map(labels),
        annotations: non_empty_map(annotations),
        ..Default::default()
    }
}

fn check_port(owner: &str, port: i32) -> Result<(), ConversionError> {
    if (1..=65535).contains(&port) {
        Ok(())
    } else {
        Err(ConversionError::InvalidPort {
            owner: owner.to_string(),
            port,
        })
    }
}

fn decode_all(
    encoded: &BTreeMap<String, String>,
) -> Result<Option<BTreeMap<String, ByteString>>, ConversionError> {
    let mut decoded = BTreeMap::new();
    for (key, value) in encoded {
        let bytes = STANDARD
            .decode(value)
            .map_err(|source| ConversionError::InvalidBase64 {
                key: key.clone(),
                source,
            })?;
        decoded.insert(key.clone(), ByteString(bytes));
    }
    Ok((!decoded.is_empty()).then_some(decoded))
}

impl Convert for NamespaceDef {
    type Output = Namespace;

    fn convert(&self) -> Result<Namespace, ConversionError> {
        label_name(&self.name)?;
        Ok(Namespace {
            metadata: metadata(&self.name, None, &self.labels, &self.annotations),
            ..Default::default()
        })
    }
}

impl Convert for CrdDef {
    type Output = CustomResourceDefinition;

    fn convert(&self) -> Result<CustomResourceDefinition, ConversionError> {
        if self.group.is_empty() {
            return Err(ConversionError::MissingField("group".to_string()));
        }
        if self.names.plural.is_empty() {
            return Err(ConversionError::MissingField("names.plural".to_string()));
        }
        if self.names.kind.is_empty() {
            return Err(ConversionError::MissingField("names.kind".to_string()));
        }
        let expected = format!("{}.{}", self.names.plural, self.group);
        if self.name != expected {
            return Err(ConversionError::Invalid(format!(
                "custom resource definition name must be {expected:?}, got {:?}",
                self.name
            )));
        }
        subdomain_name(&self.name)?;
        if self.versions.is_empty() {
            return Err(ConversionError::MissingField("versions".to_string()));
        }
        let storage_versions = self.versions.iter().filter(|v| v.storage).count();
        if storage_versions != 1 {
            return Err(ConversionError::Invalid(format!(
                "exactly one version must be marked as storage, found {storage_versions}"
            )));
        }

        let mut versions = Vec::with_capacity(self.versions.len());
        for version in &self.versions {
            let schema = match &version.schema {
                Some(value) => serde_json::from_value::<JSONSchemaProps>(value.clone())
                    .map_err(|source| ConversionError::InvalidSchema {
                        version: version.name.clone(),
                        source,
                    })?,
                None => JSONSchemaProps {
                    type_: Some("object".to_string()),
                    x_kubernetes_preserve_unknown_fields: Some(true),
                    ..Default::default()
                },
            };
            versions.push(CustomResourceDefinitionVersion {
                name: version.name.clone(),
                served: version.served,
                storage: version.storage,
                schema: Some(CustomResourceValidation {
                    open_api_v3_schema: Some(schema),
                }),
                ..Default::default()
            });
        }

        let scope = match self.scope {
            CrdScope::Namespaced => "Namespaced",
            CrdScope::Cluster => "Cluster",
        };

        Ok(CustomResourceDefinition {
            metadata: metadata(&self.name, None, &self.labels, &self.annotations),
            spec: CustomResourceDefinitionSpec {
                group: self.group.clone(),
                names: CustomResourceDefinitionNames {
                    plural: self.names.plural.clone(),
                    singular: self.names.singular.clone(),
                    kind: self.names.kind.clone(),
                    short_names: non_empty(&self.names.short_names),
                    ..Default::default()
                },
                scope: scope.to_string(),
                versions,
                ..Default::default()
            },
            status: None,
        })
    }
}

impl Convert for ServiceAccountDef {
    type Output = ServiceAccount;

    fn convert(&self) -> Result<ServiceAccount, ConversionError> {
        subdomain_name(&self.name)?;
        let image_pull_secrets = self
            .image_pull_secrets
            .iter()
            .map(|name| LocalObjectReference {
                name: Some(name.clone()),
            })
            .collect::<Vec<_>>();
        Ok(ServiceAccount {
            metadata: metadata(
                &self.name,
                self.namespace.as_deref(),
                &self.labels,
                &self.annotations,
            ),
            automount_service_account_token: self.automount_token,
            image_pull_secrets: non_empty(&image_pull_secrets),
            ..Default::default()
        })
    }
}

impl Convert for ClusterRoleDef {
    type Output = ClusterRole;

    fn convert(&self) -> Result<ClusterRole, ConversionError> {
        subdomain_name(&self.name)?;
        let mut rules = Vec::with_capacity(self.rules.len());
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.verbs.is_empty() {
                return Err(ConversionError::MissingField(format!("rules[{i}].verbs")));
            }
            rules.push(PolicyRule {
                api_groups: Some(rule.api_groups.clone()),
                resources: non_empty(&rule.resources),
                resource_names: non_empty(&rule.resource_names),
                verbs: rule.verbs.clone(),
                ..Default::default()
            });
        }
        Ok(ClusterRole {
            metadata: metadata(&self.name, None, &self.labels, &self.annotations),
            rules: Some(rules),
            ..Default::default()
        })
    }
}

impl Convert for ClusterRoleBindingDef {
    type Output = ClusterRoleBinding;

    fn convert(&self) -> Result<ClusterRoleBinding, ConversionError> {
        subdomain_name(&self.name)?;
        if self.role.is_empty() {
            return Err(ConversionError::MissingField("role".to_string()));
        }
        let mut subjects = Vec::with_capacity(self.subjects.len());
        for subject in &self.subjects {
            let api_group = match subject.kind.as_str() {
                "User" | "Group" => Some("rbac.authorization.k8s.io".to_string()),
                "ServiceAccount" if subject.namespace.is_some() => None,
                "ServiceAccount" => {
                    return Err(ConversionError::Invalid(format!(
                        "service account subject {} needs a namespace",
                        subject.name
                    )))
                }
                other => {
                    return Err(ConversionError::Invalid(format!(
                        "unknown subject kind {other:?}"
                    )))
                }
            };
            subjects.push(Subject {
                api_group,
                kind: subject.kind.clone(),
                name: subject.name.clone(),
                namespace: subject.namespace.clone(),
            });
        }
        Ok(ClusterRoleBinding {
            metadata: metadata(&self.name, None, &self.labels, &self.annotations),
            role_ref: RoleRef {
                api_group: "rbac.authorization.k8s.io".to_string(),
                kind: "ClusterRole".to_string(),
                name: self.role.clone(),
            },
            subjects: Some(subjects),
        })
    }
}

impl Convert for ConfigMapDef {
    type Output = ConfigMap;

    fn convert(&self) -> Result<ConfigMap, ConversionError> {
        subdomain_name(&self.name)?;
        Ok(ConfigMap {
            metadata: metadata(
                &self.name,
                self.namespace.as_deref(),
                &self.labels,
                &self.annotations,
            ),
            data: non_empty_map(&self.data),
            binary_data: decode_all(&self.binary_data)?,
            ..Default::default()
        })
    }
}

impl Convert for SecretDef {
    type Output = Secret;

    fn convert(&self) -> Result<Secret, ConversionError> {
        subdomain_name(&self.name)?;
        Ok(Secret {
            metadata: metadata(
                &self.name,
                self.namespace.as_deref(),
                &self.labels,
                &self.annotations,
            ),
            type_: self.type_.clone(),
            data: decode_all(&self.data)?,
            string_data: non_empty_map(&self.string_data),
            ..Default::default()
        })
    }
}

impl Convert for ContainerDef {
    type Output = Container;

    fn convert(&self) -> Result<Container, ConversionError> {
        label_name(&self.name)?;
        let image = self
            .image
            .clone()
            .ok_or_else(|| ConversionError::MissingField(format!("{}.image", self.name)))?;

        let mut ports = Vec::with_capacity(self.ports.len());
        for port in &self.ports {
            check_port(&self.name, port.container_port)?;
            ports.push(ContainerPort {
                name: port.name.clone(),
                container_port: port.container_port,
                protocol: port.protocol.clone(),
                ..Default::default()
            });
        }

        let env = self
            .env
            .iter()
            .map(|(name, value)| EnvVar {
                name: name.clone(),
                value: Some(value.clone()),
                ..Default::default()
            })
            .collect::<Vec<_>>();

        Ok(Container {
            name: self.name.clone(),
            image: Some(image),
            command: non_empty(&self.command),
            args: non_empty(&self.args),
            env: non_empty(&env),
            ports: non_empty(&ports),
            image_pull_policy: self.image_pull_policy.clone(),
            ..Default::default()
        })
    }
}

fn containers(defs: &[ContainerDef]) -> Result<Vec<Container>, ConversionError> {
    if defs.is_empty() {
        return Err(ConversionError::MissingField("containers".to_string()));
    }
    defs.iter().map(ContainerDef::convert).collect()
}

/// Template plus the selector a controller uses to find its pods.
fn template_and_selector(
    namespace: Option<&str>,
    selector: &BTreeMap<String, String>,
    template: &PodTemplateDef,
) -> Result<(BTreeMap<String, String>, PodTemplateSpec), ConversionError> {
    let selector = if selector.is_empty() {
        template.labels.clone()
    } else {
        selector.clone()
    };
    if selector.is_empty() {
        return Err(ConversionError::MissingField("template.labels".to_string()));
    }
    if let Some((key, value)) = selector
        .iter()
        .find(|&(k, v)| template.labels.get(k) != Some(v))
    {
        return Err(ConversionError::Invalid(format!(
            "selector {key}={value} does not match the pod template labels"
        )));
    }

    let spec = PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: non_empty_map(&template.labels),
            annotations: non_empty_map(&template.annotations),
            namespace: namespace.map(str::to_string),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            containers: containers(&template.containers)?,
            service_account_name: template.service_account.clone(),
            ..Default::default()
        }),
    };
    Ok((selector, spec))
}

impl Convert for PodDef {
    type Output = Pod;

    fn convert(&self) -> Result<Pod, ConversionError> {
        subdomain_name(&self.name)?;
        Ok(Pod {
            metadata: metadata(
                &self.name,
                self.namespace.as_deref(),
                &self.labels,
                &self.annotations,
            ),
            spec: Some(PodSpec {
                containers: containers(&self.containers)?,
                service_account_name: self.service_account.clone(),
                restart_policy: self.restart_policy.clone(),
                ..Default::default()
            }),
            status: None,
        })
    }
}

impl Convert for ReplicationControllerDef {
    type Output = ReplicationController;

    fn convert(&self) -> Result<ReplicationController, ConversionError> {
        subdomain_name(&self.name)?;
        let (selector, template) =
            template_and_selector(self.namespace.as_deref(), &self.selector, &self.template)?;
        Ok(ReplicationController {
            metadata: metadata(
                &self.name,
                self.namespace.as_deref(),
                &self.labels,
                &self.annotations,
            ),
            spec: Some(ReplicationControllerSpec {
                replicas: self.replicas,
                selector: Some(selector),
                template: Some(template),
                ..Default::default()
            }),
            status: None,
        })
    }
}

impl Convert for DeploymentDef {
    type Output = Deployment;

    fn convert(&self) -> Result<Deployment, ConversionError> {
        subdomain_name(&self.name)?;
        let (selector, template) =
            template_and_selector(self.namespace.as_deref(), &self.selector, &self.template)?;
        Ok(Deployment {
            metadata: metadata(
                &self.name,
                self.namespace.as_deref(),
                &self.labels,
                &self.annotations,
            ),
            spec: Some(DeploymentSpec {
                replicas: self.replicas,
                selector: LabelSelector {
                    match_labels: Some(selector),
                    match_expressions: None,
                },
                template,
                ..Default::default()
            }),
            status: None,
        })
    }
}

impl Convert for ServiceDef {
    type Output = Service;

    fn convert(&self) -> Result<Service, ConversionError> {
        service_name(&self.name)?;
        let mut ports = Vec::with_capacity(self.ports.len());
        for port in &self.ports {
            check_port(&self.name, port.port)?;
            if let Some(target) = port.target_port {
                check_port(&self.name, target)?;
            }
            ports.push(ServicePort {
                name: port.name.clone(),
                port: port.port,
                target_port: port.target_port.map(IntOrString::Int),
                protocol: port.protocol.clone(),
                ..Default::default()
            });
        }
        Ok(Service {
            metadata: metadata(
                &self.name,
                self.namespace.as_deref(),
                &self.labels,
                &self.annotations,
            ),
            spec: Some(ServiceSpec {
                type_: self.type_.clone(),
                selector: non_empty_map(&self.selector),
                ports: non_empty(&ports),
                ..Default::default()
            }),
            status: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::resources::{CrdNames, CrdVersion, SubjectDef};

    fn container(name: &str) -> ContainerDef {
        ContainerDef {
            name: name.to_string(),
            image: Some("nginx:1.25".to_string()),
            ..Default::default()
        }
    }

    fn widgets() -> CrdDef {
        CrdDef {
            name: "widgets.example.com".to_string(),
            group: "example.com".to_string(),
            names: CrdNames {
                plural: "widgets".to_string(),
                kind: "Widget".to_string(),
                ..Default::default()
            },
            versions: vec![CrdVersion {
                name: "v1".to_string(),
                served: true,
                storage: true,
                schema: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn dns_names() {
        assert!(check_dns_label("web-1").is_ok());
        assert!(check_dns_label("web.1").is_err());
        assert!(check_dns_subdomain("widgets.example.com").is_ok());
        assert!(check_dns_subdomain("").is_err());
        assert!(check_dns_subdomain("Widgets").is_err());
        assert!(check_dns_subdomain(".lead").is_err());
        assert!(check_dns_subdomain(&"a".repeat(254)).is_err());
        assert!(check_dns_1035_label("web-1").is_ok());
        assert!(check_dns_1035_label("1web").is_err());
        assert!(check_dns_1035_label("-web").is_err());
    }

    #[test]
    fn namespace_keeps_labels_and_annotations() {
        let ns = NamespaceDef {
            name: "apps".to_string(),
            labels: [("team".to_string(), "a".to_string())].into(),
            annotations: [("owner".to_string(), "team-a".to_string())].into(),
        }
        .convert()
        .unwrap();
        assert_eq!(ns.metadata.name.as_deref(), Some("apps"));
        assert_eq!(ns.metadata.labels.unwrap()["team"], "a");
        assert_eq!(ns.metadata.annotations.unwrap()["owner"], "team-a");
        assert!(ns.metadata.namespace.is_none());

        let bare = NamespaceDef {
            name: "apps".to_string(),
            ..Default::default()
        }
        .convert()
        .unwrap();
        assert!(bare.metadata.labels.is_none());
        assert!(bare.metadata.annotations.is_none());
    }

    #[test]
    fn annotations_reach_every_kind() {
        let annotations: BTreeMap<String, String> =
            [("prometheus.io/scrape".to_string(), "true".to_string())].into();

        let cm = ConfigMapDef {
            name: "settings".to_string(),
            namespace: Some("apps".to_string()),
            annotations: annotations.clone(),
            ..Default::default()
        }
        .convert()
        .unwrap();
        assert_eq!(cm.metadata.annotations.as_ref(), Some(&annotations));

        let svc = ServiceDef {
            name: "web".to_string(),
            annotations: annotations.clone(),
            ..Default::default()
        }
        .convert()
        .unwrap();
        assert_eq!(svc.metadata.annotations.as_ref(), Some(&annotations));

        let role = ClusterRoleDef {
            name: "view-widgets".to_string(),
            annotations: annotations.clone(),
            ..Default::default()
        }
        .convert()
        .unwrap();
        assert_eq!(role.metadata.annotations.as_ref(), Some(&annotations));

        let mut crd = widgets();
        crd.annotations = annotations.clone();
        let crd = crd.convert().unwrap();
        assert_eq!(crd.metadata.annotations.as_ref(), Some(&annotations));
    }

    #[test]
    fn crd_defaults_to_open_schema() {
        let crd = widgets().convert().unwrap();
        assert_eq!(crd.spec.scope, "Namespaced");
        let schema = crd.spec.versions[0]
            .schema
            .as_ref()
            .and_then(|s| s.open_api_v3_schema.as_ref())
            .unwrap();
        assert_eq!(schema.type_.as_deref(), Some("object"));
        assert_eq!(schema.x_kubernetes_preserve_unknown_fields, Some(true));
    }

    #[test]
    fn crd_with_explicit_schema() {
        let mut def = widgets();
        def.versions[0].schema = Some(json!({
            "type": "object",
            "properties": { "spec": { "type": "object" } }
        }));
        let crd = def.convert().unwrap();
        let schema = crd.spec.versions[0]
            .schema
            .as_ref()
            .and_then(|s| s.open_api_v3_schema.as_ref())
            .unwrap();
        assert!(schema.properties.as_ref().unwrap().contains_key("spec"));
    }

    #[test]
    fn crd_rejections() {
        let mut def = widgets();
        def.name = "gadgets.example.com".to_string();
        assert!(matches!(def.convert(), Err(ConversionError::Invalid(_))));

        let mut def = widgets();
        def.versions.clear();
        assert!(matches!(def.convert(), Err(ConversionError::MissingField(f)) if f == "versions"));

        let mut def = widgets();
        def.versions[0].storage = false;
        assert!(matches!(def.convert(), Err(ConversionError::Invalid(_))));

        let mut def = widgets();
        def.versions[0].schema = Some(json!({ "type": 7 }));
        assert!(matches!(
            def.convert(),
            Err(ConversionError::InvalidSchema { version, .. }) if version == "v1"
        ));
    }

    #[test]
    fn binding_subjects() {
        let mut def = ClusterRoleBindingDef {
            name: "reader".to_string(),
            role: "view".to_string(),
            subjects: vec![
                SubjectDef {
                    kind: "ServiceAccount".to_string(),
                    name: "agent".to_string(),
                    namespace: Some("apps".to_string()),
                },
                SubjectDef {
                    kind: "Group".to_string(),
                    name: "devs".to_string(),
                    namespace: None,
                },
            ],
            ..Default::default()
        };
        let crb = def.convert().unwrap();
        assert_eq!(crb.role_ref.kind, "ClusterRole");
        let subjects = crb.subjects.unwrap();
        assert_eq!(subjects[0].api_group, None);
        assert_eq!(subjects[1].api_group.as_deref(), Some("rbac.authorization.k8s.io"));

        def.subjects[0].namespace = None;
        assert!(matches!(def.convert(), Err(ConversionError::Invalid(_))));

        def.subjects[0].kind = "Robot".to_string();
        assert!(matches!(def.convert(), Err(ConversionError::Invalid(_))));
    }

    #[test]
    fn cluster_role_needs_verbs() {
        let def = ClusterRoleDef {
            name: "view-widgets".to_string(),
            rules: vec![Default::default()],
            ..Default::default()
        };
        assert!(matches!(
            def.convert(),
            Err(ConversionError::MissingField(f)) if f == "rules[0].verbs"
        ));
    }

    #[test]
    fn config_map_and_secret_decode_base64() {
        let cm = ConfigMapDef {
            name: "settings".to_string(),
            namespace: Some("apps".to_string()),
            data: [("mode".to_string(), "fast".to_string())].into(),
            binary_data: [("blob".to_string(), "aGVsbG8=".to_string())].into(),
            ..Default::default()
        }
        .convert()
        .unwrap();
        assert_eq!(cm.metadata.namespace.as_deref(), Some("apps"));
        assert_eq!(cm.binary_data.unwrap()["blob"].0, b"hello");

        let err = SecretDef {
            name: "token".to_string(),
            data: [("key".to_string(), "not base64!".to_string())].into(),
            ..Default::default()
        }
        .convert()
        .unwrap_err();
        assert!(matches!(err, ConversionError::InvalidBase64 { key, .. } if key == "key"));
    }

    #[test]
    fn pod_requires_image_and_containers() {
        let mut pod = PodDef {
            name: "worker".to_string(),
            containers: vec![container("main")],
            ..Default::default()
        };
        let converted = pod.convert().unwrap();
        assert_eq!(
            converted.spec.unwrap().containers[0].image.as_deref(),
            Some("nginx:1.25")
        );

        pod.containers[0].image = None;
        assert!(matches!(
            pod.convert(),
            Err(ConversionError::MissingField(f)) if f == "main.image"
        ));

        pod.containers.clear();
        assert!(matches!(
            pod.convert(),
            Err(ConversionError::MissingField(f)) if f == "containers"
        ));
    }

    #[test]
    fn deployment_selector_defaults_to_template_labels() {
        let labels: BTreeMap<String, String> = [("app".to_string(), "web".to_string())].into();
        let mut def = DeploymentDef {
            name: "web".to_string(),
            namespace: Some("apps".to_string()),
            replicas: Some(2),
            template: PodTemplateDef {
                labels: labels.clone(),
                annotations: [("checksum/config".to_string(), "abc".to_string())].into(),
                containers: vec![container("web")],
                service_account: Some("web".to_string()),
            },
            ..Default::default()
        };
        let deploy = def.convert().unwrap();
        let spec = deploy.spec.unwrap();
        assert_eq!(spec.selector.match_labels, Some(labels));
        assert_eq!(spec.replicas, Some(2));
        let template_meta = spec.template.metadata.unwrap();
        assert_eq!(template_meta.annotations.unwrap()["checksum/config"], "abc");
        assert_eq!(
            spec.template.spec.unwrap().service_account_name.as_deref(),
            Some("web")
        );

        def.selector = [("app".to_string(), "api".to_string())].into();
        assert!(matches!(def.convert(), Err(ConversionError::Invalid(_))));
    }

    #[test]
    fn replication_controller_needs_labels() {
        let def = ReplicationControllerDef {
            name: "legacy".to_string(),
            template: PodTemplateDef {
                containers: vec![container("legacy")],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            def.convert(),
            Err(ConversionError::MissingField(f)) if f == "template.labels"
        ));
    }

    #[test]
    fn service_ports() {
        let mut def = ServiceDef {
            name: "web".to_string(),
            selector: [("app".to_string(), "web".to_string())].into(),
            ports: vec![crate::resources::ServicePortDef {
                port: 80,
                target_port: Some(8080),
                ..Default::default()
            }],
            ..Default::default()
        };
        let svc = def.convert().unwrap();
        let port = &svc.spec.unwrap().ports.unwrap()[0];
        assert_eq!(port.target_port, Some(IntOrString::Int(8080)));

        def.ports[0].port = 70000;
        assert!(matches!(
            def.convert(),
            Err(ConversionError::InvalidPort { port: 70000, .. })
        ));
    }

    #[test]
    fn service_name_must_start_with_letter() {
        let def = ServiceDef {
            name: "1web".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            def.convert(),
            Err(ConversionError::InvalidName { name, .. }) if name == "1web"
        ));

        // digits are fine at the front of other names
        let cm = ConfigMapDef {
            name: "1web".to_string(),
            ..Default::default()
        };
        assert!(cm.convert().is_ok());
    }
}
