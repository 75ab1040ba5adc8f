use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{ClusterClient, ClusterObject};
use crate::controller::{Controller, ControllerSet};
use crate::error::{ControllerErrors, DeployErrors, Error};
use crate::kind::ResourceKind;
use crate::resources::{
    ClusterRoleBindingDef, ClusterRoleDef, ConfigMapDef, CrdDef, DeploymentDef, NamespaceDef,
    PodDef, ReplicationControllerDef, SecretDef, ServiceAccountDef, ServiceDef,
};
use crate::store::{convert_all, Converted, ResourceStore, Stored};

/// What happens to a resource whose definition failed to convert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConversionFailurePolicy {
    /// Record the error, then submit the empty object of that kind anyway.
    #[default]
    Submit,
    /// Record the error and move on to the next resource.
    Skip,
}

/// One deploy pass: the kind it handles and how to convert its definitions.
#[derive(Clone, Copy)]
pub struct DeployStage {
    pub kind: ResourceKind,
    convert: fn(&ResourceStore) -> Vec<Converted>,
}

const fn stage<D: Stored>() -> DeployStage {
    DeployStage {
        kind: D::KIND,
        convert: convert_all::<D>,
    }
}

/// Deploy order. Namespaces first so namespaced objects have somewhere to
/// go, identities and RBAC before the workloads that run as them, config
/// before the pods that mount it.
pub const DEPLOY_STAGES: [DeployStage; 11] = [
    stage::<NamespaceDef>(),
    stage::<CrdDef>(),
    stage::<ServiceAccountDef>(),
    stage::<ClusterRoleDef>(),
    stage::<ClusterRoleBindingDef>(),
    stage::<ConfigMapDef>(),
    stage::<SecretDef>(),
    stage::<ReplicationControllerDef>(),
    stage::<PodDef>(),
    stage::<DeploymentDef>(),
    stage::<ServiceDef>(),
];

/// Deploys a fixed set of resources to a cluster, then runs any registered controllers.
pub struct Deployer {
    client: Arc<dyn ClusterClient>,
    store: ResourceStore,
    controllers: ControllerSet,
    policy: ConversionFailurePolicy,
}

impl Deployer {
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            client,
            store: ResourceStore::new(),
            controllers: ControllerSet::default(),
            policy: ConversionFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConversionFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Add any definition; equivalent to the matching `add_*` method.
    pub fn add<D: Stored>(&mut self, def: D) {
        self.store.add(def);
    }

    /// Add a namespace. A later namespace with the same name replaces this one.
    pub fn add_namespace(&mut self, def: NamespaceDef) {
        self.store.add(def);
    }

    pub fn add_custom_resource_definition(&mut self, def: CrdDef) {
        self.store.add(def);
    }

    pub fn add_service_account(&mut self, def: ServiceAccountDef) {
        self.store.add(def);
    }

    pub fn add_cluster_role(&mut self, def: ClusterRoleDef) {
        self.store.add(def);
    }

    pub fn add_cluster_role_binding(&mut self, def: ClusterRoleBindingDef) {
        self.store.add(def);
    }

    pub fn add_config_map(&mut self, def: ConfigMapDef) {
        self.store.add(def);
    }

    pub fn add_secret(&mut self, def: SecretDef) {
        self.store.add(def);
    }

    pub fn add_replication_controller(&mut self, def: ReplicationControllerDef) {
        self.store.add(def);
    }

    pub fn add_pod(&mut self, def: PodDef) {
        self.store.add(def);
    }

    pub fn add_deployment(&mut self, def: DeploymentDef) {
        self.store.add(def);
    }

    pub fn add_service(&mut self, def: ServiceDef) {
        self.store.add(def);
    }

    /// Register a controller to be started by [`Deployer::start_controllers`].
    pub fn add_controller(
        &mut self,
        name: impl Into<String>,
        controller: impl Controller + 'static,
    ) {
        self.controllers.insert(name, Arc::new(controller));
    }

    /// Kinds in the order `run` deploys them.
    pub fn stages() -> impl Iterator<Item = ResourceKind> {
        DEPLOY_STAGES.map(|stage| stage.kind).into_iter()
    }

    /// Create every stored resource, one kind at a time.
    ///
    /// All passes run even when earlier ones fail, and a failed item never
    /// stops the rest of its pass. Nothing is rolled back.
    pub async fn run(&self) -> Result<(), DeployErrors> {
        let mut errors = DeployErrors::new();
        for stage in &DEPLOY_STAGES {
            self.deploy_stage(stage, &mut errors).await;
        }
        errors.into_result()
    }

    async fn deploy_stage(&self, stage: &DeployStage, errors: &mut DeployErrors) {
        let kind = stage.kind;
        let converted = (stage.convert)(&self.store);
        debug!(%kind, count = converted.len(), "deploying");

        for (name, result) in converted {
            let object = match result {
                Ok(object) => object,
                Err(source) => {
                    warn!(%kind, %name, error = %source, "conversion failed");
                    errors.push(Error::Conversion {
                        kind,
                        name: name.clone(),
                        source,
                    });
                    match self.policy {
                        ConversionFailurePolicy::Submit => ClusterObject::empty(kind),
                        ConversionFailurePolicy::Skip => continue,
                    }
                }
            };

            info!(%kind, %name, "creating");
            if let Err(source) = self.client.create(&object).await {
                warn!(%kind, %name, error = %source, "create failed");
                errors.push(Error::Create { kind, name, source });
            }
        }
    }

    /// Start every registered controller and collect their failures until
    /// `stop` is cancelled.
    pub async fn start_controllers(&self, stop: CancellationToken) -> ControllerErrors {
        self.controllers.run(stop).await
    }
}
