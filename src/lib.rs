//! Deploys a fixed set of cluster resources in dependency order and runs
//! auxiliary controllers once they are in place.
//!
//! Definitions are added to a [`Deployer`], converted to `k8s-openapi`
//! objects and created one kind at a time. Failures never stop a run; they
//! are collected per kind into a [`DeployErrors`] report.

pub mod bundle;
pub mod client;
pub mod config;
pub mod controller;
pub mod convert;
pub mod deployer;
pub mod error;
pub mod kind;
pub mod resources;
pub mod store;

pub use client::{ClusterClient, ClusterObject, CreateSettings, KubeClusterClient};
pub use controller::Controller;
pub use deployer::{ConversionFailurePolicy, Deployer, DEPLOY_STAGES};
pub use error::{ControllerErrors, DeployErrors, Error};
pub use kind::ResourceKind;
