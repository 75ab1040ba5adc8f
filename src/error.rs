//! Error taxonomy and the aggregated reports handed back to callers.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::kind::ResourceKind;

/// Why a definition could not be turned into a cluster object.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("missing required field {0}")]
    MissingField(String),

    #[error("port {port} of {owner} is outside 1..=65535")]
    InvalidPort { owner: String, port: i32 },

    #[error("value of {key:?} is not valid base64: {source}")]
    InvalidBase64 {
        key: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("invalid schema for version {version}: {source}")]
    InvalidSchema {
        version: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

/// A single failed item within a deploy pass.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to convert {kind} {name}: {source}")]
    Conversion {
        kind: ResourceKind,
        name: String,
        #[source]
        source: ConversionError,
    },

    #[error("failed to create {kind} {name}: {source}")]
    Create {
        kind: ResourceKind,
        name: String,
        #[source]
        source: kube::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Error::Conversion { kind, .. } | Error::Create { kind, .. } => *kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Error::Conversion { name, .. } | Error::Create { name, .. } => name,
        }
    }
}

/// Every failure of one `Deployer::run`, grouped by kind.
///
/// A kind only appears when at least one of its items failed.
#[derive(Debug, Default)]
pub struct DeployErrors {
    errors: BTreeMap<ResourceKind, Vec<Error>>,
}

impl DeployErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: Error) {
        self.errors.entry(err.kind()).or_default().push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors recorded for `kind`, empty if the kind deployed cleanly.
    pub fn get(&self, kind: ResourceKind) -> &[Error] {
        self.errors.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Kinds with at least one failure, in deploy order.
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.errors.keys().copied()
    }

    /// Total number of recorded errors across all kinds.
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> BTreeMap<ResourceKind, Vec<Error>> {
        self.errors
    }

    /// `Ok` when nothing failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for DeployErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} error(s) while deploying {} resource kind(s)",
            self.len(),
            self.errors.len()
        )?;
        for (kind, errs) in &self.errors {
            write!(f, "\n  {kind}:")?;
            for err in errs {
                write!(f, "\n    - {err}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for DeployErrors {}

/// Errors raised by running controllers, keyed by controller name, in arrival order.
#[derive(Debug, Default)]
pub struct ControllerErrors {
    errors: BTreeMap<String, Vec<anyhow::Error>>,
}

impl ControllerErrors {
    pub fn push(&mut self, name: String, err: anyhow::Error) {
        self.errors.entry(name).or_default().push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, name: &str) -> &[anyhow::Error] {
        self.errors.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<anyhow::Error>> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "already exists".to_string(),
            reason: "AlreadyExists".to_string(),
            code,
        })
    }

    #[test]
    fn empty_report_is_success() {
        assert!(DeployErrors::new().into_result().is_ok());
    }

    #[test]
    fn report_groups_by_kind() {
        let mut report = DeployErrors::new();
        report.push(Error::Create {
            kind: ResourceKind::Service,
            name: "web".to_string(),
            source: api_error(409),
        });
        report.push(Error::Conversion {
            kind: ResourceKind::CustomResourceDefinition,
            name: "widgets.example.com".to_string(),
            source: ConversionError::MissingField("versions".to_string()),
        });
        report.push(Error::Create {
            kind: ResourceKind::CustomResourceDefinition,
            name: "widgets.example.com".to_string(),
            source: api_error(422),
        });

        assert_eq!(report.len(), 3);
        assert_eq!(
            report.kinds().collect::<Vec<_>>(),
            [ResourceKind::CustomResourceDefinition, ResourceKind::Service]
        );
        assert_eq!(report.get(ResourceKind::CustomResourceDefinition).len(), 2);
        assert!(report.get(ResourceKind::Pod).is_empty());

        let text = report.to_string();
        assert!(text.starts_with("3 error(s) while deploying 2 resource kind(s)"));
        assert!(text.contains("failed to convert custom resource definition widgets.example.com"));
        assert!(text.contains("failed to create service web"));

        let err = report.into_result().unwrap_err();
        assert_eq!(err.into_inner().len(), 2);
    }

    #[test]
    fn controller_errors_keep_arrival_order() {
        let mut report = ControllerErrors::default();
        report.push("sync".to_string(), anyhow::anyhow!("first"));
        report.push("gc".to_string(), anyhow::anyhow!("other"));
        report.push("sync".to_string(), anyhow::anyhow!("second"));

        let sync: Vec<String> = report.get("sync").iter().map(|e| e.to_string()).collect();
        assert_eq!(sync, ["first", "second"]);
        assert_eq!(report.names().collect::<Vec<_>>(), ["gc", "sync"]);
        assert!(report.get("missing").is_empty());
    }
}
