use std::{fmt::Debug, fmt::Formatter, path::PathBuf, str::FromStr};

use clap::Parser;

use crate::{convert::check_dns_label, deployer::ConversionFailurePolicy};

#[derive(Parser, Debug, Clone)]
#[clap(about = "Create every resource in a bundle, in dependency order")]
pub struct Opts {
    /// Path to the resource bundle (toml)
    #[clap(short, long, env = "DEPLOYER_BUNDLE")]
    pub bundle: PathBuf,

    /// Namespace given to namespaced resources that don't name one.
    #[clap(short, long, env = "DEPLOYER_NAMESPACE", default_value = "default")]
    pub namespace: KubeNamespace,

    /// Ask the apiserver to validate every create without persisting anything.
    #[clap(long, env = "DEPLOYER_DRY_RUN", default_value = "false")]
    pub dry_run: bool,

    /// Field manager recorded on created objects.
    #[clap(long, env = "DEPLOYER_FIELD_MANAGER", default_value = "deployer")]
    pub field_manager: String,

    /// What to do with a resource whose definition fails to convert.
    #[clap(long, value_enum, default_value = "submit")]
    pub on_conversion_error: ConversionFailurePolicy,
}

/// Valid custom namespaces:
///   must not be empty, use "default" instead
///   contain at most 63 characters
///   contain only lowercase alphanumeric characters or '-'
///   start with an alphanumeric character
///   end with an alphanumeric character
///   should not start with 'kube-'
#[derive(Clone, PartialEq, Eq)]
pub struct KubeNamespace(String);

impl KubeNamespace {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for KubeNamespace {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        check_dns_label(s).map_err(|reason| anyhow::anyhow!("namespace {reason}"))?;
        anyhow::ensure!(
            !s.starts_with("kube-"),
            "namespace should not start with 'kube-'"
        );
        Ok(Self(s.to_string()))
    }
}

impl Debug for KubeNamespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
