//! Manifest - JSON description of resources as lists of fragments
//!
//! ```json
//! {
//!   "resources": [
//!     { "type": "bucket_metrics", "name": "entire", "fragments": [ { "id": "EntireBucket" } ] }
//!   ]
//! }
//! ```
//!
//! Fragments are merged in the order they appear, so the first fragment to set
//! a field wins.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use fluent_cdk_aws::{
    BastionConfig, MetricsConfig, PermissionConfig, ServiceConfig, app_runner_service,
    bastion_host, bucket_metrics, lambda_permission,
};
use fluent_cdk_core::{BuildError, HandleError, Resource, Spec};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub resources: Vec<ResourceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ResourceEntry {
    AppRunnerService {
        name: String,
        #[serde(default)]
        fragments: Vec<ServiceConfig>,
    },
    BastionHost {
        name: String,
        #[serde(default)]
        fragments: Vec<BastionConfig>,
    },
    LambdaPermission {
        name: String,
        #[serde(default)]
        fragments: Vec<PermissionConfig>,
    },
    BucketMetrics {
        name: String,
        #[serde(default)]
        fragments: Vec<MetricsConfig>,
    },
}

impl ResourceEntry {
    pub fn name(&self) -> &str {
        match self {
            ResourceEntry::AppRunnerService { name, .. }
            | ResourceEntry::BastionHost { name, .. }
            | ResourceEntry::LambdaPermission { name, .. }
            | ResourceEntry::BucketMetrics { name, .. } => name,
        }
    }

    pub fn build(self) -> Result<BuiltSpec, BuildError> {
        match self {
            ResourceEntry::AppRunnerService { name, fragments } => app_runner_service(name)
                .fragments(fragments)
                .build()
                .map(BuiltSpec::AppRunnerService),
            ResourceEntry::BastionHost { name, fragments } => bastion_host(name)
                .fragments(fragments)
                .build()
                .map(BuiltSpec::BastionHost),
            ResourceEntry::LambdaPermission { name, fragments } => lambda_permission(name)
                .fragments(fragments)
                .build()
                .map(BuiltSpec::LambdaPermission),
            ResourceEntry::BucketMetrics { name, fragments } => bucket_metrics(name)
                .fragments(fragments)
                .build()
                .map(BuiltSpec::BucketMetrics),
        }
    }
}

/// A finalized spec of any supported kind
#[derive(Debug)]
pub enum BuiltSpec {
    AppRunnerService(Spec<ServiceConfig>),
    BastionHost(Spec<BastionConfig>),
    LambdaPermission(Spec<PermissionConfig>),
    BucketMetrics(Spec<MetricsConfig>),
}

macro_rules! with_spec {
    ($built:expr, $spec:ident => $body:expr) => {
        match $built {
            BuiltSpec::AppRunnerService($spec) => $body,
            BuiltSpec::BastionHost($spec) => $body,
            BuiltSpec::LambdaPermission($spec) => $body,
            BuiltSpec::BucketMetrics($spec) => $body,
        }
    };
}

impl BuiltSpec {
    pub fn kind(&self) -> &'static str {
        with_spec!(self, spec => spec.kind())
    }

    pub fn name(&self) -> &str {
        with_spec!(self, spec => spec.name())
    }

    /// `{ "Type", "ConstructId", "Properties" }` for this resource
    pub fn synth(&self) -> Result<Value, String> {
        with_spec!(self, spec => synth_spec(spec))
    }

    /// Fill the live handle from a deployment outputs entry
    pub fn back_fill(&mut self, outputs: Value) -> Result<(), String> {
        with_spec!(self, spec => back_fill_spec(spec, outputs))
    }

    pub fn live(&self) -> Result<Value, HandleError> {
        with_spec!(self, spec => live_spec(spec))
    }
}

fn synth_spec<C: Resource>(spec: &Spec<C>) -> Result<Value, String> {
    let properties = serde_json::to_value(spec.props())
        .map_err(|e| format!("{}.{}: {}", spec.kind(), spec.name(), e))?;
    Ok(json!({
        "Type": spec.kind(),
        "ConstructId": spec.construct_id(),
        "Properties": properties,
    }))
}

fn back_fill_spec<C: Resource>(spec: &mut Spec<C>, outputs: Value) -> Result<(), String> {
    let handle: C::Handle = serde_json::from_value(outputs).map_err(|e| {
        format!(
            "{}.{}: invalid outputs entry: {}",
            spec.kind(),
            spec.name(),
            e
        )
    })?;
    spec.mark_created(handle).map_err(|e| e.to_string())
}

fn live_spec<C: Resource>(spec: &Spec<C>) -> Result<Value, HandleError> {
    let handle = spec.live()?;
    // Handles are plain string records; serialization cannot fail.
    Ok(serde_json::to_value(handle).unwrap_or(Value::Null))
}

/// Read and parse a manifest file
pub fn load(path: &Path) -> Result<Manifest, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Parse error in {}: {}", path.display(), e))
}

/// Build every resource, collecting all errors
///
/// Resource names key the synth output and the outputs file, so a name may
/// appear only once.
pub fn build_all(manifest: Manifest) -> Result<Vec<BuiltSpec>, String> {
    let mut specs = Vec::new();
    let mut all_errors = Vec::new();
    let mut seen = HashSet::new();

    for entry in manifest.resources {
        if !seen.insert(entry.name().to_string()) {
            all_errors.push(format!("Duplicate resource name '{}'", entry.name()));
            continue;
        }
        match entry.build() {
            Ok(spec) => specs.push(spec),
            Err(e) => all_errors.push(e.to_string()),
        }
    }

    if all_errors.is_empty() {
        Ok(specs)
    } else {
        Err(all_errors.join("\n"))
    }
}

/// Read a deployment outputs file: resource name -> live attributes
pub fn load_outputs(path: &Path) -> Result<HashMap<String, Value>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Parse error in {}: {}", path.display(), e))
}
