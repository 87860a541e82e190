//! fluent-cdk AWS builders
//!
//! One entry point per construct, each returning a [`Builder`] over the
//! construct's configuration type:
//!
//! - [`app_runner_service`] for App Runner services
//! - [`bastion_host`] for EC2 bastion hosts
//! - [`lambda_permission`] for Lambda permissions
//! - [`bucket_metrics`] for S3 bucket metrics configurations

pub mod app_runner;
pub mod bastion;
pub mod ec2;
pub mod lambda_permission;
pub mod refs;
pub mod s3_metrics;

use fluent_cdk_core::Builder;

pub use app_runner::ServiceConfig;
pub use bastion::BastionConfig;
pub use lambda_permission::PermissionConfig;
pub use refs::{Principal, RoleRef, SecurityGroupRef, VpcRef};
pub use s3_metrics::MetricsConfig;

pub fn app_runner_service(name: impl Into<String>) -> Builder<ServiceConfig> {
    Builder::new(name)
}

pub fn bastion_host(name: impl Into<String>) -> Builder<BastionConfig> {
    Builder::new(name)
}

pub fn lambda_permission(name: impl Into<String>) -> Builder<PermissionConfig> {
    Builder::new(name)
}

pub fn bucket_metrics(name: impl Into<String>) -> Builder<MetricsConfig> {
    Builder::new(name)
}
