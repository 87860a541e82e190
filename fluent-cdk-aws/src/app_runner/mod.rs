//! App Runner service builder
//!
//! Materializes the properties of an `AWS::AppRunner::Service`. The source
//! configuration is the only required field.

pub mod presets;

use fluent_cdk_core::error::{BuildError, BuildResult};
use fluent_cdk_core::merge::Merge;
use fluent_cdk_core::{Resource, Tag, Tags};
use serde::{Deserialize, Serialize};

use crate::refs::RoleRef;

pub use presets::{
    InstanceSize, default_health_check, ecr_image_source, ecr_public_image_source,
    instance_size, tcp_health_check,
};

/// Registry the image is pulled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE", deserialize = "snake_case"))]
pub enum ImageRepositoryType {
    Ecr,
    EcrPublic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    deny_unknown_fields,
    rename_all(serialize = "PascalCase", deserialize = "snake_case")
)]
pub struct KeyValuePair {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    default,
    deny_unknown_fields,
    rename_all(serialize = "PascalCase", deserialize = "snake_case")
)]
pub struct ImageConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_command: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runtime_environment_variables: Vec<KeyValuePair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    deny_unknown_fields,
    rename_all(serialize = "PascalCase", deserialize = "snake_case")
)]
pub struct ImageRepository {
    pub image_identifier: String,
    pub image_repository_type: ImageRepositoryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_configuration: Option<ImageConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    default,
    deny_unknown_fields,
    rename_all(serialize = "PascalCase", deserialize = "snake_case")
)]
pub struct AuthenticationConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_arn: Option<String>,
}

/// Where the service's code or image comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    default,
    deny_unknown_fields,
    rename_all(serialize = "PascalCase", deserialize = "snake_case")
)]
pub struct SourceConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_repository: Option<ImageRepository>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_deployments_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_configuration: Option<AuthenticationConfiguration>,
}

impl SourceConfiguration {
    /// Add an environment variable to the image configuration.
    ///
    /// A source without an image repository has no image configuration to
    /// carry it, so the variable is dropped and a warning is logged.
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name: String = name.into();
        if let Some(repo) = self.image_repository.as_mut() {
            repo.image_configuration
                .get_or_insert_with(ImageConfiguration::default)
                .runtime_environment_variables
                .push(KeyValuePair {
                    name,
                    value: value.into(),
                });
        } else {
            log::warn!(
                "environment variable '{}' ignored: source has no image repository",
                name
            );
        }
        self
    }

    pub fn with_auto_deployments(mut self, enabled: bool) -> Self {
        self.auto_deployments_enabled = Some(enabled);
        self
    }
}

/// CPU, memory and instance role of the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    default,
    deny_unknown_fields,
    rename_all(serialize = "PascalCase", deserialize = "snake_case")
)]
pub struct InstanceConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_role_arn: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE", deserialize = "snake_case"))]
pub enum HealthCheckProtocol {
    Http,
    Tcp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    default,
    deny_unknown_fields,
    rename_all(serialize = "PascalCase", deserialize = "snake_case")
)]
pub struct HealthCheckConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<HealthCheckProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unhealthy_threshold: Option<u32>,
}

/// Configuration fragment for an App Runner service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub construct_id: Option<String>,
    pub service_name: Option<String>,
    pub source: Option<SourceConfiguration>,
    pub instance: Option<InstanceConfiguration>,
    pub health_check: Option<HealthCheckConfiguration>,
    pub auto_scaling_configuration_arn: Option<String>,
    pub access_role: Option<RoleRef>,
    pub instance_role: Option<RoleRef>,
    pub tags: Tags,
}

fluent_cdk_core::impl_merge!(ServiceConfig {
    construct_id,
    service_name,
    source,
    instance,
    health_check,
    auto_scaling_configuration_arn,
    access_role,
    instance_role,
    tags,
});

impl ServiceConfig {
    pub fn construct_id(self, id: impl Into<String>) -> Self {
        self.merge(Self {
            construct_id: Some(id.into()),
            ..Self::default()
        })
    }

    pub fn service_name(self, name: impl Into<String>) -> Self {
        self.merge(Self {
            service_name: Some(name.into()),
            ..Self::default()
        })
    }

    pub fn source(self, source: SourceConfiguration) -> Self {
        self.merge(Self {
            source: Some(source),
            ..Self::default()
        })
    }

    pub fn instance(self, instance: InstanceConfiguration) -> Self {
        self.merge(Self {
            instance: Some(instance),
            ..Self::default()
        })
    }

    pub fn health_check(self, health_check: HealthCheckConfiguration) -> Self {
        self.merge(Self {
            health_check: Some(health_check),
            ..Self::default()
        })
    }

    pub fn auto_scaling_configuration_arn(self, arn: impl Into<String>) -> Self {
        self.merge(Self {
            auto_scaling_configuration_arn: Some(arn.into()),
            ..Self::default()
        })
    }

    /// Role App Runner assumes to pull from a private registry
    pub fn access_role(self, role: RoleRef) -> Self {
        self.merge(Self {
            access_role: Some(role),
            ..Self::default()
        })
    }

    /// Role the running service assumes
    pub fn instance_role(self, role: RoleRef) -> Self {
        self.merge(Self {
            instance_role: Some(role),
            ..Self::default()
        })
    }

    /// Set both roles in one call
    pub fn roles(self, access_role: RoleRef, instance_role: RoleRef) -> Self {
        self.access_role(access_role).instance_role(instance_role)
    }

    pub fn tag(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.merge(Self {
            tags: Tags::from_iter([Tag::new(key, value)]),
            ..Self::default()
        })
    }

    pub fn tags<K, V, I>(self, tags: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.merge(Self {
            tags: Tags::from_pairs(tags),
            ..Self::default()
        })
    }
}

/// `AWS::AppRunner::Service` properties
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    pub source_configuration: SourceConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_configuration: Option<InstanceConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_configuration: Option<HealthCheckConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scaling_configuration_arn: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// Attributes of a created App Runner service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHandle {
    pub service_arn: String,
    pub service_id: String,
    pub service_url: String,
}

impl Resource for ServiceConfig {
    const KIND: &'static str = "app_runner_service";
    type Props = ServiceProps;
    type Handle = ServiceHandle;

    fn construct_id(&self) -> Option<&str> {
        self.construct_id.as_deref()
    }

    fn materialize(&self, name: &str) -> BuildResult<ServiceProps> {
        let mut source = self
            .source
            .clone()
            .ok_or_else(|| BuildError::missing(Self::KIND, name, "source configuration"))?;
        if source.image_repository.is_none() && source.authentication_configuration.is_none() {
            return Err(BuildError::missing(Self::KIND, name, "source configuration"));
        }

        // A role already present on the source configuration takes precedence.
        if let Some(role) = &self.access_role {
            let auth = source
                .authentication_configuration
                .get_or_insert_with(AuthenticationConfiguration::default);
            if auth.access_role_arn.is_none() {
                auth.access_role_arn = Some(role.arn.clone());
            }
        }

        let private_image = source
            .image_repository
            .as_ref()
            .is_some_and(|repo| repo.image_repository_type == ImageRepositoryType::Ecr);
        let has_access_role = source
            .authentication_configuration
            .as_ref()
            .is_some_and(|auth| auth.access_role_arn.is_some());
        if private_image && !has_access_role {
            log::warn!(
                "{} '{}': private ECR image configured without an access role",
                Self::KIND,
                name
            );
        }

        let mut instance_configuration = self.instance.clone();
        if let Some(role) = &self.instance_role {
            let instance = instance_configuration.get_or_insert_with(InstanceConfiguration::default);
            if instance.instance_role_arn.is_none() {
                instance.instance_role_arn = Some(role.arn.clone());
            }
        }

        Ok(ServiceProps {
            service_name: self.service_name.clone(),
            source_configuration: source,
            instance_configuration,
            health_check_configuration: self.health_check.clone(),
            auto_scaling_configuration_arn: self.auto_scaling_configuration_arn.clone(),
            tags: self.tags.collapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use fluent_cdk_core::HandleError;

    use super::*;
    use crate::app_runner_service;

    const IMAGE: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com/api:latest";

    #[test]
    fn missing_source_configuration_fails() {
        let err = app_runner_service("api")
            .configure(|c| c.instance(instance_size(InstanceSize::ONE_VCPU_TWO_GB)))
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "source configuration");
        assert!(err.to_string().contains("source configuration"));
        assert!(err.to_string().contains("'api'"));
    }

    #[test]
    fn empty_source_configuration_fails() {
        let err = app_runner_service("api")
            .configure(|c| c.source(SourceConfiguration::default()))
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "source configuration");

        let err = app_runner_service("api")
            .configure(|c| {
                c.source(SourceConfiguration::default().with_auto_deployments(true))
                    .access_role(RoleRef::from_arn("arn:aws:iam::1:role/access"))
            })
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "source configuration");
    }

    #[test]
    fn env_without_image_repository_is_dropped() {
        let source = SourceConfiguration::default().with_env("RUST_LOG", "info");
        assert_eq!(source, SourceConfiguration::default());
    }

    #[test]
    fn minimal_service() {
        let spec = app_runner_service("api")
            .configure(|c| c.source(ecr_public_image_source("public.ecr.aws/nginx/nginx", 80)))
            .build()
            .unwrap();

        let props = spec.props();
        assert!(props.instance_configuration.is_none());
        assert!(props.health_check_configuration.is_none());
        assert!(props.tags.is_empty());
        assert_eq!(spec.construct_id(), "api");

        let json = serde_json::to_value(props).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "SourceConfiguration": {
                    "ImageRepository": {
                        "ImageIdentifier": "public.ecr.aws/nginx/nginx",
                        "ImageRepositoryType": "ECR_PUBLIC",
                        "ImageConfiguration": {"Port": "80"}
                    }
                }
            })
        );
    }

    #[test]
    fn first_source_wins() {
        let spec = app_runner_service("api")
            .configure(|c| c.source(ecr_image_source(IMAGE, 8080)))
            .configure(|c| c.source(ecr_public_image_source("public.ecr.aws/other", 80)))
            .build()
            .unwrap();
        let repo = spec
            .props()
            .source_configuration
            .image_repository
            .clone()
            .unwrap();
        assert_eq!(repo.image_identifier, IMAGE);
        assert_eq!(repo.image_repository_type, ImageRepositoryType::Ecr);
    }

    #[test]
    fn roles_are_folded_into_nested_configurations() {
        let spec = app_runner_service("api")
            .configure(|c| {
                c.source(ecr_image_source(IMAGE, 8080))
                    .instance(instance_size(InstanceSize::HALF_VCPU_ONE_GB))
                    .roles(
                        RoleRef::from_arn("arn:aws:iam::123456789012:role/access"),
                        RoleRef::from_arn("arn:aws:iam::123456789012:role/instance"),
                    )
            })
            .build()
            .unwrap();

        let props = spec.props();
        assert_eq!(
            props
                .source_configuration
                .authentication_configuration
                .as_ref()
                .and_then(|a| a.access_role_arn.as_deref()),
            Some("arn:aws:iam::123456789012:role/access")
        );
        let instance = props.instance_configuration.as_ref().unwrap();
        assert_eq!(instance.cpu.as_deref(), Some("0.5 vCPU"));
        assert_eq!(instance.memory.as_deref(), Some("1 GB"));
        assert_eq!(
            instance.instance_role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/instance")
        );
    }

    #[test]
    fn instance_role_without_size_creates_instance_configuration() {
        let spec = app_runner_service("api")
            .configure(|c| {
                c.source(ecr_public_image_source("public.ecr.aws/x", 80))
                    .instance_role(RoleRef::from_arn("arn:aws:iam::1:role/i"))
            })
            .build()
            .unwrap();
        let instance = spec.props().instance_configuration.clone().unwrap();
        assert!(instance.cpu.is_none());
        assert_eq!(instance.instance_role_arn.as_deref(), Some("arn:aws:iam::1:role/i"));
    }

    #[test]
    fn explicit_source_access_role_is_kept() {
        let mut source = ecr_image_source(IMAGE, 8080);
        source.authentication_configuration = Some(AuthenticationConfiguration {
            access_role_arn: Some("arn:aws:iam::1:role/explicit".to_string()),
            connection_arn: None,
        });
        let spec = app_runner_service("api")
            .configure(|c| {
                c.source(source)
                    .access_role(RoleRef::from_arn("arn:aws:iam::1:role/other"))
            })
            .build()
            .unwrap();
        assert_eq!(
            spec.props()
                .source_configuration
                .authentication_configuration
                .as_ref()
                .and_then(|a| a.access_role_arn.as_deref()),
            Some("arn:aws:iam::1:role/explicit")
        );
    }

    #[test]
    fn tags_accumulate_and_collapse() {
        let spec = app_runner_service("api")
            .configure(|c| c.source(ecr_image_source(IMAGE, 8080)).tag("a", "1"))
            .configure(|c| c.tags([("b", "2"), ("a", "3")]))
            .build()
            .unwrap();
        let order: Vec<&str> = spec.config().tags.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "3"]);
        assert_eq!(spec.props().tags, vec![Tag::new("a", "3"), Tag::new("b", "2")]);
    }

    #[test]
    fn full_service_serializes_every_section() {
        let spec = app_runner_service("api")
            .configure(|c| {
                c.construct_id("ApiService")
                    .service_name("api")
                    .source(ecr_image_source(IMAGE, 8080).with_env("RUST_LOG", "info"))
                    .health_check(default_health_check())
                    .auto_scaling_configuration_arn(
                        "arn:aws:apprunner:us-east-1:123456789012:autoscalingconfiguration/default/1/abc",
                    )
            })
            .build()
            .unwrap();
        assert_eq!(spec.construct_id(), "ApiService");

        let json = serde_json::to_value(spec.props()).unwrap();
        assert_eq!(json["ServiceName"], "api");
        assert_eq!(
            json["SourceConfiguration"]["ImageRepository"]["ImageConfiguration"]
                ["RuntimeEnvironmentVariables"],
            serde_json::json!([{"Name": "RUST_LOG", "Value": "info"}])
        );
        assert_eq!(json["HealthCheckConfiguration"]["Protocol"], "HTTP");
        assert_eq!(json["HealthCheckConfiguration"]["Interval"], 5);
        assert!(json["AutoScalingConfigurationArn"].is_string());
        assert!(json.get("Tags").is_none());
    }

    #[test]
    fn live_attributes_after_back_fill() {
        let mut spec = app_runner_service("api")
            .configure(|c| c.source(ecr_image_source(IMAGE, 8080)))
            .build()
            .unwrap();
        assert!(matches!(
            spec.live(),
            Err(HandleError::NotYetCreated {
                kind: "app_runner_service",
                ..
            })
        ));

        spec.mark_created(ServiceHandle {
            service_arn: "arn:aws:apprunner:us-east-1:123456789012:service/api/abc".to_string(),
            service_id: "abc".to_string(),
            service_url: "abc.us-east-1.awsapprunner.com".to_string(),
        })
        .unwrap();
        assert_eq!(
            spec.live().unwrap().service_url,
            "abc.us-east-1.awsapprunner.com"
        );
    }

    #[test]
    fn config_reads_snake_case_manifest() {
        let config: ServiceConfig = serde_json::from_str(
            r#"{
                "source": {
                    "image_repository": {
                        "image_identifier": "public.ecr.aws/x",
                        "image_repository_type": "ecr_public"
                    }
                },
                "instance": {"cpu": "1 vCPU", "memory": "2 GB"},
                "tags": [{"key": "env", "value": "prod"}]
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.instance,
            Some(instance_size(InstanceSize::ONE_VCPU_TWO_GB))
        );
        assert_eq!(config.tags.len(), 1);

        let unknown = serde_json::from_str::<ServiceConfig>(r#"{"image": "x"}"#);
        assert!(unknown.is_err());

        let nested = serde_json::from_str::<ServiceConfig>(
            r#"{"source": {"image_repo": {"image_identifier": "x"}}}"#,
        );
        assert!(nested.is_err());

        let deep = serde_json::from_str::<ServiceConfig>(
            r#"{"health_check": {"protocol": "http", "intervall": 5}}"#,
        );
        assert!(deep.is_err());
    }
}
