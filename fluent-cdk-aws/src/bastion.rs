//! Bastion host builder
//!
//! A Linux jump box. Nothing is strictly required; unset fields fall back to
//! the smallest burstable instance, the latest Amazon Linux 2023 image, a
//! public subnet and IMDSv2. A missing VPC is reported as a warning because the
//! provisioning step will almost certainly reject it.

use fluent_cdk_core::error::{BuildError, BuildResult};
use fluent_cdk_core::merge::Merge;
use fluent_cdk_core::{Resource, Tag, Tags};
use serde::{Deserialize, Serialize};

use crate::ec2::{InstanceType, MachineImage, MachineImageProps, SubnetSelection};
use crate::refs::{SecurityGroupRef, VpcRef};

/// Configuration fragment for a bastion host
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BastionConfig {
    pub construct_id: Option<String>,
    pub vpc: Option<VpcRef>,
    pub instance_type: Option<InstanceType>,
    pub machine_image: Option<MachineImage>,
    pub subnet_selection: Option<SubnetSelection>,
    pub security_group: Option<SecurityGroupRef>,
    pub instance_name: Option<String>,
    pub require_imdsv2: Option<bool>,
    pub tags: Tags,
}

fluent_cdk_core::impl_merge!(BastionConfig {
    construct_id,
    vpc,
    instance_type,
    machine_image,
    subnet_selection,
    security_group,
    instance_name,
    require_imdsv2,
    tags,
});

impl BastionConfig {
    pub fn construct_id(self, id: impl Into<String>) -> Self {
        self.merge(Self {
            construct_id: Some(id.into()),
            ..Self::default()
        })
    }

    pub fn vpc(self, vpc: VpcRef) -> Self {
        self.merge(Self {
            vpc: Some(vpc),
            ..Self::default()
        })
    }

    pub fn instance_type(self, instance_type: InstanceType) -> Self {
        self.merge(Self {
            instance_type: Some(instance_type),
            ..Self::default()
        })
    }

    pub fn machine_image(self, image: MachineImage) -> Self {
        self.merge(Self {
            machine_image: Some(image),
            ..Self::default()
        })
    }

    pub fn subnet_selection(self, selection: SubnetSelection) -> Self {
        self.merge(Self {
            subnet_selection: Some(selection),
            ..Self::default()
        })
    }

    pub fn security_group(self, group: SecurityGroupRef) -> Self {
        self.merge(Self {
            security_group: Some(group),
            ..Self::default()
        })
    }

    pub fn instance_name(self, name: impl Into<String>) -> Self {
        self.merge(Self {
            instance_name: Some(name.into()),
            ..Self::default()
        })
    }

    pub fn require_imdsv2(self, required: bool) -> Self {
        self.merge(Self {
            require_imdsv2: Some(required),
            ..Self::default()
        })
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

/// Bastion host properties
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BastionProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc: Option<VpcRef>,
    pub instance_type: InstanceType,
    pub machine_image: MachineImageProps,
    pub subnet_selection: SubnetSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group: Option<SecurityGroupRef>,
    pub instance_name: String,
    pub require_imdsv2: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// Attributes of a launched bastion host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BastionHandle {
    pub instance_id: String,
    pub instance_private_ip: String,
    pub instance_availability_zone: String,
    pub role_arn: String,
}

impl Resource for BastionConfig {
    const KIND: &'static str = "bastion_host";
    type Props = BastionProps;
    type Handle = BastionHandle;

    fn construct_id(&self) -> Option<&str> {
        self.construct_id.as_deref()
    }

    fn apply_defaults(self, name: &str) -> Self {
        self.merge(Self {
            instance_type: Some(InstanceType::SMALLEST_BURSTABLE),
            machine_image: Some(MachineImage::LatestAmazonLinux2023),
            subnet_selection: Some(SubnetSelection::public()),
            instance_name: Some(name.to_string()),
            require_imdsv2: Some(true),
            ..Self::default()
        })
    }

    fn materialize(&self, name: &str) -> BuildResult<BastionProps> {
        if self.vpc.is_none() {
            log::warn!(
                "{} '{}': no VPC configured; the provisioning step expects one",
                Self::KIND,
                name
            );
        }

        let required = |field: &'static str| BuildError::missing(Self::KIND, name, field);
        let instance_type = self.instance_type.ok_or_else(|| required("instance type"))?;
        let machine_image = self
            .machine_image
            .as_ref()
            .ok_or_else(|| required("machine image"))?
            .resolve(instance_type.architecture());

        Ok(BastionProps {
            vpc: self.vpc.clone(),
            instance_type,
            machine_image,
            subnet_selection: self
                .subnet_selection
                .clone()
                .ok_or_else(|| required("subnet selection"))?,
            security_group: self.security_group.clone(),
            instance_name: self
                .instance_name
                .clone()
                .ok_or_else(|| required("instance name"))?,
            require_imdsv2: self
                .require_imdsv2
                .ok_or_else(|| required("metadata options"))?,
            tags: self.tags.collapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use fluent_cdk_core::HandleError;

    use super::*;
    use crate::bastion_host;
    use crate::ec2::{Architecture, InstanceClass, Size, SubnetType};

    #[test]
    fn defaults_are_applied() {
        let spec = bastion_host("jump")
            .configure(|c| c.vpc(VpcRef::from_id("vpc-0abc")))
            .build()
            .unwrap();

        let props = spec.props();
        assert_eq!(props.instance_type, InstanceType::SMALLEST_BURSTABLE);
        assert_eq!(props.instance_type.to_string(), "t3.nano");
        assert_eq!(
            props.machine_image.ssm_parameter.as_deref(),
            Some("/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64")
        );
        assert_eq!(props.subnet_selection, SubnetSelection::public());
        assert!(props.require_imdsv2);
        assert_eq!(props.instance_name, "jump");

        // defaults are visible on the resolved configuration too
        assert_eq!(spec.config().instance_type, Some(InstanceType::SMALLEST_BURSTABLE));
        assert_eq!(spec.config().require_imdsv2, Some(true));
    }

    #[test]
    fn defaults_come_only_from_apply_defaults() {
        let err = BastionConfig::default().materialize("jump").unwrap_err();
        assert_eq!(err.field(), "instance type");

        let resolved = BastionConfig::default().apply_defaults("jump");
        assert_eq!(resolved.instance_name.as_deref(), Some("jump"));
        assert_eq!(resolved.machine_image, Some(MachineImage::LatestAmazonLinux2023));
        assert_eq!(resolved.subnet_selection, Some(SubnetSelection::public()));
        assert!(resolved.materialize("jump").is_ok());
    }

    #[test]
    fn missing_vpc_does_not_fail() {
        let spec = bastion_host("jump").build().unwrap();
        assert!(spec.props().vpc.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let spec = bastion_host("jump")
            .configure(|c| {
                c.vpc(VpcRef::from_id("vpc-0abc"))
                    .instance_type(InstanceType::of(InstanceClass::Burstable4Graviton, Size::Micro))
                    .subnet_selection(SubnetSelection::of_type(SubnetType::PrivateWithEgress))
                    .security_group(SecurityGroupRef::from_id("sg-1"))
                    .instance_name("ops-bastion")
                    .require_imdsv2(false)
            })
            .build()
            .unwrap();

        let props = spec.props();
        assert_eq!(props.instance_type.to_string(), "t4g.micro");
        assert_eq!(props.machine_image.architecture, Architecture::Arm64);
        assert!(
            props
                .machine_image
                .ssm_parameter
                .as_deref()
                .unwrap()
                .ends_with("arm64")
        );
        assert_eq!(
            props.subnet_selection.subnet_type,
            Some(SubnetType::PrivateWithEgress)
        );
        assert_eq!(props.instance_name, "ops-bastion");
        assert!(!props.require_imdsv2);
    }

    #[test]
    fn first_instance_type_wins() {
        let spec = bastion_host("jump")
            .configure(|c| c.instance_type("t3.small".parse().unwrap()))
            .configure(|c| c.instance_type("m5.large".parse().unwrap()))
            .build()
            .unwrap();
        assert_eq!(spec.props().instance_type.to_string(), "t3.small");
    }

    #[test]
    fn fixed_ami() {
        let spec = bastion_host("jump")
            .configure(|c| c.machine_image(MachineImage::Ami("ami-0123".to_string())))
            .build()
            .unwrap();
        assert_eq!(spec.props().machine_image.image_id.as_deref(), Some("ami-0123"));
    }

    #[test]
    fn serializes_pascal_case() {
        let spec = bastion_host("jump")
            .configure(|c| c.vpc(VpcRef::from_id("vpc-0abc")).tag("env", "ops"))
            .build()
            .unwrap();
        let json = serde_json::to_value(spec.props()).unwrap();
        assert_eq!(json["Vpc"], "vpc-0abc");
        assert_eq!(json["InstanceType"], "t3.nano");
        assert_eq!(json["SubnetSelection"]["SubnetType"], "PUBLIC");
        assert_eq!(json["RequireImdsv2"], true);
        assert_eq!(json["Tags"], serde_json::json!([{"Key": "env", "Value": "ops"}]));
        assert!(json.get("SecurityGroup").is_none());
    }

    #[test]
    fn live_attributes_require_creation() {
        let mut spec = bastion_host("jump").build().unwrap();
        let err = spec.live().unwrap_err();
        assert!(matches!(err, HandleError::NotYetCreated { .. }));
        assert!(err.to_string().contains("bastion_host 'jump'"));

        spec.mark_created(BastionHandle {
            instance_id: "i-0abc".to_string(),
            instance_private_ip: "10.0.1.12".to_string(),
            instance_availability_zone: "us-east-1a".to_string(),
            role_arn: "arn:aws:iam::123456789012:role/jump".to_string(),
        })
        .unwrap();
        assert_eq!(spec.live().unwrap().instance_id, "i-0abc");
    }

    #[test]
    fn config_reads_snake_case_manifest() {
        let config: BastionConfig = serde_json::from_str(
            r#"{
                "vpc": "vpc-0abc",
                "instance_type": "t3a.small",
                "machine_image": "latest_amazon_linux2",
                "subnet_selection": {"subnet_ids": ["subnet-1", "subnet-2"]},
                "require_imdsv2": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.vpc, Some(VpcRef::from_id("vpc-0abc")));
        assert_eq!(
            config.instance_type,
            Some(InstanceType::of(InstanceClass::Burstable3Amd, Size::Small))
        );
        assert_eq!(config.subnet_selection.unwrap().subnet_ids.len(), 2);

        assert!(serde_json::from_str::<BastionConfig>(r#"{"instance_type": "t3"}"#).is_err());
    }
}
