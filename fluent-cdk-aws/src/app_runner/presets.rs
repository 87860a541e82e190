//! Common App Runner configuration fragments

use super::{
    HealthCheckConfiguration, HealthCheckProtocol, ImageConfiguration, ImageRepository,
    ImageRepositoryType, InstanceConfiguration, SourceConfiguration,
};

/// A valid App Runner (CPU, memory) combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceSize {
    pub cpu: &'static str,
    pub memory: &'static str,
}

impl InstanceSize {
    pub const QUARTER_VCPU_HALF_GB: InstanceSize = InstanceSize::new("0.25 vCPU", "0.5 GB");
    pub const QUARTER_VCPU_ONE_GB: InstanceSize = InstanceSize::new("0.25 vCPU", "1 GB");
    pub const HALF_VCPU_ONE_GB: InstanceSize = InstanceSize::new("0.5 vCPU", "1 GB");
    pub const ONE_VCPU_TWO_GB: InstanceSize = InstanceSize::new("1 vCPU", "2 GB");
    pub const ONE_VCPU_THREE_GB: InstanceSize = InstanceSize::new("1 vCPU", "3 GB");
    pub const ONE_VCPU_FOUR_GB: InstanceSize = InstanceSize::new("1 vCPU", "4 GB");
    pub const TWO_VCPU_FOUR_GB: InstanceSize = InstanceSize::new("2 vCPU", "4 GB");
    pub const TWO_VCPU_SIX_GB: InstanceSize = InstanceSize::new("2 vCPU", "6 GB");
    pub const FOUR_VCPU_EIGHT_GB: InstanceSize = InstanceSize::new("4 vCPU", "8 GB");
    pub const FOUR_VCPU_TEN_GB: InstanceSize = InstanceSize::new("4 vCPU", "10 GB");
    pub const FOUR_VCPU_TWELVE_GB: InstanceSize = InstanceSize::new("4 vCPU", "12 GB");

    /// Every combination App Runner accepts, smallest first
    pub const ALL: &'static [InstanceSize] = &[
        Self::QUARTER_VCPU_HALF_GB,
        Self::QUARTER_VCPU_ONE_GB,
        Self::HALF_VCPU_ONE_GB,
        Self::ONE_VCPU_TWO_GB,
        Self::ONE_VCPU_THREE_GB,
        Self::ONE_VCPU_FOUR_GB,
        Self::TWO_VCPU_FOUR_GB,
        Self::TWO_VCPU_SIX_GB,
        Self::FOUR_VCPU_EIGHT_GB,
        Self::FOUR_VCPU_TEN_GB,
        Self::FOUR_VCPU_TWELVE_GB,
    ];

    const fn new(cpu: &'static str, memory: &'static str) -> Self {
        Self { cpu, memory }
    }

    /// Look up a preset by its CPU and memory strings
    pub fn find(cpu: &str, memory: &str) -> Option<InstanceSize> {
        Self::ALL
            .iter()
            .copied()
            .find(|size| size.cpu == cpu && size.memory == memory)
    }
}

/// Instance configuration for a preset size
pub fn instance_size(size: InstanceSize) -> InstanceConfiguration {
    InstanceConfiguration {
        cpu: Some(size.cpu.to_string()),
        memory: Some(size.memory.to_string()),
        instance_role_arn: None,
    }
}

fn image_source(
    image: impl Into<String>,
    port: u16,
    repository_type: ImageRepositoryType,
) -> SourceConfiguration {
    SourceConfiguration {
        image_repository: Some(ImageRepository {
            image_identifier: image.into(),
            image_repository_type: repository_type,
            image_configuration: Some(ImageConfiguration {
                port: Some(port.to_string()),
                ..ImageConfiguration::default()
            }),
        }),
        ..SourceConfiguration::default()
    }
}

/// Source from a private ECR image listening on `port`
pub fn ecr_image_source(image: impl Into<String>, port: u16) -> SourceConfiguration {
    image_source(image, port, ImageRepositoryType::Ecr)
}

/// Source from an ECR Public image listening on `port`
pub fn ecr_public_image_source(image: impl Into<String>, port: u16) -> SourceConfiguration {
    image_source(image, port, ImageRepositoryType::EcrPublic)
}

/// HTTP health check on `/`: interval 5s, timeout 2s, healthy 1, unhealthy 5
pub fn default_health_check() -> HealthCheckConfiguration {
    HealthCheckConfiguration {
        protocol: Some(HealthCheckProtocol::Http),
        path: Some("/".to_string()),
        interval: Some(5),
        timeout: Some(2),
        healthy_threshold: Some(1),
        unhealthy_threshold: Some(5),
    }
}

/// Same thresholds as [`default_health_check`], over TCP
pub fn tcp_health_check() -> HealthCheckConfiguration {
    HealthCheckConfiguration {
        protocol: Some(HealthCheckProtocol::Tcp),
        path: None,
        ..default_health_check()
    }
}
