//! EC2-specific type definitions used by the bastion host builder

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// CPU architecture of an instance class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Architecture {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86_64 => "x86_64",
            Architecture::Arm64 => "arm64",
        }
    }
}

/// Instance families the builders know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceClass {
    Burstable2,
    Burstable3,
    Burstable3Amd,
    Burstable4Graviton,
    Standard5,
    Standard6Graviton,
    Compute5,
    Memory5,
}

/// (class, API prefix)
const INSTANCE_CLASSES: &[(InstanceClass, &str)] = &[
    (InstanceClass::Burstable2, "t2"),
    (InstanceClass::Burstable3, "t3"),
    (InstanceClass::Burstable3Amd, "t3a"),
    (InstanceClass::Burstable4Graviton, "t4g"),
    (InstanceClass::Standard5, "m5"),
    (InstanceClass::Standard6Graviton, "m6g"),
    (InstanceClass::Compute5, "c5"),
    (InstanceClass::Memory5, "r5"),
];

impl InstanceClass {
    pub fn prefix(&self) -> &'static str {
        INSTANCE_CLASSES
            .iter()
            .find(|(class, _)| class == self)
            .map(|(_, prefix)| *prefix)
            .unwrap_or_default()
    }

    pub fn is_burstable(&self) -> bool {
        matches!(
            self,
            InstanceClass::Burstable2
                | InstanceClass::Burstable3
                | InstanceClass::Burstable3Amd
                | InstanceClass::Burstable4Graviton
        )
    }

    pub fn architecture(&self) -> Architecture {
        match self {
            InstanceClass::Burstable4Graviton | InstanceClass::Standard6Graviton => {
                Architecture::Arm64
            }
            _ => Architecture::X86_64,
        }
    }
}

/// Instance size within a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Size {
    Nano,
    Micro,
    Small,
    Medium,
    Large,
    XLarge,
    XLarge2,
}

const SIZES: &[(Size, &str)] = &[
    (Size::Nano, "nano"),
    (Size::Micro, "micro"),
    (Size::Small, "small"),
    (Size::Medium, "medium"),
    (Size::Large, "large"),
    (Size::XLarge, "xlarge"),
    (Size::XLarge2, "2xlarge"),
];

impl Size {
    pub fn as_str(&self) -> &'static str {
        SIZES
            .iter()
            .find(|(size, _)| size == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }
}

/// Error parsing an instance type string such as "t3.nano"
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceTypeError {
    #[error("Invalid instance type '{0}': expected <class>.<size> (e.g., t3.nano)")]
    Format(String),

    #[error("Unknown instance class '{class}', expected one of: {}", expected.join(", "))]
    UnknownClass {
        class: String,
        expected: Vec<&'static str>,
    },

    #[error("Unknown instance size '{size}', expected one of: {}", expected.join(", "))]
    UnknownSize {
        size: String,
        expected: Vec<&'static str>,
    },
}

/// EC2 instance type, e.g. `t3.nano`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct InstanceType {
    pub class: InstanceClass,
    pub size: Size,
}

impl InstanceType {
    /// Smallest burstable instance, used when no instance type is configured
    pub const SMALLEST_BURSTABLE: InstanceType = InstanceType {
        class: InstanceClass::Burstable3,
        size: Size::Nano,
    };

    pub fn of(class: InstanceClass, size: Size) -> Self {
        Self { class, size }
    }

    pub fn architecture(&self) -> Architecture {
        self.class.architecture()
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class.prefix(), self.size.as_str())
    }
}

impl FromStr for InstanceType {
    type Err = InstanceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (class, size) = s
            .split_once('.')
            .ok_or_else(|| InstanceTypeError::Format(s.to_string()))?;

        let class = INSTANCE_CLASSES
            .iter()
            .find(|(_, prefix)| *prefix == class)
            .map(|(c, _)| *c)
            .ok_or_else(|| InstanceTypeError::UnknownClass {
                class: class.to_string(),
                expected: INSTANCE_CLASSES.iter().map(|(_, p)| *p).collect(),
            })?;

        let size = SIZES
            .iter()
            .find(|(_, name)| *name == size)
            .map(|(s, _)| *s)
            .ok_or_else(|| InstanceTypeError::UnknownSize {
                size: size.to_string(),
                expected: SIZES.iter().map(|(_, n)| *n).collect(),
            })?;

        Ok(Self { class, size })
    }
}

impl TryFrom<String> for InstanceType {
    type Error = InstanceTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for InstanceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Machine image to launch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineImage {
    /// Latest Amazon Linux 2023, resolved through SSM
    LatestAmazonLinux2023,
    /// Latest Amazon Linux 2, resolved through SSM
    LatestAmazonLinux2,
    /// Fixed AMI id
    Ami(String),
}

/// Machine image as handed to the provisioning library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MachineImageProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssm_parameter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    pub architecture: Architecture,
}

impl MachineImage {
    /// Resolve to an SSM parameter path (or a fixed AMI) for the given architecture
    pub fn resolve(&self, architecture: Architecture) -> MachineImageProps {
        let (ssm_parameter, image_id) = match self {
            MachineImage::LatestAmazonLinux2023 => (
                Some(format!(
                    "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-{}",
                    architecture.as_str()
                )),
                None,
            ),
            MachineImage::LatestAmazonLinux2 => (
                Some(format!(
                    "/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-{}-gp2",
                    architecture.as_str()
                )),
                None,
            ),
            MachineImage::Ami(id) => (None, Some(id.clone())),
        };
        MachineImageProps {
            ssm_parameter,
            image_id,
            architecture,
        }
    }
}

/// Subnet placement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE", deserialize = "snake_case"))]
pub enum SubnetType {
    Public,
    PrivateWithEgress,
    PrivateIsolated,
}

/// Which subnets to place an instance in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    default,
    deny_unknown_fields,
    rename_all(serialize = "PascalCase", deserialize = "snake_case")
)]
pub struct SubnetSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_type: Option<SubnetType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_group_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subnet_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,
}

impl SubnetSelection {
    pub fn of_type(subnet_type: SubnetType) -> Self {
        Self {
            subnet_type: Some(subnet_type),
            ..Self::default()
        }
    }

    pub fn public() -> Self {
        Self::of_type(SubnetType::Public)
    }

    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subnet_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            subnet_group_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn in_zones<I, S>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.availability_zones = zones.into_iter().map(Into::into).collect();
        self
    }
}
