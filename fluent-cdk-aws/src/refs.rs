//! References to objects owned by the provisioning library
//!
//! These only carry the identifier the properties objects need; the referenced
//! roles, networks and groups are created and managed elsewhere.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// IAM role, by ARN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRef {
    pub arn: String,
}

impl RoleRef {
    pub fn from_arn(arn: impl Into<String>) -> Self {
        Self { arn: arn.into() }
    }
}

/// VPC, by id (e.g., vpc-0abc)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VpcRef {
    pub vpc_id: String,
}

impl VpcRef {
    pub fn from_id(vpc_id: impl Into<String>) -> Self {
        Self {
            vpc_id: vpc_id.into(),
        }
    }
}

/// Security group, by id (e.g., sg-0abc)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityGroupRef {
    pub security_group_id: String,
}

impl SecurityGroupRef {
    pub fn from_id(security_group_id: impl Into<String>) -> Self {
        Self {
            security_group_id: security_group_id.into(),
        }
    }
}

/// Identity allowed to act on a resource
///
/// Serialized as the plain string CloudFormation expects
/// (`s3.amazonaws.com`, `123456789012`, an ARN or `*`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    /// AWS service principal (e.g., "s3.amazonaws.com")
    Service(String),
    /// AWS account id
    Account(String),
    /// IAM user or role ARN
    Arn(String),
    /// Anyone
    Any,
}

impl Principal {
    pub fn service(name: impl Into<String>) -> Self {
        Principal::Service(name.into())
    }

    pub fn account(id: impl Into<String>) -> Self {
        Principal::Account(id.into())
    }

    pub fn arn(arn: impl Into<String>) -> Self {
        Principal::Arn(arn.into())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Service(s) | Principal::Account(s) | Principal::Arn(s) => {
                write!(f, "{}", s)
            }
            Principal::Any => write!(f, "*"),
        }
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
