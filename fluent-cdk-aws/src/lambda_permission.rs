//! Lambda permission builder
//!
//! Materializes the properties of an `AWS::Lambda::Permission`. The principal
//! is required; every other field is copied only when set.

use fluent_cdk_core::error::{BuildError, BuildResult};
use fluent_cdk_core::merge::Merge;
use fluent_cdk_core::Resource;
use serde::{Deserialize, Serialize};

use crate::refs::Principal;

/// Auth type of a function URL the permission applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE", deserialize = "snake_case"))]
pub enum FunctionUrlAuthType {
    AwsIam,
    None,
}

/// Configuration fragment for a Lambda permission
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PermissionConfig {
    pub construct_id: Option<String>,
    pub principal: Option<Principal>,
    pub action: Option<String>,
    pub source_arn: Option<String>,
    pub source_account: Option<String>,
    pub event_source_token: Option<String>,
    pub principal_org_id: Option<String>,
    pub function_url_auth_type: Option<FunctionUrlAuthType>,
}

fluent_cdk_core::impl_merge!(PermissionConfig {
    construct_id,
    principal,
    action,
    source_arn,
    source_account,
    event_source_token,
    principal_org_id,
    function_url_auth_type,
});

impl PermissionConfig {
    pub fn construct_id(self, id: impl Into<String>) -> Self {
        self.merge(Self {
            construct_id: Some(id.into()),
            ..Self::default()
        })
    }

    pub fn principal(self, principal: Principal) -> Self {
        self.merge(Self {
            principal: Some(principal),
            ..Self::default()
        })
    }

    pub fn action(self, action: impl Into<String>) -> Self {
        self.merge(Self {
            action: Some(action.into()),
            ..Self::default()
        })
    }

    pub fn source_arn(self, arn: impl Into<String>) -> Self {
        self.merge(Self {
            source_arn: Some(arn.into()),
            ..Self::default()
        })
    }

    pub fn source_account(self, account: impl Into<String>) -> Self {
        self.merge(Self {
            source_account: Some(account.into()),
            ..Self::default()
        })
    }

    /// Token Alexa Smart Home functions use to validate the invoker
    pub fn event_source_token(self, token: impl Into<String>) -> Self {
        self.merge(Self {
            event_source_token: Some(token.into()),
            ..Self::default()
        })
    }

    pub fn principal_org_id(self, org_id: impl Into<String>) -> Self {
        self.merge(Self {
            principal_org_id: Some(org_id.into()),
            ..Self::default()
        })
    }

    pub fn function_url_auth_type(self, auth_type: FunctionUrlAuthType) -> Self {
        self.merge(Self {
            function_url_auth_type: Some(auth_type),
            ..Self::default()
        })
    }
}

/// `AWS::Lambda::Permission` properties
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionProps {
    pub principal: Principal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_source_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_org_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_url_auth_type: Option<FunctionUrlAuthType>,
}

/// The function a created permission statement is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionHandle {
    pub function_arn: String,
}

impl Resource for PermissionConfig {
    const KIND: &'static str = "lambda_permission";
    type Props = PermissionProps;
    type Handle = PermissionHandle;

    fn construct_id(&self) -> Option<&str> {
        self.construct_id.as_deref()
    }

    fn materialize(&self, name: &str) -> BuildResult<PermissionProps> {
        let principal = self
            .principal
            .clone()
            .ok_or_else(|| BuildError::missing(Self::KIND, name, "principal"))?;

        Ok(PermissionProps {
            principal,
            action: self.action.clone(),
            source_arn: self.source_arn.clone(),
            source_account: self.source_account.clone(),
            event_source_token: self.event_source_token.clone(),
            principal_org_id: self.principal_org_id.clone(),
            function_url_auth_type: self.function_url_auth_type,
        })
    }
}
