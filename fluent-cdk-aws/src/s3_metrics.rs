//! S3 bucket metrics builder
//!
//! Materializes one entry of a bucket's `MetricsConfigurations`. The id is
//! required; the prefix and tag filters narrow which objects are measured.

use std::collections::BTreeMap;

use fluent_cdk_core::error::{BuildError, BuildResult};
use fluent_cdk_core::merge::Merge;
use fluent_cdk_core::{Resource, Tag, Tags};
use serde::{Deserialize, Serialize};

/// Configuration fragment for a bucket metrics filter
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub construct_id: Option<String>,
    pub id: Option<String>,
    pub prefix: Option<String>,
    pub tag_filters: Tags,
}

fluent_cdk_core::impl_merge!(MetricsConfig {
    construct_id,
    id,
    prefix,
    tag_filters,
});

impl MetricsConfig {
    pub fn construct_id(self, id: impl Into<String>) -> Self {
        self.merge(Self {
            construct_id: Some(id.into()),
            ..Self::default()
        })
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.merge(Self {
            id: Some(id.into()),
            ..Self::default()
        })
    }

    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        self.merge(Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        })
    }

    pub fn tag_filter(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.merge(Self {
            tag_filters: Tags::from_iter([Tag::new(key, value)]),
            ..Self::default()
        })
    }

    pub fn tag_filters<K, V, I>(self, filters: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.merge(Self {
            tag_filters: Tags::from_pairs(filters),
            ..Self::default()
        })
    }
}

/// Bucket metrics configuration properties
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricsProps {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub tag_filters: BTreeMap<String, String>,
}

/// The bucket the metrics configuration ended up on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsHandle {
    pub bucket_name: String,
    pub bucket_arn: String,
}

impl Resource for MetricsConfig {
    const KIND: &'static str = "bucket_metrics";
    type Props = MetricsProps;
    type Handle = MetricsHandle;

    fn construct_id(&self) -> Option<&str> {
        self.construct_id.as_deref()
    }

    fn materialize(&self, name: &str) -> BuildResult<MetricsProps> {
        let id = self
            .id
            .clone()
            .ok_or_else(|| BuildError::missing(Self::KIND, name, "id"))?;

        Ok(MetricsProps {
            id,
            prefix: self.prefix.clone(),
            tag_filters: self.tag_filters.to_map(),
        })
    }
}
