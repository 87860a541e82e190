//! Builder - Accumulating fragments and finalizing them
//!
//! Each AWS construct is described by a configuration type implementing
//! [`Resource`]. A [`Builder`] collects fragments of that configuration,
//! merges them and, on [`Builder::build`], applies defaults, validates and
//! materializes the properties object into a [`Spec`].

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::BuildResult;
use crate::merge::{Merge, merge_all};
use crate::spec::Spec;

/// Definition of a configuration that can be materialized into properties
pub trait Resource: Merge + Default + Debug + Clone {
    /// Resource kind used in messages and manifests (e.g., "bastion_host")
    const KIND: &'static str;

    /// Properties object handed to the provisioning library
    type Props: Serialize + Debug + Clone;

    /// Attributes of the live resource, known only after provisioning
    type Handle: Serialize + DeserializeOwned + Debug + Clone;

    /// Explicit construct id, if one was configured
    fn construct_id(&self) -> Option<&str>;

    /// Fill still-unset fields that have a default
    fn apply_defaults(self, _name: &str) -> Self {
        self
    }

    /// Validate required fields and copy resolved fields onto the properties
    fn materialize(&self, name: &str) -> BuildResult<Self::Props>;
}

/// Accumulates configuration fragments for one named resource
#[derive(Debug, Clone)]
pub struct Builder<C> {
    name: String,
    config: C,
}

impl<C: Resource> Builder<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: C::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merge a fragment after everything collected so far
    pub fn fragment(mut self, fragment: C) -> Self {
        self.config = self.config.merge(fragment);
        self
    }

    /// Merge every fragment in order
    pub fn fragments(self, fragments: impl IntoIterator<Item = C>) -> Self {
        self.fragment(merge_all(fragments))
    }

    /// Run a block of configuration operations as one fragment
    pub fn configure(self, block: impl FnOnce(C) -> C) -> Self {
        self.fragment(block(C::default()))
    }

    /// The merged configuration, before defaults
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Apply defaults, validate and materialize the properties object
    pub fn build(self) -> BuildResult<Spec<C>> {
        let resolved = self.config.apply_defaults(&self.name);
        let props = resolved.materialize(&self.name).inspect_err(|e| {
            log::debug!("{} '{}' failed to materialize: {}", C::KIND, self.name, e);
        })?;
        log::debug!("materialized {} '{}'", C::KIND, self.name);
        Ok(Spec::new(self.name, resolved, props))
    }
}
