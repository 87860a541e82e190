//! Spec - A finalized resource configuration
//!
//! Holds the resolved configuration, the materialized properties object and
//! the late-bound handle of the live resource.

use crate::builder::Resource;
use crate::error::HandleResult;
use crate::handle::LiveHandle;

#[derive(Debug, Clone)]
pub struct Spec<C: Resource> {
    name: String,
    construct_id: String,
    config: C,
    props: C::Props,
    handle: LiveHandle<C::Handle>,
}

impl<C: Resource> Spec<C> {
    pub(crate) fn new(name: String, config: C, props: C::Props) -> Self {
        let construct_id = config
            .construct_id()
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let handle = LiveHandle::empty(C::KIND, name.clone());
        Self {
            name,
            construct_id,
            config,
            props,
            handle,
        }
    }

    pub fn kind(&self) -> &'static str {
        C::KIND
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct id, falling back to the resource name
    pub fn construct_id(&self) -> &str {
        &self.construct_id
    }

    /// Configuration with defaults applied
    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn props(&self) -> &C::Props {
        &self.props
    }

    pub fn into_props(self) -> C::Props {
        self.props
    }

    /// Record the live resource once the provisioning step created it
    pub fn mark_created(&mut self, handle: C::Handle) -> HandleResult<()> {
        self.handle.fill(handle)
    }

    pub fn is_created(&self) -> bool {
        self.handle.is_filled()
    }

    /// Live resource handle, or `NotYetCreated` before back-fill
    pub fn live(&self) -> HandleResult<&C::Handle> {
        self.handle.get()
    }
}
