//! LiveHandle - Late-bound reference to a provisioned resource
//!
//! The slot starts empty when a [`crate::Spec`] is produced and is filled
//! exactly once after the provisioning step has created the resource.

use crate::error::{HandleError, HandleResult};

#[derive(Debug, Clone, PartialEq)]
pub struct LiveHandle<H> {
    kind: &'static str,
    name: String,
    value: Option<H>,
}

impl<H> LiveHandle<H> {
    pub fn empty(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: None,
        }
    }

    /// Store the handle of the created resource. A slot can only be filled once.
    pub fn fill(&mut self, handle: H) -> HandleResult<()> {
        if self.value.is_some() {
            return Err(HandleError::AlreadyCreated {
                kind: self.kind,
                name: self.name.clone(),
            });
        }
        self.value = Some(handle);
        Ok(())
    }

    pub fn get(&self) -> HandleResult<&H> {
        self.value.as_ref().ok_or_else(|| HandleError::NotYetCreated {
            kind: self.kind,
            name: self.name.clone(),
        })
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_reports_not_yet_created() {
        let slot: LiveHandle<String> = LiveHandle::empty("app_runner_service", "api");
        assert!(!slot.is_filled());
        assert_eq!(
            slot.get(),
            Err(HandleError::NotYetCreated {
                kind: "app_runner_service",
                name: "api".to_string(),
            })
        );
    }

    #[test]
    fn filled_slot_is_readable_many_times() {
        let mut slot = LiveHandle::empty("app_runner_service", "api");
        slot.fill("arn:aws:apprunner:us-east-1:123456789012:service/api/abc".to_string())
            .unwrap();
        assert!(slot.is_filled());
        assert!(slot.get().unwrap().ends_with("/abc"));
        assert!(slot.get().unwrap().starts_with("arn:aws:apprunner"));
    }

    #[test]
    fn second_fill_is_rejected_and_keeps_first_value() {
        let mut slot = LiveHandle::empty("bastion_host", "jump");
        slot.fill(1).unwrap();
        let err = slot.fill(2).unwrap_err();
        assert!(matches!(err, HandleError::AlreadyCreated { .. }));
        assert_eq!(slot.get(), Ok(&1));
    }
}
