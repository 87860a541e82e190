//! Error types for finalization and live-handle access

/// Error raised while finalizing a configuration into a [`crate::Spec`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("{kind} '{name}': {field} is required")]
    MissingRequired {
        kind: &'static str,
        name: String,
        field: &'static str,
    },
}

impl BuildError {
    pub fn missing(kind: &'static str, name: impl Into<String>, field: &'static str) -> Self {
        BuildError::MissingRequired {
            kind,
            name: name.into(),
            field,
        }
    }

    /// Name of the missing field
    pub fn field(&self) -> &'static str {
        match self {
            BuildError::MissingRequired { field, .. } => field,
        }
    }
}

/// Error raised by the live resource handle slot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    #[error(
        "{kind} '{name}' has not been created yet; provision it before reading live attributes"
    )]
    NotYetCreated { kind: &'static str, name: String },

    #[error("{kind} '{name}' has already been marked as created")]
    AlreadyCreated { kind: &'static str, name: String },
}

pub type BuildResult<T> = Result<T, BuildError>;

pub type HandleResult<T> = Result<T, HandleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_names_field_and_resource() {
        let err = BuildError::missing("bucket_metrics", "entire", "id");
        assert_eq!(err.to_string(), "bucket_metrics 'entire': id is required");
        assert_eq!(err.field(), "id");
    }

    #[test]
    fn not_yet_created_names_resource() {
        let err = HandleError::NotYetCreated {
            kind: "bastion_host",
            name: "jump".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bastion_host 'jump'"));
        assert!(msg.contains("has not been created yet"));
    }
}
