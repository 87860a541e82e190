//! fluent-cdk Core
//!
//! Provider-agnostic building blocks: configuration fragments that merge with
//! first-write-wins semantics, a builder that finalizes them into a [`Spec`],
//! and a write-once slot for the live resource handle.

pub mod builder;
pub mod error;
pub mod handle;
pub mod merge;
pub mod spec;
pub mod tag;

pub use builder::{Builder, Resource};
pub use error::{BuildError, BuildResult, HandleError, HandleResult};
pub use handle::LiveHandle;
pub use merge::Merge;
pub use spec::Spec;
pub use tag::{Tag, Tags};
