//! Pure rule resolution and evaluation (no process or filesystem I/O).
//!
//! Input: rule documents parsed elsewhere, a host identity, a tag filter and a probe set.
//! Output: Success / Failure / Controlled classes plus run counters.
//!
//! Host state is only reached through the [`probe::Probe`] collaborator, so every
//! stage here is testable with scripted probes.

#![forbid(unsafe_code)]

pub mod document;
pub mod error;
pub mod glob;
pub mod model;
pub mod normalize;
pub mod probe;
pub mod report;
pub mod resolve;

mod engine;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod test_support;

pub use engine::{Evaluation, Outcome, classify, evaluate};
pub use error::{DocumentError, MalformedRule, ProbeError, ResolveError};
pub use glob::TagFilter;
pub use report::{DomainReport, aggregate, audit};
pub use resolve::{merge, resolve};
