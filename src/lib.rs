//! augsweep is a batch image augmentation and similarity-sweep engine.
//!
//! A [`Job`] names an input source, an output root, a [`SelectionSet`] of catalog operators and
//! one of two modes:
//!
//! - [`PipelineMode::RandomSample`]: every variant applies all selected operators in a random
//!   order with freshly drawn parameters
//! - [`PipelineMode::DeterministicSweep`]: every operator family is written once per step of an
//!   evenly spaced parameter ladder
//!
//! An [`Engine`] runs the job on a worker thread and reports through a [`JobObserver`]. Given the
//! same job and seed, the output records and file paths are identical from run to run.
#![forbid(unsafe_code)]

mod foundation;

/// Operator descriptors and the built-in catalog.
pub mod catalog;
/// Selection sets and pipeline composition.
pub mod compose;
/// Batch orchestration.
pub mod engine;
/// Input enumeration and loading.
pub mod input;
/// Job description and JSON job files.
pub mod job;
/// Output file naming and image writing.
pub mod layout;
/// Operator implementations.
pub mod ops;
/// Parameter resolution.
pub mod sampler;

pub use crate::foundation::error::{AugsweepError, AugsweepResult, ErrorKind};
pub use crate::foundation::repro::{Reproducibility, SequenceCounter};

pub use crate::catalog::{
    Catalog, Category, LabelStyle, OperatorDescriptor, ParamDef, ParameterSpec, SweepLaw,
};
pub use crate::compose::{AppliedOperator, Composer, Pipeline, SelectionEntry, SelectionSet};
pub use crate::engine::{
    Engine, ExecutionState, JobHandle, JobObserver, JobReport, JobStatus, LogObserver,
    NoopObserver, OutputRecord, Preview, Progress, UnitError,
};
pub use crate::input::InputItem;
pub use crate::job::{InputSource, Job, OutputFormat, PipelineMode};
pub use crate::layout::OutputLayout;
pub use crate::ops::{OpContext, Operator, OperatorRegistry};
pub use crate::sampler::{ConcreteParams, SampleMode};
