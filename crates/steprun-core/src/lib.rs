//! steprun Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the steprun
//! workflow runner, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           steprun-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │     (WorkflowService, ActionRunner)     │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Driven: Filesystem, Commands, Prompter)│
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    steprun-adapters (Infrastructure)    │
//! │ (LocalFilesystem, ShellCommandRunner..) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Resolver, ConditionEvaluator, Workflow)│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use steprun_core::prelude::*;
//!
//! let registry = PlaceholderRegistry::builder()
//!     .with("LICENSE", |_: &AnswerMap| Ok::<_, GeneratorError>("MIT".into()))
//!     .unwrap()
//!     .build();
//! let resolver = Resolver::new(registry);
//!
//! let mut answers = AnswerMap::new();
//! answers.insert("name", "shop");
//!
//! assert_eq!(
//!     resolver.resolve("[[[ANS:name]]] is [[[LICENSE]]]", &answers),
//!     "shop is MIT"
//! );
//! assert!(ConditionEvaluator::new(&resolver)
//!     .evaluate(&[ConditionClause::exact("name", "shop")], &answers));
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ActionOutcome, RunOptions, RunReport, WorkflowService,
        ports::{CommandOutput, CommandRunner, Filesystem, Prompter},
    };
    pub use crate::domain::{
        Action, ActionKind, AnswerMap, ConditionClause, ConditionEvaluator, GeneratorError,
        PlaceholderRegistry, PlaceholderRegistryBuilder, Question, QuestionKind, Resolver, Step,
        Workflow,
    };
    pub use crate::error::{SteprunError, SteprunResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
