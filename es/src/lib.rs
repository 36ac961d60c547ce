//! EvalSurvey - resumable image rating survey
//!
//! Presents images one at a time, collects four Likert judgments per image and
//! appends each judgment to the respondent's result log. Progress is never kept
//! in memory between interactions: the next image is always recomputed by
//! diffing the catalog against the log.
//!
//! # Architecture
//!
//! ```text
//! images/                      results_eval/
//! ├── saga/                    ├── eval_yamada.csv
//! │   ├── saga_simple_001.png  └── ...
//! │   └── ...
//! └── nara/
//!     └── ...
//!
//! CatalogBuilder ──► ProgressReconciler ◄── LogStore (resultlog)
//!                          │
//!                        Survey ──► es CLI / interactive session
//! ```
//!
//! # Example
//!
//! ```ignore
//! use evalsurvey::{Config, OrderingPolicy, Step, Survey};
//! use resultlog::{RespondentId, Scores};
//!
//! let survey = Survey::from_config(&Config::default(), OrderingPolicy::Canonical)?;
//! let id = RespondentId::new("yamada")?;
//! if let Step::Rate(p) = survey.present(&id)? {
//!     survey.submit(&id, &p.item, &Scores::from_values([5, 4, 4, 3])?)?;
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
mod error;
pub mod image;
pub mod reconcile;
pub mod repl;
mod survey;
pub mod tags;

pub use catalog::{Catalog, CatalogBuilder, Category, DirectorySource, Item, ItemSource, MemorySource};
pub use config::Config;
pub use error::SurveyError;
pub use reconcile::{OrderingKind, OrderingPolicy, Progress, ProgressReconciler};
pub use survey::{Presentation, Step, Survey};
pub use tags::ItemTags;
