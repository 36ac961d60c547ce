//! Progress reconciliation
//!
//! Remaining work is never cached: every call rebuilds the catalog and re-reads
//! the respondent's result log, so the log on disk is the only source of truth
//! and a reload or restart resumes exactly where the log stops.

use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use resultlog::{DoneSet, LogStore, RespondentId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogBuilder, Item, ItemSource};
use crate::error::SurveyError;

/// Presentation order selected when a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderingKind {
    /// Catalog order: categories as configured, files by name
    #[default]
    Canonical,
    /// Catalog order permuted once per session
    Shuffled,
}

/// Ordering applied to the catalog before the done-set is subtracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingPolicy {
    Canonical,
    /// The seed fixes the permutation for the whole session
    Shuffled { seed: u64 },
}

impl OrderingPolicy {
    /// Resolve a kind into a policy, drawing a fresh seed if none is given
    pub fn from_kind(kind: OrderingKind, seed: Option<u64>) -> Self {
        match kind {
            OrderingKind::Canonical => Self::Canonical,
            OrderingKind::Shuffled => Self::Shuffled {
                seed: seed.unwrap_or_else(rand::random),
            },
        }
    }

    pub fn apply(&self, mut items: Vec<Item>) -> Vec<Item> {
        match self {
            Self::Canonical => items,
            Self::Shuffled { seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                items.shuffle(&mut rng);
                items
            }
        }
    }
}

/// A respondent's position in the survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    remaining: Vec<Item>,
    total: usize,
    done_count: usize,
}

impl Progress {
    pub fn new(remaining: Vec<Item>, total: usize) -> Self {
        let done_count = total.saturating_sub(remaining.len());
        Self {
            remaining,
            total,
            done_count,
        }
    }

    /// Items still to rate, in presentation order
    pub fn remaining(&self) -> &[Item] {
        &self.remaining
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done_count(&self) -> usize {
        self.done_count
    }

    /// The item to present next: always the earliest remaining one
    pub fn next(&self) -> Option<&Item> {
        self.remaining.first()
    }

    /// No items remain; the respondent is finished
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    /// 1-based number of the item being presented
    pub fn position(&self) -> usize {
        (self.done_count + 1).min(self.total)
    }

    /// Completed share in 0.0..=1.0
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.done_count as f64 / self.total as f64
        }
    }
}

/// Subtract the done-set from a sequence, keeping the sequence's order
///
/// Membership is by bare file name only: two items with the same file name in
/// different categories are both considered done once either is rated.
pub fn remaining_items(sequence: Vec<Item>, done: &DoneSet) -> Vec<Item> {
    sequence.into_iter().filter(|item| !done.contains(item.file_name())).collect()
}

/// Recomputes a respondent's remaining items from the catalog and their log
#[derive(Debug, Clone)]
pub struct ProgressReconciler<S> {
    builder: CatalogBuilder<S>,
    store: LogStore,
    ordering: OrderingPolicy,
}

impl<S: ItemSource> ProgressReconciler<S> {
    pub fn new(builder: CatalogBuilder<S>, store: LogStore, ordering: OrderingPolicy) -> Self {
        Self {
            builder,
            store,
            ordering,
        }
    }

    pub fn builder(&self) -> &CatalogBuilder<S> {
        &self.builder
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.ordering
    }

    pub fn reconcile(&self, respondent: &RespondentId) -> Result<Progress, SurveyError> {
        let done = self.store.load_done_set(respondent);
        let catalog = self.builder.build()?;
        let total = catalog.total();

        let sequence = self.ordering.apply(catalog.into_items());
        let progress = Progress::new(remaining_items(sequence, &done), total);

        debug!(
            respondent = %respondent,
            total,
            done = progress.done_count(),
            remaining = progress.remaining().len(),
            "ProgressReconciler::reconcile: reconciled"
        );
        Ok(progress)
    }
}
