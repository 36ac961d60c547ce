//! Survey facade: what to show next and how a rating is recorded

use std::path::PathBuf;

use chrono::Local;
use resultlog::{LogStore, RespondentId, ResponseRecord, Scores, TIMESTAMP_FORMAT};
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogBuilder, Category, DirectorySource, Item, ItemSource};
use crate::config::Config;
use crate::error::SurveyError;
use crate::image::{ImageCheck, check_image};
use crate::reconcile::{OrderingPolicy, Progress, ProgressReconciler};
use crate::tags::ItemTags;

/// Everything needed to show the current item
#[derive(Debug, Clone)]
pub struct Presentation {
    pub item: Item,
    pub tags: ItemTags,
    /// Display name of the origin category parsed from the file name
    pub region_name: String,
    pub image_path: PathBuf,
    pub image: ImageCheck,
    pub progress: Progress,
}

/// Next step for a respondent
#[derive(Debug, Clone)]
pub enum Step {
    Rate(Box<Presentation>),
    /// Terminal: every item has been rated
    Complete { total: usize },
}

pub struct Survey<S = DirectorySource> {
    reconciler: ProgressReconciler<S>,
    image_root: PathBuf,
    require_render: bool,
    unknown_region_label: String,
}

impl Survey<DirectorySource> {
    /// Survey over the configured image tree and result directory
    pub fn from_config(config: &Config, ordering: OrderingPolicy) -> Result<Self, SurveyError> {
        let builder = CatalogBuilder::new(config.categories.clone(), DirectorySource::new(&config.image_dir));
        let store = LogStore::open(&config.results_dir)?;
        Ok(Self::new(builder, store, ordering, config.image_dir.clone())
            .with_require_render(config.require_render)
            .with_unknown_region_label(config.unknown_region_label.clone()))
    }
}

impl<S: ItemSource> Survey<S> {
    pub fn new(builder: CatalogBuilder<S>, store: LogStore, ordering: OrderingPolicy, image_root: PathBuf) -> Self {
        Self {
            reconciler: ProgressReconciler::new(builder, store, ordering),
            image_root,
            require_render: false,
            unknown_region_label: "unknown".to_string(),
        }
    }

    pub fn with_require_render(mut self, require_render: bool) -> Self {
        self.require_render = require_render;
        self
    }

    pub fn with_unknown_region_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_region_label = label.into();
        self
    }

    pub fn store(&self) -> &LogStore {
        self.reconciler.store()
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.reconciler.ordering()
    }

    pub fn categories(&self) -> &[Category] {
        self.reconciler.builder().categories()
    }

    pub fn catalog(&self) -> Result<Catalog, SurveyError> {
        self.reconciler.builder().build()
    }

    pub fn reconcile(&self, respondent: &RespondentId) -> Result<Progress, SurveyError> {
        self.reconciler.reconcile(respondent)
    }

    pub fn image_path(&self, item: &Item) -> PathBuf {
        item.path_under(&self.image_root)
    }

    pub fn region_name(&self, code: &str) -> &str {
        self.categories()
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.name.as_str())
            .unwrap_or(self.unknown_region_label.as_str())
    }

    /// Reconcile and describe the item to show next
    pub fn present(&self, respondent: &RespondentId) -> Result<Step, SurveyError> {
        let progress = self.reconcile(respondent)?;
        let Some(item) = progress.next().cloned() else {
            return Ok(Step::Complete {
                total: progress.total(),
            });
        };

        let tags = ItemTags::parse(item.file_name());
        let image_path = self.image_path(&item);
        let image = check_image(&image_path);
        let region_name = self.region_name(&tags.region).to_string();

        Ok(Step::Rate(Box::new(Presentation {
            item,
            tags,
            region_name,
            image_path,
            image,
            progress,
        })))
    }

    /// Record a rating for the current item and return the fresh progress
    ///
    /// `item` must be the respondent's current item. If the append fails the
    /// rating is not persisted and the same call may simply be repeated. A
    /// failure after the append is reported as [`SurveyError::Saved`].
    pub fn submit(&self, respondent: &RespondentId, item: &Item, scores: &Scores) -> Result<Progress, SurveyError> {
        let progress = self.reconcile(respondent)?;
        let Some(current) = progress.next() else {
            return Err(SurveyError::Complete {
                total: progress.total(),
            });
        };
        if current != item {
            return Err(SurveyError::StaleItem {
                submitted: item.relative_path(),
                expected: current.relative_path(),
            });
        }

        if self.require_render {
            let path = self.image_path(item);
            if let ImageCheck::Failed { reason } = check_image(&path) {
                return Err(SurveyError::Unrenderable { path, reason });
            }
        }

        let tags = ItemTags::parse(item.file_name());
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let record = ResponseRecord::new(
            timestamp,
            respondent,
            item.file_name(),
            tags.region,
            tags.prompt_type,
            scores,
        );
        self.store().append(respondent, &record).map_err(SurveyError::Append)?;

        let next = self
            .reconcile(respondent)
            .map_err(|e| SurveyError::Saved { source: Box::new(e) })?;
        info!(
            respondent = %respondent,
            image_file = %item.file_name(),
            done = next.done_count(),
            total = next.total(),
            "Response saved"
        );
        Ok(next)
    }

    /// Rate whatever item is current, optionally guarding on its file name
    pub fn submit_next(
        &self,
        respondent: &RespondentId,
        scores: &Scores,
        expect: Option<&str>,
    ) -> Result<(Item, Progress), SurveyError> {
        let progress = self.reconcile(respondent)?;
        let Some(item) = progress.next().cloned() else {
            return Err(SurveyError::Complete {
                total: progress.total(),
            });
        };
        if let Some(expected) = expect
            && expected != item.file_name()
        {
            debug!(%expected, current = %item.file_name(), "Survey::submit_next: expectation mismatch");
            return Err(SurveyError::StaleItem {
                submitted: expected.to_string(),
                expected: item.file_name().to_string(),
            });
        }

        let next = self.submit(respondent, &item, scores)?;
        Ok((item, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemorySource;
    use std::cell::Cell;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn survey(temp: &TempDir) -> Survey<MemorySource> {
        let source = MemorySource::new()
            .with_category("saga", ["saga_simple_001.png", "saga_detail_002.png"])
            .with_category("nara", ["nara_simple_001.png"]);
        let builder = CatalogBuilder::new(
            vec![Category::new("saga", "佐賀"), Category::new("nara", "奈良")],
            source,
        );
        let store = LogStore::open(temp.path().join("results")).unwrap();
        Survey::new(
            builder,
            store,
            OrderingPolicy::Canonical,
            temp.path().join("images"),
        )
        .with_unknown_region_label("不明")
    }

    fn scores() -> Scores {
        Scores::from_values([5, 4, 3, 2]).unwrap()
    }

    #[test]
    fn test_present_describes_current_item() {
        let temp = TempDir::new().unwrap();
        let survey = survey(&temp);
        let id = RespondentId::new("yamada").unwrap();

        let Step::Rate(p) = survey.present(&id).unwrap() else {
            panic!("expected an item to rate");
        };
        assert_eq!(p.item.relative_path(), "saga/saga_simple_001.png");
        assert_eq!(p.tags.prompt_type, "simple");
        assert_eq!(p.region_name, "佐賀");
        assert!(!p.image.is_ok());
        assert_eq!(p.progress.position(), 1);
    }

    #[test]
    fn test_submit_advances_and_records_tags() {
        let temp = TempDir::new().unwrap();
        let survey = survey(&temp);
        let id = RespondentId::new("yamada").unwrap();

        let first = survey.reconcile(&id).unwrap().next().cloned().unwrap();
        let progress = survey.submit(&id, &first, &scores()).unwrap();

        assert_eq!(progress.done_count(), 1);
        assert_eq!(progress.next().map(Item::file_name), Some("saga_detail_002.png"));

        let records = survey.store().read_records(&id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].image_file, "saga_simple_001.png");
        assert_eq!(records[0].region, "saga");
        assert_eq!(records[0].prompt_type, "simple");
        assert_eq!(records[0].scores(), scores());
    }

    #[test]
    fn test_submit_rejects_stale_item() {
        let temp = TempDir::new().unwrap();
        let survey = survey(&temp);
        let id = RespondentId::new("yamada").unwrap();

        let later = Item::new("nara", "nara_simple_001.png");
        let err = survey.submit(&id, &later, &scores()).unwrap_err();
        assert!(matches!(err, SurveyError::StaleItem { .. }));
        assert_eq!(survey.reconcile(&id).unwrap().done_count(), 0);
    }

    #[test]
    fn test_submit_after_completion_is_rejected() {
        let temp = TempDir::new().unwrap();
        let survey = survey(&temp);
        let id = RespondentId::new("yamada").unwrap();

        for _ in 0..3 {
            survey.submit_next(&id, &scores(), None).unwrap();
        }
        assert!(matches!(survey.present(&id).unwrap(), Step::Complete { total: 3 }));
        assert!(matches!(
            survey.submit_next(&id, &scores(), None),
            Err(SurveyError::Complete { total: 3 })
        ));
    }

    #[test]
    fn test_submit_next_expectation() {
        let temp = TempDir::new().unwrap();
        let survey = survey(&temp);
        let id = RespondentId::new("yamada").unwrap();

        assert!(matches!(
            survey.submit_next(&id, &scores(), Some("nara_simple_001.png")),
            Err(SurveyError::StaleItem { .. })
        ));
        let (item, progress) = survey.submit_next(&id, &scores(), Some("saga_simple_001.png")).unwrap();
        assert_eq!(item.file_name(), "saga_simple_001.png");
        assert_eq!(progress.done_count(), 1);
    }

    #[test]
    fn test_require_render_blocks_unreadable_image() {
        let temp = TempDir::new().unwrap();
        let survey = survey(&temp).with_require_render(true);
        let id = RespondentId::new("yamada").unwrap();

        let err = survey.submit_next(&id, &scores(), None).unwrap_err();
        assert!(matches!(err, SurveyError::Unrenderable { .. }));
        assert_eq!(survey.reconcile(&id).unwrap().done_count(), 0);

        let path = temp.path().join("images/saga/saga_simple_001.png");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, PNG).unwrap();
        survey.submit_next(&id, &scores(), None).unwrap();
        assert_eq!(survey.reconcile(&id).unwrap().done_count(), 1);
    }

    #[test]
    fn test_append_failure_does_not_advance() {
        let temp = TempDir::new().unwrap();
        let survey = survey(&temp);
        let id = RespondentId::new("yamada").unwrap();

        // A directory where the log file should be makes the append fail
        fs::create_dir_all(survey.store().log_path(&id)).unwrap();

        let err = survey.submit_next(&id, &scores(), None).unwrap_err();
        assert!(matches!(err, SurveyError::Append(_)));
        assert!(err.is_retryable());
        assert_eq!(survey.reconcile(&id).unwrap().done_count(), 0);
    }

    /// Lists `saga` normally for the first `ok_calls` calls, then fails
    struct FlakySource {
        calls: Cell<usize>,
        ok_calls: usize,
    }

    impl ItemSource for FlakySource {
        fn list(&self, category: &Category) -> Result<Option<Vec<String>>, SurveyError> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if call >= self.ok_calls {
                return Err(SurveyError::Listing {
                    category: category.code.clone(),
                    source: io::Error::other("transient"),
                });
            }
            Ok(Some(vec!["a.png".to_string(), "b.png".to_string()]))
        }
    }

    #[test]
    fn test_failure_after_append_reports_saved() {
        let temp = TempDir::new().unwrap();
        let source = FlakySource {
            calls: Cell::new(0),
            ok_calls: 1,
        };
        let builder = CatalogBuilder::new(vec![Category::new("saga", "佐賀")], source);
        let store = LogStore::open(temp.path().join("results")).unwrap();
        let survey = Survey::new(builder, store, OrderingPolicy::Canonical, temp.path().join("images"));
        let id = RespondentId::new("yamada").unwrap();

        let err = survey.submit(&id, &Item::new("saga", "a.png"), &scores()).unwrap_err();
        assert!(matches!(err, SurveyError::Saved { .. }));
        assert!(!err.is_retryable());
        assert_eq!(survey.store().load_done_set(&id).len(), 1);
    }
}
