//! One row of a result log

use serde::{Deserialize, Serialize};

use crate::metric::{Metric, Score, Scores};
use crate::respondent::RespondentId;

/// Header row of every result log, in column order
pub const RECORD_FIELDS: [&str; 9] = [
    "timestamp",
    "user",
    "image_file",
    "region",
    "prompt_type",
    "authenticity",
    "fidelity",
    "naturalness",
    "harmony",
];

/// A respondent's judgment of one image
///
/// Field order is the column order of the log; the header row is derived from
/// the field names when the first record is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub timestamp: String,
    pub user: String,
    pub image_file: String,
    pub region: String,
    pub prompt_type: String,
    pub authenticity: Score,
    pub fidelity: Score,
    pub naturalness: Score,
    pub harmony: Score,
}

impl ResponseRecord {
    pub fn new(
        timestamp: impl Into<String>,
        respondent: &RespondentId,
        image_file: impl Into<String>,
        region: impl Into<String>,
        prompt_type: impl Into<String>,
        scores: &Scores,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            user: respondent.as_str().to_string(),
            image_file: image_file.into(),
            region: region.into(),
            prompt_type: prompt_type.into(),
            authenticity: scores.get(Metric::Authenticity),
            fidelity: scores.get(Metric::Fidelity),
            naturalness: scores.get(Metric::Naturalness),
            harmony: scores.get(Metric::Harmony),
        }
    }

    pub fn scores(&self) -> Scores {
        Scores::new(self.authenticity, self.fidelity, self.naturalness, self.harmony)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_copies_scores_into_columns() {
        let id = RespondentId::new("yamada").unwrap();
        let scores = Scores::from_values([5, 4, 3, 2]).unwrap();
        let record = ResponseRecord::new("2024-01-01 10:00:00", &id, "saga_simple_003.png", "saga", "simple", &scores);

        assert_eq!(record.user, "yamada");
        assert_eq!(record.authenticity.value(), 5);
        assert_eq!(record.harmony.value(), 2);
        assert_eq!(record.scores(), scores);
    }

    #[test]
    fn test_serialized_header_matches_fields() {
        let id = RespondentId::new("yamada").unwrap();
        let record = ResponseRecord::new("t", &id, "a.png", "unknown", "unknown", &Scores::default());

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(&record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();

        assert_eq!(header, RECORD_FIELDS.join(","));
        assert!(text.contains("t,yamada,a.png,unknown,unknown,3,3,3,3"));
    }
}
