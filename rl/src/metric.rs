//! Rating metrics and Likert scores

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidScore;

/// Likert labels from strongest agreement to strongest disagreement
pub const LIKERT_LABELS: [(u8, &str); 5] = [
    (5, "非常にそう思う"),
    (4, "ややそう思う"),
    (3, "どちらともいえない"),
    (2, "あまりそう思わない"),
    (1, "全くそう思わない"),
];

/// One of the four fixed rating dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Authenticity,
    Fidelity,
    Naturalness,
    Harmony,
}

impl Metric {
    /// All metrics in column order
    pub const ALL: [Metric; 4] = [
        Metric::Authenticity,
        Metric::Fidelity,
        Metric::Naturalness,
        Metric::Harmony,
    ];

    /// Column name in the result log
    pub fn key(&self) -> &'static str {
        match self {
            Self::Authenticity => "authenticity",
            Self::Fidelity => "fidelity",
            Self::Naturalness => "naturalness",
            Self::Harmony => "harmony",
        }
    }

    /// Default question shown to respondents
    pub fn default_prompt(&self) -> &'static str {
        match self {
            Self::Authenticity => "1. 地域の真正性（その地域らしい雰囲気があるか？）",
            Self::Fidelity => "2. 特徴の再現度（配布資料の特徴を捉えているか？）",
            Self::Naturalness => "3. 構造の自然さ（建物として破綻していないか？）",
            Self::Harmony => "4. 景観調和性（歴史的町並みに馴染むか？）",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Authenticity => 0,
            Self::Fidelity => 1,
            Self::Naturalness => 2,
            Self::Harmony => 3,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A validated Likert score in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// The preselected answer ("neither agree nor disagree")
    pub const NEUTRAL: Score = Score(3);

    pub fn new(value: u8) -> Result<Self, InvalidScore> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidScore(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Likert label for this score
    pub fn label(&self) -> &'static str {
        LIKERT_LABELS
            .iter()
            .find(|(value, _)| *value == self.0)
            .map(|(_, label)| *label)
            .unwrap_or("")
    }
}

impl TryFrom<u8> for Score {
    type Error = InvalidScore;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One score per metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scores([Score; 4]);

impl Scores {
    pub fn new(authenticity: Score, fidelity: Score, naturalness: Score, harmony: Score) -> Self {
        Self([authenticity, fidelity, naturalness, harmony])
    }

    /// Build from scores ordered like [`Metric::ALL`]
    pub fn from_array(scores: [Score; 4]) -> Self {
        Self(scores)
    }

    /// Validate four raw values ordered like [`Metric::ALL`]
    pub fn from_values(values: [u8; 4]) -> Result<Self, InvalidScore> {
        let [a, f, n, h] = values;
        Ok(Self([Score::new(a)?, Score::new(f)?, Score::new(n)?, Score::new(h)?]))
    }

    pub fn get(&self, metric: Metric) -> Score {
        self.0[metric.index()]
    }

    /// Iterate metrics with their scores in column order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, Score)> + '_ {
        Metric::ALL.iter().map(|m| (*m, self.get(*m)))
    }
}

impl Default for Scores {
    fn default() -> Self {
        Self([Score::NEUTRAL; 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(0).is_err());
        assert!(Score::new(6).is_err());
        for v in 1..=5 {
            assert_eq!(Score::new(v).unwrap().value(), v);
        }
        assert_eq!(Score::try_from(9u8), Err(InvalidScore(9)));
    }

    #[test]
    fn test_score_labels() {
        assert_eq!(Score::new(5).unwrap().label(), "非常にそう思う");
        assert_eq!(Score::NEUTRAL.label(), "どちらともいえない");
        assert_eq!(Score::new(1).unwrap().label(), "全くそう思わない");
    }

    #[test]
    fn test_metric_keys_in_column_order() {
        let keys: Vec<&str> = Metric::ALL.iter().map(|m| m.key()).collect();
        assert_eq!(keys, vec!["authenticity", "fidelity", "naturalness", "harmony"]);
    }

    #[test]
    fn test_scores_get_by_metric() {
        let scores = Scores::from_values([1, 2, 3, 4]).unwrap();
        assert_eq!(scores.get(Metric::Authenticity).value(), 1);
        assert_eq!(scores.get(Metric::Fidelity).value(), 2);
        assert_eq!(scores.get(Metric::Naturalness).value(), 3);
        assert_eq!(scores.get(Metric::Harmony).value(), 4);

        let collected: Vec<u8> = scores.iter().map(|(_, s)| s.value()).collect();
        assert_eq!(collected, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_scores_reject_out_of_range() {
        assert_eq!(Scores::from_values([1, 2, 3, 0]), Err(InvalidScore(0)));
    }

    #[test]
    fn test_default_scores_are_neutral() {
        assert!(Scores::default().iter().all(|(_, s)| s == Score::NEUTRAL));
    }
}
