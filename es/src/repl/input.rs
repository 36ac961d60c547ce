//! Parsing of respondent input lines

use resultlog::Score;

/// What a line typed at a score prompt means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreInput {
    Score(Score),
    /// Empty line: take the preselected neutral answer
    Default,
    /// A slash command such as `/quit`
    Command(String),
    Invalid(String),
}

pub fn parse_score_input(line: &str) -> ScoreInput {
    let input = line.trim();
    if input.is_empty() {
        return ScoreInput::Default;
    }
    if input.starts_with('/') {
        return ScoreInput::Command(input.to_string());
    }
    match input.parse::<u8>() {
        Ok(value) => match Score::new(value) {
            Ok(score) => ScoreInput::Score(score),
            Err(e) => ScoreInput::Invalid(e.to_string()),
        },
        Err(_) => ScoreInput::Invalid(format!("'{}' is not a number between 1 and 5", input)),
    }
}

/// Text progress bar, e.g. `[#####.....]`
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_input() {
        assert_eq!(parse_score_input(" 4 "), ScoreInput::Score(Score::new(4).unwrap()));
        assert_eq!(parse_score_input(""), ScoreInput::Default);
        assert_eq!(parse_score_input("/quit"), ScoreInput::Command("/quit".to_string()));
        assert!(matches!(parse_score_input("9"), ScoreInput::Invalid(_)));
        assert!(matches!(parse_score_input("abc"), ScoreInput::Invalid(_)));
        assert!(matches!(parse_score_input("-1"), ScoreInput::Invalid(_)));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[....]");
        assert_eq!(progress_bar(0.5, 4), "[##..]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
        assert_eq!(progress_bar(2.0, 4), "[####]");
    }
}
