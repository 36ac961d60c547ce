//! Interactive rating session
//!
//! One respondent at a time: the session asks for a name, then shows images and
//! collects scores until every image is rated or the respondent quits.

mod input;
mod session;

pub use input::{ScoreInput, parse_score_input, progress_bar};
pub use session::RatingSession;

use eyre::Result;
use resultlog::RespondentId;

use crate::config::Config;
use crate::reconcile::OrderingPolicy;
use crate::survey::Survey;

/// Run the interactive session
///
/// This is the main entry point for `es run`.
pub fn run_interactive(config: &Config, ordering: OrderingPolicy, respondent: Option<String>) -> Result<()> {
    let survey = Survey::from_config(config, ordering)?;

    let respondent = match respondent {
        Some(raw) => Some(RespondentId::new(&raw)?),
        None => None,
    };

    let mut session = RatingSession::new(survey, config.clone(), respondent);
    session.run()
}
