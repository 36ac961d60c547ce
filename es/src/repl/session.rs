//! Rating session management

use std::process::{Command, Stdio};

use colored::Colorize;
use eyre::Result;
use resultlog::{LIKERT_LABELS, Metric, RespondentId, Score, Scores};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info, warn};

use super::input::{ScoreInput, parse_score_input, progress_bar};
use crate::config::Config;
use crate::error::SurveyError;
use crate::image::ImageCheck;
use crate::survey::{Presentation, Step, Survey};

const BAR_WIDTH: usize = 30;

/// Interactive rating session for one respondent
pub struct RatingSession {
    survey: Survey,
    config: Config,
    respondent: Option<RespondentId>,
}

impl RatingSession {
    pub fn new(survey: Survey, config: Config, respondent: Option<RespondentId>) -> Self {
        Self {
            survey,
            config,
            respondent,
        }
    }

    /// Run the session until the respondent finishes or quits
    pub fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        let respondent = match self.respondent.clone() {
            Some(r) => r,
            None => match self.ask_respondent(&mut rl)? {
                Some(r) => r,
                None => {
                    println!("Goodbye!");
                    return Ok(());
                }
            },
        };
        self.respondent = Some(respondent.clone());
        info!(respondent = %respondent, ordering = ?self.survey.ordering(), "Rating session started");
        println!("Respondent: {}", respondent.as_str().bright_green());

        loop {
            // Progress is recomputed from the result log on every pass
            let presentation = match self.survey.present(&respondent) {
                Ok(Step::Complete { total }) => {
                    self.print_complete(total);
                    break;
                }
                Ok(Step::Rate(p)) => p,
                Err(e) => {
                    warn!(respondent = %respondent, error = %e, "Failed to load the next image");
                    println!("{} {}", "Error:".red(), e);
                    println!("{}", "Press Enter to retry, /quit to exit.".yellow());
                    match self.read_line(&mut rl, "> ")? {
                        Some(line) if line.trim() == "/quit" || line.trim() == "/q" => break,
                        Some(_) => continue,
                        None => break,
                    }
                }
            };

            self.print_presentation(&presentation);

            if self.config.require_render
                && let Some(reason) = presentation.image.failure()
            {
                warn!(path = ?presentation.image_path, %reason, "Submission blocked until image loads");
                println!(
                    "{}",
                    "Rating is disabled until this image can be loaded. Press Enter to retry, /quit to exit.".yellow()
                );
                match self.read_line(&mut rl, "> ")? {
                    Some(line) if line.trim() == "/quit" || line.trim() == "/q" => break,
                    Some(_) => continue,
                    None => break,
                }
            }

            let Some(scores) = self.collect_scores(&mut rl, &respondent)? else {
                break;
            };

            match self.survey.submit(&respondent, &presentation.item, &scores) {
                Ok(progress) => {
                    println!(
                        "{} Saved ({} / {})",
                        "✓".green(),
                        progress.done_count(),
                        progress.total()
                    );
                }
                Err(e @ SurveyError::Saved { .. }) => {
                    warn!(respondent = %respondent, error = %e, "Response saved but progress refresh failed");
                    println!("{} {}", "✓".green(), e);
                }
                Err(e) => {
                    warn!(respondent = %respondent, error = %e, "Failed to save response");
                    println!("{} {}", "Save failed:".red(), e);
                    if e.is_retryable() {
                        println!("{}", "Nothing was saved. Please enter your scores again.".yellow());
                    }
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Print welcome message
    fn print_welcome(&self) {
        println!();
        println!("{}", "Architectural Design Evaluation".bright_cyan().bold());
        println!("Enter the same name as before to continue where you left off.");
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    fn ask_respondent(&self, rl: &mut DefaultEditor) -> Result<Option<RespondentId>> {
        loop {
            let Some(line) = self.read_line(rl, &format!("{} ", "Name or ID>".bright_green()))? else {
                return Ok(None);
            };
            let input = line.trim();
            if input == "/quit" || input == "/q" {
                return Ok(None);
            }
            match RespondentId::new(input) {
                Ok(id) => return Ok(Some(id)),
                Err(_) => continue,
            }
        }
    }

    fn print_presentation(&self, p: &Presentation) {
        let progress = &p.progress;
        println!();
        println!(
            "{} {:>3.0}%",
            progress_bar(progress.fraction(), BAR_WIDTH).bright_blue(),
            progress.fraction() * 100.0
        );
        println!(
            "Progress: {} / {} (completed: {})",
            progress.position(),
            progress.total(),
            progress.done_count()
        );
        println!("Image: {}", p.item.relative_path().bright_white());

        match &p.image {
            ImageCheck::Ok { format, size } => {
                println!("{}", format!("{} ({}, {} bytes)", p.image_path.display(), format, size).dimmed());
                self.launch_viewer(p);
            }
            ImageCheck::Failed { reason } => {
                println!("{} {}: {}", "Image load error:".red(), p.image_path.display(), reason);
            }
        }

        println!();
        println!("Target region: 【 {} 】", p.region_name.bright_cyan().bold());
        println!("Refer to the \"{}\" page of your handout when rating.", p.region_name);
        println!("{}", "-".repeat(BAR_WIDTH + 6).dimmed());
    }

    fn launch_viewer(&self, p: &Presentation) {
        let Some(viewer) = self.config.viewer.as_deref() else {
            return;
        };
        let mut parts = viewer.split_whitespace();
        let Some(program) = parts.next() else {
            return;
        };

        let spawned = Command::new(program)
            .args(parts)
            .arg(&p.image_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_) => debug!(%viewer, path = ?p.image_path, "RatingSession::launch_viewer: spawned"),
            Err(e) => {
                warn!(%viewer, error = %e, "Failed to launch image viewer");
                println!("{} {}", "Viewer error:".red(), e);
            }
        }
    }

    /// Ask each metric in turn; `None` means the respondent quit
    fn collect_scores(&self, rl: &mut DefaultEditor, respondent: &RespondentId) -> Result<Option<Scores>> {
        let mut scores = [Score::NEUTRAL; 4];

        for (i, metric) in Metric::ALL.iter().enumerate() {
            println!();
            println!("{}", self.config.metric_prompt(*metric).bold());
            let labels: Vec<String> = LIKERT_LABELS
                .iter()
                .map(|(value, label)| format!("{} {}", value.to_string().yellow(), label))
                .collect();
            println!("  {}", labels.join("  "));

            loop {
                let prompt = format!("{} ", "[1-5, Enter=3]>".bright_green());
                let Some(line) = self.read_line(rl, &prompt)? else {
                    return Ok(None);
                };

                match parse_score_input(&line) {
                    ScoreInput::Score(score) => {
                        scores[i] = score;
                        break;
                    }
                    ScoreInput::Default => {
                        scores[i] = Score::NEUTRAL;
                        break;
                    }
                    ScoreInput::Command(cmd) => match self.handle_slash_command(&cmd, respondent) {
                        SlashResult::Continue => continue,
                        SlashResult::Quit => return Ok(None),
                    },
                    ScoreInput::Invalid(msg) => {
                        println!("{} {}", "?".yellow(), msg);
                    }
                }
            }
        }

        Ok(Some(Scores::from_array(scores)))
    }

    /// Read one line; `None` on Ctrl+D
    fn read_line(&self, rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    return Ok(None);
                }
                Err(err) => return Err(eyre::eyre!("Readline error: {}", err)),
            }
        }
    }

    /// Handle slash commands
    fn handle_slash_command(&self, input: &str, respondent: &RespondentId) -> SlashResult {
        let cmd = input.split_whitespace().next().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/status" => {
                match self.survey.reconcile(respondent) {
                    Ok(progress) => println!(
                        "{} of {} rated, {} remaining",
                        progress.done_count(),
                        progress.total(),
                        progress.remaining().len()
                    ),
                    Err(e) => println!("{} {}", "Error:".red(), e),
                }
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Show how many images are left", "/status".yellow());
        println!("  {:14} Leave; saved ratings are kept", "/quit".yellow());
        println!();
        println!("Answer each question with 1-5, or press Enter for 3.");
        println!();
    }

    fn print_complete(&self, total: usize) {
        println!();
        println!(
            "{} All {} images have been rated!",
            "✓".green().bold(),
            total.to_string().bright_white()
        );
        println!("Your answers are saved. You can close this window.");
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
