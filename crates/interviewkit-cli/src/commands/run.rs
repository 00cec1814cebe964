//! The `interviewkit run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader};

use interviewkit_core::controller::{
    ControllerConfig, InterviewController, NarrationEvent, SessionObserver, StartOutcome,
    SubmitOutcome,
};
use interviewkit_core::error::{Rejection, VoiceInputError};
use interviewkit_core::model::{InterviewConfig, Level, Question, Role, Stage};
use interviewkit_core::session::AnswerRecord;
use interviewkit_core::statistics::SessionSummary;
use interviewkit_core::usage::FileUsageStore;
use interviewkit_voice::config::API_KEY_ENV;
use interviewkit_voice::{create_narrator, create_recorder, create_transcriber, load_config_from};

use super::load_question_bank;

const HELP: &str = "Type your answer; an empty line submits it.
Commands: /prev  /hint  /repeat  /record  /voice  /quit";

/// Prints controller events to the terminal.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_stage_changed(&self, from: Stage, to: Stage) {
        tracing::debug!("stage {from} -> {to}");
    }

    fn on_question(&self, index: usize, total: usize, question: &Question) {
        println!(
            "\nQuestion {}/{} [{}, {}]",
            index + 1,
            total,
            question.category,
            question.difficulty
        );
    }

    fn on_line(&self, text: &str) {
        println!("Interviewer: {text}");
    }

    fn on_narration(&self, event: NarrationEvent, text: &str) {
        if event == NarrationEvent::Failed {
            eprintln!("  (could not speak: {text})");
        }
    }

    fn on_answer_scored(&self, record: &AnswerRecord) {
        println!("\nScore: {}/100", record.score);
        println!("{}", record.feedback);
        for s in &record.strengths {
            println!("  + {s}");
        }
        for s in &record.improvements {
            println!("  - {s}");
        }
    }

    fn on_paywall(&self, interviews_today: u32, limit: u32) {
        eprintln!("Daily limit reached: {interviews_today}/{limit} interviews used today.");
    }
}

pub async fn execute(
    role: Role,
    level: Level,
    duration: u32,
    bank_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    no_voice: bool,
) -> Result<()> {
    anyhow::ensure!(duration >= 1, "duration must be at least 1 minute");

    let config = load_config_from(config_path.as_deref())?;

    let bank_path = bank_path.or_else(|| config.question_bank.clone());
    let bank = load_question_bank(bank_path.as_deref())?;
    let usage = Arc::new(FileUsageStore::new(config.usage_file.clone()));

    // With a key the real narrator is always built, so `/voice` can turn it on
    // even when the interview starts muted.
    let voice_available = config.voice.has_api_key();
    let mut narrator_voice = config.voice.clone();
    narrator_voice.enabled = voice_available;
    let controller_config = ControllerConfig {
        voice_enabled: config.voice.enabled && !no_voice,
        ..config.controller_config()
    };

    let mut controller = InterviewController::new(bank, usage, controller_config)
        .with_narrator(create_narrator(&narrator_voice)?)
        .with_observer(Arc::new(ConsoleObserver));
    if let Some(transcriber) = create_transcriber(&config.voice)? {
        controller = controller.with_transcriber(transcriber);
    }
    if let Some(recorder) = create_recorder(&config.voice) {
        controller = controller.with_recorder(recorder);
    }
    let controller = Arc::new(controller);

    controller.configure(InterviewConfig {
        role,
        level,
        duration_minutes: duration,
    })?;

    eprintln!(
        "{} interview, {} ({}), {duration} minutes",
        role.label(),
        level.label(),
        level.description()
    );

    match controller.start_interview().await? {
        StartOutcome::Started { interviews_today } => {
            tracing::debug!("interview {interviews_today} of today");
        }
        StartOutcome::Paywall { .. } => return Ok(()),
        StartOutcome::Rejected(rejection) => {
            anyhow::bail!("cannot start interview: {rejection}");
        }
    }

    let timer = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.run_timer().await }
    });

    println!("\n{HELP}");
    let result = answer_loop(&controller, voice_available).await;
    timer.abort();
    result?;

    let summary = controller.summary();
    if controller.stage() != Stage::Complete {
        println!("\nInterview ended early.");
    }
    if summary.answered > 0 {
        print_summary(&summary);
    }
    Ok(())
}

/// Read answer text and commands from stdin until the interview completes,
/// the user quits, or input ends.
async fn answer_loop(controller: &InterviewController, voice_available: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while controller.stage() == Stage::Interview {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => match controller.submit_answer().await {
                SubmitOutcome::Rejected(Rejection::EmptyAnswer) => println!("{HELP}"),
                SubmitOutcome::Rejected(rejection) => println!("({rejection})"),
                SubmitOutcome::Advanced { .. } | SubmitOutcome::Completed { .. } => {}
            },
            "/quit" => break,
            "/help" => println!("{HELP}"),
            "/prev" => {
                if let Err(rejection) = controller.previous_question().await {
                    println!("({rejection})");
                }
            }
            "/repeat" => {
                if let Err(rejection) = controller.repeat_question().await {
                    println!("({rejection})");
                }
            }
            "/hint" => match controller.toggle_hints() {
                Ok(true) => {
                    let hints = controller.visible_hints();
                    if hints.is_empty() {
                        println!("No hints for this question.");
                    }
                    for hint in hints {
                        println!("  Hint: {hint}");
                    }
                }
                Ok(false) => println!("Hints hidden."),
                Err(rejection) => println!("({rejection})"),
            },
            "/voice" => toggle_voice(controller, voice_available),
            "/record" => toggle_recording(controller).await,
            text => {
                if let Err(rejection) = controller.append_answer(text) {
                    println!("({rejection})");
                }
            }
        }
    }
    Ok(())
}

fn toggle_voice(controller: &InterviewController, voice_available: bool) {
    if !voice_available {
        println!("Voice unavailable: no API key configured (set {API_KEY_ENV}).");
        return;
    }
    let enabled = !controller.voice_enabled();
    controller.set_voice_enabled(enabled);
    println!("Voice {}.", if enabled { "on" } else { "off" });
}

async fn toggle_recording(controller: &InterviewController) {
    if !controller.is_recording() {
        match controller.start_recording().await {
            Ok(()) => println!("Recording... type /record again to stop."),
            Err(e) => report_voice_error(&e),
        }
        return;
    }
    match controller.stop_recording().await {
        Ok(text) if text.is_empty() => println!("(no speech captured)"),
        Ok(text) => println!("Heard: {text}"),
        Err(e) => report_voice_error(&e),
    }
}

fn report_voice_error(e: &VoiceInputError) {
    match e.rejection() {
        Some(rejection) => println!("({rejection})"),
        None => eprintln!("Voice input unavailable: {e}"),
    }
}

fn print_summary(summary: &SessionSummary) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Category", "Score", "Rating"]);

    for (i, answer) in summary.answers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(answer.prompt.as_deref().unwrap_or(&answer.question_id)),
            Cell::new(answer.category.map(|c| c.to_string()).unwrap_or_default()),
            Cell::new(format!("{}%", answer.score)),
            Cell::new(answer.band),
        ]);
    }

    println!("\n{table}");
    println!(
        "Overall score: {}%  ({} of {} answered, {} excellent, time {})",
        summary.overall_score,
        summary.answered,
        summary.total_questions,
        summary.excellent,
        summary.elapsed()
    );
}
