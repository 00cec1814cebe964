//! Interview controller.
//!
//! Owns the session state machine (`setup → intro → interview → complete`),
//! enforces the daily interview limit, serializes answer grading, and drives
//! the narration, transcription and recording collaborators. Every
//! collaborator call is awaited with a timeout; a failed or timed-out
//! narration counts as finished so the interview never stalls.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bank::QuestionBank;
use crate::error::{CollaboratorError, Rejection, VoiceInputError};
use crate::model::{InterviewConfig, Level, PartialConfig, Question, Role, Stage};
use crate::script;
use crate::scoring::score_answer;
use crate::session::{AnswerRecord, SessionState};
use crate::statistics::{self, SessionSummary};
use crate::traits::{
    date_key, AudioRecorder, Clock, Narrator, SilentNarrator, SystemClock, Transcriber,
    UsageStore,
};

/// Tunables for the controller.
///
/// Delays only pace the presentation; ordering never depends on them.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Interviews allowed per calendar day.
    pub daily_limit: u32,
    /// Whether narration is played at all.
    pub voice_enabled: bool,
    /// Pause after the intro before the interview stage begins.
    pub intro_settle: Duration,
    /// Pause after feedback narration before moving on.
    pub feedback_settle: Duration,
    /// Pause before the first question is read.
    pub first_question_delay: Duration,
    /// Pause before any later question is read.
    pub next_question_delay: Duration,
    /// Upper bound on a single narration, synthesis retries and playback included.
    pub narration_timeout: Duration,
    /// Upper bound on a single transcription.
    pub transcription_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            daily_limit: 3,
            voice_enabled: true,
            intro_settle: Duration::from_secs(2),
            feedback_settle: Duration::from_secs(2),
            first_question_delay: Duration::from_secs(4),
            next_question_delay: Duration::from_millis(500),
            narration_timeout: Duration::from_secs(90),
            transcription_timeout: Duration::from_secs(30),
        }
    }
}

impl ControllerConfig {
    /// Defaults with every presentation delay removed.
    pub fn immediate() -> Self {
        Self {
            intro_settle: Duration::ZERO,
            feedback_settle: Duration::ZERO,
            first_question_delay: Duration::ZERO,
            next_question_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Lifecycle of one narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationEvent {
    Started,
    Completed,
    Failed,
}

/// Receives controller events. Called without any internal lock held.
pub trait SessionObserver: Send + Sync {
    fn on_stage_changed(&self, from: Stage, to: Stage);
    /// A question is being presented.
    fn on_question(&self, index: usize, total: usize, question: &Question);
    /// The interviewer says `text`, whether or not voice is enabled.
    fn on_line(&self, text: &str);
    fn on_narration(&self, event: NarrationEvent, text: &str);
    fn on_answer_scored(&self, record: &AnswerRecord);
    fn on_paywall(&self, interviews_today: u32, limit: u32);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_stage_changed(&self, _: Stage, _: Stage) {}
    fn on_question(&self, _: usize, _: usize, _: &Question) {}
    fn on_line(&self, _: &str) {}
    fn on_narration(&self, _: NarrationEvent, _: &str) {}
    fn on_answer_scored(&self, _: &AnswerRecord) {}
    fn on_paywall(&self, _: u32, _: u32) {}
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The interview ran its intro and is now in the interview stage.
    Started { interviews_today: u32 },
    /// The daily limit is reached; nothing was counted.
    Paywall { interviews_today: u32 },
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The answer was recorded and the next question presented.
    Advanced {
        record: AnswerRecord,
        next_index: usize,
    },
    /// The last answer was recorded and the session is complete.
    Completed {
        record: AnswerRecord,
        overall_score: u32,
    },
    Rejected(Rejection),
}

impl SubmitOutcome {
    pub fn record(&self) -> Option<&AnswerRecord> {
        match self {
            SubmitOutcome::Advanced { record, .. } | SubmitOutcome::Completed { record, .. } => {
                Some(record)
            }
            SubmitOutcome::Rejected(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

const REC_IDLE: u8 = 0;
const REC_ACTIVE: u8 = 1;
const REC_STOPPING: u8 = 2;

#[derive(Default)]
struct Inner {
    session: SessionState,
    hints_visible: bool,
    paywall_visible: bool,
}

enum Admission {
    Go { interviews_today: u32, session: Uuid },
    Paywall(u32),
    Refuse(Rejection),
}

/// Held while an answer is being graded; clears the flag on drop.
struct GradingGuard<'a>(&'a AtomicBool);

impl<'a> GradingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GradingGuard(flag))
    }
}

impl Drop for GradingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn rejected(op: &str, rejection: Rejection) -> Rejection {
    debug!(op, %rejection, "operation rejected");
    rejection
}

fn append_text(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

/// Drives one interview session at a time.
///
/// All methods take `&self`; share the controller behind an `Arc` to run
/// the timer alongside user input.
pub struct InterviewController {
    bank: QuestionBank,
    config: ControllerConfig,
    usage: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    narrator: Arc<dyn Narrator>,
    transcriber: Option<Arc<dyn Transcriber>>,
    recorder: Option<Arc<dyn AudioRecorder>>,
    observer: Arc<dyn SessionObserver>,
    inner: Mutex<Inner>,
    voice_enabled: AtomicBool,
    grading: AtomicBool,
    recording: AtomicU8,
}

impl InterviewController {
    pub fn new(bank: QuestionBank, usage: Arc<dyn UsageStore>, config: ControllerConfig) -> Self {
        let voice_enabled = AtomicBool::new(config.voice_enabled);
        Self {
            bank,
            config,
            usage,
            clock: Arc::new(SystemClock),
            narrator: Arc::new(SilentNarrator),
            transcriber: None,
            recorder: None,
            observer: Arc::new(NoopObserver),
            inner: Mutex::new(Inner::default()),
            voice_enabled,
            grading: AtomicBool::new(false),
            recording: AtomicU8::new(REC_IDLE),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = narrator;
        self
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn AudioRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // -- setup ------------------------------------------------------------

    pub fn select_role(&self, role: Role) -> Result<(), Rejection> {
        self.update_setup("select_role", |s| s.role = Some(role))
    }

    pub fn select_level(&self, level: Level) -> Result<(), Rejection> {
        self.update_setup("select_level", |s| s.level = Some(level))
    }

    /// A duration of zero leaves the setup incomplete.
    pub fn select_duration(&self, minutes: u32) -> Result<(), Rejection> {
        self.update_setup("select_duration", |s| s.duration_minutes = Some(minutes))
    }

    /// Select role, level and duration in one step.
    pub fn configure(&self, config: InterviewConfig) -> Result<(), Rejection> {
        self.update_setup("configure", |s| *s = config.into())
    }

    fn update_setup(
        &self,
        op: &str,
        f: impl FnOnce(&mut PartialConfig),
    ) -> Result<(), Rejection> {
        let mut inner = self.inner.lock();
        if inner.session.stage != Stage::Setup {
            return Err(rejected(op, Rejection::WrongStage));
        }
        f(&mut inner.session.setup);
        Ok(())
    }

    /// Interviews counted for today so far.
    pub fn interviews_today(&self) -> Result<u32> {
        self.usage.get(&date_key(self.clock.today()))
    }

    /// Begin the interview: check the daily limit, count the interview,
    /// narrate the intro, then present the first question.
    ///
    /// Returns once the first question has been presented. Usage-store
    /// failures are returned as errors.
    pub async fn start_interview(&self) -> Result<StartOutcome> {
        let today = date_key(self.clock.today());
        let admission = {
            let mut inner = self.inner.lock();
            self.admit(&mut inner, &today)?
        };

        match admission {
            Admission::Refuse(rejection) => Ok(StartOutcome::Rejected(rejection)),
            Admission::Paywall(count) => {
                info!(
                    interviews_today = count,
                    limit = self.config.daily_limit,
                    "daily interview limit reached"
                );
                self.observer.on_paywall(count, self.config.daily_limit);
                self.say(&script::paywall(self.config.daily_limit)).await;
                Ok(StartOutcome::Paywall {
                    interviews_today: count,
                })
            }
            Admission::Go {
                interviews_today,
                session,
            } => {
                info!(%session, interviews_today, "interview started");
                self.observer.on_stage_changed(Stage::Setup, Stage::Intro);
                self.say(script::INTRO).await;
                tokio::time::sleep(self.config.intro_settle).await;

                let entered = {
                    let mut inner = self.inner.lock();
                    if inner.session.id == session && inner.session.stage == Stage::Intro {
                        inner.session.stage = Stage::Interview;
                        true
                    } else {
                        false
                    }
                };
                if entered {
                    self.observer.on_stage_changed(Stage::Intro, Stage::Interview);
                    self.present_current(session, self.config.first_question_delay)
                        .await;
                }
                Ok(StartOutcome::Started { interviews_today })
            }
        }
    }

    fn admit(&self, inner: &mut Inner, today: &str) -> Result<Admission> {
        if inner.session.stage != Stage::Setup {
            return Ok(Admission::Refuse(rejected(
                "start_interview",
                Rejection::WrongStage,
            )));
        }
        let used = self.usage.get(today)?;
        if used >= self.config.daily_limit {
            inner.paywall_visible = true;
            return Ok(Admission::Paywall(used));
        }
        let Some(config) = inner.session.setup.complete() else {
            return Ok(Admission::Refuse(rejected(
                "start_interview",
                Rejection::IncompleteSetup,
            )));
        };
        let questions = self.bank.questions_for(config.role).to_vec();
        if questions.is_empty() {
            return Ok(Admission::Refuse(rejected(
                "start_interview",
                Rejection::NoQuestions,
            )));
        }
        let interviews_today = self.usage.increment(today)?;

        let session = &mut inner.session;
        session.questions = questions;
        session.current_index = 0;
        session.stage = Stage::Intro;
        Ok(Admission::Go {
            interviews_today,
            session: session.id,
        })
    }

    // -- answering --------------------------------------------------------

    /// Replace the pending answer.
    pub fn set_answer(&self, text: &str) -> Result<(), Rejection> {
        let mut inner = self.inner.lock();
        if inner.session.stage != Stage::Interview {
            return Err(rejected("set_answer", Rejection::NotInterviewing));
        }
        inner.session.pending_answer = text.to_string();
        Ok(())
    }

    /// Append to the pending answer, separated by a space.
    pub fn append_answer(&self, text: &str) -> Result<(), Rejection> {
        let mut inner = self.inner.lock();
        if inner.session.stage != Stage::Interview {
            return Err(rejected("append_answer", Rejection::NotInterviewing));
        }
        append_text(&mut inner.session.pending_answer, text);
        Ok(())
    }

    pub fn pending_answer(&self) -> String {
        self.inner.lock().session.pending_answer.clone()
    }

    /// Score the pending answer, narrate feedback, then advance.
    ///
    /// Only one submission is graded at a time. The next question is not
    /// presented until feedback narration has finished or failed.
    pub async fn submit_answer(&self) -> SubmitOutcome {
        let (guard, question, answer, index, is_last, session) = {
            let inner = self.inner.lock();
            let state = &inner.session;
            if state.stage != Stage::Interview {
                return SubmitOutcome::Rejected(rejected("submit", Rejection::NotInterviewing));
            }
            let answer = state.pending_answer.trim().to_string();
            if answer.is_empty() {
                return SubmitOutcome::Rejected(rejected("submit", Rejection::EmptyAnswer));
            }
            let Some(question) = state.current_question().cloned() else {
                return SubmitOutcome::Rejected(rejected("submit", Rejection::NotInterviewing));
            };
            let Some(guard) = GradingGuard::acquire(&self.grading) else {
                return SubmitOutcome::Rejected(rejected("submit", Rejection::GradingInFlight));
            };
            (
                guard,
                question,
                answer,
                state.current_index,
                state.is_last_question(),
                state.id,
            )
        };

        let result = score_answer(&question, &answer);
        let record = AnswerRecord::new(
            question.id.as_str(),
            answer,
            self.clock.now().with_timezone(&Utc),
            result,
        );
        {
            let mut inner = self.inner.lock();
            inner.session.answers.push(record.clone());
            inner.session.pending_answer.clear();
        }
        info!(question = %record.question_id, score = record.score, "answer scored");
        self.observer.on_answer_scored(&record);

        self.say(script::spoken_feedback(record.score, is_last))
            .await;
        tokio::time::sleep(self.config.feedback_settle).await;

        let next_index = {
            let mut inner = self.inner.lock();
            if is_last {
                inner.session.stage = Stage::Complete;
                None
            } else {
                inner.session.current_index = index + 1;
                inner.hints_visible = false;
                Some(index + 1)
            }
        };
        drop(guard);

        match next_index {
            Some(next_index) => {
                self.present_current(session, self.config.next_question_delay)
                    .await;
                SubmitOutcome::Advanced { record, next_index }
            }
            None => {
                let overall_score = self.overall_score();
                info!(%session, overall_score, "interview complete");
                self.observer
                    .on_stage_changed(Stage::Interview, Stage::Complete);
                self.say(script::COMPLETION).await;
                SubmitOutcome::Completed {
                    record,
                    overall_score,
                }
            }
        }
    }

    /// Go back one question. Earlier answers stay in the log.
    pub async fn previous_question(&self) -> Result<usize, Rejection> {
        let (index, session) = {
            let mut inner = self.inner.lock();
            if inner.session.stage != Stage::Interview {
                return Err(rejected("previous", Rejection::NotInterviewing));
            }
            if self.grading.load(Ordering::Acquire) {
                return Err(rejected("previous", Rejection::GradingInFlight));
            }
            if inner.session.current_index == 0 {
                return Err(rejected("previous", Rejection::AtFirstQuestion));
            }
            inner.session.current_index -= 1;
            inner.hints_visible = false;
            (inner.session.current_index, inner.session.id)
        };
        self.present_current(session, self.config.next_question_delay)
            .await;
        Ok(index)
    }

    /// Narrate the current question again.
    pub async fn repeat_question(&self) -> Result<(), Rejection> {
        let question = {
            let inner = self.inner.lock();
            if inner.session.stage != Stage::Interview {
                return Err(rejected("repeat", Rejection::NotInterviewing));
            }
            inner.session.current_question().cloned()
        };
        if let Some(question) = question {
            self.say(&question.prompt).await;
        }
        Ok(())
    }

    async fn present_current(&self, session: Uuid, delay: Duration) {
        tokio::time::sleep(delay).await;
        let (question, index, total) = {
            let mut inner = self.inner.lock();
            let state = &mut inner.session;
            if state.id != session || state.stage != Stage::Interview {
                return;
            }
            let Some(question) = state.current_question().cloned() else {
                return;
            };
            if !state.timer_started {
                state.timer_started = true;
                debug!("timer started");
            }
            (question, state.current_index, state.questions.len())
        };
        self.observer.on_question(index, total, &question);
        self.say(&question.prompt).await;
    }

    // -- hints, paywall, voice --------------------------------------------

    /// Flip hint visibility, returning the new state.
    pub fn toggle_hints(&self) -> Result<bool, Rejection> {
        let mut inner = self.inner.lock();
        if inner.session.stage != Stage::Interview {
            return Err(rejected("toggle_hints", Rejection::NotInterviewing));
        }
        inner.hints_visible = !inner.hints_visible;
        Ok(inner.hints_visible)
    }

    /// Hints for the current question, empty while hidden.
    pub fn visible_hints(&self) -> Vec<String> {
        let inner = self.inner.lock();
        if !inner.hints_visible {
            return Vec::new();
        }
        inner
            .session
            .current_question()
            .map(|q| q.hints.clone())
            .unwrap_or_default()
    }

    pub fn paywall_visible(&self) -> bool {
        self.inner.lock().paywall_visible
    }

    pub fn dismiss_paywall(&self) {
        self.inner.lock().paywall_visible = false;
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled.load(Ordering::Acquire)
    }

    pub fn set_voice_enabled(&self, enabled: bool) {
        self.voice_enabled.store(enabled, Ordering::Release);
        info!(enabled, "voice toggled");
    }

    // -- voice input ------------------------------------------------------

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire) != REC_IDLE
    }

    pub async fn start_recording(&self) -> Result<(), VoiceInputError> {
        if self.stage() != Stage::Interview {
            return Err(rejected("start_recording", Rejection::NotInterviewing).into());
        }
        if self
            .recording
            .compare_exchange(REC_IDLE, REC_ACTIVE, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(rejected("start_recording", Rejection::RecordingActive).into());
        }
        let Some(recorder) = &self.recorder else {
            self.recording.store(REC_IDLE, Ordering::Release);
            return Err(VoiceInputError::Failed(
                CollaboratorError::Unavailable("no audio recorder configured".into()).into(),
            ));
        };
        if let Err(e) = recorder.start().await {
            self.recording.store(REC_IDLE, Ordering::Release);
            warn!("failed to start recording: {e:#}");
            return Err(VoiceInputError::Failed(e));
        }
        info!("recording started");
        Ok(())
    }

    /// Stop recording, transcribe, and append the text to the pending answer.
    ///
    /// On failure the pending answer is unchanged.
    pub async fn stop_recording(&self) -> Result<String, VoiceInputError> {
        if self
            .recording
            .compare_exchange(REC_ACTIVE, REC_STOPPING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(rejected("stop_recording", Rejection::NotRecording).into());
        }
        let clip = match &self.recorder {
            Some(recorder) => recorder.stop().await,
            None => Err(CollaboratorError::Unavailable("no audio recorder configured".into()).into()),
        };
        self.recording.store(REC_IDLE, Ordering::Release);

        let clip = clip.map_err(|e| {
            warn!("failed to stop recording: {e:#}");
            VoiceInputError::Failed(e)
        })?;
        if clip.is_empty() {
            debug!("recording captured no audio");
            return Ok(String::new());
        }

        let Some(transcriber) = &self.transcriber else {
            return Err(VoiceInputError::Failed(
                CollaboratorError::Unavailable("no transcriber configured".into()).into(),
            ));
        };
        let timeout = self.config.transcription_timeout;
        let text = match tokio::time::timeout(timeout, transcriber.transcribe(&clip)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("transcription via {} failed: {e:#}", transcriber.name());
                return Err(VoiceInputError::Failed(e));
            }
            Err(_) => {
                let e = CollaboratorError::Timeout(timeout.as_millis() as u64);
                warn!("transcription via {} {e}", transcriber.name());
                return Err(VoiceInputError::Failed(e.into()));
            }
        };

        let text = text.trim().to_string();
        if !text.is_empty() {
            let mut inner = self.inner.lock();
            if inner.session.stage == Stage::Interview {
                append_text(&mut inner.session.pending_answer, &text);
            } else {
                debug!("discarding transcript outside the interview stage");
            }
        }
        Ok(text)
    }

    // -- timer ------------------------------------------------------------

    /// Advance the elapsed time by one second if the timer is running.
    pub fn tick(&self) -> u64 {
        let mut inner = self.inner.lock();
        let state = &mut inner.session;
        if state.stage == Stage::Interview && state.timer_started {
            state.elapsed_seconds += 1;
        }
        state.elapsed_seconds
    }

    /// Call [`tick`](Self::tick) once a second until the session completes
    /// or is reset.
    pub async fn run_timer(&self) {
        let session = self.inner.lock().session.id;
        let period = Duration::from_secs(1);
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            interval.tick().await;
            {
                let inner = self.inner.lock();
                if inner.session.id != session || inner.session.stage == Stage::Complete {
                    break;
                }
            }
            self.tick();
        }
    }

    // -- session ----------------------------------------------------------

    /// Reset to an empty setup. The daily counter is kept.
    pub fn new_interview(&self) -> Result<(), Rejection> {
        {
            let mut inner = self.inner.lock();
            if inner.session.stage != Stage::Complete {
                return Err(rejected("new_interview", Rejection::WrongStage));
            }
            *inner = Inner::default();
        }
        info!("session reset");
        self.observer.on_stage_changed(Stage::Complete, Stage::Setup);
        Ok(())
    }

    pub fn stage(&self) -> Stage {
        self.inner.lock().session.stage
    }

    pub fn current_question(&self) -> Option<Question> {
        self.inner.lock().session.current_question().cloned()
    }

    /// A copy of the current session state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.lock().session.clone()
    }

    pub fn answers(&self) -> Vec<AnswerRecord> {
        self.inner.lock().session.answers.clone()
    }

    pub fn overall_score(&self) -> u32 {
        statistics::overall_score(&self.inner.lock().session.answers)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_state(&self.inner.lock().session)
    }

    // -- narration --------------------------------------------------------

    /// Say a line, narrating it when voice is on. Never fails.
    async fn say(&self, text: &str) {
        self.observer.on_line(text);
        if !self.voice_enabled() {
            return;
        }
        self.observer.on_narration(NarrationEvent::Started, text);
        let timeout = self.config.narration_timeout;
        match tokio::time::timeout(timeout, self.narrator.speak(text)).await {
            Ok(Ok(())) => {
                self.observer.on_narration(NarrationEvent::Completed, text);
            }
            Ok(Err(e)) => {
                match e.downcast_ref::<CollaboratorError>() {
                    Some(CollaboratorError::Unavailable(reason)) => {
                        warn!("narrator {} unavailable: {reason}", self.narrator.name());
                    }
                    _ => {
                        warn!("narration via {} failed: {e:#}", self.narrator.name());
                    }
                }
                self.observer.on_narration(NarrationEvent::Failed, text);
            }
            Err(_) => {
                warn!(
                    "narration via {} timed out after {}ms",
                    self.narrator.name(),
                    timeout.as_millis()
                );
                self.observer.on_narration(NarrationEvent::Failed, text);
            }
        }
    }
}
