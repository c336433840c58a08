//! Quest sessions: one visitor's shell + wizard, driven by tokio timers.
//!
//! The wizard and shell are plain state machines; this module supplies the
//! clock. Every dwell (interstitial, loading screen, advisory) is a spawned
//! task holding only a `Weak` handle to its session and the epoch it was
//! scheduled in. Tearing a wizard down bumps the epoch and aborts pending
//! timers, so a late callback can never act on a wizard that is gone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::QuestConfig;
use crate::content;
use crate::error::SessionError;
use crate::quest::{
    ActivePage, NavOutcome, QuestWizard, Section, SectionPatch, Snapshot, TagField,
    TransitionOutcome, WizardView,
};
use crate::shell::{HostNavigation, Screen, Shell};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Dwell times a session runs with.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimings {
    pub interstitial: Duration,
    pub loading: Duration,
    pub advisory: Duration,
}

impl From<&QuestConfig> for SessionTimings {
    fn from(config: &QuestConfig) -> Self {
        Self {
            interstitial: config.interstitial_dwell,
            loading: config.loading_dwell,
            advisory: config.advisory_ttl,
        }
    }
}

/// Events pushed to subscribers (server → client).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Full state (sent on connect and after a lagged receive).
    SessionSync { session: SessionView },
    ScreenChanged { screen: Screen },
    /// The interstitial after `step` is showing.
    TransitionStarted {
        step: u8,
        title: &'static str,
        insight: &'static str,
        data: &'static str,
    },
    StepEntered { step: u8, page: ActivePage, score: u32 },
    PageChanged { page: ActivePage },
    ProfileUpdated { section: Section, score: u32 },
    StackDraftChanged { text: String },
    AdvisoryRaised { message: &'static str },
    AdvisoryCleared,
    ResultsReady { profile_digest: String, score: u32 },
}

/// Serializable state of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub screen: Screen,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wizard: Option<WizardView>,
    pub results_ready: bool,
    pub score: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Interstitial,
    Loading,
    Advisory,
}

#[derive(Default)]
struct Timers {
    interstitial: Option<JoinHandle<()>>,
    loading: Option<JoinHandle<()>>,
    advisory: Option<JoinHandle<()>>,
}

impl Timers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<JoinHandle<()>> {
        match kind {
            TimerKind::Interstitial => &mut self.interstitial,
            TimerKind::Loading => &mut self.loading,
            TimerKind::Advisory => &mut self.advisory,
        }
    }

    fn abort_all(&mut self) {
        for handle in [
            self.interstitial.take(),
            self.loading.take(),
            self.advisory.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}

struct SessionInner {
    shell: Shell,
    wizard: Option<QuestWizard>,
    /// Bumped on every teardown; timers from older epochs are ignored.
    epoch: u64,
    timers: Timers,
}

/// One visitor's quest.
pub struct QuestSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active_ms: AtomicI64,
    timings: SessionTimings,
    inner: RwLock<SessionInner>,
    tx: broadcast::Sender<SessionEvent>,
    me: Weak<QuestSession>,
}

impl QuestSession {
    pub fn new(timings: SessionTimings) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        let now = Utc::now();
        Arc::new_cyclic(|me| Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active_ms: AtomicI64::new(now.timestamp_millis()),
            timings,
            inner: RwLock::new(SessionInner {
                shell: Shell::new(),
                wizard: None,
                epoch: 0,
                timers: Timers::default(),
            }),
            tx,
            me: me.clone(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Subscribe to session events. Each WS client calls this.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Whether any client is currently listening for events.
    pub fn has_subscribers(&self) -> bool {
        self.tx.receiver_count() > 0
    }

    /// When the visitor last did something.
    pub fn last_active(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_active_ms.load(Ordering::Relaxed))
            .unwrap_or(self.created_at)
    }

    /// Record visitor activity.
    pub fn touch(&self) {
        self.last_active_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn emit(&self, event: SessionEvent) {
        // Ok if no receivers are listening
        let _ = self.tx.send(event);
    }

    pub async fn view(&self) -> SessionView {
        let inner = self.inner.read().await;
        self.view_of(&inner)
    }

    fn view_of(&self, inner: &SessionInner) -> SessionView {
        let wizard = inner.wizard.as_ref().map(QuestWizard::view);
        let score = match (&wizard, inner.shell.results()) {
            (Some(w), _) => w.score,
            (None, Some(results)) => results.score.score,
            (None, None) => 0,
        };
        SessionView {
            id: self.id,
            screen: inner.shell.screen(),
            results_ready: inner.shell.screen() == Screen::Results,
            wizard,
            score,
            created_at: self.created_at,
        }
    }

    // ── Shell transitions ───────────────────────────────────────────────

    /// Leave the landing page and mount a fresh wizard.
    pub async fn start(&self) -> Result<SessionView, SessionError> {
        self.touch();
        let mut inner = self.inner.write().await;
        inner.shell.start()?;
        Self::teardown_locked(&mut inner);
        inner.wizard = Some(QuestWizard::new());
        info!(session_id = %self.id, "Quest started");
        self.emit(SessionEvent::ScreenChanged {
            screen: Screen::Wizard,
        });
        Ok(self.view_of(&inner))
    }

    /// Abandon the wizard and return to the landing page.
    pub async fn exit(&self) -> Result<SessionView, SessionError> {
        self.touch();
        let mut inner = self.inner.write().await;
        self.exit_locked(&mut inner)?;
        Ok(self.view_of(&inner))
    }

    /// Leave the results screen, discarding the finished profile.
    pub async fn reset(&self) -> Result<SessionView, SessionError> {
        self.touch();
        let mut inner = self.inner.write().await;
        inner.shell.reset()?;
        Self::teardown_locked(&mut inner);
        info!(session_id = %self.id, "Quest reset");
        self.emit(SessionEvent::ScreenChanged {
            screen: Screen::Landing,
        });
        Ok(self.view_of(&inner))
    }

    fn exit_locked(&self, inner: &mut SessionInner) -> Result<(), SessionError> {
        inner.shell.exit()?;
        Self::teardown_locked(inner);
        info!(session_id = %self.id, "Quest exited");
        self.emit(SessionEvent::ScreenChanged {
            screen: Screen::Landing,
        });
        Ok(())
    }

    /// Drop the wizard and cancel everything it scheduled.
    fn teardown_locked(inner: &mut SessionInner) {
        inner.timers.abort_all();
        inner.wizard = None;
        inner.epoch += 1;
    }

    /// Cancel all pending timers. Called when the session is removed.
    pub async fn teardown(&self) {
        let mut inner = self.inner.write().await;
        Self::teardown_locked(&mut inner);
    }

    /// The results of the finished quest (results screen only).
    pub async fn snapshot(&self) -> Result<Snapshot, SessionError> {
        self.touch();
        let inner = self.inner.read().await;
        let screen = inner.shell.screen();
        match (screen, inner.shell.results()) {
            (Screen::Results, Some(snapshot)) => Ok(snapshot.clone()),
            _ => Err(SessionError::ResultsUnavailable { screen }),
        }
    }

    // ── Wizard navigation ───────────────────────────────────────────────

    /// Sub-form "next".
    pub async fn next_page(&self) -> Result<SessionView, SessionError> {
        self.navigate(QuestWizard::next_page).await
    }

    /// Sub-form "previous".
    pub async fn prev_page(&self) -> Result<SessionView, SessionError> {
        self.navigate(QuestWizard::prev_page).await
    }

    /// Finish the current step outright.
    pub async fn advance(&self) -> Result<SessionView, SessionError> {
        self.navigate(QuestWizard::advance).await
    }

    /// Go back one step, or leave the wizard from the first one.
    pub async fn retreat(&self) -> Result<SessionView, SessionError> {
        self.navigate(QuestWizard::retreat).await
    }

    async fn navigate(
        &self,
        op: fn(&mut QuestWizard) -> NavOutcome,
    ) -> Result<SessionView, SessionError> {
        self.touch();
        let mut inner = self.inner.write().await;
        let screen = inner.shell.screen();
        let wizard = inner
            .wizard
            .as_mut()
            .ok_or(SessionError::WizardInactive { screen })?;

        let outcome = op(wizard);
        let step = wizard.step();
        let score = wizard.score();

        match outcome {
            NavOutcome::PageChanged(page) => self.emit(SessionEvent::PageChanged { page }),
            NavOutcome::StepEntered(step) => self.emit(SessionEvent::StepEntered {
                step,
                page: ActivePage::first_of(step),
                score,
            }),
            NavOutcome::TransitionStarted { step, advisory } => {
                if let Some(info) = content::quest_step(step) {
                    self.emit(SessionEvent::TransitionStarted {
                        step,
                        title: info.transition_title,
                        insight: info.transition_insight,
                        data: info.transition_data,
                    });
                }
                self.schedule(&mut inner, TimerKind::Interstitial);
                if advisory {
                    warn!(session_id = %self.id, "Governance completed without compliance standards");
                    self.emit(SessionEvent::AdvisoryRaised {
                        message: crate::quest::wizard::COMPLIANCE_ADVISORY,
                    });
                    self.schedule(&mut inner, TimerKind::Advisory);
                }
            }
            NavOutcome::Exit => self.exit_locked(&mut inner)?,
            NavOutcome::Ignored => debug!(session_id = %self.id, step, "Navigation ignored during interstitial"),
        }

        Ok(self.view_of(&inner))
    }

    // ── Profile edits ───────────────────────────────────────────────────

    async fn with_wizard<T>(
        &self,
        f: impl FnOnce(&mut QuestWizard) -> T,
    ) -> Result<(T, SessionView), SessionError> {
        self.touch();
        let mut inner = self.inner.write().await;
        let screen = inner.shell.screen();
        let wizard = inner
            .wizard
            .as_mut()
            .ok_or(SessionError::WizardInactive { screen })?;
        let out = f(wizard);
        Ok((out, self.view_of(&inner)))
    }

    /// Shallow-merge a partial update into one section.
    pub async fn update_section(&self, patch: SectionPatch) -> Result<SessionView, SessionError> {
        let section = patch.section();
        let (score, view) = self
            .with_wizard(|w| {
                w.update_section(patch);
                w.score()
            })
            .await?;
        self.emit(SessionEvent::ProfileUpdated { section, score });
        Ok(view)
    }

    /// Toggle one tag. Surrounding whitespace is ignored; blank tags are rejected.
    pub async fn toggle_tag(&self, field: TagField, tag: &str) -> Result<SessionView, SessionError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(SessionError::BlankTag);
        }
        let (score, view) = self
            .with_wizard(|w| {
                w.toggle_tag(field, tag);
                w.score()
            })
            .await?;
        self.emit(SessionEvent::ProfileUpdated {
            section: field.section(),
            score,
        });
        Ok(view)
    }

    pub async fn set_stack_draft(&self, text: String) -> Result<SessionView, SessionError> {
        let (_, view) = self.with_wizard(|w| w.set_stack_draft(text.clone())).await?;
        self.emit(SessionEvent::StackDraftChanged { text });
        Ok(view)
    }

    /// Commit the stack draft as a custom technology.
    pub async fn add_custom_stack(&self) -> Result<SessionView, SessionError> {
        let ((added, score), view) = self
            .with_wizard(|w| (w.add_custom_stack(), w.score()))
            .await?;
        if let Some(entry) = added {
            debug!(session_id = %self.id, stack = %entry, "Custom stack added");
            self.emit(SessionEvent::StackDraftChanged {
                text: String::new(),
            });
            self.emit(SessionEvent::ProfileUpdated {
                section: Section::Tech,
                score,
            });
        }
        Ok(view)
    }

    // ── Timers ──────────────────────────────────────────────────────────

    fn delay_for(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::Interstitial => self.timings.interstitial,
            TimerKind::Loading => self.timings.loading,
            TimerKind::Advisory => self.timings.advisory,
        }
    }

    /// Start (or restart) a timer of `kind` in the current epoch.
    fn schedule(&self, inner: &mut SessionInner, kind: TimerKind) {
        let delay = self.delay_for(kind);
        let epoch = inner.epoch;
        let session = self.me.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(session) = session.upgrade() {
                session.fire(kind, epoch).await;
            }
        });

        if let Some(previous) = inner.timers.slot(kind).replace(handle) {
            previous.abort();
        }
    }

    async fn fire(&self, kind: TimerKind, epoch: u64) {
        let mut inner = self.inner.write().await;
        if inner.epoch != epoch {
            debug!(session_id = %self.id, ?kind, "Stale timer ignored");
            return;
        }
        // Forget our own handle so rescheduling doesn't abort this task.
        inner.timers.slot(kind).take();

        match kind {
            TimerKind::Interstitial => self.on_interstitial_elapsed(&mut inner),
            TimerKind::Loading => match inner.shell.loading_elapsed() {
                Ok(()) => {
                    self.emit(SessionEvent::ScreenChanged {
                        screen: Screen::Results,
                    });
                    if let Some(results) = inner.shell.results() {
                        self.emit(SessionEvent::ResultsReady {
                            profile_digest: results.profile_digest.clone(),
                            score: results.score.score,
                        });
                    }
                }
                Err(e) => warn!(session_id = %self.id, error = %e, "Loading timer fired off-screen"),
            },
            TimerKind::Advisory => {
                if let Some(wizard) = inner.wizard.as_mut() {
                    if wizard.dismiss_advisory() {
                        self.emit(SessionEvent::AdvisoryCleared);
                    }
                }
            }
        }
    }

    fn on_interstitial_elapsed(&self, inner: &mut SessionInner) {
        let Some(wizard) = inner.wizard.as_mut() else {
            return;
        };

        match wizard.transition_complete() {
            TransitionOutcome::StepEntered(step) => {
                info!(session_id = %self.id, step, "Step entered");
                self.emit(SessionEvent::StepEntered {
                    step,
                    page: wizard.page(),
                    score: wizard.score(),
                });
            }
            TransitionOutcome::Completed(profile) => {
                if let Err(e) = inner.shell.complete(*profile) {
                    warn!(session_id = %self.id, error = %e, "Could not hand off completed quest");
                    return;
                }
                info!(session_id = %self.id, "Quest completed");
                if let Some(advisory) = inner.timers.advisory.take() {
                    advisory.abort();
                }
                inner.wizard = None;
                self.emit(SessionEvent::ScreenChanged {
                    screen: Screen::Loading,
                });
                self.schedule(inner, TimerKind::Loading);
            }
            TransitionOutcome::NotTransitioning => {}
        }
    }
}

impl Drop for QuestSession {
    fn drop(&mut self) {
        self.inner.get_mut().timers.abort_all();
    }
}

/// All live sessions, keyed by id.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<QuestSession>>>,
    timings: SessionTimings,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(config: &QuestConfig) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            timings: SessionTimings::from(config),
            idle_timeout: config.session_idle_timeout,
            max_sessions: config.max_sessions,
        })
    }

    /// Create a session on the landing screen, unless the registry is full.
    pub async fn create(&self) -> Result<Arc<QuestSession>, SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            warn!(limit = self.max_sessions, "Session limit reached");
            return Err(SessionError::CapacityReached {
                limit: self.max_sessions,
            });
        }

        let session = QuestSession::new(self.timings);
        sessions.insert(session.id(), Arc::clone(&session));
        info!(session_id = %session.id(), "Session created");
        Ok(session)
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<QuestSession>, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound { id })
    }

    /// Remove a session and cancel its timers. Returns `false` if unknown.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(session) => {
                session.teardown().await;
                info!(session_id = %id, "Session removed");
                true
            }
            None => false,
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove sessions idle longer than the configured timeout. Sessions
    /// with a connected event subscriber are kept.
    /// Returns the number removed.
    pub async fn prune_idle(&self) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(self.idle_timeout)
            .ok()
            .and_then(|timeout| Utc::now().checked_sub_signed(timeout))
        else {
            return 0;
        };

        let stale: Vec<Arc<QuestSession>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .values()
                .filter(|s| s.last_active() < cutoff && !s.has_subscribers())
                .map(|s| s.id())
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &stale {
            session.teardown().await;
        }
        if !stale.is_empty() {
            info!(count = stale.len(), "Pruned idle sessions");
        }
        stale.len()
    }
}

/// Spawn a background task that periodically prunes idle sessions.
pub fn spawn_prune_task(registry: Arc<SessionRegistry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            registry.prune_idle().await;
        }
    })
}
