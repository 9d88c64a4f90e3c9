//! One form session: field values, attachments, progress and the reset timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::pipeline::{self, publish, SubmissionReport};
use super::progress::{ProgressEvent, SubmissionProgress};
use crate::config::{PriorityLabels, StoredCredentials};
use crate::error::ValidationError;
use crate::models::{Attachment, AttachmentSet, FormState};
use crate::trello::{CardApi, NewCard};
use crate::{Error, Result};

/// Delay between a successful submission and the session reset.
pub const RESET_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
struct SessionState {
    form: FormState,
    attachments: AttachmentSet,
}

/// Owns everything one user edits and submits.
pub struct DemandSession<A: CardApi> {
    api: A,
    labels: PriorityLabels,
    state: Arc<Mutex<SessionState>>,
    progress: Arc<watch::Sender<SubmissionProgress>>,
    in_flight: AtomicBool,
    pending_reset: Mutex<Option<JoinHandle<()>>>,
}

impl<A: CardApi> DemandSession<A> {
    pub fn new(api: A, labels: PriorityLabels) -> Self {
        let (progress, _) = watch::channel(SubmissionProgress::default());
        Self {
            api,
            labels,
            state: Arc::new(Mutex::new(SessionState::default())),
            progress: Arc::new(progress),
            in_flight: AtomicBool::new(false),
            pending_reset: Mutex::new(None),
        }
    }

    /// Snapshot of the current field values.
    pub fn form(&self) -> FormState {
        lock(&self.state).form.clone()
    }

    /// Edit the form in place.
    pub fn update_form(&self, edit: impl FnOnce(&mut FormState)) {
        edit(&mut lock(&self.state).form);
    }

    /// File names currently attached, in order.
    pub fn attachment_names(&self) -> Vec<String> {
        lock(&self.state)
            .attachments
            .iter()
            .map(|file| file.file_name.clone())
            .collect()
    }

    pub fn add_attachments(&self, batch: Vec<Attachment>) -> std::result::Result<(), ValidationError> {
        lock(&self.state).attachments.add(batch)
    }

    pub fn remove_attachment(&self, index: usize) -> Option<Attachment> {
        lock(&self.state).attachments.remove(index)
    }

    /// Current progress snapshot.
    pub fn progress(&self) -> SubmissionProgress {
        self.progress.borrow().clone()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<SubmissionProgress> {
        self.progress.subscribe()
    }

    /// Validate and submit the current form.
    ///
    /// Validation failures leave the progress idle, make no remote call and
    /// keep any reset already scheduled. On success a reset of the whole
    /// session is scheduled after [`RESET_DELAY`]; on record-creation failure
    /// the form is kept for correction.
    pub async fn submit(&self, credentials: &StoredCredentials) -> Result<SubmissionReport> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let (form, attachments) = {
            let state = lock(&self.state);
            (state.form.clone(), state.attachments.as_slice().to_vec())
        };

        form.validate()?;
        let card = NewCard::from_form(&form, &self.labels)?;
        let credentials = credentials.credentials().ok_or(Error::NotConfigured)?;

        // only a submission that reaches the network supersedes the timer
        self.cancel_pending_reset();
        tracing::info!(
            "Submitting demand '{}' with {} attachment(s)",
            card.name,
            attachments.len()
        );
        let report =
            pipeline::run(&self.api, &credentials, &card, &attachments, &self.progress).await?;

        self.schedule_reset();
        Ok(report)
    }

    fn schedule_reset(&self) {
        let state = Arc::clone(&self.state);
        let progress = Arc::clone(&self.progress);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(RESET_DELAY).await;
            tracing::debug!("Resetting demand form after submission");
            reset_state(&state, &progress);
        });

        if let Some(previous) = lock(&self.pending_reset).replace(handle) {
            previous.abort();
        }
    }

    fn cancel_pending_reset(&self) {
        if let Some(handle) = lock(&self.pending_reset).take() {
            handle.abort();
        }
    }
}

impl<A: CardApi> Drop for DemandSession<A> {
    fn drop(&mut self) {
        self.cancel_pending_reset();
    }
}

fn reset_state(state: &Mutex<SessionState>, progress: &watch::Sender<SubmissionProgress>) {
    {
        let mut state = lock(state);
        state.form.reset();
        state.attachments.clear();
    }
    publish(progress, ProgressEvent::Reset);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::SubmissionInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
