//! Two-phase remote write: create the card, then upload attachments one by one.

use serde::Serialize;
use tokio::sync::watch;

use super::progress::{ProgressEvent, SubmissionProgress};
use crate::config::Credentials;
use crate::models::Attachment;
use crate::trello::{CardApi, CreatedCard, NewCard};
use crate::{Error, Result};

/// A file that could not be attached. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentFailure {
    pub file_name: String,
    pub message: String,
}

/// Outcome of a submission whose card was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub card_id: String,
    pub card_url: Option<String>,
    /// Names of the files attached successfully, in upload order.
    pub uploaded: Vec<String>,
    pub failures: Vec<AttachmentFailure>,
}

impl SubmissionReport {
    fn new(card: &CreatedCard) -> Self {
        Self {
            card_id: card.id.clone(),
            card_url: card.link().map(ToString::to_string),
            uploaded: Vec::new(),
            failures: Vec::new(),
        }
    }
}

pub(crate) fn publish(progress: &watch::Sender<SubmissionProgress>, event: ProgressEvent) {
    progress.send_modify(|state| *state = std::mem::take(state).apply(event));
}

/// Run both phases. The card payload must already be validated.
///
/// Awaits exactly one remote call at a time. A record-creation failure resets
/// the progress and returns [`Error::RecordCreation`]; upload failures are
/// collected into the report.
pub(crate) async fn run<A: CardApi>(
    api: &A,
    credentials: &Credentials,
    card: &NewCard,
    attachments: &[Attachment],
    progress: &watch::Sender<SubmissionProgress>,
) -> Result<SubmissionReport> {
    publish(progress, ProgressEvent::Started);
    publish(progress, ProgressEvent::PayloadPrepared);
    publish(progress, ProgressEvent::RecordRequestSent);

    let created = match api.create_card(credentials, card).await {
        Ok(created) => created,
        Err(error) => {
            tracing::error!("Card creation failed: {}", error);
            publish(progress, ProgressEvent::Failed);
            return Err(match error {
                Error::RecordCreation(_) => error,
                other => Error::RecordCreation(other.to_string()),
            });
        }
    };
    tracing::info!("Created card {}", created.id);

    let total = attachments.len();
    publish(progress, ProgressEvent::RecordCreated { attachments: total });

    let mut report = SubmissionReport::new(&created);
    if total > 0 {
        publish(progress, ProgressEvent::UploadsStarted { total });

        for (index, attachment) in attachments.iter().enumerate() {
            publish(
                progress,
                ProgressEvent::FileUploadStarted {
                    index,
                    total,
                    file_name: attachment.file_name.clone(),
                },
            );

            match api
                .upload_attachment(credentials, &created.id, attachment)
                .await
            {
                Ok(()) => {
                    tracing::debug!("Attached {}", attachment.file_name);
                    report.uploaded.push(attachment.file_name.clone());
                }
                Err(error) => {
                    tracing::warn!("Failed to attach {}: {}", attachment.file_name, error);
                    let message = match error {
                        Error::AttachmentUpload { message, .. } => message,
                        other => other.to_string(),
                    };
                    report.failures.push(AttachmentFailure {
                        file_name: attachment.file_name.clone(),
                        message,
                    });
                }
            }
        }

        publish(progress, ProgressEvent::UploadsFinished { total });
    }

    publish(progress, ProgressEvent::Completed);
    Ok(report)
}
