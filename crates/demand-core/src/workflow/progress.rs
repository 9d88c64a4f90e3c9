//! Submission progress state machine.

use serde::Serialize;

pub const STEP_CREATING: &str = "Creating request...";
pub const STEP_CREATED: &str = "Request created successfully!";
pub const STEP_ATTACHING: &str = "Attaching files...";
pub const STEP_DONE: &str = "Done!";

/// Progress share reached once the card exists; uploads fill the rest.
const RECORD_CREATED_PERCENT: u8 = 50;

/// Coarse phase derived from the progress flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    CreatingRecord,
    RecordCreated,
    UploadingFiles,
    FilesUploaded,
    Completed,
}

/// Per-file counter: `current` files of `total` handled so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileProgress {
    pub current: usize,
    pub total: usize,
}

/// Inputs to [`SubmissionProgress::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started,
    PayloadPrepared,
    RecordRequestSent,
    RecordCreated { attachments: usize },
    UploadsStarted { total: usize },
    FileUploadStarted {
        index: usize,
        total: usize,
        file_name: String,
    },
    UploadsFinished { total: usize },
    Completed,
    /// Record creation failed; everything goes back to the initial state.
    Failed,
    Reset,
}

/// Observable progress of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SubmissionProgress {
    pub creating_record: bool,
    pub record_created: bool,
    pub uploading_files: bool,
    pub files_uploaded: bool,
    pub completed: bool,
    pub current_step: String,
    /// Overall percentage, `0..=100`.
    pub overall: u8,
    pub files: FileProgress,
}

impl SubmissionProgress {
    /// Pure transition: the state after `event`.
    #[must_use]
    pub fn apply(self, event: ProgressEvent) -> Self {
        match event {
            ProgressEvent::Started => Self {
                creating_record: true,
                current_step: STEP_CREATING.to_string(),
                ..Self::default()
            },
            ProgressEvent::PayloadPrepared => Self {
                overall: self.overall.max(20),
                ..self
            },
            ProgressEvent::RecordRequestSent => Self {
                overall: self.overall.max(40),
                ..self
            },
            ProgressEvent::RecordCreated { attachments } => Self {
                creating_record: false,
                record_created: true,
                current_step: STEP_CREATED.to_string(),
                overall: if attachments == 0 {
                    100
                } else {
                    RECORD_CREATED_PERCENT
                },
                ..self
            },
            ProgressEvent::UploadsStarted { total } => Self {
                uploading_files: true,
                current_step: STEP_ATTACHING.to_string(),
                files: FileProgress { current: 0, total },
                ..self
            },
            ProgressEvent::FileUploadStarted {
                index,
                total,
                file_name,
            } => Self {
                current_step: format!("Sending file {} of {total}: {file_name}", index + 1),
                files: FileProgress {
                    current: index,
                    total,
                },
                overall: self.overall.max(upload_percent(index, total)),
                ..self
            },
            ProgressEvent::UploadsFinished { total } => Self {
                uploading_files: false,
                files_uploaded: true,
                files: FileProgress {
                    current: total,
                    total,
                },
                overall: 100,
                ..self
            },
            ProgressEvent::Completed => Self {
                completed: true,
                current_step: STEP_DONE.to_string(),
                overall: 100,
                ..self
            },
            ProgressEvent::Failed | ProgressEvent::Reset => Self::default(),
        }
    }

    /// Phase implied by the flags.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.completed {
            Phase::Completed
        } else if self.files_uploaded {
            Phase::FilesUploaded
        } else if self.uploading_files {
            Phase::UploadingFiles
        } else if self.record_created {
            Phase::RecordCreated
        } else if self.creating_record {
            Phase::CreatingRecord
        } else {
            Phase::Idle
        }
    }

    /// `true` while a submission is between start and completion.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        !matches!(self.phase(), Phase::Idle | Phase::Completed)
    }
}

/// `50 + index/total * 50`, floored. Below 100 for every `index < total`.
fn upload_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return RECORD_CREATED_PERCENT;
    }
    let share = index.min(total) * 50 / total;
    RECORD_CREATED_PERCENT + u8::try_from(share).unwrap_or(50)
}
