use std::future::Future;
use std::io::{self, IsTerminal};

use demand_core::config::{PriorityLabels, StoredCredentials};
use demand_core::models::{Attachment, FormState, MAX_ATTACHMENTS};
use demand_core::trello::CardApi;
use demand_core::workflow::{DemandSession, SubmissionProgress, SubmissionReport};
use demand_core::{Error, ValidationError};
use tokio::sync::watch;

use crate::cli::SubmitArgs;
use crate::error::CliError;

/// Submit one demand and print the outcome.
///
/// Attachment failures are printed as warnings; the command still succeeds
/// once the card exists.
pub async fn run_submit<A: CardApi>(
    args: SubmitArgs,
    stored: &StoredCredentials,
    api: A,
    labels: PriorityLabels,
) -> Result<SubmissionReport, CliError> {
    if stored.credentials().is_none() {
        return Err(CliError::NotConfigured);
    }

    let form = build_form(&args, stored);
    let attachments = read_attachments(&args)?;

    let session = DemandSession::new(api, labels);
    session.update_form(|current| *current = form);
    session.add_attachments(attachments)?;

    let result = if !args.json && io::stderr().is_terminal() {
        follow_progress(
            session.submit(stored),
            session.subscribe_progress(),
            |progress| eprintln!("{}", format_progress_line(progress)),
        )
        .await
    } else {
        session.submit(stored).await
    };

    let report = result.map_err(|error| match error {
        Error::NotConfigured => CliError::NotConfigured,
        other => CliError::Core(other),
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_report_lines(&report) {
            println!("{line}");
        }
    }
    for failure in &report.failures {
        eprintln!(
            "Warning: failed to attach {}: {}",
            failure.file_name, failure.message
        );
    }

    Ok(report)
}

/// Form values from the arguments. The list id falls back to the stored one.
pub fn build_form(args: &SubmitArgs, stored: &StoredCredentials) -> FormState {
    let target_list_id = args
        .list_id
        .clone()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| stored.list_id.clone());

    FormState {
        title: args.title.trim().to_string(),
        description: args.description.trim().to_string(),
        priority: args.priority,
        deadline: args.deadline,
        category: args.category,
        target_list_id,
    }
}

fn read_attachments(args: &SubmitArgs) -> Result<Vec<Attachment>, CliError> {
    if args.attachments.len() > MAX_ATTACHMENTS {
        return Err(ValidationError::TooManyAttachments {
            max: MAX_ATTACHMENTS,
        }
        .into());
    }
    args.attachments
        .iter()
        .map(|path| Attachment::from_path(path).map_err(CliError::from))
        .collect()
}

/// Drive `work` to completion while emitting progress snapshots.
///
/// Intermediate snapshots may be coalesced, but the state left once `work`
/// finishes is always emitted, and never twice in a row.
pub async fn follow_progress<T>(
    work: impl Future<Output = T>,
    mut progress: watch::Receiver<SubmissionProgress>,
    mut emit: impl FnMut(&SubmissionProgress),
) -> T {
    let mut last_emitted: Option<SubmissionProgress> = None;
    let mut show = |snapshot: SubmissionProgress| {
        if snapshot.current_step.is_empty() || last_emitted.as_ref() == Some(&snapshot) {
            return;
        }
        emit(&snapshot);
        last_emitted = Some(snapshot);
    };

    tokio::pin!(work);
    let output = loop {
        tokio::select! {
            output = &mut work => break output,
            Ok(()) = progress.changed() => show(progress.borrow_and_update().clone()),
        }
    };
    show(progress.borrow().clone());
    output
}

pub fn format_progress_line(progress: &SubmissionProgress) -> String {
    format!("[{:>3}%] {}", progress.overall, progress.current_step)
}

pub fn format_report_lines(report: &SubmissionReport) -> Vec<String> {
    let mut lines = vec![match &report.card_url {
        Some(url) => format!("Created card {} ({url})", report.card_id),
        None => format!("Created card {}", report.card_id),
    }];
    if !report.uploaded.is_empty() {
        lines.push(format!("Attached: {}", report.uploaded.join(", ")));
    }
    if !report.failures.is_empty() {
        lines.push(format!(
            "{} attachment(s) failed",
            report.failures.len()
        ));
    }
    lines
}
