//! Headless driver: submits documents to the analysis backend and follows
//! the run to its terminal state on the terminal.
//!
//! Usage:
//!   clausecheck_app <base-url> [--token <bearer>] [--compare]
//!                   [--existing <id>]... [<file>...]

use std::sync::mpsc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clausecheck_core::{
    update, AnalysisMode, AnalysisType, AppState, DocumentStatus, Effect, ExistingDocument, Msg,
    RunPhase,
};
use clausecheck_engine::{ClientSettings, EngineConfig, EngineEvent, EngineHandle};
use client_logging::{client_info, client_warn};

struct CliArgs {
    settings: ClientSettings,
    compare: bool,
    existing_ids: Vec<String>,
    files: Vec<String>,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let base_url = args.next().context(
        "usage: clausecheck_app <base-url> [--token <bearer>] [--compare] \
         [--existing <id>]... [<file>...]",
    )?;
    let mut settings = ClientSettings {
        base_url,
        ..ClientSettings::default()
    };
    let mut compare = false;
    let mut existing_ids = Vec::new();
    let mut files = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--token" => {
                settings.bearer_token = Some(args.next().context("--token needs a value")?);
            }
            "--compare" => compare = true,
            "--existing" => {
                existing_ids.push(args.next().context("--existing needs a document id")?);
            }
            _ => files.push(arg),
        }
    }
    if files.is_empty() && existing_ids.is_empty() {
        bail!("nothing to analyze: pass file paths or --existing ids");
    }
    if !files.is_empty() && !existing_ids.is_empty() {
        bail!("pass either files to upload or --existing ids, not both");
    }
    Ok(CliArgs {
        settings,
        compare,
        existing_ids,
        files,
    })
}

fn main() -> Result<()> {
    client_logging::initialize_terminal(log::LevelFilter::Info);
    let args = parse_args()?;

    let engine = EngineHandle::new(EngineConfig {
        settings: args.settings,
        ..EngineConfig::default()
    })
    .map_err(|err| anyhow::anyhow!("failed to build backend client: {err}"))?;

    let mut state = AppState::new();
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();

    let mut setup = Vec::new();
    if args.compare {
        setup.push(Msg::AnalysisTypeChanged(AnalysisType::Multi));
    }
    if args.existing_ids.is_empty() {
        for path in &args.files {
            let payload = std::fs::read(path).with_context(|| format!("reading {path}"))?;
            setup.push(Msg::LocalFileAdded {
                name: file_name(path),
                size_bytes: payload.len() as u64,
                payload,
            });
        }
    } else {
        setup.push(Msg::ModeChanged(AnalysisMode::SelectExisting));
        for id in &args.existing_ids {
            setup.push(Msg::ExistingDocumentToggled {
                document: ExistingDocument {
                    id: id.clone(),
                    name: id.clone(),
                    // The driver has no document listing; a rerun prompt
                    // never triggers because the status is unknown.
                    last_status: DocumentStatus::Pending,
                },
            });
        }
    }
    setup.push(Msg::StartClicked);

    for msg in setup {
        let (next, effects) = update(state, msg);
        state = next;
        if let Some(signal) = state.view().signal {
            bail!("{signal}");
        }
        run_effects(&engine, effects);
    }

    let mut last_line = String::new();
    loop {
        while let Some(event) = engine.try_recv() {
            let _ = msg_tx.send(into_msg(event));
        }
        while let Ok(msg) = msg_rx.try_recv() {
            let (next, effects) = update(state, msg);
            state = next;
            run_effects(&engine, effects);
        }

        let view = state.view();
        let line = format!(
            "step {}/5 {:>3}% {}",
            view.progress.step_index + 1,
            view.progress.percent,
            view.progress.status_text
        );
        if line != last_line && view.progress.phase != RunPhase::Idle {
            client_info!("{line}");
            last_line = line;
        }

        match view.progress.phase {
            RunPhase::Succeeded => {
                if let Some(result) = view.result {
                    print_summary(&result);
                    return Ok(());
                }
            }
            RunPhase::Failed | RunPhase::TimedOut => {
                let reason = view
                    .failure_text
                    .unwrap_or_else(|| "analysis failed".to_string());
                client_warn!("{reason}");
                bail!("{reason}");
            }
            _ => {}
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

fn run_effects(engine: &EngineHandle, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Submit { run_id, request } => engine.submit(run_id, request),
            Effect::PollStatus {
                run_id,
                handle,
                iteration,
            } => engine.poll(run_id, handle, iteration),
            Effect::FetchResult {
                run_id,
                job_id,
                comparison,
            } => engine.fetch_result(run_id, job_id, comparison),
            Effect::CancelPolling => engine.cancel_polling(),
        }
    }
}

fn into_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted { run_id, handle } => Msg::JobSubmitted { run_id, handle },
        EngineEvent::SubmissionFailed { run_id, message } => {
            Msg::SubmissionFailed { run_id, message }
        }
        EngineEvent::Status {
            run_id,
            status,
            stage_token,
            percent,
            error_message,
        } => Msg::StatusReceived {
            run_id,
            status,
            stage_token,
            percent,
            error_message,
        },
        EngineEvent::PollFailed { run_id, message } => Msg::PollFailed { run_id, message },
        EngineEvent::Result { run_id, payload } => Msg::ResultReceived { run_id, payload },
        EngineEvent::ResultFetchFailed { run_id, message } => {
            Msg::ResultFetchFailed { run_id, message }
        }
    }
}

fn print_summary(result: &clausecheck_core::ResultView) {
    client_info!(
        "done in {}: {} contradictions across {} clauses (avg confidence {}%)",
        result.analysis_duration_label,
        result.total_contradictions,
        result.total_clauses,
        result.average_confidence_percent
    );
    if let Some(documents) = &result.compared_documents {
        client_info!("compared: {}", documents.join(", "));
    }
    for (severity, records) in &result.grouped_by_severity {
        for record in records {
            client_info!(
                "[{}] {} ({}%): {} vs {} - {}",
                severity.as_str(),
                record.kind,
                record.confidence_percent,
                record.source_a_label,
                record.source_b_label,
                record.explanation
            );
        }
    }
}

fn file_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
