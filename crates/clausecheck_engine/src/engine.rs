use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clausecheck_core::{AnalysisRequest, JobHandle, RunId};
use client_logging::client_warn;
use tokio_util::sync::CancellationToken;

use crate::client::{ApiError, BackendClient, ClientSettings, ReqwestBackendClient};
use crate::submit::run_submission;
use crate::types::EngineEvent;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub settings: ClientSettings,
    /// Delay before every status query; the backend contract is one query
    /// per second.
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settings: ClientSettings::default(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

enum EngineCommand {
    Submit {
        run_id: RunId,
        request: AnalysisRequest,
    },
    Poll {
        run_id: RunId,
        handle: JobHandle,
        iteration: u32,
    },
    FetchResult {
        run_id: RunId,
        job_id: String,
        comparison: bool,
    },
    CancelPolling,
}

/// Executes the core's effects on a dedicated runtime thread and feeds the
/// outcomes back as events. Submitting a new run cancels the previous run's
/// token, so a superseded poll exits before emitting anything.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let client = Arc::new(ReqwestBackendClient::new(config.settings.clone())?);
        Ok(Self::with_client(client, config.poll_interval))
    }

    /// Same wiring with an injected client, for tests.
    pub fn with_client(client: Arc<dyn BackendClient>, poll_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut active = CancellationToken::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit { run_id, request } => {
                        // Supersede whatever the previous run left in flight.
                        active.cancel();
                        active = CancellationToken::new();
                        let client = client.clone();
                        let event_tx = event_tx.clone();
                        let token = active.clone();
                        runtime.spawn(async move {
                            let outcome = run_submission(client.as_ref(), &request).await;
                            if token.is_cancelled() {
                                return;
                            }
                            let event = match outcome {
                                Ok(handle) => EngineEvent::Submitted { run_id, handle },
                                Err(err) => {
                                    client_warn!("submission for run {run_id} failed: {err}");
                                    EngineEvent::SubmissionFailed {
                                        run_id,
                                        message: err.to_string(),
                                    }
                                }
                            };
                            let _ = event_tx.send(event);
                        });
                    }
                    EngineCommand::Poll {
                        run_id,
                        handle,
                        iteration,
                    } => {
                        let client = client.clone();
                        let event_tx = event_tx.clone();
                        let token = active.clone();
                        runtime.spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => return,
                                _ = tokio::time::sleep(poll_interval) => {}
                            }
                            let outcome = client
                                .poll_status(handle.job_id(), handle.is_comparison())
                                .await;
                            // Late responses of a cancelled run must not leak out.
                            if token.is_cancelled() {
                                return;
                            }
                            let event = match outcome {
                                Ok(report) => EngineEvent::Status {
                                    run_id,
                                    status: report.status,
                                    stage_token: report.stage_token,
                                    percent: report.percent,
                                    error_message: report.error_message,
                                },
                                Err(err) => {
                                    client_warn!(
                                        "poll {iteration} for run {run_id} failed: {err}"
                                    );
                                    EngineEvent::PollFailed {
                                        run_id,
                                        message: err.to_string(),
                                    }
                                }
                            };
                            let _ = event_tx.send(event);
                        });
                    }
                    EngineCommand::FetchResult {
                        run_id,
                        job_id,
                        comparison,
                    } => {
                        let client = client.clone();
                        let event_tx = event_tx.clone();
                        let token = active.clone();
                        runtime.spawn(async move {
                            let outcome = client.fetch_result(&job_id, comparison).await;
                            if token.is_cancelled() {
                                return;
                            }
                            let event = match outcome {
                                Ok(payload) => EngineEvent::Result { run_id, payload },
                                Err(err) => EngineEvent::ResultFetchFailed {
                                    run_id,
                                    message: err.to_string(),
                                },
                            };
                            let _ = event_tx.send(event);
                        });
                    }
                    EngineCommand::CancelPolling => {
                        active.cancel();
                        active = CancellationToken::new();
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, run_id: RunId, request: AnalysisRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { run_id, request });
    }

    pub fn poll(&self, run_id: RunId, handle: JobHandle, iteration: u32) {
        let _ = self.cmd_tx.send(EngineCommand::Poll {
            run_id,
            handle,
            iteration,
        });
    }

    pub fn fetch_result(&self, run_id: RunId, job_id: String, comparison: bool) {
        let _ = self.cmd_tx.send(EngineCommand::FetchResult {
            run_id,
            job_id,
            comparison,
        });
    }

    pub fn cancel_polling(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CancelPolling);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}
