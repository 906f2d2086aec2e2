//! Two-step direct upload: ask the backend for a pre-signed destination,
//! then `PUT` the file bytes to it.
//!
//! ```text
//! Idle ──▶ RequestingDestination ──▶ Transferring ──▶ Succeeded
//!                    │                     │
//!                    └─────────────────────┴────────▶ Failed
//! ```
//!
//! The orchestrator never touches the page. Every transition is reported to
//! an observer as an [`UploadEvent`]; the presenter turns those into UI state.

use std::cell::Cell;

use futures::StreamExt;

use crate::config::UploadOptions;
use crate::error::{UploadError, UploadResult};
use crate::services::selection::SelectionManager;
use crate::services::transport::UploadTransport;
use crate::types::{
    DestinationRequest, HttpReply, SelectedFile, TransferSignal, UploadDestination, UploadEvent,
    UploadState,
};

/// Drives upload attempts over an [`UploadTransport`].
pub struct Uploader<T: UploadTransport> {
    transport: T,
    options: UploadOptions,
    state: Cell<UploadState>,
}

impl<T: UploadTransport> Uploader<T> {
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, UploadOptions::default())
    }

    pub fn with_options(transport: T, options: UploadOptions) -> Self {
        Self {
            transport,
            options,
            state: Cell::new(UploadState::Idle),
        }
    }

    /// Current workflow state.
    pub fn state(&self) -> UploadState {
        self.state.get()
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Upload the file currently held by `selection`.
    ///
    /// Fails fast with [`UploadError::NoFileSelected`] or [`UploadError::Busy`]
    /// without any network call or state change. Otherwise issues exactly one
    /// destination request and at most one transfer, reporting each step to
    /// `observer`, and ends in `Succeeded` or `Failed`.
    pub async fn upload<F>(
        &self,
        selection: &SelectionManager<T::Body>,
        mut observer: F,
    ) -> UploadResult<UploadDestination>
    where
        F: FnMut(UploadEvent),
        T::Body: Clone,
    {
        let file = selection
            .current()
            .cloned()
            .ok_or(UploadError::NoFileSelected)?;

        if self.state.get().is_in_flight() {
            log::warn!("Upload of {} rejected: attempt already {}", file.name, self.state.get());
            return Err(UploadError::Busy);
        }

        log::info!("📤 Uploading {} ({} bytes)", file.name, file.size);
        let _release = AttemptGuard { state: &self.state };
        observer(UploadEvent::Started);

        let outcome = self.attempt(&file, &mut observer).await;
        match &outcome {
            Ok(destination) => {
                log::info!("✅ Upload of {} completed", file.name);
                if let Some(key) = &destination.object_key {
                    log::debug!("Stored as {}", key);
                }
                self.enter(UploadState::Succeeded, &mut observer);
                observer(UploadEvent::Succeeded);
            }
            Err(e) => {
                log::error!("❌ Upload of {} failed: {}", file.name, e);
                self.enter(UploadState::Failed, &mut observer);
                observer(UploadEvent::Failed(e.clone()));
            }
        }
        outcome
    }

    async fn attempt(
        &self,
        file: &SelectedFile<T::Body>,
        observer: &mut dyn FnMut(UploadEvent),
    ) -> UploadResult<UploadDestination> {
        let content_type = file.content_type().to_string();

        self.enter(UploadState::RequestingDestination, observer);
        let destination = self.request_destination(&file.name, &content_type).await?;

        self.enter(UploadState::Transferring, observer);
        let mut signals = self
            .transport
            .start_transfer(&destination.upload_url, &content_type, &file.body)
            .map_err(|e| {
                log::warn!("Transfer could not start: {}", e);
                UploadError::TransferNetworkFailed
            })?;

        while let Some(signal) = signals.next().await {
            match signal {
                TransferSignal::Progress(progress) => {
                    if let Some(percent) = progress.percent() {
                        observer(UploadEvent::Progress(percent));
                    }
                }
                TransferSignal::Completed(reply) => {
                    return self.check_transfer(reply).map(|()| destination);
                }
                TransferSignal::NetworkError => return Err(UploadError::TransferNetworkFailed),
            }
        }

        // The transport went away without an answer.
        Err(UploadError::TransferNetworkFailed)
    }

    async fn request_destination(
        &self,
        filename: &str,
        content_type: &str,
    ) -> UploadResult<UploadDestination> {
        let request = DestinationRequest {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        };
        let url = self.options.destination_endpoint();

        let reply = self
            .transport
            .request_destination(&url, &request)
            .await
            .map_err(|e| UploadError::DestinationUnreachable(e.to_string()))?;

        if !reply.is_success() {
            return Err(UploadError::DestinationRequestFailed {
                status: reply.status,
                body: reply.body,
            });
        }

        serde_json::from_str(&reply.body).map_err(|e| UploadError::InvalidDestination(e.to_string()))
    }

    fn check_transfer(&self, reply: HttpReply) -> UploadResult<()> {
        if self.options.accepts_transfer_status(reply.status) {
            Ok(())
        } else {
            Err(UploadError::TransferHttpFailed {
                status: reply.status,
                body: reply.body,
            })
        }
    }

    fn enter(&self, state: UploadState, observer: &mut dyn FnMut(UploadEvent)) {
        log::debug!("Upload state: {} -> {}", self.state.get(), state);
        self.state.set(state);
        observer(UploadEvent::StateChanged(state));
    }
}

/// Moves an attempt that has not reached a terminal state to `Failed` when
/// the `upload` future is dropped.
struct AttemptGuard<'a> {
    state: &'a Cell<UploadState>,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.state.get().is_in_flight() {
            log::warn!("Upload abandoned while {}", self.state.get());
            self.state.set(UploadState::Failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::services::transport::TransferStream;
    use crate::types::TransferProgress;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use futures::stream;
    use std::cell::RefCell;

    /// Transport answering from a script and recording every call.
    struct ScriptedTransport {
        destination: Result<HttpReply, TransportError>,
        transfer: Option<Vec<TransferSignal>>,
        destination_calls: RefCell<Vec<(String, DestinationRequest)>>,
        transfer_calls: RefCell<Vec<(String, String, Vec<u8>)>>,
    }

    impl ScriptedTransport {
        fn new(destination: HttpReply, transfer: Vec<TransferSignal>) -> Self {
            Self {
                destination: Ok(destination),
                transfer: Some(transfer),
                destination_calls: RefCell::new(Vec::new()),
                transfer_calls: RefCell::new(Vec::new()),
            }
        }

        fn unreachable_backend() -> Self {
            Self {
                destination: Err(TransportError::new("connection refused")),
                ..Self::new(HttpReply::new(200, ""), Vec::new())
            }
        }

        /// Transfer that never answers.
        fn hanging(destination: HttpReply) -> Self {
            Self {
                transfer: None,
                ..Self::new(destination, Vec::new())
            }
        }
    }

    #[async_trait(?Send)]
    impl UploadTransport for ScriptedTransport {
        type Body = Vec<u8>;

        async fn request_destination(
            &self,
            url: &str,
            request: &DestinationRequest,
        ) -> Result<HttpReply, TransportError> {
            self.destination_calls
                .borrow_mut()
                .push((url.to_string(), request.clone()));
            self.destination.clone()
        }

        fn start_transfer(
            &self,
            url: &str,
            content_type: &str,
            body: &Vec<u8>,
        ) -> Result<TransferStream, TransportError> {
            self.transfer_calls
                .borrow_mut()
                .push((url.to_string(), content_type.to_string(), body.clone()));
            Ok(match &self.transfer {
                Some(signals) => stream::iter(signals.clone()).boxed_local(),
                None => stream::pending().boxed_local(),
            })
        }
    }

    fn destination_ok(url: &str) -> HttpReply {
        HttpReply::new(200, format!(r#"{{"uploadUrl": "{}"}}"#, url))
    }

    fn progress(loaded: f64, total: f64) -> TransferSignal {
        TransferSignal::Progress(TransferProgress {
            loaded,
            total: Some(total),
        })
    }

    fn ten_byte_file() -> SelectionManager<Vec<u8>> {
        let mut selection = SelectionManager::new();
        selection.select(SelectedFile::new("a.txt", "text/plain", 10, b"0123456789".to_vec()));
        selection
    }

    fn run(
        uploader: &Uploader<ScriptedTransport>,
        selection: &SelectionManager<Vec<u8>>,
    ) -> (UploadResult<UploadDestination>, Vec<UploadEvent>) {
        let mut events = Vec::new();
        let result = block_on(uploader.upload(selection, |event| events.push(event)));
        (result, events)
    }

    fn percents(events: &[UploadEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|event| match event {
                UploadEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_no_selection_makes_no_network_call() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![TransferSignal::Completed(HttpReply::new(200, ""))],
        ));

        let (result, events) = run(&uploader, &SelectionManager::new());

        assert_eq!(result, Err(UploadError::NoFileSelected));
        assert!(events.is_empty());
        assert_eq!(uploader.state(), UploadState::Idle);
        assert!(uploader.transport().destination_calls.borrow().is_empty());
        assert!(uploader.transport().transfer_calls.borrow().is_empty());
    }

    #[test]
    fn test_successful_upload() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![
                progress(4.0, 10.0),
                progress(10.0, 10.0),
                TransferSignal::Completed(HttpReply::new(200, "")),
            ],
        ));

        let (result, events) = run(&uploader, &ten_byte_file());

        let destination = result.unwrap();
        assert_eq!(destination.upload_url, "https://store/x");
        assert_eq!(uploader.state(), UploadState::Succeeded);
        assert_eq!(
            events,
            vec![
                UploadEvent::Started,
                UploadEvent::StateChanged(UploadState::RequestingDestination),
                UploadEvent::StateChanged(UploadState::Transferring),
                UploadEvent::Progress(40.0),
                UploadEvent::Progress(100.0),
                UploadEvent::StateChanged(UploadState::Succeeded),
                UploadEvent::Succeeded,
            ]
        );

        let requests = uploader.transport().destination_calls.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "/api/uploads/presigned-url");
        assert_eq!(requests[0].1.filename, "a.txt");
        assert_eq!(requests[0].1.content_type, "text/plain");

        let transfers = uploader.transport().transfer_calls.borrow();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].0, "https://store/x");
        assert_eq!(transfers[0].1, "text/plain");
        assert_eq!(transfers[0].2, b"0123456789".to_vec());
    }

    #[test]
    fn test_backend_rejection_skips_transfer() {
        for status in [300, 400, 403, 404, 500, 503] {
            let uploader = Uploader::new(ScriptedTransport::new(
                HttpReply::new(status, "forbidden"),
                vec![TransferSignal::Completed(HttpReply::new(200, ""))],
            ));

            let (result, events) = run(&uploader, &ten_byte_file());

            let err = result.unwrap_err();
            assert_eq!(
                err,
                UploadError::DestinationRequestFailed {
                    status,
                    body: "forbidden".to_string()
                }
            );
            assert!(err.to_string().contains(&status.to_string()));
            assert!(err.to_string().contains("forbidden"));
            assert!(uploader.transport().transfer_calls.borrow().is_empty());
            assert_eq!(uploader.state(), UploadState::Failed);
            assert_eq!(events.last(), Some(&UploadEvent::Failed(err)));
        }
    }

    #[test]
    fn test_transfer_http_failure_with_empty_body() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![TransferSignal::Completed(HttpReply::new(500, ""))],
        ));

        let (result, _) = run(&uploader, &ten_byte_file());

        let message = result.unwrap_err().to_string();
        assert!(message.contains("500"));
        assert!(message.contains("No response from S3"));
        assert_eq!(uploader.state(), UploadState::Failed);
    }

    #[test]
    fn test_transfer_network_failure() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![progress(2.0, 10.0), TransferSignal::NetworkError],
        ));

        let (result, events) = run(&uploader, &ten_byte_file());

        assert_eq!(result, Err(UploadError::TransferNetworkFailed));
        assert_eq!(events.last(), Some(&UploadEvent::Failed(UploadError::TransferNetworkFailed)));
        assert_eq!(uploader.state(), UploadState::Failed);
    }

    #[test]
    fn test_transfer_stream_ending_without_answer_is_network_failure() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![progress(2.0, 10.0)],
        ));

        let (result, _) = run(&uploader, &ten_byte_file());

        assert_eq!(result, Err(UploadError::TransferNetworkFailed));
    }

    #[test]
    fn test_unreachable_backend() {
        let uploader = Uploader::new(ScriptedTransport::unreachable_backend());

        let (result, _) = run(&uploader, &ten_byte_file());

        assert_eq!(
            result,
            Err(UploadError::DestinationUnreachable("connection refused".to_string()))
        );
        assert!(uploader.transport().transfer_calls.borrow().is_empty());
    }

    #[test]
    fn test_malformed_destination_skips_transfer() {
        let uploader = Uploader::new(ScriptedTransport::new(
            HttpReply::new(200, r#"{"error": "nope"}"#),
            vec![TransferSignal::Completed(HttpReply::new(200, ""))],
        ));

        let (result, _) = run(&uploader, &ten_byte_file());

        assert!(matches!(result, Err(UploadError::InvalidDestination(_))));
        assert!(uploader.transport().transfer_calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_media_type_defaults_for_both_calls() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![TransferSignal::Completed(HttpReply::new(200, ""))],
        ));
        let mut selection = SelectionManager::new();
        selection.select(SelectedFile::new("raw", "", 0, Vec::new()));

        let (result, _) = run(&uploader, &selection);

        assert!(result.is_ok());
        let requests = uploader.transport().destination_calls.borrow();
        assert_eq!(requests[0].1.content_type, "application/octet-stream");
        let transfers = uploader.transport().transfer_calls.borrow();
        assert_eq!(transfers[0].1, "application/octet-stream");
    }

    #[test]
    fn test_only_200_counts_as_success_by_default() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![TransferSignal::Completed(HttpReply::new(204, ""))],
        ));

        let (result, _) = run(&uploader, &ten_byte_file());

        assert_eq!(
            result,
            Err(UploadError::TransferHttpFailed {
                status: 204,
                body: String::new()
            })
        );
    }

    #[test]
    fn test_any_2xx_accepted_when_enabled() {
        let options = UploadOptions {
            accept_any_2xx: true,
            ..UploadOptions::default()
        };
        let uploader = Uploader::with_options(
            ScriptedTransport::new(
                destination_ok("https://store/x"),
                vec![TransferSignal::Completed(HttpReply::new(201, ""))],
            ),
            options,
        );

        let (result, _) = run(&uploader, &ten_byte_file());

        assert!(result.is_ok());
        assert_eq!(uploader.state(), UploadState::Succeeded);
    }

    #[test]
    fn test_progress_is_monotonic_and_ignores_unknown_totals() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![
                progress(0.0, 8.0),
                TransferSignal::Progress(TransferProgress {
                    loaded: 3.0,
                    total: None,
                }),
                progress(1.0, 8.0),
                progress(1.0, 8.0),
                progress(5.0, 8.0),
                progress(8.0, 8.0),
                TransferSignal::Completed(HttpReply::new(200, "")),
            ],
        ));

        let (_, events) = run(&uploader, &ten_byte_file());

        let seen = percents(&events);
        assert_eq!(seen, vec![0.0, 12.5, 12.5, 62.5, 100.0]);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_destination_requested_fresh_for_every_attempt() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![TransferSignal::Completed(HttpReply::new(200, ""))],
        ));
        let selection = ten_byte_file();

        assert!(run(&uploader, &selection).0.is_ok());
        assert!(run(&uploader, &selection).0.is_ok());

        assert_eq!(uploader.transport().destination_calls.borrow().len(), 2);
        assert_eq!(uploader.transport().transfer_calls.borrow().len(), 2);
    }

    #[test]
    fn test_retry_after_failure_is_allowed() {
        let uploader = Uploader::new(ScriptedTransport::new(
            HttpReply::new(500, "boom"),
            Vec::new(),
        ));
        let selection = ten_byte_file();

        assert!(run(&uploader, &selection).0.is_err());
        let (second, _) = run(&uploader, &selection);

        assert!(matches!(second, Err(UploadError::DestinationRequestFailed { .. })));
        assert_eq!(uploader.transport().destination_calls.borrow().len(), 2);
    }

    #[test]
    fn test_overlapping_upload_is_rejected() {
        let uploader = Uploader::new(ScriptedTransport::hanging(destination_ok("https://store/x")));
        let selection = ten_byte_file();

        block_on(async {
            let mut first = Box::pin(uploader.upload(&selection, |_| {}));
            assert!(futures::poll!(first.as_mut()).is_pending());
            assert_eq!(uploader.state(), UploadState::Transferring);

            let mut events = Vec::new();
            let second = uploader.upload(&selection, |event| events.push(event)).await;

            assert_eq!(second, Err(UploadError::Busy));
            assert!(events.is_empty());
            assert_eq!(uploader.state(), UploadState::Transferring);
        });

        assert_eq!(uploader.transport().destination_calls.borrow().len(), 1);
        assert_eq!(uploader.transport().transfer_calls.borrow().len(), 1);
    }

    #[test]
    fn test_dropped_attempt_releases_uploader() {
        let uploader = Uploader::new(ScriptedTransport::hanging(destination_ok("https://store/x")));
        let selection = ten_byte_file();

        block_on(async {
            let mut first = Box::pin(uploader.upload(&selection, |_| {}));
            assert!(futures::poll!(first.as_mut()).is_pending());
            assert_eq!(uploader.state(), UploadState::Transferring);
            drop(first);
            assert_eq!(uploader.state(), UploadState::Failed);

            let mut second = Box::pin(uploader.upload(&selection, |_| {}));
            assert!(futures::poll!(second.as_mut()).is_pending());
            assert_eq!(uploader.state(), UploadState::Transferring);
        });

        assert_eq!(uploader.transport().destination_calls.borrow().len(), 2);
        assert_eq!(uploader.transport().transfer_calls.borrow().len(), 2);
    }

    #[test]
    fn test_completed_attempt_keeps_terminal_state() {
        let uploader = Uploader::new(ScriptedTransport::new(
            destination_ok("https://store/x"),
            vec![TransferSignal::Completed(HttpReply::new(200, ""))],
        ));

        assert!(run(&uploader, &ten_byte_file()).0.is_ok());
        assert_eq!(uploader.state(), UploadState::Succeeded);
    }
}
