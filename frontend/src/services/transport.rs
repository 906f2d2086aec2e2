//! HTTP transport for the two upload calls.
//!
//! [`UploadTransport`] is the seam between the orchestrator and the network.
//! [`BrowserTransport`] implements it with `gloo-net` for the JSON request and
//! `XMLHttpRequest` for the transfer, since fetch reports no upload progress.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::stream::{LocalBoxStream, Stream, StreamExt};
use gloo_net::http::Request;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, Event, File, ProgressEvent, XmlHttpRequest};

use crate::error::TransportError;
use crate::types::{DestinationRequest, HttpReply, TransferProgress, TransferSignal};

/// Signals of one running transfer, ending with a completion or a network error.
pub type TransferStream = LocalBoxStream<'static, TransferSignal>;

/// Network calls needed by [`crate::Uploader`].
#[async_trait(?Send)]
pub trait UploadTransport {
    /// File content handle sent by [`UploadTransport::start_transfer`].
    type Body;

    /// `POST` the request as JSON and return the raw reply.
    async fn request_destination(
        &self,
        url: &str,
        request: &DestinationRequest,
    ) -> Result<HttpReply, TransportError>;

    /// `PUT` the body to `url` and stream progress and completion.
    fn start_transfer(
        &self,
        url: &str,
        content_type: &str,
        body: &Self::Body,
    ) -> Result<TransferStream, TransportError>;
}

/// Transport backed by the browser networking APIs.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[async_trait(?Send)]
impl UploadTransport for BrowserTransport {
    type Body = File;

    async fn request_destination(
        &self,
        url: &str,
        request: &DestinationRequest,
    ) -> Result<HttpReply, TransportError> {
        let response = Request::post(url)
            .json(request)
            .map_err(|e| TransportError::new(format!("Failed to build request: {}", e)))?
            .send()
            .await
            .map_err(|e| TransportError::new(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = body_or_unknown(response.text().await);

        Ok(HttpReply { status, body })
    }

    fn start_transfer(
        &self,
        url: &str,
        content_type: &str,
        body: &File,
    ) -> Result<TransferStream, TransportError> {
        XhrTransfer::start(url, content_type, body).map(|transfer| transfer.boxed_local())
    }
}

/// A `PUT` running on an `XMLHttpRequest`.
///
/// Owns the JS callbacks; dropping it detaches them from the request.
struct XhrTransfer {
    xhr: XmlHttpRequest,
    signals: UnboundedReceiver<TransferSignal>,
    _on_progress: Closure<dyn FnMut(ProgressEvent)>,
    _on_load: Closure<dyn FnMut(Event)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_interrupted: Closure<dyn FnMut(Event)>,
}

impl XhrTransfer {
    fn start(url: &str, content_type: &str, body: &File) -> Result<Self, TransportError> {
        let xhr = XmlHttpRequest::new().map_err(js_error)?;
        xhr.open_with_async("PUT", url, true).map_err(js_error)?;
        xhr.set_request_header("Content-Type", content_type)
            .map_err(js_error)?;

        let (tx, signals) = mpsc::unbounded();

        let progress_tx = tx.clone();
        let on_progress = Closure::wrap(Box::new(move |event: ProgressEvent| {
            let progress = TransferProgress {
                loaded: event.loaded(),
                total: event.length_computable().then(|| event.total()),
            };
            let _ = progress_tx.unbounded_send(TransferSignal::Progress(progress));
        }) as Box<dyn FnMut(ProgressEvent)>);
        xhr.upload()
            .map_err(js_error)?
            .set_onprogress(Some(on_progress.as_ref().unchecked_ref()));

        let load_tx = tx.clone();
        let load_xhr = xhr.clone();
        let on_load = Closure::wrap(Box::new(move |_: Event| {
            let reply = HttpReply {
                status: load_xhr.status().unwrap_or(0),
                body: load_xhr.response_text().ok().flatten().unwrap_or_default(),
            };
            let _ = load_tx.unbounded_send(TransferSignal::Completed(reply));
        }) as Box<dyn FnMut(Event)>);
        xhr.set_onload(Some(on_load.as_ref().unchecked_ref()));

        let error_tx = tx.clone();
        let on_error = Closure::wrap(Box::new(move |_: Event| {
            let _ = error_tx.unbounded_send(TransferSignal::NetworkError);
        }) as Box<dyn FnMut(Event)>);
        xhr.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        // Aborted or timed out requests never fire `load` or `error`.
        let on_interrupted = Closure::wrap(Box::new(move |event: Event| {
            log::warn!("Transfer interrupted: {}", event.type_());
            let _ = tx.unbounded_send(TransferSignal::NetworkError);
        }) as Box<dyn FnMut(Event)>);
        xhr.set_onabort(Some(on_interrupted.as_ref().unchecked_ref()));
        xhr.set_ontimeout(Some(on_interrupted.as_ref().unchecked_ref()));

        let blob: &Blob = body;
        xhr.send_with_opt_blob(Some(blob)).map_err(js_error)?;

        Ok(Self {
            xhr,
            signals,
            _on_progress: on_progress,
            _on_load: on_load,
            _on_error: on_error,
            _on_interrupted: on_interrupted,
        })
    }
}

impl Stream for XhrTransfer {
    type Item = TransferSignal;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.signals.poll_next_unpin(cx)
    }
}

impl Drop for XhrTransfer {
    fn drop(&mut self) {
        if let Ok(upload) = self.xhr.upload() {
            upload.set_onprogress(None);
        }
        self.xhr.set_onload(None);
        self.xhr.set_onerror(None);
        self.xhr.set_onabort(None);
        self.xhr.set_ontimeout(None);
    }
}

/// Body text of a reply, or a marker when it could not be read.
fn body_or_unknown<E: std::fmt::Display>(text: Result<String, E>) -> String {
    text.unwrap_or_else(|e| {
        log::warn!("Failed to read response body: {}", e);
        "Unknown error".to_string()
    })
}

fn js_error(value: JsValue) -> TransportError {
    TransportError::new(format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_body_is_reported() {
        let body = body_or_unknown::<String>(Err("stream closed".to_string()));
        assert_eq!(body, "Unknown error");
    }

    #[test]
    fn test_readable_body_is_kept_verbatim() {
        assert_eq!(body_or_unknown::<String>(Ok("forbidden".to_string())), "forbidden");
        assert_eq!(body_or_unknown::<String>(Ok(String::new())), "");
    }
}
