//! Body completion hook module
//!
//! Runs a callback once the response body is done with: after the last frame
//! was sent, after a read error, or when hyper drops the body because the
//! client went away.

use super::response::ResponseBody;
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

type Callback = Box<dyn FnOnce() + Send>;

/// Response body that fires `callback` exactly once, when it is dropped
pub struct OnComplete {
    inner: ResponseBody,
    callback: Option<Callback>,
}

impl OnComplete {
    /// Wrap `inner` and box the result back into a `ResponseBody`
    pub fn wrap<F>(inner: ResponseBody, callback: F) -> ResponseBody
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            inner,
            callback: Some(Box::new(callback)),
        }
        .boxed_unsync()
    }
}

impl Body for OnComplete {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.inner).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for OnComplete {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}
