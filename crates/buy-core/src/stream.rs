//! # Cold Stream Style
//!
//! A [`ColdCall`] describes a request without issuing it. Each
//! [`ColdCall::subscribe`] produces an independent [`Single`] stream that
//! sends the request when first polled, yields exactly one `Ok` or one
//! `Err`, and then ends.

use crate::error::BuyResult;
use futures::future::{BoxFuture, FutureExt};
use futures::Stream;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

type RequestFactory<T> = Arc<dyn Fn() -> BoxFuture<'static, BuyResult<T>> + Send + Sync>;

/// A lazily evaluated, re-subscribable single-result call
pub struct ColdCall<T> {
    factory: RequestFactory<T>,
}

impl<T: Send + 'static> ColdCall<T> {
    /// Wrap a request factory. Nothing runs until a subscriber polls.
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BuyResult<T>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move || factory().boxed()),
        }
    }

    /// Start an independent subscription
    pub fn subscribe(&self) -> Single<T> {
        Single {
            state: SingleState::Idle(Arc::clone(&self.factory)),
        }
    }

    /// Subscribe and wait for the single result
    pub async fn single(&self) -> BuyResult<T> {
        (self.factory)().await
    }
}

impl<T> Clone for ColdCall<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T> fmt::Debug for ColdCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColdCall").finish_non_exhaustive()
    }
}

enum SingleState<T> {
    Idle(RequestFactory<T>),
    Running(BoxFuture<'static, BuyResult<T>>),
    Done,
}

/// One subscription to a [`ColdCall`]: a stream of exactly one item
#[must_use = "streams do nothing unless polled"]
pub struct Single<T> {
    state: SingleState<T>,
}

impl<T> Single<T> {
    /// True until the first poll
    pub fn is_idle(&self) -> bool {
        matches!(self.state, SingleState::Idle(_))
    }
}

impl<T> Stream for Single<T> {
    type Item = BuyResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match std::mem::replace(&mut self.state, SingleState::Done) {
                SingleState::Idle(factory) => {
                    self.state = SingleState::Running(factory());
                }
                SingleState::Running(mut request) => {
                    return match request.as_mut().poll(cx) {
                        Poll::Ready(result) => Poll::Ready(Some(result)),
                        Poll::Pending => {
                            self.state = SingleState::Running(request);
                            Poll::Pending
                        }
                    };
                }
                SingleState::Done => return Poll::Ready(None),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            SingleState::Done => (0, Some(0)),
            _ => (0, Some(1)),
        }
    }
}

impl<T> fmt::Debug for Single<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            SingleState::Idle(_) => "idle",
            SingleState::Running(_) => "running",
            SingleState::Done => "done",
        };
        f.debug_struct("Single").field("state", &state).finish()
    }
}
