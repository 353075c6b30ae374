use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};

use crate::changes::ChangesResult;
use crate::observable::api::Observable;
use crate::observable::observer::PartialObserver;
use crate::observable::subscription::Subscription;

/// [`Stream`] view of an [`Observable`].
///
/// Values pushed while nobody polls are buffered. An error is yielded as the
/// last item; completion ends the stream. Dropping the stream unsubscribes.
pub struct ObservableStream<T> {
    receiver: BoxStream<'static, ChangesResult<T>>,
    _subscription: Subscription,
}

impl<T> ObservableStream<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new(observable: Observable<T>) -> Self {
        let (sender, receiver) = async_channel::unbounded();
        let next_sender = sender.clone();
        let error_sender = sender.clone();
        let complete_sender = sender;

        let observer = PartialObserver::new()
            .with_next(move |value: &T| {
                let _ = next_sender.try_send(Ok(value.clone()));
            })
            .with_error(move |err| {
                let _ = error_sender.try_send(Err(err.clone()));
                error_sender.close();
            })
            .with_complete(move || {
                complete_sender.close();
            });

        let subscription = observable.subscribe(observer);
        Self {
            receiver: receiver.boxed(),
            _subscription: subscription,
        }
    }
}

impl<T> Stream for ObservableStream<T> {
    type Item = ChangesResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}
