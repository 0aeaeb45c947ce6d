use std::{
    future::{Future, IntoFuture},
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{blocking, Observable, ObservableExt};
use crate::{
    observer::Observer,
    subscription::subscribe::{Subscribeable, Subscriber, Subscription, SubscriptionHandle},
    ObservableError, SignalError,
};

/// A deferred result that completes with at most one item.
///
/// `Maybe` is what single-value lookups return: it either emits one item and
/// completes, completes without emitting (absence is not an error), or signals an
/// error. Like `Observable` it is cold: nothing happens until it is subscribed to,
/// blocked on or awaited, and every consumption runs the source again.
///
/// ```no_run
/// use reactive_people::Maybe;
///
/// # async fn run() -> reactive_people::Result<()> {
/// let name = Maybe::just("Michael".to_string()).map(|n| n.to_uppercase());
///
/// assert_eq!(name.await?, Some("MICHAEL".to_string()));
/// assert_eq!(Maybe::<i32>::empty().block()?, None);
/// # Ok(())
/// # }
/// ```
pub struct Maybe<T> {
    source: Observable<T>,
}

impl<T: Send + 'static> Maybe<T> {
    // Callers guarantee `source` emits at most one item.
    pub(crate) fn from_observable(source: Observable<T>) -> Self {
        Maybe { source }
    }

    /// Creates a `Maybe` that evaluates `f` on every subscription, emitting its
    /// result if it is `Some` and completing empty otherwise.
    pub fn defer<F>(f: F) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        Maybe::from_observable(Observable::new(move |mut o| {
            if let Some(v) = f() {
                o.next(v);
            }
            o.complete();
            Subscription::closing(&o, SubscriptionHandle::Nil)
        }))
    }

    /// Creates a `Maybe` that emits a clone of `value` to every subscriber.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Maybe::defer(move || Some(value.clone()))
    }

    /// Creates a `Maybe` that emits `value` if it is `Some`.
    pub fn from_option(value: Option<T>) -> Self
    where
        T: Clone + Sync,
    {
        Maybe::defer(move || value.clone())
    }

    /// Creates a `Maybe` that completes without emitting.
    #[must_use]
    pub fn empty() -> Self {
        Maybe::from_observable(Observable::empty())
    }

    /// Creates a `Maybe` that signals `err` to every subscriber.
    #[must_use]
    pub fn error(err: SignalError) -> Self {
        Maybe::from_observable(Observable::error(err))
    }

    /// Transforms the item, if any.
    pub fn map<U, F>(self, f: F) -> Maybe<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
        U: Send + 'static,
    {
        Maybe::from_observable(self.source.map(f))
    }

    /// Completes empty instead of emitting when the item does not satisfy
    /// `predicate`.
    pub fn filter<P>(self, predicate: P) -> Maybe<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Maybe::from_observable(self.source.filter(predicate))
    }

    /// Invokes `f` with a reference to the item, if any, before passing it on.
    pub fn do_on_next<F>(self, f: F) -> Maybe<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Maybe::from_observable(self.source.do_on_next(f))
    }

    /// Invokes `f` when an error is signalled, then passes the error on.
    pub fn do_on_error<F>(self, f: F) -> Maybe<T>
    where
        F: Fn(&SignalError) + Send + Sync + 'static,
    {
        Maybe::from_observable(self.source.do_on_error(f))
    }

    /// Replaces an error with `fallback`, completing normally.
    pub fn on_error_return(self, fallback: T) -> Maybe<T>
    where
        T: Clone + Sync,
    {
        Maybe::from_observable(self.source.on_error_return(fallback))
    }

    /// Emits `fallback` when the source completes without an item.
    pub fn default_if_empty(mut self, fallback: T) -> Maybe<T>
    where
        T: Clone + Sync,
    {
        Maybe::from_observable(Observable::new(move |o| {
            let fallback = fallback.clone();
            let emitted = Arc::new(AtomicBool::new(false));
            let emitted_c = Arc::clone(&emitted);

            let closed = o.closed_flag();
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let u = Subscriber::new(
                move |v| {
                    emitted.store(true, Ordering::Relaxed);
                    o_shared.lock().next(v);
                },
                move |observable_error| o_cloned_e.lock().error(observable_error),
                move || {
                    let mut o = o_cloned_c.lock();
                    if !emitted_c.load(Ordering::Relaxed) {
                        o.next(fallback.clone());
                    }
                    o.complete();
                },
            )
            .share_closed(closed);
            self.source.subscribe(u)
        }))
    }

    /// Runs the subscription on a spawned `Tokio` task.
    ///
    /// See [`ObservableExt::subscribe_on_task`].
    #[must_use]
    pub fn subscribe_on_task(self) -> Maybe<T> {
        Maybe::from_observable(self.source.subscribe_on_task())
    }

    /// Subscribes and blocks the current thread until the source terminates.
    ///
    /// Returns `Ok(None)` when the source completes empty. Must not be used from a
    /// current-thread `Tokio` runtime on a task-backed source; `.await` the `Maybe`
    /// instead.
    ///
    /// # Errors
    ///
    /// Returns the error signalled by the source.
    pub fn block(self) -> crate::Result<Option<T>> {
        self.block_inner(None)
    }

    /// Like [`Maybe::block`], giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ObservableError::Timeout`] if the source has not terminated in time,
    /// or the error signalled by the source.
    pub fn block_timeout(self, timeout: Duration) -> crate::Result<Option<T>> {
        self.block_inner(Some(timeout))
    }

    fn block_inner(mut self, timeout: Option<Duration>) -> crate::Result<Option<T>> {
        let mut value = None;
        blocking::block_on(&mut self.source, timeout, |v| {
            value.get_or_insert(v);
        })?;
        Ok(value)
    }

    /// Returns the underlying stream of zero or one items.
    #[must_use]
    pub fn into_observable(self) -> Observable<T> {
        self.source
    }
}

impl<T: Send + 'static> Subscribeable for Maybe<T> {
    type ObsType = T;

    fn subscribe(&mut self, s: Subscriber<Self::ObsType>) -> Subscription {
        self.source.subscribe(s)
    }
}

impl<T: Send + 'static> IntoFuture for Maybe<T> {
    type Output = crate::Result<Option<T>>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(mut self) -> Self::IntoFuture {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let tx_c = Arc::clone(&tx);

        let value = Arc::new(Mutex::new(None));
        let value_c = Arc::clone(&value);

        let subscriber = Subscriber::new(
            move |v| {
                value.lock().get_or_insert(v);
            },
            move |e| {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(Err(ObservableError::from_signal(e)));
                }
            },
            move || {
                if let Some(tx) = tx_c.lock().take() {
                    let _ = tx.send(Ok(value_c.lock().take()));
                }
            },
        );
        let subscription = self.source.subscribe(subscriber);

        Box::pin(async move {
            let received = rx.await;
            let joined = subscription.join_concurrent().await;
            match received {
                Ok(result) => result,
                Err(_) => {
                    joined?;
                    Err(ObservableError::Disconnected)
                }
            }
        })
    }
}
