//! The `observable` module provides the building blocks for creating and manipulating
//! observables: the multi-value [`Observable`] and the single-value [`Maybe`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::subscription::subscribe::{
    Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
};
use crate::{observer::Observer, ObservableError, SignalError};

pub(crate) mod blocking;
mod maybe;

pub use maybe::Maybe;

/// The `Observable` struct represents a cold, restartable source of values that can
/// be observed and transformed.
///
/// Nothing is emitted until the observable is subscribed to, and every subscription
/// runs the subscribe function again, so independent subscribers never share
/// emission state.
///
/// # Example: basic synchronous `Observable`
///
/// This simple `Observable` emits values and completes. It is synchronous, so it
/// blocks the current thread until it completes emission.
///
/// ```no_run
/// use reactive_people::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
/// use reactive_people::{Observable, Observer, Subscribeable};
///
/// // Create a custom observable that emits values from 1 to 10.
/// let mut emit_10_observable = Observable::new(|mut subscriber| {
///     let mut i = 1;
///
///     while i <= 10 && !subscriber.is_closed() {
///         subscriber.next(i);
///         i += 1;
///     }
///     subscriber.complete();
///
///     // Return the empty subscription.
///     Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
/// });
///
/// let observer = Subscriber::new(
///     |v| println!("Emitted {}", v),
///     |e| eprintln!("Error {}", e),
///     || println!("Completed"),
/// );
///
/// // Observables are cold: nothing is emitted without this call.
/// emit_10_observable.subscribe(observer);
/// ```
///
/// # Example: reducing to exactly one item
///
/// `single()` fails when nothing matches, and the failure can be replaced with a
/// fallback value.
///
/// ```no_run
/// use reactive_people::{Observable, ObservableExt};
///
/// let found = Observable::from_iterable(vec![1, 2, 3, 4])
///     .filter(|&v| v == 8)
///     .single()
///     .do_on_error(|e| eprintln!("Did not match expected result: {}", e))
///     .on_error_return(-1)
///     .block();
///
/// assert_eq!(found.unwrap(), Some(-1));
/// ```
pub struct Observable<T> {
    subscribe_fn: Box<dyn FnMut(Subscriber<T>) -> Subscription + Send + Sync>,
}

impl<T> Observable<T> {
    /// Creates a new `Observable` with the provided subscribe function.
    ///
    /// When the `Observable` is subscribed to, the `sf` function is invoked to
    /// manage the delivery of values to the `Subscriber`. It should return a
    /// `Subscription` that enables unsubscribing and can be used for awaiting
    /// `Tokio` tasks or joining OS threads when the `Observable` is asynchronous.
    pub fn new(sf: impl FnMut(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Box::new(sf),
        }
    }
}

impl<T: 'static> Observable<T> {
    /// Creates an `Observable` that emits every item of `items` in order and then
    /// completes. Each subscription iterates a fresh clone of `items`.
    pub fn from_iterable<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Observable::new(move |mut o| {
            for v in items.clone() {
                if o.is_closed() {
                    tracing::trace!("subscriber closed, stopping iteration");
                    return Subscription::closing(&o, SubscriptionHandle::Nil);
                }
                o.next(v);
            }
            o.complete();
            Subscription::closing(&o, SubscriptionHandle::Nil)
        })
    }

    /// Creates an `Observable` that completes without emitting.
    #[must_use]
    pub fn empty() -> Self {
        Observable::new(|mut o| {
            o.complete();
            Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
        })
    }

    /// Creates an `Observable` that signals `err` to every subscriber.
    #[must_use]
    pub fn error(err: SignalError) -> Self {
        Observable::new(move |mut o| {
            o.error(Arc::clone(&err));
            Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
        })
    }
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&mut self, v: Subscriber<Self::ObsType>) -> Subscription {
        (self.subscribe_fn)(v)
    }
}

impl<T: Send + 'static> From<Maybe<T>> for Observable<T> {
    fn from(maybe: Maybe<T>) -> Self {
        maybe.into_observable()
    }
}

// Upstream subscriber that hands each item to `on_next` together with the
// downstream subscriber and passes terminal signals straight through.
pub(crate) fn forwarding<T, U>(
    o: Subscriber<U>,
    mut on_next: impl FnMut(T, &mut Subscriber<U>) + Send + 'static,
) -> Subscriber<T>
where
    T: 'static,
    U: 'static,
{
    let closed = o.closed_flag();
    let o_shared = Arc::new(Mutex::new(o));
    let o_cloned_e = Arc::clone(&o_shared);
    let o_cloned_c = Arc::clone(&o_shared);

    Subscriber::new(
        move |v| on_next(v, &mut *o_shared.lock()),
        move |observable_error| o_cloned_e.lock().error(observable_error),
        move || o_cloned_c.lock().complete(),
    )
    .share_closed(closed)
}

/// The `ObservableExt` trait provides a set of extension methods that can be applied
/// to observables to transform and manipulate their behavior.
///
/// Operators returning a [`Maybe`] reduce the stream to at most one item.
pub trait ObservableExt<T: Send + 'static>:
    Subscribeable<ObsType = T> + Sized + Send + Sync + 'static
{
    /// Transforms the items emitted by the observable using a transformation
    /// function.
    fn map<U, F>(mut self, f: F) -> Observable<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
        U: 'static,
    {
        let f = Arc::new(f);
        Observable::new(move |o| {
            let f = Arc::clone(&f);
            self.subscribe(forwarding(o, move |v, o| o.next(f(v))))
        })
    }

    /// Filters the items emitted by the observable based on a predicate function.
    ///
    /// Only items for which the predicate function returns `true` will be emitted
    /// by the resulting observable.
    fn filter<P>(mut self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Observable::new(move |o| {
            let predicate = Arc::clone(&predicate);
            self.subscribe(forwarding(o, move |v, o| {
                if predicate(&v) {
                    o.next(v);
                }
            }))
        })
    }

    /// Emits at most the first `n` items emitted by the observable, then completes
    /// and closes the upstream.
    fn take(mut self, n: usize) -> Observable<T> {
        Observable::new(move |mut o| {
            if n == 0 {
                o.complete();
                return Subscription::closing(&o, SubscriptionHandle::Nil);
            }
            let mut i = 0;
            self.subscribe(forwarding(o, move |v, o| {
                i += 1;
                o.next(v);
                if i == n {
                    o.complete();
                }
            }))
        })
    }

    /// Invokes `f` with a reference to every item before passing it on.
    fn do_on_next<F>(mut self, f: F) -> Observable<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Observable::new(move |o| {
            let f = Arc::clone(&f);
            self.subscribe(forwarding(o, move |v, o| {
                f(&v);
                o.next(v);
            }))
        })
    }

    /// Invokes `f` when the observable signals an error, then passes the error on.
    fn do_on_error<F>(mut self, f: F) -> Observable<T>
    where
        F: Fn(&SignalError) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Observable::new(move |o| {
            let f = Arc::clone(&f);
            self.subscribe(recovering(o, move |e, o| {
                f(&e);
                o.error(e);
            }))
        })
    }

    /// Replaces an error signal with a final `fallback` item followed by completion.
    fn on_error_return(mut self, fallback: T) -> Observable<T>
    where
        T: Clone + Sync,
    {
        Observable::new(move |o| {
            let fallback = fallback.clone();
            self.subscribe(recovering(o, move |e, o| {
                tracing::debug!(error = %e, "replacing error with fallback item");
                o.next(fallback.clone());
                o.complete();
            }))
        })
    }

    /// Reduces the observable to its first item, completing empty if the source
    /// completes without emitting. The upstream is closed once the first item
    /// arrives.
    fn first(mut self) -> Maybe<T> {
        Maybe::from_observable(Observable::new(move |o| {
            self.subscribe(forwarding(o, |v, o| {
                o.next(v);
                o.complete();
            }))
        }))
    }

    /// Reduces the observable to exactly one item.
    ///
    /// Signals [`ObservableError::NoSuchElement`] if the source completes without
    /// emitting, and [`ObservableError::TooManyElements`] as soon as a second item
    /// arrives.
    fn single(mut self) -> Maybe<T> {
        Maybe::from_observable(Observable::new(move |o| {
            let closed = o.closed_flag();
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let slot: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
            let slot_c = Arc::clone(&slot);

            let u = Subscriber::new(
                move |v| {
                    let mut slot = slot.lock();
                    if slot.is_some() {
                        tracing::debug!("single() received more than one item");
                        o_shared
                            .lock()
                            .error(ObservableError::TooManyElements.into_signal());
                        return;
                    }
                    *slot = Some(v);
                },
                move |observable_error| o_cloned_e.lock().error(observable_error),
                move || {
                    let value = slot_c.lock().take();
                    let mut o = o_cloned_c.lock();
                    match value {
                        Some(v) => {
                            o.next(v);
                            o.complete();
                        }
                        None => {
                            tracing::debug!("single() source completed without items");
                            o.error(ObservableError::NoSuchElement.into_signal());
                        }
                    }
                },
            )
            .share_closed(closed);
            self.subscribe(u)
        }))
    }

    /// Collects every item into a `Vec` emitted once the source completes.
    fn collect_list(mut self) -> Maybe<Vec<T>> {
        Maybe::from_observable(Observable::new(move |o| {
            let buffer = Arc::new(Mutex::new(Vec::new()));
            let buffer_c = Arc::clone(&buffer);
            self.subscribe(collecting(
                o,
                move |v| buffer.lock().push(v),
                move || std::mem::take(&mut *buffer_c.lock()),
            ))
        }))
    }

    /// Counts the items emitted by the source, emitting the count on completion.
    fn count(mut self) -> Maybe<usize> {
        Maybe::from_observable(Observable::new(move |o| {
            let n = Arc::new(Mutex::new(0_usize));
            let n_c = Arc::clone(&n);
            self.subscribe(collecting(
                o,
                move |_| *n.lock() += 1,
                move || *n_c.lock(),
            ))
        }))
    }

    /// Moves the subscription to the source onto a spawned `Tokio` task.
    ///
    /// The returned `Subscription` carries the task handle, so it can be awaited
    /// with `join_concurrent().await`. Unsubscribing it also runs the unsubscribe
    /// logic of the source's own subscription. Outside a `Tokio` runtime the source is
    /// subscribed on the current thread instead.
    fn subscribe_on_task(self) -> Observable<T> {
        let source = Arc::new(Mutex::new(self));
        Observable::new(move |o| match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let source = Arc::clone(&source);
                let closed = o.closed_flag();
                let closed_c = Arc::clone(&closed);
                // Unsubscribe logic of the source's own subscription, parked here
                // until the outer subscription is unsubscribed.
                let inner_logic: Arc<Mutex<Option<UnsubscribeLogic>>> =
                    Arc::new(Mutex::new(None));
                let inner_logic_c = Arc::clone(&inner_logic);
                let task = handle.spawn(async move {
                    let Subscription {
                        unsubscribe_logic,
                        subscription_future,
                    } = {
                        let mut source = source.lock();
                        source.subscribe(o)
                    };
                    {
                        let mut slot = inner_logic_c.lock();
                        if closed_c.load(std::sync::atomic::Ordering::Acquire) {
                            unsubscribe_logic.unsubscribe();
                        } else {
                            *slot = Some(unsubscribe_logic);
                        }
                    }
                    let inner = Subscription::new(UnsubscribeLogic::Nil, subscription_future);
                    if let Err(e) = inner.join_concurrent().await {
                        tracing::warn!(error = %e, "inner subscription failed");
                    }
                });
                Subscription::new(
                    UnsubscribeLogic::Logic(Box::new(move || {
                        closed.store(true, std::sync::atomic::Ordering::Release);
                        let parked = inner_logic.lock().take();
                        if let Some(logic) = parked {
                            logic.unsubscribe();
                        }
                    })),
                    SubscriptionHandle::JoinTask(task),
                )
            }
            Err(_) => {
                tracing::warn!("no Tokio runtime available, subscribing on the current thread");
                source.lock().subscribe(o)
            }
        })
    }

    /// Subscribes and blocks the current thread until the first item arrives or the
    /// source completes empty.
    ///
    /// # Errors
    ///
    /// Returns the error signalled by the source.
    fn block_first(self) -> crate::Result<Option<T>> {
        self.first().block()
    }

    /// Subscribes and blocks the current thread until the source terminates,
    /// returning the last emitted item.
    ///
    /// # Errors
    ///
    /// Returns the error signalled by the source.
    fn block_last(mut self) -> crate::Result<Option<T>> {
        let mut last = None;
        blocking::block_on(&mut self, None, |v| last = Some(v))?;
        Ok(last)
    }
}

impl<T: Send + 'static> ObservableExt<T> for Observable<T> {}

// Upstream subscriber that forwards items and completion but hands errors to
// `on_error` together with the downstream subscriber.
pub(crate) fn recovering<T: 'static>(
    o: Subscriber<T>,
    mut on_error: impl FnMut(SignalError, &mut Subscriber<T>) + Send + 'static,
) -> Subscriber<T> {
    let closed = o.closed_flag();
    let o_shared = Arc::new(Mutex::new(o));
    let o_cloned_e = Arc::clone(&o_shared);
    let o_cloned_c = Arc::clone(&o_shared);

    Subscriber::new(
        move |v| o_shared.lock().next(v),
        move |observable_error| on_error(observable_error, &mut *o_cloned_e.lock()),
        move || o_cloned_c.lock().complete(),
    )
    .share_closed(closed)
}

// Upstream subscriber that accumulates items with `on_next` and emits the
// result of `finish` once the source completes.
fn collecting<T, R>(
    o: Subscriber<R>,
    on_next: impl FnMut(T) + Send + 'static,
    finish: impl Fn() -> R + Send + 'static,
) -> Subscriber<T>
where
    T: 'static,
    R: 'static,
{
    let closed = o.closed_flag();
    let o_shared = Arc::new(Mutex::new(o));
    let o_cloned_c = Arc::clone(&o_shared);

    Subscriber::new(
        on_next,
        move |observable_error| o_shared.lock().error(observable_error),
        move || {
            let mut o = o_cloned_c.lock();
            o.next(finish());
            o.complete();
        },
    )
    .share_closed(closed)
}
