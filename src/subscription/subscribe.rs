use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle as ThreadJoinHandle,
};

use tokio::task::JoinHandle;

use crate::{observer::Observer, ObservableError, SignalError};

/// A trait for types that can be subscribed to, allowing consumers to receive
/// values emitted by an observable stream.
pub trait Subscribeable {
    /// The type of items emitted by the observable stream.
    type ObsType;

    /// Subscribes to the observable stream and specifies how to handle emitted values.
    ///
    /// The `Subscriber` parameter defines the behavior for processing values emitted
    /// by the observable stream. Observables are cold: every call starts a fresh
    /// emission sequence for the given subscriber.
    ///
    /// The returned `Subscription` allows the subscriber to manage the subscription,
    /// such as unsubscribing or awaiting a background emission.
    fn subscribe(&mut self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// A trait for types that can be unsubscribed, allowing the clean release of resources
/// associated with a subscription. This trait is typically used to signal the
/// `Observable` to stop emitting values.
pub trait Unsubscribeable {
    /// Unsubscribes from a subscription and releases associated resources.
    ///
    /// The `Subscription` instance that this method is called on is consumed, making it
    /// unusable after the `unsubscribe` operation.
    fn unsubscribe(self);
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;
type ErrorFn = Box<dyn FnMut(SignalError) + Send>;

/// A type that acts as an observer, allowing users to handle emitted values, errors,
/// and completion when subscribing to an `Observable` or a `Maybe`.
///
/// Users can create a `Subscriber` instance using the `new` method and provide
/// custom functions to handle the `next`, `error`, and `complete` events.
///
/// Once `error` or `complete` has been delivered, every later signal is ignored.
pub struct Subscriber<NextFnType> {
    next_fn: NextFn<NextFnType>,
    complete_fn: Option<CompleteFn>,
    error_fn: Option<ErrorFn>,
    terminated: bool,
    closed: Arc<AtomicBool>,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Creates a new `Subscriber` instance with custom handling functions for emitted
    /// values, errors, and completion.
    pub fn new(
        next_fn: impl FnMut(NextFnType) + 'static + Send,
        error_fn: impl FnMut(SignalError) + 'static + Send,
        complete_fn: impl FnMut() + 'static + Send,
    ) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: Some(Box::new(complete_fn)),
            error_fn: Some(Box::new(error_fn)),
            terminated: false,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a new Subscriber with the provided `next` function.
    ///
    /// The `next` closure is called when the observable emits a new item. It takes
    /// a parameter of type `NextFnType`, which is an item emitted by the observable.
    pub fn on_next(next_fn: impl FnMut(NextFnType) + 'static + Send) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: None,
            error_fn: None,
            terminated: false,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the completion function for the Subscriber.
    pub fn on_complete(&mut self, complete_fn: impl FnMut() + 'static + Send) {
        self.complete_fn = Some(Box::new(complete_fn));
    }

    /// Set the error-handling function for the Subscriber.
    ///
    /// The provided closure will be called when the observable encounters an error
    /// during its emission sequence.
    pub fn on_error(&mut self, error_fn: impl FnMut(SignalError) + 'static + Send) {
        self.error_fn = Some(Box::new(error_fn));
    }

    /// Returns true once this subscriber has terminated or has been unsubscribed.
    ///
    /// Sources should check this before each emission and stop when it turns true:
    ///
    /// ```text
    /// Observable::new(|mut subscriber| {
    ///     for v in values {
    ///         if subscriber.is_closed() { break; }
    ///         subscriber.next(v);
    ///     }
    ///     // ...
    /// });
    /// ```
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    // Operators hand the upstream a subscriber sharing the downstream flag, so a
    // terminal signal or unsubscribe anywhere in the chain reaches the source.
    pub(crate) fn share_closed(mut self, flag: Arc<AtomicBool>) -> Self {
        self.closed = flag;
        self
    }

    fn accepts_signals(&self) -> bool {
        !self.terminated && !self.is_closed()
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if !self.accepts_signals() {
            return;
        }
        (self.next_fn)(v);
    }

    fn complete(&mut self) {
        if !self.accepts_signals() {
            return;
        }
        self.terminated = true;
        if let Some(cfn) = &mut self.complete_fn {
            (cfn)();
        }
        self.closed.store(true, Ordering::Release);
    }

    fn error(&mut self, observable_error: SignalError) {
        if !self.accepts_signals() {
            return;
        }
        self.terminated = true;
        match &mut self.error_fn {
            Some(efn) => (efn)(observable_error),
            None => tracing::debug!(error = %observable_error, "unhandled observable error"),
        }
        self.closed.store(true, Ordering::Release);
    }
}

/// Enumeration representing different types of handles used by `Subscription` to
/// await asynchronous tasks or threads.
pub enum SubscriptionHandle {
    /// No specific handle for task or thread awaiting.
    Nil,

    /// Holds a join handle for awaiting an asynchronous observable using Tokio task.
    JoinTask(JoinHandle<()>),

    /// Holds a join handle for awaiting an asynchronous observable using OS thread.
    JoinThread(ThreadJoinHandle<()>),
}

/// Represents a subscription to an observable, allowing control over the
/// subscription.
///
/// When an observable is subscribed to, it returns a `Subscription` instance. This
/// subscription can be used to unsubscribe, and can also be used to await
/// asynchronous observables that use `Tokio` tasks or OS threads.
pub struct Subscription {
    pub(crate) unsubscribe_logic: UnsubscribeLogic,
    pub(crate) subscription_future: SubscriptionHandle,
}

impl Subscription {
    /// Creates a new Subscription instance with the specified unsubscribe logic and
    /// subscription handle.
    ///
    /// See [`UnsubscribeLogic`] and [`SubscriptionHandle`] for the available
    /// strategies.
    ///
    /// [`UnsubscribeLogic`]: enum.UnsubscribeLogic.html
    /// [`SubscriptionHandle`]: enum.SubscriptionHandle.html
    #[must_use]
    pub fn new(
        unsubscribe_logic: UnsubscribeLogic,
        subscription_future: SubscriptionHandle,
    ) -> Self {
        Subscription {
            unsubscribe_logic,
            subscription_future,
        }
    }

    /// Subscription whose unsubscribe closes the given subscriber.
    pub(crate) fn closing<T>(
        subscriber: &Subscriber<T>,
        subscription_future: SubscriptionHandle,
    ) -> Self {
        let closed = subscriber.closed_flag();
        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || closed.store(true, Ordering::Release))),
            subscription_future,
        )
    }

    /// Awaits the completion of the asynchronous task or thread associated with
    /// this subscription. Returns immediately for synchronous observables.
    ///
    /// # Errors
    ///
    /// Returns an error if joining a thread or awaiting a task used by the
    /// observable fails.
    pub async fn join_concurrent(self) -> crate::Result<()> {
        match self.subscription_future {
            SubscriptionHandle::JoinTask(task_handle) => task_handle
                .await
                .map_err(|e| ObservableError::JoinTask(e.to_string())),
            SubscriptionHandle::JoinThread(thread_handle) => {
                tokio::task::spawn_blocking(move || thread_handle.join())
                    .await
                    .map_err(|e| ObservableError::JoinTask(e.to_string()))?
                    .map_err(|_| ObservableError::JoinThread)
            }
            SubscriptionHandle::Nil => Ok(()),
        }
    }

    /// Awaits the completion of the OS thread associated with this subscription,
    /// blocking the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`ObservableError::JoinThread`] if the thread panicked and
    /// [`ObservableError::BlockingJoinOnTask`] if the subscription is backed by a
    /// Tokio task; use `join_concurrent().await` for those.
    pub fn join(self) -> crate::Result<()> {
        match self.subscription_future {
            SubscriptionHandle::JoinThread(thread_handle) => {
                thread_handle.join().map_err(|_| ObservableError::JoinThread)
            }
            SubscriptionHandle::Nil => Ok(()),
            SubscriptionHandle::JoinTask(_) => Err(ObservableError::BlockingJoinOnTask),
        }
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(self) {
        self.unsubscribe_logic.unsubscribe();
    }
}

/// Enumerates various unsubscribe logic options for a subscription.
pub enum UnsubscribeLogic {
    /// No specific unsubscribe logic.
    Nil,

    /// Unsubscribe logic defined by a function.
    Logic(Box<dyn FnOnce() + Send>),
}

impl UnsubscribeLogic {
    pub(crate) fn unsubscribe(self) {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Logic(fnc) => fnc(),
        }
    }
}
