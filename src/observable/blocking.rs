use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

use crate::{
    subscription::subscribe::{Subscribeable, Subscriber, Unsubscribeable},
    ObservableError, SignalError,
};

/// A single notification delivered to an observer.
pub(crate) enum Signal<T> {
    Next(T),
    Error(SignalError),
    Complete,
}

/// Subscriber that forwards every signal into a std channel.
pub(crate) fn signal_channel<T: Send + 'static>() -> (Subscriber<T>, Receiver<Signal<T>>) {
    let (tx, rx) = mpsc::channel();
    let tx_e = tx.clone();
    let tx_c = tx.clone();

    let subscriber = Subscriber::new(
        move |v| {
            let _ = tx.send(Signal::Next(v));
        },
        move |e| {
            let _ = tx_e.send(Signal::Error(e));
        },
        move || {
            let _ = tx_c.send(Signal::Complete);
        },
    );
    (subscriber, rx)
}

pub(crate) fn recv_signal<T>(
    rx: &Receiver<Signal<T>>,
    timeout: Option<(Instant, Duration)>,
) -> crate::Result<Signal<T>> {
    match timeout {
        None => rx.recv().map_err(|_| ObservableError::Disconnected),
        Some((deadline, total)) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            rx.recv_timeout(remaining).map_err(|e| match e {
                RecvTimeoutError::Timeout => ObservableError::Timeout(total),
                RecvTimeoutError::Disconnected => ObservableError::Disconnected,
            })
        }
    }
}

/// Subscribes to `source` and blocks the current thread until it terminates,
/// handing every emitted item to `on_next`.
///
/// Must not be called from a current-thread Tokio runtime when the source emits
/// from a task on that same runtime.
pub(crate) fn block_on<T, S>(
    source: &mut S,
    timeout: Option<Duration>,
    mut on_next: impl FnMut(T),
) -> crate::Result<()>
where
    T: Send + 'static,
    S: Subscribeable<ObsType = T> + ?Sized,
{
    let (subscriber, rx) = signal_channel();
    let deadline = timeout.map(|d| (Instant::now() + d, d));
    let subscription = source.subscribe(subscriber);

    loop {
        match recv_signal(&rx, deadline) {
            Ok(Signal::Next(v)) => on_next(v),
            Ok(Signal::Complete) => return Ok(()),
            Ok(Signal::Error(e)) => return Err(ObservableError::from_signal(e)),
            Err(e @ ObservableError::Timeout(_)) => {
                subscription.unsubscribe();
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }
}
