//! Step-by-step assertions over the signals of an observable.
//!
//! A [`StepVerifier`] subscribes to a source, records everything it emits until
//! it terminates, and checks the recording against a script of expectations. It
//! panics with a description of the first mismatch, which makes it suitable for
//! use inside `#[test]` functions.
//!
//! ```no_run
//! use reactive_people::{Observable, ObservableExt, StepVerifier};
//!
//! StepVerifier::create(Observable::from_iterable(vec![1, 2, 3]).map(|v| v * 10))
//!     .expect_next(10)
//!     .expect_next_count(2)
//!     .verify_complete();
//! ```

use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use crate::{
    observable::blocking::{recv_signal, signal_channel, Signal},
    subscription::subscribe::{Subscribeable, Unsubscribeable},
    Observable, ObservableError,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

type Matcher<T> = Box<dyn Fn(&T) -> bool + Send>;

enum Step<T> {
    Next { matches: Matcher<T>, description: String },
    NextCount(usize),
}

enum Outcome {
    Complete,
    Error(ObservableError),
    Unterminated(ObservableError),
}

/// Scripted expectations for the signals of a single subscription.
///
/// Task-backed sources must be verified from a multi-threaded `Tokio` runtime,
/// since verification blocks the calling thread.
pub struct StepVerifier<T> {
    source: Observable<T>,
    steps: Vec<Step<T>>,
    timeout: Duration,
}

impl<T: Debug + Send + 'static> StepVerifier<T> {
    /// Starts a script for `source`. Nothing is subscribed until a `verify_*`
    /// method is called.
    pub fn create(source: impl Into<Observable<T>>) -> Self {
        StepVerifier {
            source: source.into(),
            steps: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets how long to wait for the source to terminate. Defaults to five seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Expects the next item to equal `expected`.
    #[must_use]
    pub fn expect_next(mut self, expected: T) -> Self
    where
        T: PartialEq,
    {
        let description = format!("{expected:?}");
        self.steps.push(Step::Next {
            matches: Box::new(move |v| *v == expected),
            description,
        });
        self
    }

    /// Expects the next item to satisfy `predicate`.
    #[must_use]
    pub fn expect_next_matches(mut self, predicate: impl Fn(&T) -> bool + Send + 'static) -> Self {
        self.steps.push(Step::Next {
            matches: Box::new(predicate),
            description: "a matching item".to_string(),
        });
        self
    }

    /// Expects `n` more items, whatever their values.
    #[must_use]
    pub fn expect_next_count(mut self, n: usize) -> Self {
        self.steps.push(Step::NextCount(n));
        self
    }

    /// Runs the script and expects the source to complete after the last step.
    ///
    /// # Panics
    ///
    /// Panics if any expectation is not met.
    pub fn verify_complete(self) -> Duration {
        self.verify(|outcome| match outcome {
            Outcome::Complete => Ok(()),
            other => Err(format!("expected completion, got {}", describe(other))),
        })
    }

    /// Runs the script and expects the source to signal an error after the last step.
    ///
    /// # Panics
    ///
    /// Panics if any expectation is not met.
    pub fn verify_error(self) -> Duration {
        self.verify_error_matches(|_| true)
    }

    /// Runs the script and expects an error satisfying `predicate` after the last step.
    ///
    /// # Panics
    ///
    /// Panics if any expectation is not met.
    pub fn verify_error_matches(self, predicate: impl Fn(&ObservableError) -> bool) -> Duration {
        self.verify(|outcome| match outcome {
            Outcome::Error(e) if predicate(e) => Ok(()),
            Outcome::Error(e) => Err(format!("error {e} did not match the expectation")),
            other => Err(format!("expected an error, got {}", describe(other))),
        })
    }

    fn verify(self, check_terminal: impl FnOnce(&Outcome) -> Result<(), String>) -> Duration {
        let started = Instant::now();
        let StepVerifier {
            mut source,
            steps,
            timeout,
        } = self;

        let (items, outcome) = record(&mut source, timeout);
        tracing::trace!(items = items.len(), "step verifier recorded signals");

        let mut items = items.into_iter().enumerate();
        for step in &steps {
            match step {
                Step::Next {
                    matches,
                    description,
                } => match items.next() {
                    Some((i, v)) => assert!(
                        matches(&v),
                        "expect_next({description}) failed: item #{i} was {v:?}"
                    ),
                    None => panic!(
                        "expect_next({description}) failed: source {} before emitting it",
                        describe(&outcome)
                    ),
                },
                Step::NextCount(n) => {
                    for k in 0..*n {
                        if items.next().is_none() {
                            panic!(
                                "expect_next_count({n}) failed: only {k} items arrived before the source {}",
                                describe(&outcome)
                            );
                        }
                    }
                }
            }
        }

        if let Some((i, v)) = items.next() {
            panic!("unexpected item #{i}: {v:?}");
        }
        if let Err(message) = check_terminal(&outcome) {
            panic!("{message}");
        }
        started.elapsed()
    }
}

fn record<T: Send + 'static>(source: &mut Observable<T>, timeout: Duration) -> (Vec<T>, Outcome) {
    let (subscriber, rx) = signal_channel();
    let deadline = Some((Instant::now() + timeout, timeout));
    let subscription = source.subscribe(subscriber);

    let mut items = Vec::new();
    loop {
        match recv_signal(&rx, deadline) {
            Ok(Signal::Next(v)) => items.push(v),
            Ok(Signal::Complete) => return (items, Outcome::Complete),
            Ok(Signal::Error(e)) => return (items, Outcome::Error(ObservableError::from_signal(e))),
            Err(e) => {
                subscription.unsubscribe();
                return (items, Outcome::Unterminated(e));
            }
        }
    }
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Complete => "completed".to_string(),
        Outcome::Error(e) => format!("errored with: {e}"),
        Outcome::Unterminated(e) => format!("did not terminate: {e}"),
    }
}
