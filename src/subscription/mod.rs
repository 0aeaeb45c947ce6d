//! Provides structures and traits related to subscription management.
//!
//! This module includes types such as `Subscriber` for handling observed values,
//! errors, and completions, as well as `Subscription` for controlling subscriptions
//! to observables.
//!
//! Additionally, it defines enums and traits for subscription handling, awaiting
//! asynchronous subscriptions and defining unsubscribe logic.
pub mod subscribe;
