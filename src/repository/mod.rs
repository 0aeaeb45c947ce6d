//! Repositories handing out reactive wrappers over person records.
//!
//! - [`PersonRepository`]: the lookup contract.
//! - [`InMemoryPersonRepository`]: fixed, read-only seed data.

mod memory;

pub use memory::{reference_seed, InMemoryPersonRepository};

use crate::{Maybe, Observable, Person};

/// Asynchronous access to a set of [`Person`] records.
///
/// Both operations are lazy: the lookup runs when the returned value is
/// subscribed to, blocked on or awaited, and runs again for every consumer.
pub trait PersonRepository {
    /// Looks up the person with the given id.
    ///
    /// Completes empty when no person matches; absence is not an error.
    fn get_by_id(&self, id: i32) -> Maybe<Person>;

    /// Emits every person in insertion order and then completes.
    fn find_all(&self) -> Observable<Person>;
}

/// How a repository delivers emissions to its subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Emit on the subscribing thread, inside `subscribe`.
    #[default]
    Immediate,

    /// Emit from a spawned `Tokio` task. Falls back to `Immediate` outside a
    /// `Tokio` runtime.
    Task,
}
