//! Reactive single-value and multi-value pipelines over an in-memory person
//! repository.
//!
//! The repository hands out cold reactive wrappers over fixed seed data:
//!
//! - [`PersonRepository::get_by_id`] returns a [`Maybe<Person>`], a deferred result
//!   that completes with the matching person or completes empty when there is none.
//! - [`PersonRepository::find_all`] returns an [`Observable<Person>`] emitting every
//!   person in insertion order. Each subscription replays the whole sequence.
//!
//! Results are consumed by blocking, subscribing with a [`subscribe::Subscriber`],
//! awaiting, or chaining the operators of [`ObservableExt`] and [`Maybe`].
//!
//! Looking a person up through a full scan shows the two not-found policies:
//! `first()` completes empty when nothing matches, while `single()` signals
//! [`ObservableError::NoSuchElement`].
//!
//! ```no_run
//! use reactive_people::{
//!     InMemoryPersonRepository, ObservableExt, Person, PersonRepository,
//! };
//!
//! let repository = InMemoryPersonRepository::new();
//!
//! let michael = repository.get_by_id(1).block()?;
//! assert_eq!(michael.map(|p| p.id()), Some(1));
//!
//! let missing = repository.find_all().filter(|p| p.id() == 8).first().block()?;
//! assert!(missing.is_none());
//!
//! let placeholder = repository
//!     .find_all()
//!     .filter(|p| p.id() == 8)
//!     .single()
//!     .do_on_error(|e| tracing::error!("Did not match expected result: {}", e))
//!     .on_error_return(Person::builder().id(8).build())
//!     .block()?;
//! assert_eq!(placeholder, Some(Person::builder().id(8).build()));
//! # Ok::<(), reactive_people::ObservableError>(())
//! ```

mod errors;
mod observable;
mod observer;
mod person;
pub mod repository;
mod subscription;
#[cfg(any(test, feature = "test-util"))]
mod verifier;

pub use errors::*;
pub use observable::{Maybe, Observable, ObservableExt};
pub use observer::Observer;
pub use person::{Person, PersonBuilder};
pub use repository::{Delivery, InMemoryPersonRepository, PersonRepository};
pub use subscription::subscribe;
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};
#[cfg(any(test, feature = "test-util"))]
pub use verifier::StepVerifier;
