use std::{collections::HashSet, sync::Arc};

use super::{Delivery, PersonRepository};
use crate::{
    subscription::subscribe::{Subscription, SubscriptionHandle},
    Maybe, Observable, ObservableExt, Observer, Person,
};

/// The records a default [`InMemoryPersonRepository`] is seeded with.
pub fn reference_seed() -> Vec<Person> {
    vec![
        Person::new(1, "Michael", "Weston"),
        Person::new(2, "Fiona", "Glenanne"),
        Person::new(3, "Sam", "Axe"),
        Person::new(4, "Jesse", "Porter"),
    ]
}

/// Read-only repository over a fixed, ordered set of people.
///
/// The seed is fixed at construction and shared by every observable the
/// repository hands out, so any number of consumers can read it concurrently.
#[derive(Debug, Clone)]
pub struct InMemoryPersonRepository {
    people: Arc<[Person]>,
    delivery: Delivery,
}

impl InMemoryPersonRepository {
    /// Creates a repository over [`reference_seed`] with immediate delivery.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(reference_seed())
    }

    /// Creates a repository over `seed`, keeping its order.
    ///
    /// Duplicate ids are accepted; lookups by id return the first match.
    pub fn with_seed(seed: impl IntoIterator<Item = Person>) -> Self {
        let people: Arc<[Person]> = seed.into_iter().collect();

        let mut seen = HashSet::with_capacity(people.len());
        for p in people.iter() {
            if !seen.insert(p.id()) {
                tracing::warn!(id = p.id(), "duplicate person id in seed");
            }
        }
        tracing::debug!(count = people.len(), "person repository seeded");

        Self {
            people,
            delivery: Delivery::default(),
        }
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

impl Default for InMemoryPersonRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonRepository for InMemoryPersonRepository {
    fn get_by_id(&self, id: i32) -> Maybe<Person> {
        let people = Arc::clone(&self.people);
        let found = Maybe::defer(move || {
            let found = people.iter().find(|p| p.id() == id).cloned();
            tracing::debug!(id, found = found.is_some(), "person lookup");
            found
        });

        match self.delivery {
            Delivery::Immediate => found,
            Delivery::Task => found.subscribe_on_task(),
        }
    }

    fn find_all(&self) -> Observable<Person> {
        let people = Arc::clone(&self.people);
        let all = Observable::new(move |mut o| {
            tracing::trace!(count = people.len(), "emitting all people");
            for p in people.iter() {
                if o.is_closed() {
                    break;
                }
                o.next(p.clone());
            }
            o.complete();
            Subscription::closing(&o, SubscriptionHandle::Nil)
        });

        match self.delivery {
            Delivery::Immediate => all,
            Delivery::Task => all.subscribe_on_task(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_reference_seed() {
        let repo = InMemoryPersonRepository::default();
        assert_eq!(repo.len(), 4);
        assert_eq!(repo.people(), reference_seed().as_slice());
        assert_eq!(repo.delivery(), Delivery::Immediate);
    }

    #[test]
    fn duplicate_ids_resolve_to_first_match() {
        let repo = InMemoryPersonRepository::with_seed(vec![
            Person::new(1, "First", "Match"),
            Person::new(1, "Second", "Match"),
        ]);

        let p = repo.get_by_id(1).block().unwrap().unwrap();
        assert_eq!(p.first_name(), Some("First"));
    }

    #[test]
    fn empty_seed_completes_empty() {
        let repo = InMemoryPersonRepository::with_seed(Vec::new());
        assert!(repo.is_empty());
        assert_eq!(repo.find_all().count().block().unwrap(), Some(0));
        assert_eq!(repo.get_by_id(1).block().unwrap(), None);
    }

    #[test]
    fn task_delivery_without_runtime_falls_back() {
        let repo = InMemoryPersonRepository::new().with_delivery(Delivery::Task);
        assert_eq!(repo.find_all().count().block().unwrap(), Some(4));
    }
}
