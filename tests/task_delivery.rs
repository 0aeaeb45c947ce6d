mod custom_error;
mod register_emissions;

use std::sync::Arc;

use custom_error::CustomError;
use register_emissions::{init_tracing, register_emissions_subscriber};

use reactive_people::{
    subscribe::{Subscription, SubscriptionHandle},
    Delivery, InMemoryPersonRepository, Maybe, Observable, ObservableError, ObservableExt,
    Observer, Person, PersonRepository, StepVerifier, Subscribeable,
};

fn task_repository() -> InMemoryPersonRepository {
    init_tracing();
    InMemoryPersonRepository::new().with_delivery(Delivery::Task)
}

#[tokio::test]
async fn await_get_by_id() {
    let repository = task_repository();

    let found = repository.get_by_id(2).await.unwrap();
    assert_eq!(found, Some(Person::new(2, "Fiona", "Glenanne")));

    assert_eq!(repository.get_by_id(9).await.unwrap(), None);
}

#[tokio::test]
async fn subscription_can_be_joined() {
    let (subscriber, emissions) = register_emissions_subscriber();

    let subscription = task_repository().find_all().subscribe(subscriber);
    subscription.join_concurrent().await.unwrap();

    let emissions = emissions.lock().unwrap();
    assert_eq!(emissions.nexts.len(), 4);
    assert_eq!(emissions.completes, 1);
}

#[tokio::test]
async fn await_collected_list_keeps_order() {
    let people = task_repository()
        .find_all()
        .collect_list()
        .await
        .unwrap()
        .unwrap();

    let names: Vec<&str> = people.iter().filter_map(Person::first_name).collect();
    assert_eq!(names, vec!["Michael", "Fiona", "Sam", "Jesse"]);
}

#[tokio::test]
async fn await_single_not_found_with_fallback() {
    let id = 8;
    let person = task_repository()
        .find_all()
        .filter(move |p| p.id() == id)
        .single()
        .on_error_return(Person::builder().id(id).build())
        .await
        .unwrap();

    assert_eq!(person, Some(Person::builder().id(8).build()));
}

#[tokio::test(flavor = "multi_thread")]
async fn step_verifier_on_task_delivery() {
    let repository = task_repository();

    StepVerifier::create(repository.find_all())
        .expect_next_count(4)
        .verify_complete();

    StepVerifier::create(repository.find_all().filter(|p| p.id() == 8).single())
        .verify_error();
}

#[tokio::test]
async fn upstream_errors_are_wrapped() {
    let failing: Observable<Person> = Observable::new(|mut o| {
        o.next(Person::new(1, "Michael", "Weston"));
        o.error(Arc::new(CustomError));
        Subscription::new(
            reactive_people::subscribe::UnsubscribeLogic::Nil,
            SubscriptionHandle::Nil,
        )
    });

    match failing.collect_list().await {
        Err(ObservableError::Upstream(e)) => assert_eq!(e.to_string(), "person source failed"),
        other => panic!("expected upstream error, got {:?}", other.map(|v| v.map(|v| v.len()))),
    }
}

#[tokio::test]
async fn maybe_error_is_observable_and_recoverable() {
    let recovered = Maybe::<Person>::error(Arc::new(CustomError))
        .do_on_error(|e| tracing::warn!("intercepted: {}", e))
        .on_error_return(Person::builder().id(0).build())
        .await
        .unwrap();

    assert_eq!(recovered.map(|p| p.id()), Some(0));
}
