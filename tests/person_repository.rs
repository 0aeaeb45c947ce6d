mod register_emissions;

use std::sync::{Arc, Mutex};

use register_emissions::{init_tracing, register_emissions_subscriber};

use reactive_people::{
    repository::reference_seed, InMemoryPersonRepository, ObservableError, ObservableExt, Person,
    PersonRepository, StepVerifier, Subscribeable,
};

fn repository() -> InMemoryPersonRepository {
    init_tracing();
    InMemoryPersonRepository::new()
}

#[test]
fn get_by_id_block() {
    let person = repository().get_by_id(1).block().unwrap();

    assert_eq!(person, Some(Person::new(1, "Michael", "Weston")));
}

#[test]
fn get_by_id_subscribe() {
    let repository = repository();

    StepVerifier::create(repository.get_by_id(1))
        .expect_next_count(1)
        .verify_complete();

    let (subscriber, emissions) = register_emissions_subscriber();
    repository.get_by_id(1).subscribe(subscriber);

    let emissions = emissions.lock().unwrap();
    assert_eq!(emissions.nexts.len(), 1);
    assert_eq!(emissions.nexts[0].id(), 1);
    assert_eq!(emissions.completes, 1);
    assert!(emissions.errors.is_empty());
}

#[test]
fn get_by_id_every_seeded_id() {
    let repository = repository();

    for expected in reference_seed() {
        StepVerifier::create(repository.get_by_id(expected.id()))
            .expect_next(expected)
            .verify_complete();
    }
}

#[test]
fn get_by_id_subscribe_not_found() {
    let repository = repository();

    StepVerifier::create(repository.get_by_id(9))
        .expect_next_count(0)
        .verify_complete();

    let (subscriber, emissions) = register_emissions_subscriber();
    repository.get_by_id(9).subscribe(subscriber);

    let emissions = emissions.lock().unwrap();
    assert!(emissions.nexts.is_empty(), "absent id must not emit");
    assert!(emissions.errors.is_empty(), "absent id is not an error");
    assert_eq!(emissions.completes, 1);
}

#[test]
fn get_by_id_map_function() {
    let first_name = repository()
        .get_by_id(1)
        .map(|p| p.first_name().unwrap_or_default().to_string())
        .block()
        .unwrap();

    assert_eq!(first_name.as_deref(), Some("Michael"));
}

#[test]
fn find_all_block_first() {
    let person = repository().find_all().block_first().unwrap();

    assert_eq!(person.map(|p| p.id()), Some(1));
}

#[test]
fn find_all_subscribe() {
    let repository = repository();

    StepVerifier::create(repository.find_all())
        .expect_next_count(4)
        .verify_complete();

    let (subscriber, emissions) = register_emissions_subscriber();
    repository.find_all().subscribe(subscriber);

    let emissions = emissions.lock().unwrap();
    let ids: Vec<i32> = emissions.nexts.iter().map(Person::id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(emissions.completes, 1);
}

#[test]
fn find_all_is_restartable() {
    let repository = repository();
    let mut all = repository.find_all();

    let first_pass = Arc::new(Mutex::new(Vec::new()));
    let second_pass = Arc::new(Mutex::new(Vec::new()));

    for pass in [&first_pass, &second_pass] {
        let pass = Arc::clone(pass);
        all.subscribe(reactive_people::subscribe::Subscriber::on_next(move |p: Person| {
            pass.lock().unwrap().push(p.id());
        }));
    }

    assert_eq!(*first_pass.lock().unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(*first_pass.lock().unwrap(), *second_pass.lock().unwrap());
}

#[test]
fn find_all_to_list() {
    let people = repository().find_all().collect_list().block().unwrap();

    assert_eq!(people, Some(reference_seed()));
}

#[test]
fn find_person_by_id() {
    let id = 3;
    StepVerifier::create(repository().find_all().filter(move |p| p.id() == id).first())
        .expect_next(Person::new(3, "Sam", "Axe"))
        .verify_complete();
}

#[test]
fn find_person_by_id_not_found() {
    let id = 8;
    StepVerifier::create(repository().find_all().filter(move |p| p.id() == id).first())
        .verify_complete();
}

#[test]
fn find_person_by_id_not_found_with_error() {
    let id = 8;

    StepVerifier::create(repository().find_all().filter(move |p| p.id() == id).single())
        .verify_error_matches(|e| matches!(e, ObservableError::NoSuchElement));
}

#[test]
fn find_person_by_id_not_found_with_fallback() {
    let id = 8;
    let intercepted = Arc::new(Mutex::new(Vec::new()));
    let intercepted_c = Arc::clone(&intercepted);

    let (subscriber, emissions) = register_emissions_subscriber();
    repository()
        .find_all()
        .filter(move |p| p.id() == id)
        .single()
        .do_on_error(move |e| {
            tracing::error!("Did not match expected result: {}", e);
            intercepted_c.lock().unwrap().push(e.to_string());
        })
        .on_error_return(Person::builder().id(id).build())
        .subscribe(subscriber);

    assert_eq!(intercepted.lock().unwrap().len(), 1);

    let emissions = emissions.lock().unwrap();
    assert!(emissions.errors.is_empty(), "fallback must stop the error");
    assert_eq!(emissions.completes, 1);
    assert_eq!(emissions.nexts.len(), 1);
    assert_eq!(emissions.nexts[0].id(), 8);
    assert!(emissions.nexts[0].is_placeholder());
}

#[test]
fn single_with_duplicate_matches_fails() {
    let repository = InMemoryPersonRepository::with_seed(vec![
        Person::new(5, "Madeline", "Westen"),
        Person::new(5, "Nate", "Westen"),
    ]);

    StepVerifier::create(repository.find_all().filter(|p| p.id() == 5).single())
        .verify_error_matches(|e| matches!(e, ObservableError::TooManyElements));

    StepVerifier::create(repository.find_all().filter(|p| p.id() == 5).first())
        .expect_next_matches(|p| p.first_name() == Some("Madeline"))
        .verify_complete();
}
