use std::sync::{Arc, Mutex};

use reactive_people::{subscribe::Subscriber, Person};

/// Signals recorded by a subscriber made with [`register_emissions_subscriber`].
#[derive(Default)]
pub struct Emissions {
    pub nexts: Vec<Person>,
    pub errors: Vec<String>,
    pub completes: usize,
}

pub fn register_emissions_subscriber() -> (Subscriber<Person>, Arc<Mutex<Emissions>>) {
    let emissions = Arc::new(Mutex::new(Emissions::default()));
    let nexts_c = Arc::clone(&emissions);
    let errors_c = Arc::clone(&emissions);
    let completes_c = Arc::clone(&emissions);

    let subscriber = Subscriber::new(
        move |p| {
            // Track next() calls.
            nexts_c.lock().unwrap().nexts.push(p);
        },
        move |e| {
            // Track error() calls.
            errors_c.lock().unwrap().errors.push(e.to_string());
        },
        move || {
            // Track complete() calls.
            completes_c.lock().unwrap().completes += 1;
        },
    );
    (subscriber, emissions)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("reactive_people=debug")
        .try_init();
}
