use reactive_people::{
    subscribe::Subscriber, Delivery, InMemoryPersonRepository, ObservableError, ObservableExt,
    Person, PersonRepository, Subscribeable,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ObservableError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let repository = InMemoryPersonRepository::new().with_delivery(Delivery::Task);

    match repository.get_by_id(1).await? {
        Some(person) => info!("get_by_id(1): {}", person),
        None => info!("get_by_id(1): not found"),
    }

    if repository.get_by_id(9).await?.is_none() {
        info!("get_by_id(9): completed empty");
    }

    let first_name = repository
        .get_by_id(1)
        .map(|p| p.first_name().unwrap_or_default().to_string())
        .await?;
    info!("from map firstName: {:?}", first_name);

    let subscription = repository.find_all().subscribe(Subscriber::new(
        |person: Person| info!("find_all: {}", person),
        |e| error!("find_all failed: {}", e),
        || info!("find_all completed"),
    ));
    subscription.join_concurrent().await?;

    let people = repository.find_all().collect_list().await?.unwrap_or_default();
    info!("collected {} people", people.len());

    let id = 3;
    let found = repository
        .find_all()
        .filter(move |p| p.id() == id)
        .first()
        .await?;
    info!("find by id {} via first(): {:?}", id, found.map(|p| p.to_string()));

    let id = 8;
    let found = repository
        .find_all()
        .filter(move |p| p.id() == id)
        .first()
        .await?;
    info!("find by id {} via first(): {:?}", id, found);

    let placeholder = repository
        .find_all()
        .filter(move |p| p.id() == id)
        .single()
        .do_on_error(|e| error!("Did not match expected result: {}", e))
        .on_error_return(Person::builder().id(id).build())
        .await?;
    if let Some(person) = placeholder {
        info!("find by id {} via single(): {}", id, person);
    }

    Ok(())
}
