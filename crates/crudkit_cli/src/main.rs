//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise `crudkit_core` wiring end to end against an in-memory source.
//! - Keep output deterministic for quick local sanity checks.

use crudkit_core::{
    EntityStore, MemoryConnectionSource, Person, PersonAdapter, StoreError, PERSON_BOOTSTRAP_SQL,
};

fn run() -> Result<(), StoreError> {
    let source = MemoryConnectionSource::with_bootstrap(Some(PERSON_BOOTSTRAP_SQL))?;
    let store = EntityStore::new(source, PersonAdapter);

    let ann = store.create(Person::new("Ann", 30))?;
    let ben = store.create(Person::new("Ben", 44))?;
    println!("created {} and {}", ann.name, ben.name);

    let mut older = ann;
    older.age += 1;
    let older = store.update(older)?;
    println!("updated {} to age {}", older.name, older.age);

    store.delete(&ben)?;
    for person in store.get_all()? {
        println!(
            "person id={} name={} age={}",
            person.id.unwrap_or(-1),
            person.name,
            person.age
        );
    }

    println!("crudkit_core version={}", crudkit_core::core_version());
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("crudkit_cli failed: {err}");
        std::process::exit(1);
    }
}
