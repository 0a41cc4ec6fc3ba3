//! Typed failure surface: generation, mapping and lookup failures stay
//! distinguishable instead of collapsing into an absent result.

use crudkit_core::{
    ConnectionSource, EntityAdapter, EntityId, EntityStore, MemoryConnectionSource, Person,
    PersonAdapter, QuerySet, StoreError, StoreResult, PERSON_BOOTSTRAP_SQL, PERSON_QUERIES,
};
use rusqlite::types::Value;
use rusqlite::Row;

/// Delegates everything to [`PersonAdapter`] except a swapped query set.
struct ReroutedAdapter {
    queries: QuerySet,
}

impl EntityAdapter for ReroutedAdapter {
    type Entity = Person;

    fn entity_name(&self) -> &'static str {
        "person"
    }

    fn queries(&self) -> &QuerySet {
        &self.queries
    }

    fn entity_id(&self, entity: &Person) -> Option<EntityId> {
        entity.id
    }

    fn insert_params(&self, entity: &Person) -> Vec<Value> {
        PersonAdapter.insert_params(entity)
    }

    fn update_params(&self, entity: &Person) -> Vec<Value> {
        PersonAdapter.update_params(entity)
    }

    fn map_row(&self, row: &Row<'_>) -> StoreResult<Person> {
        PersonAdapter.map_row(row)
    }
}

fn person_source() -> MemoryConnectionSource {
    MemoryConnectionSource::with_bootstrap(Some(PERSON_BOOTSTRAP_SQL)).unwrap()
}

#[test]
fn insert_matching_zero_rows_is_no_generated_id() {
    let adapter = ReroutedAdapter {
        queries: QuerySet {
            insert: "INSERT INTO people (name, age) SELECT ?1, ?2 WHERE 1 = 0;",
            ..PERSON_QUERIES
        },
    };
    let store = EntityStore::new(person_source(), adapter);

    let err = store.create(Person::new("Ann", 30)).unwrap_err();
    assert!(matches!(err, StoreError::NoGeneratedId));
}

#[test]
fn create_refetch_miss_is_not_found() {
    // Insert and select statements that disagree on visibility.
    let adapter = ReroutedAdapter {
        queries: QuerySet {
            select_by_id: "SELECT id, name, age FROM people WHERE id = ?1 AND 1 = 0;",
            ..PERSON_QUERIES
        },
    };
    let store = EntityStore::new(person_source(), adapter);

    let err = store.create(Person::new("Ann", 30)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(1)));
}

#[test]
fn unmappable_persisted_row_is_invalid_row() {
    // Pre-create the table without the age check so a bad row can exist,
    // the way a database written by an older schema might.
    let source = MemoryConnectionSource::with_bootstrap(Some(
        "CREATE TABLE people (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age  INTEGER NOT NULL
        );",
    ))
    .unwrap();

    let conn = source.acquire().unwrap();
    conn.execute("INSERT INTO people (name, age) VALUES ('Ann', -5);", [])
        .unwrap();
    source.release(conn);

    let store = EntityStore::new(source, PersonAdapter);

    let err = store.get_by_id(1).unwrap_err();
    assert!(matches!(err, StoreError::InvalidRow(_)));
    assert!(err.to_string().contains("people.age"));

    let err = store.get_all().unwrap_err();
    assert!(matches!(err, StoreError::InvalidRow(_)));
}

#[test]
fn constraint_violation_is_a_db_error() {
    // Pin the primary key so the second create collides.
    let adapter = ReroutedAdapter {
        queries: QuerySet {
            insert: "INSERT INTO people (id, name, age) VALUES (1, ?1, ?2);",
            ..PERSON_QUERIES
        },
    };
    let store = EntityStore::new(person_source(), adapter);

    store.create(Person::new("Ann", 30)).unwrap();
    let err = store.create(Person::new("Ben", 44)).unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));
}
