//! Person adapter: SQL text and mapping for the reference entity.
//!
//! # Invariants
//! - `people.id` is the rowid alias, so `last_insert_rowid` observes the
//!   generated key after an insert.
//! - Parameter vectors match placeholder order in the query set exactly.

use crate::model::person::Person;
use crate::store::{EntityAdapter, EntityId, QuerySet, StoreError, StoreResult};
use rusqlite::types::Value;
use rusqlite::Row;

/// Idempotent schema bootstrap for the `people` table.
pub const PERSON_BOOTSTRAP_SQL: &str = "CREATE TABLE IF NOT EXISTS people (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    age  INTEGER NOT NULL CHECK (age >= 0)
);";

/// Statement templates backing [`PersonAdapter`].
pub const PERSON_QUERIES: QuerySet = QuerySet {
    insert: "INSERT INTO people (name, age) VALUES (?1, ?2);",
    update: "UPDATE people SET name = ?1, age = ?2 WHERE id = ?3;",
    delete: "DELETE FROM people WHERE id = ?1;",
    select_by_id: "SELECT id, name, age FROM people WHERE id = ?1;",
    select_all: "SELECT id, name, age FROM people ORDER BY id ASC;",
};

/// Stateless adapter wiring [`Person`] into the generic store.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonAdapter;

impl EntityAdapter for PersonAdapter {
    type Entity = Person;

    fn entity_name(&self) -> &'static str {
        "person"
    }

    fn queries(&self) -> &QuerySet {
        &PERSON_QUERIES
    }

    fn entity_id(&self, entity: &Person) -> Option<EntityId> {
        entity.id
    }

    fn insert_params(&self, entity: &Person) -> Vec<Value> {
        vec![
            Value::Text(entity.name.clone()),
            Value::Integer(i64::from(entity.age)),
        ]
    }

    fn update_params(&self, entity: &Person) -> Vec<Value> {
        vec![
            Value::Text(entity.name.clone()),
            Value::Integer(i64::from(entity.age)),
            // MissingId is raised by the store before binding happens.
            Value::Integer(entity.id.unwrap_or_default()),
        ]
    }

    fn map_row(&self, row: &Row<'_>) -> StoreResult<Person> {
        let id: EntityId = row.get("id")?;
        let age_raw: i64 = row.get("age")?;
        let age = u32::try_from(age_raw).map_err(|_| {
            StoreError::InvalidRow(format!("invalid age value `{age_raw}` in people.age"))
        })?;

        Ok(Person {
            id: Some(id),
            name: row.get("name")?,
            age,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityAdapter, Person, PersonAdapter, Value};

    #[test]
    fn insert_params_follow_placeholder_order() {
        let params = PersonAdapter.insert_params(&Person::new("Ann", 30));
        assert_eq!(
            params,
            vec![Value::Text("Ann".to_string()), Value::Integer(30)]
        );
    }

    #[test]
    fn update_params_end_with_the_identifier() {
        let params = PersonAdapter.update_params(&Person::with_id(9, "Ann", 31));
        assert_eq!(params.last(), Some(&Value::Integer(9)));
    }

    #[test]
    fn entity_id_reflects_persistence_state() {
        assert_eq!(PersonAdapter.entity_id(&Person::new("Ann", 30)), None);
        assert_eq!(
            PersonAdapter.entity_id(&Person::with_id(3, "Ann", 30)),
            Some(3)
        );
    }
}
