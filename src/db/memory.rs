//! In-memory store used by the handler tests.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::store::{
    Access, Connector, DataAccess, Direction, Filter, Join, Projection, Row, Select, StoreError,
};

#[derive(Default)]
struct Tables {
    rows: HashMap<&'static str, Vec<Row>>,
    failures: HashMap<&'static str, StoreError>,
    accesses: Vec<Access>,
    calls: usize,
    next_id: usize,
}

/// Shared tables; every session and clone sees the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds rows to `collection`. Each value must be a JSON object.
    pub fn with_rows(self, collection: &'static str, rows: Vec<Value>) -> Self {
        {
            let mut tables = self.lock();
            let table = tables.rows.entry(collection).or_default();
            for row in rows {
                match row {
                    Value::Object(row) => table.push(row),
                    other => panic!("row for {collection} is not an object: {other}"),
                }
            }
        }
        self
    }

    /// Every later operation on `collection` fails with `error`.
    pub fn fail(&self, collection: &'static str, error: StoreError) {
        self.lock().failures.insert(collection, error);
    }

    pub fn rows(&self, collection: &str) -> Vec<Row> {
        self.lock().rows.get(collection).cloned().unwrap_or_default()
    }

    /// Number of store operations issued so far.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Credentials of every session handed out so far.
    pub fn accesses(&self) -> Vec<Access> {
        self.lock().accesses.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }
}

impl Connector for MemoryStore {
    type Session = MemoryStore;

    fn session(&self, access: Access) -> MemoryStore {
        self.lock().accesses.push(access);
        self.clone()
    }
}

impl Tables {
    fn begin(&mut self, collection: &str) -> Result<(), StoreError> {
        self.calls += 1;
        match self.failures.get(collection) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn table(&self, collection: &str) -> &[Row] {
        self.rows.get(collection).map(Vec::as_slice).unwrap_or_default()
    }

    fn select(&self, query: &Select) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .table(query.collection)
            .iter()
            .filter(|row| matches_all(row, &query.filters))
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(order.column), b.get(order.column));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        rows.into_iter()
            .map(|row| self.embed(row, &query.joins))
            .collect()
    }

    fn embed(&self, mut row: Row, joins: &[Join]) -> Row {
        for join in joins {
            let target = row
                .get(join.foreign_key)
                .and_then(|key| {
                    self.table(join.collection)
                        .iter()
                        .find(|candidate| candidate.get("id") == Some(key))
                })
                .map(|found| project(found, &join.projection))
                .map(Value::Object)
                .unwrap_or(Value::Null);
            row.insert(join.key.to_string(), target);
        }
        row
    }
}

fn project(row: &Row, projection: &Projection) -> Row {
    match projection {
        Projection::All => row.clone(),
        Projection::Fields(fields) => fields
            .iter()
            .map(|field| {
                let value = row.get(*field).cloned().unwrap_or(Value::Null);
                (field.to_string(), value)
            })
            .collect(),
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match row.get(filter.column) {
        Some(Value::String(s)) => *s == filter.value,
        Some(Value::Number(n)) => n.to_string() == filter.value,
        Some(Value::Bool(b)) => b.to_string() == filter.value,
        _ => false,
    })
}

/// Ascending order with nulls last.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

impl DataAccess for MemoryStore {
    async fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.lock();
        tables.begin(query.collection)?;
        Ok(tables.select(query))
    }

    async fn select_one(&self, query: &Select) -> Result<Option<Row>, StoreError> {
        let mut tables = self.lock();
        tables.begin(query.collection)?;
        Ok(tables.select(query).into_iter().next())
    }

    async fn update(
        &self,
        collection: &'static str,
        filters: &[Filter],
        fields: Row,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.begin(collection)?;
        if let Some(rows) = tables.rows.get_mut(collection) {
            for row in rows.iter_mut().filter(|row| matches_all(row, filters)) {
                row.extend(fields.clone());
            }
        }
        Ok(())
    }

    async fn insert(&self, collection: &'static str, mut record: Row) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.begin(collection)?;
        tables.next_id += 1;
        let id = format!("{collection}-{}", tables.next_id);
        record.entry("id").or_insert(Value::from(id));
        tables.rows.entry(collection).or_default().push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_rows(
                "teams",
                vec![
                    json!({ "id": "t1", "name": "Ahly", "logo_url": "ahly.png", "city": "Cairo" }),
                    json!({ "id": "t2", "name": "Zamalek", "logo_url": null }),
                ],
            )
            .with_rows(
                "player_stats",
                vec![
                    json!({ "league_id": "l1", "team_id": "t1", "player_name": "A", "goals": 3 }),
                    json!({ "league_id": "l1", "team_id": "t2", "player_name": "B", "goals": null }),
                    json!({ "league_id": "l1", "team_id": "t9", "player_name": "C", "goals": 7 }),
                    json!({ "league_id": "l2", "team_id": "t1", "player_name": "D", "goals": 9 }),
                ],
            )
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter()
            .map(|r| r["player_name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn filters_orders_and_limits() {
        let store = store();
        let query = Select::from("player_stats")
            .eq("league_id", "l1")
            .order_by("goals", Direction::Desc)
            .limit(2);
        let rows = store.select(&query).await.unwrap();

        // Descending puts nulls first.
        assert_eq!(names(&rows), vec!["B", "C"]);
    }

    #[tokio::test]
    async fn ascending_puts_nulls_last() {
        let store = store();
        let query = Select::from("player_stats")
            .eq("league_id", "l1")
            .order_by("goals", Direction::Asc);
        let rows = store.select(&query).await.unwrap();

        assert_eq!(names(&rows), vec!["A", "C", "B"]);
    }

    #[tokio::test]
    async fn joins_embed_projected_fields_or_null() {
        let store = store();
        let query = Select::from("player_stats")
            .eq("league_id", "l1")
            .join(Join::new("teams", "team_id").fields(&["name", "logo_url"]))
            .order_by("player_name", Direction::Asc);
        let rows = store.select(&query).await.unwrap();

        assert_eq!(rows[0]["teams"], json!({ "name": "Ahly", "logo_url": "ahly.png" }));
        assert_eq!(rows[2]["teams"], Value::Null);
    }

    #[tokio::test]
    async fn update_touches_only_matching_rows() {
        let store = MemoryStore::new().with_rows(
            "matches",
            vec![json!({ "id": "m1", "minute": 10 }), json!({ "id": "m2", "minute": 20 })],
        );
        let mut fields = Row::new();
        fields.insert("minute".into(), json!(11));
        store
            .update("matches", &[Filter::eq("id", "m1")], fields)
            .await
            .unwrap();

        let rows = store.rows("matches");
        assert_eq!(rows[0]["minute"], json!(11));
        assert_eq!(rows[1]["minute"], json!(20));
    }

    #[tokio::test]
    async fn injected_failure_is_returned() {
        let store = store();
        store.fail("player_stats", StoreError::Transport("connection reset".into()));

        let err = store
            .select(&Select::from("player_stats"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Transport("connection reset".into()));
        assert_eq!(store.calls(), 1);
    }
}
