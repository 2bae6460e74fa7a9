use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
    },
};

use async_trait::async_trait;
use serde_json::Value;

use super::{Direction, Record, SelectQuery, StoreError, Table, TableStore};

/// In-process store with the same table layout as the bundled SQL schema.
///
/// Mirrors how PostgreSQL answers: unknown columns fail with `42703`, dangling
/// or still-referenced foreign keys with `23503`, denied tables with `42501`.
pub struct MemoryStore {
    tables: Mutex<HashMap<Table, MemTable>>,
    calls: AtomicUsize,
}

struct MemTable {
    columns: BTreeSet<String>,
    required: BTreeSet<String>,
    rows: BTreeMap<i64, Record>,
    next_id: i64,
    denied: bool,
}

impl MemTable {
    fn new(columns: &[&str], required: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            required: required.iter().map(|c| c.to_string()).collect(),
            rows: BTreeMap::new(),
            next_id: 1,
            denied: false,
        }
    }

    fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(Table::Categories, MemTable::new(&["id", "name"], &["name"]));
        tables.insert(
            Table::Products,
            MemTable::new(
                &["id", "name", "price", "quantity", "description", "category_id"],
                &["name", "price", "category_id"],
            ),
        );
        Self {
            tables: Mutex::new(tables),
            calls: AtomicUsize::new(0),
        }
    }

    /// Removes a column from the schema, as an older deployment would lack it.
    pub fn without_column(self, table: Table, column: &str) -> Self {
        if let Some(t) = self.lock().get_mut(&table) {
            t.columns.remove(column);
            t.required.remove(column);
        }
        self
    }

    /// Makes every request against `table` fail as a row-level-security denial.
    pub fn deny(self, table: Table) -> Self {
        if let Some(t) = self.lock().get_mut(&table) {
            t.denied = true;
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Table, MemTable>> {
        // A poisoned lock only means another request panicked mid-operation;
        // the maps themselves are always left consistent.
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn begin(&self) -> MutexGuard<'_, HashMap<Table, MemTable>> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.lock()
    }
}

fn table_ref<'a>(
    tables: &'a HashMap<Table, MemTable>,
    table: Table,
) -> Result<&'a MemTable, StoreError> {
    let t = tables.get(&table).ok_or_else(|| StoreError::Database {
        code: "42P01".into(),
        message: format!("relation \"{}\" does not exist", table.name()),
    })?;
    if t.denied {
        return Err(StoreError::Database {
            code: "42501".into(),
            message: format!("permission denied for table {}", table.name()),
        });
    }
    Ok(t)
}

fn missing_column(table: Table, column: &str) -> StoreError {
    StoreError::Database {
        code: "42703".into(),
        message: format!(
            "column \"{column}\" of relation \"{}\" does not exist",
            table.name()
        ),
    }
}

fn check_columns<'a>(
    t: &MemTable,
    table: Table,
    mut columns: impl Iterator<Item = &'a String>,
) -> Result<(), StoreError> {
    match columns.find(|c| !t.has_column(c)) {
        Some(column) => Err(missing_column(table, column)),
        None => Ok(()),
    }
}

fn fk_violation(message: String) -> StoreError {
    StoreError::Database {
        code: "23503".into(),
        message,
    }
}

fn id_of(value: Option<&Value>) -> Option<i64> {
    value.and_then(Value::as_i64)
}

/// Orders values the way PostgreSQL does for ascending sorts: nulls last.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError> {
        let tables = self.begin();
        let t = table_ref(&tables, query.table)?;

        check_columns(t, query.table, query.filters.iter().map(|(c, _)| c))?;
        if let Some((column, _)) = &query.order {
            check_columns(t, query.table, std::iter::once(column))?;
        }

        let mut rows: Vec<Record> = t
            .rows
            .values()
            .filter(|row| {
                query.filters.iter().all(|(column, expected)| {
                    row.get(column)
                        .is_some_and(|actual| values_equal(actual, expected))
                })
            })
            .cloned()
            .collect();

        if let Some((column, direction)) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(column).unwrap_or(&Value::Null),
                    b.get(column).unwrap_or(&Value::Null),
                );
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(embed) = &query.embed {
            check_columns(t, query.table, std::iter::once(&embed.foreign_key))?;
            let target = table_ref(&tables, embed.table)?;
            check_columns(target, embed.table, embed.columns.iter())?;
            for row in rows.iter_mut() {
                let nested = id_of(row.get(&embed.foreign_key))
                    .and_then(|fk| target.rows.get(&fk))
                    .map(|parent| {
                        let picked: Record = embed
                            .columns
                            .iter()
                            .map(|c| (c.clone(), parent.get(c).cloned().unwrap_or(Value::Null)))
                            .collect();
                        Value::Object(picked)
                    })
                    .unwrap_or(Value::Null);
                row.insert(embed.table.name().to_string(), nested);
            }
        }

        Ok(rows)
    }

    async fn insert(&self, table: Table, mut values: Record) -> Result<Record, StoreError> {
        let mut tables = self.begin();
        let t = table_ref(&tables, table)?;
        values.remove("id");
        check_columns(t, table, values.keys())?;
        if let Some(column) = t
            .required
            .iter()
            .find(|c| values.get(*c).is_none_or(Value::is_null))
        {
            return Err(StoreError::Database {
                code: "23502".into(),
                message: format!(
                    "null value in column \"{column}\" of relation \"{}\" violates not-null constraint",
                    table.name()
                ),
            });
        }

        if table == Table::Products {
            let categories = table_ref(&tables, Table::Categories)?;
            if let Some(fk) = id_of(values.get("category_id")) {
                if !categories.rows.contains_key(&fk) {
                    return Err(fk_violation(format!(
                        "insert or update on table \"products\" violates foreign key constraint \"products_category_id_fkey\": Key (category_id)=({fk}) is not present in table \"categories\""
                    )));
                }
            }
        }

        let t = tables
            .get_mut(&table)
            .ok_or_else(|| StoreError::Other("table vanished".into()))?;
        let id = t.next_id;
        t.next_id += 1;

        let mut row = Record::new();
        for column in t.columns.iter() {
            let value = if column == "id" {
                Value::from(id)
            } else {
                values.get(column).cloned().unwrap_or(Value::Null)
            };
            row.insert(column.clone(), value);
        }
        t.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: Table,
        id: i64,
        changes: Record,
    ) -> Result<Vec<Record>, StoreError> {
        let mut tables = self.begin();
        let t = table_ref(&tables, table)?;
        check_columns(t, table, changes.keys())?;

        let t = tables
            .get_mut(&table)
            .ok_or_else(|| StoreError::Other("table vanished".into()))?;
        match t.rows.get_mut(&id) {
            Some(row) => {
                for (column, value) in changes {
                    if column != "id" {
                        row.insert(column, value);
                    }
                }
                Ok(vec![row.clone()])
            }
            None => Ok(Vec::new()),
        }
    }

    async fn delete(&self, table: Table, id: i64) -> Result<Vec<Record>, StoreError> {
        let mut tables = self.begin();
        table_ref(&tables, table)?;

        if table == Table::Categories {
            if let Some(products) = tables.get(&Table::Products) {
                let referenced = products
                    .rows
                    .values()
                    .any(|row| id_of(row.get("category_id")) == Some(id));
                if referenced {
                    return Err(fk_violation(format!(
                        "update or delete on table \"categories\" violates foreign key constraint \"products_category_id_fkey\" on table \"products\": Key (id)=({id}) is still referenced from table \"products\""
                    )));
                }
            }
        }

        let t = tables
            .get_mut(&table)
            .ok_or_else(|| StoreError::Other("table vanished".into()))?;
        Ok(t.rows.remove(&id).into_iter().collect())
    }
}
