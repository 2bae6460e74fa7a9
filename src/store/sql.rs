use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, FromQueryResult, JsonValue, RuntimeErr,
    Statement, StatementBuilder, Value as SqlValue,
    sea_query::{Alias, Asterisk, Expr, JoinType, Order, Query, SelectStatement, SimpleExpr},
};
use serde_json::Value;

use super::{Direction, Record, SelectQuery, StoreError, Table, TableStore, check_identifier};
use crate::db;

#[derive(Clone)]
pub struct SqlStore {
    conn: DatabaseConnection,
}

impl SqlStore {
    pub async fn connect(url: &str, key: &str) -> Result<Self, StoreError> {
        let url = db::connection_url(url, key).map_err(StoreError::Connection)?;
        let conn = db::create_orm_conn(&url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    fn statement<S: StatementBuilder>(&self, stmt: &S) -> Statement {
        self.conn.get_database_backend().build(stmt)
    }

    async fn fetch(&self, stmt: Statement) -> Result<Vec<Record>, StoreError> {
        let rows = JsonValue::find_by_statement(stmt)
            .all(&self.conn)
            .await
            .map_err(store_error)?;
        rows.into_iter().map(into_record).collect()
    }
}

fn into_record(value: JsonValue) -> Result<Record, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(format!("expected a row object, got {other}"))),
    }
}

pub(crate) fn store_error(err: DbErr) -> StoreError {
    let code = match &err {
        DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db| db.code().map(|c| c.into_owned())),
        _ => None,
    };
    match code {
        Some(code) => StoreError::Database {
            code,
            message: err.to_string(),
        },
        None => StoreError::Other(err.to_string()),
    }
}

/// Converts a JSON value to a bindable SQL expression.
///
/// `NULL` is emitted as a keyword so it adopts the column's type.
fn sql_expr(value: &Value) -> SimpleExpr {
    match value {
        Value::Null => Expr::cust("NULL"),
        Value::Bool(b) => SqlValue::Bool(Some(*b)).into(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::BigInt(Some(i)).into(),
            None => SqlValue::Double(n.as_f64()).into(),
        },
        Value::String(s) => SqlValue::String(Some(Box::new(s.clone()))).into(),
        other => SqlValue::Json(Some(Box::new(other.clone()))).into(),
    }
}

fn quoted(name: &str) -> String {
    format!("\"{name}\"")
}

fn select_statement(query: &SelectQuery) -> Result<SelectStatement, StoreError> {
    let base = Alias::new("t");
    let mut stmt = Query::select();
    stmt.column((base.clone(), Asterisk))
        .from_as(Alias::new(query.table.name()), base.clone());

    if let Some(embed) = &query.embed {
        check_identifier(&embed.foreign_key)?;
        let joined = Alias::new("j");
        let mut pairs = Vec::with_capacity(embed.columns.len());
        for column in &embed.columns {
            check_identifier(column)?;
            pairs.push(format!("'{column}', {}.{}", quoted("j"), quoted(column)));
        }
        let nested = format!(
            "CASE WHEN {j}.{id} IS NULL THEN NULL ELSE jsonb_build_object({pairs}) END",
            j = quoted("j"),
            id = quoted("id"),
            pairs = pairs.join(", "),
        );
        stmt.join_as(
            JoinType::LeftJoin,
            Alias::new(embed.table.name()),
            joined.clone(),
            Expr::col((joined, Alias::new("id")))
                .equals((base.clone(), Alias::new(embed.foreign_key.as_str()))),
        )
        .expr_as(Expr::cust(nested), Alias::new(embed.table.name()));
    }

    for (column, value) in &query.filters {
        check_identifier(column)?;
        stmt.and_where(Expr::col((base.clone(), Alias::new(column.as_str()))).eq(sql_expr(value)));
    }

    if let Some((column, direction)) = &query.order {
        check_identifier(column)?;
        let order = match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        };
        stmt.order_by((base, Alias::new(column.as_str())), order);
    }

    Ok(stmt)
}

#[async_trait]
impl TableStore for SqlStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError> {
        let stmt = self.statement(&select_statement(query)?);
        self.fetch(stmt).await
    }

    async fn insert(&self, table: Table, mut values: Record) -> Result<Record, StoreError> {
        values.remove("id");
        let mut columns = Vec::with_capacity(values.len());
        let mut exprs = Vec::with_capacity(values.len());
        for (column, value) in &values {
            check_identifier(column)?;
            columns.push(Alias::new(column.as_str()));
            exprs.push(sql_expr(value));
        }

        let mut stmt = Query::insert();
        stmt.into_table(Alias::new(table.name()))
            .columns(columns)
            .values(exprs)
            .map_err(|e| StoreError::Other(e.to_string()))?
            .returning_all();

        self.fetch(self.statement(&stmt))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".into()))
    }

    async fn update(
        &self,
        table: Table,
        id: i64,
        changes: Record,
    ) -> Result<Vec<Record>, StoreError> {
        let mut assignments = Vec::with_capacity(changes.len());
        for (column, value) in &changes {
            check_identifier(column)?;
            assignments.push((Alias::new(column.as_str()), sql_expr(value)));
        }

        let mut stmt = Query::update();
        stmt.table(Alias::new(table.name()))
            .values(assignments)
            .and_where(Expr::col(Alias::new("id")).eq(id))
            .returning_all();
        self.fetch(self.statement(&stmt)).await
    }

    async fn delete(&self, table: Table, id: i64) -> Result<Vec<Record>, StoreError> {
        let mut stmt = Query::delete();
        stmt.from_table(Alias::new(table.name()))
            .and_where(Expr::col(Alias::new("id")).eq(id))
            .returning_all();
        self.fetch(self.statement(&stmt)).await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::sea_query::{PostgresQueryBuilder, QueryStatementWriter};

    use super::*;

    #[test]
    fn product_select_left_joins_category_object() {
        let query = SelectQuery::from(Table::Products)
            .order_by("id", Direction::Desc)
            .embed(Table::Categories, "category_id", &["name"]);
        let sql = select_statement(&query)
            .unwrap()
            .to_string(PostgresQueryBuilder);

        assert!(sql.contains(r#"LEFT JOIN "categories" AS "j" ON "j"."id" = "t"."category_id""#));
        assert!(sql.contains(r#"jsonb_build_object('name', "j"."name")"#));
        assert!(sql.contains(r#"ORDER BY "t"."id" DESC"#));
    }

    #[test]
    fn rejects_unsafe_filter_column() {
        let query = SelectQuery::from(Table::Categories).eq("id = 1 OR 1", 1);
        assert!(select_statement(&query).is_err());
    }
}
