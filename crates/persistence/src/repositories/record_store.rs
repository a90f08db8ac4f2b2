//! Generic PostgreSQL record store.
//!
//! Renders a `QueryDescriptor` into SQL with `QueryBuilder`. Table and
//! column names come only from static resource schemas; every request
//! value is a bind parameter.

use async_trait::async_trait;
use domain::listing::{FieldValue, Predicate, QueryDescriptor, Record};
use domain::store::RecordStore;
use domain::StoreError;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::marker::PhantomData;

use crate::metrics::QueryTimer;

/// A record type backed by a PostgreSQL table.
pub trait PgTable: Record {
    type Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    /// Column list read by every SELECT and RETURNING clause.
    const SELECT_COLUMNS: &'static str;

    fn from_entity(entity: Self::Entity) -> Self;
}

/// `RecordStore` over one table.
pub struct PgRecordStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for PgRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: PgTable> PgRecordStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn fail(operation: &str, err: sqlx::Error) -> StoreError {
        let err = store_error(err);
        tracing::error!(
            table = R::schema().table,
            operation = operation,
            error = %err,
            "Database operation failed"
        );
        err
    }
}

/// Classify a driver error.
///
/// 23505 (unique_violation) and 23503 (foreign_key_violation) keep their
/// meaning; pool exhaustion and I/O failures mark the store unavailable.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Duplicate(db_err.message().to_string()),
            Some("23503") => StoreError::MissingReference(db_err.message().to_string()),
            _ => StoreError::Query(err.to_string()),
        },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

/// On `DELETE`, a foreign-key violation means a child row still points at
/// the record (`ON DELETE RESTRICT`), not that a parent is missing.
pub fn restricted_delete(err: StoreError) -> StoreError {
    match err {
        StoreError::MissingReference(msg) => StoreError::Referenced(msg),
        other => other,
    }
}

/// Escape `LIKE` metacharacters so the needle matches literally.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Null => {
            builder.push("NULL");
        }
        FieldValue::Int(v) => {
            builder.push_bind(*v);
        }
        FieldValue::Text(v) => {
            builder.push_bind(v.clone());
        }
        FieldValue::Timestamp(v) => {
            builder.push_bind(*v);
        }
    }
}

/// Append ` WHERE ...` for the descriptor's predicates, ANDed.
pub fn push_where(builder: &mut QueryBuilder<'_, Postgres>, query: &QueryDescriptor) {
    builder.push(" WHERE TRUE");

    for predicate in &query.predicates {
        match predicate {
            Predicate::Equals { column, value } if value.is_null() => {
                builder.push(" AND ").push(*column).push(" IS NULL");
            }
            Predicate::Equals { column, value } => {
                builder.push(" AND ").push(*column).push(" = ");
                push_value(builder, value);
            }
            Predicate::Range { column, from, to } => {
                if let Some(from) = from {
                    builder.push(" AND ").push(*column).push(" >= ");
                    builder.push_bind(*from);
                }
                if let Some(to) = to {
                    builder.push(" AND ").push(*column).push(" <= ");
                    builder.push_bind(*to);
                }
            }
            Predicate::TextSearch { columns, needle } => {
                let pattern = format!("%{}%", escape_like(needle));
                builder.push(" AND (");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        builder.push(" OR ");
                    }
                    builder.push(*column).push(" ILIKE ");
                    builder.push_bind(pattern.clone());
                }
                builder.push(")");
            }
        }
    }
}

/// Append the ORDER BY clause with the `id` tie-breaker.
pub fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, query: &QueryDescriptor) {
    builder
        .push(" ORDER BY ")
        .push(query.sort.field)
        .push(" ")
        .push(query.sort.direction.as_sql())
        .push(" NULLS LAST");
    if query.sort.field != "id" {
        builder.push(", id ASC");
    }
}

#[async_trait]
impl<R: PgTable> RecordStore<R> for PgRecordStore<R> {
    async fn count(&self, query: &QueryDescriptor) -> Result<i64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        builder.push(R::schema().table);
        push_where(&mut builder, query);

        let timer = QueryTimer::start(R::schema().table, "count");
        let result = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);
        result.map_err(|e| Self::fail("count", e))
    }

    async fn fetch(
        &self,
        query: &QueryDescriptor,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<R>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder
            .push(R::SELECT_COLUMNS)
            .push(" FROM ")
            .push(R::schema().table);
        push_where(&mut builder, query);
        push_order_by(&mut builder, query);
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let timer = QueryTimer::start(R::schema().table, "fetch");
        let result = builder
            .build_query_as::<R::Entity>()
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);

        let rows = result.map_err(|e| Self::fail("fetch", e))?;
        Ok(rows.into_iter().map(R::from_entity).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<R>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            R::SELECT_COLUMNS,
            R::schema().table
        );

        let timer = QueryTimer::start(R::schema().table, "find");
        let result = sqlx::query_as::<_, R::Entity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.finish(&result);

        let row = result.map_err(|e| Self::fail("find", e))?;
        Ok(row.map(R::from_entity))
    }

    async fn count_dependents(&self, id: i64) -> Result<i64, StoreError> {
        let Some(dependents) = R::schema().dependents else {
            return Ok(0);
        };
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            dependents.table, dependents.column
        );

        let timer = QueryTimer::start(R::schema().table, "count_dependents");
        let result = sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);
        result.map_err(|e| Self::fail("count_dependents", e))
    }

    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let values = record.insert_values();

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
        builder.push(R::schema().table).push(" (");
        let mut columns = builder.separated(", ");
        for (column, _) in &values {
            columns.push(*column);
        }
        builder.push(") VALUES (");
        for (i, (_, value)) in values.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            push_value(&mut builder, value);
        }
        builder.push(") RETURNING ").push(R::SELECT_COLUMNS);

        let timer = QueryTimer::start(R::schema().table, "insert");
        let result = builder
            .build_query_as::<R::Entity>()
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);

        let row = result.map_err(|e| Self::fail("insert", e))?;
        Ok(R::from_entity(row))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", R::schema().table);

        let timer = QueryTimer::start(R::schema().table, "delete");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await;
        timer.finish(&result);

        let done = result.map_err(|e| restricted_delete(Self::fail("delete", e)))?;
        Ok(done.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| Self::fail("ping", e))
    }
}
