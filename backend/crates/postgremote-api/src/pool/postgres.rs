//! Postgres pool backed by `sqlx`.
//!
//! Every connection runs `RESET ROLE` (or `SET ROLE "<neutral>"`) in the
//! pool's release hook. A connection whose reset fails is closed instead of
//! being returned.
//!
//! Result values become JSON according to their column type. Composite
//! types decode field by field into objects keyed by field name.

use super::{
    ColumnInfo, ConnectionPool, PoolError, PoolResult, PooledConnection, PreparedQuery,
    QueryOutput,
};
use async_trait::async_trait;
use log::{debug, warn};
use postgremote_configs::DatabaseSettings;
use postgremote_sql::{escape_identifier, DataType, Role, ValueMap};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::error::BoxDynError;
use sqlx::pool::PoolConnection;
use sqlx::postgres::types::PgRecordDecoder;
use sqlx::postgres::{
    PgArguments, PgPoolOptions, PgRow, PgTypeInfo, PgTypeKind, PgValueFormat, PgValueRef, Postgres,
};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Column, Decode, PgPool, Row, TypeInfo, ValueRef};
use std::fmt::Write;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgConnectionPool {
    pool: PgPool,
}

impl PgConnectionPool {
    pub async fn connect(settings: &DatabaseSettings) -> PoolResult<Self> {
        let reset_sql = reset_role_sql(settings.neutral_role())?;
        debug!("Connection release statement: {}", reset_sql);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .after_release(move |conn, _meta| {
                let sql = reset_sql.clone();
                Box::pin(async move {
                    let result = sqlx::query(&sql).execute(&mut *conn).await;
                    Ok(keep_after_reset(result.map(|_| ())))
                })
            })
            .connect(&settings.url)
            .await
            .map_err(|e| PoolError::Unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionPool for PgConnectionPool {
    async fn acquire(&self) -> PoolResult<Box<dyn PooledConnection>> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| PoolError::Unavailable(e.to_string()))?;
        Ok(Box::new(PgPooledConnection { conn }))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

struct PgPooledConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl PooledConnection for PgPooledConnection {
    async fn set_role(&mut self, role: &Role) -> PoolResult<()> {
        let sql = format!(
            "SET ROLE {}",
            escape_identifier(role.name()).map_err(|e| PoolError::Role(e.to_string()))?
        );
        sqlx::query(&sql)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| PoolError::Role(database_message(&e)))?;
        Ok(())
    }

    async fn query(&mut self, query: &PreparedQuery) -> PoolResult<QueryOutput> {
        let mut statement = sqlx::query(&query.text);
        for (index, value) in query.parameters.iter().enumerate() {
            statement = bind_value(statement, value, query.parameter_type(index));
        }

        let rows = statement
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| PoolError::Query(database_message(&e)))?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|c| ColumnInfo::new(c.name(), c.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows.iter().map(decode_row).collect::<PoolResult<Vec<_>>>()?;
        Ok(QueryOutput { columns, rows })
    }
}


fn reset_role_sql(neutral_role: Option<&str>) -> PoolResult<String> {
    match neutral_role {
        None => Ok("RESET ROLE".to_string()),
        Some(role) => escape_identifier(role)
            .map(|quoted| format!("SET ROLE {}", quoted))
            .map_err(|e| PoolError::Role(e.to_string())),
    }
}

/// Whether a released connection goes back to the pool. A failed role
/// reset closes it.
fn keep_after_reset(result: Result<(), sqlx::Error>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Closing connection, role reset failed: {}", e);
            false
        },
    }
}

/// The server's own message for database errors, the driver's otherwise.
fn database_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q Value,
    data_type: Option<DataType>,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => match data_type.unwrap_or_default() {
            DataType::Text => query.bind(None::<String>),
            DataType::Number => query.bind(None::<f64>),
            DataType::Boolean => query.bind(None::<bool>),
        },
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.as_str()),
        other => query.bind(Json(other)),
    }
}

fn decode_row(row: &PgRow) -> PoolResult<ValueMap> {
    let mut map = ValueMap::new();
    for column in row.columns() {
        let JsonCell(value) =
            row.try_get::<JsonCell, _>(column.ordinal())
                .map_err(|e| PoolError::Decode {
                    column: column.name().to_string(),
                    message: e.to_string(),
                })?;
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

/// JSON shape of a result value, chosen from the column's type.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CellKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    /// Decimal string, so no precision is lost.
    Numeric,
    Text,
    Json,
    Uuid,
    /// `\x` hex, as Postgres prints it.
    Bytea,
    Timestamptz,
    Timestamp,
    Date,
    Time,
    /// Field names in declaration order.
    Composite(Vec<String>),
    Other,
}

fn classify(type_info: &PgTypeInfo) -> CellKind {
    match type_info.name() {
        "BOOL" => CellKind::Bool,
        "INT2" => CellKind::Int2,
        "INT4" => CellKind::Int4,
        "INT8" => CellKind::Int8,
        "FLOAT4" => CellKind::Float4,
        "FLOAT8" => CellKind::Float8,
        "NUMERIC" => CellKind::Numeric,
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => CellKind::Text,
        "JSON" | "JSONB" => CellKind::Json,
        "UUID" => CellKind::Uuid,
        "BYTEA" => CellKind::Bytea,
        "TIMESTAMPTZ" => CellKind::Timestamptz,
        "TIMESTAMP" => CellKind::Timestamp,
        "DATE" => CellKind::Date,
        "TIME" => CellKind::Time,
        _ => match type_info.kind() {
            PgTypeKind::Composite(fields) => {
                CellKind::Composite(fields.iter().map(|(name, _)| name.clone()).collect())
            },
            PgTypeKind::Enum(_) => CellKind::Text,
            PgTypeKind::Domain(base) => classify(base),
            _ => CellKind::Other,
        },
    }
}

/// A result value decoded to JSON. Accepts every column type; the decoder
/// for each one is picked by [`classify`].
struct JsonCell(Value);

impl sqlx::Type<Postgres> for JsonCell {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("unknown")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

impl<'r> Decode<'r, Postgres> for JsonCell {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        if value.is_null() {
            return Ok(JsonCell(Value::Null));
        }

        let kind = classify(&value.type_info());
        let decoded = match kind {
            CellKind::Bool => Value::Bool(decode::<bool>(value)?),
            CellKind::Int2 => json!(decode::<i16>(value)?),
            CellKind::Int4 => json!(decode::<i32>(value)?),
            CellKind::Int8 => json!(decode::<i64>(value)?),
            CellKind::Float4 => json!(decode::<f32>(value)?),
            CellKind::Float8 => json!(decode::<f64>(value)?),
            CellKind::Numeric => Value::String(decode::<Decimal>(value)?.to_string()),
            CellKind::Text => Value::String(decode::<String>(value)?),
            CellKind::Json => decode::<Value>(value)?,
            CellKind::Uuid => Value::String(decode::<Uuid>(value)?.to_string()),
            CellKind::Bytea => Value::String(hex_bytes(&decode::<Vec<u8>>(value)?)),
            CellKind::Timestamptz => {
                Value::String(decode::<chrono::DateTime<chrono::Utc>>(value)?.to_rfc3339())
            },
            CellKind::Timestamp => Value::String(decode::<chrono::NaiveDateTime>(value)?.to_string()),
            CellKind::Date => Value::String(decode::<chrono::NaiveDate>(value)?.to_string()),
            CellKind::Time => Value::String(decode::<chrono::NaiveTime>(value)?.to_string()),
            CellKind::Composite(fields) => {
                let mut decoder = PgRecordDecoder::new(value)?;
                let mut object = ValueMap::new();
                for name in fields {
                    let JsonCell(field) = decoder.try_decode::<JsonCell>()?;
                    object.insert(name, field);
                }
                Value::Object(object)
            },
            CellKind::Other => match value.format() {
                PgValueFormat::Text => Value::String(value.as_str()?.to_string()),
                PgValueFormat::Binary => Value::String(hex_bytes(value.as_bytes()?)),
            },
        };
        Ok(JsonCell(decoded))
    }
}

fn decode<'r, T: Decode<'r, Postgres>>(value: PgValueRef<'r>) -> Result<T, BoxDynError> {
    T::decode(value)
}

fn hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}
