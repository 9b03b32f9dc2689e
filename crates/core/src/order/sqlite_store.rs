//! SQLite-backed order store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};

use super::{
    CreateOrderRequest, Order, OrderError, OrderFilter, OrderState, OrderStore, TableNumber,
    Transition,
};

const SELECT_COLUMNS: &str =
    "id, table_number, customer, dish, state, created_at, updated_at, delivered_at";

/// SQLite-backed order store.
///
/// A single connection behind a mutex serializes every check-then-write
/// sequence; each one also runs in an immediate transaction so other
/// processes sharing the file cannot interleave.
pub struct SqliteOrderStore {
    conn: Mutex<Connection>,
}

impl SqliteOrderStore {
    /// Create a new SQLite order store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, OrderError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite order store (useful for testing).
    pub fn in_memory() -> Result<Self, OrderError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), OrderError> {
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                table_number INTEGER NOT NULL,
                customer TEXT,
                dish TEXT NOT NULL,
                state TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                delivered_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_orders_table_state ON orders(table_number, state);
            CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at DESC);

            -- At most one active order per table.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_orders_active_table
                ON orders(table_number) WHERE state IN ({active});
            "#,
            active = active_states_list()
        ))
        .map_err(db_err)?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, OrderError> {
        self.conn
            .lock()
            .map_err(|_| OrderError::Database("connection mutex poisoned".to_string()))
    }

    fn build_where_clause(filter: &OrderFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let states = filter.states();
        if states.is_empty() {
            conditions.push("1 = 0".to_string());
        } else if states.len() < OrderState::ALL.len() {
            let placeholders = vec!["?"; states.len()].join(", ");
            conditions.push(format!("state IN ({})", placeholders));
            for state in states {
                params.push(Box::new(state.as_str().to_string()));
            }
        }

        if let Some(table) = filter.table {
            conditions.push("table_number = ?".to_string());
            params.push(Box::new(table.get()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_order(row: &rusqlite::Row) -> rusqlite::Result<Order> {
        let id: String = row.get(0)?;
        let table: u32 = row.get(1)?;
        let customer: Option<String> = row.get(2)?;
        let dish: String = row.get(3)?;
        let state_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;
        let delivered_at_str: Option<String> = row.get(7)?;

        let state = state_str
            .parse::<OrderState>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        Ok(Order {
            id,
            table: TableNumber(table),
            customer,
            dish,
            state,
            created_at: parse_timestamp(5, &created_at_str)?,
            updated_at: parse_timestamp(6, &updated_at_str)?,
            delivered_at: delivered_at_str
                .map(|s| parse_timestamp(7, &s))
                .transpose()?,
        })
    }
}

impl OrderStore for SqliteOrderStore {
    fn create(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(db_err)?;

        let occupied: Option<String> = tx
            .query_row(
                &format!(
                    "SELECT id FROM orders WHERE table_number = ? AND state IN ({}) LIMIT 1",
                    active_states_list()
                ),
                params![request.table.get()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        if occupied.is_some() {
            return Err(OrderError::DuplicateActiveOrder {
                table: request.table,
            });
        }

        let now = now();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            table: request.table,
            customer: request.customer,
            dish: request.dish,
            state: OrderState::Created,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        };

        tx.execute(
            "INSERT INTO orders (id, table_number, customer, dish, state, created_at, updated_at, delivered_at) VALUES (?, ?, ?, ?, ?, ?, ?, NULL)",
            params![
                order.id,
                order.table.get(),
                order.customer,
                order.dish,
                order.state.as_str(),
                format_timestamp(&order.created_at),
                format_timestamp(&order.updated_at),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                OrderError::DuplicateActiveOrder { table: order.table }
            } else {
                db_err(e)
            }
        })?;

        tx.commit().map_err(db_err)?;

        Ok(order)
    }

    fn get(&self, id: &str) -> Result<Option<Order>, OrderError> {
        let conn = self.lock()?;

        conn.query_row(
            &format!("SELECT {} FROM orders WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_order,
        )
        .optional()
        .map_err(db_err)
    }

    fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        let conn = self.lock()?;

        let (where_clause, params) = Self::build_where_clause(filter);

        // rowid breaks ties between orders created within the same microsecond.
        let sql = format!(
            "SELECT {} FROM orders {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql).map_err(db_err)?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_order)
            .map_err(db_err)?;

        let mut orders = Vec::new();
        for row_result in rows {
            orders.push(row_result.map_err(db_err)?);
        }

        Ok(orders)
    }

    fn count(&self, filter: &OrderFilter) -> Result<i64, OrderError> {
        let conn = self.lock()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM orders {}", where_clause);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(db_err)
    }

    fn transition(&self, id: &str, transition: Transition) -> Result<Order, OrderError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(db_err)?;

        let mut order = tx
            .query_row(
                &format!("SELECT {} FROM orders WHERE id = ?", SELECT_COLUMNS),
                params![id],
                Self::row_to_order,
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;

        let previous = order.state;
        order.apply(transition, now())?;

        let changed = tx
            .execute(
                "UPDATE orders SET state = ?, updated_at = ?, delivered_at = ? WHERE id = ? AND state = ?",
                params![
                    order.state.as_str(),
                    format_timestamp(&order.updated_at),
                    order.delivered_at.as_ref().map(format_timestamp),
                    id,
                    previous.as_str(),
                ],
            )
            .map_err(db_err)?;

        if changed != 1 {
            return Err(OrderError::Database(format!(
                "order {} changed while applying {}",
                id, transition
            )));
        }

        tx.commit().map_err(db_err)?;

        Ok(order)
    }
}

fn db_err(e: rusqlite::Error) -> OrderError {
    OrderError::Database(e.to_string())
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

fn active_states_list() -> String {
    OrderState::ACTIVE
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Current time at the precision stored in the database.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so lexical order matches chronological order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
