//! In-memory stand-in for Postgres.
//!
//! Understands exactly the SQL the compiler emits and models what the
//! gateway relies on: roles, table ownership and grants, session `SET ROLE`
//! state, token-producing functions, and the reset of a connection's role
//! when it goes back to the pool.

#![allow(dead_code)]

use async_trait::async_trait;
use postgremote_api::{
    ColumnInfo, ConnectionPool, ExecutorSettings, PoolError, PoolResult, PooledConnection,
    PreparedQuery, QueryOutput, RequestExecutor,
};
use postgremote_auth::{create_and_sign_token, CookieConfig};
use postgremote_sql::{EntityRegistry, Role, ValueMap};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const TEST_SECRET: &str = "test-secret-for-gateway";
pub const TEST_ISSUER: &str = "postgremote";
pub const TEST_EXPIRY_SECS: i64 = 3600;
pub const TOKEN_TYPE: &str = "jwt_token";

/// Session user of every connection. Superuser.
pub const SESSION_USER: &str = "postgres";

type FunctionBody = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

struct MockFunction {
    result_type: String,
    body: FunctionBody,
}

#[derive(Default)]
struct MockTable {
    owner: String,
    columns: Vec<String>,
    rows: Vec<ValueMap>,
    grants: HashMap<String, HashSet<String>>,
}

#[derive(Default)]
struct DbState {
    roles: HashSet<String>,
    tables: HashMap<String, MockTable>,
    functions: HashMap<String, MockFunction>,
    /// Role each idle connection carries; `None` is the session user.
    idle: Vec<Option<String>>,
    executed: Vec<String>,
    acquired: usize,
    released: usize,
    stale_role_acquisitions: usize,
    unavailable: bool,
}

#[derive(Clone, Default)]
pub struct MockDatabase {
    state: Arc<Mutex<DbState>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        let db = Self::default();
        db.state.lock().unwrap().roles.insert(SESSION_USER.to_string());
        db
    }

    pub fn add_role(&self, role: &str) {
        self.state.lock().unwrap().roles.insert(role.to_string());
    }

    /// Create a table owned by the session user.
    pub fn add_table(&self, name: &str, columns: &[&str], rows: Vec<ValueMap>) {
        let table = MockTable {
            owner: SESSION_USER.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            grants: HashMap::new(),
        };
        self.state.lock().unwrap().tables.insert(name.to_string(), table);
    }

    pub fn add_function(
        &self,
        name: &str,
        result_type: &str,
        body: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) {
        self.state.lock().unwrap().functions.insert(
            name.to_string(),
            MockFunction {
                result_type: result_type.to_string(),
                body: Arc::new(body),
            },
        );
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    pub fn rows(&self, table: &str) -> Vec<ValueMap> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn has_grant(&self, table: &str, role: &str, privilege: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .and_then(|t| t.grants.get(role))
            .map(|p| p.contains(privilege))
            .unwrap_or(false)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.state.lock().unwrap().roles.contains(role)
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.state.lock().unwrap().tables.contains_key(table)
    }

    /// Every statement text that reached the database, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn acquired(&self) -> usize {
        self.state.lock().unwrap().acquired
    }

    pub fn released(&self) -> usize {
        self.state.lock().unwrap().released
    }

    /// Connections handed out while still carrying a previous request's role.
    pub fn stale_role_acquisitions(&self) -> usize {
        self.state.lock().unwrap().stale_role_acquisitions
    }

    pub fn pool(&self) -> Arc<dyn ConnectionPool> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl ConnectionPool for MockDatabase {
    async fn acquire(&self) -> PoolResult<Box<dyn PooledConnection>> {
        let mut state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(PoolError::Unavailable("pool timed out while waiting for an open connection".into()));
        }
        let role = state.idle.pop().flatten();
        if role.is_some() {
            state.stale_role_acquisitions += 1;
        }
        state.acquired += 1;
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
            role,
        }))
    }
}

pub struct MockConnection {
    state: Arc<Mutex<DbState>>,
    role: Option<String>,
}

impl MockConnection {
    fn current_role(&self) -> String {
        self.role.clone().unwrap_or_else(|| SESSION_USER.to_string())
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        // RESET ROLE on the way back to the pool
        self.role = None;
        if let Ok(mut state) = self.state.lock() {
            state.released += 1;
            state.idle.push(None);
        }
    }
}

#[async_trait]
impl PooledConnection for MockConnection {
    async fn set_role(&mut self, role: &Role) -> PoolResult<()> {
        let state = self.state.lock().unwrap();
        if !state.roles.contains(role.name()) {
            return Err(PoolError::Role(format!("role \"{}\" does not exist", role.name())));
        }
        self.role = Some(role.name().to_string());
        Ok(())
    }

    async fn query(&mut self, query: &PreparedQuery) -> PoolResult<QueryOutput> {
        let acting = self.current_role();
        let mut state = self.state.lock().unwrap();
        state.executed.push(query.text.clone());
        run_statement(&mut state, &acting, query)
    }
}

fn run_statement(state: &mut DbState, acting: &str, query: &PreparedQuery) -> PoolResult<QueryOutput> {
    let text = query.text.as_str();
    let idents = quoted_identifiers(text);
    let first = |i: usize| -> PoolResult<String> {
        idents
            .get(i)
            .cloned()
            .ok_or_else(|| PoolError::Query(format!("syntax error in {:?}", text)))
    };
    let superuser = acting == SESSION_USER;

    if text.starts_with("SELECT") && text.contains(" FROM ") {
        let name = idents.last().cloned().unwrap_or_default();
        let table = state
            .tables
            .get(&name)
            .ok_or_else(|| PoolError::Query(format!("relation \"{}\" does not exist", name)))?;
        if !can(table, acting, superuser, "SELECT") {
            return Err(PoolError::Query(format!("permission denied for table {}", name)));
        }
        return Ok(QueryOutput {
            columns: table.columns.iter().map(|c| ColumnInfo::new(c, "text")).collect(),
            rows: table.rows.clone(),
        });
    }

    if text.starts_with("SELECT") {
        let name = first(0)?;
        let function = state
            .functions
            .get(&name)
            .ok_or_else(|| PoolError::Query(format!("function {} does not exist", name)))?;
        let value = (function.body)(&query.parameters);
        let mut row = ValueMap::new();
        row.insert(name.clone(), value);
        return Ok(QueryOutput {
            columns: vec![ColumnInfo::new(name, function.result_type.clone())],
            rows: vec![row],
        });
    }

    if text.starts_with("INSERT INTO") {
        let name = first(0)?;
        let table = state
            .tables
            .get_mut(&name)
            .ok_or_else(|| PoolError::Query(format!("relation \"{}\" does not exist", name)))?;
        if !can(table, acting, superuser, "INSERT") {
            return Err(PoolError::Query(format!("permission denied for table {}", name)));
        }
        let row: ValueMap = idents[1..]
            .iter()
            .cloned()
            .zip(query.parameters.iter().cloned())
            .collect();
        table.rows.push(row);
        return Ok(QueryOutput::default());
    }

    if text.starts_with("GRANT") || text.starts_with("REVOKE") {
        let privilege = text.split_whitespace().nth(1).unwrap_or_default().to_string();
        let (name, grantee) = (first(0)?, first(1)?);
        if !state.roles.contains(&grantee) {
            return Err(PoolError::Query(format!("role \"{}\" does not exist", grantee)));
        }
        let table = state
            .tables
            .get_mut(&name)
            .ok_or_else(|| PoolError::Query(format!("relation \"{}\" does not exist", name)))?;
        if !superuser && table.owner != acting {
            return Err(PoolError::Query(format!("permission denied for table {}", name)));
        }
        let privileges = table.grants.entry(grantee).or_default();
        if text.starts_with("GRANT") {
            privileges.insert(privilege);
        } else {
            privileges.remove(&privilege);
        }
        return Ok(QueryOutput::default());
    }

    if let Some(rest) = text.strip_prefix("CREATE ") {
        if !superuser {
            return Err(PoolError::Query("permission denied to create".into()));
        }
        let name = first(0)?;
        if rest.starts_with("ROLE") {
            state.roles.insert(name);
        } else {
            let table = MockTable {
                owner: acting.to_string(),
                columns: idents[1..].to_vec(),
                ..Default::default()
            };
            state.tables.insert(name, table);
        }
        return Ok(QueryOutput::default());
    }

    if let Some(rest) = text.strip_prefix("DROP ") {
        if !superuser {
            return Err(PoolError::Query("must be owner".into()));
        }
        let name = first(0)?;
        let existed = if rest.starts_with("ROLE") {
            state.roles.remove(&name)
        } else {
            state.tables.remove(&name).is_some()
        };
        if !existed && !rest.contains("IF EXISTS") {
            return Err(PoolError::Query(format!("\"{}\" does not exist", name)));
        }
        return Ok(QueryOutput::default());
    }

    Err(PoolError::Query(format!("syntax error at or near {:?}", text)))
}

fn can(table: &MockTable, acting: &str, superuser: bool, privilege: &str) -> bool {
    superuser
        || table.owner == acting
        || table.grants.get(acting).map(|p| p.contains(privilege)).unwrap_or(false)
}

/// Double-quoted identifiers in order of appearance, with `""` unescaped.
fn quoted_identifiers(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '"' {
            continue;
        }
        let mut ident = String::new();
        while let Some(c) = chars.next() {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    ident.push('"');
                } else {
                    break;
                }
            } else {
                ident.push(c);
            }
        }
        out.push(ident);
    }
    out
}

pub fn settings(default_role: Option<&str>) -> ExecutorSettings {
    ExecutorSettings {
        jwt_secret: TEST_SECRET.to_string(),
        jwt_issuer: TEST_ISSUER.to_string(),
        token_expiry_secs: TEST_EXPIRY_SECS,
        token_type: Some(TOKEN_TYPE.to_string()),
        default_role: default_role.map(|r| Role::define(r).unwrap()),
        cookie: CookieConfig::default(),
    }
}

pub fn executor(db: &MockDatabase, registry: EntityRegistry, default_role: Option<&str>) -> Arc<RequestExecutor> {
    Arc::new(RequestExecutor::new(db.pool(), Arc::new(registry), settings(default_role)))
}

/// A valid credential for `role`.
pub fn token_for(role: &str) -> String {
    create_and_sign_token(role, TEST_ISSUER, TEST_EXPIRY_SECS, TEST_SECRET).unwrap().0
}

pub fn row(pairs: &[(&str, Value)]) -> ValueMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Database with roles `reader` and `outsider`, a `Book` table readable
/// only by `reader`, and a `login` function returning a `jwt_token`
/// composite for the given username.
pub fn library() -> MockDatabase {
    let db = MockDatabase::new();
    db.add_role("reader");
    db.add_role("outsider");
    db.add_role("anonymous");
    db.add_table(
        "Book",
        &["title", "author"],
        vec![
            row(&[("title", "Dune".into()), ("author", "Herbert".into())]),
            row(&[("title", "Emma".into()), ("author", "Austen".into())]),
        ],
    );
    db.add_function("login", TOKEN_TYPE, |args| match args.first() {
        Some(Value::String(user)) => Value::String(format!("({},1700000000)", user)),
        _ => Value::Null,
    });
    db
}
