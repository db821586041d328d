use anyhow::Result;
use diesel::{
    Connection, PgConnection,
    connection::CacheSize,
    r2d2::{ConnectionManager, CustomizeConnection, Error as R2d2Error, Pool},
};

/// Needed behind transaction-mode poolers (e.g. PgBouncer) where prepared statements
/// do not survive across transactions.
#[derive(Debug, Default)]
struct DisablePreparedStatements;

impl CustomizeConnection<PgConnection, R2d2Error> for DisablePreparedStatements {
    fn on_acquire(&self, conn: &mut PgConnection) -> std::result::Result<(), R2d2Error> {
        conn.set_prepared_statement_cache_size(CacheSize::Disabled);
        Ok(())
    }
}

pub type PgPoolSquad = Pool<ConnectionManager<PgConnection>>;

#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_connections: u32,
    pub disable_prepared_statements: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            disable_prepared_statements: false,
        }
    }
}

pub fn establish_connection(database_url: &str, options: &PoolOptions) -> Result<PgPoolSquad> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let mut builder = Pool::builder().max_size(options.max_connections);
    if options.disable_prepared_statements {
        builder = builder.connection_customizer(Box::new(DisablePreparedStatements));
    }
    let pool = builder.build(manager)?;
    Ok(pool)
}
