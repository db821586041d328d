use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub cors: Cors,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub disable_prepared_statements: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Cors {
    /// Only consulted in production; other stages allow any origin.
    pub allowed_origins: Vec<String>,
}
