//! HTTP handlers

pub mod auth;
pub mod health;
pub mod predict;
pub mod sensor;

#[cfg(test)]
pub(crate) fn test_state(pool: sqlx::SqlitePool, model_dir: &str) -> crate::AppState {
    crate::AppState {
        pool,
        gateway: crate::inference::ModelGateway::new(model_dir),
        config: crate::config::Config {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            model_dir: model_dir.to_string(),
            environment: "test".to_string(),
        },
    }
}
