/// Database layer
///
/// Connection pooling and migrations. The row-level queries live with
/// their models in the `models` module.
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: sqlx migration runner over `migrations/`
///
/// # Example
///
/// ```no_run
/// use avegeo_shared::db::pool::{create_pool, DatabaseConfig};
/// use avegeo_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
