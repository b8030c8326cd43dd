/// Isolated in-memory test database utility.
///
/// Every call builds a fresh SQLite database, runs the embedded migrations
/// and hands back a pooled handle. Tests never share state, so they can run
/// in parallel without locking.
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use roster::shared::database::Database;
use roster::shared::logging;
use std::sync::Arc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn test_database() -> Arc<Database> {
    logging::init_logger();

    // A single pooled connection keeps every query on the same in-memory
    // database; a second connection would see an empty one.
    let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("failed to build in-memory pool");

    {
        let mut conn = pool.get().expect("failed to check out connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("failed to run migrations");
    }

    Arc::new(Database::from_pool(pool))
}
