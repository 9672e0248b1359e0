//! Basic example of Sanad DI container.
//!
//! Run with `RUST_LOG=sanad_container=trace` to watch resolution.

use std::sync::Arc;

use sanad::prelude::*;
use sanad::{Injectable, downcast};
use tracing_subscriber::EnvFilter;

// === Define your types ===

#[derive(Injectable)]
struct Config {
    #[inject(default = "String::from(\"postgres://localhost/app\")")]
    database_url: String,
    #[inject(default = "false")]
    debug: bool,
}

#[derive(Injectable)]
#[inject(name = "Logger")]
struct ConsoleLogger;

impl ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(Injectable)]
struct Database {
    config: Arc<Config>,
    #[inject(key = "Logger")]
    logger: Arc<ConsoleLogger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.config.database_url)
    }
}

#[derive(Injectable)]
struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

#[derive(Injectable)]
#[inject(transient)]
struct RequestId {
    #[inject(default = "0u64")]
    value: u64,
}

/// Builds the pool itself instead of being constructed field by field.
#[derive(Injectable)]
#[inject(provider)]
struct PoolProvider;

struct Pool {
    size: usize,
}

impl Provider for PoolProvider {
    fn provide(_key: &DependencyKey, container: &Container) -> Result<Instance> {
        let config: Arc<Config> = container.get_as("Config")?;
        Ok(Arc::new(Pool {
            size: if config.debug { 1 } else { 8 },
        }))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let container = sanad::container();

    // Everything derived is already known by name
    container.validate("UserRepository")?;
    let repo: Arc<UserRepository> = container.get_as("UserRepository")?;
    println!("{}", repo.find_user(42));

    // Shared by default
    let again: Arc<UserRepository> = container.get_as("UserRepository")?;
    println!("Same repository: {}", Arc::ptr_eq(&repo, &again));

    // Transient types are built fresh each time
    let a = container.make::<RequestId>()?;
    let b = container.make::<RequestId>()?;
    println!("Same request id: {}", Arc::ptr_eq(&a, &b));

    // Explicit values win over defaults and are never cached
    let id = container.resolve("RequestId", &Values::new().with("value", 7u64))?;
    let id: Arc<RequestId> = downcast(id, "RequestId")?;
    println!("Request id: {}", id.value);

    // Providers own construction for a key
    container.provider("Pool", "PoolProvider");
    let pool: Arc<Pool> = container.get_as("Pool")?;
    println!("Pool size: {}", pool.size);

    // Closures get their parameters injected
    let query = Callable::function(vec![Parameter::of::<Database>("db")], |args| {
        Ok(args.arc::<Database>("db")?.query("SELECT 1"))
    });
    let result: Arc<String> = container.call_as(&query, &Values::new(), None)?;
    println!("{result}");

    // Errors say what went wrong and what was probably meant
    if let Err(err) = container.get("UserRepo") {
        println!("{err}");
    }

    Ok(())
}
