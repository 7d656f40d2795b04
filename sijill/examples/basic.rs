//! Basic example of the Sijill resolver.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sijill::prelude::*;
use sijill::{catalog, implements, interface};
use tracing::info;

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

#[derive(Injectable)]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

interface!(dyn Logger);
implements!(ConsoleLogger => dyn Logger);

#[derive(Clone, Injectable)]
#[injectable(record)]
struct Config {
    database_url: String,
    debug: bool,
}

#[derive(Injectable)]
struct Database {
    #[inject]
    config: Ref<Config>,
    #[inject]
    logger: Arc<dyn Logger>,
    queries: AtomicU64,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.config.read().database_url)
    }
}

#[derive(Injectable)]
struct UserRepository {
    #[inject]
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

#[derive(Injectable)]
struct UserService {
    #[inject]
    repo: Arc<UserRepository>,
    #[inject]
    logger: Arc<dyn Logger>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        self.repo.find_user(id)
    }
}

// === Group bootstrap registrations ===

struct InfrastructureProvider;

impl Provider for InfrastructureProvider {
    fn register(&self, resolver: &Resolver) {
        resolver.register::<Config>(Ref::new(Config {
            database_url: "postgres://localhost/myapp".to_string(),
            debug: true,
        }));
        resolver.bind::<dyn Logger, ConsoleLogger>();
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("sijill_container=debug,basic=info")
        .init();

    let resolver = Resolver::builder()
        .add_provider(InfrastructureProvider)
        .detect_cycles(true)
        .build();

    println!("✅ Resolver built successfully!");
    println!("{resolver:?}");

    // === Check the wiring before building anything ===
    for finding in catalog::unconstructable() {
        println!("⚠️  {} cannot be auto-constructed: {:?}", finding.type_name, finding.reason);
    }

    let plan = resolver.plan::<UserService>()?;
    let steps: Vec<String> = plan.iter().map(DependencyKey::short_name).collect();
    info!(steps = ?steps, "Construction plan");

    // === Resolve ===
    let config = resolver.resolve::<Config>();
    println!("📋 Config: database_url={}, debug={}", config.read().database_url, config.read().debug);

    let service = resolver.resolve::<UserService>();
    println!("👤 {}", service.get_user(42));

    // Same singleton every time
    let again = resolver.resolve::<UserService>();
    println!("👤 {}", again.get_user(7));
    assert!(Arc::ptr_eq(&service, &again));

    let db = resolver.resolve::<Database>();
    println!("🗄️  {} queries served by one Database", db.queries.load(Ordering::Relaxed));

    println!("\n🎉 Everything works!");
    Ok(())
}
