use quest_navigator::config::QuestConfig;
use quest_navigator::routes::{self, quest_routes};
use quest_navigator::session::{self, SessionRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = QuestConfig::from_env();

    eprintln!("🧭 Quest Navigator v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/sessions", config.port);
    eprintln!("   Events: ws://0.0.0.0:{}/ws/sessions/{{id}}", config.port);
    eprintln!(
        "   Dwell: interstitial {}ms, loading {}ms, advisory {}ms",
        config.interstitial_dwell.as_millis(),
        config.loading_dwell.as_millis(),
        config.advisory_ttl.as_millis()
    );
    eprintln!("   Session limit: {}", config.max_sessions);
    eprintln!(
        "   CORS origin: {}",
        config.allowed_origin.as_deref().unwrap_or("*")
    );

    let registry = SessionRegistry::new(&config);

    // Spawn idle-session sweep
    let _prune_handle = session::spawn_prune_task(registry.clone(), config.prune_interval);

    let app = quest_routes(registry, &config)?;

    let listener = routes::bind(&config).await?;
    tracing::info!(port = config.port, "Quest server started");

    axum::serve(listener, app).await?;
    Ok(())
}
