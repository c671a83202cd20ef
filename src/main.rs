use dotenvy::dotenv;
use portfolio_pulse::{
    config::{database, settings},
    core::{format_kpi_summary, format_portfolio_dashboard, kpi_summary, organization_dashboard},
    db,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; non-fatal, DATABASE_URL can also be set externally
    dotenv().ok();

    // 3. Load the organization settings
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load portfolio.toml: {e}"))?;
    info!(
        "Loaded settings: default rate {} {}",
        settings.organization.default_hourly_rate, settings.organization.currency
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established"))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;

    // 5. Seed the configured resource roster
    let seeded =
        db::seed_initial_resources(&db, &settings.resources, &settings.organization.currency)
            .await?;
    if seeded > 0 {
        info!("Seeded {seeded} resources from portfolio.toml");
    }

    // 6. Render the organization dashboard and KPI rollup
    let today = chrono::Utc::now().date_naive();
    let dashboard = organization_dashboard(&db, today, &settings.organization).await?;
    println!("{}", format_portfolio_dashboard(&dashboard));

    let kpis = kpi_summary(&db, None, &settings.organization).await?;
    println!("{}", format_kpi_summary(&kpis));

    Ok(())
}
