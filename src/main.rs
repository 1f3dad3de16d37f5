use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zcyc::{fetch_range, info_time, FetchConfig, HttpSessionFactory, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let start_time = Local::now();
    let config = FetchConfig::default();
    let summary = fetch_range(&config, &HttpSessionFactory::default()).await?;
    info_time!(
        start_time,
        "Full program time: {} dates fetched, {} resumed, {} without data, {} failed, {} rows added",
        summary.with_points,
        summary.resumed,
        summary.no_data,
        summary.failed,
        summary.points_added
    );

    Ok(())
}
