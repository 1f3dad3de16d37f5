use chrono::{Local, NaiveDate};

use crate::parse::{parse_day, DayOutcome};
use crate::record::YieldCurvePoint;
use crate::session::{wait_for_element, Session, SessionFactory};
use crate::store::Dataset;
use crate::{info_time, warn_time, Error, FetchConfig, Result};

/// What a run did, date by date.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Dates skipped because the backing file already has them.
    pub resumed: usize,
    /// Dates that went through the fetch steps.
    pub attempted: usize,
    pub with_points: usize,
    pub no_data: usize,
    pub failed: usize,
    /// Rows that made it into the file after deduplication.
    pub points_added: usize,
    pub session_restarts: usize,
    pub flushes: usize,
}

/// Walks every date of `config`'s range, oldest first, and keeps the backing
/// file up to date. Per-date failures are logged and skipped; only storage
/// errors and a session that can't be opened at all end the run early.
pub async fn fetch_range<F: SessionFactory>(
    config: &FetchConfig,
    factory: &F,
) -> Result<RunSummary> {
    let start_time = Local::now();
    let mut summary = RunSummary::default();

    let mut dataset = Dataset::load(&config.output_path)?;
    let processed_dates = dataset.resume_set();
    if !processed_dates.is_empty() {
        info_time!("Resuming... {} dates already processed", processed_dates.len());
    }

    let mut session = factory.open().await?;
    let mut buffer: Vec<YieldCurvePoint> = Vec::new();
    let mut day_count = 0usize;

    let dates = config
        .start_date
        .iter_days()
        .take_while(|date| *date <= config.end_date);

    for date in dates {
        if processed_dates.contains(&date) {
            summary.resumed += 1;
            continue;
        }

        info_time!("→ {}", date.format("%d.%m.%Y"));
        summary.attempted += 1;

        match fetch_day(&mut session, factory, config, date, &mut summary).await {
            Ok(DayOutcome::NoData) => {
                summary.no_data += 1;
                info_time!("   ⤷ No data (weekend/holiday)");
            }
            Ok(DayOutcome::Points(points)) => {
                summary.with_points += 1;
                info_time!("   ✔ Added: {} points", points.len());
                buffer.extend(points);
            }
            Err(e) => {
                summary.failed += 1;
                warn_time!("   ⚠ Skipped {} due to error: {}", date, e);
            }
        }

        day_count += 1;
        if config.save_every > 0 && day_count % config.save_every == 0 && !buffer.is_empty() {
            summary.points_added += dataset.merge(std::mem::take(&mut buffer));
            dataset.save(&config.output_path)?;
            summary.flushes += 1;
            info_time!(
                "Saved intermediate results to {}",
                config.output_path.display()
            );
        }
    }

    if let Err(e) = session.close().await {
        tracing::debug!("closing session failed: {e}");
    }

    summary.points_added += dataset.merge(buffer);
    dataset.save(&config.output_path)?;
    info_time!(
        start_time,
        "Done. Full dataset ({} rows) saved to {}",
        dataset.len(),
        config.output_path.display()
    );

    Ok(summary)
}

/// Runs the page steps for one date. A dead session is replaced and the
/// navigation retried once; anything else is returned to the caller.
async fn fetch_day<F: SessionFactory>(
    session: &mut F::Session,
    factory: &F,
    config: &FetchConfig,
    date: NaiveDate,
    summary: &mut RunSummary,
) -> Result<DayOutcome> {
    match session.goto(&config.base_url).await {
        Ok(()) => {}
        Err(e) if e.is_session_death() => {
            info_time!("⟳ Restarting session: {}", e);
            let fresh = factory.open().await?;
            let dead = std::mem::replace(session, fresh);
            let _ = dead.close().await;
            summary.session_restarts += 1;
            session.goto(&config.base_url).await?;
        }
        Err(e) => return Err(e),
    }
    tokio::time::sleep(config.navigation_settle).await;

    wait_for_element(
        session,
        &config.date_input_selector,
        config.wait_timeout,
        config.poll_interval,
    )
    .await?;
    if !session.has_element(&config.filter_button_selector).await? {
        return Err(Error::ElementNotFound(config.filter_button_selector.clone()));
    }

    session
        .submit_filter(
            &config.date_input_selector,
            &config.filter_button_selector,
            &date.format("%d.%m.%Y").to_string(),
        )
        .await?;

    wait_for_element(
        session,
        &config.results_table_selector,
        config.wait_timeout,
        config.poll_interval,
    )
    .await?;
    tokio::time::sleep(config.submit_settle).await;

    let html = session.page_source().await?;
    parse_day(date, &html, &config.results_table_selector)
}
