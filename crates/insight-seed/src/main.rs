//! Creates the schema in the configured database and loads one sample
//! owner, address, property, client, rental and review.
//!
//! Configuration comes from the environment (or a `.env` file):
//! `INSIGHT_DATABASE_PATH`, `INSIGHT_DB_MAX_CONNECTIONS`,
//! `INSIGHT_DB_MIN_CONNECTIONS`, `INSIGHT_DB_AUTO_MIGRATE` and `RUST_LOG`.

mod tracing_setup;

use anyhow::{Context, Result};
use chrono::{Days, Local};
use insight_core::DateRange;
use insight_core::constants::{DEFAULT_RANKING_LIMIT, DEFAULT_RECENT_REVIEWS, DEFAULT_TOP_CLIENTS};
use insight_storage::repositories::{
    PropertyRepository, RentalRepository, ReviewRepository, SqlitePropertyRepository,
    SqliteRentalRepository, SqliteReviewRepository,
};
use insight_storage::{Database, DatabaseConfig, create_sample_data};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_setup::init_tracing()?;

    let config = DatabaseConfig::from_env().context("reading database configuration")?;
    let path = config.database_path.clone();
    let db = Database::new(config)
        .await
        .with_context(|| format!("opening database at {path}"))?;

    let today = Local::now().date_naive();
    let sample = create_sample_data(&db, today)
        .await
        .context("creating sample data")?;
    println!("{}", serde_json::to_string_pretty(&sample)?);

    let properties = SqlitePropertyRepository::new(db.pool().clone());
    let rentals = SqliteRentalRepository::new(db.pool().clone());
    let reviews = SqliteReviewRepository::new(db.pool().clone());

    if let Some(details) = properties.get_details(&sample.property_id).await? {
        info!(
            tipo = %details.property.tipo,
            proprietario = %details.owner.nome,
            cidade = %details.address.cidade,
            estado = %details.address.estado,
            "sample property"
        );
    }

    let Some(rental) = rentals.get_by_id(&sample.rental_id).await? else {
        warn!(rental_id = %sample.rental_id, "sample rental missing after commit");
        return Ok(());
    };
    let period = rental.period()?;
    let booked_again = rentals
        .check_availability(&sample.property_id, period)
        .await?;
    info!(%period, available = booked_again, "availability of the booked period");

    if let Some(next) = period.end().checked_add_days(Days::new(1)) {
        let following = DateRange::single_day(next);
        let available = rentals
            .check_availability(&sample.property_id, following)
            .await?;
        info!(period = %following, available, "availability of the following day");
    }

    let revenue = rentals.get_revenue_by_period(period).await?;
    info!(%revenue, %period, "revenue");

    for entry in rentals.get_most_frequent_clients(DEFAULT_TOP_CLIENTS).await? {
        info!(cliente = %entry.client.nome, alugueis = entry.rental_count, "frequent client");
    }

    let summary = reviews.get_ratings_summary(&sample.property_id).await?;
    let average = reviews.get_average_rating(&sample.property_id).await?;
    info!(
        summary = ?summary.to_map(),
        average = average.unwrap_or_default(),
        "ratings"
    );
    for review in reviews
        .get_recent_reviews(&sample.property_id, DEFAULT_RECENT_REVIEWS)
        .await?
    {
        info!(
            nota = %review.nota,
            comentario = review.comentario.as_deref().unwrap_or(""),
            "recent review"
        );
    }

    // Empty until a property collects enough reviews
    let ranking = reviews
        .get_highest_rated_properties(DEFAULT_RANKING_LIMIT)
        .await?;
    info!(ranked = ranking.len(), "highest rated properties");
    for entry in &ranking {
        info!(
            hospedagem_id = %entry.property.id,
            media = entry.average_rating,
            avaliacoes = entry.review_count,
            "rated property"
        );
    }

    db.close().await;
    Ok(())
}
