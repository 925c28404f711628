//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! models without hand-written SQL.

use crate::entities::{Campaign, Donation, Donor, Event, EventAttendance};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://donor_crm.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every table that does not exist yet.
///
/// Order follows the foreign keys: donors, campaigns and events before the
/// donations and attendance records that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, Donor).await?;
    create_table(db, Campaign).await?;
    create_table(db, Event).await?;
    create_table(db, Donation).await?;
    create_table(db, EventAttendance).await?;

    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(builder.build(&statement)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        campaign::Model as CampaignModel, donation::Model as DonationModel,
        donor::Model as DonorModel, event::Model as EventModel,
        event_attendance::Model as EventAttendanceModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<DonorModel> = Donor::find().limit(1).all(&db).await?;
        let _: Vec<CampaignModel> = Campaign::find().limit(1).all(&db).await?;
        let _: Vec<EventModel> = Event::find().limit(1).all(&db).await?;
        let _: Vec<DonationModel> = Donation::find().limit(1).all(&db).await?;
        let _: Vec<EventAttendanceModel> = EventAttendance::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
