//! Database setup
//!
//! Idempotent schema creation for the portal tables plus a first-run admin
//! account seed. Column names follow the portal's PascalCase convention with
//! a `<TableName>ID` primary key on every table.

use sqlx::sqlite::SqlitePool;
use tracing::info;

pub async fn setup(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admin (
            AdminID INTEGER PRIMARY KEY AUTOINCREMENT,
            Email TEXT UNIQUE NOT NULL,
            Password TEXT NOT NULL,
            LastLogin DATETIME,
            CreatedAt DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenders (
            TenderID INTEGER PRIMARY KEY AUTOINCREMENT,
            TenderName TEXT NOT NULL,
            TenderReferenceNo TEXT NOT NULL,
            StartDate DATE NOT NULL,
            EndDate DATE NOT NULL,
            DocumentPath TEXT NOT NULL,
            CorrigendumPath TEXT,
            CreatedAt DATETIME,
            UpdatedAt DATETIME
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            ResultID INTEGER PRIMARY KEY AUTOINCREMENT,
            Title TEXT NOT NULL,
            Department TEXT NOT NULL,
            ReferenceNo TEXT NOT NULL,
            ResultDate DATE NOT NULL,
            DocumentPath TEXT NOT NULL,
            CreatedAt DATETIME,
            UpdatedAt DATETIME
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The four staff-position posting tables share one shape.
    for (table, id_column) in [
        ("medical_faculty", "MedicalFacultyID"),
        ("medical_residents", "MedicalResidentID"),
        ("nonmedical_contractual", "NonMedicalContractualID"),
        ("nonmedical_permanent", "NonMedicalPermanentID"),
    ] {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                {id_column} INTEGER PRIMARY KEY AUTOINCREMENT,
                PostName TEXT,
                Department TEXT,
                Qualification TEXT,
                Vacancies INTEGER,
                LastDate DATE,
                DocumentPath TEXT,
                CreatedAt DATETIME,
                UpdatedAt DATETIME
            )
            "#
        );
        sqlx::query(&sql).execute(pool).await?;
    }

    seed_admin_account(pool).await?;

    Ok(())
}

/// Seed a default staff account so a fresh install can log in. The password
/// is expected to be changed on first use.
async fn seed_admin_account(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let admin_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin")
        .fetch_one(pool)
        .await?;

    if admin_count.0 > 0 {
        return Ok(());
    }

    sqlx::query("INSERT INTO admin (Email, Password) VALUES (?, ?)")
        .bind("admin@portal.local")
        .bind("changeme")
        .execute(pool)
        .await?;

    info!("Seeded default admin account admin@portal.local");
    Ok(())
}
