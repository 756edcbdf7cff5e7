// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check that the configured MySQL server is reachable and the schema exists.

use bmi_tracker::config::Config;
use sqlx::mysql::{MySqlConnection, MySqlDatabaseError};
use sqlx::{Connection, Row};
use std::path::Path;

/// MySQL server error numbers we have advice for.
const ER_ACCESS_DENIED: u16 = 1045;
const ER_BAD_DB: u16 = 1049;

#[tokio::main]
async fn main() {
    println!("🔍 Testing MySQL database connection...\n");

    if !Path::new(".env").exists() {
        eprintln!("❌ .env file not found!");
        println!("   Run: cargo run --bin setup-env");
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    println!("📋 Configuration:");
    println!("   Host: {}:{}", config.db_host, config.db_port);
    println!("   User: {}", config.db_user);
    println!("   Database: {}", config.db_name);
    println!("   Password: {}\n", mask_password(&config.db_password));

    match check(&config).await {
        Ok(()) => {
            println!("\n✅ Database connection test completed successfully!");
        }
        Err(e) => {
            eprintln!("\n❌ Database connection failed!");
            eprintln!("   Error: {e}\n");
            let tips = hints(&e);
            if !tips.is_empty() {
                println!("💡 Tips:");
                for tip in tips {
                    println!("   - {tip}");
                }
            }
            std::process::exit(1);
        }
    }
}

async fn check(config: &Config) -> Result<(), sqlx::Error> {
    let mut conn = MySqlConnection::connect(&config.database_server_url()).await?;
    println!("✅ Successfully connected to MySQL!");

    let databases = sqlx::query("SHOW DATABASES LIKE ?")
        .bind(&config.db_name)
        .fetch_all(&mut conn)
        .await?;

    if databases.is_empty() {
        println!("\n⚠️  Database '{}' does not exist.", config.db_name);
        println!("   Create it, then start the server to create the tables.");
    } else {
        println!("✅ Database '{}' exists.", config.db_name);

        let mut db_conn = MySqlConnection::connect(&config.database_url()).await?;
        let tables = sqlx::query("SHOW TABLES").fetch_all(&mut db_conn).await?;

        if tables.is_empty() {
            println!("⚠️  No tables found in database.");
            println!("   Start the server once to create them from src/db/schema.sql");
        } else {
            println!("✅ Found {} table(s):", tables.len());
            for table in &tables {
                let name: String = table.try_get(0)?;
                println!("   - {name}");
            }
        }
        db_conn.close().await?;
    }

    conn.close().await?;
    Ok(())
}

fn mask_password(password: &str) -> &'static str {
    if password.is_empty() {
        "(empty)"
    } else {
        "***"
    }
}

/// Troubleshooting advice for common connection failures.
fn hints(error: &sqlx::Error) -> &'static [&'static str] {
    match error {
        sqlx::Error::Io(io) if io.kind() == std::io::ErrorKind::ConnectionRefused => &[
            "Make sure MySQL server is running",
            "Check if MySQL is installed",
            "Verify DB_HOST and DB_PORT in .env",
        ],
        sqlx::Error::Database(db) => {
            match db.try_downcast_ref::<MySqlDatabaseError>().map(|e| e.number()) {
                Some(ER_ACCESS_DENIED) => &[
                    "Check DB_USER and DB_PASSWORD in .env",
                    "Verify the MySQL user has proper permissions",
                ],
                Some(ER_BAD_DB) => &[
                    "Database does not exist",
                    "Create it with: CREATE DATABASE bmi_calculator;",
                ],
                _ => &[],
            }
        }
        _ => &[],
    }
}
