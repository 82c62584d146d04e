#[macro_use]
extern crate diesel;

mod admin;
mod client;
mod config;
mod counselor;
mod database;
mod error;
mod models;
mod notify;
mod protocol;
mod schedule;
mod schema;
mod utils;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{AppConfig, ScheduleConfig},
    database::{mysql::MysqlStore, BookingStore},
    notify::{LogNotifier, Notifier},
};

/// Shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub notifier: Arc<dyn Notifier>,
    pub config: ScheduleConfig,
    pub clock: fn() -> DateTime<Utc>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let manager = ConnectionManager::<MysqlConnection>::new(config.database_url.clone());
    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size)
        .build(manager)
        .context("Failed to create pool")?;

    let state = AppState {
        store: Arc::new(MysqlStore::new(pool)),
        notifier: Arc::new(LogNotifier),
        config: config.schedule.clone(),
        clock: Utc::now,
    };

    info!(bind = %config.bind, "starting booking service");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .data(state.clone())
            .service(web::scope("/client").configure(client::config))
            .service(web::scope("/counselor").configure(counselor::config))
            .service(web::scope("/admin").configure(admin::config))
    })
    .bind(&config.bind)
    .with_context(|| format!("Failed to bind {}", config.bind))?
    .run()
    .await
    .context("Server error")
}
