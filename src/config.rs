use std::{env, str::FromStr};

use anyhow::{bail, Context};
use chrono::Duration;

/// Knobs of the booking rules, shared by every request.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub slot_minutes: i64,
    pub auto_confirm: bool,
    pub session_ttl_secs: i64,
    pub max_range_days: i64,
    pub past_limit: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            slot_minutes: 30,
            auto_confirm: false,
            session_ttl_secs: 3600,
            max_range_days: 31,
            past_limit: 10,
        }
    }
}

impl ScheduleConfig {
    pub fn slot_length(&self) -> Duration {
        Duration::minutes(self.slot_minutes)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind: String,
    pub pool_size: u32,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL not found")?;
        let defaults = ScheduleConfig::default();

        let schedule = ScheduleConfig {
            slot_minutes: parse_or(&lookup, "SLOT_MINUTES", defaults.slot_minutes)?,
            auto_confirm: parse_or(&lookup, "AUTO_CONFIRM", defaults.auto_confirm)?,
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            max_range_days: parse_or(&lookup, "MAX_SLOT_RANGE_DAYS", defaults.max_range_days)?,
            past_limit: parse_or(&lookup, "PAST_APPOINTMENT_LIMIT", defaults.past_limit)?,
        };
        if schedule.slot_minutes <= 0 || schedule.slot_minutes > 24 * 60 {
            bail!("SLOT_MINUTES must be between 1 and 1440");
        }
        if schedule.max_range_days <= 0 {
            bail!("MAX_SLOT_RANGE_DAYS must be positive");
        }

        let pool_size = parse_or(&lookup, "DATABASE_POOL_SIZE", 10u32)?;
        if pool_size == 0 {
            bail!("DATABASE_POOL_SIZE must be positive");
        }

        Ok(Self {
            database_url,
            bind: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            pool_size,
            schedule,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}
