use chrono_tz::Tz;
use deadliner_utils::create_random_secret;
use std::{fmt::Display, str::FromStr};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Key that has to be given in the `x-api-key` header for the admin routes
    pub admin_api_key: String,
    /// HS256 secret used to verify the bearer tokens of `User`s
    pub jwt_secret: String,
    /// Text model used for deadline extraction. Extraction finds nothing
    /// when this is not set.
    pub gemini: Option<GeminiConfig>,
    /// Mail transport. Every send fails when this is not set.
    pub smtp: Option<SmtpConfig>,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Time zone the job times below are interpreted in
    pub timezone: Tz,
    /// The notification engine runs when the minute of the hour is divisible by this
    pub notification_interval_minutes: u32,
    /// Hour of the day the daily digest is sent at
    pub daily_digest_hour: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timezone: Tz::UTC,
            notification_interval_minutes: 5,
            daily_digest_hour: 8,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let admin_api_key = secret_from_env("ADMIN_API_KEY", "Admin api key");
        let jwt_secret = secret_from_env("JWT_SECRET", "Jwt secret");
        let port = parse_or_default("PORT", env("PORT"), 5000usize);

        let gemini = match env("GEMINI_API_KEY") {
            Some(api_key) => Some(GeminiConfig {
                api_key,
                model: env("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".into()),
            }),
            None => {
                warn!("Did not find GEMINI_API_KEY environment variable. Deadline extraction will not find any deadlines.");
                None
            }
        };

        let smtp = match (env("SMTP_HOST"), env("SMTP_FROM")) {
            (Some(host), Some(from)) => Some(SmtpConfig {
                host,
                port: parse_or_default("SMTP_PORT", env("SMTP_PORT"), 587u16),
                user: env("SMTP_USER"),
                password: env("SMTP_PASSWORD"),
                from,
            }),
            _ => {
                warn!("SMTP_HOST or SMTP_FROM is not set. Email notifications are disabled.");
                None
            }
        };

        let defaults = SchedulerConfig::default();
        let scheduler = SchedulerConfig {
            enabled: parse_or_default("SCHEDULER_ENABLED", env("SCHEDULER_ENABLED"), true),
            timezone: parse_or_default(
                "SCHEDULER_TIMEZONE",
                env("SCHEDULER_TIMEZONE"),
                defaults.timezone,
            ),
            notification_interval_minutes: parse_or_default(
                "NOTIFICATION_INTERVAL_MINUTES",
                env("NOTIFICATION_INTERVAL_MINUTES"),
                defaults.notification_interval_minutes,
            )
            .clamp(1, 60),
            daily_digest_hour: parse_or_default(
                "DAILY_DIGEST_HOUR",
                env("DAILY_DIGEST_HOUR"),
                defaults.daily_digest_hour,
            )
            .min(23),
        };

        Self {
            port,
            admin_api_key,
            jwt_secret,
            gemini,
            smtp,
            scheduler,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn secret_from_env(name: &str, description: &str) -> String {
    match env(name) {
        Some(secret) => secret,
        None => {
            info!(
                "Did not find {} environment variable. Going to create one.",
                name
            );
            let secret = create_random_secret(32);
            info!("{} was generated and set to: {}", description, secret);
            secret
        }
    }
}

fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + Display,
{
    match value {
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, value, default
                );
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_for_invalid_values() {
        assert_eq!(parse_or_default("PORT", Some("abc".into()), 5000usize), 5000);
        assert_eq!(parse_or_default("PORT", Some(" 8080 ".into()), 5000usize), 8080);
        assert_eq!(parse_or_default("PORT", None, 5000usize), 5000);
        assert!(!parse_or_default("SCHEDULER_ENABLED", Some("false".into()), true));
    }

    #[test]
    fn parses_timezones() {
        let tz = parse_or_default("SCHEDULER_TIMEZONE", Some("Europe/Oslo".into()), Tz::UTC);
        assert_eq!(tz, chrono_tz::Europe::Oslo);
        let tz = parse_or_default("SCHEDULER_TIMEZONE", Some("Mars/Base".into()), Tz::UTC);
        assert_eq!(tz, Tz::UTC);
    }
}
