use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use schoolgate_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_MANAGED_SCHOOL_CATEGORY: &str = "JNV";
const DEFAULT_SESSION_ABSOLUTE_TIMEOUT_HOURS: &str = "12";

/// Names of the headers the trusted identity proxy sets on federated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedHeaderConfig {
    pub email_header: String,
    pub name_header: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub session_absolute_timeout_seconds: i64,
    pub trusted_proxy_hops: usize,
    pub managed_school_category: String,
    pub school_passcodes: Option<String>,
    pub federated_headers: Option<FederatedHeaderConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env_flag("SESSION_COOKIE_SECURE");

        let session_absolute_timeout_seconds = parse_timeout_hours(
            env::var("SESSION_ABSOLUTE_TIMEOUT_HOURS")
                .ok()
                .as_deref()
                .unwrap_or(DEFAULT_SESSION_ABSOLUTE_TIMEOUT_HOURS),
        )?;

        let trusted_proxy_hops = match env::var("RATE_LIMIT_TRUSTED_PROXY_HOPS") {
            Ok(value) => parse_proxy_hops(&value)?,
            Err(_) => 0,
        };

        let managed_school_category = env::var("MANAGED_SCHOOL_CATEGORY")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MANAGED_SCHOOL_CATEGORY.to_owned());

        let school_passcodes = env::var("SCHOOL_PASSCODES")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let federated_headers = env_flag("FEDERATED_SIGN_IN_ENABLED").then(|| {
            FederatedHeaderConfig {
                email_header: header_name_env("FEDERATED_EMAIL_HEADER", "x-forwarded-email"),
                name_header: header_name_env("FEDERATED_NAME_HEADER", "x-forwarded-user"),
            }
        });

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            session_absolute_timeout_seconds,
            trusted_proxy_hops,
            managed_school_category,
            school_passcodes,
            federated_headers,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true")
}

fn header_name_env(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// Parses the absolute session timeout in hours and returns it in seconds.
fn parse_timeout_hours(value: &str) -> Result<i64, AppError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|hours| *hours > 0)
        .and_then(|hours| hours.checked_mul(60 * 60))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "SESSION_ABSOLUTE_TIMEOUT_HOURS must be a positive number of hours that fits \
                 in seconds, got '{value}'"
            ))
        })
}

fn parse_proxy_hops(value: &str) -> Result<usize, AppError> {
    value.trim().parse::<usize>().map_err(|_| {
        AppError::Validation(format!(
            "RATE_LIMIT_TRUSTED_PROXY_HOPS must be a non-negative integer, got '{value}'"
        ))
    })
}
