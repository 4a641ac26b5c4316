// config.rs
use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, Result};

const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "https://utkarshgupta.info",
    "https://utkarshgupta.vercel.app",
    "https://utkarshgupta-sr931662s-projects.vercel.app",
];

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub otp_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub app_name: String,
    pub email_from: String,
    pub contact_recipient: String,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| AppError::configuration(format!("{} must be set", key)))
        };

        let email_from = get("EMAIL_FROM").unwrap_or_else(|| "admin@mavicode.in".to_string());

        let smtp = match (get("SMTP_HOST"), get("SMTP_USERNAME"), get("SMTP_PASSWORD")) {
            (Some(host), Some(username), Some(password)) => Some(SmtpConfig {
                host,
                port: parse_or(&get, "SMTP_PORT", 587)?,
                username,
                password,
            }),
            _ => None,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let bcrypt_cost = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::configuration("BCRYPT_COST must be between 4 and 31"));
        }

        let otp_ttl_minutes = parse_or(&get, "OTP_TTL_MINUTES", 10)?;
        if otp_ttl_minutes <= 0 {
            return Err(AppError::configuration("OTP_TTL_MINUTES must be positive"));
        }

        Ok(AppConfig {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8080)?,
            database_url: required("DATABASE_URL")?,
            database_name: get("DATABASE_NAME").unwrap_or_else(|| "portfolio".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parse_or(&get, "JWT_EXPIRATION_HOURS", 24)?,
            bcrypt_cost,
            otp_ttl_minutes,
            cors_origins,
            upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            app_name: get("APP_NAME").unwrap_or_else(|| "Academic Portfolio".to_string()),
            contact_recipient: get("CONTACT_RECIPIENT_EMAIL").unwrap_or_else(|| email_from.clone()),
            email_from,
            smtp,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[cfg(test)]
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "mongodb://localhost:27017".to_string(),
            database_name: "portfolio_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_hours: 1,
            bcrypt_cost: 4,
            otp_ttl_minutes: 10,
            cors_origins: vec!["http://localhost:3000".to_string()],
            upload_dir,
            max_upload_bytes: 1024 * 1024,
            app_name: "Portfolio Test".to_string(),
            email_from: "noreply@example.com".to_string(),
            contact_recipient: "owner@example.com".to_string(),
            smtp: None,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 2] = [
        ("DATABASE_URL", "mongodb://localhost:27017"),
        ("JWT_SECRET", "s3cret"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.otp_ttl_minutes, 10);
        assert_eq!(config.jwt_expiration_hours, 24);
        assert_eq!(config.database_name, "portfolio");
        assert_eq!(config.cors_origins.len(), 4);
        assert_eq!(config.contact_recipient, config.email_from);
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_missing_required_keys() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "x")])).unwrap_err();
        assert_matches!(err, AppError::ConfigurationError(msg) if msg.contains("DATABASE_URL"));

        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "mongodb://x")])).unwrap_err();
        assert_matches!(err, AppError::ConfigurationError(msg) if msg.contains("JWT_SECRET"));
    }

    #[test]
    fn test_smtp_requires_all_credentials() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SMTP_HOST", "email-smtp.ap-south-1.amazonaws.com"));
        pairs.push(("SMTP_USERNAME", "AKIA"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).unwrap().smtp.is_none());

        pairs.push(("SMTP_PASSWORD", "pw"));
        pairs.push(("SMTP_PORT", "2587"));
        let smtp = AppConfig::from_lookup(lookup(&pairs)).unwrap().smtp.unwrap();
        assert_eq!(smtp.port, 2587);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "eighty"));
        assert_matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(AppError::ConfigurationError(_))
        );

        let mut pairs = BASE.to_vec();
        pairs.push(("BCRYPT_COST", "2"));
        assert_matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(AppError::ConfigurationError(_))
        );
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let mut pairs = BASE.to_vec();
        pairs.push(("CORS_ORIGINS", "https://a.example, https://b.example ,"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
    }
}
