use std::{collections::HashMap, str::FromStr};

use anyhow::Context;
use tracing::warn;

use crate::store::IdStrategy;

const FALLBACK_SECRET: &str = "fallback-secret";
/// One year.
pub const MAX_TTL_MINUTES: u32 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `APP_ENV=development` exposes internal error detail in 500 responses.
    pub development: bool,
    pub cors_origin: String,
    pub jwt: JwtConfig,
    pub id_strategy: IdStrategy,
    pub seed_data: bool,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<&str, &str>) -> anyhow::Result<Self> {
        Self::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, signing tokens with the fallback secret");
            FALLBACK_SECRET.into()
        });
        let ttl_minutes = parsed(&var, "JWT_TTL_MINUTES", 60 * 24)?;
        if !(1..=MAX_TTL_MINUTES).contains(&ttl_minutes) {
            anyhow::bail!(
                "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {ttl_minutes}"
            );
        }
        let jwt = JwtConfig {
            secret,
            ttl_minutes,
        };
        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed(&var, "APP_PORT", 4000)?,
            development: var("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("development")),
            cors_origin: var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".into()),
            jwt,
            id_strategy: parsed(&var, "ID_STRATEGY", IdStrategy::Monotonic)?,
            seed_data: parsed(&var, "SEED_DATA", true)?,
            admin_password: var("ADMIN_PASSWORD").unwrap_or_else(|| "password".into()),
        })
    }
}

fn parsed<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid {key} value {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_workshop_setup() {
        let cfg = AppConfig::from_map(&HashMap::new()).expect("defaults load");
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert!(!cfg.development);
        assert_eq!(cfg.cors_origin, "http://localhost:3000");
        assert_eq!(cfg.jwt.secret, FALLBACK_SECRET);
        assert_eq!(cfg.jwt.ttl_minutes, 1440);
        assert_eq!(cfg.id_strategy, IdStrategy::Monotonic);
        assert!(cfg.seed_data);
        assert_eq!(cfg.admin_password, "password");
    }

    #[test]
    fn overrides_are_parsed() {
        let vars = HashMap::from([
            ("APP_PORT", "8081"),
            ("APP_ENV", "Development"),
            ("JWT_SECRET", "s3cret"),
            ("ID_STRATEGY", "sequential"),
            ("SEED_DATA", "false"),
        ]);
        let cfg = AppConfig::from_map(&vars).expect("overrides load");
        assert_eq!(cfg.port, 8081);
        assert!(cfg.development);
        assert_eq!(cfg.jwt.secret, "s3cret");
        assert_eq!(cfg.id_strategy, IdStrategy::Sequential);
        assert!(!cfg.seed_data);
    }

    #[test]
    fn garbage_values_are_rejected() {
        let vars = HashMap::from([("APP_PORT", "eighty")]);
        let err = AppConfig::from_map(&vars).unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));

        let vars = HashMap::from([("ID_STRATEGY", "random")]);
        assert!(AppConfig::from_map(&vars).is_err());
    }

    #[test]
    fn token_lifetime_is_bounded() {
        for raw in ["0", "-5", "9223372036854775807", "525601"] {
            let vars = HashMap::from([("JWT_TTL_MINUTES", raw)]);
            let err = AppConfig::from_map(&vars).unwrap_err();
            assert!(err.to_string().contains("JWT_TTL_MINUTES"), "{raw}: {err}");
        }
        let vars = HashMap::from([("JWT_TTL_MINUTES", "525600")]);
        let cfg = AppConfig::from_map(&vars).unwrap();
        assert_eq!(cfg.jwt.ttl_minutes, MAX_TTL_MINUTES);
    }
}
