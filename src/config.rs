use regex::Regex;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub env_name: String,

    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,

    pub db_url: String,
    pub db_schema: Option<String>,

    pub allowed_origins: Vec<String>,

    pub gateway_base_url: String,
    pub gateway_api_key: Option<String>,
    pub gateway_webhook_secret: Option<String>,
    pub gateway_timeout_secs: u64,

    pub min_payment_amount: i64,
    pub base_currency: String,
    pub secondary_currency: String,
    pub exchange_rate: i64,
    pub public_base_url: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) => {
            let v = v.trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        }
        Err(_) => None,
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn validate_postgres_url(url: &str) -> Result<(), String> {
    let scheme = url
        .split_once(':')
        .map(|(s, _)| s.trim().to_lowercase())
        .unwrap_or_default();
    match scheme.as_str() {
        "postgres" | "postgresql" => Ok(()),
        _ => Err("FERRY_DB_URL (or DB_URL) must be a postgres URL".to_string()),
    }
}

fn is_production_like(env_name: &str) -> bool {
    let env = env_name.trim().to_ascii_lowercase();
    matches!(env.as_str(), "prod" | "production" | "staging")
}

fn looks_like_placeholder(secret: &str) -> bool {
    let s = secret.trim().to_ascii_lowercase();
    let banned = [
        "change-me",
        "change_me",
        "changeme",
        "replace-me",
        "secret",
        "password",
        "default",
        "example",
        "test",
    ];
    banned.iter().any(|v| *v == s || s.contains(v))
}

/// Prod/staging refuses empty, short or placeholder secrets; other
/// environments are left alone for local ergonomics.
fn validate_secret_for_env(
    env_name: &str,
    key: &str,
    value: Option<&str>,
    required_in_prod: bool,
) -> Result<(), String> {
    if !is_production_like(env_name) {
        return Ok(());
    }
    let secret = value.map(str::trim).filter(|s| !s.is_empty());
    let Some(secret) = secret else {
        if required_in_prod {
            return Err(format!("{key} must be set in prod/staging"));
        }
        return Ok(());
    };
    if secret.len() < 16 {
        return Err(format!(
            "{key} must be at least 16 characters in prod/staging"
        ));
    }
    if looks_like_placeholder(secret) {
        return Err(format!(
            "{key} looks like a placeholder/default value; use a strong random secret"
        ));
    }
    Ok(())
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let env_name = env_or("ENV", "dev");
        let prod_like = is_production_like(&env_name);

        let host = env_or("APP_HOST", "0.0.0.0");
        let port: u16 = env_or("APP_PORT", "8080")
            .parse()
            .map_err(|_| "APP_PORT must be a valid u16".to_string())?;

        let db_url = env_opt("FERRY_DB_URL")
            .or_else(|| env_opt("DB_URL"))
            .unwrap_or_else(|| "postgresql://ferry:ferry@db:5432/ferry_booking".to_string());
        validate_postgres_url(&db_url)?;

        let db_schema = env_opt("DB_SCHEMA");
        if let Some(s) = &db_schema {
            let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| e.to_string())?;
            if !re.is_match(s) {
                return Err("DB_SCHEMA must match ^[A-Za-z_][A-Za-z0-9_]*$".to_string());
            }
        }

        let mut allowed_origins = parse_csv(&env_or("ALLOWED_ORIGINS", ""));
        if allowed_origins.is_empty() {
            allowed_origins = vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ];
        }
        if prod_like && allowed_origins.iter().any(|o| o.trim() == "*") {
            return Err("ALLOWED_ORIGINS must not contain '*' in prod/staging".to_string());
        }
        if prod_like
            && allowed_origins
                .iter()
                .any(|o| !o.trim().starts_with("https://"))
        {
            return Err("ALLOWED_ORIGINS must use https:// origins in prod/staging".to_string());
        }

        let max_body_bytes: usize = env_or("FERRY_MAX_BODY_BYTES", "1048576")
            .parse()
            .map_err(|_| "FERRY_MAX_BODY_BYTES must be an integer".to_string())?;
        let max_body_bytes = max_body_bytes.clamp(16 * 1024, 10 * 1024 * 1024);

        let gateway_base_url = env_or("GATEWAY_BASE_URL", "https://api.modempay.com")
            .trim_end_matches('/')
            .to_string();
        if gateway_base_url.is_empty() {
            return Err("GATEWAY_BASE_URL must not be empty".to_string());
        }

        let gateway_api_key = env_opt("GATEWAY_API_KEY");
        validate_secret_for_env(&env_name, "GATEWAY_API_KEY", gateway_api_key.as_deref(), true)?;

        // The webhook handler fails closed without this, so prod must carry it.
        let gateway_webhook_secret = env_opt("GATEWAY_WEBHOOK_SECRET");
        validate_secret_for_env(
            &env_name,
            "GATEWAY_WEBHOOK_SECRET",
            gateway_webhook_secret.as_deref(),
            true,
        )?;

        let gateway_timeout_secs: u64 = env_or("GATEWAY_TIMEOUT_SECS", "20")
            .parse()
            .map_err(|_| "GATEWAY_TIMEOUT_SECS must be an integer".to_string())?;
        let gateway_timeout_secs = gateway_timeout_secs.clamp(1, 120);

        let min_payment_amount: i64 = env_or("MIN_PAYMENT_AMOUNT", "10")
            .parse()
            .map_err(|_| "MIN_PAYMENT_AMOUNT must be an integer".to_string())?;
        if min_payment_amount < 0 {
            return Err("MIN_PAYMENT_AMOUNT must not be negative".to_string());
        }

        let base_currency = normalize_currency(&env_or("BASE_CURRENCY", "GMD"));
        let secondary_currency = normalize_currency(&env_or("SECONDARY_CURRENCY", "CFA"));
        if base_currency == secondary_currency {
            return Err("BASE_CURRENCY and SECONDARY_CURRENCY must differ".to_string());
        }

        let exchange_rate: i64 = env_or("GMD_TO_CFA_RATE", "100")
            .parse()
            .map_err(|_| "GMD_TO_CFA_RATE must be an integer".to_string())?;
        if exchange_rate < 1 {
            return Err("GMD_TO_CFA_RATE must be at least 1".to_string());
        }

        let public_base_url = env_or("PUBLIC_BASE_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            env_name,
            host,
            port,
            max_body_bytes,
            db_url,
            db_schema,
            allowed_origins,
            gateway_base_url,
            gateway_api_key,
            gateway_webhook_secret,
            gateway_timeout_secs,
            min_payment_amount,
            base_currency,
            secondary_currency,
            exchange_rate,
            public_base_url,
        })
    }
}

fn normalize_currency(raw: &str) -> String {
    let mut c = raw.trim().to_uppercase();
    if c.is_empty() {
        c = "GMD".to_string();
    }
    if c.len() > 3 {
        c.truncate(3);
    }
    c
}
