use std::env;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub cors_origin: String,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let store = match lookup("STORE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => {
                let database_url = lookup("DATABASE_URL")
                    .ok_or_else(|| "DATABASE_URL must be set".to_string())?;
                StoreBackend::Postgres { database_url }
            }
            "memory" => StoreBackend::Memory,
            other => {
                return Err(format!(
                    "STORE_BACKEND must be 'postgres' or 'memory', got '{}'",
                    other
                ))
            }
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "JWT_SECRET must be set".to_string())?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => parse_bcrypt_cost(&raw)?,
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            store,
            jwt_secret,
            bind_addr,
            cors_origin,
            bcrypt_cost,
        })
    }
}

fn parse_bcrypt_cost(raw: &str) -> Result<u32, String> {
    let cost: u32 = raw
        .parse()
        .map_err(|_| format!("BCRYPT_COST must be a number, got '{}'", raw))?;

    if !(4..=31).contains(&cost) {
        return Err(format!("BCRYPT_COST must be between 4 and 31, got {}", cost));
    }

    Ok(cost)
}
