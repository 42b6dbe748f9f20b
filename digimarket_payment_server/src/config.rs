use std::env;

use chrono::Duration;
use digimarket_payment_engine::{helpers::FeeSplit, DEFAULT_REFUND_WINDOW_DAYS};
use dpg_common::Secret;
use log::*;
use paystack_client::PaystackConfig;

use crate::errors::ServerError;

const DEFAULT_DPG_HOST: &str = "127.0.0.1";
const DEFAULT_DPG_PORT: u16 = 8480;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Gateway credentials and endpoint. The secret key doubles as the webhook signing key.
    pub paystack: PaystackConfig,
    /// How long after settlement a buyer may still request a refund.
    pub refund_window: Duration,
    /// The seller's share of each line total, in basis points.
    pub fee_split: FeeSplit,
    /// Buffer size of the event channels feeding the notification hooks.
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DPG_HOST.to_string(),
            port: DEFAULT_DPG_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            paystack: PaystackConfig::default(),
            refund_window: Duration::days(DEFAULT_REFUND_WINDOW_DAYS),
            fee_split: FeeSplit::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DPG_HOST").ok().unwrap_or_else(|| DEFAULT_DPG_HOST.into());
        let port = env::var("DPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for DPG_PORT. {e} Using the default, {DEFAULT_DPG_PORT}, instead."
                    );
                    DEFAULT_DPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_DPG_PORT);
        let database_url = env::var("DPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ DPG_DATABASE_URL is not set. Please set it to the URL for the marketplace ledger database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let paystack = PaystackConfig::new_from_env_or_default();
        let refund_window = configure_refund_window();
        let fee_split = configure_fee_split();
        let event_buffer_size = env::var("DPG_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        Self { host, port, database_url, auth, paystack, refund_window, fee_split, event_buffer_size }
    }
}

fn configure_refund_window() -> Duration {
    env::var("DPG_REFUND_WINDOW_DAYS")
        .map_err(|_| {
            info!("🪛️ DPG_REFUND_WINDOW_DAYS is not set. Using the default of {DEFAULT_REFUND_WINDOW_DAYS} days.")
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::days)
                .map_err(|e| warn!("🪛️ Invalid configuration value for DPG_REFUND_WINDOW_DAYS. {e}"))
        })
        .ok()
        .unwrap_or(Duration::days(DEFAULT_REFUND_WINDOW_DAYS))
}

fn configure_fee_split() -> FeeSplit {
    env::var("DPG_SELLER_SHARE_BPS")
        .map_err(|_| {
            info!(
                "🪛️ DPG_SELLER_SHARE_BPS is not set. Using the default of {} bps.",
                FeeSplit::default().seller_share_bps()
            )
        })
        .and_then(|s| {
            s.parse::<u32>().map_err(|e| warn!("🪛️ Invalid configuration value for DPG_SELLER_SHARE_BPS. {e}"))
        })
        .and_then(|bps| {
            FeeSplit::new(bps).map_err(|e| warn!("🪛️ Invalid configuration value for DPG_SELLER_SHARE_BPS. {e}"))
        })
        .ok()
        .unwrap_or_default()
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign and verify the HS256 JWTs issued by the storefront.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this, since every token will be invalidated on restart. Set DPG_JWT_SECRET instead. \
             🚨️🚨️🚨️"
        );
        let secret = format!("{:032x}{:032x}", rand::random::<u128>(), rand::random::<u128>());
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("DPG_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [DPG_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "DPG_JWT_SECRET must be at least 32 characters long.".to_string(),
            ));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}
