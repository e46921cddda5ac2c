use std::time::Duration;

use clap::Parser;

use crate::data::{CartItem, FundingSource};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless checkout page bridging payment buttons to the order API")]
pub struct Config {
    /// Base URL of the backend serving /api/orders
    #[arg(long, env = "CHECKOUT_API_URL", default_value = "http://localhost:8888")]
    pub api_url: String,

    /// Timeout for each backend call, in milliseconds
    #[arg(long, env = "CHECKOUT_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Cart item as <product-id>:<quantity>, repeatable
    #[arg(
        long = "item",
        env = "CHECKOUT_CART",
        value_delimiter = ',',
        required = true
    )]
    pub cart: Vec<CartItem>,

    /// Name prefilled in the giropay payment fields
    #[arg(long, env = "CHECKOUT_PAYER_NAME", default_value = "John Doe")]
    pub payer_name: String,

    /// Payment option selected when the page loads
    #[arg(long, env = "CHECKOUT_DEFAULT_METHOD", default_value = "paypal")]
    pub default_method: FundingSource,

    /// Emit logs as JSON
    #[arg(long, env = "CHECKOUT_LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
