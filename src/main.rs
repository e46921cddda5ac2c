mod api;
mod bridge;
mod config;
mod data;
mod events;
mod page;
mod report;
mod sdk;
mod selector;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    api::OrdersClient, bridge::OrderBridge, config::Config, events::EventLoop, page::Page,
    sdk::HeadlessSdk, selector::Selector,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::parse();

    init_tracing(config.log_json);

    tracing::info!(api_url = %config.api_url, items = config.cart.len(), "starting checkout");

    let page = Page::checkout();

    let orders = OrdersClient::new(&config.api_url, config.timeout())?;
    let bridge = Arc::new(OrderBridge::new(orders, config.cart, Arc::new(page.clone())));

    sdk::register(&HeadlessSdk::new(page.clone()), bridge, &config.payer_name)?;

    let (tx, rx) = flume::unbounded();

    let input = tx.clone();
    tokio::spawn(async move {
        if let Err(err) = events::read_stdin(input).await {
            tracing::error!(?err, "stdin");
        }
    });

    EventLoop::new(page, Selector::new(config.default_method), tx, rx)
        .run()
        .await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
