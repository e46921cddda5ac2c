use std::{collections::HashMap, str::FromStr, sync::Arc};

use anyhow::{Result, anyhow};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinSet,
};

use crate::{
    bridge::{ApproveData, OrderActions},
    data::FundingSource,
    page::Page,
    sdk::Widget,
    selector::Selector,
};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// `change` on the payment option radio group.
    Select(String),
    Click(FundingSource),
    Approve { order_id: String, card: bool },
    Show,
    Quit,
}

impl FromStr for UiEvent {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();

        let event = match (words.next(), words.next(), words.next()) {
            (Some("select"), Some(tag), None) => UiEvent::Select(tag.to_string()),
            (Some("click"), Some(funding), None) => UiEvent::Click(funding.parse()?),
            (Some("approve"), Some(order_id), card) => UiEvent::Approve {
                order_id: order_id.to_string(),
                card: match card {
                    None => false,
                    Some("card") => true,
                    Some(other) => return Err(anyhow!("unexpected approve argument {other:?}")),
                },
            },
            (Some("show"), None, None) => UiEvent::Show,
            (Some("quit" | "exit"), None, None) => UiEvent::Quit,
            _ => return Err(anyhow!("unrecognized input {line:?}")),
        };

        if words.next().is_some() {
            return Err(anyhow!("unrecognized input {line:?}"));
        }

        Ok(event)
    }
}

pub type Sender = flume::Sender<UiEvent>;
pub type Receiver = flume::Receiver<UiEvent>;

/// Feeds stdin lines into the event channel until EOF.
pub async fn read_stdin(tx: Sender) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match line.parse() {
            Ok(event) => tx.send_async(event).await?,
            Err(err) => tracing::warn!(%err, "stdin"),
        }
    }

    tx.send_async(UiEvent::Quit).await?;

    Ok(())
}

/// Restarts the flow on the button that created the order.
struct ButtonActions {
    tx: Sender,
    funding_source: FundingSource,
}

impl OrderActions for ButtonActions {
    fn restart(&self) {
        if let Err(err) = self.tx.send(UiEvent::Click(self.funding_source)) {
            tracing::error!(?err, "restart");
        }
    }
}

/// Orders created by a button and awaiting provider approval.
type Pending = Arc<Mutex<HashMap<String, FundingSource>>>;

/// A new order on a button abandons the one it created before.
fn remember(pending: &Pending, order_id: String, funding: FundingSource) {
    let mut pending = pending.lock();

    pending.retain(|_, f| *f != funding);
    pending.insert(order_id, funding);
}

pub struct EventLoop {
    page: Page,
    selector: Selector,
    tx: Sender,
    rx: Receiver,
    pending: Pending,
    tasks: JoinSet<()>,
}

impl EventLoop {
    pub fn new(page: Page, selector: Selector, tx: Sender, rx: Receiver) -> Self {
        EventLoop {
            page,
            selector,
            tx,
            rx,
            pending: Pending::default(),
            tasks: JoinSet::new(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn run(mut self) -> Result<()> {
        tracing::info!("event loop started");

        self.selector.apply(&self.page)?;
        print!("{}", self.page.render());

        while let Ok(event) = self.rx.recv_async().await {
            tracing::debug!(?event, "ui_event");

            while let Some(res) = self.tasks.try_join_next() {
                log_task(res);
            }

            match event {
                UiEvent::Select(tag) => {
                    if self.selector.select(&tag).is_some() {
                        self.selector.apply(&self.page)?;
                        tracing::debug!(active = %self.selector.active(), "selection");
                    }
                }
                UiEvent::Click(funding) => self.click(funding),
                UiEvent::Approve { order_id, card } => self.approve(order_id, card),
                UiEvent::Show => print!("{}", self.page.render()),
                UiEvent::Quit => break,
            }
        }

        tracing::info!(in_flight = self.tasks.len(), "event loop stopping");

        while let Some(res) = self.tasks.join_next().await {
            log_task(res);
        }

        tracing::info!("event loop stopped");

        Ok(())
    }

    fn click(&mut self, funding: FundingSource) {
        let container = funding.button_container();

        if !self.page.is_visible(&container) {
            tracing::warn!(%funding, "button is hidden");
            return;
        }

        let Some(Widget::Button { hooks, .. }) = self.page.widget(&container) else {
            tracing::warn!(%funding, "no button rendered");
            return;
        };

        let pending = self.pending.clone();

        self.tasks.spawn(async move {
            if let Some(order_id) = hooks.create_order().await {
                println!("order {order_id} created, approve with: approve {order_id}");
                remember(&pending, order_id, funding);
            }
        });
    }

    fn approve(&mut self, order_id: String, card: bool) {
        let Some(funding) = self.pending.lock().remove(&order_id) else {
            tracing::warn!(%order_id, "unknown order");
            return;
        };

        let Some(Widget::Button { hooks, .. }) = self.page.widget(&funding.button_container()) else {
            tracing::warn!(%funding, "no button rendered");
            return;
        };

        let data = ApproveData {
            order_id,
            card: card.then(|| Value::Object(Default::default())),
        };

        let actions = ButtonActions {
            tx: self.tx.clone(),
            funding_source: funding,
        };

        self.tasks.spawn(async move {
            hooks.on_approve(&data, Some(&actions)).await;
        });
    }
}

fn log_task(res: Result<(), tokio::task::JoinError>) {
    if let Err(err) = res {
        tracing::error!(?err, "checkout_task");
    }
}
