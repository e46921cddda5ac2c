use anyhow::anyhow;

use crate::api::order::{self, CaptureResponse, ErrorDetail, OrderResponse, Reply, Transaction};

#[derive(Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Funding instrument rejected; the buyer can pick another one.
    Restart,
    Failed(String),
    Completed(String),
}

pub fn classify(reply: &Reply<CaptureResponse>, has_card: bool, can_restart: bool) -> CaptureOutcome {
    let transaction = reply.body.transaction();
    let detail = reply.body.error_detail();

    if let Some(detail) = detail
        && detail.issue == ErrorDetail::INSTRUMENT_DECLINED
        && !has_card
        && can_restart
    {
        return CaptureOutcome::Restart;
    }

    match (transaction, detail) {
        (Some(tx), None) if tx.status != Transaction::DECLINED => CaptureOutcome::Completed(tx.summary()),
        (Some(tx), _) => CaptureOutcome::Failed(tx.summary()),
        (None, Some(detail)) => CaptureOutcome::Failed(format!(
            "{} ({})",
            detail.description,
            order::debug_id(&reply.body.debug_id)
        )),
        (None, None) => CaptureOutcome::Failed(reply.raw.to_string()),
    }
}

/// Error for a creation reply that carries no order id.
pub fn creation_error(reply: &Reply<OrderResponse>) -> anyhow::Error {
    match reply.body.error_detail() {
        Some(detail) => anyhow!(
            "{} {} ({})",
            detail.issue,
            detail.description,
            order::debug_id(&reply.body.debug_id)
        ),
        None => anyhow!("{}", reply.raw),
    }
}
