/// Sink for the single user-facing result message. Last write wins.
pub trait ResultReporter: Send + Sync {
    fn report(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateOrder,
    CaptureOrder,
}

impl Operation {
    pub fn prefix(self) -> &'static str {
        match self {
            Operation::CreateOrder => "Could not initiate PayPal Checkout...<br><br>",
            Operation::CaptureOrder => "Sorry, your transaction could not be processed...<br><br>",
        }
    }
}

/// Logs `err` and shows it to the user under the operation's prefix.
pub fn report_failure(reporter: &dyn ResultReporter, op: Operation, err: &anyhow::Error) {
    tracing::error!(?op, "{err:#}");

    reporter.report(&format!("{}{err:#}", op.prefix()));
}
