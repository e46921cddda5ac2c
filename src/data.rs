use std::{fmt, num::NonZeroU32, str::FromStr};

use anyhow::{Context, Result, anyhow};

/// Name of the radio group whose `change` events drive the selector.
pub const PAYMENT_OPTION_INPUT: &str = "payment-option";

pub const RESULT_MESSAGE: &str = "#result-message";
pub const GIROPAY_PAYFIELD: &str = "#giropay-payfield-container";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundingSource {
    Paypal,
    Paylater,
    Giropay,
    Card,
}

impl FundingSource {
    /// Registration order of the rendered buttons and marks.
    pub const ALL: [FundingSource; 4] = [
        FundingSource::Paypal,
        FundingSource::Paylater,
        FundingSource::Giropay,
        FundingSource::Card,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FundingSource::Paypal => "paypal",
            FundingSource::Paylater => "paylater",
            FundingSource::Giropay => "giropay",
            FundingSource::Card => "card",
        }
    }

    pub fn button_container(self) -> String {
        format!("#{}-button-container", self.as_str())
    }

    pub fn mark(self) -> String {
        format!("#{}-mark", self.as_str())
    }

    /// Elements toggled together when this method is the active selection.
    pub fn region(self) -> Vec<String> {
        match self {
            FundingSource::Giropay => vec![self.button_container(), GIROPAY_PAYFIELD.to_string()],
            _ => vec![self.button_container()],
        }
    }
}

impl fmt::Display for FundingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundingSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        FundingSource::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("unknown funding source {s:?}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CartItem {
    pub id: String,
    #[serde(serialize_with = "quantity_as_string")]
    pub quantity: NonZeroU32,
}

fn quantity_as_string<S: serde::Serializer>(q: &NonZeroU32, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(q)
}

impl FromStr for CartItem {
    type Err = anyhow::Error;

    /// Parses `<product-id>:<quantity>`.
    fn from_str(s: &str) -> Result<Self> {
        let (id, quantity) = s
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("cart item {s:?} is not <id>:<quantity>"))?;

        let id = id.trim();
        if id.is_empty() {
            return Err(anyhow!("cart item {s:?} has an empty product id"));
        }

        let quantity = quantity
            .trim()
            .parse()
            .with_context(|| format!("cart item {s:?} needs a positive integer quantity"))?;

        Ok(CartItem {
            id: id.to_string(),
            quantity,
        })
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CreateOrderRequest<'a> {
    pub cart: &'a [CartItem],
}
