use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Body returned by `POST /api/orders`, either an order or an error shape.
#[derive(Debug, Default, serde::Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Vec<ErrorDetail>,
    #[serde(default)]
    pub debug_id: Option<String>,
}

impl OrderResponse {
    /// An empty id is treated the same as a missing one.
    pub fn order_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn error_detail(&self) -> Option<&ErrorDetail> {
        self.details.first()
    }
}

/// Body returned by `POST /api/orders/{id}/capture`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CaptureResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Vec<ErrorDetail>,
    #[serde(default)]
    pub debug_id: Option<String>,
}

impl CaptureResponse {
    /// First capture of the first purchase unit, falling back to its first authorization.
    pub fn transaction(&self) -> Option<&Transaction> {
        let payments = self.purchase_units.first()?.payments.as_ref()?;

        payments
            .captures
            .first()
            .or_else(|| payments.authorizations.first())
    }

    pub fn error_detail(&self) -> Option<&ErrorDetail> {
        self.details.first()
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct PurchaseUnit {
    #[serde(default)]
    pub payments: Option<Payments>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct Payments {
    #[serde(default, deserialize_with = "null_as_default")]
    pub captures: Vec<Transaction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authorizations: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

impl Transaction {
    pub const DECLINED: &'static str = "DECLINED";

    pub fn summary(&self) -> String {
        format!("Transaction {}: {}", self.status, self.id)
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ErrorDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl ErrorDetail {
    pub const INSTRUMENT_DECLINED: &'static str = "INSTRUMENT_DECLINED";
}

/// Typed view of a response body, keeping the raw JSON for messages and logs.
#[derive(Debug)]
pub struct Reply<T> {
    pub body: T,
    pub raw: Value,
}

impl<T: serde::de::DeserializeOwned> Reply<T> {
    pub fn parse(raw: Value) -> anyhow::Result<Self> {
        let body = T::deserialize(&raw)?;

        Ok(Reply { body, raw })
    }
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

pub fn debug_id(id: &Option<String>) -> &str {
    id.as_deref().unwrap_or("n/a")
}
