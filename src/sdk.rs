use std::{fmt, sync::Arc};

use anyhow::Result;

use crate::{
    bridge::OrderBridge,
    data::{FundingSource, GIROPAY_PAYFIELD},
    page::Page,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonColor {
    Gold,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonStyle {
    pub color: Option<ButtonColor>,
}

pub struct ButtonOptions {
    pub funding_source: FundingSource,
    pub style: ButtonStyle,
    /// `createOrder` and `onApprove` hooks.
    pub hooks: Arc<OrderBridge>,
}

pub struct MarkOptions {
    pub funding_source: FundingSource,
}

pub struct PaymentFieldsOptions {
    pub funding_source: FundingSource,
    /// Prefilled payer name.
    pub name: Option<String>,
}

/// A rendered SDK component.
#[derive(Clone)]
pub enum Widget {
    Button {
        funding_source: FundingSource,
        style: ButtonStyle,
        hooks: Arc<OrderBridge>,
    },
    Mark {
        funding_source: FundingSource,
    },
    PaymentFields {
        funding_source: FundingSource,
        name: Option<String>,
    },
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Widget::Button {
                funding_source,
                style,
                ..
            } => match style.color {
                Some(ButtonColor::Gold) => write!(f, "[{funding_source} button (gold)]"),
                None => write!(f, "[{funding_source} button]"),
            },
            Widget::Mark { funding_source } => write!(f, "<{funding_source} mark>"),
            Widget::PaymentFields {
                funding_source,
                name,
            } => write!(
                f,
                "{{{funding_source} fields, name: {}}}",
                name.as_deref().unwrap_or("")
            ),
        }
    }
}

pub trait Render {
    fn render(self, selector: &str) -> Result<()>;
}

/// Component factories of the provider SDK.
pub trait CheckoutSdk {
    type Component: Render;

    fn buttons(&self, options: ButtonOptions) -> Self::Component;
    fn marks(&self, options: MarkOptions) -> Self::Component;
    fn payment_fields(&self, options: PaymentFieldsOptions) -> Self::Component;
}

/// SDK that renders components into the in-memory [`Page`].
pub struct HeadlessSdk {
    page: Page,
}

impl HeadlessSdk {
    pub fn new(page: Page) -> Self {
        HeadlessSdk { page }
    }
}

pub struct HeadlessComponent {
    page: Page,
    widget: Widget,
}

impl Render for HeadlessComponent {
    fn render(self, selector: &str) -> Result<()> {
        tracing::debug!(selector, widget = %self.widget, "render");

        self.page.mount(selector, self.widget)
    }
}

impl CheckoutSdk for HeadlessSdk {
    type Component = HeadlessComponent;

    fn buttons(&self, options: ButtonOptions) -> HeadlessComponent {
        self.component(Widget::Button {
            funding_source: options.funding_source,
            style: options.style,
            hooks: options.hooks,
        })
    }

    fn marks(&self, options: MarkOptions) -> HeadlessComponent {
        self.component(Widget::Mark {
            funding_source: options.funding_source,
        })
    }

    fn payment_fields(&self, options: PaymentFieldsOptions) -> HeadlessComponent {
        self.component(Widget::PaymentFields {
            funding_source: options.funding_source,
            name: options.name,
        })
    }
}

impl HeadlessSdk {
    fn component(&self, widget: Widget) -> HeadlessComponent {
        HeadlessComponent {
            page: self.page.clone(),
            widget,
        }
    }
}

/// Renders a button and a mark per funding source, plus the giropay payment fields.
#[tracing::instrument(skip_all)]
pub fn register<S: CheckoutSdk>(sdk: &S, hooks: Arc<OrderBridge>, payer_name: &str) -> Result<()> {
    for funding_source in FundingSource::ALL {
        let style = ButtonStyle {
            color: (funding_source == FundingSource::Paylater).then_some(ButtonColor::Gold),
        };

        sdk.buttons(ButtonOptions {
            funding_source,
            style,
            hooks: hooks.clone(),
        })
        .render(&funding_source.button_container())?;

        sdk.marks(MarkOptions { funding_source })
            .render(&funding_source.mark())?;
    }

    sdk.payment_fields(PaymentFieldsOptions {
        funding_source: FundingSource::Giropay,
        name: Some(payer_name.to_string()),
    })
    .render(GIROPAY_PAYFIELD)?;

    tracing::info!("sdk components registered");

    Ok(())
}
