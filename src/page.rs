use std::{collections::BTreeMap, fmt::Write, sync::Arc};

use anyhow::{Result, anyhow};
use parking_lot::Mutex;

use crate::{
    data::{FundingSource, GIROPAY_PAYFIELD, PAYMENT_OPTION_INPUT, RESULT_MESSAGE},
    report::ResultReporter,
    sdk::Widget,
};

/// In-memory checkout document: toggled regions, mounted widgets and the result message.
#[derive(Clone)]
pub struct Page {
    doc: Arc<Mutex<Document>>,
}

#[derive(Default)]
struct Document {
    elements: BTreeMap<String, Element>,
    selected: Option<FundingSource>,
    result: String,
}

struct Element {
    visible: bool,
    widget: Option<Widget>,
}

impl Page {
    /// Builds the fixed checkout layout with every element visible.
    pub fn checkout() -> Self {
        let ids = FundingSource::ALL
            .into_iter()
            .flat_map(|f| [f.button_container(), f.mark()])
            .chain([GIROPAY_PAYFIELD.to_string(), RESULT_MESSAGE.to_string()]);

        let elements = ids
            .map(|id| {
                let element = Element {
                    visible: true,
                    widget: None,
                };
                (id, element)
            })
            .collect();

        Page {
            doc: Arc::new(Mutex::new(Document {
                elements,
                ..Default::default()
            })),
        }
    }

    pub fn set_visible(&self, id: &str, visible: bool) -> Result<()> {
        let mut doc = self.doc.lock();
        let element = doc
            .elements
            .get_mut(id)
            .ok_or_else(|| anyhow!("no element {id}"))?;

        element.visible = visible;

        Ok(())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.doc.lock().elements.get(id).is_some_and(|e| e.visible)
    }

    pub fn set_selected(&self, funding: FundingSource) {
        self.doc.lock().selected = Some(funding);
    }

    /// Mounts `widget` into the element matching `selector`, replacing any previous one.
    pub fn mount(&self, selector: &str, widget: Widget) -> Result<()> {
        let mut doc = self.doc.lock();
        let element = doc
            .elements
            .get_mut(selector)
            .ok_or_else(|| anyhow!("render target {selector} not found"))?;

        element.widget = Some(widget);

        Ok(())
    }

    pub fn widget(&self, selector: &str) -> Option<Widget> {
        self.doc.lock().elements.get(selector)?.widget.clone()
    }

    /// Text rendering of the visible page.
    pub fn render(&self) -> String {
        let doc = self.doc.lock();
        let mut out = String::new();

        let _ = write!(out, "[{PAYMENT_OPTION_INPUT}]");
        for f in FundingSource::ALL {
            let mark = if doc.selected == Some(f) { "(*)" } else { "( )" };
            let _ = write!(out, " {mark} {f}");
        }
        out.push('\n');

        for (id, element) in doc.elements.iter().filter(|(_, e)| e.visible) {
            if let Some(widget) = &element.widget {
                let _ = writeln!(out, "{id}: {widget}");
            }
        }

        if !doc.result.is_empty() {
            let _ = writeln!(out, "{RESULT_MESSAGE}: {}", doc.result.replace("<br>", "\n"));
        }

        out
    }
}

#[cfg(test)]
impl Page {
    pub fn widgets(&self) -> Vec<(String, Widget)> {
        let doc = self.doc.lock();

        doc.elements
            .iter()
            .filter_map(|(id, e)| Some((id.clone(), e.widget.clone()?)))
            .collect()
    }

    pub fn result_message(&self) -> String {
        self.doc.lock().result.clone()
    }
}

impl ResultReporter for Page {
    fn report(&self, message: &str) {
        {
            let mut doc = self.doc.lock();
            message.clone_into(&mut doc.result);
        }

        println!("{}", message.replace("<br>", "\n"));
    }
}
