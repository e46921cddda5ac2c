use anyhow::Result;

use crate::{data::FundingSource, page::Page};

/// Active payment method of the radio group. Exactly one method region is visible.
pub struct Selector {
    active: FundingSource,
}

impl Selector {
    pub fn new(active: FundingSource) -> Self {
        Selector { active }
    }

    pub fn active(&self) -> FundingSource {
        self.active
    }

    /// Handles a radio `change` event. Unknown tags leave the selection untouched.
    pub fn select(&mut self, tag: &str) -> Option<FundingSource> {
        match tag.parse() {
            Ok(funding) => {
                self.active = funding;
                Some(funding)
            }
            Err(err) => {
                tracing::warn!(tag, %err, "ignoring unknown payment option");
                None
            }
        }
    }

    pub fn apply(&self, page: &Page) -> Result<()> {
        page.set_selected(self.active);

        for (id, visible) in visibility(self.active) {
            page.set_visible(&id, visible)?;
        }

        Ok(())
    }
}

/// Visibility of every toggled element for the given active method.
pub fn visibility(active: FundingSource) -> Vec<(String, bool)> {
    FundingSource::ALL
        .into_iter()
        .flat_map(|f| f.region().into_iter().map(move |id| (id, f == active)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_methods(page: &Page) -> Vec<FundingSource> {
        FundingSource::ALL
            .into_iter()
            .filter(|f| f.region().iter().all(|id| page.is_visible(id)))
            .collect()
    }

    #[test]
    fn initial_state_shows_default_only() {
        let page = Page::checkout();
        Selector::new(FundingSource::Paypal).apply(&page).unwrap();

        assert_eq!(visible_methods(&page), vec![FundingSource::Paypal]);
        assert!(!page.is_visible("#giropay-payfield-container"));
    }

    #[test]
    fn each_selection_shows_exactly_its_region() {
        let page = Page::checkout();
        let mut selector = Selector::new(FundingSource::Paypal);

        for funding in FundingSource::ALL {
            assert_eq!(selector.select(funding.as_str()), Some(funding));
            selector.apply(&page).unwrap();

            assert_eq!(visible_methods(&page), vec![funding]);

            for other in FundingSource::ALL.into_iter().filter(|f| *f != funding) {
                assert!(other.region().iter().all(|id| !page.is_visible(id)));
            }
        }
    }

    #[test]
    fn giropay_shows_button_and_payment_fields() {
        let page = Page::checkout();
        let mut selector = Selector::new(FundingSource::Paypal);

        selector.select("giropay");
        selector.apply(&page).unwrap();

        assert!(page.is_visible("#giropay-button-container"));
        assert!(page.is_visible("#giropay-payfield-container"));
    }

    #[test]
    fn unknown_tag_is_a_no_op() {
        let page = Page::checkout();
        let mut selector = Selector::new(FundingSource::Card);
        selector.apply(&page).unwrap();

        assert_eq!(selector.select("bitcoin"), None);
        selector.apply(&page).unwrap();

        assert_eq!(selector.active(), FundingSource::Card);
        assert_eq!(visible_methods(&page), vec![FundingSource::Card]);
    }

    #[test]
    fn mapping_is_idempotent() {
        assert_eq!(visibility(FundingSource::Card), visibility(FundingSource::Card));
        assert_eq!(visibility(FundingSource::Card).iter().filter(|(_, v)| *v).count(), 1);
        assert_eq!(visibility(FundingSource::Giropay).iter().filter(|(_, v)| *v).count(), 2);
    }
}
