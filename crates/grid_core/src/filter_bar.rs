use shared::domain::{FilterButton, FilterPredicate};

/// Filter button group; at most one button is checked at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBar {
    buttons: Vec<FilterButton>,
    checked: Option<usize>,
}

impl Default for FilterBar {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FilterBar {
    /// A "See All" button is put first when the list does not carry one.
    pub fn new(mut buttons: Vec<FilterButton>) -> Self {
        if !buttons
            .iter()
            .any(|button| button.filter == FilterPredicate::All)
        {
            buttons.insert(0, FilterButton::see_all());
        }
        let checked = buttons
            .iter()
            .position(|button| button.filter == FilterPredicate::All);
        Self { buttons, checked }
    }

    pub fn buttons(&self) -> &[FilterButton] {
        &self.buttons
    }

    pub fn button(&self, index: usize) -> Option<&FilterButton> {
        self.buttons.get(index)
    }

    pub fn checked(&self) -> Option<&FilterButton> {
        self.checked.and_then(|index| self.buttons.get(index))
    }

    /// Checks the button for `filter`; unchecks everything when no button matches.
    pub fn select(&mut self, filter: &FilterPredicate) -> Option<&FilterButton> {
        self.checked = self
            .buttons
            .iter()
            .position(|button| &button.filter == filter);
        self.checked()
    }
}
