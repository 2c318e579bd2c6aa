use shared::{
    domain::{CardRegion, ItemId},
    protocol::CardView,
};

/// Regions shown for a card in the given expand state.
pub fn visible_regions(expanded: bool) -> Vec<CardRegion> {
    if expanded {
        CardRegion::ALL.to_vec()
    } else {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardState {
    expanded: bool,
    title_color: String,
    saved_title_color: Option<String>,
}

impl CardState {
    pub fn new(title_color: impl Into<String>) -> Self {
        Self {
            expanded: false,
            title_color: title_color.into(),
            saved_title_color: None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn title_color(&self) -> &str {
        &self.title_color
    }

    /// Flips the expand flag and returns the new value. The title colour in
    /// effect before expanding is restored verbatim on collapse.
    pub fn toggle(&mut self, emphasized_color: &str) -> bool {
        if self.expanded {
            if let Some(saved) = self.saved_title_color.take() {
                self.title_color = saved;
            }
            self.expanded = false;
        } else {
            let previous = std::mem::replace(&mut self.title_color, emphasized_color.to_string());
            self.saved_title_color = Some(previous);
            self.expanded = true;
        }
        self.expanded
    }

    pub fn view(&self, item_id: ItemId) -> CardView {
        CardView {
            item_id,
            expanded: self.expanded,
            title_color: self.title_color.clone(),
            visible_regions: visible_regions(self.expanded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_card_shows_no_regions() {
        assert!(visible_regions(false).is_empty());
        assert_eq!(visible_regions(true).len(), CardRegion::ALL.len());
    }

    #[test]
    fn toggle_round_trip_restores_title_color() {
        let mut card = CardState::new("rgb(10, 20, 30)");
        let before = card.view(ItemId(1));

        assert!(card.toggle("#222"));
        assert_eq!(card.title_color(), "#222");
        assert!(card.view(ItemId(1)).visible_regions.contains(&CardRegion::Answer));

        assert!(!card.toggle("#222"));
        assert_eq!(card.view(ItemId(1)), before);
    }

    #[test]
    fn cards_keep_their_own_saved_colors() {
        let mut red = CardState::new("red");
        let mut blue = CardState::new("blue");

        red.toggle("#222");
        blue.toggle("#222");
        red.toggle("#222");
        blue.toggle("#222");

        assert_eq!(red.title_color(), "red");
        assert_eq!(blue.title_color(), "blue");
    }
}
