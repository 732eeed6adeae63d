#[derive(Debug, Clone, PartialEq)]
pub struct CardState {
    pub item_id: String,
    pub is_playing: bool,
}

impl CardState {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            is_playing: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub cards: Vec<CardState>,
    pub hovered: Option<usize>,
    pub selected: usize,
    pub muted: bool,
    pub unlocked: bool,
    pub width: u16,
    pub height: u16,
}

impl UiState {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            cards: items.into_iter().map(CardState::new).collect(),
            ..Default::default()
        }
    }

    pub fn set_playing(&mut self, item_id: &str, is_playing: bool) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.item_id == item_id) {
            card.is_playing = is_playing;
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.cards.is_empty() {
            return;
        }
        let last = self.cards.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }
}
