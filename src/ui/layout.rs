use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

pub const CARD_WIDTH: u16 = 26;
pub const CARD_HEIGHT: u16 = 6;
const MUTE_WIDTH: u16 = 16;

/// Screen regions shared by rendering and mouse hit-testing.
#[derive(Debug, Clone, PartialEq)]
pub struct AppLayout {
    pub header: Rect,
    pub grid: Rect,
    pub footer: Rect,
    pub cards: Vec<Rect>,
    pub mute: Option<Rect>,
}

impl AppLayout {
    pub fn compute(area: Rect, card_count: usize, mute_control: bool) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(area);

        let (header, grid, footer) = (chunks[0], chunks[1], chunks[2]);

        let mute = mute_control.then(|| {
            Rect::new(
                footer.right().saturating_sub(MUTE_WIDTH),
                footer.y,
                MUTE_WIDTH.min(footer.width),
                footer.height,
            )
        });

        Self {
            header,
            grid,
            footer,
            cards: card_rects(grid, card_count),
            mute,
        }
    }

    pub fn card_at(&self, column: u16, row: u16) -> Option<usize> {
        let position = Position::new(column, row);
        self.cards.iter().position(|rect| rect.contains(position))
    }

    pub fn is_on_mute(&self, column: u16, row: u16) -> bool {
        self.mute
            .is_some_and(|rect| rect.contains(Position::new(column, row)))
    }
}

/// Fills the grid row by row, centred horizontally. Cards that do not fit
/// vertically are left out.
fn card_rects(grid: Rect, count: usize) -> Vec<Rect> {
    if count == 0 || grid.width < CARD_WIDTH || grid.height < CARD_HEIGHT {
        return Vec::new();
    }

    let columns = (grid.width / CARD_WIDTH).max(1) as usize;
    let rows = (grid.height / CARD_HEIGHT) as usize;
    let used_columns = columns.min(count) as u16;
    let x_offset = (grid.width - used_columns * CARD_WIDTH) / 2;

    (0..count.min(columns * rows))
        .map(|i| {
            let column = (i % columns) as u16;
            let row = (i / columns) as u16;
            Rect::new(
                grid.x + x_offset + column * CARD_WIDTH,
                grid.y + row * CARD_HEIGHT,
                CARD_WIDTH,
                CARD_HEIGHT,
            )
        })
        .collect()
}
