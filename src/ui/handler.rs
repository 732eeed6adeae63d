use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::{
    event::events::Event,
    ui::{
        app::App,
        layout::AppLayout,
        state::UiState,
        tui::{TerminalEvent, Tui},
    },
};

/// What a single input asks the app to do, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Unlock,
    Hover(Option<usize>),
    Select(usize),
    MoveSelection(isize),
    Activate(usize),
    Deactivate(usize),
    ToggleMute,
}

/// Clicks play a card only on terminals at most `breakpoint` columns wide.
pub fn is_tap_mode(width: u16, breakpoint: u16) -> bool {
    width <= breakpoint
}

pub fn key_actions(state: &UiState, evt: KeyEvent) -> Vec<Action> {
    if evt.kind != KeyEventKind::Press {
        return Vec::new();
    }

    match evt.code {
        KeyCode::Char('c') if evt.modifiers == KeyModifiers::CONTROL => return vec![Action::Quit],
        KeyCode::Char('q') => return vec![Action::Quit],
        _ => {}
    }

    let action = match evt.code {
        KeyCode::Char('m') => Some(Action::ToggleMute),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
            Some(Action::MoveSelection(-1))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
            Some(Action::MoveSelection(1))
        }
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Activate(state.selected)),
        KeyCode::Esc => Some(Action::Deactivate(state.selected)),
        _ => None,
    };

    // Any key counts as the unlocking interaction.
    std::iter::once(Action::Unlock).chain(action).collect()
}

pub fn mouse_actions(
    state: &UiState,
    layout: &AppLayout,
    tap_breakpoint: u16,
    evt: MouseEvent,
) -> Vec<Action> {
    let target = layout.card_at(evt.column, evt.row);

    match evt.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            if target == state.hovered {
                return Vec::new();
            }
            let mut actions = Vec::new();
            if let Some(left) = state.hovered {
                actions.push(Action::Deactivate(left));
            }
            actions.push(Action::Hover(target));
            if let Some(entered) = target {
                actions.extend([Action::Select(entered), Action::Activate(entered)]);
            }
            actions
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let mut actions = vec![Action::Unlock];
            if layout.is_on_mute(evt.column, evt.row) {
                actions.push(Action::ToggleMute);
            } else if let Some(index) = target {
                actions.push(Action::Select(index));
                if is_tap_mode(state.width, tap_breakpoint) {
                    actions.push(Action::Activate(index));
                }
            }
            actions
        }
        _ => Vec::new(),
    }
}

pub struct EventHandler;

impl EventHandler {
    pub async fn handle_events(app: &mut App, tui: &mut Tui) -> color_eyre::Result<()> {
        if let Some(evt) = tui.next().await {
            Self::handle_event(app, evt, tui).await?;
        }

        while let Ok(evt) = app.event_rx.try_recv() {
            Self::handle_app_event(app, evt);
        }

        Ok(())
    }

    pub async fn handle_event(
        app: &mut App,
        evt: TerminalEvent,
        tui: &mut Tui,
    ) -> color_eyre::Result<()> {
        let actions = match evt {
            TerminalEvent::Init => Vec::new(),
            TerminalEvent::Quit => vec![Action::Quit],
            TerminalEvent::FocusGained => {
                app.has_focus = true;
                tui.clear()?;
                Vec::new()
            }
            TerminalEvent::FocusLost => {
                app.has_focus = false;
                Vec::new()
            }
            TerminalEvent::Resize(width, height) => {
                app.resize(width, height);
                Vec::new()
            }
            TerminalEvent::Tick => {
                app.tick();
                Vec::new()
            }
            TerminalEvent::Key(key) => key_actions(&app.state, key),
            TerminalEvent::Mouse(mouse) => {
                mouse_actions(&app.state, &app.layout(), app.settings.tap_breakpoint, mouse)
            }
        };

        for action in actions {
            app.apply(action).await;
        }
        Ok(())
    }

    pub fn handle_app_event(app: &mut App, evt: Event) {
        match evt {
            Event::PlaybackStarted(item_id) => app.state.set_playing(&item_id, true),
            Event::PlaybackStopped(item_id) => app.state.set_playing(&item_id, false),
            Event::AudioUnlocked => app.state.unlocked = true,
            Event::MuteChanged(muted) => app.state.muted = muted,
        }
    }
}
