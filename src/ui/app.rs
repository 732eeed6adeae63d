use std::sync::Arc;

use flume::{Receiver, Sender};
use ratatui::{Frame, layout::Rect};
use tracing::{debug, info, warn};

use crate::{
    audio::{
        engine::{AudioDevice, RodioBackend},
        loader::ConfigLoader,
        manager::{Activation, ExperienceManager},
    },
    event::events::Event,
    particles::ParticleField,
    settings::Settings,
    ui::{
        components::particles::canvas_size,
        handler::{self, Action, EventHandler},
        layout::AppLayout,
        state::UiState,
        tui,
    },
    util::task::TaskManager,
};

pub struct App {
    pub event_rx: Receiver<Event>,
    pub event_tx: Sender<Event>,
    pub manager: Arc<ExperienceManager>,
    pub settings: Settings,
    pub state: UiState,
    pub particles: Option<ParticleField>,
    pub task_manager: TaskManager,
    pub source: String,
    pub has_focus: bool,
    pub should_quit: bool,
    _device: AudioDevice,
}

impl App {
    pub async fn new(settings: Settings) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = flume::unbounded();
        let source = settings.root.source();
        let description = source.describe();
        let loader = Arc::new(ConfigLoader::new(source));

        let device = AudioDevice::open()?;
        let backend = Arc::new(RodioBackend::new(device.mixer().clone(), loader.clone()));
        let manager = Arc::new(
            ExperienceManager::new(loader.clone(), backend, event_tx.clone())
                .with_switch_fade(settings.switch_fade),
        );

        let items = if settings.items.is_empty() {
            let found = loader.discover().await;
            info!(count = found.len(), root = %description, "Discovered items");
            found
        } else {
            settings.items.clone()
        };
        if items.is_empty() {
            warn!(root = %description, "No items to show");
        }
        if !settings.particles {
            info!("Particle background disabled");
        }
        if !settings.mute_control {
            info!("Mute control disabled");
        }

        Ok(Self {
            event_rx,
            event_tx,
            manager,
            state: UiState::new(items),
            particles: None,
            task_manager: TaskManager::new(),
            source: description,
            settings,
            has_focus: true,
            should_quit: false,
            _device: device,
        })
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = tui::Tui::new()?.mouse(true);
        tui.enter()?;

        let size = tui.size()?;
        self.resize(size.width, size.height);

        EventHandler::handle_event(self, tui::TerminalEvent::Init, &mut tui).await?;
        while !self.should_quit {
            tui.draw(|f| {
                self.ui(f);
            })?;

            EventHandler::handle_events(self, &mut tui).await?;
        }

        self.task_manager.abort_all();
        tui.exit()?;
        Ok(())
    }

    fn ui(&self, frame: &mut Frame) {
        if self.has_focus {
            frame.render_widget(self, frame.area());
        }
    }

    pub fn layout(&self) -> AppLayout {
        AppLayout::compute(
            Rect::new(0, 0, self.state.width, self.state.height),
            self.state.cards.len(),
            self.settings.mute_control,
        )
    }

    pub fn is_tap_mode(&self) -> bool {
        handler::is_tap_mode(self.state.width, self.settings.tap_breakpoint)
    }

    pub async fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Unlock => self.unlock(),
            Action::Hover(target) => self.state.hovered = target,
            Action::Select(index) => self.state.selected = index,
            Action::MoveSelection(delta) => self.state.move_selection(delta),
            Action::Activate(index) => self.activate(index).await,
            Action::Deactivate(index) => self.deactivate(index).await,
            Action::ToggleMute => self.toggle_mute().await,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.state.width = width;
        self.state.height = height;

        if !self.settings.particles {
            return;
        }
        let (w, h) = canvas_size(self.layout().grid);
        match &mut self.particles {
            Some(field) => field.resize(w, h),
            None => self.particles = Some(ParticleField::new(w, h)),
        }
    }

    pub fn tick(&mut self) {
        if let Some(field) = &mut self.particles {
            field.step();
        }
    }

    pub fn unlock(&mut self) {
        if self.manager.unlock() {
            self.state.unlocked = true;
        }
    }

    /// Claims the card right away and leaves loading and playback to a
    /// background task, so later input is handled in order.
    pub async fn activate(&mut self, index: usize) {
        let Some(card) = self.state.cards.get(index) else {
            return;
        };
        let Some(request) = self.manager.request(&card.item_id).await else {
            return;
        };

        let manager = self.manager.clone();
        self.task_manager.spawn(
            "activation",
            tokio::spawn(async move {
                let item_id = request.item_id().to_string();
                match manager.fulfil(request).await {
                    Ok(Activation::Started) => debug!(item_id, "Activation finished"),
                    Ok(outcome) => debug!(item_id, ?outcome, "Activation dropped"),
                    // Already logged where it happened.
                    Err(_) => {}
                }
            }),
        );
    }

    pub async fn deactivate(&mut self, index: usize) {
        if let Some(card) = self.state.cards.get(index) {
            self.manager.deactivate(&card.item_id).await;
        }
    }

    pub async fn toggle_mute(&mut self) {
        self.state.muted = self.manager.toggle_mute().await;
    }
}
