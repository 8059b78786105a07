//! The terminal application: event loop, input wiring and drawing.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use cardfield_config::AppConfig;
use cardfield_field::{Simulator, raster};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    DefaultTerminal, Frame,
    layout::Rect,
    style::Stylize,
    text::Line,
};

use crate::manifest::{AssetEvent, ManifestMonitor};

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// Physics and fades are frozen.
    paused: bool,
    /// The exit animation is playing.
    quitting: bool,
    config: AppConfig,
    simulator: Simulator,
    monitor: ManifestMonitor,
    /// Asset updates from the manifest worker, once started.
    assets_rx: Option<Receiver<AssetEvent>>,
    last_tick: Instant,
    /// Elapsed time not yet passed to the field, always under a millisecond.
    carry: Duration,
    /// Terminal size in cells.
    columns: u16,
    rows: u16,
}

impl App {
    /// Construct a new instance of [`App`] for a terminal of the given size.
    pub fn new(config: AppConfig, columns: u16, rows: u16) -> Self {
        let (width, height) = config.cell.field_size(columns, rows);
        let simulator = Simulator::new(config.field.clone(), width, height);
        let monitor = ManifestMonitor::new(config.manifest.clone(), config.field.card_images.clone());

        Self {
            running: false,
            paused: false,
            quitting: false,
            config,
            simulator,
            monitor,
            assets_rx: None,
            last_tick: Instant::now(),
            carry: Duration::ZERO,
            columns,
            rows,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.assets_rx = self.monitor.start();
        self.running = true;
        self.last_tick = Instant::now();

        let frame_time = Duration::from_secs(1) / self.config.frame_rate.max(1);

        while self.running && self.simulator.is_active() {
            let deadline = Instant::now() + frame_time;

            self.receive_assets();
            let now = Instant::now();
            self.step(now.duration_since(self.last_tick));
            self.last_tick = now;
            terminal.draw(|frame| self.render(frame))?;

            self.handle_crossterm_events(deadline)?;
        }

        self.simulator.teardown();
        self.monitor.stop();
        tracing::debug!("Leaving main loop");
        Ok(())
    }

    /// Advance the field by one frame that took `elapsed`.
    fn step(&mut self, elapsed: Duration) {
        if self.paused {
            self.carry = Duration::ZERO;
        } else {
            let pending = self.carry + elapsed;
            let delta_ms = u64::try_from(pending.as_millis()).unwrap_or(u64::MAX);
            self.carry = pending.saturating_sub(Duration::from_millis(delta_ms));
            self.simulator.tick(delta_ms);
        }
        if self.quitting && self.simulator.fly_off_finished() {
            self.quit();
        }
    }

    /// Drain asset updates from the manifest worker.
    fn receive_assets(&mut self) {
        let Some(rx) = self.assets_rx.as_ref() else {
            return;
        };

        let mut events = Vec::new();
        let disconnected = loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };
        if disconnected {
            self.assets_rx = None;
        }

        for event in events {
            self.on_asset_event(event);
        }
    }

    fn on_asset_event(&mut self, event: AssetEvent) {
        match event {
            AssetEvent::Resolved { assets, .. } => {
                if !self.simulator.is_initialized() {
                    self.simulator.seed(assets);
                }
            }
            AssetEvent::Appended(assets) => self.simulator.append_assets(assets),
        }
    }

    /// Renders the user interface.
    fn render(&self, frame: &mut Frame) {
        raster::render(frame, &self.simulator, self.config.cell);

        let area = frame.area();
        if area.height == 0 {
            return;
        }

        let status = if !self.simulator.is_initialized() {
            "loading cards…".dark_gray()
        } else if self.paused {
            "paused".dark_gray()
        } else {
            "".into()
        };
        let help = Line::from(vec![
            "q".bold(),
            " quit  ".dark_gray(),
            "x".bold(),
            " remove a card  ".dark_gray(),
            "click".bold(),
            " remove  ".dark_gray(),
            "p".bold(),
            " pause  ".dark_gray(),
            status,
        ])
        .centered();
        let help_area = Rect::new(area.x, area.bottom() - 1, area.width, 1);
        frame.render_widget(help, help_area);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Handles everything that arrives until `deadline`, when the next frame is due.
    fn handle_crossterm_events(&mut self, deadline: Instant) -> color_eyre::Result<()> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !event::poll(remaining)? {
                return Ok(());
            }
            self.on_event(event::read()?);
            if !self.running {
                return Ok(());
            }
        }
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
            Event::Mouse(mouse) => self.on_mouse_event(mouse),
            Event::FocusLost => self.simulator.clear_cursor(),
            Event::Resize(columns, rows) => {
                self.columns = columns;
                self.rows = rows;
                let (width, height) = self.config.cell.field_size(columns, rows);
                self.simulator.resize(width, height);
            }
            _ => {}
        }
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => {
                self.begin_exit()
            }
            (_, KeyCode::Char('x')) => {
                self.simulator.remove_random();
            }
            (_, KeyCode::Char('p')) => self.paused = !self.paused,
            _ => {}
        }
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        // Terminals rarely report the pointer leaving. Some send positions past the
        // last cell instead, so treat those like focus loss.
        if mouse.column >= self.columns || mouse.row >= self.rows {
            self.simulator.clear_cursor();
            return;
        }

        let (x, y) = self.config.cell.cell_center(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.simulator.set_cursor(x, y),
            MouseEventKind::Down(MouseButton::Left) => {
                self.simulator.set_cursor(x, y);
                self.simulator.remove_at(x, y);
            }
            _ => {}
        }
    }

    /// Play the exit animation, or quit straight away if it's already playing.
    fn begin_exit(&mut self) {
        if self.quitting || !self.simulator.is_initialized() {
            self.quit();
            return;
        }
        self.quitting = true;
        self.paused = false;
        self.simulator.fly_off();
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use cardfield_core::{AssetSource, placeholder_assets};
    use cardfield_field::FLY_OFF_FADE_MS;
    use crossterm::event::KeyEventState;

    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn app() -> App {
        let mut config = AppConfig::default();
        config.field.particle_count = Some(5);
        let mut app = App::new(config, 80, 24);
        app.running = true;
        app
    }

    fn seeded() -> App {
        let mut app = app();
        app.on_asset_event(AssetEvent::Resolved {
            assets: placeholder_assets(),
            source: AssetSource::Placeholders,
        });
        app
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_seeds_once_from_resolved_assets() {
        let mut app = seeded();
        assert_eq!(app.simulator.len(), 5);

        app.on_asset_event(AssetEvent::Resolved {
            assets: placeholder_assets(),
            source: AssetSource::Placeholders,
        });
        assert_eq!(app.simulator.len(), 5);

        app.on_asset_event(AssetEvent::Appended(placeholder_assets()));
        assert_eq!(app.simulator.assets().len(), 12);
    }

    #[test]
    fn test_mouse_tracks_cursor_in_field_units() {
        let mut app = seeded();
        app.on_event(mouse(MouseEventKind::Moved, 10, 5));
        assert_eq!(app.simulator.cursor().to_array(), [84.0, 88.0]);

        app.on_event(Event::FocusLost);
        assert_eq!(app.simulator.cursor(), cardfield_field::CURSOR_ABSENT);
    }

    #[test]
    fn test_mouse_past_the_grid_clears_cursor() {
        let mut app = seeded();
        app.on_event(mouse(MouseEventKind::Moved, 79, 23));
        assert_eq!(app.simulator.cursor().to_array(), [636.0, 376.0]);

        app.on_event(mouse(MouseEventKind::Moved, 80, 10));
        assert_eq!(app.simulator.cursor(), cardfield_field::CURSOR_ABSENT);

        app.on_event(Event::Resize(40, 10));
        app.on_event(mouse(MouseEventKind::Moved, 50, 5));
        assert_eq!(app.simulator.cursor(), cardfield_field::CURSOR_ABSENT);
    }

    fn removing(app: &App) -> usize {
        app.simulator.bodies().iter().filter(|b| b.is_removing()).count()
    }

    #[test]
    fn test_sub_millisecond_steps_still_finish_removals() {
        let mut app = seeded();
        app.simulator.remove_random().unwrap();

        // 800ms in half-millisecond steps.
        for _ in 0..1600 {
            app.step(Duration::from_micros(500));
        }
        assert_eq!(removing(&app), 0);
        assert_eq!(app.simulator.len(), 5);
    }

    #[test]
    fn test_fractional_frame_time_is_kept() {
        let mut app = seeded();
        app.simulator.remove_random().unwrap();

        // 30 frames of 16.667ms add up to just over the 500ms removal fade.
        for _ in 0..29 {
            app.step(FRAME);
        }
        assert_eq!(removing(&app), 1);
        app.step(FRAME);
        assert_eq!(removing(&app), 0);
        assert_eq!(app.simulator.len(), 5);
    }

    #[test]
    fn test_resize_updates_field() {
        let mut app = seeded();
        app.on_event(Event::Resize(40, 10));
        assert_eq!(app.simulator.bounds().to_array(), [320.0, 160.0]);
        for body in app.simulator.bodies() {
            assert!(body.position.x <= (320.0 - body.size().x).max(0.0));
            assert!(body.position.y <= (160.0 - body.size().y).max(0.0));
        }
    }

    #[test]
    fn test_remove_key_keeps_population() {
        let mut app = seeded();
        app.on_event(key(KeyCode::Char('x')));
        assert_eq!(app.simulator.bodies().iter().filter(|b| b.is_removing()).count(), 1);

        app.simulator.tick(cardfield_field::REMOVAL_FADE_MS);
        assert_eq!(app.simulator.len(), 5);
        assert!(app.simulator.bodies().iter().all(|b| !b.is_removing()));
    }

    #[test]
    fn test_quit_plays_exit_animation_first() {
        let mut app = seeded();
        app.on_event(key(KeyCode::Char('q')));
        assert!(app.running);
        assert!(app.quitting);

        app.simulator.tick(FLY_OFF_FADE_MS);
        app.step(FRAME);
        assert!(!app.running);
    }

    #[test]
    fn test_second_quit_is_immediate() {
        let mut app = seeded();
        app.on_event(key(KeyCode::Esc));
        app.on_event(key(KeyCode::Esc));
        assert!(!app.running);
    }

    #[test]
    fn test_quit_before_assets_is_immediate() {
        let mut app = app();
        app.on_event(key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_pause_freezes_field() {
        let mut app = seeded();
        app.on_event(key(KeyCode::Char('p')));
        let before: Vec<_> = app.simulator.bodies().iter().map(|b| b.position).collect();
        app.step(FRAME);
        let after: Vec<_> = app.simulator.bodies().iter().map(|b| b.position).collect();
        assert_eq!(before, after);
    }
}
