use crate::command::Command;
use crate::config::Config;
use crate::consts;
use crate::game::{Direction, Game, TickOutcome};
use crate::options::Tuning;
use crate::play::{PlayChoice, PlayScreen};
use crate::scores::{ScoreBackend, ScoreStore};
use crate::startup::{StartupChoice, StartupScreen};
use crate::tracker::feed::FrameFeed;
use crate::tracker::HeadSteering;
use crate::util::get_display_area;
use crate::warning::{Warning, WarningOutcome};
use crossterm::event::{poll, read, Event};
use ratatui::{backend::Backend, text::Line, Frame, Terminal};
use std::io;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("no tracker feed is configured; steering works from the keyboard only")]
struct NoFeedError;

#[derive(Debug)]
pub(crate) struct App {
    screen: Screen,
    config: Config,
    tuning: Tuning,
    filter: HeadSteering,
    feed: Option<FrameFeed>,
    /// Latest filtered direction; overwritten by every processed sample
    /// and read once per tick.
    steer: Option<Direction>,
    scores: ScoreStore<Box<dyn ScoreBackend>>,
    warning: Option<Warning>,
}

/// Screen-level follow-up work that needs `&mut App`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum UiAction {
    StartGame,
    Calibrate,
    ToMenu,
    Quit,
}

impl App {
    pub(crate) fn new(config: Config) -> App {
        let tuning = Tuning::from_config(&config.tracker);
        let mut filter = HeadSteering::new();
        tuning.apply(&mut filter);
        let scores = ScoreStore::open(config.files.scores_file.clone());
        let (feed, warning) = match &config.tracker.feed {
            None => (None, None),
            Some(path) => match FrameFeed::open(path) {
                Ok(feed) => (Some(feed), None),
                // The game stays playable from the keyboard.
                Err(e) => (None, Some(Warning::new(&e))),
            },
        };
        let screen = Screen::Main(StartupScreen::new(
            tuning,
            scores.high_score(),
            &scores.history(),
        ));
        App {
            screen,
            config,
            tuning,
            filter,
            feed,
            steer: None,
            scores,
            warning,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.pump()?;
        }
        if let Some(feed) = &self.feed {
            feed.stop();
        }
        Ok(())
    }

    fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| {
            match &self.screen {
                Screen::Main(menu) => {
                    menu.draw(frame);
                    self.draw_tracker_status(frame);
                }
                Screen::Play(play) => play.draw(frame),
                Screen::Quit => (),
            }
            if let Some(warning) = &self.warning {
                frame.render_widget(warning, frame.area());
            }
        })?;
        Ok(())
    }

    fn draw_tracker_status(&self, frame: &mut Frame<'_>) {
        let display = get_display_area(frame.area());
        let row = ratatui::layout::Rect {
            y: display.y + display.height - 1,
            height: 1,
            ..display
        };
        frame.render_widget(
            Line::styled(self.tracker_status(), consts::TRACKER_STATUS_STYLE).centered(),
            row,
        );
    }

    fn tracker_status(&self) -> &'static str {
        if self.feed.is_none() {
            "Head steering: off (keyboard only)"
        } else if self.filter.is_calibrating() {
            "Head steering: calibrating — hold still"
        } else if !self.filter.has_neutral() {
            "Head steering: waiting for a steady face"
        } else {
            "Head steering: ready"
        }
    }

    /// One iteration of the event loop: wait briefly for a key, then drain
    /// tracker frames, settle calibration, and fire a due tick.
    fn pump(&mut self) -> io::Result<()> {
        let now = Instant::now();
        let wait = self.next_tick().map_or(consts::PUMP_INTERVAL, |when| {
            when.saturating_duration_since(now).min(consts::PUMP_INTERVAL)
        });
        if poll(wait)? {
            self.handle_event(read()?);
        }
        let now = Instant::now();
        self.drain_frames(now);
        self.check_calibration(now);
        self.fire_tick(now);
        Ok(())
    }

    fn next_tick(&self) -> Option<Instant> {
        match &self.screen {
            Screen::Play(play) => play.next_tick(),
            Screen::Main(_) | Screen::Quit => None,
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::FocusLost => self.filter.set_visible(false),
            Event::FocusGained => self.filter.set_visible(true),
            _ => {
                if let Some(cmd) = event.as_key_press_event().and_then(Command::from_key_event) {
                    self.handle_command(cmd);
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: Command) {
        let now = Instant::now();
        if let Some(warning) = &mut self.warning {
            match warning.handle_command(cmd) {
                Some(WarningOutcome::Dismissed) => self.warning = None,
                Some(WarningOutcome::Quit) => self.screen = Screen::Quit,
                None => (),
            }
            return;
        }
        let action = match &mut self.screen {
            Screen::Main(menu) => menu.handle_command(cmd).map(|choice| match choice {
                StartupChoice::Play => UiAction::StartGame,
                StartupChoice::Calibrate => UiAction::Calibrate,
                StartupChoice::Quit => UiAction::Quit,
            }),
            Screen::Play(play) => play.handle_command(cmd, now).map(|choice| match choice {
                PlayChoice::ToMenu => UiAction::ToMenu,
                PlayChoice::Calibrate => UiAction::Calibrate,
                PlayChoice::Quit => UiAction::Quit,
            }),
            Screen::Quit => None,
        };
        // Menu interaction may have changed the tunables; they take effect
        // immediately.
        if let Screen::Main(menu) = &self.screen {
            let tuning = menu.tuning();
            if tuning != self.tuning {
                self.tuning = tuning;
                self.tuning.apply(&mut self.filter);
            }
        }
        match action {
            Some(UiAction::StartGame) => self.start_game(now),
            Some(UiAction::Calibrate) => self.calibrate(now),
            Some(UiAction::ToMenu) => self.to_menu(),
            Some(UiAction::Quit) => self.screen = Screen::Quit,
            None => (),
        }
    }

    fn start_game(&mut self, now: Instant) {
        let game = Game::new(self.config.game.grid_size, self.config.game.tick_period());
        let mut play = PlayScreen::new(game, self.config.theme.clone(), self.scores.high_score());
        play.start(now);
        self.steer = None;
        self.screen = Screen::Play(play);
    }

    fn to_menu(&mut self) {
        self.screen = Screen::Main(StartupScreen::new(
            self.tuning,
            self.scores.high_score(),
            &self.scores.history(),
        ));
    }

    fn calibrate(&mut self, now: Instant) {
        if self.feed.is_some() {
            self.filter.begin_calibration(now);
        } else {
            self.warning = Some(Warning::new(&NoFeedError));
        }
    }

    fn drain_frames(&mut self, now: Instant) {
        let Some(feed) = &self.feed else {
            return;
        };
        for frame in feed.drain() {
            if let Some(reading) = self.filter.handle_frame(frame, now) {
                self.steer = reading.direction();
            }
        }
    }

    fn check_calibration(&mut self, now: Instant) {
        if let Some(Err(e)) = self.filter.poll_calibration(now) {
            self.warning = Some(Warning::new(&e));
        }
    }

    fn fire_tick(&mut self, now: Instant) {
        let steer = self.steer;
        let Screen::Play(play) = &mut self.screen else {
            return;
        };
        let Some(outcome) = play.poll_tick(now, steer) else {
            return;
        };
        if let TickOutcome::GameOver { score } | TickOutcome::Won { score } = outcome {
            let mut new_record = false;
            if self.config.files.save_scores {
                if let Err(e) = self.scores.push_history(score) {
                    self.warning = Some(Warning::new(&e));
                }
                match self.scores.maybe_set_high_score(score) {
                    Ok(updated) => new_record = updated,
                    Err(e) => self.warning = Some(Warning::new(&e)),
                }
            }
            play.update_high_score(self.scores.high_score(), new_record);
        }
    }

    fn quitting(&self) -> bool {
        matches!(self.screen, Screen::Quit)
    }
}

#[derive(Debug)]
enum Screen {
    Main(StartupScreen),
    Play(PlayScreen),
    Quit,
}
