//! Assorted constants & hard-coded configuration
use ratatui::{
    layout::Size,
    style::{Color, Modifier, Style},
};
use std::time::Duration;

/// Default time between movements of the snake
pub(crate) const TICK_PERIOD_MS: u64 = 120;

/// Default number of cells along each side of the board
pub(crate) const GRID_SIZE: u16 = 20;

/// Points awarded for each piece of food eaten
pub(crate) const FOOD_REWARD: u32 = 10;

/// Random probes when placing food before sweeping the board for free cells
pub(crate) const FOOD_PLACEMENT_TRIES: u32 = 64;

/// Most-recent results kept in the persisted score history
pub(crate) const HISTORY_CAP: usize = 200;

/// Default displacement multiplier applied to head-position samples
pub(crate) const SENSITIVITY: f64 = 1.0;

/// Default dead-zone threshold, in normalized camera units
pub(crate) const DEAD_ZONE: f64 = 0.035;

/// Default ceiling on how many samples per second the filter processes
pub(crate) const MAX_RATE: f64 = 10.0;

/// Samples that close a calibration window early once collected
pub(crate) const CALIBRATION_SAMPLES: usize = 20;

/// How long a calibration window stays open waiting for samples
pub(crate) const CALIBRATION_TIMEOUT: Duration = Duration::from_millis(3000);

/// How long the head must be in view before it is assumed to be at rest and
/// promoted to the neutral point (when no explicit calibration was run)
pub(crate) const SETTLE_DELAY: Duration = Duration::from_millis(600);

/// Upper bound on how long the event pump waits for a key press before
/// checking the frame feed and the tick deadline again
pub(crate) const PUMP_INTERVAL: Duration = Duration::from_millis(25);

/// Draw everything inside a rectangle of this size in the center of the
/// terminal window.
///
/// Cf. [`crate::util::get_display_area()`]
pub(crate) const DISPLAY_SIZE: Size = Size {
    width: 80,
    height: 24,
};

/// Glyph for the snake's head when it is moving up
pub(crate) const SNAKE_HEAD_UP_SYMBOL: char = '^';

/// Glyph for the snake's head when it is moving down
pub(crate) const SNAKE_HEAD_DOWN_SYMBOL: char = 'v';

/// Glyph for the snake's head when it is moving left
pub(crate) const SNAKE_HEAD_LEFT_SYMBOL: char = '<';

/// Glyph for the snake's head when it is moving right
pub(crate) const SNAKE_HEAD_RIGHT_SYMBOL: char = '>';

/// Glyph for the cells of the snake's body
pub(crate) const SNAKE_BODY_SYMBOL: char = '⚬';

/// Glyph for the food
pub(crate) const FOOD_SYMBOL: char = '●';

/// Glyph for the snake's head when it has hit a wall or itself
pub(crate) const COLLISION_SYMBOL: char = '×';

/// Style for the snake's head and body
pub(crate) const SNAKE_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);

/// Style for the food
pub(crate) const FOOD_STYLE: Style = Style::new().fg(Color::LightRed);

/// Style for [`COLLISION_SYMBOL`]
pub(crate) const COLLISION_STYLE: Style = Style::new()
    .fg(Color::LightRed)
    .add_modifier(Modifier::REVERSED);

/// Style for key codes shown in the interface
pub(crate) const KEY_STYLE: Style = Style::new().fg(Color::Yellow);

/// Style for the score bar at the top of the game screen
pub(crate) const SCORE_BAR_STYLE: Style = Style::new().add_modifier(Modifier::REVERSED);

/// Style for the head-steering status readout
pub(crate) const TRACKER_STATUS_STYLE: Style = Style::new().fg(Color::Cyan);

/// Style for the currently-selected menu item
pub(crate) const MENU_SELECTION_STYLE: Style = Style::new().add_modifier(Modifier::UNDERLINED);
