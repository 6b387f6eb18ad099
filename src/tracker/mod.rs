pub(crate) mod feed;

use crate::consts;
use crate::game::Direction;
use std::time::{Duration, Instant};
use thiserror::Error;

/// A normalized head-position sample in camera space; both axes lie in
/// roughly `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Centroid {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Centroid {
    pub(crate) const fn new(x: f64, y: f64) -> Centroid {
        Centroid { x, y }
    }
}

/// One frame from the upstream landmark tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Frame {
    /// The tracker found no face in this frame.
    NoFace,
    /// The centroid of the tracked landmark points.
    Face(Centroid),
}

/// What the filter made of one processed sample.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Reading {
    /// Clear displacement along one axis.
    Turn(Direction),
    /// No face, displacement inside the dead zone, or no neutral point yet.
    Idle,
}

impl Reading {
    pub(crate) fn direction(self) -> Option<Direction> {
        match self {
            Reading::Turn(dir) => Some(dir),
            Reading::Idle => None,
        }
    }
}

/// Calibration ended with zero usable samples.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("no face was detected during calibration")]
pub(crate) struct CalibrateError;

/// Converts the continuous head-position signal into discrete steering.
///
/// Feed every tracker frame through [`HeadSteering::handle_frame`]; it
/// returns `None` for frames the filter dropped (rate limit, hidden host)
/// and a [`Reading`] for frames it classified.  All methods take the
/// current time from the caller, so the filter itself never consults a
/// clock.
#[derive(Clone, Debug)]
pub(crate) struct HeadSteering {
    sensitivity: f64,
    dead_zone: f64,
    mirror: bool,
    min_interval: Duration,
    neutral: Option<Centroid>,
    calibration: Option<Calibration>,
    settle: Option<Instant>,
    last_sample: Option<Instant>,
    visible: bool,
}

#[derive(Clone, Debug)]
struct Calibration {
    samples: Vec<Centroid>,
    deadline: Instant,
}

impl HeadSteering {
    pub(crate) fn new() -> HeadSteering {
        HeadSteering {
            sensitivity: consts::SENSITIVITY,
            dead_zone: consts::DEAD_ZONE,
            mirror: false,
            min_interval: rate_to_interval(consts::MAX_RATE),
            neutral: None,
            calibration: None,
            settle: None,
            last_sample: None,
            visible: true,
        }
    }

    /// Displacement multiplier.  Values below zero are clamped to zero.
    pub(crate) fn set_sensitivity(&mut self, factor: f64) {
        self.sensitivity = factor.max(0.0);
    }

    /// Dead-zone threshold in normalized units.
    pub(crate) fn set_dead_zone(&mut self, threshold: f64) {
        self.dead_zone = threshold.max(0.0);
    }

    /// Negate horizontal displacement (for mirrored camera preview).
    pub(crate) fn set_mirror(&mut self, mirror: bool) {
        self.mirror = mirror;
    }

    /// Ceiling on processed samples per second; zero or less disables the
    /// throttle.
    pub(crate) fn set_max_rate(&mut self, hertz: f64) {
        self.min_interval = rate_to_interval(hertz);
    }

    /// Pause or resume sample processing with the host's visibility.
    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn has_neutral(&self) -> bool {
        self.neutral.is_some()
    }

    pub(crate) fn is_calibrating(&self) -> bool {
        self.calibration.is_some()
    }

    /// Open a calibration window that collects samples until
    /// [`consts::CALIBRATION_SAMPLES`] arrive or
    /// [`consts::CALIBRATION_TIMEOUT`] passes.  Directional output is
    /// suppressed while the window is open.  Completion is reported by
    /// [`HeadSteering::poll_calibration`].
    pub(crate) fn begin_calibration(&mut self, now: Instant) {
        self.settle = None;
        self.calibration = Some(Calibration {
            samples: Vec::new(),
            deadline: now + consts::CALIBRATION_TIMEOUT,
        });
    }

    /// Check the open calibration window.  Returns `Some` exactly once,
    /// when the window has gathered enough samples or timed out; the new
    /// neutral point is the mean of the collected samples.
    pub(crate) fn poll_calibration(
        &mut self,
        now: Instant,
    ) -> Option<Result<Centroid, CalibrateError>> {
        let open = self.calibration.as_ref()?;
        if open.samples.len() < consts::CALIBRATION_SAMPLES && now < open.deadline {
            return None;
        }
        let closed = self.calibration.take()?;
        if closed.samples.is_empty() {
            return Some(Err(CalibrateError));
        }
        let neutral = mean(&closed.samples);
        self.neutral = Some(neutral);
        Some(Ok(neutral))
    }

    /// Process one tracker frame.  Returns `None` when the frame was
    /// dropped (host hidden, or a face sample arriving faster than the
    /// rate limit) and the classification otherwise.
    pub(crate) fn handle_frame(&mut self, frame: Frame, now: Instant) -> Option<Reading> {
        if !self.visible {
            return None;
        }
        let Frame::Face(sample) = frame else {
            // No-detection frames read as idle in every state.
            return Some(Reading::Idle);
        };
        if let Some(open) = self.calibration.as_mut() {
            // The throttle is lifted here so the window fills quickly.
            open.samples.push(sample);
            return Some(Reading::Idle);
        }
        if let Some(last) = self.last_sample {
            if now.duration_since(last) < self.min_interval {
                return None;
            }
        }
        self.last_sample = Some(now);
        let Some(neutral) = self.neutral else {
            // First contact arms a settle deadline; the first sample seen
            // at or after it is taken as the at-rest head position.
            match self.settle {
                None => self.settle = Some(now + consts::SETTLE_DELAY),
                Some(deadline) if now >= deadline => {
                    self.settle = None;
                    self.neutral = Some(sample);
                }
                Some(_) => (),
            }
            return Some(Reading::Idle);
        };
        Some(self.classify(sample, neutral))
    }

    fn classify(&self, sample: Centroid, neutral: Centroid) -> Reading {
        let mut dx = sample.x - neutral.x;
        if self.mirror {
            dx = -dx;
        }
        dx *= self.sensitivity;
        let dy = (sample.y - neutral.y) * self.sensitivity;
        let strongest = dx.abs().max(dy.abs());
        if strongest < self.dead_zone || strongest <= 0.0 {
            return Reading::Idle;
        }
        // The axis with the larger displacement wins; ties go horizontal.
        if dx.abs() >= dy.abs() {
            Reading::Turn(if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else {
            Reading::Turn(if dy > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            })
        }
    }
}

impl Default for HeadSteering {
    fn default() -> HeadSteering {
        HeadSteering::new()
    }
}

fn rate_to_interval(hertz: f64) -> Duration {
    if hertz > 0.0 {
        Duration::from_secs_f64(1.0 / hertz)
    } else {
        Duration::ZERO
    }
}

fn mean(samples: &[Centroid]) -> Centroid {
    let n = f64::from(u32::try_from(samples.len()).unwrap_or(u32::MAX));
    let (sx, sy) = samples
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Centroid::new(sx / n, sy / n)
}
