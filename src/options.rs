use crate::config::TrackerConfig;
use crate::tracker::HeadSteering;
use enum_dispatch::enum_dispatch;
use enum_map::Enum;
use std::fmt;

/// The head-steering tunables, as shown and adjusted on the startup
/// screen.  Each maps onto one setter of [`HeadSteering`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Tuning {
    pub(crate) sensitivity: Sensitivity,
    pub(crate) dead_zone: DeadZone,
    pub(crate) mirror: bool,
    pub(crate) max_rate: MaxRate,
}

impl Tuning {
    /// Quantize raw configuration values onto the menu's steps.
    pub(crate) fn from_config(cfg: &TrackerConfig) -> Tuning {
        Tuning {
            sensitivity: Sensitivity::from_factor(cfg.sensitivity),
            dead_zone: DeadZone::from_threshold(cfg.dead_zone),
            mirror: cfg.mirror,
            max_rate: MaxRate::from_hertz(cfg.max_rate),
        }
    }

    /// Push all four values into the filter.
    pub(crate) fn apply(&self, filter: &mut HeadSteering) {
        filter.set_sensitivity(self.sensitivity.factor());
        filter.set_dead_zone(self.dead_zone.threshold());
        filter.set_mirror(self.mirror);
        filter.set_max_rate(self.max_rate.hertz());
    }

    pub(crate) fn get(&self, key: TuneKey) -> TuneValue {
        match key {
            TuneKey::Sensitivity => self.sensitivity.into(),
            TuneKey::DeadZone => self.dead_zone.into(),
            TuneKey::Mirror => self.mirror.into(),
            TuneKey::MaxRate => self.max_rate.into(),
        }
    }

    pub(crate) fn set(&mut self, key: TuneKey, value: TuneValue) {
        match key {
            TuneKey::Sensitivity => {
                self.sensitivity = value
                    .try_into()
                    .expect("Tuning::set(Sensitivity, value) called with non-Sensitivity value");
            }
            TuneKey::DeadZone => {
                self.dead_zone = value
                    .try_into()
                    .expect("Tuning::set(DeadZone, value) called with non-DeadZone value");
            }
            TuneKey::Mirror => {
                self.mirror = value
                    .try_into()
                    .expect("Tuning::set(Mirror, value) called with non-Bool value");
            }
            TuneKey::MaxRate => {
                self.max_rate = value
                    .try_into()
                    .expect("Tuning::set(MaxRate, value) called with non-MaxRate value");
            }
        }
    }
}

impl Default for Tuning {
    fn default() -> Tuning {
        Tuning::from_config(&TrackerConfig::default())
    }
}

#[derive(Clone, Copy, Debug, Enum, Eq, PartialEq)]
pub(crate) enum TuneKey {
    Sensitivity,
    DeadZone,
    Mirror,
    MaxRate,
}

impl TuneKey {
    pub(crate) const DISPLAY_WIDTH: u16 = 11;

    pub(crate) fn iter() -> impl Iterator<Item = TuneKey> {
        (0..Self::LENGTH).map(Self::from_usize)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            TuneKey::Sensitivity => "Sensitivity",
            TuneKey::DeadZone => "Dead zone",
            TuneKey::Mirror => "Mirror",
            TuneKey::MaxRate => "Max rate",
        }
    }
}

impl fmt::Display for TuneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[enum_dispatch]
pub(crate) trait Adjustable {
    fn increase(&mut self);
    fn decrease(&mut self);
    fn toggle(&mut self);
    fn can_increase(&self) -> bool;
    fn can_decrease(&self) -> bool;
}

#[enum_dispatch(Adjustable)] // This also gives us From and TryInto
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TuneValue {
    Bool(bool),
    Sensitivity,
    DeadZone,
    MaxRate,
}

impl TuneValue {
    pub(crate) const DISPLAY_WIDTH: u16 = 10;
}

impl fmt::Display for TuneValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TuneValue::Bool(false) => write!(f, "   [ ]    "),
            TuneValue::Bool(true) => write!(f, "   [✓]    "),
            TuneValue::Sensitivity(v) => arrowed(f, &v),
            TuneValue::DeadZone(v) => arrowed(f, &v),
            TuneValue::MaxRate(v) => arrowed(f, &v),
        }
    }
}

fn arrowed<T: Adjustable + fmt::Display>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    write!(
        f,
        "{left} {value:^6} {right}",
        left = if value.can_decrease() { '◀' } else { '◁' },
        right = if value.can_increase() { '▶' } else { '▷' }
    )
}

impl Adjustable for bool {
    fn increase(&mut self) {
        *self = true;
    }

    fn decrease(&mut self) {
        *self = false;
    }

    fn toggle(&mut self) {
        *self = !*self;
    }

    fn can_increase(&self) -> bool {
        !*self
    }

    fn can_decrease(&self) -> bool {
        *self
    }
}

/// Displacement multiplier in tenths, from ×0.0 to ×3.0.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Sensitivity(u8);

impl Sensitivity {
    const MAX_TENTHS: u8 = 30;
    const STEP: u8 = 1;

    pub(crate) fn from_factor(factor: f64) -> Sensitivity {
        Sensitivity(quantize(factor * 10.0, Self::MAX_TENTHS))
    }

    pub(crate) fn factor(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl Default for Sensitivity {
    fn default() -> Sensitivity {
        Sensitivity(10)
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("x{}.{}", self.0 / 10, self.0 % 10))
    }
}

impl Adjustable for Sensitivity {
    fn increase(&mut self) {
        if self.can_increase() {
            self.0 += Self::STEP;
        }
    }

    fn decrease(&mut self) {
        if self.can_decrease() {
            self.0 -= Self::STEP;
        }
    }

    fn toggle(&mut self) {}

    fn can_increase(&self) -> bool {
        self.0 < Self::MAX_TENTHS
    }

    fn can_decrease(&self) -> bool {
        self.0 > 0
    }
}

/// Dead-zone threshold in thousandths of the frame, from 0.5% to 15%.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DeadZone(u16);

impl DeadZone {
    const MIN_THOUSANDTHS: u16 = 5;
    const MAX_THOUSANDTHS: u16 = 150;
    const STEP: u16 = 5;

    pub(crate) fn from_threshold(threshold: f64) -> DeadZone {
        let raw = quantize16(threshold * 1000.0, Self::MAX_THOUSANDTHS);
        // Snap onto the menu's step grid.
        let stepped = (raw / Self::STEP) * Self::STEP;
        DeadZone(stepped.max(Self::MIN_THOUSANDTHS))
    }

    pub(crate) fn threshold(self) -> f64 {
        f64::from(self.0) / 1000.0
    }
}

impl Default for DeadZone {
    fn default() -> DeadZone {
        DeadZone(35)
    }
}

impl fmt::Display for DeadZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}.{}%", self.0 / 10, self.0 % 10))
    }
}

impl Adjustable for DeadZone {
    fn increase(&mut self) {
        if self.can_increase() {
            self.0 += Self::STEP;
        }
    }

    fn decrease(&mut self) {
        if self.can_decrease() {
            self.0 -= Self::STEP;
        }
    }

    fn toggle(&mut self) {}

    fn can_increase(&self) -> bool {
        self.0 < Self::MAX_THOUSANDTHS
    }

    fn can_decrease(&self) -> bool {
        self.0 > Self::MIN_THOUSANDTHS
    }
}

/// Ceiling on processed samples per second, from 1 to 30 Hz.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MaxRate(u8);

impl MaxRate {
    const MIN_HERTZ: u8 = 1;
    const MAX_HERTZ: u8 = 30;

    pub(crate) fn from_hertz(hertz: f64) -> MaxRate {
        MaxRate(quantize(hertz, Self::MAX_HERTZ).max(Self::MIN_HERTZ))
    }

    pub(crate) fn hertz(self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for MaxRate {
    fn default() -> MaxRate {
        MaxRate(10)
    }
}

impl fmt::Display for MaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{} Hz", self.0))
    }
}

impl Adjustable for MaxRate {
    fn increase(&mut self) {
        if self.can_increase() {
            self.0 += 1;
        }
    }

    fn decrease(&mut self) {
        if self.can_decrease() {
            self.0 -= 1;
        }
    }

    fn toggle(&mut self) {}

    fn can_increase(&self) -> bool {
        self.0 < Self::MAX_HERTZ
    }

    fn can_decrease(&self) -> bool {
        self.0 > Self::MIN_HERTZ
    }
}

fn quantize(value: f64, max: u8) -> u8 {
    let rounded = value.round().clamp(0.0, f64::from(max));
    // The clamp keeps the cast in range.
    rounded as u8
}

fn quantize16(value: f64, max: u16) -> u16 {
    let rounded = value.round().clamp(0.0, f64::from(max));
    rounded as u16
}
