/*!
 * Timing model shared by all subtitle grammars.
 *
 * Every entry is kept in absolute milliseconds. Frame-based formats convert
 * through a `FrameRate`, stored as an exact rational so that NTSC rates like
 * 23.976 (24000/1001) do not accumulate floating point drift.
 */

use std::fmt;

use crate::errors::SubtitleError;

/// Milliseconds from the start of the track
pub type AbsoluteTime = u64;

/// Video frame index
pub type FrameTime = u64;

/// Frames per second as a reduced `numerator / denominator` ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate {
    numerator: u64,
    denominator: u64,
}

// NTSC rates written in decimal form, mapped to their exact ratios
const NTSC_RATES: [(f64, u64); 4] = [
    (23.976, 24_000),
    (29.97, 30_000),
    (47.952, 48_000),
    (59.94, 60_000),
];

impl FrameRate {
    /// 23.976 fps, used whenever neither the input nor the caller names a rate
    pub const DEFAULT: FrameRate = FrameRate {
        numerator: 24_000,
        denominator: 1001,
    };

    /// 25 fps (PAL)
    pub const PAL: FrameRate = FrameRate {
        numerator: 25,
        denominator: 1,
    };

    /// Create a frame rate from a decimal value such as `25.0` or `23.976`
    pub fn new(fps: f64) -> Result<Self, SubtitleError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(SubtitleError::InvalidFrameRate(fps.to_string()));
        }

        for (decimal, numerator) in NTSC_RATES {
            if (fps - decimal).abs() < 0.0005 {
                return Self::from_ratio(numerator, 1001);
            }
        }

        let millihertz = (fps * 1000.0).round() as u64;
        if millihertz == 0 {
            return Err(SubtitleError::InvalidFrameRate(fps.to_string()));
        }
        Self::from_ratio(millihertz, 1000)
    }

    /// Create a frame rate from an exact ratio, e.g. `from_ratio(30000, 1001)`
    pub fn from_ratio(numerator: u64, denominator: u64) -> Result<Self, SubtitleError> {
        if numerator == 0 || denominator == 0 {
            return Err(SubtitleError::InvalidFrameRate(format!(
                "{}/{}",
                numerator, denominator
            )));
        }
        let divisor = gcd(numerator, denominator);
        Ok(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Decimal approximation, for display and configuration only
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_f64())
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Convert a frame index to milliseconds.
///
/// Exact when a frame lasts a whole number of milliseconds (40 ms at 25 fps).
/// Otherwise the result is rounded up to the next millisecond, which keeps
/// `to_frame(to_milliseconds(f)) == f` for every rate up to 1000 fps. Plain
/// flooring gives the same value whenever the result is whole (DESIGN.md,
/// Open Question 5). Saturates at `AbsoluteTime::MAX`.
pub fn to_milliseconds(frame: FrameTime, rate: FrameRate) -> AbsoluteTime {
    checked_to_milliseconds(frame, rate).unwrap_or(AbsoluteTime::MAX)
}

/// Like [`to_milliseconds`], `None` when the time does not fit in `AbsoluteTime`
pub fn checked_to_milliseconds(frame: FrameTime, rate: FrameRate) -> Option<AbsoluteTime> {
    let dividend = frame as u128 * 1000 * rate.denominator as u128;
    let divisor = rate.numerator as u128;
    u64::try_from(dividend.div_ceil(divisor)).ok()
}

/// Convert milliseconds to the frame being displayed at that time (rounds
/// down, saturates at `FrameTime::MAX`)
pub fn to_frame(ms: AbsoluteTime, rate: FrameRate) -> FrameTime {
    let dividend = ms as u128 * rate.numerator as u128;
    let divisor = 1000 * rate.denominator as u128;
    u64::try_from(dividend / divisor).unwrap_or(FrameTime::MAX)
}

/// Split milliseconds into `(hours, minutes, seconds, milliseconds)`
pub fn split_clock(ms: AbsoluteTime) -> (u64, u64, u64, u64) {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    (hours, minutes, seconds, millis)
}

/// Join clock components back into milliseconds, `None` on overflow
pub fn clock_to_ms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<AbsoluteTime> {
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
}
