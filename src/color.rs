//! Time-of-day ambient color.
//!
//! A [`KeyTimeTable`] holds fixed (second-of-day, color) anchors and linearly
//! interpolates between the pair bracketing a given time. The table is cyclic:
//! after the last anchor comes the first one again, 86400 seconds later.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Number of seconds in one day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// An 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` notation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba()` notation with the given opacity.
    pub fn rgba(self, alpha: f64) -> String {
        format!(
            "rgba({}, {}, {}, {:.2})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }

    /// Euclidean distance between two colors in RGB space.
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Multi-layer glow as a CSS `text-shadow` value: the same color at
    /// decreasing opacity over growing blur radii.
    pub fn glow(self) -> String {
        GLOW_LAYERS
            .iter()
            .map(|(blur, alpha)| format!("0 0 {}px {}", blur, self.rgba(*alpha)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// (blur radius in px, opacity) for each glow layer.
const GLOW_LAYERS: [(u32, f64); 4] = [(2, 0.9), (6, 0.6), (14, 0.35), (28, 0.15)];

/// A fixed reference point of the daily color cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Seconds since local midnight.
    pub second: u32,
    pub color: Rgb,
}

impl Anchor {
    pub const fn new(second: u32, color: Rgb) -> Self {
        Self { second, color }
    }

    const fn at(hour: u32, minute: u32, color: Rgb) -> Self {
        Self::new(hour * 3600 + minute * 60, color)
    }
}

/// Night, sunrise, morning, midday, evening, dusk and late night.
pub const DAYLIGHT_ANCHORS: [Anchor; 7] = [
    Anchor::at(0, 0, Rgb::new(16, 20, 64)),
    Anchor::at(5, 30, Rgb::new(255, 122, 69)),
    Anchor::at(8, 30, Rgb::new(255, 200, 140)),
    Anchor::at(12, 30, Rgb::WHITE),
    Anchor::at(17, 0, Rgb::new(255, 170, 90)),
    Anchor::at(19, 30, Rgb::new(170, 80, 140)),
    Anchor::at(21, 30, Rgb::new(48, 40, 120)),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("key time table has no anchors")]
    Empty,
    #[error("first anchor must be at second 0, found {0}")]
    NotAtMidnight(u32),
    #[error("anchor {index} at second {second} is not after its predecessor")]
    NotIncreasing { index: usize, second: u32 },
    #[error("anchor {index} at second {second} is past the end of the day")]
    OutOfRange { index: usize, second: u32 },
}

/// Ordered, cyclic sequence of color anchors spanning one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTimeTable {
    anchors: Cow<'static, [Anchor]>,
}

impl Default for KeyTimeTable {
    fn default() -> Self {
        Self::daylight()
    }
}

impl KeyTimeTable {
    /// The built-in dawn, day, dusk and night cycle.
    pub const fn daylight() -> Self {
        Self {
            anchors: Cow::Borrowed(&DAYLIGHT_ANCHORS),
        }
    }

    /// Builds a table after checking that anchors start at 0, strictly
    /// increase and stay within one day.
    pub fn new(anchors: Vec<Anchor>) -> Result<Self, TableError> {
        let first = anchors.first().ok_or(TableError::Empty)?;
        if first.second != 0 {
            return Err(TableError::NotAtMidnight(first.second));
        }
        for (index, pair) in anchors.windows(2).enumerate() {
            let second = pair[1].second;
            if second <= pair[0].second {
                return Err(TableError::NotIncreasing {
                    index: index + 1,
                    second,
                });
            }
            if second >= SECONDS_PER_DAY {
                return Err(TableError::OutOfRange {
                    index: index + 1,
                    second,
                });
            }
        }
        Ok(Self {
            anchors: Cow::Owned(anchors),
        })
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Interpolated color at `seconds` since midnight. Values outside one day
    /// wrap around.
    pub fn color_at(&self, seconds: f64) -> Rgb {
        let anchors = self.anchors();
        let t = seconds.rem_euclid(f64::from(SECONDS_PER_DAY));

        // Tables are tiny; a linear scan is enough.
        let mut i = 0;
        while i + 1 < anchors.len() && f64::from(anchors[i + 1].second) <= t {
            i += 1;
        }

        let start = anchors[i];
        let (end, end_second) = match anchors.get(i + 1) {
            Some(next) => (*next, f64::from(next.second)),
            None => (
                anchors[0],
                f64::from(SECONDS_PER_DAY + anchors[0].second),
            ),
        };

        let fraction = (t - f64::from(start.second)) / (end_second - f64::from(start.second));
        Rgb::new(
            lerp(start.color.r, end.color.r, fraction),
            lerp(start.color.g, end.color.g, fraction),
            lerp(start.color.b, end.color.b, fraction),
        )
    }
}

fn lerp(start: u8, end: u8, fraction: f64) -> u8 {
    let start = f64::from(start);
    let end = f64::from(end);
    (start + fraction * (end - start)).floor().clamp(0.0, 255.0) as u8
}
