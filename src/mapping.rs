//! Coordinate mappings for strips folded into 2-D panels.
//!
//! A panel built from one strip has a physical wiring order that rarely
//! matches the logical `(x, y)` a caller wants to draw at. A [`Mapping`]
//! converts a logical point into the physical point of the panel; mappings
//! can be chained with `after`, in which case the earlier mapping runs first.
//!
//! ```
//! use ws2811_bridge::mapping::{FlipY, Mapping, Point, Snake};
//!
//! // 8x4 panel wired in a zig-zag, origin at the top
//! let map = Snake::after(Box::new(FlipY::new(8, 4)?));
//! assert_eq!(map.map(Point::new(0, 0))?, Point::new(7, 3));
//! # Ok::<(), ws2811_bridge::StripError>(())
//! ```

use std::fmt;

use crate::error::{Result, StripError};

/// A non-negative panel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Whether this point lies within `(0,0)..=max`.
    pub fn inside(&self, max: Point) -> bool {
        self.x <= max.x && self.y <= max.y
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Largest point of a `width` x `height` grid.
fn max_point(width: u32, height: u32) -> Result<Point> {
    if width == 0 || height == 0 {
        return Err(StripError::invalid_config(format!(
            "Mapping size {}x{} must be non-zero",
            width, height
        )));
    }
    Ok(Point::new(width - 1, height - 1))
}

fn check(point: Point, max: Point) -> Result<Point> {
    if point.inside(max) {
        Ok(point)
    } else {
        Err(StripError::OutOfBounds { point, max })
    }
}

/// Converts logical coordinates into physical ones.
pub trait Mapping: fmt::Display + Send {
    /// Largest accepted input point.
    fn in_max(&self) -> Point;

    /// Largest produced output point.
    fn out_max(&self) -> Point;

    /// Input size of the first mapping in the chain.
    fn original_max(&self) -> Point;

    /// Map a point, running any earlier mapping in the chain first.
    fn map(&self, p: Point) -> Result<Point>;
}

/// Shared chaining state for the concrete mappings.
struct Stage {
    in_max: Point,
    out_max: Point,
    before: Option<Box<dyn Mapping>>,
}

impl Stage {
    fn original_max(&self) -> Point {
        match &self.before {
            Some(before) => before.original_max(),
            None => self.in_max,
        }
    }

    fn apply(&self, p: Point, f: impl FnOnce(Point) -> Point) -> Result<Point> {
        let p = match &self.before {
            Some(before) => before.map(p)?,
            None => p,
        };
        let p = check(p, self.in_max)?;
        check(f(p), self.out_max)
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
        if let Some(before) = &self.before {
            write!(f, "{} ", before)?;
        }
        write!(f, "{} from {} to {}", name, self.in_max, self.out_max)
    }
}

macro_rules! impl_mapping {
    ($ty:ident, $name:literal, |$stage:ident, $p:ident| $body:expr) => {
        impl Mapping for $ty {
            fn in_max(&self) -> Point {
                self.0.in_max
            }

            fn out_max(&self) -> Point {
                self.0.out_max
            }

            fn original_max(&self) -> Point {
                self.0.original_max()
            }

            fn map(&self, p: Point) -> Result<Point> {
                let $stage = &self.0;
                self.0.apply(p, |$p| $body)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.describe(f, $name)
            }
        }
    };
}

/// Leaves points unchanged.
pub struct Identity(Stage);

impl Identity {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let max = max_point(width, height)?;
        Ok(Self(Stage {
            in_max: max,
            out_max: max,
            before: None,
        }))
    }
}

impl_mapping!(Identity, "Identity", |_stage, p| p);

/// Mirrors the y axis: `(x, y) -> (x, max_y - y)`.
pub struct FlipY(Stage);

impl FlipY {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let max = max_point(width, height)?;
        Ok(Self(Stage {
            in_max: max,
            out_max: max,
            before: None,
        }))
    }

    pub fn after(before: Box<dyn Mapping>) -> Self {
        let max = before.out_max();
        Self(Stage {
            in_max: max,
            out_max: max,
            before: Some(before),
        })
    }
}

impl_mapping!(FlipY, "FlipY", |stage, p| Point::new(
    p.x,
    stage.in_max.y - p.y
));

/// Transposes the panel: `(x, y) -> (y, x)`.
pub struct SwapXY(Stage);

impl SwapXY {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let max = max_point(width, height)?;
        Ok(Self(Stage {
            in_max: max,
            out_max: Point::new(max.y, max.x),
            before: None,
        }))
    }

    pub fn after(before: Box<dyn Mapping>) -> Self {
        let max = before.out_max();
        Self(Stage {
            in_max: max,
            out_max: Point::new(max.y, max.x),
            before: Some(before),
        })
    }
}

impl_mapping!(SwapXY, "SwapXY", |_stage, p| Point::new(p.y, p.x));

/// Zig-zag wiring: odd rows run right to left.
pub struct Snake(Stage);

impl Snake {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let max = max_point(width, height)?;
        Ok(Self(Stage {
            in_max: max,
            out_max: max,
            before: None,
        }))
    }

    pub fn after(before: Box<dyn Mapping>) -> Self {
        let max = before.out_max();
        Self(Stage {
            in_max: max,
            out_max: max,
            before: Some(before),
        })
    }
}

impl_mapping!(Snake, "Snake", |stage, p| if p.y & 1 != 0 {
    Point::new(stage.in_max.x - p.x, p.y)
} else {
    p
});
