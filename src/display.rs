//! A width x height pixel surface on top of a strip session.
//!
//! [`LedMatrix`] keeps a local frame in physical strip order. Pixels are
//! addressed in logical coordinates with `(0,0)` at the lower left; the
//! [`Mapping`] given at construction decides where each one lands on the
//! strip. Nothing reaches the LEDs until [`LedMatrix::show`].

use tracing::debug;

use crate::driver::LedDriver;
use crate::error::{Result, StripError};
use crate::mapping::{Mapping, Point};
use crate::session::StripSession;
use crate::strip_type::{pack_rgb, StripType};

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed `0x00RRGGBB` value.
    pub fn packed(self) -> u32 {
        pack_rgb(self.r, self.g, self.b)
    }
}

/// LED panel driven through a [`StripSession`].
#[derive(Debug)]
pub struct LedMatrix<D: LedDriver> {
    session: StripSession<D>,
    width: u32,
    height: u32,
    max: Point,
    /// Logical index (x + width * y) to strip index
    index: Vec<usize>,
    frame: Vec<u32>,
}

impl<D: LedDriver> LedMatrix<D> {
    /// Open `session` for a panel and blank it.
    ///
    /// The strip length is the output size of `mapping`, which may be larger
    /// than `width` x `height` when part of the strip is not addressed.
    /// `brightness` is a scale in `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// [`StripError::InvalidConfig`] for a zero-sized panel or a brightness
    /// outside `0.0..=1.0`, and any error from the session or mapping.
    pub fn new(
        mut session: StripSession<D>,
        width: u32,
        height: u32,
        mapping: &dyn Mapping,
        strip_type: StripType,
        brightness: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StripError::invalid_config(format!(
                "Matrix size {}x{} must be non-zero",
                width, height
            )));
        }
        if !(0.0..=1.0).contains(&brightness) {
            return Err(StripError::invalid_config(format!(
                "Brightness {} outside 0.0..=1.0",
                brightness
            )));
        }

        let out = mapping.out_max();
        let too_large = || {
            StripError::invalid_config(format!(
                "Mapping output {} is too large for one strip",
                out
            ))
        };
        let out_width = (out.x as usize).checked_add(1).ok_or_else(too_large)?;
        let leds = (out.y as usize)
            .checked_add(1)
            .and_then(|h| h.checked_mul(out_width))
            .ok_or_else(too_large)?;

        let cells = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| {
                StripError::invalid_config(format!(
                    "Matrix size {}x{} is too large",
                    width, height
                ))
            })?;

        let mut index = Vec::with_capacity(cells);
        for y in 0..height {
            for x in 0..width {
                let p = mapping.map(Point::new(x, y))?;
                if !p.inside(out) {
                    return Err(StripError::OutOfBounds { point: p, max: out });
                }
                index.push(p.x as usize + out_width * p.y as usize);
            }
        }

        session.initialize(strip_type.code(), leds)?;
        session.set_brightness((brightness * 255.0) as i32)?;

        let frame = vec![0; leds];
        session.push_frame(&frame)?;

        debug!(width, height, leds, %mapping, "Created LED matrix");

        Ok(Self {
            session,
            width,
            height,
            max: Point::new(width - 1, height - 1),
            index,
            frame,
        })
    }

    /// Set one pixel from 8-bit components.
    pub fn set_pixel(&mut self, p: Point, r: u8, g: u8, b: u8) -> Result<()> {
        if !p.inside(self.max) {
            return Err(StripError::OutOfBounds {
                point: p,
                max: self.max,
            });
        }
        let logical = p.x as usize + self.width as usize * p.y as usize;
        self.frame[self.index[logical]] = pack_rgb(r, g, b);
        Ok(())
    }

    /// Set one pixel to `colour`.
    pub fn set_pixel_rgb(&mut self, p: Point, colour: Rgb) -> Result<()> {
        self.set_pixel(p, colour.r, colour.g, colour.b)
    }

    /// Set every strip pixel to `colour`.
    pub fn fill(&mut self, colour: Rgb) {
        self.frame.fill(colour.packed());
    }

    /// Set every strip pixel to black.
    pub fn clear(&mut self) {
        self.fill(Rgb::BLACK);
    }

    /// Send the local frame to the strip.
    pub fn show(&mut self) -> Result<()> {
        self.session.push_frame(&self.frame)
    }

    /// Wait for the last `show` to finish transmitting.
    pub fn wait(&mut self) -> Result<()> {
        self.session.wait()
    }

    /// Change the global brightness (0..=255), applied at the next `show`.
    pub fn set_brightness(&mut self, value: i32) -> Result<()> {
        self.session.set_brightness(value)
    }

    /// Largest addressable point.
    pub fn max(&self) -> Point {
        self.max
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Local frame in strip order.
    pub fn pixels(&self) -> &[u32] {
        &self.frame
    }

    pub fn session(&self) -> &StripSession<D> {
        &self.session
    }

    /// Close the underlying session; returns whether it was open.
    pub fn close(mut self) -> bool {
        self.session.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Identity, Snake};
    use std::fmt;
    use crate::mock::MockDriver;

    fn session() -> StripSession<MockDriver> {
        StripSession::new(MockDriver::new())
    }

    /// Claims an output area of `out` and sends every point to `to`.
    struct Fixed {
        out: Point,
        to: Point,
    }

    impl fmt::Display for Fixed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Fixed to {}", self.to)
        }
    }

    impl Mapping for Fixed {
        fn in_max(&self) -> Point {
            Point::new(0, 0)
        }

        fn out_max(&self) -> Point {
            self.out
        }

        fn original_max(&self) -> Point {
            Point::new(0, 0)
        }

        fn map(&self, _p: Point) -> Result<Point> {
            Ok(self.to)
        }
    }

    #[test]
    fn test_oversized_mapping_rejected_before_init() {
        let map = Fixed {
            out: Point::new(u32::MAX, u32::MAX),
            to: Point::new(0, 0),
        };
        let err = LedMatrix::new(session(), 1, 1, &map, StripType::Grb, 1.0).unwrap_err();
        assert!(matches!(err, StripError::InvalidConfig { .. }));
    }

    #[test]
    fn test_mapping_output_outside_declared_area_rejected() {
        let map = Fixed {
            out: Point::new(1, 1),
            to: Point::new(2, 0),
        };
        let err = LedMatrix::new(session(), 1, 1, &map, StripType::Grb, 1.0).unwrap_err();
        assert!(matches!(err, StripError::OutOfBounds { .. }));
    }

    #[test]
    fn test_new_initializes_and_blanks() {
        let map = Identity::new(4, 2).unwrap();
        let matrix = LedMatrix::new(session(), 4, 2, &map, StripType::Grb, 0.5).unwrap();

        let s = matrix.session();
        assert_eq!(s.pixel_count(), Some(8));
        assert_eq!(s.strip_type(), Some(StripType::Grb.code()));
        assert_eq!(s.brightness(), 127);

        let frames = s.driver().rendered_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pixels, vec![0; 8]);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let map = Identity::new(4, 2).unwrap();
        assert!(LedMatrix::new(session(), 0, 2, &map, StripType::Grb, 1.0).is_err());
        assert!(LedMatrix::new(session(), 4, 2, &map, StripType::Grb, 1.5).is_err());
        assert!(LedMatrix::new(session(), 4, 2, &map, StripType::Grb, -0.1).is_err());
    }

    #[test]
    fn test_set_pixel_follows_mapping() {
        let map = Snake::new(3, 2).unwrap();
        let mut matrix = LedMatrix::new(session(), 3, 2, &map, StripType::Rgb, 1.0).unwrap();

        matrix.set_pixel(Point::new(0, 1), 0x11, 0x22, 0x33).unwrap();
        matrix.set_pixel_rgb(Point::new(1, 0), Rgb::WHITE).unwrap();
        matrix.show().unwrap();
        matrix.wait().unwrap();

        let expected = vec![0, 0x00ff_ffff, 0, 0, 0, 0x0011_2233];
        assert_eq!(matrix.pixels(), expected.as_slice());
        assert_eq!(matrix.session().pixels(), expected.as_slice());
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let map = Identity::new(2, 2).unwrap();
        let mut matrix = LedMatrix::new(session(), 2, 2, &map, StripType::Grb, 1.0).unwrap();
        assert!(matches!(
            matrix.set_pixel(Point::new(2, 0), 1, 1, 1),
            Err(StripError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_fill_and_close() {
        let map = Identity::new(2, 1).unwrap();
        let mut matrix = LedMatrix::new(session(), 2, 1, &map, StripType::Grb, 1.0).unwrap();
        matrix.fill(Rgb::new(1, 2, 3));
        assert_eq!(matrix.pixels(), &[0x010203, 0x010203]);
        matrix.clear();
        assert_eq!(matrix.pixels(), &[0, 0]);
        assert!(matrix.close());
    }
}
