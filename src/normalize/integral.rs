/// Summed-area table over a `width x height` grid of `u64` samples.
///
/// Stored with a zero row and column in front, so `sums[(y * stride) + x]`
/// holds the sum of every sample strictly above and to the left of `(x, y)`.
#[derive(Debug, Clone, Default)]
pub struct IntegralImage {
    width: u32,
    height: u32,
    sums: Vec<u64>,
}

impl IntegralImage {
    pub fn from_fn(width: u32, height: u32, sample: impl Fn(u32, u32) -> u64) -> Self {
        let mut integral = Self::default();
        integral.rebuild(width, height, sample);
        integral
    }

    /// Recompute the table in place, reusing the allocation
    pub fn rebuild(&mut self, width: u32, height: u32, sample: impl Fn(u32, u32) -> u64) {
        let stride = width as usize + 1;
        self.width = width;
        self.height = height;
        self.sums.clear();
        self.sums.resize(stride * (height as usize + 1), 0);

        for y in 0..height {
            let mut row_sum = 0u64;
            let row = (y as usize + 1) * stride;
            let prev_row = y as usize * stride;
            for x in 0..width {
                row_sum += sample(x, y);
                self.sums[row + x as usize + 1] = self.sums[prev_row + x as usize + 1] + row_sum;
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sum of samples in `[x0, x1) x [y0, y1)`
    pub fn sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
        debug_assert!(x0 <= x1 && x1 <= self.width);
        debug_assert!(y0 <= y1 && y1 <= self.height);
        let stride = self.width as usize + 1;
        let at = |x: u32, y: u32| self.sums[y as usize * stride + x as usize];
        at(x1, y1) + at(x0, y0) - at(x1, y0) - at(x0, y1)
    }
}

/// Clamp a possibly out-of-range coordinate onto `[0, len)` (replicated border)
pub fn clamp_coord(coord: i64, len: u32) -> u32 {
    coord.clamp(0, len as i64 - 1) as u32
}

/// Mirror a possibly out-of-range coordinate onto `[0, len)` without
/// repeating the edge sample: `-1 -> 1`, `len -> len - 2`
pub fn reflect_101(coord: i64, len: u32) -> u32 {
    let n = len as i64;
    if n == 1 {
        return 0;
    }
    let period = 2 * n - 2;
    let m = coord.rem_euclid(period);
    (if m >= n { period - m } else { m }) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_rectangles() {
        // 3x2 grid: 1 2 3 / 4 5 6
        let integral = IntegralImage::from_fn(3, 2, |x, y| (y * 3 + x + 1) as u64);
        assert_eq!(integral.sum(0, 0, 3, 2), 21);
        assert_eq!(integral.sum(1, 0, 3, 1), 5);
        assert_eq!(integral.sum(1, 1, 2, 2), 5);
        assert_eq!(integral.sum(2, 0, 2, 2), 0);
    }

    #[test]
    fn rebuild_resizes() {
        let mut integral = IntegralImage::from_fn(4, 4, |_, _| 1);
        assert_eq!(integral.sum(0, 0, 4, 4), 16);
        integral.rebuild(2, 3, |_, _| 2);
        assert_eq!(integral.width(), 2);
        assert_eq!(integral.height(), 3);
        assert_eq!(integral.sum(0, 0, 2, 3), 12);
    }

    #[test]
    fn reflect_101_mirrors_without_edge_repeat() {
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(7, 2), 1);
        assert_eq!(reflect_101(3, 1), 0);
    }

    #[test]
    fn clamps_to_edges() {
        assert_eq!(clamp_coord(-3, 10), 0);
        assert_eq!(clamp_coord(4, 10), 4);
        assert_eq!(clamp_coord(12, 10), 9);
    }
}
