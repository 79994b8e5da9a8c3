use nalgebra::Point2;

pub mod elliptic;

/// Half-open range `[start, stop)` stepped by `step`, with the same count as
/// `ceil((stop - start) / step)`.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// `n` points evenly spaced around a circle of radius `r`, starting on the
/// +x axis, as offsets from the centre.
pub fn circle_outline(r: f64, n: usize) -> Vec<Point2<f64>> {
    let dth = std::f64::consts::TAU / n as f64;
    (0..n)
        .map(|i| {
            let th = i as f64 * dth;
            Point2::new(r * th.cos(), r * th.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arange_half_open() {
        let xs = arange(0.0, 1.0, 0.25);
        assert_eq!(xs, vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(arange(0.0, 1.0, 0.3).len(), 4);
        assert!(arange(1.0, 0.0, 0.1).is_empty());
    }

    #[test]
    fn test_circle_outline() {
        let ps = circle_outline(2.0, 4);
        assert_eq!(ps.len(), 4);
        assert_relative_eq!(ps[0], Point2::new(2.0, 0.0));
        assert_relative_eq!(ps[1], Point2::new(0.0, 2.0), epsilon = 1e-12);
        assert_relative_eq!(ps[2], Point2::new(-2.0, 0.0), epsilon = 1e-12);
        for p in ps {
            assert_relative_eq!(p.coords.norm(), 2.0, epsilon = 1e-12);
        }
    }
}
