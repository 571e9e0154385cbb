//! Bresenham line drawing with integer-only arithmetic

use super::types::Fragment;

/// Pixels approximating the segment from `p0` to `p1`, both included.
///
/// Yields exactly `max(|dx|, |dy|) + 1` fragments in order from `p0` to
/// `p1`; consecutive fragments differ by at most one in each axis.
pub fn bresenham(p0: Fragment, p1: Fragment) -> Vec<Fragment> {
    let dx = (p1.x - p0.x).abs();
    let dy = (p1.y - p0.y).abs();

    // Steppers walk in increasing major-axis order; flip back afterwards
    if dx >= dy {
        if p0.x > p1.x {
            let mut points = bresenham_low(p1, p0);
            points.reverse();
            points
        } else {
            bresenham_low(p0, p1)
        }
    } else if p0.y > p1.y {
        let mut points = bresenham_high(p1, p0);
        points.reverse();
        points
    } else {
        bresenham_high(p0, p1)
    }
}

/// Shallow lines: |dx| >= |dy| and `p0.x <= p1.x`. Steps x every pixel.
pub fn bresenham_low(p0: Fragment, p1: Fragment) -> Vec<Fragment> {
    let dx = p1.x - p0.x;
    let mut dy = p1.y - p0.y;
    let mut y_step = 1;
    if dy < 0 {
        y_step = -1;
        dy = -dy;
    }

    let mut difference = 2 * dy - dx;
    let mut y = p0.y;
    let mut points = Vec::with_capacity(dx as usize + 1);

    for x in p0.x..=p1.x {
        points.push(Fragment::new(x, y));
        if difference > 0 {
            y += y_step;
            difference += 2 * (dy - dx);
        } else {
            difference += 2 * dy;
        }
    }

    points
}

/// Steep lines: |dy| > |dx| and `p0.y <= p1.y`. Same error term with the
/// axes swapped, stepping y every pixel.
pub fn bresenham_high(p0: Fragment, p1: Fragment) -> Vec<Fragment> {
    let mut dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let mut x_step = 1;
    if dx < 0 {
        x_step = -1;
        dx = -dx;
    }

    let mut difference = 2 * dx - dy;
    let mut x = p0.x;
    let mut points = Vec::with_capacity(dy as usize + 1);

    for y in p0.y..=p1.y {
        points.push(Fragment::new(x, y));
        if difference > 0 {
            x += x_step;
            difference += 2 * (dx - dy);
        } else {
            difference += 2 * dx;
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_contract(p0: Fragment, p1: Fragment) {
        let points = bresenham(p0, p1);
        let expected = (p1.x - p0.x).abs().max((p1.y - p0.y).abs()) as usize + 1;
        assert_eq!(points.len(), expected, "{:?} -> {:?}", p0, p1);
        assert_eq!(points[0], p0);
        assert_eq!(*points.last().unwrap(), p1);
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_shallow_line() {
        let points = bresenham(Fragment::new(0, 0), Fragment::new(5, 2));
        assert_eq!(points.len(), 6);
        assert_eq!(points[0], Fragment::new(0, 0));
        assert_eq!(points[5], Fragment::new(5, 2));
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.x, i as i32);
        }
    }

    #[test]
    fn test_steep_line_steps_y() {
        let points = bresenham(Fragment::new(1, 0), Fragment::new(3, 7));
        assert_eq!(points.len(), 8);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.y, i as i32);
        }
    }

    #[test]
    fn test_all_octants() {
        let origin = Fragment::new(10, 10);
        for (dx, dy) in [
            (7, 3), (3, 7), (-3, 7), (-7, 3),
            (-7, -3), (-3, -7), (3, -7), (7, -3),
            (5, 5), (-5, 5), (0, 6), (6, 0), (0, -6), (-6, 0),
        ] {
            check_contract(origin, Fragment::new(origin.x + dx, origin.y + dy));
        }
    }

    #[test]
    fn test_single_point() {
        let p = Fragment::new(4, -2);
        assert_eq!(bresenham(p, p), vec![p]);
    }
}
