//! Progressive probabilistic Hough transform for line segments.
//!
//! Edge points are visited in raster order instead of a random shuffle so the
//! segment set is a pure function of the edge map.

use std::f64::consts::PI;

use super::canny::EdgeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Distance resolution in pixels.
    pub rho: f64,
    /// Angle resolution in radians.
    pub theta: f64,
    /// Minimum accumulator votes for a line candidate.
    pub threshold: i32,
    pub min_line_length: i64,
    pub max_line_gap: i64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta: PI / 180.0,
            threshold: 50,
            min_line_length: 30,
            max_line_gap: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

const FIXED_SHIFT: i64 = 16;

pub fn detect_segments(edges: &EdgeMap, params: HoughParams) -> Vec<LineSegment> {
    let (w, h) = (edges.width as i64, edges.height as i64);
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let num_angle = (PI / params.theta).round() as usize;
    let num_rho = (((w + h) * 2 + 1) as f64 / params.rho).round() as usize;
    let irho = 1.0 / params.rho;
    let trig: Vec<(f64, f64)> = (0..num_angle)
        .map(|n| {
            let angle = n as f64 * params.theta;
            (angle.cos() * irho, angle.sin() * irho)
        })
        .collect();
    let rho_offset = (num_rho as i64 - 1) / 2;
    let rho_index = |x: i64, y: i64, n: usize| -> usize {
        let (c, s) = trig[n];
        ((x as f64 * c + y as f64 * s).round() as i64 + rho_offset) as usize
    };

    let mut accum = vec![0i32; num_angle * num_rho];
    let mut mask = edges.edges.clone();
    let points: Vec<(i64, i64)> = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .filter(|&(x, y)| edges.is_edge(x as usize, y as usize))
        .collect();

    let in_bounds = |x: i64, y: i64| x >= 0 && y >= 0 && x < w && y < h;
    let mut segments = Vec::new();

    for &(px, py) in &points {
        if !mask[(py * w + px) as usize] {
            continue;
        }

        let mut max_val = params.threshold - 1;
        let mut max_n = 0;
        for n in 0..num_angle {
            let cell = &mut accum[n * num_rho + rho_index(px, py, n)];
            *cell += 1;
            if *cell > max_val {
                max_val = *cell;
                max_n = n;
            }
        }
        if max_val < params.threshold {
            continue;
        }

        // Walk along the winning line direction in Q16 fixed point.
        let a = -trig[max_n].1;
        let b = trig[max_n].0;
        let x_major = a.abs() > b.abs();
        let (start_x, start_y, step_x, step_y) = if x_major {
            let dx0 = if a > 0.0 { 1 } else { -1 };
            let dy0 = (b * (1i64 << FIXED_SHIFT) as f64 / a.abs()).round() as i64;
            (px, (py << FIXED_SHIFT) + (1 << (FIXED_SHIFT - 1)), dx0, dy0)
        } else {
            let dy0 = if b > 0.0 { 1 } else { -1 };
            let dx0 = (a * (1i64 << FIXED_SHIFT) as f64 / b.abs()).round() as i64;
            ((px << FIXED_SHIFT) + (1 << (FIXED_SHIFT - 1)), py, dx0, dy0)
        };
        let to_pixel = |x: i64, y: i64| {
            if x_major {
                (x, y >> FIXED_SHIFT)
            } else {
                (x >> FIXED_SHIFT, y)
            }
        };

        let mut line_end = [(px, py); 2];
        for (k, end) in line_end.iter_mut().enumerate() {
            let (dx, dy) = if k == 0 {
                (step_x, step_y)
            } else {
                (-step_x, -step_y)
            };
            let (mut x, mut y) = (start_x, start_y);
            let mut gap = 0;
            loop {
                let (cx, cy) = to_pixel(x, y);
                if !in_bounds(cx, cy) {
                    break;
                }
                if mask[(cy * w + cx) as usize] {
                    gap = 0;
                    *end = (cx, cy);
                } else {
                    gap += 1;
                    if gap > params.max_line_gap {
                        break;
                    }
                }
                x += dx;
                y += dy;
            }
        }

        let good_line = (line_end[1].0 - line_end[0].0).abs() >= params.min_line_length
            || (line_end[1].1 - line_end[0].1).abs() >= params.min_line_length;

        // Consume the walked pixels; a kept line also withdraws their votes.
        for (k, end) in line_end.iter().enumerate() {
            let (dx, dy) = if k == 0 {
                (step_x, step_y)
            } else {
                (-step_x, -step_y)
            };
            let (mut x, mut y) = (start_x, start_y);
            loop {
                let (cx, cy) = to_pixel(x, y);
                if !in_bounds(cx, cy) {
                    break;
                }
                let idx = (cy * w + cx) as usize;
                if mask[idx] {
                    if good_line {
                        for n in 0..num_angle {
                            accum[n * num_rho + rho_index(cx, cy, n)] -= 1;
                        }
                    }
                    mask[idx] = false;
                }
                if (cx, cy) == *end {
                    break;
                }
                x += dx;
                y += dy;
            }
        }

        if good_line {
            segments.push(LineSegment {
                x0: line_end[0].0,
                y0: line_end[0].1,
                x1: line_end[1].0,
                y1: line_end[1].1,
            });
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_map(width: usize, height: usize, on: impl Fn(usize, usize) -> bool) -> EdgeMap {
        let mut edges = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                edges.push(on(x, y));
            }
        }
        EdgeMap {
            width,
            height,
            edges,
        }
    }

    #[test]
    fn empty_map_has_no_segments() {
        let map = edge_map(100, 100, |_, _| false);
        assert!(detect_segments(&map, HoughParams::default()).is_empty());
    }

    #[test]
    fn finds_single_horizontal_line() {
        let map = edge_map(120, 40, |x, y| y == 20 && (10..110).contains(&x));
        let segments = detect_segments(&map, HoughParams::default());

        assert_eq!(segments.len(), 1);
        let s = segments[0];
        assert_eq!((s.y0, s.y1), (20, 20));
        assert_eq!((s.x0.min(s.x1), s.x0.max(s.x1)), (10, 109));
    }

    #[test]
    fn short_line_below_vote_threshold_is_ignored() {
        let map = edge_map(100, 100, |x, y| y == 50 && (10..40).contains(&x));
        assert!(detect_segments(&map, HoughParams::default()).is_empty());
    }

    #[test]
    fn repeated_runs_agree() {
        let map = edge_map(90, 90, |x, y| x == y || (y == 70 && x > 5) || x == 15);
        let first = detect_segments(&map, HoughParams::default());
        let second = detect_segments(&map, HoughParams::default());
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
