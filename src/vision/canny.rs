//! Canny edge map: Sobel gradients, L1 magnitude, non-maximum suppression
//! and 8-connected hysteresis.

use image::GrayImage;

use super::filters::sobel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyThresholds {
    pub low: f64,
    pub high: f64,
}

/// Binary edge map, row-major, `true` for edge pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    pub width: usize,
    pub height: usize,
    pub edges: Vec<bool>,
}

impl EdgeMap {
    pub fn count(&self) -> usize {
        self.edges.iter().filter(|e| **e).count()
    }

    /// Fraction of pixels that are edges.
    pub fn density(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.count() as f64 / self.edges.len() as f64
    }

    #[inline]
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        self.edges[y * self.width + x]
    }
}

// tan(22.5°) in Q15.
const TG22: i64 = 13573;
const SHIFT: u32 = 15;

const NONE: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

pub fn canny(gray: &GrayImage, thresholds: CannyThresholds) -> EdgeMap {
    let grad = sobel(gray);
    let (w, h) = (grad.width, grad.height);

    let magnitude: Vec<i64> = grad
        .dx
        .iter()
        .zip(&grad.dy)
        .map(|(dx, dy)| (dx.abs() + dy.abs()) as i64)
        .collect();
    // Outside the image counts as zero magnitude.
    let mag = |x: i64, y: i64| -> i64 {
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            0
        } else {
            magnitude[y as usize * w + x as usize]
        }
    };

    let mut state = vec![NONE; w * h];
    let mut stack = Vec::new();

    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let idx = y as usize * w + x as usize;
            let m = magnitude[idx];
            if (m as f64) <= thresholds.low {
                continue;
            }

            let dx = grad.dx[idx] as i64;
            let dy = grad.dy[idx] as i64;
            let xs = dx.abs();
            let ys = dy.abs() << SHIFT;
            let tg22x = xs * TG22;

            let is_max = if ys < tg22x {
                m > mag(x - 1, y) && m >= mag(x + 1, y)
            } else {
                let tg67x = tg22x + (xs << (SHIFT + 1));
                if ys > tg67x {
                    m > mag(x, y - 1) && m >= mag(x, y + 1)
                } else {
                    let s = if (dx ^ dy) < 0 { -1 } else { 1 };
                    m > mag(x - s, y - 1) && m >= mag(x + s, y + 1)
                }
            };

            if !is_max {
                continue;
            }
            if m as f64 > thresholds.high {
                state[idx] = STRONG;
                stack.push(idx);
            } else {
                state[idx] = WEAK;
            }
        }
    }

    while let Some(idx) = stack.pop() {
        let (x, y) = ((idx % w) as i64, (idx / w) as i64);
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if state[n] == WEAK {
                    state[n] = STRONG;
                    stack.push(n);
                }
            }
        }
    }

    EdgeMap {
        width: w,
        height: h,
        edges: state.into_iter().map(|s| s == STRONG).collect(),
    }
}
