//! Pixel-level primitives shared by the role extractors.
//!
//! All arithmetic is done in `f64` over fixed iteration orders so results
//! are bit-reproducible for identical input.

use image::GrayImage;

/// Row-major floating point plane with the same geometry as its source image.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatPlane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
}

impl FloatPlane {
    pub fn from_gray(gray: &GrayImage) -> Self {
        Self {
            width: gray.width() as usize,
            height: gray.height() as usize,
            data: gray.as_raw().iter().map(|&v| v as f64).collect(),
        }
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    pub fn mean(&self) -> f64 {
        mean(&self.data)
    }

    pub fn variance(&self) -> f64 {
        variance(&self.data)
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance, two-pass.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Mean and population standard deviation of the gray levels.
pub fn brightness_stats(gray: &GrayImage) -> (f64, f64) {
    let plane = FloatPlane::from_gray(gray);
    (plane.mean(), plane.variance().sqrt())
}

/// Mirror index without repeating the edge pixel (`dcb|abcd|cba`).
#[inline]
pub fn reflect101(index: i64, len: usize) -> usize {
    let n = len as i64;
    if n <= 1 {
        return 0;
    }
    let mut i = index;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

#[inline]
pub fn clamp_index(index: i64, len: usize) -> usize {
    index.clamp(0, len as i64 - 1) as usize
}

/// 4-neighbour Laplacian (`[0 1 0; 1 -4 1; 0 1 0]`), mirrored borders.
pub fn laplacian(gray: &GrayImage) -> FloatPlane {
    let src = FloatPlane::from_gray(gray);
    let (w, h) = (src.width, src.height);
    let mut data = Vec::with_capacity(w * h);

    for y in 0..h {
        let up = reflect101(y as i64 - 1, h);
        let down = reflect101(y as i64 + 1, h);
        for x in 0..w {
            let left = reflect101(x as i64 - 1, w);
            let right = reflect101(x as i64 + 1, w);
            let response = src.at(x, up) + src.at(x, down) + src.at(left, y) + src.at(right, y)
                - 4.0 * src.at(x, y);
            data.push(response);
        }
    }

    FloatPlane {
        width: w,
        height: h,
        data,
    }
}

/// Normalized `size`×`size` box filter over `plane`, mirrored borders.
pub fn box_mean(plane: &FloatPlane, size: usize) -> FloatPlane {
    let (w, h) = (plane.width, plane.height);
    let radius = (size / 2) as i64;
    let area = (size * size) as f64;

    // Separable: horizontal sums, then vertical sums of those.
    let mut horizontal = vec![0.0; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for dx in -radius..=radius {
                sum += plane.at(reflect101(x as i64 + dx, w), y);
            }
            horizontal[y * w + x] = sum;
        }
    }

    let mut data = vec![0.0; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for dy in -radius..=radius {
                sum += horizontal[reflect101(y as i64 + dy, h) * w + x];
            }
            data[y * w + x] = sum / area;
        }
    }

    FloatPlane {
        width: w,
        height: h,
        data,
    }
}

/// Mean over all pixels of the local standard deviation in a `size`×`size` window.
pub fn mean_local_std(gray: &GrayImage, size: usize) -> f64 {
    let plane = FloatPlane::from_gray(gray);
    let squares = FloatPlane {
        width: plane.width,
        height: plane.height,
        data: plane.data.iter().map(|v| v * v).collect(),
    };

    let local_mean = box_mean(&plane, size);
    let local_sq_mean = box_mean(&squares, size);

    let stds: Vec<f64> = local_mean
        .data
        .iter()
        .zip(&local_sq_mean.data)
        .map(|(m, sq)| (sq - m * m).max(0.0).sqrt())
        .collect();
    mean(&stds)
}

/// 3×3 Sobel derivatives with replicated borders, as integers.
pub struct Gradients {
    pub width: usize,
    pub height: usize,
    pub dx: Vec<i32>,
    pub dy: Vec<i32>,
}

pub fn sobel(gray: &GrayImage) -> Gradients {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let raw = gray.as_raw();
    let px = |x: i64, y: i64| raw[clamp_index(y, h) * w + clamp_index(x, w)] as i32;

    let mut dx = Vec::with_capacity(w * h);
    let mut dy = Vec::with_capacity(w * h);
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let gx = -px(x - 1, y - 1) + px(x + 1, y - 1) - 2 * px(x - 1, y)
                + 2 * px(x + 1, y)
                - px(x - 1, y + 1)
                + px(x + 1, y + 1);
            let gy = -px(x - 1, y - 1) - 2 * px(x, y - 1) - px(x + 1, y - 1)
                + px(x - 1, y + 1)
                + 2 * px(x, y + 1)
                + px(x + 1, y + 1);
            dx.push(gx);
            dy.push(gy);
        }
    }

    Gradients {
        width: w,
        height: h,
        dx,
        dy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn reflect101_mirrors_without_edge_repeat() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(6, 5), 2);
        assert_eq!(reflect101(-2, 2), 0);
        assert_eq!(reflect101(3, 1), 0);
    }

    #[test]
    fn flat_image_has_no_laplacian_response() {
        let gray = GrayImage::from_pixel(6, 4, Luma([90]));
        let lap = laplacian(&gray);
        assert!(lap.data.iter().all(|v| *v == 0.0));
        assert_eq!(lap.variance(), 0.0);
    }

    #[test]
    fn laplacian_of_single_spike() {
        let mut gray = GrayImage::from_pixel(5, 5, Luma([0]));
        gray.put_pixel(2, 2, Luma([10]));
        let lap = laplacian(&gray);
        assert_eq!(lap.at(2, 2), -40.0);
        assert_eq!(lap.at(1, 2), 10.0);
        assert_eq!(lap.at(0, 0), 0.0);
    }

    #[test]
    fn brightness_stats_of_two_levels() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([if x < 2 { 100 } else { 200 }]));
        let (mean, std) = brightness_stats(&gray);
        assert_eq!(mean, 150.0);
        assert_eq!(std, 50.0);
    }

    #[test]
    fn local_std_is_zero_on_flat_image() {
        let gray = GrayImage::from_pixel(8, 8, Luma([200]));
        assert_eq!(mean_local_std(&gray, 5), 0.0);
    }

    #[test]
    fn box_mean_preserves_constant() {
        let gray = GrayImage::from_pixel(3, 3, Luma([7]));
        let plane = FloatPlane::from_gray(&gray);
        let blurred = box_mean(&plane, 5);
        assert!(blurred.data.iter().all(|v| (*v - 7.0).abs() < 1e-12));
    }

    #[test]
    fn sobel_detects_vertical_step() {
        let gray = GrayImage::from_fn(4, 3, |x, _| Luma([if x < 2 { 0 } else { 100 }]));
        let grad = sobel(&gray);
        assert_eq!(grad.dx[1 * 4 + 1], 400);
        assert_eq!(grad.dy[1 * 4 + 1], 0);
        assert_eq!(grad.dx[1 * 4 + 0], 0);
    }
}
