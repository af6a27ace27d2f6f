//! PNG scatter-and-line plot of a regression fit.

use std::fs;
use std::path::Path;

use ab_glyph::{FontRef, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use tracing::{info, instrument};

use crate::IoError;

const FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

const TITLE: &str = "Linear Regression: Actual vs Predicted";
const X_LABEL: &str = "X";
const Y_LABEL: &str = "y";
const LEGEND: [&str; 2] = ["Actual", "Predicted"];

const MIN_SIDE: u32 = 100;
const GRID_DIVISIONS: u32 = 10;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const AXES: Rgb<u8> = Rgb([0, 0, 0]);
const POINT: Rgb<u8> = Rgb([31, 119, 180]);
const LINE: Rgb<u8> = Rgb([214, 39, 40]);
const LEGEND_EDGE: Rgb<u8> = Rgb([180, 180, 180]);

/// Renders actual test points as a blue scatter and the model's
/// predictions as a red line, over a light grid.
///
/// The figure carries a title, `X` and `y` axis labels and a legend in the
/// upper-left corner of the drawing area.
#[derive(Debug, Clone)]
pub struct RegressionPlot {
    width: u32,
    height: u32,
    point_radius: i32,
}

impl Default for RegressionPlot {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            point_radius: 4,
        }
    }
}

/// Linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
struct Axis {
    lo: f64,
    hi: f64,
    px_lo: f32,
    px_hi: f32,
}

impl Axis {
    fn fit(values: impl Iterator<Item = f64>, px_lo: f32, px_hi: f32) -> Self {
        let (mut lo, mut hi) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if lo > hi {
            (lo, hi) = (0.0, 1.0);
        } else if hi - lo == 0.0 {
            (lo, hi) = (lo - 0.5, hi + 0.5);
        }
        let pad = (hi - lo) * 0.05;
        Self {
            lo: lo - pad,
            hi: hi + pad,
            px_lo,
            px_hi,
        }
    }

    fn to_px(self, v: f64) -> f32 {
        let t = (v - self.lo) / (self.hi - self.lo);
        self.px_lo + (self.px_hi - self.px_lo) * t as f32
    }
}

impl RegressionPlot {
    /// Create a plot of `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidPlotSize`] if either side is below 100 pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, IoError> {
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(IoError::InvalidPlotSize {
                width,
                height,
                min: MIN_SIDE,
            });
        }
        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    /// Set the scatter marker radius in pixels.
    #[must_use]
    pub fn with_point_radius(mut self, point_radius: u32) -> Self {
        self.point_radius = point_radius.min(50) as i32;
        self
    }

    /// Return the width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Return the height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Draw the plot in memory.
    ///
    /// `x[i]` pairs with both `actual[i]` and `predicted[i]`. Points with a
    /// non-finite coordinate are skipped.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::EmptyPlot`] | `x` is empty |
    /// | [`IoError::PlotLengthMismatch`] | a series differs in length from `x` |
    /// | [`IoError::InvalidFont`] | the label font cannot be parsed |
    pub fn render(&self, x: &[f64], actual: &[f64], predicted: &[f64]) -> Result<RgbImage, IoError> {
        if x.is_empty() {
            return Err(IoError::EmptyPlot);
        }
        for series in [actual, predicted] {
            if series.len() != x.len() {
                return Err(IoError::PlotLengthMismatch {
                    n_x: x.len(),
                    n_y: series.len(),
                });
            }
        }

        let margin = (self.width.min(self.height) / 10) as f32;
        let (w, h) = (self.width as f32, self.height as f32);
        let x_axis = Axis::fit(x.iter().copied(), margin, w - margin);
        // Pixel rows grow downwards.
        let y_axis = Axis::fit(
            actual.iter().chain(predicted).copied(),
            h - margin,
            margin,
        );

        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);

        for i in 0..=GRID_DIVISIONS {
            let t = i as f32 / GRID_DIVISIONS as f32;
            let gx = margin + (w - 2.0 * margin) * t;
            let gy = margin + (h - 2.0 * margin) * t;
            draw_line_segment_mut(&mut img, (gx, margin), (gx, h - margin), GRID);
            draw_line_segment_mut(&mut img, (margin, gy), (w - margin, gy), GRID);
        }
        let frame = Rect::at(margin as i32, margin as i32)
            .of_size((w - 2.0 * margin) as u32, (h - 2.0 * margin) as u32);
        draw_hollow_rect_mut(&mut img, frame, AXES);

        for (&xv, &yv) in x.iter().zip(actual) {
            if xv.is_finite() && yv.is_finite() {
                let center = (x_axis.to_px(xv).round() as i32, y_axis.to_px(yv).round() as i32);
                draw_filled_circle_mut(&mut img, center, self.point_radius, POINT);
            }
        }

        let mut line: Vec<(f64, f64)> = x
            .iter()
            .copied()
            .zip(predicted.iter().copied())
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .collect();
        line.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in line.windows(2) {
            let start = (x_axis.to_px(pair[0].0), y_axis.to_px(pair[0].1));
            let end = (x_axis.to_px(pair[1].0), y_axis.to_px(pair[1].1));
            draw_line_segment_mut(&mut img, start, end, LINE);
        }

        let font = FontRef::try_from_slice(FONT).map_err(|source| IoError::InvalidFont { source })?;
        self.draw_labels(&mut img, &font, margin);
        self.draw_legend(&mut img, &font, margin);

        Ok(img)
    }

    fn draw_labels(&self, img: &mut RgbImage, font: &FontRef<'_>, margin: f32) {
        let (w, h) = (self.width as i32, self.height as i32);
        let m = margin as i32;

        let title_scale = PxScale::from((margin * 0.4).max(8.0));
        let (tw, th) = text_size(title_scale, font, TITLE);
        draw_text_mut(img, AXES, (w - tw as i32) / 2, (m - th as i32) / 2, title_scale, font, TITLE);

        let label_scale = PxScale::from((margin * 0.3).max(8.0));
        let (lw, lh) = text_size(label_scale, font, X_LABEL);
        draw_text_mut(
            img,
            AXES,
            (w - lw as i32) / 2,
            h - m + (m - lh as i32) / 2,
            label_scale,
            font,
            X_LABEL,
        );
        let (lw, lh) = text_size(label_scale, font, Y_LABEL);
        draw_text_mut(
            img,
            AXES,
            (m - lw as i32) / 2,
            (h - lh as i32) / 2,
            label_scale,
            font,
            Y_LABEL,
        );
    }

    fn draw_legend(&self, img: &mut RgbImage, font: &FontRef<'_>, margin: f32) {
        let scale = PxScale::from((margin * 0.25).max(8.0));
        let text_h = LEGEND
            .iter()
            .map(|label| text_size(scale, font, label).1)
            .max()
            .unwrap_or(0) as i32;
        let text_w = LEGEND
            .iter()
            .map(|label| text_size(scale, font, label).0)
            .max()
            .unwrap_or(0) as i32;

        let pad = 6;
        let key_w = 3 * self.point_radius.max(4);
        let row_h = text_h.max(2 * self.point_radius) + pad;
        let x0 = margin as i32 + pad;
        let y0 = margin as i32 + pad;
        let box_w = pad + key_w + pad + text_w + pad;
        let box_h = pad + 2 * row_h;

        let frame = Rect::at(x0, y0).of_size(box_w as u32, box_h as u32);
        draw_filled_rect_mut(img, frame, BACKGROUND);
        draw_hollow_rect_mut(img, frame, LEGEND_EDGE);

        let key_x = x0 + pad;
        let text_x = key_x + key_w + pad;
        for (row, label) in LEGEND.iter().enumerate() {
            let top = y0 + pad + row as i32 * row_h;
            let mid = top + text_h / 2;
            if row == 0 {
                draw_filled_circle_mut(img, (key_x + key_w / 2, mid), self.point_radius, POINT);
            } else {
                let y = mid as f32;
                draw_line_segment_mut(img, (key_x as f32, y), ((key_x + key_w) as f32, y), LINE);
            }
            draw_text_mut(img, AXES, text_x, top, scale, font, label);
        }
    }

    /// Render and write the plot to `path` as PNG, creating parent directories.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::EmptyPlot`] | `x` is empty |
    /// | [`IoError::PlotLengthMismatch`] | a series differs in length from `x` |
    /// | [`IoError::InvalidFont`] | the label font cannot be parsed |
    /// | [`IoError::OutputDirCreate`] | a parent directory cannot be created |
    /// | [`IoError::EncodePng`] | encoding or writing failed |
    #[instrument(skip_all, fields(path = %path.display(), n_points = x.len()))]
    pub fn save(
        &self,
        path: &Path,
        x: &[f64],
        actual: &[f64],
        predicted: &[f64],
    ) -> Result<(), IoError> {
        let img = self.render(x, actual, predicted)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| IoError::OutputDirCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        img.save_with_format(path, ImageFormat::Png)
            .map_err(|source| IoError::EncodePng {
                path: path.to_path_buf(),
                source,
            })?;
        info!(width = self.width, height = self.height, "plot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_points_and_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let actual = [0.0, 5.0, 0.0, 5.0];
        let predicted = [1.0, 2.0, 3.0, 4.0];
        let img = RegressionPlot::default().render(&x, &actual, &predicted).unwrap();

        assert_eq!(img.dimensions(), (1000, 600));
        assert!(img.pixels().any(|p| *p == POINT));
        assert!(img.pixels().any(|p| *p == LINE));
        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn draws_title_axis_labels_and_legend() {
        // Data rise from lower left to upper right, leaving the legend corner clear.
        let x = [0.0, 1.0, 2.0, 3.0];
        let actual = [0.0, 1.0, 2.0, 3.0];
        let img = RegressionPlot::default().render(&x, &actual, &actual).unwrap();
        let (w, h) = img.dimensions();
        let margin = w.min(h) / 10;

        let inked = |x_range: std::ops::Range<u32>, y_range: std::ops::Range<u32>| {
            y_range.flat_map(|y| x_range.clone().map(move |x| (x, y))).any(|(x, y)| {
                let p = *img.get_pixel(x, y);
                p != BACKGROUND && p != GRID
            })
        };
        assert!(inked(0..w, 0..margin - 1), "title missing");
        assert!(inked(margin..w - margin, h - margin + 1..h), "x label missing");
        assert!(inked(0..margin - 1, margin..h - margin), "y label missing");

        let legend = |colour: Rgb<u8>| {
            (margin..margin + 150)
                .flat_map(|y| (margin..margin + 150).map(move |x| (x, y)))
                .any(|(x, y)| *img.get_pixel(x, y) == colour)
        };
        assert!(legend(POINT), "legend marker for actual values missing");
        assert!(legend(LINE), "legend key for predictions missing");
        assert!(legend(LEGEND_EDGE));
    }

    #[test]
    fn single_point_is_drawable() {
        let img = RegressionPlot::new(200, 100)
            .unwrap()
            .render(&[1.0], &[1.0], &[1.0])
            .unwrap();
        assert_eq!(img.dimensions(), (200, 100));
        assert!(img.pixels().any(|p| *p == POINT));
    }

    #[test]
    fn rejects_bad_input() {
        let plot = RegressionPlot::default();
        assert!(matches!(plot.render(&[], &[], &[]), Err(IoError::EmptyPlot)));
        assert!(matches!(
            plot.render(&[1.0, 2.0], &[1.0], &[1.0, 2.0]),
            Err(IoError::PlotLengthMismatch { n_x: 2, n_y: 1 })
        ));
        assert!(matches!(
            RegressionPlot::new(50, 600),
            Err(IoError::InvalidPlotSize { width: 50, .. })
        ));
    }
}
