//! Pixel statistics inside each stall polygon

use super::ColorAnalysisConfig;
use crate::Result;
use crate::utils::ImageUtils;
use anyhow::Context;
use opencv::{
    core::{self, CV_8UC1, Mat, Point, Scalar, Size, Vector},
    imgproc::{self, LINE_8},
    prelude::*,
};
use stallwatch_core::{ColorMetrics, ColorSignal, FusionConfig, Zone, ZoneRegistry};
use tracing::{debug, warn};

/// Scores texture, edges and saturation per zone
pub struct ColorAnalyzer {
    config: ColorAnalysisConfig,
    fusion: FusionConfig,
}

impl ColorAnalyzer {
    pub fn new(config: ColorAnalysisConfig, fusion: FusionConfig) -> Self {
        Self { config, fusion }
    }

    /// Color signals for every zone that shows activity.
    ///
    /// Fails only when the frame itself cannot be converted; a zone whose
    /// statistics cannot be computed is logged and skipped.
    pub fn analyze(&self, image: &Mat, registry: &ZoneRegistry) -> Result<Vec<ColorSignal>> {
        let bgr = ImageUtils::ensure_bgr(image)?;

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut gray, imgproc::COLOR_BGR2GRAY)
            .context("Failed to convert frame to grayscale")?;
        let mut hsv = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut hsv, imgproc::COLOR_BGR2HSV)
            .context("Failed to convert frame to HSV")?;

        let mut signals = Vec::new();
        for zone in registry {
            let metrics = match self.zone_metrics(&gray, &hsv, zone) {
                Ok(Some(metrics)) => metrics,
                Ok(None) => {
                    debug!("Zone #{} has no pixels in frame, skipped", zone.index + 1);
                    continue;
                }
                Err(e) => {
                    warn!("Color analysis failed for zone #{}: {:#}", zone.index + 1, e);
                    continue;
                }
            };

            debug!(
                "Zone #{} color: variability {:.3}, edges {:.3}, saturation {:.3}",
                zone.index + 1,
                metrics.variability_score,
                metrics.edge_density,
                metrics.saturation_score
            );

            if let Some(signal) = ColorSignal::evaluate(zone.index, &metrics, &self.fusion) {
                debug!(
                    "Zone #{} color activity: combined {:.3}, confidence {:.3}",
                    zone.index + 1,
                    signal.combined_score,
                    signal.confidence_score
                );
                signals.push(signal);
            }
        }

        Ok(signals)
    }

    /// Normalised statistics over the zone's pixels, `None` when the zone
    /// covers no pixel of the frame
    pub fn zone_metrics(
        &self,
        gray: &Mat,
        hsv: &Mat,
        zone: &Zone,
    ) -> Result<Option<ColorMetrics>> {
        if !zone.is_valid() {
            return Ok(None);
        }

        let mask = Self::zone_mask(gray.size()?, zone)?;
        let zone_area = core::count_non_zero(&mask)?;
        if zone_area == 0 {
            return Ok(None);
        }

        // (a) intensity spread
        let mut mean = Mat::default();
        let mut stddev = Mat::default();
        core::mean_std_dev(gray, &mut mean, &mut stddev, &mask)
            .context("Failed to compute intensity spread")?;
        let variability_score = *stddev.at::<f64>(0)? / 255.0;

        // (b) edges of the masked region, counted inside the mask only
        let mut zone_gray = Mat::default();
        core::bitwise_and(gray, gray, &mut zone_gray, &mask)?;
        let mut edges = Mat::default();
        imgproc::canny(
            &zone_gray,
            &mut edges,
            self.config.canny_low,
            self.config.canny_high,
            self.config.canny_aperture,
            false,
        )
        .context("Canny failed")?;
        let mut zone_edges = Mat::default();
        core::bitwise_and(&edges, &edges, &mut zone_edges, &mask)?;
        let edge_density = core::count_non_zero(&zone_edges)? as f64 / zone_area as f64;

        // (c) mean saturation
        let hsv_mean = core::mean(hsv, &mask).context("Failed to compute saturation")?;
        let saturation_score = hsv_mean[1] / 255.0;

        Ok(Some(ColorMetrics::new(variability_score, edge_density, saturation_score)))
    }

    /// Single-channel mask, 255 inside the zone polygon
    fn zone_mask(size: Size, zone: &Zone) -> Result<Mat> {
        let mut mask =
            Mat::new_rows_cols_with_default(size.height, size.width, CV_8UC1, Scalar::all(0.0))?;

        let points: Vector<Point> = zone
            .polygon
            .iter()
            .map(|p| Point::new(p.x as i32, p.y as i32))
            .collect();
        let contour = Vector::<Vector<Point>>::from_iter([points]);

        imgproc::fill_poly(&mut mask, &contour, Scalar::all(255.0), LINE_8, 0, Point::new(0, 0))
            .context("Failed to rasterise zone polygon")?;

        Ok(mask)
    }
}

impl Default for ColorAnalyzer {
    fn default() -> Self {
        Self::new(ColorAnalysisConfig::default(), FusionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{CV_8UC3, Rect};
    use stallwatch_core::geometry::Point as ZonePoint;

    fn gray_frame(value: f64) -> Result<Mat> {
        Ok(Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(value))?)
    }

    fn paint(image: &mut Mat, rect: Rect, bgr: (f64, f64, f64)) -> Result<()> {
        imgproc::rectangle(image, rect, Scalar::new(bgr.0, bgr.1, bgr.2, 0.0), -1, LINE_8, 0)?;
        Ok(())
    }

    #[test]
    fn test_uniform_asphalt_is_quiet() -> Result<()> {
        let image = gray_frame(100.0)?;
        let signals = ColorAnalyzer::default().analyze(&image, &ZoneRegistry::default_layout())?;
        assert!(signals.is_empty());
        Ok(())
    }

    #[test]
    fn test_saturated_paint_raises_signal() -> Result<()> {
        let mut image = gray_frame(100.0)?;
        // pure red over stall #3 (x 250-340, y 200-310)
        paint(&mut image, Rect::new(250, 200, 91, 111), (0.0, 0.0, 255.0))?;

        let signals = ColorAnalyzer::default().analyze(&image, &ZoneRegistry::default_layout())?;
        assert_eq!(signals.len(), 1);

        let signal = &signals[0];
        assert_eq!(signal.zone_index, 2);
        assert!(signal.saturation_score > 0.99);
        assert!(signal.variability_score < 0.01);
        assert!(signal.confidence_score > 0.39 && signal.confidence_score < 0.9);
        Ok(())
    }

    #[test]
    fn test_texture_raises_signal() -> Result<()> {
        let mut image = gray_frame(100.0)?;
        // black/white checkerboard over stall #6 (x 140-230, y 330-440)
        for row in 0..14 {
            for col in 0..12 {
                let shade = if (row + col) % 2 == 0 { 0.0 } else { 255.0 };
                let square = Rect::new(140 + col * 8, 330 + row * 8, 8, 8);
                paint(&mut image, square, (shade, shade, shade))?;
            }
        }

        let signals = ColorAnalyzer::default().analyze(&image, &ZoneRegistry::default_layout())?;
        let signal = signals.iter().find(|s| s.zone_index == 5).expect("textured zone signals");

        assert!(signal.variability_score > 0.4);
        assert!(signal.edge_density > 0.05);
        assert!(signal.saturation_score < 0.01);
        assert!(signals.iter().all(|s| s.zone_index == 5));
        Ok(())
    }

    #[test]
    fn test_out_of_frame_and_degenerate_zones_are_skipped() -> Result<()> {
        let registry = ZoneRegistry::from_polygons(vec![
            vec![
                ZonePoint::new(1000.0, 1000.0),
                ZonePoint::new(1100.0, 1000.0),
                ZonePoint::new(1100.0, 1100.0),
                ZonePoint::new(1000.0, 1100.0),
            ],
            vec![ZonePoint::new(10.0, 10.0), ZonePoint::new(100.0, 100.0)],
        ]);

        let analyzer = ColorAnalyzer::default();
        let mut image = gray_frame(100.0)?;
        paint(&mut image, Rect::new(0, 0, 640, 480), (255.0, 0.0, 0.0))?;

        assert!(analyzer.analyze(&image, &registry)?.is_empty());

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&image, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        let mut hsv = Mat::default();
        imgproc::cvt_color_def(&image, &mut hsv, imgproc::COLOR_BGR2HSV)?;
        for zone in &registry {
            assert!(analyzer.zone_metrics(&gray, &hsv, zone)?.is_none());
        }
        Ok(())
    }

    #[test]
    fn test_single_channel_frame() -> Result<()> {
        let image = Mat::new_rows_cols_with_default(480, 640, CV_8UC1, Scalar::all(120.0))?;
        let signals = ColorAnalyzer::default().analyze(&image, &ZoneRegistry::default_layout())?;
        assert!(signals.is_empty());
        Ok(())
    }
}
