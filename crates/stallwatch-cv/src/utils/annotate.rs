//! Frame annotation: object boxes and stall status overlays

use crate::Result;
use crate::detection::{OccupancyResult, VisualizationConfig};
use anyhow::Context;
use opencv::{
    core::{self, Mat, Point, Rect, Scalar, Vector},
    imgproc::{self, LINE_8},
};
use stallwatch_core::{DetectedObject, ZoneRegistry};

/// BGR colors
const OBJECT_COLOR: (u8, u8, u8) = (0, 255, 255);
const OCCUPIED_COLOR: (u8, u8, u8) = (0, 0, 255);
const FREE_COLOR: (u8, u8, u8) = (0, 255, 0);

fn bgr_scalar((b, g, r): (u8, u8, u8)) -> Scalar {
    Scalar::new(b as f64, g as f64, r as f64, 255.0)
}

/// Draws analysis results onto a copy of the frame
pub struct Annotator {
    config: VisualizationConfig,
}

impl Annotator {
    pub fn new(config: VisualizationConfig) -> Self {
        Self { config }
    }

    /// Render accepted objects and every zone colored by its verdict
    pub fn draw(
        &self,
        image: &Mat,
        registry: &ZoneRegistry,
        result: &OccupancyResult,
    ) -> Result<Mat> {
        let mut output = image.clone();

        if self.config.draw_objects {
            self.draw_objects(&mut output, &result.objects)?;
        }

        if self.config.draw_zones {
            let polygons: Vec<(Vector<Point>, Scalar)> = registry
                .iter()
                .filter(|zone| zone.is_valid())
                .map(|zone| {
                    let points: Vector<Point> = zone
                        .polygon
                        .iter()
                        .map(|p| Point::new(p.x as i32, p.y as i32))
                        .collect();
                    let color = if result.is_occupied(zone.index) {
                        OCCUPIED_COLOR
                    } else {
                        FREE_COLOR
                    };
                    (points, bgr_scalar(color))
                })
                .collect();

            self.draw_zones(&mut output, &polygons)?;
        }

        Ok(output)
    }

    fn draw_objects(&self, output: &mut Mat, objects: &[DetectedObject]) -> Result<()> {
        for object in objects {
            let rect = Rect::new(
                object.bbox.x1 as i32,
                object.bbox.y1 as i32,
                object.bbox.width() as i32,
                object.bbox.height() as i32,
            );
            imgproc::rectangle(
                output,
                rect,
                bgr_scalar(OBJECT_COLOR),
                self.config.object_thickness,
                LINE_8,
                0,
            )
            .context("Failed to draw object box")?;
        }

        Ok(())
    }

    fn draw_zones(&self, output: &mut Mat, polygons: &[(Vector<Point>, Scalar)]) -> Result<()> {
        for (points, color) in polygons {
            let contour = Vector::<Vector<Point>>::from_iter([points.clone()]);
            imgproc::polylines(
                output,
                &contour,
                true,
                *color,
                self.config.zone_thickness,
                LINE_8,
                0,
            )
            .context("Failed to draw zone outline")?;
        }

        if self.config.fill_alpha <= 0.0 {
            return Ok(());
        }

        let mut overlay = output.clone();
        for (points, color) in polygons {
            let contour = Vector::<Vector<Point>>::from_iter([points.clone()]);
            imgproc::fill_poly(&mut overlay, &contour, *color, LINE_8, 0, Point::new(0, 0))
                .context("Failed to fill zone")?;
        }

        let alpha = self.config.fill_alpha.min(1.0);
        let mut blended = Mat::default();
        core::add_weighted(&overlay, alpha, &*output, 1.0 - alpha, 0.0, &mut blended, -1)
            .context("Failed to blend zone overlay")?;
        *output = blended;

        Ok(())
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(VisualizationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::OccupancyResult;
    use opencv::core::{CV_8UC3, Vec3b};
    use opencv::prelude::*;
    use stallwatch_core::{BBox, FusionEngine, OccupancySummary};

    #[test]
    fn test_zone_colors_follow_verdicts() -> Result<()> {
        let registry = ZoneRegistry::default_layout();
        let objects = vec![DetectedObject::new(BBox::new(40.0, 210.0, 110.0, 300.0), "car", 0.9)];
        let outcome = FusionEngine::default().analyze(&registry, &objects, &[]);
        let summary = OccupancySummary::from_zones(&outcome.zones);
        let result = OccupancyResult {
            zones: outcome.zones,
            occupied: outcome.occupied,
            summary,
            objects,
            rejected: Vec::new(),
            color_signals: Vec::new(),
        };

        let image = Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(0.0))?;
        let annotated = Annotator::default().draw(&image, &registry, &result)?;

        // interior of zone 1 (occupied) is tinted red, zone 2 (free) green
        let occupied = *annotated.at_2d::<Vec3b>(255, 75)?;
        assert!(occupied[2] > 0 && occupied[1] == 0);
        let free = *annotated.at_2d::<Vec3b>(255, 185)?;
        assert!(free[1] > 0 && free[2] == 0);

        // the input frame is untouched
        assert_eq!(*image.at_2d::<Vec3b>(255, 75)?, Vec3b::all(0));
        Ok(())
    }
}
