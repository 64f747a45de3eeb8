//! Bar-chart rasterization for the stats page. Charts are drawn into an
//! in-memory RGB frame, PNG-encoded and returned as base64 data URIs so the
//! page embeds them without separate image requests.

use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::FontTransform;

use crate::stats::DepartmentAverage;

const FALLBACK_COLOR: RGBColor = RGBColor(150, 150, 150);

/// Total mapping: the five known departments get fixed colors, anything
/// else the neutral fallback, so rendering never fails on an unseen value.
pub fn department_color(department: &str) -> RGBColor {
    match department {
        "Marketing" => RGBColor(66, 133, 244),
        "Sales" => RGBColor(219, 68, 55),
        "Engineering" => RGBColor(15, 157, 88),
        "HR" => RGBColor(244, 180, 0),
        "Support" => RGBColor(171, 71, 188),
        _ => FALLBACK_COLOR,
    }
}

/// Explicit renderer configuration, held in app state and passed into the
/// stats assembly. Nothing about rendering is process-global.
#[derive(Clone, Copy, Debug)]
pub struct ChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            width: 640,
            height: 420,
        }
    }
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Render one category as a PNG bar chart, one bar per department,
    /// y axis fixed to [0, 5]. An empty dataset yields an axis-only chart.
    pub fn render_bar_chart(&self, title: &str, bars: &[DepartmentAverage]) -> Result<String> {
        let mut frame = vec![0u8; (self.width * self.height * 3) as usize];
        self.draw(&mut frame, title, bars)
            .map_err(|err| anyhow!("chart rendering failed: {err}"))?;

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&frame, self.width, self.height, ExtendedColorType::Rgb8)
            .context("png encoding failed")?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
    }

    fn draw(
        &self,
        frame: &mut [u8],
        title: &str,
        bars: &[DepartmentAverage],
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::with_buffer(frame, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let segments = bars.len().max(1) as u32;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(80)
            .y_label_area_size(44)
            .build_cartesian_2d((0u32..segments).into_segmented(), 0f64..5f64)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|position| match position {
                SegmentValue::CenterOf(index) | SegmentValue::Exact(index) => bars
                    .get(*index as usize)
                    .map(|bar| bar.department.clone())
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            })
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc("Average rating")
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(index, bar)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(index as u32), 0.0),
                    (SegmentValue::Exact(index as u32 + 1), bar.average),
                ],
                department_color(&bar.department).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}
