//! Raster Image Adapter
//!
//! Draws the box plot into an in-process RGBA buffer and encodes it as PNG.
//! The result is a static image: there is nothing to select and resizing
//! would need a full redraw, so both are no-ops.

use crate::option::axis_floor;
use crate::selection::SelectionHandler;
use crate::{ChartAdapter, ContainerId, RenderError};
use fxhash::FxHashMap;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use yieldbench_core::{Dataset, RenderMetrics, Timer};

const MARGIN: u32 = 40;
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AXIS: Rgba<u8> = Rgba([64, 64, 64, 255]);
const BOX_FILL: Rgba<u8> = Rgba([173, 198, 230, 255]);
const BOX_EDGE: Rgba<u8> = Rgba([49, 99, 163, 255]);
const MEDIAN: Rgba<u8> = Rgba([200, 40, 40, 255]);
const WAFER: Rgba<u8> = Rgba([30, 30, 30, 160]);

/// Encoded chart for one container
#[derive(Debug, Clone)]
pub struct RasterChart {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// PNG-encoded image
    pub png: Vec<u8>,
}

/// Pixel geometry of one lot's box
struct BoxGeometry {
    left: u32,
    right: u32,
    center: u32,
    min: u32,
    q1: u32,
    median: u32,
    q3: u32,
    max: u32,
}

/// Maps data coordinates onto the plot area
struct Layout {
    width: u32,
    height: u32,
    categories: usize,
    y_min: f64,
    y_max: f64,
}

impl Layout {
    fn plot_width(&self) -> f64 {
        f64::from(self.width - 2 * MARGIN)
    }

    fn plot_height(&self) -> f64 {
        f64::from(self.height - 2 * MARGIN)
    }

    fn x(&self, category: f64) -> u32 {
        let slot = self.plot_width() / self.categories as f64;
        MARGIN + (slot * (category + 0.5)) as u32
    }

    fn y(&self, value: f64) -> u32 {
        let span = (self.y_max - self.y_min).max(f64::EPSILON);
        let ratio = ((value - self.y_min) / span).clamp(0.0, 1.0);
        self.height - MARGIN - (ratio * self.plot_height()) as u32
    }

    fn half_box(&self) -> u32 {
        let slot = self.plot_width() / self.categories as f64;
        ((slot * 0.3) as u32).max(1)
    }
}

fn fill_rect(img: &mut RgbaImage, x0: u32, x1: u32, y0: u32, y1: u32, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    for y in y0.min(y1)..=y0.max(y1).min(h - 1) {
        for x in x0.min(x1)..=x0.max(x1).min(w - 1) {
            img.put_pixel(x, y, color);
        }
    }
}

fn hline(img: &mut RgbaImage, x0: u32, x1: u32, y: u32, color: Rgba<u8>) {
    fill_rect(img, x0, x1, y, y, color);
}

fn vline(img: &mut RgbaImage, x: u32, y0: u32, y1: u32, color: Rgba<u8>) {
    fill_rect(img, x, x, y0, y1, color);
}

/// Static PNG box plot
pub struct RasterImageAdapter {
    width: u32,
    height: u32,
    charts: FxHashMap<ContainerId, RasterChart>,
}

impl RasterImageAdapter {
    /// Library name reported in metrics
    pub const LIBRARY: &'static str = "raster";

    /// Adapter drawing `width` x `height` images
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            charts: FxHashMap::default(),
        }
    }

    /// Last image rendered into `container`
    pub fn chart(&self, container: &ContainerId) -> Option<&RasterChart> {
        self.charts.get(container)
    }

    /// PNG bytes of the last image rendered into `container`
    pub fn png(&self, container: &ContainerId) -> Option<&[u8]> {
        self.chart(container).map(|c| c.png.as_slice())
    }

    fn layout(&self, dataset: &Dataset) -> Layout {
        Layout {
            width: self.width,
            height: self.height,
            categories: dataset.metadata().total_lots.max(1),
            y_min: axis_floor(dataset),
            y_max: 100.0,
        }
    }
}

impl Default for RasterImageAdapter {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl ChartAdapter for RasterImageAdapter {
    fn library(&self) -> &str {
        Self::LIBRARY
    }

    fn supports_selection(&self) -> bool {
        false
    }

    fn render_box_plot(
        &mut self,
        container: &ContainerId,
        dataset: &Dataset,
    ) -> Result<RenderMetrics, RenderError> {
        let total = Timer::start();
        container.ensure_valid()?;
        if self.width <= 2 * MARGIN || self.height <= 2 * MARGIN {
            return Err(RenderError::Draw(format!(
                "canvas {}x{} is smaller than its margins",
                self.width, self.height
            )));
        }

        let init = Timer::start();
        self.charts.remove(container);
        let mut img = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        let init_ms = init.elapsed_ms();

        let binding = Timer::start();
        let layout = &self.layout(dataset);
        let half = layout.half_box();
        let boxes: Vec<BoxGeometry> = dataset
            .lots()
            .enumerate()
            .map(|(index, (_, lot))| {
                let s = lot.stats();
                let center = layout.x(index as f64);
                BoxGeometry {
                    left: center.saturating_sub(half),
                    right: center + half,
                    center,
                    min: layout.y(s.min),
                    q1: layout.y(s.q1),
                    median: layout.y(s.median),
                    q3: layout.y(s.q3),
                    max: layout.y(s.max),
                }
            })
            .collect();
        let wafers: Vec<(u32, u32)> = dataset
            .lots()
            .enumerate()
            .flat_map(|(index, (_, lot))| {
                let x = layout.x(index as f64);
                lot.wafers().iter().map(move |w| (x, layout.y(w.value())))
            })
            .collect();
        let data_binding_ms = binding.elapsed_ms();

        let draw = Timer::start();
        let bottom = self.height - MARGIN;
        hline(&mut img, MARGIN, self.width - MARGIN, bottom, AXIS);
        vline(&mut img, MARGIN, MARGIN, bottom, AXIS);
        for b in &boxes {
            vline(&mut img, b.center, b.max, b.q3, BOX_EDGE);
            vline(&mut img, b.center, b.q1, b.min, BOX_EDGE);
            hline(&mut img, b.left, b.right, b.max, BOX_EDGE);
            hline(&mut img, b.left, b.right, b.min, BOX_EDGE);
            fill_rect(&mut img, b.left, b.right, b.q3, b.q1, BOX_FILL);
            hline(&mut img, b.left, b.right, b.median, MEDIAN);
        }
        for &(x, y) in &wafers {
            img.put_pixel(x.min(self.width - 1), y.min(self.height - 1), WAFER);
        }
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        let render_complete_ms = draw.elapsed_ms();

        tracing::debug!(%container, bytes = png.len(), "raster chart encoded");
        self.charts.insert(
            container.clone(),
            RasterChart {
                width: self.width,
                height: self.height,
                png,
            },
        );

        Ok(RenderMetrics::new(
            Self::LIBRARY,
            wafers.len(),
            init_ms,
            data_binding_ms,
            render_complete_ms,
            total.elapsed_ms(),
        ))
    }

    fn enable_rectangular_selection(&mut self, _handler: SelectionHandler) {
        tracing::debug!("raster charts are static; selection ignored");
    }

    fn clear_selection(&mut self) {}

    fn resize(&mut self) {}

    fn destroy(&mut self) {
        self.charts.clear();
    }
}
