//! Overlay composition: project the roadmap and an optional path onto a
//! colour image the same size as the grid that produced them (spec §4.3.5).
//!
//! Drawing reuses the corpus's raster-drawing crate (`imageproc`) rather
//! than hand-rolled scanline code; only the Bresenham line-of-sight check
//! used by [`Grid::can_connect`](crate::algorithms::grid::Grid::can_connect)
//! is hand-rolled, because that one has to match the spec's exact
//! cell-by-cell semantics.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::algorithms::{Grid, Roadmap};
use crate::messages::WorldOrd;

const EDGE_COLOUR: Rgb<u8> = Rgb([0, 0, 255]); // blue in the stored RGB buffer, stays blue after the BGR flip at the sink
const PATH_COLOUR: Rgb<u8> = Rgb([255, 0, 0]); // red in the stored RGB buffer, stays red after the BGR flip at the sink
const VERTEX_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);
const PATH_THICKNESS_OFFSETS: [(f32, f32); 3] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];

/// A composed overlay image, stored internally in RGB order and converted
/// to BGR only at the point it's handed to an external sink.
pub struct Overlay {
    image: RgbImage,
}

impl Overlay {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `overlay_out`'s wire format: BGR, 8-bit per channel, row-major.
    pub fn to_bgr_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.image.as_raw().len());
        for px in self.image.pixels() {
            out.push(px.0[2]);
            out.push(px.0[1]);
            out.push(px.0[0]);
        }
        out
    }

    pub fn as_rgb_image(&self) -> &RgbImage {
        &self.image
    }
}

fn pixel_of(grid: &Grid, p: WorldOrd) -> (f32, f32) {
    let cell = grid.world_to_cell(p);
    (cell.col as f32, cell.row as f32)
}

pub(crate) fn compose(roadmap: &Roadmap, grid: &Grid, path: Option<&[WorldOrd]>) -> Overlay {
    let width = grid.width_cells() as u32;
    let height = grid.height_cells() as u32;
    let mut image = RgbImage::new(width.max(1), height.max(1));

    for (u, v, _) in roadmap.graph().edges() {
        let (Some(pu), Some(pv)) = (ordinate(roadmap, u), ordinate(roadmap, v)) else {
            continue;
        };
        draw_line_segment_mut(&mut image, pixel_of(grid, pu), pixel_of(grid, pv), EDGE_COLOUR);
    }

    for &(v, ord) in roadmap.network() {
        if roadmap.graph().degree(v) == 0 {
            let (x, y) = pixel_of(grid, ord);
            draw_filled_circle_mut(&mut image, (x as i32, y as i32), 1, VERTEX_COLOUR);
        }
    }

    if let Some(path) = path {
        for window in path.windows(2) {
            let a = pixel_of(grid, window[0]);
            let b = pixel_of(grid, window[1]);
            for (dx, dy) in PATH_THICKNESS_OFFSETS {
                draw_line_segment_mut(&mut image, (a.0 + dx, a.1 + dy), (b.0 + dx, b.1 + dy), PATH_COLOUR);
            }
        }
    }

    Overlay { image }
}

fn ordinate(roadmap: &Roadmap, v: crate::algorithms::VertexId) -> Option<WorldOrd> {
    roadmap.network().iter().find(|(id, _)| *id == v).map(|(_, p)| *p)
}
