use crate::bitgrid::BitGrid;
use crate::config::{ALIVE_COLOR, DEAD_COLOR, GRID_COLOR};

/// Backing-store side length for a grid axis of `cells` cells: one
/// (cell_size + 1)-pixel pitch per cell plus the closing border line.
pub fn surface_extent(cells: u32, cell_size: u32) -> u32 {
    (cell_size + 1) * cells + 1
}

/// Fixed-size RGBA8 raster surface the grid is drawn onto.
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Frame {
    /// Surface sized for a `width` x `height` cell grid.
    pub fn for_grid(width: u32, height: u32, cell_size: u32) -> Self {
        let w = surface_extent(width, cell_size);
        let h = surface_extent(height, cell_size);
        Self {
            width: w,
            height: h,
            pixels: vec![DEAD_COLOR; (w * h) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Raw pixel data for texture upload.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: u32) {
        for row in y..y + h {
            let start = (row * self.width + x) as usize;
            self.pixels[start..start + w as usize].fill(color);
        }
    }
}

/// Stroke the (width + 1) vertical and (height + 1) horizontal
/// one-pixel gridlines on the cell pitch. Full redraw, no diffing.
pub fn draw_grid(frame: &mut Frame, width: u32, height: u32, cell_size: u32) {
    let pitch = cell_size + 1;
    for i in 0..=width {
        frame.fill_rect(i * pitch, 0, 1, frame.height(), GRID_COLOR);
    }
    for j in 0..=height {
        frame.fill_rect(0, j * pitch, frame.width(), 1, GRID_COLOR);
    }
}

/// Fill every cell square, alive or dead, from the decoded buffer.
///
/// Cell (row, col) occupies the cell_size square at pixel offset
/// (col * (cell_size + 1) + 1, row * (cell_size + 1) + 1), one pixel in
/// from the gridlines.
pub fn draw_cells(frame: &mut Frame, cells: &BitGrid<'_>, width: u32, height: u32, cell_size: u32) {
    let pitch = cell_size + 1;
    for row in 0..height {
        for col in 0..width {
            let color = if cells.get(row, col) {
                ALIVE_COLOR
            } else {
                DEAD_COLOR
            };
            frame.fill_rect(col * pitch + 1, row * pitch + 1, cell_size, cell_size, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_extent_matches_grid_geometry() {
        assert_eq!(surface_extent(64, 8), 577);
        assert_eq!(surface_extent(4, 5), 25);
    }

    #[test]
    fn gridlines_land_on_the_cell_pitch() {
        let mut frame = Frame::for_grid(4, 4, 5);
        draw_grid(&mut frame, 4, 4, 5);
        for line in 0..=4 {
            let offset = line * 6;
            for p in 0..frame.height() {
                assert_eq!(frame.pixel(offset, p), GRID_COLOR, "vertical {}", line);
                assert_eq!(frame.pixel(p, offset), GRID_COLOR, "horizontal {}", line);
            }
        }
        // Cell interiors are untouched by the gridline pass.
        assert_eq!(frame.pixel(3, 3), DEAD_COLOR);
    }

    #[test]
    fn cells_fill_their_squares_inside_the_border() {
        // 4x4 grid with (row 1, col 2) alive: flat index 6, byte 0 bit 6
        let bits = [0b0100_0000u8, 0];
        let grid = BitGrid::new(&bits, 4);
        let mut frame = Frame::for_grid(4, 4, 5);
        draw_grid(&mut frame, 4, 4, 5);
        draw_cells(&mut frame, &grid, 4, 4, 5);

        // Opposite corners of the live square, then the gridline past it.
        assert_eq!(frame.pixel(2 * 6 + 1, 6 + 1), ALIVE_COLOR);
        assert_eq!(frame.pixel(2 * 6 + 5, 6 + 5), ALIVE_COLOR);
        assert_eq!(frame.pixel(2 * 6 + 6, 6 + 1), GRID_COLOR);
        // A dead neighbor square.
        assert_eq!(frame.pixel(1, 1), DEAD_COLOR);
    }

    #[test]
    fn redraw_leaves_no_residual_pixels() {
        let all_alive = [0xFFu8, 0xFF];
        let all_dead = [0u8, 0];
        let mut frame = Frame::for_grid(4, 4, 5);
        draw_grid(&mut frame, 4, 4, 5);
        draw_cells(&mut frame, &BitGrid::new(&all_alive, 4), 4, 4, 5);
        draw_cells(&mut frame, &BitGrid::new(&all_dead, 4), 4, 4, 5);

        for row in 0..4u32 {
            for col in 0..4u32 {
                for dy in 1..=5u32 {
                    for dx in 1..=5u32 {
                        assert_eq!(
                            frame.pixel(col * 6 + dx, row * 6 + dy),
                            DEAD_COLOR,
                            "cell ({}, {}) pixel ({}, {})",
                            row,
                            col,
                            dx,
                            dy
                        );
                    }
                }
            }
        }
    }
}
