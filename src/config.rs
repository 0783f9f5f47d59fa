/// Grid dimensions for the bundled life engine
pub const GRID_WIDTH: u32 = 64;
pub const GRID_HEIGHT: u32 = 64;

/// Edge length of one rendered cell, in backing-store pixels
pub const CELL_SIZE: u32 = 8;

/// Generations advanced per rendered frame until the user overrides it
pub const DEFAULT_TICKS_PER_FRAME: u32 = 1;

/// Rolling window length for frame-rate statistics
pub const FPS_WINDOW: usize = 100;

/// Pack an opaque sRGB color into the frame's RGBA8 pixel layout
pub const fn rgba8(r: u8, g: u8, b: u8) -> u32 {
    u32::from_le_bytes([r, g, b, 0xFF])
}

/// Gridline stroke (#CCCCCC)
pub const GRID_COLOR: u32 = rgba8(0xCC, 0xCC, 0xCC);

/// Dead cell fill (#FFFFFF)
pub const DEAD_COLOR: u32 = rgba8(0xFF, 0xFF, 0xFF);

/// Live cell fill (#000000)
pub const ALIVE_COLOR: u32 = rgba8(0x00, 0x00, 0x00);
