mod blit;
mod context;

pub use blit::FrameBlit;
pub use context::GpuContext;
