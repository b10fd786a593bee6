//! Per-frame host data

/// Drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Viewport of the given size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 1 for a zero-height (minimised) viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// What the host tells the scene about the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Current viewport
    pub viewport: Viewport,
    /// Frames completed before this one
    pub frame_index: u64,
}

impl FrameContext {
    /// Context for one frame
    pub const fn new(delta_time: f32, viewport: Viewport, frame_index: u64) -> Self {
        Self {
            delta_time,
            viewport,
            frame_index,
        }
    }
}
