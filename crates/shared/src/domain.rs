use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(FrameId);

/// Viewport dimensions of the top-level context, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSize {
    pub width: u32,
    pub height: u32,
}

/// Bounding offset of a frame relative to its parent's origin.
///
/// Forwarded untouched so a child can place hints in its own coordinate
/// space; never interpreted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePosition {
    pub x: f64,
    pub y: f64,
}

impl FramePosition {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };
}

/// One directly embedded child frame as enumerated by the context tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub frame: FrameId,
    pub position: FramePosition,
}
