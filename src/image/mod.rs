pub mod io;
pub mod plane;
pub mod traits;

pub use self::plane::{GrayPlane, Plane, Rgb, RgbFrame};
pub use self::traits::{ImageView, ImageViewMut, Rows};

/// Nominal capture and rectification width in pixels.
pub const FRAME_WIDTH: usize = 320;
/// Nominal capture and rectification height in pixels.
pub const FRAME_HEIGHT: usize = 240;
