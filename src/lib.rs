pub mod config;
pub mod error;
pub mod hsv;
pub mod logger;
pub mod mask;
pub mod pipeline;
pub mod pixels;
pub mod recolor;
pub mod region;
pub mod seed;
pub mod tuning;

pub use config::ToolConfig;
pub use error::{RecolorError, Result};
pub use hsv::Hsv;
pub use mask::Mask;
pub use pipeline::{recolor_region, recolor_region_with_report, AdjustmentParams, RecolorOutcome, RegionReport};
pub use pixels::PixelGrid;
pub use recolor::Adjustment;
pub use region::{Connectivity, Tolerance};
pub use seed::ColorRange;
pub use tuning::{Recomputer, TuningState};
