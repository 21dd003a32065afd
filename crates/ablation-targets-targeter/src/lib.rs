//! Target point selection: one spot per accepted grain.
//!
//! | variant | candidate points | per-region rule |
//! |---|---|---|
//! | [`TargeterKind::Core`] | local maxima of the distance map | first candidate deeper than half a spot |
//! | [`TargeterKind::Rim`] | distance band `inset + spot/2` | first candidate (by `x`) strictly inside |
//! | [`TargeterKind::Moments`] | area centroid | region must hold a spot disc |
//! | [`TargeterKind::Blob`] | multi-level blob centers | independent of the boundaries |
//!
//! The core, rim and moment variants resolve the spot size from the manual
//! value or, with `auto_spot`, from the smallest fitted ellipse.

mod blob;
mod params;
mod spot;
mod strategies;
mod targeter;

pub use blob::{detect_blobs, Blob};
pub use params::{BlobParams, RimParams, SpotSizeParams};
pub use spot::{auto_spot_size, render_spots, resolve_spot_size, Spot, SPOT_COLOR};
pub use strategies::{core_spots, moment_spots, rim_spots, LOCAL_MAX_WINDOW};
pub use targeter::{TargetOutput, Targeter, TargeterKind, TargeterParams};
