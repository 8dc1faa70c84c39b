//! Pointer and time driven behaviours layered on top of rendered scenes.

mod drag;
mod playback;
mod range_filter;
mod tooltip;

pub use drag::{DEFAULT_DRAG_ALPHA_TARGET, DragController};
pub use playback::{FrameClock, IntervalTimer, Playback};
pub use range_filter::{RANGE_MAX, RANGE_MIN, RangeFilter, RangeSelection, filter_by_range};
pub use tooltip::{Tooltip, TooltipState, hit_test, tooltip_layer};
