//! Well-known signals consumed by the widget toolkit layer.
//!
//! Allocated once when the toolkit initializes; ordinary signals
//! thereafter, opaque to the kernel.

use core_types::SignalId;
use kernel_api::{Dispatch, DispatchError};
use serde::{Deserialize, Serialize};

/// The fixed catalogue of toolkit signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolkitSignals {
    pub key_press: SignalId,
    pub widget_activate: SignalId,
    pub widget_select: SignalId,
    pub timer: SignalId,
    pub menu_activate: SignalId,
    pub window_close: SignalId,
    pub pointer_move: SignalId,
    pub pointer_button: SignalId,
}

impl ToolkitSignals {
    /// Allocates the toolkit's signal numbers.
    ///
    /// Call exactly once, at toolkit initialization.
    pub fn allocate(dispatcher: &mut dyn Dispatch) -> Result<Self, DispatchError> {
        Ok(Self {
            key_press: dispatcher.sigalloc()?,
            widget_activate: dispatcher.sigalloc()?,
            widget_select: dispatcher.sigalloc()?,
            timer: dispatcher.sigalloc()?,
            menu_activate: dispatcher.sigalloc()?,
            window_close: dispatcher.sigalloc()?,
            pointer_move: dispatcher.sigalloc()?,
            pointer_button: dispatcher.sigalloc()?,
        })
    }
}
