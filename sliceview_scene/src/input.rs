// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifiers held during an input event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        /// The control key.
        const CONTROL = 1 << 0;
        /// The shift key.
        const SHIFT = 1 << 1;
        /// The alt key.
        const ALT = 1 << 2;
    }
}

/// A pointer button, numbered 1/2/3 on the original device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Button 1.
    Primary,
    /// Button 2.
    Middle,
    /// Button 3.
    Secondary,
}

/// Decoded pointer/modifier state accompanying an input event.
///
/// Events arrive pre-decoded: the host delivers window coordinates plus
/// this state, never raw device input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    /// The pointer button involved, if any.
    pub button: Option<PointerButton>,
    /// Modifier keys held.
    pub modifiers: Modifiers,
}

impl InputState {
    /// An input state with `button` held and no modifiers.
    #[must_use]
    pub fn with_button(button: PointerButton) -> Self {
        Self {
            button: Some(button),
            modifiers: Modifiers::empty(),
        }
    }

    /// Whether control is held with no other modifier. The control-only
    /// chord bypasses the active tool (recenter-and-zoom clicks) and is
    /// never forwarded to layers.
    #[must_use]
    pub fn control_chord(&self) -> bool {
        self.modifiers == Modifiers::CONTROL
    }
}

/// The interaction tool currently active in a view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolMode {
    /// Pan, dolly, and zoom the view itself.
    #[default]
    Navigate,
    /// Drag sibling cutting planes through this view.
    PlaneDrag,
    /// Set the cursor and place or hide markers.
    Marker,
    /// No core interaction; events still reach the layers.
    Inactive,
}
