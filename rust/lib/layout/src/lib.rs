//! Dashboard widget layout engine.
//!
//! The server owns widget geometry and the interaction state machine; a front
//! end only forwards pointer events and renders the resulting rectangles.
//!
//! # Interactions
//!
//! - Drag: `begin_drag(id, pointer)` on the title bar, then `pointer_move`
//!   keeps the widget inside the container, `pointer_up` ends tracking.
//! - Resize: `begin_resize(id, pointer)` on the handle, then `pointer_move`
//!   grows or shrinks the widget but never below the configured minimums.
//!
//! Each interaction, visibility toggle, reset or load pushes the previous
//! widget list onto a bounded history so `undo()` can restore it.
//!
//! # Persistence
//!
//! `save()` produces a [`SavedLayout`]; [`LayoutStorage`] persists it. Saved
//! layouts from clients are untrusted and go through [`SavedLayout::normalize`].

pub mod editor;
pub mod error;
pub mod geometry;
pub mod saved;
pub mod storage;

pub use editor::{Interaction, LayoutEditor};
pub use error::LayoutError;
pub use geometry::{Constraints, Point, Rect, Size};
pub use saved::{default_layout, SavedLayout, Widget, WidgetKind, LAYOUT_VERSION};
pub use storage::{KvLayoutStorage, LayoutStorage};
