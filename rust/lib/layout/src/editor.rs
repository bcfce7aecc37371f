use std::collections::VecDeque;

use crate::error::LayoutError;
use crate::geometry::{clamp_axis, Constraints, Point, Rect, Size};
use crate::saved::{default_layout, SavedLayout, Widget};

/// Pointer interaction in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Pointer offset from the widget's top-left corner at pointer-down.
    Drag { id: String, offset: Point },
    /// Pointer position and widget size at pointer-down.
    Resize { id: String, start: Point, start_size: Size },
}

impl Interaction {
    pub fn widget_id(&self) -> &str {
        match self {
            Interaction::Drag { id, .. } | Interaction::Resize { id, .. } => id,
        }
    }
}

/// Bounded stack of previous widget lists.
#[derive(Debug, Clone)]
struct History {
    depth: usize,
    snapshots: VecDeque<Vec<Widget>>,
}

impl History {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            snapshots: VecDeque::with_capacity(depth),
        }
    }

    fn push(&mut self, widgets: &[Widget]) {
        if self.depth == 0 {
            return;
        }
        if self.snapshots.len() == self.depth {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(widgets.to_vec());
    }

    fn pop(&mut self) -> Option<Vec<Widget>> {
        self.snapshots.pop_back()
    }
}

/// Editable dashboard layout.
///
/// Pointer coordinates are container-relative pixels. Only one interaction
/// runs at a time; starting a new one replaces the current one.
#[derive(Debug, Clone)]
pub struct LayoutEditor {
    container: Size,
    constraints: Constraints,
    widgets: Vec<Widget>,
    interaction: Option<Interaction>,
    history: History,
}

impl LayoutEditor {
    /// Editor showing [`default_layout`] with one-level undo.
    pub fn new(container: Size, constraints: Constraints) -> Self {
        let mut editor = Self {
            container,
            constraints,
            widgets: Vec::new(),
            interaction: None,
            history: History::new(1),
        };
        editor.widgets = editor.defaults();
        editor
    }

    /// Editor restored from a saved layout (normalized first).
    pub fn from_saved(saved: SavedLayout, container: Size, constraints: Constraints) -> Self {
        let mut editor = Self::new(container, constraints);
        editor.widgets = saved.normalize(container, &constraints).widgets;
        editor
    }

    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history = History::new(depth);
        self
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.snapshots.is_empty()
    }

    fn rect_of(&self, id: &str) -> Result<Rect, LayoutError> {
        self.widget(id)
            .map(|w| w.rect)
            .ok_or_else(|| LayoutError::UnknownWidget(id.to_string()))
    }

    fn widget_mut(&mut self, id: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    fn defaults(&self) -> Vec<Widget> {
        let saved = SavedLayout::new(self.container, default_layout());
        saved.normalize(self.container, &self.constraints).widgets
    }

    /// Pointer-down on a widget's title bar.
    pub fn begin_drag(&mut self, id: &str, pointer: Point) -> Result<(), LayoutError> {
        let rect = self.rect_of(id)?;
        self.history.push(&self.widgets);
        self.interaction = Some(Interaction::Drag {
            id: id.to_string(),
            offset: Point::new(pointer.x - rect.x, pointer.y - rect.y),
        });
        Ok(())
    }

    /// Pointer-down on a widget's resize handle.
    pub fn begin_resize(&mut self, id: &str, pointer: Point) -> Result<(), LayoutError> {
        let rect = self.rect_of(id)?;
        self.history.push(&self.widgets);
        self.interaction = Some(Interaction::Resize {
            id: id.to_string(),
            start: pointer,
            start_size: rect.size(),
        });
        Ok(())
    }

    /// Apply a pointer move to the active interaction and return the
    /// widget's new geometry. Returns None when nothing is being tracked.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<Rect> {
        let interaction = self.interaction.clone()?;
        let container = self.container;
        let constraints = self.constraints;
        let widget = self.widget_mut(interaction.widget_id())?;
        let r = &mut widget.rect;

        match interaction {
            Interaction::Drag { offset, .. } => {
                r.x = clamp_axis(pointer.x - offset.x, container.width - r.width);
                r.y = clamp_axis(pointer.y - offset.y, container.height - r.height);
            }
            Interaction::Resize { start, start_size, .. } => {
                let size = constraints.floor(Size::new(
                    start_size.width + (pointer.x - start.x),
                    start_size.height + (pointer.y - start.y),
                ));
                r.width = size.width;
                r.height = size.height;
            }
        }
        Some(*r)
    }

    /// Pointer-up: stop tracking. Returns whether an interaction was active.
    pub fn pointer_up(&mut self) -> bool {
        self.interaction.take().is_some()
    }

    /// Show or hide a widget. Returns the new visibility.
    pub fn toggle_visibility(&mut self, id: &str) -> Result<bool, LayoutError> {
        if self.widget(id).is_none() {
            return Err(LayoutError::UnknownWidget(id.to_string()));
        }
        self.history.push(&self.widgets);
        let widget = self
            .widget_mut(id)
            .ok_or_else(|| LayoutError::UnknownWidget(id.to_string()))?;
        widget.visible = !widget.visible;
        Ok(widget.visible)
    }

    /// Resize the container and move widgets back inside it.
    pub fn set_container(&mut self, container: Size) {
        self.container = container;
        for w in &mut self.widgets {
            w.rect.clamp_position(container);
        }
    }

    /// Discard the current arrangement for the default one.
    pub fn reset(&mut self) {
        self.interaction = None;
        self.history.push(&self.widgets);
        self.widgets = self.defaults();
    }

    /// Replace the widgets with a saved layout, keeping the current ones for undo.
    pub fn load(&mut self, saved: SavedLayout) {
        self.interaction = None;
        self.history.push(&self.widgets);
        self.widgets = saved.normalize(self.container, &self.constraints).widgets;
    }

    /// Restore the state before the last interaction, toggle, reset or load.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.interaction = None;
                self.widgets = previous;
                true
            }
            None => false,
        }
    }

    pub fn save(&self) -> SavedLayout {
        SavedLayout::new(self.container, self.widgets.clone())
    }
}
