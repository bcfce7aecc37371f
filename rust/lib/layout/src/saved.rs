use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::{Constraints, Rect, Size};

pub const LAYOUT_VERSION: u32 = 1;

/// What a widget renders. The server only stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Calendar,
    Chart,
    Table,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    pub kind: WidgetKind,
    pub rect: Rect,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Widget {
    pub fn new(id: &str, kind: WidgetKind, rect: Rect) -> Self {
        Self {
            id: id.to_string(),
            kind,
            rect,
            visible: true,
        }
    }
}

/// The arrangement shown to a user who never saved one, sized for a
/// 1600x1200 container.
pub fn default_layout() -> Vec<Widget> {
    use WidgetKind::*;
    vec![
        Widget::new("safety-calendar", Calendar, Rect::new(0.0, 0.0, 380.0, 320.0)),
        Widget::new("quality-calendar", Calendar, Rect::new(400.0, 0.0, 380.0, 320.0)),
        Widget::new("production-calendar", Calendar, Rect::new(800.0, 0.0, 380.0, 320.0)),
        Widget::new("logistics-calendar", Calendar, Rect::new(1200.0, 0.0, 380.0, 320.0)),
        Widget::new("kpi-chart", Chart, Rect::new(0.0, 340.0, 780.0, 400.0)),
        Widget::new("kpi-summary", Summary, Rect::new(800.0, 340.0, 780.0, 400.0)),
        Widget::new("action-table", Table, Rect::new(0.0, 760.0, 780.0, 360.0)),
        Widget::new("claim-table", Table, Rect::new(800.0, 760.0, 780.0, 360.0)),
    ]
}

/// Persisted form of a layout: every widget, visible or hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLayout {
    pub version: u32,
    pub container: Size,
    pub widgets: Vec<Widget>,
}

impl SavedLayout {
    pub fn new(container: Size, widgets: Vec<Widget>) -> Self {
        Self {
            version: LAYOUT_VERSION,
            container,
            widgets,
        }
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let layout: SavedLayout = serde_json::from_str(json)?;
        layout.check_version()?;
        Ok(layout)
    }

    pub fn check_version(&self) -> Result<(), LayoutError> {
        if self.version == 0 || self.version > LAYOUT_VERSION {
            return Err(LayoutError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    pub fn visible(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter().filter(|w| w.visible)
    }

    /// Make an untrusted layout safe to edit in `container`: drop blank and
    /// duplicate ids (first wins), replace non-finite numbers, floor sizes at
    /// the minimums and move every widget inside the container.
    pub fn normalize(mut self, container: Size, constraints: &Constraints) -> Self {
        let mut seen = HashSet::new();
        self.widgets
            .retain(|w| !w.id.trim().is_empty() && seen.insert(w.id.clone()));

        for w in &mut self.widgets {
            let r = &mut w.rect;
            if !r.width.is_finite() {
                r.width = constraints.min_width;
            }
            if !r.height.is_finite() {
                r.height = constraints.min_height;
            }
            if !r.x.is_finite() {
                r.x = 0.0;
            }
            if !r.y.is_finite() {
                r.y = 0.0;
            }
            let size = constraints.floor(r.size());
            r.width = size.width;
            r.height = size.height;
            r.clamp_position(container);
        }

        self.version = LAYOUT_VERSION;
        self.container = container;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Size {
        Size::new(1600.0, 1200.0)
    }

    #[test]
    fn default_layout_fits_default_container() {
        let widgets = default_layout();
        assert!(widgets.iter().all(|w| w.rect.fits_in(container())));
        let ids: HashSet<_> = widgets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids.len(), widgets.len());
    }

    #[test]
    fn json_roundtrip_keeps_hidden_widgets() {
        let mut widgets = default_layout();
        widgets[2].visible = false;
        let saved = SavedLayout::new(container(), widgets);

        let back = SavedLayout::from_json(&saved.to_json().unwrap()).unwrap();
        assert_eq!(back, saved);
        assert_eq!(back.visible().count(), saved.widgets.len() - 1);
    }

    #[test]
    fn from_json_rejects_future_version() {
        let json = r#"{"version":7,"container":{"width":10,"height":10},"widgets":[]}"#;
        assert!(matches!(
            SavedLayout::from_json(json),
            Err(LayoutError::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn missing_visible_defaults_to_true() {
        let json = r#"{"version":1,"container":{"width":800,"height":600},
            "widgets":[{"id":"a","kind":"chart","rect":{"x":0,"y":0,"width":300,"height":200}}]}"#;
        let layout = SavedLayout::from_json(json).unwrap();
        assert!(layout.widgets[0].visible);
    }

    #[test]
    fn normalize_repairs_untrusted_input() {
        let widgets = vec![
            Widget::new("a", WidgetKind::Chart, Rect::new(1500.0, -20.0, 50.0, 400.0)),
            Widget::new("a", WidgetKind::Table, Rect::new(0.0, 0.0, 300.0, 300.0)),
            Widget::new(" ", WidgetKind::Table, Rect::new(0.0, 0.0, 300.0, 300.0)),
            Widget::new("b", WidgetKind::Summary, Rect::new(f64::NAN, 10.0, f64::INFINITY, 200.0)),
        ];
        let saved = SavedLayout {
            version: 1,
            container: Size::new(99999.0, 99999.0),
            widgets,
        };

        let fixed = saved.normalize(container(), &Constraints::default());
        assert_eq!(fixed.container, container());
        assert_eq!(fixed.widgets.len(), 2);

        let a = &fixed.widgets[0];
        assert_eq!(a.kind, WidgetKind::Chart);
        assert_eq!(a.rect, Rect::new(1400.0, 0.0, 200.0, 400.0));

        let b = &fixed.widgets[1];
        assert_eq!(b.rect, Rect::new(0.0, 10.0, 200.0, 200.0));
        assert!(fixed.widgets.iter().all(|w| w.rect.fits_in(container())));
    }
}
