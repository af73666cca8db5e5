#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Columns,
    Rows,
}

impl Axis {
    // exclusive, in percent
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Axis::Columns => (20.0, 80.0),
            Axis::Rows => (20.0, 95.0),
        }
    }

    pub fn cursor(self) -> &'static str {
        match self {
            Axis::Columns => "col-resize",
            Axis::Rows => "row-resize",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub first: f64,
    pub second: f64,
}

impl Split {
    pub fn new(first: f64) -> Self {
        Self {
            first,
            second: 100.0 - first,
        }
    }
}

impl Default for Split {
    fn default() -> Self {
        Self::new(50.0)
    }
}

/// Divider drag state: `press` arms it, `drag` moves it, `release` ends it.
#[derive(Debug, Clone)]
pub struct PanelResizer {
    axis: Axis,
    dragging: bool,
    split: Split,
}

impl PanelResizer {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            dragging: false,
            split: Split::default(),
        }
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn press(&mut self) -> &'static str {
        self.dragging = true;
        self.axis.cursor()
    }

    pub fn drag(&mut self, pointer: f64, extent: f64) -> Option<Split> {
        if !self.dragging || extent <= 0.0 {
            return None;
        }
        let percent = pointer * 100.0 / extent;
        let (min, max) = self.axis.bounds();
        if percent > min && percent < max {
            self.split = Split::new(percent);
            Some(self.split)
        } else {
            None
        }
    }

    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.dragging, false)
    }
}

pub const EXPANDED_HEIGHT_PX: u32 = 600;
pub const COLLAPSED_HEIGHT_PX: u32 = 60;

/// The chat panel's Hide/Show toggle.
#[derive(Debug, Clone, Default)]
pub struct CollapsiblePanel {
    hidden: bool,
}

impl CollapsiblePanel {
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn label(&self) -> &'static str {
        if self.hidden { "Show" } else { "Hide" }
    }

    pub fn height_px(&self) -> u32 {
        if self.hidden {
            COLLAPSED_HEIGHT_PX
        } else {
            EXPANDED_HEIGHT_PX
        }
    }

    pub fn toggle(&mut self) -> &'static str {
        self.hidden = !self.hidden;
        self.label()
    }
}
