//! Breakpoint layout derived from the terminal size.
//!
//! A [`LayoutMode`] is recomputed from scratch on every applied resize; nothing in it is
//! mutated in place.

const DEFAULT_COLUMNS: u16 = 80;
const DEFAULT_ROWS: u16 = 24;

const TINY_MAX_COLUMNS: u16 = 60;
const TINY_MAX_ROWS: u16 = 20;
const NARROW_MAX_COLUMNS: u16 = 90;
const MEDIUM_MAX_COLUMNS: u16 = 120;

const MIN_MAIN_WIDTH: usize = 20;
const MARGIN_WITH_SIDEBAR: usize = 6;
const MARGIN_WITHOUT_SIDEBAR: usize = 4;

const TINY_CHROME_ROWS: usize = 2;
const CHROME_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Tiny,
    Narrow,
    Medium,
    Wide,
}

impl LayoutKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Narrow => "narrow",
            Self::Medium => "medium",
            Self::Wide => "wide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMode {
    pub kind: LayoutKind,
    pub columns: u16,
    pub rows: u16,
    /// Visible sidebar width; zero when the sidebar is hidden.
    pub sidebar_width: usize,
    /// Width the sidebar takes when expanded on a narrow terminal.
    pub sidebar_expanded_width: usize,
    pub padding_x: usize,
    pub borders: bool,
}

impl LayoutMode {
    /// Toggles the narrow-mode sidebar. Other modes are returned unchanged.
    pub fn with_sidebar_expanded(self, expanded: bool) -> Self {
        if self.kind != LayoutKind::Narrow {
            return self;
        }
        Self {
            sidebar_width: if expanded {
                self.sidebar_expanded_width
            } else {
                0
            },
            ..self
        }
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_width > 0
    }

    pub fn content_width(&self) -> usize {
        main_width(self, self.sidebar_width)
    }
}

fn scaled(columns: u16, ratio: f64, cap: usize) -> usize {
    ((f64::from(columns) * ratio).floor() as usize).min(cap)
}

/// Classifies a terminal size. Zero dimensions mean "unknown" and fall back to 80x24.
pub fn compute_layout_mode(columns: u16, rows: u16) -> LayoutMode {
    let columns = if columns == 0 { DEFAULT_COLUMNS } else { columns };
    let rows = if rows == 0 { DEFAULT_ROWS } else { rows };

    let base = LayoutMode {
        kind: LayoutKind::Tiny,
        columns,
        rows,
        sidebar_width: 0,
        sidebar_expanded_width: 0,
        padding_x: 0,
        borders: false,
    };

    if columns < TINY_MAX_COLUMNS || rows < TINY_MAX_ROWS {
        return base;
    }
    if columns < NARROW_MAX_COLUMNS {
        return LayoutMode {
            kind: LayoutKind::Narrow,
            sidebar_expanded_width: scaled(columns, 0.28, 24),
            padding_x: 1,
            borders: true,
            ..base
        };
    }
    if columns < MEDIUM_MAX_COLUMNS {
        let sidebar = scaled(columns, 0.25, 26);
        return LayoutMode {
            kind: LayoutKind::Medium,
            sidebar_width: sidebar,
            sidebar_expanded_width: sidebar,
            padding_x: 1,
            borders: true,
            ..base
        };
    }
    let sidebar = scaled(columns, 0.25, 32);
    LayoutMode {
        kind: LayoutKind::Wide,
        sidebar_width: sidebar,
        sidebar_expanded_width: sidebar,
        padding_x: 2,
        borders: true,
        ..base
    }
}

/// Width left for the transcript, never below 20 columns.
pub fn main_width(layout: &LayoutMode, sidebar_width: usize) -> usize {
    let margin = if sidebar_width > 0 {
        MARGIN_WITH_SIDEBAR
    } else {
        MARGIN_WITHOUT_SIDEBAR
    };
    usize::from(layout.columns)
        .saturating_sub(sidebar_width)
        .saturating_sub(margin)
        .max(MIN_MAIN_WIDTH)
}

/// Rows available to the transcript after the input and status chrome.
pub fn viewport_rows(layout: &LayoutMode) -> usize {
    let chrome = match layout.kind {
        LayoutKind::Tiny => TINY_CHROME_ROWS,
        _ => CHROME_ROWS,
    };
    usize::from(layout.rows).saturating_sub(chrome).max(1)
}
