use ratatui::layout::{Constraint, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: chat docks beside the cards
    Narrow, // <100 cols: chat opens as a popup
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    /// Header, body and footer. With `sidebar` set, wide terminals give the
    /// right 40% of the body to a docked panel.
    pub fn new(area: Rect, sidebar: bool) -> Self {
        let tier = LayoutTier::from_area(area);
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .areas(area);

        let (main, sidebar) = if sidebar && tier == LayoutTier::Wide {
            let [main, side] =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(body);
            (main, Some(side))
        } else {
            (body, None)
        };

        Self {
            header,
            main,
            sidebar,
            footer,
            tier,
        }
    }
}

/// Rows `text` occupies when hard-wrapped at `width` columns.
pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    text.chars().count().max(1).div_ceil(width)
}

const HINT_INDENT: &str = " ";
const HINT_GAP: &str = "  ·  ";

/// Greedily fill footer rows with key hints, never splitting a hint.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    let mut rows: Vec<String> = Vec::new();
    if width == 0 {
        return rows;
    }
    let mut used = 0;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let len = hint.chars().count();
        let extra = HINT_GAP.chars().count() + len;
        match rows.last_mut() {
            Some(row) if used + extra <= width => {
                row.push_str(HINT_GAP);
                row.push_str(hint);
                used += extra;
            }
            _ => {
                rows.push(format!("{HINT_INDENT}{hint}"));
                used = HINT_INDENT.len() + len;
            }
        }
    }
    rows
}

/// A rect of the given percentage of `area`, centred, no smaller than a
/// readable popup unless `area` itself is smaller.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_WIDTH: u16 = 40;
    const MIN_HEIGHT: u16 = 7;

    let scale = |len: u16, pct: u16| (u32::from(len) * u32::from(pct.min(100)) / 100) as u16;
    let width = scale(area.width, percent_x).clamp(MIN_WIDTH.min(area.width), area.width);
    let height = scale(area.height, percent_y).clamp(MIN_HEIGHT.min(area.height), area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_only_on_wide_terminals() {
        let wide = AppLayout::new(Rect::new(0, 0, 120, 30), true);
        assert!(wide.sidebar.is_some());
        let narrow = AppLayout::new(Rect::new(0, 0, 80, 30), true);
        assert!(narrow.sidebar.is_none());
        let unrequested = AppLayout::new(Rect::new(0, 0, 120, 30), false);
        assert!(unrequested.sidebar.is_none());
    }

    #[test]
    fn hints_wrap_to_width() {
        let lines = pack_hint_lines(&["[←→] Karte", "[↑↓] Umdrehen", "[s] Speichern"], 30);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.chars().count() <= 30));
        assert!(pack_hint_lines(&[], 30).is_empty());
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 30, 5);
        let popup = centered_rect(50, 50, area);
        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
    }

    #[test]
    fn wrapped_line_count_rounds_up() {
        assert_eq!(wrapped_line_count("abcdef", 4), 2);
        assert_eq!(wrapped_line_count("", 4), 1);
        assert_eq!(wrapped_line_count("abc", 0), 0);
    }
}
