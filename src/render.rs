use ratatui::{
    buffer::Buffer,
    crossterm::style::{Color as TermColor, Stylize},
    layout::Rect,
    style::Color,
    widgets::Widget,
};

use crate::table::display_width;

pub const MAX_EDGE: u16 = 400;

pub fn edge(cells: usize) -> u16 {
    u16::try_from(cells).unwrap_or(MAX_EDGE).clamp(2, MAX_EDGE)
}

pub fn draw(widget: impl Widget, width: u16, height: u16) -> Buffer {
    let mut buffer = Buffer::empty(Rect::new(0, 0, width, height));
    widget.render(buffer.area, &mut buffer);
    buffer
}

/// Flattens a rendered buffer into printable lines. Trailing blanks are
/// dropped; foreground colours are kept only when `color` is set.
pub fn buffer_to_text(buffer: &Buffer, color: bool) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut cells = Vec::with_capacity(usize::from(area.width));
        let mut hidden = 0usize;
        for x in area.left()..area.right() {
            if hidden > 0 {
                hidden -= 1;
                continue;
            }
            let cell = &buffer[(x, y)];
            hidden = display_width(cell.symbol()).saturating_sub(1);
            cells.push((cell.symbol(), cell.fg));
        }
        let used = cells
            .iter()
            .rposition(|(symbol, _)| !symbol.trim().is_empty())
            .map_or(0, |idx| idx + 1);
        for (symbol, fg) in &cells[..used] {
            if color && *fg != Color::Reset {
                out.push_str(&symbol.with(TermColor::from(*fg)).to_string());
            } else {
                out.push_str(symbol);
            }
        }
        out.push('\n');
    }
    out
}
