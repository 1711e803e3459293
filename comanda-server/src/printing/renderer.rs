//! Kitchen ticket renderer
//!
//! Renders a [`KitchenTicket`] into ESC/POS bytes. Output depends only on the
//! ticket and the layout, so the same ticket always yields the same bytes.
//!
//! Ticket structure:
//!
//! ```text
//!            POLLERIA              <- centered, bold, large
//!             COCINA
//! ================================================
//! PARA LLEVAR                      <- bold
//! Ticket: #abc12345
//! Fecha: 01/05/2024 12:30
//! ================================================
//! 2  Pollo a la Brasa              <- bold, item size
//!     Parte: pecho
//!
//! ------------------------------------------------
//! NOTAS:                           <- bold
//! sin papas
//! <feed> <cut>
//! ```

use chrono_tz::Tz;
use comanda_printer::{EscPosBuilder, FontSize, PAPER_WIDTH_80MM, wrap_text};
use shared::LineItem;

use super::types::{KitchenTicket, MISSING_NAME_PLACEHOLDER};

/// Indent for item detail lines
const DETAIL_INDENT: &str = "    ";

/// Venue-specific ticket settings
#[derive(Debug, Clone, PartialEq)]
pub struct TicketLayout {
    /// Characters per line at normal size
    pub width: usize,
    pub business_name: String,
    pub subtitle: Option<String>,
    /// Size of the header and item lines
    pub item_size: FontSize,
    /// Blank lines fed before the cut
    pub feed_lines: u8,
    /// Venue timezone for printed dates
    pub timezone: Tz,
}

impl Default for TicketLayout {
    fn default() -> Self {
        Self {
            width: PAPER_WIDTH_80MM,
            business_name: "POLLERIA".to_string(),
            subtitle: Some("COCINA".to_string()),
            item_size: FontSize::LARGE,
            feed_lines: 4,
            timezone: chrono_tz::America::Lima,
        }
    }
}

/// Kitchen ticket renderer
pub struct KitchenTicketRenderer {
    layout: TicketLayout,
}

impl KitchenTicketRenderer {
    pub fn new(layout: TicketLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &TicketLayout {
        &self.layout
    }

    /// Render a kitchen ticket to ESC/POS bytes
    ///
    /// Never fails: missing names get a placeholder and unreadable detail
    /// blocks are skipped. Callers reject empty tickets before rendering.
    pub fn render(&self, ticket: &KitchenTicket) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.layout.width);

        self.render_header(&mut b);
        self.render_metadata(&mut b, ticket);

        for item in &ticket.items {
            self.render_item(&mut b, item);
        }
        b.sep_single();

        self.render_footer(&mut b, ticket);

        b.build()
    }

    /// Business name and subtitle
    fn render_header(&self, b: &mut EscPosBuilder) {
        b.center();
        b.bold();
        b.size(self.layout.item_size);
        b.line(&self.layout.business_name);
        if let Some(subtitle) = &self.layout.subtitle {
            b.line(subtitle);
        }
        b.reset_style();
        b.sep_double();
    }

    /// Placement, ticket id, type and date
    fn render_metadata(&self, b: &mut EscPosBuilder, ticket: &KitchenTicket) {
        b.bold();
        b.line(&ticket.placement.label());
        b.bold_off();

        b.line(&format!("Ticket: #{}", ticket.short_id()));
        if let Some(kind) = &ticket.kind {
            b.line(&format!("Tipo: {}", kind));
        }
        b.line(&format!("Fecha: {}", ticket.date));
        b.sep_double();
    }

    fn render_item(&self, b: &mut EscPosBuilder, item: &LineItem) {
        let name = item.name.as_deref().unwrap_or(MISSING_NAME_PLACEHOLDER);

        b.bold();
        b.size(self.layout.item_size);
        b.line(&format!("{}  {}", item.quantity, name));
        b.reset_style();

        if let Some(detail) = item.detail.detail() {
            let fields = [
                ("Parte", &detail.part),
                ("Corte", &detail.cut),
                ("Nota", &detail.notes),
            ];
            let wrap_width = self.layout.width.saturating_sub(DETAIL_INDENT.len());
            for (label, value) in fields {
                let Some(value) = value else { continue };
                for line in wrap_text(&format!("{}: {}", label, value), wrap_width) {
                    b.line(&format!("{}{}", DETAIL_INDENT, line));
                }
            }
        }

        b.newline();
    }

    /// General notes, feed and cut
    fn render_footer(&self, b: &mut EscPosBuilder, ticket: &KitchenTicket) {
        if let Some(notes) = &ticket.notes {
            b.bold();
            b.line("NOTAS:");
            b.bold_off();
            for line in wrap_text(notes, self.layout.width) {
                b.line(&line);
            }
        }

        b.feed(self.layout.feed_lines);
        b.cut();
    }
}

impl Default for KitchenTicketRenderer {
    fn default() -> Self {
        Self::new(TicketLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printing::types::Placement;
    use shared::{ItemDetail, ItemDetailField};

    const INIT: &[u8] = &[0x1B, 0x40];
    const CUT: &[u8] = &[0x1D, 0x56, 0x00];
    const BOLD_ON: &[u8] = &[0x1B, 0x45, 0x01];
    const SIZE_LARGE: &[u8] = &[0x1D, 0x21, 0x11];

    fn ticket() -> KitchenTicket {
        KitchenTicket {
            order_id: "abc12345-6789".to_string(),
            placement: Placement::Takeout,
            kind: None,
            date: "01/05/2024 12:30".to_string(),
            items: vec![LineItem::new(2, "Pollo a la Brasa")],
            notes: Some("sin papas".to_string()),
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
        find(&haystack[from..], needle).map(|p| p + from)
    }

    #[test]
    fn test_structure_in_order() {
        let bytes = KitchenTicketRenderer::default().render(&ticket());

        assert!(bytes.starts_with(INIT));
        let header = find(&bytes, b"POLLERIA").unwrap();
        let placement = find_from(&bytes, b"PARA LLEVAR", header).unwrap();
        let id = find_from(&bytes, b"#abc12345\n", placement).unwrap();
        let date = find_from(&bytes, b"Fecha: 01/05/2024 12:30", id).unwrap();
        let item = find_from(&bytes, b"2  Pollo a la Brasa", date).unwrap();
        let notes = find_from(&bytes, b"NOTAS:", item).unwrap();
        let body = find_from(&bytes, b"sin papas", notes).unwrap();
        let cut = find_from(&bytes, CUT, body).unwrap();
        assert_eq!(cut + CUT.len(), bytes.len());
    }

    #[test]
    fn test_item_line_is_bold_and_large_then_reset() {
        let bytes = KitchenTicketRenderer::default().render(&ticket());
        let item = find(&bytes, b"2  Pollo a la Brasa").unwrap();
        let before = &bytes[..item];
        let bold = before.len() - BOLD_ON.len() - SIZE_LARGE.len();
        assert_eq!(&before[bold..bold + BOLD_ON.len()], BOLD_ON);
        assert_eq!(&before[bold + BOLD_ON.len()..], SIZE_LARGE);
        // size, bold and alignment reset right after the item line
        let after = item + "2  Pollo a la Brasa\n".len();
        assert_eq!(&bytes[after..after + 3], &[0x1D, 0x21, 0x00]);
        assert_eq!(&bytes[after + 3..after + 6], &[0x1B, 0x45, 0x00]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = KitchenTicketRenderer::default();
        assert_eq!(renderer.render(&ticket()), renderer.render(&ticket()));
    }

    #[test]
    fn test_accents_are_folded() {
        let mut t = ticket();
        t.items = vec![LineItem::new(1, "á é í ó ú ñ")];
        let bytes = KitchenTicketRenderer::default().render(&t);
        assert!(find(&bytes, b"1  a e i o u n").is_some());
        assert!(bytes.iter().all(|b| b.is_ascii()));
    }

    #[test]
    fn test_details_and_placeholder() {
        let mut t = ticket();
        t.placement = Placement::Table(7);
        t.notes = None;
        t.items = vec![
            LineItem::new(1, "1/4 Pollo").with_detail(ItemDetail {
                part: Some("pecho".into()),
                cut: Some("en cuatro".into()),
                notes: Some("bien dorado".into()),
            }),
            LineItem {
                quantity: 3,
                name: None,
                detail: ItemDetailField::Unparseable,
            },
        ];
        let bytes = KitchenTicketRenderer::default().render(&t);

        assert!(find(&bytes, b"MESA 7").is_some());
        let part = find(&bytes, b"    Parte: pecho\n").unwrap();
        let cut = find_from(&bytes, b"    Corte: en cuatro\n", part).unwrap();
        find_from(&bytes, b"    Nota: bien dorado\n", cut).unwrap();
        assert!(find(&bytes, b"3  (sin nombre)").is_some());
        assert!(find(&bytes, b"NOTAS:").is_none());
    }

    #[test]
    fn test_separators_use_paper_width() {
        let layout = TicketLayout {
            width: 32,
            ..TicketLayout::default()
        };
        let bytes = KitchenTicketRenderer::new(layout).render(&ticket());
        let rule = format!("\n{}\n", "=".repeat(32));
        assert!(find(&bytes, rule.as_bytes()).is_some());
        assert!(find(&bytes, "=".repeat(33).as_bytes()).is_none());
    }

    #[test]
    fn test_feed_before_cut() {
        let layout = TicketLayout {
            feed_lines: 6,
            ..TicketLayout::default()
        };
        let bytes = KitchenTicketRenderer::new(layout).render(&ticket());
        let tail = &bytes[bytes.len() - 6..];
        assert_eq!(tail, &[0x1B, 0x64, 6, 0x1D, 0x56, 0x00]);
    }
}
