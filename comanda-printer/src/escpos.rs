//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data.

use crate::encoding::fold_to_ascii;

/// Paper width in characters for an 80mm roll (Font A)
pub const PAPER_WIDTH_80MM: usize = 48;

/// Character size as width/height multipliers
///
/// Only 1x and 2x are used on kitchen tickets; values are clamped to 1..=8,
/// the range `GS !` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSize {
    pub width: u8,
    pub height: u8,
}

impl FontSize {
    pub const NORMAL: FontSize = FontSize::new(1, 1);
    pub const TALL: FontSize = FontSize::new(1, 2);
    pub const LARGE: FontSize = FontSize::new(2, 2);

    pub const fn new(width: u8, height: u8) -> Self {
        Self { width, height }
    }

    /// `GS ! n` argument: high nibble = width - 1, low nibble = height - 1
    pub fn to_byte(self) -> u8 {
        let w = self.width.clamp(1, 8) - 1;
        let h = self.height.clamp(1, 8) - 1;
        (w << 4) | h
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers.
/// All text is folded to ASCII as it is written.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(1024);
        // Initialize printer (ESC @)
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self { buf, width }
    }

    // === Text Output ===

    /// Write text (folded to ASCII)
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(fold_to_ascii(s).as_bytes());
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Write empty line
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// Write multiple empty lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        // ESC d n - Print and feed n lines
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    // === Text Style ===

    /// Enable bold text
    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    /// Disable bold text
    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    /// Set character size (GS ! n)
    pub fn size(&mut self, size: FontSize) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, size.to_byte()]);
        self
    }

    /// Reset to normal size
    pub fn reset_size(&mut self) -> &mut Self {
        self.size(FontSize::NORMAL)
    }

    /// Reset size, bold and alignment in one go
    ///
    /// Used between structurally different blocks so formatting never bleeds
    /// from one block into the next.
    pub fn reset_style(&mut self) -> &mut Self {
        self.reset_size();
        self.bold_off();
        self.left();
        self
    }

    // === Separators ===

    /// Print a line of '=' characters
    pub fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    /// Print a line of '-' characters
    pub fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    // === Paper Control ===

    /// Cut paper (full cut)
    pub fn cut(&mut self) -> &mut Self {
        // GS V 0 - Full cut
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    // === Build ===

    /// Build the final byte buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}
