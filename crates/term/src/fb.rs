//! Framebuffer and style types for the simulated display.

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Halve every channel (ghost outlines, dimmed previews)
    pub const fn halved(self) -> Self {
        Self::new(self.r / 2, self.g / 2, self.b / 2)
    }
}

impl From<rotary_dial_engine::Rgb> for Rgb {
    fn from(c: rotary_dial_engine::Rgb) -> Self {
        Self::new(c.r, c.g, c.b)
    }
}

/// Per-cell styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub dim: bool,
}

impl CellStyle {
    pub const fn fg(fg: Rgb) -> Self {
        Self {
            fg,
            bg: Rgb::BLACK,
            bold: false,
            dim: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub const fn on(mut self, bg: Rgb) -> Self {
        self.bg = bg;
        self
    }

    pub fn into_cell(self, ch: char) -> Cell {
        Cell { ch, style: self }
    }
}

impl Default for CellStyle {
    fn default() -> Self {
        Self::fg(Rgb::new(220, 220, 220))
    }
}

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: CellStyle::default(),
        }
    }
}

/// 2D grid of styled character cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize in place, keeping the allocation when possible.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = (width as usize) * (height as usize);
        self.cells.resize(len, Cell::default());
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn clear(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: CellStyle) {
        self.set(x, y, Cell { ch, style });
    }

    /// Write a string; returns the column after the last character
    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: CellStyle) -> u16 {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.put_char(cx, y, ch, style);
            cx += 1;
        }
        cx
    }

    /// Write a string centered on column `cx`
    pub fn put_str_centered(&mut self, cx: u16, y: u16, s: &str, style: CellStyle) {
        let w = s.chars().count() as u16;
        self.put_str(cx.saturating_sub(w / 2), y, s, style);
    }

    /// Write a signed decimal number without allocating
    pub fn put_i64(&mut self, x: u16, y: u16, value: i64, style: CellStyle) -> u16 {
        let mut digits = [0u8; 20];
        let mut n = value.unsigned_abs();
        let mut len = 0;
        loop {
            digits[len] = b'0' + (n % 10) as u8;
            len += 1;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        let mut cx = x;
        if value < 0 {
            self.put_char(cx, y, '-', style);
            cx = cx.saturating_add(1);
        }
        for &d in digits[..len].iter().rev() {
            self.put_char(cx, y, d as char, style);
            cx = cx.saturating_add(1);
        }
        cx
    }

    pub fn put_u32(&mut self, x: u16, y: u16, value: u32, style: CellStyle) -> u16 {
        self.put_i64(x, y, value as i64, style)
    }

    /// Width in columns of `value` as printed by [`FrameBuffer::put_i64`]
    pub fn number_width(value: i64) -> u16 {
        let mut n = value.unsigned_abs();
        let mut w = if value < 0 { 2 } else { 1 };
        while n >= 10 {
            n /= 10;
            w += 1;
        }
        w
    }

    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, style: CellStyle) {
        for dy in 0..h {
            for dx in 0..w {
                self.put_char(x.saturating_add(dx), y.saturating_add(dy), ch, style);
            }
        }
    }

    /// Overwrite every cell for which `keep(x, y)` is false
    pub fn mask(&mut self, fill: Cell, mut keep: impl FnMut(u16, u16) -> bool) {
        for y in 0..self.height {
            for x in 0..self.width {
                if !keep(x, y) {
                    self.set(x, y, fill);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(fb: &FrameBuffer, y: u16) -> String {
        (0..fb.width())
            .map(|x| fb.get(x, y).map(|c| c.ch).unwrap_or(' '))
            .collect()
    }

    #[test]
    fn put_numbers() {
        let mut fb = FrameBuffer::new(12, 2);
        let style = CellStyle::default();
        let end = fb.put_i64(0, 0, -305, style);
        assert_eq!(end, 4);
        fb.put_u32(0, 1, 0, style);
        assert_eq!(row_text(&fb, 0).trim_end(), "-305");
        assert_eq!(row_text(&fb, 1).trim_end(), "0");
        assert_eq!(FrameBuffer::number_width(-305), 4);
        assert_eq!(FrameBuffer::number_width(i64::MIN), 20);
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(3, 1);
        let end = fb.put_str(1, 0, "abc", CellStyle::default());
        assert_eq!(end, 3);
        assert_eq!(row_text(&fb, 0), " ab");
    }

    #[test]
    fn mask_overwrites_outside() {
        let mut fb = FrameBuffer::new(3, 1);
        fb.put_str(0, 0, "xyz", CellStyle::default());
        fb.mask(Cell::default(), |x, _| x == 1);
        assert_eq!(row_text(&fb, 0), " y ");
    }
}
