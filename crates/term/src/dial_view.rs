//! DialView: draws the round display into a terminal framebuffer.
//!
//! The 240x240 round panel is approximated by a 52x26 character canvas
//! (two columns per square pixel block) with everything outside the
//! inscribed circle blanked. This module is pure (no I/O).

use rotary_dial_core::{get_shape, GameSnapshot};
use rotary_dial_engine::{LightsApp, Rgb as LedRgb};

use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};
use crate::types::{PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

/// Canvas width in terminal columns
pub const CANVAS_W: u16 = 52;
/// Canvas height in terminal rows
pub const CANVAS_H: u16 = 26;
/// Rows below the canvas for the status line and key help
const STATUS_ROWS: u16 = 2;

const BOARD_X: u16 = 15;
const BOARD_Y: u16 = 2;
const SCORE_X: u16 = 5;
const NEXT_X: u16 = 38;
const STRIP_X: u16 = 11;

const BOARD_BG: Rgb = Rgb::new(20, 20, 28);
const BEZEL: Rgb = Rgb::new(70, 70, 80);
const CYAN: Rgb = Rgb::new(0, 220, 230);
const RED: Rgb = Rgb::new(235, 60, 60);
const GREY: Rgb = Rgb::new(170, 170, 170);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Adapter state shown on the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub port: u16,
    pub client_count: u16,
    pub streaming_count: u16,
}

/// What the display currently shows
#[derive(Debug, Clone, Copy)]
pub enum Screen<'a> {
    Tetris(&'a GameSnapshot),
    Counter { value: i64 },
    Lights { app: &'a LightsApp, strip: &'a [LedRgb] },
}

impl Screen<'_> {
    fn name(&self) -> &'static str {
        match self {
            Screen::Tetris(_) => "tetris",
            Screen::Counter { .. } => "counter",
            Screen::Lights { .. } => "lights",
        }
    }
}

/// Display color of a piece kind
pub fn piece_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(0, 230, 230),
        PieceKind::O => Rgb::new(240, 220, 0),
        PieceKind::T => Rgb::new(170, 60, 220),
        PieceKind::S => Rgb::new(0, 210, 0),
        PieceKind::Z => Rgb::new(230, 0, 0),
        PieceKind::J => Rgb::new(30, 60, 240),
        PieceKind::L => Rgb::new(255, 150, 0),
    }
}

/// Whether canvas cell `(x, y)` lies on the round panel
pub fn on_panel(x: u16, y: u16) -> bool {
    ring_distance(x, y) <= 1.0
}

fn ring_distance(x: u16, y: u16) -> f32 {
    let rx = CANVAS_W as f32 / 2.0;
    let ry = CANVAS_H as f32 / 2.0;
    let dx = (x as f32 + 0.5 - rx) / rx;
    let dy = (y as f32 + 0.5 - ry) / ry;
    dx * dx + dy * dy
}

/// Canvas placed inside the terminal; all drawing goes through it so that
/// coordinates stay in panel space.
struct Canvas<'a> {
    fb: &'a mut FrameBuffer,
    ox: u16,
    oy: u16,
}

impl Canvas<'_> {
    fn text(&mut self, x: u16, y: u16, s: &str, style: CellStyle) {
        self.fb.put_str(self.ox + x, self.oy + y, s, style);
    }

    fn text_centered(&mut self, y: u16, s: &str, style: CellStyle) {
        self.fb
            .put_str_centered(self.ox + CANVAS_W / 2, self.oy + y, s, style);
    }

    fn number(&mut self, x: u16, y: u16, value: i64, style: CellStyle) {
        self.fb.put_i64(self.ox + x, self.oy + y, value, style);
    }

    fn number_centered(&mut self, y: u16, value: i64, style: CellStyle) {
        let w = FrameBuffer::number_width(value);
        let x = (CANVAS_W / 2).saturating_sub(w / 2);
        self.number(x, y, value, style);
    }

    fn block(&mut self, x: u16, y: u16, w: u16, ch: char, style: CellStyle) {
        self.fb.fill_rect(self.ox + x, self.oy + y, w, 1, ch, style);
    }
}

/// Renders dial screens into a framebuffer
#[derive(Debug, Clone)]
pub struct DialView {
    /// Board cell width in terminal columns
    cell_w: u16,
}

impl Default for DialView {
    fn default() -> Self {
        // Two columns per cell roughly squares the typical terminal glyph.
        Self { cell_w: 2 }
    }
}

impl DialView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a screen into an existing framebuffer.
    ///
    /// Callers reuse one framebuffer across frames; it is only resized when
    /// the viewport changes.
    pub fn render_into(
        &self,
        screen: Screen<'_>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Cell::default());

        let ox = viewport.width.saturating_sub(CANVAS_W) / 2;
        let oy = viewport.height.saturating_sub(CANVAS_H + STATUS_ROWS) / 2;
        let mut canvas = Canvas { fb, ox, oy };

        match screen {
            Screen::Tetris(snap) if snap.game_over => self.draw_game_over(&mut canvas, snap),
            Screen::Tetris(snap) => self.draw_tetris(&mut canvas, snap),
            Screen::Counter { value } => self.draw_counter(&mut canvas, value),
            Screen::Lights { app, strip } => self.draw_lights(&mut canvas, app, strip),
        }

        self.draw_bezel(&mut canvas);
        self.draw_status(&mut canvas, screen.name(), adapter);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        screen: Screen<'_>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(screen, adapter, viewport, &mut fb);
        fb
    }

    fn draw_bezel(&self, canvas: &mut Canvas<'_>) {
        let (ox, oy) = (canvas.ox, canvas.oy);
        let ring = CellStyle::fg(BEZEL).dim().into_cell('·');
        let blank = Cell::default();
        for y in 0..CANVAS_H {
            for x in 0..CANVAS_W {
                let d = ring_distance(x, y);
                if d > 1.0 {
                    let cell = if d <= 1.18 { ring } else { blank };
                    canvas.fb.set(ox + x, oy + y, cell);
                }
            }
        }
    }

    fn draw_status(&self, canvas: &mut Canvas<'_>, demo: &str, adapter: Option<&AdapterStatusView>) {
        let help = CellStyle::fg(GREY).dim();
        let y = CANVAS_H;
        canvas.text(0, y, "[", help);
        canvas.text(1, y, demo, help);
        canvas.text(1 + demo.len() as u16, y, "]", help);
        match adapter {
            Some(st) => {
                canvas.text(12, y, "adapter", help);
                canvas.number(20, y, st.port as i64, help);
                canvas.text(27, y, "clients", help);
                canvas.number(35, y, st.client_count as i64, help);
                canvas.text(39, y, "stream", help);
                canvas.number(46, y, st.streaming_count as i64, help);
            }
            None => canvas.text(12, y, "adapter off", help),
        }
        canvas.text(
            0,
            y + 1,
            "<-/-> turn  space click  down hold  tab demo  q quit",
            help,
        );
    }

    fn cell_x(&self, x: u16) -> u16 {
        BOARD_X + 1 + x * self.cell_w
    }

    fn draw_tetris(&self, canvas: &mut Canvas<'_>, snap: &GameSnapshot) {
        let board_w = BOARD_WIDTH as u16 * self.cell_w;
        let board_h = BOARD_HEIGHT as u16;
        let border = CellStyle::fg(Rgb::WHITE);

        canvas.block(BOARD_X, BOARD_Y, 1, '┌', border);
        canvas.block(BOARD_X + 1, BOARD_Y, board_w, '─', border);
        canvas.block(BOARD_X + board_w + 1, BOARD_Y, 1, '┐', border);
        for y in 0..board_h {
            let row = BOARD_Y + 1 + y;
            canvas.block(BOARD_X, row, 1, '│', border);
            canvas.block(BOARD_X + 1, row, board_w, ' ', CellStyle::fg(GREY).on(BOARD_BG));
            canvas.block(BOARD_X + board_w + 1, row, 1, '│', border);
        }
        let bottom = BOARD_Y + board_h + 1;
        canvas.block(BOARD_X, bottom, 1, '└', border);
        canvas.block(BOARD_X + 1, bottom, board_w, '─', border);
        canvas.block(BOARD_X + board_w + 1, bottom, 1, '┘', border);

        for (y, row) in snap.board.iter().enumerate() {
            for (x, &color) in row.iter().enumerate() {
                if let Some(kind) = PieceKind::from_color_index(color) {
                    let style = CellStyle::fg(piece_color(kind)).on(BOARD_BG);
                    canvas.block(self.cell_x(x as u16), BOARD_Y + 1 + y as u16, self.cell_w, '█', style);
                }
            }
        }

        if let Some(active) = snap.active {
            let shape = get_shape(active.kind, active.rotation);
            if let Some(ghost_y) = snap.ghost_y.filter(|&g| g != active.y) {
                let style = CellStyle::fg(piece_color(active.kind).halved()).on(BOARD_BG);
                for &(dx, dy) in shape.iter() {
                    self.draw_piece_cell(canvas, active.x + dx, ghost_y + dy, '░', style);
                }
            }
            let style = CellStyle::fg(piece_color(active.kind)).on(BOARD_BG);
            for &(dx, dy) in shape.iter() {
                self.draw_piece_cell(canvas, active.x + dx, active.y + dy, '█', style);
            }
        }

        let label = CellStyle::fg(Rgb::WHITE).bold();
        let value = CellStyle::fg(GREY);
        canvas.text(SCORE_X, 8, "SCORE", label);
        canvas.number(SCORE_X, 9, snap.score as i64, value);
        canvas.text(SCORE_X, 11, "LINES", label);
        canvas.number(SCORE_X, 12, snap.lines as i64, value);
        canvas.text(SCORE_X, 14, "LEVEL", label);
        canvas.number(SCORE_X, 15, snap.level as i64, value);

        canvas.text(NEXT_X, 7, "NEXT", label);
        let next_style = CellStyle::fg(piece_color(snap.next));
        for &(dx, dy) in get_shape(snap.next, Rotation::North).iter() {
            canvas.block(NEXT_X + dx as u16 * 2, 8 + dy as u16, 2, '█', next_style);
        }
    }

    fn draw_piece_cell(&self, canvas: &mut Canvas<'_>, x: i8, y: i8, ch: char, style: CellStyle) {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return;
        }
        canvas.block(self.cell_x(x as u16), BOARD_Y + 1 + y as u16, self.cell_w, ch, style);
    }

    fn draw_game_over(&self, canvas: &mut Canvas<'_>, snap: &GameSnapshot) {
        canvas.text_centered(7, "GAME OVER", CellStyle::fg(RED).bold());
        canvas.text_centered(11, "Score:", CellStyle::fg(Rgb::WHITE));
        canvas.number_centered(13, snap.score as i64, CellStyle::fg(Rgb::WHITE).bold());
        canvas.text_centered(20, "Press to restart", CellStyle::fg(GREY));
    }

    fn draw_counter(&self, canvas: &mut Canvas<'_>, value: i64) {
        canvas.text_centered(6, "Hello World", CellStyle::fg(Rgb::WHITE).bold());
        canvas.text_centered(11, "Counter:", CellStyle::fg(Rgb::WHITE));
        canvas.number_centered(13, value, CellStyle::fg(CYAN).bold());
        let help = CellStyle::fg(GREY);
        canvas.text_centered(19, "Rotate: Change", help);
        canvas.text_centered(20, "Press: Reset", help);
    }

    fn draw_lights(&self, canvas: &mut Canvas<'_>, app: &LightsApp, strip: &[LedRgb]) {
        canvas.text_centered(4, "LED Control", CellStyle::fg(Rgb::WHITE).bold());

        let count = app.count() as usize;
        for (i, &led) in strip.iter().enumerate().take(60) {
            let x = STRIP_X + (i % 30) as u16;
            let y = 8 + (i / 30) as u16;
            if i < count {
                canvas.block(x, y, 1, '●', CellStyle::fg(led.into()));
            } else {
                canvas.block(x, y, 1, '·', CellStyle::fg(BEZEL).dim());
            }
        }

        canvas.text_centered(13, app.mode().name(), CellStyle::fg(Rgb::WHITE));
        canvas.text_centered(15, &app.value_text(), CellStyle::fg(Rgb::from(app.color())).bold());
        let (power, color) = if app.is_on() {
            ("ON", Rgb::new(0, 200, 80))
        } else {
            ("OFF", RED)
        };
        canvas.text_centered(17, power, CellStyle::fg(color).bold());
        canvas.text_centered(20, "Press: Mode  Hold: On/Off", CellStyle::fg(GREY));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_mask_is_round() {
        assert!(on_panel(CANVAS_W / 2, CANVAS_H / 2));
        assert!(!on_panel(0, 0));
        assert!(!on_panel(CANVAS_W - 1, CANVAS_H - 1));
        assert!(on_panel(1, CANVAS_H / 2));
        // Board corners sit inside the panel
        assert!(on_panel(BOARD_X, BOARD_Y));
        assert!(on_panel(BOARD_X + 21, BOARD_Y + 21));
    }

    #[test]
    fn piece_colors_are_distinct() {
        for a in PieceKind::ALL {
            for b in PieceKind::ALL {
                if a != b {
                    assert_ne!(piece_color(a), piece_color(b));
                }
            }
        }
    }
}
