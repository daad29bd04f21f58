use crate::board::Board;
use crate::palette::cell_color;
use ratatui::style::Color;

/// Half-block rendering for square-looking cells in the terminal.
/// Each character shows two board rows stacked vertically: the upper
/// half-block glyph is drawn in the top cell's color over a background in
/// the bottom cell's color.
const UPPER_HALF: char = '▀';

/// Color used to mark the cursor cell
const CURSOR_COLOR: Color = Color::Rgb(255, 255, 255);

/// Smallest board the canvas will size itself to
const MIN_BOARD_SIDE: usize = 8;

/// A single rendered terminal cell with position and colors
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub fg: Color,
    pub bg: Color,
}

/// Render the board to half-block characters.
///
/// Only characters with something to show (gas, ice or the cursor) are
/// emitted; the rest of the canvas keeps the terminal background.
pub fn render_board(
    board: &Board,
    max_mass: i32,
    canvas_width: u16,
    canvas_height: u16,
    cursor: Option<(usize, usize)>,
) -> Vec<CanvasCell> {
    let columns = (canvas_width as usize).min(board.width());
    let rows = (canvas_height as usize).min(board.height().div_ceil(2));

    let color_at = |x: usize, y: usize| -> Color {
        if cursor == Some((x, y)) {
            return CURSOR_COLOR;
        }
        board.get(x, y).map_or(Color::Reset, |value| cell_color(value, max_mass))
    };

    let mut cells = Vec::with_capacity(columns * rows);
    for cy in 0..rows {
        for cx in 0..columns {
            let top = color_at(cx, cy * 2);
            let bottom = color_at(cx, cy * 2 + 1);
            if top == Color::Reset && bottom == Color::Reset {
                continue;
            }
            cells.push(CanvasCell {
                x: cx as u16,
                y: cy as u16,
                char: UPPER_HALF,
                fg: top,
                bg: bottom,
            });
        }
    }

    cells
}

/// Board size that fills a canvas of the given size
pub fn calculate_board_size(canvas_width: u16, canvas_height: u16) -> (usize, usize) {
    let width = (canvas_width as usize).max(MIN_BOARD_SIDE);
    let height = (canvas_height as usize * 2).max(MIN_BOARD_SIDE);
    (width, height)
}

/// Board coordinate under a terminal position relative to the canvas origin.
/// A terminal row covers two board rows; the upper one is returned.
pub fn board_position(column: u16, row: u16) -> (usize, usize) {
    (column as usize, row as usize * 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_renders_nothing() {
        let board = Board::empty(4, 4);
        assert!(render_board(&board, 6, 4, 2, None).is_empty());
    }

    #[test]
    fn test_half_blocks_pair_rows() {
        let board = Board::from_rows(&[&[6, 0], &[0, 0], &[0, 0], &[0, -1]]);
        let cells = render_board(&board, 6, 2, 2, None);
        assert_eq!(cells.len(), 2);

        assert_eq!((cells[0].x, cells[0].y), (0, 0));
        assert_eq!(cells[0].fg, Color::Rgb(255, 0, 0));
        assert_eq!(cells[0].bg, Color::Reset);

        assert_eq!((cells[1].x, cells[1].y), (1, 1));
        assert_eq!(cells[1].fg, Color::Reset);
        assert_eq!(cells[1].bg, Color::Rgb(0, 224, 191));
    }

    #[test]
    fn test_cursor_is_drawn_on_empty_cell() {
        let board = Board::empty(3, 3);
        let cells = render_board(&board, 6, 3, 2, Some((1, 1)));
        assert_eq!(cells.len(), 1);
        assert_eq!((cells[0].x, cells[0].y), (1, 0));
        assert_eq!(cells[0].bg, CURSOR_COLOR);
    }

    #[test]
    fn test_canvas_clips_large_board() {
        let mut board = Board::empty(10, 10);
        board.set(9, 9, 6);
        assert!(render_board(&board, 6, 4, 2, None).is_empty());
    }

    #[test]
    fn test_board_size_and_position() {
        assert_eq!(calculate_board_size(40, 20), (40, 40));
        assert_eq!(calculate_board_size(2, 1), (8, 8));
        assert_eq!(board_position(3, 5), (3, 10));
    }
}
