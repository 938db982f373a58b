//! Character grid the text timeline is painted on.
//!
//! Coordinates are `(col, row)` from the top-left. Writes outside the grid
//! are dropped. Blocks are painted on their own canvas and then stamped
//! onto a larger one with [`Canvas::blit`].

use super::charset::{Arms, BoxChars};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    cells: Vec<Vec<char>>,
}

/// Corner style of a drawn box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxStyle {
    Square,
    Rounded,
    Decision,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![' '; width]; height],
        }
    }

    pub fn get(&self, col: usize, row: usize) -> char {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(' ')
    }

    pub fn set(&mut self, col: usize, row: usize, ch: char) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = ch;
        }
    }

    pub fn set_arms(&mut self, col: usize, row: usize, arms: Arms, bc: &BoxChars) {
        self.set(col, row, arms.to_char(bc));
    }

    /// Vertical line from `y1` to `y2`, inclusive.
    pub fn vline(&mut self, x: usize, y1: usize, y2: usize, ch: char) {
        for row in y1.min(y2)..=y1.max(y2) {
            self.set(x, row, ch);
        }
    }

    pub fn write_str(&mut self, col: usize, row: usize, s: &str) {
        for (i, ch) in s.chars().enumerate() {
            self.set(col + i, row, ch);
        }
    }

    /// Outline a `width` x `height` box at `(x, y)`.
    pub fn draw_box(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        style: BoxStyle,
        bc: &BoxChars,
    ) {
        if width < 2 || height < 2 {
            return;
        }
        let (x1, y1) = (x + width - 1, y + height - 1);
        let corners = match style {
            BoxStyle::Rounded => [
                bc.round_top_left,
                bc.round_top_right,
                bc.round_bottom_left,
                bc.round_bottom_right,
            ],
            BoxStyle::Square | BoxStyle::Decision => {
                [bc.top_left, bc.top_right, bc.bottom_left, bc.bottom_right]
            }
        };
        for col in x + 1..x1 {
            self.set(col, y, bc.horizontal);
            self.set(col, y1, bc.horizontal);
        }
        for row in y + 1..y1 {
            self.set(x, row, bc.vertical);
            self.set(x1, row, bc.vertical);
        }
        self.set(x, y, corners[0]);
        self.set(x1, y, corners[1]);
        self.set(x, y1, corners[2]);
        self.set(x1, y1, corners[3]);
        if style == BoxStyle::Decision {
            let mid = y + height / 2;
            self.set(x, mid, bc.decision_left);
            self.set(x1, mid, bc.decision_right);
        }
    }

    /// Stamp the non-blank cells of `other` with its top-left at `(col, row)`.
    pub fn blit(&mut self, other: &Canvas, col: usize, row: usize) {
        for (r, line) in other.cells.iter().enumerate() {
            for (c, &ch) in line.iter().enumerate() {
                if ch != ' ' {
                    self.set(col + c, row + r, ch);
                }
            }
        }
    }

    /// Lines with trailing blanks trimmed and trailing empty lines dropped.
    pub fn render_to_string(&self) -> String {
        let mut lines: Vec<String> = self
            .cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render_to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut c = Canvas::new(3, 3);
        c.set(10, 10, 'X');
        assert_eq!(c.get(10, 10), ' ');
        c.write_str(1, 0, "abcdef");
        assert_eq!(c.get(2, 0), 'b');
    }

    #[test]
    fn test_rounded_box() {
        let mut c = Canvas::new(6, 3);
        c.draw_box(0, 0, 6, 3, BoxStyle::Rounded, &BoxChars::UNICODE);
        assert_eq!(c.to_string(), "╭────╮\n│    │\n╰────╯\n");
    }

    #[test]
    fn test_decision_box_marks_sides() {
        let mut c = Canvas::new(5, 3);
        c.draw_box(0, 0, 5, 3, BoxStyle::Decision, &BoxChars::ASCII);
        assert_eq!(c.to_string(), "+---+\n<   >\n+---+\n");
    }

    #[test]
    fn test_blit_skips_blanks() {
        let mut big = Canvas::new(4, 2);
        big.write_str(0, 0, "xxxx");
        let mut small = Canvas::new(2, 1);
        small.set(1, 0, 'o');
        big.blit(&small, 1, 0);
        assert_eq!(big.to_string(), "xxox\n");
    }

    #[test]
    fn test_render_trims() {
        let mut c = Canvas::new(10, 4);
        c.set(0, 0, 'A');
        c.vline(0, 1, 1, '|');
        assert_eq!(c.to_string(), "A\n|\n");
    }
}
