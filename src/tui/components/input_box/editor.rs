//! Text buffer and cursor for the InputBox.
//!
//! Layout is a hard wrap by display width (no word breaking) so that every
//! byte offset maps to exactly one screen cell. The cursor is a byte offset
//! that always sits on a char boundary.

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

#[derive(Debug, Default)]
pub(super) struct Editor {
    text: String,
    cursor: usize,
}

impl Editor {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Empties the buffer and returns what was typed.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert(&mut self, s: &str) {
        let s = s.replace("\r\n", "\n").replace('\r', "\n");
        self.text.insert_str(self.cursor, &s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) -> bool {
        let Some(prev) = self.prev_boundary() else {
            return false;
        };
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
        true
    }

    pub fn delete(&mut self) -> bool {
        let Some(next) = self.next_boundary() else {
            return false;
        };
        self.text.drain(self.cursor..next);
        true
    }

    pub fn left(&mut self) -> bool {
        self.prev_boundary().map(|prev| self.cursor = prev).is_some()
    }

    pub fn right(&mut self) -> bool {
        self.next_boundary().map(|next| self.cursor = next).is_some()
    }

    /// Start of the current logical line.
    pub fn home(&mut self) -> bool {
        let start = self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
        let moved = start != self.cursor;
        self.cursor = start;
        moved
    }

    /// End of the current logical line.
    pub fn end(&mut self) -> bool {
        let end = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |i| self.cursor + i);
        let moved = end != self.cursor;
        self.cursor = end;
        moved
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    /// Byte ranges of the screen rows at `width` columns. Always at least
    /// one row; newlines are not part of any range.
    pub fn rows(&self, width: u16) -> Vec<Range<usize>> {
        let width = usize::from(width.max(1));
        let mut rows = Vec::new();
        let mut line_start = 0;
        for line in self.text.split('\n') {
            let mut row_start = line_start;
            let mut used = 0;
            for (i, c) in line.char_indices() {
                let w = c.width().unwrap_or(0);
                if used + w > width && used > 0 {
                    rows.push(row_start..line_start + i);
                    row_start = line_start + i;
                    used = 0;
                }
                used += w;
            }
            rows.push(row_start..line_start + line.len());
            line_start += line.len() + 1;
        }
        rows
    }

    /// Screen `(row, column)` of the cursor at `width` columns.
    pub fn cursor_cell(&self, width: u16) -> (u16, u16) {
        let rows = self.rows(width);
        // On a soft-wrap boundary the cursor belongs to the later row
        let row = rows
            .iter()
            .rposition(|r| r.start <= self.cursor)
            .unwrap_or(0);
        let col = display_width(&self.text[rows[row].start..self.cursor.min(rows[row].end)]);
        if col >= usize::from(width) && width > 0 {
            return (to_u16(row + 1), 0);
        }
        (to_u16(row), to_u16(col))
    }

    /// Moves one screen row up (`-1`) or down (`1`), keeping the column
    /// where possible.
    pub fn vertical(&mut self, direction: i8, width: u16) -> bool {
        let rows = self.rows(width);
        let (row, col) = self.cursor_cell(width);
        let target = match direction {
            d if d < 0 => match usize::from(row).checked_sub(1) {
                Some(t) => t,
                None => return false,
            },
            _ => usize::from(row) + 1,
        };
        let Some(range) = rows.get(target) else {
            return false;
        };
        let mut pos = range.start;
        let mut used = 0;
        for (i, c) in self.text[range.clone()].char_indices() {
            let w = c.width().unwrap_or(0);
            if used + w > usize::from(col) {
                break;
            }
            used += w;
            pos = range.start + i + c.len_utf8();
        }
        self.cursor = pos;
        true
    }
}

fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
