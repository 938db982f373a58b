//! Box-drawing characters for the text timeline.

// ─── CharSet ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    #[default]
    Unicode,
    Ascii,
}

impl CharSet {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "unicode" => Some(Self::Unicode),
            "ascii" => Some(Self::Ascii),
            _ => None,
        }
    }
}

// ─── BoxChars ────────────────────────────────────────────────────────────────

/// Glyphs for one character set. Step boxes use square corners, terminal
/// boxes (start/end) use the rounded ones.
#[derive(Debug, Clone, Copy)]
pub struct BoxChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub round_top_left: char,
    pub round_top_right: char,
    pub round_bottom_left: char,
    pub round_bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
    pub tee_right: char,
    pub tee_left: char,
    pub tee_down: char,
    pub tee_up: char,
    pub cross: char,
    pub arrow_down: char,
    pub arrow_right: char,
    /// Side markers on the label row of a decision box.
    pub decision_left: char,
    pub decision_right: char,
}

impl BoxChars {
    pub const UNICODE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        round_top_left: '╭',
        round_top_right: '╮',
        round_bottom_left: '╰',
        round_bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
        tee_right: '├',
        tee_left: '┤',
        tee_down: '┬',
        tee_up: '┴',
        cross: '┼',
        arrow_down: '▼',
        arrow_right: '►',
        decision_left: '◆',
        decision_right: '◆',
    };

    pub const ASCII: Self = Self {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        round_top_left: '.',
        round_top_right: '.',
        round_bottom_left: '\'',
        round_bottom_right: '\'',
        horizontal: '-',
        vertical: '|',
        tee_right: '+',
        tee_left: '+',
        tee_down: '+',
        tee_up: '+',
        cross: '+',
        arrow_down: 'v',
        arrow_right: '>',
        decision_left: '<',
        decision_right: '>',
    };

    pub fn for_charset(cs: CharSet) -> Self {
        match cs {
            CharSet::Unicode => Self::UNICODE,
            CharSet::Ascii => Self::ASCII,
        }
    }
}

// ─── Arms ────────────────────────────────────────────────────────────────────

/// Active arms of a line junction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Arms {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Arms {
    pub fn to_char(self, bc: &BoxChars) -> char {
        match (self.up, self.down, self.left, self.right) {
            (false, false, false, false) => ' ',
            (_, _, false, false) => bc.vertical,
            (false, false, _, _) => bc.horizontal,
            (false, true, false, true) => bc.top_left,
            (false, true, true, false) => bc.top_right,
            (true, false, false, true) => bc.bottom_left,
            (true, false, true, false) => bc.bottom_right,
            (true, true, false, true) => bc.tee_right,
            (true, true, true, false) => bc.tee_left,
            (false, true, true, true) => bc.tee_down,
            (true, false, true, true) => bc.tee_up,
            (true, true, true, true) => bc.cross,
        }
    }
}
