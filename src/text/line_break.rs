//! Line breaking.
//!
//! Splits a string into [`LineFragment`]s in a single left-to-right scan.
//! Words are accumulated until a delimiter flushes them into the current
//! line; a line is emitted once the next word no longer fits, on an
//! explicit `'\n'`, and at the end of the text. A word that does not fit
//! on an empty line is split wherever it overflows.

use smartstring::{LazyCompact, SmartString};

use crate::{font::GlyphMetrics, text::Align};

/// One line of text ready for layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFragment {
    /// The line's characters. Tabs are expanded into one `'\t'`
    /// per space-width of indentation.
    pub text: SmartString<LazyCompact>,
    /// Width in unscaled font units, including inter-glyph spacing.
    pub width: i32,
    /// Alignment to apply to this line.
    pub align: Align,
}

impl LineFragment {
    pub fn new(text: impl Into<SmartString<LazyCompact>>, width: i32, align: Align) -> Self {
        Self {
            text: text.into(),
            width,
            align,
        }
    }
}

/// Parameters for [`break_lines`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BreakParams {
    /// Wrapping width in unscaled font units. Zero disables wrapping.
    pub max_width: i32,
    /// Tab stop interval, in characters.
    pub tab_size: usize,
    /// Gap between consecutive glyphs of a word (proportional mode only).
    pub proportional_spacing: i32,
    /// Whether glyphs advance by their own width or by the cell width.
    pub proportional: bool,
    pub align: Align,
}

impl Default for BreakParams {
    fn default() -> Self {
        Self {
            max_width: 0,
            tab_size: super::DEFAULT_TAB_SIZE,
            proportional_spacing: super::DEFAULT_PROPORTIONAL_SPACING,
            proportional: true,
            align: Align::Left,
        }
    }
}

impl BreakParams {
    /// The gap actually inserted between glyphs.
    pub fn spacing(&self) -> i32 {
        if self.proportional {
            self.proportional_spacing
        } else {
            0
        }
    }

    pub fn advance(&self, metrics: &impl GlyphMetrics, c: char) -> i32 {
        match CharKind::of(c) {
            CharKind::Space | CharKind::Tab => self.space_advance(metrics),
            CharKind::Newline => 0,
            CharKind::Glyph if self.proportional => metrics.advance_width(c),
            CharKind::Glyph => metrics.cell_width(),
        }
    }

    pub fn space_advance(&self, metrics: &impl GlyphMetrics) -> i32 {
        if self.proportional {
            metrics.advance_width(' ')
        } else {
            metrics.cell_width()
        }
    }
}

/// How the breaker and layout treat a character.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CharKind {
    Space,
    Tab,
    Newline,
    Glyph,
}

impl CharKind {
    pub fn of(c: char) -> Self {
        match c {
            ' ' => CharKind::Space,
            '\t' => CharKind::Tab,
            '\n' => CharKind::Newline,
            _ => CharKind::Glyph,
        }
    }

    pub fn is_delimiter(self) -> bool {
        !matches!(self, CharKind::Glyph)
    }
}

/// Width of a single line, with no wrapping or trimming.
pub fn measure(text: &str, metrics: &impl GlyphMetrics, params: &BreakParams) -> i32 {
    let spacing = params.spacing();
    let mut width = 0;
    let mut previous = CharKind::Space;
    for c in text.chars() {
        let kind = CharKind::of(c);
        if !kind.is_delimiter() && !previous.is_delimiter() {
            width += spacing;
        }
        width += params.advance(metrics, c);
        previous = kind;
    }
    width
}

/// Breaks `text` into lines.
///
/// Returns no fragments for empty text. Unbounded text (`max_width == 0`)
/// is only split on `'\n'` and kept verbatim; trailing empty lines are
/// dropped, so `"ab\n"` is one line and `"\n"` is none. Bounded fragments
/// have their leading and trailing spaces stripped, and a trailing newline
/// does produce a final blank line.
pub fn break_lines(
    text: &str,
    metrics: &impl GlyphMetrics,
    params: &BreakParams,
) -> Vec<LineFragment> {
    if text.is_empty() {
        return Vec::new();
    }

    let fragments: Vec<LineFragment> = if params.max_width <= 0 {
        let mut fragments: Vec<LineFragment> = text
            .split('\n')
            .map(|line| LineFragment::new(line, measure(line, metrics, params), params.align))
            .collect();
        while fragments.last().map_or(false, |f| f.text.is_empty()) {
            fragments.pop();
        }
        fragments
    } else {
        Breaker::new(metrics, params).run(text)
    };

    log::trace!(
        "Broke {} chars into {} lines (max width {})",
        text.len(),
        fragments.len(),
        params.max_width
    );
    fragments
}

#[derive(Default)]
struct Accumulator {
    text: String,
    width: i32,
}

impl Accumulator {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn clear(&mut self) {
        self.text.clear();
        self.width = 0;
    }
}

/// State of a bounded line-breaking pass.
struct Breaker<'a, M> {
    metrics: &'a M,
    params: &'a BreakParams,
    space_advance: i32,

    word: Accumulator,
    line: Accumulator,
    previous: CharKind,

    fragments: Vec<LineFragment>,
}

impl<'a, M> Breaker<'a, M>
where
    M: GlyphMetrics,
{
    fn new(metrics: &'a M, params: &'a BreakParams) -> Self {
        Self {
            metrics,
            params,
            space_advance: params.space_advance(metrics),
            word: Accumulator::default(),
            line: Accumulator::default(),
            previous: CharKind::Space,
            fragments: Vec::new(),
        }
    }

    fn run(mut self, text: &str) -> Vec<LineFragment> {
        for c in text.chars() {
            let kind = CharKind::of(c);
            match kind {
                CharKind::Space => self.push_space(),
                CharKind::Tab => self.push_tab(),
                CharKind::Newline => {
                    self.flush_word();
                    self.emit_forced();
                }
                CharKind::Glyph => self.push_glyph(c),
            }
            self.previous = kind;
        }

        self.flush_word();
        self.emit_forced();
        self.fragments
    }

    fn overflows(&self) -> bool {
        self.line.width + self.word.width >= self.params.max_width
    }

    fn push_space(&mut self) {
        self.flush_word();
        self.word.text.push(' ');
        self.word.width += self.space_advance;
        if self.overflows() {
            self.emit_wrapped();
            self.word.clear();
        }
        self.flush_word();
    }

    fn push_tab(&mut self) {
        self.flush_word();
        let tab_size = self.params.tab_size.max(1);
        let columns = tab_size - self.line.text.chars().count() % tab_size;
        for _ in 0..columns {
            self.word.text.push('\t');
        }
        self.word.width += self.space_advance * columns as i32;
        if self.overflows() {
            self.emit_wrapped();
            self.word.clear();
        }
        self.flush_word();
    }

    fn push_glyph(&mut self, c: char) {
        let gap = if self.previous.is_delimiter() {
            0
        } else {
            self.params.spacing()
        };
        let advance = self.params.advance(self.metrics, c);

        self.word.text.push(c);
        self.word.width += gap + advance;

        if !self.overflows() {
            return;
        }

        // The word moves to a fresh line.
        if !self.line.is_empty() {
            self.emit_wrapped();
        }

        // Still too wide on its own: split the word before `c`.
        if self.word.width >= self.params.max_width && self.word.text.chars().nth(1).is_some() {
            self.word.text.pop();
            self.word.width -= gap + advance;
            self.flush_word();
            self.emit_wrapped();

            self.word.text.push(c);
            self.word.width = advance;
        }
    }

    fn flush_word(&mut self) {
        self.line.text.push_str(&self.word.text);
        self.line.width += self.word.width;
        self.word.clear();
    }

    /// Emits the line because the next word did not fit.
    /// Lines that hold nothing but spaces are dropped.
    fn emit_wrapped(&mut self) {
        let fragment = self.trimmed_line(self.params.align);
        if !fragment.text.is_empty() {
            self.fragments.push(fragment);
        }
        self.line.clear();
    }

    /// Emits the line because of an explicit break or the end of the text.
    fn emit_forced(&mut self) {
        let fragment = self.trimmed_line(self.params.align.for_last_line());
        self.fragments.push(fragment);
        self.line.clear();
    }

    fn trimmed_line(&self, align: Align) -> LineFragment {
        let text = self.line.text.trim_matches(' ');
        let stripped = self.line.text.len() - text.len();
        LineFragment::new(
            text,
            self.line.width - stripped as i32 * self.space_advance,
            align,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::font::fixtures::FlatMetrics;

    use super::*;

    const METRICS: FlatMetrics = FlatMetrics {
        width: 10,
        height: 12,
    };

    fn params(max_width: i32) -> BreakParams {
        BreakParams {
            max_width,
            tab_size: 4,
            proportional_spacing: 2,
            proportional: true,
            align: Align::Left,
        }
    }

    fn texts(fragments: &[LineFragment]) -> Vec<&str> {
        fragments.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(break_lines("", &METRICS, &params(0)).is_empty());
        assert!(break_lines("", &METRICS, &params(50)).is_empty());
    }

    #[test]
    fn unbounded_line_width_counts_spacing() {
        let fragments = break_lines("abcde", &METRICS, &params(0));
        assert_eq!(fragments, vec![LineFragment::new("abcde", 58, Align::Left)]);
    }

    #[test]
    fn unbounded_keeps_spaces() {
        let fragments = break_lines("  a b  ", &METRICS, &params(0));
        assert_eq!(texts(&fragments), vec!["  a b  "]);
        assert_eq!(fragments[0].width, 70);
    }

    #[test]
    fn unbounded_splits_on_newlines_only() {
        let mut p = params(0);
        p.align = Align::Full;
        let fragments = break_lines("ab\n\ncd\n", &METRICS, &p);
        assert_eq!(texts(&fragments), vec!["ab", "", "cd"]);
        assert!(fragments.iter().all(|f| f.align == Align::Full));
    }

    #[test]
    fn unbounded_drops_trailing_blank_lines() {
        assert_eq!(texts(&break_lines("ab\n\n", &METRICS, &params(0))), vec!["ab"]);
        assert!(break_lines("\n", &METRICS, &params(0)).is_empty());
        assert_eq!(texts(&break_lines("\nab", &METRICS, &params(0))), vec!["", "ab"]);
    }

    #[test]
    fn long_lines_keep_their_text() {
        let text = "the quick brown fox jumps over the lazy dog";
        let fragments = break_lines(text, &METRICS, &params(0));
        assert_eq!(texts(&fragments), vec![text]);
        assert_eq!(fragments[0].width, measure(text, &METRICS, &params(0)));

        let fragments = break_lines(text, &METRICS, &params(1000));
        assert_eq!(texts(&fragments), vec![text]);

        let text = "jumped over the lazy dogs\tand then ran";
        let fragments = break_lines(text, &METRICS, &params(2000));
        assert_eq!(
            fragments[0].text.as_str(),
            "jumped over the lazy dogs\t\t\tand then ran"
        );
    }

    #[test]
    fn overflow_boundary_is_inclusive() {
        let fragments = break_lines("abcde", &METRICS, &params(25));
        assert_eq!(fragments[0], LineFragment::new("ab", 22, Align::Left));
        let rest: String = fragments[1..].iter().map(|f| f.text.as_str()).collect();
        assert_eq!(rest, "cde");
        assert_eq!(texts(&fragments), vec!["ab", "cd", "e"]);
    }

    #[test]
    fn words_wrap_at_spaces() {
        let fragments = break_lines("ab cd ef", &METRICS, &params(60));
        assert_eq!(texts(&fragments), vec!["ab cd", "ef"]);
        assert_eq!(fragments[0].width, 22 + 10 + 22);
        assert_eq!(fragments[1].width, 22);
    }

    #[test]
    fn space_that_overflows_ends_the_line() {
        let fragments = break_lines("abcd efg", &METRICS, &params(50));
        assert_eq!(texts(&fragments), vec!["abcd", "efg"]);
        assert_eq!(fragments[0].width, 46);
    }

    #[test]
    fn explicit_breaks_fall_back_to_left() {
        let mut p = params(100);
        p.align = Align::Full;
        let fragments = break_lines("a\nb", &METRICS, &p);
        assert_eq!(
            fragments,
            vec![
                LineFragment::new("a", 10, Align::Left),
                LineFragment::new("b", 10, Align::Left),
            ]
        );
    }

    #[test]
    fn wrapped_lines_keep_full_alignment() {
        let mut p = params(60);
        p.align = Align::Full;
        let fragments = break_lines("ab cd ef", &METRICS, &p);
        assert_eq!(fragments[0].align, Align::Full);
        assert_eq!(fragments[1].align, Align::Left);
    }

    #[test]
    fn trailing_newline_keeps_blank_line() {
        let fragments = break_lines("ab\n", &METRICS, &params(100));
        assert_eq!(texts(&fragments), vec!["ab", ""]);
        assert_eq!(fragments[1].width, 0);
    }

    #[test]
    fn bounded_lines_are_trimmed() {
        let fragments = break_lines("  ab  \n cd ", &METRICS, &params(200));
        assert_eq!(texts(&fragments), vec!["ab", "cd"]);
        assert_eq!(fragments[0].width, 22);
        assert_eq!(fragments[1].width, 22);
    }

    #[test]
    fn tabs_expand_to_the_next_stop() {
        let fragments = break_lines("ab\tc", &METRICS, &params(200));
        assert_eq!(fragments[0].text.as_str(), "ab\t\tc");
        assert_eq!(fragments[0].width, 22 + 20 + 10);

        let fragments = break_lines("\tc", &METRICS, &params(200));
        assert_eq!(fragments[0].text.as_str(), "\t\t\t\tc");
    }

    #[test]
    fn tab_that_overflows_is_dropped() {
        let fragments = break_lines("abc\tde", &METRICS, &params(40));
        assert_eq!(texts(&fragments), vec!["abc", "de"]);
    }

    #[test]
    fn fixed_mode_uses_cell_width_without_spacing() {
        let mut p = params(0);
        p.proportional = false;
        let fragments = break_lines("abc", &METRICS, &p);
        assert_eq!(fragments[0].width, 30);
    }

    #[test]
    fn long_word_after_short_one_is_split() {
        let fragments = break_lines("a bcdefgh", &METRICS, &params(35));
        assert_eq!(texts(&fragments), vec!["a", "bcd", "efg", "h"]);
    }

    #[test]
    fn single_glyph_wider_than_line_is_kept() {
        let fragments = break_lines("ab", &METRICS, &params(5));
        assert_eq!(texts(&fragments), vec!["a", "b"]);
    }

    #[test]
    fn forced_splits_cover_the_run() {
        let rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            let len = rng.usize(1..40);
            let word: String = (0..len).map(|_| rng.char('a'..='z')).collect();
            let max_width = rng.i32(23..120);
            let fragments = break_lines(&word, &METRICS, &params(max_width));

            let joined: String = fragments.iter().map(|f| f.text.as_str()).collect();
            assert_eq!(joined, word);
            for fragment in &fragments {
                assert!(fragment.width <= max_width, "{:?} > {}", fragment, max_width);
                assert_eq!(
                    fragment.width,
                    measure(&fragment.text, &METRICS, &params(0))
                );
            }
        }
    }

    #[test]
    fn bounded_fragments_never_start_or_end_with_spaces() {
        let rng = fastrand::Rng::with_seed(11);
        let alphabet = ['a', 'b', ' ', ' ', '\n', 'c'];
        for _ in 0..200 {
            let len = rng.usize(1..60);
            let text: String = (0..len)
                .map(|_| alphabet[rng.usize(..alphabet.len())])
                .collect();
            let p = params(rng.i32(30..90));
            for fragment in break_lines(&text, &METRICS, &p) {
                assert!(!fragment.text.starts_with(' '));
                assert!(!fragment.text.ends_with(' '));
                assert_eq!(fragment.width, measure(&fragment.text, &METRICS, &p));
            }
        }
    }
}
