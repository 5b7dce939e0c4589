//! Qt-style argument insertion for translated strings.
//!
//! Three marker forms, up to nine inserts per string:
//!   - `%x`    plain string insert, `x` in 1..=9 giving the insert order;
//!   - `%Lx`   number insert (plain formatting here);
//!   - `%[y]x` length-limited insert: the argument is cut to `y` counted
//!     characters and gets an ellipsis when something was cut off.
//!
//! Each call substitutes every occurrence of the lowest-numbered marker
//! still present, matching `QString::arg` order independence.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Plain,
    Number,
    /// Maximum counted length for the inserted argument.
    Limited(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub number: u8,
    pub kind: MarkerKind,
    /// Byte span of the whole marker in the pattern.
    pub start: usize,
    pub end: usize,
}

/// Scan a pattern for insert markers, left to right.
pub fn markers(pattern: &str) -> Vec<Marker> {
    let bytes = pattern.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let start = i;
        let mut j = i + 1;
        if j >= bytes.len() {
            break;
        }

        match bytes[j] {
            b'1'..=b'9' => {
                out.push(Marker {
                    number: bytes[j] - b'0',
                    kind: MarkerKind::Plain,
                    start,
                    end: j + 1,
                });
                i = j + 1;
            }
            b'L' => {
                j += 1;
                if j < bytes.len() && bytes[j].is_ascii_digit() && bytes[j] != b'0' {
                    out.push(Marker {
                        number: bytes[j] - b'0',
                        kind: MarkerKind::Number,
                        start,
                        end: j + 1,
                    });
                    i = j + 1;
                } else {
                    i = j;
                }
            }
            b'[' => {
                j += 1;
                let digits_start = j;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                if j > digits_start
                    && j + 1 < bytes.len()
                    && bytes[j] == b']'
                    && bytes[j + 1].is_ascii_digit()
                    && bytes[j + 1] != b'0'
                {
                    let limit: usize = pattern[digits_start..j].parse().unwrap_or(0);
                    out.push(Marker {
                        number: bytes[j + 1] - b'0',
                        kind: MarkerKind::Limited(limit),
                        start,
                        end: j + 2,
                    });
                    i = j + 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    out
}

/// The distinct marker numbers of a pattern, sorted. Used by QA to compare
/// a translation against its source.
pub fn marker_numbers(pattern: &str) -> Vec<u8> {
    let mut numbers: Vec<u8> = markers(pattern).iter().map(|m| m.number).collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

/// Insert `args` into `pattern`. The first argument replaces the
/// lowest-numbered marker present, the second the next lowest, and so on;
/// markers without a matching argument stay in the text.
pub fn insert_args(pattern: &str, args: &[&str]) -> String {
    let mut text = pattern.to_string();

    for arg in args {
        let found = markers(&text);
        let Some(lowest) = found.iter().map(|m| m.number).min() else {
            break;
        };

        let mut out = String::with_capacity(text.len() + arg.len());
        let mut pos = 0usize;
        for marker in &found {
            if marker.number != lowest {
                continue;
            }
            out.push_str(&text[pos..marker.start]);
            match marker.kind {
                MarkerKind::Plain | MarkerKind::Number => out.push_str(arg),
                MarkerKind::Limited(limit) => out.push_str(&truncate_counted(arg, limit)),
            }
            pos = marker.end;
        }
        out.push_str(&text[pos..]);
        text = out;
    }

    text
}

/// Cut `arg` to `limit` counted characters, appending an ellipsis when
/// anything was removed. Thai combining vowels and tone marks
/// (U+0E34..U+0E3B, U+0E47..U+0E4D) and the zero-width space (U+200B)
/// occupy no cell and do not count toward the limit.
fn truncate_counted(arg: &str, limit: usize) -> String {
    let mut counted = 0usize;
    for (idx, ch) in arg.char_indices() {
        if !is_zero_width(ch) {
            counted += 1;
            if counted == limit + 1 {
                let mut out = arg[..idx].to_string();
                out.push('\u{2026}');
                return out;
            }
        }
    }
    arg.to_string()
}

fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{0E34}'..='\u{0E3B}' | '\u{0E47}'..='\u{0E4D}' | '\u{200B}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_all_marker_forms() {
        let found = markers("Move %1 to %[8]2 (%L3)");
        assert_eq!(found.len(), 3);
        assert_eq!((found[0].number, found[0].kind), (1, MarkerKind::Plain));
        assert_eq!((found[1].number, found[1].kind), (2, MarkerKind::Limited(8)));
        assert_eq!((found[2].number, found[2].kind), (3, MarkerKind::Number));
    }

    #[test]
    fn literal_percent_is_not_a_marker() {
        assert!(markers("100% done, %0 too").is_empty());
        assert_eq!(marker_numbers("%1 of %2 (%1)"), [1, 2]);
    }

    #[test]
    fn inserts_in_number_order_not_text_order() {
        // %2 appears first in the text; the first argument still goes to %1.
        let out = insert_args("%2 received from %1", &["Alice", "3 files"]);
        assert_eq!(out, "3 files received from Alice");
    }

    #[test]
    fn repeated_marker_gets_the_same_argument() {
        let out = insert_args("%1 and %1 again", &["twice"]);
        assert_eq!(out, "twice and twice again");
    }

    #[test]
    fn missing_arguments_leave_markers_in_place() {
        let out = insert_args("%1 of %2", &["5"]);
        assert_eq!(out, "5 of %2");
    }

    #[test]
    fn limited_marker_truncates_with_ellipsis() {
        let out = insert_args("Delete %[4]1?", &["document.txt"]);
        assert_eq!(out, "Delete docu…?");

        // Shorter than the limit: untouched, no ellipsis.
        let out = insert_args("Delete %[20]1?", &["doc.txt"]);
        assert_eq!(out, "Delete doc.txt?");
    }

    #[test]
    fn thai_marks_do_not_count_toward_the_limit() {
        // Four base characters carrying combining vowels/tone marks.
        let thai = "กิ๊กแก้"; // ก + U+0E34 + U+0E4A, ก, แ, ก + U+0E49
        let out = insert_args("%[4]1", &[thai]);
        assert_eq!(out, thai); // exactly 4 counted characters, no cut

        let out = insert_args("%[3]1", &[thai]);
        assert_eq!(out, "กิ๊กแ\u{2026}");
    }

    #[test]
    fn zero_width_space_is_uncounted() {
        let arg = "ab\u{200B}cd";
        assert_eq!(insert_args("%[4]1", &[arg]), arg);
        // The cut lands after the zero-width space; it stays in the text.
        assert_eq!(insert_args("%[2]1", &[arg]), "ab\u{200B}\u{2026}");
    }
}
