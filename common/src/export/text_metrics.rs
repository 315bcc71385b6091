//! 組み込みフォントの文字幅と折り返し
//!
//! 幅は Adobe Core14 AFM の値（1/1000 em）。

use crate::layout::FontFace;

/// Helvetica: ' '(0x20) 〜 '~'(0x7E)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0' - '9'
    278, 278, 584, 584, 584, 556, 1015, // ':' - '@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A' - 'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N' - 'Z'
    278, 278, 278, 469, 556, 333, // '[' - '`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a' - 'm'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n' - 'z'
    334, 260, 334, 584, // '{' - '~'
];

/// Helvetica-Bold: ' '(0x20) 〜 '~'(0x7E)
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0' - '9'
    333, 333, 584, 584, 584, 611, 975, // ':' - '@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A' - 'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N' - 'Z'
    333, 278, 333, 584, 556, 333, // '[' - '`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a' - 'm'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n' - 'z'
    389, 280, 389, 584, // '{' - '~'
];

/// 表に無い文字（Latin-1上位など）の幅
const FALLBACK_WIDTH: u16 = 556;

/// 1文字の幅（1/1000 em）
pub fn char_width(c: char, font: FontFace) -> u16 {
    let table = match font {
        FontFace::Helvetica => &HELVETICA_WIDTHS,
        FontFace::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
    };
    match c as u32 {
        code @ 0x20..=0x7E => table[(code - 0x20) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// 文字列の幅（pt）
pub fn text_width(text: &str, font: FontFace, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| char_width(c, font) as u32).sum();
    units as f32 * size / 1000.0
}

/// 組み込みフォント（WinAnsi）で描ける文字だけにする
///
/// 約物はASCIIへ置換し、Latin-1外の文字（絵文字など）は落とす。
pub fn sanitize_for_builtin_font(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => {
                out.push('-')
            }
            '\u{2022}' | '\u{25CF}' | '\u{25AA}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\t' | '\u{00A0}' | '\u{2002}' | '\u{2003}' | '\u{2009}' => out.push(' '),
            ' '..='~' | '\u{00A1}'..='\u{00FF}' => out.push(c),
            _ => {}
        }
    }
    out
}

/// 折り返し後の1行
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub words: Vec<String>,
    /// 単語を半角スペース1つで連結したときの幅（pt）
    pub width: f32,
    /// 段落の最終行（両端揃えしない）
    pub is_last: bool,
}

impl WrappedLine {
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    /// 単語間の数
    pub fn gaps(&self) -> usize {
        self.words.len().saturating_sub(1)
    }
}

/// 単語単位で `max_width` に収まるよう折り返す
///
/// 1単語で幅を超える場合は文字単位で分割する。
pub fn wrap_text(text: &str, font: FontFace, size: f32, max_width: f32) -> Vec<WrappedLine> {
    let space = text_width(" ", font, size);
    let mut lines = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut width = 0.0_f32;

    for word in text.split_whitespace() {
        for piece in split_long_word(word, font, size, max_width) {
            let piece_width = text_width(&piece, font, size);
            let next_width = if words.is_empty() {
                piece_width
            } else {
                width + space + piece_width
            };

            if next_width > max_width && !words.is_empty() {
                lines.push(WrappedLine {
                    words: std::mem::take(&mut words),
                    width,
                    is_last: false,
                });
                width = piece_width;
            } else {
                width = next_width;
            }
            words.push(piece);
        }
    }

    if !words.is_empty() {
        lines.push(WrappedLine {
            words,
            width,
            is_last: true,
        });
    }
    lines
}

fn split_long_word(word: &str, font: FontFace, size: f32, max_width: f32) -> Vec<String> {
    if text_width(word, font, size) <= max_width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;
    for c in word.chars() {
        let w = char_width(c, font) as f32 * size / 1000.0;
        if current_width + w > max_width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        current.push(c);
        current_width += w;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Hi" = H(722) + i(222)
        let width = text_width("Hi", FontFace::Helvetica, 10.0);
        assert!((width - 9.44).abs() < 0.001);
        // 太字は広い
        assert!(
            text_width("Plant Name:", FontFace::HelveticaBold, 14.0)
                > text_width("Plant Name:", FontFace::Helvetica, 14.0)
        );
    }

    #[test]
    fn test_sanitize_typographic_characters() {
        assert_eq!(
            sanitize_for_builtin_font("It\u{2019}s \u{201C}easy\u{201D} \u{2013} 3\u{2026}"),
            "It's \"easy\" - 3..."
        );
        assert_eq!(sanitize_for_builtin_font("20\u{00B0}C"), "20\u{00B0}C");
        assert_eq!(sanitize_for_builtin_font("Fern \u{1F33F}"), "Fern ");
    }

    #[test]
    fn test_wrap_short_text_single_line() {
        let lines = wrap_text("A small fern", FontFace::Helvetica, 12.0, 400.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_last);
        assert_eq!(lines[0].text(), "A small fern");
        assert!((lines[0].width - text_width("A small fern", FontFace::Helvetica, 12.0)).abs() < 0.001);
    }

    #[test]
    fn test_wrap_respects_max_width() {
        let text = "The leaves are broad glossy and deeply lobed with a bright green colour \
                    that darkens as the plant matures in indirect light";
        let lines = wrap_text(text, FontFace::Helvetica, 12.0, 150.0);
        assert!(lines.len() > 2);
        for line in &lines {
            assert!(line.width <= 150.0 + 0.001, "line too wide: {:?}", line);
        }
        assert!(lines.last().unwrap().is_last);
        assert!(lines[..lines.len() - 1].iter().all(|l| !l.is_last));

        let rejoined = lines.iter().map(|l| l.text()).collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_splits_long_word() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, FontFace::Helvetica, 12.0, 100.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= 100.0 + 0.001));
        assert_eq!(lines.iter().map(|l| l.text()).collect::<String>(), word);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_text("   ", FontFace::Helvetica, 12.0, 100.0).is_empty());
    }
}
