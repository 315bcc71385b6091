//! レイアウト設定モジュール
//!
//! mm基準のページ定義と、レポートの文字スタイル

// ============================================
// mm基準レイアウト（Source of Truth）
// ============================================

/// A4サイズ（mm）
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

// ============================================
// 変換係数
// ============================================

/// mm → pt変換 (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

// ============================================
// 導出されるpt値
// ============================================

/// ページサイズ（pt）
pub const PAGE_WIDTH_PT: f32 = A4_WIDTH_MM * MM_TO_PT;   // 595.3pt
pub const PAGE_HEIGHT_PT: f32 = A4_HEIGHT_MM * MM_TO_PT; // 841.9pt

/// 余白（pt）
pub const MARGIN_PT: f32 = 50.0;

/// 画像枠（pt）。アスペクト比を保ってこの枠に収める
pub const IMAGE_BOX_WIDTH_PT: f32 = 350.0;
pub const IMAGE_BOX_HEIGHT_PT: f32 = 120.0;

/// 画像とタイトルの間隔（pt）
pub const IMAGE_GAP_PT: f32 = 24.0;

/// 行送り = フォントサイズ × 係数
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// レポートタイトル
pub const REPORT_TITLE: &str = "Plant Analysis Report";

// ============================================
// 文字スタイル
// ============================================

/// 組み込みフォント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
}

/// 8bit RGB色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    /// "#2d6a4f" 形式から変換
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// 0.0〜1.0 の成分
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

/// テキストブロックのスタイル
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontFace,
    pub size: f32,
    pub color: Rgb8,
    /// 行間に追加する余白（pt）
    pub line_gap: f32,
    /// ブロック後の余白（pt）
    pub paragraph_gap: f32,
    /// ブロック前の余白（行数）
    pub space_before_lines: f32,
}

impl TextStyle {
    pub fn line_height(&self) -> f32 {
        line_height(self.size)
    }

    /// 1行分の送り量
    pub fn line_advance(&self) -> f32 {
        self.line_height() + self.line_gap
    }

    /// 上端からベースラインまでの距離
    pub fn ascent(&self) -> f32 {
        self.size * HELVETICA_ASCENT
    }
}

/// Helveticaのアセンダ（em比）
pub const HELVETICA_ASCENT: f32 = 0.718;

pub const TITLE_STYLE: TextStyle = TextStyle {
    font: FontFace::HelveticaBold,
    size: 26.0,
    color: Rgb8::from_hex(0x2d6a4f),
    line_gap: 0.0,
    paragraph_gap: 0.0,
    space_before_lines: 0.0,
};

/// タイトル後の余白（タイトルの行数）
pub const TITLE_SPACE_AFTER_LINES: f32 = 2.0;

/// 下線の太さとベースラインからのオフセット（pt）
pub const UNDERLINE_THICKNESS_PT: f32 = 1.5;
pub const UNDERLINE_OFFSET_PT: f32 = 3.5;

pub const LABEL_STYLE: TextStyle = TextStyle {
    font: FontFace::HelveticaBold,
    size: 14.0,
    color: Rgb8::from_hex(0x1b4332),
    line_gap: 0.0,
    paragraph_gap: 0.0,
    space_before_lines: 0.5,
};

pub const DESCRIPTION_STYLE: TextStyle = TextStyle {
    font: FontFace::Helvetica,
    size: 12.0,
    color: Rgb8::from_hex(0x333333),
    line_gap: 6.0,
    paragraph_gap: 10.0,
    space_before_lines: 0.0,
};

pub const PARAGRAPH_STYLE: TextStyle = TextStyle {
    font: FontFace::Helvetica,
    size: 12.0,
    color: Rgb8::from_hex(0x333333),
    line_gap: 6.0,
    paragraph_gap: 0.0,
    space_before_lines: 0.0,
};

// ============================================
// レイアウト設定構造体
// ============================================

/// レポートのページ設定（pt単位）
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub image_box_width_pt: f32,
    pub image_box_height_pt: f32,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::a4()
    }
}

impl ReportLayout {
    /// A4縦
    pub fn a4() -> Self {
        Self {
            page_width_pt: PAGE_WIDTH_PT,
            page_height_pt: PAGE_HEIGHT_PT,
            margin_pt: MARGIN_PT,
            image_box_width_pt: IMAGE_BOX_WIDTH_PT,
            image_box_height_pt: IMAGE_BOX_HEIGHT_PT,
        }
    }

    /// 本文幅（pt）
    pub fn content_width_pt(&self) -> f32 {
        self.page_width_pt - self.margin_pt * 2.0
    }

    /// 本文下端（上端からの距離, pt）
    pub fn content_bottom_pt(&self) -> f32 {
        self.page_height_pt - self.margin_pt
    }
}

// ============================================
// ヘルパー関数
// ============================================

/// pt → mm 変換
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

/// フォントサイズから行の高さ（pt）
#[inline]
pub fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert!((PAGE_WIDTH_PT - 595.28).abs() < 0.1);
        assert!((PAGE_HEIGHT_PT - 841.89).abs() < 0.1);
        let layout = ReportLayout::a4();
        assert!((layout.content_width_pt() - 495.28).abs() < 0.1);
        assert!(layout.image_box_width_pt < layout.content_width_pt());
    }

    #[test]
    fn test_conversion() {
        assert!((MM_TO_PT - 2.835).abs() < 0.01);
        assert!((pt_to_mm(28.35) - 10.0).abs() < 0.01);
        assert!((pt_to_mm(PAGE_WIDTH_PT) - 210.0).abs() < 0.01);
    }

    #[test]
    fn test_colors() {
        assert_eq!(TITLE_STYLE.color, Rgb8(0x2d, 0x6a, 0x4f));
        let (r, g, b) = Rgb8(255, 0, 51).to_unit();
        assert_eq!((r, g), (1.0, 0.0));
        assert!((b - 0.2).abs() < 0.001);
    }

    #[test]
    fn test_line_advance_includes_gap() {
        assert!((DESCRIPTION_STYLE.line_advance() - (12.0 * LINE_HEIGHT_FACTOR + 6.0)).abs() < 0.001);
        assert!(LABEL_STYLE.line_advance() > 0.0);
    }
}
