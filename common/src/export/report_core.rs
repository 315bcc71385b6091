//! レポートのレイアウト計算（CLI/サーバー共通）
//!
//! 解析テキストをブロックに分け、ページごとの描画命令へ変換する。
//! 座標はすべてpt、Y座標はPDFと同じくページ下端基準。
//! 同じ入力からは常に同じプランが得られる。

use crate::export::text_metrics::{sanitize_for_builtin_font, text_width, wrap_text};
use crate::layout::{
    FontFace, ReportLayout, Rgb8, TextStyle, DESCRIPTION_STYLE, IMAGE_GAP_PT, LABEL_STYLE,
    PARAGRAPH_STYLE, REPORT_TITLE, TITLE_SPACE_AFTER_LINES, TITLE_STYLE, UNDERLINE_OFFSET_PT,
    UNDERLINE_THICKNESS_PT,
};

/// 解析テキストの1行分
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBlock {
    /// "ラベル: 説明" 行（最初のコロンで分割）
    Section { label: String, description: String },
    /// コロンを含まない行
    Paragraph(String),
}

/// 解析テキストをブロック列に変換
///
/// 空行・空白のみの行は捨てる。説明部分は2つ目以降のコロンも含む。
pub fn parse_report_blocks(text: &str) -> Vec<ReportBlock> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once(':') {
            Some((label, description)) => ReportBlock::Section {
                label: label.trim().to_string(),
                description: description.trim().to_string(),
            },
            None => ReportBlock::Paragraph(line.trim().to_string()),
        })
        .collect()
}

/// テキストの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Title,
    Label,
    Description,
    Paragraph,
}

/// 1行分のテキスト描画
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub role: TextRole,
    /// 元のブロック番号（タイトルはNone）
    pub block: Option<usize>,
    pub text: String,
    pub x_pt: f32,
    pub baseline_pt: f32,
    pub font: FontFace,
    pub size: f32,
    pub color: Rgb8,
    /// 両端揃え用の単語間追加幅（PDFの Tw）
    pub word_spacing: f32,
}

/// 画像の配置（左下基準）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x_pt: f32,
    pub y_pt: f32,
    pub width_pt: f32,
    pub height_pt: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Image(ImagePlacement),
    Text(TextRun),
    Underline {
        x1_pt: f32,
        x2_pt: f32,
        y_pt: f32,
        thickness: f32,
        color: Rgb8,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
    pub ops: Vec<DrawOp>,
}

/// 全ページの描画プラン
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub pages: Vec<PagePlan>,
}

impl ReportPlan {
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.pages.iter().flat_map(|page| {
            page.ops.iter().filter_map(|op| match op {
                DrawOp::Text(run) => Some(run),
                _ => None,
            })
        })
    }

    pub fn image(&self) -> Option<&ImagePlacement> {
        self.pages.iter().flat_map(|page| page.ops.iter()).find_map(|op| match op {
            DrawOp::Image(placement) => Some(placement),
            _ => None,
        })
    }
}

/// ページ送りしながら上から順に配置するカーソル
struct FlowCursor<'a> {
    layout: &'a ReportLayout,
    pages: Vec<PagePlan>,
    /// ページ上端からの距離
    y: f32,
}

impl<'a> FlowCursor<'a> {
    fn new(layout: &'a ReportLayout) -> Self {
        Self {
            layout,
            pages: vec![PagePlan::default()],
            y: layout.margin_pt,
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.layout.margin_pt
    }

    /// 残りが `height` に足りなければ改ページ
    fn ensure_space(&mut self, height: f32) {
        if self.y + height > self.layout.content_bottom_pt() && !self.at_page_top() {
            self.pages.push(PagePlan::default());
            self.y = self.layout.margin_pt;
        }
    }

    /// ページ先頭では余白を入れない
    fn space(&mut self, height: f32) {
        if !self.at_page_top() {
            self.y += height;
        }
    }

    fn place_line(&mut self, style: &TextStyle, line: LinePlacement) -> TextRun {
        self.ensure_space(style.line_height());
        let run = TextRun {
            role: line.role,
            block: line.block,
            text: line.text,
            x_pt: line.x_pt,
            baseline_pt: self.layout.page_height_pt - (self.y + style.ascent()),
            font: style.font,
            size: style.size,
            color: style.color,
            word_spacing: line.word_spacing,
        };
        self.push(DrawOp::Text(run.clone()));
        self.y += style.line_advance();
        run
    }

    /// 折り返して配置。`justify` なら最終行以外を両端揃え
    fn place_wrapped(
        &mut self,
        style: &TextStyle,
        text: &str,
        role: TextRole,
        block: Option<usize>,
        justify: bool,
    ) {
        let width = self.layout.content_width_pt();
        for line in wrap_text(text, style.font, style.size, width) {
            let word_spacing = if justify && !line.is_last && line.gaps() > 0 {
                (width - line.width) / line.gaps() as f32
            } else {
                0.0
            };
            self.place_line(
                style,
                LinePlacement {
                    role,
                    block,
                    text: line.text(),
                    x_pt: self.layout.margin_pt,
                    word_spacing,
                },
            );
        }
    }
}

struct LinePlacement {
    role: TextRole,
    block: Option<usize>,
    text: String,
    x_pt: f32,
    word_spacing: f32,
}

/// 画像（px）を枠に収めたサイズ（pt）
pub fn fit_image(layout: &ReportLayout, width_px: u32, height_px: u32) -> Option<(f32, f32)> {
    if width_px == 0 || height_px == 0 {
        return None;
    }
    let (w, h) = (width_px as f32, height_px as f32);
    let scale = (layout.image_box_width_pt / w).min(layout.image_box_height_pt / h);
    Some((w * scale, h * scale))
}

/// 描画プランを作成
///
/// # Arguments
/// * `layout` - ページ設定
/// * `blocks` - [`parse_report_blocks`] の結果
/// * `image_size` - 埋め込む画像のピクセルサイズ（画像なしはNone）
pub fn plan_report(
    layout: &ReportLayout,
    blocks: &[ReportBlock],
    image_size: Option<(u32, u32)>,
) -> ReportPlan {
    let mut cursor = FlowCursor::new(layout);

    // 画像（タイトル上部・中央）
    if let Some((width_pt, height_pt)) = image_size.and_then(|(w, h)| fit_image(layout, w, h)) {
        let top = cursor.y;
        cursor.push(DrawOp::Image(ImagePlacement {
            x_pt: (layout.page_width_pt - width_pt) / 2.0,
            y_pt: layout.page_height_pt - top - height_pt,
            width_pt,
            height_pt,
        }));
        cursor.y = top + layout.image_box_height_pt + IMAGE_GAP_PT;
    }

    // タイトル（中央・下線）
    let title_width = text_width(REPORT_TITLE, TITLE_STYLE.font, TITLE_STYLE.size);
    let title_x = (layout.page_width_pt - title_width) / 2.0;
    let title = cursor.place_line(
        &TITLE_STYLE,
        LinePlacement {
            role: TextRole::Title,
            block: None,
            text: REPORT_TITLE.to_string(),
            x_pt: title_x,
            word_spacing: 0.0,
        },
    );
    cursor.push(DrawOp::Underline {
        x1_pt: title_x,
        x2_pt: title_x + title_width,
        y_pt: title.baseline_pt - UNDERLINE_OFFSET_PT,
        thickness: UNDERLINE_THICKNESS_PT,
        color: TITLE_STYLE.color,
    });
    cursor.space(TITLE_SPACE_AFTER_LINES * TITLE_STYLE.line_height());

    // 本文
    for (index, block) in blocks.iter().enumerate() {
        match block {
            ReportBlock::Section { label, description } => {
                let before = LABEL_STYLE.space_before_lines * LABEL_STYLE.line_height();
                // ラベルだけがページ末尾に残らないようにする
                cursor.ensure_space(
                    before + LABEL_STYLE.line_advance() + DESCRIPTION_STYLE.line_advance(),
                );
                cursor.space(before);

                let label = sanitize_for_builtin_font(&format!("{}:", label));
                cursor.place_wrapped(&LABEL_STYLE, &label, TextRole::Label, Some(index), false);

                let description = sanitize_for_builtin_font(description);
                cursor.place_wrapped(
                    &DESCRIPTION_STYLE,
                    &description,
                    TextRole::Description,
                    Some(index),
                    true,
                );
                cursor.space(DESCRIPTION_STYLE.paragraph_gap);
            }
            ReportBlock::Paragraph(text) => {
                let text = sanitize_for_builtin_font(text);
                cursor.place_wrapped(
                    &PARAGRAPH_STYLE,
                    &text,
                    TextRole::Paragraph,
                    Some(index),
                    true,
                );
                cursor.space(PARAGRAPH_STYLE.paragraph_gap);
            }
        }
    }

    ReportPlan {
        page_width_pt: layout.page_width_pt,
        page_height_pt: layout.page_height_pt,
        pages: cursor.pages,
    }
}
