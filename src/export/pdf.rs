use crate::error::{PlantScanError, Result};
use crate::imaging::PreparedImage;
use plant_scan_common::export::report_core::{DrawOp, ImagePlacement, ReportPlan, TextRun};
use plant_scan_common::layout::{pt_to_mm, FontFace, Rgb8, REPORT_TITLE};
use printpdf::*;
use std::io::{BufWriter, Write};

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Helvetica => &self.regular,
            FontFace::HelveticaBold => &self.bold,
        }
    }
}

/// 描画プランからPDFドキュメントを組み立てる
pub fn build_document(
    plan: &ReportPlan,
    image: Option<&PreparedImage>,
) -> Result<PdfDocumentReference> {
    let page_width = Mm(pt_to_mm(plan.page_width_pt));
    let page_height = Mm(pt_to_mm(plan.page_height_pt));

    let (doc, page1, layer1) = PdfDocument::new(REPORT_TITLE, page_width, page_height, "Layer 1");
    // XMP/ICC は不要（XMPにはランダムなインスタンスIDが入る）
    let doc = doc.with_conformance(PdfConformance::Custom(CustomPdfConformance {
        requires_icc_profile: false,
        requires_xmp_metadata: false,
        ..Default::default()
    }));

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PlantScanError::PdfGeneration(format!("font: {:?}", e)))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PlantScanError::PdfGeneration(format!("font: {:?}", e)))?,
    };

    let mut embedded = image.and_then(decode_for_pdf);

    for (index, page) in plan.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page_index, layer_index) = doc.add_page(page_width, page_height, "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };

        for op in &page.ops {
            match op {
                DrawOp::Image(placement) => {
                    if let Some((pdf_image, width_px, height_px)) = embedded.take() {
                        draw_image(&layer, pdf_image, placement, width_px, height_px);
                    }
                }
                DrawOp::Text(run) => draw_text(&layer, run, &fonts),
                DrawOp::Underline {
                    x1_pt,
                    x2_pt,
                    y_pt,
                    thickness,
                    color,
                } => {
                    layer.set_outline_color(pdf_color(*color));
                    layer.set_outline_thickness(*thickness);
                    layer.add_line(Line {
                        points: vec![
                            (Point::new(Mm(pt_to_mm(*x1_pt)), Mm(pt_to_mm(*y_pt))), false),
                            (Point::new(Mm(pt_to_mm(*x2_pt)), Mm(pt_to_mm(*y_pt))), false),
                        ],
                        is_closed: false,
                    });
                }
            }
        }
    }

    Ok(doc)
}

/// メモリ上にPDFを生成
pub fn render_to_bytes(plan: &ReportPlan, image: Option<&PreparedImage>) -> Result<Vec<u8>> {
    let doc = build_document(plan, image)?;
    doc.save_to_bytes()
        .map_err(|e| PlantScanError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))
}

/// ライターへPDFを書き出す
pub fn render_to_writer<W: Write>(
    plan: &ReportPlan,
    image: Option<&PreparedImage>,
    writer: W,
) -> Result<()> {
    let doc = build_document(plan, image)?;
    let mut writer = BufWriter::new(writer);
    doc.save(&mut writer)
        .map_err(|e| PlantScanError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))?;
    writer.flush()?;
    Ok(())
}

/// 正規化済みPNGをprintpdfの画像へ（失敗時は画像なし）
fn decode_for_pdf(prepared: &PreparedImage) -> Option<(Image, u32, u32)> {
    match image_crate::load_from_memory_with_format(&prepared.png, image_crate::ImageFormat::Png) {
        Ok(dynamic) => Some((
            Image::from_dynamic_image(&dynamic),
            prepared.width,
            prepared.height,
        )),
        Err(e) => {
            tracing::warn!(operation = "download", error = %e, "PNG decode for PDF failed; rendering without image");
            None
        }
    }
}

fn draw_image(
    layer: &PdfLayerReference,
    image: Image,
    placement: &ImagePlacement,
    width_px: u32,
    height_px: u32,
) {
    // 72dpi で 1px = 1pt
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(pt_to_mm(placement.x_pt))),
            translate_y: Some(Mm(pt_to_mm(placement.y_pt))),
            scale_x: Some(placement.width_pt / width_px as f32),
            scale_y: Some(placement.height_pt / height_px as f32),
            dpi: Some(72.0),
            ..Default::default()
        },
    );
}

fn draw_text(layer: &PdfLayerReference, run: &TextRun, fonts: &Fonts) {
    layer.set_fill_color(pdf_color(run.color));
    layer.set_word_spacing(run.word_spacing);
    layer.use_text(
        run.text.as_str(),
        run.size,
        Mm(pt_to_mm(run.x_pt)),
        Mm(pt_to_mm(run.baseline_pt)),
        fonts.get(run.font),
    );
}

fn pdf_color(color: Rgb8) -> Color {
    let (r, g, b) = color.to_unit();
    Color::Rgb(Rgb::new(r, g, b, None))
}
