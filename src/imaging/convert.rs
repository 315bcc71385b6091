//! PDF埋め込み用の画像正規化
//!
//! どの形式でも 8bit RGB の PNG に変換する:
//! EXIFの向きを反映 → 長辺を上限まで縮小 → 透過を白で合成 → PNG

use super::orientation::read_orientation;
use crate::error::{PlantScanError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// 正規化済み画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn normalize_to_png(bytes: &[u8], max_size: u32) -> Result<PreparedImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| PlantScanError::ImageLoad(e.to_string()))?;
    let img = apply_orientation(img, read_orientation(bytes));

    let img = if max_size > 0 && (img.width() > max_size || img.height() > max_size) {
        img.resize(max_size, max_size, FilterType::Triangle)
    } else {
        img
    };

    let rgb = flatten_on_white(&img);
    let (width, height) = rgb.dimensions();

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| PlantScanError::ImageLoad(format!("PNG encode: {}", e)))?;

    Ok(PreparedImage { png, width, height })
}

/// EXIF Orientation (1-8) に従って回転・反転
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let alpha = a as u16;
            ((c as u16 * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
