use std::io::Cursor;

/// EXIF Orientation を読む（無ければ 1）
pub fn read_orientation(bytes: &[u8]) -> u32 {
    let exif_reader = exif::Reader::new();
    let exif = match exif_reader.read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(_) => return 1,
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .filter(|value| (1..=8).contains(value))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_exif_defaults_to_upright() {
        assert_eq!(read_orientation(b"not an image"), 1);
        assert_eq!(read_orientation(&[]), 1);
    }
}
