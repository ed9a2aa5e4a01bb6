//! Bitmap encoding through the public API, including image decoding.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tspl_core::commands;
use tspl_core::{CommandError, encode, encode_image_bytes};

fn png_bytes(img: RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn solid_black_ten_by_ten() {
    let img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
    let bmp = encode(&img, 10).unwrap();
    assert_eq!(bmp.width_bytes, 2);
    assert_eq!(bmp.height_dots, 10);
    assert_eq!(bmp.data.len(), 20);
    for row in bmp.data.chunks(2) {
        assert_eq!(row, [0xFF, 0xC0]);
    }
}

#[test]
fn transparency_gates_every_bit() {
    for rgb in [[0, 0, 0], [255, 0, 0], [12, 200, 7], [255, 255, 255]] {
        let img = RgbaImage::from_pixel(13, 5, Rgba([rgb[0], rgb[1], rgb[2], 0]));
        let bmp = encode(&img, 0).unwrap();
        assert!(bmp.data.iter().all(|b| *b == 0), "{rgb:?}");
    }
}

#[test]
fn png_round_trip_preserves_pattern() {
    let mut img = RgbaImage::from_pixel(16, 2, Rgba([255, 255, 255, 255]));
    for x in (0..16).step_by(2) {
        img.put_pixel(x, 0, Rgba([0, 0, 0, 255]));
    }
    let bmp = encode_image_bytes(&png_bytes(img), 0).unwrap();
    assert_eq!(bmp.data, vec![0xAA, 0xAA, 0x00, 0x00]);
}

#[test]
fn decoded_image_is_resampled_to_target_height() {
    let img = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255]));
    let bmp = encode_image_bytes(&png_bytes(img), 5).unwrap();
    assert_eq!(bmp.height_dots, 5);
    assert_eq!(bmp.width_dots, 10);
    assert_eq!(bmp.width_bytes, 2);
}

#[test]
fn undecodable_bytes_report_decode_error() {
    assert!(matches!(
        encode_image_bytes(&[0x89, b'P', b'N', b'G'], 0),
        Err(CommandError::Decode(_))
    ));
}

#[test]
fn bitmap_frame_embeds_payload_verbatim() {
    let img = RgbaImage::from_pixel(8, 1, Rgba([0, 0, 0, 255]));
    let bmp = encode(&img, 0).unwrap();
    let frame = commands::bitmap(0, 0, &bmp);
    assert_eq!(frame, b"BITMAP 0,0,1,1,0,\xFF\r\n".to_vec());
}
