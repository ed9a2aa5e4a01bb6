//! Typed TSPL operations.
//!
//! Each function maps validated parameters onto exactly one [`build`] call
//! (or, for control sequences, a fixed byte string). Nothing here touches a
//! transport.

use crate::barcode::{BarcodeType, QrEccLevel, QrMask, QrMode, QrModel};
use crate::bitmap::Bitmap;
use crate::command::{Arg, build};
use crate::types::{CodePage, Font, Rotation, SensorType, TextAlignment};
use crate::{CommandError, Number};

/// `ESC ! ?`: ask for the one-byte status.
pub const STATUS_PROBE: [u8; 3] = [0x1B, 0x21, 0x3F];

/// `ESC ! R`: reboot the printer.
pub const RESTART: [u8; 3] = [0x1B, 0x21, 0x52];

/// Model name query.
pub const QUERY_NAME: &[u8] = b"~!T";
/// Free memory query.
pub const QUERY_MEMORY: &[u8] = b"~!A";
/// Printed distance query.
pub const QUERY_MILEAGE: &[u8] = b"~!@";
/// Active code page query.
pub const QUERY_CODEPAGE: &[u8] = b"~!I";

fn millimetres(value: Number, field: &'static str) -> Result<String, CommandError> {
    Ok(format!("{} mm", value.to_non_negative(field)?))
}

/// `CLS`: clear the image buffer.
pub fn clear_buffer() -> Vec<u8> {
    build("CLS", &[])
}

/// `SIZE`: label width and height in millimetres.
pub fn size(width: impl Into<Number>, height: impl Into<Number>) -> Result<Vec<u8>, CommandError> {
    let width = millimetres(width.into(), "width")?;
    let height = millimetres(height.into(), "height")?;
    Ok(build("SIZE", &[width.into(), height.into()]))
}

/// `SPEED`: print speed in inches per second.
pub fn speed(speed: impl Into<Number>) -> Result<Vec<u8>, CommandError> {
    let speed = speed.into().to_non_negative("speed")?;
    Ok(build("SPEED", &[speed.to_string().into()]))
}

/// `DENSITY`: print darkness.
pub fn density(density: impl Into<Number>) -> Result<Vec<u8>, CommandError> {
    let density = density.into().to_non_negative("density")?;
    Ok(build("DENSITY", &[density.to_string().into()]))
}

/// `GAP` or `BLINE`: media sensor distance and offset in millimetres.
///
/// Both must be whole, non-negative values.
pub fn sensor(
    sensor: SensorType,
    distance: impl Into<Number>,
    offset: impl Into<Number>,
) -> Result<Vec<u8>, CommandError> {
    let distance = millimetres(distance.into(), "distance")?;
    let offset = millimetres(offset.into(), "offset")?;
    Ok(build(sensor.command(), &[distance.into(), offset.into()]))
}

/// `CODEPAGE`: character set used to interpret text bytes.
pub fn codepage(codepage: CodePage) -> Vec<u8> {
    build("CODEPAGE", &[codepage.as_str().into()])
}

/// Optional `BARCODE` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarcodeOptions {
    /// Print the human-readable line below the bars.
    pub human_readable: bool,
    /// Clockwise rotation.
    pub rotation: Rotation,
    /// Narrow element width in dots; defaults per symbology.
    pub narrow: Option<u32>,
    /// Wide element width in dots; defaults per symbology.
    pub wide: Option<u32>,
}

/// `BARCODE`: a linear barcode `height` dots tall at (`x`, `y`).
pub fn barcode(
    x: u32,
    y: u32,
    kind: BarcodeType,
    content: &str,
    height: u32,
    opts: &BarcodeOptions,
) -> Vec<u8> {
    let narrow = opts.narrow.unwrap_or_else(|| kind.default_narrow());
    let wide = opts.wide.unwrap_or_else(|| kind.default_wide());
    build(
        "BARCODE",
        &[
            x.into(),
            y.into(),
            kind.as_str().into(),
            height.into(),
            u8::from(opts.human_readable).into(),
            opts.rotation.as_str().into(),
            narrow.into(),
            wide.into(),
            Arg::text(content),
        ],
    )
}

/// Optional `TEXT` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Font name.
    pub font: Font,
    /// Clockwise rotation.
    pub rotation: Rotation,
    /// Horizontal magnification.
    pub x_multiplier: u32,
    /// Vertical magnification.
    pub y_multiplier: u32,
    /// Horizontal alignment.
    pub alignment: TextAlignment,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font: Font::default(),
            rotation: Rotation::default(),
            x_multiplier: 1,
            y_multiplier: 1,
            alignment: TextAlignment::default(),
        }
    }
}

/// `TEXT`: a line of text at (`x`, `y`).
pub fn text(x: u32, y: u32, content: &str, opts: &TextOptions) -> Vec<u8> {
    build(
        "TEXT",
        &[
            x.into(),
            y.into(),
            Arg::text(opts.font.as_str()),
            opts.rotation.as_str().into(),
            opts.x_multiplier.into(),
            opts.y_multiplier.into(),
            opts.alignment.as_str().into(),
            Arg::text(content),
        ],
    )
}

/// Optional `QRCODE` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    /// Error correction level.
    pub level: QrEccLevel,
    /// Encoding mode.
    pub mode: QrMode,
    /// Clockwise rotation.
    pub rotation: Rotation,
    /// Symbol model.
    pub model: QrModel,
    /// Mask pattern.
    pub mask: QrMask,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            level: QrEccLevel::L,
            mode: QrMode::Auto,
            rotation: Rotation::Deg0,
            model: QrModel::Model1,
            mask: QrMask::S7,
        }
    }
}

/// `QRCODE`: a QR symbol with `cell_width`-dot modules at (`x`, `y`).
pub fn qrcode(x: u32, y: u32, content: &str, cell_width: u32, opts: &QrOptions) -> Vec<u8> {
    build(
        "QRCODE",
        &[
            x.into(),
            y.into(),
            opts.level.as_str().into(),
            cell_width.into(),
            opts.mode.as_str().into(),
            opts.rotation.as_str().into(),
            opts.model.as_str().into(),
            opts.mask.as_str().into(),
            Arg::text(content),
        ],
    )
}

/// `BAR`: a filled rectangle.
pub fn bar(x: u32, y: u32, width: u32, height: u32) -> Vec<u8> {
    build("BAR", &[x.into(), y.into(), width.into(), height.into()])
}

/// `BITMAP`: an encoded bitmap at (`x`, `y`), overwrite mode.
///
/// The payload follows the last comma unescaped, so the frame may contain
/// arbitrary bytes including CR and LF.
pub fn bitmap(x: u32, y: u32, bitmap: &Bitmap) -> Vec<u8> {
    const OVERWRITE: u8 = 0;
    build(
        "BITMAP",
        &[
            x.into(),
            y.into(),
            bitmap.width_bytes.into(),
            bitmap.height_dots.into(),
            OVERWRITE.into(),
            Arg::raw(bitmap.data.as_slice()),
        ],
    )
}

/// Label sets printed by [`print_label`].
pub const DEFAULT_QUANTITY: u32 = 1;
/// Copies of each set printed by [`print_label`].
pub const DEFAULT_COPIES: u32 = 1;
/// Distance moved by [`feed_step`] and [`backfeed_step`].
pub const DEFAULT_FEED_DOTS: u32 = 1;

/// `PRINT`: print `quantity` label sets, `copies` copies each.
pub fn print(quantity: u32, copies: u32) -> Vec<u8> {
    build("PRINT", &[quantity.into(), copies.into()])
}

/// `PRINT 1,1`: one copy of the current label.
pub fn print_label() -> Vec<u8> {
    print(DEFAULT_QUANTITY, DEFAULT_COPIES)
}

/// `FEED`: advance the media by `dots`.
pub fn feed(dots: u32) -> Vec<u8> {
    build("FEED", &[dots.into()])
}

/// `FEED 1`.
pub fn feed_step() -> Vec<u8> {
    feed(DEFAULT_FEED_DOTS)
}

/// `BACKFEED`: retract the media by `dots`.
pub fn backfeed(dots: u32) -> Vec<u8> {
    build("BACKFEED", &[dots.into()])
}

/// `BACKFEED 1`.
pub fn backfeed_step() -> Vec<u8> {
    backfeed(DEFAULT_FEED_DOTS)
}

/// `FORMFEED`: advance to the next label.
pub fn formfeed() -> Vec<u8> {
    build("FORMFEED", &[])
}

/// `CUT`: cut the media now.
pub fn cut() -> Vec<u8> {
    build("CUT", &[])
}

/// `SET TEAR OFF`: do not feed to the tear bar after printing.
pub fn tear_off() -> Vec<u8> {
    build("SET TEAR OFF", &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(frame: &[u8]) -> &str {
        std::str::from_utf8(frame).unwrap()
    }

    #[test]
    fn size_in_millimetres() {
        assert_eq!(s(&size(100, 20).unwrap()), "SIZE 100 mm,20 mm\r\n");
        assert_eq!(s(&size(40.0, 30.0).unwrap()), "SIZE 40 mm,30 mm\r\n");
    }

    #[test]
    fn fractional_integer_fields_are_rejected() {
        assert!(matches!(
            size(40.5, 30),
            Err(CommandError::InvalidArgument { field: "width", .. })
        ));
        assert!(matches!(
            size(40, 30.1),
            Err(CommandError::InvalidArgument { field: "height", .. })
        ));
        assert!(speed(2.5).is_err());
        assert!(density(7.9).is_err());
        assert!(matches!(
            sensor(SensorType::Gap, 2, 0.5),
            Err(CommandError::InvalidArgument { field: "offset", .. })
        ));
    }

    #[test]
    fn negative_dimensions_are_rejected() {
        assert!(matches!(
            size(-5, 20),
            Err(CommandError::InvalidArgument { field: "width", .. })
        ));
        assert!(matches!(
            size(50, -1.0),
            Err(CommandError::InvalidArgument { field: "height", .. })
        ));
        assert!(matches!(
            speed(-4),
            Err(CommandError::InvalidArgument { field: "speed", .. })
        ));
        assert!(matches!(
            density(-1),
            Err(CommandError::InvalidArgument { field: "density", .. })
        ));
        assert!(matches!(
            sensor(SensorType::Gap, -2, 0),
            Err(CommandError::InvalidArgument { field: "distance", .. })
        ));
        assert!(matches!(
            sensor(SensorType::BlackLine, 2, -1),
            Err(CommandError::InvalidArgument { field: "offset", .. })
        ));
        assert_eq!(s(&size(0, 0).unwrap()), "SIZE 0 mm,0 mm\r\n");
    }

    #[test]
    fn configuration_frames() {
        assert_eq!(s(&speed(4).unwrap()), "SPEED 4\r\n");
        assert_eq!(s(&density(8).unwrap()), "DENSITY 8\r\n");
        assert_eq!(s(&sensor(SensorType::Gap, 2, 0).unwrap()), "GAP 2 mm,0 mm\r\n");
        assert_eq!(
            s(&sensor(SensorType::BlackLine, 3, 1).unwrap()),
            "BLINE 3 mm,1 mm\r\n"
        );
        assert_eq!(s(&codepage(CodePage::Utf8)), "CODEPAGE UTF-8\r\n");
        assert_eq!(s(&clear_buffer()), "CLS \r\n");
    }

    #[test]
    fn barcode_defaults_and_quoting() {
        let frame = barcode(10, 20, BarcodeType::Code128, "AB\"C", 50, &BarcodeOptions::default());
        assert_eq!(s(&frame), "BARCODE 10,20,128,50,0,0,1,1,\"AB\"\"C\"\r\n");

        let frame = barcode(0, 0, BarcodeType::ChinaPost, "1", 40, &BarcodeOptions::default());
        assert_eq!(s(&frame), "BARCODE 0,0,CPOST,40,0,0,3,7,\"1\"\r\n");

        let opts = BarcodeOptions {
            human_readable: true,
            rotation: Rotation::Deg90,
            narrow: Some(2),
            wide: Some(4),
        };
        let frame = barcode(1, 2, BarcodeType::Code39, "X", 30, &opts);
        assert_eq!(s(&frame), "BARCODE 1,2,39,30,1,90,2,4,\"X\"\r\n");
    }

    #[test]
    fn text_defaults() {
        let frame = text(5, 6, "hello", &TextOptions::default());
        assert_eq!(s(&frame), "TEXT 5,6,\"0\",0,1,1,0,\"hello\"\r\n");

        let opts = TextOptions {
            font: Font::Roman,
            x_multiplier: 2,
            alignment: TextAlignment::Center,
            ..TextOptions::default()
        };
        let frame = text(0, 0, "a", &opts);
        assert_eq!(s(&frame), "TEXT 0,0,\"ROMAN.TTF\",0,2,1,2,\"a\"\r\n");
    }

    #[test]
    fn qrcode_defaults() {
        let frame = qrcode(10, 10, "https://x", 4, &QrOptions::default());
        assert_eq!(s(&frame), "QRCODE 10,10,L,4,A,0,M1,S7,\"https://x\"\r\n");
    }

    #[test]
    fn motion_frames() {
        assert_eq!(s(&bar(1, 2, 3, 4)), "BAR 1,2,3,4\r\n");
        assert_eq!(s(&print(1, 1)), "PRINT 1,1\r\n");
        assert_eq!(s(&feed(1)), "FEED 1\r\n");
        assert_eq!(s(&backfeed(24)), "BACKFEED 24\r\n");
        assert_eq!(s(&formfeed()), "FORMFEED \r\n");
        assert_eq!(s(&cut()), "CUT \r\n");
        assert_eq!(s(&tear_off()), "SET TEAR OFF \r\n");
    }

    #[test]
    fn motion_defaults() {
        assert_eq!(s(&print_label()), "PRINT 1,1\r\n");
        assert_eq!(s(&feed_step()), "FEED 1\r\n");
        assert_eq!(s(&backfeed_step()), "BACKFEED 1\r\n");
    }

    #[test]
    fn bitmap_payload_is_raw() {
        let bmp = Bitmap {
            width_dots: 16,
            width_bytes: 2,
            height_dots: 1,
            data: vec![0x0D, 0x0A],
        };
        assert_eq!(bitmap(3, 4, &bmp), b"BITMAP 3,4,2,1,0,\r\n\r\n".to_vec());
    }

    #[test]
    fn control_sequences() {
        assert_eq!(STATUS_PROBE, [27, 33, 63]);
        assert_eq!(RESTART, [27, 33, 82]);
        assert_eq!(QUERY_NAME, b"~!T");
    }
}
