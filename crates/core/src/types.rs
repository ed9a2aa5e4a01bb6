//! Typed parameters for layout and configuration commands.

/// Declare a fieldless enum whose variants map to fixed wire tokens.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $token:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[non_exhaustive]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The token the printer expects for this value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use wire_enum;

wire_enum! {
    /// Built-in and downloadable font names accepted by `TEXT`.
    Font {
        /// Monotype CG Triumvirate Bold Condensed, scalable.
        MonotypeCg0 => "0",
        /// 8 x 12 fixed pitch dot font.
        MonotypeCg1 => "1",
        /// 12 x 20 fixed pitch dot font.
        MonotypeCg2 => "2",
        /// 16 x 24 fixed pitch dot font.
        MonotypeCg3 => "3",
        /// 24 x 32 fixed pitch dot font.
        MonotypeCg4 => "4",
        /// 32 x 48 dot fixed pitch font.
        MonotypeCg5 => "5",
        /// 14 x 19 dot fixed pitch font OCR-B.
        MonotypeCg6 => "6",
        /// 21 x 27 dot fixed pitch font OCR-B.
        MonotypeCg7 => "7",
        /// 14 x 25 dot fixed pitch font OCR-A.
        MonotypeCg8 => "8",
        /// Roman TrueType font.
        Roman => "ROMAN.TTF",
        /// EPL2 font 1.
        Epl1 => "1.EFT",
        /// EPL2 font 2.
        Epl2 => "2.EFT",
        /// EPL2 font 3.
        Epl3 => "3.EFT",
        /// EPL2 font 4.
        Epl4 => "4.EFT",
        /// EPL2 font 5.
        Epl5 => "5.EFT",
        /// ZPL2 font A.
        ZplA => "A.FNT",
        /// ZPL2 font B.
        ZplB => "B.FNT",
        /// ZPL2 font D.
        ZplD => "D.FNT",
        /// ZPL2 font E8.
        ZplE8 => "E8.FNT",
        /// ZPL2 font F.
        ZplF => "F.FNT",
        /// ZPL2 font G.
        ZplG => "G.FNT",
        /// ZPL2 font H8.
        ZplH8 => "H8.FNT",
        /// ZPL2 font GS.
        ZplGs => "GS.FNT",
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::MonotypeCg0
    }
}

wire_enum! {
    /// Code page selected with `CODEPAGE`.
    CodePage {
        /// 7-bit USA.
        Usa => "USA",
        /// 7-bit British.
        British => "BRI",
        /// 7-bit German.
        German => "GER",
        /// 7-bit French.
        French => "FRE",
        /// 7-bit Danish.
        Danish => "DAN",
        /// 7-bit Italian.
        Italian => "ITA",
        /// 7-bit Spanish.
        Spanish => "SPA",
        /// 7-bit Swedish.
        Swedish => "SWE",
        /// 7-bit Swiss.
        Swiss => "SWI",
        /// DOS United States.
        Cp437 => "CP437",
        /// DOS Greek.
        Cp737 => "CP737",
        /// DOS Multilingual Latin I.
        Cp850 => "CP850",
        /// DOS Greek 2.
        Cp851 => "CP851",
        /// DOS Latin 2.
        Cp852 => "CP852",
        /// DOS Cyrillic.
        Cp855 => "CP855",
        /// DOS Turkish.
        Cp857 => "CP857",
        /// DOS Portuguese.
        Cp860 => "CP860",
        /// DOS Icelandic.
        Cp861 => "CP861",
        /// DOS Hebrew.
        Cp862 => "CP862",
        /// DOS Canadian French.
        Cp863 => "CP863",
        /// DOS Arabic.
        Cp864 => "CP864",
        /// DOS Nordic.
        Cp865 => "CP865",
        /// DOS Cyrillic 2.
        Cp866 => "CP866",
        /// DOS Greek modern.
        Cp869 => "CP869",
        /// Windows Central Europe.
        Cp1250 => "CP1250",
        /// Windows Cyrillic.
        Cp1251 => "CP1251",
        /// Windows Latin I.
        Cp1252 => "CP1252",
        /// Windows Greek.
        Cp1253 => "CP1253",
        /// Windows Turkish.
        Cp1254 => "CP1254",
        /// Windows Hebrew.
        Cp1255 => "CP1255",
        /// Windows Arabic.
        Cp1256 => "CP1256",
        /// Windows Baltic.
        Cp1257 => "CP1257",
        /// Windows Vietnamese.
        Cp1258 => "CP1258",
        /// Japanese Shift-JIS.
        Cp932 => "CP932",
        /// Simplified Chinese GBK.
        Cp936 => "CP936",
        /// Korean.
        Cp949 => "CP949",
        /// Traditional Chinese Big5.
        Cp950 => "CP950",
        /// Unicode UTF-8.
        Utf8 => "UTF-8",
        /// ISO 8859-1 Latin 1.
        Latin1 => "8859-1",
        /// ISO 8859-2 Latin 2.
        Latin2 => "8859-2",
        /// ISO 8859-3 Latin 3.
        Latin3 => "8859-3",
        /// ISO 8859-4 Baltic.
        Baltic => "8859-4",
        /// ISO 8859-5 Cyrillic.
        Cyrillic => "8859-5",
        /// ISO 8859-6 Arabic.
        Arabic => "8859-6",
        /// ISO 8859-7 Greek.
        Greek => "8859-7",
        /// ISO 8859-9 Turkish.
        Turkish => "8859-9",
        /// ISO 8859-10 Latin 6.
        Latin6 => "8859-10",
        /// ISO 8859-15 Latin 9.
        Latin9 => "8859-15",
    }
}

wire_enum! {
    /// Horizontal alignment of a `TEXT` element.
    TextAlignment {
        /// Printer default (left).
        Default => "0",
        /// Left aligned.
        Left => "1",
        /// Centered.
        Center => "2",
        /// Right aligned.
        Right => "3",
    }
}

impl Default for TextAlignment {
    fn default() -> Self {
        TextAlignment::Default
    }
}

wire_enum! {
    /// Clockwise rotation applied to text and codes.
    Rotation {
        /// No rotation.
        Deg0 => "0",
        /// 90 degrees.
        Deg90 => "90",
        /// 180 degrees.
        Deg180 => "180",
        /// 270 degrees.
        Deg270 => "270",
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Deg0
    }
}

impl Rotation {
    /// Rotation from a degree value; only right angles are accepted.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// Media sensor used to find the label boundary.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorType {
    /// Transmissive gap sensor (`GAP`).
    Gap,
    /// Reflective black-line sensor (`BLINE`).
    BlackLine,
}

impl SensorType {
    /// Command verb configuring this sensor.
    pub fn command(self) -> &'static str {
        match self {
            SensorType::Gap => "GAP",
            SensorType::BlackLine => "BLINE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_page_tokens() {
        assert_eq!(CodePage::Utf8.as_str(), "UTF-8");
        assert_eq!(CodePage::Latin9.as_str(), "8859-15");
        assert_eq!(CodePage::Cp1252.as_str(), "CP1252");
        assert_eq!(CodePage::ALL.len(), 48);
    }

    #[test]
    fn font_tokens() {
        assert_eq!(Font::default().as_str(), "0");
        assert_eq!(Font::ZplGs.to_string(), "GS.FNT");
        assert_eq!(Font::ALL.len(), 23);
    }

    #[test]
    fn rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn sensor_commands() {
        assert_eq!(SensorType::Gap.command(), "GAP");
        assert_eq!(SensorType::BlackLine.command(), "BLINE");
    }
}
