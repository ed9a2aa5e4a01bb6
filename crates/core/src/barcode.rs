//! Barcode symbologies and QR code parameters.

use crate::types::wire_enum;

wire_enum! {
    /// Linear symbologies accepted by `BARCODE`.
    BarcodeType {
        /// Code 128, automatic subset switching.
        Code128 => "128",
        /// Code 128, manual subset control.
        Code128M => "128M",
        /// EAN 128 (GS1-128).
        Ean128 => "EAN128",
        /// Interleaved 2 of 5.
        Interleaved2Of5 => "25",
        /// Interleaved 2 of 5 with check digit.
        Interleaved2Of5C => "25C",
        /// Code 39 full ASCII.
        Code39 => "39",
        /// Code 39 full ASCII with check digit.
        Code39C => "39C",
        /// Code 93.
        Code93 => "93",
        /// EAN 13.
        Ean13 => "EAN13",
        /// EAN 13 with 2 digit add-on.
        Ean13Plus2 => "EAN13+2",
        /// EAN 13 with 5 digit add-on.
        Ean13Plus5 => "EAN13+5",
        /// EAN 8.
        Ean8 => "EAN8",
        /// EAN 8 with 2 digit add-on.
        Ean8Plus2 => "EAN8+2",
        /// EAN 8 with 5 digit add-on.
        Ean8Plus5 => "EAN8+5",
        /// Codabar.
        Codabar => "CODA",
        /// Postnet.
        Postnet => "POST",
        /// UPC-A.
        UpcA => "UPCA",
        /// UPC-A with 2 digit add-on.
        UpcAPlus2 => "UPCA+2",
        /// UPC-A with 5 digit add-on.
        UpcAPlus5 => "UPA+5",
        /// UPC-E.
        UpcE => "UPCE",
        /// UPC-E with 2 digit add-on.
        UpcEPlus2 => "UPCE+2",
        /// UPC-E with 5 digit add-on.
        UpcEPlus5 => "UPE+5",
        /// MSI.
        Msi => "MSI",
        /// MSI with check digit.
        MsiC => "MSIC",
        /// Plessey.
        Plessey => "PLESSEY",
        /// China post.
        ChinaPost => "CPOST",
        /// ITF 14.
        Itf14 => "ITF14",
        /// EAN 14.
        Ean14 => "EAN14",
        /// Code 11.
        Code11 => "11",
        /// Telepen.
        Telepen => "TELEPEN",
        /// Telepen numeric.
        TelepenN => "TELEPENN",
        /// Planet.
        Planet => "PLANET",
        /// Code 49.
        Code49 => "CODE49",
        /// Deutsche Post Identcode.
        DeutschePostIdentcode => "DPI",
        /// Deutsche Post Leitcode.
        DeutschePostLeitcode => "DPL",
        /// LOGMARS.
        Logmars => "LOGMARS",
    }
}

impl BarcodeType {
    /// Wide bar width used when the caller does not specify one.
    ///
    /// Multi-width symbologies fix their own module ratios, so the wide
    /// element equals the narrow one. Two-width symbologies get a 3:1 ratio,
    /// or 2:1 for the MSI/Plessey/Code 11 family. China post, whose narrow
    /// default is 3 dots, uses 7.
    pub fn default_wide(self) -> u32 {
        match self {
            BarcodeType::Interleaved2Of5
            | BarcodeType::Interleaved2Of5C
            | BarcodeType::Code39
            | BarcodeType::Code39C
            | BarcodeType::Codabar
            | BarcodeType::Itf14
            | BarcodeType::Logmars => 3,
            BarcodeType::Msi | BarcodeType::MsiC | BarcodeType::Plessey | BarcodeType::Code11 => 2,
            BarcodeType::ChinaPost => 7,
            _ => 1,
        }
    }

    /// Narrow bar width used when the caller does not specify one.
    pub fn default_narrow(self) -> u32 {
        match self {
            BarcodeType::ChinaPost => 3,
            _ => 1,
        }
    }
}

wire_enum! {
    /// QR error correction level.
    QrEccLevel {
        /// Recovers 7% of codewords.
        L => "L",
        /// Recovers 15% of codewords.
        M => "M",
        /// Recovers 25% of codewords.
        Q => "Q",
        /// Recovers 30% of codewords.
        H => "H",
    }
}

wire_enum! {
    /// QR encoding mode.
    QrMode {
        /// Printer picks the encoding.
        Auto => "A",
        /// Content carries manual mode switches.
        Manual => "M",
    }
}

wire_enum! {
    /// QR symbol model.
    QrModel {
        /// Original model 1.
        Model1 => "M1",
        /// Enhanced model 2.
        Model2 => "M2",
    }
}

wire_enum! {
    /// QR mask pattern.
    QrMask {
        /// Mask pattern 0.
        S0 => "S0",
        /// Mask pattern 1.
        S1 => "S1",
        /// Mask pattern 2.
        S2 => "S2",
        /// Mask pattern 3.
        S3 => "S3",
        /// Mask pattern 4.
        S4 => "S4",
        /// Mask pattern 5.
        S5 => "S5",
        /// Mask pattern 6.
        S6 => "S6",
        /// Mask pattern 7.
        S7 => "S7",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn china_post_narrow_default_is_three() {
        assert_eq!(BarcodeType::ChinaPost.default_narrow(), 3);
        for ty in BarcodeType::ALL.iter().filter(|t| **t != BarcodeType::ChinaPost) {
            assert_eq!(ty.default_narrow(), 1, "{ty}");
        }
    }

    #[test]
    fn wide_default_never_below_narrow_default() {
        for ty in BarcodeType::ALL {
            assert!(ty.default_wide() >= ty.default_narrow(), "{ty}");
        }
    }

    #[test]
    fn symbology_tokens() {
        assert_eq!(BarcodeType::ALL.len(), 36);
        assert_eq!(BarcodeType::Code128.as_str(), "128");
        assert_eq!(BarcodeType::UpcEPlus5.as_str(), "UPE+5");
        assert_eq!(BarcodeType::Code39.default_wide(), 3);
        assert_eq!(BarcodeType::Ean13.default_wide(), 1);
    }
}
