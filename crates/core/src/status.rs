//! Printer status decoding.
//!
//! The reply to the `ESC ! ?` probe is a single byte whose low bits flag
//! independent fault conditions. Only the documented combinations are
//! mapped; anything else decodes to [`Status::Unknown`] so a probe never
//! fails on undocumented firmware codes.

use std::fmt;

/// Semantic printer state derived from one status byte.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Status {
    /// Ready.
    Normal,
    /// Print head (cover) open.
    HeadOpen,
    /// Paper jam.
    PaperJam,
    /// Paper jam with the head open.
    PaperJamHeadOpen,
    /// Out of paper.
    PaperOut,
    /// Out of paper with the head open.
    PaperOutHeadOpen,
    /// Out of ribbon.
    RibbonOut,
    /// Out of ribbon with the head open.
    RibbonOutHeadOpen,
    /// Out of ribbon and jammed.
    RibbonOutPaperJam,
    /// Out of ribbon, jammed, head open.
    RibbonOutPaperJamHeadOpen,
    /// Out of ribbon and paper.
    RibbonOutPaperOut,
    /// Out of ribbon and paper with the head open.
    RibbonOutPaperOutHeadOpen,
    /// Paused by the operator.
    Paused,
    /// A job is printing.
    Printing,
    /// Fault not covered by the other states.
    OtherError,
    /// Reply did not match any documented value.
    Unknown,
}

impl Status {
    /// Look up a single status byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Status::Normal,
            0x01 => Status::HeadOpen,
            0x02 => Status::PaperJam,
            0x03 => Status::PaperJamHeadOpen,
            0x04 => Status::PaperOut,
            0x05 => Status::PaperOutHeadOpen,
            0x08 => Status::RibbonOut,
            0x09 => Status::RibbonOutHeadOpen,
            0x0A => Status::RibbonOutPaperJam,
            0x0B => Status::RibbonOutPaperJamHeadOpen,
            0x0C => Status::RibbonOutPaperOut,
            0x0D => Status::RibbonOutPaperOutHeadOpen,
            0x10 => Status::Paused,
            0x20 => Status::Printing,
            0x80 => Status::OtherError,
            _ => Status::Unknown,
        }
    }

    /// Whether the printer can accept a job in this state.
    pub fn is_ready(self) -> bool {
        matches!(self, Status::Normal)
    }

    /// Whether the state needs operator attention.
    pub fn is_fault(self) -> bool {
        !matches!(
            self,
            Status::Normal | Status::Paused | Status::Printing | Status::Unknown
        )
    }

    fn description(self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::HeadOpen => "head open",
            Status::PaperJam => "paper jam",
            Status::PaperJamHeadOpen => "paper jam, head open",
            Status::PaperOut => "paper out",
            Status::PaperOutHeadOpen => "paper out, head open",
            Status::RibbonOut => "ribbon out",
            Status::RibbonOutHeadOpen => "ribbon out, head open",
            Status::RibbonOutPaperJam => "ribbon out, paper jam",
            Status::RibbonOutPaperJamHeadOpen => "ribbon out, paper jam, head open",
            Status::RibbonOutPaperOut => "ribbon out, paper out",
            Status::RibbonOutPaperOutHeadOpen => "ribbon out, paper out, head open",
            Status::Paused => "paused",
            Status::Printing => "printing",
            Status::OtherError => "other error",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Decode a raw status reply.
///
/// Exactly one byte is expected. Empty replies and replies of any other
/// length decode to [`Status::Unknown`].
pub fn decode(raw: &[u8]) -> Status {
    match raw {
        [byte] => Status::from_byte(*byte),
        _ => Status::Unknown,
    }
}
