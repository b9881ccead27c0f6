use std::fmt;
use std::str::FromStr;

/// Aspect ratio categories accepted by the image-generation service.
///
/// The serialized spelling (`"9:16"` etc.) is the exact wire value the
/// generation request carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait3x4 => "3:4",
            Self::Landscape4x3 => "4:3",
            Self::Portrait9x16 => "9:16",
            Self::Landscape16x9 => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys into the fixed publishing-template catalog.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TemplateKey {
    KdpPaperback,
    KdpHardcover,
    IngramSparkPaperback,
    Ebook,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 4] = [
        Self::KdpPaperback,
        Self::KdpHardcover,
        Self::IngramSparkPaperback,
        Self::Ebook,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::KdpPaperback => "kdpPaperback",
            Self::KdpHardcover => "kdpHardcover",
            Self::IngramSparkPaperback => "ingramSparkPaperback",
            Self::Ebook => "ebook",
        }
    }

    /// Catalog entry for this key. Templates are never edited independently;
    /// width/height/aspect ratio always come from here.
    pub fn details(self) -> &'static TemplateDetails {
        match self {
            Self::KdpPaperback => &TemplateDetails {
                name: "KDP Paperback (6x9)",
                width: 600,
                height: 900,
                aspect_ratio: AspectRatio::Portrait3x4,
            },
            Self::KdpHardcover => &TemplateDetails {
                name: "KDP Hardcover (6x9)",
                width: 612,
                height: 936,
                aspect_ratio: AspectRatio::Portrait3x4,
            },
            Self::IngramSparkPaperback => &TemplateDetails {
                name: "IngramSpark (5.5x8.5)",
                width: 550,
                height: 850,
                aspect_ratio: AspectRatio::Portrait3x4,
            },
            Self::Ebook => &TemplateDetails {
                name: "Standard E-Book",
                width: 625,
                height: 1000,
                aspect_ratio: AspectRatio::Portrait9x16,
            },
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown template key '{s}'"))
    }
}

/// One output target: pixel dimensions plus the aspect-ratio category
/// requested from the generation service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateDetails {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: AspectRatio,
}
