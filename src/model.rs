use crate::{
    error::{CoverforgeError, CoverforgeResult},
    fonts::FontFamily,
    prompt::Genre,
    templates::TemplateKey,
};

pub const MIN_FONT_SIZE: f32 = 12.0;
pub const MAX_FONT_SIZE: f32 = 120.0;
pub const MAX_OFFSET_PCT: f32 = 95.0;

/// One positioned, styled string overlay (title or author).
///
/// Position and size fields are percentages of the active template's pixel
/// dimensions, so an element stays resolution-independent until export, when
/// it is resolved against the template's width/height.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextElement {
    pub text: String,
    pub font_family: FontFamily,
    /// Pixels, constrained to `[12, 120]`.
    pub font_size: f32,
    /// Hex color, `#rrggbb`.
    pub color: String,
    /// Percent of template height, `[0, 95]`.
    pub top: f32,
    /// Percent of template width, `[0, 95]`.
    pub left: f32,
    /// Percent of template width, `(0, 100]`.
    pub width: f32,
}

impl TextElement {
    pub fn validate(&self) -> CoverforgeResult<()> {
        if !self.font_size.is_finite()
            || self.font_size < MIN_FONT_SIZE
            || self.font_size > MAX_FONT_SIZE
        {
            return Err(CoverforgeError::validation(format!(
                "font_size must be within [{MIN_FONT_SIZE}, {MAX_FONT_SIZE}] px"
            )));
        }
        for (name, v) in [("top", self.top), ("left", self.left)] {
            if !v.is_finite() || v < 0.0 || v > MAX_OFFSET_PCT {
                return Err(CoverforgeError::validation(format!(
                    "{name} must be within [0, {MAX_OFFSET_PCT}] percent"
                )));
            }
        }
        if !self.width.is_finite() || self.width <= 0.0 || self.width > 100.0 {
            return Err(CoverforgeError::validation(
                "width must be within (0, 100] percent",
            ));
        }
        parse_hex_color(&self.color)?;
        Ok(())
    }
}

/// Parse a `#rrggbb` hex color into RGB bytes.
pub fn parse_hex_color(s: &str) -> CoverforgeResult<[u8; 3]> {
    let hex_part = s.trim().trim_start_matches('#');
    if hex_part.len() != 6 {
        return Err(CoverforgeError::validation(format!("invalid color '{s}'")));
    }
    let bytes = hex::decode(hex_part)
        .map_err(|_| CoverforgeError::validation(format!("invalid color '{s}'")))?;
    Ok([bytes[0], bytes[1], bytes[2]])
}

/// Snapshot sufficient to fully reconstruct an edit session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CoverData {
    pub title: TextElement,
    pub author: TextElement,
    pub genre: Genre,
    pub template_key: TemplateKey,
    /// Complete `data:image/...;base64,...` URI, or absent before the first
    /// successful generation.
    pub background_image: Option<String>,
}

impl CoverData {
    /// Fresh working cover with empty text in the default overlay styling:
    /// title in the top third, author in the bottom third.
    pub fn new(genre: Genre, template_key: TemplateKey) -> Self {
        Self {
            title: TextElement {
                text: String::new(),
                font_family: FontFamily::Display,
                font_size: 48.0,
                color: "#FFFFFF".to_string(),
                top: 8.0,
                left: 10.0,
                width: 80.0,
            },
            author: TextElement {
                text: String::new(),
                font_family: FontFamily::Sans,
                font_size: 24.0,
                color: "#FFFFFF".to_string(),
                top: 85.0,
                left: 10.0,
                width: 80.0,
            },
            genre,
            template_key,
            background_image: None,
        }
    }

    pub fn validate(&self) -> CoverforgeResult<()> {
        self.title.validate()?;
        self.author.validate()?;
        Ok(())
    }
}

/// A persisted, identified cover record. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BookCover {
    /// Unique and opaque; later ids compare greater than earlier ones.
    pub id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub data: CoverData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_cover() -> CoverData {
        let mut cover = CoverData::new(Genre::Horror, TemplateKey::Ebook);
        cover.title.text = "The Hollow Stair".to_string();
        cover.author.text = "M. Reyes".to_string();
        cover
    }

    #[test]
    fn json_roundtrip() {
        let cover = basic_cover();
        let s = serde_json::to_string_pretty(&cover).unwrap();
        let de: CoverData = serde_json::from_str(&s).unwrap();
        assert_eq!(de, cover);
        assert!(s.contains("\"ebook\""));
        assert!(s.contains("\"Horror\""));
    }

    #[test]
    fn validate_rejects_out_of_range_font_size() {
        let mut cover = basic_cover();
        cover.title.font_size = 10.0;
        assert!(cover.validate().is_err());
        cover.title.font_size = 121.0;
        assert!(cover.validate().is_err());
        cover.title.font_size = 12.0;
        assert!(cover.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_offsets() {
        let mut cover = basic_cover();
        cover.author.top = 96.0;
        assert!(cover.validate().is_err());
        cover.author.top = 95.0;
        assert!(cover.validate().is_ok());
        cover.author.width = 0.0;
        assert!(cover.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_color() {
        let mut cover = basic_cover();
        cover.title.color = "#12345".to_string();
        assert!(cover.validate().is_err());
        cover.title.color = "#GGHHII".to_string();
        assert!(cover.validate().is_err());
    }

    #[test]
    fn empty_text_is_accepted() {
        let mut cover = basic_cover();
        cover.title.text = String::new();
        assert!(cover.validate().is_ok());
    }

    #[test]
    fn hex_color_parses_rgb() {
        assert_eq!(parse_hex_color("#FF8000").unwrap(), [255, 128, 0]);
        assert_eq!(parse_hex_color("0080ff").unwrap(), [0, 128, 255]);
        assert!(parse_hex_color("#fff").is_err());
    }
}
