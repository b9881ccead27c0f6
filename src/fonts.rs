use std::{collections::HashMap, fmt, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context as _;

use crate::error::{CoverforgeError, CoverforgeResult};

/// Closed set of overlay font families. Unknown keys are rejected at the
/// serde boundary rather than silently falling back.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Display,
    Serif,
    Sans,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [Self::Display, Self::Serif, Self::Sans];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Serif => "serif",
            Self::Sans => "sans",
        }
    }

    /// Human font name this family key resolves to.
    pub fn label(self) -> &'static str {
        match self {
            Self::Display => "Oswald",
            Self::Serif => "Merriweather",
            Self::Sans => "Inter",
        }
    }

    /// File name looked up under the registry's font root.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Display => "Oswald-Regular.ttf",
            Self::Serif => "Merriweather-Regular.ttf",
            Self::Sans => "Inter-Regular.ttf",
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown font family '{s}'"))
    }
}

/// Loads and memoizes font bytes for the fixed family set.
///
/// Fonts are plain files under a root directory; lookup is lazy so a missing
/// font file only fails exports that actually draw text with it.
pub struct FontRegistry {
    root: PathBuf,
    cache: HashMap<FontFamily, Arc<Vec<u8>>>,
}

impl FontRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn bytes(&mut self, family: FontFamily) -> CoverforgeResult<Arc<Vec<u8>>> {
        if let Some(bytes) = self.cache.get(&family) {
            return Ok(bytes.clone());
        }

        let path = self.root.join(family.file_name());
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read font '{}' ({})", family.label(), path.display()))?;
        let bytes = Arc::new(bytes);
        self.cache.insert(family, bytes.clone());
        Ok(bytes)
    }
}

/// RGBA8 brush color carried through Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Shapes plain text with Parley using explicit font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out a single run of text with the given font bytes,
    /// size, and brush. Lines are never wrapped; overlay text is laid out at
    /// its natural width and centered by the compositor.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> CoverforgeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CoverforgeError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CoverforgeError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CoverforgeError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        Ok(layout)
    }
}
