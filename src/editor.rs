use crate::{
    error::{CoverforgeError, CoverforgeResult},
    fonts::FontFamily,
    model::{CoverData, TextElement},
    prompt::Genre,
    templates::TemplateKey,
};

/// Which overlay element a setter targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Title,
    Author,
}

/// The single mutable working set of one edit session.
///
/// Setters rebuild the whole targeted `TextElement` value (read-modify-write)
/// and validate the result before installing it, so a rejected edit leaves
/// the previous element fully intact and rapid edits can never interleave
/// partially.
#[derive(Debug)]
pub struct EditorState {
    working: CoverData,
    generation_in_flight: bool,
}

impl EditorState {
    pub fn new(genre: Genre, template_key: TemplateKey) -> Self {
        Self {
            working: CoverData::new(genre, template_key),
            generation_in_flight: false,
        }
    }

    pub fn working(&self) -> &CoverData {
        &self.working
    }

    /// Deep copy of the working set, for export or save.
    pub fn snapshot(&self) -> CoverData {
        self.working.clone()
    }

    /// Overwrite the working set wholesale from a catalog snapshot.
    pub fn load(&mut self, data: CoverData) {
        self.working = data;
    }

    pub fn set_text(&mut self, slot: Slot, text: impl Into<String>) {
        // Any string is a valid text, including empty; this cannot fail.
        let text = text.into();
        let _ = self.update(slot, |el| el.text = text);
    }

    pub fn set_font(&mut self, slot: Slot, family: FontFamily) -> CoverforgeResult<()> {
        self.update(slot, |el| el.font_family = family)
    }

    pub fn set_size(&mut self, slot: Slot, font_size: f32) -> CoverforgeResult<()> {
        self.update(slot, |el| el.font_size = font_size)
    }

    pub fn set_color(&mut self, slot: Slot, color: impl Into<String>) -> CoverforgeResult<()> {
        let color = color.into();
        self.update(slot, |el| el.color = color)
    }

    pub fn set_top(&mut self, slot: Slot, top: f32) -> CoverforgeResult<()> {
        self.update(slot, |el| el.top = top)
    }

    pub fn set_genre(&mut self, genre: Genre) {
        self.working.genre = genre;
    }

    /// Switch the output target. Only the template key changes: the
    /// background image and both text elements are untouched, so the same
    /// cover re-renders at the new pixel dimensions.
    pub fn set_template(&mut self, template_key: TemplateKey) {
        self.working.template_key = template_key;
    }

    pub fn set_background(&mut self, data_uri: impl Into<String>) {
        self.working.background_image = Some(data_uri.into());
    }

    pub fn can_export(&self) -> bool {
        self.working.background_image.is_some()
    }

    pub fn generation_in_flight(&self) -> bool {
        self.generation_in_flight
    }

    /// Mark a generation request outstanding. At most one may be in flight;
    /// a second request is rejected rather than queued.
    pub fn begin_generation(&mut self) -> CoverforgeResult<()> {
        if self.generation_in_flight {
            return Err(CoverforgeError::generation(
                "a generation request is already in flight",
            ));
        }
        self.generation_in_flight = true;
        Ok(())
    }

    pub fn finish_generation(&mut self) {
        self.generation_in_flight = false;
    }

    fn update(&mut self, slot: Slot, f: impl FnOnce(&mut TextElement)) -> CoverforgeResult<()> {
        let current = match slot {
            Slot::Title => &self.working.title,
            Slot::Author => &self.working.author,
        };

        let mut next = current.clone();
        f(&mut next);
        next.validate()?;

        match slot {
            Slot::Title => self.working.title = next,
            Slot::Author => self.working.author = next,
        }
        Ok(())
    }
}
