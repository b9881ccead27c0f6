use std::{fmt, str::FromStr};

use crate::templates::TemplateDetails;

/// Closed genre enumeration. The serialized spelling matches the catalog
/// labels shown to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Genre {
    #[serde(rename = "Science Fiction")]
    ScienceFiction,
    Fantasy,
    Romance,
    Thriller,
    Mystery,
    Horror,
    #[serde(rename = "Historical Fiction")]
    HistoricalFiction,
    #[serde(rename = "Young Adult")]
    YoungAdult,
    #[serde(rename = "Children's")]
    Childrens,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Biography,
    #[serde(rename = "Self-Help")]
    SelfHelp,
}

impl Genre {
    pub const ALL: [Genre; 12] = [
        Self::ScienceFiction,
        Self::Fantasy,
        Self::Romance,
        Self::Thriller,
        Self::Mystery,
        Self::Horror,
        Self::HistoricalFiction,
        Self::YoungAdult,
        Self::Childrens,
        Self::NonFiction,
        Self::Biography,
        Self::SelfHelp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScienceFiction => "Science Fiction",
            Self::Fantasy => "Fantasy",
            Self::Romance => "Romance",
            Self::Thriller => "Thriller",
            Self::Mystery => "Mystery",
            Self::Horror => "Horror",
            Self::HistoricalFiction => "Historical Fiction",
            Self::YoungAdult => "Young Adult",
            Self::Childrens => "Children's",
            Self::NonFiction => "Non-Fiction",
            Self::Biography => "Biography",
            Self::SelfHelp => "Self-Help",
        }
    }

    /// Fixed visual/mood guidance embedded in the generation prompt.
    pub fn cue(self) -> &'static str {
        match self {
            Self::ScienceFiction => {
                "futuristic cityscapes, spaceships, alien planets, advanced technology, nebulae. \
                 Mood: wondrous, sterile, dystopian, or epic."
            }
            Self::Fantasy => {
                "enchanted forests, mythical creatures, castles, magic symbols, epic landscapes. \
                 Mood: magical, adventurous, dark, or whimsical."
            }
            Self::Romance => {
                "evocative landscapes, a couple in silhouette, a single meaningful object (like a \
                 flower or letter), soft lighting. Mood: intimate, passionate, sweet, or \
                 heartbreaking."
            }
            Self::Thriller | Self::Mystery => {
                "dark alleys, shadowy figures, forensic evidence, stark urban environments, \
                 isolated locations. Mood: tense, suspenseful, ominous, gritty."
            }
            Self::Horror => {
                "dilapidated houses, creepy forests, monstrous entities, unsettling objects, high \
                 contrast lighting. Mood: terrifying, dreadful, eerie."
            }
            Self::HistoricalFiction => {
                "period-appropriate settings, clothing, and objects. Mood: nostalgic, dramatic, \
                 grand, or somber."
            }
            Self::YoungAdult => {
                "bold graphic landscapes, a lone figure on a threshold, saturated color washes, \
                 symbolic objects. Mood: restless, hopeful, defiant, or bittersweet."
            }
            Self::Childrens => {
                "friendly animals, bright storybook scenery, rounded shapes, playful skies. Mood: \
                 warm, curious, gentle, joyful."
            }
            Self::NonFiction => {
                "clean abstract geometry, textured gradients, a single strong motif, uncluttered \
                 space. Mood: confident, authoritative, modern."
            }
            Self::Biography => {
                "an evocative empty chair or desk, period textures, portrait-adjacent still life, \
                 archival tones. Mood: reflective, intimate, dignified."
            }
            Self::SelfHelp => {
                "sunrise horizons, open roads or doorways, calm minimal landscapes, soft gradients. \
                 Mood: optimistic, calm, energizing."
            }
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown genre '{s}'"))
    }
}

/// Build the single natural-language prompt sent to the generation service.
///
/// Every prompt carries two hard constraints: significant negative space in
/// the top and bottom thirds of the frame (reserved for the text overlay),
/// and no text or typography of any kind in the artwork itself.
pub fn build_prompt(title: &str, author: &str, genre: Genre) -> String {
    format!(
        "Create a professional, high-resolution background artwork for a book cover. \
         The book is a {genre} novel.\n\
         The title is \"{title}\" and the author is \"{author}\".\n\n\
         Key visual elements and mood for a {genre} book: {cue}\n\n\
         The composition must be visually striking and suitable for a book cover.\n\
         Crucially, it must have significant negative space, especially in the top third and \
         bottom third of the frame. This space is where the title and author's name will be \
         overlaid later.\n\
         The design should have a clear focal point but avoid being overly cluttered.\n\n\
         ABSOLUTELY DO NOT include any text, letters, words, or typography in the generated \
         image. This is for the background art ONLY.\n\
         The image must be photorealistic or have a high-quality digital painting style.",
        genre = genre.as_str(),
        cue = genre.cue(),
    )
}

/// Prompt plus the aspect ratio the request must carry for one template.
pub fn request_aspect_ratio(template: &TemplateDetails) -> &'static str {
    template.aspect_ratio.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateKey;

    #[test]
    fn prompt_embeds_inputs_and_cue() {
        let p = build_prompt("Iron Harvest", "N. K. Voss", Genre::ScienceFiction);
        assert!(p.contains("\"Iron Harvest\""));
        assert!(p.contains("\"N. K. Voss\""));
        assert!(p.contains("Science Fiction novel"));
        assert!(p.contains("alien planets"));
    }

    #[test]
    fn prompt_always_carries_hard_constraints() {
        for genre in Genre::ALL {
            let p = build_prompt("T", "A", genre);
            assert!(p.contains("top third and bottom third"), "{genre}");
            assert!(p.contains("DO NOT include any text"), "{genre}");
        }
    }

    #[test]
    fn genre_wire_spelling_round_trips() {
        for genre in Genre::ALL {
            let s = serde_json::to_string(&genre).unwrap();
            let de: Genre = serde_json::from_str(&s).unwrap();
            assert_eq!(de, genre);
        }
        assert_eq!(
            serde_json::to_string(&Genre::Childrens).unwrap(),
            "\"Children's\""
        );
    }

    #[test]
    fn unknown_genre_is_rejected() {
        assert!(serde_json::from_str::<Genre>("\"Western\"").is_err());
        assert!("Western".parse::<Genre>().is_err());
    }

    #[test]
    fn ebook_request_aspect_is_9x16() {
        assert_eq!(request_aspect_ratio(TemplateKey::Ebook.details()), "9:16");
    }
}
