use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Limits applied to every text object.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextPolicy {
    /// Longest accepted text, in characters.
    pub max_chars: usize,
    /// Font size used when none is given.
    pub default_font_size: f64,
    /// Smallest font size; smaller requests are clamped.
    pub min_font_size: f64,
    /// Largest font size; larger requests are clamped.
    pub max_font_size: f64,
    /// Font family used when none is given.
    pub default_font: String,
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self {
            max_chars: 2000,
            default_font_size: 48.0,
            min_font_size: 4.0,
            max_font_size: 512.0,
            default_font: "sans-serif".to_string(),
        }
    }
}

/// A validated text object. Only [`TextFactory::make`] creates these.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextObject {
    id: String,
    text: String,
    font: String,
    font_size: f64,
    #[serde(skip)]
    requested_font_size: Option<f64>,
}

impl TextObject {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> &str {
        &self.font
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// The requested size when it was clamped into the policy range.
    pub fn clamped_from(&self) -> Option<f64> {
        self.requested_font_size
    }
}

/// The single construction path for text objects.
#[derive(Clone, Debug, Default)]
pub struct TextFactory {
    policy: TextPolicy,
}

impl TextFactory {
    pub fn new(policy: TextPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TextPolicy {
        &self.policy
    }

    /// Apply the policy. Blank or oversized text and non-finite sizes are errors;
    /// out-of-range sizes are clamped and reported via [`TextObject::clamped_from`].
    pub fn make(
        &self,
        id: &str,
        text: &str,
        font_size: Option<f64>,
        font: Option<&str>,
    ) -> ChoreoResult<TextObject> {
        if text.trim().is_empty() {
            return Err(ChoreoError::validation(format!("text '{id}' is empty")));
        }
        let chars = text.chars().count();
        if chars > self.policy.max_chars {
            return Err(ChoreoError::validation(format!(
                "text '{id}' has {chars} characters (max {})",
                self.policy.max_chars
            )));
        }
        let requested = font_size.unwrap_or(self.policy.default_font_size);
        if !requested.is_finite() {
            return Err(ChoreoError::validation(format!(
                "text '{id}' font size must be finite"
            )));
        }
        let size = requested.clamp(self.policy.min_font_size, self.policy.max_font_size);
        let font = font
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.policy.default_font);

        Ok(TextObject {
            id: id.to_string(),
            text: text.to_string(),
            font: font.to_string(),
            font_size: size,
            requested_font_size: (size != requested).then_some(requested),
        })
    }
}
