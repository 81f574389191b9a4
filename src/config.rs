use std::path::Path;

use crate::foundation::core::{Fps, Resolution, Rgba8};
use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Output settings shared by the timeline, scene builder and frame evaluator.
///
/// Passed explicitly into constructors; nothing in the crate reads global state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame rate used for frame/time conversion.
    pub fps: Fps,
    /// Output resolution.
    pub resolution: Resolution,
    /// Background colour handed to the renderer.
    pub background_color: Rgba8,
    /// Rate function used when an animation or keyframe names none.
    pub default_rate_func: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            resolution: Resolution::default(),
            background_color: Rgba8::BLACK,
            default_rate_func: "smooth".to_string(),
        }
    }
}

impl RenderConfig {
    /// Load a config from a JSON file; missing fields keep their defaults.
    pub fn load_json(path: &Path) -> ChoreoResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ChoreoError::validation(format!("read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> ChoreoResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        Resolution::new(self.resolution.width, self.resolution.height)?;
        if self.default_rate_func.trim().is_empty() {
            return Err(ChoreoError::validation(
                "default_rate_func must be non-empty",
            ));
        }
        Ok(())
    }
}
