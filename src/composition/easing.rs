use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Opacity curve for the incoming segment during a crossfade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map fade progress in [0, 1] to opacity in [0, 1]
    pub fn apply(self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Easing::Linear => p,
            Easing::EaseIn => p * p,
            Easing::EaseOut => p * (2.0 - p),
            Easing::EaseInOut => p * p * (3.0 - 2.0 * p),
        }
    }

    /// The same curve in ffmpeg expression syntax, `progress` being an
    /// expression already clipped to [0, 1]
    pub fn ffmpeg_expr(self, progress: &str) -> String {
        let p = progress;
        match self {
            Easing::Linear => p.to_string(),
            Easing::EaseIn => format!("({p})*({p})"),
            Easing::EaseOut => format!("({p})*(2-({p}))"),
            Easing::EaseInOut => format!("({p})*({p})*(3-2*({p}))"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "ease-in" | "ease_in" => Ok(Easing::EaseIn),
            "ease-out" | "ease_out" => Ok(Easing::EaseOut),
            "ease-in-out" | "ease_in_out" => Ok(Easing::EaseInOut),
            other => Err(format!(
                "unknown easing '{}' (expected linear, ease-in, ease-out, ease-in-out)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
