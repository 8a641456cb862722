use serde::{Deserialize, Serialize};

/// Player body colour. The renderer maps these to actual colours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tint {
    #[default]
    Base,
    Dash,
}

impl Tint {
    /// Packed 0xRRGGBB.
    pub fn rgb(self) -> u32 {
        match self {
            Self::Base => 0x00ffff,
            Self::Dash => 0xff00ff,
        }
    }
}

/// Discriminant of [`Effect`], used when the host reports completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    FadeOut,
    FadeIn,
    Shake,
    SquashStretch,
    DashTrail,
    Tint,
}

/// A fire-and-forget visual request. Only `FadeOut` completion is ever
/// reported back to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    FadeOut {
        duration_ms: f32,
    },
    FadeIn {
        duration_ms: f32,
    },
    /// Camera shake; intensity is a fraction of the viewport size.
    Shake {
        duration_ms: f32,
        intensity: f32,
    },
    /// Tween the player scale to (scale_x, scale_y) and back.
    SquashStretch {
        scale_x: f32,
        scale_y: f32,
        duration_ms: f32,
    },
    /// Fading afterimage left at a world position.
    DashTrail {
        x: f32,
        y: f32,
        fade_ms: f32,
    },
    Tint(Tint),
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::FadeOut { .. } => EffectKind::FadeOut,
            Self::FadeIn { .. } => EffectKind::FadeIn,
            Self::Shake { .. } => EffectKind::Shake,
            Self::SquashStretch { .. } => EffectKind::SquashStretch,
            Self::DashTrail { .. } => EffectKind::DashTrail,
            Self::Tint(_) => EffectKind::Tint,
        }
    }
}
