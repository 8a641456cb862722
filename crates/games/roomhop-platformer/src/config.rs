use serde::{Deserialize, Serialize};

use roomhop_core::input::InputBindings;

/// Tile size in world units (pixels).
pub const TILE_SIZE: f32 = 40.0;
/// Room width in tiles.
pub const GRID_COLS: u32 = 20;
/// Room height in tiles.
pub const GRID_ROWS: u32 = 15;
/// Gravity acceleration (px/s^2, downward).
pub const GRAVITY: f32 = 2500.0;

/// Room geometry and the tuning handed to the physics collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub tile_size: f32,
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub gravity: f32,
    pub max_velocity_x: f32,
    pub max_velocity_y: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Horizontal deceleration (px/s^2) applied by physics when no run
    /// input is held. Zero means the controller stops the body itself.
    pub player_drag_x: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            grid_cols: GRID_COLS,
            grid_rows: GRID_ROWS,
            gravity: GRAVITY,
            max_velocity_x: 10000.0,
            max_velocity_y: 2000.0,
            player_width: 32.0,
            player_height: 32.0,
            player_drag_x: 0.0,
        }
    }
}

impl WorldConfig {
    pub fn world_width(&self) -> f32 {
        self.grid_cols as f32 * self.tile_size
    }

    pub fn world_height(&self) -> f32 {
        self.grid_rows as f32 * self.tile_size
    }
}

/// Run/jump/dash tuning. Durations are in milliseconds, velocities in px/s
/// with y pointing down (negative is up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub run_speed: f32,
    pub jump_force: f32,
    /// Upward speed a jump is clamped to when the button is released early.
    pub jump_cutoff: f32,
    pub coyote_ms: f32,
    pub jump_buffer_ms: f32,
    pub dash_ms: f32,
    pub dash_speed: f32,
    /// Velocity multiplier applied when a dash ends.
    pub post_dash_damping: f32,
    pub dash_trail_interval_ms: f32,
    pub dash_trail_fade_ms: f32,
    pub dash_shake_ms: f32,
    pub dash_shake_intensity: f32,
    pub jump_squash_x: f32,
    pub jump_squash_y: f32,
    pub jump_squash_ms: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            run_speed: 350.0,
            jump_force: -900.0,
            jump_cutoff: -400.0,
            coyote_ms: 100.0,
            jump_buffer_ms: 120.0,
            dash_ms: 150.0,
            dash_speed: 900.0,
            post_dash_damping: 0.5,
            dash_trail_interval_ms: 30.0,
            dash_trail_fade_ms: 200.0,
            dash_shake_ms: 80.0,
            dash_shake_intensity: 0.004,
            jump_squash_x: 0.8,
            jump_squash_y: 1.2,
            jump_squash_ms: 100.0,
        }
    }
}

/// Room transition tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub fade_out_ms: f32,
    pub fade_in_ms: f32,
    pub shake_ms: f32,
    pub shake_intensity: f32,
    /// How many cells either side of the carried-over coordinate the
    /// border scan may look.
    pub spawn_search_radius: u32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_out_ms: 200.0,
            fade_in_ms: 200.0,
            shake_ms: 100.0,
            shake_intensity: 0.005,
            spawn_search_radius: 6,
        }
    }
}

/// Top-level platformer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub world: WorldConfig,
    pub movement: MovementConfig,
    pub transition: TransitionConfig,
    pub bindings: InputBindings,
}

impl PlatformerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("ROOMHOP_CONFIG")
            .unwrap_or_else(|_| "config/platformer.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
