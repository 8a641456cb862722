pub mod effects;
pub mod game_trait;
pub mod geometry;
pub mod input;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::effects::{Effect, EffectKind};
    use crate::game_trait::{Game, GameEvent};
    use crate::input::ActionSnapshot;

    /// Fixed 60 Hz frame time in seconds.
    pub const FRAME: f32 = 1.0 / 60.0;

    /// No buttons held.
    pub fn idle() -> ActionSnapshot {
        ActionSnapshot::default()
    }

    /// Run N game ticks with the same input, returning all accumulated events.
    pub fn run_game_ticks(
        game: &mut dyn Game,
        n: usize,
        dt: f32,
        input: &ActionSnapshot,
    ) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt, input));
        }
        all_events
    }

    /// Whether `events` contain a fade-out request.
    pub fn requested_fade_out(events: &[GameEvent]) -> bool {
        events
            .iter()
            .filter_map(GameEvent::as_effect)
            .any(|e| matches!(e, Effect::FadeOut { .. }))
    }

    /// Acknowledge every fade-out in `events` the way a renderer would once
    /// the animation finishes, returning the follow-up events.
    pub fn complete_fades(game: &mut dyn Game, events: &[GameEvent]) -> Vec<GameEvent> {
        let mut out = Vec::new();
        if requested_fade_out(events) {
            out.extend(game.effect_complete(EffectKind::FadeOut));
        }
        out
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed(game: &dyn Game, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Generic checks every Game implementation must pass. Game crates call
    // them from their own #[cfg(test)] modules with a fresh instance.

    /// serialize_state() must return non-empty bytes.
    pub fn contract_state_is_serializable(game: &dyn Game) {
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// update() with held input must change state.
    pub fn contract_input_changes_state(game: &mut dyn Game, input: &ActionSnapshot) {
        let before = game.serialize_state();
        run_game_ticks(game, 5, FRAME, input);
        assert_game_state_changed(game, &before);
    }

    /// pause() must freeze state, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(game: &mut dyn Game, input: &ActionSnapshot) {
        game.pause();
        assert!(game.is_paused());
        let before = game.serialize_state();
        run_game_ticks(game, 5, FRAME, input);
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        assert!(!game.is_paused());
        run_game_ticks(game, 5, FRAME, input);
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// A fade-out completion nobody asked for must be ignored.
    pub fn contract_spurious_fade_completion_is_noop(game: &mut dyn Game) {
        let before = game.serialize_state();
        let events = game.effect_complete(EffectKind::FadeOut);
        assert!(events.is_empty(), "unexpected events: {events:?}");
        assert_eq!(before, game.serialize_state());
    }

    /// Degenerate frame times must never panic or produce non-finite state.
    pub fn contract_degenerate_dt_no_panic(game: &mut dyn Game) {
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY, 10.0] {
            game.update(dt, &idle());
        }
        let overlay = game.debug_overlay();
        assert!(!overlay.contains("NaN"), "overlay: {overlay}");
        assert!(!overlay.contains("inf"), "overlay: {overlay}");
    }

    /// The debug overlay must show position and velocity.
    pub fn contract_overlay_shows_body(game: &dyn Game) {
        let overlay = game.debug_overlay();
        assert!(overlay.contains("POS:"), "overlay: {overlay}");
        assert!(overlay.contains("VEL:"), "overlay: {overlay}");
    }
}
