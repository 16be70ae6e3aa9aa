//! Core plugin that sets up game states, frame ordering, and feedback events.

use bevy::prelude::*;

use super::events::*;
use super::states::*;
use crate::physics::ContactEvent;

/// Per-frame ordering of the combat pipeline.
///
/// Physics steps first, contacts reach the actors' hooks, actors move and
/// swing, then the combat manager resolves damage with fresh hit polygons.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Physics,
    Contacts,
    Actors,
    Resolve,
    Feedback,
}

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, InGame, Paused, GameOver)
/// - The chained [`FrameSet`] schedule
/// - Global events (ContactEvent, FeedbackEvent)
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            .init_state::<GameState>()

            .add_event::<ContactEvent>()
            .add_event::<FeedbackEvent>()

            .configure_sets(
                Update,
                (
                    FrameSet::Physics,
                    FrameSet::Contacts,
                    FrameSet::Actors,
                    FrameSet::Resolve,
                    FrameSet::Feedback,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            )

            .add_systems(
                Update,
                handle_pause_input.run_if(in_state(GameState::InGame).or(in_state(GameState::Paused))),
            )
            .add_systems(Update, log_feedback.in_set(FrameSet::Feedback));
    }
}

/// Handle Escape key to pause/unpause the game.
///
/// Headless runs have no keyboard resource, so the input is optional.
fn handle_pause_input(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    current_state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Escape) {
        match current_state.get() {
            GameState::InGame => next_state.set(GameState::Paused),
            GameState::Paused => next_state.set(GameState::InGame),
            _ => {}
        }
    }
}

/// Stand-in consumer for feedback: the UI, audio, and score collaborators
/// live outside this crate.
fn log_feedback(mut events: EventReader<FeedbackEvent>) {
    for FeedbackEvent(feedback) in events.read() {
        match feedback {
            Feedback::Score { points } => info!("Score +{}", points),
            Feedback::PlayerDefeated => info!("Player defeated"),
            other => debug!("Feedback: {:?}", other),
        }
    }
}
