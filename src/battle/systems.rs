//! Battle Systems API
//!
//! Stable entry point for wiring the battle simulation into an app. Both the
//! headless runner and tests go through here rather than through the
//! individual modules.
//!
//! ## Sub-stepping
//!
//! Gameplay systems live in the [`BattleStep`] schedule. Each frame,
//! [`run_battle_substeps`] splits the frame delta into slices of at most
//! `dt_max` seconds and runs the schedule once per slice, so no step ever
//! covers more than about 1/60 s of simulated time.
//!
//! ## System Phases
//!
//! Within a step, phases run in this order:
//!
//! 1. **Ai** - mob and autopilot decisions
//! 2. **World** - death timers, walking, projectile steering
//! 3. **Physics** - velocity integration
//! 4. **Collisions** - projectile contacts
//! 5. **Skills** - activation and delayed resolution
//! 6. **Stats** - buffs, heals, hits, modifier decay
//! 7. **Animation** - animation and FX bookkeeping
//! 8. **Turn** - completion tracking, input and turn advance
//!
//! Turn runs last so completions from earlier phases are seen in the same
//! step.

use std::time::Duration;

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

use super::{ai, animation, movement, physics, projectiles, stats, turn, world};
use super::skills::system::{queue_skill_requests, resolve_queued_skills};
use crate::settings::SimulationSettings;

/// Schedule holding every gameplay system, run once per sub-step
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct BattleStep;

/// System set labels for battle system ordering
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    Ai,
    World,
    Physics,
    Collisions,
    Skills,
    Stats,
    Animation,
    Turn,
}

/// Configures the ordering between battle phases.
///
/// Call this once during app setup before adding battle systems.
pub fn configure_battle_system_ordering(app: &mut App) {
    app.configure_sets(
        BattleStep,
        (
            BattlePhase::Ai,
            BattlePhase::World,
            BattlePhase::Physics,
            BattlePhase::Collisions,
            BattlePhase::Skills,
            BattlePhase::Stats,
            BattlePhase::Animation,
            BattlePhase::Turn,
        )
            .chain(),
    );
}

/// Run [`BattleStep`] once per `dt_max` slice of the frame delta.
///
/// Each run sees a [`Time`] whose delta is its own slice; the frame's
/// `Time` is restored afterwards.
pub fn run_battle_substeps(world: &mut World) {
    let frame = world.resource::<Time>().clone();
    let dt_max = world
        .get_resource::<SimulationSettings>()
        .map(|settings| settings.dt_max)
        .unwrap_or(1.0 / 60.0);
    if dt_max <= 0.0 {
        error!("dt_max must be positive, got {}", dt_max);
        return;
    }

    let mut step_time = Time::<()>::default();
    step_time.advance_to(frame.elapsed().saturating_sub(frame.delta()));

    let mut remaining = frame.delta_secs();
    while remaining > 0.0 {
        let dt = remaining.min(dt_max);
        remaining -= dt;
        step_time.advance_by(Duration::from_secs_f32(dt));
        world.insert_resource(step_time.clone());
        world.run_schedule(BattleStep);
    }

    world.insert_resource(frame);
}

/// Adds the battle simulation systems to the app.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - Gate for the per-frame sub-step driver
///
/// # Example
/// ```ignore
/// // Always run
/// add_core_battle_systems(&mut app, || true);
/// ```
pub fn add_core_battle_systems<M>(app: &mut App, run_condition: impl Condition<M>) {
    app.add_systems(Update, run_battle_substeps.run_if(run_condition));

    app.add_systems(
        BattleStep,
        (
            ai::plan_mob_moves,
            ai::plan_mob_skills,
            ai::drive_autopilot,
        )
            .in_set(BattlePhase::Ai),
    );

    app.add_systems(
        BattleStep,
        (
            world::tick_death_timers,
            movement::follow_paths,
            projectiles::steer_projectiles,
        )
            .chain()
            .in_set(BattlePhase::World),
    );

    app.add_systems(
        BattleStep,
        physics::integrate_motion.in_set(BattlePhase::Physics),
    );

    app.add_systems(
        BattleStep,
        (
            physics::detect_collisions,
            projectiles::process_projectile_hits,
        )
            .chain()
            .in_set(BattlePhase::Collisions),
    );

    app.add_systems(
        BattleStep,
        (queue_skill_requests, resolve_queued_skills)
            .chain()
            .in_set(BattlePhase::Skills),
    );

    // Buffs before hits, so a shield granted this step absorbs this step's damage
    app.add_systems(
        BattleStep,
        (
            stats::process_buff_events,
            stats::process_heal_events,
            stats::process_hit_events,
            stats::decay_stat_modifiers,
        )
            .chain()
            .in_set(BattlePhase::Stats),
    );

    app.add_systems(
        BattleStep,
        (
            animation::apply_animation_changes,
            animation::track_fx,
        )
            .in_set(BattlePhase::Animation),
    );

    app.add_systems(
        BattleStep,
        (
            turn::track_action_completion,
            turn::handle_player_input,
            world::update_battle_outcome,
            turn::advance_turns,
        )
            .chain()
            .in_set(BattlePhase::Turn),
    );
}
