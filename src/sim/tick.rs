//! Fixed timestep simulation tick
//!
//! One atomic pass per call, in a fixed order:
//! spawn, behaviors (player, enemies, projectiles, culling), broad-phase,
//! combat, timed effects, then wave timer and HUD.

use serde::{Deserialize, Serialize};

use super::behavior::{BehaviorCtx, advance_boss_phase, update_enemy};
use super::collision::{Overlap, broad_phase};
use super::combat::{
    CombatCtx, CombatOutcome, DamageOutcome, cull_projectiles, damage_enemy, destroy_enemy,
    is_offscreen, resolve,
};
use super::entity::{Archetype, EntityRef, Faction};
use super::events::GameEvent;
use super::scheduler::{EffectKind, EffectPayload, TargetRef, TimedEffect};
use super::spawn::spawn_archetype;
use super::state::{GamePhase, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub move_up: bool,
    pub move_down: bool,
    /// Fire (held)
    pub action: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game by `dt_ms`, using the built-in broad-phase
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u64) {
    step(state, input, dt_ms, None);
}

/// Advance the game by `dt_ms`, resolving overlaps supplied by the host
pub fn tick_with_overlaps(state: &mut GameState, input: &TickInput, dt_ms: u64, pairs: &[Overlap]) {
    step(state, input, dt_ms, Some(pairs));
}

fn step(state: &mut GameState, input: &TickInput, dt_ms: u64, pairs: Option<&[Overlap]>) {
    state.session_ms += dt_ms;

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.pause();
                return;
            }
            GamePhase::Paused => {
                state.resume();
            }
            _ => {}
        }
    }

    // Nothing moves outside active play
    if state.phase != GamePhase::Playing {
        return;
    }

    state.scheduler.advance(dt_ms);
    let dt = dt_ms as f32 / 1000.0;

    run_spawns(state, dt_ms);
    update_player(state, input, dt);
    update_enemies(state, dt);
    move_projectiles(state, dt);
    cull_offscreen(state);

    let outcome = match pairs {
        Some(pairs) => resolve_combat(state, pairs),
        None => {
            let mut overlaps = std::mem::take(&mut state.scratch.overlaps);
            broad_phase(
                &state.enemies,
                &state.player,
                &state.player_shots,
                &state.enemy_shots,
                &mut overlaps,
            );
            let outcome = resolve_combat(state, &overlaps);
            state.scratch.overlaps = overlaps;
            outcome
        }
    };

    fire_due_effects(state);

    if outcome.player_destroyed {
        state.game_over();
    } else {
        state.time_remaining_ms = state.time_remaining_ms.saturating_sub(dt_ms);
        if state.time_remaining_ms == 0 {
            state.complete_wave();
        }
    }
    state.emit_hud();
}

fn run_spawns(state: &mut GameState, dt_ms: u64) {
    let mut due = std::mem::take(&mut state.scratch.spawns);
    state.spawner.update(dt_ms, &mut due);
    if !due.is_empty() {
        let mut ctx = BehaviorCtx {
            now: state.scheduler.now(),
            dt: 0.0,
            player_pos: state.player.pos,
            enemy_shots: &mut state.enemy_shots,
            scheduler: &mut state.scheduler,
            rng: &mut state.rng,
            events: &mut state.events,
        };
        for &archetype in &due {
            spawn_archetype(archetype, &mut state.enemies, &mut ctx);
        }
    }
    state.scratch.spawns = due;
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    state.player.sync_upgrades(&state.upgrades, &mut state.scheduler);
    state
        .player
        .apply_movement(input.move_up, input.move_down, dt, &state.upgrades);

    if input.action
        && state
            .player
            .fire(state.session_ms, &state.upgrades, &mut state.player_shots)
            .is_some()
    {
        state.events.push(GameEvent::Fired {
            faction: Faction::Player,
            pos: state.player.pos,
        });
    }
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let mut refs = std::mem::take(&mut state.scratch.enemies);
    let mut ctx = BehaviorCtx {
        now: state.scheduler.now(),
        dt,
        player_pos: state.player.pos,
        enemy_shots: &mut state.enemy_shots,
        scheduler: &mut state.scheduler,
        rng: &mut state.rng,
        events: &mut state.events,
    };
    for archetype in Archetype::ALL {
        state.enemies.active_refs(archetype, &mut refs);
        for &r in &refs {
            if let Some(enemy) = state.enemies.get_mut(r) {
                update_enemy(enemy, r, &mut ctx);
            }
        }
    }
    state.scratch.enemies = refs;
}

fn move_projectiles(state: &mut GameState, dt: f32) {
    for pool in [&mut state.player_shots, &mut state.enemy_shots] {
        for (_, shot) in pool.iter_active_mut() {
            shot.pos += shot.vel * dt;
        }
    }
}

/// Bodies that left the world go back to their pools without score
fn cull_offscreen(state: &mut GameState) {
    let mut refs = std::mem::take(&mut state.scratch.enemies);
    for archetype in Archetype::ALL {
        refs.clear();
        state.enemies.for_each_active(archetype, |r, enemy| {
            if is_offscreen(enemy.pos, enemy.radius) {
                refs.push(r);
            }
        });
        for &r in &refs {
            log::debug!("{:?} left the field", r.archetype);
            state.enemies.release(r, &mut state.scheduler);
        }
    }
    state.scratch.enemies = refs;

    let mut shots = std::mem::take(&mut state.scratch.shots);
    cull_projectiles(&mut state.player_shots, &mut shots);
    cull_projectiles(&mut state.enemy_shots, &mut shots);
    state.scratch.shots = shots;
}

fn resolve_combat(state: &mut GameState, pairs: &[Overlap]) -> CombatOutcome {
    let mut ctx = CombatCtx {
        enemies: &mut state.enemies,
        player: &mut state.player,
        upgrades: &state.upgrades,
        player_shots: &mut state.player_shots,
        enemy_shots: &mut state.enemy_shots,
        scheduler: &mut state.scheduler,
        score: &mut state.score,
        events: &mut state.events,
    };
    resolve(pairs, &mut ctx)
}

fn fire_due_effects(state: &mut GameState) {
    let mut due = std::mem::take(&mut state.scratch.effects);
    let enemies = &state.enemies;
    state.scheduler.drain_due(
        |target| match target {
            TargetRef::Player => true,
            TargetRef::Enemy(r) => enemies.is_live(r),
        },
        &mut due,
    );

    for effect in &due {
        // Cancelled by an earlier effect in this batch
        if state.scheduler.is_cancelled(effect.handle) {
            continue;
        }
        match effect.target {
            TargetRef::Player => state.player.on_effect(effect, &mut state.scheduler),
            TargetRef::Enemy(r) => apply_enemy_effect(state, r, effect),
        }
    }
    state.scheduler.finish_batch();
    state.scratch.effects = due;
}

fn apply_enemy_effect(state: &mut GameState, r: EntityRef, effect: &TimedEffect) {
    let now = state.scheduler.now();
    // An earlier effect in this batch may have destroyed the target
    let Some(enemy) = state.enemies.get_mut(r) else {
        log::debug!("{:?} for released {:?} dropped", effect.kind, r);
        return;
    };
    if !effect.recurring() {
        enemy.forget_effect(effect.handle);
    }

    match (effect.kind, effect.payload) {
        (EffectKind::DamageFlashExpiry, _) => enemy.refresh_tint(),
        (EffectKind::AcidTick, EffectPayload::Damage(damage)) => {
            enemy.refresh_tint();
            match damage_enemy(&mut state.enemies, &mut state.scheduler, r, damage) {
                DamageOutcome::Destroyed => {
                    destroy_enemy(
                        r,
                        &mut state.enemies,
                        &mut state.scheduler,
                        &mut state.score,
                        &mut state.events,
                    );
                }
                DamageOutcome::Damaged => {
                    if let Some(enemy) = state.enemies.get(r) {
                        state.events.push(GameEvent::Hit {
                            entity: r,
                            pos: enemy.pos,
                        });
                    }
                }
                DamageOutcome::Absorbed | DamageOutcome::Ignored => {}
            }
        }
        (EffectKind::BossPhaseAdvance, EffectPayload::Phase(next)) => {
            if advance_boss_phase(enemy, r, next, now, &mut state.scheduler) {
                state.events.push(GameEvent::BossPhaseChanged {
                    entity: r,
                    phase: next,
                });
            }
        }
        (kind, payload) => {
            log::debug!("{:?} with {:?} has no enemy handler", kind, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PoolCapacities, SessionConfig, SpawnIntervals};
    use crate::consts::*;
    use crate::sim::collision::BodyRef;
    use crate::sim::combat::apply_acid;
    use crate::sim::entity::{BehaviorState, BossPhase, Tint, Variant};
    use crate::sim::player::PlayerState;
    use crate::sim::pool::SlotRef;
    use crate::sim::upgrades::UpgradeId;
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: u64 = SIM_DT_MS;

    fn quiet_config() -> SessionConfig {
        let mut config = SessionConfig::with_seed(12345);
        config.spawn_intervals = SpawnIntervals::disabled();
        config
    }

    fn quiet() -> GameState {
        GameState::new(quiet_config())
    }

    fn idle(state: &mut GameState, ticks: u32) {
        for _ in 0..ticks {
            tick(state, &TickInput::default(), DT);
        }
    }

    /// Put an enemy at a fixed spot with a behavior-free record
    fn place(state: &mut GameState, archetype: Archetype, pos: Vec2) -> EntityRef {
        let r = state.enemies.acquire(archetype).unwrap();
        state
            .enemies
            .get_mut(r)
            .unwrap()
            .activate(archetype, Variant::Normal, pos);
        r
    }

    fn player_shot(state: &mut GameState, damage: i32) -> SlotRef {
        let r = state.player_shots.acquire().unwrap();
        state
            .player_shots
            .get_mut(r)
            .unwrap()
            .launch(Vec2::new(300.0, 300.0), Vec2::ZERO, damage, 1.0);
        r
    }

    fn count_destroyed(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Destroyed { .. }))
            .count()
    }

    #[test]
    fn test_full_pool_drops_second_spawn() {
        let mut config = quiet_config();
        config.capacities = PoolCapacities {
            asteroid: 1,
            ..PoolCapacities::default()
        };
        let mut state = GameState::new(config);

        let first = state.request_spawn(Archetype::Asteroid).unwrap();
        assert!(state.request_spawn(Archetype::Asteroid).is_none());
        let start_x = state.enemies.get(first).unwrap().pos.x;

        tick(&mut state, &TickInput::default(), 1000);
        let asteroid = state.enemies.get(first).unwrap();
        assert_eq!(asteroid.vel, Vec2::new(-150.0, 0.0));
        assert!((asteroid.pos.x - (start_x - 150.0)).abs() < 1e-3);
        assert_eq!(state.enemies.active_count(Archetype::Asteroid), 1);
    }

    #[test]
    fn test_two_hits_same_tick_destroy_once() {
        let mut state = quiet();
        let target = place(&mut state, Archetype::Gunner, Vec2::new(500.0, 300.0));
        {
            let enemy = state.enemies.get_mut(target).unwrap();
            enemy.max_hp = 100;
            enemy.hp = 100;
        }
        let a = player_shot(&mut state, 40);
        let b = player_shot(&mut state, 70);
        let c = player_shot(&mut state, 10);
        state.drain_events();

        let pairs = [
            Overlap::new(BodyRef::PlayerShot(a), BodyRef::Enemy(target)),
            Overlap::new(BodyRef::PlayerShot(b), BodyRef::Enemy(target)),
            Overlap::new(BodyRef::PlayerShot(c), BodyRef::Enemy(target)),
        ];
        tick_with_overlaps(&mut state, &TickInput::default(), DT, &pairs);

        let events = state.drain_events();
        assert_eq!(count_destroyed(&events), 1);
        assert!(!state.enemies.is_live(target));
        assert_eq!(state.score, 30);
        // The flash scheduled by the first hit went with the slot
        assert!(state.scheduler.is_empty());
        assert!(state.player_shots.is_live(c));
    }

    #[test]
    fn test_kamikaze_point_blank_stops() {
        let mut state = quiet();
        let pos = state.player.pos + Vec2::new(5.0, 0.0);
        let r = place(&mut state, Archetype::Kamikaze, pos);
        // No overlaps reported, so combat leaves it alone
        tick_with_overlaps(&mut state, &TickInput::default(), DT, &[]);
        assert_eq!(state.enemies.get(r).unwrap().vel, Vec2::ZERO);
    }

    #[test]
    fn test_acid_kill_reports_last_position() {
        let mut state = quiet();
        let target = place(&mut state, Archetype::Asteroid, Vec2::new(600.0, 200.0));
        state.enemies.get_mut(target).unwrap().hp = 10;
        // Asteroid update only spins; velocity stays zero for a placed record
        let handle = apply_acid(&mut state.enemies, &mut state.scheduler, target, 10).unwrap();
        assert_eq!(state.enemies.get(target).unwrap().tint, Tint::Acid);
        state.drain_events();

        let ticks = (ACID_DELAY_MS / DT) as u32;
        idle(&mut state, ticks);
        assert!(state.enemies.is_live(target));
        idle(&mut state, 1);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Destroyed {
            entity: target,
            archetype: Archetype::Asteroid,
            pos: Vec2::new(600.0, 200.0),
            score_value: 10,
        }));
        assert!(!state.scheduler.is_pending(handle));
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_acid_applications_are_independent() {
        let mut state = quiet();
        let target = place(&mut state, Archetype::Gunner, Vec2::new(600.0, 200.0));
        apply_acid(&mut state.enemies, &mut state.scheduler, target, 10);
        idle(&mut state, 10);
        apply_acid(&mut state.enemies, &mut state.scheduler, target, 10);

        idle(&mut state, (ACID_DELAY_MS / DT) as u32 - 9);
        assert_eq!(state.enemies.get(target).unwrap().hp, 30);
        idle(&mut state, 10);
        assert_eq!(state.enemies.get(target).unwrap().hp, 20);
    }

    #[test]
    fn test_released_slot_inherits_nothing() {
        let mut state = quiet();
        let old = place(&mut state, Archetype::Gunner, Vec2::new(600.0, 200.0));
        apply_acid(&mut state.enemies, &mut state.scheduler, old, 10);
        state.enemies.release(old, &mut state.scheduler);
        let new = place(&mut state, Archetype::Gunner, Vec2::new(600.0, 200.0));
        assert_eq!(old.slot.index, new.slot.index);

        idle(&mut state, (ACID_DELAY_MS / DT) as u32 + 2);
        let enemy = state.enemies.get(new).unwrap();
        assert_eq!(enemy.hp, 40);
        assert_eq!(enemy.tint, Tint::Base);
    }

    #[test]
    fn test_hit_flash_lasts_its_duration() {
        let mut state = quiet();
        let target = place(&mut state, Archetype::Gunner, Vec2::new(600.0, 200.0));
        let shot = player_shot(&mut state, 5);
        tick_with_overlaps(
            &mut state,
            &TickInput::default(),
            DT,
            &[Overlap::new(BodyRef::PlayerShot(shot), BodyRef::Enemy(target))],
        );
        assert_eq!(state.enemies.get(target).unwrap().tint, Tint::Hit);

        idle(&mut state, (ENEMY_FLASH_MS / DT) as u32);
        assert_eq!(state.enemies.get(target).unwrap().tint, Tint::Hit);
        idle(&mut state, 1);
        assert_eq!(state.enemies.get(target).unwrap().tint, Tint::Base);
    }

    #[test]
    fn test_pause_freezes_clock_and_shifts_cooldown() {
        let mut state = quiet();
        let fire = TickInput {
            action: true,
            ..Default::default()
        };
        tick(&mut state, &fire, DT);
        let deadline = state.player.fire_ready_at;
        let logical = state.now();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Paused);
        idle(&mut state, 50);
        assert_eq!(state.now(), logical);
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Playing);

        assert_eq!(state.player.fire_ready_at, deadline + 51 * DT);
    }

    fn gunner_deadline(state: &GameState, r: EntityRef) -> u64 {
        match state.enemies.get(r).unwrap().behavior {
            BehaviorState::Gunner { next_fire_at } => next_fire_at,
            other => panic!("not a gunner: {:?}", other),
        }
    }

    /// Tick until the first enemy shot is out; returns the logical time
    fn first_enemy_shot_at(state: &mut GameState) -> u64 {
        for _ in 0..1000 {
            tick(state, &TickInput::default(), DT);
            if state.enemy_shots.active_count() > 0 {
                return state.now();
            }
        }
        panic!("gunner never fired");
    }

    #[test]
    fn test_pause_holds_gunner_cadence() {
        let mut steady = quiet();
        let mut paused = quiet();
        let a = steady.request_spawn(Archetype::Gunner).unwrap();
        let b = paused.request_spawn(Archetype::Gunner).unwrap();
        let deadline = gunner_deadline(&paused, b);
        assert_eq!(deadline, gunner_deadline(&steady, a));

        idle(&mut steady, 30);
        idle(&mut paused, 30);
        assert_eq!(paused.enemy_shots.active_count(), 0);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut paused, &pause, DT);
        idle(&mut paused, 200);
        tick(&mut paused, &pause, DT);
        assert_eq!(paused.phase, GamePhase::Playing);
        assert_eq!(gunner_deadline(&paused, b), deadline);
        assert_eq!(paused.now(), 31 * DT);
        idle(&mut steady, 1);

        let fired_steady = first_enemy_shot_at(&mut steady);
        let fired_paused = first_enemy_shot_at(&mut paused);
        assert_eq!(fired_paused, fired_steady);
        assert!(fired_paused >= deadline && fired_paused < deadline + DT);
        assert!(paused.session_ms > steady.session_ms);
    }

    #[test]
    fn test_spawner_drives_enemies_in() {
        let mut config = SessionConfig::with_seed(3);
        config.spawn_intervals = SpawnIntervals {
            asteroid_ms: 100,
            ..SpawnIntervals::disabled()
        };
        let mut state = GameState::new(config);
        idle(&mut state, 7);
        assert_eq!(state.enemies.active_count(Archetype::Asteroid), 1);
        let events = state.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::Spawned { archetype: Archetype::Asteroid, .. })));
    }

    #[test]
    fn test_offscreen_enemy_culled_without_score() {
        let mut state = quiet();
        let r = place(&mut state, Archetype::Asteroid, Vec2::new(-OFFSCREEN_MARGIN - 100.0, 300.0));
        idle(&mut state, 1);
        assert!(!state.enemies.is_live(r));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_player_fires_and_shot_travels() {
        let mut state = quiet();
        let fire = TickInput {
            action: true,
            ..Default::default()
        };
        tick(&mut state, &fire, DT);
        assert_eq!(state.player_shots.active_count(), 1);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Fired {
                faction: Faction::Player,
                ..
            }
        )));
        // Shots leave the right edge eventually and are culled
        idle(&mut state, 200);
        assert_eq!(state.player_shots.active_count(), 0);
    }

    #[test]
    fn test_mothership_phases_through_ticks() {
        let mut state = quiet();
        let boss = state.request_spawn(Archetype::Mothership).unwrap();
        state.drain_events();

        let until_engaging = (MOTHERSHIP_TOTAL_MS / DT) as u32 + 4;
        idle(&mut state, until_engaging);
        let events = state.drain_events();
        let phases: Vec<BossPhase> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::BossPhaseChanged { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec![BossPhase::Entering, BossPhase::Engaging]);
        assert!(state.enemies.get(boss).unwrap().is_vulnerable());
    }

    const MOTHERSHIP_TOTAL_MS: u64 =
        crate::sim::behavior::MOTHERSHIP_DISSOLVE_MS + crate::sim::behavior::MOTHERSHIP_ENTER_MS;

    #[test]
    fn test_lethal_hit_ends_game_and_stops_spawning() {
        let mut state = GameState::with_seed(9);
        state.player.hp = 5;
        let r = state.enemy_shots.acquire().unwrap();
        let pos = state.player.pos;
        state
            .enemy_shots
            .get_mut(r)
            .unwrap()
            .launch(pos, Vec2::ZERO, 10, 6.0);

        idle(&mut state, 1);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.spawner.is_stopped());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::GameOver { score: 0, wave: 1 }));

        // Frozen afterwards
        let now = state.now();
        idle(&mut state, 10);
        assert_eq!(state.now(), now);
    }

    #[test]
    fn test_wave_timer_completes_wave() {
        let mut config = quiet_config();
        config.wave_duration_ms = 2000;
        let mut state = GameState::new(config);
        state.drain_events();

        idle(&mut state, 124);
        assert_eq!(state.phase, GamePhase::Playing);
        let events = state.drain_events();
        let seconds: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::TimeRemaining { ms } => Some(*ms),
                _ => None,
            })
            .collect();
        // One update per whole-second boundary
        assert_eq!(seconds.len(), 1);

        idle(&mut state, 1);
        assert_eq!(state.phase, GamePhase::WaveComplete);
        assert!(state.drain_events().contains(&GameEvent::WaveComplete { wave: 1 }));
        assert!(state.next_wave());
        assert_eq!(state.time_remaining_ms, 2000);
    }

    #[test]
    fn test_invincibility_expiry_stops_flicker_in_same_batch() {
        let mut state = quiet();
        state.player.activate_invincibility(&mut state.scheduler);

        // Flicker re-arms for 1520, expiry is due at 1500: one batch
        tick(&mut state, &TickInput::default(), 1420);
        assert!(!state.player.visible);
        tick(&mut state, &TickInput::default(), 100);

        assert_eq!(state.player.state, PlayerState::Normal);
        assert!(state.player.visible);
        assert_eq!(
            state
                .scheduler
                .pending_for(TargetRef::Player)
                .filter(|e| e.kind == EffectKind::FlickerToggle)
                .count(),
            0
        );
        idle(&mut state, 20);
        assert!(state.player.visible);
    }

    #[test]
    fn test_regenerator_heals_over_time() {
        let mut state = quiet();
        state.apply_upgrade(UpgradeId::Regenerator);
        state.player.hp = 50;
        idle(&mut state, (AUTO_HEAL_PERIOD_MS / DT) as u32 + 1);
        assert_eq!(state.player.hp, 55);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::with_seed(99999);
        let mut b = GameState::with_seed(99999);
        let inputs = [
            TickInput {
                move_up: true,
                action: true,
                ..Default::default()
            },
            TickInput {
                move_down: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for i in 0..3000 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, DT);
            tick(&mut b, input, DT);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.hp, b.player.hp);
        assert_eq!(a.drain_events(), b.drain_events());
        let (mut sa, mut sb) = (Vec::new(), Vec::new());
        a.snapshot(&mut sa);
        b.snapshot(&mut sb);
        assert_eq!(sa, sb);
    }

    proptest! {
        #[test]
        fn prop_pause_shifts_cooldown_by_pause_length(paused_ticks in 1u32..200) {
            let mut state = quiet();
            let fire = TickInput { action: true, ..Default::default() };
            tick(&mut state, &fire, DT);
            let deadline = state.player.fire_ready_at;

            let pause = TickInput { pause: true, ..Default::default() };
            tick(&mut state, &pause, DT);
            idle(&mut state, paused_ticks);
            tick(&mut state, &pause, DT);

            prop_assert_eq!(
                state.player.fire_ready_at,
                deadline + (u64::from(paused_ticks) + 1) * DT
            );
        }

        #[test]
        fn prop_enemy_hp_stays_in_range(hits in proptest::collection::vec(-50i32..200, 1..12)) {
            let mut state = quiet();
            let target = place(&mut state, Archetype::Gunner, Vec2::new(500.0, 300.0));
            let pairs: Vec<Overlap> = hits
                .iter()
                .map(|&d| Overlap::new(BodyRef::PlayerShot(player_shot(&mut state, d)), BodyRef::Enemy(target)))
                .collect();
            tick_with_overlaps(&mut state, &TickInput::default(), DT, &pairs);
            if let Some(enemy) = state.enemies.get(target) {
                prop_assert!(enemy.hp > 0 && enemy.hp <= enemy.max_hp);
            }
            let destroyed = count_destroyed(&state.drain_events());
            prop_assert!(destroyed <= 1);
        }
    }
}
