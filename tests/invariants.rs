use cosmic_shooter::consts::{MAX_HEALTH, MAX_SHIELD, METEOR_SPLIT_THRESHOLD};
use cosmic_shooter::ports::Null;
use cosmic_shooter::sim::{
    ActivePowerups, EnemyKind, IntervalTimer, Key, ManualClock, Meteor, Player, PowerupKind,
    SeededRng, Viewport, circles_overlap, choose_enemy_kind,
};
use cosmic_shooter::{FrameStatus, Host, Session, Settings, Tuning};
use glam::DVec2;
use proptest::prelude::*;

/// One scripted input per frame
#[derive(Debug, Clone, Copy)]
enum Action {
    Idle,
    Press(Key),
    Release(Key),
    Touch(f64, f64),
    Lift,
}

fn action() -> impl Strategy<Value = Action> {
    let key = prop_oneof![
        Just(Key::Up),
        Just(Key::Down),
        Just(Key::Left),
        Just(Key::Right),
        Just(Key::Fire),
    ];
    prop_oneof![
        4 => Just(Action::Idle),
        3 => key.clone().prop_map(Action::Press),
        2 => key.prop_map(Action::Release),
        1 => (0.0..800.0f64, 0.0..600.0f64).prop_map(|(x, y)| Action::Touch(x, y)),
        1 => Just(Action::Lift),
    ]
}

proptest! {
    #[test]
    fn damage_keeps_health_and_shield_in_range(
        shield in 0u32..=MAX_SHIELD,
        hits in prop::collection::vec(0u32..200, 0..20),
    ) {
        let mut player = Player::new(DVec2::ZERO);
        player.shield = shield;
        let mut dead = false;
        for damage in hits {
            let before = player.health + player.shield;
            dead = player.apply_damage(damage);
            prop_assert!(player.health <= MAX_HEALTH);
            prop_assert!(player.shield <= MAX_SHIELD);
            prop_assert_eq!(player.health + player.shield, before.saturating_sub(damage));
            if dead {
                break;
            }
        }
        prop_assert_eq!(dead, player.health == 0);
    }

    #[test]
    fn fragments_are_smaller_than_their_parent(
        radius in (METEOR_SPLIT_THRESHOLD + 0.01)..200.0f64,
        vx in -5.0..5.0f64,
        vy in -5.0..5.0f64,
        seed in any::<u64>(),
    ) {
        let mut rng = SeededRng::new(seed);
        let parent = Meteor::new(DVec2::ZERO, DVec2::new(vx, vy), radius, &mut rng);
        for _ in 0..2 {
            let child = parent.fragment(&mut rng);
            prop_assert!(child.radius < parent.radius);
            prop_assert!(child.health >= 1);
            prop_assert!(child.health <= parent.health);
            prop_assert_eq!(child.pos, parent.pos);
        }
    }

    #[test]
    fn timer_fires_once_per_whole_period(
        period in 1.0..5000.0f64,
        steps in prop::collection::vec(0.0..200.0f64, 1..100),
    ) {
        let mut timer = IntervalTimer::new(period);
        let total: f64 = steps.iter().sum();
        let fired: u32 = steps.iter().map(|dt| timer.advance(*dt)).sum();
        let expected = (total / period).floor() as u32;
        // Accumulated rounding may land a firing one step either side
        prop_assert!(fired + 1 >= expected && fired <= expected + 1);
        prop_assert!(timer.elapsed_ms() < period);
    }

    #[test]
    fn powerups_never_go_negative(
        duration in 0.0..20_000.0f64,
        steps in prop::collection::vec(0.0..500.0f64, 0..80),
    ) {
        let mut active = ActivePowerups::default();
        active.arm(PowerupKind::Speed, duration);
        let mut expirations = 0;
        for dt in steps {
            expirations += active.decay(dt).len();
            prop_assert!(active.remaining(PowerupKind::Speed) >= 0.0);
        }
        prop_assert!(expirations <= 1);
        prop_assert_eq!(expirations == 1, duration > 0.0 && !active.is_active(PowerupKind::Speed));
    }

    #[test]
    fn overlap_is_symmetric(
        ax in -500.0..500.0f64, ay in -500.0..500.0f64, ra in 0.0..50.0f64,
        bx in -500.0..500.0f64, by in -500.0..500.0f64, rb in 0.0..50.0f64,
    ) {
        let a = DVec2::new(ax, ay);
        let b = DVec2::new(bx, by);
        prop_assert_eq!(circles_overlap(a, ra, b, rb), circles_overlap(b, rb, a, ra));
    }

    #[test]
    fn late_levels_field_more_tough_enemies(roll in 0.0..1.0f64) {
        if choose_enemy_kind(1, roll) == EnemyKind::Tough {
            prop_assert_eq!(choose_enemy_kind(5, roll), EnemyKind::Tough);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn seeded_runs_keep_vitals_bounded_and_score_monotonic(
        seed in any::<u64>(),
        script in prop::collection::vec(action(), 1..64),
        frames in 500usize..3000,
    ) {
        let clock = ManualClock::new(0.0);
        let settings = Settings {
            starfield: false,
            ..Settings::default()
        };
        let mut session = Session::new(
            Viewport::new(800.0, 600.0),
            Tuning::default(),
            settings,
            Box::new(clock.clone()),
            Box::new(SeededRng::new(seed)),
        );
        let (mut surface, mut audio, mut ui) = (Null, Null, Null);
        let mut last_score = 0;

        for i in 0..frames {
            match script[i % script.len()] {
                Action::Idle => {}
                Action::Press(key) => session.key_down(key),
                Action::Release(key) => session.key_up(key),
                Action::Touch(x, y) => session.touch_start(0, DVec2::new(x, y)),
                Action::Lift => session.touch_end(0),
            }
            clock.advance(16.0);
            let mut host = Host {
                surface: &mut surface,
                audio: &mut audio,
                ui: &mut ui,
            };
            let status = session.frame(&mut host);

            let world = session.world();
            prop_assert!(world.player.health <= MAX_HEALTH);
            prop_assert!(world.player.shield <= MAX_SHIELD);
            prop_assert!(world.state.score >= last_score);
            last_score = world.state.score;
            if status == FrameStatus::Halted {
                prop_assert_eq!(world.player.health, 0);
                break;
            }
        }
    }
}
