use approx::assert_relative_eq;
use glam::Vec3;
use grid_tactics_collision::BoxWorld;
use grid_tactics_core::{Aabb, LayerMask};
use grid_tactics_system_grenade_arc::{
    apex_for_distance, ceiling_clamped_apex, horizontal_distance, is_arc_clear, plan_throw,
    resolve_bounce, ArcConfig, ArcSettings, BounceSettings, LandingSurface, ThrowRejection,
};

const START: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const END: Vec3 = Vec3::new(10.0, 1.0, 0.0);

fn wall(height: f32) -> BoxWorld {
    let mut geometry = BoxWorld::new();
    let _ = geometry.add(
        Aabb::new(Vec3::new(4.9, 0.0, -1.0), Vec3::new(5.1, height, 1.0)),
        LayerMask::ARC_BLOCKERS,
    );
    geometry
}

#[test]
fn open_sky_keeps_the_nominal_apex() {
    let config = ArcConfig::default();
    let nominal = apex_for_distance(&config, horizontal_distance(START, END));

    let apex = ceiling_clamped_apex(START, END, &config, &BoxWorld::new(), &ArcSettings::default());

    assert_relative_eq!(apex, nominal);
}

#[test]
fn ceiling_at_nominal_height_minus_clearance_lowers_the_apex() {
    let config = ArcConfig::default();
    let settings = ArcSettings::default();
    let nominal = apex_for_distance(&config, horizontal_distance(START, END));
    let ceiling = START.y + nominal - settings.ceiling_clearance;
    let mut geometry = BoxWorld::new();
    let _ = geometry.add(
        Aabb::new(Vec3::new(-1.0, ceiling, -1.0), Vec3::new(11.0, ceiling + 1.0, 1.0)),
        LayerMask::CEILING,
    );

    let apex = ceiling_clamped_apex(START, END, &config, &geometry, &settings);

    assert!(apex < nominal, "apex {apex} should be below nominal {nominal}");
    assert!(apex > 0.0);
}

#[test]
fn arcs_pass_over_low_walls_but_not_high_ones() {
    let config = ArcConfig::default();
    let settings = ArcSettings::default();
    let apex = apex_for_distance(&config, horizontal_distance(START, END));

    assert!(is_arc_clear(START, END, apex, &config, &wall(1.0), &settings));
    assert!(!is_arc_clear(START, END, apex, &config, &wall(6.0), &settings));
}

#[test]
fn thrower_cover_inside_the_end_clip_is_ignored() {
    let config = ArcConfig::default();
    let mut geometry = BoxWorld::new();
    let _ = geometry.add(
        Aabb::new(Vec3::new(0.3, 0.0, -1.0), Vec3::new(0.5, 1.5, 1.0)),
        LayerMask::ARC_BLOCKERS,
    );

    let plan = plan_throw(
        START,
        END,
        LandingSurface::Ground,
        Some(&config),
        &geometry,
        &ArcSettings::default(),
    );

    assert!(plan.is_ok(), "{plan:?}");
}

#[test]
fn blocked_arcs_are_rejected() {
    let rejection = plan_throw(
        START,
        END,
        LandingSurface::Ground,
        Some(&ArcConfig::default()),
        &wall(6.0),
        &ArcSettings::default(),
    );

    assert!(matches!(rejection, Err(ThrowRejection::ArcBlocked { .. })));
}

#[test]
fn distant_targets_are_out_of_range() {
    let config = ArcConfig::default();
    let far = Vec3::new(config.max_throw_distance + 1.0, 1.0, 0.0);

    let rejection = plan_throw(
        START,
        far,
        LandingSurface::Ground,
        Some(&config),
        &BoxWorld::new(),
        &ArcSettings::default(),
    );

    assert!(matches!(rejection, Err(ThrowRejection::OutOfRange { .. })));
}

#[test]
fn flat_arcs_cannot_land_on_obstacles() {
    let config = ArcConfig {
        near_apex_height: 0.3,
        far_apex_height: 0.3,
        ..ArcConfig::default()
    };
    let geometry = BoxWorld::new();
    let settings = ArcSettings::default();

    let obstacle = plan_throw(
        START,
        END,
        LandingSurface::Obstacle,
        Some(&config),
        &geometry,
        &settings,
    );
    assert!(matches!(
        obstacle,
        Err(ThrowRejection::LandingTooShallow { .. })
    ));

    let ground = plan_throw(START, END, LandingSurface::Ground, Some(&config), &geometry, &settings);
    assert!(ground.is_ok());
}

#[test]
fn planning_is_deterministic() {
    let config = ArcConfig::default();
    let geometry = wall(1.0);
    let settings = ArcSettings::default();

    let first = plan_throw(START, END, LandingSurface::Ground, Some(&config), &geometry, &settings)
        .expect("clear throw");
    let second = plan_throw(START, END, LandingSurface::Ground, Some(&config), &geometry, &settings)
        .expect("clear throw");

    assert_eq!(first, second);
    assert_eq!(first.points.first(), Some(&START));
}

#[test]
fn missing_config_uses_the_fallback() {
    let plan = plan_throw(
        START,
        END,
        LandingSurface::Ground,
        None,
        &BoxWorld::new(),
        &ArcSettings::default(),
    )
    .expect("open throw");

    assert_relative_eq!(plan.nominal_apex, apex_for_distance(&ArcConfig::fallback(), 10.0));
    assert_relative_eq!(plan.apex, plan.nominal_apex);
}

#[test]
fn projectiles_bounce_off_the_floor() {
    let mut geometry = BoxWorld::new();
    let _ = geometry.add(
        Aabb::new(Vec3::new(-5.0, -1.0, -5.0), Vec3::new(5.0, 0.0, 5.0)),
        LayerMask::ARC_BLOCKERS,
    );

    let bounce = resolve_bounce(
        &geometry,
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(2.0, -4.0, 0.0),
        LayerMask::ARC_BLOCKERS,
        &BounceSettings::default(),
    )
    .expect("floor is struck");

    assert_eq!(bounce.normal, Vec3::Y);
    assert!(bounce.point.y > 0.0);
    assert!(bounce.velocity.y > 0.0);
    assert!(bounce.velocity.x > 0.0 && bounce.velocity.x < 2.0);
}
