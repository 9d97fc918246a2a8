mod common;

use common::friendly;
use vision_core::{
    build_headless_app, build_vision_map, run_frame, Alliance, EntityRecord, EntityStatus,
    EntityStore, FogMask, VisionConfigMetadata, VisionMap, VisionRadiusResolver,
};

/// A lone turret with no override reveals a 50 m disc around itself.
#[test]
fn turret_at_origin_reveals_fifty_meters() {
    common::ensure_test_config();
    let mut app = build_headless_app();
    app.insert_resource(EntityStore::from_iter([EntityRecord::new("t1")
        .with_alliance(Alliance::Friendly)
        .with_asset_type("turret")
        .at(0.0, 0.0)]));

    run_frame(&mut app);

    let vision = app.world.resource::<VisionMap>();
    assert_eq!(vision.len(), 1);
    let circle = &vision.circles()[0];
    assert_eq!((circle.x, circle.y, circle.r), (0.0, 0.0, 50.0));

    assert!(vision.is_visible(40.0, 0.0));
    assert!(vision.is_visible(50.0, 0.0));
    assert!(!vision.is_visible(60.0, 0.0));
}

/// Two sensors 100 m apart leave an unobserved gap between 30 m and 70 m.
#[test]
fn sensor_pair_leaves_gap() {
    common::ensure_test_config();
    let mut app = build_headless_app();
    app.insert_resource(EntityStore::from_iter([
        friendly("s1", "sensor", 0.0, 0.0),
        friendly("s2", "sensor", 100.0, 0.0),
    ]));

    run_frame(&mut app);

    let vision = app.world.resource::<VisionMap>();
    assert!(vision.is_visible(15.0, 0.0));
    assert!(vision.is_visible(85.0, 0.0));
    assert!(vision.is_visible(30.0, 0.0));
    assert!(vision.is_visible(70.0, 0.0));
    assert!(!vision.is_visible(50.0, 0.0));
    assert!(!vision.is_visible(30.5, 0.0));
    assert!(!vision.is_visible(69.5, 0.0));
}

/// Only active friendlies contribute, whatever the status mix.
#[test]
fn mixed_statuses_count_only_active_friendlies() {
    common::ensure_test_config();
    let mut app = build_headless_app();
    app.insert_resource(EntityStore::from_iter([
        friendly("a", "rover", 0.0, 0.0),
        friendly("b", "rover", 10.0, 0.0).with_status(EntityStatus::Active),
        friendly("c", "rover", 20.0, 0.0).with_status(EntityStatus::Neutralized),
        friendly("d", "rover", 30.0, 0.0).with_status(EntityStatus::Eliminated),
        friendly("e", "rover", 40.0, 0.0).with_status(EntityStatus::Destroyed),
    ]));

    run_frame(&mut app);

    assert_eq!(app.world.resource::<VisionMap>().len(), 2);
}

/// A feed document exercises case folding, legacy coordinates, null and zero
/// overrides and the no-mixing rule for positions.
#[test]
fn feed_document_builds_expected_circles() {
    common::ensure_test_config();
    let store = EntityStore::from_file(&common::fixture_path("mixed_feed.json"))
        .expect("fixture feed parses");
    assert_eq!(store.len(), 6);

    let mut app = build_headless_app();
    app.insert_resource(store);
    run_frame(&mut app);

    let vision = app.world.resource::<VisionMap>();
    let summary: Vec<(&str, f64)> = vision
        .circles()
        .iter()
        .map(|circle| (circle.id.as_str(), circle.r))
        .collect();
    assert_eq!(
        summary,
        [
            ("alpha-turret", 50.0),
            ("bravo-sensor", 30.0),
            ("foxtrot-person", 0.0)
        ]
    );

    // Zero-radius observer sees only its own position.
    assert!(vision.is_visible(-50.0, -50.0));
    assert!(!vision.is_visible(-50.0, -50.5));
}

/// Circles are rebuilt from the store each frame rather than accumulated.
#[test]
fn circles_track_store_changes_between_frames() {
    common::ensure_test_config();
    let mut app = build_headless_app();
    app.insert_resource(EntityStore::from_iter([friendly("t1", "turret", 0.0, 0.0)]));
    run_frame(&mut app);
    assert!(app.world.resource::<VisionMap>().is_visible(0.0, 0.0));

    app.world
        .resource_mut::<EntityStore>()
        .upsert(friendly("t1", "turret", 0.0, 0.0).with_status(EntityStatus::Destroyed));
    run_frame(&mut app);
    assert!(app.world.resource::<VisionMap>().is_empty());
    assert!(!app.world.resource::<VisionMap>().is_visible(0.0, 0.0));
}

/// Hundreds of observers build in one pass.
#[test]
fn builds_hundreds_of_observers() {
    common::ensure_test_config();
    let mut app = build_headless_app();
    let store: EntityStore = (0..600)
        .map(|i| {
            let alliance = if i % 3 == 0 {
                Alliance::Hostile
            } else {
                Alliance::Friendly
            };
            EntityRecord::new(format!("u{i}"))
                .with_alliance(alliance)
                .at(i as f64 - 300.0, 0.0)
        })
        .collect();
    app.insert_resource(store);

    run_frame(&mut app);

    let vision = app.world.resource::<VisionMap>();
    assert_eq!(vision.len(), 400);
    let ids: Vec<_> = vision.circles().iter().take(3).map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["u1", "u2", "u4"]);
}

/// The fixture configuration is picked up from the environment.
#[test]
fn config_fixture_drives_fog_mask_resolution() {
    common::ensure_test_config();
    let mut app = build_headless_app();
    assert!(app.world.resource::<VisionConfigMetadata>().path().is_some());

    app.insert_resource(EntityStore::from_iter([friendly("d1", "drone", 0.0, 0.0)]));
    run_frame(&mut app);

    let mask = app.world.resource::<FogMask>();
    assert_eq!((mask.columns(), mask.rows()), (20, 20));
    assert!(mask.visible_count() > 0);
    assert!(mask.coverage() < 0.5);
}

/// Circles serialize in the shape the renderer consumes.
#[test]
fn circles_serialize_for_renderer() -> anyhow::Result<()> {
    let store = EntityStore::from_json_str(
        r#"[{"id":"t1","alliance":"friendly","asset_type":"turret","x":1.5,"y":-2}]"#,
    )?;
    let circles = build_vision_map(&store, &VisionRadiusResolver::default());
    let json = serde_json::to_value(&circles)?;
    assert_eq!(
        json,
        serde_json::json!([{ "id": "t1", "x": 1.5, "y": -2.0, "r": 50.0 }])
    );
    Ok(())
}

/// A malformed entry drops out on its own; the rest of the feed still sees.
#[test]
fn malformed_entries_keep_valid_observers() -> anyhow::Result<()> {
    let store = EntityStore::from_json_str(
        r#"[{"id":"ok","alliance":"friendly","asset_type":"turret","position":{"x":0,"y":0}},
            {"id":"bad-pos","alliance":"friendly","asset_type":"sensor","position":{"x":"n/a","y":5}},
            {"id":7,"alliance":"friendly","asset_type":7,"vision_range":"far","x":200,"y":0},
            ["not", "a", "record"]]"#,
    )?;
    let circles = build_vision_map(&store, &VisionRadiusResolver::default());
    let summary: Vec<(&str, f64)> = circles.iter().map(|c| (c.id.as_str(), c.r)).collect();
    assert_eq!(summary, [("ok", 50.0), ("7", 25.0)]);
    Ok(())
}
