use crate::fixture::{CountingUploader, FakeLoader, MemoryAssets};
use crate::{
    AnimationEvent, AnimationEventKind, Error, InstanceConfig, Size, SkeletonInstance,
    TextureCache, WidgetGeometry, DEFAULT_MIX,
};
use std::time::{Duration, Instant};

struct World {
    loader: FakeLoader,
    assets: MemoryAssets,
    textures: TextureCache,
    uploader: CountingUploader,
}

fn world(animations: &[(&'static str, f32)]) -> World {
    World {
        loader: FakeLoader::new(animations),
        assets: MemoryAssets::with(&[
            ("hero.atlas", b"atlas"),
            ("hero.skel", b"skel"),
            ("page.png", b"png"),
        ]),
        textures: TextureCache::new(),
        uploader: CountingUploader::default(),
    }
}

fn config(action: Option<&'static str>, looped: bool) -> InstanceConfig<'static> {
    InstanceConfig {
        atlas_path: "hero.atlas",
        skeleton_path: "hero.skel",
        action,
        looped,
        time_scale: 1.0,
        scale_x: 1.0,
        scale_y: 1.0,
        geometry: WidgetGeometry::new(10.0, 20.0, 100.0, 50.0),
        viewport: Size::new(800.0, 600.0),
    }
}

fn create(world: &mut World, config: &InstanceConfig<'_>, now: Instant) -> SkeletonInstance {
    SkeletonInstance::create(
        config,
        &world.loader,
        &mut world.assets,
        &mut world.textures,
        &mut world.uploader,
        now,
    )
    .expect("instance should construct")
}

fn kinds(events: &[AnimationEvent]) -> Vec<AnimationEventKind> {
    events.iter().map(|e| e.kind).collect()
}

fn at(t0: Instant, millis: u64) -> Instant {
    t0 + Duration::from_millis(millis)
}

#[test]
fn update_then_draw_produces_render_commands() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut instance = create(&mut world, &config(Some("idle"), true), t0);

    let mut events = Vec::new();
    instance.update(at(t0, 16), &mut events);
    let commands = instance.draw();

    assert_eq!(commands.len(), 1);
    assert!(!commands[0].texture.is_null());
}

#[test]
fn draw_is_idempotent_between_updates() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut instance = create(&mut world, &config(Some("idle"), true), t0);

    let mut events = Vec::new();
    instance.update(at(t0, 16), &mut events);

    let first = instance.draw().to_vec();
    let second = instance.draw().to_vec();
    assert_eq!(first, second);
}

#[test]
fn construction_uses_the_default_blend_duration() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let _instance = create(&mut world, &config(None, true), t0);

    assert_eq!(world.loader.last_mix.get(), DEFAULT_MIX);
}

#[test]
fn chained_actions_play_in_order_and_only_the_final_entry_ends() {
    let t0 = Instant::now();
    let mut world = world(&[("walk", 1.0), ("idle", 0.5)]);
    let mut instance = create(&mut world, &config(None, true), t0);
    instance.set_actions("walk,idle", false).unwrap();

    let mut events = Vec::new();
    instance.update(at(t0, 500), &mut events);
    assert_eq!(kinds(&events), vec![AnimationEventKind::Started]);
    assert_eq!(events[0].animation, "walk");

    // "walk" completes mid-span; its completion is an internal mix
    // transition, so only "idle" starting is observable.
    events.clear();
    instance.update(at(t0, 1200), &mut events);
    assert_eq!(kinds(&events), vec![AnimationEventKind::Started]);
    assert_eq!(events[0].animation, "idle");

    events.clear();
    instance.update(at(t0, 1800), &mut events);
    assert_eq!(kinds(&events), vec![AnimationEventKind::Ended]);
    assert_eq!(events[0].animation, "idle");

    // Finished and non-looping: no further events.
    events.clear();
    instance.update(at(t0, 3000), &mut events);
    assert!(events.is_empty());
}

#[test]
fn looping_action_fires_looped_each_cycle_and_never_ended() {
    let t0 = Instant::now();
    let mut world = world(&[("run", 1.0)]);
    let mut instance = create(&mut world, &config(None, true), t0);
    instance.set_actions("run", true).unwrap();

    let mut events = Vec::new();
    instance.update(at(t0, 2500), &mut events);
    assert_eq!(
        kinds(&events),
        vec![
            AnimationEventKind::Started,
            AnimationEventKind::Looped,
            AnimationEventKind::Looped,
        ]
    );

    events.clear();
    instance.update(at(t0, 3500), &mut events);
    assert_eq!(kinds(&events), vec![AnimationEventKind::Looped]);
    assert!(events.iter().all(|e| e.kind != AnimationEventKind::Ended));
}

#[test]
fn looping_chain_fires_looped_for_every_cycle() {
    let t0 = Instant::now();
    let mut world = world(&[("walk", 1.0), ("idle", 0.5)]);
    let mut instance = create(&mut world, &config(None, true), t0);
    instance.set_actions("walk,idle", true).unwrap();

    // The first entry loops forever, so it never hands over to "idle",
    // but every finished cycle is still a lifecycle event.
    let mut events = Vec::new();
    instance.update(at(t0, 2500), &mut events);
    assert_eq!(
        kinds(&events),
        vec![
            AnimationEventKind::Started,
            AnimationEventKind::Looped,
            AnimationEventKind::Looped,
        ]
    );
    assert!(events.iter().skip(1).all(|e| e.animation == "walk"));
}

#[test]
fn failed_chain_extension_keeps_events_for_the_playing_animation() {
    let t0 = Instant::now();
    let mut world = world(&[("walk", 1.0), ("idle", 0.5)]);
    let mut instance = create(&mut world, &config(None, true), t0);
    instance.set_actions("idle", false).unwrap();

    // "walk" is applied to track 0 before "missing" is rejected, so the
    // instance must keep treating "walk" as the active chain.
    assert!(matches!(
        instance.set_actions("walk,missing", false),
        Err(Error::UnknownAnimation { .. })
    ));

    let mut events = Vec::new();
    instance.update(at(t0, 1500), &mut events);
    assert_eq!(
        kinds(&events),
        vec![AnimationEventKind::Started, AnimationEventKind::Ended]
    );
    assert_eq!(events[1].animation, "walk");
}

#[test]
fn every_chained_entry_inherits_the_loop_flag() {
    let t0 = Instant::now();
    let mut world = world(&[("walk", 1.0), ("idle", 0.5)]);
    let mut instance = create(&mut world, &config(None, true), t0);
    instance.set_actions("walk,idle", true).unwrap();

    let state = world.loader.state();
    let track = &state.borrow().track;
    assert_eq!(track.len(), 2);
    assert!(track.iter().all(|e| e.looped));
}

#[test]
fn zero_time_scale_freezes_the_pose() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 10.0)]);
    let mut instance = create(&mut world, &config(Some("idle"), true), t0);

    let mut events = Vec::new();
    instance.update(at(t0, 500), &mut events);
    let state = world.loader.state();
    let (pose, skeleton_time) = {
        let s = state.borrow();
        (s.pose, s.skeleton_time)
    };

    instance.set_time_scale(0.0).unwrap();
    instance.update(at(t0, 5000), &mut events);

    let s = state.borrow();
    assert_eq!(s.pose, pose);
    assert_eq!(s.skeleton_time, skeleton_time);
}

#[test]
fn negative_time_scale_is_rejected() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut instance = create(&mut world, &config(None, true), t0);

    assert!(matches!(
        instance.set_time_scale(-1.0),
        Err(Error::InvalidTimeScale { .. })
    ));
    assert_eq!(instance.time_scale(), 1.0);
}

#[test]
fn negative_time_scale_in_config_aborts_construction() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut cfg = config(None, true);
    cfg.time_scale = -0.5;

    let result = SkeletonInstance::create(
        &cfg,
        &world.loader,
        &mut world.assets,
        &mut world.textures,
        &mut world.uploader,
        t0,
    );
    assert!(matches!(result, Err(Error::InvalidTimeScale { .. })));
}

#[test]
fn world_placement_is_idempotent() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut instance = create(&mut world, &config(None, true), t0);
    let state = world.loader.state();

    let geometry = WidgetGeometry::new(10.0, 20.0, 100.0, 50.0);
    let viewport = Size::new(800.0, 600.0);
    instance.set_world_placement(&geometry, viewport, 1.0, 1.0);
    let first = {
        let s = state.borrow();
        (s.position, s.scale)
    };
    instance.set_world_placement(&geometry, viewport, 1.0, 1.0);
    let second = {
        let s = state.borrow();
        (s.position, s.scale)
    };

    assert_eq!(first, second);
    assert_eq!(first.0, (60.0, 70.0));
    assert_eq!(first.1, (100.0 / 800.0, 50.0 / 600.0));
}

#[test]
fn missing_asset_aborts_construction_before_parsing() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut cfg = config(None, true);
    cfg.skeleton_path = "absent.skel";

    let result = SkeletonInstance::create(
        &cfg,
        &world.loader,
        &mut world.assets,
        &mut world.textures,
        &mut world.uploader,
        t0,
    );
    assert!(matches!(result, Err(Error::AssetLoad { .. })));
    assert_eq!(world.loader.calls.get(), 0);
}

#[test]
fn parse_failure_aborts_construction() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    world.loader.fail_parse = true;

    let result = SkeletonInstance::create(
        &config(None, true),
        &world.loader,
        &mut world.assets,
        &mut world.textures,
        &mut world.uploader,
        t0,
    );
    assert!(matches!(result, Err(Error::Parse { .. })));
}

#[test]
fn unknown_animation_is_rejected() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut instance = create(&mut world, &config(None, true), t0);

    assert!(matches!(
        instance.set_actions("fly", true),
        Err(Error::UnknownAnimation { .. })
    ));
}

#[test]
fn empty_action_names_are_rejected() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut instance = create(&mut world, &config(None, true), t0);

    assert!(matches!(
        instance.set_actions("", true),
        Err(Error::BadParams { .. })
    ));
    assert!(matches!(
        instance.set_actions(" , ", true),
        Err(Error::BadParams { .. })
    ));
}

#[test]
fn atlas_page_textures_resolve_through_the_cache_at_load() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let _instance = create(&mut world, &config(None, true), t0);

    assert_eq!(world.uploader.upload_count("page.png"), 1);
    assert!(world.textures.get("page.png").is_some());
}

#[test]
fn each_update_recomputes_world_transforms_once() {
    let t0 = Instant::now();
    let mut world = world(&[("idle", 1.0)]);
    let mut instance = create(&mut world, &config(Some("idle"), true), t0);
    let state = world.loader.state();

    let mut events = Vec::new();
    instance.update(at(t0, 16), &mut events);
    instance.update(at(t0, 32), &mut events);

    assert_eq!(state.borrow().world_updates, 2);
}
