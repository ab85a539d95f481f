use std::rc::Rc;

use avatar_lens_api_core::AvatarDescriptor;
use avatar_lens_motion_core::IdleFlag;
use avatar_lens_session::{AvatarInstance, AvatarSession, SessionConfig};
use avatar_lens_test_fixtures::{avatars, configs};

fn showcase() -> AvatarDescriptor {
    avatars::load("expression-showcase").expect("showcase fixture")
}

fn session(config: &str) -> (AvatarSession, IdleFlag) {
    let cfg: SessionConfig = configs::load(config).expect("config fixture");
    let flag = IdleFlag::new();
    (AvatarSession::new(cfg, Box::new(flag.clone())), flag)
}

#[test]
fn binding_the_showcase_builds_catalog_and_starts_motion() {
    let (mut session, flag) = session("session-default");
    let avatar = showcase();
    let instance = AvatarInstance::new(&avatar);
    let catalog = session.bind_model(&avatar, instance.clone());
    assert_eq!(catalog.len(), 21);
    assert_eq!(session.motion_chain_count(), 2);
    assert!(flag.is_set());
    assert!(session.selection().is_none());

    let fist = session.select_clip("Fist").expect("Fist is listed");
    let paths: Vec<_> = fist.entries.iter().map(|e| e.menu_path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["Hands/Fist", "Hands/Peace", "More Hands/Fist", "More Hands/Peace"]
    );

    let frame = session.tick(1.0 / 60.0);
    assert_eq!(frame.motion.updated, 1);
    assert_eq!(frame.poses.len(), 2);
}

#[test]
fn destroying_the_model_stops_motion_without_touching_the_catalog() {
    let (mut session, flag) = session("session-default");
    let avatar = showcase();
    let instance = AvatarInstance::new(&avatar);
    session.bind_model(&avatar, instance.clone());
    session.tick(1.0 / 60.0);

    instance.destroy();
    let frame = session.tick(1.0 / 60.0);
    assert_eq!(frame.motion.evicted, 1);
    assert_eq!(frame.motion.updated, 0);
    assert!(frame.poses.is_empty());
    assert!(!session.is_motion_running());
    assert!(!flag.is_set());
    assert_eq!(session.catalog().len(), 21);

    // Later frames are quiet.
    let frame = session.tick(1.0 / 60.0);
    assert_eq!(frame.motion.evicted, 0);
    assert_eq!(frame.motion.updated, 0);
}

#[test]
fn rebinding_replaces_the_solver() {
    let (mut session, _flag) = session("session-default");
    let avatar = showcase();
    let first = AvatarInstance::new(&avatar);
    session.bind_model(&avatar, first.clone());
    let second = AvatarInstance::new(&avatar);
    session.bind_model(&avatar, second);

    let frame = session.tick(1.0 / 60.0);
    assert_eq!(frame.motion.updated, 1);
    // The first model is no longer referenced by any solver.
    assert_eq!(Rc::strong_count(&first), 1);
}

#[test]
fn disabling_motion_stops_the_loop_and_reenabling_restarts_it() {
    let (mut session, flag) = session("session-default");
    let avatar = showcase();
    session.bind_model(&avatar, AvatarInstance::new(&avatar));

    session.set_motion_enabled(false);
    assert!(!flag.is_set());
    let frame = session.tick(1.0 / 60.0);
    assert_eq!(frame.motion.updated, 0);
    assert!(frame.poses.is_empty());

    session.set_motion_enabled(true);
    assert!(flag.is_set());
    assert_eq!(session.tick(1.0 / 60.0).motion.updated, 1);
}

#[test]
fn coarse_config_auto_selects_and_clamps() {
    let (mut session, _flag) = session("session-coarse-step");
    assert!(session.config().auto_select_first_clip);
    assert!((session.config().motion.simulation_step - 0.05).abs() < 1e-6);

    let json = avatars::json("expression-showcase").expect("fixture json");
    let instance = session.bind_json(&json).expect("bind");
    assert_eq!(instance.name(), "Showcase");
    let selected = session.selection().expect("auto-selected");
    assert_eq!(selected.clip_name, "HatOff");
    assert_eq!(selected.entries[0].menu_path, "Hat");
}

#[test]
fn empty_avatar_binds_cleanly() {
    let (mut session, flag) = session("session-coarse-step");
    let avatar: AvatarDescriptor = avatars::load("empty-slots").expect("fixture");
    let catalog = session.bind_model(&avatar, AvatarInstance::new(&avatar));
    assert!(catalog.is_empty());
    assert!(session.selection().is_none());
    assert!(!flag.is_set());
}

#[test]
fn shutdown_clears_everything() {
    let (mut session, flag) = session("session-default");
    let avatar = showcase();
    session.bind_model(&avatar, AvatarInstance::new(&avatar));
    session.shutdown();
    assert!(session.bound_avatar().is_none());
    assert!(session.catalog().is_empty());
    assert!(!flag.is_set());
}
