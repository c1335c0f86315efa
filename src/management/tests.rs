// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use crate::blackout::BlackoutOperation;
use crate::control_value::ControlValue;
use crate::controllable::scene::SceneItem;
use crate::controllable::{Controllable, EffectKind, Output};
use crate::error::GraphError;
use crate::filters::FilterKind;
use crate::source_value::Lane;
use crate::testutil::{engine, timing, Rig};
use crate::theatre::StockFixture;
use crate::transport::{InputMapping, MergeFunction, UniverseSpec};
use crate::trigger::{Transition, TransitionType, Trigger};

fn full() -> ControlValue {
    ControlValue::max()
}

#[test]
fn test_preset_through_source_value() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let preset = {
        let mut show = rig.management.show();
        let root = show.folders().root();
        let preset = show.add_preset_collection("full", root).unwrap();
        for input in 0..3 {
            show.add_preset_value(preset, Output::new(rig.control, input), full())
                .unwrap();
        }
        preset
    };
    rig.source(Output::new(preset, 0), full());
    rig.process_at(0.0);

    assert_eq!(rig.channels(3), vec![255, 255, 255]);
    assert_eq!(&rig.transport.output_values(0)[..3], &[255, 255, 255]);
    // Lane B was never set, so the preview is dark.
    assert_eq!(&rig.management.secondary_snapshot().universe(0)[..3], &[0, 0, 0]);
}

#[test]
fn test_lanes_feed_their_own_pass() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let sv = rig.source(Output::new(rig.control, 1), ControlValue::zero());
    rig.management
        .show()
        .set_source_value(sv, Lane::B, full(), 0.0)
        .unwrap();
    rig.process_at(0.0);

    assert_eq!(rig.channels(3), vec![0, 0, 0]);
    assert_eq!(&rig.management.secondary_snapshot().universe(0)[..3], &[0, 255, 0]);
}

#[test]
fn test_source_value_fade() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let sv = rig.source(Output::new(rig.control, 0), ControlValue::zero());
    rig.process_at(0.0);
    // One full range per second.
    rig.management
        .show()
        .set_source_value(sv, Lane::A, full(), 1.0)
        .unwrap();
    rig.process_at(0.0);
    assert_eq!(rig.channels(1), vec![0]);
    rig.process_at(500.0);
    assert_eq!(rig.channels(1), vec![128]);
    rig.process_at(5000.0);
    assert_eq!(rig.channels(1), vec![255]);
}

#[test]
fn test_cascading_remove() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let events = rig.management.show().subscribe();
    let (preset, chase, effect, other) = {
        let mut show = rig.management.show();
        let root = show.folders().root();
        let preset = show.add_preset_collection("preset", root).unwrap();
        show.add_preset_value(preset, Output::new(rig.control, 0), full())
            .unwrap();
        let chase = show
            .add_chase("chase", root, Trigger::default(), Transition::default())
            .unwrap();
        show.add_chase_step(chase, Output::new(preset, 0)).unwrap();
        let effect = show
            .add_effect("pulse", root, EffectKind::pulse(100.0, 100.0))
            .unwrap();
        show.add_effect_connection(effect, Output::new(chase, 0))
            .unwrap();
        let other = show.add_preset_collection("other", root).unwrap();
        (preset, chase, effect, other)
    };
    rig.source(Output::new(rig.control, 2), full());
    rig.source(Output::new(chase, 0), full());
    let survivor = rig.source(Output::new(other, 0), full());

    let removed = rig
        .management
        .show()
        .remove_controllable(rig.control)
        .unwrap();
    assert_eq!(removed.len(), 4);
    for id in [rig.control, preset, chase, effect] {
        assert!(removed.contains(&id));
    }

    let show = rig.management.show();
    assert_eq!(show.controllable_count(), 1);
    assert!(show.controllable(other).is_some());
    assert!(show.controllable(preset).is_none());
    assert_eq!(show.source_value_count(), 1);
    assert!(show.source_value(survivor).is_some());
    assert!(!show.has_cycle());

    let events: Vec<ShowEvent> = events.try_iter().collect();
    let removed_controllables = events
        .iter()
        .filter(|e| matches!(e, ShowEvent::ControllableRemoved(_)))
        .count();
    let removed_values = events
        .iter()
        .filter(|e| matches!(e, ShowEvent::SourceValueRemoved(_)))
        .count();
    assert_eq!(removed_controllables, 4);
    assert_eq!(removed_values, 2);
}

#[test]
fn test_cycles_are_rejected() {
    let (management, _) = engine(vec![UniverseSpec::output(1)]);
    let mut show = management.show();
    let root = show.folders().root();
    let a = show
        .add_chase("a", root, Trigger::default(), Transition::default())
        .unwrap();
    let b = show
        .add_chase("b", root, Trigger::default(), Transition::default())
        .unwrap();
    show.add_chase_step(a, Output::new(b, 0)).unwrap();

    assert_eq!(
        show.add_chase_step(b, Output::new(a, 0)),
        Err(GraphError::WouldCreateCycle {
            from: "b".into(),
            to: "a".into()
        })
    );
    assert!(matches!(
        show.add_chase_step(a, Output::new(a, 0)),
        Err(GraphError::WouldCreateCycle { .. })
    ));
    assert!(!show.has_cycle());
    assert_eq!(show.controllable(b).map(|n| n.controllable().outputs().len()), Some(0));
}

#[test]
fn test_edge_validation() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let mut show = rig.management.show();
    let root = show.folders().root();
    let preset = show.add_preset_collection("full", root).unwrap();

    assert_eq!(
        show.add_preset_value(preset, Output::new(rig.control, 3), full()),
        Err(GraphError::InputOutOfRange {
            name: "par".into(),
            input: 3,
            count: 3
        })
    );
    assert_eq!(
        show.add_chase_step(preset, Output::new(rig.control, 0)),
        Err(GraphError::WrongKind("full".into(), "chase"))
    );
    assert!(matches!(
        show.remove_output(preset, Output::new(rig.control, 0)),
        Err(GraphError::UnknownOutput { .. })
    ));
    show.add_preset_value(preset, Output::new(rig.control, 0), full())
        .unwrap();
    assert_eq!(show.remove_output(preset, Output::new(rig.control, 0)), Ok(()));
    assert!(matches!(
        show.add_source_value(Output::new(preset, 1)),
        Err(GraphError::InputOutOfRange { .. })
    ));
}

#[test]
fn test_names_are_unique_per_folder() {
    let (management, _) = engine(vec![UniverseSpec::output(1)]);
    let mut show = management.show();
    let root = show.folders().root();
    let a = show.add_preset_collection("a", root).unwrap();
    assert_eq!(
        show.add_preset_collection("a", root).err(),
        Some(GraphError::DuplicateName("a".into()))
    );
    assert_eq!(
        show.add_folder(root, "a").err(),
        Some(GraphError::DuplicateName("a".into()))
    );

    let front = show.add_folder(root, "front").unwrap();
    let nested = show.add_preset_collection("a", front).unwrap();
    assert_eq!(show.path_of(nested).unwrap(), "/front/a");
    assert_eq!(show.find_by_path("/front/a"), Some(nested));
    assert_eq!(show.find_by_path("a"), Some(a));
    assert_eq!(show.find_by_path("/back/a"), None);

    assert_eq!(
        show.move_controllable(a, front),
        Err(GraphError::DuplicateName("a".into()))
    );
    show.rename_controllable(a, "b").unwrap();
    show.move_controllable(a, front).unwrap();
    assert_eq!(show.path_of(a).unwrap(), "/front/b");

    assert!(matches!(
        show.remove_folder(front),
        Err(GraphError::FolderNotEmpty(_))
    ));
    show.remove_controllable(a).unwrap();
    show.remove_controllable(nested).unwrap();
    assert_eq!(show.remove_folder(front), Ok(()));
}

#[test]
fn test_blackout_leaves_positions() {
    let rig = Rig::new(StockFixture::MovingHead16Bit);
    for input in 0..6 {
        rig.source(Output::new(rig.control, input), full());
    }
    rig.process_at(0.0);
    assert_eq!(rig.channels(8), vec![255; 8]);

    rig.management.show().blackout(0.0);
    rig.process_at(10.0);
    assert_eq!(rig.channels(8), vec![0, 255, 255, 255, 255, 0, 0, 0]);

    // Two full ranges per second, so halfway after 250ms.
    rig.management.show().restore(2.0);
    rig.process_at(260.0);
    assert_eq!(rig.channels(1), vec![128]);
    rig.process_at(1000.0);
    assert_eq!(rig.channels(1), vec![255]);
}

#[test]
fn test_input_universe_merge() {
    let (management, transport) = engine(vec![
        UniverseSpec::output(1),
        UniverseSpec::input(
            2,
            Some(InputMapping {
                merge_universe: 0,
                function: MergeFunction::Htp,
            }),
        ),
    ]);
    let control = {
        let mut show = management.show();
        let root = show.folders().root();
        let fixture = show
            .add_fixture("par", StockFixture::RgbLight3Ch, 0, 0)
            .unwrap();
        show.add_fixture_control("par", root, fixture).unwrap()
    };
    {
        let mut show = management.show();
        let sv = show.add_source_value(Output::new(control, 0)).unwrap();
        show.set_source_value(sv, Lane::A, ControlValue::from_ratio(0.5), 0.0)
            .unwrap();
    }
    transport.set_input_values(1, &[100, 200]);
    management.process(&timing(0.0));

    let snapshot = management.primary_snapshot();
    assert_eq!(&snapshot.universe(0)[..3], &[128, 200, 0]);
    assert_eq!(&snapshot.universe(1)[..2], &[100, 200]);
    // Only the output universe goes to the transport.
    assert_eq!(transport.sent_count(), 1);
    assert_eq!(&transport.output_values(0)[..3], &[128, 200, 0]);
}

#[test]
fn test_preset_from_current() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let half = ControlValue::from_ratio(0.5);
    rig.source(Output::new(rig.control, 0), half);
    rig.source(Output::new(rig.control, 2), full());
    rig.process_at(0.0);

    let mut show = rig.management.show();
    let root = show.folders().root();
    let preset = show.add_preset_collection("look", root).unwrap();
    assert_eq!(show.preset_from_current(preset), Ok(2));
    let Some(Controllable::PresetCollection(collection)) =
        show.controllable(preset).map(|n| n.controllable())
    else {
        panic!("not a preset");
    };
    let targets: Vec<(Output, ControlValue)> = collection
        .values()
        .iter()
        .map(|v| (v.target, v.value))
        .collect();
    assert_eq!(
        targets,
        vec![
            (Output::new(rig.control, 0), half),
            (Output::new(rig.control, 2), full())
        ]
    );
}

#[test]
fn test_chase_between_presets() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let chase = {
        let mut show = rig.management.show();
        let root = show.folders().root();
        let red = show.add_preset_collection("red", root).unwrap();
        show.add_preset_value(red, Output::new(rig.control, 0), full())
            .unwrap();
        let blue = show.add_preset_collection("blue", root).unwrap();
        show.add_preset_value(blue, Output::new(rig.control, 2), full())
            .unwrap();
        let chase = show
            .add_chase(
                "chase",
                root,
                Trigger::Delay { ms: 100.0 },
                Transition::new(0.0, TransitionType::Fade),
            )
            .unwrap();
        show.add_chase_step(chase, Output::new(red, 0)).unwrap();
        show.add_chase_step(chase, Output::new(blue, 0)).unwrap();
        chase
    };
    rig.source(Output::new(chase, 0), full());

    rig.process_at(50.0);
    assert_eq!(rig.channels(3), vec![255, 0, 0]);
    rig.process_at(150.0);
    assert_eq!(rig.channels(3), vec![0, 0, 255]);
    rig.process_at(250.0);
    assert_eq!(rig.channels(3), vec![255, 0, 0]);
}

#[test]
fn test_scene_playback() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let scene = {
        let mut show = rig.management.show();
        let root = show.folders().root();
        let scene = show.add_scene("scene", root).unwrap();
        show.add_scene_item(
            scene,
            SceneItem::control(
                0,
                1000,
                Output::new(rig.control, 0),
                ControlValue::zero(),
                full(),
            ),
        )
        .unwrap();
        show.add_scene_item(scene, SceneItem::blackout(2000, BlackoutOperation::Blackout, 0.0))
            .unwrap();
        assert!(matches!(
            show.add_scene_item(
                scene,
                SceneItem::control(0, 10, Output::new(rig.control, 9), full(), full())
            ),
            Err(GraphError::InputOutOfRange { .. })
        ));
        scene
    };
    rig.process_at(0.0);
    rig.management.show().start_scene(scene).unwrap();

    rig.process_at(500.0);
    assert_eq!(rig.channels(1), vec![128]);
    assert_eq!(&rig.management.secondary_snapshot().universe(0)[..1], &[128]);

    rig.process_at(2100.0);
    assert_eq!(rig.channels(1), vec![0]);
    assert_eq!(rig.management.show().blackout_state().level(), 0.0);

    rig.management.show().stop_scene(scene).unwrap();
    assert!(matches!(
        rig.management.show().start_scene(rig.control),
        Err(GraphError::WrongKind(..))
    ));
}

#[test]
fn test_filter_changes_inputs() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let events = rig.management.show().subscribe();
    rig.source(Output::new(rig.control, 0), full());
    let dropped = rig.source(Output::new(rig.control, 2), full());

    rig.management
        .show()
        .add_filter(rig.control, FilterKind::Monochrome)
        .unwrap();
    assert_eq!(
        events.try_recv().ok(),
        Some(ShowEvent::SourceValueRemoved(dropped))
    );
    rig.process_at(0.0);
    assert_eq!(rig.channels(3), vec![255, 255, 255]);

    assert_eq!(rig.management.show().remove_filter(rig.control), Ok(true));
    assert_eq!(rig.management.show().remove_filter(rig.control), Ok(false));
}

#[test]
fn test_remove_fixture() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let events = rig.management.show().subscribe();
    rig.management.show().remove_fixture(rig.fixture).unwrap();

    let events: Vec<ShowEvent> = events.try_iter().collect();
    assert_eq!(
        events,
        vec![
            ShowEvent::ControllableRemoved(rig.control),
            ShowEvent::FixtureRemoved(rig.fixture)
        ]
    );
    let show = rig.management.show();
    assert_eq!(show.theatre().fixture_count(), 0);
    assert_eq!(show.controllable_count(), 0);
}

#[test]
fn test_sync_chase_follows_ticks() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let chase = {
        let mut show = rig.management.show();
        let root = show.folders().root();
        let chase = show
            .add_chase(
                "chase",
                root,
                Trigger::Sync { syncs: 1 },
                Transition::default(),
            )
            .unwrap();
        show.add_chase_step(chase, Output::new(rig.control, 0)).unwrap();
        show.add_chase_step(chase, Output::new(rig.control, 1)).unwrap();
        chase
    };
    rig.source(Output::new(chase, 0), full());

    rig.management.tick();
    assert_eq!(rig.channels(3), vec![255, 0, 0]);
    rig.management.tick();
    assert_eq!(rig.channels(3), vec![0, 255, 0]);
    rig.management.tick();
    assert_eq!(rig.channels(3), vec![255, 0, 0]);
}

#[test]
fn test_readers_see_whole_ticks() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    let chase = {
        let mut show = rig.management.show();
        let root = show.folders().root();
        let white = show.add_preset_collection("white", root).unwrap();
        for input in 0..3 {
            show.add_preset_value(white, Output::new(rig.control, input), full())
                .unwrap();
        }
        let dark = show.add_preset_collection("dark", root).unwrap();
        let chase = show
            .add_chase("chase", root, Trigger::Sync { syncs: 1 }, Transition::default())
            .unwrap();
        show.add_chase_step(chase, Output::new(white, 0)).unwrap();
        show.add_chase_step(chase, Output::new(dark, 0)).unwrap();
        chase
    };
    rig.source(Output::new(chase, 0), full());
    rig.management.run().unwrap();

    // Every tick flips all three channels together, so a snapshot mixing two
    // ticks would show unequal channels.
    let seen: Vec<u8> = thread::scope(|scope| {
        let readers: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    let deadline = Instant::now() + Duration::from_millis(150);
                    let mut seen = Vec::new();
                    while Instant::now() < deadline {
                        let snapshot = rig.management.primary_snapshot();
                        let Some(channels) = snapshot.universe(0).get(..3) else {
                            continue;
                        };
                        assert!(
                            channels.iter().all(|c| *c == channels[0]),
                            "channels from different ticks: {:?}",
                            channels
                        );
                        seen.push(channels[0]);
                    }
                    seen
                })
            })
            .collect();
        readers
            .into_iter()
            .flat_map(|reader| reader.join().unwrap())
            .collect()
    });
    rig.management.stop();

    assert!(seen.contains(&0));
    assert!(seen.contains(&255));
}

#[test]
fn test_run_once() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    rig.source(Output::new(rig.control, 0), full());
    rig.management.run().unwrap();
    assert!(matches!(
        rig.management.run(),
        Err(EngineError::AlreadyRunning)
    ));

    thread::sleep(Duration::from_millis(100));
    assert!(rig.transport.sent_count() > 0);
    assert_eq!(rig.transport.output_values(0)[0], 255);

    rig.management.stop();
    let sent = rig.transport.sent_count();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(rig.transport.sent_count(), sent);
}

#[test]
fn test_failed_spawn_can_be_retried() {
    let rig = Rig::new(StockFixture::RgbLight3Ch);
    // No address space can hold this stack.
    let oversized = thread::Builder::new().stack_size(1 << 62);
    assert!(matches!(
        rig.management.run_on(oversized),
        Err(EngineError::Spawn(_))
    ));
    assert!(!rig.management.is_running());

    rig.management.run().unwrap();
    assert!(rig.management.is_running());
    rig.management.stop();
}
