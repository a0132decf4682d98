//! End-to-end scene tests
//!
//! Build a scene, record frames, save, then read the document back through
//! the serializer and through the viewer feed.

use proptest::prelude::*;
use serde_json::json;

use crate::*;

fn two_batch_scene() -> SimulationScene {
    let mut scene = SimulationScene::new(SceneConfig::new(2, ["energy"], 0.1)).unwrap();
    scene
        .create_terrain(
            &GridData::filled(vec![1, 4, 4], 0.0),
            &GridData::uniform_normals(4, 4, [0.0, 0.0, 1.0]),
            (-2.0, 2.0),
            (-2.0, 2.0),
        )
        .unwrap();
    scene
        .create_body("Box", Shape::cuboid(0.5, 0.5, 0.5), None)
        .unwrap();
    scene
        .add_state(
            0.0,
            vec![BodyTransform::new(
                "Box",
                vec![[0.0, 0.0, 1.0], [2.0, 0.0, 1.0]],
                vec![[1.0, 0.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0]],
            )],
            [("energy", vec![10.0, 5.0])],
        )
        .unwrap();
    scene
}

#[test]
fn test_end_to_end_document() {
    let document = two_batch_scene().to_document().unwrap();
    let value = serde_json::to_value(&document).unwrap();

    let terrain = &value["model"]["terrain"];
    assert_eq!(terrain["isSingleton"], json!(true));
    assert_eq!(terrain["heightData"].as_array().unwrap().len(), 1);
    assert_eq!(terrain["heightData"][0].as_array().unwrap().len(), 16);
    assert_eq!(terrain["normals"][0][5], json!([0.0, 0.0, 1.0]));
    assert_eq!(
        terrain["dimensions"],
        json!({"sizeX": 4.0, "sizeY": 4.0, "resolutionX": 4, "resolutionY": 4})
    );

    assert_eq!(
        value["model"]["bodies"],
        json!([{"name": "Box", "shape": {"type": "box", "hx": 0.5, "hy": 0.5, "hz": 0.5}}])
    );

    let state = &value["states"][0];
    assert_eq!(state["time"], json!(0.0));
    assert_eq!(
        state["bodies"][0]["bodyTransform"],
        json!([[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0], [2.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]])
    );
    assert_eq!(state["energy"], json!([10.0, 5.0]));
}

#[test]
fn test_per_batch_terrain_document() {
    let mut scene = SimulationScene::new(SceneConfig::new(2, Vec::<String>::new(), 0.1)).unwrap();
    let heights = GridData::new(vec![2, 1, 2], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    let normals = GridData::uniform_normals(1, 2, [0.0, 0.0, 1.0]);
    scene
        .create_terrain(&heights, &normals, (0.0, 1.0), (0.0, 1.0))
        .unwrap();

    let terrain = scene.to_document().unwrap().model.terrain;
    assert!(!terrain.is_singleton);
    assert_eq!(terrain.height_data, vec![vec![0.0, 1.0], vec![2.0, 3.0]]);
    // Shared normals are repeated per batch element
    assert_eq!(terrain.normals.len(), 2);
    assert_eq!(terrain.bounds.min_z, 0.0);
    assert_eq!(terrain.bounds.max_z, 3.0);
}

#[test]
fn test_saved_document_served_to_viewer() {
    let mut scene = two_batch_scene();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    scene.save(&path).unwrap();

    let feed = DocumentFeed::open(&path).unwrap();
    let model = feed.respond(ViewerRequest::GetModel);
    assert_eq!(model.name, "model");
    assert_eq!(model.payload["simBatches"], json!(2));

    let states = feed.respond(ViewerRequest::GetStates);
    assert_eq!(states.name, "states");
    assert_eq!(states.payload.as_array().unwrap().len(), 1);

    std::fs::write(&path, "{ not json").unwrap();
    let broken = feed.respond(ViewerRequest::GetStates);
    assert!(broken.is_error());
    assert_eq!(broken.payload, json!({"message": "Error loading states"}));
}

#[test]
fn test_non_finite_frame_never_reaches_document() {
    let mut scene = two_batch_scene();
    let err = scene
        .add_state(
            0.1,
            vec![BodyTransform::upright(
                "Box",
                vec![[f64::NAN, 0.0, 0.0], [2.0, 0.0, 1.0]],
            )],
            [("energy", vec![f64::INFINITY, 5.0])],
        )
        .unwrap_err();
    assert!(matches!(err, SceneError::NonFiniteValue { .. }));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    scene.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("null"));
    let loaded = SceneSerializer::load(&path).unwrap();
    assert_eq!(loaded.states.len(), 1);
}

#[test]
fn test_feed_requires_document() {
    let dir = tempfile::tempdir().unwrap();
    let err = DocumentFeed::open(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, SceneError::DocumentNotFound(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_round_trip_within_tolerance(
        batch in 1usize..4,
        positions in prop::collection::vec(prop::array::uniform3(-1.0e3f64..1.0e3), 1..4),
        energy in -1.0e6f64..1.0e6,
    ) {
        let mut scene = SimulationScene::new(SceneConfig::new(batch, ["energy"], 0.01)).unwrap();
        scene
            .create_terrain(
                &GridData::filled(vec![2, 3], 0.25),
                &GridData::uniform_normals(2, 3, [0.0, 0.0, 1.0]),
                (0.0, 3.0),
                (0.0, 2.0),
            )
            .unwrap();
        scene.create_body("ball", Shape::sphere(0.5), None).unwrap();

        for (i, position) in positions.iter().enumerate() {
            scene
                .add_state(
                    i as f64 * 0.01,
                    vec![BodyTransform::upright("ball", vec![*position; batch])],
                    [("energy", vec![energy; batch])],
                )
                .unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        scene.save(&path).unwrap();
        let loaded = SceneSerializer::load(&path).unwrap();

        prop_assert_eq!(loaded.states.len(), positions.len());
        for (state, position) in loaded.states.iter().zip(&positions) {
            let transform = state.bodies[0].body_transform[batch - 1];
            for axis in 0..3 {
                prop_assert!((transform[axis] - position[axis]).abs() < 1e-9);
            }
            let value = state.scalars.get("energy").unwrap()[0];
            prop_assert!((value - energy).abs() < 1e-9);
        }
        prop_assert_eq!(loaded.model.sim_batches, batch);
    }
}
