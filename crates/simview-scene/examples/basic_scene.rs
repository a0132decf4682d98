//! Two batch elements sharing one wavy terrain; a box rises and spins in
//! the first, stays put in the second.
//!
//! Run with `RUST_LOG=debug` to see registration and frame logs.

use simview_scene::{BodyTransform, GridData, SaveOptions, SceneConfig, Shape, SimulationScene};
use tracing_subscriber::EnvFilter;

const RESOLUTION: usize = 100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut scene = SimulationScene::new(SceneConfig::new(2, ["energy"], 0.1))?
        .with_save_options(SaveOptions::pretty());

    // One grid, broadcast to both batch elements
    let step = 10.0 / (RESOLUTION - 1) as f64;
    let mut heights = Vec::with_capacity(RESOLUTION * RESOLUTION);
    for row in 0..RESOLUTION {
        let y = -5.0 + row as f64 * step;
        for col in 0..RESOLUTION {
            let x = -5.0 + col as f64 * step;
            heights.push(0.2 * x.sin() * y.cos());
        }
    }
    let heights = GridData::new(vec![1, RESOLUTION, RESOLUTION], heights)?;
    let normals = GridData::uniform_normals(RESOLUTION, RESOLUTION, [0.0, 0.0, 1.0]);
    scene.create_terrain(&heights, &normals, (-5.0, 5.0), (-5.0, 5.0))?;

    scene.create_body("Box", Shape::cuboid(0.5, 0.5, 0.5), None)?;

    for t in 0..50 {
        let time = t as f64 * 0.1;
        let half_angle = time * 0.25;

        let transform = BodyTransform::new(
            "Box",
            vec![[0.0, 0.0, time * 0.5 + 1.0], [2.0, 0.0, 1.0]],
            vec![
                [half_angle.cos(), 0.0, 0.0, half_angle.sin()],
                [1.0, 0.0, 0.0, 0.0],
            ],
        );
        scene.add_state(
            time,
            vec![transform],
            [("energy", vec![10.0 - t as f64 * 0.1, 5.0])],
        )?;
    }

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "example_sim.json".to_string());
    scene.save(&output)?;
    println!("Simulation saved to {output}");

    Ok(())
}
