//! Region labelling as walls come and go.
//!
//! Run: cargo run --bin regions -- [seed]

use waymark_core::Vec2;
use waymark_demos::{HEIGHT, Scene, WIDTH, render};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);

    let scene = match Scene::new(seed) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    println!("scattered: {} regions", scene.grid.region_count());
    println!("{}", render(&scene.grid, &[]));

    scene.raise_wall(WIDTH / 3, Some(HEIGHT / 2));
    println!("wall with a door: {} regions", scene.grid.region_count());
    println!("{}", render(&scene.grid, &[]));

    scene.raise_wall(2 * WIDTH / 3, None);
    println!("second wall, no door: {} regions", scene.grid.region_count());
    println!("{}", render(&scene.grid, &[]));

    let west = Vec2::new(0.5, HEIGHT as f32 / 2.0);
    let east = Vec2::new(WIDTH as f32 - 0.5, HEIGHT as f32 / 2.0);
    println!(
        "west edge region {:?}, east edge region {:?}, reachable: {}",
        scene.grid.region_at(west, None),
        scene.grid.region_at(east, None),
        scene.grid.is_reachable(west, east)
    );
}
