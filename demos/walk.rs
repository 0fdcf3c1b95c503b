//! Random path and direction queries over a scattered scene.
//!
//! Run: cargo run --bin walk -- [seed]
//! Set RUST_LOG=debug to see grid passes and rejected queries.

use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use waymark_core::Vec2;
use waymark_demos::{Scene, describe, render};
use waymark_paths::SearchOptions;
use waymark_tracker::{CollinearSimplifier, PathModifier, PointCallback, TrackerError};

const QUERIES: usize = 4;
const FRAME: Duration = Duration::from_millis(16);
const PATIENCE: Duration = Duration::from_secs(5);

enum Outcome {
    Path(usize, Vec<Vec2>),
    Point(Vec2),
    Failed(usize, TrackerError),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let mut scene = match Scene::new(seed) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let modifiers: Vec<Arc<dyn PathModifier<Vec2>>> = vec![Arc::new(CollinearSimplifier::default())];
    let (tx, rx) = mpsc::channel();
    let mut expected = 0;

    for query in 0..QUERIES {
        let (Some(from), Some(to)) = (scene.random_walkable(), scene.random_walkable()) else {
            break;
        };
        let (done, failed) = (tx.clone(), tx.clone());
        let handle = scene.tracker.search_path(
            scene.ground,
            from,
            to,
            move |path| {
                let _ = done.send(Outcome::Path(query, path));
            },
            move |err| {
                let _ = failed.send(Outcome::Failed(query, err));
            },
            &modifiers,
            SearchOptions::default(),
        );
        if handle.is_some() {
            expected += 1;
        }
    }

    // One farthest-point probe heading west.
    if let Some(from) = scene.random_walkable() {
        let (point, failed) = (tx.clone(), tx.clone());
        let on_point: PointCallback<Vec2> = Box::new(move |p| {
            let _ = point.send(Outcome::Point(p));
        });
        let handle = scene.tracker.search_by_direction(
            scene.ground,
            from,
            Vec2::new(-1.0, 0.0),
            12.0,
            |_| {},
            move |err| {
                let _ = failed.send(Outcome::Failed(QUERIES, err));
            },
            &[],
            Some(on_point),
            SearchOptions::default(),
        );
        if handle.is_some() {
            expected += 1;
        }
    }
    drop(tx);

    let deadline = Instant::now() + PATIENCE;
    let mut received = 0;
    while received < expected && Instant::now() < deadline {
        scene.tracker.tick();
        for outcome in rx.try_iter() {
            received += 1;
            match outcome {
                Outcome::Path(query, path) => {
                    println!("query {query}: {}", describe(&path));
                    println!("{}", render(&scene.grid, &path));
                }
                Outcome::Point(p) => println!("farthest west: ({:.1}, {:.1})", p.x, p.y),
                Outcome::Failed(query, err) => println!("query {query} failed: {err}"),
            }
        }
        thread::sleep(FRAME);
    }
    if received < expected {
        eprintln!("{} queries still pending", expected - received);
    }
}
