//! Culling demo application
//!
//! Fills a transform world with drifting rocks, some carrying orbiting moons,
//! pans a camera across the field and reports what each frame would draw.
//! Visible sets are handed to a separate "render" thread as snapshots.
//!
//! Usage: `cull_demo [config.toml|config.ron]`

use std::sync::mpsc;
use std::thread;

use rand::Rng;
use scene2d::foundation::logging;
use scene2d::foundation::math::utils;
use scene2d::prelude::*;

const ROCK_COUNT: u64 = 400;
const FIELD_HALF_EXTENT: f64 = 2000.0;
const FRAME_COUNT: u32 = 120;
const FRAME_TIME: f64 = 1.0 / 60.0;

/// A gameplay object the world mirrors
struct Rock {
    id: ObjectId,
    position: Vec2,
    velocity: Vec2,
    spin: f64,
    radius: f64,
    parent: Option<ObjectId>,
}

impl SceneObject for Rock {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.position
    }
}

pub struct CullDemoApp {
    world: TransformWorld,
    camera: Camera2D,
    rocks: Vec<Rock>,
    elapsed: f64,
}

impl CullDemoApp {
    pub fn new(config: WorldConfig) -> Self {
        log::info!("Creating culling demo application...");
        Self {
            world: TransformWorld::with_config(config),
            camera: Camera2D::new(Vec2::zeros(), Vec2::new(1280.0, 720.0)),
            rocks: Vec::new(),
            elapsed: 0.0,
        }
    }

    pub fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Spawning {} rocks...", ROCK_COUNT);
        let mut rng = rand::thread_rng();

        for i in 0..ROCK_COUNT {
            let radius = rng.gen_range(4.0..40.0);
            let rock = Rock {
                id: ObjectId(i),
                position: Vec2::new(
                    rng.gen_range(-FIELD_HALF_EXTENT..FIELD_HALF_EXTENT),
                    rng.gen_range(-FIELD_HALF_EXTENT..FIELD_HALF_EXTENT),
                ),
                velocity: Vec2::new(rng.gen_range(-30.0..30.0), rng.gen_range(-30.0..30.0)),
                spin: utils::deg_to_rad(rng.gen_range(-90.0..90.0)),
                radius,
                parent: None,
            };
            self.add_rock(rock)?;

            // Every tenth rock gets a moon in its local frame
            if i % 10 == 0 {
                let moon = Rock {
                    id: ObjectId(ROCK_COUNT + i),
                    position: Vec2::new(radius * 3.0, 0.0),
                    velocity: Vec2::zeros(),
                    spin: 0.0,
                    radius: radius * 0.3,
                    parent: Some(ObjectId(i)),
                };
                self.add_rock(moon)?;
            }
        }

        log::info!("World holds {} objects", self.world.len());
        Ok(())
    }

    fn add_rock(&mut self, rock: Rock) -> Result<(), SceneError> {
        let r = rock.radius;
        self.world.register_with_bounds(&rock, Rect::local(-r, -r, 2.0 * r, 2.0 * r));
        if let Some(parent) = rock.parent {
            self.world.set_parent(rock.id, Some(parent))?;
        }
        self.rocks.push(rock);
        Ok(())
    }

    fn update(&mut self, dt: f64) -> Result<(), SceneError> {
        self.elapsed += dt;

        for rock in &mut self.rocks {
            if rock.parent.is_some() {
                continue;
            }
            rock.position += rock.velocity * dt;
            self.world.update(&*rock)?;
            if let Some(transform) = self.world.transform_mut(rock.id) {
                // Spinning the parent carries its moon around
                transform.set_rot(transform.rot() + rock.spin * dt);
            }
        }

        // Slow figure-eight pan
        let t = self.elapsed * 0.5;
        self.camera.set_position(Vec2::new(t.sin() * 800.0, (2.0 * t).sin() * 400.0));
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (tx, rx) = mpsc::channel::<FrameSnapshot>();

        let renderer = thread::spawn(move || {
            let mut frames = 0u32;
            let mut drawn = 0usize;
            for snapshot in rx {
                frames += 1;
                drawn += snapshot.visible.len();
                if let Some((nearest, matrix)) = snapshot.visible.first() {
                    log::trace!("Nearest {} at ({:.1}, {:.1})", nearest, matrix.m13, matrix.m23);
                }
            }
            (frames, drawn)
        });

        for frame in 0..FRAME_COUNT {
            self.update(FRAME_TIME)?;
            self.world.prepare();
            let snapshot = self.world.snapshot(&self.camera);

            if frame % 30 == 0 {
                let stats = snapshot.stats;
                log::info!(
                    "Frame {}: {}/{} visible, {} multiplications, max depth {}",
                    frame,
                    stats.visible_objects,
                    stats.total_objects,
                    stats.matrix_multiplications,
                    stats.max_depth
                );
                let corner = self.world.screen_to_world(&self.camera, Coord::screen(0.0, 0.0));
                log::debug!("Screen origin maps to world ({:.1}, {:.1})", corner.x, corner.y);
            }

            if tx.send(snapshot).is_err() {
                log::warn!("Render thread hung up early");
                break;
            }
        }
        drop(tx);

        let (frames, drawn) = renderer.join().map_err(|_| "render thread panicked")?;
        log::info!(
            "Rendered {} frames, {:.1} objects per frame on average",
            frames,
            drawn as f64 / f64::from(frames.max(1))
        );
        Ok(())
    }
}

fn load_config() -> Result<WorldConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading world configuration from {}", path);
            WorldConfig::load_from_file(&path)?
        }
        None => WorldConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("Starting scene2d culling demo");

    let config = load_config()?;
    let mut app = CullDemoApp::new(config);
    app.initialize()?;

    match app.run() {
        Ok(()) => {
            log::info!("Culling demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Culling demo failed: {:?}", e);
            Err(e)
        }
    }
}
