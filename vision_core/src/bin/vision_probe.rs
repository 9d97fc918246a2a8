use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread;

use bevy::math::DVec2;
use bevy::prelude::App;
use crossbeam_channel::{unbounded, Receiver};
use tracing::{info, warn};

use vision_core::vision_systems::log_frame_summary;
use vision_core::{
    build_headless_app, run_frame, CameraState, CanvasSize, EntityStore, FogToggleState,
    MinimapFrame, PixelExtent, VisionConfigHandle, VisionMap,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let feed_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("VISION_FEED_PATH").ok())
        .map(PathBuf::from);

    let mut app = build_headless_app();
    app.add_systems(bevy::app::PostUpdate, log_frame_summary);

    if let Some(path) = feed_path.as_ref() {
        load_feed(&mut app, path);
    } else {
        warn!(
            target: "tactical_map::probe",
            "no feed path given; starting with an empty entity store"
        );
    }
    run_frame(&mut app);

    info!(target: "tactical_map::probe", "vision probe ready");

    let command_rx = spawn_stdin_reader();
    while let Ok(command) = command_rx.recv() {
        match command {
            Command::Frame(frames) => {
                for _ in 0..frames {
                    run_frame(&mut app);
                }
            }
            Command::Circles => {
                let vision = app.world.resource::<VisionMap>();
                for circle in vision.circles() {
                    info!(
                        target: "tactical_map::probe",
                        id = %circle.id,
                        x = circle.x,
                        y = circle.y,
                        r = circle.r,
                        "circle"
                    );
                }
            }
            Command::Visible { x, y } => {
                let visible = app.world.resource::<VisionMap>().is_visible(x, y);
                info!(target: "tactical_map::probe", x, y, visible, "query.visible");
            }
            Command::Project { x, y } => {
                let geometry = app.world.resource::<VisionConfigHandle>().0.minimap;
                let canvas = app.world.resource::<CanvasSize>().0;
                let screen = geometry.world_to_screen(DVec2::new(x, y), canvas);
                info!(
                    target: "tactical_map::probe",
                    x,
                    y,
                    screen_x = screen.x,
                    screen_y = screen.y,
                    "query.project"
                );
            }
            Command::Hit { x, y } => handle_hit(&mut app, DVec2::new(x, y)),
            Command::Camera { x, y, zoom } => {
                if zoom <= 0.0 {
                    warn!(target: "tactical_map::probe", zoom, "camera zoom must be positive");
                    continue;
                }
                *app.world.resource_mut::<CameraState>() = CameraState::new(x, y, zoom);
                run_frame(&mut app);
                log_viewport(&app);
            }
            Command::Canvas { width, height } => {
                app.world.resource_mut::<CanvasSize>().0 = PixelExtent::new(width, height);
                run_frame(&mut app);
                log_viewport(&app);
            }
            Command::ToggleFog => {
                let enabled = app.world.resource_mut::<FogToggleState>().toggle_fog();
                info!(target: "tactical_map::probe", enabled, "toggle.fog");
            }
            Command::ToggleMinimap => {
                let enabled = app.world.resource_mut::<FogToggleState>().toggle_minimap();
                info!(target: "tactical_map::probe", enabled, "toggle.minimap");
            }
            Command::Reload => match feed_path.as_ref() {
                Some(path) => {
                    load_feed(&mut app, path);
                    run_frame(&mut app);
                }
                None => warn!(target: "tactical_map::probe", "no feed path to reload"),
            },
        }
    }
}

#[derive(Debug)]
enum Command {
    Frame(u32),
    Circles,
    Visible { x: f64, y: f64 },
    Project { x: f64, y: f64 },
    Hit { x: f64, y: f64 },
    Camera { x: f64, y: f64, zoom: f64 },
    Canvas { width: f64, height: f64 },
    ToggleFog,
    ToggleMinimap,
    Reload,
}

fn spawn_stdin_reader() -> Receiver<Command> {
    let (sender, receiver) = unbounded::<Command>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(target: "tactical_map::probe", error = %err, "stdin read failed");
                    break;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match parse_command(trimmed) {
                Some(cmd) => {
                    if sender.send(cmd).is_err() {
                        break;
                    }
                }
                None => warn!(target: "tactical_map::probe", input = trimmed, "unrecognised command"),
            }
        }
    });
    receiver
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();
    match parts.next()? {
        "frame" => {
            let frames = parts.next().unwrap_or("1").parse().ok()?;
            Some(Command::Frame(frames))
        }
        "circles" => Some(Command::Circles),
        "visible" => {
            let x = parts.next()?.parse().ok()?;
            let y = parts.next()?.parse().ok()?;
            Some(Command::Visible { x, y })
        }
        "project" => {
            let x = parts.next()?.parse().ok()?;
            let y = parts.next()?.parse().ok()?;
            Some(Command::Project { x, y })
        }
        "hit" => {
            let x = parts.next()?.parse().ok()?;
            let y = parts.next()?.parse().ok()?;
            Some(Command::Hit { x, y })
        }
        "camera" => {
            let x = parts.next()?.parse().ok()?;
            let y = parts.next()?.parse().ok()?;
            let zoom = parts.next().unwrap_or("1").parse().ok()?;
            Some(Command::Camera { x, y, zoom })
        }
        "canvas" => {
            let width = parts.next()?.parse().ok()?;
            let height = parts.next()?.parse().ok()?;
            Some(Command::Canvas { width, height })
        }
        "fog" => Some(Command::ToggleFog),
        "minimap" => Some(Command::ToggleMinimap),
        "reload" => Some(Command::Reload),
        _ => None,
    }
}

fn load_feed(app: &mut App, path: &Path) {
    match EntityStore::from_file(path) {
        Ok(store) => {
            info!(
                target: "tactical_map::probe",
                path = %path.display(),
                entities = store.len(),
                "feed.loaded"
            );
            *app.world.resource_mut::<EntityStore>() = store;
        }
        Err(err) => {
            warn!(
                target: "tactical_map::probe",
                path = %path.display(),
                error = %err,
                "feed.load_failed"
            );
        }
    }
}

fn handle_hit(app: &mut App, screen: DVec2) {
    let geometry = app.world.resource::<VisionConfigHandle>().0.minimap;
    let canvas = app.world.resource::<CanvasSize>().0;
    match geometry.hit_test(screen, canvas) {
        Some(world) => {
            let zoom = app.world.resource::<CameraState>().zoom;
            *app.world.resource_mut::<CameraState>() = CameraState::new(world.x, world.y, zoom);
            info!(
                target: "tactical_map::probe",
                world_x = world.x,
                world_y = world.y,
                "minimap.hit recentred camera"
            );
            run_frame(app);
            log_viewport(app);
        }
        None => {
            info!(
                target: "tactical_map::probe",
                screen_x = screen.x,
                screen_y = screen.y,
                "minimap.miss"
            );
        }
    }
}

fn log_viewport(app: &App) {
    let frame = app.world.resource::<MinimapFrame>();
    match frame.viewport {
        Some(rect) => info!(
            target: "tactical_map::probe",
            x = rect.x,
            y = rect.y,
            w = rect.w,
            h = rect.h,
            "minimap.viewport"
        ),
        None => info!(target: "tactical_map::probe", "minimap.viewport disabled"),
    }
}
