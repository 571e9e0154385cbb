//! softraster viewer
//!
//! Usage: softraster [SCENE.ron] [--png OUT.png] [--wireframe] [--spin] [--verbose]
//!
//! Without `--png` the scene is shown in a window, re-rendered every frame
//! on the CPU and blitted as a texture. With `--png` one frame is written
//! to disk and no window is opened.

use std::path::{Path, PathBuf};

use macroquad::prelude::{
    clear_background, draw_text, draw_texture_ex, get_frame_time, is_key_pressed, next_frame,
    screen_height, screen_width, vec2, Conf, DrawTextureParams, FilterMode, KeyCode, Texture2D,
    BLACK, WHITE,
};
use softraster::logging::{init_logging, LoggingConfig};
use softraster::math::{EulerRotation, RotationOrder};
use softraster::scene::{load_scene, load_scene_from_str, LoadedScene};
use softraster::{NodeId, NodeKind, Rasterizer, RenderTarget, VERSION};

const DEMO_SCENE: &str = include_str!("../scenes/demo.ron");

/// Window pixels per framebuffer pixel at startup
const WINDOW_SCALE: usize = 3;

/// Radians per second when spinning
const SPIN_SPEED: f64 = 0.8;

#[derive(Debug, Default)]
struct Args {
    scene: Option<PathBuf>,
    png: Option<PathBuf>,
    wireframe: bool,
    spin: bool,
    verbose: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--png" => {
                    let path = args.next().ok_or("--png needs an output path")?;
                    parsed.png = Some(PathBuf::from(path));
                }
                "--wireframe" => parsed.wireframe = true,
                "--spin" => parsed.spin = true,
                "--verbose" | "-v" => parsed.verbose = true,
                "--help" | "-h" => return Err(usage()),
                flag if flag.starts_with('-') => return Err(format!("unknown flag {}\n{}", flag, usage())),
                path => {
                    if parsed.scene.is_some() {
                        return Err(format!("more than one scene given\n{}", usage()));
                    }
                    parsed.scene = Some(PathBuf::from(path));
                }
            }
        }
        Ok(parsed)
    }
}

fn usage() -> String {
    "usage: softraster [SCENE.ron] [--png OUT.png] [--wireframe] [--spin] [--verbose]".to_string()
}

fn window_conf(width: usize, height: usize) -> Conf {
    Conf {
        window_title: format!("softraster v{}", VERSION),
        window_width: (width * WINDOW_SCALE) as i32,
        window_height: (height * WINDOW_SCALE) as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn main() {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    init_logging(if args.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    });

    let file = match &args.scene {
        Some(path) => {
            log::info!("Loading scene {}", path.display());
            load_scene(path)
        }
        None => load_scene_from_str(DEMO_SCENE),
    };
    let loaded = match file.and_then(|f| f.build()) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load scene: {}", e);
            std::process::exit(1);
        }
    };

    let mut rasterizer = Rasterizer::new(loaded.settings.clone());
    rasterizer.settings.wireframe |= args.wireframe;

    match args.png {
        Some(out) => {
            if let Err(e) = render_to_png(loaded, &rasterizer, &out) {
                log::error!("Render failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            let conf = window_conf(loaded.width, loaded.height);
            macroquad::Window::from_config(conf, viewer(loaded, rasterizer, args.spin));
        }
    }
}

fn render_to_png(mut loaded: LoadedScene, rasterizer: &Rasterizer, out: &Path) -> softraster::Result<()> {
    let mut target: RenderTarget = RenderTarget::new(loaded.width, loaded.height);
    target.clear_color(loaded.background);
    let stats = rasterizer.render(&mut loaded.scene, loaded.camera, &mut target)?;
    log::info!(
        "Rendered {} triangles into {} fragments",
        stats.triangles,
        stats.fragments_written
    );
    target.save_png(out)
}

/// Top-level nodes that turn when spinning: everything but cameras and lights
fn spinning_nodes(loaded: &LoadedScene) -> Vec<NodeId> {
    let scene = &loaded.scene;
    scene
        .node(scene.root())
        .map(|root| root.children().to_vec())
        .unwrap_or_default()
        .into_iter()
        .filter(|&id| {
            scene
                .node(id)
                .map(|n| matches!(n.kind, NodeKind::Group | NodeKind::Mesh(_)))
                .unwrap_or(false)
        })
        .collect()
}

async fn viewer(mut loaded: LoadedScene, mut rasterizer: Rasterizer, mut spin: bool) {
    let (width, height) = (loaded.width, loaded.height);
    let mut target: RenderTarget = RenderTarget::new(width, height);
    let spinners = spinning_nodes(&loaded);

    log::info!("Viewer {}x{}: [W] wireframe, [P] perspective correction, [Space] spin, [Esc] quit", width, height);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::W) {
            rasterizer.settings.wireframe = !rasterizer.settings.wireframe;
        }
        if is_key_pressed(KeyCode::P) {
            rasterizer.settings.perspective_correct = !rasterizer.settings.perspective_correct;
        }
        if is_key_pressed(KeyCode::Space) {
            spin = !spin;
        }

        if spin {
            let angle = get_frame_time() as f64 * SPIN_SPEED;
            for &id in &spinners {
                if let Ok(node) = loaded.scene.node_mut(id) {
                    node.rotate(EulerRotation::new(0.0, angle, 0.0, RotationOrder::Xyz));
                }
            }
        }

        target.clear_color(loaded.background);
        let stats = match rasterizer.render(&mut loaded.scene, loaded.camera, &mut target) {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("Render failed: {}", e);
                break;
            }
        };

        let texture = Texture2D::from_rgba8(width as u16, height as u16, &target.to_rgba8());
        texture.set_filter(FilterMode::Nearest);

        // Fit the window, keeping the aspect ratio
        let scale = (screen_width() / width as f32).min(screen_height() / height as f32);
        let (draw_w, draw_h) = (width as f32 * scale, height as f32 * scale);
        let draw_x = (screen_width() - draw_w) / 2.0;
        let draw_y = (screen_height() - draw_h) / 2.0;

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            draw_x,
            draw_y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );
        draw_text(
            &format!(
                "{} tris  {} culled  {} frags  {}{}",
                stats.triangles,
                stats.culled,
                stats.fragments_written,
                if rasterizer.settings.perspective_correct { "persp" } else { "affine" },
                if rasterizer.settings.wireframe { "  wire" } else { "" },
            ),
            8.0,
            20.0,
            20.0,
            WHITE,
        );

        next_frame().await;
    }
}
