#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release
#![allow(unsafe_code)]
#![allow(clippy::undocumented_unsafe_blocks)]

use eframe::{egui, egui_glow, glow};
use egui::mutex::Mutex;
use egui::panel::Side;
use egui::Id;
use glam::Vec3;

use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

mod file_formats;
mod gfx;
mod scene;

use file_formats::ObjModel;
use gfx::{Mesh, Shader, Texture};
use scene::{ObjectsScene, Scene, WaterScene};

const WIDTH: f32 = 1280f32;
const HEIGHT: f32 = 720f32;

/// Repaint cadence, ~60 Hz.
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

const SHADER_DIR: &str = "shaders";
const MODEL_DIR: &str = "assets/models";
const TEXTURE_DIR: &str = "assets/textures";

/// Mesh and texture per object slot.
const OBJECT_SLOTS: [(&str, &str); 4] = [
    ("cube.obj", "checker.png"),
    ("cube.obj", "stripes.png"),
    ("sphere.obj", "rings.png"),
    ("sphere.obj", "noise.png"),
];

type AppError = Box<dyn Error + Send + Sync>;

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([WIDTH, HEIGHT]),
        multisampling: 2,
        depth_buffer: 24,

        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    eframe::run_native(
        "Shading Viewer",
        options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc)?))),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveScene {
    Objects,
    Water,
}

struct ViewerApp {
    /// Behind `Arc<Mutex<…>>` so the scenes can be handed to
    /// [`egui::PaintCallback`] and painted later.
    objects: Arc<Mutex<ObjectsScene>>,
    water: Arc<Mutex<WaterScene>>,
    active: ActiveScene,

    rotation: [i32; 3],
    scale_percent: i32,
}

impl ViewerApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, AppError> {
        let gl = cc
            .gl
            .as_ref()
            .expect("You need to run eframe with the glow backend");

        init_gl_logging(gl);

        let objects = build_objects_scene(gl)?;
        let water = build_water_scene(gl)?;

        Ok(Self {
            objects: Arc::new(Mutex::new(objects)),
            water: Arc::new(Mutex::new(water)),
            active: ActiveScene::Objects,
            rotation: [0, 0, 0],
            scale_percent: 100,
        })
    }

    fn with_active(&mut self, f: impl FnOnce(&mut dyn Scene)) {
        match self.active {
            ActiveScene::Objects => f(&mut *self.objects.lock()),
            ActiveScene::Water => f(&mut *self.water.lock()),
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::new(Side::Left, Id::new("Control Panel")).show(ctx, |ui| {
            ui.label("Scene");
            ui.selectable_value(&mut self.active, ActiveScene::Objects, "Rotating objects");
            ui.selectable_value(&mut self.active, ActiveScene::Water, "Water");

            ui.add(egui::Separator::default());

            self.with_active(|scene| {
                let current = scene.shading_mode();
                egui::ComboBox::from_label("Shading")
                    .selected_text(current.label())
                    .show_ui(ui, |ui| {
                        for &mode in scene.supported_modes() {
                            if ui.selectable_label(current == mode, mode.label()).clicked() {
                                scene.set_shading_mode(mode);
                            }
                        }
                    });
            });

            ui.add(egui::Separator::default());

            let mut transforms_changed = false;
            for (slider, label) in self.rotation.iter_mut().zip(["Rotate X", "Rotate Y", "Rotate Z"])
            {
                transforms_changed |= ui
                    .add(egui::Slider::new(slider, 0..=360).text(label))
                    .changed();
            }
            let scale_changed = ui
                .add(egui::Slider::new(&mut self.scale_percent, 1..=200).text("Scale %"))
                .changed();

            let rotation = Vec3::new(
                self.rotation[0] as f32,
                self.rotation[1] as f32,
                self.rotation[2] as f32,
            );
            let scale_percent = self.scale_percent;
            self.with_active(|scene| {
                if transforms_changed {
                    scene.set_rotation(rotation);
                }
                if scale_changed {
                    scene.set_scale(scale_percent);
                }
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::canvas(ui.style()).show(ui, |ui| {
                self.custom_painting(ui, ctx);
            });
        });
        ctx.request_repaint_after(FRAME_INTERVAL);
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        // The repaint callbacks are done by the time this runs; release
        // every GPU handle exactly once.
        if let Some(gl) = gl {
            self.objects.lock().destroy_gl(gl);
            self.water.lock().destroy_gl(gl);
        }
    }
}

impl ViewerApp {
    fn custom_painting(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let size = ui.available_size();
        let (rect, response) = ui.allocate_at_least(size, egui::Sense::drag());

        self.with_active(|scene| scene.set_viewport(size.x, size.y));

        // Drag orbits the camera and scroll zooms; both only exist in the
        // multi-object scene.
        if self.active == ActiveScene::Objects {
            let drag = response.drag_motion();
            let scroll = ctx.input(|i| i.raw_scroll_delta.y);

            let objects = &mut self.objects.lock();
            if drag != egui::Vec2::ZERO {
                objects.orbit_view(Vec3::new(drag.y * 0.5, drag.x * 0.5, 0.0));
            }
            if response.hovered() && scroll != 0.0 {
                objects.change_view_distance(scroll);
            }
        }

        // Clone to give to the callback
        let callback = match self.active {
            ActiveScene::Objects => {
                let scene = self.objects.clone();
                egui::PaintCallback {
                    rect,
                    callback: Arc::new(egui_glow::CallbackFn::new(move |_info, painter| {
                        let gl = painter.gl();
                        let scene = &mut scene.lock();
                        scene.tick();
                        scene.draw(gl);
                        drain_gl_messages(gl);
                    })),
                }
            }
            ActiveScene::Water => {
                let scene = self.water.clone();
                egui::PaintCallback {
                    rect,
                    callback: Arc::new(egui_glow::CallbackFn::new(move |_info, painter| {
                        let gl = painter.gl();
                        let scene = &mut scene.lock();
                        scene.tick();
                        scene.draw(gl);
                        drain_gl_messages(gl);
                    })),
                }
            }
        };
        ui.painter().add(callback);
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Resource loading                                                    //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn build_objects_scene(gl: &glow::Context) -> Result<ObjectsScene, AppError> {
    let normal = load_shader(gl, "normal")?;
    let gouraud = load_shader(gl, "gouraud")?;
    let phong = load_shader(gl, "phong")?;

    let mut parts = Vec::with_capacity(OBJECT_SLOTS.len());
    for (model_name, texture_name) in OBJECT_SLOTS {
        let mesh = load_mesh(&Path::new(MODEL_DIR).join(model_name))?;
        let texture = Texture::from_file(gl, &Path::new(TEXTURE_DIR).join(texture_name))?;
        parts.push((mesh, texture));
    }

    Ok(ObjectsScene::new(
        gl, normal, gouraud, phong, parts, WIDTH, HEIGHT,
    )?)
}

fn build_water_scene(gl: &glow::Context) -> Result<WaterScene, AppError> {
    let normal = load_shader(gl, "water_normal")?;
    let phong = load_shader(gl, "water_phong")?;
    let grid = load_mesh(&Path::new(MODEL_DIR).join("grid.obj"))?;

    Ok(WaterScene::new(gl, normal, phong, grid, WIDTH, HEIGHT)?)
}

fn load_mesh(path: &Path) -> Result<Mesh, AppError> {
    let mut model = ObjModel::from_file(path)
        .map_err(|e| format!("could not load mesh {}: {e}", path.display()))?;
    model.unitize();
    log::info!(
        "loaded mesh {} ({} vertices)",
        path.display(),
        model.vertex_count()
    );
    Ok(Mesh::new(model.interleaved()))
}

/// Compiles the `<name>.vs` / `<name>.fs` pair from the shader directory.
fn load_shader(gl: &glow::Context, name: &str) -> Result<Shader, AppError> {
    let vtx = read_source(&Path::new(SHADER_DIR).join(format!("{name}.vs")))?;
    let frag = read_source(&Path::new(SHADER_DIR).join(format!("{name}.fs")))?;
    let shader = Shader::from_src(gl, &vtx, &frag)
        .map_err(|e| format!("shader {name:?} failed to build: {e}"))?;
    log::info!("built shader program {name:?}");
    Ok(shader)
}

fn read_source(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|e| format!("could not read {}: {e}", path.display()).into())
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Debug channel                                                       //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn init_gl_logging(gl: &glow::Context) {
    use glow::HasContext as _;

    unsafe {
        let version = gl.get_parameter_string(glow::VERSION);
        log::info!("using OpenGL {version}");

        if gl.supported_extensions().contains("GL_KHR_debug") {
            gl.enable(glow::DEBUG_OUTPUT);
            log::info!("GL debug output enabled");
        }
    }
}

/// Forwards queued driver diagnostics to the log. Diagnostics never become
/// errors; the draw path is fire-and-forget.
fn drain_gl_messages(gl: &glow::Context) {
    use glow::HasContext as _;

    for entry in unsafe { gl.get_debug_message_log(16) } {
        // The entry's fields are private; its Debug form carries the
        // source, type, id, severity and message text.
        log::debug!("GL message: {entry:?}");
    }
}
