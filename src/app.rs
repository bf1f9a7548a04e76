use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use crate::config::{parse_args, CliCommand, DemoConfig, Variant};
use crate::geometry::SceneGeometry;
use crate::input::{KeyCode, KeyResponse, NamedKey};
use crate::render::Renderer;
use crate::state::DemoState;
use crate::transform::TransformState;

/// Entry point shared by both binaries: parses `args` (without the program
/// name) and runs the demo, falling back to summary mode when no window can
/// be opened.
pub fn run<I>(variant: Variant, args: I) -> Result<()>
where
    I: IntoIterator<Item = String>,
{
    let config = match parse_args(variant, args)? {
        CliCommand::Run(config) => config,
        CliCommand::Help(usage) => {
            println!("{usage}");
            return Ok(());
        }
    };

    if config.summary_only {
        return run_headless(&config);
    }
    match run_interactive(&config) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
            );
            run_headless(&config)
        }
        Err(err) => Err(err),
    }
}

/// Prints the geometry summary and the transform reached after replaying the
/// configured key script.
pub fn run_headless(config: &DemoConfig) -> Result<()> {
    let geometry = SceneGeometry::from_config(config);
    print_summary(config.variant, &geometry);

    let mut state = DemoState::new(config);
    if !config.keys.is_empty() {
        let outcome = state.replay(&config.keys);
        println!("Replayed {} key event(s)", outcome.strokes);
        if outcome.exit_requested {
            println!("Exit requested");
        }
    }
    print_final_state(state.transform());
    Ok(())
}

fn run_interactive(config: &DemoConfig) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let mut event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.variant.title())
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64))
            .with_resizable(true)
            .build(&event_loop)
            .map_err(|err| WindowInitError::new("window", err.to_string()))?,
    );

    let geometry = SceneGeometry::from_config(config);
    let renderer = block_on(Renderer::new(Arc::clone(&window), &geometry))?;
    let mut state = DemoState::new(config);
    let size = renderer.size();
    state.resize(size.width, size.height);
    info!(
        "{} variant running at {}x{}",
        config.variant.name(),
        size.width,
        size.height
    );

    if state.replay(&config.keys).exit_requested {
        print_final_state(state.transform());
        return Ok(());
    }

    let mut app = App {
        renderer,
        state,
        last_error: None,
    };
    event_loop.run_return(|event, _, control_flow| {
        control_flow.set_poll();
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    print_final_state(app.state.transform());
    match app.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Event-loop object owning the renderer and the single [`DemoState`].
struct App {
    renderer: Renderer,
    state: DemoState,
    last_error: Option<anyhow::Error>,
}

impl App {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => control_flow.set_exit(),
                    WindowEvent::Resized(size) => self.resize(*size),
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.resize(**new_inner_size);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        if self.handle_keyboard(input) == KeyResponse::Exit {
                            control_flow.set_exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                let uniforms = self.state.uniforms();
                if let Err(err) = self.renderer.render(&uniforms) {
                    match err {
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                            let size = self.renderer.window().inner_size();
                            self.resize(size);
                        }
                        wgpu::SurfaceError::OutOfMemory => {
                            return Err(anyhow!("GPU is out of memory"));
                        }
                        wgpu::SurfaceError::Timeout => {
                            warn!("Surface timeout; retrying next frame");
                        }
                    }
                }
            }
            Event::MainEventsCleared => {
                self.state.idle();
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.renderer.resize(size);
        if size.width > 0 && size.height > 0 {
            self.state.resize(size.width, size.height);
        }
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput) -> KeyResponse {
        let Some(key) = input.virtual_keycode.and_then(map_keycode) else {
            return KeyResponse::Continue;
        };
        match input.state {
            ElementState::Pressed => self.state.key_down(key),
            ElementState::Released => {
                self.state.key_up(key);
                KeyResponse::Continue
            }
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
pub struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    fn new(stage: &'static str, message: String) -> Self {
        Self { stage, message }
    }

    fn from_panic(stage: &'static str, panic: Box<dyn Any + Send>) -> Self {
        Self::new(stage, panic_message(panic))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

fn print_summary(variant: Variant, geometry: &SceneGeometry) {
    println!("Variant: {}", variant.name());
    println!(
        "Hourglass: {} vertices ({} triangles)",
        geometry.hourglass.len(),
        geometry.hourglass_triangle_count()
    );
    if let Some(grid) = &geometry.grid {
        println!(
            "Grid: {} lines ({} vertices)",
            geometry.grid_line_count(),
            grid.len()
        );
    }
}

fn print_final_state(transform: &TransformState) {
    println!(
        "Final transform: translate=({:.2}, {:.2}) scale={:.2} rotation=({:.2}, {:.2}, {:.2})",
        transform.translate_x,
        transform.translate_y,
        transform.scale,
        transform.angle_x,
        transform.angle_y,
        transform.angle_z
    );
}

fn map_keycode(code: VirtualKeyCode) -> Option<KeyCode> {
    use VirtualKeyCode as Key;
    let digit = |value: u8| Some(KeyCode::Digit(value));
    match code {
        Key::Escape => Some(KeyCode::Named(NamedKey::Escape)),
        Key::Space => Some(KeyCode::Named(NamedKey::Space)),
        Key::Plus | Key::NumpadAdd | Key::Equals => Some(KeyCode::Named(NamedKey::Plus)),
        Key::Minus | Key::NumpadSubtract => Some(KeyCode::Named(NamedKey::Minus)),
        Key::Key0 | Key::Numpad0 => digit(0),
        Key::Key1 | Key::Numpad1 => digit(1),
        Key::Key2 | Key::Numpad2 => digit(2),
        Key::Key3 | Key::Numpad3 => digit(3),
        Key::Key4 | Key::Numpad4 => digit(4),
        Key::Key5 | Key::Numpad5 => digit(5),
        Key::Key6 | Key::Numpad6 => digit(6),
        Key::Key7 | Key::Numpad7 => digit(7),
        Key::Key8 | Key::Numpad8 => digit(8),
        Key::Key9 | Key::Numpad9 => digit(9),
        Key::A => Some(KeyCode::Character('A')),
        Key::D => Some(KeyCode::Character('D')),
        Key::Q => Some(KeyCode::Character('Q')),
        Key::S => Some(KeyCode::Character('S')),
        Key::W => Some(KeyCode::Character('W')),
        Key::X => Some(KeyCode::Character('X')),
        Key::Z => Some(KeyCode::Character('Z')),
        _ => None,
    }
}
