use std::error::Error;
use std::time::{Duration, Instant};

use pixels::{PixelsBuilder, SurfaceTexture};
use tracing::warn;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::graphics::Renderer2d;
use crate::pixels_renderer::PixelsRenderer2d;
use crate::surface::SurfaceSize;
use crate::view_tree::{PointerInput, ViewTree, hit_test_actions};

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
    pub resizable: bool,
    pub vsync: Option<bool>,
}

pub struct AppContext {
    pub window: Window,
    pub renderer: PixelsRenderer2d,
    pub surface_size: SurfaceSize,
}

/// Input gathered between two redraws.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub mouse_pos: Option<(u32, u32)>,
    pub mouse_moved: bool,
    pub mouse_down: bool,
    pub mouse_up: bool,
    /// Keys that went down this frame, in press order. OS key repeat is filtered out.
    pub keys_pressed: Vec<VirtualKeyCode>,
    keys_held: Vec<VirtualKeyCode>,
}

impl InputFrame {
    pub fn pointer(&self) -> PointerInput {
        PointerInput {
            mouse_pos: self.mouse_pos,
            mouse_down: self.mouse_down,
            mouse_up: self.mouse_up,
        }
    }

    pub fn pressed(&self, key: VirtualKeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    fn on_key(&mut self, key: VirtualKeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_held.push(key);
                    self.keys_pressed.push(key);
                }
            }
            ElementState::Released => self.keys_held.retain(|k| *k != key),
        }
    }

    fn end_frame(&mut self) {
        self.mouse_moved = false;
        self.mouse_down = false;
        self.mouse_up = false;
        self.keys_pressed.clear();
    }
}

pub trait GameApp {
    type State;
    type Action: Clone;
    type Effect;

    fn init_state(&mut self, _ctx: &mut AppContext) -> Self::State;

    fn build_view(&self, state: &Self::State, _ctx: &AppContext) -> ViewTree<Self::Action>;

    fn update_state(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        actions: &[Self::Action],
        _ctx: &mut AppContext,
    ) -> Vec<Self::Effect>;

    fn render(
        &mut self,
        state: &Self::State,
        view: &ViewTree<Self::Action>,
        renderer: &mut dyn Renderer2d,
    );

    fn handle_effects(&mut self, _effects: Vec<Self::Effect>, _ctx: &mut AppContext) {}

    /// Returning `true` asks the loop to exit after this frame.
    fn wants_exit(&self, _state: &Self::State) -> bool {
        false
    }

    /// Called once when the event loop is torn down.
    fn on_exit(&mut self, _state: &mut Self::State) {}
}

fn build_window(config: &AppConfig, event_loop: &EventLoop<()>) -> Result<Window, Box<dyn Error>> {
    let monitor_size = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    let initial_size = match monitor_size {
        Some(monitor) => PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        ),
        None => config.desired_size,
    };
    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(initial_size)
        .with_resizable(config.resizable)
        .build(event_loop)?;
    Ok(window)
}

pub fn run_game<G: GameApp + 'static>(config: AppConfig, mut game: G) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let window = build_window(&config, &event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width, window_size.height);
    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut pixels_builder =
        PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture);
    if let Some(vsync) = config.vsync {
        pixels_builder = pixels_builder.enable_vsync(vsync);
    }
    let pixels = pixels_builder.build()?;
    let renderer = PixelsRenderer2d::new(pixels, surface_size)?;

    let mut ctx = AppContext {
        window,
        renderer,
        surface_size,
    };
    let mut state = game.init_state(&mut ctx);
    let mut input = InputFrame::default();
    let mut last_frame = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match &event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    ctx.surface_size = SurfaceSize::new(size.width, size.height);
                    if let Err(err) = ctx.renderer.resize(ctx.surface_size) {
                        warn!("resize failed: {err}");
                    }
                    ctx.window.request_redraw();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let new_x = position.x.max(0.0) as u32;
                    let new_y = position.y.max(0.0) as u32;
                    input.mouse_pos = Some((new_x, new_y));
                    input.mouse_moved = true;
                }
                WindowEvent::MouseInput {
                    state: mouse_state,
                    button: MouseButton::Left,
                    ..
                } => match mouse_state {
                    ElementState::Pressed => input.mouse_down = true,
                    ElementState::Released => input.mouse_up = true,
                },
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: key_state,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => input.on_key(*key, *key_state),
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(last_frame);
                last_frame = now;

                let view_for_input = game.build_view(&state, &ctx);
                let actions = hit_test_actions(&view_for_input, input.pointer());
                let effects = game.update_state(&mut state, &input, dt, &actions, &mut ctx);

                let view_for_render = game.build_view(&state, &ctx);
                ctx.renderer.draw_frame(|gfx| {
                    game.render(&state, &view_for_render, gfx);
                });
                if let Err(err) = ctx.renderer.present() {
                    warn!("present failed: {err}");
                }

                game.handle_effects(effects, &mut ctx);
                input.end_frame();

                if game.wants_exit(&state) {
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::MainEventsCleared => {
                ctx.window.request_redraw();
            }
            Event::LoopDestroyed => {
                game.on_exit(&mut state);
            }
            _ => {}
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_repeat_is_reported_once_per_hold() {
        let mut input = InputFrame::default();
        input.on_key(VirtualKeyCode::S, ElementState::Pressed);
        input.on_key(VirtualKeyCode::S, ElementState::Pressed);
        assert_eq!(input.keys_pressed, vec![VirtualKeyCode::S]);

        input.end_frame();
        input.on_key(VirtualKeyCode::S, ElementState::Pressed);
        assert!(input.keys_pressed.is_empty());

        input.on_key(VirtualKeyCode::S, ElementState::Released);
        input.on_key(VirtualKeyCode::S, ElementState::Pressed);
        assert!(input.pressed(VirtualKeyCode::S));
    }

    #[test]
    fn end_frame_clears_edge_flags_but_keeps_pointer() {
        let mut input = InputFrame {
            mouse_pos: Some((3, 4)),
            mouse_moved: true,
            mouse_up: true,
            ..InputFrame::default()
        };
        input.end_frame();
        assert_eq!(input.mouse_pos, Some((3, 4)));
        assert!(!input.mouse_moved);
        assert!(!input.mouse_up);
    }
}
