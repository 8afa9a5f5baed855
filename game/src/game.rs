use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use color_eyre::Result;
use color_eyre::eyre::Context;
use glium::glutin::surface::WindowSurface;
use glium::{Display, Surface};
use log::{error, info, trace};
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes};

use common::application::Application;
use common::camera::{Camera, FpsCamera};
use common::colors::{self, ColorExt};
use common::config::RoomConfig;
use common::gpu::{GliumContext, Gpu, ShaderProgram};
use common::input::Input;
use common::room::Room;

struct FrameState {
    pub last_frame_end: Instant,
    pub deltatime: f64,
    pub is_moving_camera: bool,
    pub fps: f32,
}

impl FrameState {
    pub fn update_statistics(&mut self) {
        self.deltatime = self.last_frame_end.elapsed().as_secs_f64();
        self.fps = (1.0 / self.deltatime) as f32;
        trace!("{:.1} fps", self.fps);

        self.last_frame_end = Instant::now();
    }
}

impl Default for FrameState {
    fn default() -> Self {
        FrameState {
            last_frame_end: Instant::now(),
            deltatime: 0.0,
            fps: 0.0,
            is_moving_camera: false,
        }
    }
}

pub struct Game {
    room: Room,
    shader: ShaderProgram,
    light_shader: ShaderProgram,
    context: Rc<RefCell<GliumContext>>,
    camera: FpsCamera,
    input: Input,
    state: FrameState,
}

fn aspect_ratio(size: PhysicalSize<u32>) -> f32 {
    size.width.max(1) as f32 / size.height.max(1) as f32
}

impl Application for Game {
    type Config = RoomConfig;

    fn window_attributes(config: &RoomConfig) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(config.window.title.clone())
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
    }

    fn new(
        config: &RoomConfig,
        window: &Window,
        display: &Display<WindowSurface>,
        _event_loop: &ActiveEventLoop,
    ) -> Result<Self> {
        let context = Rc::new(RefCell::new(GliumContext::new(display)));
        let gpu = Gpu::from_shared(context.clone());

        let shaders = &config.shaders;
        let shader = ShaderProgram::from_files(&gpu, &shaders.vertex, &shaders.fragment)?;
        let light_shader =
            ShaderProgram::from_files(&gpu, &shaders.light_vertex, &shaders.light_fragment)?;

        let room = Room::new(&gpu, config).wrap_err("Failed to build the room")?;
        room.install_lights(&shader, &light_shader);

        let camera = FpsCamera::new(config.camera_position, aspect_ratio(window.inner_size()));

        info!("Room ready, hold the left mouse button to look around");

        Ok(Self {
            room,
            shader,
            light_shader,
            context,
            camera,
            input: Input::new(),
            state: FrameState::default(),
        })
    }

    fn window_event(
        &mut self,
        event: WindowEvent,
        event_loop: &ActiveEventLoop,
        window: &Window,
        display: &Display<WindowSurface>,
    ) {
        self.input.process_window_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                display.resize((new_size.width, new_size.height));
                self.camera.set_aspect_ratio(aspect_ratio(new_size));
            }
            WindowEvent::RedrawRequested => {
                if self.input.key_pressed(KeyCode::Escape) {
                    event_loop.exit();
                }

                self.update(window);

                if let Err(err) = self.render(display) {
                    error!("Rendering failed: {:?}", err);
                    event_loop.exit();
                }

                self.state.update_statistics();
            }
            _ => (),
        };
    }

    fn device_event(
        &mut self,
        event: DeviceEvent,
        _event_loop: &ActiveEventLoop,
        _window: &Window,
        _display: &Display<WindowSurface>,
    ) {
        self.input.process_device_event(event);
    }
}

impl Game {
    fn update(&mut self, window: &Window) {
        let is_moving_camera = self.input.mouse_button_down(MouseButton::Left);

        if is_moving_camera != self.state.is_moving_camera {
            if is_moving_camera {
                self.capture_cursor(window);
            } else {
                self.release_cursor(window);
            }

            self.state.is_moving_camera = is_moving_camera;
        }

        self.camera
            .update(&self.input, self.state.deltatime as f32);

        self.input.reset_internal_state();
    }

    fn render(&mut self, display: &Display<WindowSurface>) -> Result<()> {
        let mut target = display.draw();
        target.clear_color_and_depth(colors::BACKGROUND.to_rgba_components_tuple(), 1.0);

        self.context.borrow_mut().begin_frame(target);
        let drawn = self
            .room
            .draw(&self.shader, &self.light_shader, &self.camera);
        let target = self.context.borrow_mut().end_frame();

        if let Some(target) = target {
            target.finish()?;
        }

        Ok(drawn?)
    }
}
