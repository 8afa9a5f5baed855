use color_eyre::Result;
use glium::Display;
use glium::glutin::surface::WindowSurface;
use log::warn;
use winit::event::{DeviceEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{CursorGrabMode, Window, WindowAttributes};

/// A windowed program driven by the winit event loop. Created once the window and its OpenGL
/// display exist.
pub trait Application: Sized {
    type Config;

    fn window_attributes(config: &Self::Config) -> WindowAttributes;

    fn new(
        config: &Self::Config,
        window: &Window,
        display: &Display<WindowSurface>,
        event_loop: &ActiveEventLoop,
    ) -> Result<Self>;

    fn window_event(
        &mut self,
        event: WindowEvent,
        event_loop: &ActiveEventLoop,
        window: &Window,
        display: &Display<WindowSurface>,
    );

    #[allow(unused_variables)]
    fn device_event(
        &mut self,
        event: DeviceEvent,
        event_loop: &ActiveEventLoop,
        window: &Window,
        display: &Display<WindowSurface>,
    ) {
    }

    fn capture_cursor(&mut self, window: &Window) {
        if let Err(err) = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
        {
            warn!("Could not capture cursor: {}", err);
        }

        window.set_cursor_visible(false);
    }

    fn release_cursor(&mut self, window: &Window) {
        if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
            warn!("Could not release cursor: {}", err);
        }

        window.set_cursor_visible(true);
    }
}
