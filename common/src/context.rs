use color_eyre::Report;
use glium::Display;
use glium::backend::glutin::SimpleWindowBuilder;
use glium::glutin::surface::WindowSurface;
use log::error;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::application::Application;

// Field order is drop order: GPU resources held by the application go before the display
struct Running<A> {
    application: A,
    display: Display<WindowSurface>,
    window: Window,
}

/// Owns the window, its display and the application, created on the first resume.
pub struct OpenGLContext<A: Application> {
    config: A::Config,
    running: Option<Running<A>>,
    error: Option<Report>,
}

impl<A: Application> OpenGLContext<A> {
    pub fn new(config: A::Config) -> Self {
        Self {
            config,
            running: None,
            error: None,
        }
    }

    /// The error that stopped the application from starting, if any.
    pub fn take_error(&mut self) -> Option<Report> {
        self.error.take()
    }
}

impl<A: Application> ApplicationHandler for OpenGLContext<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        let (window, display) = SimpleWindowBuilder::new()
            .set_window_builder(A::window_attributes(&self.config))
            .build(event_loop);

        match A::new(&self.config, &window, &display, event_loop) {
            Ok(application) => {
                self.running = Some(Running {
                    application,
                    display,
                    window,
                })
            }
            Err(err) => {
                error!("Failed to start: {}", err);
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        if window_id != running.window.id() {
            return;
        }

        running
            .application
            .window_event(event, event_loop, &running.window, &running.display);
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(running) = self.running.as_mut() {
            running
                .application
                .device_event(event, event_loop, &running.window, &running.display);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = self.running.as_ref() {
            running.window.request_redraw();
        }
    }
}
