use color_eyre::Result;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::application::Application;
use crate::context::OpenGLContext;

/// Runs `A` until its window closes. Errors from creating the application are returned here.
pub fn run<A: Application>(config: A::Config) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut opengl_context = OpenGLContext::<A>::new(config);
    event_loop.run_app(&mut opengl_context)?;

    match opengl_context.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
