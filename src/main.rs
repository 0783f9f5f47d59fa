mod animation;
mod app;
mod bitgrid;
mod config;
mod fps;
mod gpu;
mod input;
mod render;
mod sim;

use winit::event_loop::{ControlFlow, EventLoop};

use app::App;

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new().expect("failed to create event loop");
    // Frames are driven by explicit redraw requests, not a busy loop.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new();
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("event loop error: {e}");
    }
}
