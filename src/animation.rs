use std::time::Instant;

use crate::bitgrid::BitGrid;
use crate::fps::{FpsMeter, FrameStats};
use crate::render::{self, Frame};
use crate::sim::SimulationPort;

/// Identifier of one pending scheduled frame.
pub type FrameHandle = u64;

/// Host scheduling primitive: one callback per request, revocable by
/// handle. Production wraps the window's redraw request; tests drive
/// the controller with a synchronous fake instead of a display clock.
pub trait FrameScheduler {
    /// Request one future frame callback and return its handle.
    fn schedule(&mut self) -> FrameHandle;

    /// Revoke a previously scheduled callback. After this returns, the
    /// handle must never fire as an animation frame.
    fn cancel(&mut self, handle: FrameHandle);
}

/// Either nothing is pending, or exactly one scheduled frame is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Running(FrameHandle),
}

/// Owns the frame loop: the scheduling state, the ticks-per-frame
/// multiplier, and the simulation port itself. UI handlers receive
/// this object instead of closing over loose globals, so independent
/// instances can be constructed and driven in tests.
pub struct AnimationController<S> {
    state: AnimationState,
    ticks_per_frame: Option<u32>,
    cell_size: u32,
    sim: S,
}

impl<S: SimulationPort> AnimationController<S> {
    pub fn new(sim: S, cell_size: u32, ticks_per_frame: u32) -> Self {
        Self {
            state: AnimationState::Idle,
            ticks_per_frame: Some(ticks_per_frame),
            cell_size,
            sim,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running(_))
    }

    /// Parsed ticks-per-frame value; `None` while the entry is invalid.
    pub fn ticks_per_frame(&self) -> Option<u32> {
        self.ticks_per_frame
    }

    /// Store a newly parsed multiplier. `None` (unparsable entry)
    /// stalls the simulation without stopping the frame loop.
    pub fn set_ticks_per_frame(&mut self, ticks: Option<u32>) {
        self.ticks_per_frame = ticks;
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    /// Idle -> Running: schedule the first frame. No-op while Running.
    pub fn start(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.is_running() {
            return;
        }
        let handle = scheduler.schedule();
        self.state = AnimationState::Running(handle);
        log::info!("animation started");
    }

    /// Running -> Idle: cancel the pending frame, guaranteeing zero
    /// further frames until the next `start`.
    pub fn stop(&mut self, scheduler: &mut impl FrameScheduler) {
        if let AnimationState::Running(handle) = self.state {
            scheduler.cancel(handle);
            self.state = AnimationState::Idle;
            log::info!("animation stopped");
        }
    }

    /// Run one scheduled frame: sample the meter, render, advance the
    /// simulation ticks-per-frame times, reschedule. Only the one
    /// pending handle may fire; a handle left over from an earlier
    /// Running period is stale and ignored.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        scheduler: &mut impl FrameScheduler,
        frame: &mut Frame,
        fps: &mut FpsMeter,
        now: Instant,
    ) -> Option<FrameStats> {
        match self.state {
            AnimationState::Running(pending) if pending == handle => {}
            _ => return None,
        }

        let stats = fps.sample(now);
        self.render(frame);

        for _ in 0..self.ticks_per_frame.unwrap_or(0) {
            self.sim.advance();
        }

        let next = scheduler.schedule();
        self.state = AnimationState::Running(next);
        Some(stats)
    }

    /// Redraw the whole surface from a freshly fetched cell snapshot.
    pub fn render(&self, frame: &mut Frame) {
        let (width, height) = (self.sim.width(), self.sim.height());
        render::draw_grid(frame, width, height, self.cell_size);
        let cells = BitGrid::new(self.sim.cells(), width);
        render::draw_cells(frame, &cells, width, height, self.cell_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Synchronous stand-in for the display clock.
    #[derive(Default)]
    struct FakeScheduler {
        next_handle: FrameHandle,
        armed: Option<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for FakeScheduler {
        fn schedule(&mut self) -> FrameHandle {
            self.next_handle += 1;
            self.armed = Some(self.next_handle);
            self.next_handle
        }

        fn cancel(&mut self, handle: FrameHandle) {
            if self.armed == Some(handle) {
                self.armed = None;
            }
            self.cancelled.push(handle);
        }
    }

    /// Port fake counting advances over a 2x2 grid.
    #[derive(Default)]
    struct CountingPort {
        advances: u32,
        cells: [u8; 1],
    }

    impl SimulationPort for CountingPort {
        fn width(&self) -> u32 {
            2
        }

        fn height(&self) -> u32 {
            2
        }

        fn cells(&self) -> &[u8] {
            &self.cells
        }

        fn advance(&mut self) {
            self.advances += 1;
        }

        fn toggle(&mut self, row: u32, col: u32) {
            let index = (row * 2 + col) as usize;
            self.cells[0] ^= 1 << index;
        }

        fn reset(&mut self) {}

        fn randomize(&mut self) {}
    }

    struct Rig {
        controller: AnimationController<CountingPort>,
        scheduler: FakeScheduler,
        frame: Frame,
        fps: FpsMeter,
        now: Instant,
    }

    impl Rig {
        fn new() -> Self {
            let now = Instant::now();
            Self {
                controller: AnimationController::new(CountingPort::default(), 5, 1),
                scheduler: FakeScheduler::default(),
                frame: Frame::for_grid(2, 2, 5),
                fps: FpsMeter::with_origin(now),
                now,
            }
        }

        /// Fire the pending frame, as the host would on a redraw.
        fn fire(&mut self) -> Option<FrameStats> {
            self.now += Duration::from_millis(16);
            let handle = self.scheduler.armed.take().expect("a frame should be pending");
            self.controller.on_frame(
                handle,
                &mut self.scheduler,
                &mut self.frame,
                &mut self.fps,
                self.now,
            )
        }
    }

    #[test]
    fn starts_idle_with_nothing_scheduled() {
        let rig = Rig::new();
        assert_eq!(rig.controller.state(), AnimationState::Idle);
        assert_eq!(rig.scheduler.armed, None);
        assert_eq!(rig.controller.sim().advances, 0);
    }

    #[test]
    fn advances_equal_frames_times_ticks() {
        let mut rig = Rig::new();
        rig.controller.set_ticks_per_frame(Some(3));
        rig.controller.start(&mut rig.scheduler);
        for _ in 0..5 {
            assert!(rig.fire().is_some());
        }
        assert_eq!(rig.controller.sim().advances, 15);
        assert!(rig.controller.is_running());
        assert!(rig.scheduler.armed.is_some(), "next frame must be pending");
    }

    #[test]
    fn invalid_ticks_render_without_advancing() {
        let mut rig = Rig::new();
        rig.controller.start(&mut rig.scheduler);
        rig.controller.set_ticks_per_frame(None);
        for _ in 0..4 {
            let stats = rig.fire();
            assert!(stats.is_some(), "frame must still render");
        }
        assert_eq!(rig.controller.sim().advances, 0);

        // Recovery on the next valid value.
        rig.controller.set_ticks_per_frame(Some(2));
        rig.fire();
        assert_eq!(rig.controller.sim().advances, 2);
    }

    #[test]
    fn zero_ticks_stall_the_simulation() {
        let mut rig = Rig::new();
        rig.controller.set_ticks_per_frame(Some(0));
        rig.controller.start(&mut rig.scheduler);
        rig.fire();
        rig.fire();
        assert_eq!(rig.controller.sim().advances, 0);
    }

    #[test]
    fn stop_cancels_the_pending_frame() {
        let mut rig = Rig::new();
        rig.controller.start(&mut rig.scheduler);
        let handle = match rig.controller.state() {
            AnimationState::Running(h) => h,
            AnimationState::Idle => panic!("controller should be running"),
        };

        rig.controller.stop(&mut rig.scheduler);
        assert_eq!(rig.controller.state(), AnimationState::Idle);
        assert_eq!(rig.scheduler.armed, None);
        assert_eq!(rig.scheduler.cancelled, vec![handle]);

        // Firing the revoked handle does nothing.
        let stats = rig.controller.on_frame(
            handle,
            &mut rig.scheduler,
            &mut rig.frame,
            &mut rig.fps,
            rig.now,
        );
        assert_eq!(stats, None);
        assert_eq!(rig.controller.sim().advances, 0);
    }

    #[test]
    fn stale_handle_from_a_prior_run_is_ignored() {
        let mut rig = Rig::new();
        rig.controller.start(&mut rig.scheduler);
        let old = rig.scheduler.armed.take().expect("first frame pending");
        rig.controller.stop(&mut rig.scheduler);
        rig.controller.start(&mut rig.scheduler);

        let stats = rig.controller.on_frame(
            old,
            &mut rig.scheduler,
            &mut rig.frame,
            &mut rig.fps,
            rig.now,
        );
        assert_eq!(stats, None);
        assert_eq!(rig.controller.sim().advances, 0);

        // The fresh handle still fires normally.
        assert!(rig.fire().is_some());
        assert_eq!(rig.controller.sim().advances, 1);
    }

    #[test]
    fn start_while_running_schedules_nothing_new() {
        let mut rig = Rig::new();
        rig.controller.start(&mut rig.scheduler);
        rig.controller.start(&mut rig.scheduler);
        assert_eq!(rig.scheduler.next_handle, 1);
    }
}
