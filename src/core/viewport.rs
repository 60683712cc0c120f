use std::sync::Arc;

use log::{debug, info, warn};

use super::frame::TickReport;
use super::playback::{PlayState, PlaybackClock, PlaybackState};
use super::reconciler::{ReconcileStats, Reconciler};
use super::scheduler::{Cadence, Scheduler, TaskHandle};
use crate::config::PlaybackConfig;
use crate::scene::{SceneObject, SceneSnapshot};
use crate::traits::SceneRenderer;

/// Render loop driver for one viewport.
///
/// Owns the renderer, the live node set and the playback clock. The host
/// calls [`Viewport::pump`] once per display refresh; within a pump the
/// order is always playback ticks, structural sync (only when a new object
/// list was handed over), animation sync, draw.
pub struct Viewport<R: SceneRenderer> {
    renderer: Option<R>,
    reconciler: Reconciler,
    clock: PlaybackClock,
    scheduler: Scheduler,
    playback_hz: f32,
    playback_task: Option<TaskHandle>,
    render_task: Option<TaskHandle>,
    desired: SceneSnapshot,
    reconciled: Option<SceneSnapshot>,
    frames_rendered: u64,
}

impl<R: SceneRenderer> Viewport<R> {
    /// Take ownership of `renderer` and start the render loop, paused at frame 0
    pub fn new(renderer: R, config: &PlaybackConfig) -> Self {
        let mut viewport = Self {
            renderer: Some(renderer),
            reconciler: Reconciler::new(),
            clock: PlaybackClock::new(config.duration),
            scheduler: Scheduler::new(config.max_catch_up),
            playback_hz: config.hz,
            playback_task: None,
            render_task: None,
            desired: Arc::from(Vec::<SceneObject>::new()),
            reconciled: None,
            frames_rendered: 0,
        };
        viewport.start_render_loop();
        viewport
    }

    /// Hand over a new object list. Structural sync happens on the next
    /// render tick, and only if this is a different list than last time.
    pub fn set_objects(&mut self, objects: SceneSnapshot) {
        self.desired = objects;
    }

    pub fn objects(&self) -> &SceneSnapshot {
        &self.desired
    }

    pub fn play(&mut self) {
        self.clock.play();
        if self.playback_task.is_none() && !self.is_torn_down() {
            self.playback_task = Some(self.scheduler.spawn(Cadence::FixedHz(self.playback_hz)));
            debug!("Playback started at frame {}", self.clock.current_frame());
        }
    }

    pub fn pause(&mut self) {
        self.clock.pause();
        if self.playback_task.take().is_some() {
            debug!("Playback paused at frame {}", self.clock.current_frame());
        }
    }

    pub fn toggle_playback(&mut self) -> PlayState {
        if self.clock.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.clock.state().play_state
    }

    pub fn set_playing(&mut self, playing: bool) {
        if playing {
            self.play();
        } else {
            self.pause();
        }
    }

    /// Scrub to `frame`; the next render tick shows it
    pub fn set_frame(&mut self, frame: u32) {
        self.clock.set_frame(frame);
    }

    pub fn set_duration(&mut self, duration: u32) {
        self.clock.set_duration(duration);
    }

    /// Back to frame 0 without changing play state
    pub fn rewind(&mut self) {
        self.clock.reset();
    }

    pub fn playback(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn current_frame(&self) -> u32 {
        self.clock.current_frame()
    }

    /// Forward a viewport size change. Playback and nodes are unaffected.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
    }

    pub fn start_render_loop(&mut self) {
        if self.render_task.is_none() && !self.is_torn_down() {
            self.render_task = Some(self.scheduler.spawn(Cadence::EveryFrame));
        }
    }

    /// Stop drawing. Playback keeps its own task and keeps advancing.
    pub fn stop_render_loop(&mut self) {
        self.render_task = None;
    }

    pub fn is_rendering(&self) -> bool {
        self.render_task.is_some()
    }

    /// Advance both periodic tasks by `delta` seconds of wall time
    pub fn pump(&mut self, delta: f32) -> TickReport {
        let mut report = TickReport {
            number: self.frames_rendered,
            current_frame: self.clock.current_frame(),
            ..TickReport::default()
        };
        if self.is_torn_down() {
            return report;
        }

        let firings = self.scheduler.advance(delta);
        let playback_id = self.playback_task.as_ref().map(TaskHandle::id);
        let render_id = self.render_task.as_ref().map(TaskHandle::id);

        for firing in firings.iter().filter(|f| Some(f.task) == playback_id) {
            for _ in 0..firing.count {
                self.clock.tick();
            }
            report.playback_ticks += firing.count;
        }

        if firings.iter().any(|f| Some(f.task) == render_id) {
            let (reconciled, animated) = self.render_tick();
            report.reconciled = reconciled;
            report.animated_nodes = animated;
            report.rendered = true;
        }

        report.number = self.frames_rendered;
        report.current_frame = self.clock.current_frame();
        report
    }

    /// Reconcile if the object list changed, pull animated transforms and
    /// submit a frame. Does nothing after teardown.
    pub fn render_tick(&mut self) -> (Option<ReconcileStats>, usize) {
        let Some(renderer) = self.renderer.as_mut() else {
            return (None, 0);
        };

        let stale = self
            .reconciled
            .as_ref()
            .map_or(true, |last| !Arc::ptr_eq(last, &self.desired));
        let reconciled = stale.then(|| {
            let stats = self.reconciler.reconcile(&self.desired, renderer);
            self.reconciled = Some(Arc::clone(&self.desired));
            if stats.is_structural() {
                debug!(
                    "Reconciled {} objects: {} created, {} destroyed, {} skipped",
                    self.desired.len(),
                    stats.created,
                    stats.destroyed,
                    stats.skipped
                );
            }
            stats
        });

        let animated = self.reconciler.sync_animation(&self.clock.state(), renderer);

        if let Err(e) = renderer.draw() {
            warn!("Draw failed: {}", e);
        }
        self.frames_rendered += 1;

        (reconciled, animated)
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn is_torn_down(&self) -> bool {
        self.renderer.is_none()
    }

    /// Stop both tasks, release every node and dispose the renderer.
    ///
    /// Runs once; later calls and later pumps are no-ops. Release failures
    /// are logged and never surface to the caller.
    pub fn teardown(&mut self) {
        drop(self.shutdown());
    }

    /// Tear down, handing the disposed renderer back instead of dropping it
    pub fn into_renderer(mut self) -> Option<R> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<R> {
        let mut renderer = self.renderer.take()?;

        self.playback_task = None;
        self.render_task = None;
        self.scheduler.cancel_all();
        self.clock.pause();

        let released = self.reconciler.clear(&mut renderer);
        self.reconciled = None;

        if let Err(e) = renderer.dispose() {
            warn!("Renderer disposal failed: {}", e);
        }
        info!(
            "Viewport torn down after {} frames, released {} nodes",
            self.frames_rendered, released
        );

        Some(renderer)
    }
}

impl<R: SceneRenderer> Drop for Viewport<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}
