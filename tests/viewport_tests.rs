use std::f32::consts::PI;
use std::sync::Arc;

use scene_animator::config::PlaybackConfig;
use scene_animator::core::Viewport;
use scene_animator::scene::{
    AnimatedProperty, CubeOptions, Keyframe, SceneDocument, SceneObject, SceneSnapshot, Track,
};
use scene_animator::RecordingRenderer;

/// Four playback ticks per second keeps every step exactly representable
const HZ: f32 = 4.0;
const STEP: f32 = 0.25;

fn config(duration: u32) -> PlaybackConfig {
    PlaybackConfig {
        hz: HZ,
        duration,
        max_catch_up: 8,
    }
}

fn viewport(duration: u32) -> Viewport<RecordingRenderer> {
    Viewport::new(RecordingRenderer::new(), &config(duration))
}

fn spinning_scene(duration: u32) -> SceneSnapshot {
    Arc::from(vec![SceneObject::cube("spin", [0.0, 0.5, 0.0]).with_track(
        AnimatedProperty::RotationY,
        Track::linear(Keyframe::new(0, 0.0), Keyframe::new(duration, 2.0 * PI)),
    )])
}

fn rotation_of(viewport: &Viewport<RecordingRenderer>, id: &str) -> f32 {
    let mesh = viewport.reconciler().get(id).unwrap().mesh();
    viewport.renderer().unwrap().mesh(mesh).unwrap().transform.rotation.y
}

#[cfg(test)]
mod viewport_tests {
    use super::*;

    #[test]
    fn test_starts_paused_and_rendering() {
        let mut vp = viewport(240);
        assert!(vp.is_rendering());
        assert!(!vp.playback().is_playing());

        let report = vp.pump(STEP);
        assert!(report.rendered);
        assert_eq!(report.playback_ticks, 0);
        assert_eq!(report.current_frame, 0);
        assert_eq!(vp.renderer().unwrap().draws(), 1);
    }

    #[test]
    fn test_playback_advances_before_animation_sync() {
        let mut vp = viewport(240);
        vp.set_objects(spinning_scene(240));
        vp.play();

        let report = vp.pump(STEP);

        assert_eq!(report.playback_ticks, 1);
        assert_eq!(report.current_frame, 1);
        assert_eq!(report.animated_nodes, 1);
        let expected = 2.0 * PI / 240.0;
        assert!((rotation_of(&vp, "spin") - expected).abs() < 1e-6);
    }

    #[test]
    fn test_playback_rate_is_independent_of_refresh_rate() {
        let mut vp = viewport(240);
        vp.play();

        for _ in 0..8 {
            vp.pump(STEP / 2.0);
        }
        assert_eq!(vp.current_frame(), 4);
        assert_eq!(vp.frames_rendered(), 8);
    }

    #[test]
    fn test_stalled_frame_catch_up_is_capped() {
        let mut vp = viewport(240);
        vp.play();

        let report = vp.pump(10.0);
        assert_eq!(report.playback_ticks, 8);
        assert_eq!(vp.current_frame(), 8);
    }

    #[test]
    fn test_reconciles_only_when_snapshot_changes() {
        let mut vp = viewport(240);
        let scene = spinning_scene(240);
        vp.set_objects(Arc::clone(&scene));

        let first = vp.pump(STEP).reconciled.unwrap();
        assert_eq!(first.created, 1);
        assert!(vp.pump(STEP).reconciled.is_none());

        vp.set_objects(Arc::clone(&scene));
        assert!(vp.pump(STEP).reconciled.is_none());

        vp.set_objects(Arc::from(scene.to_vec()));
        let again = vp.pump(STEP).reconciled.unwrap();
        assert_eq!(again.created, 0);
        assert_eq!(again.updated, 1);
        assert_eq!(vp.renderer().unwrap().created(), 1);
    }

    #[test]
    fn test_document_edits_flow_through() {
        let mut vp = viewport(240);
        let mut doc = SceneDocument::with_seed(240, 9);

        doc.add_cube(CubeOptions::default());
        doc.add_cube(CubeOptions::default());
        vp.set_objects(doc.snapshot());
        vp.pump(STEP);
        assert_eq!(vp.reconciler().len(), 2);

        doc.generate_city_blocks(3);
        vp.set_objects(doc.snapshot());
        let stats = vp.pump(STEP).reconciled.unwrap();
        assert_eq!(stats.created, 9);
        assert_eq!(stats.destroyed, 2);

        doc.clear();
        vp.set_objects(doc.snapshot());
        vp.pump(STEP);
        assert!(vp.reconciler().is_empty());
        assert_eq!(vp.renderer().unwrap().live_meshes(), 0);
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut vp = viewport(240);
        vp.play();
        vp.pump(STEP);
        vp.pause();

        let report = vp.pump(1.0);
        assert_eq!(report.playback_ticks, 0);
        assert_eq!(vp.current_frame(), 1);
        assert!(report.rendered);
    }

    #[test]
    fn test_resume_does_not_replay_paused_time() {
        let mut vp = viewport(240);
        vp.play();
        vp.pump(STEP);
        vp.pause();
        vp.pump(1.0);
        vp.play();

        assert_eq!(vp.pump(STEP).playback_ticks, 1);
        assert_eq!(vp.current_frame(), 2);
    }

    #[test]
    fn test_scrub_while_paused_shows_frame() {
        let mut vp = viewport(240);
        vp.set_objects(spinning_scene(240));
        vp.set_frame(120);

        vp.pump(STEP);
        assert!((rotation_of(&vp, "spin") - PI).abs() < 1e-5);
    }

    #[test]
    fn test_toggle_and_rewind() {
        let mut vp = viewport(240);
        vp.toggle_playback();
        vp.pump(STEP * 3.0);
        assert_eq!(vp.current_frame(), 3);

        vp.rewind();
        assert_eq!(vp.current_frame(), 0);
        assert!(vp.playback().is_playing());
    }

    #[test]
    fn test_stopping_render_loop_keeps_playback() {
        let mut vp = viewport(240);
        vp.play();
        vp.stop_render_loop();

        let report = vp.pump(STEP);
        assert!(!report.rendered);
        assert_eq!(report.playback_ticks, 1);
        assert_eq!(vp.renderer().unwrap().draws(), 0);

        vp.start_render_loop();
        assert!(vp.pump(STEP).rendered);
    }

    #[test]
    fn test_resize_reaches_renderer_only() {
        let mut vp = viewport(240);
        vp.set_objects(spinning_scene(240));
        vp.play();
        vp.pump(STEP);

        vp.resize(800, 600);

        assert_eq!(vp.renderer().unwrap().size(), (800, 600));
        assert_eq!(vp.current_frame(), 1);
        assert_eq!(vp.reconciler().len(), 1);
    }

    #[test]
    fn test_teardown_releases_everything_once() {
        let mut vp = viewport(240);
        vp.set_objects(spinning_scene(240));
        vp.play();
        vp.pump(STEP);
        vp.pump(STEP);

        let renderer = vp.into_renderer().unwrap();
        assert_eq!(renderer.disposals(), 1);
        assert_eq!(renderer.live_meshes(), 0);
        assert_eq!(renderer.destroyed(), 1);
        assert_eq!(renderer.draws(), 2);
    }

    #[test]
    fn test_pump_after_teardown_is_inert() {
        let mut vp = viewport(240);
        vp.set_objects(spinning_scene(240));
        vp.play();
        vp.pump(STEP);

        vp.teardown();
        vp.teardown();

        assert!(vp.is_torn_down());
        assert!(!vp.is_rendering());
        assert!(vp.reconciler().is_empty());
        let report = vp.pump(STEP);
        assert!(!report.rendered);
        assert_eq!(report.playback_ticks, 0);
        assert_eq!(vp.frames_rendered(), 1);

        vp.play();
        assert_eq!(vp.pump(STEP).playback_ticks, 0);
        assert!(vp.into_renderer().is_none());
    }

    #[test]
    fn test_teardown_survives_release_failures() {
        let mut vp = Viewport::new(RecordingRenderer::new().failing_destroy(), &config(240));
        vp.set_objects(spinning_scene(240));
        vp.pump(STEP);

        let renderer = vp.into_renderer().unwrap();
        assert_eq!(renderer.live_meshes(), 0);
        assert_eq!(renderer.disposals(), 1);
    }
}
