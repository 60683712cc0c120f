use std::f32::consts::PI;

use scene_animator::core::{evaluate, sample_transform};
use scene_animator::scene::{AnimatedProperty, Keyframe, KeyframeTracks, Track, Transform};

fn track(start: (u32, f32), end: (u32, f32)) -> Track {
    Track::linear(Keyframe::new(start.0, start.1), Keyframe::new(end.0, end.1))
}

#[cfg(test)]
mod keyframe_tests {
    use super::*;

    #[test]
    fn test_full_turn_halfway() {
        let spin = track((0, 0.0), (240, 2.0 * PI));
        let value = evaluate(&spin, 240, 120).unwrap();
        assert!((value - PI).abs() < 1e-5);
    }

    #[test]
    fn test_endpoints_are_exact() {
        let spin = track((0, 0.0), (240, 2.0 * PI));
        assert_eq!(evaluate(&spin, 240, 0), Some(0.0));
        assert_eq!(evaluate(&spin, 240, 240), Some(2.0 * PI));
    }

    #[test]
    fn test_clamps_outside_key_range() {
        let offset = track((60, 1.0), (180, 3.0));
        assert_eq!(evaluate(&offset, 240, 0), Some(1.0));
        assert_eq!(evaluate(&offset, 240, 240), Some(3.0));
        assert!((evaluate(&offset, 240, 120).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_only_first_and_last_keys_count() {
        let keys = vec![
            Keyframe::new(0, 0.0),
            Keyframe::new(50, 100.0),
            Keyframe::new(100, 10.0),
        ];
        let value = evaluate(&Track::new(keys), 100, 50).unwrap();
        assert!((value - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_short_tracks_do_not_animate() {
        assert_eq!(evaluate(&Track::default(), 240, 10), None);
        assert_eq!(evaluate(&Track::new(vec![Keyframe::new(0, 1.0)]), 240, 10), None);
    }

    #[test]
    fn test_zero_duration_pins_to_first_key() {
        let spin = track((0, 0.5), (240, 2.0));
        assert_eq!(evaluate(&spin, 0, 200), Some(0.5));
    }

    #[test]
    fn test_reversed_keys_interpolate_backwards() {
        let down = track((100, 4.0), (0, 0.0));
        assert_eq!(evaluate(&down, 100, 100), Some(4.0));
        assert_eq!(evaluate(&down, 100, 0), Some(0.0));
    }

    #[test]
    fn test_sample_overrides_only_animated_channel() {
        let base = Transform::from_arrays([1.0, 2.0, 3.0], [0.1, 0.2, 0.3], [1.0, 2.0, 1.0]);
        let mut tracks = KeyframeTracks::new();
        tracks.insert(AnimatedProperty::RotationY, track((0, 0.0), (10, 1.0)));

        let sampled = sample_transform(&base, &tracks, 10, 5).unwrap();

        assert_eq!(sampled.position, base.position);
        assert_eq!(sampled.scale, base.scale);
        assert_eq!(sampled.rotation.x, 0.1);
        assert_eq!(sampled.rotation.z, 0.3);
        assert!((sampled.rotation.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_without_tracks_is_none() {
        let base = Transform::IDENTITY;
        assert!(sample_transform(&base, &KeyframeTracks::new(), 240, 3).is_none());

        let mut empty = KeyframeTracks::new();
        empty.insert(AnimatedProperty::RotationY, Track::default());
        assert!(sample_transform(&base, &empty, 240, 3).is_none());
    }
}
