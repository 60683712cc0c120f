use crate::scene::{Track, Transform, KeyframeTracks};

/// Sample `track` at `frame` by linear interpolation between its first and
/// last keyframes, clamped at both ends.
///
/// Returns `None` for tracks with fewer than two keys; the caller keeps the
/// object's static value. A `duration` of zero pins the result to the first
/// key. Tracks whose endpoints share a frame hold the first value before that
/// frame and the last value from it on, instead of dividing by zero.
pub fn evaluate(track: &Track, duration: u32, frame: u32) -> Option<f32> {
    let (start, end) = track.endpoints()?;

    let t = if duration == 0 {
        0.0
    } else if end.frame == start.frame {
        if frame < start.frame {
            0.0
        } else {
            1.0
        }
    } else {
        (frame as f32 - start.frame as f32) / (end.frame as f32 - start.frame as f32)
    };

    let t = t.clamp(0.0, 1.0);
    Some(start.value + (end.value - start.value) * t)
}

/// Apply every animated track to `base`. Returns `None` when no track is
/// animated, leaving the base transform authoritative.
pub fn sample_transform(
    base: &Transform,
    tracks: &KeyframeTracks,
    duration: u32,
    frame: u32,
) -> Option<Transform> {
    let mut transform = *base;
    let mut animated = false;

    for (property, track) in tracks {
        if let Some(value) = evaluate(track, duration, frame) {
            property.apply(&mut transform, value);
            animated = true;
        }
    }

    animated.then_some(transform)
}
