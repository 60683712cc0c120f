use scene_animator::core::{PlayState, PlaybackClock, DEFAULT_DURATION};

fn playing(duration: u32) -> PlaybackClock {
    let mut clock = PlaybackClock::new(duration);
    clock.play();
    clock
}

#[cfg(test)]
mod playback_tests {
    use super::*;

    #[test]
    fn test_default_timeline() {
        let clock = PlaybackClock::default();
        assert_eq!(clock.duration(), DEFAULT_DURATION);
        assert_eq!(clock.current_frame(), 0);
        assert_eq!(clock.state().play_state, PlayState::Paused);
    }

    #[test]
    fn test_full_cycle_returns_to_zero() {
        let mut clock = playing(240);
        for _ in 0..240 {
            clock.tick();
        }
        assert_eq!(clock.current_frame(), 240);
        assert_eq!(clock.tick(), 0);
    }

    #[test]
    fn test_frames_stay_in_range() {
        let mut clock = playing(7);
        for _ in 0..100 {
            assert!(clock.tick() <= 7);
        }
    }

    #[test]
    fn test_shrinking_duration_mid_playback() {
        let mut clock = playing(240);
        for _ in 0..5 {
            clock.tick();
        }
        clock.set_duration(10);

        assert_eq!(clock.tick(), 6);
        for _ in 0..4 {
            clock.tick();
        }
        assert_eq!(clock.current_frame(), 10);
        assert_eq!(clock.tick(), 0);
    }

    #[test]
    fn test_frame_past_new_duration_wraps_on_next_tick() {
        let mut clock = playing(240);
        clock.set_frame(200);
        clock.set_duration(10);
        assert_eq!(clock.current_frame(), 200);
        assert_eq!(clock.tick(), (201 % 11) as u32);
    }

    #[test]
    fn test_zero_duration_clamps_to_one() {
        let mut clock = playing(0);
        assert_eq!(clock.duration(), 1);
        clock.set_duration(0);
        assert_eq!(clock.duration(), 1);
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 0);
    }

    #[test]
    fn test_pause_freezes_and_scrub_still_works() {
        let mut clock = playing(240);
        clock.tick();
        clock.pause();
        assert_eq!(clock.tick(), 1);

        clock.set_frame(42);
        assert_eq!(clock.current_frame(), 42);
        assert_eq!(clock.tick(), 42);
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut clock = PlaybackClock::new(30);
        assert_eq!(clock.toggle(), PlayState::Playing);
        assert_eq!(clock.toggle(), PlayState::Paused);
    }

    #[test]
    fn test_frame_near_u32_max_does_not_overflow() {
        let mut clock = playing(u32::MAX);
        clock.set_frame(u32::MAX);
        assert_eq!(clock.tick(), 0);
    }
}
