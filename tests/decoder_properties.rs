//! Property tests for frame decoding and the workout timer.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use pulse_display::core::{decode, DecodeError, Flags, Reading, TimerEvent, WorkoutTimer};

proptest! {
    #[test]
    fn u8_frames_decode_to_second_byte(flags in any::<u8>(), value in any::<u8>(), tail in proptest::collection::vec(any::<u8>(), 0..8)) {
        let flags = flags & !0x01;
        let mut frame = vec![flags, value];
        frame.extend(tail);

        let reading = decode(&frame).unwrap();
        prop_assert_eq!(reading.value, u16::from(value));
        prop_assert_eq!(reading.flags.bits(), flags);
    }

    #[test]
    fn u16_frames_decode_little_endian(flags in any::<u8>(), lo in any::<u8>(), hi in any::<u8>()) {
        let flags = flags | 0x01;
        let reading = decode(&[flags, lo, hi]).unwrap();
        prop_assert_eq!(u32::from(reading.value), u32::from(lo) + 256 * u32::from(hi));
    }

    #[test]
    fn short_frames_are_rejected(flags in any::<u8>(), value in any::<u8>()) {
        let too_short = matches!(decode(&[flags]), Err(DecodeError::FrameTooShort { .. }));
        prop_assert!(too_short);

        let two = decode(&[flags | 0x01, value]);
        prop_assert_eq!(two, Err(DecodeError::FrameTooShort { needed: 3, actual: 2 }));
    }

    #[test]
    fn elapsed_matches_wall_clock(start in 0i64..1_000_000_000, later in proptest::collection::vec(0i64..100_000, 1..20)) {
        let t0 = Utc.timestamp_opt(start, 0).unwrap();
        let mut timer = WorkoutTimer::new();
        let reading = Reading::new(72, Flags::default());

        prop_assert_eq!(timer.advance(&reading, t0), TimerEvent::Active { elapsed_seconds: 0 });
        for secs in later {
            let event = timer.advance(&reading, t0 + Duration::seconds(secs));
            prop_assert_eq!(event, TimerEvent::Active { elapsed_seconds: secs as u64 });
        }
    }

    #[test]
    fn session_end_fires_once_per_session(values in proptest::collection::vec(0u16..3, 1..50)) {
        let mut timer = WorkoutTimer::new();
        let t0 = Utc::now();
        let mut open = false;

        for (i, value) in values.into_iter().enumerate() {
            let event = timer.advance(&Reading::new(value, Flags::default()), t0 + Duration::seconds(i as i64));
            match event {
                TimerEvent::Active { .. } => {
                    prop_assert!(value > 0);
                    open = true;
                }
                TimerEvent::SessionEnded => {
                    prop_assert!(open);
                    prop_assert_eq!(value, 0);
                    open = false;
                }
                TimerEvent::Idle => {
                    prop_assert!(!open);
                    prop_assert_eq!(value, 0);
                }
            }
            prop_assert_eq!(timer.is_active(), open);
        }
    }
}
