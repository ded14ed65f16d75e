mod common;

use common::*;
use std::path::Path;
use std::time::Duration;
use ticksheet::midi::{parse_bytes, parse_file, CollisionPolicy, NoteKind};
use ticksheet::ParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_track_scenario() {
        let table = instruments();
        let midi = parse_bytes(
            "scenario.mid",
            &two_track_song().bytes(),
            &table,
            CollisionPolicy::KeepAll,
        )
        .unwrap();

        assert_eq!(midi.name(), "scenario.mid");
        assert_eq!(midi.max_tick(), 10);
        assert_eq!(midi.tick_duration(), Duration::from_micros(1000));
        assert_eq!(midi.tracks().len(), 2);

        let at0 = midi.notes(0);
        assert_eq!(at0.len(), 1);
        assert_eq!(at0[0].kind(), NoteKind::On);
        assert_eq!(at0[0].printable(), "4C");
        assert_eq!(at0[0].velocity(), 100);
        assert_eq!(at0[0].instrument(), "Piano");

        let at5 = midi.notes(5);
        assert_eq!(at5.len(), 1);
        assert_eq!(at5[0].printable(), "4D");
        assert_eq!(at5[0].instrument(), "Strings");

        let at10 = midi.notes(10);
        assert_eq!(at10.len(), 1);
        assert_eq!(at10[0].kind(), NoteKind::Off);
        assert_eq!(at10[0].printable(), "4C");
    }

    #[test]
    fn test_every_input_tick_is_retrievable() {
        let events: Vec<(u64, Vec<u8>)> = (0..40u64)
            .map(|t| (t * 3, note_on((t % 4) as u8, 30 + t as u8, 64)))
            .collect();
        let bytes = SmfWriter::metrical(96).track(events).bytes();
        let midi = parse_bytes("grid", &bytes, &instruments(), CollisionPolicy::KeepAll).unwrap();

        assert_eq!(midi.note_count(), 40);
        for t in 0..40u64 {
            let notes = midi.notes(t * 3);
            assert_eq!(notes.len(), 1, "tick {}", t * 3);
            assert_eq!(notes[0].key(), 30 + t as u8);
            assert!(midi.notes(t * 3 + 1).is_empty());
        }
    }

    #[test]
    fn test_simultaneous_notes_in_one_track() {
        let chord = SmfWriter::metrical(96).track(vec![
            (4, note_on(0, 60, 80)),
            (4, note_on(0, 64, 80)),
            (4, note_on(0, 67, 80)),
            (8, note_off(0, 60)),
        ]);

        let kept = parse_bytes("chord", &chord.bytes(), &instruments(), CollisionPolicy::KeepAll)
            .unwrap();
        let keys: Vec<u8> = kept.notes(4).iter().map(|n| n.key()).collect();
        assert_eq!(keys, vec![60, 64, 67]);

        let last = parse_bytes(
            "chord",
            &chord.bytes(),
            &instruments(),
            CollisionPolicy::LastWriteWins,
        )
        .unwrap();
        let keys: Vec<u8> = last.notes(4).iter().map(|n| n.key()).collect();
        assert_eq!(keys, vec![67]);
    }

    #[test]
    fn test_non_note_events_are_skipped() {
        let bytes = SmfWriter::metrical(96)
            .track(vec![
                (0, program_change(0, 40)),
                (2, note_on(0, 60, 100)),
                (3, vec![0xB0, 7, 100]),
            ])
            .bytes();
        let midi = parse_bytes("cc", &bytes, &instruments(), CollisionPolicy::KeepAll).unwrap();
        assert_eq!(midi.note_count(), 1);
        assert!(midi.notes(0).is_empty());
        assert!(midi.notes(3).is_empty());
        // only notes count toward the last tick
        assert_eq!(midi.max_tick(), 2);
    }

    #[test]
    fn test_velocity_zero_note_on_is_release() {
        let bytes = SmfWriter::metrical(96)
            .track(vec![(0, note_on(0, 60, 100)), (4, note_on(0, 60, 0))])
            .bytes();
        let midi = parse_bytes("running", &bytes, &instruments(), CollisionPolicy::KeepAll)
            .unwrap();
        assert_eq!(midi.notes(4)[0].kind(), NoteKind::Off);
    }

    #[test]
    fn test_missing_instrument_is_empty_name() {
        let bytes = SmfWriter::metrical(96)
            .track(vec![(0, note_on(9, 36, 100)), (1, note_off(9, 36))])
            .bytes();
        let midi = parse_bytes("drums", &bytes, &instruments(), CollisionPolicy::KeepAll).unwrap();
        assert_eq!(midi.notes(0)[0].instrument(), "");
        assert_eq!(midi.notes(0)[0].channel(), 9);
    }

    #[test]
    fn test_tempo_change_is_integrated() {
        // 100 ticks at 500 ms/quarter, then 100 ticks at 250 ms/quarter
        let bytes = SmfWriter::metrical(100)
            .track(vec![(0, tempo(500_000)), (100, tempo(250_000))])
            .track(vec![(0, note_on(0, 60, 1)), (200, note_off(0, 60))])
            .bytes();
        let midi = parse_bytes("tempo", &bytes, &instruments(), CollisionPolicy::KeepAll).unwrap();
        assert_eq!(midi.max_tick(), 200);
        assert_eq!(midi.tick_duration(), Duration::from_micros(3750));
    }

    #[test]
    fn test_default_tempo_without_tempo_events() {
        let bytes = SmfWriter::metrical(480)
            .track(vec![(0, note_on(0, 60, 1)), (480, note_off(0, 60))])
            .bytes();
        let midi = parse_bytes("default", &bytes, &instruments(), CollisionPolicy::KeepAll)
            .unwrap();
        // half a second spread over 480 ticks
        assert_eq!(midi.tick_duration(), Duration::from_nanos(1_041_666));
    }

    #[test]
    fn test_smpte_timing() {
        // -25 fps, 40 subframes: 1000 ticks per second
        let bytes = SmfWriter::with_division(0xE728)
            .track(vec![(0, note_on(0, 60, 1)), (50, note_off(0, 60))])
            .bytes();
        let midi = parse_bytes("smpte", &bytes, &instruments(), CollisionPolicy::KeepAll).unwrap();
        assert_eq!(midi.tick_duration(), Duration::from_micros(1000));
    }

    #[test]
    fn test_zero_length_sequence() {
        let bytes = SmfWriter::metrical(96)
            .track(vec![(0, note_on(0, 60, 1))])
            .bytes();
        let result = parse_bytes("flat", &bytes, &instruments(), CollisionPolicy::KeepAll);
        assert!(matches!(result, Err(ParseError::ZeroTickLength)));
    }

    #[test]
    fn test_malformed_file() {
        let mut bytes = two_track_song().bytes();
        bytes.truncate(10);
        let result = parse_bytes("cut", &bytes, &instruments(), CollisionPolicy::KeepAll);
        assert!(matches!(result, Err(ParseError::Decode(_))));
    }

    #[test]
    fn test_parse_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = two_track_song().write_to(dir.path(), "song.mid");
        let midi = parse_file(&path, &instruments(), CollisionPolicy::KeepAll).unwrap();
        assert_eq!(midi.name(), "song.mid");
        assert_eq!(midi.max_tick(), 10);
        assert_eq!(midi.note_count(), 3);
    }

    #[test]
    fn test_missing_file() {
        let result = parse_file(
            Path::new("/no/such/song.mid"),
            &instruments(),
            CollisionPolicy::KeepAll,
        );
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }
}
