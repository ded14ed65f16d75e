mod common;

use common::*;
use crossbeam::channel::unbounded;
use ticksheet::backend::RecordingBackend;
use ticksheet::midi::{parse_bytes, CollisionPolicy};
use ticksheet::ui::ChannelProgress;
use ticksheet::{CancelToken, DedicatedThread, Executor, PlaybackOutcome, Player};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_on_clock_thread() {
        let midi = parse_bytes(
            "scenario.mid",
            &two_track_song().bytes(),
            &instruments(),
            CollisionPolicy::KeepAll,
        )
        .unwrap();
        let (sender, receiver) = unbounded();

        let handle = DedicatedThread::new()
            .spawn(move || {
                let mut player = Player::new(RecordingBackend::new(instruments()));
                let mut progress = ChannelProgress::new(sender);
                player.play(&midi, &mut progress, &CancelToken::new())
            })
            .unwrap();

        let percents: Vec<u8> = receiver.iter().collect();
        let report = handle.join().unwrap().unwrap();

        assert_eq!(report.outcome, PlaybackOutcome::Completed);
        assert_eq!(percents.first(), Some(&0));
        assert_eq!(percents.last(), Some(&100));
        assert_eq!(percents.len(), 11);
    }

    #[test]
    fn test_cancel_from_outside() {
        let bytes = SmfWriter::metrical(500)
            .track(vec![(0, tempo(500_000)), (0, note_on(0, 60, 1)), (5_000, note_off(0, 60))])
            .bytes();
        let midi = parse_bytes("long", &bytes, &instruments(), CollisionPolicy::KeepAll).unwrap();
        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let (sender, receiver) = unbounded();

        let handle = DedicatedThread::new()
            .spawn(move || {
                let mut player = Player::new(RecordingBackend::new(instruments()));
                let mut progress = ChannelProgress::new(sender);
                player.play(&midi, &mut progress, &remote)
            })
            .unwrap();

        // first report arrives once playback is running
        assert_eq!(receiver.recv().unwrap(), 0);
        cancel.cancel();
        let report = handle.join().unwrap().unwrap();
        assert_eq!(report.outcome, PlaybackOutcome::Cancelled);
        assert!(report.ticks < 5_000);
    }
}
