use std::{thread, time::Duration};

use rodio::Source;

use crate::announcer::Cue;

pub const LONG_CUE_MS: u64 = 800;
pub const DOUBLE_CUE_GAP_MS: u64 = 300;

/// Fire-and-forget audio cue triggers.
pub trait CuePlayer: Send + Sync {
    fn play_long(&self);
    fn play_short(&self);
    fn play_double(&self);
}

pub fn play_cue(player: &dyn CuePlayer, cue: Cue) {
    match cue {
        Cue::Long => player.play_long(),
        Cue::Double => player.play_double(),
        Cue::Short => player.play_short(),
    }
}

/// Plays cues as sine beeps on the default output device. Every call blocks
/// until its beep is done, so it is meant to sit behind the cue worker.
#[derive(Clone, Debug)]
pub struct SoundBoard {
    frequency: f32,
    duration: u64,
}

impl SoundBoard {
    pub fn new(frequency: u32, duration: u64) -> SoundBoard {
        SoundBoard {
            frequency: frequency as f32,
            duration,
        }
    }

    fn beep(&self, millis: u64) {
        let (_stream, stream_handle) = match rodio::OutputStream::try_default() {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("no audio output available: {e}");
                return
            }
        };
        let sink = match rodio::Sink::try_new(&stream_handle) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!("unable to open audio sink: {e}");
                return
            }
        };
        let source = rodio::source::SineWave::new(self.frequency)
            .take_duration(Duration::from_millis(millis))
            .amplify(0.5);
        sink.append(source);
        sink.sleep_until_end();
    }
}

impl CuePlayer for SoundBoard {
    fn play_long(&self) {
        self.beep(LONG_CUE_MS);
    }

    fn play_short(&self) {
        self.beep(self.duration);
    }

    fn play_double(&self) {
        self.beep(self.duration);
        thread::sleep(Duration::from_millis(DOUBLE_CUE_GAP_MS.saturating_sub(self.duration)));
        self.beep(self.duration);
    }
}
