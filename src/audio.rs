//! One-shot sound cue triggering
//!
//! The sim emits `SoundCue`s; this module forwards them to whatever output
//! backend the embedding provides. Cues overlap previous sounds rather than
//! queuing, and a missing backend simply disables audio.

/// Sound cue kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Lane-change input accepted
    LaneChange,
    /// Fatal hazard collision
    Death,
    /// Token collected
    Pickup,
}

/// Output backend for one-shot playback
pub trait SoundSink {
    /// Play the cue on the shared output channel, overlapping prior sounds
    fn play(&mut self, cue: SoundCue);
}

/// Shared trigger for one-shot cues
///
/// One instance exists for the lifetime of the gameplay screen. Constructed
/// without a sink the trigger is silently disabled.
pub struct SoundTrigger {
    sink: Option<Box<dyn SoundSink>>,
    muted: bool,
}

impl SoundTrigger {
    pub fn new(sink: Box<dyn SoundSink>) -> Self {
        Self {
            sink: Some(sink),
            muted: false,
        }
    }

    /// Audio disabled entirely (no backend available)
    pub fn disabled() -> Self {
        log::warn!("no sound sink configured - audio disabled");
        Self {
            sink: None,
            muted: false,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Fire-and-forget playback; skipped silently when disabled or muted
    pub fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        if let Some(sink) = &mut self.sink {
            sink.play(cue);
        }
    }
}

/// Sink that logs cues; useful as a native default
pub struct LogSink;

impl SoundSink for LogSink {
    fn play(&mut self, cue: SoundCue) {
        log::debug!("sound cue: {:?}", cue);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingSink;
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_play_forwards_to_sink() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut trigger = SoundTrigger::new(Box::new(RecordingSink(played.clone())));

        trigger.play(SoundCue::LaneChange);
        trigger.play(SoundCue::Pickup);
        assert_eq!(
            *played.borrow(),
            vec![SoundCue::LaneChange, SoundCue::Pickup]
        );
    }

    #[test]
    fn test_muted_and_disabled_are_silent() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut trigger = SoundTrigger::new(Box::new(RecordingSink(played.clone())));
        trigger.set_muted(true);
        trigger.play(SoundCue::Death);
        assert!(played.borrow().is_empty());

        let mut disabled = SoundTrigger::disabled();
        disabled.play(SoundCue::Death); // must not panic
    }
}
