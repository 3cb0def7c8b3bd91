//! Collaborator traits
//!
//! The engine talks to sound, terminal text, screen effects and storage only
//! through these. Each is optional; a missing collaborator just means that
//! feature stays quiet.

use std::cell::RefCell;
use std::rc::Rc;

use super::storage::Storage;
use crate::audio::SoundEffect;

/// Fire-and-forget sound cues
pub trait AudioNotifier {
    fn play(&mut self, effect: SoundEffect);

    /// Suspend/resume all output (pause menu, hidden tab)
    fn pause(&mut self) {}
    fn resume(&mut self) {}

    // Named cues the engine calls. Each defaults to `play` with its effect.

    fn play_shoot(&mut self) {
        self.play(SoundEffect::Shoot);
    }
    fn play_boost(&mut self) {
        self.play(SoundEffect::Boost);
    }
    fn play_damage(&mut self) {
        self.play(SoundEffect::Damage);
    }
    fn play_explosion(&mut self) {
        self.play(SoundEffect::Explosion);
    }
    fn play_data_collect(&mut self) {
        self.play(SoundEffect::DataCollect);
    }
    fn play_power_up(&mut self) {
        self.play(SoundEffect::PowerUp);
    }
    fn play_level_complete(&mut self) {
        self.play(SoundEffect::LevelComplete);
    }
    fn play_game_start(&mut self) {
        self.play(SoundEffect::GameStart);
    }
    fn play_game_over(&mut self) {
        self.play(SoundEffect::GameOver);
    }
    fn play_level_up(&mut self) {
        self.play(SoundEffect::LevelUp);
    }
}

/// Presentation class for a terminal line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    System,
    Success,
    Error,
}

impl LineStyle {
    /// CSS class used by the web terminal
    pub fn class_name(self) -> &'static str {
        match self {
            LineStyle::System => "system-msg",
            LineStyle::Success => "success",
            LineStyle::Error => "error",
        }
    }
}

/// Append-only text output
pub trait TextSink {
    fn write_line(&mut self, message: &str, style: Option<LineStyle>);
}

/// Screen-wide visual effects
pub trait VisualNotifier {
    fn trigger_intense_glitch(&mut self, duration_ms: u32);
}

macro_rules! forward_cues {
    ($($cue:ident),*) => {
        $(fn $cue(&mut self) {
            self.borrow_mut().$cue();
        })*
    };
}

impl<T: AudioNotifier> AudioNotifier for Rc<RefCell<T>> {
    fn play(&mut self, effect: SoundEffect) {
        self.borrow_mut().play(effect);
    }

    forward_cues!(
        play_shoot,
        play_boost,
        play_damage,
        play_explosion,
        play_data_collect,
        play_power_up,
        play_level_complete,
        play_game_start,
        play_game_over,
        play_level_up
    );

    fn pause(&mut self) {
        self.borrow_mut().pause();
    }

    fn resume(&mut self) {
        self.borrow_mut().resume();
    }
}

impl<T: TextSink> TextSink for Rc<RefCell<T>> {
    fn write_line(&mut self, message: &str, style: Option<LineStyle>) {
        self.borrow_mut().write_line(message, style);
    }
}

impl<T: VisualNotifier> VisualNotifier for Rc<RefCell<T>> {
    fn trigger_intense_glitch(&mut self, duration_ms: u32) {
        self.borrow_mut().trigger_intense_glitch(duration_ms);
    }
}

/// Optional collaborators handed to the engine at construction
#[derive(Default)]
pub struct Collaborators {
    pub audio: Option<Box<dyn AudioNotifier>>,
    pub terminal: Option<Box<dyn TextSink>>,
    pub visuals: Option<Box<dyn VisualNotifier>>,
    pub storage: Option<Box<dyn Storage>>,
}

impl Collaborators {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_audio(mut self, audio: impl AudioNotifier + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    pub fn with_terminal(mut self, terminal: impl TextSink + 'static) -> Self {
        self.terminal = Some(Box::new(terminal));
        self
    }

    pub fn with_visuals(mut self, visuals: impl VisualNotifier + 'static) -> Self {
        self.visuals = Some(Box::new(visuals));
        self
    }

    pub fn with_storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Run a cue against the audio collaborator, if there is one
    pub(crate) fn audio(&mut self, cue: impl FnOnce(&mut dyn AudioNotifier)) {
        if let Some(audio) = self.audio.as_mut() {
            cue(audio.as_mut());
        }
    }

    pub(crate) fn line(&mut self, message: &str, style: Option<LineStyle>) {
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.write_line(message, style);
        }
    }

    pub(crate) fn glitch(&mut self, duration_ms: u32) {
        if let Some(visuals) = self.visuals.as_mut() {
            visuals.trigger_intense_glitch(duration_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<SoundEffect>,
        lines: Vec<String>,
    }

    impl AudioNotifier for Recorder {
        fn play(&mut self, effect: SoundEffect) {
            self.sounds.push(effect);
        }
    }

    impl TextSink for Recorder {
        fn write_line(&mut self, message: &str, _style: Option<LineStyle>) {
            self.lines.push(message.to_string());
        }
    }

    #[test]
    fn test_provided_methods_route_to_play() {
        let mut recorder = Recorder::default();
        recorder.play_shoot();
        recorder.play_level_up();
        assert_eq!(recorder.sounds, vec![SoundEffect::Shoot, SoundEffect::LevelUp]);
    }

    #[test]
    fn test_missing_collaborators_are_silent() {
        let mut collaborators = Collaborators::none();
        collaborators.audio(|a| a.play_explosion());
        collaborators.line("> nobody listening", None);
        collaborators.glitch(300);
    }

    #[test]
    fn test_shared_handles_record() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut collaborators = Collaborators::none()
            .with_audio(recorder.clone())
            .with_terminal(recorder.clone());
        collaborators.audio(|a| a.play_damage());
        collaborators.line("> hello", Some(LineStyle::System));
        assert_eq!(recorder.borrow().sounds, vec![SoundEffect::Damage]);
        assert_eq!(recorder.borrow().lines, vec!["> hello".to_string()]);
    }
}
