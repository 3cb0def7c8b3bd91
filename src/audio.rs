//! Procedural sound effects
//!
//! Every cue is described as a list of timed stages, each a handful of
//! oscillator or noise voices. The catalogue is plain data so it can be
//! inspected off the browser; [`WebSynth`] plays it through the Web Audio API.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player fires a projectile
    Shoot,
    /// Speed boost engaged
    Boost,
    /// Player takes a hit
    Damage,
    /// Enemy or player destroyed
    Explosion,
    /// Data node picked up
    DataCollect,
    /// Power-up appeared or collected
    PowerUp,
    LevelComplete,
    GameStart,
    GameOver,
    LevelUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// A single sounding element of a stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Voice {
    /// Fixed pitch, starting `offset` seconds into the stage
    Tone {
        freq: f32,
        duration: f32,
        volume: f32,
        waveform: Waveform,
        offset: f32,
    },
    /// Exponential pitch glide
    Sweep {
        from: f32,
        to: f32,
        duration: f32,
        volume: f32,
        waveform: Waveform,
    },
    /// Simultaneous tones sharing the volume
    Chord {
        freqs: &'static [f32],
        duration: f32,
        volume: f32,
        waveform: Waveform,
    },
    /// Band-passed white noise
    Noise { duration: f32, volume: f32 },
}

impl Voice {
    /// Seconds from stage start until this voice is silent
    pub fn end(&self) -> f32 {
        match *self {
            Voice::Tone {
                duration, offset, ..
            } => offset + duration,
            Voice::Sweep { duration, .. }
            | Voice::Chord { duration, .. }
            | Voice::Noise { duration, .. } => duration,
        }
    }
}

/// Voices that start together, `delay_ms` after the cue is triggered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub delay_ms: u32,
    pub voices: &'static [Voice],
}

/// ADSR shape shared by every tone
pub mod envelope {
    pub const ATTACK: f32 = 0.02;
    pub const DECAY: f32 = 0.05;
    pub const SUSTAIN: f32 = 0.7;
    pub const RELEASE: f32 = 0.1;
}

/// Noise band-pass centre and Q
pub const NOISE_FILTER_HZ: f32 = 1000.0;
pub const NOISE_FILTER_Q: f32 = 1.0;

/// Per-tone amplitude so a chord is no louder than a single voice
pub fn chord_voice_volume(volume: f32, voices: usize) -> f32 {
    if voices == 0 {
        return 0.0;
    }
    volume / (voices as f32).sqrt()
}

const fn tone(freq: f32, duration: f32, volume: f32, waveform: Waveform, offset: f32) -> Voice {
    Voice::Tone {
        freq,
        duration,
        volume,
        waveform,
        offset,
    }
}

const fn sweep(from: f32, to: f32, duration: f32, volume: f32, waveform: Waveform) -> Voice {
    Voice::Sweep {
        from,
        to,
        duration,
        volume,
        waveform,
    }
}

const fn chord(freqs: &'static [f32], duration: f32, volume: f32, waveform: Waveform) -> Voice {
    Voice::Chord {
        freqs,
        duration,
        volume,
        waveform,
    }
}

const fn noise(duration: f32, volume: f32) -> Voice {
    Voice::Noise { duration, volume }
}

const C5: f32 = 523.25;
const E5: f32 = 659.25;
const G5: f32 = 783.99;
const C6: f32 = 1046.5;

use self::Waveform::{Sawtooth, Sine, Square, Triangle};

const SHOOT: &[Stage] = &[Stage {
    delay_ms: 0,
    voices: &[
        sweep(1200.0, 600.0, 0.15, 0.15, Sawtooth),
        tone(880.0, 0.05, 0.1, Sine, 0.0),
    ],
}];

const BOOST: &[Stage] = &[Stage {
    delay_ms: 0,
    voices: &[sweep(300.0, 800.0, 0.3, 0.2, Sine)],
}];

const DAMAGE: &[Stage] = &[Stage {
    delay_ms: 0,
    voices: &[sweep(400.0, 100.0, 0.3, 0.25, Sawtooth), noise(0.2, 0.2)],
}];

const EXPLOSION: &[Stage] = &[Stage {
    delay_ms: 0,
    voices: &[
        noise(0.5, 0.3),
        tone(60.0, 0.6, 0.4, Sine, 0.0),
        tone(100.0, 0.3, 0.2, Square, 0.0),
    ],
}];

const DATA_COLLECT: &[Stage] = &[Stage {
    delay_ms: 0,
    voices: &[
        tone(C5, 0.1, 0.2, Sine, 0.0),
        tone(E5, 0.1, 0.2, Sine, 0.08),
        tone(G5, 0.15, 0.2, Sine, 0.16),
    ],
}];

const POWER_UP: &[Stage] = &[
    Stage {
        delay_ms: 0,
        voices: &[sweep(300.0, 1200.0, 0.5, 0.2, Sine)],
    },
    Stage {
        delay_ms: 200,
        voices: &[chord(&[C5, E5, G5], 0.4, 0.2, Sine)],
    },
];

const LEVEL_COMPLETE: &[Stage] = &[
    Stage {
        delay_ms: 0,
        voices: &[
            tone(C5, 0.15, 0.2, Triangle, 0.0),
            tone(E5, 0.15, 0.2, Triangle, 0.15),
            tone(G5, 0.15, 0.2, Triangle, 0.3),
            tone(C6, 0.3, 0.3, Triangle, 0.45),
        ],
    },
    Stage {
        delay_ms: 800,
        voices: &[chord(&[C5, E5, G5, C6], 1.0, 0.15, Sine)],
    },
];

const GAME_START: &[Stage] = &[
    Stage {
        delay_ms: 0,
        voices: &[chord(&[261.63, 329.63, 392.0], 0.6, 0.15, Sine)],
    },
    Stage {
        delay_ms: 600,
        voices: &[chord(&[293.66, 349.23, 440.0], 0.6, 0.15, Sine)],
    },
    Stage {
        delay_ms: 1200,
        voices: &[chord(&[329.63, 392.0, 493.88], 0.8, 0.15, Sine)],
    },
];

const GAME_OVER: &[Stage] = &[
    Stage {
        delay_ms: 0,
        voices: &[sweep(400.0, 100.0, 1.0, 0.3, Sawtooth)],
    },
    Stage {
        delay_ms: 500,
        voices: &[chord(&[261.63, 277.18, 493.88], 1.5, 0.2, Square)],
    },
    Stage {
        delay_ms: 1500,
        voices: &[noise(0.6, 0.2)],
    },
];

const LEVEL_UP: &[Stage] = &[
    Stage {
        delay_ms: 0,
        voices: &[sweep(400.0, 1200.0, 0.4, 0.2, Sine)],
    },
    Stage {
        delay_ms: 400,
        voices: &[chord(&[C5, E5, G5], 0.6, 0.15, Triangle)],
    },
];

impl SoundEffect {
    pub const ALL: [SoundEffect; 10] = [
        SoundEffect::Shoot,
        SoundEffect::Boost,
        SoundEffect::Damage,
        SoundEffect::Explosion,
        SoundEffect::DataCollect,
        SoundEffect::PowerUp,
        SoundEffect::LevelComplete,
        SoundEffect::GameStart,
        SoundEffect::GameOver,
        SoundEffect::LevelUp,
    ];

    pub fn stages(self) -> &'static [Stage] {
        match self {
            SoundEffect::Shoot => SHOOT,
            SoundEffect::Boost => BOOST,
            SoundEffect::Damage => DAMAGE,
            SoundEffect::Explosion => EXPLOSION,
            SoundEffect::DataCollect => DATA_COLLECT,
            SoundEffect::PowerUp => POWER_UP,
            SoundEffect::LevelComplete => LEVEL_COMPLETE,
            SoundEffect::GameStart => GAME_START,
            SoundEffect::GameOver => GAME_OVER,
            SoundEffect::LevelUp => LEVEL_UP,
        }
    }

    /// Total length in milliseconds, including release tails
    pub fn duration_ms(self) -> u32 {
        self.stages()
            .iter()
            .flat_map(|stage| {
                stage.voices.iter().map(move |voice| {
                    stage.delay_ms + ((voice.end() + envelope::RELEASE) * 1000.0).round() as u32
                })
            })
            .max()
            .unwrap_or(0)
    }
}

/// Background drone layers
pub mod ambient {
    pub const DRONE_HZ: f32 = 55.0;
    pub const DRONE_VOLUME: f32 = 0.05;
    pub const PAD_HZ: f32 = 110.0;
    pub const PAD_VOLUME: f32 = 0.03;
    pub const LFO_HZ: f32 = 0.05;
    pub const LFO_DEPTH: f32 = 5.0;
    pub const HISS_VOLUME: f32 = 0.03;
    pub const HISS_FILTER_HZ: f32 = 2000.0;
    pub const HISS_FILTER_Q: f32 = 2.0;
}

#[cfg(target_arch = "wasm32")]
pub use web::WebSynth;

#[cfg(target_arch = "wasm32")]
mod web {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use web_sys::{
        AudioBufferSourceNode, AudioContext, AudioContextState, BiquadFilterNode,
        BiquadFilterType, GainNode, OscillatorNode, OscillatorType,
    };

    use super::{SoundEffect, Voice, Waveform, ambient, chord_voice_volume, envelope};
    use crate::error::SetupError;
    use crate::platform::AudioNotifier;

    impl From<Waveform> for OscillatorType {
        fn from(waveform: Waveform) -> Self {
            match waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
                Waveform::Triangle => OscillatorType::Triangle,
            }
        }
    }

    /// Web Audio player for the effect catalogue
    pub struct WebSynth {
        ctx: AudioContext,
        master: GainNode,
        noise_rng: Pcg32,
        ambient: Vec<OscillatorNode>,
        ambient_noise: Option<AudioBufferSourceNode>,
    }

    impl WebSynth {
        pub fn new(master_volume: f32) -> Result<Self, SetupError> {
            let ctx = AudioContext::new().map_err(|_| SetupError::AudioUnavailable)?;
            let master = ctx.create_gain().map_err(|_| SetupError::AudioUnavailable)?;
            master.gain().set_value(master_volume.clamp(0.0, 1.0));
            master
                .connect_with_audio_node(&ctx.destination())
                .map_err(|_| SetupError::AudioUnavailable)?;
            log::info!("Audio initialized (sample rate {} Hz)", ctx.sample_rate());

            Ok(Self {
                ctx,
                master,
                noise_rng: Pcg32::seed_from_u64(js_sys::Date::now() as u64),
                ambient: Vec::new(),
                ambient_noise: None,
            })
        }

        /// Low drone, slow-wobbling pad and faint hiss, looped until stopped
        pub fn start_ambient(&mut self) {
            self.stop_ambient();
            self.wake();
            let t = self.ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ambient::DRONE_HZ, Waveform::Sine) {
                gain.gain().set_value(ambient::DRONE_VOLUME);
                osc.start().ok();
                self.ambient.push(osc);
            }

            if let Some((osc, gain)) = self.create_osc(ambient::PAD_HZ, Waveform::Sine) {
                gain.gain().set_value(ambient::PAD_VOLUME);
                if let Ok(lfo) = self.ctx.create_oscillator() {
                    lfo.frequency().set_value(ambient::LFO_HZ);
                    if let Ok(depth) = self.ctx.create_gain() {
                        depth.gain().set_value(ambient::LFO_DEPTH);
                        lfo.connect_with_audio_node(&depth).ok();
                        depth.connect_with_audio_param(&osc.frequency()).ok();
                        lfo.start().ok();
                        self.ambient.push(lfo);
                    }
                }
                osc.start().ok();
                self.ambient.push(osc);
            }

            if let Some(source) = self.noise_source(
                2.0,
                ambient::HISS_VOLUME,
                ambient::HISS_FILTER_HZ,
                ambient::HISS_FILTER_Q,
                t,
            ) {
                source.set_loop(true);
                source.start().ok();
                self.ambient_noise = Some(source);
            }
        }

        pub fn stop_ambient(&mut self) {
            for osc in self.ambient.drain(..) {
                osc.stop().ok();
            }
            if let Some(source) = self.ambient_noise.take() {
                source.stop().ok();
            }
        }

        /// Browsers keep a fresh context suspended until a user gesture
        fn wake(&self) {
            if self.ctx.state() == AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
        }

        fn create_osc(&self, freq: f32, waveform: Waveform) -> Option<(OscillatorNode, GainNode)> {
            let osc = self.ctx.create_oscillator().ok()?;
            let gain = self.ctx.create_gain().ok()?;

            osc.set_type(waveform.into());
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.master).ok()?;

            Some((osc, gain))
        }

        /// Attack to full, decay to sustain, hold, release to silence
        fn shape(gain: &GainNode, volume: f32, start: f64, duration: f32) {
            let g = gain.gain();
            let attack_end = start + f64::from(envelope::ATTACK);
            let decay_end = attack_end + f64::from(envelope::DECAY);
            let end = start + f64::from(duration);
            let release_start = (end - f64::from(envelope::RELEASE)).max(decay_end);

            g.set_value_at_time(0.0, start).ok();
            g.linear_ramp_to_value_at_time(volume, attack_end).ok();
            g.linear_ramp_to_value_at_time(volume * envelope::SUSTAIN, decay_end)
                .ok();
            g.set_value_at_time(volume * envelope::SUSTAIN, release_start)
                .ok();
            g.linear_ramp_to_value_at_time(0.0, release_start + f64::from(envelope::RELEASE))
                .ok();
        }

        fn tone(&self, freq: f32, duration: f32, volume: f32, waveform: Waveform, start: f64) {
            let Some((osc, gain)) = self.create_osc(freq, waveform) else {
                return;
            };
            Self::shape(&gain, volume, start, duration);
            osc.start_with_when(start).ok();
            osc.stop_with_when(start + f64::from(duration + envelope::RELEASE))
                .ok();
        }

        fn sweep(&self, from: f32, to: f32, duration: f32, volume: f32, waveform: Waveform, start: f64) {
            let Some((osc, gain)) = self.create_osc(from, waveform) else {
                return;
            };
            let end = start + f64::from(duration);

            osc.frequency().set_value_at_time(from, start).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, end)
                .ok();
            gain.gain().set_value_at_time(volume, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, end)
                .ok();

            osc.start_with_when(start).ok();
            osc.stop_with_when(end + 0.05).ok();
        }

        fn noise_source(
            &mut self,
            duration: f32,
            volume: f32,
            filter_hz: f32,
            q: f32,
            start: f64,
        ) -> Option<AudioBufferSourceNode> {
            let rate = self.ctx.sample_rate();
            let frames = ((duration * rate) as u32).max(1);
            let buffer = self.ctx.create_buffer(1, frames, rate).ok()?;
            let mut samples: Vec<f32> = (0..frames)
                .map(|_| self.noise_rng.random_range(-1.0..1.0))
                .collect();
            buffer.copy_to_channel(&mut samples, 0).ok()?;

            let source = self.ctx.create_buffer_source().ok()?;
            source.set_buffer(Some(&buffer));

            let filter: BiquadFilterNode = self.ctx.create_biquad_filter().ok()?;
            filter.set_type(BiquadFilterType::Bandpass);
            filter.frequency().set_value(filter_hz);
            filter.q().set_value(q);

            let gain = self.ctx.create_gain().ok()?;
            gain.gain().set_value_at_time(volume, start).ok();

            source.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.master).ok()?;

            Some(source)
        }

        fn noise(&mut self, duration: f32, volume: f32, start: f64) {
            let Some(source) = self.noise_source(
                duration,
                volume,
                super::NOISE_FILTER_HZ,
                super::NOISE_FILTER_Q,
                start,
            ) else {
                return;
            };
            source.start_with_when(start).ok();
            source.stop_with_when(start + f64::from(duration)).ok();
        }

        fn voice(&mut self, voice: &Voice, start: f64) {
            match *voice {
                Voice::Tone {
                    freq,
                    duration,
                    volume,
                    waveform,
                    offset,
                } => self.tone(freq, duration, volume, waveform, start + f64::from(offset)),
                Voice::Sweep {
                    from,
                    to,
                    duration,
                    volume,
                    waveform,
                } => self.sweep(from, to, duration, volume, waveform, start),
                Voice::Chord {
                    freqs,
                    duration,
                    volume,
                    waveform,
                } => {
                    let each = chord_voice_volume(volume, freqs.len());
                    for &freq in freqs {
                        self.tone(freq, duration, each, waveform, start);
                    }
                }
                Voice::Noise { duration, volume } => self.noise(duration, volume, start),
            }
        }
    }

    impl AudioNotifier for WebSynth {
        fn play(&mut self, effect: SoundEffect) {
            self.wake();
            let now = self.ctx.current_time();
            for stage in effect.stages() {
                let start = now + f64::from(stage.delay_ms) / 1000.0;
                for voice in stage.voices {
                    self.voice(voice, start);
                }
            }
        }

        fn pause(&mut self) {
            let _ = self.ctx.suspend();
        }

        fn resume(&mut self) {
            let _ = self.ctx.resume();
        }
    }
}
