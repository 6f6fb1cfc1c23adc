/// Sound engine: procedural sound cues via rodio.
///
/// Fixed cues are generated as in-memory WAV buffers at init time; pitched
/// cues (shuffle step, reveal) are generated on demand. Playback is
/// fire-and-forget via a detached rodio Sink.
///
/// Without the "sound" feature the stub SoundEngine does nothing.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{reveal_freq, shuffle_freq};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_memorize: Arc<Vec<u8>>,
        sfx_mistake: Arc<Vec<u8>>,
        sfx_success: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_memorize: Arc::new(super::make_wav(&super::gen_memorize())),
                sfx_mistake: Arc::new(super::make_wav(&super::gen_mistake())),
                sfx_success: Arc::new(super::make_wav(&super::gen_success())),
            })
        }

        fn play_bytes(&self, bytes: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(bytes)) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            self.play_bytes(buf.as_ref().clone());
        }

        pub fn play_memorize(&self) { self.play(&self.sfx_memorize); }
        pub fn play_mistake(&self) { self.play(&self.sfx_mistake); }
        pub fn play_success(&self) { self.play(&self.sfx_success); }

        /// Short tick per scramble step, rising through the scramble.
        pub fn play_shuffle(&self, step: u32, total: u32) {
            let wav = super::make_wav(&super::gen_blip(shuffle_freq(step, total), 0.04, 0.2));
            self.play_bytes(wav);
        }

        /// Correct click: pitch climbs with each revealed label.
        pub fn play_reveal(&self, id: usize, total: usize) {
            let wav = super::make_wav(&super::gen_blip(reveal_freq(id, total), 0.08, 0.25));
            self.play_bytes(wav);
        }
    }
}

// ── Pitch mapping (shared with tests) ──

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn shuffle_freq(step: u32, total: u32) -> f32 {
    let ratio = step as f32 / total.max(1) as f32;
    220.0 + ratio.clamp(0.0, 1.0) * 220.0
}

/// C major scale from C5 upward, one note per item.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn reveal_freq(id: usize, total: usize) -> f32 {
    const SCALE: [f32; 8] = [523.0, 587.0, 659.0, 698.0, 784.0, 880.0, 988.0, 1047.0];
    let top = total.clamp(1, SCALE.len());
    SCALE[id.clamp(1, top) - 1]
}

// ════════════════════════════════════════════════════════════
//  Waveform generators: all produce Vec<f32> mono samples
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
        })
        .collect()
}

/// Sequence of notes with a shared envelope shape.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_notes(notes: &[(f32, f32)], volume: f32) -> Vec<f32> {
    let mut samples = Vec::new();
    for &(freq, dur) in notes {
        let n = (SAMPLE_RATE as f32 * dur) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32).powf(0.5);
            let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
            samples.push(wave * env * volume);
        }
    }
    samples
}

/// Memorize start: two soft chimes.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_memorize() -> Vec<f32> {
    gen_notes(&[(659.0, 0.09), (784.0, 0.14)], 0.25)
}

/// Wrong button: low descending buzz.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_mistake() -> Vec<f32> {
    let duration = 0.3;
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let freq = 220.0 - t * 90.0;
            let ti = i as f32 / SAMPLE_RATE as f32;
            let phase = (ti * freq).fract();
            let square = if phase < 0.5 { 1.0 } else { -1.0 };
            square * (1.0 - t).powf(0.7) * 0.15
        })
        .collect()
}

/// All buttons in order: ascending fanfare.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_success() -> Vec<f32> {
    gen_notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.3)], 0.3)
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: wraps f32 samples into a valid WAV buffer
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());

    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_memorize(&self) {}
    pub fn play_shuffle(&self, _step: u32, _total: u32) {}
    pub fn play_reveal(&self, _id: usize, _total: usize) {}
    pub fn play_mistake(&self) {}
    pub fn play_success(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_matches_sample_count() {
        let samples = gen_blip(440.0, 0.01, 0.5);
        let wav = make_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size as usize, samples.len() * 2);
    }

    #[test]
    fn reveal_pitch_rises_and_stays_in_scale() {
        let pitches: Vec<f32> = (1..=7).map(|id| reveal_freq(id, 7)).collect();
        assert!(pitches.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(reveal_freq(0, 7), reveal_freq(1, 7));
        assert_eq!(reveal_freq(9, 7), reveal_freq(7, 7));
    }

    #[test]
    fn shuffle_pitch_is_bounded() {
        assert_eq!(shuffle_freq(0, 5), 220.0);
        assert_eq!(shuffle_freq(5, 5), 440.0);
        assert_eq!(shuffle_freq(9, 0), 440.0);
    }

    #[test]
    fn generated_cues_stay_in_range() {
        for cue in [gen_memorize(), gen_mistake(), gen_success()] {
            assert!(!cue.is_empty());
            assert!(cue.iter().all(|s| s.abs() <= 1.0));
        }
    }
}
