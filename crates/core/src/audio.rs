//! WAV loading helpers shared by the transcriber and the emotion analyzer.
//!
//! Everything downstream works on normalized mono f32 samples; this module
//! owns the conversion from whatever layout `yt-dlp` handed us.

use std::path::Path;

#[derive(Clone, Debug, PartialEq)]
pub struct PcmAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("failed to read wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported wav layout: {0}")]
    Unsupported(String),
}

/// Reads a WAV file into normalized mono f32 samples at its native rate.
pub fn read_wav(path: &Path) -> Result<PcmAudio, AudioError> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::Unsupported("zero channels".to_owned()));
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioError::Unsupported(format!(
                    "{} bits per sample",
                    spec.bits_per_sample
                )));
            }
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(PcmAudio {
        samples: mixdown(samples, spec.channels),
        sample_rate: spec.sample_rate,
    })
}

/// Reads only the WAV header, returning `(duration_seconds, sample_rate)`.
pub fn probe_wav(path: &Path) -> Result<(f64, u32), AudioError> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(AudioError::Unsupported("zero sample rate".to_owned()));
    }
    let frames = reader.duration();
    Ok((
        f64::from(frames) / f64::from(spec.sample_rate),
        spec.sample_rate,
    ))
}

/// Averages interleaved channels down to mono. Mono input passes through.
pub fn mixdown(samples: Vec<f32>, channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    let n = usize::from(channels);
    samples
        .chunks(n)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Linear-interpolation resampler. Adequate for speech features and whisper
/// input; not intended for playback quality.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let new_len = (samples.len() as f64 * ratio) as usize;
    let mut out = Vec::with_capacity(new_len);
    for i in 0..new_len {
        let src = i as f64 / ratio;
        let base = src.floor() as usize;
        let frac = (src - base as f64) as f32;
        let s0 = samples.get(base).copied().unwrap_or(0.0);
        let s1 = samples.get(base + 1).copied().unwrap_or(s0);
        out.push(s0 + (s1 - s0) * frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_wav_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("yt_transcriber_audio_test_{}_{tag}.wav", std::process::id()))
    }

    fn write_test_wav(path: &Path, samples: &[i16], channels: u16, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for &s in samples {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    #[test]
    fn read_wav_normalizes_int_samples() {
        let path = temp_wav_path("norm");
        write_test_wav(&path, &[0, 16384, -16384, 32767], 1, 16_000);

        let pcm = read_wav(&path).expect("read wav");
        assert_eq!(pcm.sample_rate, 16_000);
        assert_eq!(pcm.samples.len(), 4);
        assert!((pcm.samples[0]).abs() < 1e-6);
        assert!((pcm.samples[1] - 0.5).abs() < 1e-3);
        assert!((pcm.samples[2] + 0.5).abs() < 1e-3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn read_wav_mixes_stereo_to_mono() {
        let path = temp_wav_path("stereo");
        write_test_wav(&path, &[16384, -16384, 8192, 8192], 2, 16_000);

        let pcm = read_wav(&path).expect("read wav");
        assert_eq!(pcm.samples.len(), 2);
        assert!(pcm.samples[0].abs() < 1e-3);
        assert!((pcm.samples[1] - 0.25).abs() < 1e-3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn probe_reports_duration_without_decoding() {
        let path = temp_wav_path("probe");
        write_test_wav(&path, &vec![0i16; 8_000], 1, 16_000);

        let (duration, rate) = probe_wav(&path).expect("probe wav");
        assert_eq!(rate, 16_000);
        assert!((duration - 0.5).abs() < 1e-9);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn mixdown_passes_mono_through() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(mixdown(samples.clone(), 1), samples);
    }

    #[test]
    fn resample_halves_and_doubles_length() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        assert_eq!(resample_linear(&samples, 32_000, 16_000).len(), 50);
        assert_eq!(resample_linear(&samples, 16_000, 32_000).len(), 200);
        assert_eq!(resample_linear(&samples, 16_000, 16_000).len(), 100);
    }
}
