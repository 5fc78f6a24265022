//! WAV decoding to planar stereo and encoding back.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Sample encoding for written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// IEEE 754 32-bit float, unclipped.
    #[default]
    Float32,
    /// 16-bit signed PCM.
    Pcm16,
    /// 24-bit signed PCM.
    Pcm24,
}

impl Encoding {
    /// Encoding named by a bit depth: 16, 24 or 32 (float).
    pub fn from_bits(bits: u16) -> Result<Self> {
        match bits {
            16 => Ok(Encoding::Pcm16),
            24 => Ok(Encoding::Pcm24),
            32 => Ok(Encoding::Float32),
            other => Err(Error::UnsupportedFormat(format!("{other}-bit output"))),
        }
    }

    /// Encoding that preserves `info`'s layout, or float when it has none.
    pub fn matching(info: &SourceInfo) -> Self {
        match (info.float, info.bits_per_sample) {
            (false, 16) => Encoding::Pcm16,
            (false, 24) => Encoding::Pcm24,
            _ => Encoding::Float32,
        }
    }

    /// Bits per sample.
    pub fn bits(self) -> u16 {
        match self {
            Encoding::Float32 => 32,
            Encoding::Pcm16 => 16,
            Encoding::Pcm24 => 24,
        }
    }

    fn spec(self, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: self.bits(),
            sample_format: match self {
                Encoding::Float32 => SampleFormat::Float,
                Encoding::Pcm16 | Encoding::Pcm24 => SampleFormat::Int,
            },
        }
    }
}

/// Header facts about a decoded file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceInfo {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channels in the file (1 or 2).
    pub channels: u16,
    /// Bits per stored sample.
    pub bits_per_sample: u16,
    /// True for IEEE float samples.
    pub float: bool,
    /// Frames (samples per channel).
    pub frames: u64,
}

impl SourceInfo {
    fn from_spec(spec: hound::WavSpec, total_samples: u32) -> Self {
        Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            float: spec.sample_format == SampleFormat::Float,
            frames: u64::from(total_samples) / u64::from(spec.channels.max(1)),
        }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }
}

/// Two planar channels of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoSamples {
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Pairs two channels; lengths must match.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(Error::ChannelMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        Ok(Self { left, right })
    }

    /// Silent channels of `frames` samples each.
    pub fn silence(frames: usize) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    /// Duplicates a mono channel to both sides.
    pub fn from_mono(mono: Vec<f32>) -> Self {
        Self {
            right: mono.clone(),
            left: mono,
        }
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Reads the header of a WAV file without decoding samples.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<SourceInfo> {
    let reader = WavReader::open(path)?;
    Ok(SourceInfo::from_spec(reader.spec(), reader.len()))
}

/// Decodes a mono or stereo WAV file to planar `f32`.
///
/// Integer PCM is scaled so full scale maps to ±1. Mono is duplicated to
/// both channels; files with more than two channels are rejected.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(StereoSamples, SourceInfo)> {
    let path = path.as_ref();
    let reader = WavReader::new(BufReader::new(File::open(path)?))?;
    let spec = reader.spec();
    let info = SourceInfo::from_spec(spec, reader.len());

    if !(1..=2).contains(&spec.channels) {
        return Err(Error::UnsupportedFormat(format!(
            "{} channels (only mono and stereo are supported)",
            spec.channels
        )));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float if spec.bits_per_sample == 32 => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Float => {
            return Err(Error::UnsupportedFormat(format!(
                "{}-bit float samples",
                spec.bits_per_sample
            )));
        }
        SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let samples = if spec.channels == 1 {
        StereoSamples::from_mono(interleaved)
    } else {
        let (left, right) = interleaved.chunks_exact(2).map(|frame| (frame[0], frame[1])).unzip();
        StereoSamples { left, right }
    };

    tracing::debug!(
        path = %path.display(),
        sample_rate = info.sample_rate,
        channels = info.channels,
        bits = info.bits_per_sample,
        frames = samples.len(),
        "decoded WAV"
    );

    Ok((samples, info))
}

/// Encodes planar stereo to a WAV file.
///
/// Integer encodings round and clip to the representable range; float
/// output is written unclipped.
pub fn write_wav_stereo<P: AsRef<Path>>(
    path: P,
    samples: &StereoSamples,
    sample_rate: u32,
    encoding: Encoding,
) -> Result<()> {
    if samples.left.len() != samples.right.len() {
        return Err(Error::ChannelMismatch {
            left: samples.left.len(),
            right: samples.right.len(),
        });
    }

    let mut writer = WavWriter::create(path, encoding.spec(sample_rate))?;
    let frames = samples.left.iter().zip(&samples.right);

    match encoding {
        Encoding::Float32 => {
            for (&l, &r) in frames {
                writer.write_sample(l)?;
                writer.write_sample(r)?;
            }
        }
        Encoding::Pcm16 | Encoding::Pcm24 => {
            let full_scale = (1i32 << (encoding.bits() - 1)) as f32;
            let quantize = |x: f32| (x * full_scale).round().clamp(-full_scale, full_scale - 1.0) as i32;
            for (&l, &r) in frames {
                writer.write_sample(quantize(l))?;
                writer.write_sample(quantize(r))?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn ramp(len: usize, scale: f32) -> Vec<f32> {
        (0..len).map(|i| (i as f32 / len as f32 * 2.0 - 1.0) * scale).collect()
    }

    #[test]
    fn test_encoding_from_bits() {
        assert_eq!(Encoding::from_bits(16).unwrap(), Encoding::Pcm16);
        assert_eq!(Encoding::from_bits(24).unwrap(), Encoding::Pcm24);
        assert_eq!(Encoding::from_bits(32).unwrap(), Encoding::Float32);
        assert!(matches!(Encoding::from_bits(8), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_stereo_samples_length_check() {
        assert!(StereoSamples::new(vec![0.0; 3], vec![0.0; 3]).is_ok());
        assert!(matches!(
            StereoSamples::new(vec![0.0; 3], vec![0.0; 2]),
            Err(Error::ChannelMismatch { left: 3, right: 2 })
        ));
        let mono = StereoSamples::from_mono(vec![0.25, 0.5]);
        assert_eq!(mono.left, mono.right);
        assert_eq!(mono.len(), 2);
        assert!(StereoSamples::silence(0).is_empty());
    }

    #[test]
    fn test_float_is_exact_and_unclipped() {
        let left = ramp(1000, 1.5);
        let right = ramp(1000, -0.5);
        let samples = StereoSamples::new(left.clone(), right.clone()).unwrap();

        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &samples, 96000, Encoding::Float32).unwrap();

        let (loaded, info) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(info.sample_rate, 96000);
        assert_eq!(info.channels, 2);
        assert!(info.float);
        assert_eq!(info.frames, 1000);
        assert_eq!(loaded.left, left);
        assert_eq!(loaded.right, right);
    }

    #[test]
    fn test_pcm16_clips_and_quantizes() {
        let samples = StereoSamples::new(vec![0.5, 2.0, -2.0], vec![0.0, -0.25, 1.0]).unwrap();

        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &samples, 44100, Encoding::Pcm16).unwrap();

        let (loaded, info) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(info.bits_per_sample, 16);
        assert!(!info.float);
        assert_eq!(loaded.left[0], 0.5);
        assert_eq!(loaded.left[1], 32767.0 / 32768.0);
        assert_eq!(loaded.left[2], -1.0);
        assert_eq!(loaded.right[1], -0.25);
        assert_eq!(Encoding::matching(&info), Encoding::Pcm16);
    }

    #[test]
    fn test_pcm24_precision() {
        let left = ramp(500, 0.9);
        let samples = StereoSamples::from_mono(left.clone());

        let file = NamedTempFile::new().unwrap();
        write_wav_stereo(file.path(), &samples, 48000, Encoding::Pcm24).unwrap();

        let (loaded, info) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(Encoding::matching(&info), Encoding::Pcm24);
        for (a, b) in left.iter().zip(&loaded.left) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mono_file_duplicates() {
        let file = NamedTempFile::new().unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(file.path(), spec).unwrap();
        for v in [0i16, 16384, -16384] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let (loaded, info) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(info.channels, 1);
        assert_eq!(loaded.left, vec![0.0, 0.5, -0.5]);
        assert_eq!(loaded.right, loaded.left);
    }

    #[test]
    fn test_rejects_surround() {
        let file = NamedTempFile::new().unwrap();
        let spec = hound::WavSpec {
            channels: 6,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(file.path(), spec).unwrap();
        for _ in 0..12 {
            writer.write_sample(0.0f32).unwrap();
        }
        writer.finalize().unwrap();

        assert!(matches!(read_wav_stereo(file.path()), Err(Error::UnsupportedFormat(_))));
        assert_eq!(read_wav_info(file.path()).unwrap().frames, 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            read_wav_stereo("/nonexistent/phono/input.wav"),
            Err(Error::Io(_))
        ));
    }
}
