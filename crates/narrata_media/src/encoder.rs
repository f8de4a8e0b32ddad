//! ffmpeg-backed timeline encoding.

use async_trait::async_trait;
use narrata_core::{Timeline, TimelineSegment, VideoArtifact, Visual};
use narrata_error::{MediaError, MediaErrorKind, NarrataResult};
use narrata_interface::TimelineEncoder;
use std::path::{Path, PathBuf};
use std::process::Stdio;

const AUDIO_RATE: u32 = 44_100;
const STDERR_TAIL: usize = 800;

/// Encodes timelines by driving an `ffmpeg` process.
///
/// Segment inputs are written to a scratch directory, combined with one
/// filter graph (scale, hold, fade, concat) and encoded as H.264/AAC MP4.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
}

impl FfmpegEncoder {
    /// Encoder invoking `binary` as given.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Resolves `name` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such executable is found.
    pub fn locate(name: &str) -> NarrataResult<Self> {
        let binary = which::which(name).map_err(|e| {
            MediaError::new(MediaErrorKind::EncoderUnavailable(format!("{}: {}", name, e)))
        })?;
        tracing::info!(path = %binary.display(), "Located ffmpeg");
        Ok(Self { binary })
    }

    /// Path of the binary that will be run.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    async fn run(&self, args: &[String], output: &Path) -> NarrataResult<Vec<u8>> {
        tracing::debug!(binary = %self.binary.display(), args = ?args, "Running ffmpeg");
        let result = tokio::process::Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                MediaError::new(MediaErrorKind::EncoderUnavailable(format!(
                    "{}: {}",
                    self.binary.display(),
                    e
                )))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let tail: String = stderr
                .chars()
                .rev()
                .take(STDERR_TAIL)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return Err(MediaError::new(MediaErrorKind::Encode(format!(
                "ffmpeg exited with {}: {}",
                result.status, tail
            )))
            .into());
        }

        let bytes = tokio::fs::read(output)
            .await
            .map_err(|e| MediaError::new(MediaErrorKind::Io(format!("{}: {}", output.display(), e))))?;
        if bytes.is_empty() {
            return Err(MediaError::new(MediaErrorKind::Encode("ffmpeg produced an empty file".into())).into());
        }
        Ok(bytes)
    }
}

#[async_trait]
impl TimelineEncoder for FfmpegEncoder {
    #[tracing::instrument(skip_all, fields(segments = timeline.segments.len(), subtitles = subtitles.is_some()))]
    async fn encode(&self, timeline: &Timeline, subtitles: Option<&str>) -> NarrataResult<VideoArtifact> {
        let scratch = tempfile::tempdir().map_err(|e| MediaError::new(MediaErrorKind::Io(e.to_string())))?;
        let dir = scratch.path();

        let mut inputs = Vec::with_capacity(timeline.segments.len());
        for segment in &timeline.segments {
            inputs.push(write_inputs(dir, segment).await?);
        }
        let subtitle_path = match subtitles {
            Some(srt) => {
                let path = dir.join("captions.srt");
                write(&path, srt.as_bytes()).await?;
                Some(path)
            }
            None => None,
        };

        let output = dir.join("timeline.mp4");
        let args = timeline_args(timeline, &inputs, subtitle_path.as_deref(), &output);
        let bytes = self.run(&args, &output).await?;

        Ok(VideoArtifact::mp4(bytes, timeline.total_duration_seconds()))
    }

    #[tracing::instrument(skip(self))]
    async fn encode_blank(
        &self,
        duration_seconds: f64,
        width: u32,
        height: u32,
        fps: u32,
    ) -> NarrataResult<VideoArtifact> {
        let scratch = tempfile::tempdir().map_err(|e| MediaError::new(MediaErrorKind::Io(e.to_string())))?;
        let output = scratch.path().join("blank.mp4");
        let args = blank_args(duration_seconds, width, height, fps, &output);
        let bytes = self.run(&args, &output).await?;
        Ok(VideoArtifact::mp4(bytes, duration_seconds))
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Scratch files for one segment.
#[derive(Debug, Clone)]
struct SegmentInputs {
    visual: PathBuf,
    audio: PathBuf,
}

async fn write(path: &Path, bytes: &[u8]) -> NarrataResult<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| MediaError::new(MediaErrorKind::Io(format!("{}: {}", path.display(), e))).into())
}

async fn write_inputs(dir: &Path, segment: &TimelineSegment) -> NarrataResult<SegmentInputs> {
    let visual = match &segment.visual {
        Visual::Still(image) => {
            let path = dir.join(format!("visual_{}.{}", segment.index, image.extension()));
            write(&path, image.bytes()).await?;
            path
        }
        Visual::Motion { clip, .. } => {
            let path = dir.join(format!("visual_{}.{}", segment.index, clip.extension()));
            write(&path, clip.bytes()).await?;
            path
        }
    };
    let audio = dir.join(format!("audio_{}.{}", segment.index, segment.audio.extension()));
    write(&audio, segment.audio.bytes()).await?;
    Ok(SegmentInputs { visual, audio })
}

fn timeline_args(
    timeline: &Timeline,
    inputs: &[SegmentInputs],
    subtitles: Option<&Path>,
    output: &Path,
) -> Vec<String> {
    let mut args = strings(&["-y", "-hide_banner"]);
    let (w, h, fps) = (timeline.width, timeline.height, timeline.fps);
    let rate = fps.to_string();

    for (segment, files) in timeline.segments.iter().zip(inputs) {
        let duration = format!("{:.3}", segment.duration_seconds);
        if let Visual::Still(_) = segment.visual {
            args.extend(strings(&["-loop", "1", "-framerate", &rate, "-t", &duration]));
        }
        args.extend(strings(&["-i", &path_arg(&files.visual)]));
        args.extend(strings(&["-i", &path_arg(&files.audio)]));
    }

    let mut filter = String::new();
    for (i, segment) in timeline.segments.iter().enumerate() {
        let d = segment.duration_seconds;
        let hold = match segment.visual {
            Visual::Motion { .. } => format!(",tpad=stop_mode=clone:stop_duration={:.3}", d),
            Visual::Still(_) => String::new(),
        };
        let caption = match segment.visual.poster().caption() {
            Some(text) if segment.visual.is_placeholder() => format!(
                ",drawtext=text={}:expansion=none:fontcolor=white:fontsize=48:x=(w-text_w)/2:y=(h-text_h)/2",
                filter_value(text)
            ),
            _ => String::new(),
        };
        let fade = segment.transition;
        filter.push_str(&format!(
            "[{v}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps}{hold},trim=duration={d:.3},setpts=PTS-STARTPTS{caption},fade=t=in:st=0:d={fi:.3},fade=t=out:st={fo_start:.3}:d={fo:.3}[v{i}];",
            v = 2 * i,
            fi = fade.fade_in,
            fo = fade.fade_out,
            fo_start = (d - fade.fade_out).max(0.0),
        ));
        let af = segment.audio_fade_seconds;
        filter.push_str(&format!(
            "[{a}:a]aresample={rate},aformat=sample_fmts=fltp:channel_layouts=stereo,apad,atrim=duration={d:.3},asetpts=PTS-STARTPTS,afade=t=in:st=0:d={af:.3},afade=t=out:st={af_start:.3}:d={af:.3}[a{i}];",
            a = 2 * i + 1,
            rate = AUDIO_RATE,
            af_start = (d - af).max(0.0),
        ));
    }
    for i in 0..timeline.segments.len() {
        filter.push_str(&format!("[v{}][a{}]", i, i));
    }
    filter.push_str(&format!("concat=n={}:v=1:a=1[vcat][aout]", timeline.segments.len()));
    let video_label = match subtitles {
        Some(path) => {
            filter.push_str(&format!(
                ";[vcat]subtitles={}:force_style='Fontsize=24,Outline=2'[vout]",
                filter_value(&path_arg(path))
            ));
            "[vout]"
        }
        None => "[vcat]",
    };

    args.extend(strings(&[
        "-filter_complex",
        &filter,
        "-map",
        video_label,
        "-map",
        "[aout]",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-r",
        &rate,
        "-c:a",
        "aac",
        "-b:a",
        "192k",
        "-movflags",
        "+faststart",
        &path_arg(output),
    ]));
    args
}

fn blank_args(duration_seconds: f64, width: u32, height: u32, fps: u32, output: &Path) -> Vec<String> {
    let duration = format!("{:.3}", duration_seconds);
    strings(&[
        "-y",
        "-hide_banner",
        "-f",
        "lavfi",
        "-i",
        &format!("color=c=black:s={}x{}:r={}:d={}", width, height, fps, duration),
        "-f",
        "lavfi",
        "-i",
        &format!("anullsrc=r={}:cl=stereo", AUDIO_RATE),
        "-t",
        &duration,
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-shortest",
        &path_arg(output),
    ])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn escape_with(text: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes an unquoted option value inside `-filter_complex`.
///
/// ffmpeg unescapes twice: once when splitting the graph into filters and
/// once when parsing the filter's options.
fn filter_value(text: &str) -> String {
    let option = escape_with(text, &['\\', '\'', ':']);
    escape_with(&option, &['\\', '\'', '[', ']', ',', ';'])
}
