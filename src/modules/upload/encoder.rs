use async_trait::async_trait;
use futures_util::StreamExt;
use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, FramedRead};
use tracing::{debug, info, warn};

use super::progress::parse_duration;

/// Upper bound for a single output line. Encoder stats lines are ~100 bytes.
const MAX_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to launch encoder: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("encoder exited with {0}")]
    Exit(String),

    #[error("encoder I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The external encoder, seen from the pipeline. Implementations report each
/// line of output through `on_line`; the progress grammar lives with the caller.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Total playable duration in seconds, or `None` when it cannot be determined.
    async fn probe_duration(&self, input: &Path) -> Option<f64>;

    /// Runs one encode to completion. `Ok` only for a zero exit status.
    async fn encode(
        &self,
        input: &Path,
        output: &Path,
        on_line: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), EncodeError>;
}

#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg: String,
    ffprobe: String,
    preset: String,
    crf: u8,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            preset: "slow".to_string(),
            crf: 22,
        }
    }

    /// H.264 at a fixed quality, audio copied as-is.
    pub fn encode_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let crf = self.crf.to_string();
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());
        args.extend(
            ["-c:v", "libx264", "-preset", self.preset.as_str(), "-crf", crf.as_str(), "-c:a", "copy"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }

    pub fn probe_args(input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(input.as_os_str().to_owned());
        args
    }
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

/// Splits encoder output on `\r` as well as `\n`: the stats line is
/// rewritten in place.
///
/// An overlong line is dropped and decoding carries on. A decode error would
/// end the `FramedRead`, leave the pipe unread and stall the encoder on a
/// full pipe buffer.
struct OutputLines {
    inner: AnyDelimiterCodec,
}

impl OutputLines {
    fn new() -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                b"\r\n".to_vec(),
                b"\n".to_vec(),
                MAX_LINE_BYTES,
            ),
        }
    }

    fn skip_overlong(
        result: Result<Option<Bytes>, AnyDelimiterCodecError>,
    ) -> Result<Option<Bytes>, AnyDelimiterCodecError> {
        match result {
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                warn!("Encoder output line over {} bytes skipped", MAX_LINE_BYTES);
                // Empty frame: the reader ignores it and keeps polling.
                Ok(Some(Bytes::new()))
            }
            other => other,
        }
    }
}

impl Decoder for OutputLines {
    type Item = Bytes;
    type Error = AnyDelimiterCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>, Self::Error> {
        Self::skip_overlong(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>, Self::Error> {
        Self::skip_overlong(self.inner.decode_eof(buf))
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn probe_duration(&self, input: &Path) -> Option<f64> {
        // `output()` waits for the probe to exit before we look at anything.
        let output = Command::new(&self.ffprobe)
            .args(Self::probe_args(input))
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                let duration = parse_duration(&String::from_utf8_lossy(&out.stdout));
                if duration.is_none() {
                    warn!(path = %input.display(), "Probe returned no usable duration");
                }
                duration
            }
            Ok(out) => {
                warn!(
                    path = %input.display(),
                    "Probe failed with {}: {}",
                    describe_exit(out.status),
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                None
            }
            Err(e) => {
                warn!(path = %input.display(), "Failed to launch probe: {}", e);
                None
            }
        }
    }

    async fn encode(
        &self,
        input: &Path,
        output: &Path,
        on_line: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), EncodeError> {
        let mut child = Command::new(&self.ffmpeg)
            .args(self.encode_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(EncodeError::Spawn)?;

        info!(input = %input.display(), output = %output.display(), pid = ?child.id(), "Encoder started");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        if let (Some(stdout), Some(stderr)) = (stdout, stderr) {
            let mut lines = futures_util::stream::select(
                FramedRead::new(stdout, OutputLines::new()),
                FramedRead::new(stderr, OutputLines::new()),
            );

            while let Some(frame) = lines.next().await {
                match frame {
                    Ok(bytes) => {
                        let text = String::from_utf8_lossy(&bytes);
                        let text = text.trim();
                        if !text.is_empty() {
                            debug!(target: "clipshare::encoder", "{}", text);
                            on_line(text);
                        }
                    }
                    Err(e) => warn!("Unreadable encoder output skipped: {}", e),
                }
            }
        }

        let status = child.wait().await?;
        info!(output = %output.display(), "Encoder finished with {}", describe_exit(status));

        if status.success() {
            Ok(())
        } else {
            Err(EncodeError::Exit(describe_exit(status)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn encode_args_use_fixed_quality_and_copy_audio() {
        let encoder = FfmpegEncoder::new("ffmpeg", "ffprobe");
        let args: Vec<String> = encoder
            .encode_args(&PathBuf::from("/tmp/in.mov"), &PathBuf::from("/media/out.mp4"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        let joined = args.join(" ");
        assert!(joined.contains("-i /tmp/in.mov"));
        assert!(joined.contains("-c:v libx264 -preset slow -crf 22"));
        assert!(joined.contains("-c:a copy"));
        assert_eq!(args.last().map(String::as_str), Some("/media/out.mp4"));
    }

    #[test]
    fn probe_asks_for_bare_duration() {
        let args: Vec<String> = FfmpegEncoder::probe_args(&PathBuf::from("/tmp/in.mov"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.contains(&"format=duration".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/in.mov"));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let encoder = FfmpegEncoder::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let mut sink = |_: &str| {};
        let err = encoder
            .encode(Path::new("/tmp/in.mov"), Path::new("/tmp/out.mp4"), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, EncodeError::Spawn(_)));

        assert_eq!(encoder.probe_duration(Path::new("/tmp/in.mov")).await, None);
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    async fn run_encode(ffmpeg: &str) -> (Result<(), EncodeError>, Vec<String>) {
        let encoder = FfmpegEncoder::new(ffmpeg, "ffprobe");
        let mut lines = Vec::new();
        let mut collect = |line: &str| lines.push(line.to_string());
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(20),
            encoder.encode(Path::new("/tmp/in.mov"), Path::new("/tmp/out.mp4"), &mut collect),
        )
        .await
        .expect("encoder did not finish");
        (result, lines)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stats_lines_split_on_carriage_returns_across_both_pipes() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = script(
            dir.path(),
            "ffmpeg",
            r"printf 'Input #0, mov\n'
printf 'frame=1 time=00:00:01.00 speed=1x\rframe=2 time=00:00:02.00 speed=1x\r   \n' >&2
exit 0",
        );

        let (result, lines) = run_encode(&ffmpeg).await;

        assert!(result.is_ok());
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"Input #0, mov".to_string()));
        assert!(lines.contains(&"frame=1 time=00:00:01.00 speed=1x".to_string()));
        assert!(lines.contains(&"frame=2 time=00:00:02.00 speed=1x".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_an_exit_error() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = script(dir.path(), "ffmpeg", "echo 'Invalid data found' >&2\nexit 3");

        let (result, lines) = run_encode(&ffmpeg).await;

        assert!(matches!(result, Err(EncodeError::Exit(ref m)) if m == "exit code 3"));
        assert_eq!(lines, vec!["Invalid data found".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn overlong_line_does_not_stall_the_encoder() {
        let dir = tempfile::tempdir().unwrap();
        // 70 000-byte line, then ~300 KB more: far past any pipe buffer.
        let ffmpeg = script(
            dir.path(),
            "ffmpeg",
            r#"head -c 70000 /dev/zero | tr '\0' 'x' >&2
echo >&2
i=0
while [ $i -lt 3000 ]; do
  echo "frame=$i fps=30 q=28.0 size=1kB bitrate=1kbits/s speed=1x padding-padding-padding-padding" >&2
  i=$((i+1))
done
echo "frame=3000 time=00:00:05.00 speed=1x" >&2
exit 0"#,
        );

        let (result, lines) = run_encode(&ffmpeg).await;

        assert!(result.is_ok());
        assert!(lines.iter().all(|l| l.len() <= MAX_LINE_BYTES));
        assert_eq!(lines.last().map(String::as_str), Some("frame=3000 time=00:00:05.00 speed=1x"));
        assert_eq!(lines.len(), 3001);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn probe_reads_duration_from_script() {
        let dir = tempfile::tempdir().unwrap();
        let ffprobe = script(dir.path(), "ffprobe", "echo 12.500000");
        let encoder = FfmpegEncoder::new("ffmpeg", ffprobe);

        assert_eq!(encoder.probe_duration(Path::new("/tmp/in.mov")).await, Some(12.5));
    }
}
