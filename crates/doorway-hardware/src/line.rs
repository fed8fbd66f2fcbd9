//! Line-oriented drivers.
//!
//! Many USB tag readers and code scanners present themselves as a keyboard
//! or a serial port and emit one credential per line. These drivers turn
//! such a byte stream into tag reads and frames, using the tokio-util
//! [`LinesCodec`] for framing.
//!
//! ```text
//! tag line:    <id>[\t<text>]      blank line = reader timeout
//! camera line: <payload>           blank line = frame without a code
//! ```

use crate::{
    HardwareError, Result,
    traits::{CodeDecoder, FrameSource, TagReader},
    types::{DeviceInfo, Frame, TagRead},
};
use doorway_core::TagId;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncRead;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

/// Longest accepted line; anything longer is discarded as garbage.
const MAX_LINE_LENGTH: usize = 4096;

type LineStream = FramedRead<Box<dyn AsyncRead + Send + Unpin>, LinesCodec>;

fn line_stream(reader: impl AsyncRead + Send + Unpin + 'static) -> LineStream {
    let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
    FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LENGTH))
}

async fn open_path(path: &Path) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
    if path == Path::new("-") {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        HardwareError::initialization_failed(format!("cannot open {}: {e}", path.display()))
    })?;
    Ok(Box::new(file))
}

fn codec_error(error: LinesCodecError) -> String {
    match error {
        LinesCodecError::MaxLineLengthExceeded => {
            format!("line longer than {MAX_LINE_LENGTH} bytes")
        }
        LinesCodecError::Io(e) => e.to_string(),
    }
}

/// Tag reader fed by a line stream.
pub struct LineTagReader {
    lines: LineStream,
    location: String,
}

impl LineTagReader {
    /// Read tags from any async byte stream.
    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            lines: line_stream(reader),
            location: "stream".to_string(),
        }
    }

    /// Read tags from a file, FIFO or device node; `-` is standard input.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the path cannot be
    /// opened.
    pub async fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            lines: FramedRead::new(
                open_path(path).await?,
                LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            ),
            location: path.display().to_string(),
        })
    }

    fn parse(line: &str) -> TagRead {
        let (id, text) = line.split_once('\t').unwrap_or((line, ""));
        let id = TagId::new(id);
        if id.is_empty() {
            TagRead::empty()
        } else {
            TagRead {
                id: Some(id),
                text: text.to_string(),
            }
        }
    }
}

impl std::fmt::Debug for LineTagReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineTagReader")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl TagReader for LineTagReader {
    async fn read_tag(&mut self) -> Result<TagRead> {
        match self.lines.next().await {
            Some(Ok(line)) => Ok(Self::parse(&line)),
            Some(Err(e)) => Err(HardwareError::read(codec_error(e))),
            None => Err(HardwareError::disconnected(format!(
                "{} reached end of input",
                self.location
            ))),
        }
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Line Tag Reader", "line").with_location(self.location.clone())
    }
}

/// Camera stand-in where every line of input is one frame.
pub struct LineFrameSource {
    lines: Option<LineStream>,
    location: String,
}

impl LineFrameSource {
    /// Produce frames from any async byte stream.
    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            lines: Some(line_stream(reader)),
            location: "stream".to_string(),
        }
    }

    /// Produce frames from a file, FIFO or device node; `-` is standard input.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` if the path cannot be
    /// opened.
    pub async fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            lines: Some(FramedRead::new(
                open_path(path).await?,
                LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            )),
            location: path.display().to_string(),
        })
    }
}

impl std::fmt::Debug for LineFrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineFrameSource")
            .field("location", &self.location)
            .field("released", &self.lines.is_none())
            .finish()
    }
}

impl FrameSource for LineFrameSource {
    async fn capture(&mut self) -> Result<Frame> {
        let Some(lines) = self.lines.as_mut() else {
            return Err(HardwareError::disconnected(format!(
                "{} released",
                self.location
            )));
        };

        match lines.next().await {
            Some(Ok(line)) => Ok(Frame::new(line.into_bytes())),
            Some(Err(e)) => Err(HardwareError::capture(codec_error(e))),
            None => Err(HardwareError::disconnected(format!(
                "{} reached end of input",
                self.location
            ))),
        }
    }

    fn release(&mut self) {
        self.lines = None;
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Line Camera", "line").with_location(self.location.clone())
    }
}

/// Decoder for frames holding newline-separated UTF-8 payloads.
///
/// Blank lines are skipped; surrounding whitespace is trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl CodeDecoder for TextDecoder {
    fn decode(&self, frame: &Frame) -> Result<Vec<String>> {
        let text = std::str::from_utf8(&frame.data)
            .map_err(|e| HardwareError::invalid_data(format!("code payload is not UTF-8: {e}")))?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|payload| !payload.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_line_tag_reader_parses_lines() {
        let input: &'static [u8] = b"584190912345\talice\n\n  04ABCDEF  \n";
        let mut reader = LineTagReader::from_reader(input);

        let first = reader.read_tag().await.unwrap();
        assert_eq!(first.id.unwrap().as_str(), "584190912345");
        assert_eq!(first.text, "alice");

        assert_eq!(reader.read_tag().await.unwrap(), TagRead::empty());

        let third = reader.read_tag().await.unwrap();
        assert_eq!(third.id.unwrap().as_str(), "04ABCDEF");

        assert!(reader.read_tag().await.unwrap_err().is_disconnected());
    }

    #[tokio::test]
    async fn test_line_tag_reader_rejects_overlong_line() {
        let mut input = vec![b'9'; MAX_LINE_LENGTH + 1];
        input.push(b'\n');
        let mut reader = LineTagReader::from_reader(std::io::Cursor::new(input));

        assert!(matches!(
            reader.read_tag().await.unwrap_err(),
            HardwareError::ReadError { .. }
        ));
    }

    #[tokio::test]
    async fn test_line_tag_reader_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "77").unwrap();

        let mut reader = LineTagReader::open(file.path()).await.unwrap();
        assert_eq!(reader.read_tag().await.unwrap().id.unwrap().as_str(), "77");
        assert_eq!(
            reader.info().location.as_deref(),
            Some(file.path().display().to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_line_tag_reader_open_missing_file() {
        let result = LineTagReader::open(Path::new("/nonexistent/reader")).await;
        assert!(matches!(
            result.unwrap_err(),
            HardwareError::InitializationFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_line_frame_source_and_decoder() {
        let input: &'static [u8] = b"token-one\n\n";
        let mut camera = LineFrameSource::from_reader(input);

        let frame = camera.capture().await.unwrap();
        assert_eq!(TextDecoder.decode(&frame).unwrap(), vec!["token-one"]);

        let blank = camera.capture().await.unwrap();
        assert!(TextDecoder.decode(&blank).unwrap().is_empty());

        camera.release();
        assert!(camera.capture().await.unwrap_err().is_disconnected());
    }

    #[test]
    fn test_text_decoder_keeps_order_and_skips_blanks() {
        let frame = Frame::new(&b" b \n\na\n"[..]);
        assert_eq!(TextDecoder.decode(&frame).unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_text_decoder_rejects_invalid_utf8() {
        let frame = Frame::new(vec![0xff, 0xfe]);
        assert!(matches!(
            TextDecoder.decode(&frame),
            Err(HardwareError::InvalidData { .. })
        ));
    }
}
