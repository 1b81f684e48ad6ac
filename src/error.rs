// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Usage(String),
    Media(MediaError),
}

/// Reasons a file cannot be played.
#[derive(Debug, Clone)]
pub enum MediaError {
    /// FFmpeg does not recognise the container.
    UnsupportedFormat,
    /// No decoder is available for the named codec.
    UnsupportedCodec(String),
    CorruptedFile,
    /// The container opened but holds no video stream.
    NoVideoStream,
    /// Failure after the stream was opened.
    DecodingFailed(String),
    /// The file could not be read at all.
    Unreadable(String),
    Other(String),
}

/// Codec names recognised in FFmpeg decoder errors.
const KNOWN_CODECS: [&str; 9] = [
    "h264", "hevc", "h265", "vp8", "vp9", "av1", "mpeg4", "mpeg2", "theora",
];

fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

impl MediaError {
    /// Sorts a raw FFmpeg or decoder message into a [`MediaError`] kind.
    pub fn classify(raw: &str) -> Self {
        let text = raw.to_lowercase();

        // Missing decoders mention "not found", so they go before file access
        if mentions_any(&text, &["codec", "decoder"]) {
            if let Some(codec) = KNOWN_CODECS.iter().find(|codec| text.contains(*codec)) {
                return MediaError::UnsupportedCodec(codec.to_uppercase());
            }
            if mentions_any(&text, &["not found", "unsupported"]) {
                return MediaError::DecodingFailed(raw.to_string());
            }
        }

        if mentions_any(&text, &["no such file", "permission denied", "i/o error"])
            || (text.contains("not found") && !text.contains("decoder"))
        {
            MediaError::Unreadable(raw.to_string())
        } else if mentions_any(&text, &["no video stream", "no video track"]) {
            MediaError::NoVideoStream
        } else if text.contains("invalid data found") {
            MediaError::UnsupportedFormat
        } else if mentions_any(&text, &["corrupt", "invalid", "malformed"]) {
            MediaError::CorruptedFile
        } else if mentions_any(&text, &["packet", "scaling", "resampl", "seek", "decode"]) {
            MediaError::DecodingFailed(raw.to_string())
        } else {
            MediaError::Other(raw.to_string())
        }
    }
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::UnsupportedFormat => f.write_str("unrecognised media format"),
            MediaError::UnsupportedCodec(codec) => write!(f, "no decoder for {codec}"),
            MediaError::CorruptedFile => f.write_str("the file is damaged"),
            MediaError::NoVideoStream => f.write_str("the file has no video stream"),
            MediaError::DecodingFailed(detail) => write!(f, "decoding failed ({detail})"),
            MediaError::Unreadable(detail) => write!(f, "cannot read file ({detail})"),
            MediaError::Other(detail) => f.write_str(detail),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(detail) => write!(f, "I/O failure: {detail}"),
            Error::Config(detail) => write!(f, "invalid settings: {detail}"),
            Error::Usage(detail) => f.write_str(detail),
            Error::Media(err) => write!(f, "cannot play media: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<MediaError> for Error {
    fn from(err: MediaError) -> Self {
        Error::Media(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<ffmpeg_next::Error> for Error {
    fn from(err: ffmpeg_next::Error) -> Self {
        Error::Media(MediaError::classify(&err.to_string()))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<iced::Error> for Error {
    fn from(err: iced::Error) -> Self {
        Error::Io(format!("window system failure: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
