//! Compact encoding used when a character is handed to another device.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::character::Character;
use crate::error::{EngineError, Result};

/// zlib-compressed JSON envelope.
pub fn encode(character: &Character) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(character).map_err(|e| EngineError::Encode(e.to_string()))?;
    compress_into(Vec::new(), &json)
}

fn compress_into<W: Write>(sink: W, json: &[u8]) -> Result<W> {
    let mut encoder = ZlibEncoder::new(sink, Compression::best());
    encoder
        .write_all(json)
        .map_err(|e| EngineError::Encode(e.to_string()))?;
    encoder.finish().map_err(|e| EngineError::Encode(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<Character> {
    let mut json = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|e| EngineError::Decode(format!("not a compressed payload: {e}")))?;
    serde_json::from_slice(&json).map_err(|e| EngineError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_encode_errors() {
        let json = vec![b'x'; 4096];
        assert!(matches!(
            compress_into(ClosedSink, &json),
            Err(EngineError::Encode(_))
        ));
    }
}
