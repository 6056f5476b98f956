//! Transparent decompression of dump inputs.

use std::io::{self, Read};
use std::path::Path;

/// Compression format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Detect compression format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap a reader with the appropriate decompressor
    pub fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }

    /// Path with the compression extension removed (`dump.sql.gz` -> `dump.sql`)
    pub fn strip_extension(&self, path: &Path) -> std::path::PathBuf {
        match self {
            Compression::None => path.to_path_buf(),
            _ => path.with_extension(""),
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_path() {
        assert_eq!(Compression::from_path(Path::new("a.sql")), Compression::None);
        assert_eq!(Compression::from_path(Path::new("a.sql.GZ")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("a.sql.bz2")), Compression::Bzip2);
        assert_eq!(Compression::from_path(Path::new("a.sql.xz")), Compression::Xz);
        assert_eq!(Compression::from_path(Path::new("a.sql.zst")), Compression::Zstd);
    }

    #[test]
    fn test_gzip_round_trip() {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
        encoder.write_all(b"INSERT INTO `t` VALUES (1);\n").unwrap();
        let bytes = encoder.finish().unwrap();

        let mut reader = Compression::Gzip
            .wrap_reader(Box::new(io::Cursor::new(bytes)))
            .unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "INSERT INTO `t` VALUES (1);\n");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(
            Compression::Gzip.strip_extension(Path::new("dump.sql.gz")),
            Path::new("dump.sql")
        );
        assert_eq!(
            Compression::None.strip_extension(Path::new("dump.sql")),
            Path::new("dump.sql")
        );
    }
}
