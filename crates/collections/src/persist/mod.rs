//! Text and binary save/load for both table variants.
//!
//! Neither format carries a version tag. Loading always rebuilds the table
//! through its regular insert path, so the reloaded slot layout may differ
//! from the saved one while the key/value pairs are the same.

mod chained;
mod open;

use std::{
    fmt::Display,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Largest string accepted by the binary decoder
pub const MAX_FIELD_LEN: u32 = 32 << 20;

/// Largest table capacity a file may ask to be rebuilt with
pub const MAX_DECLARED_CAPACITY: u64 = 1 << 24;

#[derive(Debug, Error)]
pub enum PersistError {
    /// The file could not be opened for reading or created for writing
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Derived IO error
    #[error("Io error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended before the header was complete
    #[error("missing header field: {0}")]
    MissingHeader(&'static str),

    /// The stream ended before every declared entry was read
    #[error("stream truncated after {read} of {declared} entries")]
    Truncated { declared: u64, read: u64 },

    /// A length prefix larger than [`MAX_FIELD_LEN`]
    #[error("length prefix {len} exceeds maximum of {max}")]
    BadLength { len: u32, max: u32 },

    /// A count, key or value that could not be parsed or encoded
    #[error("invalid scalar: {0}")]
    InvalidScalar(String),
}

impl PersistError {
    /// An unexpected EOF in the middle of the entries is a truncated stream
    fn in_entry(self, declared: u64, read: u64) -> Self {
        match self {
            PersistError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                PersistError::Truncated { declared, read }
            }
            e => e,
        }
    }
}

/// Fixed binary form of a key or value.
///
/// Integers are written as 8-byte little-endian `i64`,
/// strings as a 4-byte little-endian length followed by their UTF-8 bytes.
pub trait BinaryScalar: Sized {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<(), PersistError>;
    fn read_from<R: Read>(r: &mut R) -> Result<Self, PersistError>;
}

macro_rules! impl_binary_int {
    ( $( $t: ty ),* ) => {
        $(
            impl BinaryScalar for $t {
                fn write_to<W: Write>(&self, w: &mut W) -> Result<(), PersistError> {
                    let n = i64::try_from(*self).map_err(|_| {
                        PersistError::InvalidScalar(format!("{} does not fit in 8 bytes", self))
                    })?;
                    w.write_all(&n.to_le_bytes())?;
                    Ok(())
                }

                fn read_from<R: Read>(r: &mut R) -> Result<Self, PersistError> {
                    let n = read_i64(r)?;
                    <$t>::try_from(n).map_err(|_| {
                        PersistError::InvalidScalar(format!(
                            "{} out of range for {}",
                            n,
                            stringify!($t)
                        ))
                    })
                }
            }
        )*
    };
}

impl_binary_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl BinaryScalar for String {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<(), PersistError> {
        write_str(w, self)
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, PersistError> {
        read_string(r)
    }
}

impl<T: BinaryScalar> BinaryScalar for crate::ByDisplay<T> {
    fn write_to<W: Write>(&self, w: &mut W) -> Result<(), PersistError> {
        self.0.write_to(w)
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, PersistError> {
        T::read_from(r).map(crate::ByDisplay)
    }
}

// [binary helpers]

pub(crate) fn write_u64<W: Write>(w: &mut W, n: u64) -> Result<(), PersistError> {
    w.write_all(&n.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_u64<R: Read>(r: &mut R) -> Result<u64, PersistError> {
    let mut buf = [0; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_i64<R: Read>(r: &mut R) -> Result<i64, PersistError> {
    let mut buf = [0; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// Reads a `u64` header field, reporting a short read as a missing header
pub(crate) fn read_header<R: Read>(r: &mut R, field: &'static str) -> Result<u64, PersistError> {
    read_u64(r).map_err(|e| match e {
        PersistError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            PersistError::MissingHeader(field)
        }
        e => e,
    })
}

pub(crate) fn write_str<W: Write>(w: &mut W, s: &str) -> Result<(), PersistError> {
    let len = u32::try_from(s.len()).unwrap_or(u32::MAX);
    if len > MAX_FIELD_LEN {
        return Err(PersistError::BadLength {
            len,
            max: MAX_FIELD_LEN,
        });
    }

    w.write_all(&len.to_le_bytes())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

pub(crate) fn read_string<R: Read>(r: &mut R) -> Result<String, PersistError> {
    let mut buf = [0; 4];
    r.read_exact(&mut buf)?;
    let len = u32::from_le_bytes(buf);
    if len > MAX_FIELD_LEN {
        return Err(PersistError::BadLength {
            len,
            max: MAX_FIELD_LEN,
        });
    }

    let mut bytes = vec![0; len as usize];
    r.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| PersistError::InvalidScalar(e.to_string()))
}

// [text helpers]

/// Line reader that knows which line it is on
pub(crate) struct LineReader<R> {
    inner: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buf: String::new(),
        }
    }

    /// Next line without its `\n` terminator, `None` at EOF.
    /// A `\r` before the terminator belongs to the line.
    pub(crate) fn next_line(&mut self) -> Result<Option<&str>, PersistError> {
        self.buf.clear();
        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;

        Ok(Some(self.buf.strip_suffix('\n').unwrap_or(self.buf.as_str())))
    }

    pub(crate) fn header<T>(&mut self, field: &'static str) -> Result<T, PersistError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let line_no = self.line + 1;
        let line = self
            .next_line()?
            .ok_or(PersistError::MissingHeader(field))?;
        parse_field(line.trim(), line_no, field)
    }

    /// Parses the next line as one field of entry number `read`
    pub(crate) fn entry_field<T>(
        &mut self,
        declared: u64,
        read: u64,
        field: &'static str,
    ) -> Result<T, PersistError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let line_no = self.line + 1;
        let line = self
            .next_line()?
            .ok_or(PersistError::Truncated { declared, read })?;
        parse_field(line, line_no, field)
    }
}

/// Prints a key or value for the text format, refusing anything that
/// would spill over onto the next line
pub(crate) fn single_line<T: Display + ?Sized>(
    field: &'static str,
    value: &T,
) -> Result<String, PersistError> {
    let s = value.to_string();
    if s.contains('\n') {
        return Err(PersistError::InvalidScalar(format!(
            "{field} {s:?} contains a line break"
        )));
    }
    Ok(s)
}

fn parse_field<T>(s: &str, line: usize, field: &'static str) -> Result<T, PersistError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    s.parse()
        .map_err(|e| PersistError::InvalidScalar(format!("line {line}: bad {field} {s:?}: {e}")))
}

/// Checks a declared capacity before a table gets allocated for it
pub(crate) fn checked_capacity(declared: u64) -> Result<usize, PersistError> {
    if declared > MAX_DECLARED_CAPACITY {
        return Err(PersistError::InvalidScalar(format!(
            "capacity {declared} exceeds maximum of {MAX_DECLARED_CAPACITY}"
        )));
    }
    Ok(declared as usize)
}

// [files]

pub(crate) fn open_reader(path: &Path) -> Result<BufReader<File>, PersistError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| PersistError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Runs `write` against a freshly created file and flushes it
pub(crate) fn with_writer<F>(path: &Path, write: F) -> Result<(), PersistError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), PersistError>,
{
    let file = File::create(path).map_err(|source| PersistError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut w = BufWriter::new(file);
    write(&mut w)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn string_layout() {
        let mut buf = Vec::new();
        write_str(&mut buf, "hey").unwrap();
        assert_eq!(buf, [3, 0, 0, 0, b'h', b'e', b'y']);

        let mut empty = Vec::new();
        write_str(&mut empty, "").unwrap();
        assert_eq!(empty, [0, 0, 0, 0]);
        assert_eq!(read_string(&mut Cursor::new(empty)).unwrap(), "");
    }

    #[test]
    fn int_layout() {
        let mut buf = Vec::new();
        (-2i32).write_to(&mut buf).unwrap();
        assert_eq!(buf, (-2i64).to_le_bytes());
        assert_eq!(i32::read_from(&mut Cursor::new(buf)).unwrap(), -2);
    }

    #[test]
    fn int_out_of_range() {
        let buf = 300i64.to_le_bytes();
        let err = u8::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, PersistError::InvalidScalar(_)), "{err}");

        let err = u64::MAX.write_to(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, PersistError::InvalidScalar(_)), "{err}");
    }

    #[test]
    fn oversized_length_prefix() {
        let buf = (MAX_FIELD_LEN + 1).to_le_bytes();
        let err = read_string(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, PersistError::BadLength { .. }), "{err}");
    }

    #[test]
    fn short_string_is_eof() {
        let mut buf = 10u32.to_le_bytes().to_vec();
        buf.extend_from_slice(b"abc");
        let err = read_string(&mut Cursor::new(buf)).unwrap_err();
        let err = err.in_entry(2, 1);
        assert!(matches!(err, PersistError::Truncated { declared: 2, read: 1 }), "{err}");
    }

    #[test]
    fn invalid_utf8() {
        let mut buf = 2u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&[0xff, 0xfe]);
        let err = read_string(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, PersistError::InvalidScalar(_)), "{err}");
    }

    #[test]
    fn line_reader_strips_terminators() {
        let mut r = LineReader::new(Cursor::new("a\n\nlast"));
        assert_eq!(r.next_line().unwrap(), Some("a"));
        assert_eq!(r.next_line().unwrap(), Some(""));
        assert_eq!(r.next_line().unwrap(), Some("last"));
        assert_eq!(r.next_line().unwrap(), None);
    }

    #[test]
    fn line_reader_keeps_carriage_returns() {
        let mut r = LineReader::new(Cursor::new("a\r\n\r\n"));
        assert_eq!(r.next_line().unwrap(), Some("a\r"));
        assert_eq!(r.next_line().unwrap(), Some("\r"));
        assert_eq!(r.next_line().unwrap(), None);
    }

    #[test]
    fn single_line_rejects_line_breaks() {
        assert_eq!(single_line("value", "ok\r\tfine").unwrap(), "ok\r\tfine");
        assert_eq!(single_line("key", &42).unwrap(), "42");

        let err = single_line("value", "x\ny").unwrap_err();
        assert!(matches!(err, PersistError::InvalidScalar(_)), "{err}");
    }

    #[test]
    fn missing_header() {
        let mut r = LineReader::new(Cursor::new(""));
        let err = r.header::<u64>("count").unwrap_err();
        assert!(matches!(err, PersistError::MissingHeader("count")), "{err}");

        let mut r = LineReader::new(Cursor::new("ten\n"));
        let err = r.header::<u64>("count").unwrap_err();
        assert!(matches!(err, PersistError::InvalidScalar(_)), "{err}");
    }
}
