//! Bounded-width hex/ASCII dumps of raw bytes for debug logs.
//!
//! The table layout matches the one MySQL/MariaDB drivers print when tracing
//! packets:
//!
//! ```text
//! +--------------------------------------------------+
//! |  0  1  2  3  4  5  6  7   8  9  a  b  c  d  e  f |
//! +--------------------------------------------------+------------------+
//! | 74 65 73 74 20 73 6F 6D  65 20 76 61 6C 75 65 20 | test some value  |
//! | 31 32 33                                         | 123              |
//! +--------------------------------------------------+------------------+
//! ```
//!
//! Formatting never fails: a missing buffer or out-of-range offsets simply
//! produce less (or no) output.

const TOP_BORDER: &str = "+--------------------------------------------------+\n";
const COLUMN_HEADER: &str = "|  0  1  2  3  4  5  6  7   8  9  a  b  c  d  e  f |\n";
const TABLE_BORDER: &str = "+--------------------------------------------------+------------------+\n";

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Number of bytes rendered per row.
pub const ROW_WIDTH: usize = 16;

/// Default cap on the number of rendered bytes.
pub const DEFAULT_MAX_DUMP_LENGTH: usize = 256;

/// Controls how much of a buffer gets rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    max_dump_length: Option<usize>,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            max_dump_length: Some(DEFAULT_MAX_DUMP_LENGTH),
        }
    }
}

impl DumpConfig {
    /// Create a config with the given cap. `None` and `Some(0)` both mean
    /// "render everything".
    pub fn new(max_dump_length: Option<usize>) -> Self {
        Self {
            max_dump_length: max_dump_length.filter(|&n| n > 0),
        }
    }

    /// A config that never truncates.
    pub fn unlimited() -> Self {
        Self {
            max_dump_length: None,
        }
    }

    /// Maximum number of bytes (header included) rendered before truncation.
    pub fn max_dump_length(&self) -> Option<usize> {
        self.max_dump_length
    }
}

/// A slice of a buffer to dump, with optional header bytes shown first.
///
/// # Example
///
/// ```
/// use campus::dump::{DumpConfig, DumpRequest};
///
/// let packet = b"\x03SELECT 1";
/// let header = [0x09u8, 0x00, 0x00, 0x00];
/// let text = DumpRequest::new(packet).header(&header).render(&DumpConfig::default());
/// assert!(text.contains("| 09 00 00 00 03 53 45 4C  45 43 54 20 31"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpRequest<'a> {
    buffer: Option<&'a [u8]>,
    start: usize,
    end: Option<usize>,
    header: Option<&'a [u8]>,
}

impl<'a> DumpRequest<'a> {
    /// Dump the whole of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer: Some(buffer),
            ..Self::default()
        }
    }

    /// First byte of `buffer` to render.
    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Exclusive end offset into `buffer`.
    pub fn end(mut self, end: usize) -> Self {
        self.end = Some(end);
        self
    }

    /// Bytes rendered before the buffer slice.
    pub fn header(mut self, header: &'a [u8]) -> Self {
        self.header = Some(header);
        self
    }

    /// Render the dump.
    pub fn render(&self, config: &DumpConfig) -> String {
        format_dump(config, self.buffer, self.start, self.end, self.header)
    }
}

/// Render `header ++ buffer[start..end]` as a hex/ASCII table.
///
/// - `buffer == None` renders nothing.
/// - `end` defaults to the buffer length; both offsets are clamped to the
///   buffer and an inverted range is empty.
/// - Nothing is rendered when there are no bytes at all.
/// - When the config caps the length below the number of available bytes,
///   the last rendered row carries a trailing `...` marker.
pub fn format_dump(
    config: &DumpConfig,
    buffer: Option<&[u8]>,
    start: usize,
    end: Option<usize>,
    header: Option<&[u8]>,
) -> String {
    let Some(buffer) = buffer else {
        return String::new();
    };
    let header = header.unwrap_or_default();

    let end = end.unwrap_or(buffer.len()).min(buffer.len());
    let start = start.min(end);
    let body = &buffer[start..end];

    let total = header.len() + body.len();
    if total == 0 {
        return String::new();
    }

    let shown = config.max_dump_length.map_or(total, |max| max.min(total));
    let truncated = shown < total;

    let bytes: Vec<u8> = header
        .iter()
        .chain(body.iter())
        .copied()
        .take(shown)
        .collect();

    let rows = bytes.len().div_ceil(ROW_WIDTH);
    let mut out = String::with_capacity(
        TOP_BORDER.len() + COLUMN_HEADER.len() + TABLE_BORDER.len() * 2 + rows * 76,
    );
    out.push_str(TOP_BORDER);
    out.push_str(COLUMN_HEADER);
    out.push_str(TABLE_BORDER);

    for (index, chunk) in bytes.chunks(ROW_WIDTH).enumerate() {
        let last = index + 1 == rows;
        push_row(&mut out, chunk, last && truncated);
    }

    out.push_str(TABLE_BORDER);
    out
}

/// Printable ASCII is shown as-is, everything else as `.`.
pub fn ascii_char(byte: u8) -> char {
    if (0x20..0x7F).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}

fn push_row(out: &mut String, chunk: &[u8], truncated: bool) {
    out.push_str("| ");
    for column in 0..ROW_WIDTH {
        match chunk.get(column) {
            Some(&byte) => {
                out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
                out.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
                out.push(' ');
            }
            None => out.push_str("   "),
        }
        if column == 7 {
            out.push(' ');
        }
    }

    out.push_str("| ");
    out.extend(chunk.iter().map(|&b| ascii_char(b)));
    out.extend(std::iter::repeat(' ').take(ROW_WIDTH - chunk.len()));
    out.push_str(if truncated { " |...\n" } else { " |\n" });
}
