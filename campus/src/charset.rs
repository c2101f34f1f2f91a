//! Connection character sets.

use std::fmt;
use std::str::FromStr;

use crate::error::EscapeError;

/// A MySQL/MariaDB connection character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8mb4,
    Utf8mb3,
    Latin1,
    Latin2,
    Ascii,
    Binary,
    Cp1250,
    Cp1251,
    Cp1256,
    Euckr,
    Ujis,
    Big5,
    Gbk,
    Gb18030,
    Sjis,
    Cp932,
}

impl Charset {
    /// The server-side name of the charset.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8mb4 => "utf8mb4",
            Charset::Utf8mb3 => "utf8mb3",
            Charset::Latin1 => "latin1",
            Charset::Latin2 => "latin2",
            Charset::Ascii => "ascii",
            Charset::Binary => "binary",
            Charset::Cp1250 => "cp1250",
            Charset::Cp1251 => "cp1251",
            Charset::Cp1256 => "cp1256",
            Charset::Euckr => "euckr",
            Charset::Ujis => "ujis",
            Charset::Big5 => "big5",
            Charset::Gbk => "gbk",
            Charset::Gb18030 => "gb18030",
            Charset::Sjis => "sjis",
            Charset::Cp932 => "cp932",
        }
    }

    /// Look up a charset by name, case-insensitively.
    ///
    /// `utf8` is accepted as an alias of `utf8mb3`.
    pub fn from_name(name: &str) -> Result<Self, EscapeError> {
        let charset = match name.trim().to_ascii_lowercase().as_str() {
            "utf8mb4" => Charset::Utf8mb4,
            "utf8mb3" | "utf8" => Charset::Utf8mb3,
            "latin1" => Charset::Latin1,
            "latin2" => Charset::Latin2,
            "ascii" => Charset::Ascii,
            "binary" => Charset::Binary,
            "cp1250" => Charset::Cp1250,
            "cp1251" => Charset::Cp1251,
            "cp1256" => Charset::Cp1256,
            "euckr" => Charset::Euckr,
            "ujis" => Charset::Ujis,
            "big5" => Charset::Big5,
            "gbk" => Charset::Gbk,
            "gb18030" => Charset::Gb18030,
            "sjis" => Charset::Sjis,
            "cp932" => Charset::Cp932,
            _ => {
                return Err(EscapeError::UnknownCharset {
                    name: name.to_string(),
                })
            }
        };
        Ok(charset)
    }

    /// Whether backslash escaping is safe for arbitrary bytes in this charset.
    ///
    /// The listed multi-byte charsets allow `0x5C` (`\`) as the trailing byte
    /// of a character, so an escape inserted before it can be swallowed.
    pub fn is_escape_safe(&self) -> bool {
        !matches!(
            self,
            Charset::Big5 | Charset::Gbk | Charset::Gb18030 | Charset::Sjis | Charset::Cp932
        )
    }
}

impl FromStr for Charset {
    type Err = EscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Charset::from_name(s)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
