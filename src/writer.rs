//! Writer-side boundary: plain and always-quoted line emission, with an
//! optional UTF-8 BOM prefix.

use std::io::{self, Write};

use crate::bom::UTF8_BOM;

/// Assemble one always-quoted CSV line from fields.
///
/// Every field is wrapped in double quotes and embedded quotes are doubled.
/// No trailing line terminator is appended.
///
/// ```
/// use csv_loom::quoted_line;
///
/// assert_eq!(quoted_line(["a", "b\"c"]), "\"a\",\"b\"\"c\"");
/// ```
pub fn quoted_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(&field.as_ref().replace('"', "\"\""));
        out.push('"');
    }
    out
}

/// Write the 3-byte UTF-8 BOM.
pub fn write_bom<W: Write>(writer: &mut W) -> io::Result<()> {
    writer.write_all(&UTF8_BOM)
}

/// Builds a [`CsvWriter`].
#[derive(Debug, Clone)]
pub struct WriterBuilder {
    delimiter: u8,
    quote_all: bool,
    bom: bool,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterBuilder {
    /// Comma delimiter, quoting only where needed, no BOM.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote_all: false,
            bom: false,
        }
    }

    /// Set the field delimiter (default `,`).
    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Quote every field, doubling embedded quotes (default: only fields
    /// that need quoting).
    pub fn quote_all(&mut self, quote_all: bool) -> &mut Self {
        self.quote_all = quote_all;
        self
    }

    /// Emit a UTF-8 BOM before any content.
    pub fn bom(&mut self, bom: bool) -> &mut Self {
        self.bom = bom;
        self
    }

    /// Build a writer over `writer`, emitting the BOM now if selected.
    pub fn from_writer<W: Write>(&self, mut writer: W) -> io::Result<CsvWriter<W>> {
        if self.bom {
            write_bom(&mut writer)?;
        }
        let style = if self.quote_all {
            csv::QuoteStyle::Always
        } else {
            csv::QuoteStyle::Necessary
        };
        let inner = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(style)
            .from_writer(writer);
        Ok(CsvWriter { inner })
    }
}

/// CSV record writer; emission itself is delegated to the line codec.
pub struct CsvWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> CsvWriter<W> {
    /// Write one record.
    pub fn write_record<I, S>(&mut self, record: I) -> csv::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.inner.write_record(record)
    }

    /// Flush buffered output to the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
