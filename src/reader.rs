//! The row materializer: drives the line codec over an input stream and
//! delivers raw rows, header-keyed maps, or typed records.
//!
//! One [`Loader`] value holds the configuration; every `read_*`/`records*`
//! call is an independent ingestion run over a fresh byte source. Schema
//! state is derived from the header row per run and discarded at stream end.

use std::io;
use std::ops::ControlFlow;

use foldhash::{HashMap, HashMapExt};

use crate::bom;
use crate::coerce::{self, CoercionContext};
use crate::error::{CoerceError, ReadError, Result};
use crate::schema::{self, Bindings, CsvRecord, FieldSpec};

/// CSV loader with header-driven typed-record materialization.
///
/// # Example
///
/// ```no_run
/// use csv_loom::{CsvRecord, FieldKind, FieldSpec, Loader};
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: i32,
/// }
///
/// impl CsvRecord for Person {
///     fn schema() -> Vec<FieldSpec<Self>> {
///         vec![
///             FieldSpec::new("name", FieldKind::Text, |r, v| {
///                 r.name = v.into_text()?;
///                 Ok(())
///             }),
///             FieldSpec::new("age", FieldKind::Int32, |r, v| {
///                 r.age = v.into_i64()? as i32;
///                 Ok(())
///             }),
///         ]
///     }
/// }
///
/// let loader = Loader::new();
/// let file = std::fs::File::open("people.csv").unwrap();
/// loader
///     .read(file, |index, person: Person| {
///         println!("{index}: {} ({})", person.name, person.age);
///     })
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Loader {
    has_header: bool,
    delimiter: u8,
    comment: Option<u8>,
    ctx: CoercionContext,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Create a new loader: header row expected, comma delimiter, no comment
    /// marker, ISO temporal formats, blanks read as empty strings.
    pub fn new() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            comment: None,
            ctx: CoercionContext::default(),
        }
    }

    /// Whether the first row is a header (default true). Without a header,
    /// typed records bind positionally in schema order.
    pub fn has_header(&mut self, has_header: bool) -> &mut Self {
        self.has_header = has_header;
        self
    }

    /// Set the field delimiter (default `,`).
    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Set a comment marker. Physical lines starting with this byte are
    /// skipped by the line codec before any resolution or counting.
    pub fn comment(&mut self, marker: u8) -> &mut Self {
        self.comment = Some(marker);
        self
    }

    /// Read blank fields as null (default false). Blank text on a nullable
    /// column becomes null; on a non-nullable column coercion is skipped and
    /// the record default stays.
    pub fn blank_is_null(&mut self, blank_is_null: bool) -> &mut Self {
        self.ctx.blank_is_null = blank_is_null;
        self
    }

    /// Set the date format (default ISO calendar date).
    pub fn date_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.ctx.date_format = format.into();
        self
    }

    /// Set the date-time format (default ISO combined date-time).
    pub fn datetime_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.ctx.datetime_format = format.into();
        self
    }

    /// Set the time format (default ISO time).
    pub fn time_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.ctx.time_format = format.into();
        self
    }

    /// Set the boolean interpreter (default: case-insensitive `"true"`).
    pub fn boolean_reader(&mut self, reader: fn(&str) -> bool) -> &mut Self {
        self.ctx.boolean_reader = reader;
        self
    }

    /// The coercion configuration a run of this loader will use.
    pub fn context(&self) -> &CoercionContext {
        &self.ctx
    }

    fn codec<R: io::Read>(&self, rdr: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .comment(self.comment)
            .from_reader(rdr)
    }

    /// Read typed records, invoking `consumer` per materialized row.
    ///
    /// Stops the whole ingestion on the first row failure and propagates it
    /// (the default error policy). With a header, content rows are delivered
    /// with indices 1, 2, ...; without one, 0, 1, ... The byte source is
    /// released on every exit path.
    pub fn read<T, R, F>(&self, rdr: R, mut consumer: F) -> Result<()>
    where
        T: CsvRecord,
        R: io::Read,
        F: FnMut(u64, T),
    {
        let specs = T::schema();
        let mut reader = self.codec(rdr);
        let mut record = csv::StringRecord::new();
        let mut bindings = self.initial_bindings(&specs);
        let mut row_index: u64 = 0;

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => return Ok(()),
                Ok(true) => {}
                Err(err) => {
                    let line = csv_error_line(&err);
                    return Err(ReadError::from(err).at_line(line));
                }
            }
            let line = record_line(&record);
            if let Some(bindings) = bindings.as_mut() {
                let rec = materialize(&specs, bindings, &record, &self.ctx)
                    .map_err(|e| e.at_line(line))?;
                consumer(row_index, rec);
            } else {
                bindings = Some(resolve_header(&record, &specs));
            }
            row_index += 1;
        }
    }

    /// Read typed records, delivering every row outcome to `consumer`.
    ///
    /// Row failures are handed over instead of aborting, and later rows are
    /// unaffected; returning [`ControlFlow::Break`] cancels the run. A
    /// structural failure on the header row itself is fatal, since no schema
    /// can be resolved from it.
    pub fn read_outcomes<T, R, F>(&self, rdr: R, mut consumer: F) -> Result<()>
    where
        T: CsvRecord,
        R: io::Read,
        F: FnMut(u64, Result<T>) -> ControlFlow<()>,
    {
        let specs = T::schema();
        let mut reader = self.codec(rdr);
        let mut record = csv::StringRecord::new();
        let mut bindings = self.initial_bindings(&specs);
        let mut row_index: u64 = 0;

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => return Ok(()),
                Ok(true) => {}
                Err(err) => {
                    let line = csv_error_line(&err);
                    let wrapped = ReadError::from(err).at_line(line);
                    if bindings.is_none() {
                        return Err(wrapped);
                    }
                    if consumer(row_index, Err(wrapped)).is_break() {
                        return Ok(());
                    }
                    row_index += 1;
                    continue;
                }
            }
            let line = record_line(&record);
            if let Some(bindings) = bindings.as_mut() {
                let outcome =
                    materialize(&specs, bindings, &record, &self.ctx).map_err(|e| e.at_line(line));
                if consumer(row_index, outcome).is_break() {
                    return Ok(());
                }
            } else {
                bindings = Some(resolve_header(&record, &specs));
            }
            row_index += 1;
        }
    }

    /// Lazily read typed records as a single-pass, forward-only iterator.
    ///
    /// Nothing is read until the first advance; the header is resolved on
    /// first access. The iterator is fused after its first error (same stop
    /// policy as [`Loader::read`]). Dropping it, fully consumed or not,
    /// releases the byte source.
    pub fn records<T, R>(&self, rdr: R) -> Records<R, T>
    where
        T: CsvRecord,
        R: io::Read,
    {
        let specs = T::schema();
        let bindings = self.initial_bindings(&specs);
        Records {
            reader: self.codec(rdr),
            specs,
            bindings,
            ctx: self.ctx.clone(),
            row_index: 0,
            done: false,
        }
    }

    /// Read rows through an explicit converter instead of the schema.
    ///
    /// Header resolution and type coercion are bypassed; a header row (if
    /// configured) is consumed and discarded. Converter failures are row
    /// failures with line attribution, and stop the ingestion.
    pub fn read_with<T, R, C, F>(&self, rdr: R, mut convert: C, mut consumer: F) -> Result<()>
    where
        R: io::Read,
        C: FnMut(&csv::StringRecord) -> std::result::Result<T, CoerceError>,
        F: FnMut(u64, T),
    {
        let mut reader = self.codec(rdr);
        let mut record = csv::StringRecord::new();
        let mut row_index: u64 = 0;

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => return Ok(()),
                Ok(true) => {}
                Err(err) => {
                    let line = csv_error_line(&err);
                    return Err(ReadError::from(err).at_line(line));
                }
            }
            let line = record_line(&record);
            if !(self.has_header && row_index == 0) {
                let rec = convert(&record)
                    .map_err(|source| ReadError::Convert { source }.at_line(line))?;
                consumer(row_index, rec);
            }
            row_index += 1;
        }
    }

    /// Converter-mode counterpart of [`Loader::records`].
    pub fn records_with<T, R, C>(&self, rdr: R, convert: C) -> RecordsWith<R, T, C>
    where
        R: io::Read,
        C: FnMut(&csv::StringRecord) -> std::result::Result<T, CoerceError>,
    {
        RecordsWith {
            reader: self.codec(rdr),
            convert,
            skip_first: self.has_header,
            row_index: 0,
            done: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// Read raw field sequences.
    ///
    /// With a header configured, the header fields (first field BOM-stripped)
    /// go to `header` and content rows to `row`; without one, every row goes
    /// to `row` starting at index 0, BOM-stripped on the first.
    pub fn read_raw<R, H, F>(&self, rdr: R, mut header: H, mut row: F) -> Result<()>
    where
        R: io::Read,
        H: FnMut(&[String]),
        F: FnMut(u64, &[String]),
    {
        let mut reader = self.codec(rdr);
        let mut record = csv::StringRecord::new();
        let mut row_index: u64 = 0;

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => return Ok(()),
                Ok(true) => {}
                Err(err) => {
                    let line = csv_error_line(&err);
                    return Err(ReadError::from(err).at_line(line));
                }
            }
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            if row_index == 0 {
                if let Some(first) = fields.first_mut() {
                    if bom::is_bom_present(first) {
                        *first = bom::strip(first).to_string();
                    }
                }
            }
            if self.has_header && row_index == 0 {
                header(&fields);
            } else {
                row(row_index, &fields);
            }
            row_index += 1;
        }
    }

    /// Read rows as header-keyed maps: `header name -> field text`.
    ///
    /// Requires header mode.
    pub fn read_map<R, F>(&self, rdr: R, mut consumer: F) -> Result<()>
    where
        R: io::Read,
        F: FnMut(u64, HashMap<String, String>),
    {
        if !self.has_header {
            return Err(ReadError::InvalidConfig(
                "read_map requires a header row".to_string(),
            ));
        }
        let mut reader = self.codec(rdr);
        let mut record = csv::StringRecord::new();
        let mut keys: Vec<String> = Vec::new();
        let mut row_index: u64 = 0;

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => return Ok(()),
                Ok(true) => {}
                Err(err) => {
                    let line = csv_error_line(&err);
                    return Err(ReadError::from(err).at_line(line));
                }
            }
            if row_index == 0 {
                keys = record.iter().map(str::to_string).collect();
                if let Some(first) = keys.first_mut() {
                    if bom::is_bom_present(first) {
                        *first = bom::strip(first).to_string();
                    }
                }
            } else {
                let mut map: HashMap<String, String> = HashMap::with_capacity(keys.len());
                for (key, field) in keys.iter().zip(record.iter()) {
                    map.insert(key.clone(), field.to_string());
                }
                consumer(row_index, map);
            }
            row_index += 1;
        }
    }

    fn initial_bindings<T>(&self, specs: &[FieldSpec<T>]) -> Option<Bindings> {
        if self.has_header {
            None
        } else {
            Some(schema::positional(specs))
        }
    }
}

/// Lazy single-pass iterator of typed records from [`Loader::records`].
///
/// Items are `(row_index, record)` pairs; the iterator ends after yielding
/// its first error.
pub struct Records<R: io::Read, T: CsvRecord> {
    reader: csv::Reader<R>,
    specs: Vec<FieldSpec<T>>,
    bindings: Option<Bindings>,
    ctx: CoercionContext,
    row_index: u64,
    done: bool,
}

impl<R: io::Read, T: CsvRecord> Iterator for Records<R, T> {
    type Item = Result<(u64, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut record = csv::StringRecord::new();
        loop {
            match self.reader.read_record(&mut record) {
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Ok(true) => {}
                Err(err) => {
                    self.done = true;
                    let line = csv_error_line(&err);
                    return Some(Err(ReadError::from(err).at_line(line)));
                }
            }
            let line = record_line(&record);
            let index = self.row_index;
            self.row_index += 1;
            if let Some(bindings) = self.bindings.as_mut() {
                match materialize(&self.specs, bindings, &record, &self.ctx) {
                    Ok(rec) => return Some(Ok((index, rec))),
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err.at_line(line)));
                    }
                }
            } else {
                self.bindings = Some(resolve_header(&record, &self.specs));
            }
        }
    }
}

/// Lazy single-pass iterator of converter-produced records from
/// [`Loader::records_with`].
pub struct RecordsWith<R: io::Read, T, C> {
    reader: csv::Reader<R>,
    convert: C,
    skip_first: bool,
    row_index: u64,
    done: bool,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<R, T, C> Iterator for RecordsWith<R, T, C>
where
    R: io::Read,
    C: FnMut(&csv::StringRecord) -> std::result::Result<T, CoerceError>,
{
    type Item = Result<(u64, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut record = csv::StringRecord::new();
        loop {
            match self.reader.read_record(&mut record) {
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Ok(true) => {}
                Err(err) => {
                    self.done = true;
                    let line = csv_error_line(&err);
                    return Some(Err(ReadError::from(err).at_line(line)));
                }
            }
            let line = record_line(&record);
            let index = self.row_index;
            self.row_index += 1;
            if self.skip_first && index == 0 {
                continue;
            }
            match (self.convert)(&record) {
                Ok(rec) => return Some(Ok((index, rec))),
                Err(source) => {
                    self.done = true;
                    return Some(Err(ReadError::Convert { source }.at_line(line)));
                }
            }
        }
    }
}

fn resolve_header<T>(record: &csv::StringRecord, specs: &[FieldSpec<T>]) -> Bindings {
    let headers: Vec<String> = record.iter().map(str::to_string).collect();
    schema::resolve(&headers, specs)
}

/// Construct one record from a bound row.
fn materialize<T: CsvRecord>(
    specs: &[FieldSpec<T>],
    bindings: &Bindings,
    record: &csv::StringRecord,
    ctx: &CoercionContext,
) -> Result<T> {
    if record.len() < bindings.len() {
        return Err(ReadError::FieldCount {
            expected: bindings.len(),
            found: record.len(),
        });
    }
    let mut out = T::default();
    for (column, binding) in bindings.iter().enumerate() {
        let Some(index) = binding else { continue };
        let spec = &specs[*index];
        let raw = &record[column];
        let coerced = coerce::coerce(spec.kind, spec.nullable, raw, ctx).map_err(|source| {
            ReadError::Field {
                column,
                name: spec.name.to_string(),
                kind: spec.kind,
                source,
            }
        })?;
        // None = blank skipped under the blank-is-null policy.
        let Some(value) = coerced else { continue };
        (spec.assign)(&mut out, value).map_err(|source| ReadError::Field {
            column,
            name: spec.name.to_string(),
            kind: spec.kind,
            source,
        })?;
    }
    Ok(out)
}

/// 1-based physical line of a record, as reported by the line codec.
fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

fn csv_error_line(err: &csv::Error) -> u64 {
    err.position().map_or(0, csv::Position::line)
}
