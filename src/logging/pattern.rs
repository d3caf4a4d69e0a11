use crate::error::{ConfigError, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;
use std::time::Instant;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Widest padding or precision a placeholder may ask for.
pub const MAX_WIDTH: usize = 1024;

static PROCESS_START: LazyLock<Instant> = LazyLock::new(Instant::now);

/// A value a `%(name)s` placeholder can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	AscTime,
	Created,
	Msecs,
	RelativeCreated,
	Name,
	LevelName,
	LevelNo,
	Message,
	Module,
	FuncName,
	FileName,
	PathName,
	LineNo,
	Thread,
	ThreadName,
	Process,
}

impl Field {
	fn from_name(name: &str) -> Option<Self> {
		let field = match name {
			"asctime" => Field::AscTime,
			"created" => Field::Created,
			"msecs" => Field::Msecs,
			"relativeCreated" => Field::RelativeCreated,
			"name" => Field::Name,
			"levelname" => Field::LevelName,
			"levelno" => Field::LevelNo,
			"message" => Field::Message,
			"module" => Field::Module,
			"funcName" => Field::FuncName,
			"filename" => Field::FileName,
			"pathname" => Field::PathName,
			"lineno" => Field::LineNo,
			"thread" => Field::Thread,
			"threadName" => Field::ThreadName,
			"process" => Field::Process,
			_ => return None,
		};
		Some(field)
	}

	fn is_numeric(self) -> bool {
		matches!(
			self,
			Field::Created
				| Field::Msecs
				| Field::RelativeCreated
				| Field::LevelNo
				| Field::LineNo
				| Field::Process
		)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
	Str,
	Int,
	Float,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Field {
		field: Field,
		left_align: bool,
		zero_pad: bool,
		width: usize,
		precision: Option<usize>,
		conversion: Conversion,
	},
}

enum Value {
	Text(String),
	Int(i64),
	Float(f64),
}

/// The values a single log line is rendered from.
#[derive(Debug, Clone, Default)]
pub struct Record {
	pub asctime: String,
	/// Seconds since the Unix epoch.
	pub created: f64,
	/// Millisecond part of `created`.
	pub msecs: f64,
	/// Milliseconds since the process started logging.
	pub relative_created: f64,
	pub name: String,
	pub level: Option<Level>,
	pub message: String,
	pub module: String,
	pub func_name: String,
	pub filename: String,
	pub pathname: String,
	pub lineno: Option<u32>,
	pub thread: String,
	pub thread_name: String,
	pub process: u32,
}

/// A compiled message pattern such as `%(asctime)s [%(levelname)-8s] %(message)s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
	segments: Vec<Segment>,
}

/// Read a run of digits, bounded by [`MAX_WIDTH`].
fn read_number(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<Option<usize>, String> {
	let mut value: Option<usize> = None;
	while let Some(digit) = chars.next_if(|ch| ch.is_ascii_digit()) {
		let next = value
			.unwrap_or(0)
			.checked_mul(10)
			.and_then(|v| v.checked_add(digit.to_digit(10).unwrap_or(0) as usize))
			.filter(|v| *v <= MAX_WIDTH)
			.ok_or_else(|| format!("width or precision larger than {}", MAX_WIDTH))?;
		value = Some(next);
	}
	Ok(value)
}

impl Pattern {
	/// Compile a pattern, rejecting unknown placeholders and bad conversions.
	///
	/// A placeholder is `%(name)` followed by optional `-`/`0` flags, a width,
	/// a `.precision` and one of the conversions `s`, `d` or `f`.
	pub fn parse(format: &str) -> Result<Self> {
		let invalid = |reason: String| ConfigError::InvalidLogFormat {
			format: format.to_string(),
			reason,
		};

		LazyLock::force(&PROCESS_START);

		let mut segments = Vec::new();
		let mut literal = String::new();
		let mut chars = format.chars().peekable();

		while let Some(c) = chars.next() {
			if c != '%' {
				literal.push(c);
				continue;
			}

			match chars.next() {
				Some('%') => literal.push('%'),
				Some('(') => {
					let mut name = String::new();
					loop {
						match chars.next() {
							Some(')') => break,
							Some(ch) => name.push(ch),
							None => return Err(invalid("unterminated placeholder".to_string())),
						}
					}
					let field = Field::from_name(&name)
						.ok_or_else(|| invalid(format!("unknown placeholder {:?}", name)))?;

					let mut left_align = false;
					let mut zero_pad = false;
					while let Some(flag) = chars.next_if(|ch| *ch == '-' || *ch == '0') {
						match flag {
							'-' => left_align = true,
							_ => zero_pad = true,
						}
					}

					let width = read_number(&mut chars).map_err(invalid)?.unwrap_or(0);
					let precision = if chars.next_if_eq(&'.').is_some() {
						Some(read_number(&mut chars).map_err(invalid)?.unwrap_or(0))
					} else {
						None
					};

					let conversion = match chars.next() {
						Some('s') => Conversion::Str,
						Some('d') if field.is_numeric() => Conversion::Int,
						Some('f') if field.is_numeric() => Conversion::Float,
						Some(other) => {
							return Err(invalid(format!(
								"unsupported conversion '{}' for {:?}",
								other, name
							)));
						}
						None => return Err(invalid("missing conversion".to_string())),
					};

					if !literal.is_empty() {
						segments.push(Segment::Literal(std::mem::take(&mut literal)));
					}
					segments.push(Segment::Field {
						field,
						left_align,
						zero_pad,
						width,
						precision,
						conversion,
					});
				}
				Some(other) => {
					return Err(invalid(format!("unsupported directive '%{}'", other)));
				}
				None => return Err(invalid("dangling '%'".to_string())),
			}
		}

		if !literal.is_empty() {
			segments.push(Segment::Literal(literal));
		}

		Ok(Pattern { segments })
	}

	/// Render one log line (without trailing newline).
	pub fn render(&self, record: &Record) -> String {
		let mut out = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Literal(text) => out.push_str(text),
				Segment::Field {
					field,
					left_align,
					zero_pad,
					width,
					precision,
					conversion,
				} => {
					let text = convert(field_value(*field, record), *conversion, *precision);
					let width = *width;
					if *left_align {
						out.push_str(&format!("{:<width$}", text));
					} else if *zero_pad && *conversion != Conversion::Str {
						match text.strip_prefix('-') {
							Some(digits) => {
								let width = width.saturating_sub(1);
								out.push_str(&format!("-{:0>width$}", digits));
							}
							None => out.push_str(&format!("{:0>width$}", text)),
						}
					} else {
						out.push_str(&format!("{:>width$}", text));
					}
				}
			}
		}
		out
	}

	/// Whether the pattern uses `%(asctime)s`; the timestamp is skipped otherwise.
	pub fn uses_time(&self) -> bool {
		self.segments.iter().any(|segment| {
			matches!(
				segment,
				Segment::Field {
					field: Field::AscTime,
					..
				}
			)
		})
	}
}

fn field_value(field: Field, record: &Record) -> Value {
	match field {
		Field::AscTime => Value::Text(record.asctime.clone()),
		Field::Created => Value::Float(record.created),
		Field::Msecs => Value::Float(record.msecs),
		Field::RelativeCreated => Value::Float(record.relative_created),
		Field::Name => Value::Text(record.name.clone()),
		Field::LevelName => {
			Value::Text(record.level.map(level_name).unwrap_or("NOTSET").to_string())
		}
		Field::LevelNo => Value::Int(record.level.map(level_no).unwrap_or(0).into()),
		Field::Message => Value::Text(record.message.clone()),
		Field::Module => Value::Text(record.module.clone()),
		Field::FuncName => Value::Text(record.func_name.clone()),
		Field::FileName => Value::Text(record.filename.clone()),
		Field::PathName => Value::Text(record.pathname.clone()),
		Field::LineNo => Value::Int(record.lineno.unwrap_or(0).into()),
		Field::Thread => Value::Text(record.thread.clone()),
		Field::ThreadName => Value::Text(record.thread_name.clone()),
		Field::Process => Value::Int(record.process.into()),
	}
}

fn convert(value: Value, conversion: Conversion, precision: Option<usize>) -> String {
	match conversion {
		Conversion::Str => {
			let text = match value {
				Value::Text(text) => text,
				Value::Int(n) => n.to_string(),
				Value::Float(x) => x.to_string(),
			};
			match precision {
				Some(max) => text.chars().take(max).collect(),
				None => text,
			}
		}
		Conversion::Int => {
			let n = match value {
				Value::Int(n) => n,
				Value::Float(x) => x.trunc() as i64,
				Value::Text(text) => return text,
			};
			let digits = precision.unwrap_or(0);
			if n < 0 {
				format!("-{:0>digits$}", n.unsigned_abs())
			} else {
				format!("{:0>digits$}", n)
			}
		}
		Conversion::Float => {
			let x = match value {
				Value::Float(x) => x,
				Value::Int(n) => n as f64,
				Value::Text(text) => return text,
			};
			let precision = precision.unwrap_or(6);
			format!("{:.precision$}", x)
		}
	}
}

/// Classic level name for a tracing level.
pub fn level_name(level: Level) -> &'static str {
	match level {
		Level::TRACE => "TRACE",
		Level::DEBUG => "DEBUG",
		Level::INFO => "INFO",
		Level::WARN => "WARNING",
		_ => "ERROR",
	}
}

/// Classic numeric severity for a tracing level.
pub fn level_no(level: Level) -> u32 {
	match level {
		Level::TRACE => 5,
		Level::DEBUG => 10,
		Level::INFO => 20,
		Level::WARN => 30,
		_ => 40,
	}
}

impl<S, N> FormatEvent<S, N> for Pattern
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> FormatFields<'a> + 'static,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: format::Writer<'_>,
		event: &Event<'_>,
	) -> fmt::Result {
		let meta = event.metadata();

		let mut message = String::new();
		ctx.format_fields(format::Writer::new(&mut message), event)?;

		let pathname = meta.file().unwrap_or_default();
		let filename = pathname.rsplit(['/', '\\']).next().unwrap_or_default();
		let module = meta
			.module_path()
			.and_then(|path| path.rsplit("::").next())
			.unwrap_or_default();
		let current = std::thread::current();
		let now = chrono::Local::now();
		let subsec_micros = f64::from(now.timestamp_subsec_micros());

		let record = Record {
			asctime: if self.uses_time() {
				now.format("%Y-%m-%d %H:%M:%S,%3f").to_string()
			} else {
				String::new()
			},
			created: now.timestamp() as f64 + subsec_micros / 1_000_000.0,
			msecs: subsec_micros / 1000.0,
			relative_created: PROCESS_START.elapsed().as_secs_f64() * 1000.0,
			name: meta.target().to_string(),
			level: Some(*meta.level()),
			message,
			module: module.to_string(),
			func_name: meta.name().to_string(),
			filename: filename.to_string(),
			pathname: pathname.to_string(),
			lineno: meta.line(),
			thread: format!("{:?}", current.id()),
			thread_name: current.name().unwrap_or("unnamed").to_string(),
			process: std::process::id(),
		};

		writeln!(writer, "{}", self.render(&record))
	}
}
