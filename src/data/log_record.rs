use thiserror::Error;

const FIELD_SEPARATOR: char = '\t';

/// Kind tag stored in the second field of every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LogRecordType {
  Delete = 1,

  Put = 2,

  /// Informational, skipped by replay.
  Get = 3,

  /// Informational, skipped by replay.
  HealthCheck = 4,
}

impl LogRecordType {
  fn from_u8(v: u8) -> Option<Self> {
    match v {
      1 => Some(LogRecordType::Delete),
      2 => Some(LogRecordType::Put),
      3 => Some(LogRecordType::Get),
      4 => Some(LogRecordType::HealthCheck),
      _ => None,
    }
  }

  /// Whether replay applies this kind to the store.
  pub fn is_state_changing(&self) -> bool {
    matches!(self, LogRecordType::Delete | LogRecordType::Put)
  }
}

/// One durable entry of the transaction log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
  pub sequence: u64,
  pub rec_type: LogRecordType,
  pub key: String,
  pub value: String,
}

impl LogRecord {
  /// A record that has not been numbered yet. The writer assigns the sequence.
  pub(crate) fn unsequenced(rec_type: LogRecordType, key: &str, value: &str) -> Self {
    Self {
      sequence: 0,
      rec_type,
      key: key.to_string(),
      value: value.to_string(),
    }
  }

  /// Encodes the record as one line, including the trailing newline.
  pub fn encode(&self) -> String {
    let mut line = String::with_capacity(self.key.len() + self.value.len() + 24);
    line.push_str(&self.sequence.to_string());
    line.push(FIELD_SEPARATOR);
    line.push_str(&(self.rec_type as u8).to_string());
    line.push(FIELD_SEPARATOR);
    escape_into(&mut line, &self.key);
    line.push(FIELD_SEPARATOR);
    escape_into(&mut line, &self.value);
    line.push('\n');
    line
  }

  /// Decodes a single line with its line terminator already stripped.
  pub fn decode(line: &str) -> Result<LogRecord, DecodeError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != 4 {
      return Err(DecodeError::FieldCount(fields.len()));
    }

    let sequence = fields[0]
      .parse::<u64>()
      .map_err(|_| DecodeError::InvalidSequence(fields[0].to_string()))?;

    let kind = fields[1]
      .parse::<u8>()
      .map_err(|_| DecodeError::UnknownKind(fields[1].to_string()))?;
    let rec_type =
      LogRecordType::from_u8(kind).ok_or_else(|| DecodeError::UnknownKind(fields[1].to_string()))?;

    let key = unescape(fields[2])?;
    let value = unescape(fields[3])?;

    if key.is_empty() && rec_type != LogRecordType::HealthCheck {
      return Err(DecodeError::EmptyKey);
    }

    Ok(LogRecord {
      sequence,
      rec_type,
      key,
      value,
    })
  }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
  #[error("expected 4 fields, found {0}")]
  FieldCount(usize),

  #[error("invalid sequence number {0:?}")]
  InvalidSequence(String),

  #[error("unknown event kind {0:?}")]
  UnknownKind(String),

  #[error("invalid escape sequence")]
  InvalidEscape,

  #[error("empty key")]
  EmptyKey,
}

fn escape_into(buf: &mut String, s: &str) {
  for c in s.chars() {
    match c {
      '\\' => buf.push_str("\\\\"),
      '\t' => buf.push_str("\\t"),
      '\n' => buf.push_str("\\n"),
      '\r' => buf.push_str("\\r"),
      _ => buf.push(c),
    }
  }
}

fn unescape(s: &str) -> Result<String, DecodeError> {
  if !s.contains('\\') {
    return Ok(s.to_string());
  }

  let mut out = String::with_capacity(s.len());
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('\\') => out.push('\\'),
      Some('t') => out.push('\t'),
      Some('n') => out.push('\n'),
      Some('r') => out.push('\r'),
      _ => return Err(DecodeError::InvalidEscape),
    }
  }
  Ok(out)
}
