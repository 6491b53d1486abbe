//! Instance store for the data section of a STEP (ISO-10303-21) exchange file.

use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::ParseError;

/// One attribute value of a STEP record.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(u64),
    List(Vec<StepValue>),
    /// Inline typed value such as `IFCLABEL('Wall')`.
    Typed {
        type_name: String,
        value: Box<StepValue>,
    },
    Null,
    Derived,
}

impl StepValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StepValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<u64> {
        match self {
            StepValue::Reference(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            StepValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric value, accepting integers where a real is expected.
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            StepValue::Real(f) => Some(*f),
            StepValue::Integer(i) => Some(*i as f64),
            StepValue::Typed { value, .. } => value.as_real(),
            _ => None,
        }
    }
}

/// A single `#id=TYPE(...)` record.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEntity {
    pub id: u64,
    /// Uppercase type tag, e.g. `IFCWALL`.
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepValue> {
        self.values.get(index)
    }
}

/// Parsed records of one file, kept in file order with an id index.
#[derive(Debug, Default)]
pub struct StepFile {
    entities: Vec<StepEntity>,
    index: FxHashMap<u64, usize>,
    pub schema: String,
}

impl StepFile {
    /// Reads and parses a STEP file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(&path).map_err(|source| ParseError::FileRead {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut file = StepFile::default();
        let mut in_data = false;
        let mut saw_data = false;
        let mut skipped = 0usize;

        for statement in split_statements(content)? {
            let statement = statement.trim();

            if statement.starts_with("FILE_SCHEMA") {
                file.schema = parse_schema_name(statement).unwrap_or_default();
                continue;
            }

            match statement {
                "DATA" => {
                    in_data = true;
                    saw_data = true;
                    continue;
                }
                "ENDSEC" => {
                    in_data = false;
                    continue;
                }
                _ => {}
            }

            if in_data && statement.starts_with('#') {
                match parse_entity(statement) {
                    Some(entity) => file.push(entity),
                    None => skipped += 1,
                }
            }
        }

        if !saw_data {
            return Err(ParseError::InvalidStep {
                message: "missing DATA section".to_string(),
            });
        }

        debug!(
            instances = file.entities.len(),
            skipped,
            schema = %file.schema,
            "parsed STEP data section"
        );
        Ok(file)
    }

    fn push(&mut self, entity: StepEntity) {
        let position = self.entities.len();
        if self.index.insert(entity.id, position).is_some() {
            warn!(id = entity.id, "duplicate instance id, later record supersedes");
        }
        self.entities.push(entity);
    }

    /// All records in file order, including superseded ones.
    pub fn instances(&self) -> impl Iterator<Item = &StepEntity> {
        self.entities.iter()
    }

    /// Records in file order, skipping those superseded by a later record with the same id.
    pub fn valid_instances(&self) -> impl Iterator<Item = &StepEntity> {
        self.entities.iter().filter(|e| self.is_valid(e))
    }

    /// Whether `entity` is the record currently addressed by its id.
    #[must_use]
    pub fn is_valid(&self, entity: &StepEntity) -> bool {
        self.index
            .get(&entity.id)
            .and_then(|&pos| self.entities.get(pos))
            .is_some_and(|current| std::ptr::eq(current, entity))
    }

    #[must_use]
    pub fn get_entity(&self, id: u64) -> Option<&StepEntity> {
        self.index.get(&id).and_then(|&pos| self.entities.get(pos))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Splits file content on `;` outside quoted strings, dropping `/* */` comments.
fn split_statements(content: &str) -> Result<Vec<String>, ParseError> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            '/' if !in_string && chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' if !in_string => {
                statements.push(std::mem::take(&mut current));
            }
            '\r' | '\n' if !in_string => current.push(' '),
            _ => current.push(ch),
        }
    }

    if in_string {
        return Err(ParseError::InvalidStep {
            message: "unterminated string literal".to_string(),
        });
    }
    if !current.trim().is_empty() {
        statements.push(current);
    }

    Ok(statements)
}

fn parse_schema_name(statement: &str) -> Option<String> {
    let start = statement.find('\'')? + 1;
    let end = statement[start..].find('\'')?;
    Some(statement[start..start + end].to_string())
}

/// Parses `#123=IFCWALL('guid',#ref,'name',...)`.
fn parse_entity(statement: &str) -> Option<StepEntity> {
    let eq_pos = statement.find('=')?;
    let id: u64 = statement[1..eq_pos].trim().parse().ok()?;

    let rest = statement[eq_pos + 1..].trim();
    if rest.starts_with('(') {
        debug!(id, "skipping complex entity instance");
        return None;
    }

    let paren_pos = rest.find('(')?;
    let close_pos = rest.rfind(')')?;
    if close_pos < paren_pos {
        return None;
    }
    let entity_type = rest[..paren_pos].trim().to_ascii_uppercase();
    let values = parse_values(&rest[paren_pos + 1..close_pos]);

    Some(StepEntity {
        id,
        entity_type,
        values,
    })
}

fn parse_values(s: &str) -> Vec<StepValue> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut paren_depth = 0usize;

    for ch in s.chars() {
        match ch {
            '\'' => {
                in_string = !in_string;
                current.push(ch);
            }
            '(' if !in_string => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' if !in_string => {
                paren_depth = paren_depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if !in_string && paren_depth == 0 => {
                values.push(parse_single_value(&current));
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        values.push(parse_single_value(&current));
    }

    values
}

fn parse_single_value(s: &str) -> StepValue {
    let s = s.trim();

    match s {
        "$" => return StepValue::Null,
        "*" => return StepValue::Derived,
        _ => {}
    }
    if let Some(stripped) = s.strip_prefix('#') {
        if let Ok(id) = stripped.trim().parse::<u64>() {
            return StepValue::Reference(id);
        }
    }
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        return StepValue::String(decode_step_string(&s[1..s.len() - 1]));
    }
    if s.len() >= 2 && s.starts_with('.') && s.ends_with('.') {
        return match &s[1..s.len() - 1] {
            "T" => StepValue::Boolean(true),
            "F" => StepValue::Boolean(false),
            other => StepValue::Enum(other.to_string()),
        };
    }
    if s.starts_with('(') && s.ends_with(')') {
        return StepValue::List(parse_values(&s[1..s.len() - 1]));
    }
    if let Ok(i) = s.parse::<i64>() {
        return StepValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return StepValue::Real(f);
    }
    if let (Some(paren_pos), true) = (s.find('('), s.ends_with(')')) {
        let type_name = s[..paren_pos].trim();
        if !type_name.is_empty() && type_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return StepValue::Typed {
                type_name: type_name.to_ascii_uppercase(),
                value: Box::new(parse_single_value(&s[paren_pos + 1..s.len() - 1])),
            };
        }
    }

    StepValue::String(s.to_string())
}

/// Decodes STEP string escapes:
/// `''` apostrophe, `\\` backslash, `\X\hh` ISO 8859-1 byte,
/// `\X2\hhhh...\X0\` UCS-2 code points, `\S\c` high-half shift.
fn decode_step_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(ch) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("''") {
            out.push('\'');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("\\\\") {
            out.push('\\');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("\\X2\\") {
            let end = tail.find("\\X0\\").unwrap_or(tail.len());
            push_code_units(&mut out, &tail[..end]);
            rest = tail.get(end + 4..).unwrap_or("");
        } else if let Some(tail) = rest.strip_prefix("\\X\\") {
            let byte = tail
                .get(..2)
                .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            match byte {
                Some(byte) => {
                    out.push(char::from(byte));
                    rest = &tail[2..];
                }
                // Not an escape after all: keep it and everything after it.
                None => {
                    out.push_str("\\X\\");
                    rest = tail;
                }
            }
        } else if let Some(tail) = rest.strip_prefix("\\S\\") {
            let mut tail_chars = tail.chars();
            if let Some(c) = tail_chars.next() {
                if let Some(shifted) = char::from_u32(u32::from(c) + 0x80) {
                    out.push(shifted);
                }
            }
            rest = tail_chars.as_str();
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }

    out
}

fn push_code_units(out: &mut String, hex: &str) {
    for chunk in hex.as_bytes().chunks(4) {
        let decoded = std::str::from_utf8(chunk)
            .ok()
            .filter(|s| s.len() == 4)
            .and_then(|s| u32::from_str_radix(s, 16).ok())
            .and_then(char::from_u32);
        if let Some(c) = decoded {
            out.push(c);
        }
    }
}
