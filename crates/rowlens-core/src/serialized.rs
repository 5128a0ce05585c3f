//! Decoder for PHP `serialize()` output.
//!
//! Host applications such as WordPress store option values, metadata and
//! transients in this format. The decoder is strict: the whole input must be
//! a single value, and string lengths are byte lengths as written by PHP.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Nesting limit for arrays and objects.
const MAX_DEPTH: usize = 64;

static SIGNATURES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?s)^a:\d+:\{.*\}$"#,
        r#"(?s)^s:\d+:".*";$"#,
        r#"^i:-?\d+;$"#,
        r#"^b:[01];$"#,
        r#"^O:\d+:"[^"]+":"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Whether `data` carries one of the serialized-data signatures
/// (array, string, integer, boolean, object).
pub fn looks_serialized(data: &str) -> bool {
    if data.trim().is_empty() {
        return false;
    }
    SIGNATURES.iter().any(|re| re.is_match(data))
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SerializedError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("expected '{expected}' at byte {pos}")]
    Expected { expected: char, pos: usize },

    #[error("invalid number at byte {0}")]
    InvalidNumber(usize),

    #[error("unsupported type marker '{marker}' at byte {pos}")]
    Unsupported { marker: char, pos: usize },

    #[error("nesting deeper than {MAX_DEPTH} levels")]
    TooDeep,

    #[error("trailing data after byte {0}")]
    TrailingData(usize),
}

/// Array key: PHP arrays are keyed by integers or strings.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for PhpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpKey::Int(i) => write!(f, "{}", i),
            PhpKey::Str(s) => f.write_str(s),
        }
    }
}

/// A decoded PHP value.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<(PhpKey, PhpValue)>),
    Object {
        class: String,
        properties: Vec<(String, PhpValue)>,
    },
    Enum(String),
    Reference(i64),
}

impl PhpValue {
    /// PHP's name for the value's type, as `gettype()` reports it.
    pub fn type_name(&self) -> &'static str {
        match self {
            PhpValue::Null => "NULL",
            PhpValue::Bool(_) => "boolean",
            PhpValue::Int(_) => "integer",
            PhpValue::Float(_) => "double",
            PhpValue::Str(_) => "string",
            PhpValue::Array(_) => "array",
            PhpValue::Object { .. } | PhpValue::Enum(_) => "object",
            PhpValue::Reference(_) => "reference",
        }
    }
}

/// Decode a complete serialized value.
pub fn decode(input: &str) -> Result<PhpValue, SerializedError> {
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
    };
    let value = parser.value(0)?;
    if parser.pos != parser.input.len() {
        return Err(SerializedError::TrailingData(parser.pos));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn value(&mut self, depth: usize) -> Result<PhpValue, SerializedError> {
        if depth > MAX_DEPTH {
            return Err(SerializedError::TooDeep);
        }
        let start = self.pos;
        let marker = self.next()?;
        match marker {
            b'N' => {
                self.expect(b';')?;
                Ok(PhpValue::Null)
            }
            b'b' => {
                self.expect(b':')?;
                let v = self.integer(b';')?;
                match v {
                    0 => Ok(PhpValue::Bool(false)),
                    1 => Ok(PhpValue::Bool(true)),
                    _ => Err(SerializedError::InvalidNumber(start)),
                }
            }
            b'i' => {
                self.expect(b':')?;
                Ok(PhpValue::Int(self.integer(b';')?))
            }
            b'd' => {
                self.expect(b':')?;
                let raw = self.until(b';')?;
                let f = match raw {
                    "INF" => f64::INFINITY,
                    "-INF" => f64::NEG_INFINITY,
                    "NAN" => f64::NAN,
                    other => other
                        .parse::<f64>()
                        .map_err(|_| SerializedError::InvalidNumber(start))?,
                };
                Ok(PhpValue::Float(f))
            }
            b's' => {
                self.expect(b':')?;
                let s = self.string_body()?;
                self.expect(b';')?;
                Ok(PhpValue::Str(s))
            }
            b'E' => {
                self.expect(b':')?;
                let s = self.string_body()?;
                self.expect(b';')?;
                Ok(PhpValue::Enum(s))
            }
            b'r' | b'R' => {
                self.expect(b':')?;
                Ok(PhpValue::Reference(self.integer(b';')?))
            }
            b'a' => {
                self.expect(b':')?;
                let count = self.length(b':')?;
                self.expect(b'{')?;
                let mut entries = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    let key = self.key()?;
                    let value = self.value(depth + 1)?;
                    entries.push((key, value));
                }
                self.expect(b'}')?;
                Ok(PhpValue::Array(entries))
            }
            b'O' => {
                self.expect(b':')?;
                let class = self.string_body()?;
                self.expect(b':')?;
                let count = self.length(b':')?;
                self.expect(b'{')?;
                let mut properties = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    let name = match self.key()? {
                        PhpKey::Str(s) => visible_property_name(&s),
                        PhpKey::Int(i) => i.to_string(),
                    };
                    let value = self.value(depth + 1)?;
                    properties.push((name, value));
                }
                self.expect(b'}')?;
                Ok(PhpValue::Object { class, properties })
            }
            other => Err(SerializedError::Unsupported {
                marker: other as char,
                pos: start,
            }),
        }
    }

    fn key(&mut self) -> Result<PhpKey, SerializedError> {
        let start = self.pos;
        match self.value(MAX_DEPTH)? {
            PhpValue::Int(i) => Ok(PhpKey::Int(i)),
            PhpValue::Str(s) => Ok(PhpKey::Str(s)),
            other => Err(SerializedError::Unsupported {
                marker: other.type_name().chars().next().unwrap_or('?'),
                pos: start,
            }),
        }
    }

    /// `N:"<N bytes>"`; the position is left after the closing quote.
    fn string_body(&mut self) -> Result<String, SerializedError> {
        let len = self.length(b':')?;
        self.expect(b'"')?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or(SerializedError::UnexpectedEnd)?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        self.expect(b'"')?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn length(&mut self, terminator: u8) -> Result<usize, SerializedError> {
        let start = self.pos;
        let n = self.integer(terminator)?;
        usize::try_from(n).map_err(|_| SerializedError::InvalidNumber(start))
    }

    fn integer(&mut self, terminator: u8) -> Result<i64, SerializedError> {
        let start = self.pos;
        self.until(terminator)?
            .parse::<i64>()
            .map_err(|_| SerializedError::InvalidNumber(start))
    }

    /// Text up to `terminator`, consuming the terminator.
    fn until(&mut self, terminator: u8) -> Result<&'a str, SerializedError> {
        let start = self.pos;
        let rel = self.input[start..]
            .iter()
            .position(|b| *b == terminator)
            .ok_or(SerializedError::UnexpectedEnd)?;
        self.pos = start + rel + 1;
        std::str::from_utf8(&self.input[start..start + rel])
            .map_err(|_| SerializedError::InvalidNumber(start))
    }

    fn next(&mut self) -> Result<u8, SerializedError> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or(SerializedError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(b)
    }

    fn expect(&mut self, expected: u8) -> Result<(), SerializedError> {
        let pos = self.pos;
        match self.next() {
            Ok(b) if b == expected => Ok(()),
            Ok(_) => Err(SerializedError::Expected {
                expected: expected as char,
                pos,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Strip the `\0Class\0` / `\0*\0` visibility marker from a property name.
fn visible_property_name(raw: &str) -> String {
    match raw.strip_prefix('\0') {
        Some(rest) => rest
            .split_once('\0')
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| rest.to_string()),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn signatures() {
        assert!(looks_serialized(r#"a:1:{i:0;s:1:"x";}"#));
        assert!(looks_serialized(r#"s:5:"hello";"#));
        assert!(looks_serialized("i:42;"));
        assert!(looks_serialized("b:1;"));
        assert!(looks_serialized(r#"O:8:"stdClass":0:{}"#));
        assert!(!looks_serialized("d:1.5;"));
        assert!(!looks_serialized("hello"));
        assert!(!looks_serialized("   "));
    }

    #[test]
    fn decodes_scalars() {
        assert_eq!(decode("N;").unwrap(), PhpValue::Null);
        assert_eq!(decode("b:1;").unwrap(), PhpValue::Bool(true));
        assert_eq!(decode("i:-7;").unwrap(), PhpValue::Int(-7));
        assert_eq!(decode("d:0.5;").unwrap(), PhpValue::Float(0.5));
        assert_eq!(
            decode(r#"s:5:"hello";"#).unwrap(),
            PhpValue::Str("hello".into())
        );
    }

    #[test]
    fn string_length_is_in_bytes() {
        assert_eq!(decode("s:2:\"é\";").unwrap(), PhpValue::Str("é".into()));
        assert!(decode("s:1:\"é\";").is_err());
    }

    #[test]
    fn string_may_contain_quotes_and_semicolons() {
        assert_eq!(
            decode(r#"s:6:"a";b"c";"#).unwrap(),
            PhpValue::Str(r#"a";b"c"#.into())
        );
    }

    #[test]
    fn decodes_nested_array() {
        let value = decode(r#"a:2:{i:0;s:1:"x";s:4:"list";a:1:{i:0;b:0;}}"#).unwrap();
        assert_eq!(
            value,
            PhpValue::Array(vec![
                (PhpKey::Int(0), PhpValue::Str("x".into())),
                (
                    PhpKey::Str("list".into()),
                    PhpValue::Array(vec![(PhpKey::Int(0), PhpValue::Bool(false))])
                ),
            ])
        );
    }

    #[test]
    fn decodes_object_with_private_properties() {
        let input = "O:3:\"Foo\":2:{s:4:\"name\";s:1:\"a\";s:8:\"\0Foo\0bar\";i:1;}";
        let value = decode(input).unwrap();
        assert_eq!(
            value,
            PhpValue::Object {
                class: "Foo".into(),
                properties: vec![
                    ("name".into(), PhpValue::Str("a".into())),
                    ("bar".into(), PhpValue::Int(1)),
                ],
            }
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode("a:2:{i:0;s:1:\"x\";}").is_err());
        assert!(decode("s:10:\"short\";").is_err());
        assert!(matches!(decode("i:1;x"), Err(SerializedError::TrailingData(_))));
        assert!(decode("b:2;").is_err());
        assert!(decode("").is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let mut input = String::new();
        for _ in 0..100 {
            input.push_str("a:1:{i:0;");
        }
        input.push_str("N;");
        for _ in 0..100 {
            input.push('}');
        }
        assert_eq!(decode(&input), Err(SerializedError::TooDeep));
    }
}
