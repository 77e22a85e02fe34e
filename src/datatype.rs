// used for date and time literals
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

// used to print out readable forms of a value
use std::fmt;

pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
pub const RDF_PLAIN_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#PlainLiteral";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const ZONED_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    Other,
}

/// The primitive payload of a literal.
///
/// `Other` keeps literals whose datatype is outside the primitive set (or whose
/// lexical form did not parse) so that they survive a load/export cycle untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// A date and time written with a timezone offset.
    ZonedDateTime(DateTime<FixedOffset>),
    Other { lexical: String, datatype: String },
}

impl Value {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Self::String(_) => LiteralKind::String,
            Self::Integer(_) => LiteralKind::Integer,
            Self::Float(_) => LiteralKind::Float,
            Self::Boolean(_) => LiteralKind::Boolean,
            Self::Date(_) => LiteralKind::Date,
            Self::Time(_) => LiteralKind::Time,
            Self::DateTime(_) | Self::ZonedDateTime(_) => LiteralKind::DateTime,
            Self::Other { .. } => LiteralKind::Other,
        }
    }
    /// Full datatype IRI written next to the lexical form; plain strings carry none.
    pub fn datatype_iri(&self) -> Option<String> {
        let local = match self {
            Self::String(_) => return None,
            Self::Integer(_) => "integer",
            Self::Float(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) | Self::ZonedDateTime(_) => "dateTime",
            Self::Other { datatype, .. } => return Some(datatype.clone()),
        };
        Some(format!("{XSD}{local}"))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" on whole numbers
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Self::ZonedDateTime(dt) => write!(f, "{}", dt.format(ZONED_DATETIME_FORMAT)),
            Self::Other { lexical, .. } => f.write_str(lexical),
        }
    }
}

// ------------- Literal -------------

/// How a literal was written in the document it was read from, kept only when
/// the value's own rendering would differ (`1.50` as `xsd:decimal`, say).
#[derive(Clone, Debug, PartialEq, Eq)]
struct SourceForm {
    lexical: String,
    datatype: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    value: Value,
    lang: Option<String>,
    source: Option<SourceForm>,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            lang: None,
            source: None,
        }
    }
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(Value::String(value.into()))
    }
    /// Attaches a language tag. Only string literals can carry one, so the tag
    /// is dropped for any other kind.
    pub fn with_lang(mut self, lang: Option<String>) -> Self {
        self.lang = match self.value {
            Value::String(_) => lang.filter(|l| !l.is_empty()),
            _ => None,
        };
        self
    }
    pub fn value(&self) -> &Value {
        &self.value
    }
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }
    pub fn kind(&self) -> LiteralKind {
        self.value.kind()
    }
    /// The lexical form written out, which is the source text for literals read
    /// from a document.
    pub fn lexical(&self) -> String {
        match &self.source {
            Some(source) => source.lexical.clone(),
            None => self.value.to_string(),
        }
    }
    /// The datatype IRI written out, if any.
    pub fn datatype_iri(&self) -> Option<String> {
        match &self.source {
            Some(source) => Some(source.datatype.clone()),
            None => self.value.datatype_iri(),
        }
    }
    /// Builds a literal from its RDF form. Unlike [`coerce`] this is strict: a
    /// lexical form that does not parse under its datatype is kept verbatim as
    /// [`Value::Other`].
    pub fn from_rdf(lexical: &str, datatype: Option<&str>, lang: Option<&str>) -> Self {
        let Some(datatype) = datatype else {
            return Self::string(lexical).with_lang(lang.map(str::to_owned));
        };
        let other = || Value::Other {
            lexical: lexical.to_owned(),
            datatype: datatype.to_owned(),
        };
        if datatype == RDF_LANG_STRING || datatype == RDF_PLAIN_LITERAL {
            return Self::string(lexical).with_lang(lang.map(str::to_owned));
        }
        let Some(local) = datatype.strip_prefix(XSD) else {
            return Self::new(other());
        };
        let value = match local {
            "string" => Value::String(lexical.to_owned()),
            "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "negativeInteger" | "nonPositiveInteger" | "unsignedInt"
            | "unsignedLong" | "unsignedShort" | "unsignedByte" => lexical
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| other()),
            "decimal" | "float" | "double" => lexical
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| other()),
            "boolean" => match lexical.trim() {
                "true" | "1" => Value::Boolean(true),
                "false" | "0" => Value::Boolean(false),
                _ => other(),
            },
            "date" => NaiveDate::parse_from_str(lexical.trim(), DATE_FORMAT)
                .map(Value::Date)
                .unwrap_or_else(|_| other()),
            "time" => NaiveTime::parse_from_str(lexical.trim(), TIME_FORMAT)
                .map(Value::Time)
                .unwrap_or_else(|_| other()),
            "dateTime" => parse_datetime(lexical.trim()).unwrap_or_else(other),
            _ => other(),
        };
        let mut literal = Self::new(value).with_lang(lang.map(str::to_owned));
        if literal.value.datatype_iri().as_deref() != Some(datatype)
            || literal.value.to_string() != lexical
        {
            literal.source = Some(SourceForm {
                lexical: lexical.to_owned(),
                datatype: datatype.to_owned(),
            });
        }
        literal
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.lexical())
    }
}

fn parse_datetime(s: &str) -> Option<Value> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(Value::DateTime)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(Value::ZonedDateTime))
}

// ------------- Coercion -------------

/// Turns an externally supplied `(value, datatype hint)` pair into a literal.
///
/// Only `xsd:`-prefixed hints are interpreted: `integer`/`int` parse as an
/// integer, `float`/`double`/`decimal` as a float and `boolean` is true for a
/// case-insensitive `"true"` or `"1"`. Any other hint, or no hint, yields a
/// plain string. Integer and float parse failures fall back to the original
/// string instead of failing.
pub fn coerce(value: &str, datatype_hint: Option<&str>) -> Literal {
    let Some(hint) = datatype_hint.and_then(|h| h.strip_prefix("xsd:")) else {
        return Literal::string(value);
    };
    let coerced = match hint {
        "integer" | "int" => value
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::String(value.to_owned())),
        "float" | "double" | "decimal" => value
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::String(value.to_owned())),
        "boolean" => {
            let lowered = value.to_lowercase();
            Value::Boolean(lowered == "true" || lowered == "1")
        }
        _ => Value::String(value.to_owned()),
    };
    Literal::new(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xsd_integer_hint_parses() {
        assert_eq!(coerce("3", Some("xsd:integer")).value(), &Value::Integer(3));
        assert_eq!(coerce("42", Some("xsd:int")).value(), &Value::Integer(42));
    }

    #[test]
    fn malformed_numbers_fall_back_to_string() {
        assert_eq!(
            coerce("three", Some("xsd:integer")).value(),
            &Value::String("three".into())
        );
        assert_eq!(
            coerce("1.2.3", Some("xsd:decimal")).value(),
            &Value::String("1.2.3".into())
        );
    }

    #[test]
    fn boolean_hint_is_lenient() {
        assert_eq!(coerce("TRUE", Some("xsd:boolean")).value(), &Value::Boolean(true));
        assert_eq!(coerce("1", Some("xsd:boolean")).value(), &Value::Boolean(true));
        assert_eq!(coerce("yes", Some("xsd:boolean")).value(), &Value::Boolean(false));
    }

    #[test]
    fn unknown_or_missing_hint_passes_through() {
        assert_eq!(coerce("2.5", None).kind(), LiteralKind::String);
        assert_eq!(coerce("2.5", Some("float")).kind(), LiteralKind::String);
        assert_eq!(coerce("2024-01-01", Some("xsd:date")).kind(), LiteralKind::String);
    }

    #[test]
    fn floats_keep_their_fraction_when_printed() {
        assert_eq!(coerce("3", Some("xsd:double")).to_string(), "3.0");
        assert_eq!(coerce("0.25", Some("xsd:float")).to_string(), "0.25");
    }

    #[test]
    fn rdf_literals_parse_strictly() {
        let date = Literal::from_rdf("2024-02-29", Some(&format!("{XSD}date")), None);
        assert_eq!(date.kind(), LiteralKind::Date);
        let bad = Literal::from_rdf("soon", Some(&format!("{XSD}date")), None);
        assert_eq!(
            bad.value(),
            &Value::Other {
                lexical: "soon".into(),
                datatype: format!("{XSD}date")
            }
        );
        let local = Literal::from_rdf("2024-02-29T10:15:00", Some(&format!("{XSD}dateTime")), None);
        assert_eq!(local.kind(), LiteralKind::DateTime);
        assert_eq!(local, Literal::new(local.value().clone()));
    }

    #[test]
    fn offsets_stay_on_date_times() {
        let datatype = format!("{XSD}dateTime");
        let stamp = Literal::from_rdf("2024-02-29T10:15:00+02:00", Some(&datatype), None);
        assert_eq!(stamp.kind(), LiteralKind::DateTime);
        assert_eq!(stamp.lexical(), "2024-02-29T10:15:00+02:00");
        let Value::ZonedDateTime(at) = stamp.value() else {
            panic!("expected an offset date time, got {:?}", stamp.value());
        };
        assert_eq!(at.offset().local_minus_utc(), 2 * 3600);
        let utc = Literal::from_rdf("2024-02-29T10:15:00Z", Some(&datatype), None);
        assert_eq!(utc.to_string(), "2024-02-29T10:15:00Z");
    }

    #[test]
    fn source_datatypes_and_lexical_forms_are_kept() {
        let price = Literal::from_rdf("1.50", Some(&format!("{XSD}decimal")), None);
        assert_eq!(price.value(), &Value::Float(1.5));
        assert_eq!(price.lexical(), "1.50");
        assert_eq!(price.datatype_iri(), Some(format!("{XSD}decimal")));
        let count = Literal::from_rdf("7", Some(&format!("{XSD}nonNegativeInteger")), None);
        assert_eq!(count.datatype_iri(), Some(format!("{XSD}nonNegativeInteger")));
        // values that render as written need no source form
        let age = Literal::from_rdf("3", Some(&format!("{XSD}integer")), None);
        assert_eq!(age, Literal::new(Value::Integer(3)));
        assert_eq!(coerce("1.5", Some("xsd:decimal")).datatype_iri(), Some(format!("{XSD}double")));
    }

    #[test]
    fn language_tags_only_stick_to_strings() {
        let hello = Literal::from_rdf("hallo", None, Some("de"));
        assert_eq!(hello.lang(), Some("de"));
        let number = Literal::new(Value::Integer(1)).with_lang(Some("de".into()));
        assert_eq!(number.lang(), None);
    }
}
