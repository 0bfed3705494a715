//! Typed views over RDF literals.
//!
//! Range, length and property-pair constraints compare literal *values*, not
//! lexical forms. Parsing is delegated to `oxsdatatypes`, except for integers
//! that do not fit an `i64`; this module also decides which datatypes are
//! comparable with each other.

use crate::named_nodes::RDF;
use oxigraph::model::vocab::xsd;
use oxigraph::model::{Literal, NamedNodeRef, Term};
use oxsdatatypes::{Boolean, Date, DateTime, Decimal, Double, Float, Integer, Time};
use std::cmp::Ordering;
use std::str::FromStr;

/// The value space a literal was parsed into.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `xsd:integer` and its derived types, plus `xsd:decimal`.
    Exact(Decimal),
    /// Integers outside the `i64` range.
    BigInteger(BigInteger),
    /// `xsd:double` and `xsd:float`.
    Approximate(f64),
    Boolean(bool),
    Date(Date),
    DateTime(DateTime),
    Time(Time),
    /// Plain, `xsd:string` or language-tagged literals.
    String(String),
}

impl LiteralValue {
    /// Parses a literal into its value space. Returns `None` for datatypes the
    /// engine does not interpret, and for ill-typed lexical forms.
    pub fn from_literal(literal: &Literal) -> Option<Self> {
        let dt = literal.datatype();
        let lex = literal.value();
        if is_string_datatype(dt) {
            return Some(LiteralValue::String(lex.to_string()));
        }
        if let Some(bounds) = integer_bounds(dt) {
            let parsed = BigInteger::parse(lex)?;
            if !bounds.admits(&parsed) {
                return None;
            }
            return Some(match Integer::from_str(lex) {
                Ok(i) => LiteralValue::Exact(Decimal::from(i)),
                Err(_) => LiteralValue::BigInteger(parsed),
            });
        }
        let value = if dt == xsd::DECIMAL {
            LiteralValue::Exact(Decimal::from_str(lex).ok()?)
        } else if dt == xsd::DOUBLE {
            LiteralValue::Approximate(f64::from(Double::from_str(lex).ok()?))
        } else if dt == xsd::FLOAT {
            LiteralValue::Approximate(f64::from(Float::from_str(lex).ok()?))
        } else if dt == xsd::BOOLEAN {
            LiteralValue::Boolean(bool::from(Boolean::from_str(lex).ok()?))
        } else if dt == xsd::DATE {
            LiteralValue::Date(Date::from_str(lex).ok()?)
        } else if dt == xsd::DATE_TIME {
            LiteralValue::DateTime(DateTime::from_str(lex).ok()?)
        } else if dt == xsd::TIME {
            LiteralValue::Time(Time::from_str(lex).ok()?)
        } else {
            return None;
        };
        Some(value)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            LiteralValue::Exact(d) => d.to_string().parse().ok(),
            LiteralValue::Approximate(f) => Some(*f),
            LiteralValue::BigInteger(b) => b.to_string().parse().ok(),
            _ => None,
        }
    }

    /// Orders two values of compatible value spaces. Numbers compare across
    /// exact and approximate types; everything else only within its own space.
    pub fn partial_cmp_value(&self, other: &LiteralValue) -> Option<Ordering> {
        use LiteralValue::*;
        match (self, other) {
            (Exact(a), Exact(b)) => Some(a.cmp(b)),
            (BigInteger(a), BigInteger(b)) => Some(a.cmp(b)),
            (BigInteger(a), Exact(b)) => Some(a.cmp_decimal(b)),
            (Exact(a), BigInteger(b)) => Some(b.cmp_decimal(a).reverse()),
            (
                Exact(_) | Approximate(_) | BigInteger(_),
                Exact(_) | Approximate(_) | BigInteger(_),
            ) => self.as_f64()?.partial_cmp(&other.as_f64()?),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => a.partial_cmp(b),
            (DateTime(a), DateTime(b)) => a.partial_cmp(b),
            (Time(a), Time(b)) => a.partial_cmp(b),
            (String(a), String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// An integer kept as its sign and decimal digits, so values of the unbounded
/// integer types are not limited to a machine word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigInteger {
    negative: bool,
    /// Magnitude without leading zeros; empty for zero.
    digits: String,
}

impl BigInteger {
    /// Parses the `xsd:integer` lexical form `[+-]?[0-9]+`.
    pub fn parse(lex: &str) -> Option<Self> {
        let (negative, rest) = match lex.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, lex.strip_prefix('+').unwrap_or(lex)),
        };
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = rest.trim_start_matches('0');
        Some(BigInteger {
            negative: negative && !digits.is_empty(),
            digits: digits.to_string(),
        })
    }

    fn to_i128(&self) -> Option<i128> {
        if self.digits.is_empty() {
            return Some(0);
        }
        let magnitude: i128 = self.digits.parse().ok()?;
        Some(if self.negative { -magnitude } else { magnitude })
    }

    /// Orders this integer against a decimal through their decimal expansions.
    fn cmp_decimal(&self, other: &Decimal) -> Ordering {
        let text = other.to_string();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.as_str()),
        };
        let (int_part, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let int_part = int_part.trim_start_matches('0');
        let has_fraction = !fraction.trim_end_matches('0').is_empty();
        let negative = negative && (!int_part.is_empty() || has_fraction);
        cmp_signed(
            (self.negative, &self.digits, false),
            (negative, int_part, has_fraction),
        )
    }
}

/// Orders two numbers given as (negative, integer digits, has a fractional part).
fn cmp_signed(a: (bool, &str, bool), b: (bool, &str, bool)) -> Ordering {
    let magnitude = a
        .1
        .len()
        .cmp(&b.1.len())
        .then_with(|| a.1.cmp(b.1))
        .then_with(|| a.2.cmp(&b.2));
    match (a.0, b.0) {
        (false, false) => magnitude,
        (true, true) => magnitude.reverse(),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
    }
}

impl Ord for BigInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_signed(
            (self.negative, &self.digits, false),
            (other.negative, &other.digits, false),
        )
    }
}

impl PartialOrd for BigInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for BigInteger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.negative, self.digits.is_empty()) {
            (_, true) => f.write_str("0"),
            (true, false) => write!(f, "-{}", self.digits),
            (false, false) => f.write_str(&self.digits),
        }
    }
}

struct IntegerBounds {
    min: Option<i128>,
    max: Option<i128>,
}

impl IntegerBounds {
    fn admits(&self, value: &BigInteger) -> bool {
        match value.to_i128() {
            Some(v) => self.min.map_or(true, |m| v >= m) && self.max.map_or(true, |m| v <= m),
            // beyond i128 only the sign can be checked
            None if value.negative => self.min.is_none(),
            None => self.max.is_none(),
        }
    }
}

fn integer_bounds(dt: NamedNodeRef<'_>) -> Option<IntegerBounds> {
    let (min, max) = if dt == xsd::INTEGER {
        (None, None)
    } else if dt == xsd::LONG {
        (Some(i64::MIN as i128), Some(i64::MAX as i128))
    } else if dt == xsd::INT {
        (Some(i32::MIN as i128), Some(i32::MAX as i128))
    } else if dt == xsd::SHORT {
        (Some(i16::MIN as i128), Some(i16::MAX as i128))
    } else if dt == xsd::BYTE {
        (Some(i8::MIN as i128), Some(i8::MAX as i128))
    } else if dt == xsd::NON_NEGATIVE_INTEGER {
        (Some(0), None)
    } else if dt == xsd::UNSIGNED_LONG {
        (Some(0), Some(u64::MAX as i128))
    } else if dt == xsd::UNSIGNED_INT {
        (Some(0), Some(u32::MAX as i128))
    } else if dt == xsd::UNSIGNED_SHORT {
        (Some(0), Some(u16::MAX as i128))
    } else if dt == xsd::UNSIGNED_BYTE {
        (Some(0), Some(u8::MAX as i128))
    } else if dt == xsd::POSITIVE_INTEGER {
        (Some(1), None)
    } else if dt == xsd::NON_POSITIVE_INTEGER {
        (None, Some(0))
    } else if dt == xsd::NEGATIVE_INTEGER {
        (None, Some(-1))
    } else {
        return None;
    };
    Some(IntegerBounds { min, max })
}

/// The value of a literal typed `xsd:integer` or one of its derived types,
/// when it fits an `i64`.
pub fn integer_value(literal: &Literal) -> Option<i64> {
    let bounds = integer_bounds(literal.datatype())?;
    let parsed = BigInteger::parse(literal.value())?;
    if !bounds.admits(&parsed) {
        return None;
    }
    i64::try_from(parsed.to_i128()?).ok()
}

fn is_string_datatype(dt: NamedNodeRef<'_>) -> bool {
    dt == xsd::STRING || dt == RDF::new().lang_string
}

/// True for datatypes whose lexical space the engine can check.
pub fn is_known_datatype(dt: NamedNodeRef<'_>) -> bool {
    is_string_datatype(dt)
        || integer_bounds(dt).is_some()
        || [
            xsd::DECIMAL,
            xsd::DOUBLE,
            xsd::FLOAT,
            xsd::BOOLEAN,
            xsd::DATE,
            xsd::DATE_TIME,
            xsd::TIME,
        ]
        .iter()
        .any(|known| *known == dt)
}

/// True if the literal claims a datatype the engine understands but its
/// lexical form is not in that datatype's lexical space.
pub fn is_ill_typed(literal: &Literal) -> bool {
    is_known_datatype(literal.datatype()) && LiteralValue::from_literal(literal).is_none()
}

/// True for literals whose value space is strings (plain, `xsd:string`, language-tagged).
pub fn is_string_literal(literal: &Literal) -> bool {
    is_string_datatype(literal.datatype())
}

/// Compares two terms as literal values.
///
/// `None` means the pair is not comparable: a non-literal operand, a string
/// against a non-string, an uninterpreted or ill-typed literal, or two
/// different value spaces.
pub fn compare_terms(a: &Term, b: &Term) -> Option<Ordering> {
    let (Term::Literal(a), Term::Literal(b)) = (a, b) else {
        return None;
    };
    if is_string_literal(a) != is_string_literal(b) {
        return None;
    }
    let va = LiteralValue::from_literal(a)?;
    let vb = LiteralValue::from_literal(b)?;
    va.partial_cmp_value(&vb)
}

/// The text a string-based constraint operates on: the lexical form of a
/// literal or the IRI of a named node. Blank nodes have none.
pub fn string_form(term: &Term) -> Option<&str> {
    match term {
        Term::NamedNode(n) => Some(n.as_str()),
        Term::Literal(l) => Some(l.value()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(lex: &str, dt: NamedNodeRef<'_>) -> Term {
        Literal::new_typed_literal(lex, dt).into()
    }

    #[test]
    fn integers_and_decimals_compare_numerically() {
        let a = typed("10", xsd::INTEGER);
        let b = typed("9.5", xsd::DECIMAL);
        let c = typed("1.0e1", xsd::DOUBLE);
        assert_eq!(compare_terms(&a, &b), Some(Ordering::Greater));
        assert_eq!(compare_terms(&a, &c), Some(Ordering::Equal));
    }

    #[test]
    fn strings_do_not_compare_with_numbers() {
        let s: Term = Literal::new_simple_literal("10").into();
        let n = typed("10", xsd::INTEGER);
        assert_eq!(compare_terms(&s, &n), None);
        let t: Term = Literal::new_simple_literal("abc").into();
        assert_eq!(compare_terms(&s, &t), Some(Ordering::Less));
    }

    #[test]
    fn dates_compare_within_their_space() {
        let a = typed("2020-01-01", xsd::DATE);
        let b = typed("2021-06-30", xsd::DATE);
        let dt = typed("2021-06-30T00:00:00", xsd::DATE_TIME);
        assert_eq!(compare_terms(&a, &b), Some(Ordering::Less));
        assert_eq!(compare_terms(&a, &dt), None);
    }

    #[test]
    fn ill_typed_detection() {
        let bad_int = Literal::new_typed_literal("abc", xsd::INTEGER);
        let bad_byte = Literal::new_typed_literal("300", xsd::BYTE);
        let ok_bool = Literal::new_typed_literal("1", xsd::BOOLEAN);
        let unknown = Literal::new_typed_literal("whatever", xsd::ANY_URI);
        assert!(is_ill_typed(&bad_int));
        assert!(is_ill_typed(&bad_byte));
        assert!(!is_ill_typed(&ok_bool));
        assert!(!is_ill_typed(&unknown));
    }

    #[test]
    fn big_integers_keep_their_value() {
        let big = typed("99999999999999999999999", xsd::INTEGER);
        let bigger = typed("+100000000000000000000000", xsd::POSITIVE_INTEGER);
        let small = typed("-99999999999999999999999", xsd::INTEGER);
        assert_eq!(compare_terms(&big, &bigger), Some(Ordering::Less));
        assert_eq!(compare_terms(&small, &big), Some(Ordering::Less));
        assert_eq!(compare_terms(&big, &typed("12.5", xsd::DECIMAL)), Some(Ordering::Greater));
        assert_eq!(compare_terms(&small, &typed("-0.5", xsd::DECIMAL)), Some(Ordering::Less));
        assert_eq!(compare_terms(&big, &typed("1.0e30", xsd::DOUBLE)), Some(Ordering::Less));
        let padded = typed("0009223372036854775808", xsd::INTEGER);
        let plain = typed("9223372036854775808", xsd::INTEGER);
        assert_eq!(compare_terms(&padded, &plain), Some(Ordering::Equal));
    }

    #[test]
    fn integer_bounds_beyond_i64() {
        let max_unsigned = Literal::new_typed_literal("18446744073709551615", xsd::UNSIGNED_LONG);
        let over_unsigned = Literal::new_typed_literal("18446744073709551616", xsd::UNSIGNED_LONG);
        let over_long = Literal::new_typed_literal("9223372036854775808", xsd::LONG);
        let negative_positive =
            Literal::new_typed_literal("-99999999999999999999999", xsd::POSITIVE_INTEGER);
        let huge_non_negative = Literal::new_typed_literal(
            "123456789012345678901234567890123456789012345",
            xsd::NON_NEGATIVE_INTEGER,
        );
        assert!(!is_ill_typed(&max_unsigned));
        assert!(is_ill_typed(&over_unsigned));
        assert!(is_ill_typed(&over_long));
        assert!(is_ill_typed(&negative_positive));
        assert!(!is_ill_typed(&huge_non_negative));
        assert!(is_ill_typed(&Literal::new_typed_literal("1 2", xsd::INTEGER)));
        assert_eq!(integer_value(&max_unsigned), None);
        assert_eq!(integer_value(&Literal::new_typed_literal("+42", xsd::INT)), Some(42));
    }

    #[test]
    fn string_form_of_terms() {
        let iri: Term = oxigraph::model::NamedNode::new_unchecked("http://ex/a").into();
        let bnode: Term = oxigraph::model::BlankNode::default().into();
        assert_eq!(string_form(&iri), Some("http://ex/a"));
        assert_eq!(string_form(&bnode), None);
    }
}
