//! Raw cell values as delivered by the driver
//!
//! Introspection results are weakly typed: the same column can arrive as a
//! string on one account and as a number or a byte buffer on another.
//! [`WireValue`] closes that set, and each target type has exactly one
//! coercion.

use crate::error::DecodeError;

/// One cell of an introspection result
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl WireValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text coercion: null is the empty string, bytes are read as UTF-8
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            Self::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Integer coercion: null is zero, floats truncate, text is parsed
    pub fn to_int(&self) -> Result<i64, DecodeError> {
        match self {
            Self::Null => Ok(0),
            Self::Int(i) => Ok(*i),
            Self::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            Self::Float(f) => Err(DecodeError::NonFinite(*f)),
            Self::Text(_) | Self::Bytes(_) | Self::Bool(_) => {
                let text = self.to_text();
                text.trim()
                    .parse::<i64>()
                    .map_err(|_| DecodeError::NotAnInteger(text))
            }
        }
    }

    /// Boolean coercion: only the exact literal `true` is true
    pub fn to_flag(&self) -> bool {
        self.to_text() == "true"
    }

    /// Whether the textual form contains `marker` (for option blobs)
    pub fn contains_marker(&self, marker: &str) -> bool {
        self.to_text().contains(marker)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for WireValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<i64> for WireValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for WireValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<WireValue>> From<Option<T>> for WireValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_coercions() {
        assert_eq!(WireValue::Null.to_text(), "");
        assert_eq!(WireValue::Null.to_int(), Ok(0));
        assert!(!WireValue::Null.to_flag());
    }

    #[test]
    fn bytes_behave_like_text() {
        let bytes = WireValue::from(b"7".to_vec());
        assert_eq!(bytes.to_text(), "7");
        assert_eq!(bytes.to_int(), Ok(7));
        assert!(WireValue::from(b"true".to_vec()).to_flag());
    }

    #[test]
    fn flag_is_case_sensitive_literal() {
        assert!(WireValue::from("true").to_flag());
        assert!(WireValue::from(true).to_flag());
        assert!(!WireValue::from("TRUE").to_flag());
        assert!(!WireValue::from("false").to_flag());
        assert!(!WireValue::from("").to_flag());
        assert!(!WireValue::from("Y").to_flag());
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(WireValue::Int(7).to_int(), Ok(7));
        assert_eq!(WireValue::Float(7.9).to_int(), Ok(7));
        assert_eq!(WireValue::Float(-1.5).to_int(), Ok(-1));
        assert_eq!(WireValue::from(" 90 ").to_int(), Ok(90));
        assert_eq!(
            WireValue::from("seven").to_int(),
            Err(DecodeError::NotAnInteger("seven".to_string()))
        );
        assert!(WireValue::from("").to_int().is_err());
        assert!(matches!(WireValue::Float(f64::NAN).to_int(), Err(DecodeError::NonFinite(_))));
    }

    #[test]
    fn marker_search() {
        let options = WireValue::from("TRANSIENT, MANAGED ACCESS");
        assert!(options.contains_marker("MANAGED ACCESS"));
        assert!(options.contains_marker("TRANSIENT"));
        assert!(!WireValue::Null.contains_marker("MANAGED ACCESS"));
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(WireValue::from(None::<&str>), WireValue::Null);
        assert_eq!(WireValue::from(Some("x")), WireValue::Text("x".to_string()));
    }
}
