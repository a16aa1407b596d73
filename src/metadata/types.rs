//! Column data types.
//!
//! Parsed from the SQL type a column is declared with, mainly so that string
//! columns can report their maximum length.

use std::fmt;

/// SQL-level data type of a mapped column.
///
/// # Examples
///
/// ```ignore
/// use relfold::metadata::DataType;
///
/// assert_eq!(DataType::parse("varchar(255)"), Some(DataType::Varchar(255)));
/// assert_eq!(DataType::parse("varchar(255)").unwrap().max_length(), Some(255));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// BIT / BOOLEAN.
    Bool,
    /// TINYINT.
    Int8,
    /// SMALLINT.
    Int16,
    /// INT / MEDIUMINT.
    Int32,
    /// BIGINT.
    Int64,
    Float32,
    Float64,
    /// Fixed-precision decimal (precision, scale).
    Decimal(u8, u8),
    /// Unbounded text (TEXT, LONGTEXT, ...).
    Text,
    Char(u32),
    Varchar(u32),
    Date,
    Time,
    Timestamp,
    Binary,
    Json,
    /// ENUM('a', 'b', ...) with its allowed values.
    Enum(Vec<String>),
}

impl DataType {
    /// Parse a SQL data type from a string.
    ///
    /// Accepts MySQL spellings (`tinyint(1)`, `int(11) unsigned`,
    /// `enum('a','b')`, `longtext`) as well as the common ANSI names.
    pub fn parse(s: &str) -> Option<Self> {
        let raw = s.trim();

        // Enum values keep their case
        if let Some(prefix) = raw.get(..4) {
            if prefix.eq_ignore_ascii_case("enum") {
                let inner = extract_parens(&raw[4..], "")?;
                return Some(DataType::Enum(parse_enum_values(&inner)));
            }
        }

        let s = raw.to_lowercase();
        let s = s.strip_suffix(" unsigned").unwrap_or(&s).trim();

        if let Some(inner) = extract_parens(s, "decimal").or_else(|| extract_parens(s, "numeric")) {
            return parse_decimal_params(&inner);
        }

        if let Some(inner) = extract_parens(s, "varchar")
            .or_else(|| extract_parens(s, "character varying"))
            .or_else(|| extract_parens(s, "nvarchar"))
        {
            return parse_length_param(&inner).map(DataType::Varchar);
        }

        if let Some(inner) = extract_parens(s, "char").or_else(|| extract_parens(s, "nchar")) {
            return parse_length_param(&inner).map(DataType::Char);
        }

        // Display widths such as int(11) carry no meaning for the value
        let base = match s.find('(') {
            Some(idx) if s.ends_with(')') => s[..idx].trim(),
            _ => s,
        };

        match base {
            "bool" | "boolean" | "bit" => Some(DataType::Bool),
            "tinyint" => Some(DataType::Int8),
            "smallint" | "int2" => Some(DataType::Int16),
            "int" | "integer" | "mediumint" | "int4" => Some(DataType::Int32),
            "bigint" | "int8" => Some(DataType::Int64),
            "real" | "float" | "float4" => Some(DataType::Float32),
            "double" | "float8" | "double precision" => Some(DataType::Float64),
            "decimal" | "numeric" => Some(DataType::Decimal(10, 0)),
            "text" | "tinytext" | "mediumtext" | "longtext" | "varchar" => Some(DataType::Text),
            "date" => Some(DataType::Date),
            "time" => Some(DataType::Time),
            "timestamp" | "datetime" => Some(DataType::Timestamp),
            "binary" | "varbinary" | "blob" | "mediumblob" | "longblob" => Some(DataType::Binary),
            "json" => Some(DataType::Json),
            _ => None,
        }
    }

    /// Maximum length in characters, for bounded string types.
    pub fn max_length(&self) -> Option<u32> {
        match self {
            DataType::Char(n) | DataType::Varchar(n) => Some(*n),
            DataType::Enum(values) => values.iter().map(|v| v.chars().count() as u32).max(),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::Float32
                | DataType::Float64
                | DataType::Decimal(_, _)
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            DataType::Text | DataType::Char(_) | DataType::Varchar(_) | DataType::Enum(_)
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "BIT"),
            DataType::Int8 => write!(f, "TINYINT"),
            DataType::Int16 => write!(f, "SMALLINT"),
            DataType::Int32 => write!(f, "INT"),
            DataType::Int64 => write!(f, "BIGINT"),
            DataType::Float32 => write!(f, "FLOAT"),
            DataType::Float64 => write!(f, "DOUBLE"),
            DataType::Decimal(p, s) => write!(f, "DECIMAL({}, {})", p, s),
            DataType::Text => write!(f, "TEXT"),
            DataType::Char(n) => write!(f, "CHAR({})", n),
            DataType::Varchar(n) => write!(f, "VARCHAR({})", n),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Binary => write!(f, "BLOB"),
            DataType::Json => write!(f, "JSON"),
            DataType::Enum(values) => {
                let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
                write!(f, "ENUM({})", quoted.join(", "))
            }
        }
    }
}

/// Extract content inside parentheses for a given type prefix.
/// e.g., extract_parens("decimal(10,2)", "decimal") returns Some("10,2")
fn extract_parens(s: &str, prefix: &str) -> Option<String> {
    let rest = s.strip_prefix(prefix)?.trim();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.to_string())
}

fn parse_decimal_params(inner: &str) -> Option<DataType> {
    let parts: Vec<&str> = inner.split(',').map(|s| s.trim()).collect();
    match parts.as_slice() {
        [precision] => Some(DataType::Decimal(precision.parse().ok()?, 0)),
        [precision, scale] => Some(DataType::Decimal(precision.parse().ok()?, scale.parse().ok()?)),
        _ => None,
    }
}

fn parse_length_param(inner: &str) -> Option<u32> {
    inner.trim().parse().ok()
}

fn parse_enum_values(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(|v| v.trim().trim_matches('\'').to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
