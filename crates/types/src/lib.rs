//! Validated text types shared by the filedrop crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when validating an uploaded file name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FileNameError {
    #[error("file name cannot be empty")]
    Empty,
    #[error("file name '{0}' is reserved")]
    Reserved(String),
    #[error("file name must not contain path separators")]
    ContainsSeparator,
    #[error("file name must not contain NUL bytes")]
    ContainsNul,
    #[error("file name exceeds {max} bytes")]
    TooLong { max: usize },
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A single path segment that is safe to use as the last component of a logical path.
///
/// Unlike [`NonEmptyText`], the name is not trimmed: `" report.pdf"` and `"report.pdf"` are
/// different files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    /// Longest name most filesystems accept for a single component.
    pub const MAX_LEN: usize = 255;

    /// Validates `input` as a bare file name.
    ///
    /// Rejects empty names, `.` and `..`, names containing `/` or `\`, and names containing
    /// NUL bytes.
    pub fn new(input: impl AsRef<str>) -> Result<Self, FileNameError> {
        let name = input.as_ref();

        if name.is_empty() {
            return Err(FileNameError::Empty);
        }
        if name == "." || name == ".." {
            return Err(FileNameError::Reserved(name.to_owned()));
        }
        if name.contains(['/', '\\']) {
            return Err(FileNameError::ContainsSeparator);
        }
        if name.contains('\0') {
            return Err(FileNameError::ContainsNul);
        }
        if name.len() > Self::MAX_LEN {
            return Err(FileNameError::TooLong { max: Self::MAX_LEN });
        }

        Ok(Self(name.to_owned()))
    }

    /// Builds a `FileName` from a client-supplied name that may carry directory components.
    ///
    /// Some clients send the full local path (`C:\Users\me\cat.png`); only the final segment
    /// is kept.
    pub fn from_client_name(input: impl AsRef<str>) -> Result<Self, FileNameError> {
        let raw = input.as_ref();
        let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
        Self::new(last)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  image/png ").unwrap();
        assert_eq!(text.as_str(), "image/png");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn file_name_accepts_unicode() {
        let name = FileName::new("貓咪 照片.png").unwrap();
        assert_eq!(name.as_str(), "貓咪 照片.png");
    }

    #[test]
    fn file_name_rejects_traversal_and_separators() {
        assert_eq!(FileName::new(""), Err(FileNameError::Empty));
        assert_eq!(
            FileName::new(".."),
            Err(FileNameError::Reserved("..".into()))
        );
        assert_eq!(
            FileName::new("../etc/passwd"),
            Err(FileNameError::ContainsSeparator)
        );
        assert_eq!(
            FileName::new("a\\b.png"),
            Err(FileNameError::ContainsSeparator)
        );
        assert_eq!(FileName::new("a\0b"), Err(FileNameError::ContainsNul));
    }

    #[test]
    fn file_name_rejects_overlong_names() {
        let long = "a".repeat(FileName::MAX_LEN + 1);
        assert_eq!(
            FileName::new(long),
            Err(FileNameError::TooLong {
                max: FileName::MAX_LEN
            })
        );
    }

    #[test]
    fn client_name_keeps_last_segment() {
        assert_eq!(
            FileName::from_client_name("C:\\Users\\me\\cat.png")
                .unwrap()
                .as_str(),
            "cat.png"
        );
        assert_eq!(
            FileName::from_client_name("../../cat.png").unwrap().as_str(),
            "cat.png"
        );
        assert_eq!(
            FileName::from_client_name("photos/"),
            Err(FileNameError::Empty)
        );
        assert_eq!(
            FileName::from_client_name("photos/.."),
            Err(FileNameError::Reserved("..".into()))
        );
    }
}
