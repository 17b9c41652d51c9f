use clap::{
    builder::{NonEmptyStringValueParser, PathBufValueParser, StyledStr, TypedValueParser},
    error::{ContextKind, ContextValue, ErrorKind},
    Arg, Command, Error,
};
use std::{ffi::OsStr, fs, path::PathBuf};

/// The longest tag a registry accepts
const MAX_TAG_LENGTH: usize = 128;

/// Parse as a non-empty string
pub fn string() -> NonEmptyStringValueParser {
    NonEmptyStringValueParser::default()
}

/// Parse an image tag
pub fn tag() -> TagValueParser {
    TagValueParser::default()
}

/// Parse a readable directory containing a Dockerfile
pub fn directory() -> DirectoryValueParser {
    DirectoryValueParser::default()
}

#[derive(Clone, Debug, Default)]
pub struct TagValueParser {
    inner: NonEmptyStringValueParser,
}

impl TypedValueParser for TagValueParser {
    type Value = String;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, Error> {
        let raw = self.inner.parse_ref(cmd, arg, value)?;

        if raw.len() > MAX_TAG_LENGTH {
            return Err(validation_error(
                cmd,
                arg,
                raw,
                format!("tags may be at most {MAX_TAG_LENGTH} characters"),
            ));
        }

        let mut chars = raw.chars();
        let first = chars.next().unwrap_or_default();
        if !(first.is_ascii_alphanumeric() || first == '_') {
            return Err(validation_error(
                cmd,
                arg,
                raw,
                "tags must start with a letter, digit or underscore",
            ));
        }

        let invalid = chars.find(|&c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')));
        if let Some(c) = invalid {
            return Err(validation_error(
                cmd,
                arg,
                raw,
                format!("invalid character {c:?}, only letters, digits, '_', '.' and '-' are allowed"),
            ));
        }

        Ok(raw)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DirectoryValueParser {
    inner: PathBufValueParser,
}

impl TypedValueParser for DirectoryValueParser {
    type Value = PathBuf;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, Error> {
        let path = self.inner.parse_ref(cmd, arg, value)?;
        let raw = path.display().to_string();

        if !path.is_dir() {
            return Err(validation_error(cmd, arg, raw, "not a directory"));
        }
        if let Err(error) = fs::read_dir(&path) {
            return Err(validation_error(
                cmd,
                arg,
                raw,
                format!("directory is not readable: {error}"),
            ));
        }
        if !path.join("Dockerfile").is_file() {
            return Err(validation_error(
                cmd,
                arg,
                raw,
                "directory does not contain a Dockerfile",
            ));
        }

        Ok(path)
    }
}

fn validation_error(
    cmd: &Command,
    arg: Option<&Arg>,
    value: String,
    message: impl std::fmt::Display,
) -> Error {
    let arg = arg
        .map(|a| a.to_string())
        .unwrap_or_else(|| "...".to_owned());

    let mut error = Error::new(ErrorKind::ValueValidation).with_cmd(cmd);
    error.insert(ContextKind::InvalidArg, ContextValue::String(arg));
    error.insert(ContextKind::InvalidValue, ContextValue::String(value));

    let message = StyledStr::from(format!("  reason: {message}"));
    error.insert(ContextKind::Usage, ContextValue::StyledStr(message));

    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn command() -> Command {
        Command::new("test")
    }

    fn parse_tag(raw: &str) -> Result<String, Error> {
        tag().parse_ref(&command(), None, OsStr::new(raw))
    }

    fn parse_directory(path: &std::path::Path) -> Result<PathBuf, Error> {
        directory().parse_ref(&command(), None, path.as_os_str())
    }

    #[test]
    fn accepts_common_tags() {
        for raw in ["latest", "4.3.0", "4.3.0-1", "_internal", "v1.2.3-rc.1"] {
            assert_eq!(parse_tag(raw).unwrap(), raw);
        }
    }

    #[test]
    fn rejects_malformed_tags() {
        for raw in ["", "-1", ".hidden", "a/b", "a:b", "with space"] {
            assert!(parse_tag(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn rejects_overlong_tags() {
        let raw = "a".repeat(MAX_TAG_LENGTH + 1);
        assert!(parse_tag(&raw).is_err());
        assert!(parse_tag(&raw[..MAX_TAG_LENGTH]).is_ok());
    }

    #[test]
    fn accepts_directory_with_dockerfile() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Dockerfile")).unwrap();

        assert_eq!(parse_directory(dir.path()).unwrap(), dir.path());
    }

    #[test]
    fn rejects_directory_without_dockerfile() {
        let dir = tempfile::tempdir().unwrap();
        let error = parse_directory(dir.path()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_directory(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn rejects_file_instead_of_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Dockerfile");
        File::create(&file).unwrap();

        assert!(parse_directory(&file).is_err());
    }
}
