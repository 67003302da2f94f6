//! Local stand-in for grafbase's unpublished `serde-dynamic-string` crate
//! (git dependency unreachable in this build environment). Implements the
//! subset used by this workspace: `{{ env.VAR }}` expansion via `FromStr`.

use std::{env, fmt, str::FromStr};

/// A string that expands `{{ env.VAR }}` placeholders when parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicString<T>(T);

impl<T> DynamicString<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[derive(Debug)]
pub enum Error {
    UnclosedPlaceholder,
    UnsupportedSource(String),
    MissingEnvironmentVariable(String),
    Parse(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnclosedPlaceholder => {
                write!(f, "unclosed placeholder, expected `}}}}`")
            }
            Error::UnsupportedSource(expression) => {
                write!(f, "unsupported placeholder source `{expression}`, expected `env.VAR`")
            }
            Error::MissingEnvironmentVariable(name) => {
                write!(f, "environment variable `{name}` is not defined")
            }
            Error::Parse(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for Error {}

impl<T> FromStr for DynamicString<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut output = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                return Err(Error::UnclosedPlaceholder);
            };

            let expression = after[..end].trim();
            match expression.strip_prefix("env.") {
                Some(name) => {
                    let value = env::var(name.trim())
                        .map_err(|_| Error::MissingEnvironmentVariable(name.trim().to_string()))?;
                    output.push_str(&value);
                }
                None => return Err(Error::UnsupportedSource(expression.to_string())),
            }

            rest = &after[end + 2..];
        }

        output.push_str(rest);

        T::from_str(&output)
            .map(DynamicString)
            .map_err(|err| Error::Parse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::DynamicString;

    #[test]
    fn plain_string_passes_through() {
        let parsed = DynamicString::<String>::from_str("sk-test").unwrap();
        assert_eq!(parsed.into_inner(), "sk-test");
    }

    #[test]
    fn missing_environment_variable_errors() {
        let result =
            DynamicString::<String>::from_str("{{ env.SDS_TEST_VAR_THAT_DOES_NOT_EXIST }}");
        assert!(result.is_err());
    }
}
