//! Where the backend bearer token comes from
//!
//! `PEAR_TOKEN` wins. Otherwise the token is read from `[api] token` in
//! `~/.config/pear/secrets.toml`, a file that must be private to its owner
//! on Unix.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable that overrides the secrets file
pub const TOKEN_ENV: &str = "PEAR_TOKEN";

const TEMPLATE: &str = "\
# Pear to Peer API token. Keep this file private (chmod 600).
# Paste the token returned by /api/login, or export PEAR_TOKEN instead.

[api]
token = \"\"
";

/// Origin of a resolved token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// The `PEAR_TOKEN` environment variable
    Env,
    /// A secrets file
    File(PathBuf),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Env => write!(f, "{}", TOKEN_ENV),
            TokenSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Non-blank bearer token together with where it was found
#[derive(Clone)]
pub struct ApiToken {
    value: String,
    source: TokenSource,
}

impl ApiToken {
    /// Resolve from `PEAR_TOKEN`, then the default secrets file
    ///
    /// `Ok(None)` means neither place holds a token.
    pub fn resolve() -> Result<Option<Self>> {
        let env = std::env::var(TOKEN_ENV).ok();
        Self::resolve_from(env, SecretsFile::default_location().as_ref())
    }

    /// Resolve from an explicit environment value and secrets file
    pub fn resolve_from(env: Option<String>, file: Option<&SecretsFile>) -> Result<Option<Self>> {
        if let Some(value) = env.as_deref().and_then(non_blank) {
            debug!(source = TOKEN_ENV, "Resolved API token");
            return Ok(Some(Self {
                value,
                source: TokenSource::Env,
            }));
        }

        let Some(file) = file else {
            return Ok(None);
        };

        Ok(file.read_token()?.map(|value| {
            debug!(source = %file.path().display(), "Resolved API token");
            Self {
                value,
                source: TokenSource::File(file.path().to_path_buf()),
            }
        }))
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> &TokenSource {
        &self.source
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// A `secrets.toml` on disk
#[derive(Debug, Clone)]
pub struct SecretsFile {
    path: PathBuf,
}

impl SecretsFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/pear/secrets.toml`, if a config dir exists
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::at(dir.join("pear").join("secrets.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Token stored in the file, trimmed
    ///
    /// A missing file or a blank token is `Ok(None)`. A file readable by
    /// group or others is refused before it is opened.
    pub fn read_token(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        ensure_private(&self.path)?;

        let table: toml::Table = std::fs::read_to_string(&self.path)?
            .parse()
            .map_err(|e| Error::Config(format!("{}: {}", self.path.display(), e)))?;

        match table.get("api").and_then(|api| api.get("token")) {
            None => Ok(None),
            Some(toml::Value::String(token)) => Ok(non_blank(token)),
            Some(other) => Err(Error::Config(format!(
                "{}: api.token must be a string, found {}",
                self.path.display(),
                other.type_str()
            ))),
        }
    }

    /// Write an empty template readable only by the owner
    ///
    /// Fails if the file already exists.
    pub fn write_template(&self) -> Result<()> {
        use std::io::Write;

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => {
                Error::Config(format!("{} already exists", self.path.display()))
            }
            _ => Error::Io(e),
        })?;
        file.write_all(TEMPLATE.as_bytes())?;

        warn!(path = %self.path.display(), "Wrote empty secrets template; add a token");
        Ok(())
    }
}

fn non_blank(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(unix)]
fn ensure_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "{} is accessible to other users (mode {:o}); run `chmod 600 {}`",
            path.display(),
            mode,
            path.display()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_private(_path: &Path) -> Result<()> {
    Ok(())
}
