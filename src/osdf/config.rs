//! # Credential Store
//!
//! Server address and account details live in a single INI-style file, `~/.osdf` by default:
//!
//! ```ini
//! [osdf]
//! server = osdf.example.org
//! port = 8123
//! username = alice
//! password = secret
//! ssl = False
//! ```
//!
//! Values are plain text. Double-quoted values are unquoted, so hand-written files in either
//! style load. `port` defaults to 8123 and `ssl` to false.
//!
//! The file holds a password, so it must be readable only by its owner (mode `0400`).
//! [`Credentials::load`] refuses any other mode before reading a byte of it.

use crate::error::{OsdfError, Result};
use directories::BaseDirs;
use ini::{EscapePolicy, Ini, ParseOption, Properties};
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_PORT: u16 = 8123;
pub const CONFIG_ENV: &str = "OSDF_CONFIG";
const CONFIG_FILENAME: &str = ".osdf";
const SECTION: &str = "osdf";
const OWNER_READ_ONLY: u32 = 0o400;
const OWNER_READ_WRITE: u32 = 0o600;

/// Connection details for one OSDF server.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub ssl: bool,
}

/// Accepts `True`, `yes`, `on`, `1` and their negatives; the file is often hand-edited.
fn parse_flag(text: &str) -> Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(OsdfError::ConfigInvalid(format!(
            "invalid ssl flag '{}'",
            other
        ))),
    }
}

fn parse_port(text: &str) -> Result<u16> {
    text.trim()
        .parse()
        .map_err(|_| OsdfError::ConfigInvalid(format!("invalid port '{}'", text)))
}

fn required(section: &Properties, key: &str) -> Result<String> {
    section
        .get(key)
        .map(str::to_string)
        .ok_or_else(|| OsdfError::ConfigInvalid(format!("missing '{}' in [{}]", key, SECTION)))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .field("ssl", &self.ssl)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        server: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        ssl: bool,
    ) -> Self {
        Self {
            server: server.into(),
            port,
            username: username.into(),
            password: password.into(),
            ssl,
        }
    }

    /// `host:port`, as shown by `osdf info`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}/", scheme, self.server, self.port)
    }

    /// Parses the `[osdf]` section of a credential file.
    pub fn parse(content: &str) -> Result<Self> {
        // Backslashes are kept verbatim: passwords are not escaped on disk.
        let option = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, option)
            .map_err(|e| OsdfError::ConfigInvalid(e.to_string()))?;
        let section = ini
            .section(Some(SECTION))
            .ok_or_else(|| OsdfError::ConfigInvalid(format!("missing [{}] section", SECTION)))?;

        Ok(Self {
            server: required(section, "server")?,
            port: section.get("port").map(parse_port).transpose()?.unwrap_or(DEFAULT_PORT),
            username: required(section, "username")?,
            password: required(section, "password")?,
            ssl: section.get("ssl").map(parse_flag).transpose()?.unwrap_or(false),
        })
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION))
            .set("server", self.server.as_str())
            .set("port", self.port.to_string())
            .set("username", self.username.as_str())
            .set("password", self.password.as_str())
            .set("ssl", if self.ssl { "True" } else { "False" });
        ini
    }

    /// Reads credentials from `path`, enforcing owner-read-only permissions.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OsdfError::ConfigMissing(path.to_path_buf()))
            }
            Err(e) => return Err(OsdfError::Io(e)),
        };
        check_permissions(path, &metadata)?;

        let credentials = Self::parse(&fs::read_to_string(path)?)?;
        debug!(path = %path.display(), server = %credentials.server, "loaded credentials");
        Ok(credentials)
    }

    /// Writes credentials to `path` and locks the file down to owner-read-only.
    ///
    /// An existing file is first opened up to owner read/write so it can be replaced; the
    /// contents never sit in a file readable by anyone else.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut content = Vec::new();
        self.to_ini()
            .write_to_policy(&mut content, EscapePolicy::Nothing)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        if path.exists() {
            set_mode(path, OWNER_READ_WRITE)?;
        }

        let mut file = open_private(path)?;
        file.write_all(&content)?;
        file.sync_all()?;
        drop(file);

        set_mode(path, OWNER_READ_ONLY)?;
        debug!(path = %path.display(), "saved credentials");
        Ok(())
    }
}

/// Resolves the credential file location: explicit flag, then `$OSDF_CONFIG`, then `~/.osdf`.
pub fn locate(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    default_path()
}

pub fn default_path() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
        .ok_or_else(|| OsdfError::ConfigInvalid("could not determine home directory".to_string()))
}

#[cfg(unix)]
fn check_permissions(path: &Path, metadata: &fs::Metadata) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode() & 0o777;
    if mode != OWNER_READ_ONLY {
        return Err(OsdfError::ConfigInsecure {
            path: path.to_path_buf(),
            mode,
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path, _metadata: &fs::Metadata) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(unix)]
fn open_private(path: &Path) -> Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(OWNER_READ_WRITE)
        .open(path)?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Result<fs::File> {
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    Ok(file)
}
