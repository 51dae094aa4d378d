use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Where the exported wallet is kept, relative to the working directory.
pub const DEFAULT_WALLET_FILE: &str = "wallet_data.txt";

/// Errors reading or writing the wallet data file.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// There is no wallet data file to import from.
    #[error("No wallet data file found. Please create a wallet first.")]
    Missing(PathBuf),
    /// A new wallet would overwrite an existing file.
    #[error("wallet data file `{}` already exists", .0.display())]
    AlreadyExists(PathBuf),
    /// Any other I/O failure.
    #[error("failed to access wallet data file `{}`: {source}", path.display())]
    Io {
        /// The wallet data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl BootstrapError {
    /// Returns the status the process exits with after printing this error
    /// as a plain message, or `None` if it is reported as a failure.
    pub fn exit_status(&self) -> Option<u8> {
        match self {
            Self::Missing(_) => Some(1),
            _ => None,
        }
    }

    fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::Missing(path.to_owned()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_owned()),
            _ => Self::Io {
                path: path.to_owned(),
                source,
            },
        }
    }
}

/// Where the wallet of this run comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletSource {
    /// Import this exported blob.
    Import(String),
    /// Create a new wallet and save it to the wallet file.
    Create,
}

/// Checks the wallet file. This runs before any other setup.
///
/// With `new_wallet` the file must not exist yet; otherwise it must exist and
/// its contents are imported.
pub async fn wallet_source(
    path: &Path,
    new_wallet: bool,
) -> Result<WalletSource, BootstrapError> {
    if !new_wallet {
        return load_wallet_data(path).await.map(WalletSource::Import);
    }
    match fs::try_exists(path).await {
        Ok(false) => Ok(WalletSource::Create),
        Ok(true) => Err(BootstrapError::AlreadyExists(path.to_owned())),
        Err(err) => Err(BootstrapError::from_io(path, err)),
    }
}

/// Reads the exported wallet blob, trimmed of surrounding whitespace.
pub async fn load_wallet_data(path: &Path) -> Result<String, BootstrapError> {
    let data = fs::read_to_string(path)
        .await
        .map_err(|err| BootstrapError::from_io(path, err))?;
    debug!("loaded wallet data from {}", path.display());
    Ok(data.trim().to_owned())
}

/// Writes a newly exported wallet blob. Never overwrites an existing file.
pub async fn save_wallet_data(
    path: &Path,
    data: &str,
) -> Result<(), BootstrapError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|err| BootstrapError::from_io(path, err))?;
    file.write_all(data.as_bytes())
        .await
        .map_err(|err| BootstrapError::from_io(path, err))?;
    file.flush()
        .await
        .map_err(|err| BootstrapError::from_io(path, err))?;
    info!("saved wallet data to {}", path.display());
    Ok(())
}
