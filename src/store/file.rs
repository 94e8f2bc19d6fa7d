//! JSON file-backed [`CredentialStore`] used by the command-line binary.

// std
use std::{
	env,
	fs::{self, File},
	io::{ErrorKind, Write},
};
// self
use crate::{
	_prelude::*,
	auth::CachedCredential,
	error::ConfigError,
	store::{CredentialStore, StoreError, StoreFuture},
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Persists the cached credential to a single JSON document.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}
impl FileStore {
	/// File name used when no explicit cache path is configured.
	pub const DEFAULT_FILE_NAME: &'static str = "pbi_token_cache.json";

	/// Creates a store at the provided path. Nothing is touched until the first load or save.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Resolves the default cache path beside the running executable.
	pub fn default_path() -> Result<PathBuf, ConfigError> {
		let exe = env::current_exe().map_err(|source| ConfigError::CacheLocation { source })?;
		let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();

		Ok(dir.join(Self::DEFAULT_FILE_NAME))
	}

	/// Returns the backing file path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_now(path: &Path) -> Result<Option<CachedCredential>, StoreError> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "Token cache file does not exist.");

				return Ok(None);
			},
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", path.display()),
				}),
		};

		Ok(Self::parse(path, &bytes))
	}

	fn parse(path: &Path, bytes: &[u8]) -> Option<CachedCredential> {
		let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return None;
		}

		let mut de = serde_json::Deserializer::from_slice(bytes);

		match serde_path_to_error::deserialize::<_, CachedCredential>(&mut de) {
			Ok(record) => Some(record),
			Err(e) => {
				tracing::debug!(
					path = %path.display(),
					field = %e.path(),
					error = %e.inner(),
					"Ignoring malformed token cache file."
				);

				None
			},
		}
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_now(path: &Path, record: &CachedCredential) -> Result<(), StoreError> {
		Self::ensure_parent_exists(path)?;

		let serialized =
			serde_json::to_vec_pretty(record).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize cached credential: {e}"),
			})?;
		let mut tmp_path = path.to_path_buf();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<CachedCredential>> {
		Box::pin(async move { Self::read_now(&self.path) })
	}

	fn save(&self, record: CachedCredential) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			Self::persist_now(&self.path, &record)?;

			tracing::debug!(path = %self.path.display(), "Token cache file updated.");

			Ok(())
		})
	}
}
