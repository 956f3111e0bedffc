//! Bucket adapter storing every object as a plain file below a base directory.
//!
//! Object keys map one-to-one onto relative paths. Uploads go to a temp file
//! in the target directory first and are renamed into place, so readers never
//! observe a partially written object. `list` returns keys in lexical order.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{
	fs::{File, create_dir_all, read_dir, remove_file, rename},
	io::{AsyncReadExt, AsyncWriteExt},
};

use rules_objstore_types::{bucket_adapter::BucketAdapter, prelude::*};

const TMP_PREFIX: &str = ".tmp-";

/// Checks that a key is a relative path without `.`/`..`/empty segments
fn check_key(key: &str) -> ClResult<()> {
	if key.is_empty() || key.starts_with('/') || key.contains('\\') {
		Err(Error::Backend(format!("invalid object key: {:?}", key)))?;
	}
	for segment in key.split('/') {
		if segment.is_empty() || segment == "." || segment == ".." {
			Err(Error::Backend(format!("invalid object key: {:?}", key)))?;
		}
	}
	Ok(())
}

fn obj_file_path(base_dir: &Path, key: &str) -> ClResult<PathBuf> {
	check_key(key)?;
	Ok(key.split('/').fold(PathBuf::from(base_dir), |path, segment| path.join(segment)))
}

fn obj_tmp_file_path(dir: &Path) -> PathBuf {
	dir.join(format!("{}{}", TMP_PREFIX, uuid::Uuid::new_v4().simple()))
}

#[derive(Debug)]
pub struct BucketAdapterFs {
	base_dir: Box<Path>,
}

impl BucketAdapterFs {
	pub async fn new(base_dir: Box<Path>) -> ClResult<Self> {
		create_dir_all(&base_dir).await.map_err(Error::Io)?;
		Ok(Self { base_dir })
	}

	pub fn base_dir(&self) -> &Path {
		&self.base_dir
	}

	async fn write_tmp(tmp_path: &Path, data: &[u8]) -> ClResult<()> {
		let mut file = File::create(tmp_path).await.map_err(Error::Io)?;
		file.write_all(data).await.map_err(Error::Io)?;
		file.sync_all().await.map_err(Error::Io)?;
		Ok(())
	}
}

#[async_trait]
impl BucketAdapter for BucketAdapterFs {
	async fn get(&self, key: &str) -> ClResult<Box<[u8]>> {
		let path = obj_file_path(&self.base_dir, key)?;
		// directories are prefixes, not objects
		if tokio::fs::metadata(&path).await?.is_dir() {
			return Err(Error::NotFound);
		}
		let mut file = File::open(&path).await?;
		let mut buf: Vec<u8> = Vec::new();
		file.read_to_end(&mut buf).await.map_err(Error::Io)?;

		Ok(buf.into_boxed_slice())
	}

	async fn upload(&self, key: &str, data: &[u8]) -> ClResult<()> {
		let path = obj_file_path(&self.base_dir, key)?;
		let dir = path.parent().ok_or_else(|| Error::Backend(format!("invalid object key: {:?}", key)))?;
		create_dir_all(dir).await.map_err(Error::Io)?;

		let tmp_path = obj_tmp_file_path(dir);
		debug!(key = %key, tmp = ?tmp_path, "uploading object");

		let res = async {
			Self::write_tmp(&tmp_path, data).await?;
			rename(&tmp_path, &path).await.map_err(Error::Io)?;
			Ok::<(), Error>(())
		}
		.await;
		if let Err(err) = res {
			warn!(key = %key, error = %err, "upload failed, removing tmpfile");
			let _ = remove_file(&tmp_path).await;
			return Err(err);
		}

		Ok(())
	}

	async fn list(&self, prefix: &str) -> ClResult<Vec<Box<str>>> {
		// the prefix selects a directory; keys below it are collected recursively
		let prefix = prefix.trim_end_matches('/');
		let start = if prefix.is_empty() {
			PathBuf::from(&*self.base_dir)
		} else {
			obj_file_path(&self.base_dir, prefix)?
		};

		let mut keys = Vec::new();
		let mut pending = vec![(start, prefix.to_string())];
		while let Some((dir, dir_key)) = pending.pop() {
			let mut entries = match read_dir(&dir).await {
				Ok(entries) => entries,
				Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
				Err(err) => return Err(Error::Io(err)),
			};
			while let Some(entry) = entries.next_entry().await.map_err(Error::Io)? {
				let Ok(name) = entry.file_name().into_string() else {
					warn!(dir = ?dir, "skipping object with non UTF-8 name");
					continue;
				};
				let key =
					if dir_key.is_empty() { name.clone() } else { format!("{}/{}", dir_key, name) };
				if entry.file_type().await.map_err(Error::Io)?.is_dir() {
					// only files are ever temporary, a directory may be a prefix named `.tmp-*`
					pending.push((entry.path(), key));
				} else if !name.starts_with(TMP_PREFIX) {
					keys.push(key.into_boxed_str());
				}
			}
		}
		keys.sort();

		Ok(keys)
	}
}


// vim: ts=4
