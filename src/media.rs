use std::{
	io::Cursor,
	path::{Path, PathBuf},
};

use axum::body::Bytes;
use image::{ImageFormat, ImageReader};
use sha2::{Digest, Sha256};

/// URL prefix the media directory is served under.
pub const URL_PREFIX: &str = "/media";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to store upload: {0}")]
	Io(#[from] std::io::Error),
}

/// An uploaded file that has been recognized as an image.
#[derive(Debug, Clone)]
pub struct Image {
	bytes: Bytes,
	format: ImageFormat,
}

impl Image {
	/// Sniffs the format from the file contents, ignoring the client's file name.
	///
	/// The header has to decode as well, so a truncated file with the right
	/// magic bytes is still rejected.
	pub fn from_bytes(bytes: Bytes) -> Option<Self> {
		let reader = ImageReader::new(Cursor::new(&bytes[..]))
			.with_guessed_format()
			.ok()?;
		let format = reader.format()?;

		reader.into_dimensions().ok()?;

		Some(Self { bytes, format })
	}

	fn extension(&self) -> &'static str {
		self.format.extensions_str().first().copied().unwrap_or("bin")
	}
}

/// Local filesystem storage for post images.
///
/// Files are named by the SHA-256 of their contents, so uploading the same
/// image twice stores it once.
#[derive(Debug, Clone)]
pub struct MediaStore {
	root: PathBuf,
}

impl MediaStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Writes the image under `posts/` and returns its path relative to the media root.
	pub async fn save(&self, image: &Image) -> Result<String, Error> {
		let hash = Sha256::digest(&image.bytes);
		let name = format!("posts/{hash:x}.{}", image.extension());
		let target = self.root.join(&name);

		if let Some(parent) = target.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}

		if !tokio::fs::try_exists(&target).await? {
			tokio::fs::write(&target, &image.bytes).await?;

			tracing::info!(path = %target.display(), "stored image");
		}

		Ok(name)
	}
}

/// The public URL of a stored file.
pub fn url(name: &str) -> String {
	format!("{URL_PREFIX}/{name}")
}

#[cfg(test)]
pub(crate) const SMALL_GIF: &[u8] = &[
	0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
	0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
	0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_recognizes_images_only() {
		assert!(Image::from_bytes(Bytes::from_static(SMALL_GIF)).is_some());
		assert!(Image::from_bytes(Bytes::from_static(b"definitely not an image")).is_none());
	}

	#[test]
	fn test_rejects_truncated_image() {
		assert!(image::guess_format(&SMALL_GIF[..8]).is_ok());
		assert!(Image::from_bytes(Bytes::from_static(&SMALL_GIF[..8])).is_none());
	}

	#[tokio::test]
	async fn test_save_is_content_addressed() {
		let root = std::env::temp_dir().join(format!("yatube-media-{}", uuid::Uuid::new_v4()));
		let store = MediaStore::new(&root);
		let image = Image::from_bytes(Bytes::from_static(SMALL_GIF)).unwrap();

		let first = store.save(&image).await.unwrap();
		let second = store.save(&image).await.unwrap();

		assert_eq!(first, second);
		assert!(first.starts_with("posts/") && first.ends_with(".gif"));
		assert_eq!(tokio::fs::read(root.join(&first)).await.unwrap(), SMALL_GIF);
		assert_eq!(url(&first), format!("/media/{first}"));

		let _ = std::fs::remove_dir_all(root);
	}
}
