// Copyright 2025 the Flat Draw Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image sources and scale types.

/// Errors produced when building an [`ImageSource`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ImageSourceError {
    /// The URI was empty or only whitespace.
    #[error("image source URI is empty")]
    EmptyUri,
    /// A decode size hint had a zero dimension.
    #[error("decode size hint {width}x{height} has a zero dimension")]
    ZeroSizeHint {
        /// Requested decode width.
        width: u32,
        /// Requested decode height.
        height: u32,
    },
}

/// Descriptor of an image to fetch: a URI plus decode hints.
///
/// Sources are plain values. Resolving one into pixels is the job of a
/// [`BitmapFetcher`](crate::BitmapFetcher).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageSource {
    uri: String,
    size_hint: Option<(u32, u32)>,
}

impl ImageSource {
    /// Create a source for `uri`.
    pub fn new(uri: impl Into<String>) -> Result<Self, ImageSourceError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(ImageSourceError::EmptyUri);
        }
        Ok(Self {
            uri,
            size_hint: None,
        })
    }

    /// Ask the fetcher to decode at roughly `width` x `height` pixels.
    pub fn with_size_hint(mut self, width: u32, height: u32) -> Result<Self, ImageSourceError> {
        if width == 0 || height == 0 {
            return Err(ImageSourceError::ZeroSizeHint { width, height });
        }
        self.size_hint = Some((width, height));
        Ok(self)
    }

    /// The URI of the image.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Requested decode size, if any.
    pub fn size_hint(&self) -> Option<(u32, u32)> {
        self.size_hint
    }

    /// Returns `true` if the image must be fetched over the network.
    pub fn is_remote(&self) -> bool {
        let scheme = self
            .uri
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase());
        matches!(scheme.as_deref(), Some("http" | "https"))
    }
}

/// Policy for fitting an image into a container of a different aspect ratio.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleType {
    /// Scale each axis independently so the image exactly covers the container.
    FillStretch,
    /// Scale uniformly so the whole image is visible, centred.
    ///
    /// Images that already fit are drawn at their natural size.
    FitInside,
    /// Scale uniformly so the image covers the container, centred.
    ///
    /// Overflow is clipped to the container.
    #[default]
    FitCover,
}
