//! Link configuration.
//!
//! [`LinkConfig`] is assembled through [`LinkConfigBuilder`], which checks
//! every value once in [`build`](LinkConfigBuilder::build).

use std::{num::NonZeroUsize, time::Duration};

use crate::error::ConfigError;

const DEFAULT_READ_CHUNK: NonZeroUsize = NonZeroUsize::new(256).expect("256 is non-zero");

/// Validated settings for a [`Link`](crate::Link).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use serialframe::LinkConfig;
///
/// let config = LinkConfig::builder()
///     .read_chunk_size(64)
///     .desync_threshold(Some(8))
///     .receive_timeout(Some(Duration::from_secs(2)))
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.read_chunk_size(), 64);
/// assert_eq!(config.desync_threshold().map(|n| n.get()), Some(8));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    read_chunk_size: NonZeroUsize,
    desync_threshold: Option<NonZeroUsize>,
    receive_timeout: Option<Duration>,
}

impl LinkConfig {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> LinkConfigBuilder { LinkConfigBuilder::default() }

    /// Maximum number of bytes requested from the transport per read.
    #[must_use]
    pub fn read_chunk_size(&self) -> usize { self.read_chunk_size.get() }

    /// Consecutive checksum failures that end the link, if detection is on.
    #[must_use]
    pub fn desync_threshold(&self) -> Option<NonZeroUsize> { self.desync_threshold }

    /// Timeout applied by [`Link::receive`](crate::Link::receive).
    #[must_use]
    pub fn receive_timeout(&self) -> Option<Duration> { self.receive_timeout }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK,
            desync_threshold: None,
            receive_timeout: None,
        }
    }
}

/// Builder for [`LinkConfig`].
#[derive(Clone, Copy, Debug)]
pub struct LinkConfigBuilder {
    read_chunk_size: usize,
    desync_threshold: Option<usize>,
    receive_timeout: Option<Duration>,
}

impl Default for LinkConfigBuilder {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK.get(),
            desync_threshold: None,
            receive_timeout: None,
        }
    }
}

impl LinkConfigBuilder {
    /// Set the size of each transport read.
    #[must_use]
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// End the link after `threshold` consecutive checksum failures.
    ///
    /// `None` (the default) leaves misalignment undetected.
    #[must_use]
    pub fn desync_threshold(mut self, threshold: Option<usize>) -> Self {
        self.desync_threshold = threshold;
        self
    }

    /// Bound how long [`Link::receive`](crate::Link::receive) waits.
    #[must_use]
    pub fn receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero chunk size, threshold or timeout.
    pub fn build(self) -> Result<LinkConfig, ConfigError> {
        let read_chunk_size =
            NonZeroUsize::new(self.read_chunk_size).ok_or(ConfigError::ZeroReadChunk)?;
        let desync_threshold = self
            .desync_threshold
            .map(|n| NonZeroUsize::new(n).ok_or(ConfigError::ZeroDesyncThreshold))
            .transpose()?;
        if self.receive_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroReceiveTimeout);
        }
        Ok(LinkConfig {
            read_chunk_size,
            desync_threshold,
            receive_timeout: self.receive_timeout,
        })
    }
}
