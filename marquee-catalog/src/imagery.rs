//! Poster URL resolution against the image CDN.

use marquee_core::config::CatalogConfig;

/// Image CDN settings.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    base_url: String,
    placeholder_url: String,
}

impl ImageConfig {
    /// Settings for a CDN prefix; a trailing slash on `base_url` is dropped.
    ///
    /// ```
    /// use marquee_catalog::ImageConfig;
    ///
    /// let images = ImageConfig::new("https://image.tmdb.org/t/p/w500/", "no-poster.png");
    /// assert_eq!(
    ///     images.poster_url(Some("/dune.jpg")),
    ///     "https://image.tmdb.org/t/p/w500/dune.jpg"
    /// );
    /// assert_eq!(images.poster_url(None), "no-poster.png");
    /// ```
    pub fn new(base_url: impl Into<String>, placeholder_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            placeholder_url: placeholder_url.into(),
        }
    }

    /// Settings taken from the catalog section of the configuration.
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(&config.image_base_url, &config.placeholder_poster_url)
    }

    /// Full poster URL, or the placeholder when the movie has no poster.
    pub fn poster_url(&self, poster_path: Option<&str>) -> String {
        match poster_path.filter(|path| !path.is_empty()) {
            Some(path) if path.starts_with('/') => format!("{}{path}", self.base_url),
            Some(path) => format!("{}/{path}", self.base_url),
            None => self.placeholder_url.clone(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self::from_config(&CatalogConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_url_joins_paths() {
        let images = ImageConfig::new("https://image.tmdb.org/t/p/w500/", "/no-movie.png");

        assert_eq!(
            images.poster_url(Some("/qJ2tW6WMUDux911r6m7haRef0WH.jpg")),
            "https://image.tmdb.org/t/p/w500/qJ2tW6WMUDux911r6m7haRef0WH.jpg"
        );
        assert_eq!(
            images.poster_url(Some("abc.jpg")),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn test_missing_poster_uses_placeholder() {
        let images = ImageConfig::default();

        assert!(images.poster_url(None).starts_with("https://placehold.co/"));
        assert_eq!(images.poster_url(Some("")), images.poster_url(None));
    }
}
