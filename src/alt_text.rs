//! Alt text for images that arrive without one.
//!
//! Generation itself (an image-captioning service) lives outside the crate;
//! callers plug it in through [`AltTextGenerator`]. An async generator is
//! adapted by the caller, e.g. by blocking on it inside `generate`.

use log::warn;

use crate::options::Options;

/// Produces alt text for an image URL.
pub trait AltTextGenerator {
    /// Return a description of the image, or `None` when none is available.
    fn generate(&self, image_url: &str) -> Option<String>;
}

impl<F> AltTextGenerator for F
where
    F: Fn(&str) -> Option<String>,
{
    fn generate(&self, image_url: &str) -> Option<String> {
        self(image_url)
    }
}

/// Generator that never produces anything; every missing alt gets the placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAltText;

impl AltTextGenerator for NoAltText {
    fn generate(&self, _image_url: &str) -> Option<String> {
        None
    }
}

/// Settle the alt text of an image.
///
/// An existing non-blank alt wins. Otherwise the generator is asked once; a
/// blank or missing answer falls back to the configured placeholder.
#[must_use]
pub fn resolve_alt(
    alt: Option<&str>,
    src: &str,
    generator: &dyn AltTextGenerator,
    options: &Options,
) -> String {
    if let Some(alt) = alt.map(str::trim).filter(|a| !a.is_empty()) {
        return alt.to_string();
    }
    match generator.generate(src).map(|a| a.trim().to_string()) {
        Some(generated) if !generated.is_empty() => generated,
        _ => {
            warn!("no alt text for image {src}; using placeholder");
            options.image_alt_placeholder.clone()
        }
    }
}
