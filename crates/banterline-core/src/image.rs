//! Image fetch port.

use banterline_types::turn::ImageAttachment;

/// Fetches and decodes an image by URL before context assembly.
///
/// Failure is not an error surface: any problem (network, status,
/// unsupported payload) simply yields `None` and the event proceeds
/// without an image.
pub trait ImageFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Option<ImageAttachment>> + Send;
}

/// A fetcher that never returns an image.
///
/// Used in tests and in deployments that keep image handling off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullImageFetcher;

impl ImageFetcher for NullImageFetcher {
    async fn fetch(&self, _url: &str) -> Option<ImageAttachment> {
        None
    }
}
