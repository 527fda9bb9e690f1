use crate::types::Album;

use super::error::FetchError;
use super::responses::RawPhoto;
use super::{PhotosQuery, SourceService};

/// `photos.get` refuses to return more than this many items per call.
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Pulls a bounded number of photos from one album.
///
/// The album total reported by the first page is the only count ever used;
/// further pages are requested only when that page came back short.
pub struct MetadataFetcher<'a> {
    source: &'a dyn SourceService,
    page_size: u64,
}

impl<'a> MetadataFetcher<'a> {
    pub fn new(source: &'a dyn SourceService, page_size: u64) -> Self {
        Self {
            source,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Return the first `requested` photos of the album in server order.
    pub async fn fetch(
        &self,
        owner_id: i64,
        album: Album,
        requested: u64,
    ) -> Result<Vec<RawPhoto>, FetchError> {
        let first = self
            .source
            .photos(&PhotosQuery {
                owner_id,
                album,
                offset: 0,
                count: requested.clamp(1, self.page_size),
            })
            .await?;

        let available = first.count;
        if available == 0 {
            return Err(FetchError::NoPhotosAvailable {
                owner_id,
                album: album.to_string(),
            });
        }
        if requested > available {
            return Err(FetchError::RequestExceedsAvailable {
                owner_id,
                requested,
                available,
            });
        }

        let mut received = first.items.len() as u64;
        let mut photos = first.items;

        while (photos.len() as u64) < requested {
            let remaining = requested - photos.len() as u64;
            let page = self
                .source
                .photos(&PhotosQuery {
                    owner_id,
                    album,
                    offset: received,
                    count: remaining.min(self.page_size),
                })
                .await?;
            if page.items.is_empty() {
                break;
            }
            tracing::debug!(offset = received, items = page.items.len(), "fetched next page");
            received += page.items.len() as u64;
            photos.extend(page.items);
        }

        if (photos.len() as u64) < requested {
            // The album shrank between the count and the listing.
            return Err(FetchError::RequestExceedsAvailable {
                owner_id,
                requested,
                available: photos.len() as u64,
            });
        }

        photos.truncate(requested as usize);
        tracing::info!(
            owner_id,
            album = %album,
            available,
            fetched = photos.len(),
            "Fetched photo metadata"
        );
        Ok(photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vk::error::VkError;
    use crate::vk::responses::{Likes, PhotosPage, SizeVariant};
    use std::sync::Mutex;

    /// Serves a fixed album in pages and records every query it receives.
    struct FakeAlbum {
        total: u64,
        items: Vec<RawPhoto>,
        queries: Mutex<Vec<PhotosQuery>>,
    }

    impl FakeAlbum {
        fn with_photos(n: usize) -> Self {
            let items = (0..n)
                .map(|i| RawPhoto {
                    id: Some(i as i64),
                    date: Some(1_700_000_000 + i as i64),
                    likes: Some(Likes { count: i as u64 }),
                    sizes: vec![SizeVariant {
                        kind: "m".into(),
                        url: format!("https://cdn/{i}.jpg"),
                    }],
                })
                .collect();
            Self {
                total: n as u64,
                items,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<PhotosQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl SourceService for FakeAlbum {
        async fn photos(&self, query: &PhotosQuery) -> Result<PhotosPage, VkError> {
            self.queries.lock().unwrap().push(*query);
            let start = (query.offset as usize).min(self.items.len());
            let end = (start + query.count as usize).min(self.items.len());
            Ok(PhotosPage {
                count: self.total,
                items: self.items[start..end].to_vec(),
            })
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl SourceService for FailingSource {
        async fn photos(&self, _query: &PhotosQuery) -> Result<PhotosPage, VkError> {
            Err(VkError::Api {
                code: 15,
                message: "Access denied".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_first_requested_in_order() {
        let album = FakeAlbum::with_photos(10);
        let photos = MetadataFetcher::new(&album, 1000)
            .fetch(1, Album::Wall, 4)
            .await
            .unwrap();
        let ids: Vec<_> = photos.iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(album.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_requested_equal_to_available() {
        let album = FakeAlbum::with_photos(3);
        let photos = MetadataFetcher::new(&album, 1000)
            .fetch(1, Album::Profile, 3)
            .await
            .unwrap();
        assert_eq!(photos.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_more_than_available_fails() {
        let album = FakeAlbum::with_photos(3);
        let err = MetadataFetcher::new(&album, 1000)
            .fetch(1, Album::Wall, 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::RequestExceedsAvailable {
                requested: 4,
                available: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_zero_requested_returns_empty() {
        let album = FakeAlbum::with_photos(3);
        let photos = MetadataFetcher::new(&album, 1000)
            .fetch(1, Album::Wall, 0)
            .await
            .unwrap();
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_empty_album_fails() {
        let album = FakeAlbum::with_photos(0);
        let err = MetadataFetcher::new(&album, 1000)
            .fetch(1, Album::Wall, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NoPhotosAvailable { owner_id: 1, .. }));
    }

    #[tokio::test]
    async fn test_fetch_api_error_is_source_error() {
        let err = MetadataFetcher::new(&FailingSource, 1000)
            .fetch(1, Album::Wall, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::SourceApi(VkError::Api { code: 15, .. })));
        assert!(err.to_string().contains("Access denied"));
    }

    #[tokio::test]
    async fn test_fetch_pages_until_enough() {
        let album = FakeAlbum::with_photos(25);
        let photos = MetadataFetcher::new(&album, 10)
            .fetch(1, Album::Wall, 23)
            .await
            .unwrap();
        assert_eq!(photos.len(), 23);
        assert_eq!(photos[22].id, Some(22));
        let offsets: Vec<_> = album.calls().iter().map(|q| (q.offset, q.count)).collect();
        assert_eq!(offsets, vec![(0, 10), (10, 10), (20, 3)]);
    }

    #[tokio::test]
    async fn test_fetch_short_listing_reports_what_exists() {
        // Reported total says 5 but only 2 items are actually listed.
        let mut album = FakeAlbum::with_photos(2);
        album.total = 5;
        let err = MetadataFetcher::new(&album, 1000)
            .fetch(1, Album::Wall, 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::RequestExceedsAvailable { available: 2, .. }
        ));
    }

    #[test]
    fn test_page_size_is_clamped() {
        let album = FakeAlbum::with_photos(0);
        assert_eq!(MetadataFetcher::new(&album, 0).page_size, 1);
        assert_eq!(MetadataFetcher::new(&album, 5000).page_size, MAX_PAGE_SIZE);
    }
}
