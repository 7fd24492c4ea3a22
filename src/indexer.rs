use std::sync::Arc;
use std::time::Instant;

use log::info;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::{Database, DistanceStore, Edge, HashStore};
use crate::dhash::d_hash;
use crate::error::{IndexError, Result};
use crate::message::IndexRequest;
use crate::metrics;
use crate::similarity::{ReindexReport, SimilarityIndexer};
use crate::source::{FsFetcher, NoResolver, SourceFetcher, SourceResolver};

/// 一次索引的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct IndexOutcome {
    pub picture_id: i64,
    /// 感知哈希
    pub hash: u64,
    #[schema(inline)]
    pub report: ReindexReport,
}

/// 对外暴露的索引入口：获取图片 → 计算指纹 → 保存 → 更新相似关系
pub struct Indexer<F = FsFetcher> {
    fetcher: F,
    resolver: Arc<dyn SourceResolver>,
    hashes: HashStore,
    distances: DistanceStore,
    similarity: SimilarityIndexer,
}

impl<F: SourceFetcher> Indexer<F> {
    pub fn new(db: Database, fetcher: F, threshold: u32) -> Self {
        let hashes = HashStore::new(db.clone());
        let distances = DistanceStore::new(db);
        let similarity = SimilarityIndexer::new(hashes.clone(), distances.clone(), threshold);
        Self { fetcher, resolver: Arc::new(NoResolver), hashes, distances, similarity }
    }

    /// 设置用于没有来源的请求的解析器
    pub fn with_resolver(mut self, resolver: impl SourceResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn hashes(&self) -> &HashStore {
        &self.hashes
    }

    pub fn distances(&self) -> &DistanceStore {
        &self.distances
    }

    pub fn threshold(&self) -> u32 {
        self.similarity.threshold()
    }

    /// 同步索引一张图片
    ///
    /// 获取或解码失败时不会写入任何数据
    pub async fn index(&self, picture_id: i64, source: &str) -> Result<IndexOutcome> {
        let start = Instant::now();
        let bytes = self.fetcher.fetch(source).await?;
        metrics::observe_stage("fetch", start.elapsed());

        let start = Instant::now();
        let hash = hash_blocking(bytes).await?;
        metrics::observe_stage("hash", start.elapsed());

        let start = Instant::now();
        self.hashes.put(picture_id, hash).await?;
        let report = self.similarity.reindex(picture_id, hash).await?;
        metrics::observe_stage("reindex", start.elapsed());

        info!(
            "已索引图片 {}: hash={:016x}, 相似图片 {} 张",
            picture_id, hash, report.matched
        );

        Ok(IndexOutcome { picture_id, hash, report })
    }

    /// 处理一个索引请求，请求中没有来源时通过解析器获取
    pub async fn index_request(&self, request: &IndexRequest) -> Result<IndexOutcome> {
        let source = match &request.source {
            Some(source) => source.clone(),
            None => self.resolver.resolve(request.picture_id).ok_or_else(|| IndexError::Source {
                location: format!("picture #{}", request.picture_id),
                reason: "no source location".to_owned(),
            })?,
        };
        self.index(request.picture_id, &source).await
    }

    /// 获取与某张图片近似重复的图片
    pub async fn edges_of(&self, picture_id: i64) -> Result<Vec<Edge>> {
        self.distances.edges_of(picture_id).await
    }
}

/// 解码和哈希是 CPU 密集型操作，放到阻塞线程池中执行
async fn hash_blocking(bytes: Vec<u8>) -> Result<u64> {
    tokio::task::spawn_blocking(move || d_hash(&bytes)).await.map_err(|e| {
        // 解码器 panic 也视为解码失败
        IndexError::Decode(image::ImageError::IoError(std::io::Error::other(e.to_string())))
    })?
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use tempfile::TempDir;

    use super::*;
    use crate::db::testing::temp_db;
    use crate::source::TemplateResolver;

    fn write(path: &Path, img: DynamicImage, format: ImageFormat) {
        let mut buf = Cursor::new(vec![]);
        img.write_to(&mut buf, format).unwrap();
        std::fs::write(path, buf.into_inner()).unwrap();
    }

    fn write_image(path: &Path, format: ImageFormat) {
        let img = ImageBuffer::from_fn(80, 60, |x, y| {
            Rgb([(x * 3) as u8, (y * 4) as u8, ((x * y) % 256) as u8])
        });
        write(path, DynamicImage::ImageRgb8(img), format);
    }

    async fn setup() -> (TempDir, TempDir, Indexer) {
        let (db_dir, db) = temp_db().await;
        let images = TempDir::new().unwrap();
        let indexer = Indexer::new(db, FsFetcher::new(Some(images.path().to_path_buf())), 3);
        (db_dir, images, indexer)
    }

    #[tokio::test]
    async fn same_pixels_are_linked() {
        let (_db, images, indexer) = setup().await;
        write_image(&images.path().join("1.png"), ImageFormat::Png);
        write_image(&images.path().join("2.bmp"), ImageFormat::Bmp);

        let first = indexer.index(1, "1.png").await.unwrap();
        let second = indexer.index(2, "2.bmp").await.unwrap();

        assert_eq!(first.hash, second.hash);
        assert_eq!(indexer.edges_of(1).await.unwrap(), vec![Edge { other_id: 2, distance: 0 }]);
        assert_eq!(indexer.edges_of(2).await.unwrap(), vec![Edge { other_id: 1, distance: 0 }]);
    }

    #[tokio::test]
    async fn non_image_writes_nothing() {
        let (_db, images, indexer) = setup().await;
        std::fs::write(images.path().join("1.txt"), b"this is not an image").unwrap();

        let result = indexer.index(1, "1.txt").await;

        assert!(matches!(result, Err(IndexError::Decode(_))));
        assert_eq!(indexer.hashes().get(1).await.unwrap(), None);
        assert_eq!(indexer.distances().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_file_is_empty_source() {
        let (_db, images, indexer) = setup().await;
        std::fs::write(images.path().join("1.png"), b"").unwrap();
        assert!(matches!(indexer.index(1, "1.png").await, Err(IndexError::EmptySource)));
    }

    #[tokio::test]
    async fn missing_file_is_source_error() {
        let (_db, _images, indexer) = setup().await;
        assert!(matches!(indexer.index(1, "404.png").await, Err(IndexError::Source { .. })));
    }

    #[tokio::test]
    async fn reindex_overwrites_fingerprint() {
        let (_db, images, indexer) = setup().await;
        write_image(&images.path().join("a.png"), ImageFormat::Png);
        // 从左到右变暗，哈希全为 0
        let dark = ImageBuffer::from_fn(80, 60, |x, _| Rgb([255 - (x * 3) as u8; 3]));
        write(&images.path().join("b.png"), DynamicImage::ImageRgb8(dark), ImageFormat::Png);

        let a = indexer.index(1, "a.png").await.unwrap();
        let b = indexer.index(1, "b.png").await.unwrap();

        assert_ne!(a.hash, b.hash);
        assert_eq!(indexer.hashes().get(1).await.unwrap(), Some(b.hash));
        assert_eq!(indexer.hashes().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn request_uses_resolver_when_source_missing() {
        let (_db, images, indexer) = setup().await;
        let indexer = indexer.with_resolver(TemplateResolver::new("{id}.png"));
        write_image(&images.path().join("5.png"), ImageFormat::Png);

        let outcome = indexer.index_request(&IndexRequest::new(5, None)).await.unwrap();
        assert_eq!(outcome.picture_id, 5);

        let (_db, _images, plain) = setup().await;
        let err = plain.index_request(&IndexRequest::new(5, None)).await.unwrap_err();
        assert!(matches!(err, IndexError::Source { .. }));
    }
}
