//! Timeline archive logic.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::api::{TimelineSource, TwitterApi};
use crate::config::Config;
use crate::download::media::download_to_file;
use crate::download::state::ArchiveStats;
use crate::error::{Error, Result};
use crate::fs::naming::{disambiguate_filename, media_filename, sanitize_filename, timestamp_prefix};
use crate::media::{MediaDownload, MediaExtractor, MediaType, Post};
use crate::output::create_item_bar;

/// One file to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub path: PathBuf,
    pub url: String,
    pub media_type: MediaType,
}

type TaskOutcome = Result<(MediaType, u64)>;

/// Archive every media item of the timeline into `target_dir`.
///
/// Posts are enumerated and extracted in order, and a download task is
/// spawned for each media item as soon as it is known. At most
/// `max_concurrent_downloads` transfers run at once. The first failure
/// (fetch, extraction or download) ends the run and aborts the transfers
/// still in flight. Files that already finished stay on disk.
pub async fn archive_timeline(
    api: &TwitterApi,
    config: &Config,
    source: &mut dyn TimelineSource,
    extractor: &dyn MediaExtractor,
    target_dir: &Path,
) -> Result<ArchiveStats> {
    let progress = if config.options.show_progress {
        create_item_bar(0, "Fetching timeline")
    } else {
        ProgressBar::hidden()
    };

    let result = run_archive(api, config, source, extractor, target_dir, &progress).await;

    progress.finish_and_clear();
    result
}

async fn run_archive(
    api: &TwitterApi,
    config: &Config,
    source: &mut dyn TimelineSource,
    extractor: &dyn MediaExtractor,
    target_dir: &Path,
    progress: &ProgressBar,
) -> Result<ArchiveStats> {
    let semaphore = Arc::new(Semaphore::new(config.options.max_concurrent_downloads.max(1)));
    let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();
    let mut planned: HashSet<PathBuf> = HashSet::new();
    let mut stats = ArchiveStats::default();

    tracing::info!(
        "Archiving timeline of {} with {} extraction...",
        config.target_user_id,
        extractor.name()
    );

    while let Some(posts) = source.next_page().await? {
        tracing::debug!("Received page with {} posts", posts.len());

        for post in &posts {
            stats.posts_seen += 1;

            let extraction = extractor.extract(post)?;
            if extraction.is_empty() {
                continue;
            }
            stats.posts_with_media += 1;

            for skipped in &extraction.skipped {
                tracing::warn!(
                    "No direct URL for {}, skipping. Post text: {}",
                    skipped.label,
                    skipped.text
                );
                stats.increment_skipped();
            }

            let prefix = timestamp_prefix(&post.created_at);
            for media in extraction.downloads {
                let (task, renamed) = plan_task(&prefix, post, media, target_dir, &mut planned)?;
                if renamed {
                    stats.increment_renamed();
                }

                progress.inc_length(1);
                spawn_download(
                    &mut tasks,
                    api.clone(),
                    Arc::clone(&semaphore),
                    progress.clone(),
                    task,
                );
            }
        }
    }

    progress.set_message("Downloading");
    tracing::info!("Waiting for {} downloads to finish...", tasks.len());

    while let Some(joined) = tasks.join_next().await {
        let (media_type, bytes) = joined.map_err(|e| Error::TaskFailed(e.to_string()))??;
        stats.record_download(media_type, bytes);
    }

    Ok(stats)
}

/// Decide where a media item is written.
///
/// Returns the task and whether the name had to be disambiguated because an
/// earlier post in this run already claimed it.
fn plan_task(
    prefix: &str,
    post: &Post,
    media: MediaDownload,
    target_dir: &Path,
    planned: &mut HashSet<PathBuf>,
) -> Result<(DownloadTask, bool)> {
    let filename = media_filename(prefix, media.index, &media.extension)?;
    let mut path = target_dir.join(&filename);
    let mut renamed = false;

    if planned.contains(&path) {
        let unique = sanitize_filename(&disambiguate_filename(&filename, &post.id))?;
        tracing::warn!(
            "{} already used by another post, saving post {} as {}",
            filename,
            post.id,
            unique
        );
        path = target_dir.join(unique);
        renamed = true;
    }

    planned.insert(path.clone());

    Ok((
        DownloadTask {
            path,
            url: media.url,
            media_type: media.media_type,
        },
        renamed,
    ))
}

fn spawn_download(
    tasks: &mut JoinSet<TaskOutcome>,
    api: TwitterApi,
    semaphore: Arc<Semaphore>,
    progress: ProgressBar,
    task: DownloadTask,
) {
    tasks.spawn(async move {
        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| Error::TaskFailed(e.to_string()))?;

        let bytes = download_to_file(&api, &task.url, &task.path).await?;
        progress.inc(1);
        tracing::info!("Downloaded: {}", task.path.display());

        Ok((task.media_type, bytes))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::media::{
        ExpandedExtractor, LegacyExtractor, MediaItem, MediaKind, VideoVariant,
    };
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    struct StaticTimeline {
        pages: VecDeque<Vec<Post>>,
    }

    impl StaticTimeline {
        fn single(posts: Vec<Post>) -> Self {
            Self {
                pages: VecDeque::from([posts]),
            }
        }
    }

    #[async_trait]
    impl TimelineSource for StaticTimeline {
        async fn next_page(&mut self) -> Result<Option<Vec<Post>>> {
            Ok(self.pages.pop_front())
        }
    }

    fn make_test_config(max_concurrent: usize) -> Config {
        let mut config = Config::default();
        config.target_user_id = "783214".to_string();
        config.options.show_progress = false;
        config.options.max_concurrent_downloads = max_concurrent;
        config
    }

    fn make_post(id: &str, second: u32, media: Vec<MediaItem>) -> Post {
        Post {
            id: id.to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 6, 1, 10, 15, second).unwrap(),
            text: format!("post {}", id),
            media,
        }
    }

    fn image(url: Option<String>) -> MediaItem {
        MediaItem {
            key: "3_1".to_string(),
            url,
            kind: MediaKind::Image,
        }
    }

    fn video(variants: Vec<(String, u64)>) -> MediaItem {
        MediaItem {
            key: "7_1".to_string(),
            url: None,
            kind: MediaKind::Video {
                variants: variants
                    .into_iter()
                    .map(|(url, bitrate)| VideoVariant {
                        url,
                        bitrate: Some(bitrate),
                    })
                    .collect(),
            },
        }
    }

    async fn serve(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn api() -> TwitterApi {
        TwitterApi::new(Credentials::default()).unwrap()
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    async fn serve_delayed(server: &MockServer, count: usize, delay: Duration) -> Vec<Post> {
        let mut posts = Vec::new();
        for i in 0..count {
            let route = format!("/media/{}.jpg", i);
            Mock::given(method("GET"))
                .and(path(route.as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_string("x").set_delay(delay))
                .mount(server)
                .await;

            posts.push(make_post(
                &i.to_string(),
                i as u32,
                vec![image(Some(format!("{}{}", server.uri(), route)))],
            ));
        }
        posts
    }

    #[tokio::test]
    async fn test_end_to_end_legacy() {
        let server = MockServer::start().await;
        serve(&server, "/media/B.jpg", "image-bytes").await;
        serve(&server, "/video/500.mp4", "video-500").await;
        serve(&server, "/video/900.mp4", "video-900").await;

        let uri = server.uri();
        let post_a = make_post("2", 40, vec![]);
        let post_b = make_post(
            "1",
            30,
            vec![
                image(Some(format!("{}/media/B.jpg", uri))),
                video(vec![
                    (format!("{}/video/500.mp4", uri), 500),
                    (format!("{}/video/900.mp4", uri), 900),
                ]),
            ],
        );

        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline::single(vec![post_a, post_b]);

        let stats = archive_timeline(
            &api(),
            &make_test_config(4),
            &mut source,
            &LegacyExtractor,
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(
            file_names(tmp.path()),
            vec!["2023-06-01_10-15-30_0.jpg", "2023-06-01_10-15-30_1.mp4"]
        );
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("2023-06-01_10-15-30_1.mp4")).unwrap(),
            "video-900"
        );

        assert_eq!(stats.posts_seen, 2);
        assert_eq!(stats.posts_with_media, 1);
        assert_eq!(stats.pic_count, 1);
        assert_eq!(stats.vid_count, 1);
    }

    #[tokio::test]
    async fn test_posts_without_media_spawn_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline::single(vec![
            make_post("1", 1, vec![]),
            make_post("2", 2, vec![]),
        ]);

        let stats = archive_timeline(
            &api(),
            &make_test_config(4),
            &mut source,
            &LegacyExtractor,
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(stats.total_downloaded(), 0);
        assert!(file_names(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_video_without_variants_aborts_run() {
        let server = MockServer::start().await;
        serve(&server, "/media/A.jpg", "image-bytes").await;

        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline::single(vec![
            make_post("2", 50, vec![image(Some(format!("{}/media/A.jpg", server.uri())))]),
            make_post("1", 30, vec![video(vec![])]),
        ]);

        let result = archive_timeline(
            &api(),
            &make_test_config(4),
            &mut source,
            &LegacyExtractor,
            tmp.path(),
        )
        .await;

        match result {
            Err(Error::UnresolvableVideoSource { post_id }) => assert_eq!(post_id, "1"),
            other => panic!("expected UnresolvableVideoSource, got {:?}", other),
        }
        assert!(!tmp.path().join("2023-06-01_10-15-30_0.mp4").exists());
    }

    #[tokio::test]
    async fn test_expanded_skips_and_continues() {
        let server = MockServer::start().await;
        serve(&server, "/media/A.jpg", "a").await;
        serve(&server, "/media/C.png", "c").await;

        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline::single(vec![
            make_post(
                "2",
                30,
                vec![
                    image(Some(format!("{}/media/A.jpg", server.uri()))),
                    video(vec![]),
                ],
            ),
            make_post("1", 10, vec![image(Some(format!("{}/media/C.png", server.uri())))]),
        ]);

        let stats = archive_timeline(
            &api(),
            &make_test_config(1),
            &mut source,
            &ExpandedExtractor,
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(stats.skipped_count, 1);
        assert_eq!(stats.pic_count, 2);
        assert_eq!(
            file_names(tmp.path()),
            vec!["2023-06-01_10-15-10_0.png", "2023-06-01_10-15-30_0.jpg"]
        );
    }

    #[tokio::test]
    async fn test_colliding_timestamps_are_disambiguated() {
        let server = MockServer::start().await;
        serve(&server, "/media/first.jpg", "first").await;
        serve(&server, "/media/second.jpg", "second").await;

        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline::single(vec![
            make_post("200", 30, vec![image(Some(format!("{}/media/first.jpg", server.uri())))]),
            make_post("100", 30, vec![image(Some(format!("{}/media/second.jpg", server.uri())))]),
        ]);

        let stats = archive_timeline(
            &api(),
            &make_test_config(4),
            &mut source,
            &LegacyExtractor,
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(stats.renamed_count, 1);
        assert_eq!(
            file_names(tmp.path()),
            vec!["2023-06-01_10-15-30_0.jpg", "2023-06-01_10-15-30_0_100.jpg"]
        );
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("2023-06-01_10-15-30_0_100.jpg")).unwrap(),
            "second"
        );
    }

    #[tokio::test]
    async fn test_download_failure_fails_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline::single(vec![make_post(
            "1",
            30,
            vec![image(Some(format!("{}/media/A.jpg", server.uri())))],
        )]);

        let result = archive_timeline(
            &api(),
            &make_test_config(4),
            &mut source,
            &LegacyExtractor,
            tmp.path(),
        )
        .await;

        assert!(matches!(result, Err(Error::Download(_))));
        assert!(file_names(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_walks_every_page() {
        let server = MockServer::start().await;
        serve(&server, "/media/A.jpg", "a").await;
        serve(&server, "/media/B.jpg", "b").await;

        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline {
            pages: VecDeque::from([
                vec![make_post("2", 20, vec![image(Some(format!("{}/media/A.jpg", server.uri())))])],
                vec![make_post("1", 10, vec![image(Some(format!("{}/media/B.jpg", server.uri())))])],
            ]),
        };

        let stats = archive_timeline(
            &api(),
            &make_test_config(2),
            &mut source,
            &LegacyExtractor,
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(stats.posts_seen, 2);
        assert_eq!(file_names(tmp.path()).len(), 2);
    }

    #[tokio::test]
    async fn test_single_permit_serializes_downloads() {
        let server = MockServer::start().await;
        let delay = Duration::from_millis(200);
        let posts = serve_delayed(&server, 4, delay).await;

        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline::single(posts);

        let started = Instant::now();
        let stats = archive_timeline(
            &api(),
            &make_test_config(1),
            &mut source,
            &LegacyExtractor,
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(stats.pic_count, 4);
        assert!(
            started.elapsed() >= delay * 4,
            "4 downloads with one permit finished in {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_permits_allow_parallel_downloads() {
        let server = MockServer::start().await;
        let delay = Duration::from_millis(300);
        let posts = serve_delayed(&server, 4, delay).await;

        let tmp = tempfile::tempdir().unwrap();
        let mut source = StaticTimeline::single(posts);

        let started = Instant::now();
        let stats = archive_timeline(
            &api(),
            &make_test_config(4),
            &mut source,
            &LegacyExtractor,
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(stats.pic_count, 4);
        assert!(
            started.elapsed() < delay * 4,
            "4 downloads with four permits took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_skipped_media_is_logged_with_post_text() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_target(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let tmp = tempfile::tempdir().unwrap();
        let mut post = make_post("1", 30, vec![video(vec![])]);
        post.text = "rooftop timelapse".to_string();
        let mut source = StaticTimeline::single(vec![post]);

        let stats = archive_timeline(
            &api(),
            &make_test_config(1),
            &mut source,
            &ExpandedExtractor,
            tmp.path(),
        )
        .await
        .unwrap();

        assert_eq!(stats.skipped_count, 1);
        assert!(file_names(tmp.path()).is_empty());

        let output = logs.contents();
        assert!(output.contains("WARN"), "no warning in: {}", output);
        assert!(output.contains("2023-06-01_10-15-30_0"), "no label in: {}", output);
        assert!(output.contains("rooftop timelapse"), "no post text in: {}", output);
    }
}
