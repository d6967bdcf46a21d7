// tests/dedup_queue.rs

use std::sync::Arc;

use proptest::prelude::*;
use syncwatch::config::RepoConfig;
use syncwatch::engine::{DedupQueue, QueueItem};
use syncwatch::types::{EventKind, FsEvent};
use syncwatch_test_utils::builders::RepoConfigBuilder;

fn repos() -> Vec<Arc<RepoConfig>> {
    vec![
        RepoConfigBuilder::new("a", "/a").destination("/da").build(),
        RepoConfigBuilder::new("b", "/b").destination("/db").build(),
    ]
}

fn kind_strategy() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Created),
        Just(EventKind::Modified),
        Just(EventKind::Deleted),
        Just(EventKind::Moved),
    ]
}

// (repo index, file index, kind)
fn key_strategy() -> impl Strategy<Value = (usize, usize, EventKind)> {
    (0..2usize, 0..3usize, kind_strategy())
}

fn make_item(repos: &[Arc<RepoConfig>], (r, f, kind): (usize, usize, EventKind)) -> QueueItem {
    let repo = Arc::clone(&repos[r]);
    let path = repo.source.join(format!("file{f}"));
    QueueItem::new(repo, FsEvent::new(path, kind))
}

proptest! {
    #[test]
    fn identical_burst_leaves_one_item(key in key_strategy(), burst in 1..20usize) {
        let repos = repos();
        let queue = DedupQueue::new();
        for _ in 0..burst {
            queue.put(make_item(&repos, key));
        }
        prop_assert_eq!(queue.len(), 1);
    }

    #[test]
    fn queue_matches_adjacent_collapse_model(keys in proptest::collection::vec(key_strategy(), 0..40)) {
        let repos = repos();
        let queue = DedupQueue::new();

        let mut expected: Vec<(usize, usize, EventKind)> = Vec::new();
        for key in &keys {
            queue.put(make_item(&repos, *key));
            if expected.last() != Some(key) {
                expected.push(*key);
            }
        }

        prop_assert_eq!(queue.len(), expected.len());
        for key in expected {
            let item = queue.try_get().unwrap();
            prop_assert_eq!(item, make_item(&repos, key));
        }
        prop_assert!(queue.is_empty());
    }
}

#[test]
fn alternating_items_never_collapse() {
    let repos = repos();
    let queue = DedupQueue::new();
    let x = (0, 0, EventKind::Modified);
    let y = (0, 1, EventKind::Modified);

    for i in 0..10 {
        queue.put(make_item(&repos, if i % 2 == 0 { x } else { y }));
    }
    assert_eq!(queue.len(), 10);
}

#[test]
fn dedup_compares_against_tail_not_removed_head() {
    let repos = repos();
    let queue = DedupQueue::new();
    let key = (1, 2, EventKind::Deleted);

    queue.put(make_item(&repos, key));
    let _head = queue.try_get().unwrap();
    assert!(queue.put(make_item(&repos, key)));
    assert_eq!(queue.len(), 1);
}

#[test]
fn same_path_in_different_repos_is_not_merged() {
    let a = RepoConfigBuilder::new("a", "/shared").destination("/da").build();
    let b = RepoConfigBuilder::new("b", "/shared").destination("/db").build();
    let queue = DedupQueue::new();

    queue.put(QueueItem::new(a, FsEvent::new("/shared/x", EventKind::Modified)));
    queue.put(QueueItem::new(b, FsEvent::new("/shared/x", EventKind::Modified)));
    assert_eq!(queue.len(), 2);
}

#[tokio::test]
async fn concurrent_producers_deliver_everything_distinct() {
    let queue = Arc::new(DedupQueue::new());
    let repos = repos();

    let mut producers = Vec::new();
    for (r, repo) in repos.iter().enumerate() {
        let queue = Arc::clone(&queue);
        let repo = Arc::clone(repo);
        producers.push(tokio::spawn(async move {
            for f in 0..50 {
                let path = repo.source.join(format!("p{r}-{f}"));
                queue.put(QueueItem::new(Arc::clone(&repo), FsEvent::new(path, EventKind::Created)));
                tokio::task::yield_now().await;
            }
        }));
    }
    for p in producers {
        p.await.unwrap();
    }

    assert_eq!(queue.len(), 100);
}
