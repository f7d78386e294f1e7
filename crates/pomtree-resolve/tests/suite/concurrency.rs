use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pomtree_pom::{Coordinate, ManifestSource, MemoryRepository, RepositoryError};
use pomtree_resolve::{ActivationContext, ManifestCache};

use super::support::*;

struct SlowSource {
    inner: Arc<MemoryRepository>,
}

impl ManifestSource for SlowSource {
    fn read(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        thread::sleep(Duration::from_millis(50));
        self.inner.read(coordinate)
    }
}

#[test]
fn concurrent_requests_share_a_single_fetch() {
    let repo = repository(&[("org.lib:lib:1", pom("org.lib:lib:1", ""))]);
    let cache = Arc::new(ManifestCache::new(
        Arc::new(SlowSource { inner: repo.clone() }),
        ActivationContext::new("17"),
    ));
    let target = coordinate("org.lib:lib:1");

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            let target = target.clone();
            thread::spawn(move || {
                barrier.wait();
                cache.get(&target).map(|m| m.coordinate().clone())
            })
        })
        .collect();

    for handle in handles {
        let loaded = handle.join().expect("thread panicked").expect("manifest");
        assert_eq!(loaded, target);
    }
    assert_eq!(repo.reads(&target), 1);
}

#[test]
fn distinct_coordinates_load_independently() {
    let repo = repository(&[
        ("org.lib:one:1", pom("org.lib:one:1", "")),
        ("org.lib:two:1", pom("org.lib:two:1", "")),
    ]);
    let cache = Arc::new(ManifestCache::new(
        Arc::new(SlowSource { inner: repo.clone() }),
        ActivationContext::new("17"),
    ));

    let handles: Vec<_> = ["org.lib:one:1", "org.lib:two:1"]
        .into_iter()
        .map(|gav| {
            let cache = Arc::clone(&cache);
            let target = coordinate(gav);
            thread::spawn(move || cache.get(&target).is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().expect("thread panicked"));
    }
    assert_eq!(repo.total_reads(), 2);
    assert_eq!(cache.len(), 2);
}
