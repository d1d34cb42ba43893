//! ImageService の結合テスト（モックの在庫とドライバを使用）

use async_trait::async_trait;
use dockyard_build::{
    ArgOverrides, BuildBatch, BuildDriver, BuildError, BuildResult, DEFAULT_DRIVER, Dispatcher,
    DockerfileSource, DriverOptions, DriverRegistry, ImageAction, ImageInventory, ImagePresence,
    ImageService, ProgressMode, ProgressSink,
};
use dockyard_core::parse_project;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct MockInventory {
    present: HashSet<String>,
    failing: HashSet<String>,
}

impl MockInventory {
    fn new(present: &[&str]) -> Self {
        Self {
            present: present.iter().map(|s| s.to_string()).collect(),
            failing: HashSet::new(),
        }
    }

    fn failing(mut self, image: &str) -> Self {
        self.failing.insert(image.to_string());
        self
    }
}

#[async_trait]
impl ImageInventory for MockInventory {
    async fn exists(&self, image: &str) -> BuildResult<ImagePresence> {
        if self.failing.contains(image) {
            return Err(BuildError::InvalidConfig("daemon unavailable".to_string()));
        }
        if self.present.contains(image) {
            Ok(ImagePresence::Found)
        } else {
            Ok(ImagePresence::NotFound)
        }
    }
}

struct RecordingDriver {
    batches: Arc<Mutex<Vec<BuildBatch>>>,
}

#[async_trait]
impl BuildDriver for RecordingDriver {
    fn name(&self) -> &str {
        "recording"
    }

    async fn build(&self, batch: &BuildBatch, _progress: &dyn ProgressSink) -> BuildResult<()> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

struct Harness {
    service: ImageService,
    batches: Arc<Mutex<Vec<BuildBatch>>>,
    created: Arc<AtomicUsize>,
    working_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

fn harness(inventory: MockInventory) -> Harness {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let created = Arc::new(AtomicUsize::new(0));
    let working_dirs = Arc::new(Mutex::new(Vec::new()));

    let (b, c, w) = (batches.clone(), created.clone(), working_dirs.clone());
    let registry = DriverRegistry::new().with(
        DEFAULT_DRIVER,
        move |options: &DriverOptions| -> BuildResult<Box<dyn BuildDriver>> {
            c.fetch_add(1, Ordering::SeqCst);
            w.lock().unwrap().push(options.working_dir.clone());
            Ok(Box::new(RecordingDriver { batches: b.clone() }))
        },
    );
    let dispatcher = Dispatcher::new(Arc::new(registry)).with_progress_mode(ProgressMode::Plain);

    Harness {
        service: ImageService::new(Arc::new(inventory), dispatcher),
        batches,
        created,
        working_dirs,
    }
}

const SHOP: &str = r#"
name: shop
services:
  app:
    image: app:latest
  worker:
    build:
      context: ./worker
      args:
        RUST_VERSION: "1.85"
        FEATURES:
"#;

#[tokio::test]
async fn test_missing_image_and_build_are_batched() {
    let project = parse_project(SHOP, Path::new("/srv/shop"), None).unwrap();
    let h = harness(MockInventory::new(&[]));

    let batch = h
        .service
        .ensure_images_exist(&project, std::future::pending())
        .await
        .unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["app", "shop_worker"]);

    let app = batch.get("app").unwrap();
    assert!(app.is_pull_only());
    assert_eq!(app.inline_dockerfile(), Some("FROM app:latest"));
    assert_eq!(app.tags, vec!["app:latest".to_string()]);

    let worker = batch.get("shop_worker").unwrap();
    assert!(!worker.pull);
    assert!(worker.tags.is_empty());
    assert_eq!(
        worker.inputs.dockerfile,
        DockerfileSource::Path(PathBuf::from("/srv/shop/worker/Dockerfile"))
    );

    assert_eq!(h.created.load(Ordering::SeqCst), 1);
    let batches = h.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], batch);
    assert_eq!(
        h.working_dirs.lock().unwrap().as_slice(),
        &[PathBuf::from("/srv/shop")]
    );
}

#[tokio::test]
async fn test_all_present_is_noop() {
    let yaml = r#"
services:
  db:
    image: postgres:16
  cache:
    image: redis:7
"#;
    let project = parse_project(yaml, Path::new("/srv/shop"), Some("shop")).unwrap();
    let h = harness(MockInventory::new(&["postgres:16", "redis:7"]));

    let batch = h
        .service
        .ensure_images_exist(&project, std::future::pending())
        .await
        .unwrap();

    assert!(batch.is_empty());
    assert_eq!(h.created.load(Ordering::SeqCst), 0);
    assert!(h.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_lookup_failure_aborts_before_dispatch() {
    let project = parse_project(SHOP, Path::new("/srv/shop"), None).unwrap();
    let h = harness(MockInventory::new(&[]).failing("app:latest"));

    let err = h
        .service
        .ensure_images_exist(&project, std::future::pending())
        .await
        .unwrap_err();

    match err {
        BuildError::InventoryLookup { service, image, .. } => {
            assert_eq!(service, "app");
            assert_eq!(image, "app:latest");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_build_arg_overrides_flow_into_request() {
    let project = parse_project(SHOP, Path::new("/srv/shop"), None).unwrap();
    let h = harness(MockInventory::new(&["app:latest"]));

    let mut overrides = ArgOverrides::new();
    overrides.insert("FEATURES".to_string(), "metrics".to_string());
    overrides.insert("UNDECLARED".to_string(), "ignored".to_string());
    let service = h.service.with_build_args(overrides);

    let batch = service
        .ensure_images_exist(&project, std::future::pending())
        .await
        .unwrap();

    assert_eq!(batch.len(), 1);
    let worker = batch.get("shop_worker").unwrap();
    assert_eq!(worker.build_args["RUST_VERSION"], Some("1.85".to_string()));
    assert_eq!(worker.build_args["FEATURES"], Some("metrics".to_string()));
    assert!(!worker.build_args.contains_key("UNDECLARED"));
}

#[tokio::test]
async fn test_plan_reports_actions() {
    let project = parse_project(SHOP, Path::new("/srv/shop"), None).unwrap();
    let h = harness(MockInventory::new(&["app:latest"]));

    let plan = h.service.plan(&project).await.unwrap();
    let actions: Vec<(&str, &ImageAction)> = plan
        .iter()
        .map(|r| (r.service.as_str(), &r.action))
        .collect();
    assert_eq!(
        actions,
        vec![("app", &ImageAction::Skip), ("worker", &ImageAction::Build)]
    );
    assert_eq!(h.created.load(Ordering::SeqCst), 0);
}
