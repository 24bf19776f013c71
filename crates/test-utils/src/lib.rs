pub mod builders;
pub mod fake_executor;
pub mod fake_toolchain;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use sitepipe::config::BuildConfig;
use sitepipe::fs::{FileSystem, RealFileSystem};
use sitepipe::task::Pipeline;
use tempfile::TempDir;
use tracing_subscriber::{fmt, EnvFilter};

pub use builders::{write_file, BuildConfigBuilder};
pub use fake_executor::FakeExecutor;
pub use fake_toolchain::FakeToolchain;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

pub const TEMPLATE: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>site</title>\n</head>\n<body>\n<div id=\"app\"></div>\n</body>\n</html>\n";

/// A throw-away project in the default layout:
///
/// ```text
/// src/main/A.elm, src/main/B.elm
/// src/site/c.ts, src/site/d.less, src/site/index.html
/// bower.json -> { "dependencies": { "pkg": "*" } }
/// bower_components/pkg/{.bower.json, pkg.js}
/// ```
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp project");
        let root = dir.path();
        write_file(root, "src/main/A.elm", "module A exposing (a)\n");
        write_file(root, "src/main/B.elm", "module B exposing (b)\n");
        write_file(root, "src/site/c.ts", "const c: number = 1;\n");
        write_file(root, "src/site/d.less", "@w: 1px;\n");
        write_file(root, "src/site/index.html", TEMPLATE);
        write_file(root, "bower.json", r#"{ "name": "site", "dependencies": { "pkg": "*" } }"#);
        write_file(
            root,
            "bower_components/pkg/.bower.json",
            r#"{ "name": "pkg", "main": "pkg.js" }"#,
        );
        write_file(root, "bower_components/pkg/pkg.js", "var pkg = 1;\n");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        write_file(self.root(), rel, content)
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read project file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn config(&self) -> BuildConfigBuilder {
        BuildConfigBuilder::new(self.root())
    }

    /// Pipeline over the real filesystem with `toolchain`.
    pub fn pipeline(&self, config: BuildConfig, toolchain: &FakeToolchain) -> Arc<Pipeline> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        Arc::new(
            Pipeline::new(Arc::new(config), fs, Arc::new(toolchain.clone()))
                .expect("build pipeline"),
        )
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}
