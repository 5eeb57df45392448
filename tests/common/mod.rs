//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then `use common::prelude::*;`.

use assert_fs::prelude::*;
use std::path::PathBuf;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::documents;
    pub use super::TestFixture;
}

/// Resolution documents used across tests.
#[allow(dead_code)]
pub mod documents {
    /// jupyter (main) and pytest (test) sharing ipython, on linux-64.
    pub const SHARED_DEPENDENCY: &str = r#"
spec:
  channels: [conda-forge]
  dependencies:
    linux-64:
      - {name: jupyter, category: main}
      - {name: pytest, category: test}
resolved:
  linux-64:
    - manager: system
      packages:
        - {name: jupyter, version: "1.0.0", manager: system, platform: linux-64, dependencies: {ipython: "*"}}
        - {name: ipython, version: "8.26.0", manager: system, platform: linux-64, dependencies: {__glibc: ">=2.17"}}
    - manager: language
      packages:
        - {name: pytest, version: "8.3.2", manager: language, platform: linux-64, dependencies: {ipython: "*", pluggy: ">=1.5"}}
        - {name: pluggy, version: "1.5.0", manager: language, platform: linux-64}
"#;

    /// Same specification as [`SHARED_DEPENDENCY`], but ipython was never
    /// resolved.
    pub const MISSING_DEPENDENCY: &str = r#"
spec:
  channels: [conda-forge]
  dependencies:
    linux-64:
      - {name: jupyter, category: main}
resolved:
  linux-64:
    - manager: system
      packages:
        - {name: jupyter, version: "1.0.0", manager: system, platform: linux-64, dependencies: {ipython: "*"}}
"#;

    /// Two platforms; osx-arm64 is missing a dependency.
    pub const ONE_BAD_PLATFORM: &str = r#"
spec:
  dependencies:
    linux-64:
      - {name: zlib}
    osx-arm64:
      - {name: libpng}
resolved:
  linux-64:
    - manager: system
      packages:
        - {name: zlib, version: "1.3.1", manager: system, platform: linux-64}
  osx-arm64:
    - manager: system
      packages:
        - {name: libpng, version: "1.6.43", manager: system, platform: osx-arm64, dependencies: {zlib: ">=1.3"}}
"#;
}

/// A temporary working directory with helpers for lockweave files.
pub struct TestFixture {
    pub temp: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp: assert_fs::TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Write `content` to `name` inside the fixture and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let child = self.temp.child(name);
        child.write_str(content).expect("Failed to write fixture file");
        child.path().to_path_buf()
    }

    /// Path of the default lockfile inside the fixture.
    pub fn lockfile(&self) -> PathBuf {
        self.temp.path().join("lockweave.yml")
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.temp.path().join(name)).expect("Failed to read fixture file")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
