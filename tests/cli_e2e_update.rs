//! End-to-end tests for the `update` command.

mod common;
use common::prelude::*;

const BEFORE: &str = r#"
spec:
  dependencies:
    linux-64:
      - {name: pydantic}
resolved:
  linux-64:
    - manager: language
      packages:
        - {name: pydantic, version: "1.10.17", manager: language, platform: linux-64, dependencies: {typing-extensions: "*"}}
        - {name: typing_extensions, version: "4.5.0", manager: language, platform: linux-64}
"#;

const AFTER: &str = r#"
spec:
  dependencies:
    linux-64:
      - {name: pydantic}
resolved:
  linux-64:
    - manager: language
      packages:
        - {name: pydantic, version: "2.8.2", manager: language, platform: linux-64, dependencies: {pydantic-core: "==2.20.1"}}
        - {name: pydantic_core, version: "2.20.1", manager: language, platform: linux-64}
"#;

#[test]
fn test_update_replaces_package_and_drops_stale_dependency() {
    let fixture = TestFixture::new();
    let before = fixture.write("before.yaml", BEFORE);
    let after = fixture.write("after.yaml", AFTER);

    cargo_bin_cmd!("lockweave")
        .current_dir(fixture.temp.path())
        .args(["lock", "--input"])
        .arg(&before)
        .assert()
        .success();

    cargo_bin_cmd!("lockweave")
        .current_dir(fixture.temp.path())
        .args(["--color", "never", "update", "--update", "pydantic", "--input"])
        .arg(&after)
        .assert()
        .success()
        .stdout(predicate::str::contains("linux-64: 2 package(s) (was 2)"));

    let lockfile = fixture.read("lockweave.yml");
    assert!(lockfile.contains("2.8.2"));
    assert!(lockfile.contains("pydantic_core"));
    assert!(!lockfile.contains("typing_extensions"));
}

#[test]
fn test_update_requires_existing_lockfile() {
    let fixture = TestFixture::new();
    let after = fixture.write("after.yaml", AFTER);

    cargo_bin_cmd!("lockweave")
        .current_dir(fixture.temp.path())
        .args(["update", "--update", "pydantic", "--input"])
        .arg(&after)
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `lockweave lock` first"));
}
