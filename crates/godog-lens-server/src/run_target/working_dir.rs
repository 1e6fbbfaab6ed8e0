//! Working-directory resolution for `go test` runs.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::trace;

const BUILD_ROOT_MARKER: &str = "go.mod";
const TEST_SOURCE_SUFFIX: &str = "_test.go";

/// Compute the directory a run should start in.
///
/// `configured` is resolved against the directory containing `feature_file`
/// (an absolute `configured` replaces it). The result is then moved upward
/// to the nearest directory that can actually be tested; see
/// [`nearest_test_directory`].
#[must_use]
pub fn resolve_working_directory(feature_file: &Path, configured: &str) -> PathBuf {
    let base = feature_file.parent().unwrap_or_else(|| Path::new(""));
    let joined = base.join(configured);
    let absolute = std::path::absolute(&joined).unwrap_or(joined);
    nearest_test_directory(&normalise(&absolute))
}

/// Walk upward from `start` to the nearest directory that holds Go tests.
///
/// The first directory containing a `*_test.go` file wins. A directory
/// containing `go.mod` ends the search, since nothing above a module root
/// builds its sources. With neither found before the filesystem root,
/// `start` is returned.
#[must_use]
pub fn nearest_test_directory(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        if has_test_sources(dir) {
            trace!(dir = %dir.display(), "found go test sources");
            return dir.to_path_buf();
        }
        if dir.join(BUILD_ROOT_MARKER).is_file() {
            trace!(dir = %dir.display(), "stopping at module root");
            return dir.to_path_buf();
        }
    }
    start.to_path_buf()
}

fn has_test_sources(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(Result::ok).any(|entry| {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(TEST_SOURCE_SUFFIX))
    })
}

/// Remove `.` and `..` components without touching the filesystem.
fn normalise(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    /// `<root>/go.mod`, `<root>/shop/shop_test.go`,
    /// `<root>/shop/features/cart.feature` and an untestable `<root>/docs/`.
    #[fixture]
    fn module() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path();
        fs::write(root.join("go.mod"), "module example.com/shop\n").expect("go.mod");
        fs::create_dir_all(root.join("shop/features")).expect("features dir");
        fs::write(root.join("shop/shop_test.go"), "package shop\n").expect("test file");
        fs::write(root.join("shop/features/cart.feature"), "Feature: Cart\n").expect("feature");
        fs::create_dir_all(root.join("docs/features")).expect("docs dir");
        fs::write(root.join("docs/features/a.feature"), "Feature: A\n").expect("feature");
        dir
    }

    #[rstest]
    fn default_parent_directory_with_tests_is_used(module: TempDir) {
        let feature = module.path().join("shop/features/cart.feature");
        let dir = resolve_working_directory(&feature, "../");
        assert_eq!(dir, module.path().join("shop"));
    }

    #[rstest]
    fn feature_directory_climbs_to_tests(module: TempDir) {
        let feature = module.path().join("shop/features/cart.feature");
        let dir = resolve_working_directory(&feature, "./");
        assert_eq!(dir, module.path().join("shop"));
    }

    #[rstest]
    fn search_stops_at_module_root(module: TempDir) {
        let feature = module.path().join("docs/features/a.feature");
        let dir = resolve_working_directory(&feature, ".");
        assert_eq!(dir, module.path());
    }

    #[rstest]
    fn absolute_configuration_replaces_feature_directory(module: TempDir) {
        let feature = module.path().join("docs/features/a.feature");
        let target = module.path().join("shop");
        let configured = target.to_str().expect("utf-8 temp path");
        assert_eq!(resolve_working_directory(&feature, configured), target);
    }

    #[test]
    fn untestable_tree_falls_back_to_start() {
        let dir = TempDir::new().expect("temp dir");
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).expect("nested dir");
        // Ancestors of a temp dir are not expected to contain go sources.
        let found = nearest_test_directory(&nested);
        assert!(found == nested || !found.starts_with(dir.path()));
    }

    #[rstest]
    #[case("/a/b/../c", "/a/c")]
    #[case("/a/./b/", "/a/b")]
    #[case("/a/b/../../..", "/")]
    fn normalise_is_lexical(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise(Path::new(input)), PathBuf::from(expected));
    }
}
