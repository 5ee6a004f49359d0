//! Directory tree traversal and filesystem materialization.

use crate::manifest::{Directory, File, Manifest, ManifestError};
use std::fs;
use std::path::Path;

impl Directory {
    /// Every file in the tree, depth-first: own files, then each child
    /// directory in order.
    pub fn files(&self) -> Vec<&File> {
        let mut out = Vec::new();
        collect_files(self, &mut out);
        out
    }

    /// Mutable counterpart of [`Directory::files`], same order.
    pub fn files_mut(&mut self) -> Vec<&mut File> {
        let mut out = Vec::new();
        collect_files_mut(self, &mut out);
        out
    }

    /// Number of directories below this one.
    pub fn directory_count(&self) -> usize {
        self.directories
            .iter()
            .map(|d| 1 + d.directory_count())
            .sum()
    }
}

fn collect_files<'a>(dir: &'a Directory, out: &mut Vec<&'a File>) {
    out.extend(dir.files.iter());
    for child in &dir.directories {
        collect_files(child, out);
    }
}

fn collect_files_mut<'a>(dir: &'a mut Directory, out: &mut Vec<&'a mut File>) {
    out.extend(dir.files.iter_mut());
    for child in &mut dir.directories {
        collect_files_mut(child, out);
    }
}

impl Manifest {
    /// Discover the contents of every declared top-level directory.
    ///
    /// Each declared directory is listed at `<base>/<name>`; files become
    /// [`File`] entries with `<name>/<relative path>` paths and
    /// subdirectories are recursed into. Entries keep the listing order.
    /// Explicitly declared files stay first and are never duplicated;
    /// a discovered subdirectory with the name of a declared child is merged
    /// into it.
    ///
    /// A missing declared directory fails the whole call and leaves the
    /// manifest unchanged.
    pub fn build_directories(&mut self, base: &Path) -> Result<(), ManifestError> {
        let mut built = self.root.directories.clone();
        for dir in &mut built {
            let rel = clean_relative(&dir.name);
            populate(base, &rel, dir)?;
        }
        self.root.directories = built;
        Ok(())
    }
}

fn populate(base: &Path, rel: &str, dir: &mut Directory) -> Result<(), ManifestError> {
    let full = base.join(rel);
    let read_dir_err = |source| ManifestError::ReadDir {
        path: full.clone(),
        source,
    };
    let entries = fs::read_dir(&full).map_err(read_dir_err)?;

    for entry in entries {
        let entry = entry.map_err(read_dir_err)?;
        let file_type = entry.file_type().map_err(read_dir_err)?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| ManifestError::NonUtf8Path { path: entry.path() })?;
        let child_rel = join_relative(rel, &name);

        if file_type.is_dir() {
            if let Some(declared) = dir.directories.iter_mut().find(|d| d.name == name) {
                populate(base, &child_rel, declared)?;
            } else {
                let mut sub = Directory::new(name);
                populate(base, &child_rel, &mut sub)?;
                dir.directories.push(sub);
            }
        } else if !dir
            .files
            .iter()
            .any(|f| clean_relative(&f.path) == child_rel)
        {
            dir.files.push(File::new(child_rel));
        }
    }
    Ok(())
}

fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}/{name}")
    }
}

/// `./a\b/` -> `a/b`
fn clean_relative(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    slashed
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Service;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("testdata/testdata"));
        touch(&root.join("testdata/path_a/a"));
        touch(&root.join("testdata/path_b/b"));
        touch(&root.join("testdata/path_c/path_c_sub/csub"));
        dir
    }

    fn declared(names: &[&str]) -> Manifest {
        let mut manifest = Manifest::default();
        manifest.root.directories = names.iter().map(|n| Directory::new(*n)).collect();
        manifest
    }

    fn listing(path: &Path) -> Vec<String> {
        fs::read_dir(path)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn mirrors_nested_tree() {
        let fx = fixture();
        let mut manifest = declared(&["testdata"]);
        manifest.build_directories(fx.path()).unwrap();

        let top = &manifest.root.directories[0];
        assert_eq!(top.name, "testdata");
        assert_eq!(top.files, vec![File::new("testdata/testdata")]);
        assert_eq!(top.directories.len(), 3);

        let a = top.directories.iter().find(|d| d.name == "path_a").unwrap();
        assert_eq!(a.files, vec![File::new("testdata/path_a/a")]);

        let c = top.directories.iter().find(|d| d.name == "path_c").unwrap();
        assert!(c.files.is_empty());
        assert_eq!(c.directories[0].name, "path_c_sub");
        assert_eq!(
            c.directories[0].files,
            vec![File::new("testdata/path_c/path_c_sub/csub")]
        );
    }

    #[test]
    fn preserves_listing_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta", "alpha", "mid", "beta"] {
            touch(&dir.path().join("app").join(name));
        }
        let mut manifest = declared(&["app"]);
        manifest.build_directories(dir.path()).unwrap();

        let expected: Vec<String> = listing(&dir.path().join("app"))
            .into_iter()
            .map(|n| format!("app/{n}"))
            .collect();
        let got: Vec<String> = manifest.root.directories[0]
            .files
            .iter()
            .map(|f| f.path.clone())
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn multiple_top_level_directories() {
        let fx = fixture();
        touch(&fx.path().join("testdata2/only"));
        let mut manifest = declared(&["testdata", "testdata2"]);
        manifest.build_directories(fx.path()).unwrap();
        assert_eq!(manifest.root.directories[0].name, "testdata");
        assert_eq!(
            manifest.root.directories[1].files,
            vec![File::new("testdata2/only")]
        );
    }

    #[test]
    fn missing_directory_fails_without_partial_tree() {
        let fx = fixture();
        let mut manifest = declared(&["testdata", "fakedir"]);
        let before = manifest.clone();
        let err = manifest.build_directories(fx.path()).unwrap_err();
        match err {
            ManifestError::ReadDir { path, .. } => assert!(path.ends_with("fakedir")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(manifest, before);
    }

    // Other unixes may refuse to create a name that is not UTF-8.
    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_name_fails_with_real_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let bad = dir
            .path()
            .join("bin")
            .join(OsStr::from_bytes(b"caf\xe9.txt"));
        touch(&bad);
        touch(&dir.path().join("bin/ok.txt"));

        let mut manifest = declared(&["bin"]);
        let before = manifest.clone();
        let err = manifest.build_directories(dir.path()).unwrap_err();
        match err {
            ManifestError::NonUtf8Path { path } => {
                assert_eq!(path, bad);
                assert!(path.exists());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(manifest, before);
    }

    #[test]
    fn declared_files_stay_first_and_are_not_duplicated() {
        let fx = fixture();
        let mut manifest = declared(&["testdata"]);
        let service_file = File {
            path: "./testdata/testdata".to_owned(),
            service: Some(Service {
                name: "svc".to_owned(),
                start: "auto".to_owned(),
                ..Service::default()
            }),
            ..File::default()
        };
        let extra = File::new("elsewhere/readme.txt");
        manifest.root.directories[0].files = vec![extra.clone(), service_file.clone()];
        manifest.build_directories(fx.path()).unwrap();

        let top = &manifest.root.directories[0];
        assert_eq!(top.files, vec![extra, service_file]);
    }

    #[test]
    fn declared_child_directory_is_merged() {
        let fx = fixture();
        let mut manifest = declared(&["testdata"]);
        let mut path_b = Directory::new("path_b");
        path_b.files.push(File {
            path: "testdata/path_b/b".to_owned(),
            permanent: true,
            ..File::default()
        });
        manifest.root.directories[0].directories.push(path_b);
        manifest.build_directories(fx.path()).unwrap();

        let top = &manifest.root.directories[0];
        assert_eq!(top.directories[0].name, "path_b");
        assert_eq!(top.directories[0].files.len(), 1);
        assert!(top.directories[0].files[0].permanent);
        assert_eq!(
            top.directories.iter().filter(|d| d.name == "path_b").count(),
            1
        );
        assert_eq!(top.directories.len(), 3);
    }

    #[test]
    fn files_are_visited_depth_first() {
        let mut root = Directory::default();
        root.files.push(File::new("r"));
        let mut a = Directory::new("a");
        a.files.push(File::new("a/1"));
        let mut aa = Directory::new("aa");
        aa.files.push(File::new("a/aa/1"));
        a.directories.push(aa);
        let mut b = Directory::new("b");
        b.files.push(File::new("b/1"));
        root.directories = vec![a, b];

        let paths: Vec<&str> = root.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["r", "a/1", "a/aa/1", "b/1"]);
        assert_eq!(root.files_mut().len(), 4);
        assert_eq!(root.directory_count(), 3);
    }

    #[test]
    fn cleans_relative_paths() {
        assert_eq!(clean_relative("./a\\b/"), "a/b");
        assert_eq!(clean_relative("a//b"), "a/b");
    }
}
