use std::io::{Cursor, Write};
use std::path::PathBuf;

use rand::random;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn unique_temp_root(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("theme-admin-{}-{}", label, random::<u64>()))
}

pub fn theme_manifest(name: &str) -> String {
    serde_json::json!({ "name": name, "version": "1.0.0" }).to_string()
}

/// Build a zip in memory; names ending in `/` become directory entries
pub fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, contents) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, options)
                .expect("add zip directory");
        } else {
            writer.start_file(*name, options).expect("start zip entry");
            writer
                .write_all(contents.as_bytes())
                .expect("write zip entry");
        }
    }

    writer.finish().expect("finish zip").into_inner()
}

/// A minimal valid theme package
pub fn theme_zip(name: &str) -> Vec<u8> {
    let manifest = theme_manifest(name);
    build_zip(&[
        ("theme.json", manifest.as_str()),
        ("views/", ""),
        ("views/layout.html", "<html><body></body></html>"),
        ("assets/app.css", "body { margin: 0; }"),
    ])
}
