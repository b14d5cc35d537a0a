// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use assetflow::assets::ChangedFilter;
use assetflow::pipeline::action_fn;
use assetflow::stages::{SassCompile, WebpConvert};
use assetflow::{AssetPipeline, AssetflowError, Destination, Task, TaskRegistry, TaskRunner};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_malformed_stylesheet_does_not_stop_the_others() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "styles/a.scss", ".a { b { color: red; } }\n");
    write(temp.path(), "styles/b.scss", ".b { color: red;\n");
    write(temp.path(), "styles/c.scss", ".c { margin: 0; }\n");

    let pipeline = AssetPipeline::from_glob("styles/*.scss")
        .pipe(SassCompile::new())
        .dest(Destination::new("out"));

    match pipeline.process("styles", temp.path()).await {
        Err(AssetflowError::ItemsFailed { total, failures, .. }) => {
            assert_eq!(total, 3);
            assert_eq!(failures.len(), 1);
            assert!(failures[0].path.ends_with("b.scss"));
            assert_eq!(failures[0].stage, "sass");
        }
        other => panic!("expected item failures, got {:?}", other.map(|r| r.outputs.len())),
    }

    assert!(temp.path().join("out/a.css").exists());
    assert!(!temp.path().join("out/b.css").exists());
    assert!(temp.path().join("out/c.css").exists());
}

#[tokio::test]
async fn test_series_dependency_sees_previous_output() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "styles/site.scss", "$c: blue;\nbody { color: $c; }\n");

    let trace = Arc::new(Mutex::new(Vec::new()));
    let mut registry = TaskRegistry::new();
    registry
        .register(
            Task::new("styles").action(
                AssetPipeline::from_glob("styles/*.scss")
                    .pipe(SassCompile::new())
                    .dest(Destination::new("out")),
            ),
        )
        .unwrap();

    let seen = Arc::clone(&trace);
    registry
        .register(
            Task::new("check")
                .series(["styles"])
                .action(action_fn(move |ctx| {
                    let seen = Arc::clone(&seen);
                    let css = ctx.root().join("out/site.css");
                    async move {
                        let body = fs::read_to_string(&css)?;
                        seen.lock().unwrap().push(body);
                        Ok::<_, AssetflowError>(Default::default())
                    }
                })),
        )
        .unwrap();

    let runner = TaskRunner::new(registry, temp.path());
    runner.run("check").await.unwrap();

    let trace = trace.lock().unwrap();
    assert_eq!(trace.len(), 1);
    assert!(trace[0].contains("color: blue"));
}

#[tokio::test]
async fn test_webp_skips_up_to_date_images() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("img")).unwrap();
    image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 10, 10, 255]))
        .save(temp.path().join("img/dot.png"))
        .unwrap();

    let pipeline = || {
        AssetPipeline::from_glob("img/*.*")
            .skip_unchanged(ChangedFilter::new("out").with_extension("webp"))
            .pipe(WebpConvert)
            .dest(Destination::new("out"))
    };

    let first = pipeline().process("webp", temp.path()).await.unwrap();
    assert_eq!(first.outputs.len(), 1);
    assert!(temp.path().join("out/dot.webp").exists());

    let second = pipeline().process("webp", temp.path()).await.unwrap();
    assert!(second.outputs.is_empty());
    assert_eq!(second.skipped, 1);
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

#[tokio::test]
async fn test_webp_refreshes_output_of_modified_source() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("img/dot.png");
    let output = temp.path().join("out/dot.webp");
    let pixels = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 200, 10, 255]));
    fs::create_dir_all(temp.path().join("img")).unwrap();
    pixels.save(&source).unwrap();

    let pipeline = || {
        AssetPipeline::from_glob("img/*.*")
            .skip_unchanged(ChangedFilter::new("out").with_extension("webp"))
            .pipe(WebpConvert)
            .dest(Destination::new("out"))
    };

    pipeline().process("webp", temp.path()).await.unwrap();

    // Output from a minute ago, source saved again with the same pixels
    fs::File::options()
        .write(true)
        .open(&output)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(60))
        .unwrap();
    pixels.save(&source).unwrap();
    assert!(modified(&source) > modified(&output));

    let rerun = pipeline().process("webp", temp.path()).await.unwrap();
    assert_eq!(rerun.skipped, 0);
    assert_eq!(rerun.unchanged, 1);
    assert!(modified(&output) >= modified(&source));

    let again = pipeline().process("webp", temp.path()).await.unwrap();
    assert_eq!(again.skipped, 1);
    assert!(again.outputs.is_empty());
}
