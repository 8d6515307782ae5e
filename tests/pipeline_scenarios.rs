//! End-to-end runs over real files on disk.

use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use imgopt_eval::{
    BenchConfig, BenchReport, BenchSession, Error, ImageFormat, Pipeline, RunConfig, StageSpec,
};

fn jpeg_bytes(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let rgb: Vec<u8> = (0..width * height)
        .flat_map(|i| {
            let x = i % width;
            let y = i / width;
            [(x * 255 / width) as u8, (y * 255 / height) as u8, ((x ^ y) * 9 % 256) as u8]
        })
        .collect();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Shaded image with per-pixel noise, encoded at `quality`.
fn photo_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut state: u32 = 0x9e37_79b9;
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            for base in [70 + x * 110 / width, 50 + y * 130 / height, 100 + (x + y) * 60 / (width + height)] {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                rgb.push((base + (state >> 16) % 13).min(255) as u8);
            }
        }
    }
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

fn solid_jpeg(width: u32, height: u32) -> Vec<u8> {
    let rgb = [30u8, 140, 220].repeat((width * height) as usize);
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 100)
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// A JPEG followed by zero padding up to exactly `size` bytes.
fn padded_jpeg(size: usize) -> Vec<u8> {
    let mut bytes = jpeg_bytes(16, 16, 80);
    assert!(bytes.len() < size);
    bytes.resize(size, 0);
    bytes
}

fn session(output: &Path) -> BenchSession {
    BenchSession::new(
        BenchConfig::builder()
            .output_dir(output)
            .threads(3)
            .build()
            .unwrap(),
    )
}

fn pattern(dir: &Path, glob: &str) -> String {
    format!("{}/{glob}", dir.display())
}

#[test]
fn guard_and_totals_over_three_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    for (name, size) in [("1.jpg", 10_000), ("2.jpg", 20_000), ("3.jpg", 30_000)] {
        std::fs::write(input.join(name), padded_jpeg(size)).unwrap();
    }

    // Drops trailing padding: 10000 -> 8000, 30000 -> 25000, 20000 unchanged.
    let mut trim = Pipeline::new();
    trim.push_fn(
        "trim",
        Box::new(|input| {
            let target = match input.len() {
                10_000 => 8_000,
                30_000 => 25_000,
                n => n,
            };
            Ok(input[..target].to_vec())
        }),
    );

    let out = dir.path().join("out");
    let mut session = session(&out);
    session.add_strategy("trim", trim);
    let report = session.run(&[pattern(&input, "*.jpg")]).unwrap();

    let results = report.results("trim").unwrap();
    let names: Vec<_> = results.iter().map(|r| r.dest_name()).collect();
    assert_eq!(names, vec!["1.jpg", "2.jpg", "3.jpg"]);
    assert_eq!(
        results.iter().map(|r| r.optimized).collect::<Vec<_>>(),
        vec![true, false, true]
    );
    assert!(results.iter().all(|r| r.analysis.ssim == 1.0));

    let total = report.aggregate("trim").unwrap().unwrap();
    assert_eq!(total.total_original_size, 60_000);
    assert_eq!(total.total_optimized_size, 53_000);
    assert_eq!(total.total_saved, 7_000);
    assert!((total.average_percent_saved - 11.666_666).abs() < 1e-4);
    assert_eq!(total.optimized_count, 2);

    assert_eq!(std::fs::read(out.join("trim/1.jpg")).unwrap().len(), 8_000);
    assert_eq!(std::fs::read(out.join("trim/2.jpg")).unwrap().len(), 20_000);
}

#[test]
fn container_change_rewrites_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(input.join("a.jpg"), solid_jpeg(32, 32)).unwrap();

    let out = dir.path().join("out");
    let mut session = session(&out);
    session.add_strategy(
        "lossless",
        Pipeline::from_specs(&[StageSpec::WebpLossless]).unwrap(),
    );
    let report = session.run(&[pattern(&input, "a.jpg")]).unwrap();

    let result = &report.results("lossless").unwrap()[0];
    assert!(result.optimized);
    assert_eq!(result.format, ImageFormat::Webp);
    assert_eq!(result.dest, out.join("lossless").join("a.webp"));
    assert!(result.dest.exists());
    assert!(!out.join("lossless/a.jpg").exists());
    assert!(result.analysis.ssim > 0.99);
}

#[test]
fn corrupt_file_fails_whole_run_without_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();

    let mut corrupt = PathBuf::new();
    for i in 0..5 {
        let path = input.join(format!("img{i}.jpg"));
        if i == 3 {
            let mut bytes = jpeg_bytes(24, 24, 90);
            bytes.truncate(40);
            std::fs::write(&path, bytes).unwrap();
            corrupt = path;
        } else {
            std::fs::write(&path, jpeg_bytes(24, 24, 90)).unwrap();
        }
    }

    let out = dir.path().join("out");
    let mut session = session(&out);
    session
        .add_strategy("identity", Pipeline::new())
        .add_strategy("requant", Pipeline::from_specs(&[StageSpec::Jpeg { quality: 50 }]).unwrap());

    let err = session.run(&[pattern(&input, "*.jpg")]).unwrap_err();
    assert_eq!(err.file_path(), Some(corrupt.as_path()));
    assert!(err.to_string().starts_with("Error in file: "));
    assert!(err.to_string().contains("img3.jpg"));
    assert!(!out.join("result.json").exists());
    assert!(!out.join("result.csv").exists());
}

#[test]
fn report_round_trips_and_compares_strategies() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    for i in 0..3 {
        std::fs::write(input.join(format!("p{i}.jpg")), jpeg_bytes(40 + 8 * i, 32, 98)).unwrap();
    }

    let out = dir.path().join("out");
    let mut session = session(&out);
    session
        .add_strategy("original", Pipeline::new())
        .add_strategy("small", Pipeline::from_specs(&[StageSpec::Jpeg { quality: 30 }]).unwrap());
    let report = session.run(&[pattern(&input, "*.jpg")]).unwrap();

    let comparison = report.compare("original", "small").unwrap().unwrap();
    assert_eq!(comparison.size.winner, "small");
    assert!(comparison.size.bytes > 0);
    assert_eq!(comparison.quality.winner, "original");
    assert!(comparison.quality.similarity > 0.0);

    let loaded = BenchReport::load(&out.join("result.json")).unwrap();
    assert_eq!(loaded.strategies, vec!["original", "small"]);
    assert_eq!(
        loaded.aggregate("small").unwrap().unwrap().total_saved,
        report.aggregate("small").unwrap().unwrap().total_saved
    );
    let reloaded = loaded.compare("original", "small").unwrap().unwrap();
    assert_eq!(reloaded.size.winner, "small");
}

#[cfg(feature = "libwebp")]
#[test]
fn default_strategies_write_lossy_webp_smaller_than_photo() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    let source = photo_jpeg(128, 96, 90);
    std::fs::write(input.join("photo.jpg"), &source).unwrap();

    let out = dir.path().join("out");
    let config = RunConfig {
        input: vec![pattern(&input, "*.jpg")],
        output: Some(out.clone()),
        ..RunConfig::default()
    };
    let report = config.session().unwrap().run(&config.input).unwrap();
    assert_eq!(report.strategies, vec!["jpeg", "webp"]);

    let webp = &report.results("webp").unwrap()[0];
    assert!(webp.optimized);
    assert_eq!(webp.format, ImageFormat::Webp);
    assert_eq!(webp.dest, out.join("webp").join("photo.webp"));
    assert!(webp.analysis.optimized_size < source.len() as u64);
    assert!(webp.analysis.ssim < 1.0);
    assert_eq!(std::fs::read(&webp.dest).unwrap().len() as u64, webp.analysis.optimized_size);
}

#[cfg(not(feature = "libwebp"))]
#[test]
fn default_strategies_need_libwebp() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        output: Some(dir.path().join("out")),
        ..RunConfig::default()
    };
    assert!(matches!(config.session(), Err(Error::Configuration(_))));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn same_name_from_two_patterns_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["a", "b"] {
        let sub = dir.path().join(sub);
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("x.jpg"), jpeg_bytes(24, 24, 90)).unwrap();
    }

    let out = dir.path().join("out");
    let mut session = session(&out);
    session.add_strategy("identity", Pipeline::new());
    let err = session
        .run(&[pattern(&dir.path().join("a"), "*.jpg"), pattern(&dir.path().join("b"), "*.jpg")])
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)), "{err}");
    assert!(!out.exists());
}

#[test]
fn unknown_strategy_lookup_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(dir.path());
    session.add_strategy("identity", Pipeline::new());
    let report = session.run(&[pattern(dir.path(), "*.jpg")]).unwrap();
    assert!(matches!(report.results("nope"), Err(Error::Configuration(_))));
}
