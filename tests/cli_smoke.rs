use std::{io::Cursor, path::PathBuf};

use coverforge::{CoverData, Genre, TemplateKey, encode_data_uri};

fn scratch_dir() -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn coverforge_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_coverforge")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "coverforge.exe"
            } else {
                "coverforge"
            });
            p
        })
}

fn working_cover_with_background() -> CoverData {
    let img = image::RgbaImage::from_raw(2, 2, vec![40, 90, 160, 255].repeat(4)).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let mut cover = CoverData::new(Genre::ScienceFiction, TemplateKey::Ebook);
    cover.background_image = Some(encode_data_uri("image/png", &buf));
    cover
}

#[test]
fn cli_export_writes_png_at_template_size() {
    let dir = scratch_dir();
    let cover_path = dir.join("cover.json");
    let out_path = dir.join("untitled-cover.png");
    let _ = std::fs::remove_file(&out_path);

    let f = std::fs::File::create(&cover_path).unwrap();
    serde_json::to_writer_pretty(f, &working_cover_with_background()).unwrap();

    let cover_arg = cover_path.to_string_lossy().to_string();
    let dir_arg = dir.to_string_lossy().to_string();

    let status = std::process::Command::new(coverforge_exe())
        .args(["export", "--in", cover_arg.as_str(), "--out-dir"])
        .arg(dir_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out_path.exists());

    let png = image::open(&out_path).unwrap();
    assert_eq!((png.width(), png.height()), (625, 1000));
}

#[test]
fn cli_save_list_delete_cycle() {
    let dir = scratch_dir();
    let cover_path = dir.join("save_cover.json");
    let catalog_path = dir.join("catalog.json");
    let _ = std::fs::remove_file(&catalog_path);

    let f = std::fs::File::create(&cover_path).unwrap();
    serde_json::to_writer_pretty(f, &working_cover_with_background()).unwrap();

    let cover_arg = cover_path.to_string_lossy().to_string();
    let catalog_arg = catalog_path.to_string_lossy().to_string();

    let status = std::process::Command::new(coverforge_exe())
        .args([
            "save",
            "--in",
            cover_arg.as_str(),
            "--catalog",
            catalog_arg.as_str(),
        ])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(catalog_path.exists());

    let output = std::process::Command::new(coverforge_exe())
        .args(["list", "--catalog", catalog_arg.as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let listing = String::from_utf8(output.stdout).unwrap();
    assert_eq!(listing.lines().count(), 1);

    let id = listing.split_whitespace().next().unwrap().to_string();
    let status = std::process::Command::new(coverforge_exe())
        .args([
            "delete",
            "--catalog",
            catalog_arg.as_str(),
            "--id",
            id.as_str(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let output = std::process::Command::new(coverforge_exe())
        .args(["list", "--catalog", catalog_arg.as_str()])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn cli_share_prints_mailto_url() {
    let dir = scratch_dir();
    let cover_path = dir.join("share_cover.json");

    let mut cover = working_cover_with_background();
    cover.title.text = "Iron Harvest".to_string();
    let f = std::fs::File::create(&cover_path).unwrap();
    serde_json::to_writer_pretty(f, &cover).unwrap();

    let cover_arg = cover_path.to_string_lossy().to_string();
    let output = std::process::Command::new(coverforge_exe())
        .args(["share", "--in", cover_arg.as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let url = String::from_utf8(output.stdout).unwrap();
    assert!(url.starts_with("mailto:?subject="));
    assert!(url.contains("Iron%20Harvest"));
}
