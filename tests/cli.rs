use std::path::Path;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use image::{ImageBuffer, Rgb};
use predicates::prelude::*;
use rstest::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

/// 生成一张带纹理的图片，`shift` 不同则内容不同
fn save_image(path: &Path, shift: u32) -> Result<()> {
    let img = ImageBuffer::from_fn(64, 48, |x, y| {
        let v = ((x + shift) * 7 ^ (y * 5)) as u8;
        Rgb([v, v.wrapping_mul(3), 255 - v])
    });
    img.save(path)?;
    Ok(())
}

#[fixture]
fn conf_dir() -> assert_fs::TempDir {
    assert_fs::TempDir::new().unwrap()
}

#[rstest]
fn index_then_similar(conf_dir: assert_fs::TempDir) -> Result<()> {
    let c = conf_dir.path();
    save_image(&c.join("1.png"), 0)?;
    save_image(&c.join("2.bmp"), 0)?;

    cargo_run!("imdedup", "-c", c, "index", "1", c.join("1.png")).success();
    cargo_run!("imdedup", "-c", c, "index", "2", c.join("2.bmp"))
        .success()
        .stdout(predicate::str::contains("0\t1"));

    cargo_run!("imdedup", "-c", c, "similar", "1").success().stdout("0\t2\n");
    cargo_run!("imdedup", "-c", c, "similar", "2", "--output-format", "json")
        .success()
        .stdout(predicate::str::contains("\"other_id\": 1"));

    Ok(())
}

#[rstest]
fn relative_source_uses_root(conf_dir: assert_fs::TempDir) -> Result<()> {
    let c = conf_dir.path();
    save_image(&c.join("7.png"), 3)?;

    cargo_run!("imdedup", "-c", c, "index", "--source-root", c, "7", "7.png").success();
    cargo_run!("imdedup", "-c", c, "stats").success().stdout(predicate::str::contains("指纹数量: 1"));

    Ok(())
}

#[rstest]
fn non_image_is_rejected(conf_dir: assert_fs::TempDir) -> Result<()> {
    let c = conf_dir.path();
    std::fs::write(c.join("1.png"), b"definitely not a png")?;

    cargo_run!("imdedup", "-c", c, "index", "1", c.join("1.png")).failure();
    cargo_run!("imdedup", "-c", c, "stats").success().stdout(predicate::str::contains("指纹数量: 0"));

    Ok(())
}

#[rstest]
fn scan_enqueues_numeric_names(conf_dir: assert_fs::TempDir) -> Result<()> {
    let c = conf_dir.path();
    let pictures = c.join("pictures");
    std::fs::create_dir_all(pictures.join("nested"))?;
    save_image(&pictures.join("1.png"), 0)?;
    save_image(&pictures.join("nested/2.png"), 1)?;
    save_image(&pictures.join("cover.png"), 2)?;
    std::fs::write(pictures.join("3.txt"), b"notes")?;

    cargo_run!("imdedup", "-c", c, "scan", &pictures).success();
    cargo_run!("imdedup", "-c", c, "enqueue", "4").success();
    cargo_run!("imdedup", "-c", c, "stats")
        .success()
        .stdout(predicate::str::contains("待处理消息 (picture-index): 3"));

    Ok(())
}

#[rstest]
#[case("65")]
#[case("-1")]
fn threshold_out_of_range(conf_dir: assert_fs::TempDir, #[case] threshold: &str) -> Result<()> {
    let c = conf_dir.path();
    cargo_run!("imdedup", "-c", c, "index", "-t", threshold, "1", "1.png").failure();
    Ok(())
}
