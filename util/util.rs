#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use image::{Rgba, RgbaImage};
use pixquant::Bitmap;

pub fn load_images(images: &[PathBuf]) -> Vec<(String, Bitmap)> {
    images
        .iter()
        .map(|path| {
            image::open(path).map(|image| {
                (
                    path.file_name().unwrap().to_owned().into_string().unwrap(),
                    Bitmap::from(image),
                )
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, Bitmap)> {
    let mut paths = std::fs::read_dir(dir)
        .expect("read img directory")
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

pub const UNSPLASH_DIR: &str = "img/unsplash/img";

pub fn root_dir() -> PathBuf {
    // assume current exe path is something like: target/build/deps/current_exe
    let exe = std::env::current_exe().unwrap();
    exe.parent()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap()
        .to_path_buf()
}

/// A translucent gradient with a transparent border, for when no benchmark images are present.
pub fn gradient(width: u32, height: u32) -> Bitmap {
    #[allow(clippy::cast_possible_truncation)]
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x == 0 || y == 0 { 0 } else { 255 - (x * 64 / width) as u8 };
        Rgba([
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
            ((x + y) * 255 / (width + height)) as u8,
            alpha,
        ])
    });
    Bitmap::Rgba8(image)
}

pub fn load_benchmark_images() -> Vec<(String, Bitmap)> {
    let dir = root_dir().join(UNSPLASH_DIR);
    if dir.is_dir() {
        load_image_dir(dir)
    } else {
        vec![
            ("gradient_640x480".to_owned(), gradient(640, 480)),
            ("gradient_1920x1080".to_owned(), gradient(1920, 1080)),
        ]
    }
}

static BENCHMARK_IMAGES: OnceLock<Vec<(String, Bitmap)>> = OnceLock::new();

pub fn benchmark_images() -> &'static [(String, Bitmap)] {
    BENCHMARK_IMAGES.get_or_init(load_benchmark_images)
}
