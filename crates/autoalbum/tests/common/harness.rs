//! Test harness for isolated pipeline runs.
//!
//! `TestHarness` owns a temporary directory holding a pictures directory
//! (the scan input) and an archive directory (the relocation target), and
//! wires a `Pipeline` from fake collaborators.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use assert_fs::TempDir;
use chrono::Local;

use autoalbum::enricher::{CompletionService, Enricher};
use autoalbum::labeler::PhotoLabeler;
use autoalbum::pipeline::Pipeline;
use autoalbum::processor::TextExtractor;
use autoalbum::storage::{archive_dir_for, Relocator};

pub struct TestHarness {
    temp_dir: TempDir,
    pub pictures_dir: PathBuf,
    pub archive_dir: PathBuf,
}

impl TestHarness {
    /// Creates the pictures directory; the archive is left for the relocator.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let pictures = temp_dir.child("Pictures");
        pictures
            .create_dir_all()
            .expect("Failed to create pictures dir");

        let pictures_dir = pictures.path().to_path_buf();
        let archive_dir = temp_dir.child("Documents/by-year").path().to_path_buf();

        Self {
            temp_dir,
            pictures_dir,
            archive_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a small valid JPEG into the pictures directory.
    pub fn write_jpeg(&self, filename: &str) -> PathBuf {
        self.write_input(filename, &jpeg_fixture([128, 128, 128]))
    }

    pub fn write_input(&self, filename: &str, content: &[u8]) -> PathBuf {
        let child = self.temp_dir.child("Pictures").child(filename);
        child
            .write_binary(content)
            .expect("Failed to write input file");
        child.path().to_path_buf()
    }

    /// Where a document relocated right now ends up.
    pub fn todays_archive_dir(&self) -> PathBuf {
        archive_dir_for(&self.archive_dir, Local::now())
    }

    pub fn pipeline(
        &self,
        extractor: impl TextExtractor + 'static,
        labeler: impl PhotoLabeler + 'static,
        completion: impl CompletionService + 'static,
    ) -> Pipeline {
        Pipeline::new(
            Box::new(extractor),
            Box::new(labeler),
            Enricher::new(Box::new(completion)),
            Relocator::new(&self.archive_dir),
        )
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes a 16x16 single-colour JPEG.
pub fn jpeg_fixture(rgb: [u8; 3]) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(16, 16, image::Rgb(rgb)));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("Failed to encode JPEG fixture");
    buf.into_inner()
}
