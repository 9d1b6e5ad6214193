/// Converts colour-coded annotation renders into single-channel class masks.
use constants::class::classify_rgb;
use image::{GrayImage, ImageFormat, Luma, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
const MASK_SUFFIX: &str = "_mask.png";

/// Files written and files that could not be converted.
#[derive(Debug, Default)]
pub struct ConversionSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, String)>,
}

pub struct MaskConverter {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl MaskConverter {
    pub fn new(input_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Convert every annotation render in the input directory. Unreadable
    /// images are reported and skipped.
    pub fn convert(&self) -> Result<ConversionSummary, Box<dyn std::error::Error>> {
        println!("Converting annotations in {}", self.input_dir.display());
        fs::create_dir_all(&self.output_dir)?;

        let images = discover_images(&self.input_dir)?;
        println!("Found {} annotation images", images.len());

        let mut summary = ConversionSummary::default();
        let (planned, rejected) = plan_outputs(images);
        for (path, reason) in rejected {
            eprintln!("Skipping {}: {}", path.display(), reason);
            summary.skipped.push((path, reason));
        }
        let images = planned;

        let pb = ProgressBar::new(images.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.green/blue}] {pos}/{len} images ({percent}%) {msg}")?
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Building masks");

        let outcomes: Vec<_> = images
            .par_iter()
            .map(|(path, name)| {
                let outcome = self.convert_one(path, name);
                pb.inc(1);
                outcome
            })
            .collect();

        pb.finish_with_message("Masks built");

        for outcome in outcomes {
            match outcome {
                Ok(written) => {
                    println!("Generated: {}", written.display());
                    summary.written.push(written);
                }
                Err((path, reason)) => {
                    eprintln!("Failed to read {}: {}", path.display(), reason);
                    summary.skipped.push((path, reason));
                }
            }
        }
        Ok(summary)
    }

    fn convert_one(&self, path: &Path, name: &str) -> Result<PathBuf, (PathBuf, String)> {
        let fail = |reason: String| (path.to_path_buf(), reason);

        let rgb = image::open(path).map_err(|e| fail(e.to_string()))?.to_rgb8();
        let mask = build_mask(&rgb);

        let out_path = self.output_dir.join(name);
        mask.save_with_format(&out_path, ImageFormat::Png)
            .map_err(|e| fail(e.to_string()))?;
        Ok(out_path)
    }
}

/// Pair each image with its mask name. Images whose mask name is already
/// taken by an earlier path (`view_1.jpg` and `view_1.png`) are rejected,
/// so no two parallel writes share an output file.
pub fn plan_outputs(images: Vec<PathBuf>) -> (Vec<(PathBuf, String)>, Vec<(PathBuf, String)>) {
    let mut owners: HashMap<String, PathBuf> = HashMap::new();
    let mut planned = Vec::new();
    let mut rejected = Vec::new();

    for path in images {
        let Some(name) = mask_file_name(&path) else {
            rejected.push((path, "file name is not valid UTF-8".to_string()));
            continue;
        };
        if let Some(owner) = owners.get(&name) {
            let reason = format!("{} is already written for {}", name, owner.display());
            rejected.push((path, reason));
            continue;
        }
        owners.insert(name.clone(), path.clone());
        planned.push((path, name));
    }
    (planned, rejected)
}

/// Annotation images directly inside `dir`, sorted by path.
pub fn discover_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_annotation_image(path))
        .collect();
    images.sort();
    Ok(images)
}

pub fn is_annotation_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

pub fn mask_file_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(format!("{stem}{MASK_SUFFIX}"))
}

/// Class id per pixel; 0 where no class colour matches.
pub fn build_mask(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        Luma([classify_rgb(rgb.get_pixel(x, y).0)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn mask_assigns_classes_per_pixel() {
        let mut rgb = RgbImage::new(3, 1);
        rgb.put_pixel(0, 0, Rgb([250, 10, 10]));
        rgb.put_pixel(1, 0, Rgb([20, 20, 240]));
        rgb.put_pixel(2, 0, Rgb([100, 100, 100]));

        let mask = build_mask(&rgb);
        assert_eq!(mask.get_pixel(0, 0).0, [1]);
        assert_eq!(mask.get_pixel(1, 0).0, [3]);
        assert_eq!(mask.get_pixel(2, 0).0, [0]);
    }

    #[test]
    fn extensions_match_case_insensitively() {
        assert!(is_annotation_image(Path::new("a/view_1.JPG")));
        assert!(is_annotation_image(Path::new("view_2.jpeg")));
        assert!(is_annotation_image(Path::new("view_3.Png")));
        assert!(!is_annotation_image(Path::new("camera_views.json")));
        assert!(!is_annotation_image(Path::new("README")));
    }

    #[test]
    fn mask_names_keep_the_stem() {
        assert_eq!(
            mask_file_name(Path::new("renders/view_12.jpg")).as_deref(),
            Some("view_12_mask.png")
        );
    }

    #[test]
    fn shared_stems_keep_only_the_first_image() {
        let images = vec![
            PathBuf::from("in/view_1.jpg"),
            PathBuf::from("in/view_1.png"),
            PathBuf::from("in/view_2.png"),
        ];
        let (planned, rejected) = plan_outputs(images);

        let names: Vec<_> = planned.iter().map(|(_, name)| name.as_str()).collect();
        assert_eq!(names, vec!["view_1_mask.png", "view_2_mask.png"]);
        assert_eq!(planned[0].0, PathBuf::from("in/view_1.jpg"));
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, PathBuf::from("in/view_1.png"));
    }

    #[test]
    fn convert_reports_stem_collisions() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        RgbImage::from_pixel(8, 8, Rgb([240, 0, 0]))
            .save(input.path().join("view_1.jpg"))
            .unwrap();
        RgbImage::from_pixel(8, 8, Rgb([0, 0, 240]))
            .save(input.path().join("view_1.png"))
            .unwrap();

        let summary = MaskConverter::new(input.path(), output.path()).convert().unwrap();

        assert_eq!(summary.written, vec![output.path().join("view_1_mask.png")]);
        assert_eq!(summary.skipped.len(), 1);
        assert!(summary.skipped[0].0.ends_with("view_1.png"));

        // The mask comes from the red JPEG, not the blue PNG.
        let mask = image::open(output.path().join("view_1_mask.png")).unwrap().to_luma8();
        assert_eq!(mask.get_pixel(4, 4).0, [1]);
    }

    #[test]
    fn convert_writes_masks_and_skips_unreadable_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let out_dir = output.path().join("masks");

        let mut rgb = RgbImage::new(2, 2);
        rgb.put_pixel(1, 1, Rgb([10, 230, 10]));
        rgb.save(input.path().join("view_1.png")).unwrap();
        fs::write(input.path().join("view_2.jpg"), b"not an image").unwrap();
        fs::write(input.path().join("notes.txt"), b"ignored").unwrap();

        let summary = MaskConverter::new(input.path(), &out_dir).convert().unwrap();

        assert_eq!(summary.written, vec![out_dir.join("view_1_mask.png")]);
        assert_eq!(summary.skipped.len(), 1);
        assert!(summary.skipped[0].0.ends_with("view_2.jpg"));

        let mask = image::open(out_dir.join("view_1_mask.png")).unwrap().to_luma8();
        assert_eq!(mask.get_pixel(1, 1).0, [2]);
        assert_eq!(mask.get_pixel(0, 0).0, [0]);
    }
}
