// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/detector/template.rs - 模板匹配检测器
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::template_matching::{MatchTemplateMethod, match_template};
use thiserror::Error;
use tracing::debug;

use super::{Detector, RawDetection};
use crate::labels::LabelMap;

#[derive(Error, Debug)]
pub enum TemplateError {
  #[error("读取模板目录失败: {0}")]
  Io(#[from] std::io::Error),
  #[error("模板图像加载失败: {path}: {source}")]
  TemplateLoad {
    path: String,
    source: image::ImageError,
  },
  #[error("模板目录为空: {0}")]
  EmptyDirectory(String),
}

struct Template {
  name: String,
  gray: GrayImage,
}

/// 基于归一化互相关的模板匹配检测器
///
/// 模板目录下每个图像文件对应一个类别，文件名（去扩展名）即类别
/// 名称；类别编号按文件名排序分配，保证跨运行稳定。
pub struct TemplateDetector {
  templates: Vec<Template>,
}

impl TemplateDetector {
  pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, TemplateError> {
    let dir = dir.as_ref();

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
      .collect::<Result<Vec<_>, _>>()?
      .into_iter()
      .map(|entry| entry.path())
      .filter(|path| path.is_file())
      .collect();
    paths.sort();

    let mut templates = Vec::with_capacity(paths.len());
    for path in paths {
      let image = image::open(&path).map_err(|source| TemplateError::TemplateLoad {
        path: path.display().to_string(),
        source,
      })?;
      let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

      debug!(
        "加载模板 {}: {}x{}",
        name,
        image.width(),
        image.height()
      );
      templates.push(Template {
        name,
        gray: image.to_luma8(),
      });
    }

    if templates.is_empty() {
      return Err(TemplateError::EmptyDirectory(dir.display().to_string()));
    }

    Ok(TemplateDetector { templates })
  }

  /// 模板名称构成的标签映射
  pub fn label_map(&self) -> LabelMap {
    LabelMap::from_names(self.templates.iter().map(|t| t.name.clone()))
  }
}

impl Detector for TemplateDetector {
  type Error = TemplateError;

  fn detect(&self, tile: &RgbImage, score_threshold: f32) -> Result<Vec<RawDetection>, Self::Error> {
    let gray = image::imageops::grayscale(tile);
    let mut detections = Vec::new();

    for (class_id, template) in self.templates.iter().enumerate() {
      let (tpl_w, tpl_h) = template.gray.dimensions();
      if tpl_w > gray.width() || tpl_h > gray.height() {
        // 裁剪后的边缘瓦片可能比模板还小
        continue;
      }

      let scores = match_template(
        &gray,
        &template.gray,
        MatchTemplateMethod::CrossCorrelationNormalized,
      );

      for (x, y, score) in peak_candidates(&scores, score_threshold) {
        detections.push(RawDetection {
          class_id: class_id as u32,
          score: score.clamp(0.0, 1.0),
          bbox: [x as f32, y as f32, (x + tpl_w) as f32, (y + tpl_h) as f32],
        });
      }
    }

    Ok(detections)
  }
}

/// 在得分图中提取不低于阈值的局部极大值（8 邻域）
///
/// 全零窗口会让归一化互相关产生 NaN，一律跳过；等值平台会产生
/// 多个候选，由下游抑制收敛。
fn peak_candidates(
  scores: &ImageBuffer<Luma<f32>, Vec<f32>>,
  threshold: f32,
) -> Vec<(u32, u32, f32)> {
  let (width, height) = scores.dimensions();
  let mut peaks = Vec::new();

  for y in 0..height {
    for x in 0..width {
      let value = scores.get_pixel(x, y)[0];
      if value.is_nan() || value < threshold {
        continue;
      }

      let mut is_peak = true;
      'neighbors: for dy in -1i64..=1 {
        for dx in -1i64..=1 {
          if dx == 0 && dy == 0 {
            continue;
          }
          let nx = x as i64 + dx;
          let ny = y as i64 + dy;
          if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
            continue;
          }
          if scores.get_pixel(nx as u32, ny as u32)[0] > value {
            is_peak = false;
            break 'neighbors;
          }
        }
      }

      if is_peak {
        peaks.push((x, y, value));
      }
    }
  }

  peaks
}
