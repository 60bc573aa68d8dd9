// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/pipeline.rs - 瓦片化检测流水线
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::RgbImage;
use image::imageops;
use tracing::debug;

use crate::config::{ConfigError, PipelineConfig};
use crate::detector::Detector;
use crate::labels::LabelMap;
use crate::nms::non_max_suppression;
use crate::tile::TileGrid;

/// 全图坐标下的检测结果
#[derive(Debug, Clone)]
pub struct Detection {
  /// 类别编号
  pub class_id: u32,
  /// 类别名称，未知类别以编号显示
  pub label: String,
  /// 置信度
  pub score: f32,
  /// 边界框 [x_min, y_min, x_max, y_max]（全图像素坐标）
  pub bbox: [f32; 4],
}

/// 瓦片化检测流水线
///
/// 对每个配置的瓦片尺寸生成覆盖全图的重叠网格，逐瓦片裁剪并调用
/// 检测器，把瓦片内坐标平移回全图坐标后汇入同一个累加序列，最后
/// 对整个序列做一次全局非极大值抑制。瓦片之间互不影响，检测器
/// 调用按顺序串行执行。
pub struct Pipeline<D> {
  config: PipelineConfig,
  detector: D,
  labels: LabelMap,
}

impl<D: Detector> Pipeline<D> {
  /// 创建流水线，配置校验失败则拒绝构造
  pub fn new(config: PipelineConfig, detector: D, labels: LabelMap) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Pipeline {
      config,
      detector,
      labels,
    })
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// 聚合所有瓦片尺寸、所有窗口上的检测结果（全图坐标，未去重）
  ///
  /// 累加顺序为瓦片尺寸外层、窗口行主序内层。单个瓦片上的检测
  /// 失败会立即中止整个聚合，不返回部分结果。
  pub fn aggregate(&self, image: &RgbImage) -> Result<Vec<Detection>, D::Error> {
    let mut objects = Vec::new();

    for &tile_size in &self.config.tile_sizes {
      let grid = TileGrid::new(
        image.width(),
        image.height(),
        tile_size,
        self.config.tile_overlap,
      );
      debug!("瓦片尺寸 {}: 共 {} 个窗口", tile_size, grid.window_count());

      for window in grid {
        let crop =
          imageops::crop_imm(image, window.x0, window.y0, window.width(), window.height())
            .to_image();
        let raw = self.detector.detect(&crop, self.config.score_threshold)?;
        if raw.is_empty() {
          continue;
        }
        debug!("窗口 ({}, {}): {} 个检测", window.x0, window.y0, raw.len());

        for item in raw {
          objects.push(Detection {
            class_id: item.class_id,
            label: self.labels.resolve(item.class_id),
            score: item.score,
            bbox: window.remap(item.bbox),
          });
        }
      }
    }

    Ok(objects)
  }

  /// 聚合后做一次全局抑制，返回保留的检测（得分最高者在前）
  pub fn process(&self, image: &RgbImage) -> Result<Vec<Detection>, D::Error> {
    let objects = self.aggregate(image)?;
    debug!("聚合得到 {} 个候选检测", objects.len());

    let keep = non_max_suppression(&objects, self.config.iou_threshold);
    Ok(keep.into_iter().map(|idx| objects[idx].clone()).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::TileSize;
  use crate::detector::RawDetection;
  use std::cell::Cell;

  #[derive(Debug, thiserror::Error)]
  #[error("模拟检测失败")]
  struct MockError;

  /// 每个瓦片固定返回一个左上角的检测
  struct FixedDetector {
    score: f32,
  }

  impl Detector for FixedDetector {
    type Error = MockError;

    fn detect(&self, _tile: &RgbImage, _thr: f32) -> Result<Vec<RawDetection>, MockError> {
      Ok(vec![RawDetection {
        class_id: 3,
        score: self.score,
        bbox: [0.0, 0.0, 4.0, 4.0],
      }])
    }
  }

  /// 返回瓦片内亮像素的包围盒
  struct BlobDetector;

  impl Detector for BlobDetector {
    type Error = MockError;

    fn detect(&self, tile: &RgbImage, _thr: f32) -> Result<Vec<RawDetection>, MockError> {
      let mut bounds: Option<(u32, u32, u32, u32)> = None;
      for (x, y, pixel) in tile.enumerate_pixels() {
        if pixel[0] > 200 {
          bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
          });
        }
      }

      Ok(match bounds {
        None => Vec::new(),
        Some((x0, y0, x1, y1)) => vec![RawDetection {
          class_id: 0,
          score: 0.9,
          bbox: [x0 as f32, y0 as f32, (x1 + 1) as f32, (y1 + 1) as f32],
        }],
      })
    }
  }

  /// 前 n 次调用成功，之后失败
  struct FailAfter {
    remaining: Cell<usize>,
  }

  impl Detector for FailAfter {
    type Error = MockError;

    fn detect(&self, _tile: &RgbImage, _thr: f32) -> Result<Vec<RawDetection>, MockError> {
      if self.remaining.get() == 0 {
        return Err(MockError);
      }
      self.remaining.set(self.remaining.get() - 1);
      Ok(Vec::new())
    }
  }

  fn config(tile_sizes: Vec<TileSize>, overlap: u32, iou: f32) -> PipelineConfig {
    PipelineConfig {
      tile_sizes,
      tile_overlap: overlap,
      score_threshold: 0.1,
      iou_threshold: iou,
    }
  }

  #[test]
  fn test_invalid_config_rejected_at_construction() {
    let result = Pipeline::new(
      config(vec![], 15, 0.1),
      FixedDetector { score: 0.5 },
      LabelMap::new(),
    );
    assert!(matches!(result, Err(ConfigError::EmptyTileSizes)));
  }

  #[test]
  fn test_aggregate_remaps_to_window_origins() {
    let image = RgbImage::new(100, 100);
    let pipeline = Pipeline::new(
      config(vec![TileSize { width: 60, height: 60 }], 10, 0.1),
      FixedDetector { score: 0.5 },
      LabelMap::new(),
    )
    .unwrap();

    let objects = pipeline.aggregate(&image).unwrap();

    // 步长 50：窗口原点 (0,0) (50,0) (0,50) (50,50)，行主序
    let bboxes: Vec<_> = objects.iter().map(|d| d.bbox).collect();
    assert_eq!(
      bboxes,
      vec![
        [0.0, 0.0, 4.0, 4.0],
        [50.0, 0.0, 54.0, 4.0],
        [0.0, 50.0, 4.0, 54.0],
        [50.0, 50.0, 54.0, 54.0],
      ]
    );
    assert!(objects.iter().all(|d| d.label == "3"));
  }

  #[test]
  fn test_aggregate_follows_tile_size_order() {
    let image = RgbImage::new(100, 100);
    let pipeline = Pipeline::new(
      config(
        vec![
          TileSize { width: 60, height: 60 },
          TileSize { width: 120, height: 120 },
        ],
        10,
        0.1,
      ),
      FixedDetector { score: 0.5 },
      LabelMap::new(),
    )
    .unwrap();

    let objects = pipeline.aggregate(&image).unwrap();

    // 60x60 网格贡献 4 个，120x120 网格贡献 1 个，顺序在后
    assert_eq!(objects.len(), 5);
    assert_eq!(objects[4].bbox, [0.0, 0.0, 4.0, 4.0]);
  }

  #[test]
  fn test_detector_error_aborts_aggregation() {
    let image = RgbImage::new(100, 100);
    let pipeline = Pipeline::new(
      config(vec![TileSize { width: 60, height: 60 }], 10, 0.1),
      FailAfter { remaining: Cell::new(2) },
      LabelMap::new(),
    )
    .unwrap();

    assert!(pipeline.aggregate(&image).is_err());
  }

  #[test]
  fn test_empty_image_yields_empty_keep_set() {
    let image = RgbImage::new(100, 100);
    let pipeline = Pipeline::new(
      config(vec![TileSize { width: 60, height: 60 }], 10, 0.1),
      BlobDetector,
      LabelMap::new(),
    )
    .unwrap();

    assert!(pipeline.process(&image).unwrap().is_empty());
  }

  #[test]
  fn test_duplicate_across_overlapping_windows_is_suppressed() {
    // 100x20 的图像，60x40 的瓦片，重叠 20：窗口 [0,60) 与 [40,100)
    // 都能完整看到 [45,5)..[55,15) 的亮块，[80,100) 什么都看不到
    let mut image = RgbImage::new(100, 20);
    for y in 5..15 {
      for x in 45..55 {
        image.put_pixel(x, y, image::Rgb([255, 255, 255]));
      }
    }

    let pipeline = Pipeline::new(
      config(vec![TileSize { width: 60, height: 40 }], 20, 0.3),
      BlobDetector,
      LabelMap::from_names(["blob"]),
    )
    .unwrap();

    let objects = pipeline.aggregate(&image).unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].bbox, objects[1].bbox);

    let kept = pipeline.process(&image).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].bbox, [45.0, 5.0, 55.0, 15.0]);
    assert_eq!(kept[0].label, "blob");
  }
}
