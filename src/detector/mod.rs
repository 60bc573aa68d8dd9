// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/detector/mod.rs - 检测能力抽象
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

#[cfg(feature = "detector_template")]
mod template;

#[cfg(feature = "detector_template")]
pub use template::{TemplateDetector, TemplateError};

use image::RgbImage;

/// 单个瓦片上的原始检测结果，坐标位于该瓦片自身的像素空间
#[derive(Debug, Clone)]
pub struct RawDetection {
  /// 类别编号
  pub class_id: u32,
  /// 置信度
  pub score: f32,
  /// 边界框 [x_min, y_min, x_max, y_max]（瓦片内像素坐标）
  pub bbox: [f32; 4],
}

/// 检测能力抽象：对一个瓦片裁剪执行检测，返回不低于给定
/// 置信度阈值的检测结果
///
/// 实现若在内部缩放瓦片，返回前必须把坐标还原到瓦片原始像素
/// 尺度。对确定的模型状态结果必须确定，单次调用之间不共享
/// 可变状态。
pub trait Detector {
  type Error: std::error::Error + Send + Sync + 'static;

  fn detect(&self, tile: &RgbImage, score_threshold: f32) -> Result<Vec<RawDetection>, Self::Error>;
}
