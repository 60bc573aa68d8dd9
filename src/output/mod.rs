// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/output/mod.rs - 输出模块
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

#[cfg(feature = "save_image_file")]
mod image_output;
#[cfg(feature = "record_file")]
mod record;
#[cfg(feature = "save_image_file")]
mod visualizer;

#[cfg(feature = "save_image_file")]
pub use image_output::ImageOutput;
#[cfg(feature = "record_file")]
pub use record::RecordWriter;
#[cfg(feature = "save_image_file")]
pub use visualizer::Visualizer;

use anyhow::Result;
use image::RgbImage;

use crate::pipeline::Detection;

/// 输出写入器 trait
pub trait OutputWriter {
  /// 写出一次检测的最终保留结果
  fn write(&mut self, image: &RgbImage, detections: &[Detection]) -> Result<()>;

  /// 完成写入
  fn finish(&mut self) -> Result<()>;
}

/// 按扩展名创建输出写入器：图片扩展名写标注图，其余写检测记录
#[allow(unreachable_code)]
pub fn create_output_writer(output_path: &str) -> Result<Box<dyn OutputWriter>> {
  let lower = output_path.to_lowercase();

  #[cfg(feature = "save_image_file")]
  if lower.ends_with(".jpg")
    || lower.ends_with(".jpeg")
    || lower.ends_with(".png")
    || lower.ends_with(".bmp")
  {
    return Ok(Box::new(ImageOutput::new(output_path)));
  }

  #[cfg(feature = "record_file")]
  return Ok(Box::new(RecordWriter::new(output_path)));

  let _ = lower;
  anyhow::bail!("未启用可用的输出功能, 无法写出: {}", output_path)
}
